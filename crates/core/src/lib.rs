//! HolyCat Core - Shared types and storefront logic.
//!
//! This crate provides the types and derived-state logic used by the
//! HolyCat storefront and its admin console:
//! - `storefront` - Server-rendered shop and admin console
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The HolyCat backend owns every entity; the values here are
//! transient mirrors used to render pages and to build request payloads.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, rupiah amounts, emails, statuses, categories
//! - [`model`] - Mirrors of backend entities (products, carts, orders)
//! - [`cart`] - Cart item selection and quantity editing
//! - [`checkout`] - Checkout pricing and order placement validation
//! - [`order`] - Order action gating and admin status changes
//! - [`listing`] - Admin table filtering and pagination
//! - [`report`] - Sales report filters and daily revenue

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod listing;
pub mod model;
pub mod order;
pub mod report;
pub mod types;

pub use types::*;
