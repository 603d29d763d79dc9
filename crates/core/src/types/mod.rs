//! Core types for HolyCat.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod date;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use catalog::{ProductCategory, ProductFormError, ProductInput};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Rupiah;
pub use status::*;
