//! Session-held models for the storefront.
//!
//! Catalog, cart and order entities are mirrored in `holycat_core::model`;
//! this module only holds what the storefront itself keeps per visitor.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashLevel};
pub use session::{CurrentUser, keys as session_keys};
