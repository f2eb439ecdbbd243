//! registry-core — record store for the library registry.
//!
//! A [`LibraryStore`] holds library records, unique by name and by
//! `(city, address)`, together with a PBKDF2-hashed administrator password.
//! The whole state is persisted as one JSON document:
//!
//! ```json
//! {
//!     "libraries_data": [{"name": "...", "city": "...", "address": "..."}],
//!     "administrator_password": "<salt_hex>$<key_hex>"
//! }
//! ```
//!
//! An empty `administrator_password` means no password has been set yet.

pub mod crypto;
pub mod error;
pub mod models;
pub mod paths;
pub mod shared;
mod storage;
pub mod store;

pub use crypto::Credential;
pub use error::{LoadError, NotFoundError, SaveError, ValidationError};
pub use models::{EditField, LibraryRecord};
pub use shared::SharedStore;
pub use store::LibraryStore;
