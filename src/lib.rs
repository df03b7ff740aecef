//! In-memory purchases service.
//!
//! A single ordered collection of purchase records exposed over HTTP/JSON.
//! Ids are dense and 1-based; deleting a record renumbers every record after
//! it.

pub mod api;
pub mod config;
pub mod models;
pub mod storage;
pub mod telemetry;
pub mod validation;

pub use api::{router, AppState};
pub use models::{ProductType, Purchase, PurchaseInput};
pub use storage::{InMemoryStore, PurchaseStore, StorageError};
pub use validation::{validate_purchase, ValidationError};
