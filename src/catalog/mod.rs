//! Configuration catalog subsystem.
//!
//! # Data Flow
//! ```text
//! CONFIGURATIONS_DIR set:
//!     startup → store.rs loads {kind}.json files → served verbatim
//!
//! CONFIGURATIONS_DIR unset:
//!     lookup forwarded to the Data Collector like any other route
//! ```

pub mod store;

pub use store::{CatalogError, CatalogStore, ConfigurationKind};
