//! Generic create/read/update helpers over Sea-ORM.
//!
//! - [`Filters`] turn keyword arguments into `WHERE` conditions, with
//!   `with_<relation>` keywords requesting eager loading
//! - [`AsyncBaseCrud`] and [`BaseCrud`] run `create`, `update`, `first`,
//!   `one`, `all` on one table; both build queries through [`Base`]
//! - [`PartialUpdate`] patches any serde model in place from partial data

pub mod blocking;
pub mod config;
pub mod crud;
pub mod errors;
pub mod filter;
pub mod models;
pub mod query;
pub mod relations;
pub mod sort;
pub mod traits;
pub mod update;

pub use blocking::BaseCrud;
pub use config::CrudConfig;
pub use crud::AsyncBaseCrud;
pub use errors::{CrudError, Result};
pub use filter::Filters;
pub use models::{Fields, Record};
pub use query::{Base, CrudQuery};
pub use relations::{RelationLoader, Relations};
pub use sort::OrderBy;
pub use traits::{CrudTable, TableRow};
pub use update::PartialUpdate;
