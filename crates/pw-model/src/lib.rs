//! Record model for inline editing
//!
//! Types shared by the remote boundary and the field state machines:
//!
//! - [`Record`]: a server-side entity as returned by the API
//! - [`FieldDescriptor`]: one editable attribute of a record and its current value
//! - [`RefValue`]: a reference to another entity (identifier + display label)
//! - [`RequestContext`]: record identifier and anti-forgery token, fixed at setup
//! - [`DisplayValue`]: what a field renders while not being edited
//!
//! # Example
//!
//! ```rust
//! use pw_model::{AutocompleteConfig, FieldDescriptor, Record};
//! use serde_json::json;
//!
//! let reviewer = FieldDescriptor::reference(
//!     "reviewer",
//!     AutocompleteConfig::new("/complete_user", "name"),
//! );
//!
//! let record = Record::from_value(json!({
//!     "id": 3,
//!     "reviewer": {"pk": 7, "name": "Alice"},
//! }))
//! .unwrap();
//!
//! let refreshed = reviewer.refreshed_from(&record);
//! assert_eq!(refreshed.render().to_string(), "Alice");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod context;
mod descriptor;
mod error;
mod record;
mod render;
mod value;

pub use context::{AuthToken, RequestContext};
pub use descriptor::{AutocompleteConfig, FieldDescriptor, FieldKind, Renderer};
pub use error::ModelError;
pub use record::{Record, RecordId};
pub use render::{date_portion, DisplayValue, PLACEHOLDER};
pub use value::{normalize_reference_id, parse_reference_str, FieldValue, RefValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
