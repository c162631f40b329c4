//! Remote boundary for inline record editing
//!
//! - [`Transport`]: async seam every request goes through ([`ReqwestTransport`] in production)
//! - [`RecordPatcher`]: single-attribute partial updates
//! - [`AutocompleteSource`]: query-driven candidate search with optional caching
//! - [`RecordLister`]: paginated, ordered record lists
//! - [`RemoteConfig`]: endpoints, headers, limits and timeouts
//!
//! # Example
//!
//! ```rust,ignore
//! use pw_model::{AuthToken, RecordId};
//! use pw_remote::{RecordPatcher, RemoteConfig, ReqwestTransport};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(RemoteConfig::new("https://patchwork.example.org"));
//! let transport = Arc::new(ReqwestTransport::new(&config)?);
//! let patcher = RecordPatcher::new(transport, config);
//!
//! let record = patcher
//!     .patch(RecordId(42), "reviewer", json!(7), &AuthToken::new("csrf"))
//!     .await?;
//! println!("reviewer is now {:?}", record.get("reviewer"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod list;
mod patcher;
mod search;
mod transport;

pub use config::RemoteConfig;
pub use error::{ConfigError, ListError, PatchError, SearchError, TransportError};
pub use list::{ListQuery, Ordering, Page, RecordLister};
pub use patcher::RecordPatcher;
pub use search::AutocompleteSource;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
