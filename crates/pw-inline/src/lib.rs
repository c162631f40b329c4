//! Inline editable record fields
//!
//! Turns attributes of a server-side record into fields that are edited in
//! place and saved one at a time through partial updates.
//!
//! ## Lifecycle
//!
//! Each field is a [`FieldWidget`] cycling through
//! `Display → Editing → Saving → {Display, Error}`. Reference-typed fields
//! get an [`AutocompleteBinding`] for the lifetime of their [`EditSession`].
//! The server's response to a save is authoritative: the field never shows
//! the submitted candidate, only what the server returned.
//!
//! ## Failures
//!
//! Failed searches degrade to an empty candidate list. Failed saves leave the
//! field open in `Error` with the pending selection intact. Both are
//! journaled in a [`DiagnosticLog`].
//!
//! # Example
//!
//! ```rust,ignore
//! use pw_inline::{Affordance, EditableFieldRegistry, EditorConfig};
//! use pw_model::{AuthToken, AutocompleteConfig, FieldDescriptor, RecordId, RequestContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = RequestContext::new(RecordId(42), AuthToken::new("csrf"));
//! let mut fields = EditableFieldRegistry::connect(EditorConfig::load("pw-inline.toml")?, context)?;
//! fields.register([FieldDescriptor::reference(
//!     "reviewer",
//!     AutocompleteConfig::new("/complete_user", "name"),
//! )])?;
//!
//! fields.trigger("reviewer", Affordance::Edit).await?;
//! fields.search("reviewer", "ali").await?;
//! fields.select_raw("reviewer", "7")?;
//! fields.trigger("reviewer", Affordance::Save).await?;
//! println!("{:?}", fields.display_text("reviewer"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod binding;
mod config;
mod diagnostics;
mod error;
mod registry;
mod session;
mod telemetry;
mod widget;

pub use binding::{ApplyOutcome, AutocompleteBinding, SearchTicket};
pub use config::EditorConfig;
pub use diagnostics::{DiagnosticEntry, DiagnosticKind, DiagnosticLog};
pub use error::{FieldAction, FieldError, LoadError};
pub use registry::{Affordance, EditableFieldRegistry};
pub use session::{EditSession, SessionId};
pub use telemetry::{init_subscriber, Verbosity, LOG_ENV};
pub use widget::{ConfirmOutcome, EditorView, FieldState, FieldView, FieldWidget, PatchTicket};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
