//! # datamapper
//!
//! Client-side state and REST plumbing for a small data-mapping service.
//!
//! The service (not part of this crate) stores field mappings, owns a named
//! scheduler flag and accepts webhook payloads. This crate keeps the client's
//! view of those resources in sync with it.
//!
//! ## Overview
//!
//! Four flows, each owned by one state unit:
//! - **Record submitter / lister**: [`MappingBook`] validates and creates
//!   mappings, and holds the collection loaded from the server
//! - **Flag toggle**: [`FlagController`] mirrors one remote boolean, tagging
//!   requests with sequence numbers so stale responses are dropped
//! - **Payload forwarder**: [`PayloadForwarder`] parses a raw JSON buffer
//!   locally before anything is sent
//!
//! The state units never touch the network themselves. Requests go through a
//! [`MapperApi`] implementation: [`HttpApi`] on native targets, a `gloo`
//! based client in the browser UI.
//!
//! ## Example
//!
//! ```
//! use datamapper::{Listing, MappingBook};
//!
//! let mut book = MappingBook::new();
//! book.set_api_field("user_email");
//! book.set_db_field("");
//!
//! // Validation fails before any request could be made.
//! let errors = book.validate().unwrap_err();
//! assert_eq!(errors.db_field, Some("DB Field is required"));
//!
//! assert_eq!(book.listing(), Listing::Placeholder("No mappings available."));
//! ```

pub mod api;
pub mod config;
pub mod error;
#[cfg(feature = "native")]
pub mod http;
pub mod mappings;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod webhook;

pub use api::{Endpoint, MapperApi};
pub use config::ClientConfig;
pub use error::{ClientError, FieldErrors, ForwardError};
#[cfg(feature = "native")]
pub use http::HttpApi;
pub use mappings::{Listing, MappingBook};
pub use model::{FieldMapping, MappingId, NewFieldMapping, SchedulerFlag};
pub use report::{Flow, Notice, NoticeKind, Reporter, TracingReporter};
pub use scheduler::{FlagController, FlagState, RequestSequence, Settled, ToggleRequest};
pub use webhook::{Banner, PayloadForwarder, parse_payload};
