//! `wifisurvey` - Record per-room Wi-Fi survey measurements
//!
//! This library provides the room record schema, form validation, the
//! session-scoped room store, and the table and chart projections used by
//! the `wsurvey` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod room;
pub mod session;
pub mod store;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormData, RoomEditor, Submission, SubmissionHandler, ValidationError};
pub use logging::init_logging;
pub use room::{Field, RequiredPolicy, Room, RoomId};
pub use session::Session;
pub use store::{RoomStore, Snapshot, SnapshotObserver};
