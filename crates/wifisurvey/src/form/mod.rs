//! Room form handling.
//!
//! This module validates submitted room forms and tracks the add/edit
//! dialog that produces them.

mod editor;
mod submission;

pub use editor::{EditorState, RoomEditor};
pub use submission::{
    FormData, Notice, NoticeVariant, SubmitKind, Submission, SubmissionHandler, ValidationError,
    MISSING_FIELDS_TITLE,
};
