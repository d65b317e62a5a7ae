//! Room form dialog state.
//!
//! The editor tracks whether the form is closed, open for a new room, or open
//! on an existing room, and routes submissions to the create or update path.

use tracing::debug;

use super::submission::{FormData, Submission, SubmissionHandler, ValidationError};
use crate::room::{FieldValues, Room, RoomId};

/// What the form is currently doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    /// The form is not shown.
    #[default]
    Closed,
    /// The form is open for a new room.
    Creating,
    /// The form is open on an existing room.
    Editing {
        /// The room being edited.
        id: RoomId,
        /// Copy of the room's values at the time editing began.
        prefill: FieldValues,
    },
}

/// The add/edit room dialog.
#[derive(Debug, Default)]
pub struct RoomEditor {
    state: EditorState,
    handler: SubmissionHandler,
}

impl RoomEditor {
    /// Create a closed editor validating with `handler`.
    #[must_use]
    pub fn new(handler: SubmissionHandler) -> Self {
        Self {
            state: EditorState::Closed,
            handler,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Whether the form is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    /// Id of the room being edited, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<RoomId> {
        match &self.state {
            EditorState::Editing { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Values the form starts with: the edited room's, or blanks.
    #[must_use]
    pub fn prefill(&self) -> FieldValues {
        match &self.state {
            EditorState::Editing { prefill, .. } => prefill.clone(),
            _ => FieldValues::default(),
        }
    }

    /// Open the form for a new room.
    pub fn open_create(&mut self) {
        self.state = EditorState::Creating;
    }

    /// Open the form on `room`.
    pub fn open_edit(&mut self, room: &Room) {
        debug!(id = %room.id, "Editing room");
        self.state = EditorState::Editing {
            id: room.id,
            prefill: room.values(),
        };
    }

    /// Close the form, forgetting any room being edited.
    pub fn close(&mut self) {
        self.state = EditorState::Closed;
    }

    /// Submit the form.
    ///
    /// On success the form closes. On failure it stays open in the same
    /// state so the user can complete it.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if required fields are missing.
    pub fn submit(&mut self, form: &FormData) -> Result<Submission, ValidationError> {
        let submission = self.handler.handle(form, self.editing_id())?;
        self.close();
        Ok(submission)
    }
}
