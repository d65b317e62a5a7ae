//! Form submission handling.
//!
//! Turns a submitted name/value multimap into a normalized [`Room`], checking
//! required fields along the way.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::room::{Field, FieldValues, RequiredPolicy, Room, RoomId};

/// Title of the notice shown when a submission is rejected.
pub const MISSING_FIELDS_TITLE: &str = "Preencha todos os campos";

/// Submitted form state: field names and values in submission order.
///
/// A name may appear more than once; the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Create an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The submission a form prefilled with `values` produces untouched.
    #[must_use]
    pub fn from_values(values: &FieldValues) -> Self {
        values
            .iter()
            .map(|(field, value)| (field.key(), value))
            .collect()
    }

    /// Append a name/value pair.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Set `name` to `value`, dropping earlier occurrences.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, value.into()));
    }

    /// The effective value of `name`, if it was submitted at all.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over all submitted pairs in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of submitted pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// A submission was rejected because required fields were left empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Campos faltando: {}", join_labels(.missing))]
pub struct ValidationError {
    missing: Vec<Field>,
}

impl ValidationError {
    /// The missing fields, in form order.
    #[must_use]
    pub fn missing(&self) -> &[Field] {
        &self.missing
    }

    /// Labels of the missing fields, in form order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.missing.iter().map(|field| field.label()).collect()
    }

    /// The full list of missing labels as shown to the user.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// The notice to surface for this failure.
    #[must_use]
    pub fn notice(&self) -> Notice {
        Notice {
            title: MISSING_FIELDS_TITLE.to_string(),
            description: self.description(),
            variant: NoticeVariant::Destructive,
        }
    }
}

fn join_labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    /// Informational.
    #[default]
    Default,
    /// Something the user must fix.
    Destructive,
}

/// A user-facing message with a title and a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Short headline.
    pub title: String,
    /// Details.
    pub description: String,
    /// How prominently to show it.
    pub variant: NoticeVariant,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Whether a submission creates a record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    /// No editing id: a fresh record.
    Create,
    /// Edit of an existing record, keeping its id.
    Update,
}

/// A validated, normalized record ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The normalized record.
    pub room: Room,
    /// Create or update.
    pub kind: SubmitKind,
}

/// Validates form submissions against a [`RequiredPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionHandler {
    policy: RequiredPolicy,
}

impl SubmissionHandler {
    /// Create a handler enforcing `policy`.
    #[must_use]
    pub fn new(policy: RequiredPolicy) -> Self {
        Self { policy }
    }

    /// The policy in force.
    #[must_use]
    pub fn policy(&self) -> RequiredPolicy {
        self.policy
    }

    /// Check required fields and collect the declared field values.
    ///
    /// An absent field and a field submitted empty are treated the same.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every required field left empty.
    pub fn validate(&self, form: &FormData) -> Result<FieldValues, ValidationError> {
        for (name, _) in form.entries() {
            if Field::from_key(name).is_none() {
                debug!(field = %name, "Ignoring undeclared form field");
            }
        }

        let mut values = FieldValues::default();
        let mut missing = Vec::new();
        for field in Field::ALL {
            let value = form.get(field.key()).unwrap_or_default();
            if value.is_empty() && self.policy.is_required(field) {
                missing.push(field);
            }
            values.set(field, value);
        }

        if missing.is_empty() {
            Ok(values)
        } else {
            debug!(missing = missing.len(), "Rejecting submission");
            Err(ValidationError { missing })
        }
    }

    /// Validate `form` and build the record it describes.
    ///
    /// With an `editing` id the record keeps that id; otherwise a fresh one
    /// is generated.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if required fields are missing. No record
    /// is produced in that case.
    pub fn handle(
        &self,
        form: &FormData,
        editing: Option<RoomId>,
    ) -> Result<Submission, ValidationError> {
        let values = self.validate(form)?;
        let (id, kind) = match editing {
            Some(id) => (id, SubmitKind::Update),
            None => (RoomId::generate(), SubmitKind::Create),
        };
        trace!(%id, ?kind, "Accepted submission");
        Ok(Submission {
            room: Room::from_values(id, &values),
            kind,
        })
    }
}
