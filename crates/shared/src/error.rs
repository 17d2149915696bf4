use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{FieldId, SubmissionPhase, SubmissionTicket},
    protocol::RejectionReason,
};

/// Field validation failures keyed by field. A missing key means the field is
/// currently valid. Iteration follows form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<FieldId, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldId, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.0.keys().copied()
    }

    /// Later entries win on key collisions.
    pub fn merge(mut self, other: ValidationErrors) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn retain(&mut self, mut keep: impl FnMut(FieldId) -> bool) {
        self.0.retain(|field, _| keep(*field));
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.values().map(String::as_str).collect()
    }
}

impl FromIterator<(FieldId, String)> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = (FieldId, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("validation failed: {}", .0.messages().join("; "))]
    Validation(ValidationErrors),
    #[error("the form cannot be changed while {phase}")]
    Locked { phase: SubmissionPhase },
    #[error("submission {ticket} is no longer current")]
    StaleSubmission { ticket: SubmissionTicket },
    #[error("attachment '{name}' was not accepted: {reason}")]
    AttachmentRejected {
        name: String,
        reason: RejectionReason,
    },
    #[error("submission backend failed: {0}")]
    Backend(String),
}

impl WorkflowError {
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            WorkflowError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
