//! Backend worker events and error modeling for the desktop wizard.

use shared::{domain::SubmissionTicket, protocol::SubmissionReceipt};

pub enum UiEvent {
    Info(String),
    SubmissionFinished {
        ticket: SubmissionTicket,
        outcome: Result<SubmissionReceipt, String>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Filesystem,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FilePicking,
    Submission,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("required")
            || message_lower.contains("please select")
            || message_lower.contains("please upload")
            || message_lower.contains("must be less than")
            || message_lower.contains("not accepted")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("metadata")
            || message_lower.contains("not a regular file")
            || message_lower.contains("no such file")
            || message_lower.contains("permission denied")
        {
            UiErrorCategory::Filesystem
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Worth a retry of the same action without changing the form.
    pub fn is_retryable(&self) -> bool {
        self.category == UiErrorCategory::Transport
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Submission service",
        UiErrorCategory::Filesystem => "File",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
