//! Backend commands queued from UI to backend worker.

use shared::{domain::SubmissionTicket, protocol::SubmissionDraft};

pub enum BackendCommand {
    Submit {
        ticket: SubmissionTicket,
        draft: SubmissionDraft,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Submit { .. } => "submit",
        }
    }
}
