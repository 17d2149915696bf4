//! Submission backend capability. The controller only sees the trait.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::protocol::{SubmissionDraft, SubmissionReceipt};
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait SubmissionBackend: Send + Sync {
    async fn submit(&self, draft: SubmissionDraft) -> Result<SubmissionReceipt>;
}

/// Accepts every draft after a fixed delay.
pub struct SimulatedSubmissionBackend {
    delay: Duration,
}

impl SimulatedSubmissionBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SubmissionBackend for SimulatedSubmissionBackend {
    async fn submit(&self, draft: SubmissionDraft) -> Result<SubmissionReceipt> {
        tokio::time::sleep(self.delay).await;

        let receipt = receipt_for(&draft);
        info!(
            reference = %receipt.reference,
            attachments = receipt.attachment_count,
            "simulated backend accepted submission"
        );
        Ok(receipt)
    }
}

pub fn receipt_for(draft: &SubmissionDraft) -> SubmissionReceipt {
    SubmissionReceipt {
        reference: Uuid::new_v4(),
        accepted_at: Utc::now(),
        title: draft.title.trim().to_string(),
        author: draft.author.trim().to_string(),
        attachment_count: draft.attachments.len(),
    }
}
