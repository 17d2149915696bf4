use std::sync::Arc;

use shared::{
    domain::{FieldId, Step, SubmissionPhase, SubmissionTicket},
    error::{ValidationErrors, WorkflowError},
    protocol::{
        AdmissionReport, Attachment, FieldUpdate, FileCandidate, PendingSubmission, RejectedFile,
        RejectionReason, SubmissionDraft, SubmissionReceipt, TouchedSet, WorkflowSnapshot,
    },
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod backend;
pub mod config;
pub mod files;
pub mod validation;

pub use backend::{SimulatedSubmissionBackend, SubmissionBackend};
pub use config::{load_settings, Settings};

/// Owns the state of one submission session.
///
/// Every mutation goes through `&mut self`, so a front end that holds the
/// controller is the only writer. After each successful mutation a fresh
/// [`WorkflowSnapshot`] is published to subscribers.
pub struct WorkflowController {
    settings: Settings,
    backend: Arc<dyn SubmissionBackend>,
    draft: SubmissionDraft,
    touched: TouchedSet,
    step: Step,
    phase: SubmissionPhase,
    receipt: Option<SubmissionReceipt>,
    last_submission_error: Option<String>,
    in_flight: Option<SubmissionTicket>,
    next_ticket: u64,
    snapshots: watch::Sender<WorkflowSnapshot>,
}

impl WorkflowController {
    pub fn new(settings: Settings, backend: Arc<dyn SubmissionBackend>) -> Self {
        let (snapshots, _) = watch::channel(WorkflowSnapshot::default());
        Self {
            settings,
            backend,
            draft: SubmissionDraft::default(),
            touched: TouchedSet::default(),
            step: Step::Details,
            phase: SubmissionPhase::Editing,
            receipt: None,
            last_submission_error: None,
            in_flight: None,
            next_ticket: 1,
            snapshots,
        }
    }

    /// Controller backed by [`SimulatedSubmissionBackend`] using the configured delay.
    pub fn with_simulated_backend(settings: Settings) -> Self {
        let backend = Arc::new(SimulatedSubmissionBackend::new(settings.submit_delay()));
        Self::new(settings, backend)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> Arc<dyn SubmissionBackend> {
        Arc::clone(&self.backend)
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn touched(&self) -> &TouchedSet {
        &self.touched
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn last_submission_error(&self) -> Option<&str> {
        self.last_submission_error.as_deref()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            draft: self.draft.clone(),
            touched: self.touched.clone(),
            step: self.step,
            phase: self.phase,
            visible_errors: self.visible_errors(),
            receipt: self.receipt.clone(),
            last_submission_error: self.last_submission_error.clone(),
        }
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.snapshots.send_replace(self.snapshot());
        self.snapshots.subscribe()
    }

    /// Replacement attachment lists go through the same type and size checks as
    /// [`admit_files`](Self::admit_files); any refusal leaves the draft untouched.
    pub fn update_field(&mut self, update: FieldUpdate) -> Result<(), WorkflowError> {
        self.ensure_editing()?;
        if let FieldUpdate::Attachments(attachments) = &update {
            for attachment in attachments {
                self.check_attachment(attachment)?;
            }
        }
        let field = update.field();
        update.apply(&mut self.draft);
        debug!(field = %field, "draft field updated");
        self.publish();
        Ok(())
    }

    pub fn mark_touched(&mut self, field: FieldId) -> Result<(), WorkflowError> {
        self.ensure_editing()?;
        if self.touched.insert(field) {
            debug!(field = %field, "field touched");
            self.publish();
        }
        Ok(())
    }

    pub fn validate_step(&self, step: Step) -> ValidationErrors {
        validation::validate_step(&self.draft, step)
    }

    pub fn validate_all(&self) -> ValidationErrors {
        validation::validate_all(&self.draft)
    }

    /// `None` checks every step.
    pub fn is_valid(&self, step: Option<Step>) -> bool {
        match step {
            Some(step) => self.validate_step(step).is_empty(),
            None => self.validate_all().is_empty(),
        }
    }

    /// Errors for touched fields only.
    pub fn visible_errors(&self) -> ValidationErrors {
        let mut errors = self.validate_all();
        errors.retain(|field| self.touched.contains(field));
        errors
    }

    pub fn visible_error(&self, field: FieldId) -> Option<String> {
        if !self.touched.contains(field) {
            return None;
        }
        self.validate_all().get(field).map(str::to_string)
    }

    pub fn advance_step(&mut self) -> Result<Step, WorkflowError> {
        self.ensure_editing()?;
        let errors = self.validate_step(self.step);
        if !errors.is_empty() {
            info!(step = %self.step, failures = errors.len(), "step advance blocked");
            return Err(WorkflowError::Validation(errors));
        }

        let next = self.step.next();
        if next != self.step {
            info!(from = %self.step, to = %next, "advanced step");
            self.step = next;
            self.publish();
        }
        Ok(self.step)
    }

    pub fn retreat_step(&mut self) -> Result<Step, WorkflowError> {
        self.ensure_editing()?;
        let previous = self.step.previous();
        if previous != self.step {
            info!(from = %self.step, to = %previous, "retreated step");
            self.step = previous;
            self.publish();
        }
        Ok(self.step)
    }

    /// Appends the acceptable candidates in order and reports the rest.
    pub fn admit_files(
        &mut self,
        candidates: impl IntoIterator<Item = FileCandidate>,
    ) -> Result<AdmissionReport, WorkflowError> {
        self.ensure_editing()?;
        let limit = self.settings.attachment_limit();
        let mut report = AdmissionReport::default();

        for candidate in candidates {
            if !candidate.media_kind().is_accepted() {
                report
                    .rejected
                    .push(rejected(candidate, RejectionReason::UnsupportedMediaType));
                continue;
            }
            if let Some(limit_bytes) = limit {
                if candidate.size_bytes > limit_bytes {
                    report.rejected.push(rejected(
                        candidate,
                        RejectionReason::TooLarge { limit_bytes },
                    ));
                    continue;
                }
            }

            if let Some(attachment) = Attachment::from_candidate(candidate) {
                self.draft.attachments.push(attachment);
                report.admitted += 1;
            }
        }

        if report.has_rejections() {
            warn!(
                admitted = report.admitted,
                rejected = report.rejected.len(),
                "some files were not accepted"
            );
        } else {
            debug!(admitted = report.admitted, "files admitted");
        }

        self.touched.insert(FieldId::Attachments);
        self.publish();
        Ok(report)
    }

    /// Out-of-range indexes leave the list untouched and return `None`.
    pub fn remove_attachment(&mut self, index: usize) -> Result<Option<Attachment>, WorkflowError> {
        self.ensure_editing()?;
        if index >= self.draft.attachments.len() {
            warn!(
                index,
                len = self.draft.attachments.len(),
                "ignoring out-of-range attachment removal"
            );
            return Ok(None);
        }

        let removed = self.draft.attachments.remove(index);
        self.touched.insert(FieldId::Attachments);
        debug!(index, name = %removed.name(), "attachment removed");
        self.publish();
        Ok(Some(removed))
    }

    /// First half of a submission: validate everything and enter `Submitting`.
    ///
    /// An invalid draft changes nothing and the errors come back to the caller.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, WorkflowError> {
        self.ensure_editing()?;
        let errors = self.validate_all();
        if !errors.is_empty() {
            info!(failures = errors.len(), "submission blocked by validation");
            return Err(WorkflowError::Validation(errors));
        }

        let ticket = SubmissionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.phase = SubmissionPhase::Submitting;
        self.last_submission_error = None;
        info!(ticket = %ticket, phase = %self.phase, "submission started");
        self.publish();

        Ok(PendingSubmission {
            ticket,
            draft: self.draft.clone(),
        })
    }

    /// Second half of a submission: apply the backend outcome for `ticket`.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: anyhow::Result<SubmissionReceipt>,
    ) -> Result<SubmissionReceipt, WorkflowError> {
        if self.phase != SubmissionPhase::Submitting || self.in_flight != Some(ticket) {
            warn!(ticket = %ticket, phase = %self.phase, "ignoring stale submission outcome");
            return Err(WorkflowError::StaleSubmission { ticket });
        }
        self.in_flight = None;

        match outcome {
            Ok(receipt) => {
                self.phase = SubmissionPhase::Succeeded;
                self.receipt = Some(receipt.clone());
                info!(
                    ticket = %ticket,
                    reference = %receipt.reference,
                    phase = %self.phase,
                    "submission accepted"
                );
                self.publish();
                Ok(receipt)
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(ticket = %ticket, "submission failed: {message}");
                self.phase = SubmissionPhase::Editing;
                self.last_submission_error = Some(message.clone());
                self.publish();
                Err(WorkflowError::Backend(message))
            }
        }
    }

    /// Abandons the in-flight submission and returns to editing with the draft intact.
    pub fn cancel_submission(&mut self) -> Result<(), WorkflowError> {
        if self.phase != SubmissionPhase::Submitting {
            return Err(WorkflowError::Locked { phase: self.phase });
        }
        if let Some(ticket) = self.in_flight.take() {
            info!(ticket = %ticket, "submission cancelled");
        }
        self.phase = SubmissionPhase::Editing;
        self.publish();
        Ok(())
    }

    /// Runs a whole submission against the injected backend.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, WorkflowError> {
        let pending = self.begin_submission()?;
        let backend = Arc::clone(&self.backend);
        let outcome = backend.submit(pending.draft).await;
        self.complete_submission(pending.ticket, outcome)
    }

    /// Back to an empty draft on step one. Any in-flight ticket becomes stale.
    pub fn reset_form(&mut self) {
        self.draft = SubmissionDraft::default();
        self.touched = TouchedSet::default();
        self.step = Step::Details;
        self.phase = SubmissionPhase::Editing;
        self.receipt = None;
        self.last_submission_error = None;
        self.in_flight = None;
        info!("form reset");
        self.publish();
    }

    fn check_attachment(&self, attachment: &Attachment) -> Result<(), WorkflowError> {
        let reason = if !attachment.is_consistent() {
            Some(RejectionReason::UnsupportedMediaType)
        } else {
            self.settings
                .attachment_limit()
                .filter(|limit_bytes| attachment.size_bytes() > *limit_bytes)
                .map(|limit_bytes| RejectionReason::TooLarge { limit_bytes })
        };
        match reason {
            Some(reason) => {
                warn!(name = %attachment.name(), %reason, "refusing attachment update");
                Err(WorkflowError::AttachmentRejected {
                    name: attachment.name().to_string(),
                    reason,
                })
            }
            None => Ok(()),
        }
    }

    fn ensure_editing(&self) -> Result<(), WorkflowError> {
        match self.phase {
            SubmissionPhase::Editing => Ok(()),
            phase => Err(WorkflowError::Locked { phase }),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

fn rejected(candidate: FileCandidate, reason: RejectionReason) -> RejectedFile {
    RejectedFile {
        name: candidate.name,
        media_type: candidate.media_type,
        size_bytes: candidate.size_bytes,
        reason,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
