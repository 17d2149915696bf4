use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        human_readable_bytes, FieldId, Genre, MediaKind, Step, SubmissionPhase, SubmissionTicket,
        SubmissionType,
    },
    error::ValidationErrors,
};

/// File metadata as reported by the picking collaborator, before admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: media_type.into(),
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_media_type(&self.media_type)
    }
}

/// An admitted file. Only [`Attachment::from_candidate`] builds one, so the
/// media kind always matches the declared type and is in the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    name: String,
    size_bytes: u64,
    media_kind: MediaKind,
    media_type: String,
}

impl Attachment {
    /// `None` when the candidate's media type is outside the accepted set.
    pub fn from_candidate(candidate: FileCandidate) -> Option<Self> {
        let media_kind = candidate.media_kind();
        if !media_kind.is_accepted() {
            return None;
        }
        Some(Self {
            name: candidate.name,
            size_bytes: candidate.size_bytes,
            media_kind,
            media_type: candidate.media_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Re-derives the kind from the declared type. Catches values that came in
    /// through deserialization rather than admission.
    pub fn is_consistent(&self) -> bool {
        let derived = MediaKind::from_media_type(&self.media_type);
        derived == self.media_kind && derived.is_accepted()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub title: String,
    pub author: String,
    pub genre: Option<Genre>,
    pub submission_type: Option<SubmissionType>,
    pub synopsis: String,
    pub attachments: Vec<Attachment>,
}

/// One draft field together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Title(String),
    Author(String),
    Genre(Option<Genre>),
    SubmissionType(Option<SubmissionType>),
    Synopsis(String),
    Attachments(Vec<Attachment>),
}

impl FieldUpdate {
    pub fn field(&self) -> FieldId {
        match self {
            FieldUpdate::Title(_) => FieldId::Title,
            FieldUpdate::Author(_) => FieldId::Author,
            FieldUpdate::Genre(_) => FieldId::Genre,
            FieldUpdate::SubmissionType(_) => FieldId::SubmissionType,
            FieldUpdate::Synopsis(_) => FieldId::Synopsis,
            FieldUpdate::Attachments(_) => FieldId::Attachments,
        }
    }

    pub fn apply(self, draft: &mut SubmissionDraft) {
        match self {
            FieldUpdate::Title(value) => draft.title = value,
            FieldUpdate::Author(value) => draft.author = value,
            FieldUpdate::Genre(value) => draft.genre = value,
            FieldUpdate::SubmissionType(value) => draft.submission_type = value,
            FieldUpdate::Synopsis(value) => draft.synopsis = value,
            FieldUpdate::Attachments(value) => draft.attachments = value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TouchedSet(BTreeSet<FieldId>);

impl TouchedSet {
    /// Returns `true` when the field was not touched before.
    pub fn insert(&mut self, field: FieldId) -> bool {
        self.0.insert(field)
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RejectionReason {
    UnsupportedMediaType,
    TooLarge { limit_bytes: u64 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnsupportedMediaType => f.write_str("unsupported media type"),
            RejectionReason::TooLarge { limit_bytes } => {
                write!(f, "larger than {}", human_readable_bytes(*limit_bytes))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub reason: RejectionReason,
}

pub const UNSUPPORTED_FILES_WARNING: &str =
    "Some files were not accepted. We only accept PDF, DOC, DOCX, TXT and MD files.";

/// Outcome of one `admit_files` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReport {
    pub admitted: usize,
    pub rejected: Vec<RejectedFile>,
}

impl AdmissionReport {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// Transient warning for the caller; `None` when every file was admitted.
    pub fn warning(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self
            .rejected
            .iter()
            .any(|file| file.reason == RejectionReason::UnsupportedMediaType)
        {
            parts.push(UNSUPPORTED_FILES_WARNING.to_string());
        }

        let oversized: Vec<&RejectedFile> = self
            .rejected
            .iter()
            .filter(|file| matches!(file.reason, RejectionReason::TooLarge { .. }))
            .collect();
        if let Some(first) = oversized.first() {
            if let RejectionReason::TooLarge { limit_bytes } = first.reason {
                let names: Vec<&str> = oversized.iter().map(|file| file.name.as_str()).collect();
                parts.push(format!(
                    "Files larger than {} were not accepted: {}.",
                    human_readable_bytes(limit_bytes),
                    names.join(", ")
                ));
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference: Uuid,
    pub accepted_at: DateTime<Utc>,
    pub title: String,
    pub author: String,
    pub attachment_count: usize,
}

/// Handed out when a submission starts; the ticket must come back with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub draft: SubmissionDraft,
}

/// Read-only view of the workflow published after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub draft: SubmissionDraft,
    pub touched: TouchedSet,
    pub step: Step,
    pub phase: SubmissionPhase,
    pub visible_errors: ValidationErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_submission_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MEDIA_TYPE_PDF;

    #[test]
    fn rejects_candidates_outside_accepted_set() {
        let image = FileCandidate::new("cover.png", 2048, "image/png");
        assert!(Attachment::from_candidate(image).is_none());

        let pdf = FileCandidate::new("story.pdf", 2048, MEDIA_TYPE_PDF);
        let attachment = Attachment::from_candidate(pdf).expect("pdf accepted");
        assert_eq!(attachment.media_kind(), MediaKind::Pdf);
        assert_eq!(attachment.name(), "story.pdf");
        assert!(attachment.is_consistent());
    }

    #[test]
    fn warning_mentions_type_and_size_rejections() {
        let report = AdmissionReport {
            admitted: 1,
            rejected: vec![
                RejectedFile {
                    name: "cover.png".into(),
                    media_type: "image/png".into(),
                    size_bytes: 10,
                    reason: RejectionReason::UnsupportedMediaType,
                },
                RejectedFile {
                    name: "huge.pdf".into(),
                    media_type: MEDIA_TYPE_PDF.into(),
                    size_bytes: 20 * 1024 * 1024,
                    reason: RejectionReason::TooLarge {
                        limit_bytes: 10 * 1024 * 1024,
                    },
                },
            ],
        };

        let warning = report.warning().expect("warning");
        assert!(warning.starts_with(UNSUPPORTED_FILES_WARNING));
        assert!(warning.contains("larger than 10 MB"));
        assert!(warning.contains("huge.pdf"));
        assert_eq!(AdmissionReport::default().warning(), None);
    }

    #[test]
    fn size_warning_keeps_sub_megabyte_limits_readable() {
        let report = AdmissionReport {
            admitted: 0,
            rejected: vec![RejectedFile {
                name: "draft.txt".into(),
                media_type: "text/plain".into(),
                size_bytes: 600 * 1024,
                reason: RejectionReason::TooLarge {
                    limit_bytes: 512 * 1024,
                },
            }],
        };

        let warning = report.warning().expect("warning");
        assert!(warning.contains("larger than 512 KB"), "{warning}");
    }

    #[test]
    fn deserialized_attachment_with_mismatched_kind_is_inconsistent() {
        let forged: Attachment = serde_json::from_value(serde_json::json!({
            "name": "cover.png",
            "sizeBytes": 10,
            "mediaKind": "pdf",
            "mediaType": "image/png",
        }))
        .expect("deserialize");
        assert!(!forged.is_consistent());
    }

    #[test]
    fn contract_types_serialize_with_camel_case_keys() {
        let attachment =
            Attachment::from_candidate(FileCandidate::new("a.md", 3, "text/markdown")).expect("md");
        let snapshot = WorkflowSnapshot {
            draft: SubmissionDraft {
                submission_type: Some(SubmissionType::Chapter),
                attachments: vec![attachment],
                ..SubmissionDraft::default()
            },
            ..WorkflowSnapshot::default()
        };
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(json["draft"]["submissionType"], "chapter");
        assert_eq!(json["draft"]["attachments"][0]["sizeBytes"], 3);
        assert_eq!(json["draft"]["attachments"][0]["mediaKind"], "markdown");
        assert!(json.get("visibleErrors").is_some());

        let reason = serde_json::to_value(RejectionReason::TooLarge { limit_bytes: 1 })
            .expect("serialize");
        assert_eq!(reason["tooLarge"]["limitBytes"], 1);
    }

    #[test]
    fn field_update_targets_matching_field() {
        let mut draft = SubmissionDraft::default();
        let update = FieldUpdate::Genre(Some(Genre::Horror));
        assert_eq!(update.field(), FieldId::Genre);
        update.apply(&mut draft);
        assert_eq!(draft.genre, Some(Genre::Horror));
    }
}
