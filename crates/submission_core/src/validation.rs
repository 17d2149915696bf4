//! Per-step validation rules. Everything here is a pure function of the draft.

use shared::{
    domain::{FieldId, Step, SYNOPSIS_MAX_CHARS},
    error::ValidationErrors,
    protocol::SubmissionDraft,
};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const AUTHOR_REQUIRED: &str = "Author name is required";
pub const GENRE_REQUIRED: &str = "Please select a genre";
pub const SUBMISSION_TYPE_REQUIRED: &str = "Please select a submission type";
pub const SYNOPSIS_REQUIRED: &str = "Synopsis is required";
pub const SYNOPSIS_TOO_LONG: &str = "Synopsis must be less than 500 characters";
pub const ATTACHMENTS_REQUIRED: &str = "Please upload at least one file";

pub fn validate_step(draft: &SubmissionDraft, step: Step) -> ValidationErrors {
    match step {
        Step::Details => validate_details(draft),
        Step::Files => validate_files(draft),
        Step::Review => ValidationErrors::new(),
    }
}

/// Union of the details and files rules; review adds nothing.
pub fn validate_all(draft: &SubmissionDraft) -> ValidationErrors {
    validate_details(draft).merge(validate_files(draft))
}

fn validate_details(draft: &SubmissionDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert(FieldId::Title, TITLE_REQUIRED);
    }
    if draft.author.trim().is_empty() {
        errors.insert(FieldId::Author, AUTHOR_REQUIRED);
    }
    if draft.genre.is_none() {
        errors.insert(FieldId::Genre, GENRE_REQUIRED);
    }
    if draft.submission_type.is_none() {
        errors.insert(FieldId::SubmissionType, SUBMISSION_TYPE_REQUIRED);
    }

    // The length rule only runs once the synopsis is non-blank.
    if draft.synopsis.trim().is_empty() {
        errors.insert(FieldId::Synopsis, SYNOPSIS_REQUIRED);
    } else if synopsis_len(&draft.synopsis) > SYNOPSIS_MAX_CHARS {
        errors.insert(FieldId::Synopsis, SYNOPSIS_TOO_LONG);
    }

    errors
}

fn validate_files(draft: &SubmissionDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if draft.attachments.is_empty() {
        errors.insert(FieldId::Attachments, ATTACHMENTS_REQUIRED);
    }
    errors
}

/// Length as shown by the synopsis counter.
pub fn synopsis_len(synopsis: &str) -> usize {
    synopsis.chars().count()
}

#[cfg(test)]
mod tests {
    use shared::{
        domain::{Genre, SubmissionType},
        protocol::{Attachment, FileCandidate},
    };

    use super::*;

    fn details_ok() -> SubmissionDraft {
        SubmissionDraft {
            title: "The Long Walk".into(),
            author: "J. Doe".into(),
            genre: Some(Genre::Fantasy),
            submission_type: Some(SubmissionType::Story),
            synopsis: "A tale.".into(),
            attachments: Vec::new(),
        }
    }

    fn attachment(name: &str) -> Attachment {
        Attachment::from_candidate(FileCandidate::new(name, 512, "text/plain"))
            .expect("plain text accepted")
    }

    #[test]
    fn empty_draft_reports_every_details_field() {
        let errors = validate_step(&SubmissionDraft::default(), Step::Details);

        assert_eq!(errors.get(FieldId::Title), Some(TITLE_REQUIRED));
        assert_eq!(errors.get(FieldId::Author), Some(AUTHOR_REQUIRED));
        assert_eq!(errors.get(FieldId::Genre), Some(GENRE_REQUIRED));
        assert_eq!(
            errors.get(FieldId::SubmissionType),
            Some(SUBMISSION_TYPE_REQUIRED)
        );
        assert_eq!(errors.get(FieldId::Synopsis), Some(SYNOPSIS_REQUIRED));
        assert!(!errors.contains(FieldId::Attachments));
    }

    #[test]
    fn whitespace_only_text_counts_as_missing() {
        let mut draft = details_ok();
        draft.title = "   ".into();
        draft.author = "\t\n".into();
        draft.synopsis = "  ".into();

        let errors = validate_step(&draft, Step::Details);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![FieldId::Title, FieldId::Author, FieldId::Synopsis]
        );
    }

    #[test]
    fn valid_details_without_files_only_fail_files_step() {
        let draft = details_ok();

        assert!(validate_step(&draft, Step::Details).is_empty());
        let files = validate_step(&draft, Step::Files);
        assert_eq!(files.len(), 1);
        assert_eq!(files.get(FieldId::Attachments), Some(ATTACHMENTS_REQUIRED));
    }

    #[test]
    fn overlong_synopsis_reports_only_length_error() {
        let mut draft = details_ok();
        draft.synopsis = "x".repeat(501);

        let errors = validate_step(&draft, Step::Details);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldId::Synopsis), Some(SYNOPSIS_TOO_LONG));
    }

    #[test]
    fn synopsis_at_limit_is_valid_and_counts_characters() {
        let mut draft = details_ok();
        draft.synopsis = "x".repeat(500);
        assert!(validate_step(&draft, Step::Details).is_empty());

        // Multi-byte characters count once each.
        draft.synopsis = "é".repeat(500);
        assert!(validate_step(&draft, Step::Details).is_empty());
        draft.synopsis.push('é');
        assert_eq!(
            validate_step(&draft, Step::Details).get(FieldId::Synopsis),
            Some(SYNOPSIS_TOO_LONG)
        );
    }

    #[test]
    fn review_step_has_no_rules() {
        assert!(validate_step(&SubmissionDraft::default(), Step::Review).is_empty());
    }

    #[test]
    fn validate_all_is_union_of_details_and_files() {
        let mut draft = SubmissionDraft::default();
        let all = validate_all(&draft);
        let union = validate_step(&draft, Step::Details).merge(validate_step(&draft, Step::Files));
        assert_eq!(all, union);
        assert_eq!(all.len(), 6);

        draft = details_ok();
        draft.attachments.push(attachment("story.txt"));
        assert!(validate_all(&draft).is_empty());
    }
}
