use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubmissionTicket);

pub const SYNOPSIS_MAX_CHARS: usize = 500;
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_DOC: &str = "application/msword";
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MEDIA_TYPE_TEXT: &str = "text/plain";
pub const MEDIA_TYPE_MARKDOWN: &str = "text/markdown";
const MEDIA_TYPE_MARKDOWN_LEGACY: &str = "text/x-markdown";

/// Extensions the file picker offers. Matches the accepted media types.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "md"];

pub fn human_readable_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        return format!("{bytes} B");
    }
    if bytes < MB {
        return format_scaled_unit(bytes, KB, "KB");
    }
    if bytes < GB {
        return format_scaled_unit(bytes, MB, "MB");
    }
    format_scaled_unit(bytes, GB, "GB")
}

fn format_scaled_unit(bytes: u64, unit_size: u64, unit_label: &str) -> String {
    let value = bytes as f64 / unit_size as f64;
    let value_text = format!("{value:.1}");
    let compact_value = value_text.strip_suffix(".0").unwrap_or(&value_text);
    format!("{compact_value} {unit_label}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Genre {
    Fantasy,
    ScienceFiction,
    Mystery,
    Thriller,
    Romance,
    HistoricalFiction,
    YoungAdult,
    Childrens,
    Horror,
    Poetry,
}

impl Genre {
    /// Picker order.
    pub const ALL: [Genre; 10] = [
        Genre::Fantasy,
        Genre::ScienceFiction,
        Genre::Mystery,
        Genre::Thriller,
        Genre::Romance,
        Genre::HistoricalFiction,
        Genre::YoungAdult,
        Genre::Childrens,
        Genre::Horror,
        Genre::Poetry,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::Fantasy => "Fantasy",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Mystery => "Mystery",
            Genre::Thriller => "Thriller",
            Genre::Romance => "Romance",
            Genre::HistoricalFiction => "Historical Fiction",
            Genre::YoungAdult => "Young Adult",
            Genre::Childrens => "Children's",
            Genre::Horror => "Horror",
            Genre::Poetry => "Poetry",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown genre '{0}'")]
pub struct UnknownGenre(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown submission type '{0}' (expected 'story' or 'chapter')")]
pub struct UnknownSubmissionType(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Genre::ALL
            .into_iter()
            .find(|genre| genre.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownGenre(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionType {
    Story,
    Chapter,
}

impl SubmissionType {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionType::Story => "Complete Story",
            SubmissionType::Chapter => "Book Chapter",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = UnknownSubmissionType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "story" => Ok(SubmissionType::Story),
            "chapter" => Ok(SubmissionType::Chapter),
            _ => Err(UnknownSubmissionType(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Pdf,
    Word,
    PlainText,
    Markdown,
    Other,
}

impl MediaKind {
    /// Classifies a declared media type. Parameters are ignored and the
    /// comparison is case-insensitive.
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            MEDIA_TYPE_PDF => MediaKind::Pdf,
            MEDIA_TYPE_DOC | MEDIA_TYPE_DOCX => MediaKind::Word,
            MEDIA_TYPE_TEXT => MediaKind::PlainText,
            MEDIA_TYPE_MARKDOWN | MEDIA_TYPE_MARKDOWN_LEGACY => MediaKind::Markdown,
            _ => MediaKind::Other,
        }
    }

    pub fn is_accepted(self) -> bool {
        !matches!(self, MediaKind::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Pdf => "PDF",
            MediaKind::Word => "Word",
            MediaKind::PlainText => "Text",
            MediaKind::Markdown => "Markdown",
            MediaKind::Other => "Other",
        }
    }
}

/// Draft fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Title,
    Author,
    Genre,
    SubmissionType,
    Synopsis,
    Attachments,
}

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::Title,
        FieldId::Author,
        FieldId::Genre,
        FieldId::SubmissionType,
        FieldId::Synopsis,
        FieldId::Attachments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::Title => "title",
            FieldId::Author => "author",
            FieldId::Genre => "genre",
            FieldId::SubmissionType => "submissionType",
            FieldId::Synopsis => "synopsis",
            FieldId::Attachments => "attachments",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[default]
    Details,
    Files,
    Review,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Details, Step::Files, Step::Review];

    pub fn number(self) -> u8 {
        match self {
            Step::Details => 1,
            Step::Files => 2,
            Step::Review => 3,
        }
    }

    /// Capped at `Review`.
    pub fn next(self) -> Self {
        match self {
            Step::Details => Step::Files,
            Step::Files | Step::Review => Step::Review,
        }
    }

    /// Floored at `Details`.
    pub fn previous(self) -> Self {
        match self {
            Step::Details | Step::Files => Step::Details,
            Step::Review => Step::Files,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Details => "Story Details",
            Step::Files => "Upload Files",
            Step::Review => "Review & Submit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionPhase {
    #[default]
    Editing,
    Submitting,
    Succeeded,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionPhase::Editing => "editing",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
        };
        f.write_str(label)
    }
}
