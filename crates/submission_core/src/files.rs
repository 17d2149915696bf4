//! Local file probing for the file-picking front ends.

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use shared::protocol::FileCandidate;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type implied by a file name's extension.
pub fn guess_media_type(name: impl AsRef<Path>) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}

pub fn candidate_from_path(path: &Path) -> Result<FileCandidate> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to read metadata for '{}'", path.display()))?;
    if !metadata.is_file() {
        return Err(anyhow!("'{}' is not a regular file", path.display()));
    }

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("'{}' has no usable file name", path.display()))?
        .to_string();

    Ok(FileCandidate {
        media_type: guess_media_type(&name),
        name,
        size_bytes: metadata.len(),
    })
}

/// Candidate for a file known only by name, declared type and, when the source
/// reports it, size. A blank declared type is replaced by the extension guess.
/// An unknown size is refused so the size limit is never skipped.
pub fn candidate_from_declared(
    name: &str,
    declared_type: &str,
    size_bytes: Option<u64>,
) -> Result<FileCandidate> {
    let size_bytes = size_bytes.ok_or_else(|| anyhow!("size of '{name}' is unknown"))?;
    let media_type = if declared_type.trim().is_empty() {
        guess_media_type(name)
    } else {
        declared_type.to_string()
    };
    Ok(FileCandidate::new(name, size_bytes, media_type))
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use shared::domain::{MediaKind, MEDIA_TYPE_DOCX};

    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("story_submission_{tag}_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn reads_name_size_and_media_type() {
        let dir = temp_dir("metadata");
        let path = dir.join("chapter-one.txt");
        fs::write(&path, b"It was a dark and stormy night.").expect("write");

        let candidate = candidate_from_path(&path).expect("candidate");
        assert_eq!(candidate.name, "chapter-one.txt");
        assert_eq!(candidate.size_bytes, 31);
        assert_eq!(candidate.media_kind(), MediaKind::PlainText);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn directories_are_not_candidates() {
        let dir = temp_dir("dir");
        let err = candidate_from_path(&dir).expect_err("directory rejected");
        assert!(err.to_string().contains("not a regular file"));
        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = temp_dir("missing");
        let path = dir.join("nope.pdf");
        let err = candidate_from_path(&path).expect_err("missing file");
        assert!(err.to_string().contains("nope.pdf"));
        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn guesses_accepted_extensions() {
        assert_eq!(guess_media_type("story.pdf"), "application/pdf");
        assert_eq!(guess_media_type("story.doc"), "application/msword");
        assert_eq!(guess_media_type("story.docx"), MEDIA_TYPE_DOCX);
        assert_eq!(guess_media_type("story.txt"), "text/plain");
        assert_eq!(
            MediaKind::from_media_type(&guess_media_type("story.md")),
            MediaKind::Markdown
        );
        assert_eq!(guess_media_type("no_extension"), FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn blank_declared_type_falls_back_to_extension() {
        let candidate = candidate_from_declared("draft.pdf", "", Some(10)).expect("candidate");
        assert_eq!(candidate.media_kind(), MediaKind::Pdf);

        let declared =
            candidate_from_declared("draft.pdf", "image/png", Some(10)).expect("candidate");
        assert_eq!(declared.media_kind(), MediaKind::Other);
    }

    #[test]
    fn unknown_size_is_refused() {
        let err = candidate_from_declared("chapter.md", "text/markdown", None)
            .expect_err("size required");
        assert!(err.to_string().contains("chapter.md"));
        assert!(err.to_string().contains("unknown"));
    }
}
