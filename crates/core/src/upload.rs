//! Upload policy for knowledge-share documents.

use std::path::Path;

use crate::error::CoreError;

/// Maximum accepted document size (50 MiB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Lower-case extensions (with leading dot) accepted for knowledge-share uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".zip", ".pdf", ".docx", ".csv", ".xlsx", ".xls", ".png", ".jpg", ".jpeg", ".mp4", ".mov",
    ".avi", ".mkv", ".wmv", ".flv", ".webm", ".3gp",
];

/// Return the normalised extension of `filename` if it is on the allow-list.
pub fn allowed_extension(filename: &str) -> Result<String, CoreError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation("Invalid file type".into()))
    }
}

/// Name under which an upload is stored: `<unix-millis>-<unique><ext>`.
///
/// Only the extension of the client-supplied name survives, so stored names
/// never contain path separators.
pub fn stored_file_name(unix_millis: i64, unique: &str, extension: &str) -> String {
    format!("{unix_millis}-{unique}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_listed_extensions_case_insensitively() {
        assert_eq!(allowed_extension("report.PDF").unwrap(), ".pdf");
        assert_eq!(allowed_extension("demo.final.mp4").unwrap(), ".mp4");
        assert_eq!(allowed_extension("clip.3gp").unwrap(), ".3gp");
    }

    #[test]
    fn rejects_unlisted_or_missing_extensions() {
        assert!(allowed_extension("payload.exe").is_err());
        assert!(allowed_extension("README").is_err());
        assert!(allowed_extension(".pdf").is_err());
    }

    #[test]
    fn stored_name_keeps_only_extension() {
        let name = stored_file_name(1_700_000_000_000, "abc", ".zip");
        assert_eq!(name, "1700000000000-abc.zip");
        assert!(!name.contains('/'));
    }
}
