//! File storage for assignment submissions.
//!
//! Uploaded files are written under the configured upload directory,
//! namespaced per assignment and user so submissions never collide:
//! `{upload_dir}/assignment_{id}/user_{id}/{millis}_{filename}`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::fs;

/// Strips a client-supplied filename down to a safe basename.
///
/// Path separators and parent references are removed, and anything outside
/// a conservative character set is replaced with `_`. Empty results fall
/// back to `upload`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Computes the storage path for a submission file.
pub fn submission_path(
    upload_dir: &str,
    assignment_id: i32,
    user_id: i32,
    original_filename: &str,
) -> PathBuf {
    let filename = format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original_filename)
    );
    Path::new(upload_dir)
        .join(format!("assignment_{}", assignment_id))
        .join(format!("user_{}", user_id))
        .join(filename)
}

/// Writes submission bytes to disk, creating parent directories as needed.
///
/// Returns the path the file was stored at.
pub async fn save_submission(
    upload_dir: &str,
    assignment_id: i32,
    user_id: i32,
    original_filename: &str,
    data: &[u8],
) -> Result<PathBuf> {
    let path = submission_path(upload_dir, assignment_id, user_id, original_filename);
    let parent = path
        .parent()
        .context("Submission path has no parent directory")?;

    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("Failed to create upload directory {}", parent.display()))?;
    fs::write(&path, data)
        .await
        .with_context(|| format!("Failed to write submission file {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("notes-v2_final.txt"), "notes-v2_final.txt");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\evil.exe"), "evil.exe");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my report (1).pdf"), "my_report__1_.pdf");
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_submission_path_is_namespaced() {
        let path = submission_path("uploads", 3, 9, "essay.docx");
        let display = path.to_string_lossy().into_owned();
        assert!(display.starts_with("uploads"));
        assert!(display.contains("assignment_3"));
        assert!(display.contains("user_9"));
        assert!(display.ends_with("essay.docx"));
    }

    #[tokio::test]
    async fn test_save_submission_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_string_lossy().into_owned();

        let path = save_submission(&upload_dir, 1, 2, "answer.txt", b"hello")
            .await
            .unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, b"hello");
    }
}
