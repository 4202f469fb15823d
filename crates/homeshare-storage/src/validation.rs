//! Checks on client-supplied names before they touch the filesystem.

use homeshare_core::error::AppError;
use homeshare_core::result::AppResult;

/// Extensions accepted for uploads, lowercase with the leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    // images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tif", ".tiff", ".webp", ".heic", ".svg",
    // video and audio
    ".mp4", ".mkv", ".mov", ".avi", ".flv", ".wmv", ".webm", ".mp3", ".wav", ".flac", ".ogg",
    // documents
    ".txt", ".md", ".csv", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt",
    ".ods", ".odp", ".rtf",
    // archives
    ".zip", ".tar", ".gz", ".tgz", ".7z", ".rar",
];

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ' ' | '(' | ')' | '-')
}

/// A bare file name: `[A-Za-z0-9._ ()-]+`, and never `.` or `..`.
pub fn validate_file_name(name: &str) -> AppResult<()> {
    if name.is_empty() || !name.chars().all(is_name_char) || name == "." || name == ".." {
        return Err(AppError::validation(format!("Invalid file name: {name:?}")));
    }
    Ok(())
}

/// A dotted extension from [`ALLOWED_EXTENSIONS`], case-insensitively.
pub fn validate_extension(extension: &str) -> AppResult<()> {
    let lower = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&lower.as_str()) {
        return Err(AppError::validation(format!(
            "File extension not allowed: {extension:?}"
        )));
    }
    Ok(())
}

/// A folder id is `/` or a single path component of file name characters.
pub fn validate_folder_id(folder_id: &str) -> AppResult<()> {
    if folder_id == homeshare_entity::folder::ROOT_FOLDER {
        return Ok(());
    }
    validate_file_name(folder_id)
        .map_err(|_| AppError::validation(format!("Invalid folder id: {folder_id:?}")))
}
