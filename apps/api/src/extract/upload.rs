//! Multipart helpers shared by the upload-based routes.

use axum::extract::multipart::Field;

use crate::errors::AppError;
use crate::extract::extract_text;

/// Reads an uploaded document field and extracts its text. Rejects uploads
/// that yield no text — unsupported formats and unparseable files look the
/// same to the caller.
pub async fn resume_field(field: Field<'_>) -> Result<String, AppError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
    let text = extract_text(&bytes, &filename);
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Could not extract text from '{filename}'"
        )));
    }
    Ok(text)
}

/// Reads a plain-text multipart field.
pub async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field: {e}")))
}
