use std::panic;
use std::path::Path;

use tracing::info;

use crate::errors::AppError;

/// Reads the caller-supplied source document as text.
///
/// `.pdf` files go through `pdf_extract`; anything else must be UTF-8 text.
pub fn read_input(path: &Path) -> Result<String, AppError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        extract_pdf_text(path)?
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| AppError::Input(format!("failed to read {}: {e}", path.display())))?
    };

    if text.trim().is_empty() {
        return Err(AppError::Input(format!(
            "{} contains no extractable text",
            path.display()
        )));
    }

    info!("Loaded {} characters of input from {}", text.chars().count(), path.display());
    Ok(text)
}

/// `pdf_extract` panics on some malformed files; those surface as input errors.
fn extract_pdf_text(path: &Path) -> Result<String, AppError> {
    let failed = |detail: String| {
        AppError::Input(format!("failed to extract text from {}: {detail}", path.display()))
    };

    match panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(failed(e.to_string())),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unreadable PDF".to_string());
            Err(failed(detail))
        }
    }
}
