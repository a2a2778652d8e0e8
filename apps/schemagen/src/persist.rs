//! Writes a validated document to disk as pretty JSON.
//!
//! Output uses 4-space indentation, schema field order, and literal UTF-8.
//! The bytes go to a temporary file next to the destination which is renamed
//! over it once fully written, so a failed run never leaves a partial file.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::binding::Document;

const INDENT: &[u8] = b"    ";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders `doc` exactly as `persist` writes it.
pub fn to_pretty_json(doc: &Document) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    doc.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes `doc` to `path`, replacing any existing file.
pub fn persist(doc: &Document, path: &Path) -> Result<(), PersistError> {
    let bytes = to_pretty_json(doc)?;
    let io_err = |source: io::Error| PersistError::Io {
        path: path.display().to_string(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temp file on any early return closes and removes it.
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    if let Some(permissions) = target_permissions(path) {
        file.as_file().set_permissions(permissions).map_err(io_err)?;
    }
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Mode the written file should end up with: the replaced file's, or the
/// usual mode of a freshly created one. Temp files start out owner-only.
fn target_permissions(path: &Path) -> Option<Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::validate;
    use crate::schema::catalog::{math_reasoning_schema, resume_schema};
    use serde_json::Value;

    const STEPS: &str = r#"{"steps":[{"explanation":"isolate x","output":"8x=-30"}],"final_answer":"x=-3.75"}"#;

    fn math_doc() -> Document {
        validate(STEPS, &math_reasoning_schema(), true).unwrap()
    }

    #[test]
    fn test_persist_then_reread_is_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("math-reasoning.json");
        let doc = math_doc();

        persist(&doc, &path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, doc.to_value());
        let keys: Vec<_> = written.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["steps", "final_answer"]);
    }

    #[test]
    fn test_four_space_indentation() {
        let text = String::from_utf8(to_pretty_json(&math_doc()).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"steps\": [\n        {\n            \"explanation\""));
    }

    #[test]
    fn test_non_ascii_written_literally() {
        let raw = r#"{"steps":[],"final_answer":"x = −3,75 €"}"#;
        let doc = validate(raw, &math_reasoning_schema(), true).unwrap();
        let text = String::from_utf8(to_pretty_json(&doc).unwrap()).unwrap();
        assert!(text.contains("x = −3,75 €"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn test_persist_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale contents that are longer than nothing").unwrap();

        persist(&math_doc(), &path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["final_answer"], "x=-3.75");
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, Permissions::from_mode(0o640)).unwrap();

        persist(&math_doc(), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");

        persist(&math_doc(), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_persist_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = persist(&math_doc(), &path).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_optional_fields_persist_as_null() {
        let raw = r#"{
            "name": "Ada", "title": "Engineer", "location": "London", "github": null,
            "email": "a@x.com", "summary": "s", "years_of_experience": 3, "seniority": "Mid",
            "work_experience": [], "education": "e", "skills": "k", "certifications": "c",
            "projects": "p"
        }"#;
        let doc = validate(raw, &resume_schema(), true).unwrap();
        let text = String::from_utf8(to_pretty_json(&doc).unwrap()).unwrap();
        assert!(text.contains("\"github\": null"));
        assert!(text.contains("\"linkedin\": null"));
        assert!(text.contains("\"contact\": null"));
    }
}
