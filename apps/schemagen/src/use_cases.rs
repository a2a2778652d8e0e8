//! Use-case profiles — what varies between runs of the same pipeline:
//! the schema, the system prompt, the default question and output path.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::binding::models::{MathReasoning, Resume};
use crate::binding::Document;
use crate::errors::AppError;
use crate::llm_client::prompts::{
    CUSTOM_SCHEMA_SYSTEM, MATH_DEFAULT_QUESTION, MATH_TUTOR_SYSTEM, RESUME_JSON_MODE_SYSTEM,
    RESUME_SYSTEM,
};
use crate::schema::catalog::{math_reasoning_schema, resume_json_mode_schema, resume_schema};
use crate::schema::json_schema::from_json_schema;
use crate::schema::SchemaNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UseCase {
    /// Extract a resume; contact links are optional.
    Resume,
    /// Resume with every field required.
    ResumeJson,
    /// Step-by-step math tutoring.
    Math,
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UseCase::Resume => "resume",
            UseCase::ResumeJson => "resume-json",
            UseCase::Math => "math",
        })
    }
}

impl UseCase {
    pub fn profile(self) -> Profile {
        let (schema, system_prompt, default_question, default_output) = match self {
            UseCase::Resume => (resume_schema(), RESUME_SYSTEM, None, "resume.json"),
            UseCase::ResumeJson => (
                resume_json_mode_schema(),
                RESUME_JSON_MODE_SYSTEM,
                None,
                "resume_json_mode.json",
            ),
            UseCase::Math => (
                math_reasoning_schema(),
                MATH_TUTOR_SYSTEM,
                Some(MATH_DEFAULT_QUESTION),
                "math-reasoning.json",
            ),
        };

        Profile {
            schema,
            system_prompt: system_prompt.to_string(),
            default_question: default_question.map(str::to_string),
            default_output: PathBuf::from(default_output),
            binding: Some(self),
        }
    }

    /// One-line description of a validated document via the typed model.
    pub fn summarize(self, doc: &Document) -> Result<String, serde_json::Error> {
        match self {
            UseCase::Resume | UseCase::ResumeJson => {
                doc.decode::<Resume>().map(|r| r.summary_line())
            }
            UseCase::Math => doc.decode::<MathReasoning>().map(|m| m.summary_line()),
        }
    }
}

/// Everything needed to turn caller input into a completion job.
#[derive(Debug, Clone)]
pub struct Profile {
    pub schema: SchemaNode,
    pub system_prompt: String,
    /// User message sent when the caller supplies no prompt or input.
    pub default_question: Option<String>,
    pub default_output: PathBuf,
    /// Built-in use case whose typed model matches `schema`.
    pub binding: Option<UseCase>,
}

impl Profile {
    pub fn custom(schema: SchemaNode) -> Self {
        Self {
            default_output: PathBuf::from(format!("{}.json", schema.name)),
            schema,
            system_prompt: CUSTOM_SCHEMA_SYSTEM.to_string(),
            default_question: None,
            binding: None,
        }
    }

    /// Loads a caller-supplied JSON Schema file.
    pub fn from_schema_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Input(format!("failed to read {}: {e}", path.display())))?;
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            AppError::Input(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        let fallback_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        Ok(Self::custom(from_json_schema(fallback_name, &value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::validate;

    #[test]
    fn test_math_profile() {
        let profile = UseCase::Math.profile();
        assert_eq!(profile.schema.name, "math_reasoning");
        assert_eq!(profile.default_question.as_deref(), Some(MATH_DEFAULT_QUESTION));
        assert_eq!(profile.default_output, PathBuf::from("math-reasoning.json"));
        assert_eq!(profile.binding, Some(UseCase::Math));
    }

    #[test]
    fn test_resume_profiles_have_no_default_question() {
        assert!(UseCase::Resume.profile().default_question.is_none());
        assert!(UseCase::ResumeJson.profile().default_question.is_none());
    }

    #[test]
    fn test_summarize_math() {
        let raw = r#"{"steps":[{"explanation":"subtract 7","output":"8x=-30"},{"explanation":"divide by 8","output":"x=-3.75"}],"final_answer":"x=-3.75"}"#;
        let doc = validate(raw, &UseCase::Math.profile().schema, true).unwrap();
        assert_eq!(
            UseCase::Math.summarize(&doc).unwrap(),
            "2 steps, final answer x=-3.75"
        );
    }

    #[test]
    fn test_custom_profile_from_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.json");
        std::fs::write(
            &path,
            r#"{"type":"object","properties":{"total":{"type":"integer"}},"required":["total"]}"#,
        )
        .unwrap();

        let profile = Profile::from_schema_file(&path).unwrap();
        assert_eq!(profile.schema.name, "invoice");
        assert_eq!(profile.default_output, PathBuf::from("invoice.json"));
        assert!(profile.binding.is_none());
        assert_eq!(profile.system_prompt, CUSTOM_SCHEMA_SYSTEM);
    }

    #[test]
    fn test_schema_file_with_bad_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"type":"object","properties":{},"required":["ghost"]}"#,
        )
        .unwrap();
        assert!(matches!(
            Profile::from_schema_file(&path),
            Err(AppError::Schema(_))
        ));
    }

    #[test]
    fn test_schema_file_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "type: object").unwrap();
        assert!(matches!(
            Profile::from_schema_file(&path),
            Err(AppError::Input(_))
        ));
    }
}
