//! Runs one job end to end.
//!
//! Flow: request_completion → materialize → (typed summary) → persist.
//!
//! Nothing touches the output path until a validated document exists, so a
//! failed request or a rejected payload leaves any previous output intact.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::binding::Document;
use crate::errors::AppError;
use crate::llm_client::{request_completion, CompletionRequest, CompletionTransport, Message};
use crate::materialize::materialize;
use crate::persist::persist;
use crate::use_cases::{Profile, UseCase};

/// Caller-supplied inputs layered on top of a profile.
#[derive(Debug, Default, Clone)]
pub struct JobInput {
    pub prompt: Option<String>,
    /// Source document text (e.g. an extracted resume).
    pub input_text: Option<String>,
    pub system_prompt: Option<String>,
    pub model_id: String,
    pub strict: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub request: CompletionRequest,
    pub output: PathBuf,
    pub binding: Option<UseCase>,
}

impl Job {
    /// Builds the completion job. The user message is the prompt, the input
    /// text, or both separated by a blank line; without either, the profile's
    /// default question is used, and profiles without one reject the job.
    pub fn new(profile: Profile, input: JobInput) -> Result<Self, AppError> {
        let user_content = match (input.prompt, input.input_text) {
            (Some(prompt), Some(text)) => format!("{prompt}\n\n{text}"),
            (Some(prompt), None) => prompt,
            (None, Some(text)) => text,
            (None, None) => profile.default_question.ok_or_else(|| {
                AppError::Input(format!(
                    "schema '{}' needs user content: pass --prompt and/or --input",
                    profile.schema.name
                ))
            })?,
        };

        if user_content.trim().is_empty() {
            return Err(AppError::Input("user content is empty".to_string()));
        }

        let system_prompt = input.system_prompt.unwrap_or(profile.system_prompt);

        Ok(Job {
            request: CompletionRequest {
                model_id: input.model_id,
                messages: vec![Message::system(system_prompt), Message::user(user_content)],
                schema: profile.schema,
                strict: input.strict,
            },
            output: input.output.unwrap_or(profile.default_output),
            binding: profile.binding,
        })
    }
}

/// Runs the job and returns the document that was written.
pub async fn run(transport: &dyn CompletionTransport, job: &Job) -> Result<Document, AppError> {
    let schema = &job.request.schema;

    // Step 1: single completion request
    let result = request_completion(transport, &job.request).await;

    // Step 2: validate into the schema
    let doc = materialize(result, schema, job.request.strict)?;
    info!("Materialized '{}' with fields {:?}", schema.name, doc.keys());

    // Step 3: typed view for built-in use cases
    if let Some(use_case) = job.binding {
        match use_case.summarize(&doc) {
            Ok(summary) => info!("{use_case}: {summary}"),
            Err(e) => warn!("Document for {use_case} does not decode into its typed model: {e}"),
        }
    }

    // Step 4: persist
    persist(&doc, &job.output)?;

    Ok(doc)
}
