//! Turns a completion result into a validated document.
//!
//! This is the only place request failures and validation failures meet; both
//! come out as a `MaterializationError` tagged with the stage that failed.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::binding::{validate, Document};
use crate::llm_client::CompletionResult;
use crate::schema::SchemaNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request => f.write_str("request"),
            Stage::Validation => f.write_str("validation"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("{stage} stage failed: {detail}")]
pub struct MaterializationError {
    pub stage: Stage,
    pub detail: String,
}

pub fn materialize(
    result: CompletionResult,
    schema: &SchemaNode,
    strict: bool,
) -> Result<Document, MaterializationError> {
    let raw = result.map_err(|e| MaterializationError {
        stage: Stage::Request,
        detail: e.to_string(),
    })?;

    match validate(&raw, schema, strict) {
        Ok(doc) => {
            debug!("Payload conforms to schema '{}'", schema.name);
            Ok(doc)
        }
        Err(e) => {
            warn!("Payload rejected by schema '{}': {e}", schema.name);
            Err(MaterializationError {
                stage: Stage::Validation,
                detail: e.to_string(),
            })
        }
    }
}
