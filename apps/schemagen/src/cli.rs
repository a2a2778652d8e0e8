use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::errors::AppError;
use crate::use_cases::{Profile, UseCase};

#[derive(Parser, Debug)]
#[command(
    name = "schemagen",
    version,
    about = "Request schema-conformant JSON from a chat-completion endpoint"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Request a document, validate it and write it to disk
    Generate(GenerateArgs),
    /// Print the response-format payload that would be sent
    Schema(SchemaSource),
}

#[derive(Args, Debug)]
pub struct SchemaSource {
    /// Built-in use case
    #[arg(
        long,
        value_enum,
        required_unless_present = "schema_file",
        conflicts_with = "schema_file"
    )]
    pub use_case: Option<UseCase>,

    /// JSON Schema file to use instead of a built-in use case
    #[arg(long)]
    pub schema_file: Option<PathBuf>,

    /// Accept and drop fields the schema does not declare
    #[arg(long, default_value_t = false)]
    pub lenient: bool,
}

impl SchemaSource {
    pub fn profile(&self) -> Result<Profile, AppError> {
        match (&self.use_case, &self.schema_file) {
            (_, Some(path)) => Profile::from_schema_file(path),
            (Some(use_case), None) => Ok(use_case.profile()),
            (None, None) => Err(AppError::Input(
                "either --use-case or --schema-file is required".to_string(),
            )),
        }
    }

    pub fn strict(&self) -> bool {
        !self.lenient
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SchemaSource,

    /// User message text
    #[arg(long)]
    pub prompt: Option<String>,

    /// Source document (.pdf or text) appended to the user message
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Replace the use case's system prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Output file (overwritten if it exists)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Model identifier; overrides SCHEMAGEN_MODEL
    #[arg(long)]
    pub model: Option<String>,
}
