mod binding;
mod cli;
mod config;
mod errors;
mod input;
mod llm_client;
mod materialize;
mod persist;
mod pipeline;
mod schema;
mod use_cases;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command, GenerateArgs, SchemaSource};
use crate::config::Config;
use crate::errors::AppError;
use crate::input::read_input;
use crate::llm_client::OpenAiTransport;
use crate::pipeline::{Job, JobInput};
use crate::schema::json_schema::to_response_format;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // load .env if present; ignore if missing

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Schema(source) => print_schema(&source),
        Command::Generate(args) => generate(args).await,
    }
}

fn print_schema(source: &SchemaSource) -> Result<(), AppError> {
    let profile = source.profile()?;
    let payload = to_response_format(&profile.schema, source.strict());
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).map_err(anyhow::Error::from)?
    );
    Ok(())
}

async fn generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = Config::from_env().map_err(AppError::Config)?;
    info!("Starting schemagen v{}", env!("CARGO_PKG_VERSION"));

    let profile = args.source.profile()?;
    let input_text = args.input.as_deref().map(read_input).transpose()?;

    let job = Job::new(
        profile,
        JobInput {
            prompt: args.prompt,
            input_text,
            system_prompt: args.system,
            model_id: args.model.unwrap_or(config.model),
            strict: args.source.strict(),
            output: args.output,
        },
    )?;

    let transport = OpenAiTransport::new(config.api_key, &config.base_url, config.timeout)?;
    info!(
        "Completion client initialized (base url: {}, timeout: {}s)",
        config.base_url,
        config.timeout.as_secs()
    );

    let doc = pipeline::run(&transport, &job).await?;

    println!(
        "Saved '{}' document with {} top-level fields to {}",
        job.request.schema.name,
        doc.keys().len(),
        job.output.display()
    );
    Ok(())
}
