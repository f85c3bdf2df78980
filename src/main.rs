use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use tracing::info;

use gptpipe::core::config::StageSettings;
use gptpipe::core::record::Record;
use gptpipe::stage::{Outcome, Stage};

/// Runs one record through the stage: stdin is the record content, stdout
/// receives the routed record's content, and the exit status reports the
/// outcome. Settings come from the environment (OPENAI_API_KEY,
/// OPENAI_MODEL, OPENAI_API_BASE).
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    gptpipe::setup_logging();

    let stage = Stage::activate(StageSettings::from_env())?;

    let mut content = Vec::new();
    std::io::stdin()
        .read_to_end(&mut content)
        .context("Failed to read record content from stdin")?;

    let routed = stage.process(Record::new(content)).await;
    info!(record_id = %routed.record.id(), outcome = routed.outcome.name(), "record routed");

    std::io::stdout()
        .write_all(routed.record.content())
        .context("Failed to write routed record content to stdout")?;

    Ok(match routed.outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Failure => ExitCode::FAILURE,
    })
}
