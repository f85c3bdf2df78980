/// gptpipe - a single-record text generation stage for data-flow pipelines.
///
/// The stage receives one record at a time, forwards its text content to an
/// OpenAI-compatible chat-completion API, and replaces the record content
/// with the generated reply. Every inbound record is routed to exactly one
/// of two terminal outcomes, `success` or `failure`; on failure the
/// original content is left untouched and the record is still forwarded.
///
/// # Architecture
///
/// The crate uses:
/// - reqwest for the remote HTTP call (one shared client per activation)
/// - serde / serde_json for the wire payloads
/// - thiserror for the error taxonomy
/// - tracing for structured logging
/// - Tokio for the async runtime
///
/// # Example
///
/// ```no_run
/// use gptpipe::core::config::StageSettings;
/// use gptpipe::core::record::Record;
/// use gptpipe::stage::{Outcome, Stage};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Set up structured logging
///     gptpipe::setup_logging();
///
///     // Activation validates settings before any record is processed
///     let stage = Stage::activate(StageSettings {
///         api_key: Some("sk-example".to_string()),
///         model: None, // defaults to gpt-3.5-turbo
///         api_base: None,
///     })?;
///
///     let routed = stage.process(Record::new("Translate: hola")).await;
///     match routed.outcome {
///         Outcome::Success => {
///             println!("{}", String::from_utf8_lossy(routed.record.content()));
///         }
///         Outcome::Failure => {
///             eprintln!("remote call failed; content unchanged");
///         }
///     }
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod core;
pub mod errors;
pub mod stage;

pub use errors::StageError;
pub use stage::{Outcome, Routed, Stage};

/// Configure structured logging with JSON format.
///
/// This function sets up tracing-subscriber with a JSON formatter. It
/// should be called once at process start, before any record is processed.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your binary
/// gptpipe::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
