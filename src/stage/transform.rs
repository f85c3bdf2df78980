//! Per-record orchestration: read content, call the API, interpret the
//! reply, rewrite, route.

use std::sync::Arc;

use tracing::{error, info};

use crate::ai::client::{ChatRequest, HttpTransport, Transport, interpret_reply};
use crate::core::config::{StageConfig, StageSettings};
use crate::core::record::Record;
use crate::errors::StageError;
use crate::stage::route::{Outcome, Routed};

/// The transformation stage.
///
/// Cheap to clone and safe to call concurrently, one record per
/// invocation. The configuration is read-only after activation and the
/// transport handle is shared; the stage itself holds no other state.
#[derive(Clone)]
pub struct Stage {
    config: StageConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// Validates settings and builds the shared HTTP transport. Must
    /// succeed before any record is processed; an invalid configuration
    /// never fails per-record.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Config` when a required setting is missing or
    /// empty.
    pub fn activate(settings: StageSettings) -> Result<Self, StageError> {
        Self::with_transport(settings, Arc::new(HttpTransport::new()))
    }

    /// Activation with a caller-supplied transport implementation.
    ///
    /// # Errors
    ///
    /// Same validation as [`Stage::activate`].
    pub fn with_transport(
        settings: StageSettings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, StageError> {
        let config = StageConfig::activate(settings)?;
        info!(model = config.model(), "stage activated");
        Ok(Self { config, transport })
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// One scheduler cycle. `None` means no record was available and no
    /// work is done; otherwise the record is processed to its outcome.
    pub async fn trigger(&self, inbound: Option<Record>) -> Option<Routed> {
        let record = inbound?;
        Some(self.process(record).await)
    }

    /// Processes one record to its terminal outcome.
    ///
    /// Never returns an error and never drops the record: any failure
    /// during read, build, transport, or interpretation routes the
    /// original, unrewritten record to `failure`.
    pub async fn process(&self, mut record: Record) -> Routed {
        match self.transform(&mut record).await {
            Ok(()) => {
                info!(record_id = %record.id(), "record content replaced with generated reply");
                Routed {
                    record,
                    outcome: Outcome::Success,
                }
            }
            Err(e) => {
                error!(record_id = %record.id(), kind = e.kind(), "{e}");
                Routed {
                    record,
                    outcome: Outcome::Failure,
                }
            }
        }
    }

    // Sequential per-record steps. The record is mutated only after the
    // reply has been interpreted successfully.
    async fn transform(&self, record: &mut Record) -> Result<(), StageError> {
        let text = record.read_text();
        let request = ChatRequest::new(&self.config, &text);
        let reply = self.transport.execute(request).await?;
        let generated = interpret_reply(&reply)?;
        record.rewrite(&generated);
        Ok(())
    }
}
