//! Purpose: Handle for one pipeline on the control plane.
//! Exports: `Pipeline`.
//! Role: Forwards lifecycle calls to the transport and unwraps results.
//! Invariants: Every failure carries the operation's context ("failed to ... pipeline").
//! Invariants: `launch` starts the pipeline before returning the handle.
#![allow(clippy::result_large_err)]

use super::client::Client;
use crate::core::error::ApiResult;
use crate::core::record::Record;
use crate::models::{PipelineMetadata, PipelineStatus};

#[derive(Clone, Debug)]
pub struct Pipeline {
    client: Client,
    pipeline_id: u64,
}

impl Pipeline {
    pub fn new(client: Client, pipeline_id: u64) -> Self {
        Self {
            client,
            pipeline_id,
        }
    }

    /// Attach to `pipeline_id` and start it.
    pub fn launch(client: Client, pipeline_id: u64) -> ApiResult<Self> {
        let pipeline = Self::new(client, pipeline_id);
        pipeline.start()?;
        Ok(pipeline)
    }

    pub fn id(&self) -> u64 {
        self.pipeline_id
    }

    /// Start a new or paused pipeline.
    pub fn start(&self) -> ApiResult<()> {
        self.action("start", "failed to start pipeline")
    }

    pub fn pause(&self) -> ApiResult<()> {
        self.action("pause", "failed to pause pipeline")
    }

    /// Terminate the pipeline process without deleting it.
    ///
    /// Returns as soon as the server accepts the request; the pipeline may
    /// take several seconds to stop.
    pub fn shutdown(&self) -> ApiResult<()> {
        self.action("shutdown", "failed to shut down pipeline")
    }

    /// Shut the pipeline down if it is still running and delete it from the server.
    pub fn delete(&self) -> ApiResult<()> {
        let id = self.pipeline_id.to_string();
        self.client
            .delete(&["v0", "pipelines", &id])
            .map(drop)
            .map_err(|err| err.with_context("failed to delete pipeline"))
    }

    /// Pipeline status and performance counters.
    pub fn status(&self) -> ApiResult<PipelineStatus> {
        let id = self.pipeline_id.to_string();
        self.client
            .get(&["v0", "pipelines", &id, "status"], &[])
            .and_then(PipelineStatus::from_value)
            .map_err(|err| err.with_context("failed to retrieve pipeline status"))
    }

    pub fn metadata(&self) -> ApiResult<PipelineMetadata> {
        let id = self.pipeline_id.to_string();
        self.client
            .get(&["v0", "pipelines", &id, "metadata"], &[])
            .and_then(PipelineMetadata::from_value)
            .map_err(|err| err.with_context("failed to retrieve pipeline metadata"))
    }

    fn action(&self, action: &str, context: &str) -> ApiResult<()> {
        let id = self.pipeline_id.to_string();
        self.client
            .post(&["v0", "pipelines", &id, action], None)
            .map(drop)
            .map_err(|err| err.with_context(context))
    }
}
