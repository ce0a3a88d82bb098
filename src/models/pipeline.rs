//! Purpose: Pipeline status and metadata bodies.
//! Exports: `PipelineStatus`, `PipelineMetadata`.
//! Role: Open records; the server owns their shape, the client passes it through.
use crate::core::record::Extensions;

/// Runtime status and performance counters of a running pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineStatus {
    extensions: Extensions,
}

open_record!(PipelineStatus, "PipelineStatus");

/// Descriptive metadata of a pipeline (program, endpoints, config).
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineMetadata {
    extensions: Extensions,
}

open_record!(PipelineMetadata, "PipelineMetadata");
