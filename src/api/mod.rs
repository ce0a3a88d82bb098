//! Purpose: Public client surface for the pipeline control plane.
//! Exports: `Client`, `ClientConfig`, `Pipeline`, `Services`, and the shared error types.
//! Role: Stable boundary; transport internals stay private to this module.
//! Invariants: Every operation returns `ApiResult`; nothing panics on server input.

mod client;
mod config;
mod pipeline;
mod services;

pub use crate::core::error::{ApiResult, Error, ErrorKind};
pub use crate::core::record::{Extensions, Record};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_TIMEOUT_MS};
pub use pipeline::Pipeline;
pub use services::{ServiceFilter, Services};
