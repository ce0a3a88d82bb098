//! Purpose: Client library for the Feldera pipeline control plane.
//! Exports: `api` (client, pipeline handle, services), `models` (typed bodies),
//! `core` (record scheme, union decoding, errors).
//! Role: Typed, blocking access to `/v0` pipeline lifecycle and service catalog endpoints.
//! Invariants: Decoded models re-encode to the exact JSON they were decoded from.
//! Invariants: Models and decoding hold no shared state and are safe to use across threads.
pub mod api;
pub mod core;
pub mod models;
