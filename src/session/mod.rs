//! Live recording sessions
//!
//! This module provides:
//! - `SessionBuffer`: the per-recording sample accumulator and windowing math
//! - `SessionHandle`: a live session (buffer + window queue + worker task)
//! - `SessionRegistry`: the process-wide session map

mod buffer;
mod config;
mod registry;

pub use buffer::{SessionBuffer, Window};
pub use config::SessionConfig;
pub use registry::{SessionHandle, SessionRegistry};
