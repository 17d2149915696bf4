//! Bridge between the UI thread and the async submission worker.

pub mod commands;
pub mod runtime;
