//! Background worker that performs network calls for the UI thread.

pub mod commands;
pub mod runtime;
