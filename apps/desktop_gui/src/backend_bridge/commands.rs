//! Backend commands queued from UI to backend worker.

use client_core::{CsvUpload, RequestTicket};
use shared::domain::ApplicationInput;

#[derive(Debug)]
pub enum BackendCommand {
    FetchModelInfo {
        ticket: RequestTicket,
    },
    SubmitApplication {
        ticket: RequestTicket,
        input: ApplicationInput,
    },
    SubmitBatch {
        ticket: RequestTicket,
        upload: CsvUpload,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchModelInfo { .. } => "fetch_model_info",
            BackendCommand::SubmitApplication { .. } => "submit_application",
            BackendCommand::SubmitBatch { .. } => "submit_batch",
        }
    }
}
