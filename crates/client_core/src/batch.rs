//! CSV batch scoring: file selection, submit lifecycle, aggregation, export.

use std::{fs, path::Path};

use anyhow::Context;
use shared::{
    error::{ApiResult, ClientError},
    protocol::{BatchRecord, BatchResult, Decision},
};
use tracing::{debug, info, warn};

use crate::{
    format,
    inflight::{InFlight, RequestTicket},
    upload::CsvUpload,
    PredictionApi,
};

pub const DISPLAY_ROW_LIMIT: usize = 50;
pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const ALREADY_SUBMITTING_MESSAGE: &str = "A batch is already being processed";
pub const TRUNCATION_NOTE: &str = "Showing first 50 results. Download CSV for complete data.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BatchState {
    #[default]
    NoFile,
    FileSelected,
    Submitting,
    Result(BatchResult),
    Error(String),
}

/// Counts over the whole result set, independent of the display cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Total reported by the service.
    pub total: u64,
    /// Records actually received.
    pub received: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl BatchSummary {
    pub fn from_result(result: &BatchResult) -> Self {
        let count = |wanted: Decision| {
            result
                .predictions
                .iter()
                .filter(|record| record.prediction == wanted)
                .count()
        };
        Self {
            total: result.total,
            received: result.predictions.len(),
            approved: count(Decision::Approved),
            rejected: count(Decision::Rejected),
        }
    }

    pub fn headline(&self) -> String {
        format!("Successfully processed {} loan applications", self.total)
    }
}

#[derive(Debug, Default)]
pub struct BatchController {
    file: Option<CsvUpload>,
    state: BatchState,
    drag_over: bool,
    in_flight: InFlight,
}

impl BatchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn file(&self) -> Option<&CsvUpload> {
        self.file.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_pending()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            BatchState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&BatchResult> {
        match &self.state {
            BatchState::Result(result) => Some(result),
            _ => None,
        }
    }

    /// Shared handler for the file picker and drag-and-drop. Anything but an
    /// upload declared exactly as `text/csv` clears the selection. Selections
    /// are refused while a batch is being processed.
    pub fn select_file(&mut self, upload: Option<CsvUpload>) -> bool {
        if self.in_flight.is_pending() {
            debug!("ignoring file selection while a batch is in flight");
            return false;
        }
        match upload {
            Some(upload) if upload.is_csv() => {
                debug!(file = %upload.file_name, "batch file selected");
                self.file = Some(upload);
                self.state = BatchState::FileSelected;
                true
            }
            rejected => {
                warn!(
                    mime_type = ?rejected.as_ref().and_then(|u| u.mime_type.as_deref()),
                    "rejected batch file selection"
                );
                self.file = None;
                self.state = BatchState::Error(ClientError::invalid_csv().message);
                false
            }
        }
    }

    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    pub fn drop_file(&mut self, upload: Option<CsvUpload>) -> bool {
        self.drag_over = false;
        self.select_file(upload)
    }

    pub fn begin_submit(&mut self) -> ApiResult<(RequestTicket, CsvUpload)> {
        if self.in_flight.is_pending() {
            return Err(ClientError::validation(ALREADY_SUBMITTING_MESSAGE));
        }
        let Some(upload) = self.file.clone() else {
            self.state = BatchState::Error(NO_FILE_MESSAGE.to_string());
            return Err(ClientError::validation(NO_FILE_MESSAGE));
        };
        let ticket = self
            .in_flight
            .begin()
            .ok_or_else(|| ClientError::validation(ALREADY_SUBMITTING_MESSAGE))?;
        self.state = BatchState::Submitting;
        debug!(ticket = ticket.id(), file = %upload.file_name, "batch submit started");
        Ok((ticket, upload))
    }

    pub fn finish(&mut self, ticket: RequestTicket, outcome: ApiResult<BatchResult>) -> bool {
        if !self.in_flight.settle(ticket) {
            debug!(ticket = ticket.id(), "dropping stale batch outcome");
            return false;
        }
        self.state = match outcome {
            Ok(result) => {
                if result.total != result.predictions.len() as u64 {
                    warn!(
                        reported = result.total,
                        received = result.predictions.len(),
                        "batch total does not match record count"
                    );
                }
                BatchState::Result(result)
            }
            Err(err) => BatchState::Error(err.message),
        };
        true
    }

    pub async fn submit<A>(&mut self, api: &A) -> &BatchState
    where
        A: PredictionApi + ?Sized,
    {
        let Ok((ticket, upload)) = self.begin_submit() else {
            return &self.state;
        };
        let outcome = api.submit_batch(&upload).await;
        self.finish(ticket, outcome);
        &self.state
    }

    pub fn summary(&self) -> Option<BatchSummary> {
        self.result().map(BatchSummary::from_result)
    }

    /// Records for the on-screen table, capped at [`DISPLAY_ROW_LIMIT`].
    pub fn displayed_records(&self) -> &[BatchRecord] {
        match self.result() {
            Some(result) => {
                &result.predictions[..result.predictions.len().min(DISPLAY_ROW_LIMIT)]
            }
            None => &[],
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.result()
            .is_some_and(|result| result.predictions.len() > DISPLAY_ROW_LIMIT)
    }

    /// Every record, regardless of the display cap.
    pub fn export_csv(&self) -> Option<String> {
        self.result().map(format::batch_csv)
    }

    /// Writes the export to `path`, returning the number of data rows.
    pub fn export_to(&self, path: &Path) -> anyhow::Result<usize> {
        let result = self.result().context("no batch results to export")?;
        fs::write(path, format::batch_csv(result))
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!(path = %path.display(), rows = result.predictions.len(), "batch results exported");
        Ok(result.predictions.len())
    }
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
