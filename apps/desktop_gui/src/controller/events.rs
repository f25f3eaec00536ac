//! Backend-to-UI events.

use client_core::RequestTicket;
use shared::{
    error::ApiResult,
    protocol::{BatchResult, ModelMetrics, PredictionResult},
};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    PredictionFinished {
        ticket: RequestTicket,
        outcome: ApiResult<PredictionResult>,
    },
    BatchFinished {
        ticket: RequestTicket,
        outcome: ApiResult<BatchResult>,
    },
    ModelInfoLoaded {
        ticket: RequestTicket,
        outcome: ApiResult<ModelMetrics>,
    },
}
