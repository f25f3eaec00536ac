//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::PredictionApi;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Starts the worker thread. Each command runs as its own task, so a slow
/// batch upload does not hold up a dashboard fetch.
pub fn launch<A>(api: A, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>)
where
    A: PredictionApi + Clone + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker startup failure: failed to build runtime: {err}"
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "backend picked up command");
                let api = api.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = execute(&api, cmd).await;
                    deliver(ui_tx, event).await;
                });
            }
            debug!("command queue closed; backend worker exiting");
        });
    });
}

/// Waits for room in the UI queue; a result is only lost once the UI has gone.
async fn deliver(ui_tx: Sender<UiEvent>, event: UiEvent) {
    let sent = tokio::task::spawn_blocking(move || ui_tx.send(event)).await;
    if !matches!(sent, Ok(Ok(()))) {
        warn!("ui event queue closed; dropping backend result");
    }
}

pub async fn execute<A>(api: &A, cmd: BackendCommand) -> UiEvent
where
    A: PredictionApi + ?Sized,
{
    match cmd {
        BackendCommand::FetchModelInfo { ticket } => UiEvent::ModelInfoLoaded {
            ticket,
            outcome: api.fetch_model_metrics().await,
        },
        BackendCommand::SubmitApplication { ticket, input } => UiEvent::PredictionFinished {
            ticket,
            outcome: api.submit_application(&input).await,
        },
        BackendCommand::SubmitBatch { ticket, upload } => UiEvent::BatchFinished {
            ticket,
            outcome: api.submit_batch(&upload).await,
        },
    }
}
