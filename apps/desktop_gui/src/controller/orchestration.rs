//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL_MESSAGE: &str = "UI command queue is full; please retry";
pub const BACKEND_DISCONNECTED_MESSAGE: &str =
    "Backend worker is not running (possible startup failure); restart the app";

/// Queues `cmd`; on failure the reason is written to `status` and false is
/// returned so the caller can settle its pending request.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui command queue full");
            *status = QUEUE_FULL_MESSAGE.to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::warn!(command = cmd_name, "backend worker disconnected");
            *status = BACKEND_DISCONNECTED_MESSAGE.to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::DashboardController;
    use crossbeam_channel::bounded;

    use super::*;

    fn fetch_command() -> BackendCommand {
        let ticket = DashboardController::new().activate().expect("ticket");
        BackendCommand::FetchModelInfo { ticket }
    }

    #[test]
    fn queued_command_leaves_status_alone() {
        let (tx, rx) = bounded(1);
        let mut status = "Ready".to_string();
        assert!(dispatch_backend_command(&tx, fetch_command(), &mut status));
        assert_eq!(status, "Ready");
        assert!(matches!(rx.try_recv(), Ok(BackendCommand::FetchModelInfo { .. })));
    }

    #[test]
    fn full_queue_is_reported() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, fetch_command(), &mut status));
        assert!(!dispatch_backend_command(&tx, fetch_command(), &mut status));
        assert_eq!(status, QUEUE_FULL_MESSAGE);
    }

    #[test]
    fn disconnected_worker_is_reported() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&tx, fetch_command(), &mut status));
        assert_eq!(status, BACKEND_DISCONNECTED_MESSAGE);
    }
}
