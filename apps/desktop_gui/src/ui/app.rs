use std::path::{Path, PathBuf};

use client_core::{ClientSettings, CsvUpload, Tab, ViewShell};
use crossbeam_channel::{Receiver, Sender};
use egui::RichText;
use shared::error::{ClientError, ErrorKind};
use tracing::{debug, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};
use crate::ui::panels::{self, batch::BatchAction};

pub const APP_TITLE: &str = "Loan Approval Predictor";

pub struct LoanPredictorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    settings: ClientSettings,
    shell: ViewShell,
    status: String,
}

impl LoanPredictorApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            status: format!("Using {}", settings.api_base_url),
            settings,
            shell: ViewShell::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            let applied = match event {
                UiEvent::Info(message) => {
                    self.status = message;
                    true
                }
                UiEvent::PredictionFinished { ticket, outcome } => {
                    self.shell.form.finish(ticket, outcome)
                }
                UiEvent::BatchFinished { ticket, outcome } => {
                    self.shell.batch.finish(ticket, outcome)
                }
                UiEvent::ModelInfoLoaded { ticket, outcome } => {
                    self.shell.dashboard.finish(ticket, outcome)
                }
            };
            if !applied {
                debug!("ignored result for a discarded view");
            }
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    /// Failure to queue is reported to the waiting controller so it does not
    /// stay in its busy state.
    fn queue_failure(&self) -> ClientError {
        ClientError::new(ErrorKind::Connection, self.status.clone())
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.shell.activate(tab) {
            info!(tab = tab.title(), "tab activated");
        }
        if tab == Tab::ModelDashboard {
            self.ensure_dashboard_requested();
        }
    }

    fn ensure_dashboard_requested(&mut self) {
        if let Some(ticket) = self.shell.dashboard.activate() {
            if !self.dispatch(BackendCommand::FetchModelInfo { ticket }) {
                let err = self.queue_failure();
                self.shell.dashboard.finish(ticket, Err(err));
            }
        }
    }

    pub fn start_prediction(&mut self) {
        let Ok((ticket, input)) = self.shell.form.begin_submit() else {
            return;
        };
        if !self.dispatch(BackendCommand::SubmitApplication { ticket, input }) {
            let err = self.queue_failure();
            self.shell.form.finish(ticket, Err(err));
        }
    }

    pub fn start_batch(&mut self) {
        let Ok((ticket, upload)) = self.shell.batch.begin_submit() else {
            return;
        };
        if !self.dispatch(BackendCommand::SubmitBatch { ticket, upload }) {
            let err = self.queue_failure();
            self.shell.batch.finish(ticket, Err(err));
        }
    }

    pub fn load_batch_file(&mut self, path: &Path) {
        match CsvUpload::from_path(path) {
            Ok(upload) => {
                if self.shell.batch.select_file(Some(upload)) {
                    self.status = format!("Selected {}", path.display());
                }
            }
            Err(err) => {
                warn!("failed to load batch file: {err:#}");
                self.status = format!("{err:#}");
            }
        }
    }

    fn pick_batch_file(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV files", &["csv"]);
        if let Some(dir) = default_upload_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.load_batch_file(&path);
        }
    }

    fn export_batch(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.settings.export_file_name)
            .add_filter("CSV files", &["csv"])
            .save_file()
        else {
            return;
        };
        self.export_batch_to(&path);
    }

    pub fn export_batch_to(&mut self, path: &Path) {
        self.status = match self.shell.batch.export_to(path) {
            Ok(rows) => format!("Saved {rows} predictions to {}", path.display()),
            Err(err) => format!("Failed to save results: {err:#}"),
        };
    }

    fn handle_file_drag(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|input| {
            (
                !input.raw.hovered_files.is_empty(),
                input.raw.dropped_files.first().cloned(),
            )
        });
        let batch = &mut self.shell.batch;
        if hovering && !batch.is_drag_over() {
            batch.drag_enter();
        } else if !hovering && batch.is_drag_over() && dropped.is_none() {
            batch.drag_leave();
        }
        if let Some(file) = dropped {
            if batch.is_submitting() {
                batch.drag_leave();
                return;
            }
            match upload_from_dropped(&file) {
                Ok(upload) => {
                    batch.drop_file(upload);
                }
                Err(err) => {
                    batch.drag_leave();
                    self.status = format!("{err:#}");
                }
            }
        }
    }

    fn show_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut selected = self.shell.active();
            for tab in Tab::ALL {
                ui.selectable_value(&mut selected, *tab, tab.title());
            }
            if selected != self.shell.active() {
                self.switch_tab(selected);
            }
        });
    }
}

/// Turns a dropped file into an upload. The declared type is whatever the
/// platform reported, falling back to a guess from the file name.
pub fn upload_from_dropped(file: &egui::DroppedFile) -> anyhow::Result<Option<CsvUpload>> {
    if let Some(path) = &file.path {
        return CsvUpload::from_path(path).map(Some);
    }
    let Some(bytes) = &file.bytes else {
        return Ok(None);
    };
    let mime_type = if file.mime.trim().is_empty() {
        mime_guess::from_path(&file.name)
            .first_raw()
            .map(str::to_string)
    } else {
        Some(file.mime.clone())
    };
    Ok(Some(CsvUpload::new(file.name.clone(), mime_type, bytes.to_vec())))
}

fn default_upload_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
}

impl eframe::App for LoanPredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        if self.shell.active() == Tab::BatchPrediction {
            self.handle_file_drag(ctx);
        }
        if self.shell.active() == Tab::ModelDashboard {
            self.ensure_dashboard_requested();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.label(RichText::new(APP_TITLE).size(22.0).strong());
            ui.label("Predict loan approval using machine learning");
            ui.add_space(4.0);
            self.show_tabs(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(RichText::new(&self.status).small());
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.shell.active() {
            Tab::SinglePrediction => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if panels::prediction::show(ui, &mut self.shell.form) {
                        self.start_prediction();
                    }
                });
            }
            Tab::BatchPrediction => match panels::batch::show(ui, &self.shell.batch) {
                Some(BatchAction::PickFile) => self.pick_batch_file(),
                Some(BatchAction::Submit) => self.start_batch(),
                Some(BatchAction::Export) => self.export_batch(),
                None => {}
            },
            Tab::ModelDashboard => panels::dashboard::show(ui, &self.shell.dashboard),
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
