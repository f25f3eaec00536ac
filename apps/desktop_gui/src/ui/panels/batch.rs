//! CSV upload area, batch summary and the capped results table.

use client_core::{batch::TRUNCATION_NOTE, format, BatchController, BatchState};
use egui::{Color32, RichText};

use crate::ui::widgets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    PickFile,
    Submit,
    Export,
}

pub fn show(ui: &mut egui::Ui, batch: &BatchController) -> Option<BatchAction> {
    let mut action = None;
    let submitting = batch.is_submitting();

    ui.heading("Batch Prediction");
    ui.label("Upload a CSV file with loan applications to score them all at once.");
    ui.add_space(8.0);

    let fill = if batch.is_drag_over() {
        Color32::from_rgba_unmultiplied(46, 160, 67, 40)
    } else {
        ui.visuals().faint_bg_color
    };
    egui::Frame::group(ui.style())
        .fill(fill)
        .inner_margin(egui::Margin::same(16))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                match batch.file() {
                    Some(file) => {
                        ui.label(RichText::new(&file.file_name).strong());
                        ui.label(file.size_label());
                    }
                    None => {
                        ui.label("Drag and drop a CSV file here");
                    }
                }
                if ui
                    .add_enabled(!submitting, egui::Button::new("Browse..."))
                    .clicked()
                {
                    action = Some(BatchAction::PickFile);
                }
            });
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let label = if submitting {
            "Processing..."
        } else {
            "Process Batch"
        };
        let ready = batch.file().is_some() && !submitting;
        if ui.add_enabled(ready, egui::Button::new(label)).clicked() {
            action = Some(BatchAction::Submit);
        }
        if submitting {
            ui.spinner();
        }
    });

    if let BatchState::Error(message) = batch.state() {
        widgets::error_banner(ui, message);
    }

    if let Some(summary) = batch.summary() {
        ui.separator();
        ui.label(RichText::new(summary.headline()).strong());
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("Approved: {}", summary.approved))
                    .color(widgets::APPROVED_COLOR),
            );
            ui.add_space(16.0);
            ui.label(
                RichText::new(format!("Rejected: {}", summary.rejected))
                    .color(widgets::REJECTED_COLOR),
            );
            ui.add_space(16.0);
            if ui.button("Download CSV").clicked() {
                action = Some(BatchAction::Export);
            }
        });
        ui.add_space(6.0);
        results_table(ui, batch);
        if batch.is_truncated() {
            ui.label(RichText::new(TRUNCATION_NOTE).italics());
        }
    }

    action
}

fn results_table(ui: &mut egui::Ui, batch: &BatchController) {
    egui::ScrollArea::vertical()
        .max_height(360.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            egui::Grid::new("batch_results")
                .num_columns(4)
                .striped(true)
                .spacing([24.0, 4.0])
                .show(ui, |ui| {
                    for title in format::EXPORT_HEADER {
                        ui.label(RichText::new(title).strong());
                    }
                    ui.end_row();

                    for record in batch.displayed_records() {
                        let [loan_id, prediction, probability, confidence] =
                            format::export_fields(record);
                        ui.label(loan_id);
                        let cell = RichText::new(prediction)
                            .color(widgets::decision_color(&record.prediction));
                        match &record.error {
                            Some(error) => {
                                ui.label(cell).on_hover_text(error);
                            }
                            None => {
                                ui.label(cell);
                            }
                        }
                        ui.label(probability);
                        ui.label(confidence);
                        ui.end_row();
                    }
                });
        });
}
