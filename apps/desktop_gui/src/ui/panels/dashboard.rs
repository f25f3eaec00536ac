//! Model performance dashboard. Sections the service left out are skipped.

use client_core::{DashboardController, DashboardState, DashboardView};
use egui::RichText;

use crate::ui::widgets;

pub fn show(ui: &mut egui::Ui, dashboard: &DashboardController) {
    ui.heading("Model Performance Dashboard");
    ui.add_space(8.0);

    match dashboard.state() {
        DashboardState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading model information...");
            });
        }
        DashboardState::Error(message) => widgets::error_banner(ui, message),
        DashboardState::Ready(metrics) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| show_view(ui, &DashboardView::from_metrics(metrics)));
        }
    }
}

fn show_view(ui: &mut egui::Ui, view: &DashboardView) {
    ui.horizontal_wrapped(|ui| {
        for card in &view.headline {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(card.title).small());
                    ui.label(RichText::new(&card.value).size(20.0).strong());
                    if let Some(fraction) = card.fraction {
                        ui.add(
                            egui::ProgressBar::new(fraction.clamp(0.0, 1.0) as f32)
                                .desired_width(160.0),
                        );
                    }
                });
            });
        }
    });

    if let Some(rows) = &view.classification {
        widgets::section_heading(ui, "Classification Report");
        egui::Grid::new("classification_report")
            .num_columns(5)
            .striped(true)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                for title in ["Class", "Precision", "Recall", "F1-Score", "Support"] {
                    ui.label(RichText::new(title).strong());
                }
                ui.end_row();
                for row in rows {
                    ui.label(row.label);
                    ui.label(&row.precision);
                    ui.label(&row.recall);
                    ui.label(&row.f1_score);
                    ui.label(&row.support);
                    ui.end_row();
                }
            });
    }

    if let Some([[tn, fp], [fn_, tp]]) = view.confusion_matrix {
        widgets::section_heading(ui, "Confusion Matrix");
        egui::Grid::new("confusion_matrix")
            .num_columns(3)
            .spacing([24.0, 8.0])
            .show(ui, |ui| {
                ui.label("");
                ui.label(RichText::new("Predicted Rejected").strong());
                ui.label(RichText::new("Predicted Approved").strong());
                ui.end_row();

                ui.label(RichText::new("Actual Rejected").strong());
                ui.label(RichText::new(tn.to_string()).color(widgets::APPROVED_COLOR));
                ui.label(RichText::new(fp.to_string()).color(widgets::REJECTED_COLOR));
                ui.end_row();

                ui.label(RichText::new("Actual Approved").strong());
                ui.label(RichText::new(fn_.to_string()).color(widgets::REJECTED_COLOR));
                ui.label(RichText::new(tp.to_string()).color(widgets::APPROVED_COLOR));
                ui.end_row();
            });
    }

    if let Some(features) = &view.top_features {
        widgets::section_heading(ui, "Top Feature Importance");
        for row in features {
            widgets::percent_bar(
                ui,
                &format!("{:>2}. {}", row.rank, row.feature),
                row.importance,
                &row.importance_label,
            );
        }
    }
}
