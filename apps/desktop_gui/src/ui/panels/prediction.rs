//! Single application form and its result card.

use client_core::{format, FormController, FormState};
use egui::RichText;
use shared::domain::{
    CreditHistory, Dependents, Education, Gender, LoanTerm, PropertyArea, YesNo,
};

use crate::ui::widgets;

/// Draws the form; returns true when the user asked to submit.
pub fn show(ui: &mut egui::Ui, form: &mut FormController) -> bool {
    let submitting = form.is_submitting();
    let mut submit = false;

    ui.heading("Loan Application Details");
    ui.add_space(8.0);

    ui.add_enabled_ui(!submitting, |ui| {
        let draft = &mut form.draft;
        egui::Grid::new("application_form")
            .num_columns(4)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                ui.label("Gender");
                widgets::choice_combo(ui, "gender", &mut draft.gender, Gender::ALL, Gender::as_str);
                ui.label("Married");
                widgets::choice_combo(ui, "married", &mut draft.married, YesNo::ALL, YesNo::as_str);
                ui.end_row();

                ui.label("Dependents");
                widgets::choice_combo(
                    ui,
                    "dependents",
                    &mut draft.dependents,
                    Dependents::ALL,
                    Dependents::as_str,
                );
                ui.label("Education");
                widgets::choice_combo(
                    ui,
                    "education",
                    &mut draft.education,
                    Education::ALL,
                    Education::as_str,
                );
                ui.end_row();

                ui.label("Self Employed");
                widgets::choice_combo(
                    ui,
                    "self_employed",
                    &mut draft.self_employed,
                    YesNo::ALL,
                    YesNo::as_str,
                );
                ui.label("Property Area");
                widgets::choice_combo(
                    ui,
                    "property_area",
                    &mut draft.property_area,
                    PropertyArea::ALL,
                    PropertyArea::as_str,
                );
                ui.end_row();

                ui.label("Applicant Income ($) *");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.applicant_income).hint_text("e.g., 5000"),
                );
                ui.label("Coapplicant Income ($)");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.coapplicant_income)
                        .hint_text("e.g., 1500"),
                );
                ui.end_row();

                ui.label("Loan Amount ($1000s) *");
                ui.add(egui::TextEdit::singleline(&mut draft.loan_amount).hint_text("e.g., 150"));
                ui.label("Loan Term (months)");
                widgets::text_choice_combo(
                    ui,
                    "loan_term",
                    &mut draft.loan_amount_term,
                    LoanTerm::ALL,
                    |term: LoanTerm| term.months().to_string(),
                    LoanTerm::label,
                );
                ui.end_row();

                ui.label("Credit History");
                widgets::text_choice_combo(
                    ui,
                    "credit_history",
                    &mut draft.credit_history,
                    CreditHistory::ALL,
                    |history: CreditHistory| history.value().to_string(),
                    CreditHistory::label,
                );
                ui.end_row();
            });
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        let label = if submitting {
            "Predicting..."
        } else {
            "Predict Loan Approval"
        };
        if ui
            .add_enabled(!submitting, egui::Button::new(label))
            .clicked()
        {
            submit = true;
        }
        if submitting {
            ui.spinner();
        }
    });

    if let Some(message) = form.validation_message() {
        widgets::error_banner(ui, message);
    }

    match form.state() {
        FormState::Result(result) => {
            ui.separator();
            let color = widgets::decision_color(&result.prediction);
            ui.label(
                RichText::new(format::decision_headline(&result.prediction))
                    .size(22.0)
                    .strong()
                    .color(color),
            );
            ui.label(format::decision_summary(&result.prediction));
            ui.add_space(6.0);
            widgets::percent_bar(
                ui,
                "Approval Probability",
                result.probability,
                &format::percent(result.probability),
            );
            widgets::percent_bar(
                ui,
                "Model Confidence",
                result.confidence,
                &format::percent(result.confidence),
            );
        }
        FormState::Error(message) => {
            ui.separator();
            widgets::error_banner(ui, message);
        }
        FormState::Idle | FormState::Submitting => {}
    }

    submit
}
