use egui::{Color32, RichText};
use shared::protocol::Decision;

pub const APPROVED_COLOR: Color32 = Color32::from_rgb(46, 160, 67);
pub const REJECTED_COLOR: Color32 = Color32::from_rgb(207, 34, 46);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(218, 54, 51);

pub fn decision_color(decision: &Decision) -> Color32 {
    match decision {
        Decision::Approved => APPROVED_COLOR,
        Decision::Rejected => REJECTED_COLOR,
        Decision::Other(_) => Color32::GRAY,
    }
}

/// Labelled progress bar for a value in `0.0..=1.0`.
pub fn percent_bar(ui: &mut egui::Ui, label: &str, fraction: f64, text: &str) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(
            egui::ProgressBar::new(fraction.clamp(0.0, 1.0) as f32)
                .desired_width(220.0)
                .text(text),
        );
    });
}

pub fn error_banner(ui: &mut egui::Ui, message: &str) {
    ui.label(RichText::new(message).color(ERROR_COLOR));
}

pub fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(text).strong().size(16.0));
    ui.add_space(4.0);
}

/// Drop-down over a fixed option list.
pub fn choice_combo<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    value: &mut T,
    options: &[T],
    label: impl Fn(T) -> &'static str,
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(label(*value))
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, *option, label(*option));
            }
        });
}

/// Drop-down that writes the chosen option's value into a text field, so a
/// hand-edited value is still shown as typed.
pub fn text_choice_combo<T: Copy>(
    ui: &mut egui::Ui,
    id: &str,
    text: &mut String,
    options: &[T],
    value: impl Fn(T) -> String,
    label: impl Fn(T) -> &'static str,
) {
    let selected = options
        .iter()
        .find(|option| value(**option) == text.trim())
        .map_or_else(|| text.clone(), |option| label(*option).to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for option in options {
                let option_value = value(*option);
                let checked = option_value == text.trim();
                if ui.selectable_label(checked, label(*option)).clicked() {
                    *text = option_value;
                }
            }
        });
}
