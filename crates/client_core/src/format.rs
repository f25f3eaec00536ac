//! Display strings and CSV export for prediction results.

use shared::protocol::{BatchRecord, BatchResult, Decision};

pub const EXPORT_HEADER: [&str; 4] = ["Loan ID", "Prediction", "Probability", "Confidence"];
pub const NOT_AVAILABLE: &str = "N/A";

/// `0.8234` -> `"82.34%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn optional_percent(fraction: Option<f64>) -> String {
    fraction.map_or_else(|| NOT_AVAILABLE.to_string(), percent)
}

pub fn decision_headline(decision: &Decision) -> String {
    format!("Loan {decision}")
}

pub fn decision_summary(decision: &Decision) -> &'static str {
    if decision.is_approved() {
        "The loan application is likely to be approved."
    } else {
        "The loan application is likely to be rejected."
    }
}

/// Supports arrive as floats (`43.0`); whole numbers render without decimals.
pub fn support_count(support: f64) -> String {
    if support.fract() == 0.0 {
        format!("{support:.0}")
    } else {
        support.to_string()
    }
}

pub fn export_fields(record: &BatchRecord) -> [String; 4] {
    [
        record.loan_id.clone(),
        record.prediction.to_string(),
        optional_percent(record.probability),
        optional_percent(record.confidence),
    ]
}

/// Fields are joined verbatim: commas or quotes inside a loan id or label are
/// not escaped.
pub fn export_row(record: &BatchRecord) -> String {
    export_fields(record).join(",")
}

/// Every record of the batch, header first, rows separated by `\n`.
pub fn batch_csv(result: &BatchResult) -> String {
    std::iter::once(EXPORT_HEADER.join(","))
        .chain(result.predictions.iter().map(export_row))
        .collect::<Vec<_>>()
        .join("\n")
}
