use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    batch::TRUNCATION_NOTE,
    config::{self, ClientSettings},
    format, BatchController, BatchState, CsvUpload, DashboardController, DashboardState,
    DashboardView, FormController, FormField, FormState, PredictionClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loan-cli", about = "Command-line client for the loan prediction service")]
struct Args {
    /// Prediction service base URL; overrides loan_client.toml and LOAN_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print raw JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a single application. Fields left out keep the form defaults.
    Predict {
        #[arg(long)]
        applicant_income: Option<String>,
        #[arg(long)]
        loan_amount: Option<String>,
        /// Any other form field, e.g. `--field Property_Area=Rural`.
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Score every row of a CSV file.
    Batch {
        file: PathBuf,
        /// Write all results as CSV; without a value uses the configured file name.
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Show the model dashboard.
    ModelInfo,
    /// Check service liveness.
    Health,
    /// List the features the model expects.
    Features,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = config::load_settings()?.with_api_url_override(args.api_url.clone())?;
    tracing::info!(api = %settings.api_base_url, "using prediction service");
    let client = PredictionClient::from_settings(&settings);

    match args.command {
        Command::Predict {
            applicant_income,
            loan_amount,
            fields,
        } => {
            let mut form = FormController::new();
            fill_form(&mut form, applicant_income, loan_amount, &fields)?;
            form.submit(&client).await;
            match form.state() {
                FormState::Result(result) if args.json => {
                    println!("{}", serde_json::to_string_pretty(result)?)
                }
                FormState::Result(result) => {
                    println!("{}", format::decision_headline(&result.prediction));
                    println!("{}", format::decision_summary(&result.prediction));
                    println!("Approval probability: {}", format::percent(result.probability));
                    println!("Confidence: {}", format::percent(result.confidence));
                }
                FormState::Error(message) => bail!("{message}"),
                FormState::Idle | FormState::Submitting => {
                    bail!("{}", form.validation_message().unwrap_or("prediction was not sent"))
                }
            }
        }
        Command::Batch { file, export } => {
            let upload = CsvUpload::from_path(&file)?;
            let mut batch = BatchController::new();
            if !batch.select_file(Some(upload)) {
                bail!("{}", batch.error().unwrap_or_default());
            }
            if let BatchState::Error(message) = batch.submit(&client).await {
                bail!("{message}");
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&batch.result())?);
            } else {
                print_batch(&batch);
            }
            if let Some(path) = export {
                let path = export_path(path, &settings);
                let rows = batch.export_to(&path)?;
                println!("Exported {rows} rows to {}", path.display());
            }
        }
        Command::ModelInfo => {
            let mut dashboard = DashboardController::new();
            match dashboard.load(&client).await {
                DashboardState::Ready(metrics) if args.json => {
                    println!("{}", serde_json::to_string_pretty(metrics)?)
                }
                DashboardState::Ready(metrics) => {
                    print_dashboard(&DashboardView::from_metrics(metrics))
                }
                DashboardState::Error(message) => bail!("{message}"),
                DashboardState::Loading => bail!("model information was not fetched"),
            }
        }
        Command::Health => {
            let health = client.health().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                let model = if health.model_loaded {
                    "loaded"
                } else {
                    "not loaded"
                };
                println!("Service {}; model {model}", health.status);
            }
        }
        Command::Features => {
            let info = client.feature_info().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} features:", info.total_features);
                for feature in &info.features {
                    println!("  {feature}");
                }
            }
        }
    }

    Ok(())
}

fn fill_form(
    form: &mut FormController,
    applicant_income: Option<String>,
    loan_amount: Option<String>,
    fields: &[String],
) -> Result<()> {
    for raw in fields {
        let (field, value) = parse_assignment(raw)?;
        form.draft.set(field, value)?;
    }
    if let Some(value) = applicant_income {
        form.draft.set(FormField::ApplicantIncome, &value)?;
    }
    if let Some(value) = loan_amount {
        form.draft.set(FormField::LoanAmount, &value)?;
    }
    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(FormField, &str)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((key.trim().parse::<FormField>()?, value.trim()))
}

fn export_path(explicit: Option<PathBuf>, settings: &ClientSettings) -> PathBuf {
    explicit.unwrap_or_else(|| Path::new(&settings.export_file_name).to_path_buf())
}

fn print_batch(batch: &BatchController) {
    let Some(summary) = batch.summary() else {
        return;
    };
    println!("{}", summary.headline());
    println!("Approved: {}  Rejected: {}", summary.approved, summary.rejected);
    println!();
    println!("{:<12} {:<10} {:>12} {:>12}", "Loan ID", "Prediction", "Probability", "Confidence");
    for record in batch.displayed_records() {
        let [loan_id, prediction, probability, confidence] = format::export_fields(record);
        println!("{loan_id:<12} {prediction:<10} {probability:>12} {confidence:>12}");
    }
    if batch.is_truncated() {
        println!("{TRUNCATION_NOTE}");
    }
}

fn print_dashboard(view: &DashboardView) {
    for card in &view.headline {
        println!("{}: {}", card.title, card.value);
    }
    if let Some(rows) = &view.classification {
        println!();
        println!("Classification report");
        println!("{:<10} {:>10} {:>10} {:>10} {:>8}", "Class", "Precision", "Recall", "F1", "Support");
        for row in rows {
            println!(
                "{:<10} {:>10} {:>10} {:>10} {:>8}",
                row.label, row.precision, row.recall, row.f1_score, row.support
            );
        }
    }
    if let Some([[tn, fp], [fn_, tp]]) = view.confusion_matrix {
        println!();
        println!("Confusion matrix (rows: actual, columns: predicted)");
        println!("{:<10} {:>10} {:>10}", "", "Rejected", "Approved");
        println!("{:<10} {tn:>10} {fp:>10}", "Rejected");
        println!("{:<10} {fn_:>10} {tp:>10}", "Approved");
    }
    if let Some(features) = &view.top_features {
        println!();
        println!("Top features");
        for row in features {
            println!("{:>2}. {:<24} {}", row.rank, row.feature, row.importance_label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_accept_service_keys() {
        let (field, value) = parse_assignment("Property_Area = Rural").expect("parse");
        assert_eq!(field, FormField::PropertyArea);
        assert_eq!(value, "Rural");

        assert!(parse_assignment("Property_Area").is_err());
        assert!(parse_assignment("Salary=10").is_err());
    }

    #[test]
    fn explicit_flags_fill_required_fields() {
        let mut form = FormController::new();
        fill_form(
            &mut form,
            Some("5000".to_string()),
            Some("150".to_string()),
            &["Credit_History=0".to_string(), "Education=Not Graduate".to_string()],
        )
        .expect("fill");

        let input = form.draft.to_input();
        assert_eq!(input.applicant_income, 5000.0);
        assert_eq!(input.loan_amount, 150.0);
        assert_eq!(input.credit_history, 0.0);
        assert!(form.draft.missing_required().is_empty());
    }

    #[test]
    fn export_flag_without_value_uses_configured_name() {
        let args = Args::try_parse_from(["loan-cli", "batch", "loans.csv", "--export"])
            .expect("args");
        let Command::Batch { export, .. } = args.command else {
            panic!("expected batch command");
        };
        let path = export_path(export.flatten(), &ClientSettings::default());
        assert_eq!(path, PathBuf::from("loan_predictions.csv"));
    }

    #[test]
    fn api_url_flag_is_global() {
        let args = Args::try_parse_from(["loan-cli", "health", "--api-url", "http://10.0.0.5:5000"])
            .expect("args");
        assert_eq!(args.api_url.as_deref(), Some("http://10.0.0.5:5000"));
    }
}
