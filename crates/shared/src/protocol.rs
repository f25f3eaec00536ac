use std::{collections::BTreeMap, fmt};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ApiResult, ClientError};

pub const APPROVED_LABEL: &str = "Approved";
pub const REJECTED_LABEL: &str = "Rejected";

/// Approval decision as labelled by the service.
///
/// Batch rows the service could not score come back with other labels
/// (`"Error"`), so unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Decision {
    Approved,
    Rejected,
    Other(String),
}

impl Decision {
    pub fn as_str(&self) -> &str {
        match self {
            Decision::Approved => APPROVED_LABEL,
            Decision::Rejected => REJECTED_LABEL,
            Decision::Other(label) => label,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }
}

impl From<String> for Decision {
    fn from(value: String) -> Self {
        match value.as_str() {
            APPROVED_LABEL => Decision::Approved,
            REJECTED_LABEL => Decision::Rejected,
            _ => Decision::Other(value),
        }
    }
}

impl From<Decision> for String {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Decision,
    pub probability: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    #[serde(deserialize_with = "deserialize_loan_id")]
    pub loan_id: String,
    pub prediction: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The service falls back to row indices when the upload has no `Loan_ID` column.
fn deserialize_loan_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLoanId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match RawLoanId::deserialize(deserializer)? {
        RawLoanId::Text(text) => text,
        RawLoanId::Integer(index) => index.to_string(),
        RawLoanId::Float(value) => value.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: u64,
    pub predictions: Vec<BatchRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: f64,
}

/// Per-class report keyed by class label.
///
/// Besides the class labels the service includes aggregate entries
/// (`accuracy`, `macro avg`, `weighted avg`) whose shapes differ, so entries
/// are decoded lazily.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationReport(pub BTreeMap<String, Value>);

impl ClassificationReport {
    pub fn class_metrics(&self, label: &str) -> Option<ClassMetrics> {
        self.0
            .get(label)
            .and_then(|entry| serde_json::from_value(entry.clone()).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Every section is optional. A section whose shape is not understood is
/// treated as absent so the rest of the dashboard still renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub roc_auc: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub classification_report: Option<ClassificationReport>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<Vec<FeatureImportance>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInfo {
    pub features: Vec<String>,
    pub total_features: u64,
}

fn failure<T>(error: Option<String>, default_message: &str) -> ApiResult<T> {
    Err(ClientError::service(
        error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| default_message.to_string()),
    ))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PredictionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub const DEFAULT_ERROR: &'static str = "Prediction failed";

    pub fn into_result(self) -> ApiResult<PredictionResult> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => failure(self.error, Self::DEFAULT_ERROR),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<BatchRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    pub const DEFAULT_ERROR: &'static str = "Batch prediction failed";

    pub fn into_result(self) -> ApiResult<BatchResult> {
        if !self.success {
            return failure(self.error, Self::DEFAULT_ERROR);
        }
        let predictions = self.predictions.unwrap_or_default();
        Ok(BatchResult {
            total: self.total.unwrap_or(predictions.len() as u64),
            predictions,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelInfoResponse {
    pub const DEFAULT_ERROR: &'static str = "Failed to fetch model information";
    pub const MISSING_METRICS: &'static str = "No model information available";

    pub fn into_result(self) -> ApiResult<ModelMetrics> {
        match (self.success, self.metrics) {
            (true, Some(metrics)) => Ok(metrics),
            (true, None) => Err(ClientError::service(Self::MISSING_METRICS)),
            (false, _) => failure(self.error, Self::DEFAULT_ERROR),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureInfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_features: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeatureInfoResponse {
    pub const DEFAULT_ERROR: &'static str = "Failed to fetch feature information";

    pub fn into_result(self) -> ApiResult<FeatureInfo> {
        if !self.success {
            return failure(self.error, Self::DEFAULT_ERROR);
        }
        let features = self.features.unwrap_or_default();
        Ok(FeatureInfo {
            total_features: self.total_features.unwrap_or(features.len() as u64),
            features,
        })
    }
}
