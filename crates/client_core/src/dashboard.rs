//! Model dashboard: one metrics fetch per activation and a render model that
//! drops any section the service left out.

use shared::{error::ApiResult, protocol::ModelMetrics};
use tracing::debug;

use crate::{
    format,
    inflight::{InFlight, RequestTicket},
    PredictionApi,
};

pub const FEATURE_DISPLAY_LIMIT: usize = 10;

/// Class labels shown in the classification report, in display order.
pub const REPORT_CLASSES: [(&str, &str); 2] = [("0", "Rejected"), ("1", "Approved")];

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DashboardState {
    #[default]
    Loading,
    Ready(ModelMetrics),
    Error(String),
}

#[derive(Debug, Default)]
pub struct DashboardController {
    state: DashboardState,
    requested: bool,
    in_flight: InFlight,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DashboardState::Loading)
    }

    /// Hands out a ticket the first time the view is activated; later calls
    /// return `None`. There is no manual refresh.
    pub fn activate(&mut self) -> Option<RequestTicket> {
        if self.requested {
            return None;
        }
        let ticket = self.in_flight.begin()?;
        self.requested = true;
        self.state = DashboardState::Loading;
        debug!(ticket = ticket.id(), "model metrics fetch started");
        Some(ticket)
    }

    pub fn finish(&mut self, ticket: RequestTicket, outcome: ApiResult<ModelMetrics>) -> bool {
        if !self.in_flight.settle(ticket) {
            debug!(ticket = ticket.id(), "dropping stale model metrics");
            return false;
        }
        self.state = match outcome {
            Ok(metrics) => DashboardState::Ready(metrics),
            Err(err) => DashboardState::Error(err.message),
        };
        true
    }

    pub async fn load<A>(&mut self, api: &A) -> &DashboardState
    where
        A: PredictionApi + ?Sized,
    {
        if let Some(ticket) = self.activate() {
            let outcome = api.fetch_model_metrics().await;
            self.finish(ticket, outcome);
        }
        &self.state
    }

    pub fn view(&self) -> Option<DashboardView> {
        match &self.state {
            DashboardState::Ready(metrics) => Some(DashboardView::from_metrics(metrics)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineCard {
    pub title: &'static str,
    pub value: String,
    /// Fill level for a progress bar, when the card is a ratio.
    pub fraction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassRow {
    pub label: &'static str,
    pub precision: String,
    pub recall: String,
    pub f1_score: String,
    pub support: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub rank: usize,
    pub feature: String,
    pub importance: f64,
    pub importance_label: String,
}

/// Display-ready dashboard. A `None` section is not rendered at all.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub headline: Vec<HeadlineCard>,
    pub classification: Option<Vec<ClassRow>>,
    pub confusion_matrix: Option<[[u64; 2]; 2]>,
    pub top_features: Option<Vec<FeatureRow>>,
}

impl DashboardView {
    pub fn from_metrics(metrics: &ModelMetrics) -> Self {
        let mut headline = Vec::new();
        if let Some(name) = &metrics.model_name {
            headline.push(HeadlineCard {
                title: "Model",
                value: name.clone(),
                fraction: None,
            });
        }
        if let Some(accuracy) = metrics.accuracy {
            headline.push(HeadlineCard {
                title: "Accuracy",
                value: format::percent(accuracy),
                fraction: Some(accuracy),
            });
        }
        if let Some(roc_auc) = metrics.roc_auc {
            headline.push(HeadlineCard {
                title: "ROC-AUC Score",
                value: format::percent(roc_auc),
                fraction: Some(roc_auc),
            });
        }

        let classification = metrics.classification_report.as_ref().and_then(|report| {
            let rows: Vec<ClassRow> = REPORT_CLASSES
                .iter()
                .filter_map(|&(key, label)| {
                    report.class_metrics(key).map(|class| ClassRow {
                        label,
                        precision: format::percent(class.precision),
                        recall: format::percent(class.recall),
                        f1_score: format::percent(class.f1_score),
                        support: format::support_count(class.support),
                    })
                })
                .collect();
            (!rows.is_empty()).then_some(rows)
        });

        let top_features = metrics.feature_importance.as_ref().and_then(|features| {
            let rows: Vec<FeatureRow> = features
                .iter()
                .take(FEATURE_DISPLAY_LIMIT)
                .enumerate()
                .map(|(idx, item)| FeatureRow {
                    rank: idx + 1,
                    feature: item.feature.clone(),
                    importance: item.importance,
                    importance_label: format::percent(item.importance),
                })
                .collect();
            (!rows.is_empty()).then_some(rows)
        });

        Self {
            headline,
            classification,
            confusion_matrix: metrics.confusion_matrix.as_deref().and_then(square_2x2),
            top_features,
        }
    }
}

/// Anything but a 2x2 matrix is treated as absent.
fn square_2x2(rows: &[Vec<u64>]) -> Option<[[u64; 2]; 2]> {
    match rows {
        [top, bottom] => match (top.as_slice(), bottom.as_slice()) {
            ([a, b], [c, d]) => Some([[*a, *b], [*c, *d]]),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
