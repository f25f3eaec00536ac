use super::*;
use crate::fake_api::FakeApi;
use shared::{
    error::ClientError,
    protocol::{ClassificationReport, FeatureImportance},
};

fn report() -> ClassificationReport {
    serde_json::from_value(serde_json::json!({
        "0": {"precision": 0.9, "recall": 0.42, "f1-score": 0.57, "support": 43.0},
        "1": {"precision": 0.79, "recall": 0.98, "f1-score": 0.875, "support": 80.0},
        "accuracy": 0.81
    }))
    .expect("report")
}

fn features(count: usize) -> Vec<FeatureImportance> {
    (0..count)
        .map(|idx| FeatureImportance {
            feature: format!("feature_{idx}"),
            importance: 0.5 / (idx as f64 + 1.0),
        })
        .collect()
}

fn full_metrics() -> ModelMetrics {
    ModelMetrics {
        model_name: Some("Random Forest".to_string()),
        accuracy: Some(0.8211),
        roc_auc: Some(0.77),
        classification_report: Some(report()),
        confusion_matrix: Some(vec![vec![18, 25], vec![2, 78]]),
        feature_importance: Some(features(3)),
    }
}

#[test]
fn full_metrics_render_every_section() {
    let view = DashboardView::from_metrics(&full_metrics());

    let titles: Vec<&str> = view.headline.iter().map(|card| card.title).collect();
    assert_eq!(titles, ["Model", "Accuracy", "ROC-AUC Score"]);
    assert_eq!(view.headline[1].value, "82.11%");
    assert_eq!(view.headline[1].fraction, Some(0.8211));

    let classes = view.classification.expect("classification");
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].label, "Rejected");
    assert_eq!(classes[0].recall, "42.00%");
    assert_eq!(classes[0].support, "43");
    assert_eq!(classes[1].label, "Approved");
    assert_eq!(classes[1].f1_score, "87.50%");

    assert_eq!(view.confusion_matrix, Some([[18, 25], [2, 78]]));
    let top = view.top_features.expect("features");
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].importance_label, "50.00%");
}

#[test]
fn missing_feature_importance_omits_only_that_section() {
    let metrics = ModelMetrics {
        feature_importance: None,
        ..full_metrics()
    };
    let view = DashboardView::from_metrics(&metrics);

    assert!(view.top_features.is_none());
    assert!(view.classification.is_some());
    assert!(view.confusion_matrix.is_some());
    assert_eq!(view.headline.len(), 3);
}

#[test]
fn at_most_ten_features_in_service_order() {
    let metrics = ModelMetrics {
        feature_importance: Some(features(14)),
        ..ModelMetrics::default()
    };
    let top = DashboardView::from_metrics(&metrics)
        .top_features
        .expect("features");

    assert_eq!(top.len(), FEATURE_DISPLAY_LIMIT);
    let names: Vec<&str> = top.iter().map(|row| row.feature.as_str()).collect();
    assert_eq!(names[0], "feature_0");
    assert_eq!(names[9], "feature_9");
    assert_eq!(top[9].rank, 10);
}

#[test]
fn irregular_confusion_matrix_is_omitted() {
    for matrix in [
        vec![vec![1, 2, 3], vec![4, 5, 6]],
        vec![vec![1, 2]],
        vec![vec![1, 2], vec![3]],
        Vec::new(),
    ] {
        let metrics = ModelMetrics {
            confusion_matrix: Some(matrix),
            ..ModelMetrics::default()
        };
        assert!(DashboardView::from_metrics(&metrics).confusion_matrix.is_none());
    }
}

#[test]
fn report_without_known_classes_is_omitted() {
    let metrics = ModelMetrics {
        classification_report: Some(
            serde_json::from_value(serde_json::json!({"accuracy": 0.8})).expect("report"),
        ),
        ..ModelMetrics::default()
    };
    let view = DashboardView::from_metrics(&metrics);
    assert!(view.classification.is_none());
    assert!(view.headline.is_empty());
}

#[tokio::test]
async fn load_fetches_once_per_controller() {
    let api = FakeApi::new().with_metrics(full_metrics());
    let mut controller = DashboardController::new();
    assert!(controller.is_loading());

    controller.load(&api).await;
    controller.load(&api).await;

    assert_eq!(*api.metric_fetches.lock().expect("lock"), 1);
    assert!(matches!(controller.state(), DashboardState::Ready(_)));
    assert!(controller.view().is_some());
}

#[tokio::test]
async fn failed_load_shows_error() {
    let api = FakeApi::failing(ClientError::service("Failed to fetch model information"));
    let mut controller = DashboardController::new();

    controller.load(&api).await;

    assert_eq!(
        controller.state(),
        &DashboardState::Error("Failed to fetch model information".to_string())
    );
    assert!(controller.view().is_none());
}

#[test]
fn stale_metrics_are_dropped() {
    let mut controller = DashboardController::new();
    let ticket = controller.activate().expect("ticket");
    assert!(controller.finish(ticket, Ok(ModelMetrics::default())));
    assert!(!controller.finish(ticket, Err(ClientError::connection())));
    assert!(matches!(controller.state(), DashboardState::Ready(_)));
}
