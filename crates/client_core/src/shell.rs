use tracing::debug;

use crate::{BatchController, DashboardController, FormController};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    SinglePrediction,
    BatchPrediction,
    ModelDashboard,
}

impl Tab {
    pub const ALL: &'static [Tab] = &[
        Tab::SinglePrediction,
        Tab::BatchPrediction,
        Tab::ModelDashboard,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::SinglePrediction => "Single Prediction",
            Tab::BatchPrediction => "Batch Prediction",
            Tab::ModelDashboard => "Model Dashboard",
        }
    }
}

/// Active tab plus the state owned by each tab. Leaving a tab discards its
/// state, so the next visit starts from defaults.
#[derive(Debug, Default)]
pub struct ViewShell {
    active: Tab,
    pub form: FormController,
    pub batch: BatchController,
    pub dashboard: DashboardController,
}

impl ViewShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Returns false when `tab` is already active.
    pub fn activate(&mut self, tab: Tab) -> bool {
        if tab == self.active {
            return false;
        }
        let left = std::mem::replace(&mut self.active, tab);
        match left {
            Tab::SinglePrediction => self.form = FormController::new(),
            Tab::BatchPrediction => self.batch = BatchController::new(),
            Tab::ModelDashboard => self.dashboard = DashboardController::new(),
        }
        debug!(from = left.title(), to = tab.title(), "tab switched");
        true
    }
}
