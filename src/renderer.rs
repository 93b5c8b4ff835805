use crate::models::{AnalysisFragment, DataFragment, SnapshotRow, ViewSnapshot};
use chrono::Local;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait Renderer: Send + Sync {
    fn loading_started(&self);
    fn query_accepted(&self, query: &str);
    fn loading_ended(&self);
    fn render_analysis(&self, fragment: &AnalysisFragment);
    fn render_data(&self, fragment: &DataFragment);
    fn render_notice(&self, message: &str);
}

#[derive(Debug, Default)]
pub struct ViewRenderer {
    view: Mutex<ViewSnapshot>,
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ViewSnapshot> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Renderer for ViewRenderer {
    fn loading_started(&self) {
        let mut view = self.lock();
        view.loading = true;
        view.notice = None;
        view.analysis.clear();
        view.rows.clear();
    }

    fn query_accepted(&self, query: &str) {
        self.lock().query = Some(query.to_string());
    }

    fn loading_ended(&self) {
        self.lock().loading = false;
    }

    fn render_analysis(&self, fragment: &AnalysisFragment) {
        let mut view = self.lock();
        view.analysis = fragment.lines.clone();
        view.renders += 1;
        view.updated_at = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    }

    fn render_data(&self, fragment: &DataFragment) {
        self.lock().rows = fragment
            .rows
            .iter()
            .map(|row| SnapshotRow {
                year: row.year,
                value: row.display.clone(),
            })
            .collect();
    }

    fn render_notice(&self, message: &str) {
        self.lock().notice = Some(message.to_string());
    }
}
