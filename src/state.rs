use crate::types::{LoadedFile, SourceFile};
use leptos::prelude::*;
use spindle_core::{AnalysisConfig, Task, TaskReport};
use std::sync::Arc;

#[derive(Clone, Copy)]
pub struct AppState {
    pub source: RwSignal<Option<Arc<SourceFile>>>,
    /// Selected worksheet when the source is a workbook.
    pub sheet: RwSignal<Option<String>>,
    pub file: RwSignal<Option<Arc<LoadedFile>>>,
    pub load_error: RwSignal<Option<String>>,
    pub config: RwSignal<AnalysisConfig>,
    pub task: RwSignal<Task>,
    pub channel: RwSignal<Option<String>>,
    pub report: RwSignal<Option<Arc<TaskReport>>>,
    pub task_error: RwSignal<Option<String>>,
    pub running: RwSignal<bool>,
    /// Bumped on every run; stale async runs compare and bail.
    pub run_generation: RwSignal<u32>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            source: RwSignal::new(None),
            sheet: RwSignal::new(None),
            file: RwSignal::new(None),
            load_error: RwSignal::new(None),
            config: RwSignal::new(AnalysisConfig::default()),
            task: RwSignal::new(Task::TotalCount),
            channel: RwSignal::new(None),
            report: RwSignal::new(None),
            task_error: RwSignal::new(None),
            running: RwSignal::new(false),
            run_generation: RwSignal::new(0),
        }
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.file.with(|f| {
            f.as_ref()
                .map(|f| f.recording.channel_names().map(str::to_string).collect())
                .unwrap_or_default()
        })
    }
}
