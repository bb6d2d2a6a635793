use crate::components::file_panel::FilePanel;
use crate::components::overview::Overview;
use crate::components::settings_panel::SettingsPanel;
use crate::components::task_panel::TaskPanel;
use crate::state::AppState;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(state);

    view! {
        <div class="app">
            <div class="sidebar">
                <FilePanel />
                <SettingsPanel />
            </div>
            <MainArea />
        </div>
    }
}

#[component]
fn MainArea() -> impl IntoView {
    let state = expect_context::<AppState>();
    let has_file = move || state.file.with(|f| f.is_some());

    view! {
        <div class="main">
            <div class="toolbar">
                <span class="app-title">"EEG Alpha Spindle Analyzer"</span>
            </div>
            {move || {
                if has_file() {
                    view! {
                        <Overview />
                        <TaskPanel />
                    }.into_any()
                } else {
                    view! {
                        <div class="empty-state">
                            "Open a CSV or TSV export with one column per electrode"
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}
