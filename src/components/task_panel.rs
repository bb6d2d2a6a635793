use crate::canvas::colors::ColorMap;
use crate::components::epoch_view::EpochView;
use crate::components::scaleogram::ScaleogramView;
use crate::components::{event_target_value, yield_to_browser};
use crate::state::AppState;
use crate::types::export_file_name;
use leptos::prelude::*;
use spindle_core::{run_task, Task, TaskReport};
use std::sync::Arc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

/// Save `json` through a temporary object URL.
fn download_json(file_name: &str, json: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let opts = web_sys::BlobPropertyBag::new();
    opts.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let doc = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor: web_sys::HtmlAnchorElement = doc.create_element("a")?.dyn_into().map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url)
}

#[component]
pub fn TaskPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    // Recompute whenever the file, settings, task, or channel change. Runs are
    // deferred one tick so the busy indicator paints first; a newer run
    // supersedes an older one still waiting.
    Effect::new(move || {
        let task = state.task.get();
        let channel = state.channel.get();
        let config = state.config.get();
        let Some(file) = state.file.get() else {
            state.report.set(None);
            return;
        };

        state.run_generation.update(|g| *g = g.wrapping_add(1));
        let generation = state.run_generation.get_untracked();
        state.running.set(true);

        spawn_local(async move {
            yield_to_browser().await;
            if state.run_generation.get_untracked() != generation {
                return;
            }
            let channel = if task.needs_channel() { channel } else { None };
            match run_task(&file.recording, &config, task, channel.as_deref()) {
                Ok(report) => {
                    state.report.set(Some(Arc::new(report)));
                    state.task_error.set(None);
                }
                Err(e) => {
                    log::error!("{} failed: {e}", task.label());
                    state.report.set(None);
                    state.task_error.set(Some(e.to_string()));
                }
            }
            state.running.set(false);
        });
    });

    let on_export = move |_: web_sys::MouseEvent| {
        let Some(report) = state.report.get_untracked() else { return };
        let source = state.file.with_untracked(|f| f.as_ref().map(|f| f.name.clone()));
        let channel = state.channel.get_untracked();
        let task = state.task.get_untracked();
        let name = export_file_name(
            source.as_deref().unwrap_or("recording"),
            task,
            channel.as_deref().filter(|_| task.needs_channel()),
        );
        let result = serde_json::to_string_pretty(report.as_ref())
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|json| download_json(&name, &json));
        if let Err(e) = result {
            log::error!("export failed: {e:?}");
        }
    };

    view! {
        <div class="task-panel">
            <div class="task-choices">
                {Task::ALL.into_iter().map(|task| view! {
                    <label class="task-choice">
                        <input
                            type="radio"
                            name="task"
                            prop:checked=move || state.task.get() == task
                            on:change=move |_| state.task.set(task)
                        />
                        {task.label()}
                    </label>
                }).collect_view()}
            </div>
            <ChannelSelect />
            <div class="task-actions">
                <button
                    class="setting-button"
                    prop:disabled=move || state.report.with(|r| r.is_none())
                    on:click=on_export
                >"Export JSON"</button>
                {move || state.running.get().then(|| view! { <span class="busy">"Analysing..."</span> })}
            </div>
            {move || state.task_error.get().map(|e| view! { <div class="error-text">{e}</div> })}
            <TaskResult />
        </div>
    }
}

#[component]
fn ChannelSelect() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        if !state.task.get().needs_channel() {
            return None;
        }
        let names = state.channel_names();
        let selected = state.channel.get().unwrap_or_default();
        Some(view! {
            <div class="setting-row">
                <span class="setting-label">"Electrode"</span>
                <select
                    class="setting-select"
                    on:change=move |ev: web_sys::Event| {
                        let value = event_target_value(&ev);
                        state.channel.set((!value.is_empty()).then_some(value));
                    }
                >
                    {names.into_iter().map(|name| {
                        let is_selected = name == selected;
                        view! { <option value=name.clone() selected=is_selected>{name.clone()}</option> }
                    }).collect_view()}
                </select>
            </div>
        })
    }
}

#[component]
fn TaskResult() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        let report = state.report.get()?;
        let sheet = state.file.with(|f| f.as_ref().map(|f| f.label().to_string())).unwrap_or_default();
        let content = match report.as_ref().clone() {
            TaskReport::TotalCount { total } => view! {
                <div class="banner success">{format!("Total Alpha Spindles in {sheet}: {total}")}</div>
            }
            .into_any(),
            TaskReport::ChannelCounts { channels } => view! {
                <div class="result-list">
                    <div class="plot-title">"Spindle Count Per Electrode"</div>
                    {channels.into_iter().map(|c| view! {
                        <div class="result-row">{format!("{}: {} spindles", c.channel, c.count)}</div>
                    }).collect_view()}
                </div>
            }
            .into_any(),
            TaskReport::Wavelet { channel, scaleogram } => view! {
                <ScaleogramView
                    scaleogram=scaleogram
                    colormap=ColorMap::Viridis
                    title=format!("Wavelet Power (Alpha Band) - {channel}")
                />
            }
            .into_any(),
            TaskReport::Epochs { channel, sample_rate, epochs } => {
                let count = epochs.len();
                view! {
                    <div class="epochs">
                        <div class="plot-title">{format!("{channel}: {count} epochs")}</div>
                        {(count == 0).then(|| view! {
                            <div class="plot-note">"Recording is shorter than one epoch"</div>
                        })}
                        {epochs.into_iter().map(|epoch| view! {
                            <EpochView epoch=epoch sample_rate=sample_rate />
                        }).collect_view()}
                    </div>
                }
                .into_any()
            }
        };
        Some(content)
    }
}
