use crate::components::event_target_value;
use crate::state::AppState;
use crate::types::{LoadedFile, SourceContent, SourceFile};
use leptos::prelude::*;
use spindle_core::{is_workbook_name, load_recording, workbook_sheets};
use std::sync::Arc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

/// Read a picked file as text.
async fn read_text(file: &web_sys::File) -> Result<String, String> {
    let value = JsFuture::from(file.text())
        .await
        .map_err(|e| format!("could not read {}: {e:?}", file.name()))?;
    value
        .as_string()
        .ok_or_else(|| format!("{} is not a text file", file.name()))
}

/// Read a picked file as raw bytes.
async fn read_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("could not read {}: {e:?}", file.name()))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Read a picked file and, for workbooks, list its sheets.
async fn read_source(file: web_sys::File) -> Result<SourceFile, String> {
    let name = file.name();
    let content = if is_workbook_name(&name) {
        let bytes = read_bytes(&file).await?;
        let sheets = workbook_sheets(&bytes).map_err(|e| format!("{name}: {e}"))?;
        SourceContent::Workbook { bytes, sheets }
    } else {
        SourceContent::Text(read_text(&file).await?)
    };
    Ok(SourceFile { name, content })
}

#[component]
pub fn FilePanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    // Re-parse whenever the source, the sheet, or the sampling rate changes.
    // Other settings don't touch the table.
    let sample_rate = Memo::new(move |_| state.config.with(|c| c.sample_rate));
    Effect::new(move || {
        let rate = sample_rate.get();
        let sheet = state.sheet.get();
        let Some(source) = state.source.get() else {
            return;
        };
        let sheet = sheet.filter(|_| !source.sheets().is_empty());
        match load_recording(source.table(sheet.as_deref()), rate) {
            Ok(recording) => {
                let first = recording.channel_names().next().map(str::to_string);
                let keep = state
                    .channel
                    .get_untracked()
                    .filter(|ch| recording.channel(ch).is_some());
                state.channel.set(keep.or(first));
                state.file.set(Some(Arc::new(LoadedFile {
                    name: source.name.clone(),
                    sheet,
                    recording,
                })));
                state.load_error.set(None);
            }
            Err(e) => {
                log::error!("failed to parse {}: {e}", source.name);
                state.file.set(None);
                state.load_error.set(Some(format!("{}: {e}", source.name)));
            }
        }
    });

    let on_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        spawn_local(async move {
            match read_source(file).await {
                Ok(source) => {
                    log::info!("loaded {} ({} bytes)", source.name, source.size());
                    state.report.set(None);
                    state.sheet.set(source.sheets().first().cloned());
                    state.source.set(Some(Arc::new(source)));
                }
                Err(e) => {
                    log::error!("{e}");
                    state.load_error.set(Some(e));
                }
            }
        });
    };

    view! {
        <div class="sidebar-panel">
            <div class="setting-group-title">"Recording"</div>
            <input
                type="file"
                class="file-input"
                accept=".csv,.tsv,.txt,.xlsx"
                on:change=on_change
            />
            <SheetSelect />
            {move || state.load_error.get().map(|e| view! {
                <div class="error-text">{e}</div>
            })}
            {move || state.file.get().map(|f| view! {
                <div class="file-name">{f.name.clone()}</div>
            })}
        </div>
    }
}

/// Worksheet picker, shown only for workbook sources.
#[component]
fn SheetSelect() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        let sheets = state.source.with(|s| s.as_ref().map(|s| s.sheets().to_vec()).unwrap_or_default());
        if sheets.is_empty() {
            return None;
        }
        let selected = state.sheet.get().unwrap_or_default();
        Some(view! {
            <div class="setting-row">
                <span class="setting-label">"Sheet"</span>
                <select
                    class="setting-select"
                    on:change=move |ev: web_sys::Event| {
                        let value = event_target_value(&ev);
                        state.report.set(None);
                        state.sheet.set((!value.is_empty()).then_some(value));
                    }
                >
                    {sheets.into_iter().map(|name| {
                        let is_selected = name == selected;
                        view! { <option value=name.clone() selected=is_selected>{name.clone()}</option> }
                    }).collect_view()}
                </select>
            </div>
        })
    }
}
