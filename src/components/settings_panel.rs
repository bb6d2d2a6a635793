use crate::components::event_target_value;
use crate::state::AppState;
use leptos::prelude::*;
use spindle_core::AnalysisConfig;

#[component]
fn NumberRow(
    label: &'static str,
    step: &'static str,
    get: fn(&AnalysisConfig) -> f64,
    set: fn(&mut AnalysisConfig, f64),
) -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="setting-row">
            <span class="setting-label">{label}</span>
            <input
                type="number"
                class="setting-number"
                step=step
                prop:value=move || state.config.with(get).to_string()
                on:change=move |ev: web_sys::Event| {
                    match event_target_value(&ev).trim().parse::<f64>() {
                        Ok(v) => state.config.update(|c| set(c, v)),
                        Err(_) => log::warn!("ignoring non-numeric {label}"),
                    }
                }
            />
        </div>
    }
}

#[component]
pub fn SettingsPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let problem = move || state.config.with(|c| c.validate().err().map(|e| e.to_string()));

    view! {
        <div class="sidebar-panel">
            <div class="setting-group">
                <div class="setting-group-title">"Recording"</div>
                <NumberRow
                    label="Sampling rate (Hz)"
                    step="1"
                    get=|c: &AnalysisConfig| c.sample_rate
                    set=|c: &mut AnalysisConfig, v: f64| c.sample_rate = v
                />
            </div>
            <div class="setting-group">
                <div class="setting-group-title">"Detection"</div>
                <NumberRow
                    label="Threshold (x std)"
                    step="0.1"
                    get=|c: &AnalysisConfig| c.spindle.threshold_factor
                    set=|c: &mut AnalysisConfig, v: f64| c.spindle.threshold_factor = v
                />
                <NumberRow
                    label="Min duration (s)"
                    step="0.05"
                    get=|c: &AnalysisConfig| c.spindle.min_duration_secs
                    set=|c: &mut AnalysisConfig, v: f64| c.spindle.min_duration_secs = v
                />
            </div>
            <div class="setting-group">
                <div class="setting-group-title">"Wavelet band"</div>
                <NumberRow
                    label="Low (Hz)"
                    step="0.5"
                    get=|c: &AnalysisConfig| c.band.low_hz
                    set=|c: &mut AnalysisConfig, v: f64| c.band.low_hz = v
                />
                <NumberRow
                    label="High (Hz)"
                    step="0.5"
                    get=|c: &AnalysisConfig| c.band.high_hz
                    set=|c: &mut AnalysisConfig, v: f64| c.band.high_hz = v
                />
            </div>
            <div class="setting-group">
                <div class="setting-group-title">"Epochs"</div>
                <NumberRow
                    label="Length (s)"
                    step="1"
                    get=|c: &AnalysisConfig| c.epoch_secs
                    set=|c: &mut AnalysisConfig, v: f64| c.epoch_secs = v
                />
            </div>
            {move || problem().map(|e| view! { <div class="error-text">{e}</div> })}
            <div class="setting-row">
                <button
                    class="setting-button"
                    on:click=move |_| state.config.set(AnalysisConfig::default())
                >"Reset"</button>
            </div>
        </div>
    }
}
