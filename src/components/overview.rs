use crate::state::AppState;
use leptos::prelude::*;

const PREVIEW_ROWS: usize = 5;

/// File name, shape, duration, and the first rows of the table.
#[component]
pub fn Overview() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        let file = state.file.get()?;
        let summary = file.recording.summary();
        let head = file.recording.head(PREVIEW_ROWS);
        let names = summary.channel_names.clone();

        Some(view! {
            <div class="overview">
                <div class="overview-title">"EEG Signal Overview"</div>
                <div class="overview-facts">
                    <span>{file.name.clone()}</span>
                    {file.sheet.clone().map(|sheet| view! { <span>{format!("Sheet: {sheet}")}</span> })}
                    <span>{format!("Shape: {}", file.shape_label())}</span>
                    <span>{format!("{:.2} s at {} Hz", summary.duration_secs, summary.sample_rate)}</span>
                </div>
                <div class="preview-scroll">
                    <table class="preview">
                        <thead>
                            <tr>
                                <th></th>
                                {names.into_iter().map(|n| view! { <th>{n}</th> }).collect_view()}
                            </tr>
                        </thead>
                        <tbody>
                            {head.into_iter().enumerate().map(|(i, row)| view! {
                                <tr>
                                    <td class="row-index">{i}</td>
                                    {row.into_iter().map(|v| view! { <td>{format!("{v:.4}")}</td> }).collect_view()}
                                </tr>
                            }).collect_view()}
                        </tbody>
                    </table>
                </div>
            </div>
        })
    }
}
