use dioxus::prelude::*;

use crate::charts::{dispatch, ChartOptions};
use crate::config::AppConfig;
use crate::hooks::rag::{use_dashboard_client, use_rag};
use crate::models::StructuredError;
use crate::state::{use_app_state, ChartSlot};
use crate::ui::chart::ChartPanel;

#[component]
fn PromptForm(
    loading: bool,
    #[props(!optional)] form_error: Option<String>,
    on_submit: EventHandler<String>,
) -> Element {
    let mut prompt = use_signal(String::new);

    rsx! {
        form { class: "space-y-3",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                on_submit.call(prompt.read().clone());
            },
            label { class: "block space-y-1 text-slate-700",
                span { class: "block text-sm font-medium", "Input" }
                input {
                    class: "w-full rounded border border-slate-300 bg-white p-2 text-sm",
                    placeholder: "Input to get model...",
                    value: "{prompt}",
                    oninput: move |evt| prompt.set(evt.value()),
                }
                span { class: "block text-xs text-slate-500", "Enter your query to analyze data" }
            }
            if let Some(message) = form_error {
                p { class: "text-xs text-red-600", "{message}" }
            }
            button {
                class: "rounded bg-slate-900 px-4 py-2 text-sm text-white disabled:opacity-50",
                r#type: "submit",
                disabled: loading,
                if loading { "Processing..." } else { "Submit" }
            }
        }
    }
}

/// 结构化错误面板，`data_not_found` 时展示全部字段。
#[component]
pub fn QueryErrorPanel(error: StructuredError) -> Element {
    let details: Vec<(&'static str, String)> = match &error {
        StructuredError::DataNotFound {
            reason,
            suggestion,
            summary,
            available_data_summary,
            ..
        } => vec![
            ("Reason", reason.clone()),
            ("Suggestion", suggestion.clone()),
            ("Summary", summary.clone()),
            ("Available Data Summary", available_data_summary.clone()),
        ],
        StructuredError::Generic { .. } => vec![("Reason", error.reason().to_string())],
    };

    let message = error.message();

    rsx! {
        div { class: "mt-4 space-y-1 rounded bg-red-100 p-4 text-sm text-red-800",
            h2 { class: "font-bold", "Error: {message}" }
            for (label, value) in details {
                p { key: "{label}",
                    strong { "{label}: " }
                    "{value}"
                }
            }
        }
    }
}

/// 仪表盘上的试验面板，直接走 `process_query`。
#[component]
pub fn PlaygroundPanel() -> Element {
    let rag = use_rag();
    let state = use_app_state().read().playground.clone();
    let view = dispatch(state.chart.as_ref(), state.is_loading, &ChartOptions::default());
    let error_message = state.error.as_ref().map(|error| error.message().to_string());

    let submit_rag = rag.clone();
    let fetch_rag = rag.clone();

    rsx! {
        section { class: "mb-8 w-full rounded-3xl bg-slate-200 px-8 py-4 shadow",
            div { class: "mb-4 flex flex-col justify-between gap-2",
                h1 { class: "text-3xl font-bold text-slate-800", "Testing AI Dashboard" }
                button {
                    class: "rounded bg-blue-500 px-4 py-2 text-white hover:bg-blue-600",
                    r#type: "button",
                    onclick: move |_| fetch_rag.reload_products(),
                    "Fetch API"
                }
            }
            div { class: "flex w-full items-center justify-center p-8",
                ChartPanel { view }
            }
            if let Some(message) = error_message {
                div { class: "mb-4 text-red-500", "{message}" }
            }
            PromptForm {
                loading: state.is_loading,
                form_error: state.form_error.clone(),
                on_submit: move |prompt: String| submit_rag.process_query(prompt),
            }
        }
    }
}

/// `/assistant`：`query_generate` 生成图表，附带刷新 RAG 数据入口。
#[component]
pub fn AssistantPanel() -> Element {
    let rag = use_rag();
    let (state, refreshing) = {
        let app = use_app_state();
        let snapshot = app.read();
        (
            snapshot.chart(ChartSlot::Assistant).clone(),
            snapshot.operation.in_flight,
        )
    };
    let view = dispatch(state.chart.as_ref(), state.is_loading, &ChartOptions::default());
    let refresh_source = use_dashboard_client()
        .map(|client| client.config().refresh_source.clone())
        .unwrap_or_else(|| AppConfig::default().refresh_source);

    let submit_rag = rag.clone();
    let refresh_rag = rag.clone();

    rsx! {
        section { class: "flex w-full flex-col gap-10 py-16 lg:flex-row",
            div { class: "min-h-[400px] rounded-2xl bg-white shadow lg:min-w-[900px]",
                div { class: "flex h-full w-full items-center justify-center p-8",
                    ChartPanel { view }
                }
            }
            div { class: "h-full w-full rounded-2xl bg-white px-10 py-7 shadow",
                div { class: "flex justify-between",
                    h1 { class: "text-2xl font-bold", "ChatbotAI" }
                    button {
                        class: "rounded border border-blue-400 px-5 py-3 text-blue-500 disabled:opacity-50",
                        r#type: "button",
                        disabled: refreshing,
                        onclick: move |_| refresh_rag.refresh_rag(refresh_source.clone()),
                        if refreshing { "Refreshing..." } else { "Refresh Data" }
                    }
                }
                PromptForm {
                    loading: state.is_loading,
                    form_error: state.form_error.clone(),
                    on_submit: move |prompt: String| submit_rag.generate_chart(prompt),
                }
                if let Some(error) = state.error.clone() {
                    QueryErrorPanel { error }
                }
            }
        }
    }
}
