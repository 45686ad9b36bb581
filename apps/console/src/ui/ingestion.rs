use dioxus::prelude::*;
use serde_json::Value;

use crate::hooks::rag::use_rag;
use crate::state::use_app_state;

/// 上传文本框里的 JSON；解析失败直接提示，不发请求。
pub fn parse_upload_body(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Paste a JSON document to upload".to_string());
    }
    serde_json::from_str(trimmed).map_err(|err| format!("Invalid JSON: {err}"))
}

pub fn pretty_result(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[component]
pub fn IngestionPanel() -> Element {
    let rag = use_rag();
    let state = use_app_state().read().rag.clone();

    let mut upload_body = use_signal(String::new);
    let mut endpoint = use_signal(|| "products".to_string());
    let mut search = use_signal(String::new);

    let on_upload = {
        let rag = rag.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            match parse_upload_body(&upload_body.read()) {
                Ok(data) => rag.upload_data(data),
                Err(message) => rag.report_error(message),
            }
        }
    };

    let on_fetch = {
        let rag = rag.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            rag.fetch_and_upload(endpoint.read().clone());
        }
    };

    let on_query = {
        let rag = rag.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            rag.query(search.read().clone());
        }
    };

    let clear_error = rag.clone();
    let clear_result = rag.clone();
    let result_text = state.query_result.as_ref().map(pretty_result);

    rsx! {
        section { class: "space-y-4",
            header { class: "flex items-center justify-between",
                div {
                    h2 { class: "text-lg font-semibold text-slate-900", "RAG Data Ingestion" }
                    p { class: "text-xs text-slate-500", "Upload JSON, sync an API endpoint, or query the knowledge base." }
                }
                if state.is_loading {
                    span { class: "text-xs text-slate-500", "Working..." }
                }
            }

            if let Some(error) = state.error.clone() {
                div { class: "flex items-start justify-between rounded border border-red-200 bg-red-50 p-3 text-sm text-red-700",
                    span { "{error}" }
                    button {
                        class: "rounded bg-red-100 px-2 py-1 text-[11px] hover:bg-red-200",
                        onclick: move |_| clear_error.clear_error(),
                        "Dismiss"
                    }
                }
            }

            div { class: "grid gap-4 md:grid-cols-2",
                form { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                    onsubmit: on_upload,
                    h3 { class: "text-sm font-semibold text-slate-800", "Upload JSON" }
                    textarea {
                        class: "h-40 w-full rounded border border-slate-300 p-2 font-mono text-xs",
                        placeholder: "{{\"items\": []}}",
                        value: "{upload_body}",
                        oninput: move |evt| upload_body.set(evt.value()),
                    }
                    button {
                        class: "rounded bg-slate-900 px-3 py-2 text-xs text-white disabled:opacity-50",
                        r#type: "submit",
                        disabled: state.is_loading,
                        "Upload"
                    }
                }

                form { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                    onsubmit: on_fetch,
                    h3 { class: "text-sm font-semibold text-slate-800", "Fetch and upload" }
                    input {
                        class: "w-full rounded border border-slate-300 p-2 text-xs",
                        placeholder: "products",
                        value: "{endpoint}",
                        oninput: move |evt| endpoint.set(evt.value()),
                    }
                    button {
                        class: "rounded bg-slate-900 px-3 py-2 text-xs text-white disabled:opacity-50",
                        r#type: "submit",
                        disabled: state.is_loading,
                        "Fetch & Upload"
                    }
                }
            }

            form { class: "space-y-3 rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                onsubmit: on_query,
                h3 { class: "text-sm font-semibold text-slate-800", "Query" }
                div { class: "flex gap-2",
                    input {
                        class: "flex-1 rounded border border-slate-300 p-2 text-xs",
                        placeholder: "Ask the knowledge base...",
                        value: "{search}",
                        oninput: move |evt| search.set(evt.value()),
                    }
                    button {
                        class: "rounded bg-slate-900 px-3 py-2 text-xs text-white disabled:opacity-50",
                        r#type: "submit",
                        disabled: state.is_loading,
                        "Send"
                    }
                }
                if let Some(text) = result_text {
                    div { class: "space-y-2",
                        pre { class: "max-h-80 overflow-auto rounded bg-slate-900 p-3 text-[11px] text-slate-100", "{text}" }
                        button {
                            class: "rounded bg-slate-200 px-2 py-1 text-[11px] text-slate-600 hover:bg-slate-300",
                            r#type: "button",
                            onclick: move |_| clear_result.clear_query_result(),
                            "Clear result"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_body_must_be_json() {
        assert_eq!(parse_upload_body(" {\"a\": 1} "), Ok(json!({"a": 1})));
        assert!(parse_upload_body("   ").is_err());
        let err = parse_upload_body("{oops").unwrap_err();
        assert!(err.starts_with("Invalid JSON"));
    }

    #[test]
    fn results_are_pretty_printed() {
        let text = pretty_result(&json!({"answer": "ok"}));
        assert_eq!(text, "{\n  \"answer\": \"ok\"\n}");
    }
}
