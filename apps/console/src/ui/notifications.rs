use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::hooks::rag::use_rag;
use crate::state::{use_app_actions, use_app_state};

const AUTO_DISMISS_MS: u32 = 6_000;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn accent_classes(self) -> (&'static str, &'static str) {
        match self {
            Self::Success => ("border-emerald-500 bg-emerald-50", "text-emerald-700"),
            Self::Error => ("border-red-500 bg-red-50", "text-red-700"),
        }
    }
}

/// 上传回执里的时间统一显示为 UTC；无法解析时原样返回。
pub fn format_timestamp(raw: &str) -> String {
    let display = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let raw = raw.trim();

    let parsed = OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        let naive = raw.split('.').next().unwrap_or(raw);
        PrimitiveDateTime::parse(
            naive,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .ok()
        .map(PrimitiveDateTime::assume_utc)
    });

    parsed
        .and_then(|at| at.to_offset(UtcOffset::UTC).format(display).ok())
        .map(|text| format!("{text} UTC"))
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Props, Clone)]
#[props(no_eq)]
pub struct ToastProps {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    #[props(default)]
    pub details: Vec<(String, String)>,
    #[props(optional)]
    pub on_close: Option<EventHandler<MouseEvent>>,
}

impl PartialEq for ToastProps {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

#[component]
pub fn Toast(props: ToastProps) -> Element {
    let (container_class, accent_text) = props.kind.accent_classes();

    rsx! {
        div { class: format!("pointer-events-auto rounded-lg border-l-4 p-4 shadow-lg {}", container_class),
            div { class: "flex items-start justify-between gap-4",
                div { class: "space-y-1",
                    h3 { class: format!("text-sm font-semibold {}", accent_text), "{props.title}" }
                    p { class: "text-xs text-slate-700", "{props.message}" }
                    if !props.details.is_empty() {
                        ul { class: "mt-2 space-y-1 text-[11px] text-slate-500",
                            for (label, value) in props.details.iter() {
                                li {
                                    span { class: "font-medium", "{label}: " }
                                    span { class: "font-mono break-all", "{value}" }
                                }
                            }
                        }
                    }
                }
                if let Some(handler) = props.on_close.as_ref() {
                    button {
                        class: "rounded bg-slate-200 px-2 py-1 text-[11px] text-slate-600 transition hover:bg-slate-300",
                        onclick: handler.clone(),
                        "Close"
                    }
                }
            }
        }
    }
}

/// 上传结果与刷新结果的提示，一段时间后自动消失。
#[component]
pub fn NotificationCenter() -> Element {
    let actions = use_app_actions();
    let rag = use_rag();
    let state = use_app_state();
    let snapshot = state.read().clone();

    {
        let actions = actions.clone();
        let rag = rag.clone();
        use_effect(move || {
            let upload = state.read().rag.upload_status.clone();
            let operation = state.read().operation.clone();
            let actions = actions.clone();
            let rag = rag.clone();

            if upload.is_none() && operation.last_message.is_none() && operation.error.is_none() {
                return;
            }

            spawn(async move {
                TimeoutFuture::new(AUTO_DISMISS_MS).await;
                let current = actions.snapshot();
                // 期间出现了新的提示就保留
                if upload.is_some() && current.rag.upload_status == upload {
                    rag.clear_upload_status();
                }
                let has_operation = operation.last_message.is_some() || operation.error.is_some();
                if has_operation && current.operation == operation {
                    actions.clear_operation_status();
                }
            });
        });
    }

    let mut toasts: Vec<Element> = Vec::new();

    if let Some(status) = snapshot.rag.upload_status.clone() {
        let mut details = Vec::new();
        if let Some(count) = status.document_count {
            details.push(("Documents".to_string(), count.to_string()));
        }
        if let Some(chunks) = status.chunks_created {
            details.push(("Chunks".to_string(), chunks.to_string()));
        }
        if let Some(at) = status.timestamp.as_deref() {
            details.push(("Time".to_string(), format_timestamp(at)));
        }
        let (kind, title) = if status.success {
            (ToastKind::Success, "Upload complete")
        } else {
            (ToastKind::Error, "Upload failed")
        };
        let upload_rag = rag.clone();
        toasts.push(rsx! {
            Toast {
                key: "upload-status",
                kind,
                title: title.to_string(),
                message: status.message,
                details,
                on_close: move |_| upload_rag.clear_upload_status(),
            }
        });
    }

    if let Some(error) = snapshot.operation.error.clone() {
        let mut details = Vec::new();
        if let Some(status) = snapshot.operation.last_status {
            details.push(("HTTP status".to_string(), status.to_string()));
        }
        let title = snapshot
            .operation
            .context
            .clone()
            .unwrap_or_else(|| "Request failed".to_string());
        let app_actions = actions.clone();
        toasts.push(rsx! {
            Toast {
                key: "operation-error",
                kind: ToastKind::Error,
                title,
                message: error,
                details,
                on_close: move |_| app_actions.clear_operation_status(),
            }
        });
    } else if let Some(message) = snapshot.operation.last_message.clone() {
        let app_actions = actions.clone();
        toasts.push(rsx! {
            Toast {
                key: "operation-success",
                kind: ToastKind::Success,
                title: "Done".to_string(),
                message,
                on_close: move |_| app_actions.clear_operation_status(),
            }
        });
    }

    if toasts.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        div { class: "pointer-events-none fixed right-4 top-4 z-50 flex w-80 flex-col gap-3",
            for toast in toasts {
                {toast}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_timestamps_are_shown_in_utc() {
        assert_eq!(
            format_timestamp("2025-06-01T17:30:05+07:00"),
            "2025-06-01 10:30:05 UTC"
        );
    }

    #[test]
    fn naive_timestamps_drop_fractional_seconds() {
        assert_eq!(
            format_timestamp("2025-06-01T10:00:00.123456"),
            "2025-06-01 10:00:00 UTC"
        );
    }

    #[test]
    fn unparsable_timestamps_pass_through() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
