#![allow(non_snake_case)]

mod api;
mod charts;
mod config;
mod fixtures;
mod hooks;
mod models;
mod services;
mod state;
mod ui;

use anyhow::Context;
use api::DashboardClient;
use config::{AppConfig, AppProfile};
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use once_cell::sync::OnceCell;
use state::AppState;
use tracing::{error, info};
use ui::gallery::ChartGallery;
use ui::ingestion::IngestionPanel;
use ui::notifications::NotificationCenter;
use ui::products::{ProductCountBadge, ProductInventory};
use ui::query::{AssistantPanel, PlaygroundPanel};

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();
pub(crate) static API_CLIENT: OnceCell<DashboardClient> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    init_logging(config.profile);

    if let Err(err) = bootstrap_infrastructure(config) {
        error!(error = %format!("{err:#}"), "api bootstrap error");
    }

    launch(App);
}

fn init_logging(profile: AppProfile) {
    static INIT: std::sync::Once = std::sync::Once::new();
    let level = match profile {
        AppProfile::Dev => tracing::Level::DEBUG,
        AppProfile::Prod => tracing::Level::INFO,
    };
    INIT.call_once(|| {
        let _ = dioxus_logger::init(level);
    });
}

fn bootstrap_infrastructure(config: AppConfig) -> anyhow::Result<()> {
    let _ = APP_CONFIG.set(config.clone());

    let client = DashboardClient::new(config).context("failed to build dashboard client")?;
    let _ = API_CLIENT.set(client);
    info!(
        rag = APP_CONFIG.get().map(|c| c.rag_base_url.as_str()),
        rest = APP_CONFIG.get().map(|c| c.rest_base_url.as_str()),
        "dashboard client initialized"
    );
    Ok(())
}

#[component]
fn App() -> Element {
    let app_state = use_signal(AppState::default);

    use_context_provider(|| app_state);
    use_context_provider(|| API_CLIENT.get().cloned());

    rsx! {
        div { class: "relative min-h-screen bg-[#F3F2F7]",
            Router::<Route> {}
            NotificationCenter {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    Dashboard {},
    #[route("/assistant")]
    Assistant {},
    #[route("/ingestion")]
    Ingestion {},
}

#[component]
fn Shell() -> Element {
    let rag_endpoint = APP_CONFIG
        .get()
        .map(|c| c.rag_base_url.clone())
        .unwrap_or_else(|| "RAG API not configured".to_string());

    rsx! {
        nav { class: "flex items-center gap-4 border-b border-slate-200 bg-white px-6 py-3 text-sm",
            span { class: "font-semibold text-slate-900", "Audash" }
            Link { class: "text-slate-600 hover:text-slate-900", to: Route::Dashboard {}, "Dashboard" }
            Link { class: "text-slate-600 hover:text-slate-900", to: Route::Assistant {}, "Assistant" }
            Link { class: "text-slate-600 hover:text-slate-900", to: Route::Ingestion {}, "Ingestion" }
            span { class: "ml-auto font-mono text-[11px] text-slate-400", "{rag_endpoint}" }
        }
        main { class: "px-6 py-4",
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Dashboard() -> Element {
    rsx! {
        div { class: "mx-auto max-w-6xl space-y-8 p-6",
            div { class: "flex items-center justify-between",
                div {
                    h1 { class: "text-2xl font-bold text-slate-800", "Admin Dashboard" }
                    p { class: "mt-1 text-slate-500", "Manage your product inventory" }
                }
                ProductCountBadge {}
            }
            PlaygroundPanel {}
            ChartGallery {}
            ProductInventory {}
        }
    }
}

#[component]
fn Assistant() -> Element {
    rsx! {
        AssistantPanel {}
    }
}

#[component]
fn Ingestion() -> Element {
    rsx! {
        div { class: "mx-auto max-w-5xl",
            IngestionPanel {}
        }
    }
}
