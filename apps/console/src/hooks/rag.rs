use std::future::Future;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;
use tracing::warn;

use crate::api::DashboardClient;
use crate::services::RagController;
use crate::state::{use_app_actions, use_app_state};

/// 客户端缺失时仍可构造，调用会以传输错误落到各自的状态里。
pub type DashboardController = RagController<Option<DashboardClient>>;

/// 组件侧的入口：把生命周期操作放进 Dioxus 的任务里执行。
#[derive(Clone)]
pub struct RagHandle {
    controller: DashboardController,
}

impl RagHandle {
    pub fn upload_data(&self, data: Value) {
        self.run(move |rag| async move {
            if let Err(err) = rag.upload_data(&data).await {
                warn!(%err, "upload rejected");
            }
        });
    }

    pub fn fetch_and_upload(&self, endpoint: String) {
        self.run(move |rag| async move {
            if let Err(err) = rag.fetch_and_upload(&endpoint).await {
                warn!(%err, %endpoint, "fetch and upload rejected");
            }
        });
    }

    pub fn query(&self, search_query: String) {
        self.run(move |rag| async move {
            if let Err(err) = rag.query(&search_query).await {
                warn!(%err, "query rejected");
            }
        });
    }

    pub fn generate_chart(&self, prompt: String) {
        self.run(move |rag| async move {
            rag.generate_chart(&prompt).await;
        });
    }

    pub fn process_query(&self, prompt: String) {
        self.run(move |rag| async move {
            rag.process_query(&prompt).await;
        });
    }

    pub fn refresh_rag(&self, endpoint: String) {
        self.run(move |rag| async move {
            rag.refresh_rag(&endpoint).await;
        });
    }

    pub fn reload_products(&self) {
        self.run(|rag| async move {
            rag.load_products().await;
        });
    }

    pub fn report_error(&self, message: String) {
        self.controller.actions().set_rag_error(Some(message));
    }

    pub fn clear_error(&self) {
        self.controller.clear_error();
    }

    pub fn clear_upload_status(&self) {
        self.controller.clear_upload_status();
    }

    pub fn clear_query_result(&self) {
        self.controller.clear_query_result();
    }

    fn run<F, Fut>(&self, task: F)
    where
        F: FnOnce(DashboardController) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        spawn(task(self.controller.clone()));
    }
}

/// `App` 在根节点注入的客户端；初始化失败时为 `None`。
pub fn use_dashboard_client() -> Option<DashboardClient> {
    use_context::<Option<DashboardClient>>()
}

pub fn use_rag() -> RagHandle {
    let actions = use_app_actions();
    let controller = RagController::new(use_dashboard_client(), actions);

    RagHandle { controller }
}

/// 首次挂载时拉取一次商品列表。
pub fn use_products() {
    let rag = use_rag();
    let state = use_app_state();

    use_future(move || {
        let controller = rag.controller.clone();
        async move {
            if state.read().products.loaded {
                return;
            }

            TimeoutFuture::new(0).await;
            controller.load_products().await;
        }
    });
}
