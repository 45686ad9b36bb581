use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{ChartPayload, Product, QueryResult, StructuredError, UploadStatus};

pub type AppSignal = Signal<AppState>;

/// RAG 上传与查询共用一个加载标记。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RagState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub upload_status: Option<UploadStatus>,
    pub query_result: Option<QueryResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartQueryState {
    pub is_loading: bool,
    pub chart: Option<ChartPayload>,
    pub error: Option<StructuredError>,
    /// 表单校验错误，不经过网络。
    pub form_error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductState {
    pub items: Vec<Product>,
    pub is_loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationState {
    /// 刷新请求进行中
    #[serde(default)]
    pub in_flight: bool,
    pub last_message: Option<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub rag: RagState,
    /// `/assistant` 页面，走 `query_generate`。
    pub assistant: ChartQueryState,
    /// 仪表盘上的试验面板，走 `process_query`。
    pub playground: ChartQueryState,
    pub products: ProductState,
    pub operation: OperationState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartSlot {
    Assistant,
    Playground,
}

impl AppState {
    pub fn chart(&self, slot: ChartSlot) -> &ChartQueryState {
        match slot {
            ChartSlot::Assistant => &self.assistant,
            ChartSlot::Playground => &self.playground,
        }
    }

    pub fn chart_mut(&mut self, slot: ChartSlot) -> &mut ChartQueryState {
        match slot {
            ChartSlot::Assistant => &mut self.assistant,
            ChartSlot::Playground => &mut self.playground,
        }
    }
}

/// 状态容器的抽象。组件里是 `Signal<AppState>`，测试里换成普通的 `RefCell`。
pub trait StateStore: Clone + 'static {
    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R;

    fn snapshot(&self) -> AppState;
}

impl StateStore for AppSignal {
    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut signal = *self;
        let mut state = signal.write();
        f(&mut *state)
    }

    fn snapshot(&self) -> AppState {
        self.read().clone()
    }
}

#[derive(Clone)]
pub struct AppActions<S: StateStore = AppSignal> {
    state: S,
}

impl<S: StateStore> AppActions<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn set_rag_loading(&self, loading: bool) {
        self.state.update(|state| state.rag.is_loading = loading);
    }

    pub fn set_rag_error(&self, message: Option<String>) {
        self.state.update(|state| state.rag.error = message);
    }

    pub fn set_upload_status(&self, status: Option<UploadStatus>) {
        self.state.update(|state| state.rag.upload_status = status);
    }

    pub fn set_query_result(&self, result: Option<QueryResult>) {
        self.state.update(|state| state.rag.query_result = result);
    }

    /// 新请求开始：清空上一轮的错误与上传结果。
    pub fn begin_upload(&self) {
        self.state.update(|state| {
            state.rag.is_loading = true;
            state.rag.error = None;
            state.rag.upload_status = None;
        });
    }

    pub fn begin_query(&self) {
        self.state.update(|state| {
            state.rag.is_loading = true;
            state.rag.error = None;
            state.rag.query_result = None;
        });
    }

    pub fn set_chart_form_error(&self, slot: ChartSlot, message: Option<String>) {
        self.state
            .update(|state| state.chart_mut(slot).form_error = message);
    }

    pub fn begin_chart_query(&self, slot: ChartSlot) {
        self.state.update(|state| {
            let chart = state.chart_mut(slot);
            chart.is_loading = true;
            chart.chart = None;
            chart.error = None;
            chart.form_error = None;
        });
    }

    pub fn set_chart_data(&self, slot: ChartSlot, payload: ChartPayload) {
        self.state.update(|state| {
            let chart = state.chart_mut(slot);
            chart.chart = Some(payload);
            chart.error = None;
        });
    }

    pub fn set_chart_error(&self, slot: ChartSlot, error: StructuredError) {
        self.state
            .update(|state| state.chart_mut(slot).error = Some(error));
    }

    pub fn set_chart_loading(&self, slot: ChartSlot, loading: bool) {
        self.state
            .update(|state| state.chart_mut(slot).is_loading = loading);
    }

    pub fn begin_products_load(&self) {
        self.state.update(|state| {
            state.products.is_loading = true;
            state.products.error = None;
        });
    }

    pub fn set_products_loading(&self, loading: bool) {
        self.state.update(|state| state.products.is_loading = loading);
    }

    pub fn set_products(&self, items: Vec<Product>) {
        self.state.update(|state| {
            state.products.items = items;
            state.products.loaded = true;
            state.products.error = None;
            state.products.is_loading = false;
        });
    }

    /// 只有失败才算加载结束；传 `None` 仅清除错误。
    pub fn set_products_error(&self, message: Option<String>) {
        self.state.update(|state| {
            if message.is_some() {
                state.products.loaded = true;
                state.products.is_loading = false;
            }
            state.products.error = message;
        });
    }

    pub fn begin_operation(&self) {
        self.state.update(|state| {
            state.operation = OperationState {
                in_flight: true,
                ..OperationState::default()
            };
        });
    }

    pub fn set_operation_success(&self, message: String) {
        self.state.update(|state| {
            state.operation.in_flight = false;
            state.operation.last_message = Some(message);
            state.operation.error = None;
            state.operation.last_status = None;
            state.operation.context = None;
        });
    }

    pub fn record_failure(&self, status: Option<u16>, context: impl Into<String>, message: String) {
        let context_label = context.into();
        self.state.update(|state| {
            state.operation.in_flight = false;
            state.operation.error = Some(message);
            state.operation.last_message = None;
            state.operation.last_status = status;
            state.operation.context = Some(context_label);
        });
    }

    pub fn clear_operation_status(&self) {
        self.state
            .update(|state| state.operation = OperationState::default());
    }
}

pub fn use_app_state() -> AppSignal {
    use_context::<AppSignal>()
}

pub fn use_app_actions() -> AppActions {
    AppActions::new(use_app_state())
}


#[cfg(test)]
mod tests {
    use super::testing::LocalStore;
    use super::*;
    use crate::models::{ChartKind, Dataset};

    fn actions() -> AppActions<LocalStore> {
        AppActions::new(LocalStore::default())
    }

    #[test]
    fn chart_slots_are_independent() {
        let actions = actions();
        actions.begin_chart_query(ChartSlot::Assistant);
        actions.set_chart_data(
            ChartSlot::Assistant,
            ChartPayload {
                visualization_type: ChartKind::Bar,
                labels: vec!["a".into()],
                datasets: vec![Dataset::default()],
            },
        );

        let state = actions.snapshot();
        assert!(state.assistant.chart.is_some());
        assert!(state.assistant.is_loading);
        assert_eq!(state.playground, ChartQueryState::default());
    }

    #[test]
    fn begin_upload_clears_previous_attempt() {
        let actions = actions();
        actions.set_rag_error(Some("boom".into()));
        actions.set_upload_status(Some(UploadStatus::failed("boom")));
        actions.begin_upload();

        let rag = actions.snapshot().rag;
        assert!(rag.is_loading);
        assert!(rag.error.is_none());
        assert!(rag.upload_status.is_none());
    }

    #[test]
    fn product_error_marks_loaded_and_stops_loading() {
        let actions = actions();
        actions.set_products_loading(true);
        actions.set_products_error(Some("offline".into()));

        let products = actions.snapshot().products;
        assert!(products.loaded);
        assert!(!products.is_loading);
        assert_eq!(products.error.as_deref(), Some("offline"));
    }

    #[test]
    fn starting_a_product_load_does_not_mark_it_loaded() {
        let actions = actions();
        actions.begin_products_load();
        actions.set_products_error(None);

        let products = actions.snapshot().products;
        assert!(products.is_loading);
        assert!(!products.loaded);
    }

    #[test]
    fn restarting_a_failed_load_clears_the_error() {
        let actions = actions();
        actions.set_products_error(Some("offline".into()));
        actions.begin_products_load();

        let products = actions.snapshot().products;
        assert!(products.is_loading);
        assert!(products.error.is_none());
    }

    #[test]
    fn begin_operation_clears_previous_outcome() {
        let actions = actions();
        actions.record_failure(Some(502), "refresh", "bad gateway".into());
        actions.begin_operation();

        let op = actions.snapshot().operation;
        assert!(op.in_flight);
        assert_eq!(op.error, None);
        assert_eq!(op.last_status, None);

        actions.set_operation_success("ok".into());
        assert!(!actions.snapshot().operation.in_flight);
    }

    #[test]
    fn failures_replace_success_messages() {
        let actions = actions();
        actions.set_operation_success("ok".into());
        actions.record_failure(Some(502), "refresh", "bad gateway".into());

        let op = actions.snapshot().operation;
        assert_eq!(op.last_message, None);
        assert_eq!(op.last_status, Some(502));
        assert_eq!(op.context.as_deref(), Some("refresh"));
    }
}
