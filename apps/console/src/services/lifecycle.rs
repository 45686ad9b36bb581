//! 请求生命周期
//!
//! 每个操作都按同一顺序写状态：前置校验 → 置 loading 并清空旧结果 →
//! 等待远端 → 写入结果或归类后的错误 → 复位 loading。
//! 没有取消与请求序号，后返回的响应覆盖先前的状态。

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ClientError, ClientResult, DashboardService};
use crate::models::{
    ChartPayload, FetchAndUploadResult, QueryResult, StructuredError, UploadResponse,
    UploadStatus, DATA_NOT_FOUND,
};
use crate::state::{AppActions, AppSignal, ChartSlot, StateStore};

pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty";
pub const EMPTY_ENDPOINT_MESSAGE: &str = "Endpoint cannot be empty";
pub const PROMPT_TOO_SHORT_MESSAGE: &str = "Input must be at least 2 characters.";
const MIN_PROMPT_CHARS: usize = 2;

const DEFAULT_NOT_FOUND_MESSAGE: &str = "No data found for the given query.";
const DEFAULT_NOT_FOUND_REASON: &str = "The query did not match any available data.";
const DEFAULT_NOT_FOUND_SUGGESTION: &str = "Please check your query and try again.";
const DEFAULT_NOT_FOUND_SUMMARY: &str = "No matching data found.";
const DEFAULT_AVAILABLE_DATA_SUMMARY: &str =
    "Available data is limited or not matching the query.";

const GENERIC_MESSAGE: &str = "An unexpected error occurred.";
const GENERIC_REASON: &str = "Please try again later or contact support.";

/// 把服务端失败归成界面可展示的两种形态之一。
/// 只有 400 且 `error_type == "data_not_found"` 才展示完整字段。
pub fn classify_failure(err: &ClientError) -> StructuredError {
    match err {
        ClientError::Structured {
            status: StatusCode::BAD_REQUEST,
            detail,
        } if detail.error_type.as_deref() == Some(DATA_NOT_FOUND) => {
            let or_default = |value: &Option<String>, fallback: &str| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .unwrap_or(fallback)
                    .to_string()
            };

            StructuredError::DataNotFound {
                message: or_default(&detail.message, DEFAULT_NOT_FOUND_MESSAGE),
                reason: or_default(&detail.reason, DEFAULT_NOT_FOUND_REASON),
                suggestion: or_default(&detail.suggestion, DEFAULT_NOT_FOUND_SUGGESTION),
                summary: or_default(&detail.summary, DEFAULT_NOT_FOUND_SUMMARY),
                available_data_summary: or_default(
                    &detail.available_data_summary,
                    DEFAULT_AVAILABLE_DATA_SUMMARY,
                ),
            }
        }
        _ => StructuredError::Generic {
            message: GENERIC_MESSAGE.to_string(),
            reason: GENERIC_REASON.to_string(),
        },
    }
}

pub fn validate_query(raw: &str) -> ClientResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(EMPTY_QUERY_MESSAGE.into()));
    }
    Ok(trimmed)
}

pub fn validate_prompt(raw: &str) -> ClientResult<&str> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_PROMPT_CHARS {
        return Err(ClientError::Validation(PROMPT_TOO_SHORT_MESSAGE.into()));
    }
    Ok(trimmed)
}

fn failure_message(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[derive(Clone)]
pub struct RagController<C, S: StateStore = AppSignal> {
    client: C,
    actions: AppActions<S>,
}

impl<C, S> RagController<C, S>
where
    C: DashboardService,
    S: StateStore,
{
    pub fn new(client: C, actions: AppActions<S>) -> Self {
        Self { client, actions }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn actions(&self) -> &AppActions<S> {
        &self.actions
    }

    /// 上传 JSON 到 RAG。失败时记录状态后继续向上返回错误。
    pub async fn upload_data(&self, data: &Value) -> ClientResult<UploadResponse> {
        let request_id = Uuid::new_v4();
        info!(%request_id, "upload_data started");
        self.actions.begin_upload();

        let result = self.client.upload_json(data).await;
        match &result {
            Ok(response) => {
                self.actions
                    .set_upload_status(Some(UploadStatus::succeeded(response)));
            }
            Err(err) => {
                self.record_upload_failure(err, "An unexpected error occurred during upload.")
            }
        }

        self.actions.set_rag_loading(false);
        info!(%request_id, ok = result.is_ok(), "upload_data finished");
        result
    }

    pub async fn fetch_and_upload(
        &self,
        endpoint: &str,
    ) -> ClientResult<Option<FetchAndUploadResult>> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            self.actions.set_rag_error(Some(EMPTY_ENDPOINT_MESSAGE.into()));
            return Ok(None);
        }

        let request_id = Uuid::new_v4();
        info!(%request_id, endpoint, "fetch_and_upload started");
        self.actions.begin_upload();

        let result = self.client.fetch_and_upload(endpoint).await;
        match &result {
            Ok(outcome) => {
                self.actions
                    .set_upload_status(Some(UploadStatus::succeeded(&outcome.upload_result)));
            }
            Err(err) => self.record_upload_failure(
                err,
                "An unexpected error occurred during fetch and upload.",
            ),
        }

        self.actions.set_rag_loading(false);
        info!(%request_id, ok = result.is_ok(), "fetch_and_upload finished");
        result.map(Some)
    }

    /// 空查询不发请求，直接返回 `Ok(None)`。
    pub async fn query(&self, search_query: &str) -> ClientResult<Option<QueryResult>> {
        let search_query = match validate_query(search_query) {
            Ok(query) => query,
            Err(err) => {
                self.actions.set_rag_error(Some(err.to_string()));
                return Ok(None);
            }
        };

        let request_id = Uuid::new_v4();
        info!(%request_id, "query started");
        self.actions.begin_query();

        let result = self.client.process_query(search_query).await;
        match &result {
            Ok(value) => self.actions.set_query_result(Some(value.clone())),
            Err(err) => self.actions.set_rag_error(Some(failure_message(
                err,
                "An unexpected error occurred during the query.",
            ))),
        }

        self.actions.set_rag_loading(false);
        info!(%request_id, ok = result.is_ok(), "query finished");
        result.map(Some)
    }

    /// `query_generate`，错误只落到状态里，不向上抛。
    pub async fn generate_chart(&self, prompt: &str) -> Option<ChartPayload> {
        let prompt = self.check_prompt(ChartSlot::Assistant, prompt)?;
        let request_id = Uuid::new_v4();
        info!(%request_id, "generate_chart started");
        self.actions.begin_chart_query(ChartSlot::Assistant);

        let result = self
            .client
            .generate_chart(prompt)
            .await
            .map(|response| response.chart_config);

        self.finish_chart(ChartSlot::Assistant, request_id, result)
    }

    /// `process_query`，响应体本身就是图表 payload。
    pub async fn process_query(&self, prompt: &str) -> Option<ChartPayload> {
        let prompt = self.check_prompt(ChartSlot::Playground, prompt)?;
        let request_id = Uuid::new_v4();
        info!(%request_id, "process_query started");
        self.actions.begin_chart_query(ChartSlot::Playground);

        let result = self
            .client
            .process_query(prompt)
            .await
            .and_then(|value| {
                serde_json::from_value::<ChartPayload>(value).map_err(ClientError::from)
            });

        self.finish_chart(ChartSlot::Playground, request_id, result)
    }

    /// 拉取指定数据源并推送到 RAG，结果以通知形式展示。
    pub async fn refresh_rag(&self, endpoint: &str) -> Option<Value> {
        let request_id = Uuid::new_v4();
        info!(%request_id, endpoint, "refresh_rag started");
        self.actions.begin_operation();

        match self.client.send_to_rag(endpoint).await {
            Ok(value) => {
                self.actions
                    .set_operation_success(format!("Data from {endpoint} sent to RAG"));
                Some(value)
            }
            Err(err) => {
                warn!(%request_id, %err, "refresh_rag failed");
                self.actions.record_failure(
                    err.status().map(|status| status.as_u16()),
                    "Refresh Data",
                    failure_message(&err, GENERIC_MESSAGE),
                );
                None
            }
        }
    }

    pub async fn load_products(&self) {
        let request_id = Uuid::new_v4();
        info!(%request_id, "load_products started");
        self.actions.begin_products_load();

        match self.client.list_products().await {
            Ok(items) => {
                info!(%request_id, count = items.len(), "products loaded");
                self.actions.set_products(items);
            }
            Err(err) => {
                warn!(%request_id, %err, "load_products failed");
                self.actions
                    .set_products_error(Some(failure_message(&err, "Error loading products")));
            }
        }

        self.actions.set_products_loading(false);
    }

    pub fn clear_error(&self) {
        self.actions.set_rag_error(None);
    }

    pub fn clear_upload_status(&self) {
        self.actions.set_upload_status(None);
    }

    pub fn clear_query_result(&self) {
        self.actions.set_query_result(None);
    }

    fn check_prompt<'a>(&self, slot: ChartSlot, prompt: &'a str) -> Option<&'a str> {
        match validate_prompt(prompt) {
            Ok(prompt) => Some(prompt),
            Err(err) => {
                self.actions.set_chart_form_error(slot, Some(err.to_string()));
                None
            }
        }
    }

    fn finish_chart(
        &self,
        slot: ChartSlot,
        request_id: Uuid,
        result: ClientResult<ChartPayload>,
    ) -> Option<ChartPayload> {
        let chart = match result {
            Ok(payload) => {
                info!(%request_id, kind = %payload.visualization_type, "chart received");
                self.actions.set_chart_data(slot, payload.clone());
                Some(payload)
            }
            Err(err) => {
                warn!(%request_id, %err, "chart request failed");
                self.actions.set_chart_error(slot, classify_failure(&err));
                None
            }
        };

        self.actions.set_chart_loading(slot, false);
        chart
    }

    fn record_upload_failure(&self, err: &ClientError, fallback: &str) {
        let message = failure_message(err, fallback);
        self.actions.set_rag_error(Some(message.clone()));
        self.actions
            .set_upload_status(Some(UploadStatus::failed(message)));
    }
}
