use std::sync::Arc;

use reqwest::{header, multipart, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::models::{
    ApiErrorDetail, FetchAndUploadResult, GenerateChartResponse, Product, UploadResponse,
};

pub type ClientResult<T> = Result<T, ClientError>;

const UPLOAD_FILE_NAME: &str = "data.json";
pub const CLIENT_MISSING: &str = "API client is not configured";

/// 远端能力的统一入口。生命周期管理只依赖这个 trait。
#[allow(async_fn_in_trait)]
pub trait DashboardService {
    async fn upload_json(&self, data: &Value) -> ClientResult<UploadResponse>;

    async fn fetch_data(&self, endpoint: &str) -> ClientResult<Value>;

    async fn process_query(&self, query: &str) -> ClientResult<Value>;

    async fn generate_chart(&self, query: &str) -> ClientResult<GenerateChartResponse>;

    async fn send_to_rag(&self, endpoint: &str) -> ClientResult<Value>;

    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    /// 先拉取 REST 数据，再原样上传到 RAG。
    async fn fetch_and_upload(&self, endpoint: &str) -> ClientResult<FetchAndUploadResult> {
        let fetched_data = self.fetch_data(endpoint).await?;
        debug!(endpoint, "fetched data, uploading to RAG");
        let upload_result = self.upload_json(&fetched_data).await?;

        Ok(FetchAndUploadResult {
            success: true,
            fetched_data,
            upload_result,
        })
    }
}

/// 客户端初始化失败时的替身：每个调用都以传输错误返回。
impl<C: DashboardService> DashboardService for Option<C> {
    async fn upload_json(&self, data: &Value) -> ClientResult<UploadResponse> {
        configured(self)?.upload_json(data).await
    }

    async fn fetch_data(&self, endpoint: &str) -> ClientResult<Value> {
        configured(self)?.fetch_data(endpoint).await
    }

    async fn process_query(&self, query: &str) -> ClientResult<Value> {
        configured(self)?.process_query(query).await
    }

    async fn generate_chart(&self, query: &str) -> ClientResult<GenerateChartResponse> {
        configured(self)?.generate_chart(query).await
    }

    async fn send_to_rag(&self, endpoint: &str) -> ClientResult<Value> {
        configured(self)?.send_to_rag(endpoint).await
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        configured(self)?.list_products().await
    }
}

fn configured<C>(client: &Option<C>) -> ClientResult<&C> {
    client
        .as_ref()
        .ok_or_else(|| ClientError::Transport(CLIENT_MISSING.to_string()))
}

#[derive(Clone)]
pub struct DashboardClient {
    inner: reqwest::Client,
    config: Arc<AppConfig>,
    rag_base_url: String,
    rest_base_url: String,
}

impl DashboardClient {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let rag_base_url = normalize_base_url(&config.rag_base_url);
        let rest_base_url = normalize_base_url(&config.rest_base_url);

        let client = reqwest::Client::builder()
            .build()
            .map_err(ClientError::from)?;

        Ok(Self {
            inner: client,
            config: Arc::new(config),
            rag_base_url,
            rest_base_url,
        })
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    fn rag(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = join_path(&self.rag_base_url, path);
        self.inner.request(method, url)
    }

    fn rest(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = join_path(&self.rest_base_url, path);
        self.inner
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn post_rag_json<TReq, TRes>(&self, path: &str, body: &TReq) -> ClientResult<TRes>
    where
        TReq: Serialize + ?Sized,
        TRes: DeserializeOwned,
    {
        let builder = self.rag(Method::POST, path).json(body);
        self.send(path, builder).await
    }

    async fn send<T>(&self, operation: &str, builder: reqwest::RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let result = Self::send_inner(builder).await;
        if let Err(err) = &result {
            error!(%operation, ?err, status = ?err.status(), "request failed");
        }
        result
    }

    async fn send_inner<T>(builder: reqwest::RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes)
                .unwrap_or_else(|_| Value::Object(Map::new()));
            return Err(ClientError::from_response(status, body));
        }

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }
}

impl DashboardService for DashboardClient {
    async fn upload_json(&self, data: &Value) -> ClientResult<UploadResponse> {
        let bytes = serde_json::to_vec_pretty(data)?;
        debug!(bytes = bytes.len(), "uploading JSON document");

        let part = multipart::Part::bytes(bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("application/json")
            .map_err(ClientError::from)?;
        let form = multipart::Form::new().part("file", part);

        let builder = self.rag(Method::POST, "data_ingestion").multipart(form);
        self.send("data_ingestion", builder).await
    }

    async fn fetch_data(&self, endpoint: &str) -> ClientResult<Value> {
        let builder = self.rest(Method::GET, endpoint);
        self.send(endpoint, builder).await
    }

    async fn process_query(&self, query: &str) -> ClientResult<Value> {
        self.post_rag_json("process_query", &json!({ "query": query }))
            .await
    }

    async fn generate_chart(&self, query: &str) -> ClientResult<GenerateChartResponse> {
        let body = json!({
            "query": query,
            "secret_key": self.config.secret_key(),
            "limit": self.config.chart_limit,
        });
        self.post_rag_json("query_generate", &body).await
    }

    async fn send_to_rag(&self, endpoint: &str) -> ClientResult<Value> {
        let data = self.fetch_data(endpoint).await?;
        let body = json!({
            "data": data,
            "source_name": endpoint,
            "secret_key": self.config.secret_key(),
            "metadata": { "description": format!("{endpoint} data from API") },
        });
        self.post_rag_json("data_ingestion", &body).await
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let builder = self.rest(Method::GET, "products");
        self.send("products", builder).await
    }
}

fn normalize_base_url(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

fn join_path(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", structured_message(.status, .detail))]
    Structured {
        status: StatusCode,
        detail: ApiErrorDetail,
    },
    #[error("{}", unstructured_message(.status, .body))]
    Unstructured { status: StatusCode, body: Value },
    #[error("{0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// 非 2xx 响应：`detail` 为对象时视为结构化错误，其余一律按非结构化处理。
    pub fn from_response(status: StatusCode, body: Value) -> Self {
        let detail = body
            .get("detail")
            .filter(|detail| detail.is_object())
            .and_then(|detail| serde_json::from_value::<ApiErrorDetail>(detail.clone()).ok());

        match detail {
            Some(detail) => Self::Structured { status, detail },
            None => Self::Unstructured { status, body },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Structured { status, .. } | Self::Unstructured { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&ApiErrorDetail> {
        match self {
            Self::Structured { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

fn structured_message(status: &StatusCode, detail: &ApiErrorDetail) -> String {
    detail
        .message
        .clone()
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

fn unstructured_message(status: &StatusCode, body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_detail_becomes_structured() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            json!({"detail": {"error_type": "data_not_found", "message": "nothing"}}),
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        let detail = err.detail().expect("structured detail");
        assert_eq!(detail.error_type.as_deref(), Some("data_not_found"));
        assert_eq!(err.to_string(), "nothing");
    }

    #[test]
    fn non_string_detail_fields_stay_structured() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            json!({"detail": {
                "error_type": "data_not_found",
                "available_data_summary": {"tables": ["products"]}
            }}),
        );
        let detail = err.detail().expect("structured detail");
        assert_eq!(detail.error_type.as_deref(), Some("data_not_found"));
        assert_eq!(
            detail.available_data_summary.as_deref(),
            Some(r#"{"tables":["products"]}"#)
        );
    }

    #[test]
    fn missing_client_fails_every_call() {
        let client: Option<DashboardClient> = None;
        let err = futures::executor::block_on(client.list_products()).unwrap_err();
        assert_eq!(err, ClientError::Transport(CLIENT_MISSING.into()));

        let err = futures::executor::block_on(client.fetch_and_upload("products")).unwrap_err();
        assert_eq!(err, ClientError::Transport(CLIENT_MISSING.into()));
    }

    #[test]
    fn string_detail_is_unstructured_but_keeps_message() {
        let err = ClientError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": "file must be JSON"}),
        );
        assert!(matches!(err, ClientError::Unstructured { .. }));
        assert_eq!(err.to_string(), "file must be JSON");
    }

    #[test]
    fn empty_body_falls_back_to_status_message() {
        let err = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
        assert!(err.detail().is_none());
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn transport_errors_keep_raw_message() {
        let err = ClientError::Transport("network down".into());
        assert_eq!(err.to_string(), "network down");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn urls_are_joined_without_duplicate_slashes() {
        assert_eq!(normalize_base_url(" http://127.0.0.1:8000/ "), "http://127.0.0.1:8000");
        assert_eq!(
            join_path("http://localhost:3000", "/products"),
            "http://localhost:3000/products"
        );
    }
}
