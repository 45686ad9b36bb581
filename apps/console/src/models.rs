use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// 后端声明的图表类型。未知取值保留原文，交由分发器降级处理。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    PolarArea,
    Radar,
    Scatter,
    Bubble,
    Unknown(String),
}

impl ChartKind {
    pub const KNOWN: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::PolarArea,
        ChartKind::Radar,
        ChartKind::Scatter,
        ChartKind::Bubble,
    ];

    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "bar" => Self::Bar,
            "line" => Self::Line,
            "pie" => Self::Pie,
            "doughnut" | "donut" => Self::Doughnut,
            "polararea" => Self::PolarArea,
            "radar" => Self::Radar,
            "scatter" => Self::Scatter,
            "bubble" => Self::Bubble,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Doughnut => "doughnut",
            Self::PolarArea => "polar-area",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
            Self::Bubble => "bubble",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// 散点/气泡图按坐标取值，不依赖 `labels`。
    pub fn is_coordinate(&self) -> bool {
        matches!(self, Self::Scatter | Self::Bubble)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bar => "Bar Chart",
            Self::Line => "Line Chart",
            Self::Pie => "Pie Chart",
            Self::Doughnut => "Doughnut Chart",
            Self::PolarArea => "Polar Area Chart",
            Self::Radar => "Radar Chart",
            Self::Scatter => "Scatter Chart",
            Self::Bubble => "Bubble Chart",
            Self::Unknown(_) => "Chart",
        }
    }
}

impl From<String> for ChartKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ChartKind> for String {
    fn from(value: ChartKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetValues {
    /// `null` 缺口读作 NaN，渲染时跳过。
    Indexed(#[serde(deserialize_with = "numbers_with_gaps")] Vec<f64>),
    Points(Vec<Point>),
}

fn numbers_with_gaps<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

impl Default for DatasetValues {
    fn default() -> Self {
        Self::Indexed(Vec::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: DatasetValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub visualization_type: ChartKind,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateChartResponse {
    pub chart_config: ChartPayload,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchAndUploadResult {
    pub success: bool,
    pub fetched_data: Value,
    pub upload_result: UploadResponse,
}

/// 每次上传尝试都会整体替换，不做合并。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadStatus {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl UploadStatus {
    pub fn succeeded(response: &UploadResponse) -> Self {
        Self {
            success: true,
            message: response.message.clone(),
            document_count: response.document_count,
            chunks_created: response.chunks_created,
            timestamp: response.timestamp.clone(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            document_count: None,
            chunks_created: None,
            timestamp: None,
        }
    }
}

/// 后端 4xx 响应中 `detail` 对象的结构，所有字段均可能缺失。
/// 非字符串的字段值按紧凑 JSON 文本保留。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default, deserialize_with = "lenient_text")]
    pub error_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub suggestion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub available_data_summary: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

pub const DATA_NOT_FOUND: &str = "data_not_found";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredError {
    DataNotFound {
        message: String,
        reason: String,
        suggestion: String,
        summary: String,
        available_data_summary: String,
    },
    Generic {
        message: String,
        reason: String,
    },
}

impl StructuredError {
    pub fn message(&self) -> &str {
        match self {
            Self::DataNotFound { message, .. } | Self::Generic { message, .. } => message,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::DataNotFound { reason, .. } | Self::Generic { reason, .. } => reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: String,
}

pub type QueryResult = Value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_kind_accepts_aliases() {
        assert_eq!(ChartKind::parse("BAR"), ChartKind::Bar);
        assert_eq!(ChartKind::parse("polar-area"), ChartKind::PolarArea);
        assert_eq!(ChartKind::parse("polar_area"), ChartKind::PolarArea);
        assert_eq!(ChartKind::parse("polarArea"), ChartKind::PolarArea);
        assert_eq!(ChartKind::parse(" doughnut "), ChartKind::Doughnut);
        assert_eq!(
            ChartKind::parse("heatmap"),
            ChartKind::Unknown("heatmap".into())
        );
    }

    #[test]
    fn unknown_kind_keeps_raw_tag_on_serialize() {
        let payload: ChartPayload = serde_json::from_value(json!({
            "visualization_type": "sankey",
            "labels": [],
            "datasets": []
        }))
        .unwrap();
        assert_eq!(
            payload.visualization_type,
            ChartKind::Unknown("sankey".into())
        );
        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["visualization_type"], "sankey");
    }

    #[test]
    fn dataset_values_distinguish_numbers_and_points() {
        let indexed: Dataset =
            serde_json::from_value(json!({"label": "Revenue", "data": [10, 20.5]})).unwrap();
        assert_eq!(indexed.data, DatasetValues::Indexed(vec![10.0, 20.5]));

        let points: Dataset = serde_json::from_value(json!({
            "label": "Bubbles",
            "data": [{"x": 20, "y": 30, "r": 15}, {"x": 40, "y": 10}]
        }))
        .unwrap();
        match points.data {
            DatasetValues::Points(ref items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].r, Some(15.0));
                assert_eq!(items[1].r, None);
            }
            other => panic!("expected points, got {other:?}"),
        }
    }

    #[test]
    fn null_gaps_in_indexed_data_become_nan() {
        let dataset: Dataset =
            serde_json::from_value(json!({"label": "Orders", "data": [1, null, 3]})).unwrap();
        match dataset.data {
            DatasetValues::Indexed(values) => {
                assert_eq!(values.len(), 3);
                assert_eq!(values[0], 1.0);
                assert!(values[1].is_nan());
                assert_eq!(values[2], 3.0);
            }
            other => panic!("expected indexed values, got {other:?}"),
        }
    }

    #[test]
    fn error_detail_keeps_non_string_fields_as_text() {
        let detail: ApiErrorDetail = serde_json::from_value(json!({
            "error_type": "data_not_found",
            "summary": 0,
            "available_data_summary": {"tables": ["products"]},
            "suggestion": null
        }))
        .unwrap();
        assert_eq!(detail.error_type.as_deref(), Some("data_not_found"));
        assert_eq!(detail.summary.as_deref(), Some("0"));
        assert_eq!(
            detail.available_data_summary.as_deref(),
            Some(r#"{"tables":["products"]}"#)
        );
        assert_eq!(detail.suggestion, None);
        assert_eq!(detail.message, None);
    }

    #[test]
    fn payload_defaults_missing_collections() {
        let payload: ChartPayload =
            serde_json::from_value(json!({"visualization_type": "line"})).unwrap();
        assert!(payload.labels.is_empty());
        assert!(payload.datasets.is_empty());
    }

    #[test]
    fn product_accepts_numeric_or_string_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "a1",
            "name": "Kopi",
            "price": "12500",
            "stock": 3,
            "category": "Drinks"
        }))
        .unwrap();
        assert_eq!(product.id, ProductId::Text("a1".into()));
        assert_eq!(product.price, 12500.0);

        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "Teh",
            "price": 8000.5
        }))
        .unwrap();
        assert_eq!(product.id.to_string(), "7");
        assert_eq!(product.stock, 0);
        assert_eq!(product.category, "");
    }

    #[test]
    fn upload_status_is_built_from_response() {
        let response = UploadResponse {
            message: "ok".into(),
            document_count: Some(4),
            chunks_created: Some(12),
            timestamp: Some("2025-01-01T00:00:00Z".into()),
        };
        let status = UploadStatus::succeeded(&response);
        assert!(status.success);
        assert_eq!(status.chunks_created, Some(12));

        let failed = UploadStatus::failed("network down");
        assert!(!failed.success);
        assert_eq!(failed.message, "network down");
        assert_eq!(failed.document_count, None);
    }
}
