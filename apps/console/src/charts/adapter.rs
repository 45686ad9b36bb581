use serde::{Deserialize, Serialize};

use crate::models::{ChartKind, ChartPayload, DatasetValues, Point};

/// 多数据集时依次轮换的基础色（RGB 分量）。
const SERIES_RGB: [&str; 6] = [
    "75, 192, 192",
    "255, 99, 132",
    "54, 162, 235",
    "255, 206, 86",
    "153, 102, 255",
    "255, 159, 64",
];

const PIE_PALETTE: [&str; 7] = [
    "rgba(255, 99, 132, 0.2)",
    "rgba(54, 162, 235, 0.2)",
    "rgba(255, 206, 86, 0.2)",
    "rgba(75, 192, 192, 0.2)",
    "rgba(153, 102, 255, 0.2)",
    "rgba(255, 159, 64, 0.2)",
    "rgba(255, 99, 20, 0.2)",
];

const POLAR_PALETTE: [&str; 5] = [
    "rgb(255, 99, 132)",
    "rgb(75, 192, 192)",
    "rgb(255, 205, 86)",
    "rgb(201, 203, 207)",
    "rgb(54, 162, 235)",
];

const PIE_BORDER: &str = "rgba(75, 192, 192, 1)";
const BORDER_WIDTH: f64 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SeriesValues {
    Indexed(Vec<f64>),
    Points(Vec<Point>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// 单色时长度为 1；饼图类按 label 轮换。
    pub background: Vec<String>,
    pub border_color: String,
    pub border_width: f64,
    pub fill: bool,
}

impl SeriesStyle {
    pub fn background_at(&self, index: usize) -> &str {
        if self.background.is_empty() {
            return "transparent";
        }
        &self.background[index % self.background.len()]
    }

    pub fn primary(&self) -> &str {
        self.background_at(0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyledSeries {
    pub label: String,
    pub values: SeriesValues,
    pub style: SeriesStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendererInput {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<StyledSeries>,
}

/// 将后端 payload 转成渲染输入。配色只由这里决定，不从后端回传。
///
/// 不校验 `labels` 与 `data` 等长，长度不一致由渲染端截断。
pub fn adapt(payload: &ChartPayload) -> RendererInput {
    let kind = payload.visualization_type.clone();
    let series = payload
        .datasets
        .iter()
        .enumerate()
        .map(|(index, dataset)| StyledSeries {
            label: dataset.label.clone(),
            values: adapt_values(&kind, &dataset.data),
            style: style_for(&kind, index),
        })
        .collect();

    RendererInput {
        kind,
        labels: payload.labels.clone(),
        series,
    }
}

fn adapt_values(kind: &ChartKind, data: &DatasetValues) -> SeriesValues {
    match (kind.is_coordinate(), data) {
        (true, DatasetValues::Points(points)) => SeriesValues::Points(points.clone()),
        (true, DatasetValues::Indexed(values)) => SeriesValues::Points(
            values
                .iter()
                .enumerate()
                .map(|(i, y)| Point {
                    x: i as f64,
                    y: *y,
                    r: None,
                })
                .collect(),
        ),
        (false, DatasetValues::Indexed(values)) => SeriesValues::Indexed(values.clone()),
        // 坐标点落在类目图上时只保留 y
        (false, DatasetValues::Points(points)) => {
            SeriesValues::Indexed(points.iter().map(|point| point.y).collect())
        }
    }
}

fn rgba(rgb: &str, alpha: f64) -> String {
    format!("rgba({rgb}, {alpha})")
}

fn style_for(kind: &ChartKind, index: usize) -> SeriesStyle {
    let base = SERIES_RGB[index % SERIES_RGB.len()];

    match kind {
        ChartKind::Pie | ChartKind::Doughnut => SeriesStyle {
            background: PIE_PALETTE.iter().map(|c| c.to_string()).collect(),
            border_color: PIE_BORDER.to_string(),
            border_width: BORDER_WIDTH,
            fill: true,
        },
        ChartKind::PolarArea => SeriesStyle {
            background: POLAR_PALETTE.iter().map(|c| c.to_string()).collect(),
            border_color: "#ffffff".to_string(),
            border_width: 1.0,
            fill: true,
        },
        ChartKind::Scatter | ChartKind::Bubble => {
            let rgb = SERIES_RGB[(index + 1) % SERIES_RGB.len()];
            SeriesStyle {
                background: vec![format!("rgb({rgb})")],
                border_color: format!("rgb({rgb})"),
                border_width: 1.0,
                fill: true,
            }
        }
        ChartKind::Bar
        | ChartKind::Line
        | ChartKind::Radar
        | ChartKind::Unknown(_) => SeriesStyle {
            background: vec![rgba(base, 0.2)],
            border_color: rgba(base, 1.0),
            border_width: BORDER_WIDTH,
            fill: !matches!(kind, ChartKind::Line),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;

    fn payload(kind: ChartKind, datasets: Vec<Dataset>) -> ChartPayload {
        ChartPayload {
            visualization_type: kind,
            labels: vec!["N".into(), "S".into()],
            datasets,
        }
    }

    fn indexed(label: &str, values: &[f64]) -> Dataset {
        Dataset {
            label: label.into(),
            data: DatasetValues::Indexed(values.to_vec()),
        }
    }

    #[test]
    fn bar_series_get_teal_styling() {
        let input = adapt(&payload(
            ChartKind::Bar,
            vec![indexed("Revenue", &[10.0, 20.0])],
        ));
        assert_eq!(input.labels, vec!["N", "S"]);
        let style = &input.series[0].style;
        assert_eq!(style.primary(), "rgba(75, 192, 192, 0.2)");
        assert_eq!(style.border_color, "rgba(75, 192, 192, 1)");
        assert_eq!(style.border_width, 2.0);
        assert!(style.fill);
    }

    #[test]
    fn additional_datasets_rotate_palette() {
        let input = adapt(&payload(
            ChartKind::Line,
            vec![indexed("a", &[1.0]), indexed("b", &[2.0])],
        ));
        assert_ne!(
            input.series[0].style.border_color,
            input.series[1].style.border_color
        );
        assert!(!input.series[0].style.fill);
    }

    #[test]
    fn pie_uses_per_label_palette() {
        let input = adapt(&payload(ChartKind::Pie, vec![indexed("Count", &[1.0, 2.0])]));
        let style = &input.series[0].style;
        assert_eq!(style.background.len(), 7);
        assert_eq!(style.background_at(1), "rgba(54, 162, 235, 0.2)");
        assert_eq!(style.background_at(8), style.background_at(1));
    }

    #[test]
    fn scatter_converts_plain_numbers_to_points() {
        let input = adapt(&payload(ChartKind::Scatter, vec![indexed("s", &[3.0, 4.0])]));
        assert_eq!(input.series[0].style.primary(), "rgb(255, 99, 132)");
        match &input.series[0].values {
            SeriesValues::Points(points) => {
                assert_eq!(points[1], Point { x: 1.0, y: 4.0, r: None });
            }
            other => panic!("expected points, got {other:?}"),
        }
    }

    #[test]
    fn length_mismatch_is_passed_through_untouched() {
        let input = adapt(&payload(ChartKind::Bar, vec![indexed("x", &[1.0, 2.0, 3.0])]));
        assert_eq!(input.series[0].values, SeriesValues::Indexed(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn unknown_kinds_still_adapt() {
        let input = adapt(&payload(
            ChartKind::Unknown("heatmap".into()),
            vec![indexed("x", &[1.0, 2.0])],
        ));
        assert_eq!(input.series.len(), 1);
    }
}
