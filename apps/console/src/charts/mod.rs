//! 图表数据适配与渲染
//!
//! 后端返回的 `{labels, datasets}` 经 [`adapter::adapt`] 补齐配色，
//! 再由 [`render`] 中的各渲染函数生成纯数据的 [`ChartFigure`]，
//! UI 层只负责把图元画成 SVG。

pub mod adapter;
pub mod dispatch;
pub mod render;

use serde::{Deserialize, Serialize};

pub use adapter::{adapt, RendererInput, SeriesStyle, SeriesValues, StyledSeries};
pub use dispatch::{dispatch, ChartView};

pub const DEFAULT_WIDTH: f64 = 480.0;
pub const DEFAULT_HEIGHT: f64 = 288.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendPosition {
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub legend: LegendPosition,
    pub begin_at_zero: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: None,
            legend: LegendPosition::Bottom,
            begin_at_zero: true,
        }
    }
}

impl ChartOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_legend(mut self, legend: LegendPosition) -> Self {
        self.legend = legend;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// 单个 SVG 图元。坐标均为 viewBox 内的绝对坐标。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Mark {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
    },
    Path {
        d: String,
        fill: String,
        stroke: String,
        stroke_width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        anchor: TextAnchor,
        size: f64,
    },
}

impl Mark {
    /// 数据图元（柱、扇区、点、折线），不含坐标轴与文字。
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Rect { .. } | Self::Path { .. } | Self::Circle { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartFigure {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub legend_position: LegendPosition,
    pub legend: Vec<LegendEntry>,
    /// 坐标轴、网格线
    pub guides: Vec<Mark>,
    pub marks: Vec<Mark>,
    pub empty: bool,
}

impl ChartFigure {
    pub fn new(title: impl Into<String>, options: &ChartOptions) -> Self {
        Self {
            width: options.width,
            height: options.height,
            title: title.into(),
            legend_position: options.legend,
            legend: Vec::new(),
            guides: Vec::new(),
            marks: Vec::new(),
            empty: false,
        }
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", fmt_num(self.width), fmt_num(self.height))
    }

    pub fn data_marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(|mark| mark.is_data())
    }

    /// 无可绘制数据时放一行居中提示，而不是报错。
    pub fn into_placeholder(mut self) -> Self {
        self.marks.clear();
        self.guides.clear();
        self.legend.clear();
        self.empty = true;
        self.marks.push(Mark::Text {
            x: self.width / 2.0,
            y: self.height / 2.0,
            content: "No data available".into(),
            anchor: TextAnchor::Middle,
            size: 13.0,
        });
        self
    }
}

/// 绘图区，扣除四周留白后的矩形。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    const PADDING_LEFT: f64 = 44.0;
    const PADDING_RIGHT: f64 = 16.0;
    const PADDING_TOP: f64 = 16.0;
    const PADDING_BOTTOM: f64 = 36.0;

    pub fn for_options(options: &ChartOptions) -> Self {
        Self {
            left: Self::PADDING_LEFT,
            top: Self::PADDING_TOP,
            right: (options.width - Self::PADDING_RIGHT).max(Self::PADDING_LEFT + 1.0),
            bottom: (options.height - Self::PADDING_BOTTOM).max(Self::PADDING_TOP + 1.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// 线性比例尺：数据域 `[min, max]` 映射到像素区间 `[start, end]`。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub min: f64,
    pub max: f64,
    pub start: f64,
    pub end: f64,
}

impl LinearScale {
    pub fn new<I>(values: I, begin_at_zero: bool, start: f64, end: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(value);
            max = max.max(value);
        }

        if !min.is_finite() || !max.is_finite() {
            min = 0.0;
            max = 1.0;
        }

        if begin_at_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }

        if (max - min).abs() < f64::EPSILON {
            max = min + 1.0;
        }

        Self {
            min,
            max,
            start,
            end,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let ratio = (value - self.min) / (self.max - self.min);
        self.start + ratio * (self.end - self.start)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let count = count.max(1);
        let step = (self.max - self.min) / count as f64;
        (0..=count).map(|i| self.min + step * i as f64).collect()
    }
}

pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_begins_at_zero_and_maps_linearly() {
        let scale = LinearScale::new([10.0, 20.0], true, 200.0, 0.0);
        assert_eq!(scale.min, 0.0);
        assert_eq!(scale.max, 20.0);
        assert_eq!(scale.map(0.0), 200.0);
        assert_eq!(scale.map(10.0), 100.0);
        assert_eq!(scale.map(20.0), 0.0);
    }

    #[test]
    fn degenerate_scale_is_widened() {
        let scale = LinearScale::new([5.0, 5.0], false, 0.0, 100.0);
        assert_eq!(scale.min, 5.0);
        assert_eq!(scale.max, 6.0);

        let empty = LinearScale::new(std::iter::empty(), false, 0.0, 100.0);
        assert_eq!((empty.min, empty.max), (0.0, 1.0));

        let nan = LinearScale::new([f64::NAN], true, 0.0, 100.0);
        assert!(nan.map(0.5).is_finite());
    }

    #[test]
    fn ticks_cover_the_domain() {
        let scale = LinearScale::new([0.0, 100.0], true, 0.0, 1.0);
        assert_eq!(scale.ticks(4), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn numbers_are_trimmed_for_svg() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.345), "12.35");
        assert_eq!(fmt_num(-0.5), "-0.5");
    }
}
