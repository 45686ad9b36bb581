use super::adapter::adapt;
use super::{render, ChartFigure, ChartOptions};
use crate::models::{ChartKind, ChartPayload};

pub const IDLE_MESSAGE: &str = "Submit a query to see visualization";
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported chart type";

#[derive(Clone, Debug, PartialEq)]
pub enum ChartView {
    Loading,
    Idle,
    Unsupported(String),
    Rendered(ChartFigure),
}

/// 加载中优先：即使手上还有上一次的结果，也不展示旧图。
pub fn dispatch(chart: Option<&ChartPayload>, loading: bool, options: &ChartOptions) -> ChartView {
    if loading {
        return ChartView::Loading;
    }

    let Some(payload) = chart else {
        return ChartView::Idle;
    };

    let input = adapt(payload);
    let figure = match &payload.visualization_type {
        ChartKind::Bar => render::bar(&input, options),
        ChartKind::Line => render::line(&input, options),
        ChartKind::Pie => render::pie(&input, options),
        ChartKind::Doughnut => render::doughnut(&input, options),
        ChartKind::PolarArea => render::polar_area(&input, options),
        ChartKind::Radar => render::radar(&input, options),
        ChartKind::Scatter => render::scatter(&input, options),
        ChartKind::Bubble => render::bubble(&input, options),
        ChartKind::Unknown(tag) => {
            tracing::warn!(visualization_type = %tag, "unsupported chart type");
            return ChartView::Unsupported(tag.clone());
        }
    };

    ChartView::Rendered(figure)
}
