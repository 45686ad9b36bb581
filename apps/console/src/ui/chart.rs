use dioxus::prelude::*;

use crate::charts::dispatch::{IDLE_MESSAGE, UNSUPPORTED_MESSAGE};
use crate::charts::{ChartFigure, ChartView, LegendPosition, Mark};

fn mark_node(mark: &Mark) -> Element {
    match mark {
        Mark::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width,
        } => rsx! {
            rect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                fill: "{fill}",
                stroke: "{stroke}",
                stroke_width: *stroke_width,
            }
        },
        Mark::Path {
            d,
            fill,
            stroke,
            stroke_width,
        } => rsx! {
            path {
                d: "{d}",
                fill: "{fill}",
                stroke: "{stroke}",
                stroke_width: *stroke_width,
                stroke_linejoin: "round",
            }
        },
        Mark::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
            stroke_width,
        } => rsx! {
            circle {
                cx: *cx,
                cy: *cy,
                r: *r,
                fill: "{fill}",
                stroke: "{stroke}",
                stroke_width: *stroke_width,
            }
        },
        Mark::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => rsx! {
            line {
                x1: *x1,
                y1: *y1,
                x2: *x2,
                y2: *y2,
                stroke: "{stroke}",
                stroke_width: 1,
            }
        },
        Mark::Text {
            x,
            y,
            content,
            anchor,
            size,
        } => rsx! {
            text {
                x: *x,
                y: *y,
                text_anchor: anchor.as_svg(),
                font_size: *size,
                fill: "#475569",
                "{content}"
            }
        },
    }
}

#[component]
fn Legend(figure: ChartFigure) -> Element {
    if figure.legend.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        ul { class: "flex flex-wrap justify-center gap-3 text-[11px] text-slate-600",
            for (idx, entry) in figure.legend.iter().enumerate() {
                li { key: "{idx}", class: "flex items-center gap-1",
                    span {
                        class: "inline-block h-3 w-6 rounded-sm border border-slate-300",
                        style: "background: {entry.color}",
                    }
                    "{entry.label}"
                }
            }
        }
    }
}

/// 把 [`ChartFigure`] 的图元原样画成 SVG。
#[component]
pub fn ChartCanvas(figure: ChartFigure) -> Element {
    let legend_on_top = figure.legend_position == LegendPosition::Top;

    rsx! {
        div { class: "flex w-full flex-col gap-2",
            p { class: "text-center text-xs font-semibold text-slate-600", "{figure.title}" }
            if legend_on_top {
                Legend { figure: figure.clone() }
            }
            svg {
                class: "h-72 w-full",
                view_box: figure.view_box(),
                preserve_aspect_ratio: "xMidYMid meet",
                g { class: "chart-guides",
                    for mark in figure.guides.iter() {
                        {mark_node(mark)}
                    }
                }
                g { class: "chart-marks",
                    for mark in figure.marks.iter() {
                        {mark_node(mark)}
                    }
                }
            }
            if !legend_on_top {
                Legend { figure: figure.clone() }
            }
        }
    }
}

#[component]
pub fn ChartPanel(view: ChartView) -> Element {
    match view {
        ChartView::Loading => rsx! {
            div { class: "h-64 w-full animate-pulse rounded-lg bg-slate-200" }
        },
        ChartView::Idle => rsx! {
            div { class: "text-center text-sm text-slate-500", "{IDLE_MESSAGE}" }
        },
        ChartView::Unsupported(tag) => rsx! {
            div { class: "text-center text-sm text-slate-500",
                "{UNSUPPORTED_MESSAGE}"
                span { class: "ml-1 font-mono text-[11px] text-slate-400", "({tag})" }
            }
        },
        ChartView::Rendered(figure) => rsx! {
            ChartCanvas { figure }
        },
    }
}
