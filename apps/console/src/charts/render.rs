//! 各类图表的纯渲染函数：`(RendererInput, ChartOptions) -> ChartFigure`。
//!
//! 类目图（bar/line/pie/doughnut/polar-area/radar）按 `(label, dataset)`
//! 生成图元，缺值的 label 直接跳过，多出 `labels` 的取值被忽略。
//! 坐标图（scatter/bubble）只看点坐标。

use std::f64::consts::{FRAC_PI_2, TAU};

use super::adapter::{RendererInput, SeriesValues, StyledSeries};
use super::{
    fmt_num, ChartFigure, ChartOptions, LegendEntry, LinearScale, Mark, PlotArea, TextAnchor,
};

const AXIS_COLOR: &str = "#cbd5e1";
const GRID_COLOR: &str = "#f1f5f9";
const Y_TICKS: usize = 4;
const POINT_RADIUS: f64 = 3.0;
const BUBBLE_DEFAULT_RADIUS: f64 = 5.0;
const DOUGHNUT_CUTOUT: f64 = 0.5;

pub fn bar(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    let mut figure = base_figure(input, options);
    let label_count = input.labels.len();
    if label_count == 0 || input.series.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let y = LinearScale::new(
        indexed_values(input).map(|(_, _, value)| value),
        options.begin_at_zero,
        area.bottom,
        area.top,
    );
    push_value_axis(&mut figure, &area, &y);
    push_category_labels(&mut figure, &area, &input.labels);

    let band = area.width() / label_count as f64;
    let group_width = band * 0.8;
    let bar_width = group_width / input.series.len() as f64;
    let baseline = y.map(0.0_f64.clamp(y.min, y.max));

    for (label_index, series_index, value) in indexed_values(input) {
        let series = &input.series[series_index];
        let x = area.left + band * label_index as f64 + (band - group_width) / 2.0
            + bar_width * series_index as f64;
        let top = y.map(value);
        figure.marks.push(Mark::Rect {
            x,
            y: top.min(baseline),
            width: bar_width,
            height: (baseline - top).abs(),
            fill: series.style.primary().to_string(),
            stroke: series.style.border_color.clone(),
            stroke_width: series.style.border_width,
        });
    }

    finish(figure)
}

pub fn line(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    let mut figure = base_figure(input, options);
    let label_count = input.labels.len();
    if label_count == 0 || input.series.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let y = LinearScale::new(
        indexed_values(input).map(|(_, _, value)| value),
        options.begin_at_zero,
        area.bottom,
        area.top,
    );
    push_value_axis(&mut figure, &area, &y);
    push_category_labels(&mut figure, &area, &input.labels);

    let band = area.width() / label_count as f64;
    for (series_index, series) in input.series.iter().enumerate() {
        let points: Vec<(f64, f64)> = indexed_values(input)
            .filter(|(_, s, _)| *s == series_index)
            .map(|(i, _, value)| (area.left + band * (i as f64 + 0.5), y.map(value)))
            .collect();

        if points.len() > 1 {
            figure.marks.push(Mark::Path {
                d: polyline(&points, false),
                fill: "none".into(),
                stroke: series.style.border_color.clone(),
                stroke_width: series.style.border_width,
            });
        }

        for (cx, cy) in points {
            figure.marks.push(Mark::Circle {
                cx,
                cy,
                r: POINT_RADIUS,
                fill: series.style.primary().to_string(),
                stroke: series.style.border_color.clone(),
                stroke_width: series.style.border_width,
            });
        }
    }

    finish(figure)
}

pub fn pie(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    arc_chart(input, options, 0.0)
}

pub fn doughnut(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    arc_chart(input, options, DOUGHNUT_CUTOUT)
}

pub fn polar_area(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    let mut figure = base_figure(input, options);
    figure.legend = label_legend(input);
    let label_count = input.labels.len();
    if label_count == 0 || input.series.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let (cx, cy) = area.center();
    let radius = radial_radius(&area);
    let max = indexed_values(input)
        .map(|(_, _, value)| value)
        .fold(0.0_f64, f64::max);
    let scale = LinearScale::new([0.0, max], true, 0.0, radius);

    for tick in scale.ticks(Y_TICKS).into_iter().skip(1) {
        figure.guides.push(Mark::Circle {
            cx,
            cy,
            r: scale.map(tick),
            fill: "none".into(),
            stroke: GRID_COLOR.into(),
            stroke_width: 1.0,
        });
    }

    let step = TAU / label_count as f64;
    for (label_index, series_index, value) in indexed_values(input) {
        if value <= 0.0 {
            continue;
        }
        let series = &input.series[series_index];
        let start = -FRAC_PI_2 + step * label_index as f64;
        figure.marks.push(Mark::Path {
            d: sector_path(cx, cy, scale.map(value), 0.0, start, start + step),
            fill: series.style.background_at(label_index).to_string(),
            stroke: series.style.border_color.clone(),
            stroke_width: series.style.border_width,
        });
    }

    finish(figure)
}

pub fn radar(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    let mut figure = base_figure(input, options);
    let label_count = input.labels.len();
    if label_count == 0 || input.series.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let (cx, cy) = area.center();
    let radius = radial_radius(&area);
    let max = indexed_values(input)
        .map(|(_, _, value)| value)
        .fold(0.0_f64, f64::max);
    let scale = LinearScale::new([0.0, max], true, 0.0, radius);
    let step = TAU / label_count as f64;
    let angle = |i: usize| -FRAC_PI_2 + step * i as f64;

    for (i, label) in input.labels.iter().enumerate() {
        let (x, y) = polar(cx, cy, radius, angle(i));
        figure.guides.push(Mark::Line {
            x1: cx,
            y1: cy,
            x2: x,
            y2: y,
            stroke: AXIS_COLOR.into(),
        });
        let (lx, ly) = polar(cx, cy, radius + 12.0, angle(i));
        figure.guides.push(Mark::Text {
            x: lx,
            y: ly,
            content: label.clone(),
            anchor: TextAnchor::Middle,
            size: 10.0,
        });
    }

    for (series_index, series) in input.series.iter().enumerate() {
        let vertices: Vec<(f64, f64)> = indexed_values(input)
            .filter(|(_, s, _)| *s == series_index)
            .map(|(i, _, value)| polar(cx, cy, scale.map(value.max(0.0)), angle(i)))
            .collect();

        if vertices.len() > 1 {
            figure.marks.push(Mark::Path {
                d: polyline(&vertices, true),
                fill: series.style.primary().to_string(),
                stroke: series.style.border_color.clone(),
                stroke_width: series.style.border_width,
            });
        }

        for (px, py) in vertices {
            figure.marks.push(Mark::Circle {
                cx: px,
                cy: py,
                r: POINT_RADIUS,
                fill: series.style.border_color.clone(),
                stroke: series.style.border_color.clone(),
                stroke_width: 1.0,
            });
        }
    }

    finish(figure)
}

pub fn scatter(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    coordinate_chart(input, options, false)
}

pub fn bubble(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    coordinate_chart(input, options, true)
}

fn coordinate_chart(input: &RendererInput, options: &ChartOptions, bubble: bool) -> ChartFigure {
    let mut figure = base_figure(input, options);
    let points: Vec<(usize, f64, f64, Option<f64>)> = input
        .series
        .iter()
        .enumerate()
        .flat_map(|(series_index, series)| match &series.values {
            SeriesValues::Points(points) => points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .map(|p| (series_index, p.x, p.y, p.r))
                .collect::<Vec<_>>(),
            SeriesValues::Indexed(_) => Vec::new(),
        })
        .collect();

    if points.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let x = LinearScale::new(points.iter().map(|p| p.1), false, area.left, area.right);
    let y = LinearScale::new(points.iter().map(|p| p.2), false, area.bottom, area.top);
    push_value_axis(&mut figure, &area, &y);
    for tick in x.ticks(Y_TICKS) {
        figure.guides.push(Mark::Text {
            x: x.map(tick),
            y: area.bottom + 16.0,
            content: fmt_num(tick),
            anchor: TextAnchor::Middle,
            size: 10.0,
        });
    }

    let max_radius = area.width().min(area.height()) / 4.0;
    for (series_index, px, py, r) in points {
        let style = &input.series[series_index].style;
        let radius = if bubble {
            r.filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(BUBBLE_DEFAULT_RADIUS)
                .min(max_radius)
        } else {
            POINT_RADIUS
        };
        figure.marks.push(Mark::Circle {
            cx: x.map(px),
            cy: y.map(py),
            r: radius,
            fill: style.primary().to_string(),
            stroke: style.border_color.clone(),
            stroke_width: style.border_width,
        });
    }

    finish(figure)
}

fn arc_chart(input: &RendererInput, options: &ChartOptions, cutout: f64) -> ChartFigure {
    let mut figure = base_figure(input, options);
    figure.legend = label_legend(input);
    if input.labels.is_empty() || input.series.is_empty() {
        return figure.into_placeholder();
    }

    let area = PlotArea::for_options(options);
    let (cx, cy) = area.center();
    let outer = radial_radius(&area);
    let inner = outer * cutout;
    let ring = (outer - inner) / input.series.len() as f64;

    for (series_index, series) in input.series.iter().enumerate() {
        let slices: Vec<(usize, f64)> = indexed_values(input)
            .filter(|(_, s, value)| *s == series_index && *value > 0.0)
            .map(|(i, _, value)| (i, value))
            .collect();
        let total: f64 = slices.iter().map(|(_, value)| value).sum();
        if total <= 0.0 {
            continue;
        }

        let r_outer = outer - ring * series_index as f64;
        let r_inner = r_outer - ring;
        let mut start = -FRAC_PI_2;
        for (label_index, value) in slices {
            let end = start + TAU * value / total;
            figure.marks.push(Mark::Path {
                d: sector_path(cx, cy, r_outer, r_inner.max(0.0), start, end),
                fill: series.style.background_at(label_index).to_string(),
                stroke: series.style.border_color.clone(),
                stroke_width: series.style.border_width,
            });
            start = end;
        }
    }

    finish(figure)
}

fn base_figure(input: &RendererInput, options: &ChartOptions) -> ChartFigure {
    let title = options
        .title
        .clone()
        .unwrap_or_else(|| input.kind.display_name().to_string());
    let mut figure = ChartFigure::new(title, options);
    figure.legend = input.series.iter().map(series_legend).collect();
    figure
}

fn finish(figure: ChartFigure) -> ChartFigure {
    if figure.data_marks().next().is_none() {
        figure.into_placeholder()
    } else {
        figure
    }
}

fn series_legend(series: &StyledSeries) -> LegendEntry {
    LegendEntry {
        label: series.label.clone(),
        color: series.style.border_color.clone(),
    }
}

fn label_legend(input: &RendererInput) -> Vec<LegendEntry> {
    let Some(first) = input.series.first() else {
        return Vec::new();
    };
    input
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| LegendEntry {
            label: label.clone(),
            color: first.style.background_at(i).to_string(),
        })
        .collect()
}

/// `(label_index, series_index, value)`，已按 `labels` 长度截断并剔除非有限值。
fn indexed_values(input: &RendererInput) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
    let label_count = input.labels.len();
    (0..label_count).flat_map(move |label_index| {
        input
            .series
            .iter()
            .enumerate()
            .filter_map(move |(series_index, series)| match &series.values {
                SeriesValues::Indexed(values) => values
                    .get(label_index)
                    .copied()
                    .filter(|value| value.is_finite())
                    .map(|value| (label_index, series_index, value)),
                SeriesValues::Points(_) => None,
            })
    })
}

fn push_value_axis(figure: &mut ChartFigure, area: &PlotArea, scale: &LinearScale) {
    for tick in scale.ticks(Y_TICKS) {
        let y = scale.map(tick);
        figure.guides.push(Mark::Line {
            x1: area.left,
            y1: y,
            x2: area.right,
            y2: y,
            stroke: GRID_COLOR.into(),
        });
        figure.guides.push(Mark::Text {
            x: area.left - 6.0,
            y: y + 3.0,
            content: fmt_num(tick),
            anchor: TextAnchor::End,
            size: 10.0,
        });
    }
    figure.guides.push(Mark::Line {
        x1: area.left,
        y1: area.bottom,
        x2: area.right,
        y2: area.bottom,
        stroke: AXIS_COLOR.into(),
    });
    figure.guides.push(Mark::Line {
        x1: area.left,
        y1: area.top,
        x2: area.left,
        y2: area.bottom,
        stroke: AXIS_COLOR.into(),
    });
}

fn push_category_labels(figure: &mut ChartFigure, area: &PlotArea, labels: &[String]) {
    let band = area.width() / labels.len().max(1) as f64;
    for (i, label) in labels.iter().enumerate() {
        figure.guides.push(Mark::Text {
            x: area.left + band * (i as f64 + 0.5),
            y: area.bottom + 16.0,
            content: label.clone(),
            anchor: TextAnchor::Middle,
            size: 10.0,
        });
    }
}

fn radial_radius(area: &PlotArea) -> f64 {
    (area.width().min(area.height()) / 2.0 - 8.0).max(1.0)
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn polyline(points: &[(f64, f64)], closed: bool) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{cmd}{},{} ", fmt_num(*x), fmt_num(*y)));
    }
    if closed {
        d.push('Z');
    }
    d.trim_end().to_string()
}

/// 环形扇区路径。弧在中点处拆成两段，每段不超过半圆，省去 large-arc 判断，
/// 也能画出完整的 360° 扇区。
fn sector_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, end: f64) -> String {
    let mid = (start + end) / 2.0;
    let (ox0, oy0) = polar(cx, cy, outer, start);
    let (oxm, oym) = polar(cx, cy, outer, mid);
    let (ox1, oy1) = polar(cx, cy, outer, end);
    let r = fmt_num(outer);

    let mut d = format!(
        "M{},{} A{r},{r} 0 0 1 {},{} A{r},{r} 0 0 1 {},{}",
        fmt_num(ox0),
        fmt_num(oy0),
        fmt_num(oxm),
        fmt_num(oym),
        fmt_num(ox1),
        fmt_num(oy1),
    );

    if inner > 0.0 {
        let (ix1, iy1) = polar(cx, cy, inner, end);
        let (ixm, iym) = polar(cx, cy, inner, mid);
        let (ix0, iy0) = polar(cx, cy, inner, start);
        let ir = fmt_num(inner);
        d.push_str(&format!(
            " L{},{} A{ir},{ir} 0 0 0 {},{} A{ir},{ir} 0 0 0 {},{} Z",
            fmt_num(ix1),
            fmt_num(iy1),
            fmt_num(ixm),
            fmt_num(iym),
            fmt_num(ix0),
            fmt_num(iy0),
        ));
    } else {
        d.push_str(&format!(" L{},{} Z", fmt_num(cx), fmt_num(cy)));
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::adapt;
    use crate::models::{ChartKind, ChartPayload, Dataset, DatasetValues, Point};

    fn indexed_payload(kind: ChartKind, labels: &[&str], series: &[&[f64]]) -> RendererInput {
        adapt(&ChartPayload {
            visualization_type: kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            datasets: series
                .iter()
                .enumerate()
                .map(|(i, values)| Dataset {
                    label: format!("series-{i}"),
                    data: DatasetValues::Indexed(values.to_vec()),
                })
                .collect(),
        })
    }

    fn rects(figure: &ChartFigure) -> Vec<(f64, f64)> {
        figure
            .marks
            .iter()
            .filter_map(|mark| match mark {
                Mark::Rect { x, height, .. } => Some((*x, *height)),
                _ => None,
            })
            .collect()
    }

    fn texts(marks: &[Mark]) -> Vec<String> {
        marks
            .iter()
            .filter_map(|mark| match mark {
                Mark::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bar_draws_one_rect_per_label_and_dataset() {
        let input = indexed_payload(ChartKind::Bar, &["N", "S"], &[&[10.0, 20.0]]);
        let figure = bar(&input, &ChartOptions::default());
        assert!(!figure.empty);

        let bars = rects(&figure);
        assert_eq!(bars.len(), 2);
        assert!(bars[0].0 < bars[1].0);
        assert!((bars[1].1 - 2.0 * bars[0].1).abs() < 1e-6);

        let labels = texts(&figure.guides);
        assert!(labels.contains(&"N".to_string()));
        assert!(labels.contains(&"S".to_string()));
        assert_eq!(figure.title, "Bar Chart");
    }

    #[test]
    fn grouped_bars_scale_with_dataset_count() {
        let input = indexed_payload(ChartKind::Bar, &["a", "b", "c"], &[&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]]);
        let figure = bar(&input, &ChartOptions::default());
        assert_eq!(rects(&figure).len(), 6);
        assert_eq!(figure.legend.len(), 2);
    }

    #[test]
    fn negative_bars_hang_below_baseline() {
        let input = indexed_payload(ChartKind::Bar, &["loss", "gain"], &[&[-5.0, 5.0]]);
        let figure = bar(&input, &ChartOptions::default());
        let bars = rects(&figure);
        assert!((bars[0].1 - bars[1].1).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_are_truncated() {
        let input = indexed_payload(ChartKind::Bar, &["a", "b"], &[&[1.0, 2.0, 3.0]]);
        assert_eq!(rects(&bar(&input, &ChartOptions::default())).len(), 2);

        let input = indexed_payload(ChartKind::Bar, &["a", "b", "c"], &[&[1.0]]);
        assert_eq!(rects(&bar(&input, &ChartOptions::default())).len(), 1);
    }

    #[test]
    fn line_draws_path_and_points() {
        let input = indexed_payload(ChartKind::Line, &["Jan", "Feb", "Mar"], &[&[1.0, 4.0, 2.0]]);
        let figure = line(&input, &ChartOptions::default());
        let paths = figure
            .marks
            .iter()
            .filter(|m| matches!(m, Mark::Path { .. }))
            .count();
        let circles = figure
            .marks
            .iter()
            .filter(|m| matches!(m, Mark::Circle { .. }))
            .count();
        assert_eq!(paths, 1);
        assert_eq!(circles, 3);
    }

    #[test]
    fn empty_datasets_render_placeholder() {
        let input = indexed_payload(ChartKind::Line, &["a"], &[]);
        for figure in [
            bar(&input, &ChartOptions::default()),
            line(&input, &ChartOptions::default()),
            pie(&input, &ChartOptions::default()),
            doughnut(&input, &ChartOptions::default()),
            polar_area(&input, &ChartOptions::default()),
            radar(&input, &ChartOptions::default()),
            scatter(&input, &ChartOptions::default()),
            bubble(&input, &ChartOptions::default()),
        ] {
            assert!(figure.empty);
            assert_eq!(figure.data_marks().count(), 0);
            assert_eq!(texts(&figure.marks), vec!["No data available".to_string()]);
        }
    }

    #[test]
    fn pie_slices_skip_non_positive_values() {
        let input = indexed_payload(ChartKind::Pie, &["a", "b", "c"], &[&[1.0, 0.0, 3.0]]);
        let figure = pie(&input, &ChartOptions::default());
        assert_eq!(figure.data_marks().count(), 2);
        assert_eq!(figure.legend.len(), 3);
    }

    #[test]
    fn single_slice_covers_full_circle() {
        let input = indexed_payload(ChartKind::Doughnut, &["only"], &[&[7.0]]);
        let figure = doughnut(&input, &ChartOptions::default());
        match &figure.marks[0] {
            Mark::Path { d, .. } => {
                assert!(d.starts_with('M'));
                assert!(d.ends_with('Z'));
                assert!(!d.contains("NaN"));
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn polar_area_and_radar_emit_marks_per_label() {
        let input = indexed_payload(
            ChartKind::PolarArea,
            &["Red", "Green", "Yellow", "Grey", "Blue"],
            &[&[11.0, 16.0, 7.0, 3.0, 14.0]],
        );
        assert_eq!(polar_area(&input, &ChartOptions::default()).data_marks().count(), 5);

        let input = indexed_payload(ChartKind::Radar, &["a", "b", "c"], &[&[1.0, 2.0, 3.0]]);
        let figure = radar(&input, &ChartOptions::default());
        let circles = figure
            .marks
            .iter()
            .filter(|m| matches!(m, Mark::Circle { .. }))
            .count();
        assert_eq!(circles, 3);
    }

    #[test]
    fn bubble_radius_follows_r() {
        let input = adapt(&ChartPayload {
            visualization_type: ChartKind::Bubble,
            labels: Vec::new(),
            datasets: vec![Dataset {
                label: "First Dataset".into(),
                data: DatasetValues::Points(vec![
                    Point { x: 20.0, y: 30.0, r: Some(15.0) },
                    Point { x: 40.0, y: 10.0, r: Some(10.0) },
                    Point { x: 30.0, y: 20.0, r: None },
                ]),
            }],
        });
        let figure = bubble(&input, &ChartOptions::default());
        let radii: Vec<f64> = figure
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Circle { r, .. } => Some(*r),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![15.0, 10.0, BUBBLE_DEFAULT_RADIUS]);
    }

    #[test]
    fn scatter_ignores_labels_and_non_finite_points() {
        let input = adapt(&ChartPayload {
            visualization_type: ChartKind::Scatter,
            labels: vec!["unused".into()],
            datasets: vec![Dataset {
                label: "Scatter Dataset".into(),
                data: DatasetValues::Points(vec![
                    Point { x: -10.0, y: 0.0, r: None },
                    Point { x: 0.0, y: 10.0, r: None },
                    Point { x: f64::NAN, y: 1.0, r: None },
                ]),
            }],
        });
        let figure = scatter(&input, &ChartOptions::default());
        assert_eq!(figure.data_marks().count(), 2);
    }

    #[test]
    fn explicit_title_overrides_default() {
        let input = indexed_payload(ChartKind::Line, &["a"], &[&[1.0]]);
        let figure = line(&input, &ChartOptions::default().with_title("Revenue"));
        assert_eq!(figure.title, "Revenue");
    }
}
