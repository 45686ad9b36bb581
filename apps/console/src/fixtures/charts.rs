use crate::charts::{ChartOptions, LegendPosition};
use crate::models::{ChartKind, ChartPayload, Dataset, DatasetValues, Point};

/// 仪表盘画廊里的一张演示图。
#[derive(Clone, Debug, PartialEq)]
pub struct DemoChart {
    pub key: &'static str,
    pub payload: ChartPayload,
    pub options: ChartOptions,
}

const YEARLY_COUNTS: [(u16, f64); 7] = [
    (2010, 10.0),
    (2011, 20.0),
    (2012, 15.0),
    (2013, 25.0),
    (2014, 22.0),
    (2015, 30.0),
    (2016, 28.0),
];

fn yearly(kind: ChartKind) -> ChartPayload {
    ChartPayload {
        visualization_type: kind,
        labels: YEARLY_COUNTS
            .iter()
            .map(|(year, _)| year.to_string())
            .collect(),
        datasets: vec![Dataset {
            label: "Count".into(),
            data: DatasetValues::Indexed(YEARLY_COUNTS.iter().map(|(_, count)| *count).collect()),
        }],
    }
}

fn points(kind: ChartKind, label: &str, values: &[(f64, f64, Option<f64>)]) -> ChartPayload {
    ChartPayload {
        visualization_type: kind,
        labels: Vec::new(),
        datasets: vec![Dataset {
            label: label.into(),
            data: DatasetValues::Points(
                values
                    .iter()
                    .map(|&(x, y, r)| Point { x, y, r })
                    .collect(),
            ),
        }],
    }
}

pub fn demo_charts() -> Vec<DemoChart> {
    let titled = |title: &str, legend: LegendPosition| {
        ChartOptions::default()
            .with_title(title)
            .with_legend(legend)
    };

    vec![
        DemoChart {
            key: "pie",
            payload: yearly(ChartKind::Pie),
            options: titled("Chart.js Pie Chart", LegendPosition::Bottom),
        },
        DemoChart {
            key: "doughnut",
            payload: yearly(ChartKind::Doughnut),
            options: titled("Chart.js Doughnut Chart", LegendPosition::Bottom),
        },
        DemoChart {
            key: "polar-area",
            payload: ChartPayload {
                visualization_type: ChartKind::PolarArea,
                labels: ["Red", "Green", "Yellow", "Grey", "Blue"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                datasets: vec![Dataset {
                    label: "My First Dataset".into(),
                    data: DatasetValues::Indexed(vec![11.0, 16.0, 7.0, 3.0, 14.0]),
                }],
            },
            options: ChartOptions::default(),
        },
        DemoChart {
            key: "radar",
            payload: yearly(ChartKind::Radar),
            options: titled("Chart.js Radar Chart", LegendPosition::Top),
        },
        DemoChart {
            key: "scatter",
            payload: points(
                ChartKind::Scatter,
                "Scatter Dataset",
                &[
                    (-10.0, 0.0, None),
                    (0.0, 10.0, None),
                    (10.0, 5.0, None),
                    (0.5, 5.5, None),
                ],
            ),
            options: titled("Chart.js Scatter Chart", LegendPosition::Top),
        },
        DemoChart {
            key: "bubble",
            payload: points(
                ChartKind::Bubble,
                "First Dataset",
                &[(20.0, 30.0, Some(15.0)), (40.0, 10.0, Some(10.0))],
            ),
            options: titled("Chart.js Bubble Chart", LegendPosition::Top),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{dispatch, ChartView};

    #[test]
    fn every_demo_renders_with_data() {
        for demo in demo_charts() {
            match dispatch(Some(&demo.payload), false, &demo.options) {
                ChartView::Rendered(figure) => {
                    assert!(!figure.empty, "{} rendered empty", demo.key);
                    assert!(figure.data_marks().count() > 0);
                }
                other => panic!("{} did not render: {other:?}", demo.key),
            }
        }
    }

    #[test]
    fn polar_demo_uses_one_sector_per_label() {
        let polar = demo_charts()
            .into_iter()
            .find(|demo| demo.key == "polar-area")
            .expect("polar demo");
        match dispatch(Some(&polar.payload), false, &polar.options) {
            ChartView::Rendered(figure) => {
                assert_eq!(figure.data_marks().count(), 5);
                assert_eq!(figure.legend.len(), 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
