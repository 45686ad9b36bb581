use dioxus::prelude::*;

use crate::charts::{dispatch, ChartView};
use crate::fixtures::charts::demo_charts;
use crate::ui::chart::ChartPanel;

#[component]
pub fn ChartGallery() -> Element {
    let views: Vec<(&'static str, ChartView)> = demo_charts()
        .into_iter()
        .map(|demo| (demo.key, dispatch(Some(&demo.payload), false, &demo.options)))
        .collect();

    rsx! {
        section { class: "grid w-full grid-cols-1 gap-8 md:grid-cols-2",
            for (key, view) in views {
                div { key: "{key}",
                    class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                    ChartPanel { view }
                }
            }
        }
    }
}
