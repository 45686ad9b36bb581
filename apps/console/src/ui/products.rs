use dioxus::prelude::*;

use crate::hooks::rag::use_products;
use crate::models::Product;
use crate::state::use_app_state;

/// 按 id-ID 习惯格式化印尼盾：`Rp 12.500,00`。
pub fn format_idr(amount: f64) -> String {
    if !amount.is_finite() {
        return "Rp -".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}Rp {grouped},{fraction:02}")
}

pub fn stock_badge_class(stock: u32) -> &'static str {
    if stock > 100 {
        "bg-green-50 text-green-600"
    } else if stock > 0 {
        "bg-yellow-50 text-yellow-600"
    } else {
        "bg-red-50 text-red-600"
    }
}

pub fn stock_label(stock: u32) -> String {
    let unit = if stock == 1 { "unit" } else { "units" };
    format!("{stock} {unit}")
}

#[component]
pub fn ProductCountBadge() -> Element {
    let count = use_app_state().read().products.items.len();

    rsx! {
        div { class: "flex items-center rounded-lg bg-blue-50 px-4 py-2 text-blue-600",
            span { class: "font-medium", "{count} Products" }
        }
    }
}

#[component]
fn ProductRow(index: usize, product: Product) -> Element {
    let price = format_idr(product.price);
    let badge = stock_badge_class(product.stock);
    let stock = stock_label(product.stock);
    let number = index + 1;

    rsx! {
        tr { class: "transition-colors hover:bg-slate-50",
            td { class: "w-16 px-4 py-2 font-medium text-slate-500", "{number}" }
            td { class: "px-4 py-2 font-medium", "{product.name}" }
            td { class: "px-4 py-2",
                span { class: "font-medium text-blue-600", "{price}" }
            }
            td { class: "px-4 py-2",
                span { class: format!("rounded-full px-2 py-1 text-xs font-medium {badge}"), "{stock}" }
            }
            td { class: "px-4 py-2",
                span { class: "rounded-full bg-slate-100 px-2 py-1 text-xs text-slate-600", "{product.category}" }
            }
        }
    }
}

#[component]
pub fn ProductInventory() -> Element {
    use_products();
    let products = use_app_state().read().products.clone();

    if products.is_loading || !products.loaded {
        return rsx! {
            div { class: "flex h-64 flex-col items-center justify-center text-slate-500",
                div { class: "mb-2 h-8 w-8 animate-spin rounded-full border-2 border-slate-300 border-t-slate-600" }
                p { class: "text-sm font-medium", "Loading products..." }
            }
        };
    }

    if let Some(error) = products.error.as_ref() {
        return rsx! {
            div { class: "flex h-64 flex-col items-center justify-center rounded-lg bg-red-50 text-red-600",
                p { class: "text-sm font-medium", "Error loading products" }
                p { class: "text-xs text-red-400", "{error}" }
            }
        };
    }

    rsx! {
        section { class: "overflow-hidden rounded-lg border border-slate-100 bg-white shadow-sm",
            div { class: "border-b border-slate-100 px-6 py-4",
                h2 { class: "font-semibold text-slate-700", "Product Inventory" }
            }
            div { class: "overflow-x-auto",
                table { class: "w-full text-left text-sm",
                    thead {
                        tr { class: "bg-slate-50 text-slate-600",
                            th { class: "w-16 px-4 py-2 font-medium", "No" }
                            th { class: "px-4 py-2 font-medium", "Name" }
                            th { class: "px-4 py-2 font-medium", "Price" }
                            th { class: "px-4 py-2 font-medium", "Stock" }
                            th { class: "px-4 py-2 font-medium", "Category" }
                        }
                    }
                    tbody {
                        for (index, product) in products.items.iter().enumerate() {
                            ProductRow { key: "{product.id}", index, product: product.clone() }
                        }
                    }
                }
            }
            if products.items.is_empty() {
                div { class: "py-8 text-center text-slate-500",
                    p { "No products found" }
                }
            }
        }
    }
}
