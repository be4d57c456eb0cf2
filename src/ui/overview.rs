use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::{format, plot};
use crate::data::aggregate::TOP_PRODUCTS;
use crate::data::filter::FilteredView;
use crate::data::model::{
    COL_CATEGORY, COL_ORDER_DATE, COL_ORDER_ID, COL_PAYMENT, COL_PRODUCT, COL_QUANTITY,
    COL_REGION, COL_TOTAL,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Overview page (central panel)
// ---------------------------------------------------------------------------

pub fn overview_page(ui: &mut Ui, state: &AppState) {
    let agg = &state.aggregates;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Sales Performance Summary");
            let summary = agg.summary;
            ui.columns(4, |cols| {
                metric(&mut cols[0], "Total Sales", format::currency(summary.total_sales));
                metric(&mut cols[1], "Orders", format::count(summary.order_count as i64));
                metric(
                    &mut cols[2],
                    "Avg. Order Value",
                    format::currency(summary.average_order_value),
                );
                metric(&mut cols[3], "Units Sold", format::count(summary.units_sold));
            });
            ui.separator();

            ui.heading("Sales Trend");
            plot::trend_plot(ui, &agg.trend);
            ui.separator();

            ui.heading("Top Products & Category Distribution");
            ui.columns(2, |cols| {
                cols[0].strong(format!("Top {TOP_PRODUCTS} products"));
                plot::top_products_chart(&mut cols[0], &agg.top_products);

                cols[1].strong("Sales per category");
                plot::category_donut(&mut cols[1], &agg.categories, &state.category_colors);
            });
            ui.separator();

            ui.heading("Sales by Payment Method and Region");
            plot::payment_region_chart(
                ui,
                &agg.payment_region,
                &state.dataset.regions,
                &state.dataset.payment_methods,
                &state.payment_colors,
            );
            ui.separator();

            ui.heading("Raw Data");
            raw_table(ui, state.view());
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).weak());
            ui.label(RichText::new(value).size(20.0).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

const TABLE_HEADERS: [&str; 8] = [
    COL_ORDER_ID,
    COL_ORDER_DATE,
    COL_REGION,
    COL_CATEGORY,
    COL_PRODUCT,
    COL_QUANTITY,
    COL_TOTAL,
    COL_PAYMENT,
];

fn raw_table(ui: &mut Ui, view: FilteredView<'_>) {
    if view.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + 4.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(360.0)
        .columns(Column::auto().at_least(80.0), TABLE_HEADERS.len())
        .header(row_height, |mut header| {
            for name in TABLE_HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, view.len(), |mut row| {
                let Some(rec) = view.get(row.index()) else {
                    return;
                };
                let date = rec
                    .order_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let cells = [
                    rec.order_id.clone(),
                    date,
                    rec.region.clone(),
                    rec.category.clone(),
                    rec.product.clone(),
                    format::count(rec.quantity),
                    format::grouped(rec.total, 2),
                    rec.payment_method.clone(),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
