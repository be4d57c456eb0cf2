use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon,
};

use super::format;
use crate::color::{ColorMap, generate_ramp};
use crate::data::aggregate::{
    CategorySales, DailySales, MonthlySales, PaymentRegionSales, ProductSales,
};
use crate::forecast::Forecast;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Dates are plotted as days since 0001-01-01.
fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    x_to_date(mark.value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Label for a category axis whose ticks sit on integer positions.
fn index_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn empty_notice(ui: &mut Ui) {
    ui.label("No data for the current filters.");
}

// ---------------------------------------------------------------------------
// Sales trend (line)
// ---------------------------------------------------------------------------

/// Total sales per order date.
pub fn trend_plot(ui: &mut Ui, trend: &[DailySales]) {
    if trend.is_empty() {
        empty_notice(ui);
        return;
    }
    let points: PlotPoints = trend
        .iter()
        .map(|d| [date_to_x(d.date), d.total])
        .collect();

    Plot::new("sales_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Total sales")
        .x_axis_formatter(date_axis)
        .label_formatter(|_name: &str, value: &PlotPoint| {
            let date = x_to_date(value.x)
                .map(|d| d.to_string())
                .unwrap_or_default();
            format!("{date}\n{}", format::currency(value.y))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Total sales")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Top products (horizontal bars)
// ---------------------------------------------------------------------------

/// Ranked products, the best seller on top.
pub fn top_products_chart(ui: &mut Ui, products: &[ProductSales]) {
    if products.is_empty() {
        empty_notice(ui);
        return;
    }
    let n = products.len();
    // Bar at position 0 is drawn lowest, so the ranking is reversed onto the axis.
    let labels: Vec<String> = products.iter().rev().map(|p| p.product.clone()).collect();
    let colors = generate_ramp(n, 265.0);

    let bars: Vec<Bar> = products
        .iter()
        .enumerate()
        .map(|(rank, p)| {
            Bar::new((n - 1 - rank) as f64, p.total)
                .name(&p.product)
                .fill(colors[rank])
                .width(0.7)
        })
        .collect();

    Plot::new("top_products")
        .height(CHART_HEIGHT)
        .x_axis_label("Total sales")
        .y_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Top products"));
        });
}

// ---------------------------------------------------------------------------
// Category distribution (donut)
// ---------------------------------------------------------------------------

const DONUT_OUTER: f64 = 1.0;
const DONUT_INNER: f64 = 0.3;
/// Arc resolution; each step becomes one convex quad.
const DONUT_STEP: f64 = TAU / 180.0;

/// Convex annulus pieces covering the angle range `[from, to)`.
fn donut_segments(from: f64, to: f64) -> Vec<Vec<[f64; 2]>> {
    let sweep = to - from;
    if sweep <= 0.0 {
        return Vec::new();
    }
    let steps = ((sweep / DONUT_STEP) - 1e-9).ceil().max(1.0) as usize;
    let angle = |i: usize| from + sweep * i as f64 / steps as f64;
    let point = |r: f64, a: f64| [r * a.cos(), r * a.sin()];
    (0..steps)
        .map(|i| {
            let (a0, a1) = (angle(i), angle(i + 1));
            vec![
                point(DONUT_INNER, a0),
                point(DONUT_OUTER, a0),
                point(DONUT_OUTER, a1),
                point(DONUT_INNER, a1),
            ]
        })
        .collect()
}

/// Share of total sales per category; the legend carries the percentages.
pub fn category_donut(ui: &mut Ui, categories: &[CategorySales], colors: &ColorMap) {
    let total: f64 = categories.iter().map(|c| c.total).sum();
    if categories.is_empty() || total <= 0.0 {
        empty_notice(ui);
        return;
    }

    Plot::new("category_donut")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            // Start at twelve o'clock and go clockwise.
            let mut angle = TAU / 4.0;
            for cat in categories {
                let sweep = TAU * cat.total.max(0.0) / total;
                let color = colors.color_for(&cat.category);
                let name = format!("{} ({:.1}%)", cat.category, 100.0 * cat.total / total);
                for segment in donut_segments(angle - sweep, angle) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(segment))
                            .name(&name)
                            .fill_color(color)
                            .stroke(Stroke::new(0.0, color)),
                    );
                }
                angle -= sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Payment method × region (grouped horizontal bars)
// ---------------------------------------------------------------------------

/// One bar group per region, one bar per payment method within the group.
pub fn payment_region_chart(
    ui: &mut Ui,
    rows: &[PaymentRegionSales],
    regions: &[String],
    payments: &[String],
    colors: &ColorMap,
) {
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    // Only regions and payment methods that appear in the rows get a slot.
    let regions: Vec<String> = regions
        .iter()
        .filter(|r| rows.iter().any(|row| &row.region == *r))
        .cloned()
        .collect();
    let payments: Vec<&String> = payments
        .iter()
        .filter(|p| rows.iter().any(|row| &row.payment_method == *p))
        .collect();

    let group_width = 0.8;
    let bar_width = group_width / payments.len().max(1) as f64;

    let charts: Vec<BarChart> = payments
        .iter()
        .enumerate()
        .map(|(slot, payment)| {
            let offset = -group_width / 2.0 + bar_width * (slot as f64 + 0.5);
            let bars: Vec<Bar> = rows
                .iter()
                .filter(|row| &row.payment_method == *payment)
                .filter_map(|row| {
                    let region_idx = regions.iter().position(|r| r == &row.region)?;
                    Some(
                        Bar::new(region_idx as f64 + offset, row.total)
                            .name(format!("{} / {}", row.payment_method, row.region))
                            .width(bar_width * 0.95),
                    )
                })
                .collect();
            BarChart::new(bars)
                .horizontal()
                .color(colors.color_for(payment))
                .name(payment.as_str())
        })
        .collect();

    Plot::new("payment_region")
        .height(CHART_HEIGHT)
        .x_axis_label("Total sales")
        .legend(Legend::default())
        .y_axis_formatter(move |mark, _range| index_label(&regions, mark.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly history and forecast
// ---------------------------------------------------------------------------

pub fn monthly_plot(ui: &mut Ui, history: &[MonthlySales], forecast: &[Forecast]) {
    let history_points: PlotPoints = history
        .iter()
        .map(|m| [date_to_x(m.month), m.total])
        .collect();
    let forecast_points: Vec<[f64; 2]> = forecast
        .iter()
        .map(|f| [date_to_x(f.month), f.predicted])
        .collect();

    Plot::new("monthly_forecast")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Total sales")
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| format!("{}-{:02}", d.year(), d.month()))
                .unwrap_or_default()
        })
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(history_points)
                    .name("Actual")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.line(
                Line::new(PlotPoints::from(forecast_points.clone()))
                    .name("Forecast")
                    .color(Color32::from_rgb(255, 165, 0))
                    .style(egui_plot::LineStyle::dashed_loose()),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(forecast_points))
                    .name("Forecast")
                    .color(Color32::from_rgb(255, 165, 0))
                    .radius(3.0),
            );
        });
}
