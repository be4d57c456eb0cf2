use chrono::Months;
use eframe::egui::{Color32, Grid, RichText, ScrollArea, Ui};

use super::{format, plot};
use crate::state::AppState;

/// Months forecast after the last month with sales.
const FORECAST_MONTHS: u32 = 6;

// ---------------------------------------------------------------------------
// Prediction page (central panel)
// ---------------------------------------------------------------------------

/// Monthly history of the whole dataset plus the model's forecast.
/// Filters do not apply here.
pub fn prediction_page(ui: &mut Ui, state: &AppState) {
    ui.heading("Sales Prediction");

    let Some(predictor) = &state.predictor else {
        let reason = state.model_error.as_deref().unwrap_or("no model loaded");
        ui.label(RichText::new(format!("Prediction unavailable: {reason}")).color(Color32::RED));
        ui.label("Load a model artifact with File → Open model…");
        return;
    };

    let history = crate::data::aggregate::monthly_sales(&state.dataset.records);
    let next_month = history
        .last()
        .and_then(|m| m.month.checked_add_months(Months::new(1)))
        .or_else(|| predictor.base_month());
    let forecast = next_month
        .map(|from| predictor.forecast(from, FORECAST_MONTHS))
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "Model features: {}",
                predictor.artifact().features.join(", ")
            ));
            plot::monthly_plot(ui, &history, &forecast);
            ui.separator();

            ui.strong("Forecast");
            Grid::new("forecast_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("Month");
                    ui.strong("Predicted sales");
                    ui.end_row();
                    for row in &forecast {
                        ui.label(row.month.format("%Y-%m").to_string());
                        ui.label(format::currency(row.predicted));
                        ui.end_row();
                    }
                });
        });
}
