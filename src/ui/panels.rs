use chrono::NaiveDate;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, CriteriaEvent, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel. Filter edits are collected as events and applied
/// once the widgets are drawn.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings & Navigation");
    ui.separator();

    ui.strong("Page");
    ui.radio_value(&mut state.page, Page::Overview, "Overview Dashboard");
    ui.radio_value(&mut state.page, Page::Prediction, "Sales Prediction");
    ui.separator();

    if state.page != Page::Overview {
        ui.label("Filters apply to the overview page.");
        return;
    }

    ui.heading("Filters");
    let mut events = Vec::new();
    let current: &AppState = state;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            date_filter(ui, current, &mut events);
            ui.separator();

            multiselect(
                ui,
                "Region",
                &current.dataset.regions,
                &current.criteria.regions,
                &mut events,
                CriteriaEvent::ToggleRegion,
                (CriteriaEvent::AllRegions, CriteriaEvent::NoRegions),
            );
            multiselect(
                ui,
                "Category",
                &current.dataset.categories,
                &current.criteria.categories,
                &mut events,
                CriteriaEvent::ToggleCategory,
                (CriteriaEvent::AllCategories, CriteriaEvent::NoCategories),
            );

            ui.separator();
            if ui.button("Reset filters").clicked() {
                events.push(CriteriaEvent::Reset);
            }
        });

    for event in events {
        state.apply(event);
    }
}

/// Start/end pickers, each with a checkbox. Unchecking either endpoint
/// turns date filtering off.
fn date_filter(ui: &mut Ui, state: &AppState, events: &mut Vec<CriteriaEvent>) {
    ui.strong("Date range");
    let Some((min_date, max_date)) = state.dataset.date_bounds else {
        ui.label("No valid order dates.");
        return;
    };

    let dates = state.criteria.dates;
    endpoint_picker(
        ui,
        "From",
        "start_date",
        dates.start,
        min_date,
        events,
        CriteriaEvent::SetStart,
    );
    endpoint_picker(
        ui,
        "To",
        "end_date",
        dates.end,
        max_date,
        events,
        CriteriaEvent::SetEnd,
    );

    if !dates.is_active() {
        ui.label(RichText::new("Date filter off").weak());
    }
    if state.dataset.unparsed_dates > 0 {
        ui.label(
            RichText::new(format!(
                "{} row(s) without a valid date",
                state.dataset.unparsed_dates
            ))
            .color(Color32::YELLOW),
        );
    }
}

fn endpoint_picker(
    ui: &mut Ui,
    label: &str,
    id: &str,
    current: Option<NaiveDate>,
    fallback: NaiveDate,
    events: &mut Vec<CriteriaEvent>,
    make_event: fn(Option<NaiveDate>) -> CriteriaEvent,
) {
    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = current.is_some();
        let mut date = current.unwrap_or(fallback);

        if ui.checkbox(&mut enabled, label).changed() {
            events.push(make_event(enabled.then_some(date)));
            return;
        }
        ui.add_enabled_ui(enabled, |ui: &mut Ui| {
            ui.add(DatePickerButton::new(&mut date).id_salt(id));
        });
        if enabled && Some(date) != current {
            events.push(make_event(Some(date)));
        }
    });
}

/// Collapsible checkbox list with All/None buttons; header shows `selected/total`.
fn multiselect(
    ui: &mut Ui,
    title: &str,
    options: &[String],
    selected: &std::collections::BTreeSet<String>,
    events: &mut Vec<CriteriaEvent>,
    toggle: fn(String) -> CriteriaEvent,
    (all, none): (CriteriaEvent, CriteriaEvent),
) {
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    events.push(all);
                }
                if ui.small_button("None").clicked() {
                    events.push(none);
                }
            });

            for value in options {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    events.push(toggle(value.clone()));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_dataset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open model…").clicked() {
                open_model_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dataset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows from {} ({} regions, {} categories)",
                    dataset.len(),
                    path.display(),
                    dataset.regions.len(),
                    dataset.categories.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn open_model_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales model")
        .add_filter("Model artifact", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.set_predictor(crate::forecast::load_model(&path));
    }
}
