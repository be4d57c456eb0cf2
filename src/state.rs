use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::AggregateResult;
use crate::data::filter::{FilterCriteria, FilteredView, filtered_indices};
use crate::data::model::SalesDataset;
use crate::forecast::SalesPredictor;

// ---------------------------------------------------------------------------
// Pages and criteria events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Prediction,
}

/// A user edit to the filter criteria. Every event triggers a full
/// recomputation of the filtered view and its aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaEvent {
    SetStart(Option<NaiveDate>),
    SetEnd(Option<NaiveDate>),
    ToggleRegion(String),
    AllRegions,
    NoRegions,
    ToggleCategory(String),
    AllCategories,
    NoCategories,
    /// Back to the full date range with everything selected.
    Reset,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded sales table, immutable for the session (File → Open replaces it).
    pub dataset: SalesDataset,

    /// Prediction model, if its artifact loaded and validated.
    pub predictor: Option<SalesPredictor>,

    /// Why the prediction page is unavailable.
    pub model_error: Option<String>,

    /// Current date range and selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria.
    pub visible_indices: Vec<usize>,

    /// Aggregates over `visible_indices`.
    pub aggregates: AggregateResult,

    /// Colours per category and per payment method.
    pub category_colors: ColorMap,
    pub payment_colors: ColorMap,

    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the session from inputs loaded at startup.
    pub fn new(dataset: SalesDataset, predictor: anyhow::Result<SalesPredictor>) -> Self {
        let mut state = Self {
            dataset: SalesDataset::default(),
            predictor: None,
            model_error: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            aggregates: AggregateResult::default(),
            category_colors: ColorMap::default(),
            payment_colors: ColorMap::default(),
            page: Page::default(),
            status_message: None,
        };
        state.set_dataset(dataset);
        state.set_predictor(predictor);
        state
    }

    /// Ingest a newly loaded dataset, reset criteria and colours.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.criteria = FilterCriteria::select_all(&dataset);
        self.category_colors = ColorMap::new(&dataset.categories);
        self.payment_colors = ColorMap::new(&dataset.payment_methods);
        self.dataset = dataset;
        self.status_message = None;
        self.recompute();
    }

    /// Install the outcome of loading a model artifact.
    pub fn set_predictor(&mut self, predictor: anyhow::Result<SalesPredictor>) {
        match predictor {
            Ok(p) => {
                self.predictor = Some(p);
                self.model_error = None;
            }
            Err(e) => {
                log::warn!("Prediction disabled: {e:#}");
                self.predictor = None;
                self.model_error = Some(format!("{e:#}"));
            }
        }
    }

    /// The records passing the current criteria.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(&self.dataset, &self.visible_indices)
    }

    /// Apply one criteria edit and recompute everything derived from it.
    pub fn apply(&mut self, event: CriteriaEvent) {
        log::debug!("criteria event: {event:?}");
        let criteria = &mut self.criteria;
        match event {
            CriteriaEvent::SetStart(date) => criteria.dates.start = date,
            CriteriaEvent::SetEnd(date) => criteria.dates.end = date,
            CriteriaEvent::ToggleRegion(region) => toggle(&mut criteria.regions, region),
            CriteriaEvent::AllRegions => {
                criteria.regions = self.dataset.regions.iter().cloned().collect();
            }
            CriteriaEvent::NoRegions => criteria.regions.clear(),
            CriteriaEvent::ToggleCategory(category) => toggle(&mut criteria.categories, category),
            CriteriaEvent::AllCategories => {
                criteria.categories = self.dataset.categories.iter().cloned().collect();
            }
            CriteriaEvent::NoCategories => criteria.categories.clear(),
            CriteriaEvent::Reset => *criteria = FilterCriteria::select_all(&self.dataset),
        }
        self.recompute();
    }

    /// Recompute `visible_indices` and `aggregates` from the criteria.
    fn recompute(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.criteria);
        self.aggregates = AggregateResult::compute(self.view().records());
    }
}

fn toggle(selected: &mut BTreeSet<String>, value: String) {
    if !selected.remove(&value) {
        selected.insert(value);
    }
}
