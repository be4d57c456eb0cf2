use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Filter criteria: date range plus selected regions and categories
// ---------------------------------------------------------------------------

/// Inclusive date interval. Only constrains records when both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether the range filters anything at all.
    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Whether a record's date passes this range.
    ///
    /// * Range incomplete → everything passes, including missing dates
    /// * Range active, date missing → fails
    /// * Range active → `start <= date <= end`
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => date.is_some_and(|d| start <= d && d <= end),
            _ => true,
        }
    }
}

/// The active combination of date range, region set and category set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub dates: DateRange,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that admit every record with a parseable date: full date
    /// range, every region, every category.
    pub fn select_all(dataset: &SalesDataset) -> Self {
        Self {
            dates: dataset
                .date_bounds
                .map(|(lo, hi)| DateRange::new(lo, hi))
                .unwrap_or_default(),
            regions: dataset.regions.iter().cloned().collect(),
            categories: dataset.categories.iter().cloned().collect(),
        }
    }

    /// Whether a single record passes every constraint.
    ///
    /// An empty region or category set selects nothing.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.dates.admits(record.order_date)
            && self.regions.contains(&record.region)
            && self.categories.contains(&record.category)
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Return indices of records that pass the criteria, in table order.
pub fn filtered_indices(dataset: &SalesDataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.regions.is_empty() || criteria.categories.is_empty() {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// A borrowed subset of a dataset, addressed by row index.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a SalesDataset, indices: &'a [usize]) -> Self {
        Self { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records of the view in table order.
    pub fn records(&self) -> impl Iterator<Item = &'a SalesRecord> + 'a {
        let dataset = self.dataset;
        let indices = self.indices;
        let records = &dataset.records;
        indices.iter().map(move |&i| &records[i])
    }

    /// The `n`-th record of the view.
    pub fn get(&self, n: usize) -> Option<&'a SalesRecord> {
        let dataset = self.dataset;
        self.indices.get(n).map(|&i| &dataset.records[i])
    }
}
