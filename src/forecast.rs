use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Model artifact
// ---------------------------------------------------------------------------

/// A problem with a model artifact that parsed but cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model has {coefficients} coefficient(s) for {features} feature(s)")]
    ShapeMismatch { coefficients: usize, features: usize },

    #[error("unsupported model feature '{0}'")]
    UnsupportedFeature(String),
}

/// Linear regression weights, one coefficient per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// What the prediction page loads from disk: the model, the feature order
/// its coefficients follow, and the month the `month_index` feature counts
/// from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: LinearModel,
    pub features: Vec<String>,
    /// `year * 12 + (month - 1)` of the first training month.
    pub base_month_ordinal: i64,
}

/// Inputs a model may be trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    MonthIndex,
    Month,
    Quarter,
    Year,
}

impl Feature {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "month_index" => Some(Feature::MonthIndex),
            "month" => Some(Feature::Month),
            "quarter" => Some(Feature::Quarter),
            "year" => Some(Feature::Year),
            _ => None,
        }
    }

    fn value(self, date: NaiveDate, base_month_ordinal: i64) -> f64 {
        match self {
            Feature::MonthIndex => (month_ordinal(date) - base_month_ordinal) as f64,
            Feature::Month => f64::from(date.month()),
            Feature::Quarter => f64::from((date.month() - 1) / 3 + 1),
            Feature::Year => f64::from(date.year()),
        }
    }
}

pub fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

// ---------------------------------------------------------------------------
// Validated predictor
// ---------------------------------------------------------------------------

/// A model artifact whose features have been checked against what we can
/// compute.
#[derive(Debug, Clone)]
pub struct SalesPredictor {
    artifact: ModelArtifact,
    features: Vec<Feature>,
}

/// One forecast row.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub month: NaiveDate,
    pub predicted: f64,
}

impl SalesPredictor {
    pub fn new(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.model.coefficients.len() != artifact.features.len() {
            return Err(ModelError::ShapeMismatch {
                coefficients: artifact.model.coefficients.len(),
                features: artifact.features.len(),
            });
        }
        let features = artifact
            .features
            .iter()
            .map(|name| {
                Feature::parse(name).ok_or_else(|| ModelError::UnsupportedFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { artifact, features })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// The month the model counts `month_index` from.
    pub fn base_month(&self) -> Option<NaiveDate> {
        let ordinal = self.artifact.base_month_ordinal;
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
        let month = u32::try_from(ordinal.rem_euclid(12)).ok()? + 1;
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    /// Predicted total sales for the month containing `date`.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        let base = self.artifact.base_month_ordinal;
        self.features
            .iter()
            .zip(&self.artifact.model.coefficients)
            .fold(self.artifact.model.intercept, |acc, (feature, coef)| {
                acc + coef * feature.value(date, base)
            })
    }

    /// Predictions for `months` consecutive months starting at `from`'s month.
    pub fn forecast(&self, from: NaiveDate, months: u32) -> Vec<Forecast> {
        let Some(first) = from.with_day(1) else {
            return Vec::new();
        };
        (0..months)
            .filter_map(|i| first.checked_add_months(Months::new(i)))
            .map(|month| Forecast {
                month,
                predicted: self.predict(month),
            })
            .collect()
    }
}

/// Load and validate a JSON model artifact.
pub fn load_model(path: &Path) -> Result<SalesPredictor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading model artifact {}", path.display()))?;
    let artifact: ModelArtifact =
        serde_json::from_str(&text).context("parsing model artifact")?;
    let predictor = SalesPredictor::new(artifact)?;
    log::info!(
        "Loaded sales model with features {:?}",
        predictor.artifact().features
    );
    Ok(predictor)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn artifact(features: &[&str], coefficients: Vec<f64>) -> ModelArtifact {
        ModelArtifact {
            model: LinearModel {
                intercept: 1000.0,
                coefficients,
            },
            features: features.iter().map(|s| s.to_string()).collect(),
            base_month_ordinal: month_ordinal(ymd(2023, 1, 1)),
        }
    }

    #[test]
    fn month_ordinal_counts_months() {
        assert_eq!(month_ordinal(ymd(2024, 1, 15)) - month_ordinal(ymd(2023, 12, 1)), 1);
        assert_eq!(month_ordinal(ymd(2023, 1, 1)), 2023 * 12);
    }

    #[test]
    fn predicts_from_month_index() {
        let predictor = SalesPredictor::new(artifact(&["month_index"], vec![50.0])).unwrap();
        assert_eq!(predictor.predict(ymd(2023, 1, 20)), 1000.0);
        assert_eq!(predictor.predict(ymd(2024, 1, 1)), 1600.0);
        assert_eq!(predictor.base_month(), Some(ymd(2023, 1, 1)));
    }

    #[test]
    fn combines_calendar_features() {
        let predictor =
            SalesPredictor::new(artifact(&["month", "quarter", "year"], vec![1.0, 10.0, 0.5]))
                .unwrap();
        // August 2024: month 8, quarter 3, year 2024.
        assert_eq!(predictor.predict(ymd(2024, 8, 3)), 1000.0 + 8.0 + 30.0 + 1012.0);
    }

    #[test]
    fn forecast_walks_consecutive_months() {
        let predictor = SalesPredictor::new(artifact(&["month_index"], vec![10.0])).unwrap();
        let rows = predictor.forecast(ymd(2023, 11, 17), 3);
        let months: Vec<NaiveDate> = rows.iter().map(|f| f.month).collect();
        assert_eq!(months, vec![ymd(2023, 11, 1), ymd(2023, 12, 1), ymd(2024, 1, 1)]);
        assert_eq!(rows[2].predicted, 1120.0);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let err = SalesPredictor::new(artifact(&["month_index", "month"], vec![1.0])).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                coefficients: 1,
                features: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_feature() {
        let err = SalesPredictor::new(artifact(&["weekday"], vec![1.0])).unwrap_err();
        assert_eq!(err, ModelError::UnsupportedFeature("weekday".to_string()));
    }

    #[test]
    fn loads_artifact_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model": {{"intercept": 5.0, "coefficients": [2.0]}},
                "features": ["month_index"], "base_month_ordinal": 24276}}"#
        )
        .unwrap();

        let predictor = load_model(file.path()).unwrap();
        assert_eq!(predictor.base_month(), Some(ymd(2023, 1, 1)));
        assert_eq!(predictor.predict(ymd(2023, 3, 1)), 9.0);
    }

    #[test]
    fn missing_artifact_is_an_error() {
        assert!(load_model(Path::new("/nonexistent/model_sales.json")).is_err());
    }
}
