//! Retroactive validation of saved recommendations.

use advisor_core::data::{fetch_series, AssetType, DataProvider, FetchRequest};
use advisor_core::{validate, ValidationReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AdvisorConfig;
use crate::store::{RecommendationStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Checked(ValidationReport),
    Skipped { symbol: String, reason: String },
}

impl ValidationOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            ValidationOutcome::Checked(report) => &report.symbol,
            ValidationOutcome::Skipped { symbol, .. } => symbol,
        }
    }
}

/// Check the recommendations saved for `date` against prices from `date`
/// through `today`. Asset types come from the watchlist; symbols no longer
/// listed are fetched as stocks. A symbol whose prices cannot be fetched is
/// skipped; only a broken store aborts.
pub fn validate_saved(
    store: &RecommendationStore,
    provider: &dyn DataProvider,
    config: &AdvisorConfig,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<ValidationOutcome>, StoreError> {
    let saved = store.load(&config.label, provider.source(), date)?;
    info!(label = %config.label, %date, saved = saved.len(), "validating saved recommendations");

    let outcomes = saved
        .iter()
        .map(|rec| {
            let asset_type = config
                .entry(&rec.symbol)
                .map(|e| e.asset_type)
                .unwrap_or(AssetType::Stock);
            let request = FetchRequest::new(rec.symbol.clone(), asset_type, rec.as_of.min(date), today);
            match fetch_series(provider, &request) {
                Ok(series) => {
                    let report = validate(rec, &series);
                    if report.succeeded() {
                        info!(symbol = %rec.symbol, exit = rec.exit_price, sessions = report.succeeded_count, "succeeded");
                    }
                    if report.busted() {
                        info!(symbol = %rec.symbol, stop = rec.stop_loss, sessions = report.busted_count, "busted");
                    }
                    ValidationOutcome::Checked(report)
                }
                Err(err) => {
                    warn!(symbol = %rec.symbol, error = %err, "cannot validate");
                    ValidationOutcome::Skipped {
                        symbol: rec.symbol.clone(),
                        reason: err.to_string(),
                    }
                }
            }
        })
        .collect();
    Ok(outcomes)
}
