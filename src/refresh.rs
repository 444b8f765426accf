// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::api::{CountrySource, RateSource};
use crate::countries::CountryStore;
use crate::error::{RefreshError, Result};
use crate::gdp::GdpEstimator;
use crate::models::{
    CountryFields, NewCountry, RateTable, RawCountry, StatusSummary, UpsertAction, UpsertOutcome,
};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Counters reported after a refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    #[serde(skip)]
    pub failures: Vec<RecordFailure>,
}

/// A country that could not be reconciled during a run
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub name: String,
    pub reason: String,
}

impl RefreshSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        self.processed += 1;
        match outcome.action {
            UpsertAction::Created => self.created += 1,
            UpsertAction::Updated => self.updated += 1,
        }
    }
}

/// Derive the stored fields of one upstream country.
///
/// No currency at all means an estimated GDP of zero; a currency without a
/// known rate leaves both rate and GDP unknown.
pub fn derive_country(
    raw: &RawCountry,
    rates: &RateTable,
    estimator: &mut GdpEstimator,
) -> Result<NewCountry> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| processing_error(raw, "name is required"))?;

    let population = match raw.population {
        Some(population) if population >= 0 => population,
        Some(_) => return Err(processing_error(raw, "population must not be negative")),
        None => return Err(processing_error(raw, "population is required")),
    };

    let currency_code = raw.currency_code();
    let (exchange_rate, estimated_gdp) = match currency_code.as_deref() {
        Some(code) => match rates.get(code) {
            Some(rate) => (Some(rate), estimator.estimate(Some(population), Some(rate))),
            None => (None, None),
        },
        None => (None, Some(0.0)),
    };

    Ok(NewCountry {
        name: name.to_string(),
        fields: CountryFields {
            capital: non_empty(&raw.capital),
            region: non_empty(&raw.region),
            population,
            currency_code,
            exchange_rate,
            estimated_gdp,
            flag_url: non_empty(&raw.flag),
        },
    })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn processing_error(raw: &RawCountry, reason: &str) -> RefreshError {
    RefreshError::RecordProcessing {
        name: raw.display_name().to_string(),
        reason: reason.to_string(),
    }
}

/// Fetches countries and rates, derives each country and reconciles it into
/// the store.
pub struct RefreshPipeline<C, R> {
    countries: C,
    rates: R,
    store: CountryStore,
    estimator: GdpEstimator,
    show_progress: bool,
}

impl<C: CountrySource, R: RateSource> RefreshPipeline<C, R> {
    pub fn new(countries: C, rates: R, store: CountryStore, estimator: GdpEstimator) -> Self {
        Self {
            countries,
            rates,
            store,
            estimator,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn store(&self) -> &CountryStore {
        &self.store
    }

    /// Run one refresh.
    ///
    /// Fails without writing anything when either fetch fails. Once both
    /// fetches succeed, errors on single countries are collected in the
    /// summary and the remaining countries are still reconciled.
    pub async fn run(&mut self) -> Result<RefreshSummary> {
        info!("Starting country data refresh");

        let (elements, rates) =
            futures::try_join!(self.countries.fetch_countries(), self.rates.fetch_rates())?;
        info!(
            countries = elements.len(),
            rates = rates.len(),
            "fetched upstream data"
        );

        let summary = self.reconcile(&elements, &rates).await;

        self.store.set_last_refreshed_at(Utc::now()).await?;

        if !summary.failures.is_empty() {
            warn!(failed = summary.failures.len(), "some countries were skipped");
        }
        info!(
            processed = summary.processed,
            created = summary.created,
            updated = summary.updated,
            "refresh complete"
        );

        Ok(summary)
    }

    async fn reconcile(&mut self, elements: &[Value], rates: &RateTable) -> RefreshSummary {
        let progress = if self.show_progress {
            let progress = ProgressBar::new(elements.len() as u64);
            progress.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
            );
            progress
        } else {
            ProgressBar::hidden()
        };

        let mut summary = RefreshSummary::default();
        for element in elements {
            let name = RawCountry::element_name(element);
            progress.set_message(name.to_string());
            match self.reconcile_one(element, rates).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    warn!(country = name, error = %e, "skipping country");
                    summary.failures.push(RecordFailure {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        summary
    }

    async fn reconcile_one(&mut self, element: &Value, rates: &RateTable) -> Result<UpsertOutcome> {
        let raw = RawCountry::from_element(element)?;
        let country = derive_country(&raw, rates, &mut self.estimator)?;
        self.store.upsert(&country).await
    }

    pub async fn status(&self) -> Result<StatusSummary> {
        self.store.status().await
    }
}
