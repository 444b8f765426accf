// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::Deserialize;
use std::collections::HashMap;

/// Body of the exchange rate API. `rates` is required; everything else the
/// provider sends is ignored.
#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub base_code: Option<String>,
    pub rates: HashMap<String, f64>,
}

/// Currency code to rate against the provider's base currency, for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Builds a table with uppercase codes. Rates that are not positive and
    /// finite are dropped.
    pub fn new<I, K>(rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let rates = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.as_ref().trim().to_uppercase(), rate))
            .collect();
        Self { rates }
    }

    pub fn get(&self, currency_code: &str) -> Option<f64> {
        self.rates.get(&currency_code.trim().to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl From<RatesResponse> for RateTable {
    fn from(response: RatesResponse) -> Self {
        RateTable::new(response.rates)
    }
}
