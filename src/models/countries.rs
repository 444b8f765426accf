// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::{RefreshError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const UNNAMED: &str = "<unnamed>";

/// Country element as returned by the countries API. Every field is optional
/// here; required fields are checked per record during reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCountry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub currencies: Option<Vec<RawCurrency>>,
    pub flag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCurrency {
    pub code: Option<String>,
}

impl RawCountry {
    /// Decode one element of the upstream array. A mistyped field fails only
    /// this element.
    pub fn from_element(element: &Value) -> Result<Self> {
        Self::deserialize(element).map_err(|e| RefreshError::RecordProcessing {
            name: Self::element_name(element).to_string(),
            reason: format!("malformed record: {}", e),
        })
    }

    /// Name of an undecoded element, for logs and failure reports.
    pub fn element_name(element: &Value) -> &str {
        element.get("name").and_then(Value::as_str).unwrap_or(UNNAMED)
    }

    /// Code of the first listed currency, trimmed and uppercased.
    pub fn currency_code(&self) -> Option<String> {
        self.currencies
            .as_deref()
            .and_then(|currencies| currencies.first())
            .and_then(|c| c.code.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase)
    }

    /// Name used in logs, even when the upstream record has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

/// A stored country row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountryRecord {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields rewritten on every refresh of an existing country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryFields {
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// A derived country ready to be reconciled into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCountry {
    pub name: String,
    #[serde(flatten)]
    pub fields: CountryFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub id: i64,
}

/// Sort orders accepted by country listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    GdpDesc,
    GdpAsc,
    PopulationDesc,
    PopulationAsc,
    NameAsc,
    NameDesc,
    /// Creation order
    #[default]
    Id,
}

impl SortOrder {
    pub const VALID: [&'static str; 6] = [
        "gdp_desc",
        "gdp_asc",
        "population_desc",
        "population_asc",
        "name_asc",
        "name_desc",
    ];

    /// Parse a sort key, case-insensitively. Unknown keys yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "gdp_desc" => Some(Self::GdpDesc),
            "gdp_asc" => Some(Self::GdpAsc),
            "population_desc" => Some(Self::PopulationDesc),
            "population_asc" => Some(Self::PopulationAsc),
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    /// Falls back to creation order for absent or unknown keys.
    pub fn from_key(key: Option<&str>) -> Self {
        key.and_then(Self::parse).unwrap_or_default()
    }

    pub(crate) fn order_by(self) -> &'static str {
        match self {
            Self::GdpDesc => "estimated_gdp DESC, id ASC",
            Self::GdpAsc => "estimated_gdp ASC, id ASC",
            Self::PopulationDesc => "population DESC, id ASC",
            Self::PopulationAsc => "population ASC, id ASC",
            Self::NameAsc => "name_key ASC, id ASC",
            Self::NameDesc => "name_key DESC, id ASC",
            Self::Id => "id ASC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}
