// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::{RefreshError, Result};
use crate::models::{
    CountryFields, CountryFilter, CountryRecord, NewCountry, SortOrder, StatusSummary,
    UpsertAction, UpsertOutcome,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::debug;

const COUNTRY_COLUMNS: &str = "id, name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at, created_at";

const LAST_REFRESHED_AT: &str = "last_refreshed_at";

/// Case-insensitive lookup key for a country name. SQLite `NOCASE` only folds
/// ASCII, so names like "Åland Islands" are folded here instead.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Countries keyed by case-insensitive name, plus refresh metadata.
///
/// Writes assume a single writer: `upsert` looks the name up before deciding
/// to insert or update, so a concurrent writer could slip in between.
#[derive(Debug, Clone)]
pub struct CountryStore {
    pool: SqlitePool,
}

impl CountryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a country by name, ignoring case
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CountryRecord>> {
        let sql = format!(
            "SELECT {} FROM countries WHERE name_key = ?",
            COUNTRY_COLUMNS
        );
        let record = sqlx::query_as::<_, CountryRecord>(&sql)
            .bind(name_key(name))
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// List countries, optionally filtered by region and currency and sorted.
    /// Unknown sort keys fall back to creation order.
    pub async fn find_all(&self, filter: &CountryFilter) -> Result<Vec<CountryRecord>> {
        let mut sql = format!("SELECT {} FROM countries WHERE 1=1", COUNTRY_COLUMNS);
        if filter.region.is_some() {
            sql.push_str(" AND LOWER(region) = LOWER(?)");
        }
        if filter.currency.is_some() {
            sql.push_str(" AND LOWER(currency_code) = LOWER(?)");
        }
        let order = SortOrder::from_key(filter.sort.as_deref());
        sql.push_str(" ORDER BY ");
        sql.push_str(order.order_by());

        let mut query = sqlx::query_as::<_, CountryRecord>(&sql);
        if let Some(region) = &filter.region {
            query = query.bind(region.trim());
        }
        if let Some(currency) = &filter.currency {
            query = query.bind(currency.trim());
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records)
    }

    /// Insert a new country and return its id
    pub async fn create(&self, country: &NewCountry) -> Result<i64> {
        let now = Utc::now();
        let name = country.name.trim();
        let fields = &country.fields;
        let result = sqlx::query(
            r#"
            INSERT INTO countries (
                name, name_key, capital, region, population, currency_code,
                exchange_rate, estimated_gdp, flag_url, last_refreshed_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(name_key(name))
        .bind(&fields.capital)
        .bind(&fields.region)
        .bind(fields.population)
        .bind(&fields.currency_code)
        .bind(fields.exchange_rate)
        .bind(fields.estimated_gdp)
        .bind(&fields.flag_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if duplicate {
                RefreshError::DuplicateKey(name.to_string())
            } else {
                RefreshError::Database(e)
            }
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite the mutable fields of a country. Returns false when no
    /// country has that name.
    pub async fn update(&self, name: &str, fields: &CountryFields) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE countries SET
                capital = ?,
                region = ?,
                population = ?,
                currency_code = ?,
                exchange_rate = ?,
                estimated_gdp = ?,
                flag_url = ?,
                last_refreshed_at = ?
            WHERE name_key = ?
            "#,
        )
        .bind(&fields.capital)
        .bind(&fields.region)
        .bind(fields.population)
        .bind(&fields.currency_code)
        .bind(fields.exchange_rate)
        .bind(fields.estimated_gdp)
        .bind(&fields.flag_url)
        .bind(Utc::now())
        .bind(name_key(name))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Create the country on first sighting, update it afterwards
    pub async fn upsert(&self, country: &NewCountry) -> Result<UpsertOutcome> {
        if let Some(existing) = self.find_by_name(&country.name).await? {
            if !self.update(&existing.name, &country.fields).await? {
                return Err(RefreshError::NotFound(format!("Country {}", existing.name)));
            }
            debug!(country = %existing.name, id = existing.id, "updated country");
            return Ok(UpsertOutcome {
                action: UpsertAction::Updated,
                id: existing.id,
            });
        }

        let id = self.create(country).await?;
        debug!(country = %country.name, id, "created country");
        Ok(UpsertOutcome {
            action: UpsertAction::Created,
            id,
        })
    }

    /// Delete a country by name. Returns false when nothing matched.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM countries WHERE name_key = ?")
            .bind(name_key(name))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Countries with the highest estimated GDP, skipping unknown GDP
    pub async fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<(String, f64)>> {
        let records = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT name, estimated_gdp
            FROM countries
            WHERE estimated_gdp IS NOT NULL
            ORDER BY estimated_gdp DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM countries")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        let record = sqlx::query_as::<_, (Option<DateTime<Utc>>,)>(
            "SELECT value FROM refresh_metadata WHERE key = ?",
        )
        .bind(LAST_REFRESHED_AT)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.and_then(|(value,)| value))
    }

    pub async fn set_last_refreshed_at(&self, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_metadata (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(LAST_REFRESHED_AT)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn status(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            total_countries: self.count().await?,
            last_refreshed_at: self.last_refreshed_at().await?,
        })
    }
}
