// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::countries::CountryStore;
use crate::models::{CountryFilter, CountryRecord};
use anyhow::Result;
use chrono::Local;
use csv::Writer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const HEADERS: [&str; 11] = [
    "Name",
    "Capital",
    "Region",
    "Population",
    "Currency",
    "Exchange Rate",
    "Estimated GDP",
    "Flag URL",
    "Last Refreshed At",
    "Created At",
    "ID",
];

/// Write countries as CSV, one row per record
pub fn write_countries_csv<W: Write>(records: &[CountryRecord], out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(HEADERS)?;

    for r in records {
        writer.write_record(&[
            r.name.clone(),
            r.capital.clone().unwrap_or_default(),
            r.region.clone().unwrap_or_default(),
            r.population.to_string(),
            r.currency_code.clone().unwrap_or_default(),
            r.exchange_rate.map(|v| v.to_string()).unwrap_or_default(),
            r.estimated_gdp.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            r.flag_url.clone().unwrap_or_default(),
            r.last_refreshed_at.to_rfc3339(),
            r.created_at.to_rfc3339(),
            r.id.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Export every stored country to `<output_dir>/countries_<timestamp>.csv`
pub async fn export_countries(store: &CountryStore, output_dir: &Path) -> Result<PathBuf> {
    let records = store.find_all(&CountryFilter::default()).await?;

    fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("countries_{}.csv", timestamp));
    let file = fs::File::create(&path)?;
    write_countries_csv(&records, file)?;

    info!(count = records.len(), path = %path.display(), "exported countries");
    Ok(path)
}
