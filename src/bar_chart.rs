use crate::countries::CountryStore;
use crate::models::StatusSummary;
use anyhow::Result;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SUMMARY_IMAGE: &str = "summary.png";

/// Render the top countries by estimated GDP to `<output_dir>/summary.png`
pub async fn generate_summary_image(
    store: &CountryStore,
    output_dir: &Path,
    top_n: i64,
) -> Result<PathBuf> {
    let status = store.status().await?;
    let top = store.top_by_estimated_gdp(top_n).await?;

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(SUMMARY_IMAGE);
    create_summary_chart(&top, &status, &output_path)?;

    info!(path = %output_path.display(), "summary image generated");
    Ok(output_path)
}

/// Caption line with the country total and last refresh time
pub fn summary_caption(status: &StatusSummary) -> String {
    let refreshed = status
        .last_refreshed_at
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "Total countries: {} | Last refreshed: {}",
        status.total_countries, refreshed
    )
}

fn create_summary_chart(
    top: &[(String, f64)],
    status: &StatusSummary,
    output_path: &Path,
) -> Result<()> {
    let root_area = BitMapBackend::new(output_path, (1200, 800)).into_drawing_area();
    root_area.fill(&WHITE)?;

    // GDP in billions
    let max_gdp = top.first().map(|(_, gdp)| *gdp).unwrap_or(0.0) / 1_000_000_000.0;
    let y_max = if max_gdp > 0.0 { max_gdp * 1.1 } else { 1.0 };
    let bars = top.len().max(1) as i32;

    let mut chart = ChartBuilder::on(&root_area)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .caption(
            format!("Top {} Countries by Estimated GDP", top.len()),
            ("sans-serif", 30),
        )
        .build_cartesian_2d(0i32..bars, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc("Estimated GDP (Billions)")
        .draw()?;

    for (i, (name, gdp)) in top.iter().enumerate() {
        let gdp_billions = gdp / 1_000_000_000.0;
        let i = i as i32;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(i, 0.0), (i + 1, gdp_billions)],
            BLUE.mix(0.4).filled(),
        )))?;

        chart.draw_series(std::iter::once(Text::new(
            name.clone(),
            (i, gdp_billions + y_max * 0.02),
            ("sans-serif", 15).into_font(),
        )))?;
    }

    root_area.draw(&Text::new(
        summary_caption(status),
        (20, 770),
        ("sans-serif", 18).into_font(),
    ))?;

    root_area.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_summary_caption() {
        let status = StatusSummary {
            total_countries: 250,
            last_refreshed_at: Some(
                DateTime::parse_from_rfc3339("2025-10-19T08:30:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        };
        assert_eq!(
            summary_caption(&status),
            "Total countries: 250 | Last refreshed: 2025-10-19 08:30 UTC"
        );

        let empty = StatusSummary {
            total_countries: 0,
            last_refreshed_at: None,
        };
        assert_eq!(summary_caption(&empty), "Total countries: 0 | Last refreshed: never");
    }
}
