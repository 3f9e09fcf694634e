//! Run command implementation

use crate::cli::RunArgs;
use crate::dry_run::{display_planned_actions, plan_output, plan_pipeline};
use crate::output::OutputWriter;
use crate::output_types::{LayerSummary, RunOutput, StatsRow, TopEntry};
use crate::progress::PipelineProgress;
use anyhow::{Context, Result};
use chrono::Utc;
use plzmap_core::config::{LayeredConfig, PipelineConfig};
use plzmap_core::helpers::{count_freqs, sort_by_key_stable, write_json};
use plzmap_pipeline::{Layer, LayerExport, Pipeline, PipelineOutput};

pub fn execute(args: RunArgs, config: &LayeredConfig, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let pipeline_config = config.resolve().context("Invalid configuration")?;

    if dry_run {
        let mut actions = plan_pipeline(&pipeline_config);
        if let Some(path) = &args.save {
            actions.push(plan_output(Some(path.as_path()), "JSON snapshot of the result tables"));
        }
        return display_planned_actions(output, &actions);
    }

    let result = run_pipeline(pipeline_config.clone(), output)?;

    let saved_to = match &args.save {
        Some(path) => {
            write_json(&result, path)
                .with_context(|| format!("Failed to save snapshot: {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let summary = summarize(&result, &pipeline_config, args.top, saved_to);

    if output.is_json() {
        output.result(summary)?;
        return Ok(());
    }

    output.success(format!(
        "Processed {} charging stations in {} postal codes, {} resident areas",
        result.charging.len(),
        result.counts.len(),
        result.residents.len()
    ));

    output.section("Row Accounting");
    output.table(vec![
        StatsRow::new(Layer::ChargingStations.as_str(), &summary.charging_stations.stats),
        StatsRow::new(Layer::Residents.as_str(), &summary.residents.stats),
    ]);

    output.section(format!("Top Postal Codes by Charging Stations ({})", summary.region));
    output.table(summary.charging_stations.top);

    output.section("Top Postal Codes by Residents");
    output.table(summary.residents.top);

    output.section("Rated Power");
    for (kw, stations) in &summary.power_distribution {
        output.kv(format!("{:>4} kW", kw), stations);
    }

    output.section("Geometry Lookup");
    output.kv("Postal codes", summary.geometry_keys);
    output.kv("District rows", summary.district_rows);
    if summary.duplicate_geometry_keys > 0 {
        output.warning(format!(
            "{} repeated postal codes in the geometry file; joined rows were multiplied",
            summary.duplicate_geometry_keys
        ));
    }

    if let Some(path) = &summary.saved_to {
        output.info(format!("Snapshot saved to {}", path));
    }

    Ok(())
}

/// Run the pipeline with stage spinners on stderr
pub(super) fn run_pipeline(config: PipelineConfig, output: &OutputWriter) -> Result<PipelineOutput> {
    let pipeline = Pipeline::new(config);
    let mut progress = PipelineProgress::new(!output.is_json());

    let result = pipeline.run_with_progress(|p| progress.update(&p));
    match result {
        Ok(result) => {
            progress.finish();
            Ok(result)
        }
        Err(e) => {
            progress.fail();
            Err(e).context("Pipeline run failed")
        }
    }
}

fn summarize(result: &PipelineOutput, config: &PipelineConfig, top: usize, saved_to: Option<String>) -> RunOutput {
    let stations = LayerExport::from_output(result, Layer::ChargingStations);
    let residents = LayerExport::from_output(result, Layer::Residents);

    RunOutput {
        generated_at: Utc::now(),
        data_dir: config.data_dir.display().to_string(),
        region: config.charging.region.clone(),
        validity: format!("{:?}", config.validity),
        charging_stations: layer_summary(&stations, result.charging.stats, top),
        residents: layer_summary(&residents, result.residents.stats, top),
        power_distribution: count_freqs(result.charging.rows.iter().map(|r| r.record.power_kw.round() as u64)),
        geometry_keys: result.geometry_keys,
        duplicate_geometry_keys: result.duplicate_geometry_keys,
        district_rows: result.district_rows,
        saved_to,
    }
}

fn layer_summary(layer: &LayerExport, stats: plzmap_core::models::RowStats, top: usize) -> LayerSummary {
    let mut entries: Vec<TopEntry> = layer
        .features
        .iter()
        .map(|f| TopEntry { postal_code: f.postal_code, value: f.value })
        .collect();
    sort_by_key_stable(&mut entries, false, |e| e.value);
    entries.truncate(top);

    LayerSummary {
        features: layer.len(),
        value_range: layer.value_range(),
        stats,
        top: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plzmap_core::models::{Geometry, PostalCodeCount};

    #[test]
    fn test_top_entries_sorted_descending_with_stable_ties() {
        let counts = vec![
            PostalCodeCount { postal_code: 10115, count: 1, geometry: Geometry::point(13.38, 52.53) },
            PostalCodeCount { postal_code: 10117, count: 3, geometry: Geometry::point(13.39, 52.52) },
            PostalCodeCount { postal_code: 10119, count: 1, geometry: Geometry::point(13.40, 52.53) },
        ];
        let layer = LayerExport::charging_stations(&counts);
        let summary = layer_summary(&layer, Default::default(), 2);

        let top: Vec<(u32, u64)> = summary.top.iter().map(|e| (e.postal_code, e.value)).collect();
        assert_eq!(top, vec![(10117, 3), (10115, 1)]);
        assert_eq!(summary.value_range, Some((1, 3)));
        assert_eq!(summary.features, 3);
    }
}
