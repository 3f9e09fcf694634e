//! Export command implementation

use super::run::run_pipeline;
use crate::cli::ExportArgs;
use crate::dry_run::{display_planned_actions, plan_output, plan_pipeline, ActionType, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::ExportOutput;
use anyhow::{Context, Result};
use plzmap_core::config::LayeredConfig;
use plzmap_core::helpers::read_json;
use plzmap_pipeline::{Layer, LayerExport, PipelineOutput};

pub fn execute(args: ExportArgs, config: &LayeredConfig, output: &OutputWriter, dry_run: bool) -> Result<()> {
    let layer: Layer = args.layer.into();
    let pipeline_config = config.resolve().context("Invalid configuration")?;
    let what = format!("{} layer as GeoJSON", layer);

    if dry_run {
        let mut actions = match &args.from_snapshot {
            Some(path) => vec![PlannedAction::new(
                ActionType::ReadFile,
                format!("Read snapshot {}", path.display()),
            )],
            None => plan_pipeline(&pipeline_config),
        };
        actions.push(plan_output(args.out.as_deref(), &what));
        return display_planned_actions(output, &actions);
    }

    let result: PipelineOutput = match &args.from_snapshot {
        Some(path) => read_json(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?,
        None => run_pipeline(pipeline_config, output)?,
    };

    let export = LayerExport::from_output(&result, layer);
    if export.is_empty() {
        output.warning(format!("The {} layer has no features", layer));
    }

    let Some(path) = &args.out else {
        // Raw GeoJSON on stdout, without the status wrapper
        println!("{}", export.to_geojson_string()?);
        return Ok(());
    };

    export
        .write(path)
        .with_context(|| format!("Failed to write layer: {}", path.display()))?;

    let summary = ExportOutput {
        layer: layer.to_string(),
        value_property: layer.value_property().to_string(),
        features: export.len(),
        value_range: export.value_range(),
        bounds: export.bounds(),
        path: path.display().to_string(),
    };

    if output.is_json() {
        output.result(summary)?;
    } else {
        output.success(format!("Wrote {} features to {}", summary.features, summary.path));
        output.kv("Value property", &summary.value_property);
        if let Some((min, max)) = summary.value_range {
            output.kv("Value range", format!("{} - {}", min, max));
        }
        if let Some([min_x, min_y, max_x, max_y]) = summary.bounds {
            output.kv("Bounds", format!("[{:.4}, {:.4}, {:.4}, {:.4}]", min_x, min_y, max_x, max_y));
        }
    }

    Ok(())
}
