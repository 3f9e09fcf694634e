use crate::output::OutputWriter;
use plzmap_core::config::{PipelineConfig, Source};
use serde::Serialize;
use std::path::Path;

/// Represents a planned action in dry-run mode
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    pub action_type: ActionType,
    pub description: String,
    pub details: Vec<String>,
}

/// Types of actions that can be planned
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ReadFile,
    RunPipeline,
    WriteFile,
    PrintOutput,
}

impl PlannedAction {
    /// Create a new planned action
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            action_type,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// Add a detail to the planned action
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

/// Reading every source file and running the pipeline over them
pub fn plan_pipeline(config: &PipelineConfig) -> Vec<PlannedAction> {
    let mut actions: Vec<PlannedAction> = Source::ALL
        .iter()
        .map(|&source| {
            let format = config.table_format(source);
            PlannedAction::new(
                ActionType::ReadFile,
                format!("Read {}", config.source_path(source).display()),
            )
            .with_detail(format!("Source: {}", source.as_str()))
            .with_detail(format!("Delimiter: '{}'", format.delimiter))
            .with_detail(format!("Skipped lines: {}", format.skip_lines))
        })
        .collect();

    actions.push(
        PlannedAction::new(ActionType::RunPipeline, "Clean, geo-join and aggregate")
            .with_detail(format!("Region: {}", config.charging.region))
            .with_detail(format!(
                "Charging postal range: ({}, {})",
                config.charging.postal_range.lower, config.charging.postal_range.upper
            ))
            .with_detail(format!(
                "Resident postal range: ({}, {})",
                config.residents.postal_range.lower, config.residents.postal_range.upper
            ))
            .with_detail(format!("Validity: {:?}", config.validity)),
    );

    actions
}

/// Writing a result file, or printing it when no path is given
pub fn plan_output(path: Option<&Path>, what: &str) -> PlannedAction {
    match path {
        Some(path) => PlannedAction::new(ActionType::WriteFile, format!("Write {}", what))
            .with_detail(format!("Path: {}", path.display())),
        None => PlannedAction::new(ActionType::PrintOutput, format!("Print {} to stdout", what)),
    }
}

/// Display planned actions in dry-run mode
pub fn display_planned_actions(output: &OutputWriter, actions: &[PlannedAction]) -> anyhow::Result<()> {
    if output.is_json() {
        output.result(serde_json::json!({
            "dry_run": true,
            "planned_actions": actions,
        }))?;
    } else {
        output.section("Planned Actions (Dry Run)");
        for (i, action) in actions.iter().enumerate() {
            output.info(format!("{}. {:?}: {}", i + 1, action.action_type, action.description));
            for detail in &action.details {
                output.info(format!("   - {}", detail));
            }
        }
        output.info("No files were written. Run without --dry-run to execute these actions.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_plan_reads_every_source() {
        let actions = plan_pipeline(&PipelineConfig::default());

        assert_eq!(actions.len(), Source::ALL.len() + 1);
        assert!(actions[0].description.ends_with("geodata_berlin_plz.csv"));
        assert!(actions[2].details.iter().any(|d| d == "Skipped lines: 10"));
        assert!(matches!(actions[4].action_type, ActionType::RunPipeline));
    }

    #[test]
    fn test_output_plan() {
        let write = plan_output(Some(Path::new("out/stations.geojson")), "charging-stations layer");
        assert!(matches!(write.action_type, ActionType::WriteFile));

        let print = plan_output(None, "charging-stations layer");
        let json = serde_json::to_string(&print).unwrap();
        assert!(json.contains("print_output"));
    }
}
