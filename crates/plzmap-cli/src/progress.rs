use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use plzmap_pipeline::{PipelineStage, StageProgress};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {}", message));
}

/// One spinner per pipeline stage, driven by the pipeline's progress callback
pub struct PipelineProgress {
    multi: MultiProgress,
    active: Option<(PipelineStage, ProgressBar, String)>,
}

impl PipelineProgress {
    /// Create the tracker; a hidden tracker draws nothing (used for --json)
    pub fn new(visible: bool) -> Self {
        let multi = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Self { multi, active: None }
    }

    /// Close the previous stage and start a spinner for the reported one
    pub fn update(&mut self, progress: &StageProgress) {
        if let Some((stage, _, _)) = &self.active {
            if *stage == progress.stage {
                return;
            }
        }
        self.finish_active();

        let message = if progress.total > 0 {
            format!("{} ({} rows)", progress.message, progress.total)
        } else {
            progress.message.clone()
        };
        let pb = self.multi.add(create_spinner(&message));
        self.active = Some((progress.stage, pb, progress.message.clone()));
    }

    /// Mark the last stage as done
    pub fn finish(&mut self) {
        self.finish_active();
    }

    /// Mark the running stage as failed
    pub fn fail(&mut self) {
        if let Some((_, pb, message)) = self.active.take() {
            finish_error(&pb, &message);
        }
    }

    fn finish_active(&mut self) {
        if let Some((_, pb, message)) = self.active.take() {
            finish_success(&pb, &message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(stage: PipelineStage) -> StageProgress {
        StageProgress { stage, total: 3, message: format!("{:?}", stage) }
    }

    #[test]
    fn test_stage_switch_replaces_active_spinner() {
        let mut progress = PipelineProgress::new(false);
        progress.update(&report(PipelineStage::Loading));
        progress.update(&report(PipelineStage::Loading));
        progress.update(&report(PipelineStage::BuildingLookup));

        let (stage, _, _) = progress.active.as_ref().unwrap();
        assert_eq!(*stage, PipelineStage::BuildingLookup);

        progress.finish();
        assert!(progress.active.is_none());
    }
}
