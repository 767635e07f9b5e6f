//! UI surface the submission controller drives.

use tracing::{debug, info, warn};

use crate::render::Report;
use crate::submission::ControlState;

/// Handles to the page elements touched during a submission.
///
/// Implementations own their element references; the controller never
/// reaches for ambient globals.
pub trait SubmissionView: Send {
    /// Apply the submit control's derived look (label, spinner, enablement).
    fn apply_controls(&mut self, controls: &ControlState);
    /// Reset the results container to its empty template.
    fn clear_report(&mut self);
    /// Replace the results container's content with `report`.
    fn show_report(&mut self, report: &Report);
    /// Hide the "no results yet" message.
    fn hide_placeholder(&mut self);
    /// Bring the named container into view.
    fn scroll_into_view(&mut self, element_id: &str);
    /// Top-level failure notice, shown outside the results container.
    fn show_failure(&mut self, message: &str);
}

/// Headless view used by the CLI: logs UI transitions and keeps the latest report.
#[derive(Debug, Default)]
pub struct ConsoleView {
    report: Option<Report>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }
}

impl SubmissionView for ConsoleView {
    fn apply_controls(&mut self, controls: &ControlState) {
        if controls.spinner_visible {
            info!("{}...", controls.label);
        } else {
            debug!(
                "Submit control: {} (enabled={})",
                controls.label, controls.submit_enabled
            );
        }
    }

    fn clear_report(&mut self) {
        self.report = None;
    }

    fn show_report(&mut self, report: &Report) {
        info!(
            "Report ready: {} sections extracted, {} failed",
            report.success_count(),
            report.error_count()
        );
        self.report = Some(report.clone());
    }

    fn hide_placeholder(&mut self) {
        debug!("Results placeholder hidden");
    }

    fn scroll_into_view(&mut self, element_id: &str) {
        debug!("Scrolling to #{}", element_id);
    }

    fn show_failure(&mut self, message: &str) {
        warn!("{}", message);
    }
}
