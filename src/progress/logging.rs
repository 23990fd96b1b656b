//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { product } => {
                info!(product = %product, "Starting stack composition");
            }
            ProgressEvent::ValidationComplete {
                advisories,
                violations,
            } => {
                if *violations > 0 {
                    warn!(advisories, violations, "Validation failed");
                } else if *advisories > 0 {
                    info!(advisories, "Validation complete with advisories");
                } else {
                    debug!("Validation complete");
                }
            }
            ProgressEvent::StageStarted { stage } => {
                debug!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageComplete {
                stage,
                nodes_added,
                duration,
            } => {
                info!(
                    stage = %stage,
                    nodes_added,
                    duration_us = duration.as_micros(),
                    "Stage complete"
                );
            }
            ProgressEvent::StageSkipped { stage, feature } => {
                info!(stage = %stage, feature = %feature, "Feature disabled, stage skipped");
            }
            ProgressEvent::Completed { nodes, total_time } => {
                info!(
                    nodes,
                    total_time_us = total_time.as_micros(),
                    "Composition complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Composition failed");
            }
        }
    }
}
