//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while composing a stack
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Composition started
    Started { product: String },

    /// Parameter validation finished
    ValidationComplete { advisories: usize, violations: usize },

    /// A composition stage started
    StageStarted { stage: String },

    /// A composition stage finished
    StageComplete {
        stage: String,
        nodes_added: usize,
        duration: Duration,
    },

    /// A gated stage was skipped because its feature is off
    StageSkipped { stage: String, feature: String },

    /// Composition completed successfully
    Completed { nodes: usize, total_time: Duration },

    /// Composition failed
    Failed { error: String },
}

/// Trait for handling progress events during composition
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::Started {
            product: "OpenClaw".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            product: "OpenClaw".to_string(),
        });
        handler.on_progress(&ProgressEvent::StageSkipped {
            stage: "spot".to_string(),
            feature: "spot pricing".to_string(),
        });
        handler.on_progress(&ProgressEvent::Completed {
            nodes: 20,
            total_time: Duration::from_millis(3),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::StageStarted {
            stage: "network".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("StageStarted"));
        assert!(debug_str.contains("network"));
    }
}
