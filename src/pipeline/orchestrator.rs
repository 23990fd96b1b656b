use super::outputs::{self, StackOutput};
use super::stage::CompositionStage;
use super::stages::{
    BudgetStage, ComputeStage, GuardrailStage, IdentityStage, MonitoringStage, NetworkStage,
    ScheduleStage, SecretsStage, SpotStage,
};
use crate::config::StackConfig;
use crate::error::SynthError;
use crate::graph::ResourceGraph;
use crate::params::{Advisory, ConfigValidator, RawParameters};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::template::Template;
use std::time::Instant;
use tracing::{debug, info};

/// Validated configuration together with everything composed from it
#[derive(Debug, Clone)]
pub struct SynthesizedStack {
    pub config: StackConfig,
    pub advisories: Vec<Advisory>,
    pub graph: ResourceGraph,
    pub outputs: Vec<StackOutput>,
}

impl SynthesizedStack {
    pub fn template(&self) -> Template {
        Template::new(&self.config, &self.graph, &self.outputs)
    }
}

pub struct Composer {
    validator: ConfigValidator,
    stages: Vec<Box<dyn CompositionStage>>,
    progress_handler: Option<Box<dyn ProgressHandler>>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::with_stages(Self::standard_stages())
    }

    /// Stage order; later stages may only build on earlier ones
    pub fn standard_stages() -> Vec<Box<dyn CompositionStage>> {
        vec![
            Box::new(NetworkStage),
            Box::new(IdentityStage),
            Box::new(SecretsStage),
            Box::new(GuardrailStage),
            Box::new(ComputeStage),
            Box::new(MonitoringStage),
            Box::new(BudgetStage),
            Box::new(ScheduleStage),
            Box::new(SpotStage),
        ]
    }

    pub fn with_stages(stages: Vec<Box<dyn CompositionStage>>) -> Self {
        Self {
            validator: ConfigValidator::new(),
            stages,
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Box<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn validator(&self) -> &ConfigValidator {
        &self.validator
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    /// Validates `raw` and composes the stack; nothing is built on failure
    pub fn synthesize(&self, raw: &RawParameters) -> Result<SynthesizedStack, SynthError> {
        let config = match self.validator.validate(raw) {
            Ok(config) => config,
            Err(e) => {
                self.emit(ProgressEvent::ValidationComplete {
                    advisories: 0,
                    violations: e.len(),
                });
                self.emit(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };
        let advisories = self.validator.advise(&config);
        self.emit(ProgressEvent::ValidationComplete {
            advisories: advisories.len(),
            violations: 0,
        });

        let graph = self.compose(&config)?;
        let outputs = outputs::derive(&graph, &config).map_err(|source| {
            SynthError::Constraint {
                stage: "outputs",
                source,
            }
        })?;

        Ok(SynthesizedStack {
            config,
            advisories,
            graph,
            outputs,
        })
    }

    /// Runs every stage whose gate is open, in order
    pub fn compose(&self, config: &StackConfig) -> Result<ResourceGraph, SynthError> {
        let start = Instant::now();
        info!(product = config.product.name(), "Composing stack");
        self.emit(ProgressEvent::Started {
            product: config.product.name().to_string(),
        });

        let mut graph = ResourceGraph::new();
        for stage in &self.stages {
            let name = stage.name();
            if let Some(feature) = stage.gate() {
                if !config.is_enabled(feature) {
                    debug!(stage = name, feature = %feature, "Skipping gated stage");
                    self.emit(ProgressEvent::StageSkipped {
                        stage: name.to_string(),
                        feature: feature.to_string(),
                    });
                    continue;
                }
            }

            self.emit(ProgressEvent::StageStarted {
                stage: name.to_string(),
            });
            let stage_start = Instant::now();
            let before = graph.len();
            graph = match stage.apply(graph, config) {
                Ok(graph) => graph,
                Err(source) => {
                    let error = SynthError::Constraint {
                        stage: name,
                        source,
                    };
                    self.emit(ProgressEvent::Failed {
                        error: error.to_string(),
                    });
                    return Err(error);
                }
            };
            self.emit(ProgressEvent::StageComplete {
                stage: name.to_string(),
                nodes_added: graph.len().saturating_sub(before),
                duration: stage_start.elapsed(),
            });
            debug!(stage = name, nodes = graph.len(), "Stage complete");
        }

        graph
            .verify()
            .map_err(|source| SynthError::Constraint {
                stage: "verify",
                source,
            })?;

        info!(nodes = graph.len(), "Composition complete");
        self.emit(ProgressEvent::Completed {
            nodes: graph.len(),
            total_time: start.elapsed(),
        });
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Feature;
    use crate::error::ConstraintViolation;
    use crate::graph::{ResourceKind, ResourceNode};
    use std::sync::{Arc, Mutex};

    struct RecordingHandler {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressHandler for RecordingHandler {
        fn on_progress(&self, event: &ProgressEvent) {
            let label = match event {
                ProgressEvent::StageStarted { stage } => format!("start:{}", stage),
                ProgressEvent::StageSkipped { stage, .. } => format!("skip:{}", stage),
                ProgressEvent::Failed { .. } => "failed".to_string(),
                _ => return,
            };
            self.events.lock().unwrap().push(label);
        }
    }

    struct DanglingStage;

    impl CompositionStage for DanglingStage {
        fn name(&self) -> &'static str {
            "dangling"
        }

        fn apply(
            &self,
            graph: ResourceGraph,
            _config: &StackConfig,
        ) -> Result<ResourceGraph, ConstraintViolation> {
            graph.insert(
                ResourceNode::new("Orphan", ResourceKind::Alarm, "AWS::CloudWatch::Alarm")
                    .depends_on("Nowhere"),
            )
        }
    }

    fn config() -> StackConfig {
        StackConfig::from_pairs([("telegramToken", "1:a")]).unwrap()
    }

    #[test]
    fn test_standard_stage_order() {
        assert_eq!(
            Composer::new().stage_names(),
            vec![
                "network",
                "identity",
                "secrets",
                "guardrails",
                "compute",
                "monitoring",
                "budget",
                "schedule",
                "spot"
            ]
        );
    }

    #[test]
    fn test_gated_stages_skipped() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composer = Composer::new().with_progress(Box::new(RecordingHandler {
            events: events.clone(),
        }));
        composer.compose(&config()).unwrap();
        let events = events.lock().unwrap();
        assert!(events.contains(&"skip:guardrails".to_string()));
        assert!(events.contains(&"skip:schedule".to_string()));
        assert!(events.contains(&"skip:spot".to_string()));
        assert!(events.contains(&"start:compute".to_string()));
    }

    #[test]
    fn test_stage_failure_names_stage() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composer = Composer::with_stages(vec![Box::new(DanglingStage)]).with_progress(
            Box::new(RecordingHandler {
                events: events.clone(),
            }),
        );
        let err = composer.compose(&config()).unwrap_err();
        assert!(matches!(err, SynthError::Constraint { stage: "dangling", .. }));
        assert!(!err.is_user_error());
        assert_eq!(events.lock().unwrap().last(), Some(&"failed".to_string()));
    }

    #[test]
    fn test_synthesize_rejects_before_composing() {
        let raw = RawParameters::from_pairs([("monthlyBudgetLimit", "5")]);
        let err = Composer::new().synthesize(&raw).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_synthesize_all_features() {
        let raw = RawParameters::from_pairs([
            ("telegramToken", "123:abc"),
            ("enableContentGuardrails", "true"),
            ("scheduleEnabled", "true"),
            ("useSpotPricing", "true"),
        ]);
        let stack = Composer::new().synthesize(&raw).unwrap();
        for feature in [
            Feature::ContentGuardrails,
            Feature::PowerSchedule,
            Feature::SpotPricing,
        ] {
            assert!(stack.config.is_enabled(feature));
        }
        assert_eq!(stack.graph.count(ResourceKind::ContentFilter), 1);
        assert_eq!(stack.graph.count(ResourceKind::ScheduleRule), 2);
        assert!(stack.outputs.iter().any(|o| o.name == "GuardrailId"));
        assert!(stack.outputs.iter().any(|o| o.name == "PowerControlFunctionArn"));
    }
}
