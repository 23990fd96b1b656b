//! Error handling integration tests
//!
//! Covers:
//! - Aggregated configuration errors
//! - Malformed parameter sources
//! - Broken composition stages reported as internal errors

use clawstack::error::ConstraintViolation;
use clawstack::graph::expr::reference;
use clawstack::params::{RawParameters, SourceError, Violation};
use clawstack::pipeline::stages::{IdentityStage, NetworkStage, SpotStage};
use clawstack::{
    Composer, CompositionStage, Feature, ResourceGraph, ResourceKind, ResourceNode, StackConfig,
    SynthError,
};
use std::path::Path;

fn config() -> StackConfig {
    StackConfig::from_pairs([("telegramToken", "1:a")]).unwrap()
}

#[test]
fn test_missing_token_is_user_error() {
    let err = Composer::new()
        .synthesize(&RawParameters::new())
        .unwrap_err();
    assert!(err.is_user_error());
    match err {
        SynthError::Configuration(e) => {
            assert_eq!(
                e.violations,
                vec![Violation::Missing {
                    key: "telegramToken".to_string()
                }]
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unparsable_values() {
    let err = StackConfig::from_pairs([
        ("telegramToken", "1:a"),
        ("scheduleEnabled", "yes please"),
        ("monthlyBudgetLimit", "fifty"),
    ])
    .unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err
        .violations
        .iter()
        .all(|v| matches!(v, Violation::InvalidType { .. })));
}

#[test]
fn test_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.yaml");
    std::fs::write(&path, "telegramToken: [unclosed").unwrap();

    match RawParameters::from_file(&path) {
        Err(SourceError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_file() {
    let result = RawParameters::from_file(Path::new("/nonexistent/params.yaml"));
    assert!(matches!(result, Err(SourceError::Io { .. })));
}

struct OrphanStage;

impl CompositionStage for OrphanStage {
    fn name(&self) -> &'static str {
        "orphan"
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        _config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation> {
        graph.insert(
            ResourceNode::new("Orphan", ResourceKind::Alarm, "AWS::CloudWatch::Alarm")
                .property("Dimensions", reference("MissingInstance")),
        )
    }
}

#[test]
fn test_dangling_reference_is_internal_error() {
    let composer = Composer::with_stages(vec![Box::new(NetworkStage), Box::new(OrphanStage)]);
    let err = composer.compose(&config()).unwrap_err();

    assert!(!err.is_user_error());
    match err {
        SynthError::Constraint { stage, source } => {
            assert_eq!(stage, "orphan");
            assert!(matches!(source, ConstraintViolation::DanglingReference { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_duplicate_stage_is_rejected() {
    let composer = Composer::with_stages(vec![
        Box::new(NetworkStage),
        Box::new(IdentityStage),
        Box::new(IdentityStage),
    ]);
    let err = composer.compose(&config()).unwrap_err();
    assert!(matches!(
        err,
        SynthError::Constraint {
            source: ConstraintViolation::DuplicateLogicalId { .. },
            ..
        }
    ));
}

#[test]
fn test_disabled_feature_stage_refuses_direct_call() {
    let result = SpotStage.apply(ResourceGraph::new(), &config());
    assert_eq!(
        result.unwrap_err(),
        ConstraintViolation::FeatureNotEnabled {
            feature: Feature::SpotPricing
        }
    );
}
