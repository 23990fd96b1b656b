use crate::config::{Feature, StackConfig};
use crate::error::ConstraintViolation;
use crate::graph::ResourceGraph;

/// One step of stack composition
///
/// A stage receives the graph built by every earlier stage and returns a
/// new graph. It may add nodes and supersede existing ones, but may only
/// reference identifiers minted by itself or by earlier stages.
pub trait CompositionStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Feature that must be enabled for the stage to run; `None` always runs
    fn gate(&self) -> Option<Feature> {
        None
    }

    fn apply(
        &self,
        graph: ResourceGraph,
        config: &StackConfig,
    ) -> Result<ResourceGraph, ConstraintViolation>;
}
