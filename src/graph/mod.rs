//! Resource graph
//!
//! An ordered list of [`ResourceNode`]s in which every node may only
//! reference nodes placed before it. Insertion order therefore is a
//! topological order and the graph is acyclic by construction.
//!
//! All operations consume the graph and return a new one; nothing already
//! in the graph is changed in place.

pub mod expr;
pub mod node;
pub mod policy;

pub use node::{DeletionPolicy, ResourceKind, ResourceNode};
pub use policy::{PermissionSet, PolicyStatement};

use crate::error::ConstraintViolation;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::trace;

/// A template parameter nodes may reference with `Ref`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateParameter {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    parameters: Vec<TemplateParameter>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_parameter(
        mut self,
        parameter: TemplateParameter,
    ) -> Result<Self, ConstraintViolation> {
        if self.is_defined(&parameter.name) {
            return Err(ConstraintViolation::DuplicateLogicalId { id: parameter.name });
        }
        self.parameters.push(parameter);
        Ok(self)
    }

    /// Appends `node`; all of its references must already be defined
    pub fn insert(mut self, node: ResourceNode) -> Result<Self, ConstraintViolation> {
        if self.is_defined(node.logical_id()) {
            return Err(ConstraintViolation::DuplicateLogicalId {
                id: node.logical_id().to_string(),
            });
        }
        if let Some(reference) = self.first_undefined(&node, self.nodes.len()) {
            return Err(ConstraintViolation::DanglingReference {
                node: node.logical_id().to_string(),
                reference,
            });
        }
        trace!(id = node.logical_id(), kind = %node.kind(), "Inserted node");
        self.nodes.push(node);
        Ok(self)
    }

    pub fn insert_all(
        self,
        nodes: impl IntoIterator<Item = ResourceNode>,
    ) -> Result<Self, ConstraintViolation> {
        nodes.into_iter().try_fold(self, |graph, node| graph.insert(node))
    }

    /// Replaces the node with the same logical id by `node`
    ///
    /// The replacement stays at the original position when everything it
    /// references is defined before that position. Otherwise it moves to
    /// the end, which is only allowed while nothing depends on it yet.
    pub fn supersede(mut self, node: ResourceNode) -> Result<Self, ConstraintViolation> {
        let id = node.logical_id().to_string();
        let position = self
            .position(&id)
            .ok_or_else(|| ConstraintViolation::UnknownResource { id: id.clone() })?;
        let existing = &self.nodes[position];
        if existing.kind() != node.kind() {
            return Err(ConstraintViolation::KindMismatch {
                id,
                expected: existing.kind(),
                found: node.kind(),
            });
        }

        let Some(reference) = self.first_undefined(&node, position) else {
            trace!(id = %id, position, "Superseded node in place");
            self.nodes[position] = node;
            return Ok(self);
        };

        if let Some(dependent) = self.dependents(&id).first() {
            return Err(ConstraintViolation::SupersedeBlocked {
                id: id.clone(),
                dependent: dependent.to_string(),
                reference,
            });
        }

        self.nodes.remove(position);
        if let Some(reference) = self.first_undefined(&node, self.nodes.len()) {
            return Err(ConstraintViolation::DanglingReference { node: id, reference });
        }
        trace!(id = %id, "Superseded node moved to end");
        self.nodes.push(node);
        Ok(self)
    }

    pub fn get(&self, logical_id: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.logical_id() == logical_id)
    }

    pub fn position(&self, logical_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.logical_id() == logical_id)
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.of_kind(kind).count()
    }

    /// The only node of `kind`
    pub fn single(&self, kind: ResourceKind) -> Result<&ResourceNode, ConstraintViolation> {
        let mut matches = self.of_kind(kind);
        match (matches.next(), matches.next()) {
            (Some(node), None) => Ok(node),
            (None, _) => Err(ConstraintViolation::MissingKind { kind }),
            (Some(_), Some(_)) => Err(ConstraintViolation::AmbiguousKind {
                kind,
                count: self.count(kind),
            }),
        }
    }

    /// Logical ids of nodes that reference `logical_id`
    pub fn dependents(&self, logical_id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.references().contains(logical_id))
            .map(|n| n.logical_id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-checks the ordering invariant across the whole graph
    pub fn verify(&self) -> Result<(), ConstraintViolation> {
        let mut seen = BTreeSet::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if !seen.insert(node.logical_id()) {
                return Err(ConstraintViolation::DuplicateLogicalId {
                    id: node.logical_id().to_string(),
                });
            }
            if let Some(reference) = self.first_undefined(node, index) {
                return Err(ConstraintViolation::DanglingReference {
                    node: node.logical_id().to_string(),
                    reference,
                });
            }
        }
        Ok(())
    }

    fn is_defined(&self, name: &str) -> bool {
        self.position(name).is_some() || self.parameters.iter().any(|p| p.name == name)
    }

    /// First reference of `node` not satisfied by parameters or `nodes[..before]`
    fn first_undefined(&self, node: &ResourceNode, before: usize) -> Option<String> {
        node.references().into_iter().find(|reference| {
            let is_parameter = self.parameters.iter().any(|p| &p.name == reference);
            let is_earlier = self.nodes[..before]
                .iter()
                .any(|n| n.logical_id() == reference);
            !is_parameter && !is_earlier
        })
    }
}
