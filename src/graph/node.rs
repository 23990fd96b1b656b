use super::expr::collect_references;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Role a resource plays in the gateway topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    Subnet,
    Routing,
    Firewall,
    Identity,
    InstanceProfile,
    Secret,
    ContentFilter,
    LaunchTemplate,
    Compute,
    Alarm,
    Budget,
    LogSink,
    ScheduleAction,
    ScheduleActionRole,
    ScheduleRule,
    SchedulePermission,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Subnet => "subnet",
            Self::Routing => "routing",
            Self::Firewall => "firewall",
            Self::Identity => "identity",
            Self::InstanceProfile => "instance profile",
            Self::Secret => "secret",
            Self::ContentFilter => "content filter",
            Self::LaunchTemplate => "launch template",
            Self::Compute => "compute",
            Self::Alarm => "alarm",
            Self::Budget => "budget",
            Self::LogSink => "log sink",
            Self::ScheduleAction => "schedule action",
            Self::ScheduleActionRole => "schedule action role",
            Self::ScheduleRule => "schedule rule",
            Self::SchedulePermission => "schedule permission",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
}

/// One declared cloud resource
///
/// Nodes are values: stages never change a node held by the graph, they
/// build a replacement with [`ResourceNode::with_property`] and hand it to
/// [`ResourceGraph::supersede`](super::ResourceGraph::supersede).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    logical_id: String,
    kind: ResourceKind,
    resource_type: &'static str,
    properties: Map<String, Value>,
    depends_on: Vec<String>,
    deletion_policy: Option<DeletionPolicy>,
}

impl ResourceNode {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind, resource_type: &'static str) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            resource_type,
            properties: Map::new(),
            depends_on: Vec::new(),
            deletion_policy: None,
        }
    }

    pub fn property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        let logical_id = logical_id.into();
        if !self.depends_on.contains(&logical_id) {
            self.depends_on.push(logical_id);
        }
        self
    }

    pub fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    /// A copy of this node with one property replaced
    pub fn with_property(&self, key: &str, value: Value) -> Self {
        self.clone().property(key, value)
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn policy(&self) -> Option<DeletionPolicy> {
        self.deletion_policy
    }

    /// Every logical id or template parameter this node points at
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for value in self.properties.values() {
            collect_references(value, &mut out);
        }
        out.extend(self.depends_on.iter().cloned());
        out
    }

    /// CloudFormation resource declaration
    pub fn to_template(&self) -> Value {
        let mut resource = Map::new();
        resource.insert("Type".to_string(), Value::String(self.resource_type.to_string()));
        if let Some(policy) = self.deletion_policy {
            let policy = match policy {
                DeletionPolicy::Delete => "Delete",
                DeletionPolicy::Retain => "Retain",
            };
            resource.insert("DeletionPolicy".to_string(), Value::String(policy.to_string()));
            resource.insert("UpdateReplacePolicy".to_string(), Value::String(policy.to_string()));
        }
        if !self.depends_on.is_empty() {
            resource.insert(
                "DependsOn".to_string(),
                Value::Array(self.depends_on.iter().cloned().map(Value::String).collect()),
            );
        }
        if !self.properties.is_empty() {
            resource.insert("Properties".to_string(), Value::Object(self.properties.clone()));
        }
        Value::Object(resource)
    }
}
