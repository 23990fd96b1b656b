//! IAM permission statements carried by identity nodes

use super::node::ResourceNode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INLINE_POLICY_NAME: &str = "GatewayPermissions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: String,
    pub action: Vec<String>,
    pub resource: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl PolicyStatement {
    pub fn allow(sid: &str, actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            sid: sid.to_string(),
            effect: "Allow".to_string(),
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: resources,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    /// `*` resource scope
    pub fn is_wildcard(&self) -> bool {
        self.resource.iter().any(|r| r == "*")
    }
}

/// An ordered, sid-unique list of statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionSet {
    statements: Vec<PolicyStatement>,
}

impl PermissionSet {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self::default().union(&Self { statements })
    }

    /// Statements of `self` followed by those of `other` not already present
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        let mut statements = self.statements.clone();
        for statement in &other.statements {
            if !statements.iter().any(|s| s.sid == statement.sid) {
                statements.push(statement.clone());
            }
        }
        PermissionSet { statements }
    }

    pub fn with(&self, statement: PolicyStatement) -> PermissionSet {
        self.union(&PermissionSet {
            statements: vec![statement],
        })
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn get(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.sid == sid)
    }

    pub fn sids(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sid.as_str()).collect()
    }

    pub fn is_superset_of(&self, other: &PermissionSet) -> bool {
        other
            .statements
            .iter()
            .all(|s| self.statements.contains(s))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Reads the inline policy of a role node; `None` if it has none
    pub fn from_role(node: &ResourceNode) -> Option<PermissionSet> {
        let statements = node
            .get_property("Policies")?
            .as_array()?
            .iter()
            .find(|p| p.get("PolicyName").and_then(Value::as_str) == Some(INLINE_POLICY_NAME))?
            .get("PolicyDocument")?
            .get("Statement")?
            .clone();
        serde_json::from_value(statements)
            .ok()
            .map(|statements| PermissionSet { statements })
    }

    /// A copy of `node` whose inline policy holds exactly these statements
    pub fn apply_to_role(&self, node: &ResourceNode) -> ResourceNode {
        node.with_property(
            "Policies",
            json!([{
                "PolicyName": INLINE_POLICY_NAME,
                "PolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": self.statements,
                }
            }]),
        )
    }
}
