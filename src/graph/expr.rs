//! Template expression helpers and reference extraction
//!
//! Cross-resource references live inside property bags as CloudFormation
//! intrinsic functions. The graph finds them again with
//! [`collect_references`] so it can reject dangling edges.

use serde_json::{json, Value};
use std::collections::BTreeSet;

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn sub(template: impl Into<String>) -> Value {
    Value::Object(
        [("Fn::Sub".to_string(), Value::String(template.into()))]
            .into_iter()
            .collect(),
    )
}

pub fn base64(value: Value) -> Value {
    json!({ "Fn::Base64": value })
}

pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// First availability zone of the deployment region
pub fn first_availability_zone() -> Value {
    json!({ "Fn::Select": [0, { "Fn::GetAZs": "" }] })
}

pub fn is_pseudo_parameter(name: &str) -> bool {
    name.starts_with("AWS::")
}

/// Collects every logical id referenced by `value`
///
/// Pseudo parameters (`AWS::Region`, ...) are skipped; template parameters
/// are included and filtered by the caller.
pub fn collect_references(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("Ref") {
                insert(target, out);
            }
            match map.get("Fn::GetAtt") {
                Some(Value::Array(parts)) => {
                    if let Some(Value::String(target)) = parts.first() {
                        insert(target, out);
                    }
                }
                Some(Value::String(dotted)) => {
                    if let Some((target, _)) = dotted.split_once('.') {
                        insert(target, out);
                    }
                }
                _ => {}
            }
            match map.get("Fn::Sub") {
                Some(Value::String(template)) => sub_tokens(template, &BTreeSet::new(), out),
                Some(Value::Array(parts)) => {
                    let locals: BTreeSet<String> = match parts.get(1) {
                        Some(Value::Object(vars)) => vars.keys().cloned().collect(),
                        _ => BTreeSet::new(),
                    };
                    if let Some(Value::String(template)) = parts.first() {
                        sub_tokens(template, &locals, out);
                    }
                    if let Some(vars) = parts.get(1) {
                        collect_references(vars, out);
                    }
                }
                _ => {}
            }
            for (key, nested) in map {
                if key != "Ref" && key != "Fn::GetAtt" && key != "Fn::Sub" {
                    collect_references(nested, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

fn insert(target: &str, out: &mut BTreeSet<String>) {
    if !is_pseudo_parameter(target) {
        out.insert(target.to_string());
    }
}

/// `${Name}` and `${Name.Attr}` tokens; `${!Literal}` is an escape
fn sub_tokens(template: &str, locals: &BTreeSet<String>, out: &mut BTreeSet<String>) {
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        let token = &after[..end];
        if !token.starts_with('!') {
            let name = token.split('.').next().unwrap_or(token);
            if !locals.contains(name) {
                insert(name, out);
            }
        }
        rest = &after[end + 1..];
    }
}
