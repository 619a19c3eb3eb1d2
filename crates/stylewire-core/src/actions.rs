//! Request payload constructors for inspector actions.
//!
//! Consumers send these as the body of a `data.req` message. The relay never
//! looks inside them; the producer dispatches on `type`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::{CorrelationId, Message, MessageKind, NodeId};

/// A node id as supplied by UI code, before coercion to an integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeIdInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NodeIdInput {
    /// Coerce to an integer node id.
    ///
    /// Strings are read like a base-10 `parseInt`: leading whitespace and an
    /// optional sign, then as many digits as are present. Floats truncate.
    pub fn coerce(&self) -> Result<NodeId> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Float(f) => {
                if f.is_finite() && f.abs() < 9.007_199_254_740_992e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    Ok(f.trunc() as NodeId)
                } else {
                    Err(Error::InvalidNodeId(f.to_string()))
                }
            }
            Self::Text(s) => parse_int_prefix(s).ok_or_else(|| Error::InvalidNodeId(s.clone())),
        }
    }
}

fn parse_int_prefix(s: &str) -> Option<NodeId> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: NodeId = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

impl From<i64> for NodeIdInput {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for NodeIdInput {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for NodeIdInput {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for NodeIdInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NodeIdInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightTarget {
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_list: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRef {
    pub node_id: NodeId,
    pub rule_index: u32,
    pub property_index: u32,
}

/// An inspector action, serialized as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetInspectionRoot(NodeRef),
    ToggleSelectNode(NodeRef),
    PruneNode(NodeRef),
    HighlightNode(HighlightTarget),
    ClearHighlight,
    RequestStyleForNode(NodeRef),
    ToggleCssProperty(PropertyRef),
    ComputeDependencies(PropertyRef),
}

impl Action {
    pub fn set_inspection_root(node_id: impl Into<NodeIdInput>) -> Result<Self> {
        Ok(Self::SetInspectionRoot(node_ref(node_id)?))
    }

    pub fn toggle_select_node(node_id: impl Into<NodeIdInput>) -> Result<Self> {
        Ok(Self::ToggleSelectNode(node_ref(node_id)?))
    }

    pub fn prune_node(node_id: impl Into<NodeIdInput>) -> Result<Self> {
        Ok(Self::PruneNode(node_ref(node_id)?))
    }

    pub fn highlight_node(
        node_id: impl Into<NodeIdInput>,
        selector_list: Option<String>,
    ) -> Result<Self> {
        Ok(Self::HighlightNode(HighlightTarget {
            node_id: node_id.into().coerce()?,
            selector_list,
        }))
    }

    pub const fn clear_highlight() -> Self {
        Self::ClearHighlight
    }

    pub fn request_style_for_node(node_id: impl Into<NodeIdInput>) -> Result<Self> {
        Ok(Self::RequestStyleForNode(node_ref(node_id)?))
    }

    pub fn toggle_css_property(
        node_id: impl Into<NodeIdInput>,
        rule_index: u32,
        property_index: u32,
    ) -> Result<Self> {
        Ok(Self::ToggleCssProperty(property_ref(
            node_id,
            rule_index,
            property_index,
        )?))
    }

    pub fn compute_dependencies(
        node_id: impl Into<NodeIdInput>,
        rule_index: u32,
        property_index: u32,
    ) -> Result<Self> {
        Ok(Self::ComputeDependencies(property_ref(
            node_id,
            rule_index,
            property_index,
        )?))
    }

    /// Wrap this action into a request message carrying `correlation_id`.
    pub fn into_request(self, correlation_id: impl Into<CorrelationId>) -> Result<Message> {
        let body = serde_json::to_value(self)?;
        Ok(Message::new(MessageKind::Request, body).with_correlation_id(correlation_id))
    }
}

fn node_ref(node_id: impl Into<NodeIdInput>) -> Result<NodeRef> {
    Ok(NodeRef {
        node_id: node_id.into().coerce()?,
    })
}

fn property_ref(
    node_id: impl Into<NodeIdInput>,
    rule_index: u32,
    property_index: u32,
) -> Result<PropertyRef> {
    Ok(PropertyRef {
        node_id: node_id.into().coerce()?,
        rule_index,
        property_index,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_id_coercion() {
        assert_eq!(NodeIdInput::from(12).coerce().unwrap(), 12);
        assert_eq!(NodeIdInput::from("12").coerce().unwrap(), 12);
        assert_eq!(NodeIdInput::from(" 12px").coerce().unwrap(), 12);
        assert_eq!(NodeIdInput::from("-3").coerce().unwrap(), -3);
        assert_eq!(NodeIdInput::from(12.0).coerce().unwrap(), 12);
        assert_eq!(NodeIdInput::from(12.9).coerce().unwrap(), 12);
    }

    #[test]
    fn node_id_coercion_rejects_non_numeric() {
        assert!(matches!(
            NodeIdInput::from("abc").coerce(),
            Err(Error::InvalidNodeId(s)) if s == "abc"
        ));
        assert!(NodeIdInput::from("").coerce().is_err());
        assert!(NodeIdInput::from(f64::NAN).coerce().is_err());
    }

    #[test]
    fn node_id_input_deserializes_any_form() {
        let inputs: Vec<NodeIdInput> = serde_json::from_value(json!([4, 4.5, "4"])).unwrap();
        for input in inputs {
            assert_eq!(input.coerce().unwrap(), 4);
        }
    }

    #[test]
    fn node_actions_carry_integer_node_id() {
        let action = Action::request_style_for_node("5").unwrap();
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "REQUEST_STYLE_FOR_NODE", "data": {"nodeId": 5}})
        );
        let action = Action::set_inspection_root(7).unwrap();
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "SET_INSPECTION_ROOT", "data": {"nodeId": 7}})
        );
    }

    #[test]
    fn highlight_selector_is_optional() {
        let with = Action::highlight_node(3, Some("div.a".into())).unwrap();
        assert_eq!(
            serde_json::to_value(&with).unwrap(),
            json!({"type": "HIGHLIGHT_NODE", "data": {"nodeId": 3, "selectorList": "div.a"}})
        );
        let without = Action::highlight_node(3, None).unwrap();
        assert_eq!(
            serde_json::to_value(&without).unwrap(),
            json!({"type": "HIGHLIGHT_NODE", "data": {"nodeId": 3}})
        );
    }

    #[test]
    fn clear_highlight_has_no_data() {
        assert_eq!(
            serde_json::to_value(Action::clear_highlight()).unwrap(),
            json!({"type": "CLEAR_HIGHLIGHT"})
        );
    }

    #[test]
    fn property_actions_carry_indices() {
        let action = Action::toggle_css_property("8", 1, 2).unwrap();
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "TOGGLE_CSS_PROPERTY",
                "data": {"nodeId": 8, "ruleIndex": 1, "propertyIndex": 2}
            })
        );
        let action = Action::compute_dependencies(8, 0, 4).unwrap();
        assert_eq!(
            serde_json::to_value(&action).unwrap()["type"],
            "COMPUTE_DEPENDENCIES"
        );
    }

    #[test]
    fn invalid_node_id_fails_construction() {
        assert!(Action::prune_node("root").is_err());
        assert!(Action::toggle_select_node("x1").is_err());
    }

    #[test]
    fn into_request_builds_request_message() {
        let msg = Action::prune_node(2).unwrap().into_request("r9").unwrap();
        assert_eq!(msg.kind, MessageKind::Request);
        assert_eq!(msg.correlation_id, Some(CorrelationId::from("r9")));
        assert_eq!(msg.to_frame().data["id"], "r9");
        assert_eq!(msg.payload_type(), Some("PRUNE_NODE"));
    }
}
