use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sanitize;

/// The structured document derived from a free-text idea.
///
/// Upstream generators are unreliable: a raw payload may be missing fields,
/// carry a bare string where a sequence is expected, or mix plain strings
/// with elaborated objects inside the same list. `normalize` repairs all of
/// that; a `Framework` obtained from it always satisfies the invariants
/// documented on the individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    /// Main objective. Never empty; defaults to `"Untitled Goal"`.
    pub goal: String,
    pub action_steps: Vec<Item>,
    pub challenges: Vec<Item>,
    pub resources: Vec<Item>,
    /// Practical advice. Never empty; backfilled with a default set.
    pub tips: Vec<Item>,
    /// Follow-up questions. Always a sequence, never a bare string.
    #[serde(default)]
    pub clarification_needed: Vec<Item>,

    /// Elaborations kept in lockstep with `tips`: index `i` describes
    /// `tips[i]`. `normalize` synthesizes missing entries.
    #[serde(default)]
    pub tip_details: Vec<TipDetail>,

    #[serde(default)]
    pub goal_description: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub background_context: String,
    #[serde(default)]
    pub conclusion: String,

    #[serde(default)]
    pub action_step_details: Vec<ActionStepDetail>,
    #[serde(default)]
    pub challenge_details: Vec<ChallengeDetail>,
    #[serde(default)]
    pub resource_details: Vec<ResourceDetail>,
    #[serde(default)]
    pub stakeholders: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// A list entry that may be a plain string or an elaborated object.
///
/// Generators emit both shapes interchangeably ("Find a location" vs
/// `{"step": "Find a location", "priority": "High"}`), so every category
/// sequence carries this variant instead of ad hoc type checks at call
/// sites. `display_text` is the single reducer to renderable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Plain(String),
    Structured(Map<String, Value>),
}

impl Item {
    /// Coerce an arbitrary JSON value into an item. Nulls are dropped;
    /// scalars that are neither strings nor objects are stringified.
    pub fn from_value(value: &Value) -> Option<Item> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Item::Plain(s.clone())),
            Value::Object(map) => Some(Item::Structured(map.clone())),
            other => Some(Item::Plain(other.to_string())),
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Item::Plain(s) => Some(s),
            Item::Structured(_) => None,
        }
    }

    /// Reduce the item to display text.
    ///
    /// Prefers a recognized primary field, appends priority/time
    /// annotations, strips display markdown, and falls back to a
    /// truncated, punctuation-stripped JSON rendering.
    pub fn display_text(&self) -> String {
        let fields = match self {
            Item::Plain(s) => return sanitize::clean_display(s),
            Item::Structured(fields) => fields,
        };

        let mut text = ["step", "tip", "challenge", "resource"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .or_else(|| fields.get("description").and_then(Value::as_str))
            .map(String::from)
            .unwrap_or_default();

        if let Some(priority) = fields.get("priority").and_then(Value::as_str) {
            text.push_str(&format!(" (Priority: {priority})"));
        }
        if let Some(time) = fields.get("estimated_time").and_then(Value::as_str) {
            text.push_str(&format!(" (Time: {time})"));
        }

        if !text.trim().is_empty() {
            return sanitize::clean_display(&text);
        }

        // No recognized field: fall back to a compact JSON rendering.
        let stringified = Value::Object(fields.clone()).to_string();
        if stringified.len() > 100 {
            let mut end = 97;
            while end > 0 && !stringified.is_char_boundary(end) {
                end -= 1;
            }
            return format!("{}...", &stringified[..end]);
        }
        stringified
            .chars()
            .map(|c| {
                if matches!(c, '{' | '}' | '[' | ']' | '"') {
                    ' '
                } else {
                    c
                }
            })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Elaboration of a single tip. Index-aligned with `Framework::tips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipDetail {
    pub tip: String,
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub context: String,
    /// Older generator payloads used `description` instead of `explanation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStepDetail {
    pub step: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDetail {
    pub challenge: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub potential_solutions: Vec<String>,
    #[serde(default)]
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDetail {
    pub resource: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub short_term: Vec<String>,
    #[serde(default)]
    pub medium_term: Vec<String>,
    #[serde(default)]
    pub long_term: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_method: Option<String>,
}

/// A single entry in the assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
