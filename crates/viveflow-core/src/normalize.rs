//! Repair pass for raw generator payloads.
//!
//! Upstream output is loose JSON: fields go missing, sequences arrive as
//! bare strings, detail records come half-filled. `normalize` repairs
//! rather than rejects, so any JSON value yields a usable [`Framework`].
//! Every repair is fill-if-absent, never overwrite-if-present, which makes
//! the pass idempotent.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::framework::{Framework, Item, Timeline, TipDetail};
use crate::sanitize;

pub const DEFAULT_GOAL: &str = "Untitled Goal";

/// Injected wholesale when the generator omits or empties `tips`.
pub const DEFAULT_TIPS: [&str; 3] = [
    "Start with small, achievable milestones to build momentum",
    "Review progress regularly and adjust the plan as you learn",
    "Share the idea with others early to gather honest feedback",
];

const GENERIC_EXAMPLE: &str = "Apply this while planning your next concrete step.";
const GENERIC_CONTEXT: &str = "Broadly applicable throughout work toward the goal.";

/// Coerce an arbitrary JSON value into a valid framework document.
///
/// Total: never fails, never panics. Missing required fields get defaults,
/// `tips` is forced non-empty, `clarification_needed` is forced to a
/// sequence, `tip_details` is reconciled index-for-index against `tips`,
/// and every string leaf is display-cleaned at the end.
pub fn normalize(raw: Value) -> Framework {
    let fields = match raw {
        Value::Object(map) => map,
        other => {
            if !other.is_null() {
                warn!("generator payload is not an object, using defaults");
            }
            Map::new()
        }
    };

    let goal = fields
        .get("goal")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_GOAL)
        .to_string();

    let action_steps = items_from(fields.get("action_steps"));
    let challenges = items_from(fields.get("challenges"));
    let resources = items_from(fields.get("resources"));

    let mut tips = items_from(fields.get("tips"));
    if tips.is_empty() {
        tips = DEFAULT_TIPS
            .iter()
            .map(|t| Item::Plain((*t).to_string()))
            .collect();
    }

    let clarification_needed = match fields.get("clarification_needed") {
        Some(Value::String(s)) => vec![Item::Plain(s.clone())],
        other => items_from(other),
    };

    let mut tip_details: Vec<TipDetail> = collect_lenient(fields.get("tip_details"), "tip_details");
    reconcile_tip_details(&mut tip_details, &tips);

    let framework = Framework {
        goal,
        action_steps,
        challenges,
        resources,
        tips,
        clarification_needed,
        tip_details,
        goal_description: string_from(fields.get("goal_description")),
        introduction: string_from(fields.get("introduction")),
        background_context: string_from(fields.get("background_context")),
        conclusion: string_from(fields.get("conclusion")),
        action_step_details: collect_lenient(fields.get("action_step_details"), "action_step_details"),
        challenge_details: collect_lenient(fields.get("challenge_details"), "challenge_details"),
        resource_details: collect_lenient(fields.get("resource_details"), "resource_details"),
        stakeholders: strings_from(fields.get("stakeholders")),
        timeline: fields
            .get("timeline")
            .and_then(|v| serde_json::from_value::<Timeline>(v.clone()).ok()),
        metrics: collect_lenient(fields.get("metrics"), "metrics"),
    };

    clean_framework(framework)
}

fn items_from(value: Option<&Value>) -> Vec<Item> {
    match value {
        Some(Value::Array(entries)) => entries.iter().filter_map(Item::from_value).collect(),
        Some(Value::String(s)) => vec![Item::Plain(s.clone())],
        _ => Vec::new(),
    }
}

fn string_from(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_default()
}

fn strings_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Deserialize each array entry independently, skipping (with a warning)
/// entries that do not fit, instead of failing the whole list.
fn collect_lenient<T: DeserializeOwned>(value: Option<&Value>, field: &str) -> Vec<T> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<T>(entry.clone()) {
            Ok(parsed) => out.push(parsed),
            Err(err) => warn!(field, index, %err, "skipping malformed detail entry"),
        }
    }
    out
}

/// Keep `tip_details` in lockstep with `tips`: synthesize a detail for
/// every tip index lacking one, and pin each detail's `tip` text to the
/// plain tip it describes.
fn reconcile_tip_details(details: &mut Vec<TipDetail>, tips: &[Item]) {
    for (index, tip) in tips.iter().enumerate() {
        let text = tip.display_text();
        if index >= details.len() {
            details.push(TipDetail {
                tip: text.clone(),
                explanation: text.to_lowercase(),
                examples: vec![GENERIC_EXAMPLE.to_string()],
                context: GENERIC_CONTEXT.to_string(),
                description: None,
            });
        } else if tip.as_plain().is_some() {
            details[index].tip = text;
        }
    }
}

/// Display-clean every string leaf, then re-assert the invariants that
/// cleaning could have disturbed (a goal made of pure markdown cleans to
/// the empty string).
fn clean_framework(framework: Framework) -> Framework {
    let mut cleaned = match serde_json::to_value(&framework) {
        Ok(value) => match serde_json::from_value::<Framework>(sanitize::sanitize_deep(value)) {
            Ok(cleaned) => cleaned,
            Err(err) => {
                warn!(%err, "deep-clean round trip failed, keeping uncleaned document");
                framework
            }
        },
        Err(err) => {
            warn!(%err, "framework serialization failed, keeping uncleaned document");
            framework
        }
    };
    if cleaned.goal.trim().is_empty() {
        cleaned.goal = DEFAULT_GOAL.to_string();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_defaults_for_empty_input() {
        let fw = normalize(json!({}));
        assert_eq!(fw.goal, DEFAULT_GOAL);
        assert!(fw.action_steps.is_empty());
        assert_eq!(fw.tips.len(), 3);
        assert!(fw.clarification_needed.is_empty());
    }

    #[test]
    fn non_object_input_yields_default_document() {
        for raw in [json!(null), json!("text"), json!([1, 2]), json!(7)] {
            let fw = normalize(raw);
            assert_eq!(fw.goal, DEFAULT_GOAL);
            assert_eq!(fw.tips.len(), 3);
        }
    }

    #[test]
    fn empty_tips_replaced_with_default_set() {
        let fw = normalize(json!({
            "goal": "Launch a bakery",
            "action_steps": ["Find a location"],
            "challenges": [],
            "resources": [],
            "tips": []
        }));
        assert_eq!(fw.goal, "Launch a bakery");
        let texts: Vec<String> = fw.tips.iter().map(Item::display_text).collect();
        assert_eq!(texts, DEFAULT_TIPS.map(String::from).to_vec());
        assert_eq!(fw.tip_details.len(), 3);
        for (detail, tip) in fw.tip_details.iter().zip(&texts) {
            assert_eq!(&detail.tip, tip);
            assert_eq!(detail.explanation, tip.to_lowercase());
            assert_eq!(detail.examples.len(), 1);
        }
    }

    #[test]
    fn tips_always_non_empty() {
        for raw in [
            json!({}),
            json!({"tips": null}),
            json!({"tips": "a single tip"}),
            json!({"tips": {"not": "a list"}}),
            json!({"tips": [null, null]}),
        ] {
            assert!(!normalize(raw).tips.is_empty());
        }
    }

    #[test]
    fn bare_string_clarification_wrapped() {
        let fw = normalize(json!({"clarification_needed": "What is the budget?"}));
        assert_eq!(fw.clarification_needed.len(), 1);
        assert_eq!(
            fw.clarification_needed[0].as_plain(),
            Some("What is the budget?")
        );
    }

    #[test]
    fn tip_details_reconciled_with_tips() {
        let fw = normalize(json!({
            "tips": ["Keep notes", "Ask for help", "Rest"],
            "tip_details": [
                {"tip": "stale text", "explanation": "capture decisions in writing",
                 "examples": ["a daily log"], "context": "any stage"}
            ]
        }));
        assert!(fw.tip_details.len() >= fw.tips.len());
        for (i, tip) in fw.tips.iter().enumerate() {
            assert_eq!(fw.tip_details[i].tip, tip.display_text());
        }
        // A supplied detail keeps its own explanation.
        assert_eq!(fw.tip_details[0].explanation, "capture decisions in writing");
        // Synthesized details lower-case the tip text.
        assert_eq!(fw.tip_details[1].explanation, "ask for help");
    }

    #[test]
    fn malformed_detail_entries_are_skipped() {
        let fw = normalize(json!({
            "action_step_details": [
                {"step": "Scout venues", "description": "walk the block"},
                "not an object",
                {"description": "missing the step field"}
            ]
        }));
        assert_eq!(fw.action_step_details.len(), 1);
        assert_eq!(fw.action_step_details[0].step, "Scout venues");
    }

    #[test]
    fn string_leaves_are_display_cleaned() {
        let fw = normalize(json!({
            "goal": "**Launch** a _bakery_",
            "action_steps": ["- Find a location"],
            "tips": ["## Use `sourdough`"]
        }));
        assert_eq!(fw.goal, "Launch a bakery");
        assert_eq!(fw.action_steps[0].as_plain(), Some("\u{2022} Find a location"));
        assert_eq!(fw.tips[0].as_plain(), Some("Use sourdough"));
    }

    #[test]
    fn markdown_only_goal_falls_back_to_default() {
        let fw = normalize(json!({"goal": "## "}));
        assert_eq!(fw.goal, DEFAULT_GOAL);
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            json!({}),
            json!({"goal": "**Launch** a bakery", "tips": [], "clarification_needed": "Budget?"}),
            json!({
                "goal": "Plan a garden",
                "action_steps": ["Prepare soil", {"step": "Buy seeds", "priority": "High"}],
                "challenges": ["Weather"],
                "resources": ["Local nursery"],
                "tips": ["Water *daily*"],
                "tip_details": [{"tip": "Water daily", "explanation": "morning is best",
                                 "examples": [], "context": ""}],
                "stakeholders": ["family"],
                "timeline": {"short_term": ["week one"]}
            }),
            json!({"tips": "one bare tip", "metrics": [{"name": "yield"}]}),
        ];
        for raw in inputs {
            let once = normalize(raw);
            let roundtrip = serde_json::to_value(&once).unwrap();
            let twice = normalize(roundtrip);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn structured_items_survive_with_fields_intact() {
        let fw = normalize(json!({
            "action_steps": [{"step": "Scout venues", "priority": "High"}]
        }));
        assert_eq!(
            fw.action_steps[0].display_text(),
            "Scout venues (Priority: High)"
        );
    }
}
