//! System prompt builders for the three exchange kinds.

use serde_json::Value;
use viveflow_core::{Framework, Item, sanitize};

/// Instructs the generation model to emit the framework JSON shape.
pub const FRAMEWORK_SYSTEM_PROMPT: &str = "\
You are an AI assistant that helps transform ideas into actionable frameworks.
Given an idea, you will analyze it and provide a structured response with the following components:
- goal: A clear, concise statement of the main objective
- action_steps: A list of 3-5 concrete steps to achieve the goal
- challenges: A list of 2-4 potential obstacles or difficulties
- resources: A list of 3-5 tools, platforms, or resources that could help
- tips: A list of 2-4 practical pieces of advice
- clarification_needed (optional): Questions to better understand the idea if more context is needed

Format your response as a valid JSON object with these exact keys.
Keep responses concise but actionable.";

const ENHANCE_GENERAL_PROMPT: &str = "\
You are an AI assistant that helps improve and enhance ideas specifically for generating idea frameworks.
Given a brief idea, you will expand it into a more detailed, structured input that can be used to generate a comprehensive idea framework.

Your enhanced idea should:
1. Maintain the original intent and purpose of the user's idea
2. Add specific details that would help generate better action steps, identify challenges, and suggest resources
3. Structure the idea with a clear goal, scope, and desired outcomes
4. Include relevant considerations that would help in implementation
5. Make the idea more specific, actionable, and detailed
6. Focus specifically on business, project, or personal development frameworks
7. Avoid adding unrelated or tangential content not connected to the original idea

Do not invent completely new ideas or change the core concept. Focus on enriching and expanding what the user has provided to facilitate better framework generation.
Return just the enhanced idea with no additional explanation or commentary.";

const ENHANCE_FRAMEWORK_PROMPT: &str = "\
You are an AI assistant that helps improve and enhance ideas specifically for generating idea frameworks.
Given a brief idea, you will expand it into a more detailed, structured input that can be used to generate a comprehensive idea framework with goals, action steps, challenges, resources, and tips.

Your enhanced idea should:
1. Maintain the original intent and purpose of the user's idea
2. Add specific details that would help generate better action steps, identify potential challenges, and suggest useful resources
3. Structure the idea with a clear goal, implementation path, and desired outcomes
4. Consider practical aspects of implementation and execution
5. Make the idea more specific, actionable, and detailed
6. Focus on content that will help build a robust framework with executable steps

Do not invent completely new directions or change the core concept. Focus on enriching and expanding what the user has provided to facilitate better framework generation.
Return just the enhanced idea with no additional explanation or commentary.";

/// Which enhancement flavor the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceContext {
    #[default]
    General,
    IdeaFramework,
}

impl EnhanceContext {
    /// Map the request's optional `context` label; unknown labels fall
    /// back to the general flavor.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("idea_framework") => EnhanceContext::IdeaFramework,
            _ => EnhanceContext::General,
        }
    }
}

pub fn enhance_system_prompt(context: EnhanceContext) -> &'static str {
    match context {
        EnhanceContext::General => ENHANCE_GENERAL_PROMPT,
        EnhanceContext::IdeaFramework => ENHANCE_FRAMEWORK_PROMPT,
    }
}

/// Build the assistant persona prompt, embedding the idea, the goal, the
/// four category lists as JSON, and bullet-style tip elaborations.
///
/// Tip text is markup-escaped before embedding so generator-produced
/// braces and brackets cannot be misread as template syntax.
pub fn chat_system_prompt(framework: &Framework, idea: &str) -> String {
    let tips = formatted_tips(framework);
    let tips_json = to_json_array(&tips);
    let tip_bullets = tip_detail_bullets(framework, &tips);

    format!(
        "You are a friendly, empathetic, and supportive AI assistant named ViveFlow that connects with users on a personal level.
Your personality is warm, encouraging, and genuinely caring - make users feel like they're chatting with a supportive friend who's fully invested in their success.

You have access to a framework that has been generated for the user's idea.

The original idea is: \"{idea}\"

The framework consists of the following elements:
- goal: {goal}
- action_steps: {action_steps}
- challenges: {challenges}
- resources: {resources}
- tips: {tips_json}

The detailed tips include:
{tip_bullets}

Please pay special attention to the TIPS section, as these contain important best practices for implementation.

When responding to the user:
1. Be conversational and personable - use a casual, friendly tone
2. Show genuine enthusiasm for their ideas and progress
3. Use supportive language that builds confidence
4. Ask engaging follow-up questions that show you're invested in their journey
5. Celebrate small wins and acknowledge challenges with empathy
6. Personalize responses by referencing previous parts of the conversation
7. Provide encouragement along with practical advice - balance emotional support with actionable guidance
8. Be conversational but concise - keep responses friendly but focused

CRITICAL INSTRUCTION - When showing code examples:
- ALWAYS provide COMPLETE, EXECUTABLE code examples
- Format code with triple backticks and language identifier (e.g., ```python)
- NEVER use placeholders like CODEBLOCK0, [CODE], or [...] - provide the FULL actual code
- Include helpful comments to explain key parts

Do not mention that you're accessing a framework or that you know their idea unless specifically asked.
Respond naturally as a friendly, supportive assistant who genuinely cares about the user's success.",
        goal = if framework.goal.is_empty() {
            "Improve and implement your idea"
        } else {
            &framework.goal
        },
        action_steps = to_json_value(&framework.action_steps),
        challenges = to_json_value(&framework.challenges),
        resources = to_json_value(&framework.resources),
    )
}

/// Reduce each tip to escaped text: the `tip` field of a structured
/// entry, or its field values joined with " - ", or the plain string.
fn formatted_tips(framework: &Framework) -> Vec<String> {
    framework
        .tips
        .iter()
        .map(|item| {
            let text = match item {
                Item::Plain(s) => s.clone(),
                Item::Structured(fields) => match fields.get("tip").and_then(Value::as_str) {
                    Some(tip) => tip.to_string(),
                    None => fields
                        .values()
                        .map(value_text)
                        .collect::<Vec<_>>()
                        .join(" - "),
                },
            };
            sanitize::escape_prompt(&text)
        })
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render tip elaborations as indented bullets, one per detail:
/// the tip line, optional further advice, examples, and usage context.
fn tip_detail_bullets(framework: &Framework, tips: &[String]) -> String {
    framework
        .tip_details
        .iter()
        .enumerate()
        .map(|(index, detail)| {
            let tip_text = if detail.tip.is_empty() {
                tips.get(index).map(String::as_str).unwrap_or_default()
            } else {
                &detail.tip
            };
            let advice = if detail.explanation.is_empty() {
                detail.description.as_deref().unwrap_or_default()
            } else {
                &detail.explanation
            };
            let advice_line = if advice.is_empty() {
                String::new()
            } else {
                format!("Further advice: {advice}\n  ")
            };
            format!(
                "- {tip_text}\n  {advice_line}Examples: {examples}\n  Best used: {context}",
                examples = detail.examples.join(", "),
                context = detail.context,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_json_array(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn to_json_value(items: &[Item]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
