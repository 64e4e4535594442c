//! Lightweight markdown cleanup for generator output.
//!
//! Two cleaning modes plus an escaping mode, never combined in one pass:
//!
//! - [`clean_display`] strips all formatting, code fences included, for
//!   plain-text surfaces (diagram labels, text view).
//! - [`clean_chat`] strips formatting outside fenced code regions only and
//!   repairs a truncated trailing fence, for chat transcripts.
//! - [`escape_prompt`] escapes template/markup characters in text that is
//!   embedded into an outbound prompt.
//!
//! Every function is total: any input produces some output, no panics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(?:#{1,6}[ \t]+)+").unwrap());
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static BOLD_UNDERSCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static ITALIC_UNDERSCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.*?)_").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+").unwrap());
static FENCE_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[a-zA-Z]*\n").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

const FENCE: &str = "```";

/// Strip markdown emphasis, headings, and bullets from a single line or
/// paragraph. Does not touch backticks; fence handling differs per mode.
fn strip_formatting(text: &str) -> String {
    let text = HEADING_RE.replace_all(text, "");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "$1");
    BULLET_RE.replace_all(&text, "\u{2022} ").into_owned()
}

/// Clean text for plain display: all markdown formatting is removed,
/// including fence delimiters, language tags, and inline backticks.
pub fn clean_display(text: &str) -> String {
    let text = strip_formatting(text);
    let text = FENCE_OPEN_RE.replace_all(&text, "");
    let text = text.replace(FENCE, "");
    INLINE_CODE_RE.replace_all(&text, "$1").into_owned()
}

/// Clean text for chat display: formatting is stripped outside fenced code
/// regions only; fence interiors pass through byte-for-byte. Inline code
/// spans are shielded from the bullet/emphasis rules via a
/// placeholder-substitute-restore pass. A trailing unclosed fence (odd
/// number of ``` markers, as produced by truncated upstream generation)
/// gets a closing fence appended.
pub fn clean_chat(text: &str) -> String {
    let mut inside_code = false;
    let mut out = Vec::new();

    for line in text.split('\n') {
        if line.trim().starts_with(FENCE) {
            inside_code = !inside_code;
            out.push(line.to_string());
            continue;
        }
        if inside_code {
            out.push(line.to_string());
            continue;
        }

        // Shield inline code spans. The placeholder uses private-use
        // characters so the emphasis rules cannot mangle it.
        let mut spans: Vec<String> = Vec::new();
        let shielded = INLINE_CODE_RE.replace_all(line, |caps: &regex::Captures<'_>| {
            spans.push(caps[0].to_string());
            format!("\u{e000}{}\u{e001}", spans.len() - 1)
        });

        let mut processed = strip_formatting(&shielded);
        for (i, span) in spans.iter().enumerate() {
            processed = processed.replace(&format!("\u{e000}{i}\u{e001}"), span);
        }
        out.push(processed);
    }

    let mut result = out.join("\n");
    if result.matches(FENCE).count() % 2 != 0 {
        result.push_str("\n```");
    }
    result
}

/// Escape characters that could be misread as template or markup syntax
/// when the string is embedded into a generated prompt. Distinct from the
/// cleaning modes; never applied on the same pass as them.
pub fn escape_prompt(text: &str) -> String {
    text.replace('{', "\\{")
        .replace('}', "\\}")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Apply [`clean_display`] to every string leaf of an arbitrarily nested
/// JSON structure. Non-string leaves pass through unchanged.
pub fn sanitize_deep(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(clean_display(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_deep).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_deep(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_display_strips_headings() {
        assert_eq!(clean_display("## Heading"), "Heading");
        assert_eq!(clean_display("###### Deep"), "Deep");
        // Stacked markers are consumed in one pass.
        assert_eq!(clean_display("## # Nested"), "Nested");
    }

    #[test]
    fn clean_display_strips_emphasis() {
        assert_eq!(clean_display("**bold** and *italic*"), "bold and italic");
        assert_eq!(clean_display("__bold__ and _italic_"), "bold and italic");
    }

    #[test]
    fn clean_display_converts_bullets() {
        assert_eq!(
            clean_display("- first\n- second"),
            "\u{2022} first\n\u{2022} second"
        );
        assert_eq!(clean_display("  * starred"), "\u{2022} starred");
    }

    #[test]
    fn clean_display_removes_fences_and_inline_code() {
        let input = "```python\nprint(1)\n```\nuse `len()` here";
        let cleaned = clean_display(input);
        assert!(!cleaned.contains("```"));
        assert!(!cleaned.contains('`'));
        assert!(cleaned.contains("print(1)"));
        assert!(cleaned.contains("len()"));
    }

    #[test]
    fn clean_display_is_idempotent() {
        let inputs = [
            "## # Heading",
            "**a** *b* _c_ __d__",
            "- bullet\n* bullet",
            "```rust\nfn main() {}\n```",
            "plain text with snake_case_name",
        ];
        for input in inputs {
            let once = clean_display(input);
            assert_eq!(clean_display(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn clean_chat_preserves_fence_interior() {
        let input = "Intro **bold**\n```python\n# not a heading\n**kept** _as-is_\n```\n- outside";
        let cleaned = clean_chat(input);
        assert!(cleaned.contains("# not a heading"));
        assert!(cleaned.contains("**kept** _as-is_"));
        assert!(cleaned.contains("Intro bold"));
        assert!(cleaned.contains("\u{2022} outside"));
    }

    #[test]
    fn clean_chat_keeps_fence_markers() {
        let input = "```js\nlet x = 1;\n```";
        assert_eq!(clean_chat(input), input);
    }

    #[test]
    fn clean_chat_shields_inline_code() {
        let input = "call `my_snake_fn()` and `*glob*` today";
        let cleaned = clean_chat(input);
        assert!(cleaned.contains("`my_snake_fn()`"));
        assert!(cleaned.contains("`*glob*`"));
    }

    #[test]
    fn clean_chat_repairs_unclosed_fence() {
        let input = "text\n```python\nprint(1)";
        let cleaned = clean_chat(input);
        assert_eq!(cleaned.matches("```").count() % 2, 0);
        assert!(cleaned.ends_with("```"));
    }

    #[test]
    fn clean_chat_leaves_balanced_fences_alone() {
        let input = "```\ncode\n```";
        assert_eq!(clean_chat(input).matches("```").count(), 2);
    }

    #[test]
    fn escape_prompt_escapes_markup_characters() {
        assert_eq!(
            escape_prompt("{a} [b] <c>"),
            "\\{a\\} \\[b\\] &lt;c&gt;"
        );
    }

    #[test]
    fn sanitize_deep_only_touches_string_leaves() {
        let value = json!({
            "title": "**bold**",
            "count": 3,
            "nested": {"items": ["- one", 2, null]}
        });
        let cleaned = sanitize_deep(value);
        assert_eq!(cleaned["title"], "bold");
        assert_eq!(cleaned["count"], 3);
        assert_eq!(cleaned["nested"]["items"][0], "\u{2022} one");
        assert_eq!(cleaned["nested"]["items"][1], 2);
        assert_eq!(cleaned["nested"]["items"][2], Value::Null);
    }
}
