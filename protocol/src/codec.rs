//! Decoding of raw service text into typed payloads.
//!
//! Language-model output is close to JSON but not always valid JSON: it may
//! be wrapped in markdown code fences, carry trailing commas, or write
//! decimals without a leading zero (`.5`, `-.5`). The decoder repairs those
//! before structural parsing.

use crate::message::{BattleEvent, CharacterPayload};
use crate::scene::SceneNode;
use common::{CharacterStats, Winner};
use serde_json::Value;

/// Errors produced while decoding service payloads.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("no JSON {expected} found in response")]
    NoJson { expected: &'static str },

    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("response does not describe a model")]
    MissingModel,

    #[error("service returned an empty body")]
    Empty,
}

/// Removes markdown code fences (```` ``` ```` and ```` ```json ````).
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        cleaned.push_str(&rest[..start]);
        let mut after = &rest[start + 3..];
        if after.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            after = &after[4..];
        }
        rest = after.trim_start();
    }
    cleaned.push_str(rest);
    cleaned
}

/// Slice from the first `open` to the last `close`, inclusive.
#[must_use]
pub fn extract_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Drops trailing commas and adds the missing zero to bare decimals.
/// String literals are left untouched.
#[must_use]
pub fn repair_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut repaired = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut escaped = false;

    for (index, &ch) in chars.iter().enumerate() {
        if in_string {
            repaired.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                repaired.push(ch);
            }
            ',' => {
                let next = chars[index + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    repaired.push(ch);
                }
            }
            '.' => {
                if needs_leading_zero(&repaired) {
                    repaired.push('0');
                }
                repaired.push(ch);
            }
            _ => repaired.push(ch),
        }
    }

    repaired
}

fn needs_leading_zero(emitted: &str) -> bool {
    let mut tail = emitted.trim_end().chars().rev();
    match tail.next() {
        Some(':' | '[' | ',') => true,
        Some('-') => {
            let before: String = tail.collect::<String>();
            matches!(before.trim_start().chars().next(), Some(':' | '[' | ','))
        }
        _ => false,
    }
}

fn prepare(text: &str, open: char, close: char, expected: &'static str) -> Result<Value, PayloadError> {
    if text.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    let cleaned = strip_code_fences(text);
    let span = extract_span(&cleaned, open, close).ok_or(PayloadError::NoJson { expected })?;
    Ok(serde_json::from_str(&repair_json(span))?)
}

/// Decodes a generated or fused character.
///
/// The model is read from `model` when present, otherwise the whole object
/// is taken as the model. A missing stat block is not an error here; callers
/// decide whether they can fall back.
pub fn decode_character(text: &str) -> Result<CharacterPayload, PayloadError> {
    let value = prepare(text, '{', '}', "object")?;

    let stats = value
        .get("stats")
        .filter(|stats| stats.is_object())
        .and_then(|stats| serde_json::from_value::<CharacterStats>(stats.clone()).ok());

    let embedded = value.get("model").filter(|model| model.is_object()).cloned();
    let model = SceneNode::from_value(embedded.unwrap_or(value)).ok_or(PayloadError::MissingModel)?;

    Ok(CharacterPayload { model, stats })
}

/// Decodes a narration script and forces every `result` event to declare
/// the precomputed winner.
pub fn decode_battle_script(text: &str, winner: Winner) -> Result<Vec<BattleEvent>, PayloadError> {
    let value = prepare(text, '[', ']', "array")?;
    let Value::Array(items) = value else {
        return Err(PayloadError::NoJson { expected: "array" });
    };

    let mut events: Vec<BattleEvent> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    force_winner(&mut events, winner);
    Ok(events)
}

pub fn force_winner(events: &mut [BattleEvent], winner: Winner) {
    for event in events.iter_mut().filter(|event| event.action.is_result()) {
        event.winner = Some(winner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_language_tag() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}\n");
        assert_eq!(strip_code_fences("```JSON {}```"), "{}");
    }

    #[test]
    fn repairs_bare_decimals_outside_strings() {
        let repaired = repair_json(r#"{"a": .5, "b": [-.25, .1], "c": ".5", "d": -.5}"#);
        assert_eq!(
            repaired,
            r#"{"a": 0.5, "b": [-0.25, 0.1], "c": ".5", "d": -0.5}"#
        );
    }

    #[test]
    fn removes_trailing_commas() {
        assert_eq!(repair_json("{\"a\":[1,2,],}"), "{\"a\":[1,2]}");
        assert_eq!(repair_json("{\"a\":\"x,}\"}"), "{\"a\":\"x,}\"}");
    }

    #[test]
    fn extract_span_needs_both_ends() {
        assert_eq!(extract_span("noise {x} tail", '{', '}'), Some("{x}"));
        assert_eq!(extract_span("} {", '{', '}'), None);
    }
}
