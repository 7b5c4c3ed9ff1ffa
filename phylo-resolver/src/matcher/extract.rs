//! JSON extraction from free-text matcher replies

use serde_json::Value;
use std::collections::HashSet;

/// First brace-delimited JSON object in `text`
///
/// Scans for `{`, follows nesting (ignoring braces inside JSON strings) to the
/// matching `}`, and returns the span if it parses. A span that does not
/// parse is skipped and scanning resumes after its opening brace.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(&text[start..]) {
            let candidate = &text[start..start + end + 1];
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
        search_from = start + 1;
    }

    None
}

/// Byte offset of the `}` closing the `{` at the start of `text`
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Names listed under `matchedClassifications` in a matcher reply
///
/// Any extraction failure yields an empty list. Results are de-duplicated in
/// order, exclude `target`, and are restricted to `candidates`.
pub fn matched_names(reply: &str, target: &str, candidates: &[String]) -> Vec<String> {
    let Some(object) = extract_json_object(reply) else {
        return Vec::new();
    };
    let Some(Value::Array(items)) = object.get("matchedClassifications") else {
        return Vec::new();
    };

    let allowed: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != target && allowed.contains(name))
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}
