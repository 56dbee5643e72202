//! Coaxing JSON out of model text.
//!
//! Models asked for "only JSON" still wrap it in code fences, add a sentence
//! before or after, leave trailing commas, emit raw newlines inside strings,
//! use typographic quotes, or get cut off mid-object. [`parse_lenient`] tries
//! progressively more invasive readings of the text and returns the first
//! that deserializes.

use serde::de::DeserializeOwned;

// ─── Extraction ───────────────────────────────────────────────────────────

/// Contents of the first ``` fenced block, if the text has one.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // Skip the info string ("json", "JSON", …) up to the end of the line.
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => after,
    };
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// The first complete JSON object in `s`, found by string-aware brace
/// matching. `None` if there is no `{` or the object never closes.
pub fn find_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let s = &s[start..];

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fence-stripped, prose-trimmed JSON object.
pub fn extract_json(text: &str) -> Option<&str> {
    find_json_object(strip_code_fence(text)).or_else(|| find_json_object(text))
}

// ─── Repair ───────────────────────────────────────────────────────────────

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

fn is_smart_quote(c: char) -> bool {
    matches!(c, '\u{201c}' | '\u{201d}' | '\u{201e}')
}

/// Best-effort syntactic repair of a JSON object:
///
/// * text before the first `{` and after the matching `}` is dropped
/// * trailing commas before `}` / `]` are removed
/// * typographic double quotes used as string delimiters become `"`
/// * raw newlines, tabs and carriage returns inside strings are escaped
/// * an unterminated string, array or object is closed
pub fn repair(text: &str) -> String {
    let body = strip_code_fence(text);
    let Some(start) = body.find('{') else {
        return body.trim().to_string();
    };
    let chars: Vec<char> = body[start..].chars().collect();

    let mut out = String::with_capacity(chars.len() + 8);
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    // Set when the current string was opened by a typographic quote; only
    // then may a typographic quote close it.
    let mut smart_open = false;
    let mut escape = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            if escape {
                out.push(c);
                escape = false;
            } else if c == '\\' {
                out.push(c);
                escape = true;
            } else if c == '"' {
                out.push('"');
                in_string = false;
            } else if smart_open
                && is_smart_quote(c)
                && matches!(next_significant(&chars, i + 1), None | Some(':' | ',' | '}' | ']'))
            {
                out.push('"');
                in_string = false;
            } else if c == '\n' {
                out.push_str("\\n");
            } else if c == '\r' {
                out.push_str("\\r");
            } else if c == '\t' {
                out.push_str("\\t");
            } else {
                out.push(c);
            }
        } else {
            match c {
                '"' => {
                    out.push('"');
                    in_string = true;
                    smart_open = false;
                }
                c if is_smart_quote(c) => {
                    out.push('"');
                    in_string = true;
                    smart_open = true;
                }
                ',' if matches!(next_significant(&chars, i + 1), None | Some('}' | ']')) => {}
                '{' => {
                    closers.push('}');
                    out.push(c);
                }
                '[' => {
                    closers.push(']');
                    out.push(c);
                }
                '}' | ']' => {
                    if closers.last() == Some(&c) {
                        closers.pop();
                    }
                    out.push(c);
                    if closers.is_empty() {
                        return out;
                    }
                }
                _ => out.push(c),
            }
        }
        i += 1;
    }

    // Truncated input: close whatever is still open.
    if escape {
        out.pop();
    }
    if in_string {
        out.push('"');
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(',') {
        out.pop();
    }
    if out.ends_with(':') {
        out.push_str("null");
    }
    while let Some(closer) = closers.pop() {
        out.push(closer);
    }
    out
}

// ─── Lenient parse ────────────────────────────────────────────────────────

/// Deserialize `text` as `T`, trying in order: the text as-is, the extracted
/// object, the repaired object. The error of the last failed reading is
/// returned, since it reflects the most complete candidate.
pub fn parse_lenient<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let trimmed = text.trim();
    let mut last_error = match serde_json::from_str::<T>(trimmed) {
        Ok(v) => return Ok(v),
        Err(e) => e.to_string(),
    };

    if let Some(obj) = extract_json(trimmed) {
        if obj != trimmed {
            match serde_json::from_str::<T>(obj) {
                Ok(v) => return Ok(v),
                Err(e) => last_error = e.to_string(),
            }
        }
    }

    let repaired = repair(trimmed);
    if repaired != trimmed {
        match serde_json::from_str::<T>(&repaired) {
            Ok(v) => {
                tracing::debug!("model output parsed after repair");
                return Ok(v);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(last_error)
}

// ─── Tests ────────────────────────────────────────────────────────────────
