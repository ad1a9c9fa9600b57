use anyhow::{anyhow, Result};

/// Remove trailing commas from JSON (invalid but common in model output).
/// Commas inside string literals are left alone.
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            result.push(ch);
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(&'}') | Some(&']')) {
                    continue;
                }
            }
            _ => {}
        }
        result.push(ch);
    }

    result
}

/// Byte range of the first balanced `{...}` or `[...]` starting at `start`
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn parses(candidate: &str) -> Option<String> {
    if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
        return Some(candidate.to_string());
    }
    let cleaned = remove_trailing_commas(candidate);
    serde_json::from_str::<serde_json::Value>(&cleaned).ok().map(|_| cleaned)
}

/// Body of the first markdown code fence, without the language tag
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```").unwrap_or(body.len());
    Some(body[..close].trim())
}

/// Extract a JSON document from model output.
///
/// Strategies, in order:
/// 1. the whole text
/// 2. the first markdown code fence
/// 3. the first balanced object or array found in surrounding prose
///
/// Each candidate is retried with trailing commas removed.
pub fn extract_json(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty model output"));
    }

    if let Some(json) = parses(trimmed) {
        return Ok(json);
    }

    if let Some(block) = fenced_block(trimmed) {
        if let Some(json) = parses(block) {
            tracing::debug!("Extracted JSON from markdown code block");
            return Ok(json);
        }
    }

    let mut search_from = 0;
    while let Some(rel) = trimmed[search_from..].find(|c: char| c == '{' || c == '[') {
        let start = search_from + rel;
        if let Some(end) = balanced_end(trimmed, start) {
            if let Some(json) = parses(&trimmed[start..end]) {
                tracing::debug!(start = start, end = end, "Extracted JSON from surrounding text");
                return Ok(json);
            }
        }
        search_from = start + 1;
    }

    let preview: String = trimmed.chars().take(200).collect();
    tracing::warn!(preview = %preview, "No JSON found in model output");
    Err(anyhow!("No valid JSON found in model output"))
}
