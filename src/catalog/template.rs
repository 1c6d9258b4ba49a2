//! Named placeholder substitution for response templates
//!
//! Placeholders look like `{name}`. `{{` and `}}` produce literal braces.

use crate::{Error, Result};

/// Substitute `{key}` placeholders from `params`
///
/// Unused parameters are ignored. An unterminated `{` is copied verbatim.
///
/// # Errors
///
/// Returns `Error::Template` naming the first placeholder with no value
pub fn fill(template: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        let (before, after) = rest.split_at(pos);
        out.push_str(before);

        if let Some(tail) = after.strip_prefix("{{") {
            out.push('{');
            rest = tail;
            continue;
        }
        if let Some(tail) = after.strip_prefix("}}") {
            out.push('}');
            rest = tail;
            continue;
        }
        if let Some(tail) = after.strip_prefix('}') {
            out.push('}');
            rest = tail;
            continue;
        }

        let body = &after[1..];
        let Some(close) = body.find('}') else {
            out.push_str(after);
            rest = "";
            break;
        };

        let key = &body[..close];
        let value = params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| Error::Template(key.to_string()))?;
        out.push_str(value);
        rest = &body[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
