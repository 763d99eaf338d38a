//! Endpoint template resolution.
//!
//! Step definitions name endpoints with placeholder tokens such as
//! `/sets/_set_id`. A placeholder is an underscore followed by word characters
//! (`[A-Za-z0-9_]`) that is not itself preceded by a word character. Before a
//! request is sent, every placeholder is replaced with the fixture id bound in
//! the scenario context.
//!
//! Every placeholder token in the template must be bound. Substitution then
//! replaces every literal occurrence of every key in a single left-to-right
//! scan that tries keys longest first and never rescans replacement text, so
//! `_id` cannot corrupt `_set_id` and a value containing another key is
//! emitted verbatim.

use std::collections::BTreeMap;

use crate::error::TemplateError;


/// Returns whether `c` can continue a placeholder token.
const fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Resolve every placeholder in `template` against `params`.
///
/// # Errors
///
/// Returns [`TemplateError::UnresolvedPlaceholder`] naming the first
/// placeholder (in template order) that has no bound value.
pub fn resolve(template: &str, params: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let unbound = |placeholder: &str| TemplateError::UnresolvedPlaceholder {
        placeholder: placeholder.to_owned(),
        template: template.to_owned(),
    };

    if let Some(placeholder) = placeholders(template)
        .into_iter()
        .find(|token| !params.contains_key(*token))
    {
        return Err(unbound(placeholder));
    }

    let mut keys: Vec<(&str, &str)> = params
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut resolved = String::with_capacity(template.len());
    let mut literal_spans = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(rest) = template.get(pos..) {
        let Some(current) = rest.chars().next() else {
            break;
        };
        if let Some((key, value)) = keys.iter().find(|(key, _)| rest.starts_with(key)) {
            literal_spans.push((literal_start, pos));
            resolved.push_str(value);
            pos += key.len();
            literal_start = pos;
        } else {
            resolved.push(current);
            pos += current.len_utf8();
        }
    }
    literal_spans.push((literal_start, template.len()));

    let leftover = literal_spans
        .into_iter()
        .filter_map(|(start, end)| template.get(start..end))
        .find_map(|span| placeholders(span).into_iter().next());
    if let Some(placeholder) = leftover {
        return Err(unbound(placeholder));
    }

    Ok(resolved)
}

/// List the placeholder tokens appearing in `template`, in order.
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut previous_is_word = false;
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '_' && !previous_is_word {
            let mut end = start + c.len_utf8();
            while let Some(&(index, next)) = chars.peek() {
                if !is_word(next) {
                    break;
                }
                end = index + next.len_utf8();
                chars.next();
            }
            if let Some(token) = template.get(start..end).filter(|token| token.len() > 1) {
                found.push(token);
            }
            previous_is_word = true;
        } else {
            previous_is_word = is_word(c);
        }
    }

    found
}
