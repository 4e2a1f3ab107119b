//! Wildcard pattern rendering and expansion.
//!
//! Patterns use single-brace placeholders (`{basin}`), the same syntax the
//! workflow tool uses for wildcards, so a pattern can be shared between the
//! two without rewriting.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
    })
}

/// Placeholder names in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in placeholder_regex().captures_iter(template) {
        let name = cap[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Substitute every placeholder in one pass. Substituted values are not
/// scanned again; placeholders without a variable are kept as written.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            variables
                .iter()
                .find(|(key, _)| *key == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render `template` once per combination of variable values.
///
/// Combinations follow declaration order with the last variable varying
/// fastest. Every placeholder in the template must have a variable.
pub fn expand(template: &str, variables: &[(String, Vec<String>)]) -> Result<Vec<String>> {
    let missing: Vec<String> = placeholders(template)
        .into_iter()
        .filter(|name| !variables.iter().any(|(key, _)| key == name))
        .collect();

    if !missing.is_empty() {
        return Err(Error::validation_invalid_argument(
            "pattern",
            format!(
                "No values supplied for placeholder(s): {}",
                missing.join(", ")
            ),
            Some(template.to_string()),
            None,
        ));
    }

    let mut combinations: Vec<Vec<(&str, &str)>> = vec![Vec::new()];
    for (key, values) in variables {
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combo in &combinations {
            for value in values {
                let mut extended = combo.clone();
                extended.push((key.as_str(), value.as_str()));
                next.push(extended);
            }
        }
        combinations = next;
    }

    Ok(combinations
        .iter()
        .map(|combo| render(template, combo))
        .collect())
}
