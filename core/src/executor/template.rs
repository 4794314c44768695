//! `{{outputs.<task>}}` substitution.
//!
//! Expansion is a single pass over the original text. Substituted output is
//! never rescanned, so an output containing placeholder syntax stays literal.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref OUTPUT_REF: Regex =
        Regex::new(r"\{\{outputs\.([a-zA-Z0-9_-]+)\}\}").expect("valid template regex");
}

/// Replace every placeholder whose task has an output; leave the rest verbatim.
pub fn expand_prompt<'a>(prompt: &'a str, outputs: &HashMap<String, String>) -> Cow<'a, str> {
    OUTPUT_REF.replace_all(prompt, |caps: &Captures| match outputs.get(&caps[1]) {
        Some(output) => output.clone(),
        None => caps[0].to_string(),
    })
}

/// Task names referenced by `prompt`, deduplicated, in order of first appearance.
pub fn extract_template_vars(prompt: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    OUTPUT_REF
        .captures_iter(prompt)
        .filter_map(|caps| {
            let name = &caps[1];
            seen.insert(name.to_string()).then(|| name.to_string())
        })
        .collect()
}

/// Referenced task names that have no entry in `outputs`.
pub fn missing_outputs(prompt: &str, outputs: &HashMap<String, String>) -> Vec<String> {
    extract_template_vars(prompt)
        .into_iter()
        .filter(|name| !outputs.contains_key(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_outputs() {
        let out = outputs(&[("x", "VAL")]);
        assert_eq!(expand_prompt("Use {{outputs.x}}", &out), "Use VAL");
    }

    #[test]
    fn leaves_missing_keys_verbatim() {
        assert_eq!(
            expand_prompt("{{outputs.missing}}", &HashMap::new()),
            "{{outputs.missing}}"
        );
    }

    #[test]
    fn expansion_without_placeholders_is_identity() {
        let out = outputs(&[("x", "VAL")]);
        let once = expand_prompt("a {{outputs.x}} b", &out).into_owned();
        assert_eq!(expand_prompt(&once, &out), once);
        assert!(matches!(expand_prompt("plain", &out), Cow::Borrowed(_)));
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let out = outputs(&[("a", "{{outputs.b}}"), ("b", "SECRET")]);
        assert_eq!(expand_prompt("{{outputs.a}}", &out), "{{outputs.b}}");
    }

    #[test]
    fn handles_repeats_and_adjacent_placeholders() {
        let out = outputs(&[("a-1", "A"), ("b_2", "B")]);
        assert_eq!(
            expand_prompt("{{outputs.a-1}}{{outputs.b_2}}/{{outputs.a-1}}", &out),
            "AB/A"
        );
    }

    #[test]
    fn ignores_malformed_placeholders() {
        let out = outputs(&[("x", "VAL")]);
        assert_eq!(
            expand_prompt("{{outputs.}} {{ outputs.x }} {{outputs.x!}}", &out),
            "{{outputs.}} {{ outputs.x }} {{outputs.x!}}"
        );
    }

    #[test]
    fn extract_dedups_in_first_seen_order() {
        assert_eq!(
            extract_template_vars("{{outputs.b}} {{outputs.a}} {{outputs.b}}"),
            vec!["b", "a"]
        );
        assert!(extract_template_vars("nothing here").is_empty());
    }

    #[test]
    fn reports_missing_outputs() {
        let out = outputs(&[("a", "1")]);
        assert_eq!(
            missing_outputs("{{outputs.a}} {{outputs.c}}", &out),
            vec!["c"]
        );
    }
}
