//! C3 Introspector: a deliberately best-effort static scan of a task script's
//! source text, used to recover likely input/output parameter names when the
//! catalog has none declared. This is a regex pass, not a parser — it never
//! fails, it just may under- or over-report.

use std::collections::HashSet;

use regex::Regex;

const EXCLUDED_OUTPUT_KEYS: &[&str] = &["error", "err", "exception", "message", "msg"];

fn input_pattern() -> Regex {
    Regex::new(r#"globals\(\)\.get\(\s*['"](?P<key>[\w_]+)['"](?P<has_default>\s*,)?"#)
        .expect("static regex is valid")
}

fn result_assignment_pattern() -> Regex {
    Regex::new(r"\bresult\s*=\s*\{([^}]*)\}").expect("static regex is valid")
}

fn return_dict_pattern() -> Regex {
    Regex::new(r"\breturn\s*\{([^}]*)\}").expect("static regex is valid")
}

fn dict_key_pattern() -> Regex {
    Regex::new(r#"['"](?P<key>[\w_]+)['"]\s*:"#).expect("static regex is valid")
}

/// Names read via `globals().get('name')` with no default value supplied.
/// The two-argument form (`globals().get('name', default)`) is treated as
/// optional and skipped, matching the convention the scripts follow.
pub fn introspect_inputs(source: &str) -> Vec<String> {
    let pattern = input_pattern();
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for caps in pattern.captures_iter(source) {
        if caps.name("has_default").is_some() {
            continue;
        }
        let key = caps["key"].to_string();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    keys
}

/// Names assigned in a top-level `result = {...}` dict literal or appearing
/// as a key in any `return {...}` statement, excluding error-reporting keys.
pub fn introspect_outputs(source: &str) -> Vec<String> {
    let result_pattern = result_assignment_pattern();
    let return_pattern = return_dict_pattern();
    let key_pattern = dict_key_pattern();

    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    let bodies = result_pattern
        .captures_iter(source)
        .chain(return_pattern.captures_iter(source))
        .map(|caps| caps[1].to_string());

    for body in bodies {
        for caps in key_pattern.captures_iter(&body) {
            let key = caps["key"].to_string();
            if EXCLUDED_OUTPUT_KEYS.contains(&key.as_str()) {
                continue;
            }
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_skip_keys_with_a_default() {
        let source = r#"
account_id = globals().get('account_id')
region = globals().get('region', 'us-east-1')
"#;
        assert_eq!(introspect_inputs(source), vec!["account_id".to_string()]);
    }

    #[test]
    fn inputs_are_deduplicated_in_first_seen_order() {
        let source = r#"
a = globals().get('alpha')
b = globals().get('beta')
c = globals().get('alpha')
"#;
        assert_eq!(
            introspect_inputs(source),
            vec!["alpha".to_string(), "beta".to_string()]
        );
    }

    #[test]
    fn outputs_from_result_assignment_exclude_error_keys() {
        let source = r#"
result = {'status': 'ok', 'error': None, 'count': 3}
"#;
        assert_eq!(
            introspect_outputs(source),
            vec!["status".to_string(), "count".to_string()]
        );
    }

    #[test]
    fn outputs_from_return_statements_are_included() {
        let source = r#"
def run():
    if failed:
        return {'message': 'bad'}
    return {'total': total, 'items': items}
"#;
        assert_eq!(
            introspect_outputs(source),
            vec!["total".to_string(), "items".to_string()]
        );
    }
}
