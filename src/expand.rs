use std::env;
use std::path::PathBuf;

use toml::Value;

/// Expand `${env:NAME}` placeholders in every string reachable from `value`.
///
/// Arrays are expanded element-wise preserving order, tables value-wise
/// preserving keys; scalars pass through untouched. The input is never
/// mutated.
pub fn expand_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(expand_str(s)),
        Value::Array(items) => Value::Array(items.iter().map(expand_value).collect()),
        Value::Table(table) => Value::Table(
            table
                .iter()
                .map(|(key, val)| (key.clone(), expand_value(val)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replace each `${env:NAME}` occurrence with the named environment variable,
/// or the empty string when it is unset. The `env:` tag matches
/// case-insensitively; `NAME` is `[A-Za-z0-9_]+`. Anything that does not form
/// a complete placeholder is left verbatim.
pub fn expand_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match parse_env_placeholder(after) {
            Some((name, consumed)) => {
                out.push_str(&env::var(name).unwrap_or_default());
                rest = &after[consumed..];
            }
            None => {
                // Not a placeholder; emit the opener and keep scanning so a
                // later valid placeholder still expands.
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse `env:NAME}` at the start of `s`, returning the variable name and the
/// number of bytes consumed.
fn parse_env_placeholder(s: &str) -> Option<(&str, usize)> {
    let tag = s.get(..4)?;
    if !tag.eq_ignore_ascii_case("env:") {
        return None;
    }

    let body = &s[4..];
    let end = body.find('}')?;
    let name = &body[..end];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }

    Some((name, 4 + end + 1))
}

/// Expand `${env:VAR}` segments and a leading `~` in a filesystem path.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = expand_str(path);
    if let Some(rest) = expanded.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_var(name: &str, value: &str) {
        unsafe { env::set_var(name, value) };
    }

    fn remove_var(name: &str) {
        unsafe { env::remove_var(name) };
    }

    #[test]
    fn replaces_set_variable() {
        set_var("AICOMMIT_TEST_KEY", "secret123");
        assert_eq!(expand_str("key=${env:AICOMMIT_TEST_KEY}"), "key=secret123");
    }

    #[test]
    fn unset_variable_becomes_empty() {
        remove_var("AICOMMIT_TEST_UNSET");
        assert_eq!(expand_str("[${env:AICOMMIT_TEST_UNSET}]"), "[]");
    }

    #[test]
    fn env_tag_is_case_insensitive() {
        set_var("AICOMMIT_TEST_CASE", "v");
        assert_eq!(expand_str("${ENV:AICOMMIT_TEST_CASE}"), "v");
        assert_eq!(expand_str("${Env:AICOMMIT_TEST_CASE}"), "v");
    }

    #[test]
    fn multiple_placeholders_in_one_string() {
        set_var("AICOMMIT_TEST_A", "a");
        set_var("AICOMMIT_TEST_B", "b");
        assert_eq!(
            expand_str("${env:AICOMMIT_TEST_A}/${env:AICOMMIT_TEST_B}"),
            "a/b"
        );
    }

    #[test]
    fn malformed_placeholders_stay_verbatim() {
        assert_eq!(expand_str("${env:NO_CLOSE"), "${env:NO_CLOSE");
        assert_eq!(expand_str("${env:BAD-NAME}"), "${env:BAD-NAME}");
        assert_eq!(expand_str("${env:}"), "${env:}");
        assert_eq!(expand_str("${other:X}"), "${other:X}");
    }

    #[test]
    fn malformed_opener_does_not_eat_later_placeholder() {
        set_var("AICOMMIT_TEST_LATER", "ok");
        assert_eq!(
            expand_str("${oops ${env:AICOMMIT_TEST_LATER}"),
            "${oops ok"
        );
    }

    #[test]
    fn value_expansion_preserves_shape() {
        set_var("AICOMMIT_TEST_SHAPE", "x");
        let input: Value = toml::from_str(
            r#"
            activeProviderId = "a"
            count = 3
            flag = true

            [[providers]]
            id = "a"
            apiKey = "${env:AICOMMIT_TEST_SHAPE}"
            tags = ["${env:AICOMMIT_TEST_SHAPE}", "plain"]
            "#,
        )
        .unwrap();

        let before = input.clone();
        let out = expand_value(&input);

        // input untouched
        assert_eq!(input, before);

        let providers = out.get("providers").unwrap().as_array().unwrap();
        assert_eq!(providers.len(), 1);
        let entry = providers[0].as_table().unwrap();
        assert_eq!(entry.get("apiKey").unwrap().as_str(), Some("x"));
        let tags = entry.get("tags").unwrap().as_array().unwrap();
        assert_eq!(tags[0].as_str(), Some("x"));
        assert_eq!(tags[1].as_str(), Some("plain"));

        // non-string scalars unchanged
        assert_eq!(out.get("count").unwrap().as_integer(), Some(3));
        assert_eq!(out.get("flag").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn path_expansion_handles_home_prefix() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/prompts/commit.md"), home.join("prompts/commit.md"));

        set_var("AICOMMIT_TEST_DIR", "/tmp/prompts");
        assert_eq!(
            expand_path("${env:AICOMMIT_TEST_DIR}/commit.md"),
            PathBuf::from("/tmp/prompts/commit.md")
        );
    }
}
