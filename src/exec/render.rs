// src/exec/render.rs

//! Pure helpers that turn a command's fields into shell text.
//!
//! Nothing here touches the OS; [`super::shell`] glues these together and
//! launches the result.

use std::borrow::Cow;

use serde_json::Value;

use crate::command::{ParamKey, Params};
use crate::errors::Result;

const COMMAND_SUFFIX: &str = "Command";

/// Quote `value` so a POSIX shell reads it as exactly one literal word.
///
/// Words made only of characters with no meaning to the shell are left as
/// they are. Everything else, including the empty string, is wrapped in
/// single quotes with embedded `'` written as `'\''`.
pub fn escape_arg(value: &str) -> Cow<'_, str> {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

fn is_shell_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '_' | '-')
}

/// Derive a console command name from a class name.
///
/// Only the last namespace segment is kept (`\`, `/` and `::` all count as
/// separators). A trailing `Command` suffix is dropped and the first
/// remaining character lower-cased: `app\commands\FooCommand` → `foo`.
pub fn derive_command_name(class: &str) -> String {
    let short = class
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(class)
        .rsplit("::")
        .next()
        .unwrap_or(class);

    match short.strip_suffix(COMMAND_SUFFIX) {
        Some(stem) if !stem.is_empty() => {
            let mut chars = stem.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => short.to_string(),
            }
        }
        _ => short.to_string(),
    }
}

/// Text form of a parameter value, before escaping.
///
/// Arrays and objects become compact JSON. `true` is `1`; `false` and
/// `null` are the empty string.
pub fn value_to_arg(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    })
}

/// Render the parameter fragment of a command line.
///
/// `external` selects between `key value` (external binaries) and
/// `--key=value` (framework actions) for named keys. Positional values are
/// always emitted bare. Returns an empty string when there are no params.
pub fn render_params(params: &Params, external: bool) -> Result<String> {
    let mut parts = Vec::with_capacity(params.len());

    for (key, value) in params {
        let text = value_to_arg(value)?;
        let escaped = escape_arg(&text);

        let part = match key {
            ParamKey::Position(_) => escaped.into_owned(),
            ParamKey::Named(name) if external => format!("{name} {escaped}"),
            ParamKey::Named(name) => format!("--{}={escaped}", name.trim_start_matches('-')),
        };
        parts.push(part);
    }

    Ok(parts.join(" "))
}
