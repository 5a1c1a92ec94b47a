use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A typed environment value.
///
/// Coercion is closed over these five shapes; consumers pattern-match
/// instead of reparsing strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Null,
    Str(String),
}

impl Value {
    /// Coerce a raw token into its typed form.
    ///
    /// Rules are checked in order: exact `true`/`false`, exact `null`,
    /// decimal integer, decimal float, otherwise the string unchanged.
    /// Pure function; applied to every raw value and re-applied after
    /// each interpolation substitution.
    pub fn coerce(raw: &str) -> Value {
        match raw {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "null" => return Value::Null,
            _ => {}
        }

        if is_integer_literal(raw) {
            // Digit runs that overflow i64 stay textual.
            return match raw.parse::<i64>() {
                Ok(int) => Value::Int(int),
                Err(_) => Value::Str(raw.to_owned()),
            };
        }

        if is_float_literal(raw)
            && let Ok(float) = raw.parse::<f64>()
        {
            return Value::Float(float);
        }

        Value::Str(raw.to_owned())
    }

    /// The string slice when the value is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => {
                let rendered = value.to_string();
                // An integral float renders bare; put the point back so
                // the text re-coerces as a float.
                if rendered.bytes().all(|byte| byte.is_ascii_digit() || byte == b'-') {
                    write!(f, "{rendered}.0")
                } else {
                    f.write_str(&rendered)
                }
            }
            Value::Null => f.write_str("null"),
            Value::Str(value) => f.write_str(value),
        }
    }
}

/// Optional leading `-`, then ASCII digits only.
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Optional leading `-`, digits, a single `.`, digits.
fn is_float_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let Some((head, tail)) = unsigned.split_once('.') else {
        return false;
    };
    !head.is_empty()
        && !tail.is_empty()
        && head.bytes().all(|byte| byte.is_ascii_digit())
        && tail.bytes().all(|byte| byte.is_ascii_digit())
}
