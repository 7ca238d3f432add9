use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute value carried by a listing or compared against by a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Scalar {
    Number(Decimal),
    Text(String),
    Bool(bool),
    List(Vec<Scalar>),
}

impl Scalar {
    /// Numeric view of the value. Numeric strings such as `"32"` coerce too.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(text) => Decimal::from_str(text.trim()).ok(),
            Scalar::Bool(_) | Scalar::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Scalar::List(items) => Some(items),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(flag) => Some(*flag),
            Scalar::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Equality after coercing both sides to a common comparable type.
    ///
    /// Numbers compare by value (`32 == "32.0"`), booleans accept their
    /// textual spelling, lists compare element-wise, and anything else falls
    /// back to comparing the trimmed textual forms.
    pub fn loosely_equals(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::List(left), Scalar::List(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| l.loosely_equals(r))
            }
            (Scalar::List(_), _) | (_, Scalar::List(_)) => false,
            _ => {
                if let (Some(left), Some(right)) = (self.as_decimal(), other.as_decimal()) {
                    return left == right;
                }
                if matches!(self, Scalar::Bool(_)) || matches!(other, Scalar::Bool(_)) {
                    return match (self.as_bool(), other.as_bool()) {
                        (Some(left), Some(right)) => left == right,
                        _ => false,
                    };
                }
                self.to_string().trim() == other.to_string().trim()
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(value) => write!(f, "{}", value.normalize()),
            Scalar::Text(text) => f.write_str(text),
            Scalar::Bool(flag) => write!(f, "{}", flag),
            Scalar::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl TryFrom<Value> for Scalar {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(flag) => Ok(Scalar::Bool(flag)),
            Value::Number(number) => Decimal::from_str(&number.to_string())
                .or_else(|_| Decimal::from_scientific(&number.to_string()))
                .map(Scalar::Number)
                .map_err(|err| format!("unsupported number {}: {}", number, err)),
            Value::String(text) => Ok(Scalar::Text(text)),
            Value::Array(items) => items
                .into_iter()
                .map(Scalar::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Scalar::List),
            Value::Null => Err("null is not a valid scalar".to_string()),
            Value::Object(_) => Err("objects are not valid scalars".to_string()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Number(number) => {
                let rendered = number.normalize().to_string();
                serde_json::Number::from_str(&rendered)
                    .map(Value::Number)
                    .unwrap_or(Value::String(rendered))
            }
            Scalar::Text(text) => Value::String(text),
            Scalar::Bool(flag) => Value::Bool(flag),
            Scalar::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<Decimal> for Scalar {
    fn from(value: Decimal) -> Self {
        Scalar::Number(value)
    }
}

macro_rules! scalar_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::Number(Decimal::from(value))
                }
            }
        )*
    };
}

scalar_from_int!(i32, i64, u32, u64, usize);

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Scalar {
    fn from(value: Vec<T>) -> Self {
        Scalar::List(value.into_iter().map(Into::into).collect())
    }
}
