//! Key-value context attached to log entries.

use serde::Serialize;
use serde_json::Value;

/// One structured key-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    /// Serializes `value` eagerly. A value that cannot be represented as JSON
    /// is recorded as an error string under the same key.
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|err| Value::String(format!("<error: {}>", err)));
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<K: Into<String>, V: Serialize> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

/// Builds a `Vec<Field>` from `key => value` pairs.
///
/// ```
/// let fields = logkit::kv!["user" => "ana", "attempt" => 3];
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Field::new($key, $value)),+]
    };
}
