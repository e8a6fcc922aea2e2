//! SQL literal values
//!
//! Host values are mapped onto exactly one [`Literal`] variant. The mapping
//! is total: a value the crate does not understand becomes `NULL`.

use chrono::{NaiveDate, NaiveDateTime};

/// SQL literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// SQL NULL
    Null,
    /// Boolean true/false
    Bool(bool),
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Float(f64),
    /// String literal (quoted when rendered)
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without zone
    Timestamp(NaiveDateTime),
}

impl Literal {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Check if this is the NULL literal
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a JSON value into a literal
    ///
    /// Arrays and objects have no scalar representation and map to NULL.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Null,
        }
    }

    /// Convert back into a JSON value, used when logging bound parameters
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(d.to_string()),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_string()),
        }
    }
}

impl Default for Literal {
    fn default() -> Self {
        Self::Null
    }
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Literal {
                fn from(v: $ty) -> Self {
                    Self::$variant(v as $target)
                }
            }
        )*
    };
}

literal_from! {
    i8 => Integer as i64,
    i16 => Integer as i64,
    i32 => Integer as i64,
    i64 => Integer as i64,
    u8 => Integer as i64,
    u16 => Integer as i64,
    u32 => Integer as i64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<u64> for Literal {
    fn from(v: u64) -> Self {
        i64::try_from(v)
            .map(Self::Integer)
            .unwrap_or(Self::Float(v as f64))
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<char> for Literal {
    fn from(c: char) -> Self {
        Self::String(c.to_string())
    }
}

impl From<NaiveDate> for Literal {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<serde_json::Value> for Literal {
    fn from(v: serde_json::Value) -> Self {
        Self::from_json(&v)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
