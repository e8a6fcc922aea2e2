//! CAST target types
//!
//! Built-in type names render through the keyword case of the active
//! configuration; user-defined types are identifiers and follow the
//! identifier case and delimiter instead.

use super::expr::Ident;
use crate::error::{Error, Result};
use std::str::FromStr;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Decimal,
    Boolean,
    Char,
    Varchar,
    Text,
    Date,
    Timestamp,
}

impl BuiltinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::DoublePrecision => "double precision",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Varchar => "varchar",
            Self::Text => "text",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
        }
    }

    fn from_keyword(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let ty = match normalized.to_lowercase().as_str() {
            "smallint" | "int2" => Self::SmallInt,
            "integer" | "int" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInt,
            "real" | "float4" => Self::Real,
            "double precision" | "float8" => Self::DoublePrecision,
            "decimal" | "numeric" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "char" | "character" => Self::Char,
            "varchar" | "character varying" => Self::Varchar,
            "text" => Self::Text,
            "date" => Self::Date,
            "timestamp" => Self::Timestamp,
            _ => return None,
        };
        Some(ty)
    }
}

/// Base of a type: built-in or a (possibly schema-qualified) user type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    Builtin(BuiltinType),
    Custom { schema: Option<Ident>, name: Ident },
}

/// A CAST target: base type, optional length/precision modifiers and
/// array dimensions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlType {
    pub name: TypeName,
    pub modifiers: Vec<u32>,
    pub array_dims: usize,
}

impl SqlType {
    pub fn builtin(ty: BuiltinType) -> Self {
        Self {
            name: TypeName::Builtin(ty),
            modifiers: Vec::new(),
            array_dims: 0,
        }
    }

    /// A user-defined type such as an enum or domain
    pub fn custom(name: impl Into<Ident>) -> Self {
        Self {
            name: TypeName::Custom {
                schema: None,
                name: name.into(),
            },
            modifiers: Vec::new(),
            array_dims: 0,
        }
    }

    /// Qualify a user-defined type; built-in types are left as they are
    pub fn with_schema(mut self, schema: impl Into<Ident>) -> Self {
        if let TypeName::Custom { schema: s, .. } = &mut self.name {
            *s = Some(schema.into());
        }
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<u32>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// One more array dimension: `integer` becomes `integer[]`
    pub fn array(mut self) -> Self {
        self.array_dims += 1;
        self
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.name, TypeName::Builtin(_))
    }

    pub fn integer() -> Self {
        Self::builtin(BuiltinType::Integer)
    }

    pub fn bigint() -> Self {
        Self::builtin(BuiltinType::BigInt)
    }

    pub fn text() -> Self {
        Self::builtin(BuiltinType::Text)
    }

    pub fn boolean() -> Self {
        Self::builtin(BuiltinType::Boolean)
    }

    pub fn date() -> Self {
        Self::builtin(BuiltinType::Date)
    }

    pub fn timestamp() -> Self {
        Self::builtin(BuiltinType::Timestamp)
    }

    pub fn varchar(length: u32) -> Self {
        Self::builtin(BuiltinType::Varchar).with_modifiers(vec![length])
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::builtin(BuiltinType::Decimal).with_modifiers(vec![precision, scale])
    }

    /// Modifier suffix and array brackets, e.g. `(10, 2)[]`
    pub(crate) fn suffix(&self) -> String {
        let mut out = String::new();
        if !self.modifiers.is_empty() {
            let modifiers: Vec<String> = self.modifiers.iter().map(u32::to_string).collect();
            out.push('(');
            out.push_str(&modifiers.join(", "));
            out.push(')');
        }
        for _ in 0..self.array_dims {
            out.push_str("[]");
        }
        out
    }
}

impl FromStr for SqlType {
    type Err = Error;

    /// Parse `varchar(20)`, `integer[]` or `app.mood`
    fn from_str(s: &str) -> Result<Self> {
        let mut rest = s.trim();
        let mut array_dims = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped.trim_end();
            array_dims += 1;
        }

        let (base, modifiers) = match rest.split_once('(') {
            Some((base, args)) => {
                let args = args
                    .strip_suffix(')')
                    .ok_or_else(|| Error::invalid_literal(format!("unclosed type modifier in `{}`", s)))?;
                let modifiers = args
                    .split(',')
                    .map(|m| {
                        m.trim()
                            .parse::<u32>()
                            .map_err(|_| Error::invalid_literal(format!("type modifier `{}`", m.trim())))
                    })
                    .collect::<Result<Vec<_>>>()?;
                (base.trim(), modifiers)
            }
            None => (rest, Vec::new()),
        };

        if base.is_empty() {
            return Err(Error::invalid_literal(format!("empty type name `{}`", s)));
        }

        let name = match BuiltinType::from_keyword(base) {
            Some(ty) => TypeName::Builtin(ty),
            None => match base.split_once('.') {
                Some((schema, name)) => TypeName::Custom {
                    schema: Some(Ident::try_new(schema)?),
                    name: Ident::try_new(name)?,
                },
                None => TypeName::Custom {
                    schema: None,
                    name: Ident::try_new(base)?,
                },
            },
        };

        Ok(Self {
            name,
            modifiers,
            array_dims,
        })
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            TypeName::Builtin(ty) => write!(f, "{}", ty.as_sql())?,
            TypeName::Custom { schema, name } => {
                if let Some(schema) = schema {
                    write!(f, "{}.", schema)?;
                }
                write!(f, "{}", name)?;
            }
        }
        write!(f, "{}", self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SqlType::integer().to_string(), "integer");
        assert_eq!(SqlType::varchar(20).to_string(), "varchar(20)");
        assert_eq!(SqlType::decimal(10, 2).to_string(), "decimal(10, 2)");
        assert_eq!(SqlType::text().array().array().to_string(), "text[][]");
        assert_eq!(
            SqlType::custom("mood").with_schema("app").to_string(),
            "app.mood"
        );
    }

    #[test]
    fn test_parse() {
        let t: SqlType = "int4[]".parse().unwrap();
        assert_eq!(t, SqlType::integer().array());

        let t: SqlType = "numeric(12, 4)".parse().unwrap();
        assert_eq!(t, SqlType::decimal(12, 4));

        let t: SqlType = "app.mood".parse().unwrap();
        assert!(!t.is_builtin());
        assert_eq!(t, SqlType::custom("mood").with_schema("app"));

        let t: SqlType = "Double  Precision".parse().unwrap();
        assert_eq!(t, SqlType::builtin(BuiltinType::DoublePrecision));
    }

    #[test]
    fn test_parse_errors() {
        assert!("varchar(20".parse::<SqlType>().is_err());
        assert!("varchar(x)".parse::<SqlType>().is_err());
        assert!("[]".parse::<SqlType>().is_err());
    }
}
