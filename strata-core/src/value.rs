use crate::{AsValue, Error, Result};
use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed column value.
///
/// Every variant but `Null` carries an `Option`, a `None` payload is a typed SQL null. All nulls
/// compare equal regardless of their type, this is what clean/dirty tracking relies on.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    /// Postgres array, the boxed value is the element prototype.
    List(Option<Vec<Value>>, Box<Value>),
    /// Enum labels and other text encoded types the crate does not model.
    Unknown(Option<String>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::List(l, ..), Self::List(r, ..)) => l == r,
            (Self::Unknown(l), Self::Unknown(r)) => l == r,
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None)
            | Value::Uuid(None)
            | Value::List(None, ..)
            | Value::Unknown(None) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Typed null prototype for a type name as rendered by Postgres `format_type`.
    ///
    /// Arrays map to `Value::List` of their element prototype, unrecognized types to
    /// `Value::Unknown`.
    pub fn from_db_type(db_type: &str) -> Value {
        let db_type = db_type.trim().to_ascii_lowercase();
        if let Some(element) = db_type.strip_suffix("[]") {
            return Value::List(None, Box::new(Value::from_db_type(element)));
        }
        let base = db_type.split('(').next().unwrap_or_default().trim();
        match base {
            "boolean" | "bool" => Value::Boolean(None),
            "\"char\"" | "smallint" | "int2" | "smallserial" => Value::Int16(None),
            "integer" | "int" | "int4" | "serial" => Value::Int32(None),
            "oid" | "bigint" | "int8" | "bigserial" => Value::Int64(None),
            "real" | "float4" => Value::Float32(None),
            "double precision" | "float8" => Value::Float64(None),
            "numeric" | "decimal" => Value::Decimal(None),
            "text" | "character varying" | "varchar" | "character" | "char" | "bpchar"
            | "name" | "citext" | "json" | "jsonb" | "xml" => Value::Varchar(None),
            "bytea" => Value::Blob(None),
            "date" => Value::Date(None),
            "uuid" => Value::Uuid(None),
            _ if base.starts_with("timestamp") => {
                if db_type.contains("with time zone") {
                    Value::TimestampWithTimezone(None)
                } else {
                    Value::Timestamp(None)
                }
            }
            _ if base.starts_with("time") && !db_type.contains("with time zone") => {
                Value::Time(None)
            }
            _ => Value::Unknown(None),
        }
    }

    /// Convert this value into the type of `prototype`.
    ///
    /// Nulls stay null, values already of the right type and prototypes without a known type
    /// (`Null`, `Unknown`) pass through unchanged. Text is parsed into the target type.
    pub fn try_as(self, prototype: &Value) -> Result<Value> {
        if self.is_null()
            || matches!(prototype, Value::Null | Value::Unknown(..))
            || (self.same_type(prototype) && !matches!(prototype, Value::List(..)))
        {
            return Ok(self);
        }
        Ok(match prototype {
            Value::Boolean(..) => bool::try_from_value(self)?.as_value(),
            Value::Int16(..) => i16::try_from_value(self)?.as_value(),
            Value::Int32(..) => i32::try_from_value(self)?.as_value(),
            Value::Int64(..) => i64::try_from_value(self)?.as_value(),
            Value::Float32(..) => f32::try_from_value(self)?.as_value(),
            Value::Float64(..) => f64::try_from_value(self)?.as_value(),
            Value::Decimal(..) => Decimal::try_from_value(self)?.as_value(),
            Value::Varchar(..) => String::try_from_value(self)?.as_value(),
            Value::Blob(..) => Vec::<u8>::try_from_value(self)?.as_value(),
            Value::Date(..) => Date::try_from_value(self)?.as_value(),
            Value::Time(..) => Time::try_from_value(self)?.as_value(),
            Value::Timestamp(..) => PrimitiveDateTime::try_from_value(self)?.as_value(),
            Value::TimestampWithTimezone(..) => OffsetDateTime::try_from_value(self)?.as_value(),
            Value::Uuid(..) => Uuid::try_from_value(self)?.as_value(),
            Value::List(_, element) => match self {
                Value::List(Some(items), _) => Value::List(
                    Some(
                        items
                            .into_iter()
                            .map(|v| v.try_as(element))
                            .collect::<Result<_>>()?,
                    ),
                    element.clone(),
                ),
                v => {
                    return Err(Error::msg(format!(
                        "Cannot convert {v:?} to a list of {element:?}"
                    )));
                }
            },
            Value::Null | Value::Unknown(..) => self,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => v.fmt(f),
            Value::Int16(Some(v)) => v.fmt(f),
            Value::Int32(Some(v)) => v.fmt(f),
            Value::Int64(Some(v)) => v.fmt(f),
            Value::Float32(Some(v)) => v.fmt(f),
            Value::Float64(Some(v)) => v.fmt(f),
            Value::Decimal(Some(v)) => v.fmt(f),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => f.write_str(v),
            Value::Blob(Some(v)) => {
                f.write_str("\\x")?;
                v.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
            Value::Date(Some(v)) => v.fmt(f),
            Value::Time(Some(v)) => v.fmt(f),
            Value::Timestamp(Some(v)) => v.fmt(f),
            Value::TimestampWithTimezone(Some(v)) => v.fmt(f),
            Value::Uuid(Some(v)) => v.fmt(f),
            Value::List(Some(v), ..) => {
                f.write_str("{")?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    v.fmt(f)?;
                }
                f.write_str("}")
            }
            _ => f.write_str("NULL"),
        }
    }
}
