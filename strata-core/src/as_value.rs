use crate::{Error, Result, Value, truncate_long};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `try_from_value` accepts the canonical variant for the type, the lossless numeric widenings,
/// range checked narrowings and text (`Varchar` or `Unknown`) which gets parsed. Text is what
/// form style input and untyped drivers produce, hence the parsing path.
///
/// ```rust
/// use strata_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The typed null of this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

fn parse_error<T>(input: &str, error: impl std::fmt::Display) -> Error {
    Error::msg(format!(
        "Cannot parse `{}` as {}: {error}",
        truncate_long!(input),
        any::type_name::<T>()
    ))
}

fn parse_text<T>(input: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(input.trim()).map_err(|e| parse_error::<T>(input, e))
}

fn narrow<S, T>(value: S) -> Result<T>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| {
        Error::msg(format!(
            "Value {value}: {} is out of range for {}",
            any::type_name::<S>(),
            any::type_name::<T>()
        ))
    })
}

fn decimal_to<T>(v: Decimal, convert: impl FnOnce(&Decimal) -> Option<T>) -> Result<T> {
    let error = Error::msg(format!(
        "Value {v}: Decimal does not fit into {}",
        any::type_name::<T>()
    ));
    if !v.is_integer() {
        return Err(error.context("The value is not an integer"));
    }
    convert(&v).ok_or(error)
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $($pat_rest => $expr_rest,)*
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => parse_text(v),
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    i16,
    Value::Int16,
    Value::Int32(Some(v)) => narrow(v),
    Value::Int64(Some(v)) => narrow(v),
    Value::Decimal(Some(v)) => decimal_to(v, ToPrimitive::to_i16),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => narrow(v),
    Value::Decimal(Some(v)) => decimal_to(v, ToPrimitive::to_i32),
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Decimal(Some(v)) => decimal_to(v, ToPrimitive::to_i64),
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Float64(Some(v)) => Ok(v as f32),
    Value::Decimal(Some(v)) => v.to_f32().ok_or_else(|| conversion_error::<f32>(&Value::Decimal(Some(v)))),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => Ok(v as f64),
    Value::Float32(Some(v)) => Ok(v.into()),
    Value::Decimal(Some(v)) => v.to_f64().ok_or_else(|| conversion_error::<f64>(&Value::Decimal(Some(v)))),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => Ok(v.into()),
    Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(|| conversion_error::<Decimal>(&Value::Float32(Some(v)))),
    Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| conversion_error::<Decimal>(&Value::Float64(Some(v)))),
);
impl_as_value!(Uuid, Value::Uuid);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                match v.trim().to_ascii_lowercase().as_str() {
                    "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
                    "f" | "false" | "n" | "no" | "off" | "0" | "" => Ok(false),
                    _ => Err(parse_error::<bool>(v, "not a boolean literal")),
                }
            }
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Blob(..) => Err(conversion_error::<Self>(&value)),
            v if v.is_null() => Err(conversion_error::<Self>(&v)),
            v => Ok(v.to_string()),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! impl_as_value_temporal {
    ($source:ty, $destination:path, $parse:expr) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        let parse: fn(&str) -> std::result::Result<Self, time::error::Parse> =
                            $parse;
                        parse(v.trim()).map_err(|e| parse_error::<Self>(v, e))
                    }
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_temporal!(Date, Value::Date, |v| Date::parse(
    v,
    format_description!("[year]-[month]-[day]")
));
impl_as_value_temporal!(Time, Value::Time, |v| Time::parse(
    v,
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]")
));
impl_as_value_temporal!(PrimitiveDateTime, Value::Timestamp, |v| {
    PrimitiveDateTime::parse(
        &v.replacen('T', " ", 1),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
    )
});
impl_as_value_temporal!(OffsetDateTime, Value::TimestampWithTimezone, |v| {
    OffsetDateTime::parse(&v.replacen(' ', "T", 1), &Rfc3339)
});

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}
