use bytes::BytesMut;
use postgres_types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use rust_decimal::Decimal;
use std::error::Error;
use strata_core::Value;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Carries a [`Value`] across the tokio-postgres encoding boundary, both ways.
#[derive(Debug)]
pub(crate) struct ValueHolder(pub(crate) Value);

impl From<Value> for ValueHolder {
    fn from(value: Value) -> Self {
        ValueHolder(value)
    }
}

impl<'a> FromSql<'a> for ValueHolder {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Self::from_sql_nullable(ty, Some(raw))
    }
    fn from_sql_null(ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Self::from_sql_nullable(ty, None)
    }
    fn from_sql_nullable(
        ty: &Type,
        raw: Option<&'a [u8]>,
    ) -> Result<Self, Box<dyn Error + Sync + Send>> {
        match ty.kind() {
            Kind::Array(member) => {
                let items = match raw {
                    Some(raw) => Some(
                        Vec::<ValueHolder>::from_sql(ty, raw)?
                            .into_iter()
                            .map(|v| v.0)
                            .collect(),
                    ),
                    None => None,
                };
                return Ok(Value::List(items, Box::new(postgres_type_to_value(member))).into());
            }
            // Enum values travel as their label
            Kind::Enum(..) => {
                let label = raw.map(std::str::from_utf8).transpose()?.map(String::from);
                return Ok(Value::Unknown(label).into());
            }
            Kind::Domain(inner) => return Self::from_sql_nullable(inner, raw),
            _ => {}
        }
        macro_rules! to_value {
            ($ty_var:ident, $raw:ident, $($($ty:path)|+ => ( $value:path, $source:ty ) ,)+) => {
                match *$ty_var {
                    $($($ty)|+ => $value(if let Some($raw) = $raw { Some(<$source>::from_sql($ty_var, $raw)?.into()) } else { None }),)+
                    _ => {
                        if $raw.is_some() {
                            return Err(format!("Cannot decode values of type `{}`", $ty_var).into());
                        }
                        Value::Null
                    }
                }
            };
        }
        let value = to_value!(ty, raw,
            Type::BOOL => (Value::Boolean, bool),
            Type::CHAR => (Value::Int16, i8),
            Type::INT2 => (Value::Int16, i16),
            Type::INT4 => (Value::Int32, i32),
            Type::INT8 => (Value::Int64, i64),
            Type::OID => (Value::Int64, u32),
            Type::FLOAT4 => (Value::Float32, f32),
            Type::FLOAT8 => (Value::Float64, f64),
            Type::NUMERIC => (Value::Decimal, Decimal),
            Type::VARCHAR
            | Type::TEXT
            | Type::NAME
            | Type::BPCHAR
            | Type::JSON
            | Type::XML => (Value::Varchar, String),
            Type::JSONB => (Value::Varchar, JsonbText),
            Type::BYTEA => (Value::Blob, Vec<u8>),
            Type::DATE => (Value::Date, Date),
            Type::TIME => (Value::Time, Time),
            Type::TIMESTAMP => (Value::Timestamp, PrimitiveDateTime),
            Type::TIMESTAMPTZ => (Value::TimestampWithTimezone, OffsetDateTime),
            Type::UUID => (Value::Uuid, Uuid),
            Type::UNKNOWN => (Value::Unknown, String),
        );
        Ok(value.into())
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl ToSql for ValueHolder {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>>
    where
        Self: Sized,
    {
        match &self.0 {
            Value::Null => None::<String>.to_sql(ty, out),
            Value::Boolean(v) => v.to_sql(ty, out),
            Value::Int16(v) if *ty == Type::CHAR => v.map(i8::try_from).transpose()?.to_sql(ty, out),
            Value::Int16(v) => v.to_sql(ty, out),
            Value::Int32(v) => v.to_sql(ty, out),
            Value::Int64(v) if *ty == Type::OID => v.map(u32::try_from).transpose()?.to_sql(ty, out),
            Value::Int64(v) => v.to_sql(ty, out),
            Value::Float32(v) => v.to_sql(ty, out),
            Value::Float64(v) => v.to_sql(ty, out),
            Value::Decimal(v) => v.to_sql(ty, out),
            Value::Varchar(v) | Value::Unknown(v) => {
                let Some(v) = v else {
                    return Ok(IsNull::Yes);
                };
                if *ty == Type::JSONB {
                    out.extend_from_slice(&[JSONB_VERSION]);
                } else if !accepts_text(ty) {
                    return Err(format!("Cannot encode text as a value of type `{}`", ty).into());
                }
                out.extend_from_slice(v.as_bytes());
                Ok(IsNull::No)
            }
            Value::Blob(v) => v.as_deref().to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampWithTimezone(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::List(v, ..) => {
                if !matches!(ty.kind(), Kind::Array(..)) {
                    return Err(format!("Cannot encode a list as a value of type `{}`", ty).into());
                }
                v.as_ref()
                    .map(|v| v.iter().cloned().map(ValueHolder).collect::<Vec<_>>())
                    .to_sql(ty, out)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool
    where
        Self: Sized,
    {
        true
    }

    to_sql_checked!();
}

const JSONB_VERSION: u8 = 1;

/// Text of a jsonb value, without the leading format version.
struct JsonbText(String);

impl<'a> FromSql<'a> for JsonbText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        match raw.split_first() {
            Some((&JSONB_VERSION, text)) => Ok(JsonbText(std::str::from_utf8(text)?.to_owned())),
            Some((version, ..)) => Err(format!("Unsupported jsonb version {}", version).into()),
            None => Err("Empty jsonb value".into()),
        }
    }
    fn accepts(ty: &Type) -> bool {
        *ty == Type::JSONB
    }
}

impl From<JsonbText> for String {
    fn from(value: JsonbText) -> Self {
        value.0
    }
}

/// Types whose binary format is the plain text.
fn accepts_text(ty: &Type) -> bool {
    <String as ToSql>::accepts(ty)
        || matches!(*ty, Type::JSON | Type::XML)
        || matches!(ty.kind(), Kind::Enum(..))
}

/// Typed null matching a parameter type inferred by the server, parameters are coerced to it
/// before binding.
pub fn postgres_type_to_value(ty: &Type) -> Value {
    match ty.kind() {
        Kind::Array(member) => return Value::List(None, Box::new(postgres_type_to_value(member))),
        Kind::Enum(..) => return Value::Unknown(None),
        Kind::Domain(inner) => return postgres_type_to_value(inner),
        _ => {}
    }
    match *ty {
        Type::BOOL => Value::Boolean(None),
        Type::CHAR | Type::INT2 => Value::Int16(None),
        Type::INT4 => Value::Int32(None),
        Type::INT8 | Type::OID => Value::Int64(None),
        Type::FLOAT4 => Value::Float32(None),
        Type::FLOAT8 => Value::Float64(None),
        Type::NUMERIC => Value::Decimal(None),
        Type::VARCHAR
        | Type::TEXT
        | Type::NAME
        | Type::BPCHAR
        | Type::JSON
        | Type::JSONB
        | Type::XML => Value::Varchar(None),
        Type::BYTEA => Value::Blob(None),
        Type::DATE => Value::Date(None),
        Type::TIME => Value::Time(None),
        Type::TIMESTAMP => Value::Timestamp(None),
        Type::TIMESTAMPTZ => Value::TimestampWithTimezone(None),
        Type::UUID => Value::Uuid(None),
        _ => Value::Null,
    }
}
