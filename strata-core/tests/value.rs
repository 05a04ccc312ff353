#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use strata_core::{AsValue, Value};
    use time::{Date, Month, PrimitiveDateTime, Time};
    use uuid::Uuid;

    #[test]
    fn nulls_are_equal() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Int32(None), Value::Varchar(None));
        assert_eq!(Value::Null, Value::Boolean(None));
        assert_ne!(Value::Int32(Some(0)), Value::Int32(None));
        assert_ne!(Value::Int32(Some(1)), Value::Int64(Some(1)));
        assert!(Value::Decimal(None).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
    }

    #[test]
    fn prototypes_from_database_types() {
        assert_eq!(format!("{:?}", Value::from_db_type("integer")), "Int32(None)");
        assert!(matches!(Value::from_db_type("smallint"), Value::Int16(None)));
        assert!(matches!(Value::from_db_type("bigint"), Value::Int64(None)));
        assert!(matches!(Value::from_db_type("boolean"), Value::Boolean(None)));
        assert!(matches!(Value::from_db_type("real"), Value::Float32(None)));
        assert!(matches!(
            Value::from_db_type("double precision"),
            Value::Float64(None)
        ));
        assert!(matches!(
            Value::from_db_type("numeric(10,2)"),
            Value::Decimal(None)
        ));
        assert!(matches!(
            Value::from_db_type("character varying(60)"),
            Value::Varchar(None)
        ));
        assert!(matches!(Value::from_db_type("character(2)"), Value::Varchar(None)));
        assert!(matches!(Value::from_db_type("text"), Value::Varchar(None)));
        assert!(matches!(Value::from_db_type("bytea"), Value::Blob(None)));
        assert!(matches!(Value::from_db_type("date"), Value::Date(None)));
        assert!(matches!(
            Value::from_db_type("time without time zone"),
            Value::Time(None)
        ));
        assert!(matches!(
            Value::from_db_type("time with time zone"),
            Value::Unknown(None)
        ));
        assert!(matches!(
            Value::from_db_type("timestamp(3) without time zone"),
            Value::Timestamp(None)
        ));
        assert!(matches!(
            Value::from_db_type("timestamp with time zone"),
            Value::TimestampWithTimezone(None)
        ));
        assert!(matches!(Value::from_db_type("uuid"), Value::Uuid(None)));
        assert!(matches!(Value::from_db_type("tsvector"), Value::Unknown(None)));
        assert!(matches!(Value::from_db_type("jsonb"), Value::Varchar(None)));
        assert!(matches!(Value::from_db_type("json"), Value::Varchar(None)));
        assert!(matches!(Value::from_db_type("xml"), Value::Varchar(None)));
        assert!(matches!(Value::from_db_type("\"char\""), Value::Int16(None)));
        assert!(matches!(Value::from_db_type("oid"), Value::Int64(None)));
    }

    #[test]
    fn array_prototypes() {
        assert!(matches!(
            Value::from_db_type("integer[]"),
            Value::List(None, element) if matches!(*element, Value::Int32(None))
        ));
        assert!(matches!(
            Value::from_db_type("character varying(20)[]"),
            Value::List(None, element) if matches!(*element, Value::Varchar(None))
        ));
        assert!(matches!(
            Value::from_db_type("text[][]"),
            Value::List(None, element) if matches!(*element, Value::List(None, _))
        ));
    }

    #[test]
    fn list_coercion() {
        let prototype = Value::from_db_type("bigint[]");
        let list = Value::List(
            Some(vec![Value::Int32(Some(1)), "2".into(), Value::Null]),
            Box::new(Value::Int32(None)),
        );
        let coerced = list.try_as(&prototype).unwrap();
        assert_eq!(
            coerced,
            Value::List(
                Some(vec![Value::Int64(Some(1)), Value::Int64(Some(2)), Value::Null]),
                Box::new(Value::Int64(None))
            )
        );
        assert_eq!(coerced.to_string(), "{1,2,NULL}");
        assert!(
            Value::List(Some(vec!["x".into()]), Box::new(Value::Varchar(None)))
                .try_as(&prototype)
                .is_err()
        );
        assert!(Value::Int64(Some(1)).try_as(&prototype).is_err());
        assert!(Value::Varchar(None).try_as(&prototype).unwrap().is_null());
    }

    #[test]
    fn coercion_to_prototype() {
        let int = Value::Int32(None);
        assert_eq!(
            Value::Varchar(Some(" 42 ".into())).try_as(&int).unwrap(),
            Value::Int32(Some(42))
        );
        assert_eq!(
            Value::Int16(Some(3)).try_as(&int).unwrap(),
            Value::Int32(Some(3))
        );
        assert!(Value::Int64(Some(i64::MAX)).try_as(&int).is_err());
        assert!(Value::Varchar(Some("4.2".into())).try_as(&int).is_err());
        assert!(Value::Varchar(None).try_as(&int).unwrap().is_null());

        let unknown = Value::Unknown(None);
        assert_eq!(
            Value::Boolean(Some(true)).try_as(&unknown).unwrap(),
            Value::Boolean(Some(true))
        );
        assert_eq!(
            Value::Int32(Some(5)).try_as(&Value::Varchar(None)).unwrap(),
            Value::Varchar(Some("5".into()))
        );
        assert_eq!(
            Value::Varchar(Some("12.50".into()))
                .try_as(&Value::Decimal(None))
                .unwrap(),
            Value::Decimal(Some(Decimal::from_str("12.50").unwrap()))
        );
        assert!(
            Value::Decimal(Some(Decimal::from_str("1.5").unwrap()))
                .try_as(&int)
                .is_err()
        );
    }

    #[test]
    fn booleans_from_text() {
        for truthy in ["t", "TRUE", "yes", "on", "1"] {
            assert!(bool::try_from_value(truthy.into()).unwrap(), "{truthy}");
        }
        for falsy in ["f", "false", "No", "off", "0", ""] {
            assert!(!bool::try_from_value(falsy.into()).unwrap(), "{falsy}");
        }
        assert!(bool::try_from_value("maybe".into()).is_err());
        assert!(bool::try_from_value(Value::Int32(Some(2))).unwrap());
    }

    #[test]
    fn temporal_text() {
        assert_eq!(
            Date::try_from_value("2024-02-29".into()).unwrap(),
            Date::from_calendar_date(2024, Month::February, 29).unwrap()
        );
        assert!(Date::try_from_value("2023-02-29".into()).is_err());
        assert_eq!(
            Time::try_from_value("10:30:15.25".into()).unwrap(),
            Time::from_hms_milli(10, 30, 15, 250).unwrap()
        );
        let expected = PrimitiveDateTime::new(
            Date::from_calendar_date(1969, Month::July, 20).unwrap(),
            Time::from_hms(20, 17, 40).unwrap(),
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value("1969-07-20 20:17:40".into()).unwrap(),
            expected
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value("1969-07-20T20:17:40".into()).unwrap(),
            expected
        );
    }

    #[test]
    fn options_and_uuids() {
        assert_eq!(Some(5i64).as_value(), Value::Int64(Some(5)));
        assert_eq!(None::<i64>.as_value(), Value::Int64(None));
        assert!(matches!(None::<String>.as_value(), Value::Varchar(None)));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(Some(9))).unwrap(),
            Some(9)
        );
        let id = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Uuid::try_from_value("67e55044-10b1-426f-9247-bb680e5fe0c8".into()).unwrap(),
            id
        );
        assert_eq!(
            id.as_value().to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int32(None).to_string(), "NULL");
        assert_eq!(Value::Float64(Some(1.5)).to_string(), "1.5");
        assert_eq!(Value::Varchar(Some("hi".into())).to_string(), "hi");
        assert_eq!(
            Value::Blob(Some(vec![0xde, 0xad].into_boxed_slice())).to_string(),
            "\\xdead"
        );
    }
}
