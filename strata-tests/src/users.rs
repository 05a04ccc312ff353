use crate::silent_logs;
use rust_decimal::Decimal;
use std::str::FromStr;
use strata::{Connection, OrmError, SaveOutcome, Session, Value};
use time::{Date, Month};

pub async fn introspection<C: Connection>(session: &mut Session<C>) {
    assert_eq!(
        session
            .column_names("User")
            .await
            .expect("Could not read the columns of users"),
        ["active", "balance", "born", "email", "id", "lastSeen", "name"]
    );
    assert_eq!(
        session
            .primary_keys("PostTag")
            .await
            .expect("Could not read the primary keys of posts_tags"),
        ["post_id", "tag_id"]
    );
    let columns = session.columns("User").await.expect("Columns of users");
    let name = columns.get("name").expect("Column name");
    assert_eq!(name.db_type, "character varying(60)");
    assert!(!name.nullable);
    assert_eq!(name.value, Value::Varchar(None));
    let id = columns.get("id").expect("Column id");
    assert!(id.primary_key);
    assert!(id.default.as_deref().is_some_and(|v| v.starts_with("nextval")));
    assert!(matches!(
        columns.get("lastSeen").expect("Column lastSeen").value,
        Value::Timestamp(None)
    ));

    silent_logs! {
        let error = session
            .columns("Ghost")
            .await
            .expect_err("A missing table has no columns");
        assert!(matches!(OrmError::of(&error), Some(OrmError::Configuration(..))));
    }
}

pub async fn users<C: Connection>(session: &mut Session<C>) {
    let mut user = session.create("User").await.expect("Could not create a user");
    assert!(!user.is_persisted());
    user.set("name", "Ada Lovelace").expect("Set name");
    user.set("email", "ada@example.com").expect("Set email");
    user.set("active", "on").expect("Set active");
    user.set("balance", "12.50").expect("Set balance");
    user.set("born", "1815-12-10").expect("Set born");
    assert_eq!(
        session.save(&mut user).await.expect("Could not insert"),
        SaveOutcome::Inserted
    );
    assert!(user.is_persisted());
    assert_eq!(user.modified_columns().count(), 0);
    let id: i32 = user.get_as("id").expect("Generated id");
    assert!(id > 0);
    assert_eq!(user.get("active").unwrap(), &Value::Boolean(Some(true)));
    assert_eq!(
        user.get_as::<Decimal>("balance").unwrap(),
        Decimal::from_str("12.50").unwrap()
    );
    assert_eq!(
        user.get_as::<Date>("born").unwrap(),
        Date::from_calendar_date(1815, Month::December, 10).unwrap()
    );

    assert_eq!(
        session.save(&mut user).await.expect("Could not save"),
        SaveOutcome::Unchanged
    );

    user.set("name", "Augusta Ada King").expect("Set name");
    user.set("lastSeen", "1852-11-27 10:30:00").expect("Set lastSeen");
    assert!(user.is_modified("name").unwrap());
    assert_eq!(
        session.save(&mut user).await.expect("Could not update"),
        SaveOutcome::Updated
    );
    assert!(!user.is_modified("name").unwrap());

    let loaded = session.load("User", id).await.expect("Could not load");
    assert_eq!(loaded.get_as::<String>("name").unwrap(), "Augusta Ada King");
    assert_eq!(loaded, user);

    user.set_all_from_input([("name", "Ada"), ("_check_active", "0")])
        .expect("Set from input");
    session.save(&mut user).await.expect("Could not save input");
    let loaded = session.load("User", id).await.expect("Could not reload");
    assert_eq!(loaded.get_as::<bool>("active").unwrap(), false);
    assert_eq!(loaded.get_as::<String>("name").unwrap(), "Ada");

    silent_logs! {
        let error = session
            .load("User", i32::MAX)
            .await
            .expect_err("No such user");
        assert!(matches!(OrmError::of(&error), Some(OrmError::NotFound { .. })));

        let error = user.set("balance", "a lot").expect_err("Not a number");
        assert!(matches!(OrmError::of(&error), Some(OrmError::InvalidValue { .. })));

        let error = session
            .load_composite("PostTag", &[Value::Int32(Some(1))])
            .await
            .expect_err("Two key values are needed");
        assert!(matches!(OrmError::of(&error), Some(OrmError::Configuration(..))));
    }
}
