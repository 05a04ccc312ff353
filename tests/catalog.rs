mod mock;

#[cfg(test)]
mod tests {
    use crate::mock::{MockConnection, registry, session};
    use std::sync::Arc;
    use strata::{
        COLUMNS_QUERY_NAME, ColumnDef, IdentifierQuoter, OrmError, SchemaCatalog, Session,
        TableColumns, Value,
    };

    #[tokio::test]
    async fn columns_are_introspected_once() {
        let mut session = session();
        let first = session.columns("User").await.expect("Columns of users");
        let second = session.columns("User").await.expect("Cached columns of users");
        assert!(Arc::ptr_eq(&first, &second));
        let connection = session.connection();
        assert_eq!(connection.executions_of(COLUMNS_QUERY_NAME), 1);
        assert_eq!(connection.prepared.len(), 1);
        assert_eq!(connection.prepared[0].0, COLUMNS_QUERY_NAME);
        assert_eq!(
            connection.executed[0].1,
            [Value::Varchar(Some("users".into()))]
        );

        session.columns("Post").await.expect("Columns of posts");
        let connection = session.connection();
        assert_eq!(connection.executions_of(COLUMNS_QUERY_NAME), 2);
        assert_eq!(connection.prepared.len(), 1);
    }

    #[tokio::test]
    async fn column_definitions() {
        let mut session = session();
        let columns = session.columns("User").await.unwrap();
        assert_eq!(columns.table(), "users");
        assert_eq!(columns.len(), 4);
        let id = columns.get("id").unwrap();
        assert!(id.primary_key);
        assert!(!id.nullable);
        assert_eq!(id.default.as_deref(), Some("nextval('id_seq'::regclass)"));
        assert_eq!(id.value, Value::Int32(None));
        assert!(matches!(id.value, Value::Int32(None)));
        let email = columns.get("email").unwrap();
        assert!(email.nullable);
        assert_eq!(email.default, None);
        assert!(matches!(email.value, Value::Varchar(None)));
        assert!(matches!(
            columns.get("active").unwrap().value,
            Value::Boolean(None)
        ));
        assert_eq!(columns.position("email"), Some(2));
        assert_eq!(
            session.column_names("User").await.unwrap(),
            ["active", "email", "id", "name"]
        );
        assert_eq!(session.primary_keys("User").await.unwrap(), ["id"]);
        assert_eq!(
            session.primary_keys("PostTag").await.unwrap(),
            ["post_id", "tag_id"]
        );
    }

    #[tokio::test]
    async fn missing_table_is_remembered() {
        let mut session = session();
        let error = session.columns("Ghost").await.expect_err("No such table");
        assert!(matches!(
            OrmError::of(&error),
            Some(OrmError::Configuration(..))
        ));
        let error = session.columns("Ghost").await.expect_err("Still no table");
        assert!(matches!(
            OrmError::of(&error),
            Some(OrmError::Configuration(..))
        ));
        assert_eq!(session.connection().executions_of(COLUMNS_QUERY_NAME), 1);
        assert!(session.catalog().cached("ghosts").is_some_and(|v| v.is_empty()));
    }

    #[tokio::test]
    async fn unknown_entity_type() {
        let mut session = session();
        let error = session.columns("Nobody").await.expect_err("Not registered");
        assert!(matches!(
            OrmError::of(&error),
            Some(OrmError::Configuration(..))
        ));
        assert!(session.connection().executed.is_empty());
    }

    #[tokio::test]
    async fn registered_columns_skip_introspection() {
        let catalog = Arc::new(SchemaCatalog::new());
        catalog.register(TableColumns::new(
            "users",
            [
                ColumnDef::new("id", "bigint").primary_key(),
                ColumnDef::new("name", "text").not_null(),
            ],
        ));
        let mut session = Session::with_caches(
            MockConnection::new(),
            registry(),
            catalog.clone(),
            Arc::new(IdentifierQuoter::new()),
        );
        let columns = session.columns("User").await.unwrap();
        assert_eq!(columns.len(), 2);
        assert!(matches!(columns.get("id").unwrap().value, Value::Int64(None)));
        assert!(session.connection().executed.is_empty());

        // First definition wins
        catalog.register(TableColumns::new("users", Vec::<ColumnDef>::new()));
        assert_eq!(catalog.cached("users").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn catalog_shared_between_sessions() {
        let catalog = Arc::new(SchemaCatalog::new());
        let quoter = Arc::new(IdentifierQuoter::new());
        let mut first = Session::with_caches(
            MockConnection::new(),
            registry(),
            catalog.clone(),
            quoter.clone(),
        );
        let mut second =
            Session::with_caches(MockConnection::new(), registry(), catalog.clone(), quoter);
        first.columns("Tag").await.unwrap();
        second.columns("Tag").await.unwrap();
        assert_eq!(first.connection().executions_of(COLUMNS_QUERY_NAME), 1);
        assert_eq!(second.connection().executions_of(COLUMNS_QUERY_NAME), 0);
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn reconnect_keeps_the_catalog() {
        let mut session = session();
        session.columns("User").await.unwrap();
        assert!(session.prepared().is_prepared(COLUMNS_QUERY_NAME));
        session
            .reconnect("mock://again".into())
            .await
            .expect("Could not reconnect");
        assert!(session.prepared().is_empty());
        session.columns("User").await.unwrap();
        assert!(session.connection().executed.is_empty());
        session.columns("Post").await.unwrap();
        assert_eq!(session.connection().prepared.len(), 1);
    }
}
