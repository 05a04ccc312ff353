//! Scripted in-memory connection: answers the column introspection from a fixed schema and
//! everything else through a responder closure, recording what was prepared and executed.
#![allow(dead_code)]

use std::{borrow::Cow, collections::HashMap, sync::Arc};
use strata::{
    COLUMNS_QUERY_NAME, Connection, Error, ModelRegistry, Result, RowLabeled, Session, Value,
    stream::{self, Stream},
};

type Responder = Box<dyn FnMut(&str, &[Value]) -> Result<Vec<RowLabeled>> + Send>;

pub struct MockConnection {
    pub prepared: Vec<(String, String)>,
    pub executed: Vec<(String, Vec<Value>)>,
    pub fail_prepare: bool,
    statements: HashMap<String, String>,
    responder: Responder,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            prepared: Vec::new(),
            executed: Vec::new(),
            fail_prepare: false,
            statements: HashMap::new(),
            responder: Box::new(|_, _| Ok(Vec::new())),
        }
    }

    pub fn respond(
        &mut self,
        responder: impl FnMut(&str, &[Value]) -> Result<Vec<RowLabeled>> + Send + 'static,
    ) {
        self.responder = Box::new(responder);
    }

    /// Names executed, in order, the column introspection excluded.
    pub fn executed_names(&self) -> Vec<&str> {
        self.executed
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|v| *v != COLUMNS_QUERY_NAME)
            .collect()
    }

    pub fn executions_of(&self, name: &str) -> usize {
        self.executed.iter().filter(|(v, _)| v == name).count()
    }

    pub fn sql_of(&self, name: &str) -> Option<&str> {
        self.statements.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.prepared.clear();
        self.executed.clear();
    }
}

impl Connection for MockConnection {
    async fn connect(url: Cow<'static, str>) -> Result<Self> {
        if !url.starts_with("mock://") {
            return Err(Error::msg(format!("Mock url expected, got `{}`", url)));
        }
        Ok(Self::new())
    }

    async fn prepare(&mut self, name: &str, sql: &str) -> Result<()> {
        if self.fail_prepare {
            return Err(Error::msg(format!("syntax error near `{}`", sql)));
        }
        self.prepared.push((name.to_owned(), sql.to_owned()));
        self.statements.insert(name.to_owned(), sql.to_owned());
        Ok(())
    }

    fn execute_prepared(
        &mut self,
        name: &str,
        params: Vec<Value>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        let result = if !self.statements.contains_key(name) {
            Err(Error::msg(format!("prepared statement \"{}\" does not exist", name)))
        } else {
            self.executed.push((name.to_owned(), params.clone()));
            if name == COLUMNS_QUERY_NAME {
                Ok(catalog(&params))
            } else {
                (self.responder)(name, &params)
            }
        };
        let items: Vec<Result<RowLabeled>> = match result {
            Ok(rows) => rows.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    }
}

/// Builds a labeled row.
pub fn row<const N: usize>(values: [(&str, Value); N]) -> RowLabeled {
    values.into_iter().collect()
}

fn column(name: &str, db_type: &str, nullable: bool, primary_key: bool) -> RowLabeled {
    row([
        ("name", name.into()),
        ("db_type", db_type.into()),
        (
            "default",
            if primary_key && db_type == "integer" {
                format!("nextval('{}_seq'::regclass)", name).into()
            } else {
                Value::Varchar(None)
            },
        ),
        ("allow_null", nullable.into()),
        ("primary_key", primary_key.into()),
    ])
}

fn catalog(params: &[Value]) -> Vec<RowLabeled> {
    let table = match params.first() {
        Some(Value::Varchar(Some(v))) => v.as_str(),
        _ => "",
    };
    match table {
        "users" => vec![
            column("id", "integer", false, true),
            column("name", "character varying(60)", false, false),
            column("email", "text", true, false),
            column("active", "boolean", true, false),
        ],
        "posts" => vec![
            column("id", "integer", false, true),
            column("user_id", "integer", true, false),
            column("title", "text", false, false),
            column("body", "text", true, false),
        ],
        "tags" => vec![
            column("id", "integer", false, true),
            column("label", "text", false, false),
        ],
        "posts_tags" => vec![
            column("post_id", "integer", false, true),
            column("tag_id", "integer", false, true),
        ],
        "counters" => vec![column("id", "bigint", false, true)],
        "OrderItems" => vec![
            column("id", "integer", false, true),
            column("unitPrice", "numeric(10,2)", true, false),
            column("Note", "text", true, false),
        ],
        _ => vec![],
    }
}

pub fn registry() -> Arc<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    registry
        .associate_table("User", "users")
        .associate_table("Post", "posts")
        .associate_table("Tag", "tags")
        .associate_table("PostTag", "posts_tags")
        .associate_table("Counter", "counters")
        .associate_table("OrderItem", "OrderItems")
        .associate_table("Ghost", "ghosts")
        .one_to_many("User", "posts", "Post")
        .many_to_one("Post", "author", "User")
        .many_to_many("Post", "tags", "Tag")
        .many_to_many("User", "tags", "Tag");
    Arc::new(registry)
}

pub fn session() -> Session<MockConnection> {
    strata_tests::init_logs();
    Session::new(MockConnection::new(), registry())
}

pub fn user(id: i32, name: &str) -> RowLabeled {
    row([
        ("id", id.into()),
        ("name", name.into()),
        ("email", Value::Varchar(None)),
        ("active", true.into()),
    ])
}

pub fn post(id: i32, user_id: Option<i32>, title: &str) -> RowLabeled {
    row([
        ("id", id.into()),
        ("user_id", user_id.into()),
        ("title", title.into()),
        ("body", Value::Varchar(None)),
    ])
}
