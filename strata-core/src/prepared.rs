use crate::{Connection, Error, OrmError, QueryStage, Result, RowLabeled, Value, truncate_long};
use std::collections::HashSet;

/// Names of the statements already prepared on one connection.
///
/// The SQL text passed to [`PreparedCache::execute`] is only used the first time a name is seen,
/// every later call executes whatever was prepared under that name. A name must therefore always
/// denote the same statement shape. The registry belongs to a single connection and must be
/// cleared when the connection is replaced, the server forgets its plans.
#[derive(Debug, Default)]
pub struct PreparedCache {
    prepared: HashSet<String>,
}

impl PreparedCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_prepared(&self, name: &str) -> bool {
        self.prepared.contains(name)
    }

    pub fn len(&self) -> usize {
        self.prepared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prepared.is_empty()
    }

    /// Forget every prepared name.
    pub fn clear(&mut self) {
        self.prepared.clear();
    }

    /// Prepare `sql` under `name` unless already done, then execute it with `params`.
    pub async fn execute<C: Connection>(
        &mut self,
        connection: &mut C,
        name: &str,
        sql: Option<&str>,
        params: Vec<Value>,
    ) -> Result<Vec<RowLabeled>> {
        if !self.is_prepared(name) {
            let Some(sql) = sql else {
                return Err(query_error(
                    QueryStage::Prepare,
                    name,
                    "the statement was never prepared on this connection and no SQL was given",
                ));
            };
            log::debug!("Preparing query ({}): {}", name, truncate_long!(sql));
            connection
                .prepare(name, sql)
                .await
                .map_err(|e| query_error(QueryStage::Prepare, name, format!("{:#}", e)))?;
            self.prepared.insert(name.to_owned());
        }
        log::debug!("Executing query {} with {} parameters", name, params.len());
        connection
            .fetch_all(name, params)
            .await
            .map_err(|e| query_error(QueryStage::Execute, name, format!("{:#}", e)))
    }
}

fn query_error(stage: QueryStage, name: &str, detail: impl Into<String>) -> Error {
    OrmError::Query {
        stage,
        statement: Some(name.to_owned()),
        detail: detail.into(),
    }
    .into_logged()
}
