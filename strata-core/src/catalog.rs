use crate::{
    AsValue, ColumnDef, Connection, Error, PreparedCache, Result, RowLabeled, TableColumns, Value,
};
use anyhow::Context;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Name the column introspection statement is prepared under.
pub const COLUMNS_QUERY_NAME: &str = "_colquery";

/// Column introspection over the Postgres system catalog, parameterized by table name.
pub const COLUMNS_QUERY: &str = concat!(
    "SELECT a.attname AS \"name\", ",
    "format_type(t.oid, a.atttypmod) AS db_type, ",
    "pg_get_expr(d.adbin, c.oid) AS \"default\", ",
    "NOT a.attnotnull AS allow_null, ",
    "COALESCE((a.attnum = ANY(i.indkey)), false) AS primary_key ",
    "FROM pg_class c ",
    "INNER JOIN pg_attribute a ON a.attrelid = c.oid ",
    "INNER JOIN pg_type t ON t.oid = a.atttypid ",
    "INNER JOIN pg_namespace n ON n.oid = c.relnamespace ",
    "LEFT OUTER JOIN pg_attrdef d ON (d.adrelid = c.oid AND d.adnum = a.attnum) ",
    "LEFT OUTER JOIN pg_index i ON (i.indrelid = c.oid AND i.indisprimary) ",
    "WHERE NOT a.attisdropped AND a.attnum > 0 AND c.relname = $1 ",
    "AND n.nspname NOT IN ('pg_catalog', 'information_schema') ",
    "AND n.nspname NOT LIKE 'pg\\_toast%' ",
    "ORDER BY a.attnum",
);

/// Per table column metadata, introspected once and cached for the lifetime of the catalog.
///
/// Tables the database does not know yield an empty column list. That result is cached as well,
/// callers treat an empty list as a configuration error instead of asking again.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    tables: RwLock<HashMap<String, Arc<TableColumns>>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cached(&self, table: &str) -> Option<Arc<TableColumns>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
    }

    /// Seed the catalog with known columns. The first definition of a table wins.
    pub fn register(&self, columns: TableColumns) -> Arc<TableColumns> {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(columns.table().to_owned())
            .or_insert_with(|| Arc::new(columns))
            .clone()
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns of `table`, introspecting on the first request.
    pub async fn columns<C: Connection>(
        &self,
        connection: &mut C,
        prepared: &mut PreparedCache,
        table: &str,
    ) -> Result<Arc<TableColumns>> {
        if let Some(columns) = self.cached(table) {
            return Ok(columns);
        }
        let rows = prepared
            .execute(
                connection,
                COLUMNS_QUERY_NAME,
                Some(COLUMNS_QUERY),
                vec![Value::Varchar(Some(table.to_owned()))],
            )
            .await
            .with_context(|| format!("While introspecting the columns of `{}`", table))?;
        let columns = rows
            .into_iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("While decoding the columns of `{}`", table))?;
        if columns.is_empty() {
            log::warn!("Table `{}` has no columns, it probably does not exist", table);
        }
        Ok(self.register(TableColumns::new(table, columns)))
    }
}

fn field<T: AsValue>(row: &RowLabeled, name: &str) -> Result<T> {
    let value = row
        .get_column(name)
        .ok_or_else(|| Error::msg(format!("Column `{}` missing from the catalog row", name)))?;
    T::try_from_value(value.clone())
}

fn column_from_row(row: RowLabeled) -> Result<ColumnDef> {
    let db_type: String = field(&row, "db_type")?;
    Ok(ColumnDef {
        name: field(&row, "name")?,
        value: Value::from_db_type(&db_type),
        db_type,
        default: field(&row, "default")?,
        nullable: field(&row, "allow_null")?,
        primary_key: field(&row, "primary_key")?,
    })
}
