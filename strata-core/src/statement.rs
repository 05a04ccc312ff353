use crate::{
    Entity, IdentifierQuoter, OrmError, Result, Statement, TableColumns, Value,
    association_statement_name, foreign_key_column, join_table_name, separated_by,
};
use std::{fmt::Write, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    ASC,
    DESC,
}

/// A sort entry of a page: a column and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered {
    pub column: String,
    pub order: Order,
}

impl Ordered {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: Order::ASC,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: Order::DESC,
        }
    }
}

impl FromStr for Ordered {
    type Err = crate::Error;

    /// Parses `column`, `column ASC` or `column DESC`, the direction is case insensitive.
    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.split_whitespace();
        let (Some(column), direction, None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(OrmError::configuration(format!(
                "Invalid sort entry `{}`, expected `column [ASC|DESC]`",
                value
            )));
        };
        let order = match direction {
            None => Order::ASC,
            Some(v) if v.eq_ignore_ascii_case("asc") => Order::ASC,
            Some(v) if v.eq_ignore_ascii_case("desc") => Order::DESC,
            Some(v) => {
                return Err(OrmError::configuration(format!(
                    "Invalid sort direction `{}` in `{}`",
                    v, value
                )));
            }
        };
        Ok(Self {
            column: column.to_owned(),
            order,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum PageOrder {
    #[default]
    PrimaryKeys,
    Columns(Vec<Ordered>),
}

/// A window over a table: 1-based page `number` of `size` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
    pub order: PageOrder,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number,
            size,
            order: PageOrder::PrimaryKeys,
        }
    }

    /// Order by the given `"column [ASC|DESC]"` entries.
    pub fn order_by<I, S>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order = PageOrder::Columns(
            entries
                .into_iter()
                .map(|v| v.as_ref().parse())
                .collect::<Result<_>>()?,
        );
        Ok(self)
    }
}

/// Builds the statements of every entity operation.
///
/// Names are derived from the statement shape only, never from the values, so each distinct
/// shape gets prepared once per connection. Identifiers go through the quoter, values are
/// always bound.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'q> {
    quoter: &'q IdentifierQuoter,
}

impl<'q> QueryBuilder<'q> {
    pub fn new(quoter: &'q IdentifierQuoter) -> Self {
        Self { quoter }
    }

    /// `SELECT *` of the row whose primary key equals `key`, one value per key column.
    pub fn load(&self, columns: &TableColumns, key: &[Value]) -> Result<Statement> {
        let keys: Vec<_> = columns.primary_keys().collect();
        if keys.is_empty() {
            return Err(OrmError::configuration(format!(
                "Cannot load from `{}`, it has no primary key",
                columns.table()
            )));
        }
        if keys.len() != key.len() {
            return Err(OrmError::configuration(format!(
                "Table `{}` has {} primary key columns but {} values were given",
                columns.table(),
                keys.len(),
                key.len()
            )));
        }
        let params = keys
            .iter()
            .zip(key)
            .map(|(c, v)| c.process_value(v.clone()))
            .collect::<Result<Vec<_>>>()?;
        let mut sql = String::with_capacity(64);
        sql.push_str("SELECT * FROM ");
        self.quoter.write(&mut sql, columns.table());
        sql.push_str(" WHERE ");
        self.write_conditions(&mut sql, keys.iter().map(|c| c.name.as_str()), 1);
        Ok(Statement {
            name: format!("load_{}", columns.table()),
            sql,
            params,
        })
    }

    /// Insert the non key columns of `entity`, returning the stored row.
    pub fn insert(&self, entity: &Entity) -> Statement {
        let columns = entity.columns();
        let fields: Vec<_> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.primary_key)
            .collect();
        let mut sql = String::with_capacity(128);
        sql.push_str("INSERT INTO ");
        self.quoter.write(&mut sql, columns.table());
        if fields.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" (");
            self.write_names(&mut sql, fields.iter().map(|(_, c)| c.name.as_str()));
            sql.push_str(") VALUES (");
            separated_by(
                &mut sql,
                1..=fields.len(),
                |out, i| {
                    let _ = write!(out, "${}", i);
                },
                ", ",
            );
            sql.push(')');
        }
        self.write_returning(&mut sql, columns);
        Statement {
            name: format!("insert_{}", columns.table()),
            sql,
            params: fields
                .iter()
                .map(|(i, _)| entity.dirty_at(*i).clone())
                .collect(),
        }
    }

    /// Update the modified columns of `entity`, `None` when nothing changed.
    ///
    /// The row is addressed by the clean primary key, the key it had when it was read.
    pub fn update(&self, entity: &Entity) -> Result<Option<Statement>> {
        let columns = entity.columns();
        let modified: Vec<_> = entity.modified_columns().collect();
        if modified.is_empty() {
            return Ok(None);
        }
        let keys: Vec<_> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .collect();
        if keys.is_empty() {
            return Err(OrmError::configuration(format!(
                "Cannot update `{}`, it has no primary key",
                columns.table()
            )));
        }
        let mut name = format!("update_{}_", columns.table());
        separated_by(
            &mut name,
            modified.iter(),
            |out, (i, _)| {
                let _ = write!(out, "{}", i + 1);
            },
            ",",
        );
        let mut sql = String::with_capacity(128);
        sql.push_str("UPDATE ");
        self.quoter.write(&mut sql, columns.table());
        sql.push_str(" SET ");
        separated_by(
            &mut sql,
            modified.iter().enumerate(),
            |out, (n, (_, c))| {
                self.quoter.write(out, &c.name);
                let _ = write!(out, " = ${}", n + 1);
            },
            ", ",
        );
        sql.push_str(" WHERE ");
        self.write_conditions(
            &mut sql,
            keys.iter().map(|(_, c)| c.name.as_str()),
            modified.len() + 1,
        );
        self.write_returning(&mut sql, columns);
        let params = modified
            .iter()
            .map(|(i, _)| entity.dirty_at(*i).clone())
            .chain(keys.iter().map(|(i, _)| entity.clean_at(*i).clone()))
            .collect();
        Ok(Some(Statement { name, sql, params }))
    }

    /// One page of rows of `columns`.
    pub fn page(&self, columns: &TableColumns, page: &Page) -> Result<Statement> {
        if page.number == 0 || page.size == 0 {
            return Err(OrmError::configuration(format!(
                "Invalid page {} of size {} for `{}`, both start at 1",
                page.number,
                page.size,
                columns.table()
            )));
        }
        let sorted = columns.column_names();
        let order: Vec<Ordered> = match &page.order {
            PageOrder::PrimaryKeys => {
                let keys: Vec<_> = columns.primary_keys().map(|c| Ordered::asc(&c.name)).collect();
                if keys.is_empty() {
                    return Err(OrmError::configuration(format!(
                        "Cannot page `{}` by primary key, it has none",
                        columns.table()
                    )));
                }
                keys
            }
            PageOrder::Columns(entries) if entries.is_empty() => {
                return Err(OrmError::configuration(format!(
                    "Empty sort order for a page of `{}`",
                    columns.table()
                )));
            }
            PageOrder::Columns(entries) => entries.clone(),
        };
        let mut name = format!("_page_{}_", columns.table());
        match &page.order {
            PageOrder::PrimaryKeys => name.push_str("pkeys"),
            PageOrder::Columns(..) => {
                for (n, entry) in order.iter().enumerate() {
                    let Some(index) = sorted.iter().position(|v| *v == entry.column) else {
                        return Err(OrmError::configuration(format!(
                            "Cannot sort `{}` by unknown column `{}`",
                            columns.table(),
                            entry.column
                        )));
                    };
                    if n > 0 {
                        name.push(',');
                    }
                    let _ = write!(
                        name,
                        "{}{}",
                        index,
                        match entry.order {
                            Order::ASC => '+',
                            Order::DESC => '-',
                        }
                    );
                }
            }
        }
        let mut sql = String::with_capacity(128);
        sql.push_str("SELECT ");
        self.write_names(&mut sql, sorted.iter().copied());
        sql.push_str(" FROM ");
        self.quoter.write(&mut sql, columns.table());
        sql.push_str(" ORDER BY ");
        separated_by(
            &mut sql,
            order.iter(),
            |out, v| {
                self.quoter.write(out, &v.column);
                out.push_str(match v.order {
                    Order::ASC => " ASC",
                    Order::DESC => " DESC",
                });
            },
            ", ",
        );
        sql.push_str(" LIMIT $1 OFFSET $2");
        let offset = (page.number as i64 - 1) * page.size as i64;
        Ok(Statement {
            name,
            sql,
            params: vec![
                Value::Int64(Some(page.size as i64)),
                Value::Int64(Some(offset)),
            ],
        })
    }

    /// Rows of `target` holding `<singular owner table>_id = key`.
    pub fn one_to_many(
        &self,
        owner: &TableColumns,
        name: &str,
        target: &TableColumns,
        key: Value,
    ) -> Result<Statement> {
        let foreign_key = foreign_key_column(owner.table());
        expect_column(target, &foreign_key)?;
        let mut sql = String::with_capacity(64);
        sql.push_str("SELECT * FROM ");
        self.quoter.write(&mut sql, target.table());
        sql.push_str(" WHERE ");
        self.write_conditions(&mut sql, [foreign_key.as_str()], 1);
        Ok(Statement {
            name: association_statement_name(owner.table(), name),
            sql,
            params: vec![key],
        })
    }

    /// Rows of `target` linked to the owner `key` through the join table of both tables.
    pub fn many_to_many(
        &self,
        owner: &TableColumns,
        name: &str,
        target: &TableColumns,
        key: Value,
    ) -> Result<Statement> {
        let identity = target.identity()?;
        let join = join_table_name(owner.table(), target.table());
        let target_table = self.quoter.quote(target.table());
        let join_table = self.quoter.quote(&join);
        let mut sql = String::with_capacity(128);
        let _ = write!(
            sql,
            "SELECT {target_table}.* FROM {target_table} INNER JOIN {join_table} ON {join_table}.{} = {target_table}.{} WHERE {join_table}.{} = $1",
            self.quoter.quote(&foreign_key_column(target.table())),
            self.quoter.quote(&identity.name),
            self.quoter.quote(&foreign_key_column(owner.table())),
        );
        Ok(Statement {
            name: association_statement_name(owner.table(), name),
            sql,
            params: vec![key],
        })
    }

    /// The row of `target` whose primary key is `key`, the owner's `<singular target>_id`.
    pub fn many_to_one(
        &self,
        owner: &TableColumns,
        name: &str,
        target: &TableColumns,
        key: Value,
    ) -> Result<Statement> {
        let identity = target.identity()?;
        let key = identity.process_value(key)?;
        let mut sql = String::with_capacity(64);
        sql.push_str("SELECT * FROM ");
        self.quoter.write(&mut sql, target.table());
        sql.push_str(" WHERE ");
        self.write_conditions(&mut sql, [identity.name.as_str()], 1);
        Ok(Statement {
            name: association_statement_name(owner.table(), name),
            sql,
            params: vec![key],
        })
    }

    fn write_names<'a>(&self, out: &mut String, names: impl IntoIterator<Item = &'a str>) {
        separated_by(out, names, |out, v| self.quoter.write(out, v), ", ");
    }

    /// `a = $first AND b = $first+1 ...`
    fn write_conditions<'a>(
        &self,
        out: &mut String,
        names: impl IntoIterator<Item = &'a str>,
        first: usize,
    ) {
        separated_by(
            out,
            names.into_iter().enumerate(),
            |out, (i, v)| {
                self.quoter.write(out, v);
                let _ = write!(out, " = ${}", first + i);
            },
            " AND ",
        );
    }

    fn write_returning(&self, out: &mut String, columns: &TableColumns) {
        out.push_str(" RETURNING ");
        self.write_names(out, columns.iter().map(|c| c.name.as_str()));
    }
}

fn expect_column(columns: &TableColumns, name: &str) -> Result<()> {
    columns.expect_position(name).map(|_| ())
}
