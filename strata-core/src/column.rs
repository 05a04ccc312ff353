use crate::{OrmError, Result, Value};

/// Introspected definition of a table column.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Type as rendered by the database (`character varying(40)`, `integer`, ...).
    pub db_type: String,
    /// Default expression, if any.
    pub default: Option<String>,
    /// Nullability flag.
    pub nullable: bool,
    /// Participates in the primary key.
    pub primary_key: bool,
    /// Typed null derived from `db_type`, used to coerce incoming values.
    pub value: Value,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, db_type: impl Into<String>) -> Self {
        let db_type = db_type.into();
        Self {
            name: name.into(),
            value: Value::from_db_type(&db_type),
            db_type,
            default: None,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_expression(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Coerce `value` to the type of this column.
    pub fn process_value(&self, value: Value) -> Result<Value> {
        value.try_as(&self.value).map_err(|e| {
            OrmError::InvalidValue {
                column: self.name.clone(),
                detail: format!("{:#}", e),
            }
            .into_logged()
        })
    }
}

/// The columns of one table in catalog order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct TableColumns {
    table: String,
    columns: Box<[ColumnDef]>,
}

impl TableColumns {
    pub fn new(table: impl Into<String>, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into_iter().collect(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDef> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Like [`TableColumns::position`] but an unknown column is a configuration error.
    pub fn expect_position(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            OrmError::configuration(format!(
                "Unknown column `{}` for table `{}`",
                name, self.table
            ))
        })
    }

    /// Column names sorted lexicographically, a stable order for building statement names.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Primary key columns in catalog order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn primary_key_names(&self) -> Vec<&str> {
        self.primary_keys().map(|c| c.name.as_str()).collect()
    }

    /// The single column rows of this table are referenced by.
    pub fn identity(&self) -> Result<&ColumnDef> {
        let mut keys = self.primary_keys();
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key),
            (None, _) => Err(OrmError::configuration(format!(
                "Table `{}` has no primary key",
                self.table
            ))),
            (Some(..), Some(..)) => Err(OrmError::configuration(format!(
                "Table `{}` has a composite primary key, associations need a single key column",
                self.table
            ))),
        }
    }
}

impl<'a> IntoIterator for &'a TableColumns {
    type Item = &'a ColumnDef;
    type IntoIter = std::slice::Iter<'a, ColumnDef>;
    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
