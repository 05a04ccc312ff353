use crate::{Value, separated_by, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RowLabeled {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let (labels, values): (Vec<String>, Vec<Value>) = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            labels: labels.into(),
            values: values.into(),
        }
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// A generated statement: the name it is prepared under, its text and its bound parameters.
///
/// The text only matters the first time a name is used on a connection, after that the server
/// side plan prepared under the name is executed with `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub sql: String,
    pub params: Vec<Value>,
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            let mut params = String::new();
            separated_by(
                &mut params,
                self.params.iter().enumerate(),
                |out, (i, v)| out.push_str(&format!("${} = {}", i + 1, v)),
                ", ",
            );
            write!(f, " [{}]", params)?;
        }
        Ok(())
    }
}
