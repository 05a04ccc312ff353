use crate::{
    AsValue, ColumnDef, OrmError, Resolved, Result, RowLabeled, TableColumns, Value,
    relations::CachedAssociation,
};
use std::{
    collections::{HashMap, HashSet, hash_map},
    fmt::{self, Display},
    sync::Arc,
};

/// Prefix of the companion key submitted for checkbox style input.
pub const CHECK_PREFIX: &str = "_check_";

/// One row of a table with change tracking.
///
/// `clean` mirrors what the database is known to hold, `dirty` is the current in memory value.
/// A column is modified when the two differ. Both always hold one value per column, in catalog
/// order.
#[derive(Debug, Clone)]
pub struct Entity {
    entity_type: Arc<str>,
    columns: Arc<TableColumns>,
    clean: Box<[Value]>,
    dirty: Box<[Value]>,
    associations: HashMap<String, CachedAssociation>,
}

impl Entity {
    /// Fresh entity: every column null, nothing modified.
    pub fn new(entity_type: impl Into<Arc<str>>, columns: Arc<TableColumns>) -> Self {
        let mut entity = Self {
            entity_type: entity_type.into(),
            columns,
            clean: Default::default(),
            dirty: Default::default(),
            associations: Default::default(),
        };
        entity.reset();
        entity
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn table(&self) -> &str {
        self.columns.table()
    }

    pub fn columns(&self) -> &Arc<TableColumns> {
        &self.columns
    }

    /// Column definition of `name`, an unknown column is a configuration error.
    pub fn column(&self, name: &str) -> Result<&ColumnDef> {
        let index = self.columns.expect_position(name)?;
        Ok(&self.columns.as_slice()[index])
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        Ok(&self.dirty[self.columns.expect_position(name)?])
    }

    /// Current value of `name` converted into `T`.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        T::try_from_value(self.get(name)?.clone())
    }

    /// Value of `name` as last known to the database.
    pub fn clean_value(&self, name: &str) -> Result<&Value> {
        Ok(&self.clean[self.columns.expect_position(name)?])
    }

    pub(crate) fn clean_at(&self, index: usize) -> &Value {
        &self.clean[index]
    }

    pub(crate) fn dirty_at(&self, index: usize) -> &Value {
        &self.dirty[index]
    }

    /// Current values paired with their column names, in catalog order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.dirty.iter())
    }

    /// Assign `value` to `name` after coercing it to the column type. Returns the stored value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&Value> {
        let index = self.columns.expect_position(name)?;
        let value = self.columns.as_slice()[index].process_value(value.into())?;
        self.dirty[index] = value;
        Ok(&self.dirty[index])
    }

    /// Replace the whole state with a row read from the database. Nothing is modified afterwards.
    ///
    /// Every label must name a column, otherwise the entity is left untouched. Columns missing
    /// from the row are null.
    pub fn set_all_from_database(&mut self, row: &RowLabeled) -> Result<()> {
        let assignments = row
            .iter()
            .map(|(name, value)| {
                let index = self.columns.expect_position(name)?;
                let value = self.columns.as_slice()[index].process_value(value.clone())?;
                Ok((index, value))
            })
            .collect::<Result<Vec<_>>>()?;
        self.reset();
        for (index, value) in assignments {
            self.clean[index] = value.clone();
            self.dirty[index] = value;
        }
        Ok(())
    }

    /// Assign user submitted pairs to the dirty state.
    ///
    /// A key `_check_<col>` stands for `<col>` when `<col>` itself is absent from the input, it
    /// carries the value of an unchecked checkbox. When both are present the companion is
    /// ignored. Unknown keys are a configuration error, in that case nothing is assigned.
    pub fn set_all_from_input<I, K, V>(&mut self, input: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let input: Vec<(K, Value)> = input.into_iter().map(|(k, v)| (k, v.into())).collect();
        let keys: HashSet<&str> = input.iter().map(|(k, _)| k.as_ref()).collect();
        let mut assignments = Vec::with_capacity(input.len());
        for (key, value) in &input {
            let mut name = key.as_ref();
            if let Some(target) = check_target(name) {
                if keys.contains(target) {
                    continue;
                }
                name = target;
            }
            let index = self.columns.expect_position(name)?;
            let value = self.columns.as_slice()[index].process_value(value.clone())?;
            assignments.push((index, value));
        }
        for (index, value) in assignments {
            self.dirty[index] = value;
        }
        Ok(())
    }

    /// Both states back to typed nulls, cached relationships dropped.
    pub fn reset(&mut self) {
        self.clean = self.columns.iter().map(|c| c.value.clone()).collect();
        self.dirty = self.clean.clone();
        self.associations.clear();
    }

    /// Columns whose current value differs from the clean one, in catalog order.
    pub fn modified_columns(&self) -> impl Iterator<Item = (usize, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| self.clean[*i] != self.dirty[*i])
    }

    pub fn is_modified(&self, name: &str) -> Result<bool> {
        let index = self.columns.expect_position(name)?;
        Ok(self.clean[index] != self.dirty[index])
    }

    /// Whether the row exists in the database, judged on the clean value of the first primary
    /// key column.
    pub fn is_persisted(&self) -> bool {
        self.columns
            .iter()
            .position(|c| c.primary_key)
            .is_some_and(|i| !self.clean[i].is_null())
    }

    /// Make the current state the clean one, for rows written by other means.
    pub fn mark_clean(&mut self) {
        self.clean = self.dirty.clone();
    }

    /// Relationship `name` as last resolved, without querying.
    pub fn association(&self, name: &str) -> Option<&Resolved> {
        self.associations.get(name).map(|v| &v.resolved)
    }

    /// Drop the cached relationship `name`, the next resolution queries again.
    pub fn forget_association(&mut self, name: &str) {
        self.associations.remove(name);
    }

    pub(crate) fn is_cached_for(&self, name: &str, key: &Value) -> bool {
        self.associations
            .get(name)
            .is_some_and(|v| !v.key.is_null() && v.key == *key)
    }

    pub(crate) fn store_association(
        &mut self,
        name: &str,
        key: Value,
        resolved: Resolved,
    ) -> &Resolved {
        let cached = CachedAssociation { key, resolved };
        let cached = match self.associations.entry(name.to_owned()) {
            hash_map::Entry::Occupied(mut entry) => {
                entry.insert(cached);
                entry.into_mut()
            }
            hash_map::Entry::Vacant(entry) => entry.insert(cached),
        };
        &cached.resolved
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type
            && self.columns.table() == other.columns.table()
            && self.clean == other.clean
            && self.dirty == other.dirty
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.entity_type)?;
        for (i, (name, value)) in self.values().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}: {}", name, value)?;
            if self.clean[i] != self.dirty[i] {
                f.write_str("*")?;
            }
        }
        f.write_str(" }")
    }
}

fn check_target(key: &str) -> Option<&str> {
    let target = key.strip_prefix(CHECK_PREFIX)?;
    (!target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'))
    .then_some(target)
}

/// Error for an operation that needs the entity to exist in the database.
pub(crate) fn unsaved(entity: &Entity) -> crate::Error {
    OrmError::Unsaved {
        table: entity.table().to_owned(),
    }
    .into_logged()
}
