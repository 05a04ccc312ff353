use crate::{AssociationDef, AssociationKind, OrmError, Result, association_statement_name};
use std::collections::HashMap;

/// Entity types, their tables and their relationships.
///
/// Built once at startup, then shared read-only (usually behind an `Arc`) by every session.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    tables: HashMap<String, String>,
    types: HashMap<String, String>,
    associations: HashMap<String, HashMap<String, AssociationDef>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Link an entity type to the table backing it, in both directions.
    pub fn associate_table(
        &mut self,
        entity_type: impl Into<String>,
        table: impl Into<String>,
    ) -> &mut Self {
        let entity_type = entity_type.into();
        let table = table.into();
        if let Some(previous) = self.tables.insert(entity_type.clone(), table.clone()) {
            log::warn!(
                "Entity type `{}` was linked to `{}`, now it is linked to `{}`",
                entity_type,
                previous,
                table
            );
        }
        self.types.insert(table, entity_type);
        self
    }

    /// `owner` has many `target` rows, each holding `<singular owner table>_id`.
    pub fn one_to_many(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.associate(owner, name, target, AssociationKind::OneToMany)
    }

    /// `owner` and `target` are linked through the join table named after both tables.
    pub fn many_to_many(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.associate(owner, name, target, AssociationKind::ManyToMany)
    }

    /// `owner` holds `<singular target table>_id` referencing one `target`.
    pub fn many_to_one(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> &mut Self {
        self.associate(owner, name, target, AssociationKind::ManyToOne)
    }

    fn associate(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
        kind: AssociationKind,
    ) -> &mut Self {
        let owner = owner.into();
        let name = name.into();
        let definition = AssociationDef {
            kind,
            target: target.into(),
        };
        if let Some(previous) = self
            .associations
            .entry(owner.clone())
            .or_default()
            .insert(name.clone(), definition)
        {
            log::warn!(
                "Association `{}` of `{}` ({:?} of `{}`) was redefined",
                name,
                owner,
                previous.kind,
                previous.target
            );
        }
        self
    }

    /// Table of `entity_type`.
    pub fn table(&self, entity_type: &str) -> Result<&str> {
        self.tables
            .get(entity_type)
            .map(String::as_str)
            .ok_or_else(|| {
                OrmError::configuration(format!(
                    "Table for entity type `{}` is not defined",
                    entity_type
                ))
            })
    }

    /// Entity type backed by `table`.
    pub fn entity_type(&self, table: &str) -> Result<&str> {
        self.types.get(table).map(String::as_str).ok_or_else(|| {
            OrmError::configuration(format!("No entity type is linked to table `{}`", table))
        })
    }

    /// Relationship `name` of `owner`.
    ///
    /// Fails when another relationship would be prepared under the same statement name with a
    /// different query.
    pub fn association(&self, owner: &str, name: &str) -> Result<&AssociationDef> {
        let definition = self
            .associations
            .get(owner)
            .and_then(|v| v.get(name))
            .ok_or_else(|| {
                OrmError::configuration(format!(
                    "Entity type `{}` has no association named `{}`",
                    owner, name
                ))
            })?;
        let Some(table) = self.tables.get(owner) else {
            return Ok(definition);
        };
        let statement = association_statement_name(table, name);
        let clash = self.associations.iter().find_map(|(other, associations)| {
            let other_table = self.tables.get(other)?;
            associations
                .iter()
                .find(|(other_name, other_definition)| {
                    association_statement_name(other_table, other_name) == statement
                        && (other_table != table || *other_definition != definition)
                })
                .map(|(other_name, ..)| (other, other_name))
        });
        if let Some((other, other_name)) = clash {
            return Err(OrmError::configuration(format!(
                "Associations `{}` of `{}` and `{}` of `{}` would share the statement `{}`",
                name, owner, other_name, other, statement
            )));
        }
        Ok(definition)
    }

    /// Registered relationship names of `owner`, sorted.
    pub fn associations(&self, owner: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .associations
            .get(owner)
            .map(|v| v.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}
