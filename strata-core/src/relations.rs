use crate::{Entity, Value, singularize};

/// Cardinality of a declared relationship, seen from its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Rows of the target hold `<singular owner table>_id`.
    OneToMany,
    /// A join table named after both tables links owner and target.
    ManyToMany,
    /// The owner holds `<singular target table>_id`.
    ManyToOne,
}

/// A relationship of an owner entity type, as registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDef {
    pub kind: AssociationKind,
    /// Target entity type.
    pub target: String,
}

/// Outcome of resolving a relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Many(Vec<Entity>),
    One(Box<Entity>),
}

impl Resolved {
    pub fn as_many(&self) -> Option<&[Entity]> {
        match self {
            Resolved::Many(v) => Some(v),
            Resolved::One(..) => None,
        }
    }

    pub fn as_one(&self) -> Option<&Entity> {
        match self {
            Resolved::One(v) => Some(v),
            Resolved::Many(..) => None,
        }
    }
}

/// Per instance cache entry: what was resolved and the key value it was resolved for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CachedAssociation {
    pub(crate) key: Value,
    pub(crate) resolved: Resolved,
}

/// Foreign key column referencing `table`: `users` gives `user_id`.
pub fn foreign_key_column(table: &str) -> String {
    format!("{}_id", singularize(table))
}

/// Join table linking two tables: both names sorted and joined by `_`.
pub fn join_table_name(a: &str, b: &str) -> String {
    let mut tables = [a, b];
    tables.sort_unstable();
    tables.join("_")
}

/// Prepared statement name of relationship `name` of `table`: `_assoc_<table>_<name>`.
///
/// Underscores make it ambiguous (`a_b` + `c` and `a` + `b_c` both give `_assoc_a_b_c`), the
/// registry rejects relationships whose names clash this way.
pub fn association_statement_name(table: &str, name: &str) -> String {
    format!("_assoc_{}_{}", table, name)
}
