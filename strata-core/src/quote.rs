use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Quotes identifiers that would not survive unquoted in SQL.
///
/// Only names that need it are quoted: `a` stays `a`, `A` becomes `"A"` (Postgres folds
/// unquoted names to lower case) and embedded double quotes are doubled. Results are memoized,
/// identifiers come from the schema and are effectively static.
#[derive(Debug, Default)]
pub struct IdentifierQuoter {
    quoted: RwLock<HashMap<String, Arc<str>>>,
}

impl IdentifierQuoter {
    pub fn new() -> Self {
        Default::default()
    }

    /// The SQL form of `name`.
    pub fn quote(&self, name: &str) -> Arc<str> {
        if let Some(quoted) = self
            .quoted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return quoted.clone();
        }
        let quoted: Arc<str> = if needs_quoting(name) {
            format!("\"{}\"", name.replace('"', "\"\"")).into()
        } else {
            name.into()
        };
        self.quoted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_owned())
            .or_insert(quoted)
            .clone()
    }

    /// Quote `name` into `out`.
    pub fn write(&self, out: &mut String, name: &str) {
        out.push_str(&self.quote(name));
    }

    /// Number of memoized identifiers.
    pub fn len(&self) -> usize {
        self.quoted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `name` must be quoted: it contains a double quote or is not made of a lowercase letter
/// or underscore followed by lowercase letters, digits or underscores.
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return true,
    }
    chars.any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
}
