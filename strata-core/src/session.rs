use crate::{
    AssociationKind, Connection, Entity, IdentifierQuoter, ModelRegistry, OrmError, Page,
    PreparedCache, QueryBuilder, Resolved, Result, Row, RowLabeled, SchemaCatalog, Statement,
    TableColumns, Value, entity::unsaved, foreign_key_column,
};
use anyhow::Context;
use std::{borrow::Cow, sync::Arc};

/// What [`Session::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
    /// Nothing was modified, no statement was sent.
    Unchanged,
}

/// Unit of work over one connection.
///
/// Owns the connection and the registry of the statements prepared on it. The model registry,
/// the schema catalog and the identifier quoter are shared, several sessions (one per worker)
/// can point to the same ones. Every operation borrows the session mutably, so a session has at
/// most one statement in flight.
pub struct Session<C: Connection> {
    connection: C,
    prepared: PreparedCache,
    registry: Arc<ModelRegistry>,
    catalog: Arc<SchemaCatalog>,
    quoter: Arc<IdentifierQuoter>,
}

impl<C: Connection> Session<C> {
    pub fn new(connection: C, registry: Arc<ModelRegistry>) -> Self {
        Self::with_caches(connection, registry, Default::default(), Default::default())
    }

    /// Session sharing the catalog and quoter of other sessions.
    pub fn with_caches(
        connection: C,
        registry: Arc<ModelRegistry>,
        catalog: Arc<SchemaCatalog>,
        quoter: Arc<IdentifierQuoter>,
    ) -> Self {
        Self {
            connection,
            prepared: PreparedCache::new(),
            registry,
            catalog,
            quoter,
        }
    }

    pub async fn connect(url: Cow<'static, str>, registry: Arc<ModelRegistry>) -> Result<Self> {
        Ok(Self::new(C::connect(url).await?, registry))
    }

    /// Replace the connection. Statements prepared on the old one are forgotten.
    pub async fn reconnect(&mut self, url: Cow<'static, str>) -> Result<()> {
        self.connection = C::connect(url).await?;
        self.prepared.clear();
        Ok(())
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn prepared(&self) -> &PreparedCache {
        &self.prepared
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &Arc<SchemaCatalog> {
        &self.catalog
    }

    pub fn quoter(&self) -> &Arc<IdentifierQuoter> {
        &self.quoter
    }

    /// Columns of the table backing `entity_type`. A table without columns is a configuration
    /// error, the catalog still remembers it.
    pub async fn columns(&mut self, entity_type: &str) -> Result<Arc<TableColumns>> {
        let table = self.registry.table(entity_type)?;
        let columns = self
            .catalog
            .columns(&mut self.connection, &mut self.prepared, table)
            .await?;
        if columns.is_empty() {
            return Err(OrmError::configuration(format!(
                "Table `{}` of entity type `{}` has no columns",
                table, entity_type
            )));
        }
        Ok(columns)
    }

    /// Column names of `entity_type`, sorted.
    pub async fn column_names(&mut self, entity_type: &str) -> Result<Vec<String>> {
        Ok(self
            .columns(entity_type)
            .await?
            .column_names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect())
    }

    /// Primary key column names of `entity_type`, in catalog order.
    pub async fn primary_keys(&mut self, entity_type: &str) -> Result<Vec<String>> {
        Ok(self
            .columns(entity_type)
            .await?
            .primary_key_names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect())
    }

    /// A new unsaved entity of `entity_type`, every column null.
    pub async fn create(&mut self, entity_type: &str) -> Result<Entity> {
        let columns = self.columns(entity_type).await?;
        Ok(Entity::new(entity_type, columns))
    }

    /// Entity of `entity_type` whose single primary key column equals `key`.
    pub async fn load(&mut self, entity_type: &str, key: impl Into<Value>) -> Result<Entity> {
        self.load_composite(entity_type, &[key.into()]).await
    }

    /// Entity of `entity_type` whose primary key equals `key`, one value per key column.
    pub async fn load_composite(&mut self, entity_type: &str, key: &[Value]) -> Result<Entity> {
        let columns = self.columns(entity_type).await?;
        let statement = QueryBuilder::new(&self.quoter).load(&columns, key)?;
        let detail = statement.to_string();
        let Some(row) = self.run(statement).await?.into_iter().next() else {
            return Err(OrmError::NotFound {
                table: columns.table().to_owned(),
                detail,
            }
            .into_logged());
        };
        let mut entity = Entity::new(entity_type, columns);
        entity.set_all_from_database(&row)?;
        Ok(entity)
    }

    /// Insert or update depending on whether the entity was ever stored.
    pub async fn save(&mut self, entity: &mut Entity) -> Result<SaveOutcome> {
        if entity.is_persisted() {
            Ok(match self.update(entity).await? {
                true => SaveOutcome::Updated,
                false => SaveOutcome::Unchanged,
            })
        } else {
            self.insert(entity).await?;
            Ok(SaveOutcome::Inserted)
        }
    }

    /// Insert the entity and load back the stored row, defaults and generated keys included.
    pub async fn insert(&mut self, entity: &mut Entity) -> Result<()> {
        let statement = QueryBuilder::new(&self.quoter).insert(entity);
        let row = self
            .run(statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                OrmError::Query {
                    stage: crate::QueryStage::Execute,
                    statement: Some(format!("insert_{}", entity.table())),
                    detail: "the insert returned no row".into(),
                }
                .into_logged()
            })?;
        entity.set_all_from_database(&row)
    }

    /// Write the modified columns, `false` when there was nothing to write.
    ///
    /// A row that disappeared since it was read is a stale entity error.
    pub async fn update(&mut self, entity: &mut Entity) -> Result<bool> {
        let Some(statement) = QueryBuilder::new(&self.quoter).update(entity)? else {
            log::debug!("Nothing to update in `{}`", entity.table());
            return Ok(false);
        };
        let Some(row) = self.run(statement).await?.into_iter().next() else {
            return Err(OrmError::StaleEntity {
                table: entity.table().to_owned(),
            }
            .into_logged());
        };
        entity.set_all_from_database(&row)?;
        Ok(true)
    }

    /// One page of entities of `entity_type`.
    pub async fn page(&mut self, entity_type: &str, page: &Page) -> Result<Vec<Entity>> {
        let columns = self.columns(entity_type).await?;
        let statement = QueryBuilder::new(&self.quoter).page(&columns, page)?;
        let rows = self.run(statement).await?;
        entities(entity_type, &columns, rows)
    }

    /// Run a named raw statement. `sql` is only needed the first time `name` is used.
    pub async fn query(
        &mut self,
        name: &str,
        sql: Option<&str>,
        params: Vec<Value>,
    ) -> Result<Vec<RowLabeled>> {
        self.prepared
            .execute(&mut self.connection, name, sql, params)
            .await
    }

    /// Like [`Session::query`], rows without their labels.
    pub async fn query_positional(
        &mut self,
        name: &str,
        sql: Option<&str>,
        params: Vec<Value>,
    ) -> Result<Vec<Row>> {
        Ok(self
            .query(name, sql, params)
            .await?
            .into_iter()
            .map(Row::from)
            .collect())
    }

    /// Relationship `name` of `entity`.
    ///
    /// The result is cached on the entity together with the key it was resolved for. The cache
    /// is used unless `force` is set or the key changed since. To-many relationships use the
    /// stored primary key of the owner, many to one follows the current foreign key value.
    pub async fn resolve<'e>(
        &mut self,
        entity: &'e mut Entity,
        name: &str,
        force: bool,
    ) -> Result<&'e Resolved> {
        let definition = self.registry.association(entity.entity_type(), name)?.clone();
        let target = self.columns(&definition.target).await?;
        let owner = entity.columns().clone();
        let builder = QueryBuilder::new(&self.quoter);
        let (key, statement) = match definition.kind {
            AssociationKind::OneToMany | AssociationKind::ManyToMany => {
                let key = entity.clean_value(&owner.identity()?.name)?.clone();
                if key.is_null() {
                    return Err(unsaved(entity));
                }
                if !force && entity.is_cached_for(name, &key) {
                    return association(entity, name);
                }
                let statement = match definition.kind {
                    AssociationKind::OneToMany => {
                        builder.one_to_many(&owner, name, &target, key.clone())?
                    }
                    _ => builder.many_to_many(&owner, name, &target, key.clone())?,
                };
                (key, statement)
            }
            AssociationKind::ManyToOne => {
                let foreign_key = foreign_key_column(target.table());
                let key = entity.get(&foreign_key)?.clone();
                if key.is_null() {
                    return Err(OrmError::NotFound {
                        table: target.table().to_owned(),
                        detail: format!("a null `{}` of `{}`", foreign_key, owner.table()),
                    }
                    .into_logged());
                }
                if !force && entity.is_cached_for(name, &key) {
                    return association(entity, name);
                }
                let statement = builder.many_to_one(&owner, name, &target, key.clone())?;
                (key, statement)
            }
        };
        let detail = statement.to_string();
        let rows = self
            .run(statement)
            .await
            .with_context(|| format!("While resolving `{}` of `{}`", name, owner.table()))?;
        let resolved = match definition.kind {
            AssociationKind::ManyToOne => {
                let Some(row) = rows.into_iter().next() else {
                    return Err(OrmError::NotFound {
                        table: target.table().to_owned(),
                        detail,
                    }
                    .into_logged());
                };
                let mut one = Entity::new(definition.target.as_str(), target);
                one.set_all_from_database(&row)?;
                Resolved::One(one.into())
            }
            _ => Resolved::Many(entities(&definition.target, &target, rows)?),
        };
        Ok(entity.store_association(name, key, resolved))
    }

    /// Resolve a one to many or many to many relationship.
    pub async fn resolve_many<'e>(
        &mut self,
        entity: &'e mut Entity,
        name: &str,
        force: bool,
    ) -> Result<&'e [Entity]> {
        let table = entity.table().to_owned();
        self.resolve(entity, name, force)
            .await?
            .as_many()
            .ok_or_else(|| {
                OrmError::configuration(format!(
                    "Association `{}` of `{}` resolves to a single entity",
                    name, table
                ))
            })
    }

    /// Resolve a many to one relationship.
    pub async fn resolve_one<'e>(
        &mut self,
        entity: &'e mut Entity,
        name: &str,
        force: bool,
    ) -> Result<&'e Entity> {
        let table = entity.table().to_owned();
        self.resolve(entity, name, force)
            .await?
            .as_one()
            .ok_or_else(|| {
                OrmError::configuration(format!(
                    "Association `{}` of `{}` resolves to many entities",
                    name, table
                ))
            })
    }

    async fn run(&mut self, statement: Statement) -> Result<Vec<RowLabeled>> {
        self.prepared
            .execute(
                &mut self.connection,
                &statement.name,
                Some(&statement.sql),
                statement.params,
            )
            .await
    }
}

fn association<'e>(entity: &'e Entity, name: &str) -> Result<&'e Resolved> {
    entity.association(name).ok_or_else(|| {
        OrmError::configuration(format!(
            "Association `{}` of `{}` is not cached",
            name,
            entity.table()
        ))
    })
}

fn entities(
    entity_type: &str,
    columns: &Arc<TableColumns>,
    rows: Vec<RowLabeled>,
) -> Result<Vec<Entity>> {
    rows.iter()
        .map(|row| {
            let mut entity = Entity::new(entity_type, columns.clone());
            entity.set_all_from_database(row)?;
            Ok(entity)
        })
        .collect()
}
