//! Eager loading of relationships.
//!
//! Each registered relation is loaded with one extra query per request,
//! `SELECT ... WHERE <key> IN (<parent keys>)`, through Sea-ORM's
//! [`LoaderTrait`]. Related rows are serialised to JSON so that parents of one
//! type can carry relations of any type.

use std::{fmt, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, LoaderTrait, Related};
use serde::Serialize;

use crate::errors::Result;
use crate::models::Record;

/// Loads one relation for a batch of parents.
#[async_trait]
pub trait RelationLoader<E: EntityTrait>: Send + Sync {
    /// Returns one value per parent, in the order of `parents`.
    async fn load(
        &self,
        db: &DatabaseConnection,
        parents: &[E::Model],
    ) -> Result<Vec<serde_json::Value>>;
}

/// Has-one and belongs-to relations. A parent without a related row gets `null`.
pub struct LoadOne<R>(PhantomData<fn() -> R>);

/// Has-many relations. Every parent gets an array, possibly empty.
pub struct LoadMany<R>(PhantomData<fn() -> R>);

impl<R> LoadOne<R> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for LoadOne<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> LoadMany<R> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for LoadMany<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E, R> RelationLoader<E> for LoadOne<R>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Serialize + Send + Sync,
{
    async fn load(
        &self,
        db: &DatabaseConnection,
        parents: &[E::Model],
    ) -> Result<Vec<serde_json::Value>> {
        let related: Vec<Option<R::Model>> = parents.load_one(R::default(), db).await?;
        related
            .iter()
            .map(|row| serde_json::to_value(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl<E, R> RelationLoader<E> for LoadMany<R>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Serialize + Send + Sync,
{
    async fn load(
        &self,
        db: &DatabaseConnection,
        parents: &[E::Model],
    ) -> Result<Vec<serde_json::Value>> {
        let related: Vec<Vec<R::Model>> = parents.load_many(R::default(), db).await?;
        related
            .iter()
            .map(|rows| serde_json::to_value(rows).map_err(Into::into))
            .collect()
    }
}

/// Named relations of one table.
pub struct Relations<E: EntityTrait> {
    loaders: Vec<(String, Arc<dyn RelationLoader<E>>)>,
}

impl<E: EntityTrait> Relations<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Registers a has-one or belongs-to relation.
    #[must_use]
    pub fn one<R>(self, name: impl Into<String>) -> Self
    where
        E: Related<R>,
        E::Model: Sync,
        R: EntityTrait,
        R::Model: Serialize + Send + Sync,
    {
        self.register(name, LoadOne::<R>::new())
    }

    /// Registers a has-many relation.
    #[must_use]
    pub fn many<R>(self, name: impl Into<String>) -> Self
    where
        E: Related<R>,
        E::Model: Sync,
        R: EntityTrait,
        R::Model: Serialize + Send + Sync,
    {
        self.register(name, LoadMany::<R>::new())
    }

    /// Registers a custom loader. A later registration under the same name
    /// replaces the earlier one.
    #[must_use]
    pub fn register(
        mut self,
        name: impl Into<String>,
        loader: impl RelationLoader<E> + 'static,
    ) -> Self {
        let name = name.into();
        let loader: Arc<dyn RelationLoader<E>> = Arc::new(loader);
        match self.loaders.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = loader,
            None => self.loaders.push((name, loader)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn RelationLoader<E>>> {
        self.loaders
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, loader)| loader)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loaders.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Loads `names` for all `models` and pairs each model with its relations.
    ///
    /// Names must have been checked with [`Relations::contains`]; unknown
    /// names are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first loader error.
    pub async fn load_into(
        &self,
        db: &DatabaseConnection,
        models: Vec<E::Model>,
        names: &[String],
    ) -> Result<Vec<Record<E::Model>>> {
        let mut records: Vec<Record<E::Model>> = Vec::with_capacity(models.len());
        if models.is_empty() {
            return Ok(records);
        }

        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            let Some(loader) = self.get(name) else {
                continue;
            };
            tracing::debug!(relation = %name, parents = models.len(), "Eager loading relation");
            loaded.push((name, loader.load(db, &models).await?));
        }

        records.extend(models.into_iter().map(Record::new));
        for (name, values) in loaded {
            for (record, value) in records.iter_mut().zip(values) {
                record.insert_related(name.clone(), value);
            }
        }
        Ok(records)
    }
}

impl<E: EntityTrait> Default for Relations<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> Clone for Relations<E> {
    fn clone(&self) -> Self {
        Self {
            loaders: self.loaders.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for Relations<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
