//! Blocking create/read/update helper.
//!
//! [`BaseCrud`] drives an [`AsyncBaseCrud`] on a tokio runtime it shares with
//! the connection. Sea-ORM connections stay bound to the runtime that opened
//! them, so open the connection through [`BaseCrud::connect`] or on the same
//! runtime passed to [`BaseCrud::new`].
//!
//! Calling these methods from inside an async context panics; use
//! [`AsyncBaseCrud`] there.

use std::future::Future;
use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

use crate::config::CrudConfig;
use crate::crud::AsyncBaseCrud;
use crate::errors::Result;
use crate::filter::Filters;
use crate::models::{Fields, Record};
use crate::query::Base;
use crate::relations::Relations;
use crate::traits::{CrudTable, TableRow};

pub struct BaseCrud<E: CrudTable> {
    inner: AsyncBaseCrud<E>,
    runtime: Arc<Runtime>,
}

impl<E: CrudTable> BaseCrud<E> {
    /// Starts a current-thread runtime and opens `options` on it.
    ///
    /// # Errors
    ///
    /// `Runtime` if the runtime cannot start, `Database` if connecting fails.
    pub fn connect(options: impl Into<ConnectOptions>) -> Result<Self> {
        let runtime = Arc::new(Builder::new_current_thread().enable_all().build()?);
        let db = runtime.block_on(Database::connect(options))?;
        tracing::debug!(table = %E::resource_name(), "Opened blocking connection");
        Ok(Self::new(runtime, db))
    }

    /// Wraps a connection that was opened on `runtime`.
    #[must_use]
    pub fn new(runtime: Arc<Runtime>, db: DatabaseConnection) -> Self {
        Self {
            inner: AsyncBaseCrud::new(db),
            runtime,
        }
    }

    /// Another table on the same runtime and connection.
    #[must_use]
    pub fn table<T: CrudTable>(&self) -> BaseCrud<T> {
        BaseCrud::new(Arc::clone(&self.runtime), self.inner.db().clone())
            .with_config(self.inner.config().clone())
    }

    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.inner = self.inner.with_config(config);
        self
    }

    #[must_use]
    pub fn with_relations(mut self, relations: Relations<E>) -> Self {
        self.inner = self.inner.with_relations(relations);
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.inner.db()
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// The async helper this one drives.
    pub fn as_async(&self) -> &AsyncBaseCrud<E> {
        &self.inner
    }

    /// Runs `future` to completion on this helper's runtime, e.g. schema
    /// setup against [`BaseCrud::db`].
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl<E: CrudTable> Base for BaseCrud<E> {
    type Table = E;

    fn config(&self) -> &CrudConfig {
        self.inner.config()
    }

    fn relations(&self) -> &Relations<E> {
        Base::relations(&self.inner)
    }
}

impl<E> BaseCrud<E>
where
    E: CrudTable,
    E::Model: TableRow<E::Active>,
{
    /// Blocking [`AsyncBaseCrud::create`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::create`].
    pub fn create(&self, fields: Fields) -> Result<E::Model> {
        self.block_on(self.inner.create(fields))
    }

    /// Blocking [`AsyncBaseCrud::create_from`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::create_from`].
    pub fn create_from<P>(&self, orm: &P, fields: Fields) -> Result<E::Model>
    where
        P: Serialize + ?Sized,
    {
        self.block_on(self.inner.create_from(orm, fields))
    }

    /// Blocking [`AsyncBaseCrud::update`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::update`].
    pub fn update(&self, model: E::Model, fields: Fields) -> Result<E::Model> {
        self.block_on(self.inner.update(model, fields))
    }

    /// Blocking [`AsyncBaseCrud::update_from`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::update_from`].
    pub fn update_from<P>(&self, model: E::Model, orm: &P, fields: Fields) -> Result<E::Model>
    where
        P: Serialize + ?Sized,
    {
        self.block_on(self.inner.update_from(model, orm, fields))
    }

    /// Blocking [`AsyncBaseCrud::first`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::first`].
    pub fn first(&self, filters: Filters) -> Result<Option<Record<E::Model>>> {
        self.block_on(self.inner.first(filters))
    }

    /// Blocking [`AsyncBaseCrud::one`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::one`].
    pub fn one(&self, filters: Filters) -> Result<Record<E::Model>> {
        self.block_on(self.inner.one(filters))
    }

    /// Blocking [`AsyncBaseCrud::all`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::all`].
    pub fn all(&self, filters: Filters) -> Result<Vec<Record<E::Model>>> {
        self.block_on(self.inner.all(filters))
    }

    /// Blocking [`AsyncBaseCrud::count`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::count`].
    pub fn count(&self, filters: Filters) -> Result<u64> {
        self.block_on(self.inner.count(filters))
    }

    /// Blocking [`AsyncBaseCrud::get_else_create`].
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::get_else_create`].
    pub fn get_else_create(
        &self,
        filters: Filters,
        fields: Fields,
    ) -> Result<(Record<E::Model>, bool)> {
        self.block_on(self.inner.get_else_create(filters, fields))
    }
}
