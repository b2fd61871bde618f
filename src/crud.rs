//! Asynchronous create/read/update helper.
//!
//! ```rust,ignore
//! let authors = AsyncBaseCrud::<author::Entity>::new(db.clone());
//!
//! let ada = authors.create(Fields::new().set("name", "Ada")).await?;
//! let with_books = authors
//!     .one(Filters::new().eq("id", ada.id).set("with_books", true))
//!     .await?;
//! let renamed = authors
//!     .update(ada, Fields::new().set("name", "Ada Lovelace"))
//!     .await?;
//! ```

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, IdenStatic, IntoActiveModel, Iterable,
    ModelTrait, PaginatorTrait, PrimaryKeyToColumn, QuerySelect, QueryTrait, Select,
};
use serde::Serialize;

use crate::config::CrudConfig;
use crate::errors::{CrudError, Result};
use crate::filter::{FilterValue, Filters, Keyword};
use crate::models::{Fields, Record};
use crate::query::Base;
use crate::relations::Relations;
use crate::traits::{CrudTable, TableRow};
use crate::update::PartialUpdate;

/// CRUD helper for one table over a caller-supplied connection.
///
/// Transactions and pooling belong to the connection; every call here runs
/// its statements directly on it.
pub struct AsyncBaseCrud<E: CrudTable> {
    db: DatabaseConnection,
    config: CrudConfig,
    relations: Relations<E>,
}

impl<E: CrudTable> AsyncBaseCrud<E> {
    /// Helper with the default config and the relations of [`CrudTable::relations`].
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: CrudConfig::default(),
            relations: E::relations(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the relation registry.
    #[must_use]
    pub fn with_relations(mut self, relations: Relations<E>) -> Self {
        self.relations = relations;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<E: CrudTable> Base for AsyncBaseCrud<E> {
    type Table = E;

    fn config(&self) -> &CrudConfig {
        &self.config
    }

    fn relations(&self) -> &Relations<E> {
        &self.relations
    }
}

impl<E> AsyncBaseCrud<E>
where
    E: CrudTable,
    E::Model: TableRow<E::Active>,
{
    /// Inserts a row built from `fields`. Columns left out take their
    /// database or model defaults.
    ///
    /// # Errors
    ///
    /// `Database` if the fields do not form a model or the insert fails.
    pub async fn create(&self, fields: Fields) -> Result<E::Model> {
        self.insert(fields).await
    }

    /// Inserts a row from the fields of `orm`, with `fields` filling in what
    /// `orm` does not carry. Values of `orm` take precedence.
    ///
    /// # Errors
    ///
    /// As [`AsyncBaseCrud::create`], plus `Validation` if `orm` does not
    /// serialise to an object.
    pub async fn create_from<P>(&self, orm: &P, fields: Fields) -> Result<E::Model>
    where
        P: Serialize + ?Sized,
    {
        let mut fields = fields;
        fields.merge(Fields::from_serialize(orm)?);
        self.insert(fields).await
    }

    /// Applies `fields` to `model` and stores the columns that changed.
    ///
    /// # Errors
    ///
    /// `UnknownField`/`Validation` from [`PartialUpdate`], `ImmutableField`
    /// when a primary key would change, `Database` when the update fails.
    pub async fn update(&self, model: E::Model, fields: Fields) -> Result<E::Model> {
        self.persist_patch(model, None::<&serde_json::Value>, &fields)
            .await
    }

    /// Applies `orm`, then `fields`, to `model` and stores the columns that
    /// changed.
    ///
    /// # Errors
    ///
    /// See [`AsyncBaseCrud::update`].
    pub async fn update_from<P>(
        &self,
        model: E::Model,
        orm: &P,
        fields: Fields,
    ) -> Result<E::Model>
    where
        P: Serialize + ?Sized,
    {
        self.persist_patch(model, Some(orm), &fields).await
    }

    /// First row matching `filters`, if any.
    ///
    /// # Errors
    ///
    /// Query building errors, or `Database`.
    pub async fn first(&self, filters: Filters) -> Result<Option<Record<E::Model>>> {
        let (select, relations) = self.build_query(&filters)?.into_parts();
        self.log_select("first", &select);

        let Some(model) = select.one(&self.db).await? else {
            return Ok(None);
        };
        let mut records = self
            .relations
            .load_into(&self.db, vec![model], &relations)
            .await?;
        Ok(records.pop())
    }

    /// The single row matching `filters`.
    ///
    /// # Errors
    ///
    /// `NoResultFound` for no match, `MultipleResultsFound` for more than one.
    pub async fn one(&self, filters: Filters) -> Result<Record<E::Model>> {
        let (select, relations) = self.build_query(&filters)?.into_parts();
        self.log_select("one", &select);

        let mut models = select.limit(2u64).all(&self.db).await?;
        match models.len() {
            0 => return Err(CrudError::NoResultFound(E::resource_name())),
            1 => {}
            _ => return Err(CrudError::MultipleResultsFound(E::resource_name())),
        }
        models.truncate(1);

        let mut records = self
            .relations
            .load_into(&self.db, models, &relations)
            .await?;
        records
            .pop()
            .ok_or_else(|| CrudError::NoResultFound(E::resource_name()))
    }

    /// Every row matching `filters`.
    ///
    /// # Errors
    ///
    /// Query building errors, or `Database`.
    pub async fn all(&self, filters: Filters) -> Result<Vec<Record<E::Model>>> {
        let (select, relations) = self.build_query(&filters)?.into_parts();
        self.log_select("all", &select);

        let models = select.all(&self.db).await?;
        self.relations
            .load_into(&self.db, models, &relations)
            .await
    }

    /// Number of rows matching `filters`. Relation keywords are checked but
    /// nothing is loaded.
    ///
    /// # Errors
    ///
    /// Query building errors, or `Database`.
    pub async fn count(&self, filters: Filters) -> Result<u64> {
        let (select, _) = self.build_query(&filters)?.into_parts();
        self.log_select("count", &select);
        Ok(select.count(&self.db).await?)
    }

    /// First row matching `filters`, or a new row built from the equality
    /// filters plus `fields`. The flag is `true` when the row was created.
    ///
    /// Relations requested in `filters` are loaded in both cases. `IN`
    /// filters constrain the lookup only.
    ///
    /// # Errors
    ///
    /// Any error of [`AsyncBaseCrud::first`] or [`AsyncBaseCrud::create`].
    pub async fn get_else_create(
        &self,
        filters: Filters,
        fields: Fields,
    ) -> Result<(Record<E::Model>, bool)> {
        let relations = self.build_query(&filters)?.relations;
        if let Some(record) = self.first(filters.clone()).await? {
            return Ok((record, false));
        }

        let mut values = self.filter_fields(&filters)?;
        values.merge(fields);
        let model = self.insert(values).await?;

        let mut records = self
            .relations
            .load_into(&self.db, vec![model], &relations)
            .await?;
        let record = records
            .pop()
            .ok_or_else(|| CrudError::NoResultFound(E::resource_name()))?;
        Ok((record, true))
    }

    async fn insert(&self, fields: Fields) -> Result<E::Model> {
        tracing::debug!(
            table = %E::resource_name(),
            fields = fields.len(),
            "Creating row"
        );
        let active = <E::Active as ActiveModelTrait>::from_json(fields.into_json())?;
        Ok(active.insert(&self.db).await?)
    }

    async fn persist_patch<P>(
        &self,
        model: E::Model,
        orm: Option<&P>,
        fields: &Fields,
    ) -> Result<E::Model>
    where
        P: Serialize + ?Sized,
    {
        let patched = model.clone().patched(orm, fields)?;

        let mut changes = Vec::new();
        for column in E::Column::iter() {
            let value = patched.get(column);
            if value != model.get(column) {
                changes.push((column, value));
            }
        }

        if changes.is_empty() {
            tracing::debug!(table = %E::resource_name(), "Update without changes, skipping");
            return Ok(patched);
        }

        for (column, _) in &changes {
            let is_key =
                E::PrimaryKey::iter().any(|pk| pk.into_column().as_str() == column.as_str());
            if is_key {
                return Err(CrudError::ImmutableField(column.as_str().to_string()));
            }
        }

        tracing::debug!(
            table = %E::resource_name(),
            columns = ?changes.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>(),
            "Updating row"
        );

        let mut active: E::Active = model.into_active_model();
        for (column, value) in changes {
            active.set(column, value);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Equality keywords of `filters` as create fields.
    fn filter_fields(&self, filters: &Filters) -> Result<Fields> {
        let mut values = Fields::new();
        for keyword in filters.keywords() {
            let Keyword::Field { key, value } = keyword else {
                continue;
            };
            if self.config.relation_key(key).is_some() {
                continue;
            }
            if !E::Column::iter().any(|c| c.as_str() == key) {
                continue;
            }
            match value {
                FilterValue::Eq(v) => values = values.set(key.clone(), sea_value_to_json(key, v)?),
                FilterValue::Null => values = values.set(key.clone(), serde_json::Value::Null),
                FilterValue::In(_) => {}
            }
        }
        Ok(values)
    }

    fn log_select(&self, operation: &str, select: &Select<E>) {
        tracing::debug!(
            table = %E::resource_name(),
            operation,
            sql = %select.build(self.db.get_database_backend()),
            "Running query"
        );
    }
}

fn sea_value_to_json(key: &str, value: &sea_orm::Value) -> Result<serde_json::Value> {
    use sea_orm::Value as V;
    use serde_json::Value as J;

    let json = match value {
        V::Bool(v) => v.map_or(J::Null, J::from),
        V::TinyInt(v) => v.map_or(J::Null, J::from),
        V::SmallInt(v) => v.map_or(J::Null, J::from),
        V::Int(v) => v.map_or(J::Null, J::from),
        V::BigInt(v) => v.map_or(J::Null, J::from),
        V::TinyUnsigned(v) => v.map_or(J::Null, J::from),
        V::SmallUnsigned(v) => v.map_or(J::Null, J::from),
        V::Unsigned(v) => v.map_or(J::Null, J::from),
        V::BigUnsigned(v) => v.map_or(J::Null, J::from),
        V::Float(v) => v.map_or(J::Null, J::from),
        V::Double(v) => v.map_or(J::Null, J::from),
        V::Char(v) => v.map_or(J::Null, |c| J::from(c.to_string())),
        V::String(v) => v.as_ref().map_or(J::Null, |s| J::from(s.as_str())),
        V::Uuid(v) => v.as_ref().map_or(J::Null, |u| J::from(u.to_string())),
        V::Json(v) => v.as_ref().map_or(J::Null, |j| J::clone(j)),
        _ => {
            return Err(CrudError::invalid_filter(
                key,
                "value type cannot be used to create a row",
            ));
        }
    };
    Ok(json)
}
