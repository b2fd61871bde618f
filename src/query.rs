//! Translation of keyword filters into Sea-ORM queries, shared by the async
//! and blocking CRUD helpers.

use sea_orm::{
    ColumnTrait, ColumnType, EntityTrait, IdenStatic, Iterable, QueryFilter, QueryOrder, Select,
    Value,
};
use uuid::Uuid;

use crate::config::CrudConfig;
use crate::errors::{CrudError, Result};
use crate::filter::{FilterValue, Filters, Keyword};
use crate::relations::Relations;
use crate::traits::CrudTable;

/// A built query: the `SELECT` plus the relations to eager-load afterwards.
#[derive(Debug)]
pub struct CrudQuery<E: EntityTrait> {
    pub select: Select<E>,
    /// Requested relations, in keyword order, without duplicates.
    pub relations: Vec<String>,
}

impl<E: EntityTrait> CrudQuery<E> {
    pub fn into_parts(self) -> (Select<E>, Vec<String>) {
        (self.select, self.relations)
    }
}

/// Common ground of [`AsyncBaseCrud`](crate::AsyncBaseCrud) and
/// [`BaseCrud`](crate::BaseCrud).
pub trait Base {
    type Table: CrudTable;

    fn config(&self) -> &CrudConfig;

    fn relations(&self) -> &Relations<Self::Table>;

    /// Builds the query for `filters`.
    ///
    /// Keywords carrying the relation prefix (and [`Filters::with`] entries)
    /// become eager-load directives; every other keyword becomes a condition
    /// on the column of the same name. Ordering clauses follow in order.
    ///
    /// # Errors
    ///
    /// `UnknownRelation` for relations that are not registered;
    /// `UnknownColumn` for keys that name no column when
    /// [`CrudConfig::strict_columns`] is set.
    fn build_query(&self, filters: &Filters) -> Result<CrudQuery<Self::Table>> {
        build_query(filters, self.config(), self.relations())
    }
}

/// Free-standing form of [`Base::build_query`].
///
/// # Errors
///
/// See [`Base::build_query`].
pub fn build_query<E: CrudTable>(
    filters: &Filters,
    config: &CrudConfig,
    relations: &Relations<E>,
) -> Result<CrudQuery<E>> {
    let mut select = E::find();
    let mut eager: Vec<String> = Vec::new();

    for keyword in filters.keywords() {
        let (key, value) = match keyword {
            Keyword::With(relation) => {
                request_relation(&mut eager, relation, relations)?;
                continue;
            }
            Keyword::Field { key, value } => (key, value),
        };

        if let Some(relation) = config.relation_key(key) {
            request_relation(&mut eager, relation, relations)?;
            continue;
        }

        let Some(column) = resolve_column::<E>(key, config)? else {
            continue;
        };
        tracing::trace!(column = %key, ?value, "Adding filter");
        select = match value {
            FilterValue::Eq(v) => {
                select.filter(ColumnTrait::eq(&column, column_value::<E>(&column, key, v)?))
            }
            FilterValue::Null => select.filter(column.is_null()),
            FilterValue::In(values) => {
                let values = values
                    .iter()
                    .map(|v| column_value::<E>(&column, key, v))
                    .collect::<Result<Vec<_>>>()?;
                select.filter(column.is_in(values))
            }
        };
    }

    for order_by in filters.ordering() {
        if let Some(column) = resolve_column::<E>(&order_by.column, config)? {
            select = select.order_by(column, order_by.order.clone());
        }
    }

    tracing::debug!(
        table = %E::resource_name(),
        keywords = filters.keywords().len(),
        ordering = filters.ordering().len(),
        relations = ?eager,
        "Built query"
    );

    Ok(CrudQuery {
        select,
        relations: eager,
    })
}

fn request_relation<E: CrudTable>(
    eager: &mut Vec<String>,
    relation: &str,
    relations: &Relations<E>,
) -> Result<()> {
    if !relations.contains(relation) {
        return Err(CrudError::UnknownRelation {
            table: E::resource_name(),
            relation: relation.to_string(),
        });
    }
    if !eager.iter().any(|r| r == relation) {
        eager.push(relation.to_string());
    }
    Ok(())
}

/// Converts text bound for a UUID column into a UUID; everything else is
/// passed through for the database to compare.
fn column_value<E: CrudTable>(column: &E::Column, key: &str, value: &Value) -> Result<Value> {
    match (column.def().get_column_type(), value) {
        (ColumnType::Uuid, Value::String(Some(text))) => Uuid::parse_str(text.trim())
            .map(Value::from)
            .map_err(|e| CrudError::invalid_filter(key, e.to_string())),
        _ => Ok(value.clone()),
    }
}

/// Finds the column named `name`. `Ok(None)` means: unknown, but lenient.
fn resolve_column<E: CrudTable>(name: &str, config: &CrudConfig) -> Result<Option<E::Column>> {
    if let Some(column) = E::Column::iter().find(|c| c.as_str() == name) {
        return Ok(Some(column));
    }
    if config.strict_columns {
        return Err(CrudError::UnknownColumn {
            table: E::resource_name(),
            column: name.to_string(),
        });
    }
    tracing::warn!(table = %E::resource_name(), column = %name, "Ignoring unknown column");
    Ok(None)
}
