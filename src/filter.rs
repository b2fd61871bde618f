//! Keyword filters.
//!
//! A [`Filters`] value is the Rust counterpart of a keyword-argument call such
//! as `first(name="Ada", with_books=True, order_by=[...])`. Entries keep the
//! order they were added in. Whether a keyword is a column filter or an
//! eager-load directive is decided when the query is built, using the
//! configured relation prefix (see [`crate::query::Base::build_query`]).

use sea_orm::{Value, sea_query::Order};

use crate::errors::{CrudError, Result};
use crate::sort::OrderBy;

/// Right-hand side of a keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// `column = value`
    Eq(Value),
    /// `column IS NULL`
    Null,
    /// `column IN (values)`
    In(Vec<Value>),
}

/// One keyword entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    /// A raw keyword: a column filter, or a relation directive when the key
    /// carries the relation prefix.
    Field { key: String, value: FilterValue },
    /// Always an eager-load directive.
    With(String),
}

/// Ordered keyword filters plus ordering clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    keywords: Vec<Keyword>,
    order_by: Vec<OrderBy>,
}

impl Filters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw keyword. Keys with the relation prefix (`with_` by default)
    /// request eager loading; their value is not inspected.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.push(Keyword::Field {
            key: key.into(),
            value: FilterValue::Eq(value.into()),
        });
        self
    }

    /// Equality filter. Same as [`Filters::set`]; reads better for columns.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value)
    }

    #[must_use]
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.keywords.push(Keyword::Field {
            key: column.into(),
            value: FilterValue::Null,
        });
        self
    }

    #[must_use]
    pub fn is_in<V, I>(mut self, column: impl Into<String>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.keywords.push(Keyword::Field {
            key: column.into(),
            value: FilterValue::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Eager-loads `relation` regardless of the configured prefix.
    #[must_use]
    pub fn with(mut self, relation: impl Into<String>) -> Self {
        self.keywords.push(Keyword::With(relation.into()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push(OrderBy::new(column, order));
        self
    }

    #[must_use]
    pub fn order_asc(self, column: impl Into<String>) -> Self {
        self.order_by(column, Order::Asc)
    }

    #[must_use]
    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.order_by(column, Order::Desc)
    }

    #[must_use]
    pub fn sort(mut self, order_by: OrderBy) -> Self {
        self.order_by.push(order_by);
        self
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.order_by.is_empty()
    }

    /// Builds filters from a JSON object of keywords, in document order.
    ///
    /// - `null` filters with `IS NULL`
    /// - booleans, numbers and strings compare as themselves
    /// - arrays become `IN (...)` over their scalar items
    ///
    /// Strings compared against a UUID column are parsed when the query is
    /// built, so text columns keep UUID-shaped values as text.
    ///
    /// # Errors
    ///
    /// Fails when the input is not an object, or a value is a nested object
    /// or an array holding non-scalars.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(CrudError::invalid_filter(
                "<root>",
                "filters must be a JSON object",
            ));
        };

        let mut filters = Self::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Null => FilterValue::Null,
                serde_json::Value::Array(items) => FilterValue::In(
                    items
                        .iter()
                        .map(|item| json_scalar(key, item))
                        .collect::<Result<_>>()?,
                ),
                other => FilterValue::Eq(json_scalar(key, other)?),
            };
            filters.keywords.push(Keyword::Field {
                key: key.clone(),
                value,
            });
        }
        Ok(filters)
    }

    /// Parses `filter` as JSON and forwards to [`Filters::from_json`].
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or any error of [`Filters::from_json`].
    pub fn from_json_str(filter: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(filter)
            .map_err(|e| CrudError::invalid_filter("<root>", e.to_string()))?;
        Self::from_json(&json)
    }
}

fn json_scalar(key: &str, value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Bool(b) => Ok((*b).into()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into())
            } else if let Some(u) = n.as_u64() {
                Ok(u.into())
            } else if let Some(f) = n.as_f64() {
                Ok(f.into())
            } else {
                Err(CrudError::invalid_filter(key, "unsupported number"))
            }
        }
        serde_json::Value::String(s) => Ok(s.clone().into()),
        serde_json::Value::Null => Err(CrudError::invalid_filter(key, "null inside a list")),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
            CrudError::invalid_filter(key, "nested values cannot be compared"),
        ),
    }
}
