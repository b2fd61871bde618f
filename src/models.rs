use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::errors::{CrudError, Result};

/// A model together with the relations loaded for it.
///
/// Serialises flat: the model's fields and one key per loaded relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<M> {
    #[serde(flatten)]
    model: M,
    #[serde(flatten)]
    related: BTreeMap<String, Value>,
}

impl<M> Record<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            related: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn into_parts(self) -> (M, BTreeMap<String, Value>) {
        (self.model, self.related)
    }

    /// Raw JSON of a loaded relation; `None` if it was not requested.
    pub fn related(&self, name: &str) -> Option<&Value> {
        self.related.get(name)
    }

    /// Deserialises a loaded relation, e.g. into `Vec<book::Model>`.
    ///
    /// # Errors
    ///
    /// `RelationNotLoaded` if the relation was not loaded, `Validation` if it
    /// does not deserialise as `T`.
    pub fn related_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .related
            .get(name)
            .ok_or_else(|| CrudError::RelationNotLoaded(name.to_string()))?;
        Ok(T::deserialize(value)?)
    }

    pub fn loaded_relations(&self) -> impl Iterator<Item = &str> {
        self.related.keys().map(String::as_str)
    }

    pub(crate) fn insert_related(&mut self, name: String, value: Value) {
        self.related.insert(name, value);
    }
}

impl<M> Deref for Record<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M> DerefMut for Record<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}

impl<M> From<M> for Record<M> {
    fn from(model: M) -> Self {
        Self::new(model)
    }
}

/// Keyword values for create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Map<String, Value>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any earlier value.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Serialises `value` into the field map.
    ///
    /// # Errors
    ///
    /// Fails if `value` does not serialise.
    pub fn set_serialized<T: Serialize + ?Sized>(
        mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Takes every field `object` serialises to.
    ///
    /// # Errors
    ///
    /// Fails if `object` does not serialise to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(object: &T) -> Result<Self> {
        Self::try_from(serde_json::to_value(object)?)
    }

    /// Inserts every entry of `other`, overriding existing keys.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Fields {
    type Error = CrudError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CrudError::invalid_filter(
                "<fields>",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
