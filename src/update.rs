//! In-place updates from partial data, available on every serde model.
//!
//! ```rust,ignore
//! use basecrud::{Fields, PartialUpdate};
//!
//! author.update_from(Some(&form), &Fields::new().set("name", "Ada"))?;
//! ```
//!
//! The partial object is applied first, keyword fields second, so keywords
//! win. The merged data is validated by deserialising it back into the model
//! type. Fields a partial type serialises as `null` overwrite the model's
//! value; skip them with `#[serde(skip_serializing_if = "Option::is_none")]`
//! to leave them untouched.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::errors::{CrudError, Result};
use crate::models::Fields;

pub trait PartialUpdate: Sized {
    /// Applies `partial` and then `fields` to `self`.
    ///
    /// # Errors
    ///
    /// `UnknownField` for keys the model does not have, `Validation` when the
    /// result does not deserialise as the model. `self` is unchanged on error.
    fn update_from<P: Serialize + ?Sized>(
        &mut self,
        partial: Option<&P>,
        fields: &Fields,
    ) -> Result<&mut Self>;

    /// [`PartialUpdate::update_from`] without a partial object.
    ///
    /// # Errors
    ///
    /// See [`PartialUpdate::update_from`].
    fn update_fields(&mut self, fields: &Fields) -> Result<&mut Self> {
        self.update_from(None::<&Value>, fields)
    }

    /// Consuming form of [`PartialUpdate::update_from`].
    ///
    /// # Errors
    ///
    /// See [`PartialUpdate::update_from`].
    fn patched<P: Serialize + ?Sized>(
        mut self,
        partial: Option<&P>,
        fields: &Fields,
    ) -> Result<Self> {
        self.update_from(partial, fields)?;
        Ok(self)
    }
}

impl<T> PartialUpdate for T
where
    T: Serialize + DeserializeOwned,
{
    fn update_from<P: Serialize + ?Sized>(
        &mut self,
        partial: Option<&P>,
        fields: &Fields,
    ) -> Result<&mut Self> {
        let mut current = into_object(serde_json::to_value(&*self)?)?;

        if let Some(partial) = partial {
            let partial = into_object(serde_json::to_value(partial)?)?;
            apply(&mut current, partial)?;
        }
        apply(
            &mut current,
            fields.iter().map(|(k, v)| (k.clone(), v.clone())),
        )?;

        *self = serde_json::from_value(Value::Object(current))?;
        Ok(self)
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CrudError::Validation(serde::de::Error::custom(
            "expected a value that serialises to an object",
        ))),
    }
}

fn apply(
    current: &mut Map<String, Value>,
    changes: impl IntoIterator<Item = (String, Value)>,
) -> Result<()> {
    for (key, value) in changes {
        match current.get_mut(&key) {
            Some(slot) => *slot = value,
            None => return Err(CrudError::UnknownField(key)),
        }
    }
    Ok(())
}
