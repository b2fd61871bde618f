use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityName, EntityTrait, IntoActiveModel, TryIntoModel,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::relations::Relations;

/// Binds a Sea-ORM entity to the CRUD helpers.
///
/// ```rust,ignore
/// impl CrudTable for author::Entity {
///     type Active = author::ActiveModel;
///
///     fn relations() -> Relations<Self> {
///         Relations::new().many::<book::Entity>("books")
///     }
/// }
/// ```
pub trait CrudTable: EntityTrait + Sync {
    type Active: ActiveModelTrait<Entity = Self>
        + ActiveModelBehavior
        + TryIntoModel<Self::Model>
        + Send
        + Sync;

    /// Relations that `with_<name>` keywords may eager-load.
    #[must_use]
    fn relations() -> Relations<Self> {
        Relations::new()
    }

    /// Name used in errors and logs; the table name by default.
    #[must_use]
    fn resource_name() -> String {
        EntityName::table_name(&Self::default()).to_string()
    }
}

/// Models the helpers can create, patch and persist.
pub trait TableRow<A>:
    IntoActiveModel<A> + Serialize + DeserializeOwned + Clone + Send + Sync
where
    A: ActiveModelTrait,
{
}

impl<T, A> TableRow<A> for T
where
    A: ActiveModelTrait,
    T: IntoActiveModel<A> + Serialize + DeserializeOwned + Clone + Send + Sync,
{
}
