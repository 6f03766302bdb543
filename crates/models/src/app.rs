use sea_orm::{entity::prelude::*, DatabaseConnection, Set};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "app")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub secret: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Insert the app, or overwrite name and secret when the id already exists.
pub async fn upsert(db: &DatabaseConnection, id: i32, name: &str, secret: &str) -> Result<Model, ModelError> {
    if id == 0 { return Err(ModelError::Validation("app id must be non-zero".into())); }
    if secret.is_empty() { return Err(ModelError::Validation("app secret required".into())); }
    match Entity::find_by_id(id).one(db).await? {
        Some(existing) => {
            let mut am: ActiveModel = existing.into();
            am.name = Set(name.to_string());
            am.secret = Set(secret.to_string());
            Ok(am.update(db).await?)
        }
        None => {
            let am = ActiveModel {
                id: Set(id),
                name: Set(name.to_string()),
                secret: Set(secret.to_string()),
            };
            Ok(am.insert(db).await?)
        }
    }
}
