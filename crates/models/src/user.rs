use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a user; the id is assigned by the database.
///
/// A duplicate email surfaces as [`ModelError::Conflict`] from the unique index,
/// so concurrent registrations of the same email cannot both succeed.
pub async fn create(db: &DatabaseConnection, email: &str, password_hash: &str) -> Result<Model, ModelError> {
    if email.is_empty() { return Err(ModelError::Validation("email required".into())); }
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let am = ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_admin: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i64) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Operator action; the auth service itself never grants privileges.
pub async fn set_admin(db: &DatabaseConnection, id: i64, is_admin: bool) -> Result<(), ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    found.is_admin = Set(is_admin);
    found.update(db).await?;
    Ok(())
}
