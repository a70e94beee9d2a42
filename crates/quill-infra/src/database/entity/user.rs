//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub avatar_handle: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub dob: Option<Date>,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_expires: Option<DateTimeWithTimeZone>,
    pub bookmarks: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            password_hash: model.password_hash,
            avatar_url: model.avatar_url,
            avatar_handle: model.avatar_handle,
            description: model.description,
            dob: model.dob,
            is_email_verified: model.is_email_verified,
            verification_token: model.verification_token,
            verification_expires: model.verification_expires.map(Into::into),
            bookmarks: model.bookmarks,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            phone: Set(user.phone),
            password_hash: Set(user.password_hash),
            avatar_url: Set(user.avatar_url),
            avatar_handle: Set(user.avatar_handle),
            description: Set(user.description),
            dob: Set(user.dob),
            is_email_verified: Set(user.is_email_verified),
            verification_token: Set(user.verification_token),
            verification_expires: Set(user.verification_expires.map(Into::into)),
            bookmarks: Set(user.bookmarks),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
