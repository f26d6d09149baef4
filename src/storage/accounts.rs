//! Tenancy lookups and provisioning
//!
//! Account queries used by the identity gate and the query-scoping
//! checks, plus the insert helpers used for provisioning and seeding.

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::SeaOrmStorage;
use crate::errors::Result;
use migration::entities::{card, organization, user};

impl SeaOrmStorage {
    /// Find an active user by email (login path)
    pub async fn find_active_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn find_organization(&self, id: Uuid) -> Result<Option<organization::Model>> {
        Ok(organization::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_card(&self, id: Uuid) -> Result<Option<card::Model>> {
        Ok(card::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Create an organization, returning its id
    pub async fn insert_organization(&self, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        organization::Entity::insert(organization::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        })
        .exec(&self.db)
        .await?;
        Ok(id)
    }

    /// Create a user with an already-hashed password, returning its id
    pub async fn insert_user(
        &self,
        organization_id: Uuid,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: &str,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        user::Entity::insert(user::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            full_name: Set(full_name.to_string()),
            role: Set(role.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        })
        .exec(&self.db)
        .await?;
        Ok(id)
    }

    /// Create a card, returning its id
    pub async fn insert_card(
        &self,
        organization_id: Uuid,
        owner_id: Uuid,
        slug: &str,
        display_name: &str,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        card::Entity::insert(card::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            owner_id: Set(owner_id),
            slug: Set(slug.to_string()),
            display_name: Set(display_name.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        })
        .exec(&self.db)
        .await?;
        Ok(id)
    }
}
