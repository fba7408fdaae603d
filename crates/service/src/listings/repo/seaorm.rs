use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use models::listing;

use crate::errors::ServiceError;
use crate::listings::domain::{Listing, ListingChanges, NewListing, SearchQuery};
use crate::listings::repository::ListingRepository;

pub struct SeaOrmListingRepository {
    pub db: DatabaseConnection,
}

fn optional(change: Option<Option<String>>) -> sea_orm::ActiveValue<Option<String>> {
    match change {
        Some(value) => Set(value),
        None => NotSet,
    }
}

/// Active model keyed by `id` with only the changed columns set, so the
/// UPDATE statement names exactly those columns.
pub fn changes_to_active_model(id: i32, changes: ListingChanges) -> listing::ActiveModel {
    listing::ActiveModel {
        id: Unchanged(id),
        user_id: NotSet,
        title: Set(changes.title),
        description: Set(changes.description),
        salary: Set(changes.salary),
        tags: optional(changes.tags),
        company: optional(changes.company),
        address: optional(changes.address),
        city: Set(changes.city),
        state: Set(changes.state),
        phone: optional(changes.phone),
        email: Set(changes.email),
        requirements: optional(changes.requirements),
        benefits: optional(changes.benefits),
        created_at: NotSet,
    }
}

#[async_trait::async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn list_recent(&self) -> Result<Vec<Listing>, ServiceError> {
        Ok(listing::newest_first().all(&self.db).await?)
    }

    async fn find(&self, id: i32) -> Result<Option<Listing>, ServiceError> {
        Ok(listing::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, new: NewListing) -> Result<Listing, ServiceError> {
        let am = listing::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id.0),
            title: Set(new.title),
            description: Set(new.description),
            salary: Set(new.salary),
            tags: Set(new.tags),
            company: Set(new.company),
            address: Set(new.address),
            city: Set(new.city),
            state: Set(new.state),
            phone: Set(new.phone),
            email: Set(new.email),
            requirements: Set(new.requirements),
            benefits: Set(new.benefits),
            created_at: Set(Utc::now().into()),
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update(&self, id: i32, changes: ListingChanges) -> Result<(), ServiceError> {
        let res = listing::Entity::update_many()
            .set(changes_to_active_model(id, changes))
            .filter(listing::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("listing"));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = listing::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, ServiceError> {
        listing::newest_first()
            .filter(listing::search_condition(&query.keywords, &query.location))
            .all(&self.db)
            .await
            .map_err(ServiceError::from)
    }
}
