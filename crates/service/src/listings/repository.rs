use async_trait::async_trait;

use super::domain::{Listing, ListingChanges, NewListing, SearchQuery};
use crate::errors::ServiceError;

/// Repository abstraction for listing persistence.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// All listings, newest first.
    async fn list_recent(&self) -> Result<Vec<Listing>, ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Listing>, ServiceError>;
    async fn insert(&self, new: NewListing) -> Result<Listing, ServiceError>;
    /// Writes exactly the columns named by `changes`.
    async fn update(&self, id: i32, changes: ListingChanges) -> Result<(), ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    /// Matching listings, newest first.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockListingRepository {
        rows: Mutex<BTreeMap<i32, Listing>>, // key: listing id
        next_id: Mutex<i32>,
    }

    impl MockListingRepository {
        fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<i32, Listing>>, ServiceError> {
            self.rows.lock().map_err(|_| ServiceError::Db("mock store poisoned".into()))
        }

        fn sorted(mut rows: Vec<Listing>) -> Vec<Listing> {
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            rows
        }
    }

    #[async_trait]
    impl ListingRepository for MockListingRepository {
        async fn list_recent(&self) -> Result<Vec<Listing>, ServiceError> {
            let rows = self.rows()?;
            Ok(Self::sorted(rows.values().cloned().collect()))
        }

        async fn find(&self, id: i32) -> Result<Option<Listing>, ServiceError> {
            Ok(self.rows()?.get(&id).cloned())
        }

        async fn insert(&self, new: NewListing) -> Result<Listing, ServiceError> {
            let id = {
                let mut next = self.next_id.lock().map_err(|_| ServiceError::Db("mock store poisoned".into()))?;
                *next += 1;
                *next
            };
            let listing = Listing {
                id,
                user_id: new.user_id.0,
                title: new.title,
                description: new.description,
                salary: new.salary,
                tags: new.tags,
                company: new.company,
                address: new.address,
                city: new.city,
                state: new.state,
                phone: new.phone,
                email: new.email,
                requirements: new.requirements,
                benefits: new.benefits,
                created_at: chrono::Utc::now().into(),
            };
            self.rows()?.insert(id, listing.clone());
            Ok(listing)
        }

        async fn update(&self, id: i32, changes: ListingChanges) -> Result<(), ServiceError> {
            let mut rows = self.rows()?;
            let listing = rows.get_mut(&id).ok_or_else(|| ServiceError::not_found("listing"))?;
            changes.apply_to(listing);
            Ok(())
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows()?.remove(&id).is_some())
        }

        async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>, ServiceError> {
            let rows = self.rows()?;
            Ok(Self::sorted(rows.values().filter(|l| query.matches(l)).cloned().collect()))
        }
    }
}
