//! In-memory [`AdvertRepository`] backing the unit and HTTP tests.
//!
//! Mirrors the PostgreSQL semantics: generated ids, a unique `header`, and
//! all-or-nothing writes. Data lives only as long as the repository.

use crate::error::DbError;
use crate::repository::AdvertRepository;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use core_types::{Advert, AdvertChanges, NewAdvert};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    unhealthy: Arc<AtomicBool>,
}

#[derive(Debug)]
struct LocalData {
    adverts: BTreeMap<i32, Advert>,
    next_id: i32,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            adverts: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl LocalData {
    fn header_taken(&self, header: &str, except: Option<i32>) -> bool {
        self.adverts
            .values()
            .any(|a| a.header == header && Some(a.id) != except)
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate storage going away (or coming back) for health checks.
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.adverts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AdvertRepository for LocalRepository {
    async fn health_check(&self) -> Result<bool, DbError> {
        Ok(!self.unhealthy.load(Ordering::SeqCst))
    }

    async fn get(&self, id: i32) -> Result<Advert, DbError> {
        self.data
            .read()
            .await
            .adverts
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn create(&self, advert: &NewAdvert) -> Result<Advert, DbError> {
        advert.validate()?;

        let mut data = self.data.write().await;
        if data.header_taken(&advert.header, None) {
            return Err(DbError::Conflict);
        }

        let id = data.next_id;
        data.next_id = id.checked_add(1).ok_or(DbError::IdsExhausted)?;
        let created = Advert {
            id,
            header: advert.header.clone(),
            description: advert.description.clone(),
            create_date: Utc::now().trunc_subsecs(6),
            owner: advert.owner.clone(),
        };
        data.adverts.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, changes: &AdvertChanges) -> Result<Advert, DbError> {
        changes.validate()?;

        let mut data = self.data.write().await;
        let mut advert = data.adverts.get(&id).cloned().ok_or(DbError::NotFound)?;
        if let Some(header) = &changes.header {
            if data.header_taken(header, Some(id)) {
                return Err(DbError::Conflict);
            }
        }

        changes.apply_to(&mut advert);
        data.adverts.insert(id, advert.clone());
        Ok(advert)
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        self.data
            .write()
            .await
            .adverts
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_advert(header: &str) -> NewAdvert {
        NewAdvert {
            header: header.to_string(),
            description: Some("desc".to_string()),
            owner: Some("owner".to_string()),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let first = repo.create(&new_advert("one")).await.unwrap();
        let second = repo.create(&new_advert("two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get(first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_id_space_exhaustion_is_an_error() {
        let repo = LocalRepository::new();
        repo.data.write().await.next_id = i32::MAX;

        let err = repo.create(&new_advert("last")).await.unwrap_err();
        assert!(matches!(err, DbError::IdsExhausted));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_header_is_a_conflict() {
        let repo = LocalRepository::new();
        repo.create(&new_advert("same")).await.unwrap();

        let err = repo.create(&new_advert("same")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_advert_is_not_stored() {
        let repo = LocalRepository::new();
        let err = repo
            .create(&new_advert(&"h".repeat(core_types::HEADER_MAX_LEN + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_overwrites_only_provided_fields() {
        let repo = LocalRepository::new();
        let created = repo.create(&new_advert("lamp")).await.unwrap();

        let changes = AdvertChanges {
            description: Some(Some("brand new".to_string())),
            ..Default::default()
        };
        let updated = repo.update(created.id, &changes).await.unwrap();

        assert_eq!(updated.description.as_deref(), Some("brand new"));
        assert_eq!(updated.header, created.header);
        assert_eq!(updated.owner, created.owner);
        assert_eq!(updated.create_date, created.create_date);
        assert_eq!(repo.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_to_taken_header_leaves_record_untouched() {
        let repo = LocalRepository::new();
        repo.create(&new_advert("taken")).await.unwrap();
        let other = repo.create(&new_advert("other")).await.unwrap();

        let changes = AdvertChanges {
            header: Some("taken".to_string()),
            owner: Some(None),
            ..Default::default()
        };
        let err = repo.update(other.id, &changes).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict));
        assert_eq!(repo.get(other.id).await.unwrap(), other);

        // Renaming to its own header is not a conflict.
        let same = AdvertChanges {
            header: Some("other".to_string()),
            ..Default::default()
        };
        assert!(repo.update(other.id, &same).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let repo = LocalRepository::new();
        assert!(matches!(repo.get(999_999).await, Err(DbError::NotFound)));
        assert!(matches!(
            repo.update(999_999, &AdvertChanges::default()).await,
            Err(DbError::NotFound)
        ));
        assert!(matches!(repo.delete(999_999).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = LocalRepository::new();
        let created = repo.create(&new_advert("chair")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(matches!(repo.get(created.id).await, Err(DbError::NotFound)));
        assert!(matches!(repo.delete(created.id).await, Err(DbError::NotFound)));
    }
}
