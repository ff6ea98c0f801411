use async_trait::async_trait;
use quiz_core::model::{Category, CategoryId, CategoryPoints, Flashcard, SetId, UserProfile};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Card store: category documents and their point counters.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Persist or update a category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError>;

    /// Fetch a category by ID, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError>;

    /// Overwrite the point counter of an existing category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the category is missing.
    async fn update_points(&self, points: CategoryPoints) -> Result<(), StorageError>;
}

/// Card store: flashcards grouped by set.
#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    /// Persist or update a flashcard.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the card cannot be stored.
    async fn upsert_flashcard(&self, card: &Flashcard) -> Result<(), StorageError>;

    /// All cards of a set, ordered by card ID. Empty if the set has none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn cards_for_set(&self, set_id: SetId) -> Result<Vec<Flashcard>, StorageError>;
}

/// Profile store for the single local user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Load the profile, returning a fresh one if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend or decoding failures.
    async fn load_profile(&self) -> Result<UserProfile, StorageError>;

    /// Replace the stored profile with `profile`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Persists the outcome of a rewarded quiz as one write.
#[async_trait]
pub trait RewardPersistence: Send + Sync {
    /// Store the profile and category counter together; neither is written if
    /// the other fails.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the category is missing, or other
    /// storage errors.
    async fn persist_reward(
        &self,
        profile: &UserProfile,
        points: CategoryPoints,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    categories: Arc<Mutex<HashMap<CategoryId, Category>>>,
    cards: Arc<Mutex<HashMap<SetId, BTreeMap<u64, Flashcard>>>>,
    profile: Arc<Mutex<UserProfile>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        let mut guard = self.categories.lock().map_err(poisoned)?;
        guard.insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError> {
        let guard = self.categories.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn update_points(&self, points: CategoryPoints) -> Result<(), StorageError> {
        let mut guard = self.categories.lock().map_err(poisoned)?;
        let existing = guard
            .remove(&points.category_id())
            .ok_or(StorageError::NotFound)?;
        guard.insert(existing.id(), existing.with_points(points));
        Ok(())
    }
}

#[async_trait]
impl FlashcardRepository for InMemoryRepository {
    async fn upsert_flashcard(&self, card: &Flashcard) -> Result<(), StorageError> {
        let mut guard = self.cards.lock().map_err(poisoned)?;
        guard
            .entry(card.set_id())
            .or_default()
            .insert(card.id().value(), card.clone());
        Ok(())
    }

    async fn cards_for_set(&self, set_id: SetId) -> Result<Vec<Flashcard>, StorageError> {
        let guard = self.cards.lock().map_err(poisoned)?;
        Ok(guard
            .get(&set_id)
            .map(|cards| cards.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn load_profile(&self) -> Result<UserProfile, StorageError> {
        let guard = self.profile.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut guard = self.profile.lock().map_err(poisoned)?;
        *guard = profile.clone();
        Ok(())
    }
}

#[async_trait]
impl RewardPersistence for InMemoryRepository {
    async fn persist_reward(
        &self,
        profile: &UserProfile,
        points: CategoryPoints,
    ) -> Result<(), StorageError> {
        let mut categories = self.categories.lock().map_err(poisoned)?;
        let mut stored = self.profile.lock().map_err(poisoned)?;

        let existing = categories
            .get(&points.category_id())
            .cloned()
            .ok_or(StorageError::NotFound)?;
        categories.insert(existing.id(), existing.with_points(points));
        *stored = profile.clone();
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub categories: Arc<dyn CategoryRepository>,
    pub cards: Arc<dyn FlashcardRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub rewards: Arc<dyn RewardPersistence>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            categories: Arc::new(repo.clone()),
            cards: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            rewards: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::CardId;

    fn card(id: u64, set: u64) -> Flashcard {
        Flashcard::new(
            CardId::new(id),
            format!("Q{id}"),
            format!("A{id}"),
            CategoryId::new(1),
            SetId::new(set),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn cards_are_grouped_by_set_and_ordered() {
        let repo = InMemoryRepository::new();
        for (id, set) in [(3, 1), (1, 1), (2, 2)] {
            repo.upsert_flashcard(&card(id, set)).await.unwrap();
        }

        let set_one = repo.cards_for_set(SetId::new(1)).await.unwrap();
        let ids: Vec<_> = set_one.iter().map(|c| c.id().value()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(repo.cards_for_set(SetId::new(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_points_requires_existing_category() {
        let repo = InMemoryRepository::new();
        let err = repo
            .update_points(CategoryPoints::new(CategoryId::new(5), 10))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));

        repo.upsert_category(&Category::new(CategoryId::new(5), "Maths", 0))
            .await
            .unwrap();
        repo.update_points(CategoryPoints::new(CategoryId::new(5), 10))
            .await
            .unwrap();
        let found = repo.find_category(CategoryId::new(5)).await.unwrap().unwrap();
        assert_eq!(found.points().points(), 10);
        assert_eq!(found.name(), "Maths");
    }

    #[tokio::test]
    async fn persist_reward_writes_nothing_when_category_missing() {
        let repo = InMemoryRepository::new();
        let profile = UserProfile::from_persisted(40, 20, [SetId::new(1)], [], 0, []);

        let err = repo
            .persist_reward(&profile, CategoryPoints::new(CategoryId::new(1), 40))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert_eq!(repo.load_profile().await.unwrap(), UserProfile::new());
    }
}
