//! # Repository Contract
//!
//! A [`Repository`] owns the collection for one resource kind. It is deliberately
//! synchronous: the only caller is the [`ResourceActor`](crate::ResourceActor) that
//! owns it, which already serializes every operation. Services reach a repository
//! through a [`ResourceClient`](crate::ResourceClient) and never hold it directly.
//!
//! [`MemoryRepository`] is the in-process backend. Any other storage can be plugged
//! into [`ResourceActor::with_repository`](crate::ResourceActor::with_repository) as
//! long as it honours the same contract:
//!
//! - `find_all` returns entities in insertion order.
//! - `insert` rejects an id that is already present.
//! - `update_partial` rejects an id that is absent.
//! - `delete` reports whether something was removed instead of failing.
//! - `next_id` never hands out the same id twice, even after deletions.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use indexmap::IndexMap;

/// Storage contract for a single collection of entities.
pub trait Repository<T: ActorEntity>: Send {
    /// Looks up an entity by id.
    fn find_by_id(&self, id: &T::Id) -> Option<T>;

    /// Returns every entity, oldest first.
    fn find_all(&self) -> Vec<T>;

    /// Returns the first entity (in insertion order) matching `predicate`.
    fn find_by(&self, predicate: &dyn Fn(&T) -> bool) -> Option<T>;

    /// Stores a new entity. Fails with [`FrameworkError::AlreadyExists`] if its id is taken.
    fn insert(&mut self, entity: T) -> Result<T, FrameworkError>;

    /// Merges `patch` onto an existing entity and returns the result.
    /// Fails with [`FrameworkError::NotFound`] if the id is absent.
    fn update_partial(&mut self, id: &T::Id, patch: T::Patch) -> Result<T, FrameworkError>;

    /// Removes an entity. Returns `false` if nothing was stored under `id`.
    fn delete(&mut self, id: &T::Id) -> bool;

    /// Reserves a fresh id that is not in use and has never been handed out before.
    fn next_id(&mut self) -> T::Id;

    /// Number of stored entities.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered, in-memory repository.
#[derive(Debug)]
pub struct MemoryRepository<T: ActorEntity> {
    items: IndexMap<T::Id, T>,
    next_id: u64,
}

impl<T: ActorEntity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl<T: ActorEntity> Repository<T> for MemoryRepository<T> {
    fn find_by_id(&self, id: &T::Id) -> Option<T> {
        self.items.get(id).cloned()
    }

    fn find_all(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    fn find_by(&self, predicate: &dyn Fn(&T) -> bool) -> Option<T> {
        self.items.values().find(|item| predicate(item)).cloned()
    }

    fn insert(&mut self, entity: T) -> Result<T, FrameworkError> {
        let id = entity.id().clone();
        if self.items.contains_key(&id) {
            return Err(FrameworkError::AlreadyExists(id.to_string()));
        }
        self.items.insert(id, entity.clone());
        Ok(entity)
    }

    fn update_partial(&mut self, id: &T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.apply_patch(patch);
        Ok(item.clone())
    }

    fn delete(&mut self, id: &T::Id) -> bool {
        // shift_remove keeps the remaining entries in insertion order.
        self.items.shift_remove(id).is_some()
    }

    fn next_id(&mut self) -> T::Id {
        loop {
            let id = T::Id::from(self.next_id);
            self.next_id += 1;
            if !self.items.contains_key(&id) {
                return id;
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: u64,
        text: String,
    }

    #[derive(Debug)]
    struct NotePatch {
        text: Option<String>,
    }

    impl ActorEntity for Note {
        type Id = u64;
        type Create = String;
        type Patch = NotePatch;

        fn id(&self) -> &u64 {
            &self.id
        }

        fn from_create(id: u64, text: String) -> Self {
            Self { id, text }
        }

        fn apply_patch(&mut self, patch: NotePatch) {
            if let Some(text) = patch.text {
                self.text = text;
            }
        }
    }

    fn note(repo: &mut MemoryRepository<Note>, text: &str) -> Note {
        let id = repo.next_id();
        repo.insert(Note::from_create(id, text.to_string())).unwrap()
    }

    #[test]
    fn find_all_keeps_insertion_order_after_delete() {
        let mut repo = MemoryRepository::new();
        let a = note(&mut repo, "a");
        note(&mut repo, "b");
        note(&mut repo, "c");

        assert!(repo.delete(&a.id));
        let texts: Vec<_> = repo.find_all().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut repo = MemoryRepository::new();
        note(&mut repo, "a");
        let b = note(&mut repo, "b");
        assert!(repo.delete(&b.id));

        let c = note(&mut repo, "c");
        assert_eq!(c.id, 3);
    }

    #[test]
    fn next_id_skips_ids_inserted_directly() {
        let mut repo = MemoryRepository::new();
        repo.insert(Note::from_create(1, "manual".into())).unwrap();
        assert_eq!(repo.next_id(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut repo = MemoryRepository::new();
        repo.insert(Note::from_create(7, "x".into())).unwrap();
        let err = repo.insert(Note::from_create(7, "y".into())).unwrap_err();
        assert_eq!(err, FrameworkError::AlreadyExists("7".into()));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn update_partial_merges_and_rejects_unknown_id() {
        let mut repo = MemoryRepository::new();
        let a = note(&mut repo, "a");

        let unchanged = repo.update_partial(&a.id, NotePatch { text: None }).unwrap();
        assert_eq!(unchanged, a);

        let changed = repo
            .update_partial(&a.id, NotePatch { text: Some("z".into()) })
            .unwrap();
        assert_eq!(changed.text, "z");

        let err = repo
            .update_partial(&99, NotePatch { text: None })
            .unwrap_err();
        assert_eq!(err, FrameworkError::NotFound("99".into()));
    }

    #[test]
    fn delete_is_idempotent_and_find_by_matches() {
        let mut repo = MemoryRepository::new();
        let a = note(&mut repo, "a");
        note(&mut repo, "b");

        assert_eq!(repo.find_by(&|n: &Note| n.text == "b").map(|n| n.id), Some(2));
        assert!(repo.delete(&a.id));
        assert!(!repo.delete(&a.id));
        assert!(repo.find_by_id(&a.id).is_none());
    }
}
