//! Process-local registry implementing every storage port.
//!
//! Used when no database URL is configured and by integration tests. State is
//! held behind one mutex so each call observes the writes of earlier calls,
//! and the archive units of work validate before mutating under that one
//! lock. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    ArchiveRepository, ArchiveRepositoryError, CommentRepository, CommentRepositoryError,
    ObstacleRepository, ObstacleRepositoryError, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    ArchivalRecord, ArchiveId, Comment, CommentAuthor, CommentId, CommentText, NewArchivalRecord,
    NewComment, NewObstacle, Obstacle, ObstacleId, ObstacleStatus, RestoredComment, UserId,
    UserRole,
};

const POISONED: &str = "in-memory registry lock poisoned";

#[derive(Debug, Default)]
struct RegistryState {
    obstacles: BTreeMap<i64, Obstacle>,
    comments: BTreeMap<i64, Comment>,
    archive: BTreeMap<i64, ArchivalRecord>,
    roles: HashMap<UserId, Vec<UserRole>>,
    last_obstacle_id: i64,
    last_comment_id: i64,
    last_archive_id: i64,
}

impl RegistryState {
    fn insert_obstacle(&mut self, obstacle: &NewObstacle) -> Obstacle {
        self.last_obstacle_id += 1;
        let id = ObstacleId::new(self.last_obstacle_id);
        let created = obstacle.clone().with_id(id);
        self.obstacles.insert(id.get(), created.clone());
        created
    }

    fn insert_comment(
        &mut self,
        obstacle_id: ObstacleId,
        text: CommentText,
        authored_by: CommentAuthor,
    ) -> Comment {
        self.last_comment_id += 1;
        let created = Comment {
            id: CommentId::new(self.last_comment_id),
            obstacle_id,
            text,
            authored_by,
        };
        self.comments.insert(created.id.get(), created.clone());
        created
    }

    /// Ids of the comments on `obstacle_id`, ascending.
    fn comment_trail(&self, obstacle_id: ObstacleId) -> Vec<i64> {
        self.comments
            .values()
            .filter(|comment| comment.obstacle_id == obstacle_id)
            .map(|comment| comment.id.get())
            .collect()
    }

    fn upsert_record(&mut self, record: &NewArchivalRecord) -> ArchivalRecord {
        let existing = self
            .archive
            .values()
            .find(|stored| stored.original_obstacle_id == record.original_obstacle_id)
            .map(|stored| stored.id);
        let id = match existing {
            Some(id) => id,
            None => {
                self.last_archive_id += 1;
                ArchiveId::new(self.last_archive_id)
            }
        };
        let stored = record.clone().with_id(id);
        self.archive.insert(id.get(), stored.clone());
        stored
    }
}

/// Shared in-memory store; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `user` an additional role. Returns `false` when the registry lock
    /// is poisoned.
    pub fn grant(&self, user: &UserId, role: UserRole) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let roles = state.roles.entry(user.clone()).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
        true
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>, String> {
        self.state.lock().map_err(|_| POISONED.to_owned())
    }
}

#[async_trait]
impl ObstacleRepository for MemoryRegistry {
    async fn find_by_id(
        &self,
        id: ObstacleId,
    ) -> Result<Option<Obstacle>, ObstacleRepositoryError> {
        let state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        Ok(state.obstacles.get(&id.get()).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        let state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        Ok(state
            .obstacles
            .values()
            .filter(|obstacle| obstacle.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: ObstacleStatus,
    ) -> Result<Vec<Obstacle>, ObstacleRepositoryError> {
        let state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        Ok(state
            .obstacles
            .values()
            .filter(|obstacle| obstacle.status() == status)
            .cloned()
            .collect())
    }

    async fn create(&self, obstacle: &NewObstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        let mut state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        let created = state.insert_obstacle(obstacle);
        debug!(obstacle_id = %created.id(), "obstacle stored in memory");
        Ok(created)
    }

    async fn replace(&self, obstacle: &Obstacle) -> Result<Obstacle, ObstacleRepositoryError> {
        let mut state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        let slot = state
            .obstacles
            .get_mut(&obstacle.id().get())
            .ok_or_else(|| {
                ObstacleRepositoryError::query(format!("obstacle {} does not exist", obstacle.id()))
            })?;
        *slot = obstacle.clone();
        Ok(obstacle.clone())
    }

    async fn delete(&self, id: ObstacleId) -> Result<bool, ObstacleRepositoryError> {
        let mut state = self.lock().map_err(ObstacleRepositoryError::connection)?;
        let removed = state.obstacles.remove(&id.get()).is_some();
        if removed {
            state.comments.retain(|_, comment| comment.obstacle_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for MemoryRegistry {
    async fn list_for_obstacle(
        &self,
        obstacle_id: ObstacleId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        self.list_by_obstacle_ids(&[obstacle_id]).await
    }

    async fn list_by_obstacle_ids(
        &self,
        obstacle_ids: &[ObstacleId],
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let state = self.lock().map_err(CommentRepositoryError::connection)?;
        Ok(state
            .comments
            .values()
            .filter(|comment| obstacle_ids.contains(&comment.obstacle_id))
            .cloned()
            .collect())
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::connection)?;
        if !state.obstacles.contains_key(&comment.obstacle_id.get()) {
            return Err(CommentRepositoryError::query(format!(
                "obstacle {} does not exist",
                comment.obstacle_id
            )));
        }
        Ok(state.insert_comment(
            comment.obstacle_id,
            comment.text.clone(),
            comment.authored_by,
        ))
    }

    async fn delete_many(&self, ids: &[CommentId]) -> Result<u64, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::connection)?;
        let removed = ids
            .iter()
            .filter(|id| state.comments.remove(&id.get()).is_some())
            .count();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl ArchiveRepository for MemoryRegistry {
    async fn find_by_id(
        &self,
        id: ArchiveId,
    ) -> Result<Option<ArchivalRecord>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::connection)?;
        Ok(state.archive.get(&id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<ArchivalRecord>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::connection)?;
        let mut records: Vec<_> = state.archive.values().cloned().collect();
        records.sort_by(|a, b| {
            b.archived_at
                .cmp(&a.archived_at)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(records)
    }

    async fn archive_obstacle(
        &self,
        record: &NewArchivalRecord,
        comment_ids: &[CommentId],
    ) -> Result<ArchivalRecord, ArchiveRepositoryError> {
        let mut state = self.lock().map_err(ArchiveRepositoryError::connection)?;
        let obstacle_id = record.original_obstacle_id;
        if !state.obstacles.contains_key(&obstacle_id.get()) {
            return Err(ArchiveRepositoryError::query(format!(
                "obstacle {obstacle_id} no longer exists"
            )));
        }
        let mut expected: Vec<i64> = comment_ids.iter().map(|id| id.get()).collect();
        expected.sort_unstable();
        if state.comment_trail(obstacle_id) != expected {
            return Err(ArchiveRepositoryError::query(format!(
                "comment trail of obstacle {obstacle_id} changed while archiving"
            )));
        }

        let stored = state.upsert_record(record);
        for id in expected {
            state.comments.remove(&id);
        }
        state.obstacles.remove(&obstacle_id.get());
        debug!(archive_id = %stored.id, %obstacle_id, "obstacle archived in memory");
        Ok(stored)
    }

    async fn restore_obstacle(
        &self,
        archive_id: ArchiveId,
        obstacle: &NewObstacle,
        comments: &[RestoredComment],
    ) -> Result<Obstacle, ArchiveRepositoryError> {
        let mut state = self.lock().map_err(ArchiveRepositoryError::connection)?;
        if !state.archive.contains_key(&archive_id.get()) {
            return Err(ArchiveRepositoryError::query(format!(
                "archived report {archive_id} no longer exists"
            )));
        }

        let created = state.insert_obstacle(obstacle);
        for comment in comments {
            state.insert_comment(created.id(), comment.text.clone(), comment.authored_by);
        }
        state.archive.remove(&archive_id.get());
        debug!(%archive_id, obstacle_id = %created.id(), "archived report restored in memory");
        Ok(created)
    }

    async fn delete(&self, id: ArchiveId) -> Result<bool, ArchiveRepositoryError> {
        let mut state = self.lock().map_err(ArchiveRepositoryError::connection)?;
        Ok(state.archive.remove(&id.get()).is_some())
    }
}

#[async_trait]
impl UserDirectory for MemoryRegistry {
    async fn roles_for(&self, user: &UserId) -> Result<Vec<UserRole>, UserDirectoryError> {
        let state = self.lock().map_err(UserDirectoryError::connection)?;
        Ok(state.roles.get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests;
