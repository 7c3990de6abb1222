use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::game::GameId;
use crate::sync::Mutex;

/// One async lock per game ID.
///
/// Actions on the same game queue behind each other; different games never
/// contend. An entry lives only while some caller holds or waits for it.
#[derive(Debug, Default)]
pub(super) struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<AsyncMutex<()>>>>,
}

impl GameLocks {
    /// Waits for exclusive access to `id`.
    pub(super) async fn acquire(&self, id: GameId) -> GameGuard<'_> {
        let lock = Arc::clone(self.locks.lock().entry(id).or_default());
        GameGuard {
            locks: self,
            id,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Exclusive access to one game; drops the map entry once nobody else wants it.
pub(super) struct GameGuard<'a> {
    locks: &'a GameLocks,
    id: GameId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock();
        drop(self.guard.take());
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_game_serializes_and_drop_forgets() {
        let locks = GameLocks::default();
        let id = uuid::Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let lock = Arc::clone(locks.locks.lock().get(&id).unwrap());
        assert!(lock.try_lock().is_err());
        drop(guard);
        assert!(lock.try_lock().is_ok());
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn unknown_ids_leave_no_entries() {
        let locks = GameLocks::default();
        for _ in 0..1000 {
            drop(locks.acquire(uuid::Uuid::new_v4()).await);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn entry_survives_while_another_caller_waits() {
        let locks = Arc::new(GameLocks::default());
        let id = uuid::Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                drop(locks.acquire(id).await);
            })
        };
        while Arc::strong_count(locks.locks.lock().get(&id).unwrap()) < 3 {
            tokio::task::yield_now().await;
        }

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
