use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};

use crate::error::GameError;
use crate::models::room::Room;

/// A transform applied under the store's atomic update. Returning `Ok(None)`
/// means "unchanged": the write is skipped and nothing is broadcast, which is
/// what makes duplicate advance triggers no-ops.
pub type RoomTransform<'a> = &'a (dyn Fn(&Room) -> Result<Option<Room>, GameError> + Send + Sync);

/// The synchronization-service contract. The engine is written purely against
/// this trait; `MemoryStore` is the in-process implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, code: &str) -> Option<Room>;

    /// Subscribe to every committed change of one room's document. Returns
    /// `None` when no such room exists.
    async fn subscribe(&self, code: &str) -> Option<broadcast::Receiver<Room>>;

    /// Read-modify-write with optimistic concurrency: the transform runs
    /// against a snapshot and commits only if no other writer got there
    /// first; conflicts are retried a bounded number of times.
    async fn atomic_update(&self, code: &str, f: RoomTransform<'_>) -> Result<Room, GameError>;

    /// Shallow merge of top-level document fields.
    async fn merge(&self, code: &str, partial: serde_json::Value) -> Result<Room, GameError>;

    /// Returns false when the code is already taken.
    async fn insert_if_absent(&self, code: &str, room: Room) -> bool;

    async fn remove(&self, code: &str) -> bool;
}

const MAX_CAS_RETRIES: usize = 5;
const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Default)]
pub struct MemoryStore {
    rooms: Arc<Mutex<HashMap<String, (u64, Room)>>>,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Room>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn channel(&self, code: &str) -> broadcast::Sender<Room> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(code.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    async fn notify(&self, room: &Room) {
        // A send error just means nobody is subscribed right now.
        let _ = self.channel(&room.code).await.send(room.clone());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, code: &str) -> Option<Room> {
        self.rooms.lock().await.get(code).map(|(_, r)| r.clone())
    }

    async fn subscribe(&self, code: &str) -> Option<broadcast::Receiver<Room>> {
        // Unknown codes get no channel entry, so junk subscriptions cannot
        // grow the channels map.
        if !self.rooms.lock().await.contains_key(code) {
            return None;
        }
        Some(self.channel(code).await.subscribe())
    }

    async fn atomic_update(&self, code: &str, f: RoomTransform<'_>) -> Result<Room, GameError> {
        for _ in 0..MAX_CAS_RETRIES {
            let (version, snapshot) = {
                let rooms = self.rooms.lock().await;
                let (version, room) = rooms.get(code).ok_or(GameError::RoomNotFound)?;
                (*version, room.clone())
            };

            let updated = match f(&snapshot)? {
                Some(room) => room,
                None => return Ok(snapshot),
            };

            let mut rooms = self.rooms.lock().await;
            match rooms.get_mut(code) {
                Some((current, room)) if *current == version => {
                    let mut updated = updated;
                    updated.updated_at = Utc::now();
                    *current += 1;
                    *room = updated.clone();
                    drop(rooms);
                    self.notify(&updated).await;
                    return Ok(updated);
                }
                Some(_) => continue,
                None => return Err(GameError::RoomNotFound),
            }
        }
        Err(GameError::ConcurrentModification)
    }

    async fn merge(&self, code: &str, partial: serde_json::Value) -> Result<Room, GameError> {
        self.atomic_update(code, &move |room: &Room| {
            let mut doc = serde_json::to_value(room)
                .map_err(|e| GameError::invalid(format!("serialize failed: {e}")))?;
            if let (Some(doc), Some(partial)) = (doc.as_object_mut(), partial.as_object()) {
                for (key, value) in partial {
                    doc.insert(key.clone(), value.clone());
                }
            }
            let merged: Room = serde_json::from_value(doc)
                .map_err(|e| GameError::invalid(format!("merge produced invalid room: {e}")))?;
            if merged == *room {
                return Ok(None);
            }
            Ok(Some(merged))
        })
        .await
    }

    async fn insert_if_absent(&self, code: &str, room: Room) -> bool {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(code) {
            return false;
        }
        rooms.insert(code.to_string(), (0, room));
        true
    }

    async fn remove(&self, code: &str) -> bool {
        self.channels.lock().await.remove(code);
        self.rooms.lock().await.remove(code).is_some()
    }
}
