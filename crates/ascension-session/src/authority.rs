//! The session authority: the single in-memory truth for active sessions.
//!
//! While a session is resident, every read and write goes through this
//! registry; the database only sees checkpoints. The registry is a map of
//! per-session slots behind an outer `RwLock`, with each slot guarded by
//! its own `Mutex` so mutations to one session never block another. The
//! outer lock is held only for map lookups and membership changes, never
//! across a gateway call.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ascension_sim::{validate_character, validate_world_time};
use ascension_types::{CharacterId, CharacterSnapshot, SessionId, SessionState, WorldTime};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, RwLock};

use crate::error::{GatewayError, SessionError};
use crate::gateway::PersistenceGateway;

/// A resident session plus the bookkeeping that never leaves memory.
#[derive(Debug)]
pub struct SessionRecord {
    /// The persistable truth of the session.
    pub state: SessionState,
    /// Whether the in-memory state has diverged from storage.
    pub dirty: bool,
    /// When the session was loaded into the authority.
    pub loaded_at: DateTime<Utc>,
    /// When the session was last flushed, if ever.
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// What happened when a session was unloaded.
///
/// Eviction always succeeds; only the final flush can fail, and the error
/// is carried here rather than blocking the eviction.
#[derive(Debug)]
pub struct UnloadOutcome {
    /// Whether a final flush wrote the state to storage.
    pub flushed: bool,
    /// The flush failure, if the state was dirty and the write failed.
    pub flush_error: Option<GatewayError>,
}

/// Owner of all resident session state.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self`.
pub struct SessionAuthority {
    gateway: Arc<dyn PersistenceGateway>,
    sessions: RwLock<BTreeMap<SessionId, Arc<Mutex<SessionRecord>>>>,
    by_character: RwLock<BTreeMap<CharacterId, SessionId>>,
    flushes_in_flight: AtomicUsize,
    flush_done: Notify,
}

impl SessionAuthority {
    /// Create an authority over the given persistence gateway.
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            sessions: RwLock::new(BTreeMap::new()),
            by_character: RwLock::new(BTreeMap::new()),
            flushes_in_flight: AtomicUsize::new(0),
            flush_done: Notify::new(),
        }
    }

    /// Load a session into the authority, or serve it if already resident.
    ///
    /// A resident session is served from memory without touching storage.
    /// Two concurrent loads of the same non-resident session both succeed;
    /// the first to insert wins and the other is served the resident copy.
    ///
    /// Loaded snapshots are validated before they become resident: a stored
    /// row that breaks a domain invariant (qi outside the core, fatigue out
    /// of range, calendar fields that disagree with the tick counter) is
    /// rejected as a decode failure instead of being served as truth.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session exists neither in
    /// memory nor in storage, or [`SessionError::Storage`] if the gateway
    /// read fails or the stored snapshot fails validation.
    pub async fn load_session(&self, id: SessionId) -> Result<SessionState, SessionError> {
        if let Some(slot) = self.resident(id).await {
            let record = slot.lock().await;
            return Ok(record.state.clone());
        }

        let state = self
            .gateway
            .find_session(id)
            .await?
            .ok_or(SessionError::NotFound(id))?;

        validate_character(&state.character)
            .and_then(|()| validate_world_time(&state.time))
            .map_err(|error| GatewayError::Decode(error.to_string()))?;

        let mut sessions = self.sessions.write().await;
        if let Some(slot) = sessions.get(&id).cloned() {
            // Lost the race to another load; serve the resident copy.
            drop(sessions);
            let record = slot.lock().await;
            return Ok(record.state.clone());
        }

        let character_id = state.character_id;
        let record = SessionRecord {
            state: state.clone(),
            dirty: false,
            loaded_at: Utc::now(),
            last_saved_at: None,
        };
        sessions.insert(id, Arc::new(Mutex::new(record)));
        drop(sessions);

        self.by_character.write().await.insert(character_id, id);

        tracing::info!(session_id = %id, character_id = %character_id, "Session loaded");
        Ok(state)
    }

    /// Read the current state of a resident session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session is not resident;
    /// reads never fall through to storage.
    pub async fn get_session_state(&self, id: SessionId) -> Result<SessionState, SessionError> {
        let slot = self.resident(id).await.ok_or(SessionError::NotFound(id))?;
        let record = slot.lock().await;
        Ok(record.state.clone())
    }

    /// Look up the resident session playing the given character.
    ///
    /// Serves route callers that know only the character. Like
    /// [`Self::get_session_state`], this never falls through to storage.
    pub async fn session_for_character(
        &self,
        character_id: CharacterId,
    ) -> Option<SessionState> {
        let id = self.by_character.read().await.get(&character_id).copied()?;
        let slot = self.resident(id).await?;
        let record = slot.lock().await;
        Some(record.state.clone())
    }

    /// Apply a mutation to a resident session under its slot lock.
    ///
    /// The closure runs with exclusive access to the character and clock,
    /// so concurrent mutations of the same session serialize and none is
    /// lost. The record is marked dirty only when the transform actually
    /// changed the snapshot; the post-mutation state is returned alongside
    /// the closure's value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session is not resident,
    /// including when it was evicted while this call waited for its slot.
    pub async fn mutate<T>(
        &self,
        id: SessionId,
        transform: impl FnOnce(&mut CharacterSnapshot, &mut WorldTime) -> T,
    ) -> Result<(T, SessionState), SessionError> {
        let slot = self.resident(id).await.ok_or(SessionError::NotFound(id))?;
        let mut record = slot.lock().await;
        // The slot may have been evicted while we waited for its lock; a
        // write to an orphaned record would never reach storage.
        if !self.still_registered(id, &slot).await {
            return Err(SessionError::NotFound(id));
        }
        let record = &mut *record;
        let before = record.state.clone();
        let value = transform(&mut record.state.character, &mut record.state.time);
        if record.state != before {
            record.dirty = true;
        }
        Ok((value, record.state.clone()))
    }

    /// Checkpoint a resident session to storage if it is dirty.
    ///
    /// A clean session returns without touching the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session is not resident,
    /// or [`SessionError::Storage`] if the write fails. A failed flush
    /// leaves the record dirty so a later checkpoint retries it.
    pub async fn flush_session(&self, id: SessionId) -> Result<(), SessionError> {
        let slot = self.resident(id).await.ok_or(SessionError::NotFound(id))?;
        let mut record = slot.lock().await;
        if !self.still_registered(id, &slot).await {
            return Err(SessionError::NotFound(id));
        }
        if !record.dirty {
            return Ok(());
        }
        self.flush_record(&mut record).await?;
        Ok(())
    }

    /// Remove a session from the authority, flushing it first if dirty.
    ///
    /// The final flush runs while the session is still registered, so a
    /// concurrent load is served the resident record instead of reading a
    /// stale row from storage mid-flush. Eviction follows under the same
    /// slot lock regardless of the flush outcome; a storage outage cannot
    /// pin a session in memory, the failure is reported in the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session is not resident,
    /// or if a concurrent unload evicted it first.
    pub async fn unload_session(&self, id: SessionId) -> Result<UnloadOutcome, SessionError> {
        let slot = self.resident(id).await.ok_or(SessionError::NotFound(id))?;
        let mut record = slot.lock().await;

        let flush_result = if record.dirty {
            Some(self.flush_record(&mut record).await)
        } else {
            None
        };

        // Evict under the slot lock so no mutation can land between the
        // flush and the removal.
        {
            let mut sessions = self.sessions.write().await;
            let registered = sessions
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current, &slot));
            if !registered {
                // A concurrent unload won the race.
                return Err(SessionError::NotFound(id));
            }
            sessions.remove(&id);
        }
        self.by_character
            .write()
            .await
            .remove(&record.state.character_id);

        match flush_result {
            None => {
                tracing::info!(session_id = %id, "Session unloaded clean");
                Ok(UnloadOutcome {
                    flushed: false,
                    flush_error: None,
                })
            }
            Some(Ok(())) => {
                tracing::info!(session_id = %id, "Session unloaded after final flush");
                Ok(UnloadOutcome {
                    flushed: true,
                    flush_error: None,
                })
            }
            Some(Err(error)) => {
                tracing::warn!(
                    session_id = %id,
                    %error,
                    "Final flush failed; session evicted anyway"
                );
                Ok(UnloadOutcome {
                    flushed: false,
                    flush_error: Some(error),
                })
            }
        }
    }

    /// Unload every resident session, bounded by a grace period.
    ///
    /// Flushes and evicts all resident sessions, then waits for flushes
    /// started by concurrent callers to drain. Returns `true` if everything
    /// completed within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let drain = async {
            let ids: Vec<SessionId> = self.sessions.read().await.keys().copied().collect();
            for id in ids {
                match self.unload_session(id).await {
                    Ok(outcome) => {
                        if let Some(error) = outcome.flush_error {
                            tracing::error!(session_id = %id, %error, "Shutdown flush failed");
                        }
                    }
                    // Raced with another unload; nothing left to do.
                    Err(SessionError::NotFound(_)) => {}
                    Err(error) => {
                        tracing::error!(session_id = %id, %error, "Shutdown unload failed");
                    }
                }
            }

            loop {
                let notified = self.flush_done.notified();
                if self.flushes_in_flight.load(Ordering::Acquire) == 0 {
                    break;
                }
                notified.await;
            }
        };

        if tokio::time::timeout(grace, drain).await.is_ok() {
            tracing::info!("Session authority drained");
            true
        } else {
            tracing::warn!(
                remaining = self.flushes_in_flight.load(Ordering::Acquire),
                "Shutdown grace period expired with flushes in flight"
            );
            false
        }
    }

    /// Number of sessions currently resident.
    pub async fn resident_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn resident(&self, id: SessionId) -> Option<Arc<Mutex<SessionRecord>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Whether the given slot is still the registered one for `id`.
    ///
    /// Called after acquiring a slot lock: the session may have been
    /// evicted (or even evicted and reloaded) while the caller waited.
    async fn still_registered(&self, id: SessionId, slot: &Arc<Mutex<SessionRecord>>) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Write a record to storage and clear its dirty flag.
    ///
    /// Caller holds the slot lock; both gateway writes must succeed before
    /// the record is considered clean.
    async fn flush_record(&self, record: &mut SessionRecord) -> Result<(), GatewayError> {
        let _guard = FlushGuard::begin(self);
        self.gateway.update_character(&record.state).await?;
        self.gateway.update_session_time(&record.state).await?;
        record.dirty = false;
        record.last_saved_at = Some(Utc::now());
        tracing::debug!(session_id = %record.state.session_id, "Session flushed");
        Ok(())
    }
}

/// Tracks a flush across await points so `shutdown` can drain them.
struct FlushGuard<'a> {
    authority: &'a SessionAuthority,
}

impl<'a> FlushGuard<'a> {
    fn begin(authority: &'a SessionAuthority) -> Self {
        authority.flushes_in_flight.fetch_add(1, Ordering::AcqRel);
        Self { authority }
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.authority.flushes_in_flight.fetch_sub(1, Ordering::AcqRel);
        self.authority.flush_done.notify_waiters();
    }
}
