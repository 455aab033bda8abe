//! Session and character persistence.
//!
//! Two tables back the session authority: `sessions` holds the world clock
//! per session, `characters` holds the numeric character state. Writes are
//! upserts so a checkpoint is idempotent, and the store implements
//! [`PersistenceGateway`] so the authority never sees `sqlx` types.

use ascension_session::{GatewayError, PersistenceGateway};
use ascension_types::{CharacterSnapshot, SessionId, SessionState, WorldTime};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `sessions` and `characters` tables.
///
/// Holds its own [`PgPool`] handle (pools are cheap reference-counted
/// clones) so it can live behind the authority's `Arc<dyn
/// PersistenceGateway>`.
#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    /// Create a session store over a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a session joined with its character, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find_session_row(&self, id: Uuid) -> Result<Option<SessionRow>, DbError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"SELECT s.id AS session_id, s.character_id,
                     s.year, s.month, s.day, s.hour, s.minute, s.ticks_since_epoch,
                     c.core_capacity, c.current_qi, c.accumulated_qi,
                     c.cultivation_level, c.cultivation_sub_level,
                     c.physical_fatigue, c.mental_fatigue,
                     c.conductivity, c.perception,
                     c.current_health, c.max_health
              FROM sessions s
              JOIN characters c ON c.id = s.character_id
              WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Upsert a character row from an in-memory snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the write fails.
    pub async fn upsert_character(
        &self,
        character_id: Uuid,
        character: &CharacterSnapshot,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO characters
              (id, core_capacity, current_qi, accumulated_qi,
               cultivation_level, cultivation_sub_level,
               physical_fatigue, mental_fatigue,
               conductivity, perception, current_health, max_health, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
              ON CONFLICT (id) DO UPDATE SET
                core_capacity = EXCLUDED.core_capacity,
                current_qi = EXCLUDED.current_qi,
                accumulated_qi = EXCLUDED.accumulated_qi,
                cultivation_level = EXCLUDED.cultivation_level,
                cultivation_sub_level = EXCLUDED.cultivation_sub_level,
                physical_fatigue = EXCLUDED.physical_fatigue,
                mental_fatigue = EXCLUDED.mental_fatigue,
                conductivity = EXCLUDED.conductivity,
                perception = EXCLUDED.perception,
                current_health = EXCLUDED.current_health,
                max_health = EXCLUDED.max_health,
                updated_at = NOW()",
        )
        .bind(character_id)
        .bind(character.core_capacity)
        .bind(character.current_qi)
        .bind(character.accumulated_qi)
        .bind(i16::from(character.cultivation_level))
        .bind(i16::from(character.cultivation_sub_level))
        .bind(character.physical_fatigue)
        .bind(character.mental_fatigue)
        .bind(character.conductivity)
        .bind(character.perception)
        .bind(character.current_health)
        .bind(character.max_health)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%character_id, "Upserted character");
        Ok(())
    }

    /// Upsert a session's world clock.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the write fails, or
    /// [`DbError::Encode`] if the tick counter exceeds the column range.
    pub async fn upsert_session_time(
        &self,
        session_id: Uuid,
        character_id: Uuid,
        time: &WorldTime,
    ) -> Result<(), DbError> {
        let ticks = encode_ticks(time.ticks_since_epoch)?;

        sqlx::query(
            r"INSERT INTO sessions
              (id, character_id, year, month, day, hour, minute, ticks_since_epoch, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
              ON CONFLICT (id) DO UPDATE SET
                year = EXCLUDED.year,
                month = EXCLUDED.month,
                day = EXCLUDED.day,
                hour = EXCLUDED.hour,
                minute = EXCLUDED.minute,
                ticks_since_epoch = EXCLUDED.ticks_since_epoch,
                updated_at = NOW()",
        )
        .bind(session_id)
        .bind(character_id)
        .bind(i64::from(time.year))
        .bind(i16::from(time.month))
        .bind(i16::from(time.day))
        .bind(i16::from(time.hour))
        .bind(i16::from(time.minute))
        .bind(ticks)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%session_id, ticks_since_epoch = time.ticks_since_epoch, "Upserted session time");
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for SessionStore {
    async fn find_session(&self, id: SessionId) -> Result<Option<SessionState>, GatewayError> {
        let row = self
            .find_session_row(id.into_inner())
            .await
            .map_err(gateway_error)?;
        row.map(SessionRow::into_state).transpose()
    }

    async fn update_character(&self, state: &SessionState) -> Result<(), GatewayError> {
        self.upsert_character(state.character_id.into_inner(), &state.character)
            .await
            .map_err(gateway_error)
    }

    async fn update_session_time(&self, state: &SessionState) -> Result<(), GatewayError> {
        self.upsert_session_time(
            state.session_id.into_inner(),
            state.character_id.into_inner(),
            &state.time,
        )
        .await
        .map_err(gateway_error)
    }
}

/// A session row joined with its character.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Session identifier.
    pub session_id: Uuid,
    /// Character identifier.
    pub character_id: Uuid,
    /// Calendar year.
    pub year: i64,
    /// Month of the year.
    pub month: i16,
    /// Day of the month.
    pub day: i16,
    /// Hour of the day.
    pub hour: i16,
    /// Minute of the hour.
    pub minute: i16,
    /// Ticks elapsed since the game epoch.
    pub ticks_since_epoch: i64,
    /// Maximum qi the core can hold.
    pub core_capacity: f64,
    /// Qi currently held.
    pub current_qi: f64,
    /// Lifetime qi counter gating breakthroughs.
    pub accumulated_qi: f64,
    /// Major cultivation realm.
    pub cultivation_level: i16,
    /// Sub-level within the realm.
    pub cultivation_sub_level: i16,
    /// Physical exhaustion.
    pub physical_fatigue: f64,
    /// Mental exhaustion.
    pub mental_fatigue: f64,
    /// Environmental qi channeling factor.
    pub conductivity: f64,
    /// Spiritual sense.
    pub perception: f64,
    /// Current health points.
    pub current_health: f64,
    /// Maximum health points.
    pub max_health: f64,
}

impl SessionRow {
    /// Decode the row into the in-memory session state.
    ///
    /// Stored values outside the domain ranges (a sign of schema drift or
    /// manual edits) are a decode error, not a silent clamp.
    fn into_state(self) -> Result<SessionState, GatewayError> {
        let character = CharacterSnapshot {
            core_capacity: self.core_capacity,
            current_qi: self.current_qi,
            accumulated_qi: self.accumulated_qi,
            cultivation_level: decode_u8("cultivation_level", self.cultivation_level)?,
            cultivation_sub_level: decode_u8("cultivation_sub_level", self.cultivation_sub_level)?,
            physical_fatigue: self.physical_fatigue,
            mental_fatigue: self.mental_fatigue,
            conductivity: self.conductivity,
            perception: self.perception,
            current_health: self.current_health,
            max_health: self.max_health,
        };

        let time = WorldTime {
            year: u32::try_from(self.year)
                .map_err(|_| decode_error("year", self.year))?,
            month: decode_u8("month", self.month)?,
            day: decode_u8("day", self.day)?,
            hour: decode_u8("hour", self.hour)?,
            minute: decode_u8("minute", self.minute)?,
            ticks_since_epoch: u64::try_from(self.ticks_since_epoch)
                .map_err(|_| decode_error("ticks_since_epoch", self.ticks_since_epoch))?,
        };

        Ok(SessionState {
            session_id: self.session_id.into(),
            character_id: self.character_id.into(),
            character,
            time,
        })
    }
}

/// Encode the tick counter for a `BIGINT` column.
///
/// The counter is authoritative; a clamped write would corrupt the clock on
/// the next load, so overflow is a hard error.
fn encode_ticks(ticks: u64) -> Result<i64, DbError> {
    i64::try_from(ticks)
        .map_err(|_| DbError::Encode(format!("ticks_since_epoch {ticks} exceeds column range")))
}

fn decode_u8(field: &str, value: i16) -> Result<u8, GatewayError> {
    u8::try_from(value).map_err(|_| decode_error(field, value))
}

fn decode_error(field: &str, value: impl core::fmt::Display) -> GatewayError {
    GatewayError::Decode(format!("column {field} holds out-of-range value {value}"))
}

/// Map a storage error onto the gateway's error vocabulary.
fn gateway_error(error: DbError) -> GatewayError {
    match error {
        DbError::Postgres(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
            GatewayError::Unavailable
        }
        other => GatewayError::Backend(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tick_counter_encode_is_exact_or_fails() {
        assert_eq!(encode_ticks(0).unwrap(), 0);
        let max = u64::try_from(i64::MAX).unwrap();
        assert_eq!(encode_ticks(max).unwrap(), i64::MAX);
        assert!(matches!(encode_ticks(u64::MAX), Err(DbError::Encode(_))));
    }
}
