//! Game calendar derivation and tick advancement.
//!
//! The tick counter is the single source of truth for all temporal state:
//! the calendar fields of a [`WorldTime`] are always derived from
//! `ticks_since_epoch` and never advanced independently, so they cannot
//! drift out of sync.
//!
//! The calendar is deliberately regular -- 60 minutes per hour, 24 hours per
//! day, 30 days per month, 12 months per year, no leap rules -- which makes
//! `advance` additive: `advance(advance(t, a), b) == advance(t, a + b)`.

use ascension_types::{TimeOfDay, WorldTime};

use crate::error::SimError;

/// Ticks (in-world minutes) per hour.
pub const TICKS_PER_HOUR: u64 = 60;

/// Ticks per in-world day.
pub const TICKS_PER_DAY: u64 = 24 * TICKS_PER_HOUR;

/// Ticks per in-world month (30 days, no irregular months).
pub const TICKS_PER_MONTH: u64 = 30 * TICKS_PER_DAY;

/// Ticks per in-world year (12 months).
pub const TICKS_PER_YEAR: u64 = 12 * TICKS_PER_MONTH;

/// Derive the full calendar value for a tick count.
///
/// The epoch (tick 0) is year 1, month 1, day 1, 00:00.
///
/// # Errors
///
/// Returns [`SimError::TickOverflow`] if the derived year exceeds `u32`
/// range (which takes roughly 4 billion in-world years of play).
pub fn from_ticks(ticks_since_epoch: u64) -> Result<WorldTime, SimError> {
    let year_index = ticks_since_epoch.checked_div(TICKS_PER_YEAR).unwrap_or(0);
    let within_year = ticks_since_epoch.checked_rem(TICKS_PER_YEAR).unwrap_or(0);

    let year = u32::try_from(year_index)
        .ok()
        .and_then(|y| y.checked_add(1))
        .ok_or(SimError::TickOverflow)?;

    let month_index = within_year.checked_div(TICKS_PER_MONTH).unwrap_or(0);
    let within_month = within_year.checked_rem(TICKS_PER_MONTH).unwrap_or(0);

    let day_index = within_month.checked_div(TICKS_PER_DAY).unwrap_or(0);
    let within_day = within_month.checked_rem(TICKS_PER_DAY).unwrap_or(0);

    let hour = within_day.checked_div(TICKS_PER_HOUR).unwrap_or(0);
    let minute = within_day.checked_rem(TICKS_PER_HOUR).unwrap_or(0);

    // All of these are bounded by the divisions above (month < 12,
    // day < 30, hour < 24, minute < 60), so the conversions cannot fail.
    Ok(WorldTime {
        year,
        month: u8::try_from(month_index.saturating_add(1)).unwrap_or(1),
        day: u8::try_from(day_index.saturating_add(1)).unwrap_or(1),
        hour: u8::try_from(hour).unwrap_or(0),
        minute: u8::try_from(minute).unwrap_or(0),
        ticks_since_epoch,
    })
}

/// Build a [`WorldTime`] from explicit calendar fields.
///
/// Used when restoring state whose storage predates the tick counter, and
/// by tests that want to speak in calendar terms.
///
/// # Errors
///
/// Returns [`SimError::InvalidArgument`] if any field is out of range
/// (`month/day` 1-based, `hour/minute` 0-based), or
/// [`SimError::TickOverflow`] if the tick computation overflows.
pub fn from_parts(year: u32, month: u8, day: u8, hour: u8, minute: u8) -> Result<WorldTime, SimError> {
    if year == 0 {
        return Err(SimError::invalid("year must be at least 1"));
    }
    if !(1..=12).contains(&month) {
        return Err(SimError::invalid(format!("month {month} out of range 1..=12")));
    }
    if !(1..=30).contains(&day) {
        return Err(SimError::invalid(format!("day {day} out of range 1..=30")));
    }
    if hour >= 24 {
        return Err(SimError::invalid(format!("hour {hour} out of range 0..24")));
    }
    if minute >= 60 {
        return Err(SimError::invalid(format!(
            "minute {minute} out of range 0..60"
        )));
    }

    let years = u64::from(year.checked_sub(1).unwrap_or(0));
    let months = u64::from(month.checked_sub(1).unwrap_or(0));
    let days = u64::from(day.checked_sub(1).unwrap_or(0));

    let ticks = years
        .checked_mul(TICKS_PER_YEAR)
        .and_then(|t| t.checked_add(months.saturating_mul(TICKS_PER_MONTH)))
        .and_then(|t| t.checked_add(days.saturating_mul(TICKS_PER_DAY)))
        .and_then(|t| t.checked_add(u64::from(hour).saturating_mul(TICKS_PER_HOUR)))
        .and_then(|t| t.checked_add(u64::from(minute)))
        .ok_or(SimError::TickOverflow)?;

    from_ticks(ticks)
}

/// Advance a world time by a number of ticks.
///
/// Pure and total for all valid inputs. Negative advancement is
/// unrepresentable (`ticks_to_add` is unsigned); counter exhaustion is a
/// typed error rather than a wrap.
///
/// # Errors
///
/// Returns [`SimError::TickOverflow`] if the tick counter would exceed
/// `u64::MAX` or the derived year would exceed `u32::MAX`.
pub fn advance(time: &WorldTime, ticks_to_add: u64) -> Result<WorldTime, SimError> {
    let new_ticks = time
        .ticks_since_epoch
        .checked_add(ticks_to_add)
        .ok_or(SimError::TickOverflow)?;
    from_ticks(new_ticks)
}

/// Total in-world days elapsed since the epoch (the lifetime day counter).
pub fn total_days(time: &WorldTime) -> u64 {
    time.ticks_since_epoch.checked_div(TICKS_PER_DAY).unwrap_or(0)
}

/// Derive the time-of-day phase for a world time.
///
/// Night covers hours 0-4, dawn 5-7, morning 8-11, afternoon 12-17,
/// dusk 18-23. Computed from the hour field, which itself derives from
/// the tick counter.
pub const fn time_of_day(time: &WorldTime) -> TimeOfDay {
    match time.hour {
        0..=4 => TimeOfDay::Night,
        5..=7 => TimeOfDay::Dawn,
        8..=11 => TimeOfDay::Morning,
        12..=17 => TimeOfDay::Afternoon,
        _ => TimeOfDay::Dusk,
    }
}
