//! Timestamp conversion at the storage boundary.
//!
//! Records carry `chrono::DateTime<Utc>`; the `passwords` table stores epoch
//! milliseconds. [`StoredTimestamp`] is the `ToSql`/`FromSql` bridge and
//! [`MonotonicClock`] hands out mutation stamps.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// A `DateTime<Utc>` stored as an integer count of milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoredTimestamp(pub DateTime<Utc>);

impl StoredTimestamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for StoredTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl ToSql for StoredTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.millis()))
    }
}

impl FromSql for StoredTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let millis = value.as_i64()?;
        Self::from_millis(millis).ok_or(FromSqlError::OutOfRange(millis))
    }
}

/// Issues strictly increasing timestamps.
///
/// Wall-clock time can repeat within a millisecond or step backwards; every
/// stamp is at least one millisecond after the previous one so `updated_at`
/// always advances and list order is total.
#[derive(Debug)]
pub struct MonotonicClock {
    last_millis: Mutex<i64>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::starting_after(i64::MIN)
    }

    /// A clock whose first stamp is later than `millis`.
    pub fn starting_after(millis: i64) -> Self {
        Self {
            last_millis: Mutex::new(millis),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self
            .last_millis
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let wall = Utc::now().timestamp_millis();
        let next = wall.max(last.saturating_add(1));
        *last = next;
        DateTime::from_timestamp_millis(next).unwrap_or_else(Utc::now)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
