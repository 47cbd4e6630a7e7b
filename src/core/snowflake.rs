//! Conversion between instants and Discord snowflake pagination cursors.
//!
//! A snowflake is `(unix_millis - DISCORD_EPOCH_MS) << 22` with the low 22 bits
//! holding worker/process/sequence data. Cursors built here leave those bits at
//! zero, which makes them valid lower bounds for any message created in the
//! same millisecond.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First millisecond of 2015, the zero point of every Discord snowflake.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// Opaque, time-ordered Discord identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Snowflake(pub u64);

impl Snowflake {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Creation instant encoded in the upper 42 bits.
    #[must_use]
    pub fn timestamp(self) -> DateTime<Utc> {
        instant_from_snowflake(self.0)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Snowflake)
    }
}

impl TryFrom<String> for Snowflake {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Snowflake> for String {
    fn from(value: Snowflake) -> Self {
        value.0.to_string()
    }
}

/// Encode an instant as a pagination cursor.
///
/// Instants before the Discord epoch saturate to `0`, so the mapping is total
/// and non-decreasing; it is strictly increasing at millisecond resolution.
#[must_use]
pub fn snowflake_from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> u64 {
    let millis = instant.timestamp_millis();
    let offset = millis.saturating_sub(DISCORD_EPOCH_MS);
    u64::try_from(offset).map_or(0, |ms| ms << TIMESTAMP_SHIFT)
}

/// Encode a bare calendar date as midnight UTC of that date.
///
/// Callers that know the user's timezone should build a zoned instant and use
/// [`snowflake_from_instant`] instead; this exists for date-only inputs.
#[must_use]
pub fn snowflake_from_date(date: NaiveDate) -> u64 {
    snowflake_from_instant(&date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Decode the creation instant of a snowflake.
#[must_use]
pub fn instant_from_snowflake(snowflake: u64) -> DateTime<Utc> {
    let offset = i64::try_from(snowflake >> TIMESTAMP_SHIFT).unwrap_or(i64::MAX);
    let millis = offset.saturating_add(DISCORD_EPOCH_MS);
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
