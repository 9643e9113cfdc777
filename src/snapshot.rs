//! Naming of snapshot copies. The timestamp comes from a `Clock`, so that key derivation stays
//! deterministic under test.
use crate::config::Config;
use crate::err::{self, Error};
use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

/// Format of the timestamp embedded in snapshot keys.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum SnapshotStyle {
    /// `dir/name.ext` becomes `dir/name_<timestamp>_ext`
    Compat,
    /// `dir/name.ext` becomes `dir/name_<timestamp>.ext`
    KeepExtension,
}
impl Default for SnapshotStyle {
    fn default() -> Self {
        SnapshotStyle::Compat
    }
}

/// A key split at the last `.` of its final path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitKey<'a> {
    /// Everything before the last dot, including directories
    pub base: &'a str,
    pub extension: &'a str,
}
impl<'a> SplitKey<'a> {
    /// Fails unless the final segment looks like `<name>.<extension>` with both parts non-empty.
    pub fn parse(key: &'a str) -> Result<Self, Error> {
        let name_start = key.rfind('/').map_or(0, |i| i + 1);
        let dot = key[name_start..].rfind('.').map(|i| name_start + i);
        match dot {
            Some(dot) if dot > name_start && dot + 1 < key.len() => Ok(SplitKey {
                base: &key[..dot],
                extension: &key[dot + 1..],
            }),
            _ => err::KeyFormat { key }.fail(),
        }
    }

    pub fn snapshot_key(&self, at: NaiveDateTime, style: SnapshotStyle) -> String {
        let separator = match style {
            SnapshotStyle::Compat => '_',
            SnapshotStyle::KeepExtension => '.',
        };
        format!(
            "{}_{}{}{}",
            self.base,
            at.format(TIMESTAMP_FORMAT),
            separator,
            self.extension
        )
    }
}

/// Source of the wall-clock time put into snapshot keys.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}
impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemClock {
    /// The local time zone of the process
    Local,
    /// A fixed offset from UTC, e.g. `+08:00` for China Standard Time
    Fixed(FixedOffset),
}
impl SystemClock {
    pub fn from_utc_offset(hours: Option<i32>) -> Result<Self, Error> {
        match hours {
            None => Ok(SystemClock::Local),
            Some(hours) => hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .map(SystemClock::Fixed)
                .context(err::InvalidUtcOffset { hours }),
        }
    }
    pub fn from_config(cfg: &Config) -> Result<Self, Error> {
        Self::from_utc_offset(cfg.utc_offset_hours)
    }
}
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self {
            SystemClock::Local => Local::now().naive_local(),
            SystemClock::Fixed(offset) => Utc::now().with_timezone(offset).naive_local(),
        }
    }
}
