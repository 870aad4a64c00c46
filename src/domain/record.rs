//! Upload records: the persisted unit of the local ledger

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Placeholder stored when an identifier could not be extracted from the
/// upload response.
pub const NOT_AVAILABLE: &str = "NOT_AVAILABLE";

/// Retention class requested at upload time.
///
/// Serialized verbatim as the service's code (`30m`, `1w`, `max`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Expiry {
    #[serde(rename = "30m")]
    #[value(name = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    #[value(name = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    #[value(name = "6h")]
    SixHours,
    #[serde(rename = "1d")]
    #[value(name = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    #[value(name = "3d")]
    ThreeDays,
    #[default]
    #[serde(rename = "1w")]
    #[value(name = "1w")]
    OneWeek,
    #[serde(rename = "max")]
    #[value(name = "max")]
    Max,
}

impl Expiry {
    /// The service's code for this retention class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Expiry::ThirtyMinutes => "30m",
            Expiry::OneHour => "1h",
            Expiry::SixHours => "6h",
            Expiry::OneDay => "1d",
            Expiry::ThreeDays => "3d",
            Expiry::OneWeek => "1w",
            Expiry::Max => "max",
        }
    }

    pub fn is_max(&self) -> bool {
        matches!(self, Expiry::Max)
    }

    /// Retention duration, `None` for `max`.
    pub fn duration(&self) -> Option<Duration> {
        if self.is_max() {
            return None;
        }
        // every non-max code is a valid `<integer><unit>` literal
        parse_retention(self.as_str()).ok()
    }

    /// Epoch seconds at which an upload made at `uploaded_at` expires,
    /// `0` for `max`.
    pub fn expire_ts(&self, uploaded_at: DateTime<Utc>) -> i64 {
        self.duration()
            .map(|d| (uploaded_at + d).timestamp())
            .unwrap_or(0)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Expiry {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Expiry as ValueEnum>::from_str(s, false)
            .map_err(|_| DomainError::InvalidRetention(s.to_string()))
    }
}

/// Parse a retention code of the form `<integer><unit>`.
///
/// Units: `m` minutes, `h` hours, `d` days, `w` weeks.
pub fn parse_retention(code: &str) -> Result<Duration, DomainError> {
    let invalid = || DomainError::InvalidRetention(code.to_string());

    let unit = code.chars().last().ok_or_else(invalid)?;
    let amount: i64 = code[..code.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;

    match unit {
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => None,
    }
    .ok_or_else(invalid)
}

/// One upload event as persisted in the local ledger.
///
/// `expire_ts == 0` exactly when `expires` is `max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Local path as given on the command line
    pub file: String,
    /// Service root at upload time
    pub base_url: String,
    /// Remote numeric identifier, or `NOT_AVAILABLE`
    pub id: String,
    /// Remote deletion token, or `NOT_AVAILABLE`
    pub delete_id: String,
    pub expires: Expiry,
    #[serde(default)]
    pub email: Option<String>,
    pub date_ts: i64,
    pub hide: bool,
    pub expire_ts: i64,
}

impl Record {
    /// Build the record for an upload completed at `uploaded_at`.
    ///
    /// Derives `date_ts` and `expire_ts` from the upload instant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file: impl Into<String>,
        base_url: impl Into<String>,
        id: impl Into<String>,
        delete_id: impl Into<String>,
        expires: Expiry,
        email: Option<String>,
        hide: bool,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file: file.into(),
            base_url: base_url.into(),
            id: id.into(),
            delete_id: delete_id.into(),
            expires,
            email,
            date_ts: uploaded_at.timestamp(),
            hide,
            expire_ts: expires.expire_ts(uploaded_at),
        }
    }

    /// Last path component of `file`.
    pub fn basename(&self) -> String {
        Path::new(&self.file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone())
    }

    /// Whether the record is past its expiry at `now` (epoch seconds).
    ///
    /// The boundary instant itself is not expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.expires.is_max() && now > self.expire_ts
    }
}
