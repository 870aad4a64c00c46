//! Field resolution for upload records
//!
//! A [`FieldResolver`] answers "what is the value of field `X`" for one
//! record. Stored fields are read straight from the record; derived fields
//! are computed on first access and memoized for the life of the resolver.
//! The clock is sampled once, when the resolver is built.

use std::collections::HashMap;
use std::fmt::{self, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::domain::{DomainError, FieldError, Record};

/// Single-character aliases accepted in templates.
pub const RECORD_SHORTCUTS: &[(char, &str)] = &[
    ('b', "basename"),
    ('f', "file"),
    ('h', "hide"),
    ('i', "info_url"),
    ('d', "deletion_url"),
    ('u', "direct_url"),
    ('D', "date"),
    ('e', "expire_date"),
    ('x', "expired"),
    ('E', "expires"),
];

/// Fields read verbatim from the record.
pub const STORED_FIELDS: &[&str] = &[
    "file",
    "base_url",
    "id",
    "delete_id",
    "expires",
    "email",
    "date_ts",
    "hide",
    "expire_ts",
];

/// Fields computed from the record, the display options and the clock.
pub const DERIVED_FIELDS: &[&str] = &[
    "expired",
    "expired_str",
    "type",
    "date",
    "expire_date",
    "basename",
    "basename_escaped",
    "direct_url",
    "info_url",
    "deletion_url",
];

/// Unreserved characters (RFC 3986) pass through, everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Full field name for a shortcut character.
pub fn expand_shortcut(c: char) -> Option<&'static str> {
    RECORD_SHORTCUTS
        .iter()
        .find(|(short, _)| *short == c)
        .map(|(_, name)| *name)
}

/// Whether `name` (full name or shortcut) refers to a record field.
pub fn is_known_field(name: &str) -> bool {
    let mut chars = name.chars();
    let name = match (chars.next(), chars.next()) {
        (Some(c), None) => match expand_shortcut(c) {
            Some(full) => full,
            None => return false,
        },
        _ => name,
    };
    STORED_FIELDS.contains(&name) || DERIVED_FIELDS.contains(&name)
}

/// Value of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Absent,
}

impl FieldValue {
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Integer(i) => *i != 0,
            FieldValue::Absent => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Absent => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Anything a template can pull named values from.
pub trait FieldSource {
    fn resolve(&mut self, name: &str) -> Result<FieldValue, FieldError>;
}

/// A validated strftime-style date format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

impl DateFormat {
    pub const DEFAULT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new(format: impl Into<String>) -> Result<Self, DomainError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(DomainError::InvalidDateFormat(format));
        }
        Ok(Self(format))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Format epoch seconds in UTC or local time.
    ///
    /// Timestamps outside chrono's range render as the raw number.
    pub fn format(&self, ts: i64, utc: bool) -> String {
        let rendered = if utc {
            Utc.timestamp_opt(ts, 0).single().map(|dt| self.render(&dt))
        } else {
            Local.timestamp_opt(ts, 0).single().map(|dt| self.render(&dt))
        };
        rendered.flatten().unwrap_or_else(|| ts.to_string())
    }

    fn render<Tz>(&self, dt: &DateTime<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        write!(out, "{}", dt.format(&self.0)).ok()?;
        Some(out)
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run-time options that shape derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub date_format: DateFormat,
    /// Render dates in UTC instead of local time
    pub utc: bool,
}

/// Lazily computes and memoizes the fields of one record.
pub struct FieldResolver<'a> {
    record: &'a Record,
    options: &'a DisplayOptions,
    now: i64,
    cache: HashMap<&'static str, FieldValue>,
}

impl<'a> FieldResolver<'a> {
    /// Build a resolver with the clock sampled at `now`.
    pub fn new(record: &'a Record, options: &'a DisplayOptions, now: DateTime<Utc>) -> Self {
        Self {
            record,
            options,
            now: now.timestamp(),
            cache: HashMap::new(),
        }
    }

    /// Shorthand for `resolve("expired")`.
    pub fn is_expired(&mut self) -> bool {
        self.resolve("expired")
            .map(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn stored(&self, name: &str) -> Option<FieldValue> {
        let r = self.record;
        let value = match name {
            "file" => FieldValue::from(r.file.as_str()),
            "base_url" => FieldValue::from(r.base_url.as_str()),
            "id" => FieldValue::from(r.id.as_str()),
            "delete_id" => FieldValue::from(r.delete_id.as_str()),
            "expires" => FieldValue::from(r.expires.as_str()),
            "email" => r
                .email
                .as_deref()
                .map(FieldValue::from)
                .unwrap_or(FieldValue::Absent),
            "date_ts" => FieldValue::Integer(r.date_ts),
            "hide" => FieldValue::Bool(r.hide),
            "expire_ts" => FieldValue::Integer(r.expire_ts),
            _ => return None,
        };
        Some(value)
    }

    fn text(&mut self, name: &str) -> Result<String, FieldError> {
        Ok(self.resolve(name)?.to_string())
    }

    fn derive(&mut self, name: &str) -> Result<(&'static str, FieldValue), FieldError> {
        let r = self.record;
        let entry = match name {
            "expired" => ("expired", FieldValue::Bool(r.is_expired_at(self.now))),
            "expired_str" => {
                let expired = self.resolve("expired")?.as_bool();
                ("expired_str", FieldValue::from(if expired { "EXPIRED " } else { "" }))
            }
            "type" => ("type", FieldValue::from(if r.hide { "Private" } else { "Public" })),
            "date" => (
                "date",
                FieldValue::Text(self.options.date_format.format(r.date_ts, self.options.utc)),
            ),
            "expire_date" => {
                let value = if r.expire_ts == 0 {
                    "NEVER".to_string()
                } else {
                    self.options.date_format.format(r.expire_ts, self.options.utc)
                };
                ("expire_date", FieldValue::Text(value))
            }
            "basename" => ("basename", FieldValue::Text(r.basename())),
            "basename_escaped" => {
                let basename = self.text("basename")?;
                let escaped = utf8_percent_encode(&basename, PATH_SEGMENT).to_string();
                ("basename_escaped", FieldValue::Text(escaped))
            }
            "direct_url" => {
                let url = format!(
                    "{}/{}/{}",
                    self.text("base_url")?,
                    self.text("id")?,
                    self.text("basename_escaped")?
                );
                ("direct_url", FieldValue::Text(url))
            }
            "info_url" => {
                let url = format!(
                    "{}/info/{}/{}",
                    self.text("base_url")?,
                    self.text("id")?,
                    self.text("basename_escaped")?
                );
                ("info_url", FieldValue::Text(url))
            }
            "deletion_url" => {
                let url = format!("{}/delete/{}", self.text("base_url")?, self.text("delete_id")?);
                ("deletion_url", FieldValue::Text(url))
            }
            _ => return Err(FieldError::FieldNotFound(name.to_string())),
        };
        Ok(entry)
    }
}

impl FieldSource for FieldResolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<FieldValue, FieldError> {
        let mut chars = name.chars();
        let name = match (chars.next(), chars.next()) {
            (Some(c), None) => expand_shortcut(c).ok_or(FieldError::ShortcutNotFound(c))?,
            _ => name,
        };

        if let Some(value) = self.stored(name) {
            return Ok(value);
        }
        if let Some(value) = self.cache.get(name) {
            return Ok(value.clone());
        }

        let (key, value) = self.derive(name)?;
        self.cache.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Expiry;

    const T: i64 = 1_700_000_000;

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    fn sample() -> Record {
        Record {
            file: "/tmp/a.txt".into(),
            base_url: "http://x/y".into(),
            id: "42".into(),
            delete_id: "abc".into(),
            expires: Expiry::OneWeek,
            email: None,
            date_ts: T,
            hide: true,
            expire_ts: T + 604_800,
        }
    }

    fn utc_options() -> DisplayOptions {
        DisplayOptions {
            date_format: DateFormat::default(),
            utc: true,
        }
    }

    #[test]
    fn given_sample_record_when_resolving_urls_then_joins_stored_parts() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        assert_eq!(resolver.resolve("direct_url").unwrap(), "http://x/y/42/a.txt".into());
        assert_eq!(resolver.resolve("info_url").unwrap(), "http://x/y/info/42/a.txt".into());
        assert_eq!(resolver.resolve("deletion_url").unwrap(), "http://x/y/delete/abc".into());
        assert_eq!(resolver.resolve("type").unwrap(), "Private".into());
    }

    #[test]
    fn given_every_shortcut_when_resolving_then_matches_full_name() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        for (short, full) in RECORD_SHORTCUTS {
            let via_short = resolver.resolve(&short.to_string()).unwrap();
            let via_full = resolver.resolve(full).unwrap();
            assert_eq!(via_short, via_full, "shortcut {short}");
        }
    }

    #[test]
    fn given_known_field_names_when_resolving_then_all_succeed() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        for name in STORED_FIELDS.iter().chain(DERIVED_FIELDS) {
            assert!(is_known_field(name));
            assert!(resolver.resolve(name).is_ok(), "field {name}");
        }
        assert!(is_known_field("u"));
        assert!(!is_known_field("q"));
        assert!(!is_known_field("url"));
    }

    #[test]
    fn given_unknown_names_when_resolving_then_reports_kind() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        assert_eq!(resolver.resolve("q"), Err(FieldError::ShortcutNotFound('q')));
        assert_eq!(
            resolver.resolve("nonsense"),
            Err(FieldError::FieldNotFound("nonsense".into()))
        );
    }

    #[test]
    fn given_time_around_expiry_when_resolving_expired_then_uses_strict_comparison() {
        let record = sample();
        let options = utc_options();

        let mut before = FieldResolver::new(&record, &options, at(record.expire_ts - 1));
        let mut boundary = FieldResolver::new(&record, &options, at(record.expire_ts));
        let mut after = FieldResolver::new(&record, &options, at(record.expire_ts + 1));

        assert_eq!(before.resolve("expired").unwrap(), FieldValue::Bool(false));
        assert_eq!(boundary.resolve("expired").unwrap(), FieldValue::Bool(false));
        assert_eq!(after.resolve("expired").unwrap(), FieldValue::Bool(true));
        assert_eq!(after.resolve("expired_str").unwrap(), "EXPIRED ".into());
        assert_eq!(before.resolve("expired_str").unwrap(), "".into());
    }

    #[test]
    fn given_max_record_when_resolving_dates_then_never_expires() {
        let mut record = sample();
        record.expires = Expiry::Max;
        record.expire_ts = 0;
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(i64::from(i32::MAX)));

        assert!(!resolver.is_expired());
        assert_eq!(resolver.resolve("expire_date").unwrap(), "NEVER".into());
        assert_eq!(resolver.resolve("date").unwrap(), "2023-11-14 22:13:20".into());
    }

    #[test]
    fn given_awkward_file_name_when_escaping_then_percent_encodes() {
        let mut record = sample();
        record.file = "/data/my file&x#1.tar.gz".into();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        assert_eq!(resolver.resolve("b").unwrap(), "my file&x#1.tar.gz".into());
        assert_eq!(
            resolver.resolve("basename_escaped").unwrap(),
            "my%20file%26x%231.tar.gz".into()
        );
    }

    #[test]
    fn given_derived_field_when_resolved_twice_then_served_from_cache() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        let first = resolver.resolve("direct_url").unwrap();
        assert!(resolver.cache.contains_key("direct_url"));
        assert!(resolver.cache.contains_key("basename_escaped"));
        assert_eq!(resolver.resolve("direct_url").unwrap(), first);
    }

    #[test]
    fn given_stored_fields_when_resolving_then_returns_raw_values() {
        let record = sample();
        let options = utc_options();
        let mut resolver = FieldResolver::new(&record, &options, at(T));

        assert_eq!(resolver.resolve("hide").unwrap(), FieldValue::Bool(true));
        assert_eq!(resolver.resolve("date_ts").unwrap(), FieldValue::Integer(T));
        assert_eq!(resolver.resolve("email").unwrap(), FieldValue::Absent);
        assert_eq!(resolver.resolve("E").unwrap().to_string(), "1w");
        assert!(resolver.cache.is_empty());
    }

    #[test]
    fn given_invalid_strftime_when_building_date_format_then_rejects() {
        assert!(DateFormat::new("%Y-%m-%d").is_ok());
        assert_eq!(
            DateFormat::new("%Q"),
            Err(DomainError::InvalidDateFormat("%Q".into()))
        );
    }
}
