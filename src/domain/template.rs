//! `$name` / `${name}` output templates with safe substitution

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::FieldSource;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|(?P<named>[_A-Za-z][_A-Za-z0-9]*)|\{(?P<braced>[_A-Za-z][_A-Za-z0-9]*)\})",
    )
    .expect("placeholder pattern is valid")
});

/// Default listing template.
pub const DEFAULT_FORMAT: &str = "=== $basename $expired_str===
File: $file
Date: $date
Expires: $expire_date [$expires]
Type: $type
URL: $direct_url
Info: $info_url
Delete: $deletion_url
";

/// An output template.
///
/// Placeholders are `$identifier` or `${identifier}`; `$$` is a literal `$`.
/// Placeholders the field source cannot resolve stay in the output as
/// written. Substituted values are never re-scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.text)
            .filter_map(|caps| caps.name("named").or_else(|| caps.name("braced")))
            .map(|m| m.as_str())
            .collect()
    }

    /// Substitute every resolvable placeholder from `source`.
    pub fn render(&self, source: &mut dyn FieldSource) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &Captures| {
                if caps.name("escaped").is_some() {
                    return "$".to_string();
                }
                let name = caps
                    .name("named")
                    .or_else(|| caps.name("braced"))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match source.resolve(name) {
                    Ok(value) => value.to_string(),
                    Err(e) => {
                        tracing::trace!("leaving placeholder {:?} in place: {}", &caps[0], e);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

impl From<&str> for Template {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Template {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
