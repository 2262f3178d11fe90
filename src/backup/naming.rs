//! Versioned archive filenames
//!
//! Archives are named `{prefix}{version:03}{ext}`, e.g. `BACKUP_007.zip`.
//! Parsing is lenient (`BACKUP_7.zip` is version 7) while formatting is
//! always zero-padded to at least three digits.

use crate::error::{Error, Result};

/// Prefix/extension pair that identifies managed archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    prefix: String,
    ext: String,
}

impl NamingScheme {
    /// Create a scheme from a filename prefix and an extension (with dot)
    pub fn new(prefix: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ext: ext.into(),
        }
    }

    /// Filename prefix shared by all archives
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Archive extension, including the leading dot
    #[must_use]
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Extract the version number embedded in `filename`
    ///
    /// The prefix is stripped from the front and the extension (compared
    /// case-insensitively) from the back. All digits left over form the
    /// version. A leading `-` makes it negative, which only the empty
    /// catalog [`sentinel`](Self::sentinel) uses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the prefix is missing, no digits remain,
    /// or the number does not fit in an `i64`.
    pub fn parse(&self, filename: &str) -> Result<i64> {
        let rest = filename
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| format_error(filename, format!("missing prefix '{}'", self.prefix)))?;
        let rest = strip_suffix_ignore_case(rest, &self.ext).unwrap_or(rest);

        let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(format_error(filename, "no version digits"));
        }

        let value: i64 = digits
            .parse()
            .map_err(|e| format_error(filename, format!("version out of range: {e}")))?;

        if rest.starts_with('-') {
            Ok(-value)
        } else {
            Ok(value)
        }
    }

    /// Render an archive name for `version`
    #[must_use]
    pub fn format(&self, version: u64) -> String {
        format!("{}{version:03}{}", self.prefix, self.ext)
    }

    /// Name of the archive following `filename`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `filename` cannot be parsed or the next
    /// version would be negative.
    pub fn next(&self, filename: &str) -> Result<String> {
        let next = self
            .parse(filename)?
            .checked_add(1)
            .ok_or_else(|| format_error(filename, "version overflow"))?;
        let next = u64::try_from(next)
            .map_err(|_| format_error(filename, format!("next version {next} is negative")))?;
        Ok(self.format(next))
    }

    /// Placeholder returned when no archive exists yet
    ///
    /// Parses to `-1`, so [`next`](Self::next) on it yields version 0.
    #[must_use]
    pub fn sentinel(&self) -> String {
        format!("{}-1{}", self.prefix, self.ext)
    }

    /// Check whether `filename` looks like a managed archive
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        filename.starts_with(self.prefix.as_str())
            && strip_suffix_ignore_case(filename, &self.ext).is_some()
    }
}

fn format_error(name: &str, reason: impl Into<String>) -> Error {
    Error::Format {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// `str::strip_suffix` with ASCII case folding
fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> NamingScheme {
        NamingScheme::new("BACKUP_", ".7z")
    }

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(scheme().format(7), "BACKUP_007.7z");
        assert_eq!(scheme().format(0), "BACKUP_000.7z");
        assert_eq!(scheme().format(1234), "BACKUP_1234.7z");
    }

    #[test]
    fn test_parse_roundtrips_format() {
        let s = scheme();
        for n in [0u64, 1, 9, 10, 99, 100, 999, 1000, 65_536] {
            assert_eq!(s.parse(&s.format(n)).unwrap(), n as i64);
        }
    }

    #[test]
    fn test_parse_is_lenient() {
        let s = scheme();
        assert_eq!(s.parse("BACKUP_7.7z").unwrap(), 7);
        assert_eq!(s.parse("BACKUP_007.7Z").unwrap(), 7);
        assert_eq!(s.parse("BACKUP_v12b.7z").unwrap(), 12);
        assert_eq!(s.parse("BACKUP_042").unwrap(), 42);
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        let s = scheme();
        assert!(matches!(s.parse("BACKUP_.7z"), Err(Error::Format { .. })));
        assert!(matches!(s.parse("SAVE_001.7z"), Err(Error::Format { .. })));
        assert!(matches!(
            s.parse("BACKUP_99999999999999999999999.7z"),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn test_next_increments() {
        let s = scheme();
        assert_eq!(s.next("BACKUP_000.7z").unwrap(), "BACKUP_001.7z");
        assert_eq!(s.next("BACKUP_7.7z").unwrap(), "BACKUP_008.7z");
        assert_eq!(s.next("BACKUP_999.7z").unwrap(), "BACKUP_1000.7z");
    }

    #[test]
    fn test_sentinel_precedes_version_zero() {
        let s = scheme();
        let sentinel = s.sentinel();
        assert_eq!(sentinel, "BACKUP_-1.7z");
        assert_eq!(s.parse(&sentinel).unwrap(), -1);
        assert_eq!(s.parse(&s.next(&sentinel).unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_matches() {
        let s = scheme();
        assert!(s.matches("BACKUP_001.7z"));
        assert!(s.matches("BACKUP_001.7Z"));
        assert!(!s.matches("BACKUP_001.zip"));
        assert!(!s.matches("backup_001.7z"));
        assert!(!s.matches("BACKUP_001.7z.partial"));
    }

    #[test]
    fn test_strip_suffix_multibyte() {
        assert_eq!(strip_suffix_ignore_case("saveé.7z", ".7z"), Some("saveé"));
        assert_eq!(strip_suffix_ignore_case("é", "xx"), None);
        assert_eq!(strip_suffix_ignore_case("a", ".7z"), None);
    }
}
