use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::utils::datetime::parse_rfc3339;

pub fn validate_title(title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(anyhow!("Title cannot be empty"));
    }

    if title.len() > 255 {
        return Err(anyhow!("Title cannot be longer than 255 characters"));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(anyhow!("Title cannot contain line breaks"));
    }

    Ok(())
}

/// Parses and checks a speech time window. The admin API is the only writer
/// of speeches, so this is where `start_time < end_time` is enforced.
pub fn validate_speech_window(
    start_time: &str,
    end_time: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_rfc3339(start_time)?;
    let end = parse_rfc3339(end_time)?;

    if start >= end {
        return Err(anyhow!("Speech must start before it ends"));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_titles() {
        assert!(validate_title("Django в продакшене").is_ok());
        assert!(validate_title("  padded  ").is_ok());
        assert!(validate_title(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn rejects_bad_titles() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("two\nlines").is_err());
        assert!(validate_title(&"a".repeat(256)).is_err());
    }

    #[test]
    fn accepts_ordered_window() {
        let result = validate_speech_window("2026-08-06T19:00:00Z", "2026-08-06T19:45:00Z");
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_inverted_or_empty_window() {
        assert!(validate_speech_window("2026-08-06T19:45:00Z", "2026-08-06T19:00:00Z").is_err());
        assert!(validate_speech_window("2026-08-06T19:00:00Z", "2026-08-06T19:00:00Z").is_err());
    }

    #[test]
    fn rejects_unparseable_window() {
        assert!(validate_speech_window("вчера", "2026-08-06T19:00:00Z").is_err());
    }
}
