//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
///
/// Whole days are shown without a trailing `0h`, so a 14-day round reads `14d`.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
        assert_eq!(format_duration(14 * 86400), "14d");
        assert_eq!(format_duration(86400 + 7200), "1d 2h");
    }
}
