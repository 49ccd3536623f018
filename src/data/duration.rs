use anyhow::{bail, Result};

use slawatch_types::Resolution;

/// Suffix to seconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, u64)] = &[
    ("min", 60),
    ("s", 1),
    ("m", 60),
    ("h", 60 * 60),
    ("d", 60 * 60 * 24),
    ("w", 60 * 60 * 24 * 7),
];

/// Parse resolution strings like "10m", "1h", "7d", "90d" or a preset
/// name such as "Minutes", returning seconds.
pub fn parse_resolution(s: &str) -> Result<u64> {
    let s = s.trim();

    if let Some(preset) = Resolution::ALL
        .into_iter()
        .find(|r| r.label().eq_ignore_ascii_case(s))
    {
        return Ok(preset.seconds());
    }

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: u64 = val_str.trim().parse()?;
            if val == 0 {
                bail!("Resolution must be positive: {}", s);
            }
            return Ok(val * multiplier);
        }
    }

    bail!("Unknown resolution format: {}", s)
}

/// Format a resolution in its largest whole unit, e.g. 600 -> "10m".
pub fn format_resolution(seconds: u64) -> String {
    if seconds == 0 {
        "0s".to_string()
    } else if seconds % (60 * 60 * 24) == 0 {
        format!("{}d", seconds / (60 * 60 * 24))
    } else if seconds % (60 * 60) == 0 {
        format!("{}h", seconds / (60 * 60))
    } else if seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Format a span of seconds for display, e.g. 3725 -> "1h 2m".
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_resolution("10m").unwrap(), 600);
        assert_eq!(parse_resolution("10min").unwrap(), 600);
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_resolution("1d").unwrap(), 86_400);
        assert_eq!(parse_resolution("90d").unwrap(), Resolution::Weeks.seconds());
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!(parse_resolution("minutes").unwrap(), 600);
        assert_eq!(parse_resolution("Hours").unwrap(), 86_400);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_resolution("fortnight").is_err());
        assert!(parse_resolution("0h").is_err());
        assert!(parse_resolution("").is_err());
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(format_resolution(600), "10m");
        assert_eq!(format_resolution(3600), "1h");
        assert_eq!(format_resolution(7_776_000), "90d");
        assert_eq!(format_resolution(45), "45s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3725), "1h 2m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }
}
