//! Duration handling: human-friendly durations for flags and the YAML config, and the
//! compact text used by the latency column of the log (`2.860896ms`).

use std::time::Duration;

// Units written by `format_latency`, with their length in nanoseconds.
const LATENCY_UNITS: [(&str, u128); 5] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
];

/// Formats a latency the way it is written to the log, e.g. `2.860896ms`.
pub fn format_latency(latency: Duration) -> String {
    format!("{latency:?}")
}

/// Parses a latency column value such as `125.75904ms`, `12.5µs` or `1.2s`.
pub fn parse_latency(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| format!("missing unit in latency '{input}'"))?;
    let (number, unit) = input.split_at(split);

    let factor = LATENCY_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
        .ok_or_else(|| format!("unknown unit '{unit}' in latency '{input}'"))?;

    let invalid = || format!("invalid number in latency '{input}'");
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut nanos = whole.checked_mul(factor).ok_or_else(invalid)?;
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().map_err(|_| invalid())?;
        let scale = 10u128
            .checked_pow(fraction.len() as u32)
            .ok_or_else(invalid)?;
        nanos += digits.checked_mul(factor).ok_or_else(invalid)? / scale;
    }

    let nanos = u64::try_from(nanos).map_err(|_| format!("latency '{input}' is too large"))?;
    Ok(Duration::from_nanos(nanos))
}

/// serde adapter for humantime durations (`500ms`, `1m30s`, `1h 30m`) in the YAML config.
pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Option::<String>::deserialize(deserializer)?
        .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latency_column() {
        let parsed = parse_latency("125.75904ms").expect("latency should parse");
        assert_eq!(parsed.as_micros(), 125_759);
        assert_eq!(parse_latency("750ns"), Ok(Duration::from_nanos(750)));
        assert_eq!(parse_latency("5.000812s"), Ok(Duration::from_micros(5_000_812)));
    }

    #[test]
    fn test_formatted_latency_parses_back() {
        let latency = Duration::from_micros(2_860);
        let formatted = format_latency(latency);
        assert_eq!(formatted, "2.86ms");
        assert_eq!(parse_latency(&formatted), Ok(latency));

        let micros = Duration::from_nanos(12_500);
        assert_eq!(parse_latency(&format_latency(micros)), Ok(micros));
    }

    #[test]
    fn test_rejects_garbage_latency() {
        assert!(parse_latency("").is_err());
        assert!(parse_latency("10").is_err());
        assert!(parse_latency("ms").is_err());
        assert!(parse_latency("5 parsecs").is_err());
        assert!(parse_latency("1.2.3s").is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Window {
        #[serde(default, deserialize_with = "deserialize_opt")]
        length: Option<Duration>,
    }

    #[test]
    fn test_config_durations_use_humantime() {
        for (yaml, expected) in [
            ("length: 1m30s", Duration::from_secs(90)),
            ("length: 1h 30m", Duration::from_secs(5_400)),
            ("length: 2sec", Duration::from_secs(2)),
            ("length: 500ms", Duration::from_millis(500)),
        ] {
            let window: Window = serde_yaml::from_str(yaml).expect(yaml);
            assert_eq!(window.length, Some(expected), "{yaml}");
        }

        let window: Window = serde_yaml::from_str("{}").expect("Empty map");
        assert_eq!(window.length, None);
        assert!(serde_yaml::from_str::<Window>("length: fast").is_err());
    }
}
