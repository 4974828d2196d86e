// Value types for the human-friendly quantities descriptor files use:
// byte sizes with binary suffixes ("200M") and durations given either
// as humantime strings ("10s") or integer milliseconds.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

/// A byte count parsed from a bare integer or a `K`/`M`/`G`-suffixed
/// string (a trailing `B` is accepted: "200M" and "200MB" are equal).
///
/// Displays and serializes as the largest suffix that divides the
/// value evenly, so "200M" survives a round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        ByteSize(bytes)
    }

    pub const fn as_bytes(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for ByteSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty size".to_string());
        }

        let digits_end = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (digits, suffix) = s.split_at(digits_end);

        if digits.is_empty() {
            return Err(format!("size has no numeric part: {:?}", s));
        }
        let magnitude: u64 = digits
            .parse()
            .map_err(|e| format!("invalid size {:?}: {}", s, e))?;

        let multiplier = match suffix.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "K" | "KB" => KIB,
            "M" | "MB" => MIB,
            "G" | "GB" => GIB,
            other => return Err(format!("unknown size suffix: {:?}", other)),
        };

        magnitude
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| format!("size overflows: {:?}", s))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes >= GIB && bytes % GIB == 0 {
            write!(f, "{}G", bytes / GIB)
        } else if bytes >= MIB && bytes % MIB == 0 {
            write!(f, "{}M", bytes / MIB)
        } else if bytes >= KIB && bytes % KIB == 0 {
            write!(f, "{}K", bytes / KIB)
        } else {
            write!(f, "{}", bytes)
        }
    }
}

impl Serialize for ByteSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ByteSizeVisitor;

        impl<'de> Visitor<'de> for ByteSizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte count or a size string like \"200M\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSize, E> {
                v.parse().map_err(de::Error::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ByteSize, E> {
                Ok(ByteSize(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ByteSize, E> {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| de::Error::custom("size must not be negative"))
            }
        }

        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

/// Serde helpers for optional durations that accept either a humantime
/// string ("10s") or an integer number of milliseconds (10000), and
/// serialize back as the humantime form.
pub mod opt_duration {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Human(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Raw>::deserialize(deserializer)?
            .map(|raw| match raw {
                Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
                Raw::Human(s) => humantime::parse_duration(&s).map_err(de::Error::custom),
            })
            .transpose()
    }

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_suffixed_sizes() {
        assert_eq!("200M".parse::<ByteSize>().unwrap().as_bytes(), 200 * MIB);
        assert_eq!("5M".parse::<ByteSize>().unwrap().as_bytes(), 5 * MIB);
        assert_eq!("512K".parse::<ByteSize>().unwrap().as_bytes(), 512 * KIB);
        assert_eq!("1G".parse::<ByteSize>().unwrap().as_bytes(), GIB);
        assert_eq!("2GB".parse::<ByteSize>().unwrap().as_bytes(), 2 * GIB);
    }

    #[test]
    fn test_parse_plain_bytes() {
        assert_eq!("1048576".parse::<ByteSize>().unwrap().as_bytes(), MIB);
        assert_eq!("0".parse::<ByteSize>().unwrap().as_bytes(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ByteSize>().is_err());
        assert!("M".parse::<ByteSize>().is_err());
        assert!("200X".parse::<ByteSize>().is_err());
        assert!("12.5M".parse::<ByteSize>().is_err());
    }

    #[test]
    fn test_display_picks_largest_even_suffix() {
        assert_eq!(ByteSize::from_bytes(200 * MIB).to_string(), "200M");
        assert_eq!(ByteSize::from_bytes(GIB).to_string(), "1G");
        assert_eq!(ByteSize::from_bytes(1536).to_string(), "1536");
        assert_eq!(ByteSize::from_bytes(3 * KIB).to_string(), "3K");
    }

    #[test]
    fn test_serde_round_trip() {
        let size: ByteSize = serde_json::from_str("\"200M\"").unwrap();
        assert_eq!(size.as_bytes(), 200 * MIB);
        assert_eq!(serde_json::to_string(&size).unwrap(), "\"200M\"");

        let from_int: ByteSize = serde_json::from_str("1048576").unwrap();
        assert_eq!(from_int, ByteSize::from_bytes(MIB));
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Holder {
        #[serde(default, with = "opt_duration", skip_serializing_if = "Option::is_none")]
        uptime: Option<Duration>,
    }

    #[test]
    fn test_duration_from_human_string() {
        let holder: Holder = serde_json::from_str(r#"{"uptime": "10s"}"#).unwrap();
        assert_eq!(holder.uptime, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_duration_from_milliseconds() {
        let holder: Holder = serde_json::from_str(r#"{"uptime": 1500}"#).unwrap();
        assert_eq!(holder.uptime, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_duration_serializes_as_human_string() {
        let holder = Holder {
            uptime: Some(Duration::from_secs(10)),
        };
        assert_eq!(
            serde_json::to_string(&holder).unwrap(),
            r#"{"uptime":"10s"}"#
        );
    }

    #[test]
    fn test_duration_absent() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(holder.uptime, None);
        assert_eq!(serde_json::to_string(&holder).unwrap(), "{}");
    }
}
