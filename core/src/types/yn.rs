//! `"Y"` / `"N"` flag encoding used by the API for boolean columns.
//!
//! Use with `#[serde(with = "crate::types::yn")]`; [`option`] encodes the
//! tri-state `null` / `"Y"` / `"N"` columns.

use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Flag as its one-letter text.
#[must_use]
pub const fn to_str(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

/// Parse one-letter text; anything except `Y` / `N` is `None`.
#[must_use]
pub fn from_str(text: &str) -> Option<bool> {
    match text {
        "Y" => Some(true),
        "N" => Some(false),
        _ => None,
    }
}

/// Serialize a flag.
///
/// # Errors
///
/// Propagates serializer errors.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(to_str(*flag))
}

/// Deserialize a flag.
///
/// # Errors
///
/// Fails for anything except `"Y"` or `"N"`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let text = String::deserialize(deserializer)?;
    from_str(&text).ok_or_else(|| D::Error::custom(format!("expected Y or N, got {text}")))
}

/// Tri-state flag: `null`, `"Y"` or `"N"`.
pub mod option {
    use super::{from_str, to_str};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Serialize an optional flag.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(flag: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match flag {
            Some(flag) => serializer.serialize_str(to_str(*flag)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional flag.
    ///
    /// # Errors
    ///
    /// Fails for strings other than `"Y"` or `"N"`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) => from_str(&text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected Y or N, got {text}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flags {
        #[serde(with = "super")]
        open: bool,
        #[serde(with = "super::option")]
        accepted: Option<bool>,
    }

    #[test]
    fn flags_travel_as_letters() {
        let json = serde_json::to_value(Flags {
            open: true,
            accepted: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"open": "Y", "accepted": null}));

        let parsed: Flags = serde_json::from_str(r#"{"open":"N","accepted":"Y"}"#).unwrap();
        assert_eq!(
            parsed,
            Flags {
                open: false,
                accepted: Some(true)
            }
        );
        assert!(serde_json::from_str::<Flags>(r#"{"open":"yes","accepted":null}"#).is_err());
    }
}
