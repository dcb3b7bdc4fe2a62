// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Tolerant deserializers shared by JSON bodies and spreadsheet rows.
//!
//! | Helper | Accepts | Produces |
//! |--------|---------|----------|
//! | [`opt_text`] | string, number, bool, null | `Option<String>` |
//! | [`opt_flag`] | bool, `"true"`/`"yes"`/`"1"`/…, 0/1, null | `Option<bool>` |
//! | [`flag`] | same as [`opt_flag`] | `bool`, null is `false` |
//!
//! Legacy clients send vintages and nutrition values as numbers and
//! certification flags as strings; spreadsheet cells arrive as text.

use std::fmt;

use serde::{
    Deserializer,
    de::{self, Visitor}
};

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(TextVisitor)
    }
}

/// Deserialize optional free text, stringifying numbers and booleans.
pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(TextVisitor)
}

/// Deserialize required free text leniently; null or absent is empty.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(opt_text(d)?.unwrap_or_default())
}

struct FlagVisitor;

/// Interpret a textual flag.
///
/// Empty text is `false`; anything unrecognised is an error so typos do
/// not silently clear a certification.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "x" => Some(true),
        "false" | "no" | "n" | "0" | "" => Some(false),
        _ => None
    }
}

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = Option<bool>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, \"true\"/\"false\", \"yes\"/\"no\", 0/1 or null")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_flag(v)
            .map(Some)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        match v {
            0 => Ok(Some(false)),
            1 => Ok(Some(true)),
            _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self))
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        match v {
            0 => Ok(Some(false)),
            1 => Ok(Some(true)),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(FlagVisitor)
    }
}

/// Deserialize an optional flag.
pub fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    d.deserialize_any(FlagVisitor)
}

/// Deserialize a flag, treating null as `false`.
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(opt_flag(d)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "text")]
        name: String,
        #[serde(default, deserialize_with = "opt_text")]
        text: Option<String>,
        #[serde(default, deserialize_with = "flag")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_flag")]
        maybe: Option<bool>
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_accepts_numbers() {
        assert_eq!(sample(r#"{"text": 2019}"#).text.as_deref(), Some("2019"));
        assert_eq!(sample(r#"{"text": 13.5}"#).text.as_deref(), Some("13.5"));
        assert_eq!(sample(r#"{"text": "750ml"}"#).text.as_deref(), Some("750ml"));
        assert_eq!(sample(r#"{"text": null}"#).text, None);
        assert_eq!(sample("{}").text, None);
    }

    #[test]
    fn required_text_accepts_numbers() {
        assert_eq!(sample(r#"{"name": 1945}"#).name, "1945");
        assert_eq!(sample(r#"{"name": "Cuvée"}"#).name, "Cuvée");
        assert_eq!(sample(r#"{"name": null}"#).name, "");
        assert_eq!(sample("{}").name, "");
    }

    #[test]
    fn flag_accepts_strings() {
        assert!(sample(r#"{"flag": "TRUE"}"#).flag);
        assert!(sample(r#"{"flag": "yes"}"#).flag);
        assert!(sample(r#"{"flag": 1}"#).flag);
        assert!(!sample(r#"{"flag": "false"}"#).flag);
        assert!(!sample(r#"{"flag": null}"#).flag);
        assert!(!sample("{}").flag);
    }

    #[test]
    fn flag_rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"flag": "maybe"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"flag": 7}"#).is_err());
    }

    #[test]
    fn opt_flag_keeps_absence() {
        assert_eq!(sample("{}").maybe, None);
        assert_eq!(sample(r#"{"maybe": null}"#).maybe, None);
        assert_eq!(sample(r#"{"maybe": false}"#).maybe, Some(false));
    }
}
