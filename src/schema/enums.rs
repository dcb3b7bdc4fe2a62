// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Closed value sets stored as text.
//!
//! Each enum serializes to its label (`"Rosé"`, `"Semi-Dry"`,
//! `"Fining Agent"`), which is also the value persisted in the database.
//! Parsing is case-insensitive but otherwise exact.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a label is not part of a value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    /// Rejected input.
    pub value:   String,
    /// Accepted labels, in declaration order.
    pub allowed: &'static [&'static str]
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not one of {}",
            self.value,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for UnknownLabel {}

/// Declares a text-backed enum with its labels.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant
            ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Every accepted label in declaration order.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// Stored and serialized label.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownLabel {
                        value:   s.to_owned(),
                        allowed: Self::LABELS
                    })
            }
        }
    };
}

label_enum! {
    /// Style of wine.
    WineType {
        Red => "Red",
        White => "White",
        Rose => "Rosé",
        Sparkling => "Sparkling",
        Dessert => "Dessert",
        Fortified => "Fortified",
    }
}

label_enum! {
    /// Residual sugar classification.
    SugarContent {
        Dry => "Dry",
        SemiDry => "Semi-Dry",
        SemiSweet => "Semi-Sweet",
        Sweet => "Sweet",
    }
}

label_enum! {
    /// Functional class of an ingredient.
    IngredientCategory {
        Preservative => "Preservative",
        Antioxidant => "Antioxidant",
        Colorant => "Colorant",
        Flavoring => "Flavoring",
        Stabilizer => "Stabilizer",
        Emulsifier => "Emulsifier",
        Acidifier => "Acidifier",
        FiningAgent => "Fining Agent",
        Other => "Other",
    }
}

impl Default for IngredientCategory {
    fn default() -> Self {
        Self::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for v in WineType::ALL {
            assert_eq!(v.as_str().parse::<WineType>(), Ok(*v));
        }
        for v in IngredientCategory::ALL {
            assert_eq!(v.as_str().parse::<IngredientCategory>(), Ok(*v));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("semi-dry".parse::<SugarContent>(), Ok(SugarContent::SemiDry));
        assert_eq!(" fining agent ".parse::<IngredientCategory>(), Ok(IngredientCategory::FiningAgent));
    }

    #[test]
    fn unknown_label_lists_allowed_values() {
        let err = "Purple".parse::<WineType>().unwrap_err();
        assert_eq!(err.value, "Purple");
        assert!(err.to_string().contains("Red, White, Rosé"));
    }

    #[test]
    fn serializes_to_label() {
        assert_eq!(serde_json::to_string(&WineType::Rose).unwrap(), "\"Rosé\"");
        assert_eq!(
            serde_json::from_str::<IngredientCategory>("\"Fining Agent\"").unwrap(),
            IngredientCategory::FiningAgent
        );
    }

    #[test]
    fn default_category_is_other() {
        assert_eq!(IngredientCategory::default(), IngredientCategory::Other);
    }
}
