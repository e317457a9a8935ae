//! Entity type definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::CairnError;

/// Entity types found in technical assembly texts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// A physical part (e.g., "servo motor", "control box").
    Component,
    /// A tool used during assembly (e.g., "torque wrench").
    Tool,
    /// An assembly step verb (e.g., "tighten", "mount").
    Action,
    /// A measurable value or setting (e.g., "5 Nm", "0.5 mm").
    Parameter,
    /// A place on or around the assembly (e.g., "left flange").
    Location,
    /// A substance or stock (e.g., "stainless steel", "thread locker").
    Material,
}

impl EntityType {
    /// Parse entity type from string with flexible matching.
    ///
    /// Extraction models emit labels in varying case and spelling, so
    /// "COMPONENT", "component", "comp" and "part" all resolve the same way.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");

        match normalized.as_str() {
            "component" | "comp" | "part" | "parts" | "assembly" | "device" | "unit" => {
                Some(Self::Component)
            }
            "tool" | "tools" | "equipment" | "instrument" => Some(Self::Tool),
            "action" | "act" | "step" | "operation" | "verb" => Some(Self::Action),
            "parameter" | "param" | "params" | "spec" | "specification" | "value"
            | "measurement" => Some(Self::Parameter),
            "location" | "loc" | "position" | "place" | "area" => Some(Self::Location),
            "material" | "mat" | "substance" | "consumable" => Some(Self::Material),
            _ => None,
        }
    }

    /// Get all entity type variants.
    pub fn all() -> Vec<EntityType> {
        Self::iter().collect()
    }

    /// Convert to the canonical label used in storage and prompts.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl FromStr for EntityType {
    type Err = CairnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_flexible(s).ok_or_else(|| CairnError::unknown_type(s))
    }
}
