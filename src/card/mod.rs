//! Insight card data contract
//!
//! `InsightCardData` is the structured output the generative service must
//! produce. It is built exactly once per successful extraction and never
//! mutated afterwards: the only way to obtain one is through the validating
//! conversion from the wire format (see [`validate`]), and every field is read
//! through an accessor.
//!
//! # Wire format
//!
//! ```text
//! {
//!   "title": "...", "subtitle": "...", "coreInsight": "...",
//!   "structureType": "process" | "comparison" | "concept",
//!   "stages": [{"label": "...", "description": "...", "icon": "fa-solid fa-rocket"}, ...],  // 3..=5
//!   "transformation": {"before": "...", "after": "..."},
//!   "wisdomQuote": "...",
//!   "colors": {"primary": "#hex", "secondary": "#hex", "accent": "#hex", "background": "#hex"}
//! }
//! ```

pub mod color;
mod validate;

pub use color::HexColor;
pub use validate::{CardError, ContractError, ContractViolation, RawInsightCard};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fewest stages a card may carry
pub const MIN_STAGES: usize = 3;

/// Most stages a card may carry
pub const MAX_STAGES: usize = 5;

/// Logical shape of the source material
///
/// Descriptive metadata only. The renderer uses a single layout for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureType {
    /// Sequential steps
    Process,
    /// Contrasting alternatives
    Comparison,
    /// Principles around one idea
    Concept,
}

impl StructureType {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Comparison => "comparison",
            Self::Concept => "concept",
        }
    }

    /// Parse the wire value
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "process" => Some(Self::Process),
            "comparison" => Some(Self::Comparison),
            "concept" => Some(Self::Concept),
            _ => None,
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled step or component of the card, in presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub label: String,
    pub description: String,
    /// Symbolic icon reference, e.g. `fa-solid fa-rocket`
    pub icon: String,
}

/// Before/after contrast pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformation {
    pub before: String,
    pub after: String,
}

/// The card's four-color scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: HexColor,
    pub secondary: HexColor,
    pub accent: HexColor,
    pub background: HexColor,
}

/// A fully specified insight card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInsightCard", rename_all = "camelCase")]
pub struct InsightCardData {
    title: String,
    subtitle: String,
    core_insight: String,
    structure_type: StructureType,
    stages: Vec<Stage>,
    transformation: Transformation,
    wisdom_quote: String,
    colors: Palette,
}

impl InsightCardData {
    /// Parse and validate a JSON payload
    ///
    /// Unparseable JSON (or a field of the wrong JSON type) is `Malformed`;
    /// well-formed JSON that breaks the card rules is `Contract`.
    pub fn from_json(text: &str) -> Result<Self, CardError> {
        let raw: RawInsightCard = serde_json::from_str(text).map_err(CardError::Malformed)?;
        Self::try_from(raw).map_err(CardError::Contract)
    }

    /// Serialize back to the wire format (pretty-printed)
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn core_insight(&self) -> &str {
        &self.core_insight
    }

    pub fn structure_type(&self) -> StructureType {
        self.structure_type
    }

    /// Stages in presentation order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn wisdom_quote(&self) -> &str {
        &self.wisdom_quote
    }

    pub fn colors(&self) -> &Palette {
        &self.colors
    }
}

/// Shared card fixtures for tests across modules
#[cfg(test)]
pub(crate) mod fixtures {
    use super::InsightCardData;
    use serde_json::{json, Value};

    /// A schema-conforming payload with `stages` stages (labels "阶段1".."阶段N")
    pub fn card_json(stages: usize) -> Value {
        let stages: Vec<Value> = (1..=stages)
            .map(|i| {
                json!({
                    "label": format!("阶段{}", i),
                    "description": format!("第{}步的简短描述", i),
                    "icon": "fa-solid fa-rocket"
                })
            })
            .collect();

        json!({
            "title": "深度工作的力量",
            "subtitle": "在分心的时代保持专注",
            "coreInsight": "专注不是意志力的比拼，而是环境设计的结果。",
            "structureType": "process",
            "stages": stages,
            "transformation": {
                "before": "靠意志力硬撑，频繁被打断",
                "after": "设计无干扰的时间块，让专注成为默认"
            },
            "wisdomQuote": "你的注意力在哪里，你的生活就在哪里。",
            "colors": {
                "primary": "#1E3A5F",
                "secondary": "#3D5A80",
                "accent": "#EE6C4D",
                "background": "#F7F9FC"
            }
        })
    }

    pub fn card(stages: usize) -> InsightCardData {
        InsightCardData::from_json(&card_json(stages).to_string())
            .expect("fixture card should be valid")
    }
}
