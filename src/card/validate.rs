// Card contract validation
//
// The wire type keeps every field optional so one pass can report every
// violation instead of stopping at the first missing key. A JSON value of the
// wrong type (e.g. a string where an array belongs) still fails in serde and
// surfaces as CardError::Malformed.

use super::{
    HexColor, InsightCardData, Palette, Stage, StructureType, Transformation, MAX_STAGES,
    MIN_STAGES,
};
use serde::Deserialize;
use std::fmt;

/// A single way a payload breaks the card contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// Required field absent (or null)
    MissingField(String),
    /// Required string present but blank
    EmptyField(String),
    /// `stages` length outside [MIN_STAGES, MAX_STAGES]
    StageCount { actual: usize },
    /// Color string that isn't #RGB / #RRGGBB
    InvalidColor { field: String, value: String },
    /// `structureType` outside the known set
    UnknownStructureType(String),
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(path) => write!(f, "missing required field `{}`", path),
            Self::EmptyField(path) => write!(f, "field `{}` is empty", path),
            Self::StageCount { actual } => write!(
                f,
                "expected {}-{} stages, got {}",
                MIN_STAGES, MAX_STAGES, actual
            ),
            Self::InvalidColor { field, value } => {
                write!(f, "`{}` is not a hex color: {:?}", field, value)
            }
            Self::UnknownStructureType(value) => {
                write!(f, "unknown structureType {:?}", value)
            }
        }
    }
}

/// All violations found in one payload (never empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    violations: Vec<ContractViolation>,
}

impl ContractError {
    pub fn violations(&self) -> &[ContractViolation] {
        &self.violations
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "card contract violated: {}", parts.join("; "))
    }
}

impl std::error::Error for ContractError {}

/// Error parsing a card payload
#[derive(Debug)]
pub enum CardError {
    /// Not JSON, or JSON of the wrong shape
    Malformed(serde_json::Error),
    /// Well-formed JSON that breaks the card rules
    Contract(ContractError),
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed card JSON: {}", e),
            Self::Contract(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CardError {}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RawStage {
    label: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTransformation {
    before: Option<String>,
    after: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawColors {
    primary: Option<String>,
    secondary: Option<String>,
    accent: Option<String>,
    background: Option<String>,
}

/// Card payload as it arrives on the wire (unknown keys ignored)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsightCard {
    title: Option<String>,
    subtitle: Option<String>,
    core_insight: Option<String>,
    structure_type: Option<String>,
    stages: Option<Vec<RawStage>>,
    transformation: Option<RawTransformation>,
    wisdom_quote: Option<String>,
    colors: Option<RawColors>,
}

/// Collects violations while pulling required values out of the raw card
#[derive(Default)]
struct Checker {
    violations: Vec<ContractViolation>,
}

impl Checker {
    fn text(&mut self, path: &str, value: Option<String>) -> String {
        match value {
            None => {
                self.violations
                    .push(ContractViolation::MissingField(path.to_string()));
                String::new()
            }
            Some(s) if s.trim().is_empty() => {
                self.violations
                    .push(ContractViolation::EmptyField(path.to_string()));
                String::new()
            }
            Some(s) => s,
        }
    }

    fn color(&mut self, path: &str, value: Option<String>) -> Option<HexColor> {
        let Some(raw) = value else {
            self.violations
                .push(ContractViolation::MissingField(path.to_string()));
            return None;
        };
        let parsed = HexColor::parse(&raw);
        if parsed.is_none() {
            self.violations.push(ContractViolation::InvalidColor {
                field: path.to_string(),
                value: raw,
            });
        }
        parsed
    }

    fn structure_type(&mut self, value: Option<String>) -> Option<StructureType> {
        let Some(raw) = value else {
            self.violations
                .push(ContractViolation::MissingField("structureType".to_string()));
            return None;
        };
        let parsed = StructureType::from_wire(&raw);
        if parsed.is_none() {
            self.violations
                .push(ContractViolation::UnknownStructureType(raw));
        }
        parsed
    }

    fn stages(&mut self, value: Option<Vec<RawStage>>) -> Vec<Stage> {
        let Some(raw) = value else {
            self.violations
                .push(ContractViolation::MissingField("stages".to_string()));
            return Vec::new();
        };

        if !(MIN_STAGES..=MAX_STAGES).contains(&raw.len()) {
            self.violations
                .push(ContractViolation::StageCount { actual: raw.len() });
        }

        raw.into_iter()
            .enumerate()
            .map(|(i, stage)| Stage {
                label: self.text(&format!("stages[{}].label", i), stage.label),
                description: self.text(&format!("stages[{}].description", i), stage.description),
                icon: self.text(&format!("stages[{}].icon", i), stage.icon),
            })
            .collect()
    }
}

impl TryFrom<RawInsightCard> for InsightCardData {
    type Error = ContractError;

    fn try_from(raw: RawInsightCard) -> Result<Self, Self::Error> {
        let mut check = Checker::default();

        let title = check.text("title", raw.title);
        let subtitle = check.text("subtitle", raw.subtitle);
        let core_insight = check.text("coreInsight", raw.core_insight);
        let structure_type = check.structure_type(raw.structure_type);
        let stages = check.stages(raw.stages);

        let transformation = match raw.transformation {
            Some(t) => Transformation {
                before: check.text("transformation.before", t.before),
                after: check.text("transformation.after", t.after),
            },
            None => {
                check
                    .violations
                    .push(ContractViolation::MissingField("transformation".to_string()));
                Transformation {
                    before: String::new(),
                    after: String::new(),
                }
            }
        };

        let wisdom_quote = check.text("wisdomQuote", raw.wisdom_quote);

        let colors = match raw.colors {
            Some(c) => {
                let primary = check.color("colors.primary", c.primary);
                let secondary = check.color("colors.secondary", c.secondary);
                let accent = check.color("colors.accent", c.accent);
                let background = check.color("colors.background", c.background);
                match (primary, secondary, accent, background) {
                    (Some(primary), Some(secondary), Some(accent), Some(background)) => {
                        Some(Palette {
                            primary,
                            secondary,
                            accent,
                            background,
                        })
                    }
                    _ => None,
                }
            }
            None => {
                check
                    .violations
                    .push(ContractViolation::MissingField("colors".to_string()));
                None
            }
        };

        match (structure_type, colors) {
            (Some(structure_type), Some(colors)) if check.violations.is_empty() => Ok(Self {
                title,
                subtitle,
                core_insight,
                structure_type,
                stages,
                transformation,
                wisdom_quote,
                colors,
            }),
            _ => Err(ContractError {
                violations: check.violations,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_reports_every_top_level_field() {
        let err = InsightCardData::try_from(RawInsightCard::default()).unwrap_err();
        let missing: Vec<String> = err
            .violations()
            .iter()
            .filter_map(|v| match v {
                ContractViolation::MissingField(path) => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            vec![
                "title",
                "subtitle",
                "coreInsight",
                "structureType",
                "stages",
                "transformation",
                "wisdomQuote",
                "colors"
            ]
        );
    }

    #[test]
    fn test_invalid_color_reported_with_value() {
        let raw: RawInsightCard = serde_json::from_str(
            r##"{"colors": {"primary": "blue", "secondary": "#fff", "accent": "#000", "background": "#eee"}}"##,
        )
        .unwrap();
        let err = InsightCardData::try_from(raw).unwrap_err();
        assert!(err.violations().contains(&ContractViolation::InvalidColor {
            field: "colors.primary".to_string(),
            value: "blue".to_string(),
        }));
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            ContractViolation::StageCount { actual: 7 }.to_string(),
            "expected 3-5 stages, got 7"
        );
        assert_eq!(
            ContractViolation::MissingField("colors.accent".into()).to_string(),
            "missing required field `colors.accent`"
        );
    }
}
