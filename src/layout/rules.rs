//! Data-driven rule tables for text roles and cell emphasis.
//!
//! A [`RuleSet`] is plain data: an ordered list of `(role, condition)` pairs
//! evaluated first-match-wins, and a list of emphasis conditions of which any
//! one suffices. Rule sets load from JSON, so a vocabulary can be swapped
//! without touching the evaluator:
//!
//! ```json
//! {
//!   "name": "minimal",
//!   "roles": [
//!     { "role": "section_header", "when": { "type": "short_label", "max_chars": 40, "max_words": 4 } },
//!     { "role": "page_header", "when": { "type": "in_header_section" } }
//!   ],
//!   "emphasis": [ { "type": "table_tag" } ]
//! }
//! ```
//!
//! [`RuleSet::compile`] validates the set and builds its regular expressions.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Paragraph, TextRole};

/// What a condition sees of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextContext<'a> {
    /// Paragraph text
    pub text: &'a str,
    /// Left edge as a percentage of page width
    pub x_percent: f32,
    /// Whether the page is still in its header section
    pub in_header_section: bool,
    /// Whether the paragraph carries the explicit table tag
    pub table_tag: bool,
}

impl<'a> TextContext<'a> {
    /// Context for a paragraph.
    pub fn of(paragraph: &'a Paragraph, in_header_section: bool) -> Self {
        Self {
            text: &paragraph.text,
            x_percent: paragraph.x_percent,
            in_header_section,
            table_tag: paragraph.is_table_tagged(),
        }
    }

    /// Context for bare text at the left margin.
    pub fn text(text: &'a str) -> Self {
        Self {
            text,
            x_percent: 0.0,
            in_header_section: false,
            table_tag: false,
        }
    }
}

/// A predicate over a paragraph, in serializable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Any of the regular expressions is found in the text.
    Matches {
        /// Patterns, searched (not anchored) unless they anchor themselves
        patterns: Vec<String>,
        /// Case-insensitive matching
        #[serde(default)]
        ignore_case: bool,
        /// Match against the trimmed, upper-cased text
        #[serde(default)]
        uppercase: bool,
    },

    /// Short text ending with a suffix, such as "Notes:".
    ShortLabel {
        /// Text must be strictly shorter than this many characters
        max_chars: usize,
        /// At most this many words
        max_words: usize,
        /// Required suffix of the trimmed text
        #[serde(default = "default_label_suffix")]
        suffix: String,
    },

    /// Text has at most this many characters.
    MaxChars {
        /// Character limit (inclusive)
        max: usize,
    },

    /// Left edge lies right of a margin.
    Indented {
        /// Margin as a percentage of page width (exclusive)
        min_x: f32,
    },

    /// The page is still in its header section.
    InHeaderSection,

    /// The paragraph carries the explicit table tag.
    TableTag,

    /// Fully upper-case, not purely numeric, length strictly within bounds.
    UppercaseLabel {
        /// Exclusive lower length bound
        min_chars: usize,
        /// Exclusive upper length bound
        max_chars: usize,
    },

    /// Any nested condition holds.
    Any {
        /// Alternatives
        conditions: Vec<Condition>,
    },

    /// Every nested condition holds.
    All {
        /// Requirements
        conditions: Vec<Condition>,
    },
}

fn default_label_suffix() -> String {
    ":".to_string()
}

impl Condition {
    /// Regex search, optionally case-insensitive.
    pub fn matches<S: Into<String>>(patterns: impl IntoIterator<Item = S>, ignore_case: bool) -> Self {
        Condition::Matches {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ignore_case,
            uppercase: false,
        }
    }

    /// Regex search against the upper-cased text.
    pub fn matches_uppercase<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Condition::Matches {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ignore_case: false,
            uppercase: true,
        }
    }

    /// Short label ending with ':'.
    pub fn short_label(max_chars: usize, max_words: usize) -> Self {
        Condition::ShortLabel {
            max_chars,
            max_words,
            suffix: default_label_suffix(),
        }
    }

    fn compile(&self) -> Result<Matcher> {
        Ok(match self {
            Condition::Matches {
                patterns,
                ignore_case,
                uppercase,
            } => {
                if patterns.is_empty() {
                    return Err(Error::InvalidRules(
                        "'matches' condition has no patterns".into(),
                    ));
                }
                let regexes = patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(*ignore_case)
                            .build()
                            .map_err(|e| Error::pattern(p.clone(), e))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Matcher::Regex {
                    regexes,
                    uppercase: *uppercase,
                }
            }
            Condition::ShortLabel {
                max_chars,
                max_words,
                suffix,
            } => Matcher::ShortLabel {
                max_chars: *max_chars,
                max_words: *max_words,
                suffix: suffix.clone(),
            },
            Condition::MaxChars { max } => Matcher::MaxChars(*max),
            Condition::Indented { min_x } => Matcher::Indented(*min_x),
            Condition::InHeaderSection => Matcher::InHeaderSection,
            Condition::TableTag => Matcher::TableTag,
            Condition::UppercaseLabel {
                min_chars,
                max_chars,
            } => {
                if min_chars >= max_chars {
                    return Err(Error::InvalidRules(format!(
                        "'uppercase_label' bounds {}..{} are empty",
                        min_chars, max_chars
                    )));
                }
                Matcher::UppercaseLabel {
                    min_chars: *min_chars,
                    max_chars: *max_chars,
                }
            }
            Condition::Any { conditions } => Matcher::Any(compile_all(conditions)?),
            Condition::All { conditions } => Matcher::All(compile_all(conditions)?),
        })
    }
}

fn compile_all(conditions: &[Condition]) -> Result<Vec<Matcher>> {
    conditions.iter().map(Condition::compile).collect()
}

/// One entry of the role table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRule {
    /// Role assigned when the condition holds
    pub role: TextRole,
    /// Condition to test
    pub when: Condition,
}

impl RoleRule {
    /// Create a new rule.
    pub fn new(role: TextRole, when: Condition) -> Self {
        Self { role, when }
    }
}

/// Role and emphasis rule tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Role rules, first match wins; no match means body text
    pub roles: Vec<RoleRule>,

    /// Emphasis conditions for table cells, any match suffices
    #[serde(default)]
    pub emphasis: Vec<Condition>,
}

const FMEA_FR: &str = include_str!("../../rules/fmea-fr.json");

impl RuleSet {
    /// Names accepted by [`RuleSet::preset`].
    pub const PRESETS: [&'static str; 2] = ["default", "fmea-fr"];

    /// Built-in rule set by name.
    ///
    /// `fmea-fr` is the vocabulary of French failure-mode analysis (AMDEC)
    /// documents.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default()),
            "fmea-fr" => Self::from_json(FMEA_FR),
            other => Err(Error::InvalidRules(format!(
                "unknown preset '{}' (expected one of: {})",
                other,
                Self::PRESETS.join(", ")
            ))),
        }
    }

    /// Parse a rule set from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a rule set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let rules = Self::from_json(&json)?;
        log::debug!(
            "Loaded rule set '{}' from {} ({} role rules, {} emphasis conditions)",
            rules.name,
            path.as_ref().display(),
            rules.roles.len(),
            rules.emphasis.len()
        );
        Ok(rules)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the tables and compile their patterns.
    pub fn compile(&self) -> Result<CompiledRules> {
        let roles = self
            .roles
            .iter()
            .map(|rule| Ok((rule.role, rule.when.compile()?)))
            .collect::<Result<Vec<_>>>()?;
        let emphasis = compile_all(&self.emphasis)?;
        Ok(CompiledRules { roles, emphasis })
    }
}

impl Default for RuleSet {
    /// General-purpose vocabulary with English and French labels.
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            roles: vec![
                RoleRule::new(
                    TextRole::SectionHeader,
                    Condition::Any {
                        conditions: vec![
                            Condition::matches(
                                [
                                    r"^(Comments?|Commentaires?)\b[^:]{0,30}:",
                                    r"^Observations?\s*:",
                                    r"^(Remarks?|Remarques?)\s*:",
                                    r"^Notes?\s*:",
                                    r"^Conclusions?\s*:",
                                    r"^(Summary|Résumé)\s*:",
                                ],
                                true,
                            ),
                            Condition::short_label(40, 4),
                        ],
                    },
                ),
                RoleRule::new(
                    TextRole::Title,
                    Condition::All {
                        conditions: vec![
                            Condition::MaxChars { max: 80 },
                            Condition::matches_uppercase([
                                r"^(INTRODUCTION|CONCLUSIONS?|SUMMARY|SOMMAIRE|ANNEXES?|APPENDIX)\b",
                                r"^(TABLE OF CONTENTS|TABLE DES MATI[EÈ]RES|G[EÉ]N[EÉ]RALIT[EÉ]S)\b",
                                r"^(CHAPTER|CHAPITRE|SECTION|PART|PARTIE)\s+\d",
                            ]),
                        ],
                    },
                ),
                RoleRule::new(
                    TextRole::NumberedItem,
                    Condition::matches(
                        [
                            r"^\d+\.\s",
                            r"^[a-z]\)\s",
                            r"^Rep\s+\d+\s*:",
                            r"^-\s",
                            r"^•\s",
                            r"^\(\d+\)",
                        ],
                        true,
                    ),
                ),
                RoleRule::new(TextRole::Continuation, Condition::Indented { min_x: 15.0 }),
                RoleRule::new(TextRole::PageHeader, Condition::InHeaderSection),
            ],
            emphasis: vec![
                Condition::TableTag,
                Condition::InHeaderSection,
                Condition::matches_uppercase([
                    r"^(N°|NO\.)",
                    r"^(REF|PAGE|DATE|REVISION|REV|VERSION|INDICE|DOCUMENT)\b",
                    r"^(AUTHOR|AUTEUR|TITLE|TITRE|SUBJECT|OBJET|DESCRIPTION|DESIGNATION)\b",
                    r"^(ITEM|QTY|QUANTITY|QUANTITE|TOTAL|STATUS|STATUT|OBSERVATION)\b",
                ]),
                Condition::UppercaseLabel {
                    min_chars: 3,
                    max_chars: 40,
                },
            ],
        }
    }
}

/// A compiled condition.
#[derive(Debug, Clone)]
enum Matcher {
    Regex { regexes: Vec<Regex>, uppercase: bool },
    ShortLabel { max_chars: usize, max_words: usize, suffix: String },
    MaxChars(usize),
    Indented(f32),
    InHeaderSection,
    TableTag,
    UppercaseLabel { min_chars: usize, max_chars: usize },
    Any(Vec<Matcher>),
    All(Vec<Matcher>),
}

impl Matcher {
    fn test(&self, ctx: &TextContext<'_>) -> bool {
        match self {
            Matcher::Regex { regexes, uppercase } => {
                if *uppercase {
                    let upper = ctx.text.to_uppercase();
                    let upper = upper.trim();
                    regexes.iter().any(|r| r.is_match(upper))
                } else {
                    regexes.iter().any(|r| r.is_match(ctx.text))
                }
            }
            Matcher::ShortLabel {
                max_chars,
                max_words,
                suffix,
            } => {
                ctx.text.chars().count() < *max_chars
                    && ctx.text.trim().ends_with(suffix.as_str())
                    && ctx.text.split_whitespace().count() <= *max_words
            }
            Matcher::MaxChars(max) => ctx.text.chars().count() <= *max,
            Matcher::Indented(min_x) => ctx.x_percent > *min_x,
            Matcher::InHeaderSection => ctx.in_header_section,
            Matcher::TableTag => ctx.table_tag,
            Matcher::UppercaseLabel {
                min_chars,
                max_chars,
            } => {
                let len = ctx.text.chars().count();
                is_uppercase(ctx.text)
                    && len > *min_chars
                    && len < *max_chars
                    && !ctx.text.chars().all(|c| c.is_ascii_digit())
            }
            Matcher::Any(matchers) => matchers.iter().any(|m| m.test(ctx)),
            Matcher::All(matchers) => matchers.iter().all(|m| m.test(ctx)),
        }
    }
}

/// At least one cased character and no lower-case ones.
fn is_uppercase(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// A validated [`RuleSet`] ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    roles: Vec<(TextRole, Matcher)>,
    emphasis: Vec<Matcher>,
}

impl CompiledRules {
    /// First role whose condition holds, if any.
    pub fn role(&self, ctx: &TextContext<'_>) -> Option<TextRole> {
        self.roles
            .iter()
            .find(|(_, matcher)| matcher.test(ctx))
            .map(|(role, _)| *role)
    }

    /// Check if any emphasis condition holds.
    pub fn is_emphasized(&self, ctx: &TextContext<'_>) -> bool {
        self.emphasis.iter().any(|m| m.test(ctx))
    }

    /// Number of role rules.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled() -> CompiledRules {
        RuleSet::default().compile().unwrap()
    }

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(compiled().role_count(), 5);
    }

    #[test]
    fn test_short_label() {
        let rules = compiled();
        assert_eq!(
            rules.role(&TextContext::text("RESUME:")),
            Some(TextRole::SectionHeader)
        );
        assert_eq!(
            rules.role(&TextContext::text("Notes : voir plus bas pour le détail complet")),
            Some(TextRole::SectionHeader)
        );
        // Five words is too many for a label.
        assert_eq!(rules.role(&TextContext::text("one two three four five:")), None);
    }

    #[test]
    fn test_uppercase_title_match() {
        let rules = compiled();
        assert_eq!(
            rules.role(&TextContext::text("Chapitre 2 - Installation")),
            Some(TextRole::Title)
        );
        let long = format!("INTRODUCTION {}", "x".repeat(80));
        assert_ne!(rules.role(&TextContext::text(&long)), Some(TextRole::Title));
    }

    #[test]
    fn test_numbered_items() {
        let rules = compiled();
        for text in ["1. First", "b) second", "REP 03 : valve", "- dash", "• bullet", "(2) two"] {
            assert_eq!(
                rules.role(&TextContext::text(text)),
                Some(TextRole::NumberedItem),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_positional_rules() {
        let rules = compiled();
        let mut ctx = TextContext::text("plain words here");
        assert_eq!(rules.role(&ctx), None);

        ctx.in_header_section = true;
        assert_eq!(rules.role(&ctx), Some(TextRole::PageHeader));

        ctx.x_percent = 20.0;
        assert_eq!(rules.role(&ctx), Some(TextRole::Continuation));
    }

    #[test]
    fn test_emphasis() {
        let rules = compiled();
        assert!(rules.is_emphasized(&TextContext::text("Date de revision")));
        assert!(rules.is_emphasized(&TextContext::text("WATER SUPPLY")));
        assert!(!rules.is_emphasized(&TextContext::text("1234")));
        assert!(!rules.is_emphasized(&TextContext::text("ABC")));
        assert!(!rules.is_emphasized(&TextContext::text("plain")));

        let mut ctx = TextContext::text("plain");
        ctx.table_tag = true;
        assert!(rules.is_emphasized(&ctx));
    }

    #[test]
    fn test_json_round_trip_preserves_behavior() {
        let json = RuleSet::default().to_json().unwrap();
        let rules = RuleSet::from_json(&json).unwrap();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn test_invalid_pattern() {
        let rules = RuleSet {
            name: "broken".into(),
            roles: vec![RoleRule::new(TextRole::Title, Condition::matches(["(unclosed"], false))],
            emphasis: vec![],
        };
        assert!(matches!(rules.compile(), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_invalid_bounds() {
        let rules = RuleSet {
            name: String::new(),
            roles: vec![],
            emphasis: vec![Condition::UppercaseLabel {
                min_chars: 10,
                max_chars: 5,
            }],
        };
        assert!(matches!(rules.compile(), Err(Error::InvalidRules(_))));
    }

    #[test]
    fn test_fmea_preset() {
        let rules = RuleSet::preset("fmea-fr").unwrap().compile().unwrap();
        assert_eq!(
            rules.role(&TextContext::text("Commentaires générant : aucun")),
            Some(TextRole::SectionHeader)
        );
        assert_eq!(
            rules.role(&TextContext::text("Alimentation en eau")),
            Some(TextRole::Title)
        );
        assert!(rules.is_emphasized(&TextContext::text("Criticite")));
        assert!(rules.is_emphasized(&TextContext::text("N° 12")));

        assert!(matches!(RuleSet::preset("nope"), Err(Error::InvalidRules(_))));
    }

    #[test]
    fn test_condition_json_shape() {
        let json = r#"{"type": "short_label", "max_chars": 40, "max_words": 4}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition, Condition::short_label(40, 4));
    }
}
