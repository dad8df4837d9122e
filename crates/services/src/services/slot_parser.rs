//! Extracts product attributes (slots) from free-text input.
//!
//! Each slot is filled by one independent rule: a regex matcher plus a
//! normalizer applied to the first match. Adding a slot means adding a row to
//! the rule table, not touching the parse loop.

use std::sync::LazyLock;

use db::models::product::{Attribute, AttributeSet};
use regex::{Captures, Regex};
use thiserror::Error;

/// Brands recognised when none are configured
pub const DEFAULT_BRANDS: [&str; 3] = ["联塑", "伟星", "金德"];

static SPECIFICATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dn[0-9]+").expect("specification pattern is valid"));

static PRESSURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]*)?)mpa").expect("pressure pattern is valid")
});

#[derive(Debug, Error)]
pub enum SlotParserError {
    #[error("invalid brand pattern: {0}")]
    BrandPattern(#[from] regex::Error),
}

type Normalizer = fn(&Captures<'_>) -> String;

#[derive(Debug, Clone)]
struct SlotRule {
    attribute: Attribute,
    matcher: Regex,
    normalize: Normalizer,
}

fn verbatim(captures: &Captures<'_>) -> String {
    captures[0].to_string()
}

fn lowercase(captures: &Captures<'_>) -> String {
    captures[0].to_lowercase()
}

/// Numeric part untouched, unit spelled `MPa`
fn pressure(captures: &Captures<'_>) -> String {
    format!("{}MPa", &captures[1])
}

#[derive(Debug, Clone)]
pub struct SlotParser {
    rules: Vec<SlotRule>,
}

impl SlotParser {
    /// Build the rule table. Brands are matched literally and case-sensitively;
    /// an empty brand list disables the brand slot.
    pub fn new<I, S>(brands: I) -> Result<Self, SlotParserError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = brands
            .into_iter()
            .map(|brand| brand.as_ref().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .map(|brand| regex::escape(&brand))
            .collect();

        let mut rules = Vec::with_capacity(3);

        if !alternatives.is_empty() {
            rules.push(SlotRule {
                attribute: Attribute::Brand,
                matcher: Regex::new(&alternatives.join("|"))?,
                normalize: verbatim,
            });
        }

        rules.push(SlotRule {
            attribute: Attribute::Specification,
            matcher: SPECIFICATION_PATTERN.clone(),
            normalize: lowercase,
        });

        rules.push(SlotRule {
            attribute: Attribute::Pressure,
            matcher: PRESSURE_PATTERN.clone(),
            normalize: pressure,
        });

        Ok(Self { rules })
    }

    /// Fill every slot whose rule matches. Color and length have no rule and
    /// stay unset; they are only set during disambiguation.
    pub fn parse_slots(&self, text: &str) -> AttributeSet {
        let mut slots = AttributeSet::default();

        for rule in &self.rules {
            if let Some(captures) = rule.matcher.captures(text) {
                slots.insert(rule.attribute, (rule.normalize)(&captures));
            }
        }

        slots
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.rules.iter().map(|rule| rule.attribute)
    }
}
