#![warn(missing_docs)]
//! # outfit-advisor-advice-contract
//!
//! ## Purpose
//! Defines the analysis/advice response schema and the advice Markdown
//! grammar consumed by the client.
//!
//! ## Responsibilities
//! - Decode `/api/analyze` and `/api/advice` JSON bodies.
//! - Parse advice Markdown into an [`AdviceReport`] with fixed fallbacks.
//! - Provide a degraded report when no advice text is available.
//!
//! ## Data flow
//! Raw JSON -> [`parse_advice_response`] -> advice Markdown ->
//! [`parse_advice_markdown`] -> feedback screen projection.
//!
//! ## Grammar
//! The advice text is read line by line. A line whose trimmed form starts
//! with `#` is a heading:
//! - `# Outfit Rating: N/100` sets the score (`N` is ASCII digits).
//! - `## Quick Take`, `## Highlights`, `## Color Analysis` and
//!   `## Suggestions` open a section whose body runs until the next heading
//!   line or the end of input.
//! - Any other heading closes the open section and is ignored.
//!
//! Sections are optional and may appear in any order. The first non-empty
//! body of a section wins. A `#` inside a body line does not end the body.
//!
//! ## Ownership and lifetimes
//! Reports own their strings so they outlive the response buffer.
//!
//! ## Error model
//! Markdown parsing is total. Only JSON decoding returns
//! [`AdviceContractError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score used when the rating line is missing or malformed.
pub const FALLBACK_SCORE: &str = "85";
/// Quick take used when the section is missing.
pub const FALLBACK_QUICK_TAKE: &str = "No quick take available";
/// Highlights used when the section is missing.
pub const FALLBACK_HIGHLIGHTS: &str = "No highlights available";
/// Color analysis used when the section is missing.
pub const FALLBACK_COLOR_ANALYSIS: &str = "No color analysis available";
/// Single suggestion used when the section is missing.
pub const FALLBACK_SUGGESTIONS: &str = "No suggestions available";
/// Single suggestion used when the section holds no items.
pub const FALLBACK_EMPTY_SUGGESTIONS: &str = "No specific suggestions available";

/// Quick take shown by the degraded report.
pub const DEGRADED_QUICK_TAKE: &str = "Error processing feedback";
/// Color analysis shown by the degraded report.
pub const DEGRADED_COLOR_ANALYSIS: &str = "Please try again";
/// Single suggestion shown by the degraded report.
pub const DEGRADED_SUGGESTIONS: &str = "Unable to process suggestions";

const RATING_PREFIX: &str = "# Outfit Rating:";
const RATING_SUFFIX: &str = "/100";

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Logical success flag.
    pub success: bool,
    /// Server-side reference of the stored image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Generated outfit description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Server asks the user to log in before uploading.
    #[serde(default)]
    pub requires_login: bool,
}

/// Body of `POST /api/advice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    /// Logical success flag.
    pub success: bool,
    /// Advice Markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Decodes an analysis response body.
///
/// # Errors
/// Returns [`AdviceContractError::Decode`] for invalid JSON.
pub fn parse_analyze_response(raw: &str) -> Result<AnalyzeResponse, AdviceContractError> {
    serde_json::from_str(raw).map_err(AdviceContractError::Decode)
}

/// Decodes an advice response body.
///
/// # Errors
/// Returns [`AdviceContractError::Decode`] for invalid JSON.
pub fn parse_advice_response(raw: &str) -> Result<AdviceResponse, AdviceContractError> {
    serde_json::from_str(raw).map_err(AdviceContractError::Decode)
}

/// Structured advice extracted from Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceReport {
    /// Rating out of 100, as the digits written by the advisor.
    pub score: String,
    /// Short summary.
    pub quick_take: String,
    /// Positive points.
    pub highlights: String,
    /// Color commentary.
    pub color_analysis: String,
    /// Suggested changes, never empty.
    pub suggestions: Vec<String>,
    /// `true` when the report is the degraded rendering.
    pub degraded: bool,
}

impl AdviceReport {
    /// Builds the rendering used when advice text is unavailable.
    ///
    /// The raw text (possibly empty) is shown as highlights.
    pub fn degraded(raw: &str) -> Self {
        Self {
            score: FALLBACK_SCORE.to_string(),
            quick_take: DEGRADED_QUICK_TAKE.to_string(),
            highlights: raw.to_string(),
            color_analysis: DEGRADED_COLOR_ANALYSIS.to_string(),
            suggestions: vec![DEGRADED_SUGGESTIONS.to_string()],
            degraded: true,
        }
    }

    /// Returns the numeric score, if it fits in `u32`.
    pub fn score_value(&self) -> Option<u32> {
        self.score.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    QuickTake,
    Highlights,
    ColorAnalysis,
    Suggestions,
}

impl SectionKind {
    fn from_title(title: &str) -> Option<Self> {
        match title {
            "Quick Take" => Some(Self::QuickTake),
            "Highlights" => Some(Self::Highlights),
            "Color Analysis" => Some(Self::ColorAnalysis),
            "Suggestions" => Some(Self::Suggestions),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::QuickTake => 0,
            Self::Highlights => 1,
            Self::ColorAnalysis => 2,
            Self::Suggestions => 3,
        }
    }
}

enum Heading<'a> {
    Rating(Option<&'a str>),
    Section(SectionKind),
    Other,
}

fn classify_heading(trimmed: &str) -> Heading<'_> {
    if let Some(rest) = trimmed.strip_prefix(RATING_PREFIX) {
        let digits = rest
            .trim()
            .strip_suffix(RATING_SUFFIX)
            .map(str::trim_end)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        return Heading::Rating(digits);
    }

    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 2
        && let Some(kind) = SectionKind::from_title(trimmed[level..].trim())
    {
        return Heading::Section(kind);
    }

    Heading::Other
}

#[derive(Default)]
struct Sections {
    score: Option<String>,
    bodies: [Option<String>; 4],
}

impl Sections {
    fn close(&mut self, open: Option<(SectionKind, Vec<&str>)>) {
        let Some((kind, lines)) = open else {
            return;
        };
        let body = lines.join("\n");
        let body = body.trim();
        let slot = &mut self.bodies[kind.slot()];
        if slot.is_none() && !body.is_empty() {
            *slot = Some(body.to_string());
        }
    }

    fn take(&mut self, kind: SectionKind) -> Option<String> {
        self.bodies[kind.slot()].take()
    }
}

fn scan(text: &str) -> Sections {
    let mut sections = Sections::default();
    let mut open: Option<(SectionKind, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('#') {
            if let Some((_, lines)) = open.as_mut() {
                lines.push(line);
            }
            continue;
        }

        sections.close(open.take());
        match classify_heading(trimmed) {
            Heading::Rating(digits) => {
                if sections.score.is_none() {
                    sections.score = digits.map(str::to_string);
                }
            }
            Heading::Section(kind) => open = Some((kind, Vec::new())),
            Heading::Other => {}
        }
    }
    sections.close(open);

    sections
}

/// Splits a suggestions body into items on `*`, dropping empty fragments.
pub fn split_suggestions(body: &str) -> Vec<String> {
    body.split('*')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses advice Markdown into a report, substituting fallbacks for missing
/// markers. Never fails.
pub fn parse_advice_markdown(text: &str) -> AdviceReport {
    let mut sections = scan(text);

    let suggestions = match sections.take(SectionKind::Suggestions) {
        Some(body) => {
            let items = split_suggestions(&body);
            if items.is_empty() {
                vec![FALLBACK_EMPTY_SUGGESTIONS.to_string()]
            } else {
                items
            }
        }
        None => vec![FALLBACK_SUGGESTIONS.to_string()],
    };

    AdviceReport {
        score: sections
            .score
            .take()
            .unwrap_or_else(|| FALLBACK_SCORE.to_string()),
        quick_take: sections
            .take(SectionKind::QuickTake)
            .unwrap_or_else(|| FALLBACK_QUICK_TAKE.to_string()),
        highlights: sections
            .take(SectionKind::Highlights)
            .unwrap_or_else(|| FALLBACK_HIGHLIGHTS.to_string()),
        color_analysis: sections
            .take(SectionKind::ColorAnalysis)
            .unwrap_or_else(|| FALLBACK_COLOR_ANALYSIS.to_string()),
        suggestions,
        degraded: false,
    }
}

/// Renders optional advice text, using [`AdviceReport::degraded`] when the
/// server sent no advice body.
pub fn render_advice(advice: Option<&str>) -> AdviceReport {
    match advice {
        Some(text) => parse_advice_markdown(text),
        None => AdviceReport::degraded(""),
    }
}

/// Extracts only the rating, with the score fallback.
pub fn extract_rating(text: &str) -> String {
    scan(text)
        .score
        .unwrap_or_else(|| FALLBACK_SCORE.to_string())
}

/// Extracts only the quick take, with its fallback.
pub fn extract_quick_take(text: &str) -> String {
    scan(text)
        .take(SectionKind::QuickTake)
        .unwrap_or_else(|| FALLBACK_QUICK_TAKE.to_string())
}

/// Advice contract errors.
#[derive(Debug, Error)]
pub enum AdviceContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
