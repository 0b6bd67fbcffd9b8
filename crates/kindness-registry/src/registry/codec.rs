use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIMITER: char = 'F';
pub const DEFAULT_FLOORS: [&str; 3] = ["1F", "2F", "3F"];

const POSITION_SEPARATOR: char = ':';
const TOKEN_WIDTH: usize = 2;

/// Structural fields recovered from a composite position code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCoordinates {
    pub floor: String,
    pub section: String,
    pub level: String,
    pub position: String,
}

/// Marker the tokenizer expected but could not locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMarker {
    Colon,
    FloorDelimiter,
    SectionDelimiter,
    LevelDelimiter,
}

impl MissingMarker {
    const DELIMITERS: [MissingMarker; 3] = [
        MissingMarker::FloorDelimiter,
        MissingMarker::SectionDelimiter,
        MissingMarker::LevelDelimiter,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MissingMarker::Colon => "colon",
            MissingMarker::FloorDelimiter => "floor delimiter",
            MissingMarker::SectionDelimiter => "section delimiter",
            MissingMarker::LevelDelimiter => "level delimiter",
        }
    }
}

/// Display text does not have the `<floor><section><level>:<position>` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub display_text: String,
    pub missing: Vec<MissingMarker>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.missing.iter().map(|marker| marker.label()).collect();
        write!(
            f,
            "display text [{}] format invalid: missing {}",
            self.display_text,
            labels.join(", ")
        )
    }
}

impl std::error::Error for ParseError {}

/// Tokenizer for composite position codes such as `1F2F3F:007`.
///
/// Floor, section and level share one delimiter character; each token is the
/// (at most two) characters ending at its delimiter. Everything after the
/// last colon is the position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionCodec {
    delimiter: char,
    floors: Vec<String>,
}

impl Default for PositionCodec {
    fn default() -> Self {
        Self::new(
            DEFAULT_DELIMITER,
            DEFAULT_FLOORS.iter().map(|floor| floor.to_string()).collect(),
        )
    }
}

impl PositionCodec {
    pub fn new(delimiter: char, floors: Vec<String>) -> Self {
        Self { delimiter, floors }
    }

    pub fn floors(&self) -> &[String] {
        &self.floors
    }

    pub fn validate_floor(&self, floor: &str) -> bool {
        self.floors.iter().any(|known| known == floor)
    }

    pub fn parse(&self, display_text: &str) -> Result<PositionCoordinates, ParseError> {
        let chars: Vec<char> = display_text.chars().collect();
        let colon = chars.iter().rposition(|c| *c == POSITION_SEPARATOR);
        let prefix = &chars[..colon.unwrap_or(chars.len())];

        let mut delimiters = prefix
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == self.delimiter)
            .map(|(index, _)| index);
        let bounds = [delimiters.next(), delimiters.next(), delimiters.next()];

        let mut missing = Vec::new();
        if colon.is_none() {
            missing.push(MissingMarker::Colon);
        }
        for (bound, marker) in bounds.iter().zip(MissingMarker::DELIMITERS) {
            if bound.is_none() {
                missing.push(marker);
            }
        }

        match (colon, bounds) {
            (Some(colon), [Some(floor), Some(section), Some(level)]) => Ok(PositionCoordinates {
                floor: token_ending_at(&chars, floor),
                section: token_ending_at(&chars, section),
                level: token_ending_at(&chars, level),
                position: chars[colon + 1..].iter().collect(),
            }),
            _ => Err(ParseError {
                display_text: display_text.to_string(),
                missing,
            }),
        }
    }
}

fn token_ending_at(chars: &[char], end: usize) -> String {
    let start = (end + 1).saturating_sub(TOKEN_WIDTH);
    chars[start..=end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_floor_accepts_only_configured_tokens() {
        let codec = PositionCodec::default();
        for floor in DEFAULT_FLOORS {
            assert!(codec.validate_floor(floor), "{floor} should be recognized");
        }
        for floor in ["", "4F", "1f", " 1F", "1", "F", "1F "] {
            assert!(!codec.validate_floor(floor), "{floor:?} should be rejected");
        }
    }

    #[test]
    fn parse_recovers_two_character_tokens_and_position() {
        let codec = PositionCodec::default();
        let coordinates = codec.parse("1F:2F:3F:007").expect("valid display text");
        assert_eq!(coordinates.floor, "1F");
        assert_eq!(coordinates.section, "2F");
        assert_eq!(coordinates.level, "3F");
        assert_eq!(coordinates.position, "007");

        let compact = codec.parse("2FAF5F:12").expect("compact display text");
        assert_eq!(compact.floor, "2F");
        assert_eq!(compact.section, "AF");
        assert_eq!(compact.level, "5F");
        assert_eq!(compact.position, "12");
    }

    #[test]
    fn parse_clamps_tokens_at_string_start() {
        let codec = PositionCodec::default();
        let coordinates = codec.parse("FF3F:1").expect("delimiters at the start");
        assert_eq!(coordinates.floor, "F");
        assert_eq!(coordinates.section, "FF");
        assert_eq!(coordinates.level, "3F");
        assert_eq!(coordinates.position, "1");
    }

    #[test]
    fn parse_handles_multibyte_delimiters() {
        let codec = PositionCodec::new('樓', vec!["1樓".to_string()]);
        let coordinates = codec.parse("1樓東樓3樓:甲12").expect("multibyte display text");
        assert_eq!(coordinates.floor, "1樓");
        assert_eq!(coordinates.section, "東樓");
        assert_eq!(coordinates.level, "3樓");
        assert_eq!(coordinates.position, "甲12");
    }

    #[test]
    fn parse_reports_every_missing_marker_together() {
        let codec = PositionCodec::default();

        let error = codec.parse("1F007").expect_err("missing colon and delimiters");
        assert_eq!(
            error.missing,
            vec![
                MissingMarker::Colon,
                MissingMarker::SectionDelimiter,
                MissingMarker::LevelDelimiter,
            ]
        );

        let error = codec.parse("").expect_err("empty text");
        assert_eq!(error.missing.len(), 4);

        let error = codec.parse("1F2F3F007").expect_err("missing colon only");
        assert_eq!(error.missing, vec![MissingMarker::Colon]);
        assert!(error.to_string().contains("missing colon"));
    }

    #[test]
    fn delimiters_after_the_colon_do_not_count() {
        let codec = PositionCodec::default();
        let error = codec.parse("1F2F:3F").expect_err("level delimiter is in the position");
        assert_eq!(error.missing, vec![MissingMarker::LevelDelimiter]);
    }

    #[test]
    fn parse_is_idempotent_on_structural_fields() {
        let codec = PositionCodec::default();
        let first = codec.parse("1F:2F:3F:007").expect("valid");
        let rebuilt = format!(
            "{}{}{}:{}",
            first.floor, first.section, first.level, first.position
        );
        let second = codec.parse(&rebuilt).expect("rebuilt text parses");
        assert_eq!(first, second);
    }
}
