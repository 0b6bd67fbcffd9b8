use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::codec::PositionCoordinates;

/// Store-assigned identifier of a position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(pub i64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A memorial tablet/seat allocation as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
    pub position_code: String,
    pub floor: String,
    pub section: String,
    pub level: String,
    pub position: String,
    pub applicant_name: Option<String>,
    pub relation: Option<String>,
    pub mobile_phone: Option<String>,
    pub note: Option<String>,
}

impl Position {
    /// Re-point the record at a new code, keeping the derived coordinates in sync.
    pub fn relocate(&mut self, position_code: &str, coordinates: PositionCoordinates) {
        self.position_code = position_code.to_string();
        self.floor = coordinates.floor;
        self.section = coordinates.section;
        self.level = coordinates.level;
        self.position = coordinates.position;
    }
}

/// Position awaiting insert; the store assigns the id on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPosition {
    pub name: String,
    pub position_code: String,
    pub floor: String,
    pub section: String,
    pub level: String,
    pub position: String,
    pub applicant_name: Option<String>,
    pub relation: Option<String>,
    pub mobile_phone: Option<String>,
    pub note: Option<String>,
}

impl NewPosition {
    pub fn with_id(self, id: PositionId) -> Position {
        Position {
            id,
            name: self.name,
            position_code: self.position_code,
            floor: self.floor,
            section: self.section,
            level: self.level,
            position: self.position,
            applicant_name: self.applicant_name,
            relation: self.relation,
            mobile_phone: self.mobile_phone,
            note: self.note,
        }
    }
}

/// Raw operator-entered row of an import batch.
///
/// Every field is optional on the wire so that missing cells surface as
/// row-level violations instead of deserialization failures. Blank cells
/// read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub floor: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub position_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub applicant_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub relation: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mobile_phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub note: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Listing filter; `name_contains` is a case-sensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionFilter {
    pub name_contains: Option<String>,
}

impl PositionFilter {
    pub fn name_contains(term: impl Into<String>) -> Self {
        Self {
            name_contains: Some(term.into()),
        }
    }

    pub fn matches(&self, position: &Position) -> bool {
        match self.name_contains.as_deref() {
            Some(term) => position.name.contains(term),
            None => true,
        }
    }
}
