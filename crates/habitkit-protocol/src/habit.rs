//! Habit wire types.
//!
//! These describe the records the habit API stores and returns. The API
//! has gone through several shapes (snake_case `habit_id`/`habit_name`
//! from the table store, plain `id`/`name` from the newer handlers), so
//! decoding accepts both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{from_value, to_payload};
use crate::{Payload, ProtocolError};

/// Collection path for habits.
pub const HABITS_PATH: &str = "habits";

// ---------------------------------------------------------------------------
// HabitId
// ---------------------------------------------------------------------------

/// Server-assigned habit identifier.
///
/// Always a single non-empty path segment: it is spliced into
/// `habits/{id}`, so anything that would change which resource the path
/// names (`/`, `?`, `#`, `%`, `\`, control characters, `.` or `..`) is
/// refused. Decoding applies the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HabitId(String);

impl HabitId {
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if `id` is blank or is not
    /// a single path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "habit id is required".into(),
            ));
        }
        let bad_char = trimmed.chars().find(|c| {
            matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_control()
        });
        if bad_char.is_some() || trimmed == "." || trimmed == ".." {
            return Err(ProtocolError::InvalidMessage(format!(
                "habit id '{}' is not a single path segment",
                trimmed.escape_debug()
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `habits/{id}`
    pub fn resource_path(&self) -> String {
        format!("{HABITS_PATH}/{}", self.0)
    }

    /// `habits/{id}/complete`
    pub fn complete_path(&self) -> String {
        format!("{HABITS_PATH}/{}/complete", self.0)
    }

    /// `habits/{id}/history`
    pub fn history_path(&self) -> String {
        format!("{HABITS_PATH}/{}/history", self.0)
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HabitId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HabitId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HabitId> for String {
    fn from(id: HabitId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// How often a habit is meant to be done.
///
/// Serialized lowercase. Decoding goes through [`FromStr`], so it ignores
/// case and accepts the Spanish names older records were written with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "diaria" => Ok(Frequency::Daily),
            "weekly" | "semanal" => Ok(Frequency::Weekly),
            "monthly" | "mensual" => Ok(Frequency::Monthly),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown frequency '{other}', expected daily, weekly or monthly"
            ))),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewHabit {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    frequency: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
}

impl NewHabit {
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
    ) -> Result<Self, ProtocolError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "habit name is required".into(),
            ));
        }
        Ok(Self {
            name,
            description: None,
            frequency,
            start_date: None,
        })
    }

    /// Sets a description. Blank text is treated as none.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let text = description.into().trim().to_string();
        self.description = (!text.is_empty()).then_some(text);
        self
    }

    /// Sets the start date (`YYYY-MM-DD`). When absent the server uses
    /// today.
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Errors
    /// Returns a [`ProtocolError`] if serialization fails.
    pub fn to_payload(&self) -> Result<Payload, ProtocolError> {
        to_payload(self)
    }
}

/// Body of an update request. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HabitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl HabitUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.frequency.is_none()
            && self.completed.is_none()
    }

    /// # Errors
    /// Returns a [`ProtocolError`] if serialization fails.
    pub fn to_payload(&self) -> Result<Payload, ProtocolError> {
        to_payload(self)
    }
}

// ---------------------------------------------------------------------------
// Habit
// ---------------------------------------------------------------------------

/// A habit record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    #[serde(alias = "habit_id", alias = "habitId")]
    pub id: HabitId,
    #[serde(alias = "habit_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Habit {
    /// Decodes the habit list out of a list response.
    ///
    /// The records may sit under `Items` (table-store scan), `items`
    /// (a bare array wrapped by the codec) or `habits`. A body with none
    /// of those keys is an empty list.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if a record is malformed.
    pub fn list_from(body: &Payload) -> Result<Vec<Habit>, ProtocolError> {
        let Some(items) = ["Items", "items", "habits"]
            .iter()
            .find_map(|key| body.get(*key))
        else {
            return Ok(Vec::new());
        };
        from_value(items.clone())
    }
}
