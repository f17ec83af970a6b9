use crate::model::error::CodecError;
use crate::utils::ROOM_CODE_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical room identifier as used on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Normalizes a user-facing room code (`ABC-123`) to its canonical form (`ABC123`).
    pub fn parse(code: &str) -> Result<Self, CodecError> {
        let canonical: String = code
            .trim()
            .chars()
            .filter(|c| *c != ROOM_CODE_SEPARATOR)
            .collect();

        if canonical.is_empty() {
            return Err(CodecError::EmptyRoomId);
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: six-character codes get a separator after the third character.
    pub fn display_code(&self) -> String {
        if self.0.chars().count() == 6 {
            let split = self.0.char_indices().nth(3).map(|(i, _)| i).unwrap_or(0);
            format!(
                "{}{}{}",
                &self.0[..split],
                ROOM_CODE_SEPARATOR,
                &self.0[split..]
            )
        } else {
            self.0.clone()
        }
    }
}

impl FromStr for RoomId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
