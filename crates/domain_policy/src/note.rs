//! Policy notes written by staff

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, NoteId, PolicyId, UserId};

use crate::error::PolicyError;

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    #[default]
    General,
    Seguimiento,
    Recordatorio,
    Importante,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::General => "general",
            NoteType::Seguimiento => "seguimiento",
            NoteType::Recordatorio => "recordatorio",
            NoteType::Importante => "importante",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(NoteType::General),
            "seguimiento" => Ok(NoteType::Seguimiento),
            "recordatorio" => Ok(NoteType::Recordatorio),
            "importante" => Ok(NoteType::Importante),
            other => Err(CoreError::unknown_value("note type", other)),
        }
    }
}

/// Free-text annotation on a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyNote {
    pub id: NoteId,
    pub policy_id: PolicyId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub note_type: NoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyNote {
    pub fn new(
        policy_id: PolicyId,
        author_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
        note_type: NoteType,
    ) -> Result<Self, PolicyError> {
        let title = title.into();
        let content = content.into();

        if title.trim().is_empty() {
            return Err(PolicyError::validation("note title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(PolicyError::validation("note title exceeds 200 characters"));
        }
        if content.trim().is_empty() {
            return Err(PolicyError::validation("note content is required"));
        }

        let now = Utc::now();
        Ok(Self {
            id: NoteId::new_v7(),
            policy_id,
            author_id,
            title,
            content,
            note_type,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_defaults() {
        let note = PolicyNote::new(
            PolicyId::new(),
            UserId::new(),
            "Llamar al cliente",
            "Confirmar beneficiarios",
            NoteType::default(),
        )
        .unwrap();
        assert_eq!(note.note_type, NoteType::General);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_title_limits() {
        let long = "x".repeat(201);
        assert!(PolicyNote::new(PolicyId::new(), UserId::new(), long, "c", NoteType::General).is_err());
        assert!(PolicyNote::new(PolicyId::new(), UserId::new(), "", "c", NoteType::General).is_err());
    }

    #[test]
    fn test_note_type_parse() {
        assert_eq!("importante".parse::<NoteType>().unwrap(), NoteType::Importante);
        assert!("urgente".parse::<NoteType>().is_err());
    }
}
