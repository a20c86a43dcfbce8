use serde::{Deserialize, Serialize};

use crate::notes::repo::{AdminNote, Note, NoteSummary};

/// Request body shared by create and update.
#[derive(Debug, Deserialize)]
pub struct NotePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleFilter {
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub success: bool,
    pub notes: Vec<NoteSummary>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub success: bool,
    pub note: Note,
}

#[derive(Debug, Serialize)]
pub struct AdminNotesResponse {
    pub success: bool,
    pub notes: Vec<AdminNote>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn note_response_carries_the_note() {
        let note = Note {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".into(),
            description: "d".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(NoteResponse {
            success: true,
            note,
        })
        .unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["note"]["title"], "t");
        assert_eq!(json["note"]["description"], "d");
    }

    #[test]
    fn payload_fields_default_to_empty() {
        let payload: NotePayload = serde_json::from_str(r#"{"title":"only"}"#).unwrap();
        assert_eq!(payload.title, "only");
        assert!(payload.description.is_empty());
    }
}
