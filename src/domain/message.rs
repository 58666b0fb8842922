use serde::{Deserialize, Serialize};

pub type MessageId = String;

/// One inbox message, as returned by Graph's `/me/mailFolders/inbox/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_preview: String,
    #[serde(default)]
    pub from: Option<Recipient>,
    #[serde(default)]
    pub received_date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(default)]
    pub email_address: Option<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Message {
    pub fn sender_address(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|r| r.email_address.as_ref())
            .and_then(|e| e.address.as_deref())
    }

    /// Subject as shown in the checklist.
    pub fn display_subject(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "(No Subject)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_graph_message() {
        let m: Message = serde_json::from_value(json!({
            "id": "AAMk1",
            "subject": "Printer broken",
            "bodyPreview": "It jams on page two",
            "from": { "emailAddress": { "name": "Ann", "address": "a@b.com" } },
            "receivedDateTime": "2024-03-05T14:37:00Z"
        }))
        .unwrap();

        assert_eq!(m.sender_address(), Some("a@b.com"));
        assert_eq!(m.display_subject(), "Printer broken");
        assert_eq!(m.received_date_time.as_deref(), Some("2024-03-05T14:37:00Z"));
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let m: Message = serde_json::from_value(json!({ "id": "x", "subject": null })).unwrap();
        assert_eq!(m.sender_address(), None);
        assert_eq!(m.display_subject(), "(No Subject)");
        assert!(m.body_preview.is_empty());
    }
}
