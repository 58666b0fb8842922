#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use mail_tickets::auth::session::{Grant, IdentityProvider};
use mail_tickets::auth::{Account, Credential};
use mail_tickets::domain::message::Message;
use mail_tickets::domain::sharepoint::{Column, Site, SpList};
use mail_tickets::error::{AuthError, TransportError};
use mail_tickets::graph::{CreateOutcome, GraphApi};
use serde_json::{Map, Value, json};

pub enum Failure {
    Transport,
    Rejected(u16, &'static str),
}

/// A real reqwest error that never touches the network.
pub fn transport_failure() -> TransportError {
    reqwest::blocking::Client::new()
        .get("not a url")
        .send()
        .unwrap_err()
        .into()
}

#[derive(Default)]
pub struct FakeGraph {
    pub messages: Vec<Message>,
    pub sites: Vec<Site>,
    pub lists: HashMap<String, Vec<SpList>>,
    pub columns: Vec<Column>,
    pub inbox_down: bool,
    /// Keyed by message subject.
    pub failures: HashMap<String, Failure>,
    pub posts: Mutex<Vec<(String, String, Map<String, Value>)>>,
    pub calls: AtomicUsize,
}

impl FakeGraph {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn posted_fields(&self) -> Vec<Map<String, Value>> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, f)| f.clone())
            .collect()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl GraphApi for FakeGraph {
    fn list_messages(&self, _c: &Credential) -> Result<Vec<Message>, TransportError> {
        self.hit();
        if self.inbox_down {
            return Err(transport_failure());
        }
        Ok(self.messages.clone())
    }

    fn list_sites(&self, _c: &Credential) -> Result<Vec<Site>, TransportError> {
        self.hit();
        Ok(self.sites.clone())
    }

    fn list_lists(&self, _c: &Credential, site_id: &str) -> Result<Vec<SpList>, TransportError> {
        self.hit();
        Ok(self.lists.get(site_id).cloned().unwrap_or_default())
    }

    fn list_columns(&self, _c: &Credential, _s: &str, _l: &str) -> Result<Vec<Column>, TransportError> {
        self.hit();
        Ok(self.columns.clone())
    }

    fn create_item(
        &self,
        _c: &Credential,
        site_id: &str,
        list_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<CreateOutcome, TransportError> {
        self.hit();
        self.posts
            .lock()
            .unwrap()
            .push((site_id.to_string(), list_id.to_string(), fields.clone()));

        let subject = fields
            .values()
            .filter_map(Value::as_str)
            .find(|v| self.failures.contains_key(*v));
        match subject.and_then(|s| self.failures.get(s)) {
            Some(Failure::Transport) => Err(transport_failure()),
            Some(Failure::Rejected(status, body)) => Ok(CreateOutcome::Rejected {
                status: *status,
                body: body.to_string(),
            }),
            None => Ok(CreateOutcome::Created),
        }
    }
}

/// Signs everybody in as "ann" without a browser.
#[derive(Default)]
pub struct FakeProvider {
    pub prompts: Arc<AtomicUsize>,
}

impl IdentityProvider for FakeProvider {
    fn acquire_interactive(&self, _scopes: &[String], _select: bool) -> Result<Grant, AuthError> {
        let n = self.prompts.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Grant {
            credential: Credential::new(
                format!("token-{n}"),
                Account {
                    id: format!("oid-{n}"),
                    username: Some("ann@contoso.com".into()),
                    display_name: None,
                },
                None,
            ),
            refresh_token: None,
        })
    }

    fn acquire_silent(&self, _rt: &str, _scopes: &[String]) -> Result<Grant, AuthError> {
        Err(AuthError::NotSignedIn)
    }
}

pub fn credential() -> Credential {
    Credential::new("token", Account::default(), None)
}

pub fn message(id: &str, subject: &str, received: &str) -> Message {
    serde_json::from_value(json!({
        "id": id,
        "subject": subject,
        "bodyPreview": format!("preview of {subject}"),
        "from": { "emailAddress": { "address": format!("{id}@contoso.com") } },
        "receivedDateTime": received
    }))
    .unwrap()
}

pub fn column(name: &str) -> Column {
    serde_json::from_value(json!({ "id": name, "name": name, "displayName": name })).unwrap()
}
