pub mod client;

use serde_json::{Map, Value};

use crate::auth::Credential;
use crate::domain::message::Message;
use crate::domain::sharepoint::{Column, Site, SpList};
use crate::error::TransportError;

pub use client::GraphClient;

/// Inbox page size; only the first page is ever read.
pub const INBOX_PAGE_SIZE: u32 = 20;

/// Result of an item-creation call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Rejected { status: u16, body: String },
}

/// The Graph endpoints the workflow uses.
pub trait GraphApi: Send + Sync {
    fn list_messages(&self, credential: &Credential) -> Result<Vec<Message>, TransportError>;

    fn list_sites(&self, credential: &Credential) -> Result<Vec<Site>, TransportError>;

    fn list_lists(&self, credential: &Credential, site_id: &str) -> Result<Vec<SpList>, TransportError>;

    /// All columns of the list, unfiltered.
    fn list_columns(
        &self,
        credential: &Credential,
        site_id: &str,
        list_id: &str,
    ) -> Result<Vec<Column>, TransportError>;

    /// POST one item with `{"fields": fields}`.
    fn create_item(
        &self,
        credential: &Credential,
        site_id: &str,
        list_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<CreateOutcome, TransportError>;
}
