use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use crate::auth::Credential;
use crate::domain::message::Message;
use crate::domain::sharepoint::{Column, Site, SpList};
use crate::error::TransportError;
use crate::graph::{CreateOutcome, GraphApi, INBOX_PAGE_SIZE};

pub const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

const MESSAGE_FIELDS: &str = "id,subject,bodyPreview,from,receivedDateTime";

#[derive(Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Blocking Microsoft Graph client.
pub struct GraphClient {
    http: Client,
    base: Url,
}

impl GraphClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base_url).map_err(|e| TransportError::Url(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::Url(format!("{base_url}: not a base URL")));
        }
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_collection<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        url: Url,
    ) -> Result<Vec<T>, TransportError> {
        log::debug!("GET {url}");
        let res = self.http.get(url).bearer_auth(credential.bearer()).send()?;
        let res = check(res)?;
        let page: Collection<T> = res.json()?;
        Ok(page.value)
    }
}

fn check(res: Response) -> Result<Response, TransportError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text()?;
    Err(TransportError::Status { status, body })
}

impl GraphApi for GraphClient {
    fn list_messages(&self, credential: &Credential) -> Result<Vec<Message>, TransportError> {
        let mut url = self.endpoint(&["me", "mailFolders", "inbox", "messages"])?;
        url.query_pairs_mut()
            .append_pair("$top", &INBOX_PAGE_SIZE.to_string())
            .append_pair("$select", MESSAGE_FIELDS);
        self.get_collection(credential, url)
    }

    fn list_sites(&self, credential: &Credential) -> Result<Vec<Site>, TransportError> {
        let mut url = self.endpoint(&["sites"])?;
        url.query_pairs_mut().append_pair("search", "*");
        self.get_collection(credential, url)
    }

    fn list_lists(&self, credential: &Credential, site_id: &str) -> Result<Vec<SpList>, TransportError> {
        let url = self.endpoint(&["sites", site_id, "lists"])?;
        self.get_collection(credential, url)
    }

    fn list_columns(
        &self,
        credential: &Credential,
        site_id: &str,
        list_id: &str,
    ) -> Result<Vec<Column>, TransportError> {
        let url = self.endpoint(&["sites", site_id, "lists", list_id, "columns"])?;
        self.get_collection(credential, url)
    }

    fn create_item(
        &self,
        credential: &Credential,
        site_id: &str,
        list_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<CreateOutcome, TransportError> {
        let url = self.endpoint(&["sites", site_id, "lists", list_id, "items"])?;
        log::debug!("POST {url}");
        let res = self
            .http
            .post(url)
            .bearer_auth(credential.bearer())
            .json(&json!({ "fields": fields }))
            .send()?;

        if res.status().is_success() {
            return Ok(CreateOutcome::Created);
        }
        let status = res.status().as_u16();
        let body = res.text()?;
        Ok(CreateOutcome::Rejected { status, body })
    }
}
