use std::collections::HashSet;

use serde::Serialize;

use crate::auth::Credential;
use crate::domain::mapping::FieldMapping;
use crate::domain::message::{Message, MessageId};
use crate::error::ValidationError;
use crate::graph::{CreateOutcome, GraphApi};
use crate::tickets::number::TicketClock;
use crate::tickets::payload::build_fields;

/// Everything a batch needs, captured when the user hits submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitRequest {
    /// Iteration order of the batch.
    pub selection: Vec<MessageId>,
    /// The last fetched inbox page.
    pub messages: Vec<Message>,
    pub site_id: Option<String>,
    pub list_id: Option<String>,
    /// `None` (or an empty mapping) writes the default columns.
    pub mapping: Option<FieldMapping>,
}

impl SubmitRequest {
    /// Site and list ids, or why the batch must not run.
    pub fn validate(&self) -> Result<(&str, &str), ValidationError> {
        let site = self
            .site_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingSite)?;
        let list = self
            .list_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingList)?;
        if self.selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok((site, list))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Success,
    Error {
        #[serde(rename = "error")]
        detail: String,
    },
}

/// What happened to one selected message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub message_id: MessageId,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        self.outcome == ItemOutcome::Success
    }
}

/// Create one list item per selected message, one after another.
///
/// Validation happens before anything touches the network. Messages missing
/// from `request.messages` are skipped without a result entry; every other
/// message gets exactly one entry, in order of first selection, whatever
/// happened to the ones before it. Repeated ids are submitted once.
pub fn submit_tickets(
    api: &dyn GraphApi,
    writer: &Credential,
    request: &SubmitRequest,
    clock: TicketClock,
) -> Result<Vec<SubmissionResult>, ValidationError> {
    let (site_id, list_id) = request.validate()?;
    let mapping = request.mapping.as_ref();

    let mut seen = HashSet::new();
    let results = request
        .selection
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| request.messages.iter().find(|m| &m.id == id))
        .fold(Vec::new(), |mut results, message| {
            let fields = build_fields(message, mapping, clock);
            let outcome = match api.create_item(writer, site_id, list_id, &fields) {
                Ok(CreateOutcome::Created) => ItemOutcome::Success,
                Ok(CreateOutcome::Rejected { status, body }) => {
                    log::warn!("ticket for {} rejected with {status}", message.id);
                    ItemOutcome::Error { detail: body }
                }
                Err(e) => {
                    log::warn!("ticket for {} failed: {e}", message.id);
                    ItemOutcome::Error {
                        detail: e.to_string(),
                    }
                }
            };
            results.push(SubmissionResult {
                message_id: message.id.clone(),
                outcome,
            });
            results
        });

    let ok = results.iter().filter(|r| r.is_success()).count();
    log::info!("batch finished: {ok}/{} tickets created", results.len());
    Ok(results)
}
