use crate::auth::{Account, Purpose};
use crate::domain::mapping::{FieldMapping, LogicalField};
use crate::domain::message::Message;
use crate::domain::sharepoint::Site;
use crate::error::{MappingError, ValidationError};
use crate::tickets::{SubmissionResult, SubmitRequest};
use crate::workflow::{Destination, Effect, LoadStatus, Outcome, SelectionSet};

/// Everything the ticket form shows, owned by the front end's main loop.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub same_account: bool,
    pub reader: Option<Account>,
    pub writer: Option<Account>,
    pub signing_in: Option<Purpose>,

    pub messages: Vec<Message>,
    pub inbox_status: LoadStatus,
    pub selection: SelectionSet,

    pub sites: Vec<Site>,
    pub sites_status: LoadStatus,
    pub destination: Destination,
    pub mapping: FieldMapping,

    pub submitting: bool,
    pub results: Vec<SubmissionResult>,

    /// One-line status for the user.
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(same_account: bool) -> Self {
        Self {
            same_account,
            ..Self::default()
        }
    }

    pub fn signed_in(&self) -> bool {
        self.reader.is_some() || self.writer.is_some()
    }

    /// The mapping panel only makes sense once the list's columns are known.
    pub fn mapping_available(&self) -> bool {
        matches!(self.destination, Destination::ColumnsLoaded { .. })
    }

    /// Switch between one shared account and separate reader/writer accounts.
    /// Only allowed while signed out.
    pub fn set_same_account(&mut self, same: bool) -> Vec<Effect> {
        if same == self.same_account {
            return vec![];
        }
        if self.signed_in() || self.signing_in.is_some() {
            self.notice = Some("Sign out before switching account mode.".into());
            return vec![];
        }
        self.same_account = same;
        vec![Effect::SetSameAccount(same)]
    }

    pub fn sign_in(&mut self, purpose: Purpose) -> Vec<Effect> {
        let purpose = if self.same_account {
            Purpose::MailRead
        } else {
            purpose
        };
        let held = match purpose {
            Purpose::MailRead => &self.reader,
            Purpose::ListWrite => &self.writer,
        };
        if self.signing_in.is_some() || held.is_some() {
            return vec![];
        }
        self.signing_in = Some(purpose);
        self.notice = Some("Waiting for sign-in in the browser...".into());
        vec![Effect::SignIn(purpose)]
    }

    /// Drop credentials and everything fetched with them. A batch still in
    /// flight finishes on its own; its results are discarded.
    pub fn sign_out(&mut self) -> Vec<Effect> {
        *self = Self {
            same_account: self.same_account,
            notice: Some("Signed out.".into()),
            ..Self::default()
        };
        vec![Effect::SignOut]
    }

    pub fn refresh_inbox(&mut self) -> Vec<Effect> {
        if self.reader.is_none() {
            return vec![];
        }
        self.inbox_status = LoadStatus::Loading;
        vec![Effect::LoadMessages]
    }

    pub fn toggle_message(&mut self, id: &str) {
        self.selection.toggle(id, &self.messages);
    }

    pub fn choose_site(&mut self, site_id: &str) -> Vec<Effect> {
        if self.destination.site_id().unwrap_or("") == site_id {
            return vec![];
        }
        self.mapping.clear();
        if self.destination.choose_site(site_id) {
            vec![Effect::LoadLists {
                site_id: site_id.to_string(),
            }]
        } else {
            vec![]
        }
    }

    pub fn choose_list(&mut self, list_id: &str) -> Vec<Effect> {
        if self.destination.list_id().unwrap_or("") == list_id {
            return vec![];
        }
        self.mapping.clear();
        let Some(site_id) = self.destination.site_id().map(str::to_string) else {
            return vec![];
        };
        if !self.destination.choose_list(list_id) {
            return vec![];
        }
        vec![Effect::LoadColumns {
            site_id,
            list_id: list_id.to_string(),
        }]
    }

    pub fn assign_mapping(&mut self, field: LogicalField, column: &str) -> Result<(), MappingError> {
        self.mapping
            .assign(field, column, self.destination.columns())
    }

    pub fn cycle_mapping(&mut self, field: LogicalField, step: i32) {
        if self.mapping_available() {
            self.mapping
                .cycle(field, self.destination.columns(), step);
        }
    }

    /// Snapshot of the form as a batch request.
    pub fn submit_request(&self) -> SubmitRequest {
        SubmitRequest {
            selection: self.selection.ids().to_vec(),
            messages: self.messages.clone(),
            site_id: self.destination.site_id().map(str::to_string),
            list_id: self.destination.list_id().map(str::to_string),
            mapping: Some(self.mapping.clone()).filter(|m| !m.is_empty()),
        }
    }

    /// Start a batch. Nothing is sent while one is already running; an
    /// incomplete form is rejected here, before any network call.
    pub fn request_submit(&mut self) -> Result<Vec<Effect>, ValidationError> {
        if self.submitting {
            return Ok(vec![]);
        }
        let request = self.submit_request();
        if let Err(e) = request.validate() {
            self.notice = Some(format!("Cannot create tickets: {e}."));
            return Err(e);
        }
        self.submitting = true;
        self.results.clear();
        self.notice = Some(format!("Creating {} ticket(s)...", request.selection.len()));
        Ok(vec![Effect::Submit(request)])
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::SignInPrompt(url) => {
                self.notice = Some(format!("Sign in via your browser: {url}"));
                vec![]
            }
            Outcome::SignedIn { purpose, account } => {
                if self.signing_in != Some(purpose) {
                    log::debug!("discarding sign-in for {purpose:?}, nobody is waiting for it");
                    return vec![];
                }
                self.signed_in_as(purpose, account)
            }
            Outcome::SignInFailed { purpose, error } => {
                if self.signing_in == Some(purpose) {
                    self.signing_in = None;
                }
                self.notice = Some(format!("Sign-in failed: {error}"));
                vec![]
            }
            Outcome::Messages(result) => {
                if self.reader.is_none() {
                    return vec![];
                }
                match result {
                    Ok(messages) => {
                        self.selection.retain_page(&messages);
                        self.messages = messages;
                        self.inbox_status = LoadStatus::Ready;
                    }
                    Err(e) => {
                        // keep whatever was shown before
                        self.notice = Some("Could not load emails.".into());
                        self.inbox_status = LoadStatus::Failed(e);
                    }
                }
                vec![]
            }
            Outcome::Sites(result) => {
                if self.writer.is_none() {
                    return vec![];
                }
                match result {
                    Ok(sites) => {
                        self.sites = sites;
                        self.sites_status = LoadStatus::Ready;
                    }
                    Err(e) => {
                        self.notice = Some("Could not load SharePoint sites.".into());
                        self.sites_status = LoadStatus::Failed(e);
                    }
                }
                vec![]
            }
            Outcome::Lists { site_id, result } => {
                self.destination.lists_arrived(&site_id, result);
                vec![]
            }
            Outcome::Columns {
                site_id,
                list_id,
                result,
            } => {
                self.destination
                    .columns_arrived(&site_id, &list_id, result);
                vec![]
            }
            Outcome::Submitted(results) => {
                if !self.submitting {
                    log::debug!("discarding results of a batch nobody is waiting for");
                    return vec![];
                }
                let ok = results.iter().filter(|r| r.is_success()).count();
                self.notice = Some(format!(
                    "{ok} of {} ticket(s) created.",
                    results.len()
                ));
                self.results = results;
                self.submitting = false;
                vec![]
            }
            Outcome::SubmitFailed(error) => {
                if self.submitting {
                    self.submitting = false;
                    self.notice = Some(format!("Cannot create tickets: {error}"));
                }
                vec![]
            }
        }
    }

    fn signed_in_as(&mut self, purpose: Purpose, account: Account) -> Vec<Effect> {
        self.signing_in = None;
        self.notice = Some(format!("Signed in as {}.", account.label()));

        let mut effects = Vec::new();
        let reader = self.same_account || purpose == Purpose::MailRead;
        let writer = self.same_account || purpose == Purpose::ListWrite;
        if reader {
            self.reader = Some(account.clone());
            self.inbox_status = LoadStatus::Loading;
            effects.push(Effect::LoadMessages);
        }
        if writer {
            self.writer = Some(account);
            self.sites_status = LoadStatus::Loading;
            effects.push(Effect::LoadSites);
        }
        effects
    }
}
