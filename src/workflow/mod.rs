//! Application state for the ticket form and the messages that drive it.
//!
//! `AppState` never talks to the network. User actions and network arrivals
//! are applied through its update methods, which hand back the [`Effect`]s the
//! caller must run; the caller reports each effect's result as an [`Outcome`].

pub mod destination;
pub mod selection;
pub mod state;

use crate::auth::{Account, Purpose};
use crate::domain::message::Message;
use crate::domain::sharepoint::{Column, Site, SpList};
use crate::tickets::{SubmissionResult, SubmitRequest};

pub use destination::Destination;
pub use selection::SelectionSet;
pub use state::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Work the state asks the outside world to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetSameAccount(bool),
    SignIn(Purpose),
    SignOut,
    LoadMessages,
    LoadSites,
    LoadLists { site_id: String },
    LoadColumns { site_id: String, list_id: String },
    Submit(SubmitRequest),
}

/// The result of running an [`Effect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The sign-in URL, for when the browser could not be opened.
    SignInPrompt(String),
    SignedIn { purpose: Purpose, account: Account },
    SignInFailed { purpose: Purpose, error: String },
    Messages(Result<Vec<Message>, String>),
    Sites(Result<Vec<Site>, String>),
    Lists { site_id: String, result: Result<Vec<SpList>, String> },
    Columns { site_id: String, list_id: String, result: Result<Vec<Column>, String> },
    Submitted(Vec<SubmissionResult>),
    /// The batch never started (e.g. the writer credential was gone).
    SubmitFailed(String),
}
