use std::fmt;
use std::time::{Duration, Instant};

use crate::error::AuthError;

/// Access tokens are treated as expired this long before they really are.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// The two logical identities the workflow needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Reads the inbox.
    MailRead,
    /// Reads sites and writes list items.
    ListWrite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl Account {
    pub fn label(&self) -> &str {
        self.username
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A bearer token plus the account it belongs to. Lives in memory only.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
    pub account: Account,
    expires_at: Option<Instant>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, account: Account, expires_in: Option<Duration>) -> Self {
        Self {
            access_token: access_token.into(),
            account,
            expires_at: expires_in.map(|d| Instant::now() + d),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + EXPIRY_SKEW >= at,
            None => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("account", &self.account)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What a token endpoint hands back.
pub struct Grant {
    pub credential: Credential,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSets {
    pub mail: Vec<String>,
    pub site: Vec<String>,
}

impl Default for ScopeSets {
    fn default() -> Self {
        let base = ["openid", "profile", "offline_access"];
        Self {
            mail: base
                .iter()
                .chain(&["User.Read", "Mail.Read"])
                .map(|s| s.to_string())
                .collect(),
            site: base
                .iter()
                .chain(&["Sites.ReadWrite.All"])
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScopeSets {
    /// Scopes to request for `purpose`. A shared account asks for both sets at once.
    pub fn for_purpose(&self, purpose: Purpose, same_account: bool) -> Vec<String> {
        if !same_account {
            return match purpose {
                Purpose::MailRead => self.mail.clone(),
                Purpose::ListWrite => self.site.clone(),
            };
        }
        let mut scopes = self.mail.clone();
        for s in &self.site {
            if !scopes.contains(s) {
                scopes.push(s.clone());
            }
        }
        scopes
    }
}

/// Token acquisition against the identity platform.
pub trait IdentityProvider: Send {
    /// Prompt the user. `select_account` forces the account picker so a second
    /// identity can be chosen.
    fn acquire_interactive(&self, scopes: &[String], select_account: bool) -> Result<Grant, AuthError>;

    /// Reacquire without user interaction.
    fn acquire_silent(&self, refresh_token: &str, scopes: &[String]) -> Result<Grant, AuthError>;
}

struct Held {
    credential: Credential,
    refresh_token: Option<String>,
}

/// Holds the reader and writer credentials for the lifetime of the process.
pub struct Session<P> {
    provider: P,
    scopes: ScopeSets,
    same_account: bool,
    reader: Option<Held>,
    writer: Option<Held>,
}

impl<P: IdentityProvider> Session<P> {
    pub fn new(provider: P, scopes: ScopeSets, same_account: bool) -> Self {
        Self {
            provider,
            scopes,
            same_account,
            reader: None,
            writer: None,
        }
    }

    pub fn same_account(&self) -> bool {
        self.same_account
    }

    /// Switching between one and two identities forgets the writer.
    pub fn set_same_account(&mut self, same: bool) {
        if same != self.same_account {
            self.writer = None;
        }
        self.same_account = same;
    }

    fn slot(&self, purpose: Purpose) -> &Option<Held> {
        match purpose {
            Purpose::ListWrite if !self.same_account => &self.writer,
            _ => &self.reader,
        }
    }

    /// The held credential for `purpose`, without any acquisition.
    pub fn credential(&self, purpose: Purpose) -> Option<&Credential> {
        self.slot(purpose).as_ref().map(|h| &h.credential)
    }

    /// Return a usable credential, prompting the user only when nothing can be
    /// reused or refreshed.
    pub fn acquire_credential(&mut self, purpose: Purpose) -> Result<Credential, AuthError> {
        match self.acquire_silent(purpose) {
            Ok(c) => return Ok(c),
            Err(AuthError::NotSignedIn) => {}
            Err(e) => log::info!("silent token acquisition failed, prompting: {e}"),
        }

        let scopes = self.scopes.for_purpose(purpose, self.same_account);
        let select_account = !self.same_account && purpose == Purpose::ListWrite;
        let grant = self.provider.acquire_interactive(&scopes, select_account)?;
        log::info!(
            "signed in as {} for {:?}",
            grant.credential.account.label(),
            purpose
        );

        let credential = grant.credential.clone();
        let held = Held {
            credential: grant.credential,
            refresh_token: grant.refresh_token,
        };
        match purpose {
            Purpose::ListWrite if !self.same_account => self.writer = Some(held),
            _ => self.reader = Some(held),
        }
        Ok(credential)
    }

    /// Return the held credential, refreshing it if it has expired. Never prompts.
    pub fn acquire_silent(&mut self, purpose: Purpose) -> Result<Credential, AuthError> {
        let scopes = self.scopes.for_purpose(purpose, self.same_account);
        let slot = match purpose {
            Purpose::ListWrite if !self.same_account => &mut self.writer,
            _ => &mut self.reader,
        };
        let Some(held) = slot.as_mut() else {
            return Err(AuthError::NotSignedIn);
        };
        if !held.credential.is_expired() {
            return Ok(held.credential.clone());
        }
        let Some(refresh_token) = held.refresh_token.clone() else {
            *slot = None;
            return Err(AuthError::NotSignedIn);
        };

        log::debug!("access token for {purpose:?} expired, refreshing");
        match self.provider.acquire_silent(&refresh_token, &scopes) {
            Ok(grant) => {
                let mut credential = grant.credential;
                if credential.account.id.is_empty() {
                    credential.account = held.credential.account.clone();
                }
                held.credential = credential;
                if grant.refresh_token.is_some() {
                    held.refresh_token = grant.refresh_token;
                }
                Ok(held.credential.clone())
            }
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }

    /// Forget every held credential.
    pub fn logout(&mut self) {
        self.reader = None;
        self.writer = None;
        log::info!("signed out");
    }
}
