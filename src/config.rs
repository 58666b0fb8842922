use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::session::ScopeSets;
use crate::graph::client::DEFAULT_GRAPH_BASE;
use crate::tickets::TicketClock;

pub const DEFAULT_CLIENT_ID: &str = "5c1e64c0-76f2-4200-8ee5-b3b3d19b53da";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8400/callback";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    pub authority: Option<String>,
    pub redirect_uri: Option<String>,
    pub graph_base_url: Option<String>,
    /// One account reads mail and writes tickets (default), or two.
    pub same_account: Option<bool>,
    /// Clock used for ticket numbers: "utc" (default) or "local".
    pub ticket_timezone: Option<TicketClock>,
    pub mail_scopes: Option<Vec<String>>,
    pub site_scopes: Option<Vec<String>>,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            authority: Some(DEFAULT_AUTHORITY.to_string()),
            redirect_uri: Some(DEFAULT_REDIRECT_URI.to_string()),
            graph_base_url: None,
            same_account: Some(true),
            ticket_timezone: Some(TicketClock::Utc),
            mail_scopes: None,
            site_scopes: None,
        }
    }
}

impl Config {
    pub fn authority(&self) -> &str {
        self.authority.as_deref().unwrap_or(DEFAULT_AUTHORITY)
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_deref().unwrap_or(DEFAULT_REDIRECT_URI)
    }

    pub fn graph_base_url(&self) -> &str {
        self.graph_base_url.as_deref().unwrap_or(DEFAULT_GRAPH_BASE)
    }

    pub fn same_account(&self) -> bool {
        self.same_account.unwrap_or(true)
    }

    pub fn ticket_clock(&self) -> TicketClock {
        self.ticket_timezone.unwrap_or_default()
    }

    pub fn scopes(&self) -> ScopeSets {
        let defaults = ScopeSets::default();
        ScopeSets {
            mail: self.mail_scopes.clone().unwrap_or(defaults.mail),
            site: self.site_scopes.clone().unwrap_or(defaults.site),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail_tickets"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

/// Load the user's config. A missing file is replaced by a template holding
/// the defaults, which are then used.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config::default();
        let tom = toml::to_string_pretty(&sample)?;
        if let Err(e) = fs::write(path, tom) {
            log::warn!("could not write template config {}: {e}", path.display());
        } else {
            log::info!("created template config at {}", path.display());
        }
        return Ok(sample);
    }
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
