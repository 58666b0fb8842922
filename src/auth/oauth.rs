use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::reqwest::http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, Client, ClientId, CsrfToken, ExtraTokenFields,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, StandardRevocableToken,
    StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, Server};
use url::Url;

use crate::auth::id_token::account_from_id_token;
use crate::auth::session::{Account, Credential, Grant, IdentityProvider};
use crate::error::AuthError;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// The identity platform returns an OIDC id token next to the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

type MsTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

type MsClient = Client<
    BasicErrorResponse,
    MsTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

/// Query parameters the identity platform sends to the redirect URI.
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code { code: String, state: Option<String> },
    Error { error: String, description: Option<String> },
}

/// Authorization code + PKCE against the Microsoft identity platform, with the
/// redirect caught on a loopback listener.
pub struct PkceProvider {
    client: MsClient,
    redirect: Url,
    on_prompt: Box<dyn Fn(&Url) + Send>,
}

impl PkceProvider {
    pub fn new(client_id: &str, authority: &str, redirect_uri: &str) -> Result<Self, AuthError> {
        let authority = authority.trim_end_matches('/');
        let auth_url = AuthUrl::new(format!("{authority}/oauth2/v2.0/authorize"))
            .map_err(|e| AuthError::Config(format!("authority: {e}")))?;
        let token_url = TokenUrl::new(format!("{authority}/oauth2/v2.0/token"))
            .map_err(|e| AuthError::Config(format!("authority: {e}")))?;
        let redirect = Url::parse(redirect_uri)
            .map_err(|e| AuthError::Config(format!("redirect_uri '{redirect_uri}': {e}")))?;

        // public client: no secret, client_id goes in the request body
        let client = MsClient::new(
            ClientId::new(client_id.to_string()),
            None,
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(
            RedirectUrl::new(redirect_uri.to_string())
                .map_err(|e| AuthError::Config(format!("redirect_uri: {e}")))?,
        );

        Ok(Self {
            client,
            redirect,
            on_prompt: Box::new(|url: &Url| eprintln!("Open this URL in your browser to sign in:\n{url}")),
        })
    }

    /// Replace how the sign-in URL is shown to the user (the TUI owns the screen).
    pub fn with_prompt_hook(mut self, hook: impl Fn(&Url) + Send + 'static) -> Self {
        self.on_prompt = Box::new(hook);
        self
    }

    fn bind_addr(&self) -> Result<(String, SocketAddr), AuthError> {
        let host = self
            .redirect
            .host_str()
            .ok_or_else(|| AuthError::Config(format!("redirect_uri missing host: {}", self.redirect)))?;
        let port = self
            .redirect
            .port_or_known_default()
            .ok_or_else(|| AuthError::Config(format!("redirect_uri missing port: {}", self.redirect)))?;
        let ip: IpAddr = match host {
            "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse().map_err(|_| {
                AuthError::Config(format!(
                    "redirect_uri host must be localhost/127.0.0.1 or an IP: {other}"
                ))
            })?,
        };
        Ok((host.to_string(), SocketAddr::new(ip, port)))
    }
}

impl IdentityProvider for PkceProvider {
    fn acquire_interactive(&self, scopes: &[String], select_account: bool) -> Result<Grant, AuthError> {
        let (host, bind_addr) = self.bind_addr()?;

        // listen before the browser can possibly redirect
        let server = Server::http(bind_addr).map_err(|e| {
            AuthError::Callback(format!("failed to bind callback server on {bind_addr}: {e}"))
        })?;

        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().map(|s| Scope::new(s.clone())))
            .set_pkce_challenge(challenge);
        if select_account {
            request = request.add_extra_param("prompt", "select_account");
        }
        let (auth_url, csrf) = request.url();

        (self.on_prompt)(&auth_url);
        if let Err(e) = open::that(auth_url.as_str()) {
            log::warn!("could not open browser automatically: {e}");
        }

        let callback = wait_for_callback(&server, &host, bind_addr.port(), CALLBACK_TIMEOUT)?;
        let code = match callback {
            Callback::Code { code, state } => {
                if state.as_deref() != Some(csrf.secret().as_str()) {
                    return Err(AuthError::Callback("state mismatch in redirect".into()));
                }
                code
            }
            Callback::Error { error, description } => {
                return Err(match error.as_str() {
                    "access_denied" | "consent_required" | "interaction_required" => {
                        AuthError::Denied(description.unwrap_or(error))
                    }
                    _ => AuthError::Callback(match description {
                        Some(d) => format!("{error}: {d}"),
                        None => error,
                    }),
                });
            }
        };

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(verifier)
            .request(http_client)
            .map_err(|e| {
                log::debug!("token exchange failed: {e:#?}");
                AuthError::Exchange(e.to_string())
            })?;

        Ok(grant_from(&token))
    }

    fn acquire_silent(&self, refresh_token: &str, scopes: &[String]) -> Result<Grant, AuthError> {
        let rt = RefreshToken::new(refresh_token.to_string());
        let token = self
            .client
            .exchange_refresh_token(&rt)
            .add_scopes(scopes.iter().map(|s| Scope::new(s.clone())))
            .request(http_client)
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        Ok(grant_from(&token))
    }
}

fn grant_from(token: &MsTokenResponse) -> Grant {
    let account = token
        .extra_fields()
        .id_token
        .as_deref()
        .and_then(account_from_id_token)
        .unwrap_or_else(Account::default);

    Grant {
        credential: Credential::new(
            token.access_token().secret().to_string(),
            account,
            token.expires_in(),
        ),
        refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
    }
}

fn wait_for_callback(
    server: &Server,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<Callback, AuthError> {
    let wait_until = Instant::now() + timeout;

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        // request.url() is only path+query
        let full = format!("http://{}:{}{}", host, port, request.url());
        match Url::parse(&full).ok().and_then(|u| parse_callback(&u)) {
            Some(cb) => {
                let text = match &cb {
                    Callback::Code { .. } => "Signed in. You can close this tab.",
                    Callback::Error { .. } => "Sign-in failed. You can close this tab.",
                };
                let _ = request.respond(Response::from_string(text));
                return Ok(cb);
            }
            None => {
                // favicon and friends
                let _ = request.respond(Response::from_string("Waiting for sign-in..."));
            }
        }
    }

    Err(AuthError::Cancelled)
}

pub fn parse_callback(url: &Url) -> Option<Callback> {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            "error_description" => description = Some(v.into_owned()),
            _ => {}
        }
    }
    if let Some(error) = error {
        return Some(Callback::Error { error, description });
    }
    code.map(|code| Callback::Code { code, state })
}
