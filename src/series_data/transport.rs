//! The auth/transport seam between the forecast core and the data provider,
//! and its HTTP implementation against NASA Earthdata / Giovanni.

use crate::series_data::error::{AuthError, TransportError};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Url};
use std::env;
use std::fmt;

pub const USERNAME_ENV: &str = "EARTHDATA_USERNAME";
pub const PASSWORD_ENV: &str = "EARTHDATA_PASSWORD";

const URS_HOST: &str = "urs.earthdata.nasa.gov";
const MAX_REDIRECTS: usize = 10;

/// Short-lived bearer token for provider queries.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Token acquisition and query execution against the data provider.
///
/// Implementations must hand out a fresh token on every [`Transport::get_token`]
/// call; the core never caches tokens across requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_token(&self) -> Result<BearerToken, AuthError>;

    /// Issues a GET with the given query parameters and headers and returns the body text.
    async fn query(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<String, TransportError>;
}

/// Earthdata login credentials.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads `EARTHDATA_USERNAME` and `EARTHDATA_PASSWORD` from the environment.
    pub fn from_env() -> Result<Self, AuthError> {
        let read = |name: &'static str| match env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(AuthError::MissingCredentials(name)),
        };
        Ok(Self::new(read(USERNAME_ENV)?, read(PASSWORD_ENV)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// [`Transport`] over HTTPS using Earthdata login for Giovanni tokens.
pub struct EarthdataTransport {
    client: Client,
    signin_url: String,
    credentials: Credentials,
}

impl EarthdataTransport {
    pub fn new(
        signin_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, AuthError> {
        // Redirects are followed by hand so credentials only go to the sign-in host
        // and the Earthdata login host, and session cookies survive the hops.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .build()
            .map_err(AuthError::Client)?;
        Ok(Self {
            client,
            signin_url: signin_url.into(),
            credentials,
        })
    }

    fn sends_credentials(url: &Url, signin: &Url) -> bool {
        url.host_str() == Some(URS_HOST) || url.host_str() == signin.host_str()
    }
}

#[async_trait]
impl Transport for EarthdataTransport {
    async fn get_token(&self) -> Result<BearerToken, AuthError> {
        let signin = Url::parse(&self.signin_url).map_err(|e| {
            AuthError::Rejected(format!("Invalid sign-in URL '{}': {}", self.signin_url, e))
        })?;
        let mut url = signin.clone();

        for _ in 0..MAX_REDIRECTS {
            let mut request = self.client.get(url.clone());
            if Self::sends_credentials(&url, &signin) {
                request = request.basic_auth(
                    &self.credentials.username,
                    Some(&self.credentials.password),
                );
            }
            let response = request
                .send()
                .await
                .map_err(|e| AuthError::NetworkRequest(url.to_string(), e))?;

            if response.status().is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        AuthError::Rejected(format!("Redirect from {} without location", url))
                    })?;
                let next = response
                    .url()
                    .join(location)
                    .map_err(|e| {
                        AuthError::Rejected(format!("Invalid redirect '{}': {}", location, e))
                    })?;
                debug!("Sign-in redirected to {}", next.host_str().unwrap_or("?"));
                url = next;
                continue;
            }

            let response = response.error_for_status().map_err(|e| match e.status() {
                Some(status) => AuthError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                },
                None => AuthError::NetworkRequest(url.to_string(), e),
            })?;
            let body = response
                .text()
                .await
                .map_err(|e| AuthError::NetworkRequest(url.to_string(), e))?;
            let token = body.replace('"', "").trim().to_string();
            if token.is_empty() {
                return Err(AuthError::EmptyToken);
            }
            info!("Obtained new Giovanni authentication token");
            return Ok(BearerToken::new(token));
        }

        Err(AuthError::Rejected(format!(
            "Sign-in exceeded {} redirects",
            MAX_REDIRECTS
        )))
    }

    async fn query(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<String, TransportError> {
        let mut request = self.client.get(url).query(params);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(status) => TransportError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => TransportError::NetworkRequest(url.to_string(), e),
                });
            }
        };

        response
            .text()
            .await
            .map_err(|e| TransportError::NetworkRequest(url.to_string(), e))
    }
}
