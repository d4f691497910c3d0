use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::TokenSource;
use crate::config::HttpConfig;
use crate::error::ClientError;

/// Thin wrapper over `reqwest::Client` bound to the backend base URL.
///
/// Every request built through [`ApiClient::authorized`] asks the token
/// source for the current token and attaches it as a bearer credential when
/// there is one. There is no refresh on 401 and no retry.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
        config: &HttpConfig,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The token the next authorized request would carry.
    pub async fn current_token(&self) -> Option<String> {
        self.tokens.get_token().await
    }

    /// A request carrying the current bearer token, if any.
    pub async fn authorized(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.url(segments)?;
        let builder = self.http.request(method, url);
        match self.current_token().await {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => {
                debug!("No token available; sending request unauthenticated");
                Ok(builder)
            }
        }
    }

    /// A request that never carries credentials.
    pub fn public(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let response = send(self.authorized(Method::GET, segments).await?).await?;
        decode(response).await
    }

    pub async fn get_public_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ClientError> {
        let response = send(self.public(Method::GET, segments)?).await?;
        decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ClientError> {
        send(self.authorized(Method::POST, segments).await?.json(body)).await?;
        Ok(())
    }

    pub async fn put(&self, segments: &[&str]) -> Result<(), ClientError> {
        send(self.authorized(Method::PUT, segments).await?).await?;
        Ok(())
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    let response = builder.send().await?;
    let status = response.status();
    debug!("{} <- {}", status, response.url());
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}
