use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{IntoUrl, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::helpers::{ApiResult, message_from_body};

/// Transport HTTP partagé par toutes les passerelles.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL dont chaque segment est encodé (`/`, `?` et `#` compris).
    pub fn segments_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let invalid = || ClientError::Validation(format!("URL de l'API invalide: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl IntoUrl, auth: Option<&str>) -> RequestBuilder {
        let req = self.http.request(method, url);
        match auth {
            Some(value) => req.header(AUTHORIZATION, value),
            None => req,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: Option<&str>) -> ApiResult<T> {
        Self::send(self.request(Method::GET, self.url(path), auth)).await
    }

    pub async fn get_segments<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        auth: Option<&str>,
    ) -> ApiResult<T> {
        let url = self.segments_url(segments)?;
        Self::send(self.request(Method::GET, url, auth)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, auth: Option<&str>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Self::send(self.request(Method::GET, self.url(path), auth).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, auth: Option<&str>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send(self.request(Method::POST, self.url(path), auth).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, auth: Option<&str>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send(self.request(Method::PUT, self.url(path), auth).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, auth: Option<&str>) -> ApiResult<T> {
        Self::send(self.request(Method::DELETE, self.url(path), auth)).await
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> ApiResult<T> {
        let res = req.send().await.map_err(|e| {
            warn!("requête impossible: {e}");
            ClientError::Network(e.to_string())
        })?;

        let status = res.status();
        let url = res.url().path().to_string();
        if status.is_success() {
            debug!(%status, %url, "réponse reçue");
            let body = res.bytes().await?;
            // Certains accusés (DELETE) peuvent arriver sans corps.
            if body.is_empty() {
                return serde_json::from_str("null").map_err(ClientError::from);
            }
            return serde_json::from_slice(&body).map_err(ClientError::from);
        }

        let body = res.text().await.unwrap_or_default();
        let err = ClientError::from_status(status, message_from_body(&body));
        debug!(%status, %url, "réponse en échec: {err}");
        Err(err)
    }
}
