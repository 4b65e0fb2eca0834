pub mod chat_endpoint;
pub mod embeddings_endpoint;
pub mod images_endpoint;
pub mod models_endpoint;

use crate::{
    config::{OpenAIAuthentication, OpenAIClientSettings},
    error::{OpenAIError, Result},
    models::ApiErrorResponse,
};
use reqwest::{header, multipart::Form, Client, IntoUrl, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

pub use chat_endpoint::ChatEndPoint;
pub use embeddings_endpoint::EmbeddingsEndPoint;
pub use images_endpoint::ImagesEndPoint;
pub use models_endpoint::ModelsEndPoint;

/// Everything an endpoint needs to talk to the API. Shared by all endpoints
/// of one client and never mutated after construction.
pub(crate) struct ClientContext {
    auth: OpenAIAuthentication,
    settings: OpenAIClientSettings,
    base_url: String,
    http: Client,
    // No auth headers: used for fetching generated images from their CDN.
    download_http: Client,
}

impl ClientContext {
    fn new(auth: OpenAIAuthentication, settings: OpenAIClientSettings) -> Result<Self> {
        settings.validate()?;

        let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", auth.api_key()))
            .map_err(|_| OpenAIError::ConfigError("API key contains invalid characters".into()))?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        if let Some(organization) = auth.organization() {
            let value = header::HeaderValue::from_str(organization).map_err(|_| {
                OpenAIError::ConfigError("Organization id contains invalid characters".into())
            })?;
            headers.insert("OpenAI-Organization", value);
        }

        let http = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| OpenAIError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let download_http = Client::builder()
            .user_agent(user_agent)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| OpenAIError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.base_url(),
            auth,
            settings,
            http,
            download_http,
        })
    }

    pub(crate) fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }

    /// `route` followed by one percent-encoded path segment.
    pub(crate) fn url_with_segment(&self, route: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(route)).map_err(|e| {
            OpenAIError::ConfigError(format!("Invalid base url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                OpenAIError::ConfigError(format!("Base url {} cannot take a path", self.base_url))
            })?
            .push(segment);
        Ok(url)
    }

    pub(crate) async fn post_json<T, R>(&self, route: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)
            .map_err(|e| OpenAIError::SerializationError(e.to_string()))?;

        log::info!("POST /{}", route);
        log::debug!("Request payload: {}", payload);

        let response = self
            .http
            .post(self.url(route))
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("POST /{} failed: {}", route, e);
                OpenAIError::RequestError(e.to_string())
            })?;

        Self::read_json(route, response).await
    }

    pub(crate) async fn post_multipart<R>(&self, route: &str, form: Form) -> Result<R>
    where
        R: DeserializeOwned,
    {
        log::info!("POST /{} (multipart)", route);

        let response = self
            .http
            .post(self.url(route))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("POST /{} failed: {}", route, e);
                OpenAIError::RequestError(e.to_string())
            })?;

        Self::read_json(route, response).await
    }

    pub(crate) async fn get<R>(&self, route: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.get_url(route, self.url(route)).await
    }

    /// GET an already-built URL; `route` only labels the log lines.
    pub(crate) async fn get_url<R, U>(&self, route: &str, url: U) -> Result<R>
    where
        R: DeserializeOwned,
        U: IntoUrl,
    {
        log::info!("GET /{}", route);

        let response = self.http.get(url).send().await.map_err(|e| {
            log::error!("GET /{} failed: {}", route, e);
            OpenAIError::RequestError(e.to_string())
        })?;

        Self::read_json(route, response).await
    }

    pub(crate) async fn download(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Downloading {}", url);

        let response = self.download_http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAIError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn read_json<R: DeserializeOwned>(route: &str, response: Response) -> Result<R> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OpenAIError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => body,
            };
            log::error!("/{} returned {}: {}", route, status, message);
            return Err(OpenAIError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        log::debug!("/{} raw response: {}", route, body);

        serde_json::from_str(&body).map_err(|e| OpenAIError::ResponseError(e.to_string()))
    }
}

/// Entry point of the library. Owns the credentials and settings, and hands
/// them to every endpoint it exposes.
#[derive(Clone)]
pub struct OpenAIClient {
    context: Arc<ClientContext>,
    images: ImagesEndPoint,
    embeddings: EmbeddingsEndPoint,
    chat: ChatEndPoint,
    models: ModelsEndPoint,
}

impl OpenAIClient {
    pub fn new(auth: OpenAIAuthentication, settings: OpenAIClientSettings) -> Result<Self> {
        let context = Arc::new(ClientContext::new(auth, settings)?);

        Ok(Self {
            images: ImagesEndPoint::new(context.clone()),
            embeddings: EmbeddingsEndPoint::new(context.clone()),
            chat: ChatEndPoint::new(context.clone()),
            models: ModelsEndPoint::new(context.clone()),
            context,
        })
    }

    pub fn with_auth(auth: OpenAIAuthentication) -> Result<Self> {
        Self::new(auth, OpenAIClientSettings::default())
    }

    /// Credentials from the environment, `.env` or a `.openai` file, and
    /// settings from the environment.
    pub fn from_env() -> Result<Self> {
        let auth = OpenAIAuthentication::default_auth()?;
        let settings = OpenAIClientSettings::from_env();
        crate::logger::log_client_info(&settings);
        Self::new(auth, settings)
    }

    pub fn images(&self) -> &ImagesEndPoint {
        &self.images
    }

    pub fn embeddings(&self) -> &EmbeddingsEndPoint {
        &self.embeddings
    }

    pub fn chat(&self) -> &ChatEndPoint {
        &self.chat
    }

    pub fn models(&self) -> &ModelsEndPoint {
        &self.models
    }

    pub fn settings(&self) -> &OpenAIClientSettings {
        &self.context.settings
    }

    pub fn auth(&self) -> &OpenAIAuthentication {
        &self.context.auth
    }

    pub fn base_url(&self) -> &str {
        &self.context.base_url
    }
}
