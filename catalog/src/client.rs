//! HTTP transport for the marketplace REST API
//!
//! [`HttpClient`] owns the connection pool and the token. The small adapter
//! types at the bottom plug it into the orchestration traits of
//! `catalog-cache`, so the caches never see HTTP.

use crate::config::ClientConfig;
use crate::models::{Nft, User};
use async_trait::async_trait;
use catalog_cache::{FetchError, ImageSource, PageFetcher, RemoteFetcher, Result};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

const API_PREFIX: &str = "api/v1";

/// Client for the marketplace REST API
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    token_header: HeaderName,
    token: HeaderValue,
}

impl HttpClient {
    /// Create a client from validated configuration
    ///
    /// # Example
    /// ```no_run
    /// use catalog::{ClientConfig, HttpClient};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ClientConfig::new("https://api.example.com", "token");
    /// let client = HttpClient::new(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| FetchError::Config(format!("invalid token header: {}", e)))?;
        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|e| FetchError::Config(format!("invalid token: {}", e)))?;
        token.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        info!("HTTP client ready for {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_header,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path such as `nft/42`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    fn api_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .header(self.token_header.clone(), self.token.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// GET an API path and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_with_query(path, &[]).await
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", path, query);
        let request = self.api_request(Method::GET, path).query(query);
        let body = send(request, path).await?;
        decode_json(&body, path)
    }

    /// PUT a url-encoded form to an API path and decode the JSON answer
    ///
    /// An empty `form` sends an empty body, which the API reads as "no value"
    /// for every field.
    pub async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T> {
        debug!("PUT {} ({} fields)", path, form.len());
        let request = self.api_request(Method::PUT, path).form(form);
        let body = send(request, path).await?;
        decode_json(&body, path)
    }

    /// GET raw bytes from an absolute URL
    ///
    /// Used for images, which live outside the API and get no token.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidLocator(format!("{}: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidLocator(format!(
                "unsupported scheme in {}",
                url
            )));
        }

        debug!("GET {}", url);
        let context = url.to_string();
        send(self.http.get(url), &context).await
    }
}

async fn send(request: RequestBuilder, context: &str) -> Result<Vec<u8>> {
    let response = request.send().await.map_err(map_reqwest_error)?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        warn!("{} not found", context);
        return Err(FetchError::NotFound(context.to_string()));
    }
    if !status.is_success() {
        warn!("{} answered {}", context, status);
        return Err(FetchError::Status {
            status: status.as_u16(),
            context: context.to_string(),
        });
    }

    let body = response.bytes().await.map_err(map_reqwest_error)?;
    Ok(body.to_vec())
}

fn decode_json<T: DeserializeOwned>(body: &[u8], context: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| FetchError::Decode(format!("{}: {}", context, e)))
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_builder() {
        FetchError::InvalidLocator(e.to_string())
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Fetches one NFT per identifier from `GET /api/v1/nft/{id}`
#[derive(Clone)]
pub struct NftFetcher {
    client: HttpClient,
}

impl NftFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteFetcher<Nft> for NftFetcher {
    async fn fetch(&self, key: &str) -> Result<Nft> {
        self.client.get_json(&format!("nft/{}", key)).await
    }
}

/// Fetches leaderboard pages from `GET /api/v1/users?page={n}`
#[derive(Clone)]
pub struct UsersPageFetcher {
    client: HttpClient,
}

impl UsersPageFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher<User> for UsersPageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<User>> {
        self.client
            .get_json_with_query("users", &[("page", page.to_string())])
            .await
    }
}

/// Image bytes over plain HTTP GET
#[derive(Clone)]
pub struct HttpImageSource {
    client: HttpClient,
}

impl HttpImageSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>> {
        self.client.get_bytes(locator).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(&ClientConfig::new("https://api.example.com/", "secret")).unwrap()
    }

    #[test]
    fn test_endpoint_joins_prefix() {
        let client = client();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.endpoint("nft/7"), "https://api.example.com/api/v1/nft/7");
        assert_eq!(client.endpoint("/profile/1"), "https://api.example.com/api/v1/profile/1");
    }

    #[test]
    fn test_bad_token_header_rejected() {
        let config = ClientConfig::builder("https://api.example.com", "secret")
            .token_header("bad header")
            .build();
        assert!(matches!(HttpClient::new(&config), Err(FetchError::Config(_))));
    }

    #[tokio::test]
    async fn test_unparsable_image_locator() {
        let result = client().get_bytes("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidLocator(_))));

        let result = client().get_bytes("file:///etc/passwd").await;
        assert!(matches!(result, Err(FetchError::InvalidLocator(_))));
    }
}
