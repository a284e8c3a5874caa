use super::types::{ApiError, ErrorBody, InventoryItem, ItemDraft, SignupRequest, SignupResponse};
use crate::util::validate_base_url;
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const INVENTORY_PATH: [&str; 2] = ["api", "inventory"];
const SIGNUP_PATH: [&str; 3] = ["api", "auth", "signup"];

/// HTTP client for the inventory backend.
///
/// Cheap to clone: the connection pool and token are shared. Every call is a
/// single attempt; failures are returned to the caller, never retried.
#[derive(Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    base: Url,
    token: Option<Arc<SecretString>>,
    timeout_secs: u64,
}

impl std::fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

impl InventoryClient {
    /// Build a client for `base_url`.
    ///
    /// SEC: the base URL must be HTTPS unless it points at a loopback host.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        token: Option<SecretString>,
    ) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url).map_err(|e| match e {
            crate::util::UrlValidationError::Insecure => ApiError::InsecureBaseUrl,
            other => ApiError::InvalidBaseUrl(other.to_string()),
        })?;
        let timeout_secs = timeout_secs.max(1);

        let http = reqwest::Client::builder()
            .redirect(redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            token: token.map(Arc::new),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Replace the bearer token sent with every request.
    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token.map(Arc::new);
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch the full item collection in server order.
    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, ApiError> {
        let url = self.endpoint(&INVENTORY_PATH, None)?;
        let body = self.send(self.request(Method::GET, url)).await?;
        let items: Vec<InventoryItem> = serde_json::from_str(&body)?;
        tracing::debug!(count = items.len(), "Fetched inventory items");
        Ok(items)
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<(), ApiError> {
        let url = self.endpoint(&INVENTORY_PATH, None)?;
        self.send(self.request(Method::POST, url).json(draft)).await?;
        tracing::info!(name = %draft.name, category = %draft.category, "Created item");
        Ok(())
    }

    /// Full replacement of the record identified by `id`.
    pub async fn update_item(&self, id: &str, draft: &ItemDraft) -> Result<(), ApiError> {
        let url = self.endpoint(&INVENTORY_PATH, Some(id))?;
        self.send(self.request(Method::PUT, url).json(draft)).await?;
        tracing::info!(id = %id, "Updated item");
        Ok(())
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&INVENTORY_PATH, Some(id))?;
        self.send(self.request(Method::DELETE, url)).await?;
        tracing::info!(id = %id, "Deleted item");
        Ok(())
    }

    /// Create an account. An empty or non-JSON success body yields a default response.
    pub async fn signup(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError> {
        let url = self.endpoint(&SIGNUP_PATH, None)?;
        let body = self.send(self.request(Method::POST, url).json(req)).await?;
        tracing::info!(email = %req.email, role = %req.role, "Account created");
        if body.trim().is_empty() {
            return Ok(SignupResponse::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    /// Join path segments onto the base URL. `id` is percent-encoded as a
    /// single segment, so ids containing `/` or `?` stay inside it.
    fn endpoint(&self, segments: &[&str], id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
            if let Some(id) = id {
                path.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        request
    }

    /// Send a request and return its body, mapping non-2xx to `HttpStatus`.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = tokio::time::timeout(Duration::from_secs(self.timeout_secs), request.send())
            .await
            .map_err(|_| ApiError::Timeout(self.timeout_secs))?
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_secs)
                } else {
                    ApiError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = read_limited_text(response, MAX_RESPONSE_SIZE)
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                .and_then(|body| body.message);
            tracing::warn!(status = status.as_u16(), message = ?message, "Request failed");
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        read_limited_text(response, MAX_RESPONSE_SIZE).await
    }
}

/// Read a response body as text, refusing anything over `limit` bytes.
async fn read_limited_text(response: Response, limit: usize) -> Result<String, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| ApiError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ItemStatus;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn draft() -> ItemDraft {
        ItemDraft {
            name: "Milk".into(),
            category: "Dairy, Bread & Eggs".into(),
            quantity: 12,
            price: Decimal::new(5450, 2),
            status: ItemStatus::InStock,
            image: None,
            minimum_quantity: Some(5),
        }
    }

    #[test]
    fn test_rejects_insecure_remote_base() {
        let err = InventoryClient::new("http://inventory.example.com", 30, None).unwrap_err();
        assert!(matches!(err, ApiError::InsecureBaseUrl));
    }

    #[test]
    fn test_rejects_garbage_base() {
        let err = InventoryClient::new("not a url", 30, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_id_is_single_encoded_segment() {
        let client = InventoryClient::new("https://example.com/backend", 30, None).unwrap();
        let url = client.endpoint(&INVENTORY_PATH, Some("a/b?c")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/backend/api/inventory/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = InventoryClient::new(
            "http://localhost:5000",
            30,
            Some(SecretString::from("sk-live-123".to_string())),
        )
        .unwrap();
        let out = format!("{:?}", client);
        assert!(!out.contains("sk-live-123"));
        assert!(out.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_list_items_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/inventory"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"_id":"1","name":"Milk","category":"Dairy, Bread & Eggs","quantity":3,"price":54.5,"status":"In Stock"},
                    {"id":"2","name":"Dog food","category":"Pet Care","quantity":0,"price":799,"status":"Out of Stock"}]"#,
            ))
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        let items = client.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[1].status, ItemStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_list_items_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/inventory"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        assert!(matches!(
            client.list_items().await,
            Err(ApiError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_http_error_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/inventory"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"message":"Name is required"}"#),
            )
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        let err = client.create_item(&draft()).await.unwrap_err();
        match &err {
            ApiError::HttpStatus { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message.as_deref(), Some("Name is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "Name is required");
    }

    #[tokio::test]
    async fn test_create_sends_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/inventory"))
            .and(body_json(serde_json::json!({
                "name": "Milk",
                "category": "Dairy, Bread & Eggs",
                "quantity": 12,
                "price": 54.5,
                "status": "In Stock",
                "minimumQuantity": 5
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        client.create_item(&draft()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_and_delete_target_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/inventory/64f0c2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/inventory/64f0c2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        client.update_item("64f0c2", &draft()).await.unwrap();
        client.delete_item("64f0c2").await.unwrap();
    }

    #[tokio::test]
    async fn test_bearer_token_sent_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/inventory"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        client.set_token(Some(SecretString::from("abc123".to_string())));
        assert!(client.has_token());
        assert!(client.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_parses_token_and_tolerates_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup"))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(r#"{"token":"t0k","message":"ok"}"#),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let req = SignupRequest {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "hunter22".into(),
            password_confirm: "hunter22".into(),
            company_name: "Acme".into(),
            role: "Staff".into(),
        };
        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        let first = client.signup(&req).await.unwrap();
        assert_eq!(first.token.as_deref(), Some("t0k"));
        let second = client.signup(&req).await.unwrap();
        assert!(second.token.is_none());
    }

    #[tokio::test]
    async fn test_response_too_large() {
        let server = MockServer::start().await;
        let big = "x".repeat(MAX_RESPONSE_SIZE + 1);
        Mock::given(method("GET"))
            .and(path("/api/inventory"))
            .respond_with(ResponseTemplate::new(200).set_body_string(big))
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 5, None).unwrap();
        assert!(matches!(
            client.list_items().await,
            Err(ApiError::ResponseTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/inventory"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = InventoryClient::new(&server.uri(), 1, None).unwrap();
        assert!(matches!(
            client.list_items().await,
            Err(ApiError::Timeout(1))
        ));
    }
}
