use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde_json::Value;
use tower::{Service, ServiceBuilder};
use tracing::{debug, info};
use url::Url;

use crate::creds::CredentialProvider;
use crate::error::{FetchError, UpstreamError};
use crate::util::{path_segments, GITHUB_ACCEPT, GITHUB_API_VERSION, JSON_ACCEPT, USER_AGENT};

/// Authenticated JSON fetcher for one upstream API. Responsible for attaching credentials,
/// executing requests one at a time, and turning every non-success response into an
/// [`UpstreamError`]. Knows nothing about the shape of the resources it fetches.
pub fn service(http_client: HttpClient, endpoint: Endpoint) -> impl FetchService {
    ServiceBuilder::new()
        .concurrency_limit(1)
        .map_request(move |request: ApiRequest| endpoint.request_builder(&http_client, &request))
        .service_fn(send)
}

pub trait FetchService: Service<ApiRequest, Response = Value, Error = FetchError> {}
impl<T: Service<ApiRequest, Response = Value, Error = FetchError>> FetchService for T {}

pub fn http_client() -> Result<HttpClient> {
    let client = HttpClient::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

async fn send(request: RequestBuilder) -> Result<Value, FetchError> {
    let response = request.send().await?;
    json_or_error(response).await
}

/// Decodes a successful response body verbatim. Anything outside 2xx becomes an
/// [`UpstreamError`]; an empty success body decodes as `null`.
pub async fn json_or_error(response: Response) -> Result<Value, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, body = %body, "upstream responded with an error");
        return Err(UpstreamError::new(status).into());
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Where requests go and how they are authenticated.
#[derive(Clone)]
pub struct Endpoint {
    base_url: Url,
    headers: Vec<(&'static str, &'static str)>,
    creds: Arc<dyn CredentialProvider>,
}

impl Endpoint {
    pub fn new(base_url: &str, creds: Arc<dyn CredentialProvider>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            bail!("`{base_url}` cannot be used as an API base URL");
        }

        Ok(Self {
            base_url,
            headers: vec![("Accept", JSON_ACCEPT)],
            creds,
        })
    }

    pub fn github(base_url: &str, creds: Arc<dyn CredentialProvider>) -> Result<Self> {
        Ok(Self {
            headers: vec![
                ("Accept", GITHUB_ACCEPT),
                ("X-GitHub-Api-Version", GITHUB_API_VERSION),
            ],
            ..Self::new(base_url, creds)?
        })
    }

    pub fn url(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&request.segments);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        url
    }

    pub fn request_builder(
        &self,
        http_client: &HttpClient,
        request: &ApiRequest,
    ) -> RequestBuilder {
        let url = self.url(request);
        info!(%url, method = %request.method, "preparing request");

        let base = http_client
            .request(request.method.clone(), url)
            .bearer_auth(self.creds.bearer_token());

        let with_headers = self
            .headers
            .iter()
            .fold(base, |request_builder, (key, value)| {
                request_builder.header(*key, *value)
            });

        if let Some(body) = &request.body {
            with_headers.json(body)
        } else {
            with_headers
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn get<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            method: Method::GET,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A GET for a slash-separated path such as `/classrooms/7/assignments`.
    pub fn get_path(path: &str) -> Self {
        Self::get(path_segments(path))
    }

    pub fn post_json<I>(segments: I, body: Value) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(segments)
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, always starting with `/`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use tower::ServiceExt;

    use super::*;
    use crate::creds::BearerToken;

    fn endpoint() -> Endpoint {
        let creds = Arc::new(BearerToken::new("token".to_owned()));
        Endpoint::github("https://api.github.com", creds).unwrap()
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(http::Response::builder().status(status).body(body).unwrap())
    }

    #[tokio::test]
    async fn forbidden_becomes_upstream_error() {
        let result = json_or_error(response(403, r#"{"message":"Resource not accessible"}"#)).await;

        let error = result.unwrap_err();
        let upstream = error.upstream().unwrap();
        assert_eq!(upstream.code(), 403);
        assert!(error.to_sentinel()["error"]
            .as_str()
            .unwrap()
            .ends_with("403 Forbidden"));
    }

    #[tokio::test]
    async fn success_body_is_returned_verbatim() {
        let value = json_or_error(response(200, r#"[{"id":1,"title":"HW1"}]"#))
            .await
            .unwrap();
        assert_eq!(value, json!([{ "id": 1, "title": "HW1" }]));
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let value = json_or_error(response(204, "")).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let error = json_or_error(response(200, "<html>")).await.unwrap_err();
        assert!(matches!(error, FetchError::Decode(_)));
    }

    #[test]
    fn url_escapes_segments_and_appends_query() {
        let request = ApiRequest::get(["v4", "spreadsheets", "abc", "values", "Grades Q1!A1:Z"])
            .with_query("valueRenderOption", "FORMATTED_VALUE");
        let url = endpoint().url(&request);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/v4/spreadsheets/abc/values/Grades%20Q1!A1:Z?valueRenderOption=FORMATTED_VALUE"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let creds = Arc::new(BearerToken::new("token".to_owned()));
        let endpoint = Endpoint::new("https://github.example.com/api/v3/", creds).unwrap();
        let url = endpoint.url(&ApiRequest::get_path("/classrooms/7/assignments"));
        assert_eq!(
            url.as_str(),
            "https://github.example.com/api/v3/classrooms/7/assignments"
        );
    }

    #[test]
    fn request_carries_credentials_and_version_headers() {
        let http_client = HttpClient::new();
        let request = endpoint()
            .request_builder(&http_client, &ApiRequest::get_path("/classrooms"))
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["Authorization"], "Bearer token");
        assert_eq!(headers["Accept"], GITHUB_ACCEPT);
        assert_eq!(headers["X-GitHub-Api-Version"], GITHUB_API_VERSION);
        assert_eq!(*request.method(), Method::GET);
    }

    #[test]
    fn unknown_status_reason_falls_back() {
        let error = UpstreamError::new(StatusCode::from_u16(599).unwrap());
        assert_eq!(error.reason(), "Unknown");
    }

    #[tokio::test]
    async fn unbuildable_request_is_transport_error() {
        let error = send(HttpClient::new().get("not a url")).await.unwrap_err();

        assert!(matches!(error, FetchError::Transport(_)));
        let sentinel = error.to_sentinel();
        assert!(sentinel["error"]
            .as_str()
            .unwrap()
            .starts_with("request could not be completed"));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let creds = Arc::new(BearerToken::new("token".to_owned()));
        let endpoint = Endpoint::github("http://127.0.0.1:1", creds).unwrap();
        let service = service(http_client().unwrap(), endpoint);

        let error = service
            .oneshot(ApiRequest::get(["classrooms"]))
            .await
            .unwrap_err();

        assert!(matches!(error, FetchError::Transport(_)));
        assert_eq!(error.to_sentinel().as_object().unwrap().len(), 1);
    }
}
