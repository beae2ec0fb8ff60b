#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use panel_gate::{ServerConfig, auth::RolePermissions, create_app};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use url::Url;

/// Scripted answer from the fake auth service.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub set_cookies: Vec<String>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
            set_cookies: Vec::new(),
            delay: None,
        }
    }

    pub fn ok() -> Self {
        Self::status(StatusCode::OK)
    }

    pub fn unauthorized() -> Self {
        Self::status(StatusCode::UNAUTHORIZED)
    }

    pub fn profile(email: &str, role: &str) -> Self {
        Self::body(
            StatusCode::OK,
            &serde_json::json!({ "email": email, "role": role }).to_string(),
        )
    }

    pub fn body(status: StatusCode, body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::status(status)
        }
    }

    pub fn with_cookie(mut self, set_cookie: &str) -> Self {
        self.set_cookies.push(set_cookie.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Replies are consumed in order; the last one repeats.
#[derive(Clone, Default)]
struct Endpoint {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<HeaderMap>>>,
}

impl Endpoint {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    fn next_reply(&self, headers: HeaderMap) -> Reply {
        self.requests.lock().unwrap().push(headers);
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies
                .front()
                .cloned()
                .unwrap_or_else(|| Reply::status(StatusCode::NOT_FOUND))
        }
    }
}

#[derive(Clone)]
struct Script {
    profile: Endpoint,
    refresh: Endpoint,
}

async fn respond(reply: Reply) -> Response {
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response();
    for cookie in reply.set_cookies {
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
    }
    response
}

async fn profile_handler(State(script): State<Script>, headers: HeaderMap) -> Response {
    let reply = script.profile.next_reply(headers);
    respond(reply).await
}

async fn refresh_handler(State(script): State<Script>, headers: HeaderMap) -> Response {
    let reply = script.refresh.next_reply(headers);
    respond(reply).await
}

/// Auth service stand-in listening on a random local port.
pub struct FakeUpstream {
    pub url: Url,
    script: Script,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn start(profile: Vec<Reply>, refresh: Vec<Reply>) -> Self {
        let script = Script {
            profile: Endpoint::new(profile),
            refresh: Endpoint::new(refresh),
        };

        let app = Router::new()
            .route("/auth/profile", get(profile_handler))
            .route("/auth/refresh", get(refresh_handler))
            .with_state(script.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).expect("Invalid URL"),
            script,
            handle,
        }
    }

    /// Valid session for the given identity.
    pub async fn signed_in(email: &str, role: &str) -> Self {
        Self::start(vec![Reply::profile(email, role)], vec![Reply::ok()]).await
    }

    /// Expired session: every call answers 401.
    pub async fn signed_out() -> Self {
        Self::start(vec![Reply::unauthorized()], vec![Reply::unauthorized()]).await
    }

    pub fn profile_requests(&self) -> Vec<HeaderMap> {
        self.script.profile.requests.lock().unwrap().clone()
    }

    pub fn refresh_requests(&self) -> Vec<HeaderMap> {
        self.script.refresh.requests.lock().unwrap().clone()
    }

    pub fn profile_hits(&self) -> usize {
        self.profile_requests().len()
    }

    pub fn refresh_hits(&self) -> usize {
        self.refresh_requests().len()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A local URL nothing listens on.
pub fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    Url::parse(&format!("http://{}", addr)).expect("Invalid URL")
}

pub fn test_config(backend_url: Url) -> ServerConfig {
    ServerConfig {
        backend_url,
        upstream_timeout: Duration::from_secs(2),
        permissions: RolePermissions::builtin(),
        secure_cookies: false,
    }
}

pub fn create_test_app(backend_url: Url) -> Router {
    create_app(&test_config(backend_url)).expect("Failed to create app")
}

/// Send a GET through the app with an optional Cookie header.
pub async fn send_get(app: Router, path: &str, cookies: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(path);
    if let Some(cookies) = cookies {
        request = request.header(header::COOKIE, cookies);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Follow `Location` headers like a browser would, keeping the same cookies.
/// Returns every path visited and the first non-redirect response, or `None`
/// if the chain is still redirecting after `max_hops`.
pub async fn follow_redirects(
    app: Router,
    path: &str,
    cookies: Option<&str>,
    max_hops: usize,
) -> (Vec<String>, Option<Response>) {
    let mut visited = vec![path.to_string()];
    for _ in 0..=max_hops {
        let response = send_get(app.clone(), visited.last().unwrap(), cookies).await;
        let next = location(&response)
            .filter(|_| response.status().is_redirection())
            .map(str::to_string);
        match next {
            Some(next) => visited.push(next),
            None => return (visited, Some(response)),
        }
    }
    (visited, None)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
