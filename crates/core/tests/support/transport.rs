use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use campus_core::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError};
use tokio::time::Instant;

use super::BASE_URL;

/// What the fake server does with one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Fail(TransportError),
    /// Answer after the given delay.
    Delayed(Duration, Box<Reply>),
    /// Never answer; only cancellation ends the request.
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Status(200, body.into())
    }

    pub fn status(status: u16) -> Self {
        Self::Status(status, String::new())
    }

    pub fn after(delay: Duration, reply: Self) -> Self {
        Self::Delayed(delay, Box::new(reply))
    }
}

type Handler = Arc<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

/// A recorded request with the (paused) clock reading when it arrived.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub request: ApiRequest,
    pub at: Instant,
}

#[derive(Default)]
struct Routes {
    scripts: HashMap<(HttpMethod, String), Vec<Reply>>,
    handlers: HashMap<(HttpMethod, String), Handler>,
}

/// Scripted `HttpTransport`.
///
/// Routes are keyed by method and endpoint path (relative to the versioned
/// base URL). A scripted route replays its replies in order and repeats the
/// last one; a handler route computes the reply from the request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    routes: Arc<Mutex<Routes>>,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, method: HttpMethod, path: &str, replies: Vec<Reply>) -> &Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        self.routes.lock().unwrap().scripts.insert((method, path.to_string()), replies);
        self
    }

    pub fn handle<F>(&self, method: HttpMethod, path: &str, handler: F) -> &Self
    where
        F: Fn(&ApiRequest) -> Reply + Send + Sync + 'static,
    {
        self.routes.lock().unwrap().handlers.insert((method, path.to_string()), Arc::new(handler));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<Recorded> {
        let url = endpoint(path);
        self.requests().into_iter().filter(|r| r.request.method == method && r.request.url == url).collect()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    fn next_reply(&self, request: &ApiRequest) -> Reply {
        let path = request
            .url
            .strip_prefix(&format!("{BASE_URL}/v1"))
            .unwrap_or_else(|| panic!("unexpected url {}", request.url))
            .to_string();
        let key = (request.method, path);

        let mut routes = self.routes.lock().unwrap();
        if let Some(handler) = routes.handlers.get(&key) {
            let handler = Arc::clone(handler);
            drop(routes);
            return handler(request);
        }
        let script = routes
            .scripts
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no route for {} {}", key.0, key.1));
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }
}

pub fn endpoint(path: &str) -> String {
    format!("{BASE_URL}/v1{path}")
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().unwrap().push(Recorded { request: request.clone(), at: Instant::now() });

        let mut reply = self.next_reply(&request);
        loop {
            match reply {
                Reply::Status(status, body) => return Ok(ApiResponse::new(status, body)),
                Reply::Fail(error) => return Err(error),
                Reply::Delayed(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
                Reply::Hang => std::future::pending::<()>().await,
            }
        }
    }
}
