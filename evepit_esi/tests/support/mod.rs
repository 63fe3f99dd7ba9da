#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use evepit_esi::{EsiConfig, EveClient, RetryPolicy};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

pub const CLIENT_ID: &str = "client-id";
pub const PRIVATE_KEY: &str = include_str!("../../resources/test/keys/jwt_rs256.key");
pub const JWKS: &str = include_str!("../../resources/test/keys/jwks.json");

#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// What the server saw for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seen {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct Routes {
    // Replies are consumed in order; the last one repeats.
    replies: HashMap<String, Vec<Reply>>,
    seen: Vec<Seen>,
}

/// Minimal HTTP/1.1 server answering GETs from a per-path script.
pub struct StubServer {
    pub base_url: String,
    routes: Arc<Mutex<Routes>>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let routes = Arc::new(Mutex::new(Routes::default()));

        let accept_routes = Arc::clone(&routes);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&accept_routes);
                tokio::spawn(async move { serve(stream, routes).await });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            routes,
        }
    }

    pub fn route(&self, path: &str, replies: Vec<Reply>) {
        self.routes
            .lock()
            .expect("routes lock")
            .replies
            .insert(path.to_owned(), replies);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.routes.lock().expect("routes lock").seen.clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.seen().iter().filter(|seen| seen.path == path).count()
    }

    /// Config pointing every ESI and SSO lookup at this server.
    pub fn config(&self) -> EsiConfig {
        let mut config = EsiConfig::new(CLIENT_ID, "secret", "evepit-tests/0.1");
        config.base_url = format!("{}/latest", self.base_url);
        config.sso_metadata_url = format!("{}/.well-known/oauth-authorization-server", self.base_url);
        config.retry = RetryPolicy {
            max_attempts: 3,
            backoff_initial: Duration::from_millis(1),
            backoff_max: Duration::from_millis(5),
            jitter_percent: 0,
        };
        config
    }

    pub fn client(&self) -> EveClient {
        client_for(self.config())
    }
}

pub fn client_for(config: EsiConfig) -> EveClient {
    let _ = pretty_env_logger::try_init();
    EveClient::new(config).expect("client builds from valid config")
}

async fn serve(mut stream: TcpStream, routes: Arc<Mutex<Routes>>) {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => buf.extend_from_slice(&chunk[..read]),
        }
    }

    let head = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = head.lines();
    let target = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    let authorization = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.trim().to_owned());
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target, None),
    };

    let reply = {
        let mut routes = routes.lock().expect("routes lock");
        routes.seen.push(Seen {
            path: path.clone(),
            query,
            authorization,
        });
        match routes.replies.get_mut(&path) {
            Some(replies) if replies.len() > 1 => replies.remove(0),
            Some(replies) if !replies.is_empty() => replies[0].clone(),
            _ => Reply::status(404, r#"{"error":"not found"}"#),
        }
    };

    let response = format!(
        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
