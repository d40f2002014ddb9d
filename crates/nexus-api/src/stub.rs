//! One-shot HTTP server for the repository tests.
//!
//! Each queued [`Reply`] answers exactly one connection, in order. The
//! request line and body of every connection are recorded so a test can
//! check what the client sent.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::client::{ApiClient, ApiConfig};

/// A canned response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Reply {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(content_type: &'static str, body: &[u8]) -> Self {
        Reply {
            status: 200,
            content_type,
            body: body.to_vec(),
        }
    }
}

/// What the client sent on one connection.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    /// e.g. `GET /api/bills?limit=100 HTTP/1.1`
    pub request_line: String,
    pub body: String,
}

pub(crate) struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&self.base_url)).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server on a free local port that answers with `replies`.
pub(crate) async fn serve(replies: Vec<Reply>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        for reply in replies {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            answer(stream, reply, &recorded).await;
        }
    });

    StubServer {
        base_url: format!("http://{addr}/api"),
        requests,
    }
}

async fn answer(mut stream: TcpStream, reply: Reply, recorded: &Mutex<Vec<Recorded>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    // Headers
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    // Body
    while buf.len() < head_end + length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let end = buf.len().min(head_end + length);
    recorded.lock().unwrap().push(Recorded {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[head_end..end]).to_string(),
    });

    let header = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    stream.write_all(header.as_bytes()).await.unwrap();
    stream.write_all(&reply.body).await.unwrap();
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
