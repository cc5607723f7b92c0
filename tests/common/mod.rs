#![allow(dead_code)]

use async_trait::async_trait;
use iptv_manager::error::{AppError, Result};
use iptv_manager::http::HttpClient;
use iptv_manager::SourceDefinition;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

pub const PLAYLIST: &str = "#EXTM3U\n#EXTINF:-1,Channel\nhttp://example.com/stream.m3u8\n";

#[derive(Clone, Copy)]
pub enum Behavior {
    Playlist,
    Status(u16),
    Panic,
}

/// In-memory client answering by URL and tracking concurrency.
pub struct FakeClient {
    routes: HashMap<String, Behavior>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeClient {
    pub fn new(routes: impl IntoIterator<Item = (String, Behavior)>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.routes.get(url).copied().unwrap_or(Behavior::Status(404)) {
            Behavior::Playlist => Ok(PLAYLIST.as_bytes().to_vec()),
            Behavior::Status(status) => Err(AppError::HttpStatus {
                status,
                url: url.to_string(),
            }),
            Behavior::Panic => panic!("fake client blew up on {}", url),
        }
    }
}

/// Wraps another client and counts calls.
pub struct CountingClient<C> {
    pub inner: C,
    calls: AtomicUsize,
}

impl<C> CountingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for CountingClient<C> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url).await
    }
}

pub fn source(id: &str) -> SourceDefinition {
    SourceDefinition {
        id: id.to_string(),
        name: id.to_string(),
        url: format!("http://{}.test/list.m3u", id),
        filename: format!("{}.m3u", id),
    }
}

/// Minimal HTTP/1.1 responder that answers every request with one response.
pub struct TestServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<String>>,
}

impl TestServer {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(String::new()));
        let counter = Arc::clone(&hits);
        let recorder = Arc::clone(&last_request);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = Arc::clone(&counter);
                let recorder = Arc::clone(&recorder);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    *recorder.lock().unwrap() = String::from_utf8_lossy(&request).into_owned();
                    counter.fetch_add(1, Ordering::SeqCst);

                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason(status),
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            addr,
            hits,
            last_request,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> String {
        self.last_request.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Configuration document rooted at `base` with the given sources.
pub fn config_document(base: &Path, sources: Value, retry_count: u32) -> Value {
    json!({
        "sources": sources,
        "directories": { "base_dir": base },
        "download": { "retry_count": retry_count, "retry_delay": 0, "timeout": 5, "max_workers": 4 }
    })
}

pub fn write_config(dir: &Path, document: &Value) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

/// Collects formatted tracing output in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Installs a plain-text subscriber writing into this capture for the
    /// current thread until the guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
