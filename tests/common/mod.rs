//! Shared test helpers: recording stand-ins for the model and the index,
//! image fixtures, and a one-shot HTTP responder.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use image_register::domain::entities::catalog_record::CatalogRecord;
use image_register::domain::entities::query_match::QueryMatch;
use image_register::domain::error::DomainError;
use image_register::domain::ports::embedding_port::Embedder;
use image_register::domain::ports::feature_extractor::FeatureExtractor;
use image_register::domain::ports::image_transform::ImageTransform;
use image_register::domain::ports::vector_index::VectorIndex;
use image_register::domain::values::embedding_vector::EmbeddingVector;
use image_register::domain::values::metadata::Metadata;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn metadata(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

pub fn record(path: &str, name: &str, meta: serde_json::Value) -> CatalogRecord {
    CatalogRecord::new(path, name, metadata(meta))
}

// ---------------------------------------------------------------------------
// Embedder stand-in
// ---------------------------------------------------------------------------

/// Returns a fixed vector per path (or a default), fails for configured paths,
/// and records every call.
#[derive(Default)]
pub struct StubEmbedder {
    pub calls: Mutex<Vec<PathBuf>>,
    vectors: HashMap<PathBuf, Vec<f32>>,
    failing: HashSet<PathBuf>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, path: &str, raw: Vec<f32>) -> Self {
        self.vectors.insert(PathBuf::from(path), raw);
        self
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    pub fn default_vector() -> EmbeddingVector {
        EmbeddingVector::normalized(vec![0.1, 0.2, 0.3]).unwrap()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn vectorize(&self, image_path: &Path) -> Result<EmbeddingVector, DomainError> {
        self.calls.lock().unwrap().push(image_path.to_path_buf());
        if self.failing.contains(image_path) {
            return Err(DomainError::Decode(format!(
                "{}: No such file or directory",
                image_path.display()
            )));
        }
        match self.vectors.get(image_path) {
            Some(raw) => EmbeddingVector::normalized(raw.clone()),
            None => Ok(Self::default_vector()),
        }
    }

    fn dimension(&self) -> Option<usize> {
        Some(3)
    }
}

// ---------------------------------------------------------------------------
// Index stand-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Upsert {
    pub id: String,
    pub vector: EmbeddingVector,
    pub metadata: Metadata,
}

#[derive(Default)]
pub struct RecordingIndex {
    pub upserts: Mutex<Vec<Upsert>>,
    failing_ids: HashSet<String>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    pub fn upserted_ids(&self) -> Vec<String> {
        self.upserts.lock().unwrap().iter().map(|u| u.id.clone()).collect()
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn upsert(
        &self,
        id: &str,
        vector: &EmbeddingVector,
        metadata: &Metadata,
    ) -> Result<(), DomainError> {
        if self.failing_ids.contains(id) {
            return Err(DomainError::RemoteService("503 Service Unavailable".to_string()));
        }
        self.upserts.lock().unwrap().push(Upsert {
            id: id.to_string(),
            vector: vector.clone(),
            metadata: metadata.clone(),
        });
        Ok(())
    }

    async fn query(
        &self,
        _vector: &EmbeddingVector,
        _top_k: usize,
    ) -> Result<Vec<QueryMatch>, DomainError> {
        Ok(vec![])
    }

    fn namespace(&self) -> &str {
        "ns1"
    }

    fn dimension(&self) -> Option<usize> {
        None
    }
}

// ---------------------------------------------------------------------------
// Feature extractor and transform stand-ins
// ---------------------------------------------------------------------------

/// Features derived from the decoded pixels: mean R, G, B and the size.
/// Records the dimensions of every image it sees.
#[derive(Default)]
pub struct PixelStatsExtractor {
    pub seen: Mutex<Vec<(u32, u32)>>,
}

impl FeatureExtractor for PixelStatsExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Vec<f32>, DomainError> {
        self.seen.lock().unwrap().push(image.dimensions());
        let rgb = image.to_rgb8();
        let n = (rgb.width() * rgb.height()).max(1) as f32;
        let mut sums = [0.0_f32; 3];
        for px in rgb.pixels() {
            for c in 0..3 {
                sums[c] += px[c] as f32;
            }
        }
        Ok(vec![
            sums[0] / n + 1.0,
            sums[1] / n + 1.0,
            sums[2] / n + 1.0,
            rgb.width() as f32,
            rgb.height() as f32,
        ])
    }

    fn dimension(&self) -> Option<usize> {
        Some(5)
    }

    fn name(&self) -> &str {
        "pixel-stats"
    }
}

/// Always yields the same raw vector.
pub struct ConstantExtractor(pub Vec<f32>);

impl FeatureExtractor for ConstantExtractor {
    fn extract(&self, _image: &DynamicImage) -> Result<Vec<f32>, DomainError> {
        Ok(self.0.clone())
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Appends its name to a shared log, then crops the image by one pixel on
/// each axis so its effect is observable downstream.
pub struct ShrinkTransform {
    pub name: String,
    pub log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ImageTransform for ShrinkTransform {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, image: DynamicImage) -> Result<DynamicImage, DomainError> {
        self.log.lock().unwrap().push(self.name.clone());
        let (w, h) = image.dimensions();
        Ok(image.crop_imm(0, 0, w.saturating_sub(1).max(1), h.saturating_sub(1).max(1)))
    }
}

pub struct FailingTransform;

#[async_trait]
impl ImageTransform for FailingTransform {
    fn name(&self) -> &str {
        "failing"
    }

    async fn apply(&self, _image: DynamicImage) -> Result<DynamicImage, DomainError> {
        Err(DomainError::Transform("segmentation service unavailable".to_string()))
    }
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(&path)
        .unwrap();
    path
}

// ---------------------------------------------------------------------------
// One-shot HTTP responder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub raw_body: Vec<u8>,
}

impl CapturedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// One canned reply: status, content type, and raw body bytes.
pub struct FakeResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl FakeResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.into().into_bytes(),
        }
    }

    pub fn bytes(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }
}

pub struct FakeHttp {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeHttp {
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve one canned `(status, json body)` per incoming connection, in order.
/// `make` receives the server's base URL so responses can point back at it.
pub async fn spawn_fake_http<F>(make: F) -> FakeHttp
where
    F: FnOnce(&str) -> Vec<(u16, String)>,
{
    spawn_fake_http_with(|base| {
        make(base)
            .into_iter()
            .map(|(status, body)| FakeResponse::json(status, body))
            .collect()
    })
    .await
}

/// Like [`spawn_fake_http`], with arbitrary content types and binary bodies.
pub async fn spawn_fake_http_with<F>(make: F) -> FakeHttp
where
    F: FnOnce(&str) -> Vec<FakeResponse>,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let responses = make(&base_url);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = requests.clone();

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut stream).await;
            captured.lock().unwrap().push(request);
            let head = format!(
                "HTTP/1.1 {} Fake\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                response.status,
                response.content_type,
                response.body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&response.body).await;
            let _ = stream.shutdown().await;
        }
    });

    FakeHttp { base_url, requests }
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let raw_body = buf[header_end..body_end].to_vec();
    let body = String::from_utf8_lossy(&raw_body).to_string();

    CapturedRequest {
        method,
        path,
        headers,
        body,
        raw_body,
    }
}
