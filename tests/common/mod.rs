use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use neuralens::client::PredictionClient;
use neuralens::config::Config;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{Match, MockServer, Request};

#[allow(dead_code)]
pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 20, 20]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("failed to encode png");
    buffer.into_inner()
}

#[allow(dead_code)]
pub fn encode_noise_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    rng.fill_bytes(&mut pixels);
    let img = RgbImage::from_raw(width, height, pixels).expect("pixel buffer size");
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
        .expect("failed to encode jpeg");
    bytes
}

#[allow(dead_code)]
pub fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Client pointed at `<server>/api/predict` with no rate limiting
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> PredictionClient {
    client_with_interval(server, Duration::ZERO)
}

#[allow(dead_code)]
pub fn client_with_interval(server: &MockServer, min_interval: Duration) -> PredictionClient {
    let endpoint = format!("{}/api/predict", server.uri())
        .parse()
        .expect("mock server uri");
    PredictionClient::new(endpoint, Duration::from_secs(5), min_interval)
}

/// Default configuration aimed at the mock server, without rate limiting
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.host = server.uri();
    config.api.min_request_interval_ms = 0;
    config.history.enabled = false;
    config
}

/// Matches a multipart body carrying one `file` part with the given name and type
#[allow(dead_code)]
pub struct MultipartFile {
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

impl Match for MultipartFile {
    fn matches(&self, request: &Request) -> bool {
        let body = String::from_utf8_lossy(&request.body);
        body.contains(&format!(
            "name=\"file\"; filename=\"{}\"",
            self.file_name
        )) && body.contains(&format!("Content-Type: {}", self.mime_type))
            && body.matches("Content-Disposition").count() == 1
    }
}
