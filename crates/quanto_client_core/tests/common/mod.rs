#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

pub const LATEST_JSON: &str = r#"{
    "disclaimer": "Usage subject to terms: https://openexchangerates.org/terms",
    "license": "https://openexchangerates.org/license",
    "timestamp": 1760868000,
    "base": "USD",
    "rates": {"USD": 1, "EUR": 0.8571, "GBP": 0.7449, "JPY": 150.62, "CHF": 0.7932}
}"#;

/// Fresh storage directory; keep the guard alive for the whole test.
pub fn storage_dir() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().to_str().expect("utf-8 path").to_string();
    (dir, path)
}

/// One-shot HTTP server answering every request with `status` and `body`.
/// Returns the base URL to hand to `set_rates_config`.
pub fn serve(status: u16, body: &'static str, requests: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{}/api", addr)
}

pub fn view() -> serde_json::Value {
    serde_json::from_str(&quanto_client_core::get_converter_view().expect("view")).expect("parse view")
}

pub fn press(labels: &[&str]) {
    for label in labels {
        quanto_client_core::press_key(label.to_string());
    }
}

/// Default session. Storage is never opened in tests that use this.
pub fn fresh_session() {
    quanto_client_core::reset_settings().expect("reset_settings");
}
