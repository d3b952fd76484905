#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use todo_core::config::Settings;
use tokio::net::TcpListener;

pub fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todoapp-{nanos}-{file_name}"))
}

pub fn write_store(path: &Path, tasks: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();
}

pub fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Starts the API on an ephemeral port and returns its `/api/tasks` URL.
pub async fn spawn_server(store_path: &Path) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let settings = Settings {
        host: addr.ip().to_string(),
        port: addr.port(),
        store_path: store_path.to_path_buf(),
    };

    tokio::spawn(async move {
        todo_server::api::serve_with_listener(listener, settings, std::future::pending())
            .await
            .unwrap();
    });

    format!("http://{addr}/api/tasks")
}
