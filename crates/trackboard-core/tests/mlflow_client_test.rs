//! MlflowClient against a minimal local HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use trackboard_core::walker::walk_artifacts;
use trackboard_core::{DashConfig, DashError, MlflowClient, TrackingService};

/// What the stub answers for one request target.
enum Reply {
    Status(u16, &'static str),
    Hang,
}

type Handler = fn(&str) -> Reply;

struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(vec![]));
        let log = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let log = log.clone();
                thread::spawn(move || handle(stream, handler, log));
            }
        });
        Self { base, requests }
    }

    fn client(&self, timeout: Duration) -> MlflowClient {
        let config = DashConfig::new(&self.base)
            .unwrap()
            .with_request_timeout(timeout);
        MlflowClient::new(&config).unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(stream: TcpStream, handler: Handler, log: Arc<Mutex<Vec<String>>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut content_length = 0;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default().to_string();
    log.lock().unwrap().push(format!("{} {}", method, target));

    match handler(&target) {
        Reply::Hang => thread::sleep(Duration::from_secs(5)),
        Reply::Status(code, body) => {
            let reason = match code {
                200 => "OK",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                code,
                reason,
                body.len(),
                body
            );
            let mut stream = stream;
            let _ = stream.write_all(response.as_bytes());
        }
    }
}

fn assert_unavailable<T: std::fmt::Debug>(result: trackboard_core::Result<T>) -> String {
    match result {
        Err(err @ DashError::TrackingServiceUnavailable(_)) => err.to_string(),
        other => panic!("expected TrackingServiceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_server_error_is_unavailable() {
    let server = StubServer::start(|_| Reply::Status(500, "boom"));
    let client = server.client(Duration::from_secs(5));

    let message = assert_unavailable(client.list_experiments());
    assert!(message.contains("api/2.0/mlflow/experiments/search"), "{message}");
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("boom"), "{message}");

    assert_unavailable(client.probe());
    assert_unavailable(client.list_registered_models());
}

#[test]
fn test_request_timeout_is_unavailable() {
    let server = StubServer::start(|_| Reply::Hang);
    let client = server.client(Duration::from_millis(500));

    assert_unavailable(client.list_runs("1"));
    assert_eq!(server.requests(), vec!["POST /api/2.0/mlflow/runs/search"]);
}

#[test]
fn test_walk_and_fetch_over_http() {
    let server = StubServer::start(|target| match target {
        "/api/2.0/mlflow/artifacts/list?run_id=r1" => Reply::Status(
            200,
            r#"{"root_uri": "s3://b/r1", "files": [
                {"path": "a.csv", "is_dir": false, "file_size": "8"},
                {"path": "sub", "is_dir": true}
            ]}"#,
        ),
        "/api/2.0/mlflow/artifacts/list?run_id=r1&path=sub" => Reply::Status(
            200,
            r#"{"files": [{"path": "sub/b.png", "is_dir": false}]}"#,
        ),
        "/get-artifact?path=a.csv&run_uuid=r1" => Reply::Status(200, "x,y\n1,2\n"),
        _ => Reply::Status(500, "unexpected request"),
    });
    let client = server.client(Duration::from_secs(5));

    let files = walk_artifacts(&client, "r1", "", 32).unwrap();
    assert_eq!(files, vec!["a.csv", "sub/b.png"]);

    let local = client.fetch_artifact("r1", "a.csv").unwrap();
    assert_eq!(local.run_id(), "r1");
    assert_eq!(local.artifact_path(), "a.csv");
    assert_eq!(local.read_bytes().unwrap(), b"x,y\n1,2\n");

    assert_eq!(
        server.requests(),
        vec![
            "GET /api/2.0/mlflow/artifacts/list?run_id=r1",
            "GET /api/2.0/mlflow/artifacts/list?run_id=r1&path=sub",
            "GET /get-artifact?path=a.csv&run_uuid=r1",
        ]
    );
}

#[test]
fn test_missing_artifact_is_unavailable() {
    let server = StubServer::start(|_| Reply::Status(404, "RESOURCE_DOES_NOT_EXIST"));
    let client = server.client(Duration::from_secs(5));

    let message = assert_unavailable(client.fetch_artifact("r1", "gone.txt"));
    assert!(message.contains("get-artifact"), "{message}");
}
