//! Integration tests for the paired capture flow against a fixture server

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tiny_http::{Response, Server};

use shotpair::{CaptureConfig, Session};

/// A fixture capture endpoint that records the query string of every request.
struct FixtureService {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureService {
    /// Serve requests on an ephemeral port. `respond` maps a query string to
    /// (status, body).
    fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> (u16, Vec<u8>) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/take", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        std::thread::spawn(move || {
            // Stop once requests go quiet; canceled requests may never arrive
            while let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(2)) {
                let query = request.url().split('?').nth(1).unwrap_or("").to_string();
                let (status, body) = respond(&query);
                seen.lock().unwrap().push(query);
                let _ = request.respond(Response::from_data(body).with_status_code(status));
            }
        });

        Self { endpoint, requests }
    }

    fn recorded(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn session_for(service: &FixtureService, dir: &TempDir) -> Session {
    let config = CaptureConfig {
        endpoint: service.endpoint.clone(),
        access_key: "test-key".to_string(),
        ..Default::default()
    };
    Session::new(&config, dir.path().to_path_buf()).expect("Failed to create session")
}

#[tokio::test]
async fn valid_submission_issues_exactly_two_requests() {
    let service = FixtureService::start(|_| (200, b"imgbytes".to_vec()));
    let dir = TempDir::new().unwrap();
    let mut session = session_for(&service, &dir);

    session.submit("https://www.example.com").await;

    let recorded = service.recorded();
    assert_eq!(recorded.len(), 2, "expected one request per profile");

    let mobile = recorded
        .iter()
        .find(|q| q.contains("viewport_device=iphone_12_pro_max"))
        .expect("no mobile request");
    let desktop = recorded
        .iter()
        .find(|q| q.contains("viewport_width=1440"))
        .expect("no desktop request");

    assert!(mobile.contains("full_page=true"));
    assert!(desktop.contains("viewport_height=900"));
    for query in [mobile, desktop] {
        assert!(query.contains("access_key=test-key"));
        assert!(query.contains("url=https%3A%2F%2Fwww.example.com%2F"));
    }

    let state = session.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    let mobile_image = state.mobile.as_ref().expect("mobile image missing");
    let desktop_image = state.desktop.as_ref().expect("desktop image missing");
    assert_eq!(std::fs::read(mobile_image.path()).unwrap(), b"imgbytes");
    assert_eq!(std::fs::read(desktop_image.path()).unwrap(), b"imgbytes");
}

#[tokio::test]
async fn invalid_input_makes_no_requests() {
    let service = FixtureService::start(|_| (200, b"imgbytes".to_vec()));
    let dir = TempDir::new().unwrap();
    let mut session = session_for(&service, &dir);

    for input in ["", "not a url", "not-a-url", "ftp:/broken"] {
        session.submit(input).await;
        let state = session.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Please enter a valid URL"));
        assert!(state.mobile.is_none());
        assert!(state.desktop.is_none());
    }

    assert!(service.recorded().is_empty());
}

#[tokio::test]
async fn mobile_failure_fails_the_pair() {
    let service = FixtureService::start(|query| {
        if query.contains("viewport_device") {
            (500, b"boom".to_vec())
        } else {
            (200, b"imgbytes".to_vec())
        }
    });
    let dir = TempDir::new().unwrap();
    let mut session = session_for(&service, &dir);

    session.submit("https://example.com").await;

    let state = session.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch screenshots"));
    assert!(state.mobile.is_none());
    assert!(state.desktop.is_none());
}

#[tokio::test]
async fn resubmission_replaces_previous_images() {
    let service = FixtureService::start(|_| (200, b"imgbytes".to_vec()));
    let dir = TempDir::new().unwrap();
    let mut session = session_for(&service, &dir);

    session.submit("https://example.com").await;
    let first_mobile = session
        .state()
        .mobile
        .as_ref()
        .expect("first capture missing")
        .path()
        .to_path_buf();

    session.submit("https://example.org").await;

    // Previous transient images are released when replaced
    assert!(!first_mobile.exists());
    let state = session.state();
    assert!(state.mobile.as_ref().unwrap().path().exists());
    assert!(state.desktop.as_ref().unwrap().path().exists());
    assert_eq!(service.recorded().len(), 4);
}

#[tokio::test]
async fn fetch_failure_after_success_keeps_stale_images() {
    let service = FixtureService::start(|query| {
        if query.contains("example.org") {
            (503, Vec::new())
        } else {
            (200, b"imgbytes".to_vec())
        }
    });
    let dir = TempDir::new().unwrap();
    let mut session = session_for(&service, &dir);

    session.submit("https://example.com").await;
    assert!(session.state().error.is_none());

    session.submit("https://example.org").await;

    let state = session.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch screenshots"));
    // The pair from the earlier successful submission is left as it was
    assert!(state.mobile.as_ref().unwrap().path().exists());
    assert!(state.desktop.as_ref().unwrap().path().exists());
}
