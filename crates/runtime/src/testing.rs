//! Test doubles: an in-process HTTP stub standing in for a driver server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use serde_json::{Value, json};

/// One request seen by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
	pub method: String,
	pub path: String,
	pub body: Option<Value>,
}

#[derive(Default)]
struct StubState {
	replies: Mutex<HashMap<(String, String), (u16, String)>>,
	requests: Mutex<Vec<Recorded>>,
}

/// Answers `GET /status` with 200 and every other request with a success
/// envelope, unless a canned reply was registered for the method and path.
pub struct StubDriver {
	port: u16,
	state: Arc<StubState>,
	task: tokio::task::JoinHandle<()>,
}

impl StubDriver {
	pub async fn spawn() -> Self {
		let state = Arc::new(StubState::default());
		let app = Router::new().fallback(handle).with_state(state.clone());
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let port = listener.local_addr().unwrap().port();
		let task = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		Self { port, state, task }
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn url(&self) -> url::Url {
		url::Url::parse(&format!("http://127.0.0.1:{}", self.port)).unwrap()
	}

	/// Registers a canned reply for `method path`.
	pub fn reply(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
		self.state
			.replies
			.lock()
			.unwrap()
			.insert((method.to_string(), path.to_string()), (status, body.into()));
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.state.requests.lock().unwrap().clone()
	}

	/// Requests other than status and shutdown probes.
	pub fn commands(&self) -> Vec<Recorded> {
		self.requests()
			.into_iter()
			.filter(|r| r.path != "/status" && r.path != "/shutdown")
			.collect()
	}
}

impl Drop for StubDriver {
	fn drop(&mut self) {
		self.task.abort();
	}
}

async fn handle(State(state): State<Arc<StubState>>, method: Method, uri: Uri, body: String) -> impl IntoResponse {
	let path = uri.path().to_string();
	state.requests.lock().unwrap().push(Recorded {
		method: method.to_string(),
		path: path.clone(),
		body: serde_json::from_str(&body).ok(),
	});

	let canned = state
		.replies
		.lock()
		.unwrap()
		.get(&(method.to_string(), path.clone()))
		.cloned();
	let (status, body) = canned.unwrap_or_else(|| {
		let value = if path == "/status" {
			json!({"status": 0, "value": {"build": {"version": "stub"}}})
		} else {
			json!({"sessionId": "stub-session", "status": 0, "value": null})
		};
		(200, value.to_string())
	});

	(
		StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
		[(header::CONTENT_TYPE, "application/json")],
		body,
	)
}

/// Whether a process with `pid` still exists.
#[cfg(unix)]
pub fn pid_alive(pid: u32) -> bool {
	std::process::Command::new("kill")
		.args(["-0", &pid.to_string()])
		.stdout(std::process::Stdio::null())
		.stderr(std::process::Stdio::null())
		.status()
		.map(|s| s.success())
		.unwrap_or(false)
}
