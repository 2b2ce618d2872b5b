//! Scripted in-process driver for facade tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

pub const SESSION: &str = "s-1";

#[derive(Default)]
struct Script {
	routes: HashMap<String, Value>,
	seen: Mutex<Vec<(String, Value)>>,
}

/// Replies to `"METHOD /path"` with the scripted envelope, and with a bare
/// success envelope for anything unscripted. `POST /session` defaults to a new
/// session with id [`SESSION`].
pub struct ScriptedDriver {
	url: Url,
	script: Arc<Script>,
	task: tokio::task::JoinHandle<()>,
}

impl ScriptedDriver {
	pub async fn start(routes: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
		let mut script = Script::default();
		script.routes.insert(
			"POST /session".into(),
			json!({"sessionId": SESSION, "status": 0, "value": {"app": "C:/app.exe", "platform": "WINDOWS"}}),
		);
		for (route, envelope) in routes {
			script.routes.insert(route.to_string(), envelope);
		}
		let script = Arc::new(script);

		let app = Router::new().fallback(reply).with_state(script.clone());
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
		let task = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		Self { url, script, task }
	}

	/// A driver with only the default session route.
	pub async fn plain() -> Self {
		Self::start(Vec::<(&'static str, Value)>::new()).await
	}

	pub fn url(&self) -> Url {
		self.url.clone()
	}

	/// `("METHOD /path", body)` for every request received.
	pub fn seen(&self) -> Vec<(String, Value)> {
		self.script.seen.lock().unwrap().clone()
	}

	pub fn last(&self) -> (String, Value) {
		self.seen().pop().unwrap()
	}
}

impl Drop for ScriptedDriver {
	fn drop(&mut self) {
		self.task.abort();
	}
}

/// Success envelope around `value`.
pub fn ok(value: Value) -> Value {
	json!({"sessionId": SESSION, "status": 0, "value": value})
}

/// JSON wire element reference.
pub fn element(id: &str) -> Value {
	json!({"ELEMENT": id})
}

async fn reply(State(script): State<Arc<Script>>, method: Method, uri: Uri, body: String) -> Json<Value> {
	let route = format!("{} {}", method, uri.path());
	let body = serde_json::from_str(&body).unwrap_or(Value::Null);
	script.seen.lock().unwrap().push((route.clone(), body));
	Json(script.routes.get(&route).cloned().unwrap_or_else(|| ok(Value::Null)))
}
