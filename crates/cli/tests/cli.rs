//! Integration tests running the `winium` binary.

use std::process::Output;

use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::process::Command;

fn winium() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_winium"));
	cmd.env_remove("RUST_LOG");
	cmd
}

fn stdout(output: &Output) -> String {
	String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
	String::from_utf8_lossy(&output.stderr).to_string()
}

#[tokio::test]
async fn commands_lists_extension_table() {
	let output = winium().args(["commands", "--extensions"]).output().await.unwrap();
	assert!(output.status.success(), "stderr: {}", stderr(&output));

	let out = stdout(&output);
	assert_eq!(out.lines().count(), 13);
	assert!(
		out.lines()
			.any(|l| l.starts_with("scrollToComboBoxItem") && l.contains("/combobox/scroll")),
		"{out}"
	);
}

#[tokio::test]
async fn missing_driver_executable_is_reported() {
	let output = winium()
		.args(["session", "--app", "C:/app.exe", "--driver", "/nonexistent/Winium.Desktop.Driver.exe"])
		.output()
		.await
		.unwrap();
	assert_eq!(output.status.code(), Some(1));
	let err = stderr(&output);
	assert!(err.contains("does not exist"), "stderr: {err}");
}

#[tokio::test]
async fn unknown_variant_is_a_usage_error() {
	let output = winium().args(["session", "--variant", "android"]).output().await.unwrap();
	assert_eq!(output.status.code(), Some(2));
}

#[tokio::test]
async fn remote_session_prints_report_and_quits() {
	async fn new_session(Json(body): Json<Value>) -> Json<Value> {
		Json(json!({
			"sessionId": "cli-1",
			"status": 0,
			"value": body["desiredCapabilities"].clone()
		}))
	}
	async fn quit() -> Json<Value> {
		Json(json!({"sessionId": "cli-1", "status": 0, "value": null}))
	}

	let app = Router::new()
		.route("/session", post(new_session))
		.route("/session/cli-1", delete(quit));
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let url = format!("http://{}", listener.local_addr().unwrap());
	let server = tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});

	let output = winium()
		.args(["session", "--remote", &url, "--app", "C:/calc.exe", "--launch-delay", "100"])
		.output()
		.await
		.unwrap();
	server.abort();

	assert!(output.status.success(), "stderr: {}", stderr(&output));
	let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
	assert_eq!(report["sessionId"], "cli-1");
	assert_eq!(report["variant"], "desktop");
	assert_eq!(report["capabilities"], json!({"app": "C:/calc.exe", "launchDelay": 100}));
}
