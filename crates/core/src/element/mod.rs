//! [`Element`] handle for a UI element found in a session.

mod controls;

use serde::Deserialize;
use serde_json::Value;
use winium_protocol::{Command, names};
use winium_runtime::{Error, Result};

use crate::By;
use crate::session::Session;

/// JSON wire protocol element reference key.
const ELEMENT_KEY: &str = "ELEMENT";
/// W3C element reference key, accepted from newer drivers.
const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Top-left corner of an element, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Point {
	pub x: i64,
	pub y: i64,
}

/// Element dimensions, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Size {
	pub width: i64,
	pub height: i64,
}

/// A UI element within a session.
///
/// Holds the remote element id; every method is a round trip to the driver.
/// The data grid, list box, menu and combo box helpers are only meaningful on
/// elements of the matching control type.
#[derive(Clone)]
pub struct Element {
	session: Session,
	id: String,
}

impl std::fmt::Debug for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Element")
			.field("session", &self.session.id())
			.field("id", &self.id)
			.finish()
	}
}

impl Element {
	pub(crate) fn new(session: Session, id: String) -> Self {
		Self { session, id }
	}

	/// Builds an element from a reference object in a response value.
	pub(crate) fn from_value(session: &Session, value: &Value) -> Result<Self> {
		let id = element_id(value)
			.ok_or_else(|| Error::Protocol(format!("expected an element reference, got {value}")))?;
		Ok(Self::new(session.clone(), id.to_string()))
	}

	/// Builds elements from an array of references.
	pub(crate) fn from_values(session: &Session, value: &Value) -> Result<Vec<Self>> {
		let items = value
			.as_array()
			.ok_or_else(|| Error::Protocol(format!("expected an array of elements, got {value}")))?;
		items.iter().map(|item| Self::from_value(session, item)).collect()
	}

	/// Remote element id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// A command addressed to this element.
	fn command(&self, name: &str) -> Command {
		Command::new(name).param("id", self.id.as_str())
	}

	pub async fn find_element(&self, by: By) -> Result<Element> {
		let mut command = self.command(names::FIND_CHILD_ELEMENT);
		command.parameters.extend(by.to_params());
		let value = self.session.send(command).await?;
		Self::from_value(&self.session, &value)
	}

	pub async fn find_elements(&self, by: By) -> Result<Vec<Element>> {
		let mut command = self.command(names::FIND_CHILD_ELEMENTS);
		command.parameters.extend(by.to_params());
		let value = self.session.send(command).await?;
		Self::from_values(&self.session, &value)
	}

	pub async fn click(&self) -> Result<()> {
		self.session.send_no_result(self.command(names::CLICK_ELEMENT)).await
	}

	pub async fn clear(&self) -> Result<()> {
		self.session.send_no_result(self.command(names::CLEAR_ELEMENT)).await
	}

	/// Types `text` into the element.
	pub async fn send_keys(&self, text: &str) -> Result<()> {
		let command = self
			.command(names::SEND_KEYS_TO_ELEMENT)
			.param("value", Value::Array(vec![Value::from(text)]));
		self.session.send_no_result(command).await
	}

	pub async fn text(&self) -> Result<String> {
		self.session.send_as(self.command(names::GET_ELEMENT_TEXT)).await
	}

	/// Value of the UI Automation property `name`, if the element has one.
	pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
		let command = self.command(names::GET_ELEMENT_ATTRIBUTE).param("name", name);
		let value = self.session.send(command).await?;
		Ok(match value {
			Value::Null => None,
			Value::String(s) => Some(s),
			other => Some(other.to_string()),
		})
	}

	/// Control type name, e.g. `ControlType.Button`.
	pub async fn tag_name(&self) -> Result<String> {
		self.session.send_as(self.command(names::GET_ELEMENT_TAG_NAME)).await
	}

	pub async fn is_displayed(&self) -> Result<bool> {
		self.session.send_as(self.command(names::IS_ELEMENT_DISPLAYED)).await
	}

	pub async fn is_enabled(&self) -> Result<bool> {
		self.session.send_as(self.command(names::IS_ELEMENT_ENABLED)).await
	}

	pub async fn is_selected(&self) -> Result<bool> {
		self.session.send_as(self.command(names::IS_ELEMENT_SELECTED)).await
	}

	pub async fn location(&self) -> Result<Point> {
		self.session.send_as(self.command(names::GET_ELEMENT_LOCATION)).await
	}

	pub async fn size(&self) -> Result<Size> {
		self.session.send_as(self.command(names::GET_ELEMENT_SIZE)).await
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && self.session.id() == other.session.id()
	}
}

fn element_id(value: &Value) -> Option<&str> {
	value
		.get(ELEMENT_KEY)
		.or_else(|| value.get(W3C_ELEMENT_KEY))
		.and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use winium_protocol::DesktopOptions;

	use super::*;
	use crate::WiniumDriver;
	use crate::testing::{ScriptedDriver, element, ok};

	async fn driver(stub: &ScriptedDriver) -> WiniumDriver {
		WiniumDriver::remote(stub.url(), DesktopOptions::new().application_path("C:/app.exe"))
			.await
			.unwrap()
	}

	#[test]
	fn element_id_accepts_both_reference_keys() {
		assert_eq!(element_id(&json!({"ELEMENT": "a"})), Some("a"));
		assert_eq!(element_id(&json!({"element-6066-11e4-a52e-4f735466cecf": "b"})), Some("b"));
		assert_eq!(element_id(&json!("c")), None);
	}

	#[tokio::test]
	async fn child_lookup_sends_strategy_and_parent_id() {
		let stub = ScriptedDriver::start([
			("POST /session/s-1/element", ok(element("parent"))),
			("POST /session/s-1/element/parent/elements", ok(json!([element("c1"), element("c2")]))),
		])
		.await;
		let driver = driver(&stub).await;

		let parent = driver.find_element(By::id("Grid")).await.unwrap();
		let children = parent.find_elements(By::class_name("Row")).await.unwrap();

		assert_eq!(children.iter().map(Element::id).collect::<Vec<_>>(), ["c1", "c2"]);
		assert_eq!(
			stub.last(),
			(
				"POST /session/s-1/element/parent/elements".to_string(),
				json!({"using": "class name", "value": "Row"})
			)
		);
	}

	#[tokio::test]
	async fn reads_text_attribute_and_state() {
		let stub = ScriptedDriver::start([
			("GET /session/s-1/element/e1/text", ok(json!("Hello"))),
			("GET /session/s-1/element/e1/attribute/AutomationId", ok(json!("greeting"))),
			("GET /session/s-1/element/e1/attribute/Missing", ok(Value::Null)),
			("GET /session/s-1/element/e1/enabled", ok(json!(true))),
			("GET /session/s-1/element/e1/size", ok(json!({"width": 80, "height": 20}))),
		])
		.await;
		let driver = driver(&stub).await;
		let el = Element::new(driver.session().clone(), "e1".into());

		assert_eq!(el.text().await.unwrap(), "Hello");
		assert_eq!(el.attribute("AutomationId").await.unwrap().as_deref(), Some("greeting"));
		assert_eq!(el.attribute("Missing").await.unwrap(), None);
		assert!(el.is_enabled().await.unwrap());
		assert_eq!(el.size().await.unwrap(), Size { width: 80, height: 20 });
	}

	#[tokio::test]
	async fn send_keys_wraps_text_in_array() {
		let stub = ScriptedDriver::plain().await;
		let driver = driver(&stub).await;
		let el = Element::new(driver.session().clone(), "box".into());

		el.send_keys("abc").await.unwrap();
		assert_eq!(
			stub.last(),
			("POST /session/s-1/element/box/value".to_string(), json!({"value": ["abc"]}))
		);
	}

	#[tokio::test]
	async fn non_reference_value_is_a_protocol_error() {
		let stub = ScriptedDriver::start([("POST /session/s-1/element", ok(json!("oops")))]).await;
		let driver = driver(&stub).await;

		let err = driver.find_element(By::name("OK")).await.unwrap_err();
		assert!(matches!(err, Error::Protocol(_)), "{err:?}");
	}
}
