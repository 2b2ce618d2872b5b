//! Element lookup strategies.

use serde_json::{Map, Value};

/// How to locate an element.
///
/// Winium maps `Id` to the UI Automation `AutomationId` property and `Name`
/// to the `Name` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum By {
	Id(String),
	Name(String),
	ClassName(String),
	XPath(String),
	TagName(String),
}

impl By {
	pub fn id(value: impl Into<String>) -> Self {
		Self::Id(value.into())
	}

	pub fn name(value: impl Into<String>) -> Self {
		Self::Name(value.into())
	}

	pub fn class_name(value: impl Into<String>) -> Self {
		Self::ClassName(value.into())
	}

	pub fn xpath(value: impl Into<String>) -> Self {
		Self::XPath(value.into())
	}

	pub fn tag_name(value: impl Into<String>) -> Self {
		Self::TagName(value.into())
	}

	/// JSON wire `using` value.
	pub fn strategy(&self) -> &'static str {
		match self {
			Self::Id(_) => "id",
			Self::Name(_) => "name",
			Self::ClassName(_) => "class name",
			Self::XPath(_) => "xpath",
			Self::TagName(_) => "tag name",
		}
	}

	pub fn value(&self) -> &str {
		match self {
			Self::Id(v) | Self::Name(v) | Self::ClassName(v) | Self::XPath(v) | Self::TagName(v) => v,
		}
	}

	/// The `{"using": ..., "value": ...}` lookup body.
	pub(crate) fn to_params(&self) -> Map<String, Value> {
		let mut params = Map::new();
		params.insert("using".into(), self.strategy().into());
		params.insert("value".into(), self.value().into());
		params
	}
}

impl std::fmt::Display for By {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "By.{}: {}", self.strategy(), self.value())
	}
}
