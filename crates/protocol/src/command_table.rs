//! Command name to HTTP method + URL template mapping.
//!
//! The table is the union of the baseline JSON wire protocol commands and the
//! Winium vendor extensions (data grids, list boxes, menus and combo boxes).
//! It is built once per process and only read afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Command names understood by the table.
pub mod names {
	pub const STATUS: &str = "status";
	pub const NEW_SESSION: &str = "newSession";
	pub const GET_CAPABILITIES: &str = "getCapabilities";
	pub const QUIT: &str = "quit";
	pub const FIND_ELEMENT: &str = "findElement";
	pub const FIND_ELEMENTS: &str = "findElements";
	pub const FIND_CHILD_ELEMENT: &str = "findChildElement";
	pub const FIND_CHILD_ELEMENTS: &str = "findChildElements";
	pub const CLICK_ELEMENT: &str = "clickElement";
	pub const CLEAR_ELEMENT: &str = "clearElement";
	pub const SEND_KEYS_TO_ELEMENT: &str = "sendKeysToElement";
	pub const SEND_KEYS_TO_ACTIVE_ELEMENT: &str = "sendKeysToActiveElement";
	pub const GET_ELEMENT_TEXT: &str = "getElementText";
	pub const GET_ELEMENT_ATTRIBUTE: &str = "getElementAttribute";
	pub const GET_ELEMENT_TAG_NAME: &str = "getElementTagName";
	pub const IS_ELEMENT_SELECTED: &str = "isElementSelected";
	pub const IS_ELEMENT_ENABLED: &str = "isElementEnabled";
	pub const IS_ELEMENT_DISPLAYED: &str = "isElementDisplayed";
	pub const GET_ELEMENT_LOCATION: &str = "getElementLocation";
	pub const GET_ELEMENT_SIZE: &str = "getElementSize";
	pub const GET_CURRENT_WINDOW_HANDLE: &str = "getCurrentWindowHandle";
	pub const GET_WINDOW_HANDLES: &str = "getWindowHandles";
	pub const SWITCH_TO_WINDOW: &str = "switchToWindow";
	pub const CLOSE: &str = "close";
	pub const GET_TITLE: &str = "getTitle";
	pub const GET_PAGE_SOURCE: &str = "getPageSource";
	pub const SCREENSHOT: &str = "screenshot";

	pub const FIND_DATA_GRID_CELL: &str = "findDataGridCell";
	pub const GET_DATA_GRID_COLUMN_COUNT: &str = "getDataGridColumnCount";
	pub const GET_DATA_GRID_ROW_COUNT: &str = "getDataGridRowCount";
	pub const SCROLL_TO_DATA_GRID_CELL: &str = "scrollToDataGridCell";
	pub const SELECT_DATA_GRID_CELL: &str = "selectDataGridCell";
	pub const SCROLL_TO_LIST_BOX_ITEM: &str = "scrollToListBoxItem";
	pub const FIND_MENU_ITEM: &str = "findMenuItem";
	pub const SELECT_MENU_ITEM: &str = "selectMenuItem";
	pub const IS_COMBO_BOX_EXPANDED: &str = "isComboBoxExpanded";
	pub const EXPAND_COMBO_BOX: &str = "expandComboBox";
	pub const COLLAPSE_COMBO_BOX: &str = "collapseComboBox";
	pub const FIND_COMBO_BOX_SELECTED_ITEM: &str = "findComboBoxSelectedItem";
	pub const SCROLL_TO_COMBO_BOX_ITEM: &str = "scrollToComboBoxItem";
}

use names::*;

const BASELINE_COMMANDS: &[(&str, HttpMethod, &str)] = &[
	(STATUS, HttpMethod::Get, "/status"),
	(NEW_SESSION, HttpMethod::Post, "/session"),
	(GET_CAPABILITIES, HttpMethod::Get, "/session/:sessionId"),
	(QUIT, HttpMethod::Delete, "/session/:sessionId"),
	(FIND_ELEMENT, HttpMethod::Post, "/session/:sessionId/element"),
	(FIND_ELEMENTS, HttpMethod::Post, "/session/:sessionId/elements"),
	(FIND_CHILD_ELEMENT, HttpMethod::Post, "/session/:sessionId/element/:id/element"),
	(FIND_CHILD_ELEMENTS, HttpMethod::Post, "/session/:sessionId/element/:id/elements"),
	(CLICK_ELEMENT, HttpMethod::Post, "/session/:sessionId/element/:id/click"),
	(CLEAR_ELEMENT, HttpMethod::Post, "/session/:sessionId/element/:id/clear"),
	(SEND_KEYS_TO_ELEMENT, HttpMethod::Post, "/session/:sessionId/element/:id/value"),
	(SEND_KEYS_TO_ACTIVE_ELEMENT, HttpMethod::Post, "/session/:sessionId/keys"),
	(GET_ELEMENT_TEXT, HttpMethod::Get, "/session/:sessionId/element/:id/text"),
	(GET_ELEMENT_ATTRIBUTE, HttpMethod::Get, "/session/:sessionId/element/:id/attribute/:name"),
	(GET_ELEMENT_TAG_NAME, HttpMethod::Get, "/session/:sessionId/element/:id/name"),
	(IS_ELEMENT_SELECTED, HttpMethod::Get, "/session/:sessionId/element/:id/selected"),
	(IS_ELEMENT_ENABLED, HttpMethod::Get, "/session/:sessionId/element/:id/enabled"),
	(IS_ELEMENT_DISPLAYED, HttpMethod::Get, "/session/:sessionId/element/:id/displayed"),
	(GET_ELEMENT_LOCATION, HttpMethod::Get, "/session/:sessionId/element/:id/location"),
	(GET_ELEMENT_SIZE, HttpMethod::Get, "/session/:sessionId/element/:id/size"),
	(GET_CURRENT_WINDOW_HANDLE, HttpMethod::Get, "/session/:sessionId/window_handle"),
	(GET_WINDOW_HANDLES, HttpMethod::Get, "/session/:sessionId/window_handles"),
	(SWITCH_TO_WINDOW, HttpMethod::Post, "/session/:sessionId/window"),
	(CLOSE, HttpMethod::Delete, "/session/:sessionId/window"),
	(GET_TITLE, HttpMethod::Get, "/session/:sessionId/title"),
	(GET_PAGE_SOURCE, HttpMethod::Get, "/session/:sessionId/source"),
	(SCREENSHOT, HttpMethod::Get, "/session/:sessionId/screenshot"),
];

const WINIUM_COMMANDS: &[(&str, HttpMethod, &str)] = &[
	(FIND_DATA_GRID_CELL, HttpMethod::Post, "/session/:sessionId/element/:id/datagrid/cell/:row/:column"),
	(GET_DATA_GRID_COLUMN_COUNT, HttpMethod::Post, "/session/:sessionId/element/:id/datagrid/column/count"),
	(GET_DATA_GRID_ROW_COUNT, HttpMethod::Post, "/session/:sessionId/element/:id/datagrid/row/count"),
	(SCROLL_TO_DATA_GRID_CELL, HttpMethod::Post, "/session/:sessionId/element/:id/datagrid/scroll/:row/:column"),
	(SELECT_DATA_GRID_CELL, HttpMethod::Post, "/session/:sessionId/element/:id/datagrid/select/:row/:column"),
	(SCROLL_TO_LIST_BOX_ITEM, HttpMethod::Post, "/session/:sessionId/element/:id/listbox/scroll"),
	(FIND_MENU_ITEM, HttpMethod::Post, "/session/:sessionId/element/:id/menu/item/:path"),
	(SELECT_MENU_ITEM, HttpMethod::Post, "/session/:sessionId/element/:id/menu/select/:path"),
	(IS_COMBO_BOX_EXPANDED, HttpMethod::Post, "/session/:sessionId/element/:id/combobox/expanded"),
	(EXPAND_COMBO_BOX, HttpMethod::Post, "/session/:sessionId/element/:id/combobox/expand"),
	(COLLAPSE_COMBO_BOX, HttpMethod::Post, "/session/:sessionId/element/:id/combobox/collapse"),
	(FIND_COMBO_BOX_SELECTED_ITEM, HttpMethod::Post, "/session/:sessionId/element/:id/combobox/items/selected"),
	(SCROLL_TO_COMBO_BOX_ITEM, HttpMethod::Post, "/session/:sessionId/element/:id/combobox/scroll"),
];

static GLOBAL_TABLE: LazyLock<CommandTable> = LazyLock::new(CommandTable::winium);

/// HTTP verb used to dispatch a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	Get,
	Post,
	Delete,
}

impl HttpMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Delete => "DELETE",
		}
	}
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A placeholder in a path template had no matching parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing path parameter ':{placeholder}' for template '{template}'")]
pub struct PathError {
	pub template: String,
	pub placeholder: String,
}

/// One table entry: method plus URL path template with `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
	pub method: HttpMethod,
	pub path: &'static str,
}

impl CommandInfo {
	pub const fn new(method: HttpMethod, path: &'static str) -> Self {
		Self { method, path }
	}

	/// Placeholder names in template order, without the leading `:`.
	pub fn placeholders(&self) -> impl Iterator<Item = &'static str> {
		self.path.split('/').filter_map(|segment| segment.strip_prefix(':'))
	}

	/// Substitutes every `:name` segment with the parameter of the same name.
	///
	/// String values are inserted as-is apart from `%`, `?` and `#`, which are
	/// percent-encoded so the value stays inside its path segment. Other JSON
	/// scalars use their JSON text (`2`, `true`).
	pub fn resolve_path(&self, params: &Map<String, Value>) -> Result<String, PathError> {
		let mut resolved = Vec::new();
		for segment in self.path.split('/') {
			match segment.strip_prefix(':') {
				Some(name) => {
					let value = params.get(name).ok_or_else(|| PathError {
						template: self.path.to_string(),
						placeholder: name.to_string(),
					})?;
					resolved.push(path_value(value));
				}
				None => resolved.push(segment.to_string()),
			}
		}
		Ok(resolved.join("/"))
	}
}

fn path_value(value: &Value) -> String {
	match value {
		Value::String(s) => escape_segment(s),
		other => other.to_string(),
	}
}

fn escape_segment(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());
	for ch in raw.chars() {
		match ch {
			'%' => escaped.push_str("%25"),
			'?' => escaped.push_str("%3F"),
			'#' => escaped.push_str("%23"),
			_ => escaped.push(ch),
		}
	}
	escaped
}

/// Read-only mapping from command names to [`CommandInfo`].
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
	entries: HashMap<&'static str, CommandInfo>,
}

impl CommandTable {
	/// Process-wide baseline + Winium table.
	pub fn global() -> &'static CommandTable {
		&GLOBAL_TABLE
	}

	/// Builds the baseline protocol table merged with the Winium extensions.
	///
	/// Extensions are inserted last, so a name present in both resolves to the
	/// extension entry.
	pub fn winium() -> Self {
		Self::from_entries(BASELINE_COMMANDS.iter().chain(WINIUM_COMMANDS))
	}

	/// Baseline protocol commands only.
	pub fn baseline() -> Self {
		Self::from_entries(BASELINE_COMMANDS)
	}

	fn from_entries<'a>(entries: impl IntoIterator<Item = &'a (&'static str, HttpMethod, &'static str)>) -> Self {
		let entries = entries
			.into_iter()
			.map(|&(name, method, path)| (name, CommandInfo::new(method, path)))
			.collect();
		Self { entries }
	}

	pub fn get(&self, name: &str) -> Option<&CommandInfo> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries sorted by command name.
	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CommandInfo)> {
		let mut entries: Vec<_> = self.entries.iter().map(|(name, info)| (*name, info)).collect();
		entries.sort_by_key(|(name, _)| *name);
		entries.into_iter()
	}

	/// The vendor extension command names, in table order.
	pub fn extension_names() -> impl Iterator<Item = &'static str> {
		WINIUM_COMMANDS.iter().map(|(name, _, _)| *name)
	}
}
