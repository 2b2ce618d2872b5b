//! Winium control extensions for [`Element`]: data grids, list boxes, menus
//! and combo boxes.

use winium_protocol::{Command, names};
use winium_runtime::Result;

use super::Element;
use crate::By;

impl Element {
	fn cell_command(&self, name: &str, row: u32, column: u32) -> Command {
		self.command(name).param("row", row).param("column", column)
	}

	fn lookup_command(&self, name: &str, by: &By) -> Command {
		let mut command = self.command(name);
		command.parameters.extend(by.to_params());
		command
	}

	async fn send_for_element(&self, command: Command) -> Result<Element> {
		let value = self.session.send(command).await?;
		Element::from_value(&self.session, &value)
	}

	/// Cell at `row`, `column` of this data grid (zero-based).
	pub async fn find_data_grid_cell(&self, row: u32, column: u32) -> Result<Element> {
		self.send_for_element(self.cell_command(names::FIND_DATA_GRID_CELL, row, column))
			.await
	}

	pub async fn data_grid_column_count(&self) -> Result<u64> {
		self.session
			.send_as(self.command(names::GET_DATA_GRID_COLUMN_COUNT))
			.await
	}

	pub async fn data_grid_row_count(&self) -> Result<u64> {
		self.session.send_as(self.command(names::GET_DATA_GRID_ROW_COUNT)).await
	}

	/// Scrolls this data grid until the cell is visible.
	pub async fn scroll_to_data_grid_cell(&self, row: u32, column: u32) -> Result<()> {
		self.session
			.send_no_result(self.cell_command(names::SCROLL_TO_DATA_GRID_CELL, row, column))
			.await
	}

	pub async fn select_data_grid_cell(&self, row: u32, column: u32) -> Result<()> {
		self.session
			.send_no_result(self.cell_command(names::SELECT_DATA_GRID_CELL, row, column))
			.await
	}

	/// Scrolls this list box to the first item matching `by` and returns it.
	pub async fn scroll_to_list_box_item(&self, by: By) -> Result<Element> {
		self.send_for_element(self.lookup_command(names::SCROLL_TO_LIST_BOX_ITEM, &by))
			.await
	}

	/// Menu item at `path`, item names separated by `$` (e.g. `File$Save As`).
	pub async fn find_menu_item(&self, path: &str) -> Result<Element> {
		let command = self.command(names::FIND_MENU_ITEM).param("path", path);
		self.send_for_element(command).await
	}

	/// Opens each menu along `path` and selects the last item.
	pub async fn select_menu_item(&self, path: &str) -> Result<Element> {
		let command = self.command(names::SELECT_MENU_ITEM).param("path", path);
		self.send_for_element(command).await
	}

	pub async fn is_combo_box_expanded(&self) -> Result<bool> {
		self.session.send_as(self.command(names::IS_COMBO_BOX_EXPANDED)).await
	}

	pub async fn expand_combo_box(&self) -> Result<()> {
		self.session.send_no_result(self.command(names::EXPAND_COMBO_BOX)).await
	}

	pub async fn collapse_combo_box(&self) -> Result<()> {
		self.session.send_no_result(self.command(names::COLLAPSE_COMBO_BOX)).await
	}

	pub async fn find_combo_box_selected_item(&self) -> Result<Element> {
		self.send_for_element(self.command(names::FIND_COMBO_BOX_SELECTED_ITEM))
			.await
	}

	/// Scrolls this combo box to the first item matching `by` and returns it.
	pub async fn scroll_to_combo_box_item(&self, by: By) -> Result<Element> {
		self.send_for_element(self.lookup_command(names::SCROLL_TO_COMBO_BOX_ITEM, &by))
			.await
	}
}
