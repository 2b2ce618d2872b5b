//! `winium commands`

use winium::CommandTable;

/// One line per command: name, HTTP method, path template.
pub fn render(extensions_only: bool) -> String {
	let table = CommandTable::global();
	let names: Vec<&str> = if extensions_only {
		let mut names: Vec<_> = CommandTable::extension_names().collect();
		names.sort_unstable();
		names
	} else {
		table.iter().map(|(name, _)| name).collect()
	};

	let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
	let mut out = String::new();
	for name in names {
		if let Some(info) = table.get(name) {
			out.push_str(&format!("{name:<width$}  {:<6}  {}\n", info.method.as_str(), info.path));
		}
	}
	out
}
