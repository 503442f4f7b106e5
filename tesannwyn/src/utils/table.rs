//! Table formatting utilities

use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

/// Table with bold column titles
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Append a row of already formatted cells
pub fn add_table_row<I, S>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    table.add_row(Row::new(
        cells.into_iter().map(|s| Cell::new(s.as_ref())).collect(),
    ));
}

/// Two-column property table, numbers right-aligned
pub fn property_table(rows: &[(&str, String)]) -> Table {
    let mut table = create_table(&["Property", "Value"]);
    for (name, value) in rows {
        table.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new(value).style_spec("r"),
        ]));
    }
    table
}
