//! Table rendering of categories.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use partstock_inventory::{CategoryStore, Registry};

/// Category name followed by its records as a table, smallest quantity first.
pub fn category(store: &CategoryStore) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(store.schema().fields());

    for record in store.sorted_by_quantity() {
        let mut row: Vec<String> = record.keys().to_vec();
        row.push(record.quantity().to_string());
        table.add_row(row);
    }

    format!("{}\n{table}", store.name())
}

/// Every category of `registry`, separated by blank lines.
pub fn registry(registry: &Registry) -> String {
    registry
        .categories()
        .map(category)
        .collect::<Vec<_>>()
        .join("\n\n")
}
