//! Text renderings of resolved pages and repeating-group state.

use std::fmt::Write;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use layout_engine::{LayoutPage, NodeRef, RepeatingGroups};

/// An indented outline of the page, one line per node and per row.
pub fn render_tree(page: &LayoutPage) -> String {
    let mut out = String::new();
    for node in page.top_level() {
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: NodeRef<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{} ({})", node.id(), node.item().component_type);
    if let Some(binding) = node.item().first_binding() {
        let _ = write!(out, " -> {binding}");
    }
    if node.item().is_hidden_literal() {
        out.push_str(" [hidden]");
    }
    out.push('\n');

    if node.is_repeating() {
        for row in node.rows() {
            let _ = write!(out, "{indent}  row {}", row.index);
            if row.hidden == Some(true) {
                out.push_str(" [hidden]");
            }
            out.push('\n');
            for child in node.direct_children(Some(row.index)) {
                write_node(out, child, depth + 2);
            }
        }
    } else {
        for child in node.direct_children(None) {
            write_node(out, child, depth + 1);
        }
    }
}

/// Every node of the page in traversal order.
pub fn page_table(page: &LayoutPage) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Type"),
        header_cell("Row"),
        header_cell("Binding"),
        header_cell("Hidden"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for node in page.flat(true) {
        let item = node.item();
        table.add_row(vec![
            Cell::new(node.id()),
            Cell::new(&item.component_type),
            node.row_index().map_or_else(|| dim_cell("-"), Cell::new),
            item.first_binding().map_or_else(|| dim_cell("-"), Cell::new),
            if item.is_hidden_literal() {
                Cell::new("yes").fg(Color::Yellow).add_attribute(Attribute::Bold)
            } else {
                dim_cell("no")
            },
        ]);
    }
    table
}

/// The repeating-group state store, one line per key.
pub fn groups_table(groups: &RepeatingGroups) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Rows"),
        header_cell("Last index"),
        header_cell("Base group"),
        header_cell("Binding"),
        header_cell("Edit index"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (key, group) in groups.iter() {
        let rows = group.row_count();
        table.add_row(vec![
            Cell::new(key).add_attribute(Attribute::Bold),
            if rows > 0 { Cell::new(rows) } else { dim_cell(rows) },
            Cell::new(group.index),
            group.base_group_id.as_deref().map_or_else(|| dim_cell("-"), Cell::new),
            group
                .data_model_binding
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            if group.edit_index >= 0 {
                Cell::new(group.edit_index)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
