use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use serde_json::Value;

use pipeline_model::{Status, StepData};

pub fn print_summary(output: &StepData) {
    eprintln!("Status: {}", output.status);
    if let Some(table) = error_table(output) {
        eprintln!("{table}");
    }
}

/// Findings as a Row/Column/Message table; `None` when there are none.
pub fn error_table(output: &StepData) -> Option<Table> {
    if output.errors.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Message"),
    ]);
    apply_error_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for error in &output.errors {
        table.add_row(vec![
            row_cell(error.get("row")),
            error
                .get("column")
                .and_then(Value::as_str)
                .map_or_else(|| dim_cell("-"), Cell::new),
            message_cell(error, &output.status),
        ]);
    }
    Some(table)
}

fn apply_error_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(12)),
        ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ColumnConstraint::LowerBoundary(Width::Fixed(20)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn row_cell(row: Option<&Value>) -> Cell {
    match row {
        Some(Value::Number(n)) => Cell::new(n),
        Some(Value::String(key)) => Cell::new(key),
        _ => dim_cell("-"),
    }
}

fn message_cell(error: &Value, status: &str) -> Cell {
    let message = match error.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => error.to_string(),
    };
    if status == Status::ValidationFailed.as_str() {
        Cell::new(message).fg(Color::Red)
    } else {
        Cell::new(message)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
