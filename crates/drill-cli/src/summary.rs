use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use drill_cli::session::{DecodeReport, EncodeReport, ReplayReport, StepRecord};
use drill_model::{Filters, NavigationStack};

pub fn print_decode(report: &DecodeReport) {
    println!("Query: {}", display_query(&report.query));
    println!("Canonical: {}", display_query(&report.canonical));
    println!("{}", stack_table(&report.stack));
    println!("{}", filters_table(&report.filters));
}

pub fn print_encode(report: &EncodeReport) {
    println!("{}", stack_table(&report.stack));
    println!("?{}", report.query);
}

pub fn print_replay(report: &ReplayReport, with_steps: bool) {
    if with_steps {
        println!("{}", steps_table(&report.steps));
    }
    println!("{}", stack_table(&report.stack));
    println!("{}", filters_table(&report.filters));
    println!("{}", history_table(report));
    println!(
        "Writes: {} push, {} replace{}",
        report.pushes,
        report.replaces,
        if report.pending_sync {
            " (filter sync pending)"
        } else {
            ""
        }
    );
}

fn stack_table(stack: &NavigationStack) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Level"),
        header_cell("Id"),
        header_cell("Label"),
        header_cell("Metric"),
        header_cell("Range"),
        header_cell("View"),
        header_cell("Overlay"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    let top = stack.len() - 1;
    for (index, entry) in stack.iter().enumerate() {
        let label = if index == top {
            Cell::new(&entry.label).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&entry.label)
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(entry.level.display_name()),
            Cell::new(&entry.id),
            label,
            Cell::new(&entry.filters.metric),
            Cell::new(entry.filters.range),
            Cell::new(entry.filters.view_mode),
            overlay_cell(entry.filters.overlay.as_deref()),
        ]);
    }
    table
}

fn filters_table(filters: &Filters) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Filter"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("metric"), Cell::new(&filters.metric)]);
    table.add_row(vec![
        Cell::new("range"),
        Cell::new(format!("{} ({})", filters.range, filters.range.label())),
    ]);
    table.add_row(vec![Cell::new("view"), Cell::new(filters.view_mode)]);
    table.add_row(vec![
        Cell::new("overlay"),
        overlay_cell(filters.overlay.as_deref()),
    ]);
    table
}

fn steps_table(steps: &[StepRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Step"),
        header_cell("Outcome"),
        header_cell("Depth"),
        header_cell("Address bar"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for record in steps {
        let outcome = if record.pending_sync {
            Cell::new(format!("{} (pending)", record.outcome)).fg(Color::Yellow)
        } else {
            outcome_cell(&record.outcome)
        };
        table.add_row(vec![
            Cell::new(record.index),
            Cell::new(&record.step),
            outcome,
            Cell::new(record.depth),
            Cell::new(display_query(&record.query)),
        ]);
    }
    table
}

fn history_table(report: &ReplayReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(""), header_cell("#"), header_cell("History entry")]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (index, entry) in report.history.iter().enumerate() {
        let marker = if index == report.cursor {
            Cell::new(">").fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            Cell::new("")
        };
        table.add_row(vec![marker, Cell::new(index), Cell::new(display_query(entry))]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn outcome_cell(outcome: &str) -> Cell {
    let color = if outcome.starts_with("committed") || outcome.contains("adopted") {
        Color::Green
    } else if outcome.starts_with("rejected") {
        Color::Red
    } else {
        Color::DarkGrey
    };
    Cell::new(outcome).fg(color)
}

fn overlay_cell(overlay: Option<&str>) -> Cell {
    match overlay {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn display_query(query: &str) -> String {
    if query.is_empty() {
        "(empty)".to_string()
    } else {
        format!("?{query}")
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
