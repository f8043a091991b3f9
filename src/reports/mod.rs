use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use mmkp_bench::pipeline::SweepOutcome;
use mmkp_bench::results::Deviation;
use mmkp_bench::workbook::round_sig3;

fn deviation_cell(d: Deviation) -> Cell {
    match d {
        Deviation::Value(v) => Cell::new(format!("{}", round_sig3(v))),
        Deviation::NotAvailable => Cell::new("NA").fg(Color::DarkGrey),
    }
}

fn optional_cell(v: Option<f64>) -> Cell {
    deviation_cell(Deviation::from(v))
}

/// Per-group deviation table for one finished sweep.
pub fn print_grand_summary(outcome: &SweepOutcome) {
    let grand = &outcome.summary;
    println!(
        "\n📊 {} (pop {}, gen {}, mods {})",
        grand.algorithm.to_uppercase(),
        outcome.sweep.pop_size,
        outcome.sweep.gen_size,
        outcome.sweep.modifier
    );

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Group").add_attribute(Attribute::Bold)];
    header.extend(grand.competitor_names.iter().map(Cell::new));
    header.push(Cell::new(grand.algorithm.to_uppercase()).fg(Color::Cyan));
    header.push(Cell::new("Runtime(sec)"));
    header.push(Cell::new("Generations"));
    header.push(Cell::new("Failed").fg(Color::Red));
    table.add_row(header);

    let cols = grand.competitor_names.len() + 4;
    for i in 1..=cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for g in &grand.groups {
        let mut row = vec![Cell::new(&g.name).add_attribute(Attribute::Bold)];
        row.extend(
            grand
                .competitor_names
                .iter()
                .map(|n| deviation_cell(g.competitor_average(n))),
        );
        row.push(deviation_cell(g.measured_average).fg(Color::Cyan));
        row.push(Cell::new(format!("{:.2}", g.total_runtime)));
        row.push(optional_cell(g.average_generation));
        row.push(Cell::new(g.failed));
        table.add_row(row);
    }

    let failed: usize = grand.groups.iter().map(|g| g.failed).sum();
    let mut row = vec![Cell::new("All").add_attribute(Attribute::Bold)];
    row.extend(grand.competitor_averages.iter().map(|d| deviation_cell(*d)));
    row.push(deviation_cell(grand.measured_average).fg(Color::Cyan));
    row.push(Cell::new(format!("{:.2}", grand.total_runtime)));
    row.push(optional_cell(grand.average_generation));
    row.push(Cell::new(failed));
    table.add_row(row);

    println!("{}", table);
    println!("Overview: {}", outcome.overview_path.display());
    println!("Graphs:   {}", outcome.graphs_path.display());
}
