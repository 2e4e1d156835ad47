use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keyadapt::{HitboxSet, KeyCode, KeyStatSet, LearnReport};

fn key_label(code: KeyCode) -> String {
    match code {
        32 => "space".to_string(),
        10 => "enter".to_string(),
        9 => "tab".to_string(),
        -1 => "shift".to_string(),
        -2 => "?123".to_string(),
        -5 => "bksp".to_string(),
        c if c > 32 => char::from_u32(c as u32)
            .map(|ch| ch.to_string())
            .unwrap_or_else(|| c.to_string()),
        c => format!("#{}", c),
    }
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Hitboxes in reading order, with the learnt touch distribution per key.
pub fn print_keyboard(hitboxes: &HitboxSet, stats: Option<&KeyStatSet>) {
    println!("\nKeyboard {}", hitboxes.keyboard_hash());
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Code"),
        Cell::new("Left"),
        Cell::new("Top"),
        Cell::new("Right"),
        Cell::new("Bottom"),
        Cell::new("N").fg(Color::Cyan),
        Cell::new("Mean X"),
        Cell::new("Mean Y"),
        Cell::new("SD X"),
        Cell::new("SD Y"),
    ]);

    for hb in hitboxes.iter() {
        let mut row = vec![
            Cell::new(key_label(hb.code())).add_attribute(Attribute::Bold),
            Cell::new(hb.code()),
            Cell::new(hb.left()),
            Cell::new(hb.top()),
            Cell::new(hb.right()),
            Cell::new(hb.bottom()),
        ];

        match stats.and_then(|s| s.get(hb.code())) {
            Some(ks) => row.extend([
                Cell::new(ks.n()).fg(Color::Cyan),
                Cell::new(format!("{:.1}", ks.mean_x())),
                Cell::new(format!("{:.1}", ks.mean_y())),
                Cell::new(format!("{:.1}", ks.var_x().sqrt())),
                Cell::new(format!("{:.1}", ks.var_y().sqrt())),
            ]),
            None => row.extend((0..5).map(|_| Cell::new("-").fg(Color::DarkGrey))),
        }

        table.add_row(row);
    }

    right_align(&mut table, 1, 10);
    println!("{table}");
}

pub fn print_learn_report(report: &LearnReport) {
    println!("\n=== LEARNING RUN ===");
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let rows: [(&str, usize, Color); 9] = [
        ("Logs drained", report.logs_drained, Color::Reset),
        ("Entries seen", report.entries_seen, Color::Reset),
        ("Accepted touches", report.accepted, Color::Green),
        ("Rejected outliers", report.rejected_outliers, Color::Yellow),
        ("Skipped incomplete", report.skipped_incomplete, Color::Reset),
        ("Keyboards updated", report.keyboards_updated, Color::Cyan),
        ("Keyboards without hitboxes", report.keyboards_without_geometry, Color::Yellow),
        ("Borders moved", report.borders_moved, Color::Cyan),
        ("Save failures", report.save_failures, Color::Red),
    ];

    for (label, value, color) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value).fg(color)]);
    }

    right_align(&mut table, 1, 1);
    println!("{table}");
}
