//! Console and LaTeX renderings of the comparison table.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Color, Table};

use crate::types::{ModelComparison, ModelComparisonRow};

fn fixed3(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        String::new()
    }
}

fn weight_cell(row: &ModelComparisonRow, representation: &str) -> String {
    row.weight(representation)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Full comparison table, baseline included.
///
/// Cells are never wrapped, so weight summaries stay on one line when the
/// output is piped.
pub fn comparison_table(comparison: &ModelComparison) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("k").fg(Color::Cyan),
        Cell::new("Loss").fg(Color::Cyan),
        Cell::new("AIC").fg(Color::Cyan),
        Cell::new("BIC").fg(Color::Cyan),
        Cell::new("BIC impr. %").fg(Color::Cyan),
        Cell::new("Not conv.").fg(Color::Cyan),
    ];
    header.extend(
        comparison
            .representations
            .iter()
            .map(|r| Cell::new(r).fg(Color::Cyan)),
    );
    table.set_header(header);

    for row in &comparison.rows {
        let mut cells = vec![
            Cell::new(&row.model),
            Cell::new(row.k).set_alignment(CellAlignment::Right),
            Cell::new(fixed3(row.loss)).set_alignment(CellAlignment::Right),
            Cell::new(fixed3(row.aic)).set_alignment(CellAlignment::Right),
            Cell::new(fixed3(row.bic)).set_alignment(CellAlignment::Right),
            Cell::new(fixed3(row.bic_improvement)).set_alignment(CellAlignment::Right),
            Cell::new(row.non_converged).set_alignment(CellAlignment::Right),
        ];
        cells.extend(
            comparison
                .representations
                .iter()
                .map(|r| Cell::new(weight_cell(row, r))),
        );
        table.add_row(cells);
    }
    table
}

pub fn render_console(comparison: &ModelComparison) -> String {
    comparison_table(comparison).to_string()
}

fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '%' | '&' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Booktabs `tabular` with the BIC improvement and weight columns.
///
/// The baseline row is omitted and missing values are left blank.
pub fn render_latex(comparison: &ModelComparison) -> String {
    let reps = &comparison.representations;
    let mut out = String::new();

    out.push_str(&format!("\\begin{{tabular}}{{lr{}}}\n", "l".repeat(reps.len())));
    out.push_str("\\toprule\n");

    let mut header = vec!["model".to_string(), escape_latex("bic_improvement")];
    header.extend(reps.iter().map(|r| escape_latex(r)));
    out.push_str(&header.join(" & "));
    out.push_str(" \\\\\n\\midrule\n");

    for row in comparison.fitted_rows() {
        let mut cells = vec![escape_latex(&row.model), fixed3(row.bic_improvement)];
        cells.extend(reps.iter().map(|r| weight_cell(row, r)));
        out.push_str(&cells.join(" & "));
        out.push_str(" \\\\\n");
    }

    out.push_str("\\bottomrule\n\\end{tabular}\n");
    out
}
