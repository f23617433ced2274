use crate::grid::ReportGrid;

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render `grid` as CSV: header line, data rows, then the footer if any.
/// Lines end with `\n`.
pub fn grid_to_csv(grid: &ReportGrid) -> String {
    let mut out = String::new();
    push_record(&mut out, &grid.headers);
    for row in &grid.rows {
        push_record(&mut out, row);
    }
    if let Some(footer) = &grid.footer {
        push_record(&mut out, footer);
    }
    out
}

fn push_record(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| csv_quote(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}
