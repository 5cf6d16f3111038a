//! Permissive CSV scanner for hand-maintained spreadsheet exports.
//!
//! Quoted fields may hold commas, raw newlines and `""` escapes. A quote
//! toggles quoting wherever it appears, so stray quotes mid-field are kept
//! as content rather than rejected. Any of `\n`, `\r\n`, `\r` outside quotes
//! ends a row.

/// Ordered rows of trimmed string fields.
pub type Grid = Vec<Vec<String>>;

/// Parse a CSV text blob into a grid.
///
/// Empty input yields zero rows. Blank lines (a row made of a single empty
/// field) are discarded, so a trailing newline never adds a row.
pub fn parse_csv(input: &str) -> Grid {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut rows: Grid = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Grid, row: Vec<String>) {
    let row: Vec<String> = row.into_iter().map(|f| clean_field(&f)).collect();
    if row.len() == 1 && row[0].is_empty() {
        return;
    }
    rows.push(row);
}

/// Trim, then drop one surrounding pair of double quotes if present.
fn clean_field(raw: &str) -> String {
    let v = raw.trim();
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        v[1..v.len() - 1].to_string()
    } else {
        v.to_string()
    }
}
