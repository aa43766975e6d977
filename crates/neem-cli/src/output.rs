use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut out = String::new();

    // Print header
    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    out.push_str(header_row.join("  ").trim_end());
    out.push('\n');

    // Print separator
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');

    // Print rows
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Print a list of IRIs, one per line, or as a JSON array.
pub fn print_list(header: &str, items: &[String], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&items);
    }
    let rows = items.iter().map(|i| vec![i.clone()]).collect();
    print_table(&[header], rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let rows = vec![
            vec!["get_all_actions".to_string(), "strict".to_string()],
            vec!["x".to_string(), "lenient".to_string()],
        ];
        let table = render_table(&["NAME", "MODE"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "NAME             MODE");
        assert_eq!(lines[1], "---------------  -------");
        assert_eq!(lines[2], "get_all_actions  strict");
        assert_eq!(lines[3], "x                lenient");
    }

    #[test]
    fn empty_table_has_header_and_separator() {
        let table = render_table(&["IRI"], &[]);
        assert_eq!(table, "IRI\n---\n");
    }
}
