// src/csv.rs
use std::io::{self, Write};

use crate::report::Table;

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header row first, then every data row.
pub fn write_table<W: Write>(mut w: W, table: &Table, sep: char) -> io::Result<()> {
    write_row(&mut w, &table.headers, sep)?;
    for row in &table.rows {
        write_row(&mut w, row, sep)?;
    }
    Ok(())
}

pub fn to_string(table: &Table, sep: char) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_table(&mut buf, table, sep);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn quotes_only_when_needed() {
        let mut out = Vec::new();
        write_row(&mut out, &row(&["Pratos", "R$ 59,90", "diz \"oi\""]), ',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Pratos,\"R$ 59,90\",\"diz \"\"oi\"\"\"\n");
    }

    #[test]
    fn tsv_leaves_commas_alone() {
        let t = Table { headers: row(&["A", "B"]), rows: vec![row(&["1,5", "x"])] };
        assert_eq!(to_string(&t, '\t'), "A\tB\n1,5\tx\n");
    }
}
