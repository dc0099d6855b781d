use std::fmt::Write;

use itertools::Itertools;
use pulldown_cmark::Alignment;

use crate::utils::unicode_str_width;

/// Collects the cells of a table while it is being formatted, then lays the
/// whole table out at once so columns line up.
pub(crate) struct TableState {
    alignment: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    col_index: usize,
}

impl TableState {
    pub(crate) fn new(alignment: Vec<Alignment>) -> Self {
        Self {
            alignment,
            rows: vec![],
            col_index: 0,
        }
    }

    /// Start a new row. The first row pushed is the header.
    pub(crate) fn push_row(&mut self) {
        self.rows.push(vec![]);
        self.col_index = 0;
    }

    /// Done with the current cell.
    pub(crate) fn increment_col_index(&mut self) {
        self.col_index += 1;
    }

    fn current_cell(&mut self) -> &mut String {
        if self.rows.is_empty() {
            self.rows.push(vec![]);
        }
        let row = self.rows.last_mut().expect("pushed a row above");
        while row.len() <= self.col_index {
            row.push(String::new());
        }
        &mut row[self.col_index]
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.alignment.len()))
            .max()
            .unwrap_or(0)
    }

    /// Lay the table out, one string per line.
    pub(crate) fn format(self) -> Result<Vec<String>, std::fmt::Error> {
        let columns = self.column_count();
        let cell = |row: &Vec<String>, col: usize| -> String {
            row.get(col).map(|c| c.trim().to_owned()).unwrap_or_default()
        };

        let mut widths = vec![3; columns];
        for row in &self.rows {
            for (col, width) in widths.iter_mut().enumerate() {
                *width = (*width).max(unicode_str_width(&cell(row, col)));
            }
        }

        let alignment_of = |col: usize| self.alignment.get(col).copied().unwrap_or(Alignment::None);

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (index, row) in self.rows.iter().enumerate() {
            let cells = (0..columns)
                .map(|col| pad(&cell(row, col), widths[col], alignment_of(col)))
                .join(" | ");
            let mut line = String::with_capacity(cells.len() + 4);
            write!(line, "| {cells} |")?;
            lines.push(line);

            if index == 0 {
                let delimiters = (0..columns)
                    .map(|col| delimiter(widths[col], alignment_of(col)))
                    .join(" | ");
                lines.push(format!("| {delimiters} |"));
            }
        }
        Ok(lines)
    }
}

impl Write for TableState {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.current_cell().push_str(s);
        Ok(())
    }
}

fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(unicode_str_width(text));
    match alignment {
        Alignment::Right => format!("{}{text}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
        Alignment::Left | Alignment::None => format!("{text}{}", " ".repeat(fill)),
    }
}

fn delimiter(width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::None => "-".repeat(width),
        Alignment::Left => format!(":{}", "-".repeat(width - 1)),
        Alignment::Right => format!("{}:", "-".repeat(width - 1)),
        Alignment::Center => format!(":{}:", "-".repeat(width - 2)),
    }
}
