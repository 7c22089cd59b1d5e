//! Outline tables: `| a | b | c |` rows and `|---+---|` rules.

/// A table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Cells(Vec<String>),
    Rule,
}

/// Table with an optional header row followed by a rule.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Row {
    /// Parse a single table line. The line must start with `|` after leading whitespace.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.starts_with("|-") {
            return Self::Rule;
        }
        let inner = line.strip_prefix('|').unwrap_or(line);
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        Self::Cells(inner.split('|').map(|cell| cell.trim().to_string()).collect())
    }
}

impl Table {
    /// True if the line belongs to a table.
    #[must_use]
    pub fn is_table_line(line: &str) -> bool {
        line.trim_start().starts_with('|')
    }

    /// Number of leading rows that form the header: a cell row followed by a rule.
    #[must_use]
    pub fn header_len(&self) -> usize {
        match self.rows.as_slice() {
            [Row::Cells(_), Row::Rule, ..] => 2,
            _ => 0,
        }
    }

    /// Cell rows after the header.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows[self.header_len()..].iter().filter_map(|row| match row {
            Row::Cells(cells) => Some(cells.as_slice()),
            Row::Rule => None,
        })
    }

    /// Replace everything after the header with the given rows.
    pub fn set_data_rows<I, R>(&mut self, rows: I)
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = String>,
    {
        self.rows.truncate(self.header_len());
        self.rows
            .extend(rows.into_iter().map(|cells| Row::Cells(cells.into_iter().collect())));
    }

    /// Render aligned table lines.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            if let Row::Cells(cells) = row {
                if widths.len() < cells.len() {
                    widths.resize(cells.len(), 0);
                }
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        self.rows
            .iter()
            .map(|row| match row {
                Row::Rule => {
                    let dashes: Vec<String> = widths.iter().map(|width| "-".repeat(width + 2)).collect();
                    format!("|{}|", dashes.join("+"))
                }
                Row::Cells(cells) => {
                    let padded: Vec<String> = widths
                        .iter()
                        .enumerate()
                        .map(|(index, &width)| {
                            let cell = cells.get(index).map_or("", String::as_str);
                            format!(" {cell:<width$} ")
                        })
                        .collect();
                    format!("|{}|", padded.join("|"))
                }
            })
            .collect()
    }
}
