use std::fmt::Display;

use itertools::Itertools;

/// Delimiter-separated data split into a header line and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    EmptyInput,
    ColumnMismatch {
        /// 0-based index of the offending data row
        row: usize,
        expected: usize,
        got: usize,
    },
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "the input contains no data"),
            Self::ColumnMismatch { row, expected, got } => write!(
                f,
                "row {row} has {got} columns but the header has {expected}"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Naive delimiter split with per-cell trimming. Blank lines are skipped;
/// quoting and escaping are not interpreted.
pub fn parse_table(raw: &str, delimiter: char) -> Result<Table, TableError> {
    let mut lines = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Err(TableError::EmptyInput);
    };
    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|cell| cell.trim().to_owned())
        .collect();

    let rows: Vec<Vec<String>> = lines
        .map(|line| {
            line.split(delimiter)
                .map(|cell| cell.trim().to_owned())
                .collect()
        })
        .collect();

    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != headers.len() {
            return Err(TableError::ColumnMismatch {
                row,
                expected: headers.len(),
                got: cells.len(),
            });
        }
    }

    Ok(Table { headers, rows })
}

pub fn parse_csv(raw: &str) -> Result<Table, TableError> {
    parse_table(raw, ',')
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// The raw cells of one column, by header name.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// The cells of one column that parse as numbers. Non-numeric cells
    /// are skipped rather than failing the whole column.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let column = self.column(name)?;
        Some(
            column
                .into_iter()
                .filter_map(|cell| cell.parse().ok())
                .collect(),
        )
    }
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "count = {}, mean = {:.2}, median = {:.2}, min = {:.2}, max = {:.2}",
            self.count, self.mean, self.median, self.min, self.max
        )
    }
}

/// None for an empty slice. The median of an even count is the mean of the
/// two middle values.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let sorted: Vec<f64> = values
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .collect();
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        f64::midpoint(sorted[count / 2 - 1], sorted[count / 2])
    } else {
        sorted[count / 2]
    };

    Some(Summary {
        count,
        mean,
        median,
        min: sorted[0],
        max: sorted[count - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_csv() {
        let table = parse_csv("a,b\n1,2\n3,4").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn trims_cells_and_skips_blank_lines() {
        let table = parse_csv(" a , b \n\n 1 , 2 \n").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn column_mismatch() {
        assert_eq!(
            parse_csv("a,b\n1,2,3"),
            Err(TableError::ColumnMismatch {
                row: 0,
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_csv(""), Err(TableError::EmptyInput));
        assert_eq!(parse_csv(" \n \n"), Err(TableError::EmptyInput));
    }

    #[test]
    fn other_delimiters() {
        let table = parse_table("a;b\n1;2", ';').unwrap();
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn column_lookup() {
        let table = parse_csv("x,y\n1,2\n3,skip\n5,6").unwrap();
        assert_eq!(table.column("x").unwrap(), vec!["1", "3", "5"]);
        assert_eq!(table.numeric_column("y").unwrap(), vec![2.0, 6.0]);
        assert_eq!(table.column("z"), None);
    }

    #[test]
    fn summary_statistics() {
        let odd = summarize(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(odd.count, 3);
        assert_eq!(odd.mean, 2.0);
        assert_eq!(odd.median, 2.0);
        assert_eq!(odd.min, 1.0);
        assert_eq!(odd.max, 3.0);

        let even = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(even.median, 2.5);

        assert_eq!(summarize(&[]), None);
    }
}
