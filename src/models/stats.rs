use serde::{Deserialize, Serialize};

/// One table row as rendered on a page: ordered cell texts.
pub type RawRow = Vec<String>;

/// The raw dataset assembled after scraping: the session's header set plus
/// every row accumulated across pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl StatsTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind scraped rows to the header set. Headers beyond `column_cap`
    /// are dropped, and every row is clamped to the header arity: excess
    /// cells are cut, short rows are padded with empty text. The cap
    /// guards against page layout drift.
    pub fn from_scrape(mut headers: Vec<String>, rows: Vec<RawRow>, column_cap: usize) -> Self {
        headers.truncate(column_cap);
        let width = headers.len();

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A single normalized value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// A numeric field whose source text did not parse.
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Flat-file rendering; a missing value becomes an empty field.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Text,
    Real,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// The cleaned dataset: canonical column names, coerced cells, metadata
/// columns appended. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CleanTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl CleanTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_cap_clamps_headers_and_rows() {
        let headers: Vec<String> = (0..5).map(|i| format!("H{}", i)).collect();
        let rows = vec![
            vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            vec!["x".into()],
        ];

        let table = StatsTable::from_scrape(headers, rows, 3);

        assert_eq!(table.headers, vec!["H0", "H1", "H2"]);
        assert_eq!(table.rows[0], vec!["a", "b", "c"]);
        // Short rows are padded to the header arity.
        assert_eq!(table.rows[1], vec!["x", "", ""]);
    }

    #[test]
    fn empty_scrape_yields_empty_table() {
        let table = StatsTable::from_scrape(vec!["H0".into()], Vec::new(), 30);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn cell_rendering() {
        assert_eq!(Cell::Text("Luka".into()).render(), "Luka");
        assert_eq!(Cell::Number(20.5).render(), "20.5");
        assert_eq!(Cell::Missing.render(), "");
    }

    #[test]
    fn column_lookup_by_name() {
        let table = CleanTable {
            columns: vec![
                Column {
                    name: "player_name".into(),
                    kind: ColumnKind::Text,
                },
                Column {
                    name: "pts".into(),
                    kind: ColumnKind::Real,
                },
            ],
            rows: Vec::new(),
        };

        assert_eq!(table.column_index("pts"), Some(1));
        assert_eq!(table.column_index("reb"), None);
    }
}
