/// A cell as the normalizer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl<'a> From<Option<&'a str>> for RawValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        match value {
            Some(s) => RawValue::Text(s),
            None => RawValue::Missing,
        }
    }
}

/// Column names plus rows aligned with them. `None` marks an absent value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Rows shorter than the header are padded with `None`, longer ones are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn first_row_value(&self, column: usize) -> Option<&str> {
        self.rows.first()?.get(column)?.as_deref()
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).and_then(|v| v.as_deref()))
    }

    /// First `n` values of a column that are not absent.
    pub fn non_empty_samples(&self, column: usize, n: usize) -> Vec<&str> {
        self.column_values(column).flatten().take(n).collect()
    }

    /// Replaces any column called `name` and puts `values` first.
    /// All other columns keep their values and relative order.
    /// `values` must hold exactly one entry per row.
    pub fn with_front_column(self, name: &str, values: Vec<Option<String>>) -> Dataset {
        debug_assert_eq!(values.len(), self.rows.len(), "one value per row");
        let existing = self.column_index(name);

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(name.to_string());
        columns.extend(
            self.columns
                .into_iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != existing)
                .map(|(_, c)| c),
        );

        let rows = self
            .rows
            .into_iter()
            .zip(values)
            .map(|(row, value)| {
                let mut out = Vec::with_capacity(row.len() + 1);
                out.push(value);
                out.extend(
                    row.into_iter()
                        .enumerate()
                        .filter(|(i, _)| Some(*i) != existing)
                        .map(|(_, v)| v),
                );
                out
            })
            .collect();

        Dataset { columns, rows }
    }
}
