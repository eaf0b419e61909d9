use crate::position::PositionCode;

/// A column header as it appears in the page markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// One header row: just the field label.
    Single(String),
    /// Two header rows: a group label (`"PASSING"`, `"MISC"`, or blank) over the field label.
    Compound { category: String, field: String },
}

impl Header {
    pub fn single(field: impl Into<String>) -> Self {
        Header::Single(field.into())
    }

    pub fn compound(category: impl Into<String>, field: impl Into<String>) -> Self {
        Header::Compound {
            category: category.into(),
            field: field.into(),
        }
    }

    /// The bottom-row label, ignoring any group.
    pub fn field(&self) -> &str {
        match self {
            Header::Single(f) => f,
            Header::Compound { field, .. } => field,
        }
    }
}

/// Injected by the fetcher to tag rows with their position; never survives normalization.
pub const POSITION_COLUMN: &str = "Position";

#[derive(Debug, Clone)]
pub struct RawTable {
    /// Which stats page this came from.
    pub position: PositionCode,
    pub headers: Vec<Header>,
    /// Cell text, one `Vec` per `<tr>`, aligned with `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(position: PositionCode, headers: Vec<Header>, rows: Vec<Vec<String>>) -> Self {
        Self {
            position,
            headers,
            rows,
        }
    }

    /// Append a `Position` column holding the position code on every row.
    pub fn tag_position(&mut self) {
        if self
            .headers
            .iter()
            .any(|h| h.field().eq_ignore_ascii_case(POSITION_COLUMN))
        {
            return;
        }
        self.headers.push(Header::single(POSITION_COLUMN));
        let code = self.position.as_str();
        for row in &mut self.rows {
            row.push(code.to_string());
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|h| h.field().trim().eq_ignore_ascii_case(name))
    }
}
