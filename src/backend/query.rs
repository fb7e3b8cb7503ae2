//! PostgREST query builder.
//!
//! Mirrors the table-scoped `select / eq / gte / order / limit` chain of the
//! hosted client, and renders it into URL query pairs.

/// Sort direction for an `order` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Default `Accept` for reads: a JSON array of rows.
pub const ROWS_ACCEPT: &str = "application/json";
/// Makes PostgREST return one object, or `PGRST116` when there is none.
pub const SINGLE_OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

/// A read or filter description against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
    single: bool,
}

impl Query {
    /// Start a query against `table`, selecting all columns.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            single: false,
        }
    }

    /// Replace the column list (supports embeds like `*,units(name)`).
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn gte(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), format!("gte.{}", value.to_string())));
        self
    }

    /// Append an ascending sort key.
    pub fn order(self, column: impl Into<String>) -> Self {
        self.order_by(column, Direction::Asc)
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask for exactly one row; zero rows becomes a `PGRST116` error.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `Accept` header for a read: one object for [`Query::single`], rows otherwise.
    pub fn accept(&self) -> &'static str {
        if self.single {
            SINGLE_OBJECT_ACCEPT
        } else {
            ROWS_ACCEPT
        }
    }

    /// Query pairs for a read request.
    pub fn read_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        params.extend(self.filter_params());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, direction)| format!("{}.{}", column, direction.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Query pairs for an update: filters only.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.clone()
    }
}
