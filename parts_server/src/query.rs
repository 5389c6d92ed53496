//! Parameterised SQL assembly for report queries.
//!
//! Report statements are raw SQL (CTEs and window functions) whose WHERE
//! clauses depend on which filters are set. Filter values are always bound
//! as `$n` parameters; nothing user-supplied is spliced into the text.

use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Array, Date, Text};

use crate::filters::{DateRange, Selection};

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Date(NaiveDate),
    Text(String),
    TextList(Vec<String>),
}

/// Incrementally built SQL statement with its bind values.
#[derive(Debug, Default)]
pub struct ReportQuery {
    sql: String,
    binds: Vec<Bind>,
}

impl ReportQuery {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            binds: Vec::new(),
        }
    }

    /// Append raw SQL text.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Register a bind value and return its placeholder.
    pub fn bind(&mut self, value: Bind) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    /// `AND <expr> BETWEEN $a AND $b`
    pub fn and_between(&mut self, date_expr: &str, range: &DateRange) -> &mut Self {
        let start = self.bind(Bind::Date(range.start));
        let end = self.bind(Bind::Date(range.end));
        self.sql
            .push_str(&format!("\n AND {date_expr} BETWEEN {start} AND {end}"));
        self
    }

    /// `AND <column> = ANY($n)`; no clause for `Selection::All`.
    pub fn and_any(&mut self, column: &str, selection: &Selection) -> &mut Self {
        if let Selection::Only(values) = selection {
            let p = self.bind(Bind::TextList(values.clone()));
            self.sql.push_str(&format!("\n AND {column} = ANY({p})"));
        }
        self
    }

    /// `AND <column> = $n`
    pub fn and_eq(&mut self, column: &str, value: &str) -> &mut Self {
        let p = self.bind(Bind::Text(value.to_string()));
        self.sql.push_str(&format!("\n AND {column} = {p}"));
        self
    }

    /// `AND <column> <> ALL($n)`; skipped when `values` is empty.
    ///
    /// Rows whose column is NULL are excluded as well, matching `NOT IN`.
    pub fn and_not_any(&mut self, column: &str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            let p = self.bind(Bind::TextList(values.to_vec()));
            self.sql.push_str(&format!("\n AND {column} <> ALL({p})"));
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[Bind] {
        &self.binds
    }

    /// Produce the executable diesel query.
    pub fn build(self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        tracing::trace!(sql = self.sql(), binds = self.binds().len(), "Report SQL");
        let mut query = diesel::sql_query(self.sql).into_boxed::<Pg>();
        for value in self.binds {
            query = match value {
                Bind::Date(d) => query.bind::<Date, _>(d),
                Bind::Text(s) => query.bind::<Text, _>(s),
                Bind::TextList(v) => query.bind::<Array<Text>, _>(v),
            };
        }
        query
    }
}
