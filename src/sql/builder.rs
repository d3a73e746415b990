//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one resource.
//! Rows come back as a single JSONB column (`to_jsonb` of the row) so every table decodes the same way.

use crate::resource::{Column, Resource};
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from the catalogue).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder with a cast to the column type; parameters are bound as text.
    fn push_cast(&mut self, column: &Column, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, column.kind.pg_type())
    }
}

/// Wrap a data-modifying statement so it returns the affected row as JSONB.
fn returning_json(statement: String) -> String {
    format!("WITH t AS ({} RETURNING *) SELECT to_jsonb(t) AS row FROM t", statement)
}

/// SELECT every row, oldest first.
pub fn select_all(resource: Resource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT to_jsonb(t) AS row FROM {} t ORDER BY t.\"created_at\", t.\"id\"",
        quoted(resource.table())
    );
    q
}

/// SELECT by primary key.
pub fn select_by_id(resource: Resource, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT to_jsonb(t) AS row FROM {} t WHERE t.\"id\" = ${}",
        quoted(resource.table()),
        n
    );
    q
}

/// INSERT only the given columns; everything else falls back to the column default.
pub fn insert(resource: Resource, fields: Vec<(&'static Column, Value)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(resource.table());
    if fields.is_empty() {
        q.sql = returning_json(format!("INSERT INTO {} DEFAULT VALUES", table));
        return q;
    }
    let mut cols = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    for (column, value) in fields {
        cols.push(quoted(&column.column_name()));
        placeholders.push(q.push_cast(column, value));
    }
    q.sql = returning_json(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    ));
    q
}

/// UPDATE by id: SET only the given columns, and always bump updated_at.
pub fn update(resource: Resource, id: &str, fields: Vec<(&'static Column, Value)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(fields.len() + 1);
    for (column, value) in fields {
        let rhs = q.push_cast(column, value);
        sets.push(format!("{} = {}", quoted(&column.column_name()), rhs));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = returning_json(format!(
        "UPDATE {} SET {} WHERE \"id\" = ${}",
        quoted(resource.table()),
        sets.join(", "),
        id_param
    ));
    q
}

/// DELETE by id, returning the id so absence can be detected.
pub fn delete(resource: Resource, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE \"id\" = ${} RETURNING \"id\"",
        quoted(resource.table()),
        n
    );
    q
}
