//! SQL text for the document table.
//!
//! Every statement here is built from a table name that has already passed
//! [`is_sql_identifier`](crate::config::is_sql_identifier) and from constant
//! field keys; values supplied by callers only ever travel as bind parameters.
//! Table names are always quoted so reserved words such as `order` still work.

use crate::{data::store::filter::Filter, models::shop::ShopField};

/// A `WHERE` fragment together with the text values bound to its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    pub clause: String,
    pub binds: Vec<String>,
}

impl CompiledFilter {
    /// Placeholder number the next bind after this filter's binds will use
    pub fn next_placeholder(&self) -> usize {
        self.binds.len() + 1
    }

    /// Whether any stored document could match.
    ///
    /// Filters only conjoin their values (a text search shares one value across
    /// its fields), so a single value that no `text` column can hold rules out
    /// every document.
    pub fn can_match(&self) -> bool {
        self.binds.iter().all(|value| is_text_value(value))
    }
}

/// PostgreSQL `text` cannot hold NUL; binding one fails the whole statement
pub fn is_text_value(value: &str) -> bool {
    !value.contains('\0')
}

/// `"table"`; `table` is a validated identifier so it never contains a quote
fn quoted(table: &str) -> String {
    format!("\"{table}\"")
}

/// Compile `filter` into a predicate over the `doc` column, numbering placeholders from `$1`
pub fn compile(filter: &Filter) -> CompiledFilter {
    let mut binds = Vec::new();
    let clause = compile_into(filter, &mut binds);
    CompiledFilter { clause, binds }
}

fn compile_into(filter: &Filter, binds: &mut Vec<String>) -> String {
    match filter {
        Filter::All => "TRUE".to_string(),
        Filter::Equals { field, value } => {
            binds.push(value.clone());
            field_predicate(*field, "=", binds.len())
        }
        Filter::ContainsAny { fields, needle } => {
            if fields.is_empty() {
                return "FALSE".to_string();
            }
            binds.push(like_pattern(needle));
            let placeholder = binds.len();
            let alternatives: Vec<String> = fields
                .iter()
                .map(|field| field_predicate(*field, "ILIKE", placeholder))
                .collect();
            format!("({})", alternatives.join(" OR "))
        }
        Filter::And(filters) => {
            if filters.is_empty() {
                return "TRUE".to_string();
            }
            let parts: Vec<String> = filters.iter().map(|f| compile_into(f, binds)).collect();
            format!("({})", parts.join(" AND "))
        }
    }
}

/// `field <op> $n`, element-wise for list fields
fn field_predicate(field: ShopField, op: &str, placeholder: usize) -> String {
    let key = field.key();
    if field.is_list() {
        format!(
            "EXISTS (SELECT 1 FROM jsonb_array_elements_text(\
             CASE WHEN jsonb_typeof(doc->'{key}') = 'array' THEN doc->'{key}' ELSE '[]'::jsonb END\
             ) AS elem(value) WHERE elem.value {op} ${placeholder})"
        )
    } else {
        format!("(doc->>'{key}') {op} ${placeholder}")
    }
}

/// `%needle%` with the `LIKE` metacharacters in `needle` escaped
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn create_table(table: &str) -> String {
    let table = quoted(table);
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         pk BIGSERIAL PRIMARY KEY, \
         id TEXT NOT NULL UNIQUE, \
         doc JSONB NOT NULL)"
    )
}

/// Expression indexes backing the category filter and the grouped counts
pub fn create_indexes(table: &str) -> Vec<String> {
    ["category", "type", "name"]
        .into_iter()
        .map(|key| {
            format!(
                "CREATE INDEX IF NOT EXISTS \"{table}_{key}_idx\" ON {} ((doc->>'{key}'))",
                quoted(table)
            )
        })
        .collect()
}

pub fn select_all(table: &str) -> String {
    format!("SELECT doc FROM {} ORDER BY pk", quoted(table))
}

pub fn select_by_id(table: &str) -> String {
    format!("SELECT doc FROM {} WHERE id = $1", quoted(table))
}

/// Matching documents in insertion order; with `limit`, the last placeholder is the row limit
pub fn select_matching(table: &str, filter: &CompiledFilter, limit: bool) -> String {
    let mut sql = format!(
        "SELECT doc FROM {} WHERE {} ORDER BY pk",
        quoted(table),
        filter.clause
    );
    if limit {
        sql.push_str(&format!(" LIMIT ${}", filter.next_placeholder()));
    }
    sql
}

pub fn count_matching(table: &str, filter: &CompiledFilter) -> String {
    format!(
        "SELECT COUNT(*) AS total FROM {} WHERE {}",
        quoted(table),
        filter.clause
    )
}

/// Group sizes by the value under the key bound to `$1`; documents without it
/// fall under the group named by `$2`.
///
/// Ties are broken by the first appearance of the group in the table.
pub fn count_grouped(table: &str) -> String {
    let table = quoted(table);
    format!(
        "SELECT COALESCE(doc->>($1::text), $2) AS key, COUNT(*) AS total \
         FROM {table} GROUP BY 1 ORDER BY total DESC, MIN(pk)"
    )
}

/// Insert a document or merge it into the stored one.
///
/// Returns no row when the merge would not change the stored document, and
/// `inserted = true` only for a fresh row.
pub fn upsert(table: &str) -> String {
    let table = quoted(table);
    format!(
        "INSERT INTO {table} AS stored (id, doc) VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET doc = stored.doc || EXCLUDED.doc \
         WHERE stored.doc IS DISTINCT FROM stored.doc || EXCLUDED.doc \
         RETURNING (xmax = 0) AS inserted"
    )
}

pub fn delete_all(table: &str) -> String {
    format!("DELETE FROM {}", quoted(table))
}
