//! Dynamic WHERE / ORDER BY construction
//!
//! Conditions are recorded with their bind values and pushed into a
//! [`sqlx::QueryBuilder`] in one go, so every list/count query shares the
//! same predicate text and bind order.

use shared::request::{OrderItem, PageQuery};
use sqlx::{QueryBuilder, Sqlite};

/// Live-row predicate applied to every scoped read
pub const LIVE: &str = "deleted_at IS NULL";

#[derive(Debug, Clone)]
enum Bind {
    Text(String),
    Integer(i64),
}

/// Conjunction of SQL conditions with their bindings
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    // (sql fragment before the placeholder, bind, sql fragment after)
    parts: Vec<(String, Option<Bind>, &'static str)>,
}

impl Conditions {
    /// Start with the live-row predicate
    pub fn live() -> Self {
        let mut c = Self::default();
        c.raw(LIVE);
        c
    }

    /// Start with no predicate (includes soft-deleted rows)
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Add a condition without bindings
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.parts.push((condition.to_string(), None, ""));
        self
    }

    /// `column = ?` with a text binding
    pub fn eq_text(&mut self, column: &str, value: impl Into<String>) -> &mut Self {
        self.parts
            .push((format!("{column} = "), Some(Bind::Text(value.into())), ""));
        self
    }

    /// `column = ?` with an integer binding
    pub fn eq_i64(&mut self, column: &str, value: i64) -> &mut Self {
        self.parts
            .push((format!("{column} = "), Some(Bind::Integer(value)), ""));
        self
    }

    /// Substring match; `%`, `_` and `\` in `needle` match literally
    pub fn contains(&mut self, column: &str, needle: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(needle));
        self.parts.push((
            format!("{column} LIKE "),
            Some(Bind::Text(pattern)),
            " ESCAPE '\\'",
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Push ` WHERE a AND b ...` (nothing when empty)
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, (before, bind, after)) in self.parts.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(before);
            match bind {
                Some(Bind::Text(s)) => {
                    qb.push_bind(s.clone());
                }
                Some(Bind::Integer(n)) => {
                    qb.push_bind(*n);
                }
                None => {}
            }
            qb.push(*after);
        }
    }
}

/// Build ` ORDER BY ...` from caller-supplied items.
///
/// Fields outside `allowed` are ignored; an empty result falls back to
/// `default_order`. `id` is always appended as the final tie-break.
pub fn order_clause(order: &[OrderItem], allowed: &[&str], default_order: &str) -> String {
    let mut parts: Vec<String> = order
        .iter()
        .filter(|item| allowed.contains(&item.field.as_str()))
        .map(|item| {
            format!(
                "{} {}",
                item.field,
                if item.desc { "DESC" } else { "ASC" }
            )
        })
        .collect();
    if parts.is_empty() {
        parts.push(default_order.to_string());
    }
    if !parts.iter().any(|p| p.starts_with("id ")) {
        parts.push("id ASC".to_string());
    }
    format!(" ORDER BY {}", parts.join(", "))
}

/// Push ` LIMIT ? OFFSET ?`
pub fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, query: &PageQuery) {
    qb.push(" LIMIT ")
        .push_bind(i64::from(query.limit()))
        .push(" OFFSET ")
        .push_bind(query.offset());
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
