//! Incremental listing query.
//!
//! Restrictions accumulate as AND-combined clauses, each carrying its bound
//! values. Column names come from the [`Column`] whitelist and every user
//! value travels as a parameter, so rendering never splices input into SQL.

use rusqlite::types::{ToSql, ToSqlOutput};

use crate::models::PublicationState;

/// Every column of the `listings` table, in row-mapping order
pub const LISTING_COLUMNS: &str = "id, code, title, description, category, transaction_type, \
     price_usd, price_ars, address, locality, region, country, accepts_pets, pet_type, \
     total_area, covered_area, bedrooms, bathrooms, garages, age_years, amenities, \
     main_image, featured, state, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Code,
    Title,
    Description,
    Category,
    Transaction,
    PriceUsd,
    PriceArs,
    Locality,
    Region,
    Amenities,
    Bedrooms,
    Bathrooms,
    Garages,
    Featured,
    State,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Code => "code",
            Column::Title => "title",
            Column::Description => "description",
            Column::Category => "category",
            Column::Transaction => "transaction_type",
            Column::PriceUsd => "price_usd",
            Column::PriceArs => "price_ars",
            Column::Locality => "locality",
            Column::Region => "region",
            Column::Amenities => "amenities",
            Column::Bedrooms => "bedrooms",
            Column::Bathrooms => "bathrooms",
            Column::Garages => "garages",
            Column::Featured => "featured",
            Column::State => "state",
        }
    }
}

/// Bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Text(s) => s.to_sql(),
            SqlValue::Integer(i) => i.to_sql(),
            SqlValue::Real(f) => f.to_sql(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

/// SQL fragment with `?` placeholders and the values that fill them
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Clause {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn eq(column: Column, value: impl Into<SqlValue>) -> Self {
        Self::new(format!("{} = ?", column.name()), vec![value.into()])
    }

    pub fn gte(column: Column, value: impl Into<SqlValue>) -> Self {
        Self::new(format!("{} >= ?", column.name()), vec![value.into()])
    }

    pub fn lte(column: Column, value: impl Into<SqlValue>) -> Self {
        Self::new(format!("{} <= ?", column.name()), vec![value.into()])
    }

    pub fn not_null(column: Column) -> Self {
        Self::new(format!("{} IS NOT NULL", column.name()), Vec::new())
    }

    /// Normalized `column` contains the already-normalized `needle`
    pub fn contains(column: Column, needle: &str) -> Self {
        Self::new(
            format!("instr(norm({}), ?) > 0", column.name()),
            vec![needle.into()],
        )
    }

    /// At least one of `needles` appears in at least one of `columns`
    pub fn contains_any(columns: &[Column], needles: &[String]) -> Self {
        let mut parts = Vec::new();
        let mut params = Vec::new();
        for needle in needles {
            for column in columns {
                parts.push(format!("instr(norm({}), ?) > 0", column.name()));
                params.push(SqlValue::Text(needle.clone()));
            }
        }
        if parts.is_empty() {
            return Self::new("1 = 1", Vec::new());
        }
        Self::new(format!("({})", parts.join(" OR ")), params)
    }

    /// Best trigram similarity between `needle` and any of `columns`
    pub fn best_similarity(columns: &[Column], needle: &str) -> Self {
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("similarity(?, norm({}))", c.name()))
            .collect();
        let sql = match parts.len() {
            0 => "0.0".to_string(),
            1 => parts[0].clone(),
            _ => format!("max({})", parts.join(", ")),
        };
        let params = columns.iter().map(|_| SqlValue::from(needle)).collect();
        Self::new(sql, params)
    }
}

/// Ranking used when rendering the final statement
#[derive(Debug, Clone, PartialEq)]
struct Score {
    expr: Clause,
    min: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingQuery {
    predicates: Vec<Clause>,
    score: Option<Score>,
}

impl ListingQuery {
    /// Every listing, no restriction
    pub fn all() -> Self {
        Self::default()
    }

    /// The public base collection
    pub fn published() -> Self {
        let mut query = Self::default();
        query.filter(Clause::eq(Column::State, PublicationState::Published.code()));
        query
    }

    pub fn filter(&mut self, clause: Clause) -> &mut Self {
        self.predicates.push(clause);
        self
    }

    pub fn extend(&mut self, clauses: impl IntoIterator<Item = Clause>) -> &mut Self {
        self.predicates.extend(clauses);
        self
    }

    /// Keep rows whose `expr` is at least `min` and rank them by it
    pub fn rank_by(&mut self, expr: Clause, min: f64) -> &mut Self {
        self.score = Some(Score { expr, min });
        self
    }

    pub fn is_ranked(&self) -> bool {
        self.score.is_some()
    }

    fn where_clause(&self) -> (String, Vec<SqlValue>) {
        if self.predicates.is_empty() {
            return (String::new(), Vec::new());
        }
        let sql = self
            .predicates
            .iter()
            .map(|c| c.sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");
        let params = self
            .predicates
            .iter()
            .flat_map(|c| c.params.iter().cloned())
            .collect();
        (format!(" WHERE {sql}"), params)
    }

    /// `SELECT COUNT(*)` over the same restrictions
    pub fn count_sql(&self) -> (String, Vec<SqlValue>) {
        let (where_sql, where_params) = self.where_clause();
        match &self.score {
            None => (format!("SELECT COUNT(*) FROM listings{where_sql}"), where_params),
            Some(score) => {
                let mut params = score.expr.params.clone();
                params.extend(where_params);
                params.push(SqlValue::Real(score.min));
                (
                    format!(
                        "SELECT COUNT(*) FROM (SELECT {} AS score FROM listings{where_sql}) \
                         WHERE score >= ?",
                        score.expr.sql
                    ),
                    params,
                )
            }
        }
    }

    /// Ordered page of rows. Unranked queries sort newest update first;
    /// ranked ones by score, then newest update.
    pub fn select_sql(&self, limit: i64, offset: i64) -> (String, Vec<SqlValue>) {
        let (where_sql, where_params) = self.where_clause();
        let (sql, mut params) = match &self.score {
            None => (
                format!(
                    "SELECT {LISTING_COLUMNS} FROM listings{where_sql} \
                     ORDER BY updated_at DESC, id DESC LIMIT ? OFFSET ?"
                ),
                where_params,
            ),
            Some(score) => {
                let mut params = score.expr.params.clone();
                params.extend(where_params);
                params.push(SqlValue::Real(score.min));
                (
                    format!(
                        "SELECT * FROM (SELECT {LISTING_COLUMNS}, {} AS score FROM listings{where_sql}) \
                         WHERE score >= ? ORDER BY score DESC, updated_at DESC, id DESC LIMIT ? OFFSET ?",
                        score.expr.sql
                    ),
                    params,
                )
            }
        };
        params.push(SqlValue::Integer(limit));
        params.push(SqlValue::Integer(offset));
        (sql, params)
    }
}
