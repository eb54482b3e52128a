//! Compiles [`SearchParameters`] into parameterized Postgres SQL.
//!
//! Compilation is pure: no connection is touched, so the produced SQL and
//! argument list can be asserted on directly. Every user-supplied value
//! travels as a positional argument, never as SQL text.

use salonsearch_core::geo::EARTH_RADIUS_KM;
use salonsearch_core::ranking::{RATING_WEIGHT, REVIEW_WEIGHT, VERIFIED_BONUS};
use salonsearch_core::{GeoPoint, SearchParameters, SortBy};

/// Columns shared by every salon read. `c` is the joined `categories` row.
pub(crate) const SALON_COLUMNS: &str = "s.id, s.name, s.slug, s.description, \
     s.address, s.city, s.state, s.postal_code, s.country, \
     s.latitude, s.longitude, s.phone, s.email, s.website, \
     s.category_id, c.name AS category_name, s.price_range, s.rating, \
     s.review_count, s.is_active, s.is_verified, s.created_at, s.updated_at";

/// Text search configuration used for both the index expression and queries.
const TEXT_SEARCH_CONFIG: &str = "spanish";

/// A typed positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    BigInt(i64),
    SmallInt(i16),
    Double(f64),
}

/// A search compiled into a page query and its matching count query.
///
/// `select_args` binds in order to `select_sql` and ends with limit and
/// offset. `count_args` binds to `count_sql`, which applies the same filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSearch {
    pub select_sql: String,
    pub select_args: Vec<SqlArg>,
    pub count_sql: String,
    pub count_args: Vec<SqlArg>,
    pub offset: i64,
}

#[derive(Default)]
struct Builder {
    clauses: String,
    args: Vec<SqlArg>,
}

impl Builder {
    /// Appends an argument and returns its 1-based placeholder number.
    fn arg(&mut self, value: SqlArg) -> usize {
        self.args.push(value);
        self.args.len()
    }

    fn and(&mut self, clause: &str) {
        self.clauses.push_str(" AND ");
        self.clauses.push_str(clause);
    }
}

/// Great-circle distance in kilometres from the salon to the point bound at
/// `$lat`/`$lon`. NULL when the salon has no coordinates.
fn distance_sql(lat: usize, lon: usize) -> String {
    format!(
        "({EARTH_RADIUS_KM:.1} * 2.0 * ASIN(LEAST(1.0, SQRT(\
         POWER(SIN(RADIANS(s.latitude - ${lat}::float8) / 2.0), 2) + \
         COS(RADIANS(${lat}::float8)) * COS(RADIANS(s.latitude)) * \
         POWER(SIN(RADIANS(s.longitude - ${lon}::float8) / 2.0), 2)))))"
    )
}

fn relevance_sql() -> String {
    format!(
        "(COALESCE(s.rating, 0) * {RATING_WEIGHT:.1} \
         + LN(1 + GREATEST(s.review_count, 0)) * {REVIEW_WEIGHT:.1} \
         + CASE WHEN s.is_verified THEN {VERIFIED_BONUS:.1} ELSE 0 END)"
    )
}

fn order_by(sort: SortBy) -> String {
    let primary = match sort {
        SortBy::Relevance => format!("{} DESC", relevance_sql()),
        SortBy::Rating => "s.rating DESC NULLS LAST, s.review_count DESC".to_string(),
        SortBy::Reviews => "s.review_count DESC, s.rating DESC NULLS LAST".to_string(),
        SortBy::Newest => "s.created_at DESC".to_string(),
        SortBy::Distance => "distance_km ASC NULLS LAST".to_string(),
    };
    format!("{primary}, s.id ASC")
}

/// Builds the page and count queries for `params`.
///
/// Filters are ANDed in a fixed order (text, city, category, price tier,
/// minimum rating, verified, radius) on top of `s.is_active = TRUE`.
#[must_use]
pub fn compile_search(params: &SearchParameters) -> CompiledSearch {
    let mut b = Builder::default();
    let mut center_args: Option<(usize, usize)> = None;

    if let Some(q) = params.query() {
        let n = b.arg(SqlArg::Text(q.to_string()));
        b.and(&format!(
            "to_tsvector('{TEXT_SEARCH_CONFIG}', coalesce(s.name, '') || ' ' || coalesce(s.description, '')) \
             @@ plainto_tsquery('{TEXT_SEARCH_CONFIG}', ${n})"
        ));
    }

    if let Some(city) = params.city() {
        let n = b.arg(SqlArg::Text(city.to_string()));
        b.and(&format!("LOWER(s.city) = LOWER(${n})"));
    }

    if let Some(category_id) = params.category_id() {
        let n = b.arg(SqlArg::BigInt(category_id));
        b.and(&format!("s.category_id = ${n}"));
    }

    if let Some(tier) = params.price_tier() {
        let n = b.arg(SqlArg::SmallInt(tier.0));
        b.and(&format!("s.price_range = ${n}"));
    }

    if let Some(min_rating) = params.min_rating() {
        let n = b.arg(SqlArg::Double(min_rating));
        b.and(&format!("s.rating >= ${n}"));
    }

    if params.verified_only() {
        b.and("s.is_verified = TRUE");
    }

    if let Some((center, radius_km)) = params.geo_radius() {
        let (lat, lon) = push_center(&mut b, center);
        let r = b.arg(SqlArg::Double(radius_km));
        b.and(&format!(
            "s.latitude IS NOT NULL AND s.longitude IS NOT NULL AND {} <= ${r}::float8",
            distance_sql(lat, lon)
        ));
        center_args = Some((lat, lon));
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM salons s WHERE s.is_active = TRUE{}",
        b.clauses
    );
    let count_args = b.args.clone();

    let sort = params.effective_sort();
    let distance_column = match (sort, params.center()) {
        (SortBy::Distance, Some(center)) => {
            // The radius filter already bound the center; reuse its placeholders.
            let (lat, lon) = match center_args {
                Some(placeholders) => placeholders,
                None => push_center(&mut b, center),
            };
            distance_sql(lat, lon)
        }
        _ => "NULL::float8".to_string(),
    };

    let limit = i64::from(params.page_size());
    let offset = i64::try_from(params.offset()).unwrap_or(i64::MAX);
    let limit_n = b.arg(SqlArg::BigInt(limit));
    let offset_n = b.arg(SqlArg::BigInt(offset));

    let select_sql = format!(
        "SELECT {SALON_COLUMNS}, {distance_column} AS distance_km, \
                COUNT(*) OVER() AS total_count \
         FROM salons s \
         LEFT JOIN categories c ON c.id = s.category_id \
         WHERE s.is_active = TRUE{clauses} \
         ORDER BY {order} \
         LIMIT ${limit_n} OFFSET ${offset_n}",
        clauses = b.clauses,
        order = order_by(sort),
    );

    CompiledSearch {
        select_sql,
        select_args: b.args,
        count_sql,
        count_args,
        offset,
    }
}

fn push_center(b: &mut Builder, center: GeoPoint) -> (usize, usize) {
    let lat = b.arg(SqlArg::Double(center.latitude));
    let lon = b.arg(SqlArg::Double(center.longitude));
    (lat, lon)
}

#[cfg(test)]
#[path = "search_query_test.rs"]
mod tests;
