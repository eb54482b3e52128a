//! Salon reads: filtered search, detail lookup, reindex export and categories.

use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use salonsearch_core::{
    Amenity, Category, Contact, GeoPoint, Location, OperatingHours, PriceTier, Salon,
    SearchParameters, Service,
};
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool};

use crate::search_query::{compile_search, SqlArg, SALON_COLUMNS};
use crate::DbError;

/// A row from `salons` joined with its category name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SalonRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub price_range: Option<i16>,
    pub rating: Option<f64>,
    pub review_count: i32,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalonRow> for Salon {
    fn from(row: SalonRow) -> Self {
        Salon {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            location: Location {
                address: row.address,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                country: row.country,
                geo: row.latitude.zip(row.longitude).map(|(lat, lon)| GeoPoint::new(lat, lon)),
            },
            contact: Contact {
                phone: row.phone,
                email: row.email,
                website: row.website,
            },
            category_id: row.category_id,
            category_name: row.category_name,
            price_tier: row.price_range.map(PriceTier),
            rating: row.rating,
            review_count: row.review_count,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
            services: Vec::new(),
            amenities: Vec::new(),
            operating_hours: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SalonSearchRow {
    #[sqlx(flatten)]
    salon: SalonRow,
    distance_km: Option<f64>,
    total_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i64,
    salon_id: i64,
    name: String,
    description: Option<String>,
    price_min: Option<Decimal>,
    price_max: Option<Decimal>,
    duration_minutes: Option<i32>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            salon_id: row.salon_id,
            name: row.name,
            description: row.description,
            price_min: row.price_min,
            price_max: row.price_max,
            duration_minutes: row.duration_minutes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AmenityRow {
    salon_id: i64,
    id: i64,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct HoursRow {
    salon_id: i64,
    day_of_week: i16,
    open_time: Option<NaiveTime>,
    close_time: Option<NaiveTime>,
    is_closed: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

/// One search match with its database-computed distance, when requested.
#[derive(Debug, Clone)]
pub struct SalonHit {
    pub salon: Salon,
    pub distance_km: Option<f64>,
}

/// One page of search matches plus the total across all pages.
#[derive(Debug, Clone)]
pub struct SalonPage {
    pub hits: Vec<SalonHit>,
    pub total: u64,
}

fn pg_arguments(args: &[SqlArg]) -> Result<PgArguments, DbError> {
    let mut out = PgArguments::default();
    for arg in args {
        let added = match arg {
            SqlArg::Text(v) => out.add(v.as_str()),
            SqlArg::BigInt(v) => out.add(*v),
            SqlArg::SmallInt(v) => out.add(*v),
            SqlArg::Double(v) => out.add(*v),
        };
        added.map_err(DbError::Encode)?;
    }
    Ok(out)
}

/// Run a filtered, sorted, paginated search over active salons.
///
/// The total comes from a window count on the page itself. A page past the
/// end has no rows to carry it, so a separate count query runs in that case.
///
/// # Errors
///
/// Returns [`DbError`] if argument encoding or either query fails.
pub async fn search_salons(pool: &PgPool, params: &SearchParameters) -> Result<SalonPage, DbError> {
    let compiled = compile_search(params);

    let rows = sqlx::query_as_with::<_, SalonSearchRow, _>(
        &compiled.select_sql,
        pg_arguments(&compiled.select_args)?,
    )
    .fetch_all(pool)
    .await?;

    let total = match rows.first() {
        Some(row) => row.total_count,
        None if compiled.offset > 0 => {
            sqlx::query_scalar_with::<_, i64, _>(
                &compiled.count_sql,
                pg_arguments(&compiled.count_args)?,
            )
            .fetch_one(pool)
            .await?
        }
        None => 0,
    };

    let hits = rows
        .into_iter()
        .map(|row| SalonHit {
            salon: row.salon.into(),
            distance_km: row.distance_km,
        })
        .collect();

    Ok(SalonPage {
        hits,
        total: u64::try_from(total).unwrap_or(0),
    })
}

/// Fetch one salon, active or not, with services, amenities and hours.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no salon has this id, or
/// [`DbError::Sqlx`] if any query fails.
pub async fn get_salon_by_id(pool: &PgPool, id: i64) -> Result<Salon, DbError> {
    let row = sqlx::query_as::<_, SalonRow>(&format!(
        "SELECT {SALON_COLUMNS} \
         FROM salons s \
         LEFT JOIN categories c ON c.id = s.category_id \
         WHERE s.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let mut salon = Salon::from(row);

    salon.services = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, salon_id, name, description, price_min, price_max, duration_minutes \
         FROM services \
         WHERE salon_id = $1 \
         ORDER BY name, id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Service::from)
    .collect();

    salon.amenities = sqlx::query_as::<_, AmenityRow>(
        "SELECT sa.salon_id, a.id, a.name \
         FROM amenities a \
         JOIN salon_amenities sa ON sa.amenity_id = a.id \
         WHERE sa.salon_id = $1 \
         ORDER BY a.name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|a| Amenity {
        id: a.id,
        name: a.name,
    })
    .collect();

    salon.operating_hours = sqlx::query_as::<_, HoursRow>(
        "SELECT salon_id, day_of_week, open_time, close_time, is_closed \
         FROM operating_hours \
         WHERE salon_id = $1 \
         ORDER BY day_of_week",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|h| OperatingHours {
        salon_id: h.salon_id,
        day_of_week: h.day_of_week,
        open_time: h.open_time,
        close_time: h.close_time,
        is_closed: h.is_closed,
    })
    .collect();

    Ok(salon)
}

/// Export every active salon with its services and amenities, ordered by id.
///
/// Children are loaded with one batched query per table rather than per salon.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn export_active_salons(pool: &PgPool) -> Result<Vec<Salon>, DbError> {
    let rows = sqlx::query_as::<_, SalonRow>(&format!(
        "SELECT {SALON_COLUMNS} \
         FROM salons s \
         LEFT JOIN categories c ON c.id = s.category_id \
         WHERE s.is_active = TRUE \
         ORDER BY s.id"
    ))
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut services: HashMap<i64, Vec<Service>> = HashMap::new();
    for row in sqlx::query_as::<_, ServiceRow>(
        "SELECT id, salon_id, name, description, price_min, price_max, duration_minutes \
         FROM services \
         WHERE salon_id = ANY($1) \
         ORDER BY salon_id, name, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?
    {
        services.entry(row.salon_id).or_default().push(row.into());
    }

    let mut amenities: HashMap<i64, Vec<Amenity>> = HashMap::new();
    for row in sqlx::query_as::<_, AmenityRow>(
        "SELECT sa.salon_id, a.id, a.name \
         FROM amenities a \
         JOIN salon_amenities sa ON sa.amenity_id = a.id \
         WHERE sa.salon_id = ANY($1) \
         ORDER BY sa.salon_id, a.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?
    {
        amenities.entry(row.salon_id).or_default().push(Amenity {
            id: row.id,
            name: row.name,
        });
    }

    let salons: Vec<Salon> = rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            let mut salon = Salon::from(row);
            salon.services = services.remove(&id).unwrap_or_default();
            salon.amenities = amenities.remove(&id).unwrap_or_default();
            salon
        })
        .collect();

    tracing::debug!(count = salons.len(), "exported active salons");
    Ok(salons)
}

/// All categories, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, created_at FROM categories ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Category {
            id: r.id,
            name: r.name,
            slug: r.slug,
            created_at: r.created_at,
        })
        .collect())
}
