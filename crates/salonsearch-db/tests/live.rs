//! Live integration tests for salonsearch-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/salonsearch-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use salonsearch_core::{relevance_score, SearchParameters, SearchRequest};
use salonsearch_db::{
    export_active_salons, get_salon_by_id, list_categories, search_salons, DbError,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct SalonSeed<'a> {
    name: &'a str,
    slug: &'a str,
    description: Option<&'a str>,
    city: &'a str,
    coords: Option<(f64, f64)>,
    category_id: Option<i64>,
    price_range: Option<i16>,
    rating: Option<f64>,
    review_count: i32,
    is_active: bool,
    is_verified: bool,
}

async fn insert_category(pool: &PgPool, name: &str, slug: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(slug)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("insert_category failed for '{slug}': {e}"))
}

async fn insert_salon(pool: &PgPool, seed: &SalonSeed<'_>) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO salons \
             (name, slug, description, city, country, latitude, longitude, category_id, \
              price_range, rating, review_count, is_active, is_verified) \
         VALUES ($1, $2, $3, $4, 'Argentina', $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING id",
    )
    .bind(seed.name)
    .bind(seed.slug)
    .bind(seed.description)
    .bind(seed.city)
    .bind(seed.coords.map(|c| c.0))
    .bind(seed.coords.map(|c| c.1))
    .bind(seed.category_id)
    .bind(seed.price_range)
    .bind(seed.rating)
    .bind(seed.review_count)
    .bind(seed.is_active)
    .bind(seed.is_verified)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_salon failed for '{}': {e}", seed.slug))
}

struct Fixture {
    estilo_mar: i64,
    belleza_costera: i64,
    porteno: i64,
    cerrado: i64,
    sin_coordenadas: i64,
}

/// Three active salons in Mar del Plata (one without coordinates), one in
/// Buenos Aires, and one inactive salon in Mar del Plata.
async fn seed(pool: &PgPool) -> Fixture {
    let peluqueria = insert_category(pool, "Peluquería", "peluqueria").await;
    let spa = insert_category(pool, "Spa", "spa").await;

    let base = SalonSeed {
        name: "",
        slug: "",
        description: None,
        city: "Mar del Plata",
        coords: None,
        category_id: None,
        price_range: None,
        rating: None,
        review_count: 0,
        is_active: true,
        is_verified: false,
    };

    let estilo_mar = insert_salon(
        pool,
        &SalonSeed {
            name: "Estilo Mar",
            slug: "estilo-mar",
            description: Some("Cortes y coloración profesional"),
            coords: Some((-38.0055, -57.5426)),
            category_id: Some(peluqueria),
            price_range: Some(2),
            rating: Some(4.8),
            review_count: 120,
            is_verified: true,
            ..base
        },
    )
    .await;

    let belleza_costera = insert_salon(
        pool,
        &SalonSeed {
            name: "Belleza Costera",
            slug: "belleza-costera",
            description: Some("Manicura, masajes y tratamientos faciales"),
            coords: Some((-38.0100, -57.5500)),
            category_id: Some(spa),
            price_range: Some(3),
            rating: Some(4.2),
            review_count: 40,
            ..base
        },
    )
    .await;

    let porteno = insert_salon(
        pool,
        &SalonSeed {
            name: "Porteño Style",
            slug: "porteno-style",
            description: Some("Coloración y barbería en Palermo"),
            city: "Buenos Aires",
            coords: Some((-34.6037, -58.3816)),
            category_id: Some(peluqueria),
            price_range: Some(4),
            rating: Some(4.9),
            review_count: 300,
            is_verified: true,
            ..base
        },
    )
    .await;

    let cerrado = insert_salon(
        pool,
        &SalonSeed {
            name: "Cerrado Definitivo",
            slug: "cerrado-definitivo",
            coords: Some((-38.0060, -57.5430)),
            rating: Some(5.0),
            review_count: 999,
            is_active: false,
            is_verified: true,
            ..base
        },
    )
    .await;

    let sin_coordenadas = insert_salon(
        pool,
        &SalonSeed {
            name: "Sin Coordenadas",
            slug: "sin-coordenadas",
            ..base
        },
    )
    .await;

    Fixture {
        estilo_mar,
        belleza_costera,
        porteno,
        cerrado,
        sin_coordenadas,
    }
}

fn params(req: SearchRequest) -> SearchParameters {
    SearchParameters::try_from(req).expect("valid request")
}

fn ids(page: &salonsearch_db::SalonPage) -> Vec<i64> {
    page.hits.iter().map(|h| h.salon.id).collect()
}

// ---------------------------------------------------------------------------
// search_salons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn city_filter_is_case_insensitive_and_excludes_inactive(pool: PgPool) {
    let f = seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            city: Some("mar del plata".to_string()),
            sort: Some("rating".to_string()),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert_eq!(page.total, 3);
    assert_eq!(
        ids(&page),
        vec![f.estilo_mar, f.belleza_costera, f.sin_coordenadas],
        "rating desc with unrated salons last"
    );
    assert!(!ids(&page).contains(&f.cerrado));
    assert!(page.hits.iter().all(|h| h.distance_km.is_none()));
}

#[sqlx::test(migrations = "../../migrations")]
async fn empty_search_returns_every_active_salon(pool: PgPool) {
    let f = seed(&pool).await;

    let page = search_salons(&pool, &params(SearchRequest::default()))
        .await
        .expect("search");

    assert_eq!(page.total, 4);
    assert!(!ids(&page).contains(&f.cerrado));
}

#[sqlx::test(migrations = "../../migrations")]
async fn full_text_matches_spanish_description(pool: PgPool) {
    let f = seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            q: Some("coloración".to_string()),
            city: Some("Mar del Plata".to_string()),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert_eq!(ids(&page), vec![f.estilo_mar]);
    assert_eq!(page.total, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn radius_filter_skips_salons_without_coordinates(pool: PgPool) {
    let f = seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            lat: Some(-38.0055),
            lon: Some(-57.5426),
            radius: Some(5.0),
            sort: Some("distance".to_string()),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert_eq!(ids(&page), vec![f.estilo_mar, f.belleza_costera]);
    let first = page.hits[0].distance_km.expect("distance present");
    let second = page.hits[1].distance_km.expect("distance present");
    assert!(first < 0.01, "center salon should be ~0 km, got {first}");
    assert!(second > first && second < 5.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn min_rating_and_verified_filters(pool: PgPool) {
    let f = seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            min_rating: Some(4.5),
            verified: Some(true),
            sort: Some("reviews".to_string()),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert_eq!(ids(&page), vec![f.porteno, f.estilo_mar]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn category_and_price_filters(pool: PgPool) {
    let f = seed(&pool).await;
    let categories = list_categories(&pool).await.expect("categories");
    let spa = categories
        .iter()
        .find(|c| c.slug == "spa")
        .expect("spa category")
        .id;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            category: Some(spa),
            price_range: Some(3),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert_eq!(ids(&page), vec![f.belleza_costera]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn page_past_the_end_still_reports_total(pool: PgPool) {
    seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            city: Some("Mar del Plata".to_string()),
            page: Some(5),
            page_size: Some(2),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    assert!(page.hits.is_empty());
    assert_eq!(page.total, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn pagination_is_stable_across_pages(pool: PgPool) {
    seed(&pool).await;

    let mut seen = Vec::new();
    for page_no in 1..=2 {
        let page = search_salons(
            &pool,
            &params(SearchRequest {
                page: Some(page_no),
                page_size: Some(2),
                ..SearchRequest::default()
            }),
        )
        .await
        .expect("search");
        assert_eq!(page.total, 4);
        seen.extend(ids(&page));
    }

    let mut deduped = seen.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), 4, "pages must not overlap: {seen:?}");
}

// ---------------------------------------------------------------------------
// get_salon_by_id
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn get_salon_by_id_loads_children(pool: PgPool) {
    let f = seed(&pool).await;

    sqlx::query(
        "INSERT INTO services (salon_id, name, price_min, price_max, duration_minutes) \
         VALUES ($1, 'Corte', 30.00, 50.00, 45), ($1, 'Coloración', 80.00, NULL, 120)",
    )
    .bind(f.estilo_mar)
    .execute(&pool)
    .await
    .expect("insert services");

    let wifi: i64 =
        sqlx::query_scalar("INSERT INTO amenities (name) VALUES ('WiFi') RETURNING id")
            .fetch_one(&pool)
            .await
            .expect("insert amenity");
    sqlx::query("INSERT INTO salon_amenities (salon_id, amenity_id) VALUES ($1, $2)")
        .bind(f.estilo_mar)
        .bind(wifi)
        .execute(&pool)
        .await
        .expect("link amenity");

    sqlx::query(
        "INSERT INTO operating_hours (salon_id, day_of_week, open_time, close_time, is_closed) \
         VALUES ($1, 1, '09:00', '18:00', FALSE), ($1, 0, NULL, NULL, TRUE)",
    )
    .bind(f.estilo_mar)
    .execute(&pool)
    .await
    .expect("insert hours");

    let salon = get_salon_by_id(&pool, f.estilo_mar).await.expect("salon");

    assert_eq!(salon.name, "Estilo Mar");
    assert_eq!(salon.category_name.as_deref(), Some("Peluquería"));
    assert_eq!(salon.services.len(), 2);
    assert_eq!(salon.services[0].name, "Coloración");
    assert_eq!(salon.services[1].price_display(), "$30.00 - $50.00");
    assert_eq!(salon.amenities.len(), 1);
    assert_eq!(salon.amenities[0].name, "WiFi");
    assert_eq!(salon.operating_hours.len(), 2);
    assert_eq!(salon.operating_hours[0].display_hours(), "Closed");
    assert_eq!(salon.operating_hours[1].display_hours(), "09:00 - 18:00");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_salon_by_id_returns_inactive_salons(pool: PgPool) {
    let f = seed(&pool).await;
    let salon = get_salon_by_id(&pool, f.cerrado).await.expect("salon");
    assert!(!salon.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_salon_by_id_missing_is_not_found(pool: PgPool) {
    let result = get_salon_by_id(&pool, 999_999).await;
    assert!(matches!(result, Err(DbError::NotFound)), "got {result:?}");
}

// ---------------------------------------------------------------------------
// export_active_salons / list_categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn export_includes_only_active_salons_with_services(pool: PgPool) {
    let f = seed(&pool).await;

    sqlx::query("INSERT INTO services (salon_id, name) VALUES ($1, 'Masajes'), ($2, 'Corte')")
        .bind(f.belleza_costera)
        .bind(f.cerrado)
        .execute(&pool)
        .await
        .expect("insert services");

    let salons = export_active_salons(&pool).await.expect("export");
    let exported: Vec<i64> = salons.iter().map(|s| s.id).collect();

    assert_eq!(
        exported,
        vec![f.estilo_mar, f.belleza_costera, f.porteno, f.sin_coordenadas]
    );
    let costera = salons
        .iter()
        .find(|s| s.id == f.belleza_costera)
        .expect("exported");
    assert_eq!(costera.services.len(), 1);
    assert_eq!(costera.services[0].name, "Masajes");
}

#[sqlx::test(migrations = "../../migrations")]
async fn export_of_empty_table_is_empty(pool: PgPool) {
    let salons = export_active_salons(&pool).await.expect("export");
    assert!(salons.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn categories_are_ordered_by_name(pool: PgPool) {
    seed(&pool).await;
    let names: Vec<String> = list_categories(&pool)
        .await
        .expect("categories")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Peluquería".to_string(), "Spa".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn migrations_are_idempotent_and_ping_succeeds(pool: PgPool) {
    let applied = salonsearch_db::run_migrations(&pool)
        .await
        .expect("migrations");
    assert_eq!(applied, 0);
    salonsearch_db::ping(&pool).await.expect("ping");
}

// ---------------------------------------------------------------------------
// ordering policies
// ---------------------------------------------------------------------------

/// A: 5.0 with 10 reviews. B: 3.0 with 10 reviews, verified. C: unrated with
/// 1000 reviews. Creation times run C, A, B from oldest to newest.
async fn seed_ranking(pool: &PgPool) -> (i64, i64, i64) {
    let base = SalonSeed {
        name: "",
        slug: "",
        description: None,
        city: "Mar del Plata",
        coords: None,
        category_id: None,
        price_range: None,
        rating: None,
        review_count: 10,
        is_active: true,
        is_verified: false,
    };
    let a = insert_salon(
        pool,
        &SalonSeed {
            name: "Alfa",
            slug: "alfa",
            rating: Some(5.0),
            ..base
        },
    )
    .await;
    let b = insert_salon(
        pool,
        &SalonSeed {
            name: "Beta",
            slug: "beta",
            rating: Some(3.0),
            is_verified: true,
            ..base
        },
    )
    .await;
    let c = insert_salon(
        pool,
        &SalonSeed {
            name: "Gamma",
            slug: "gamma",
            review_count: 1000,
            ..base
        },
    )
    .await;

    for (id, created) in [
        (c, "2023-01-01T00:00:00Z"),
        (a, "2023-06-01T00:00:00Z"),
        (b, "2024-01-01T00:00:00Z"),
    ] {
        sqlx::query("UPDATE salons SET created_at = $2::timestamptz WHERE id = $1")
            .bind(id)
            .bind(created)
            .execute(pool)
            .await
            .expect("set created_at");
    }
    (a, b, c)
}

async fn sorted_ids(pool: &PgPool, sort: &str) -> Vec<i64> {
    let page = search_salons(
        pool,
        &params(SearchRequest {
            sort: Some(sort.to_string()),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");
    ids(&page)
}

#[sqlx::test(migrations = "../../migrations")]
async fn relevance_order_follows_weighted_score(pool: PgPool) {
    let (a, b, c) = seed_ranking(&pool).await;

    // B: 6 + 1.5 ln 11 + 5, A: 10 + 1.5 ln 11, C: 1.5 ln 1001.
    let mut expected = vec![
        (relevance_score(Some(3.0), 10, true), b),
        (relevance_score(Some(5.0), 10, false), a),
        (relevance_score(None, 1000, false), c),
    ];
    expected.sort_by(|x, y| y.0.total_cmp(&x.0));
    let expected: Vec<i64> = expected.into_iter().map(|(_, id)| id).collect();

    assert_eq!(expected, vec![b, a, c]);
    assert_eq!(sorted_ids(&pool, "relevance").await, expected);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rating_order_puts_unrated_last(pool: PgPool) {
    let (a, b, c) = seed_ranking(&pool).await;
    assert_eq!(sorted_ids(&pool, "rating").await, vec![a, b, c]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reviews_order_breaks_ties_by_rating(pool: PgPool) {
    let (a, b, c) = seed_ranking(&pool).await;
    assert_eq!(sorted_ids(&pool, "reviews").await, vec![c, a, b]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn newest_order_follows_creation_time(pool: PgPool) {
    let (a, b, c) = seed_ranking(&pool).await;
    assert_eq!(sorted_ids(&pool, "newest").await, vec![b, a, c]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn mar_del_plata_verified_top_rated(pool: PgPool) {
    let fx = seed(&pool).await;

    let page = search_salons(
        &pool,
        &params(SearchRequest {
            city: Some("Mar del Plata".to_string()),
            min_rating: Some(4.5),
            verified: Some(true),
            page: Some(1),
            page_size: Some(10),
            ..SearchRequest::default()
        }),
    )
    .await
    .expect("search");

    // Cerrado Definitivo also qualifies but is inactive.
    assert_eq!(ids(&page), vec![fx.estilo_mar]);
    assert_eq!(page.total, 1);
    for hit in &page.hits {
        assert!(hit.salon.is_active && hit.salon.is_verified);
        assert!(hit.salon.rating.unwrap_or(0.0) >= 4.5);
        assert_eq!(hit.salon.location.city.as_deref(), Some("Mar del Plata"));
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn blank_slug_is_rejected_by_schema(pool: PgPool) {
    let result = sqlx::query("INSERT INTO salons (name, slug) VALUES ('Sin Slug', '   ')")
        .execute(&pool)
        .await;
    let err = result.expect_err("blank slug must violate a check constraint");
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(ToOwned::to_owned);
    assert_eq!(constraint.as_deref(), Some("salons_slug_not_blank"));
}
