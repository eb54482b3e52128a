//! Fixed relevance policy used by the relational backend.
//!
//! The document backend ranks by the engine's own score instead; the two
//! orderings are not expected to agree.

pub const RATING_WEIGHT: f64 = 2.0;
pub const REVIEW_WEIGHT: f64 = 1.5;
pub const VERIFIED_BONUS: f64 = 5.0;

/// `rating * 2.0 + ln(1 + review_count) * 1.5 + (verified ? 5.0 : 0.0)`.
///
/// A missing rating counts as zero and negative review counts are clamped
/// to zero, matching the SQL expression built from the same constants.
#[must_use]
pub fn relevance_score(rating: Option<f64>, review_count: i32, verified: bool) -> f64 {
    let rating = rating.unwrap_or(0.0);
    let reviews = f64::from(review_count.max(0));
    let bonus = if verified { VERIFIED_BONUS } else { 0.0 };

    rating * RATING_WEIGHT + reviews.ln_1p() * REVIEW_WEIGHT + bonus
}
