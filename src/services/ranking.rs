use chrono::{DateTime, Utc};

/// Exponent applied to age. Raising it makes the front page churn faster.
const GRAVITY: f64 = 1.2;

/// Constant added to the vote tally so brand-new posts with a single
/// self-upvote still get a non-zero score.
const BOOST: f64 = 1.0;

/// Posts older than this are left out of the periodic score sweep. Their
/// scores are already so close to zero that re-ranking them is wasted work.
pub const RECOMPUTE_WINDOW_HOURS: i64 = 168;

/// Time-decayed popularity score.
///
/// The submitter's own upvote is discounted, so a post the author alone has
/// voted on ranks the same as one with no votes at all. The caller supplies
/// `now` so a sweep over many posts ranks them against a single instant.
pub fn compute_score(upvotes: i32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let votes = (upvotes - 1).max(0) as f64;
    let age_hours = (now - created_at).num_milliseconds() as f64 / 3_600_000.0;

    (votes + BOOST) / (age_hours + 2.0).powf(GRAVITY)
}
