//! Proxy ground truth from star ratings
//!
//! Without human annotations, the star rating stands in for the true label:
//! 1-2 stars are negative, 3 is neutral, 4-5 are positive.

use crate::{Error, Label, Result};

/// Lowest valid star rating
pub const MIN_STARS: i64 = 1;
/// Highest valid star rating
pub const MAX_STARS: i64 = 5;

/// Derive the proxy label for a star rating.
///
/// Ratings outside 1..=5 are rejected with [`Error::InvalidInput`].
pub fn stars_to_label(stars: i64) -> Result<Label> {
    match stars {
        1 | 2 => Ok(Label::Negative),
        3 => Ok(Label::Neutral),
        4 | 5 => Ok(Label::Positive),
        other => Err(Error::InvalidInput(format!(
            "star rating {} outside {}..={}",
            other, MIN_STARS, MAX_STARS
        ))),
    }
}
