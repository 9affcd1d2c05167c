//! Row filters shared by `/api/reviews` and `/api/summary`

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rsm_common::review::LabeledReview;

use crate::{ApiError, ApiResult};

/// Query parameters: `?city=..&restaurant=..&stars=1,2`
///
/// Empty parameters mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub city: Option<String>,
    pub restaurant: Option<String>,
    /// Comma-separated star ratings
    pub stars: Option<String>,
}

/// Parsed filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub city: Option<String>,
    pub restaurant: Option<String>,
    pub stars: Option<Vec<i64>>,
}

impl ReviewFilter {
    pub fn from_query(query: &FilterQuery) -> ApiResult<Self> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let stars = match non_empty(&query.stars) {
            Some(list) => Some(
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<i64>().map_err(|_| {
                            ApiError::BadRequest(format!("stars: '{}' is not an integer", s))
                        })
                    })
                    .collect::<ApiResult<Vec<i64>>>()?,
            ),
            None => None,
        };

        Ok(Self {
            city: non_empty(&query.city),
            restaurant: non_empty(&query.restaurant),
            stars,
        })
    }

    pub fn matches(&self, review: &LabeledReview) -> bool {
        let r = &review.review;
        self.city.as_ref().map_or(true, |c| &r.city == c)
            && self
                .restaurant
                .as_ref()
                .map_or(true, |n| &r.restaurant_name == n)
            && self.stars.as_ref().map_or(true, |s| s.contains(&r.stars))
    }

    /// Matching rows with their dataset row index
    pub fn apply<'a>(
        &'a self,
        reviews: &'a [LabeledReview],
    ) -> impl Iterator<Item = (usize, &'a LabeledReview)> + 'a {
        reviews
            .iter()
            .enumerate()
            .filter(move |(_, r)| self.matches(r))
    }
}

/// Distinct values available for filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub restaurants: Vec<String>,
    pub stars: Vec<i64>,
}

impl FilterOptions {
    pub fn from_reviews(reviews: &[LabeledReview]) -> Self {
        let mut cities = BTreeSet::new();
        let mut restaurants = BTreeSet::new();
        let mut stars = BTreeSet::new();
        for r in reviews {
            cities.insert(r.review.city.clone());
            restaurants.insert(r.review.restaurant_name.clone());
            stars.insert(r.review.stars);
        }
        Self {
            cities: cities.into_iter().collect(),
            restaurants: restaurants.into_iter().collect(),
            stars: stars.into_iter().collect(),
        }
    }
}
