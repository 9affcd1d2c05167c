//! Review records shared by the simulator, the pipeline and the dashboard

use serde::{Deserialize, Serialize};

use crate::{clean_text, stars_to_label, Label, Result};

/// Review as served by the review simulator (`GET /reviews`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    pub review_id: String,
    pub business_id: String,
    pub restaurant_name: String,
    pub city: String,
    pub stars: i64,
    pub text: String,
    /// ISO-8601 creation time (no offset; simulator clock is UTC)
    pub created_at: String,
}

/// Cleaned review
///
/// `review_id` is assigned once by the source and never changes.
/// `text_clean` is always `clean_text(text_raw)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub restaurant_name: String,
    pub city: String,
    pub stars: i64,
    pub text_raw: String,
    pub text_clean: String,
}

impl Review {
    /// Build a cleaned review from a simulator record
    pub fn from_raw(raw: &RawReview) -> Self {
        Self {
            review_id: raw.review_id.clone(),
            restaurant_name: raw.restaurant_name.clone(),
            city: raw.city.clone(),
            stars: raw.stars,
            text_raw: raw.text.clone(),
            text_clean: clean_text(Some(&raw.text)),
        }
    }
}

/// Review with its proxy ground truth and (optionally) a model prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledReview {
    #[serde(flatten)]
    pub review: Review,
    pub label_proxy: Label,
    pub model_label: Option<Label>,
}

impl LabeledReview {
    /// Attach the star-derived proxy label.
    ///
    /// Fails when the star rating is outside 1..=5.
    pub fn from_review(review: Review) -> Result<Self> {
        let label_proxy = stars_to_label(review.stars)?;
        Ok(Self {
            review,
            label_proxy,
            model_label: None,
        })
    }

    /// Same review with `model_label` set
    pub fn with_prediction(mut self, label: Label) -> Self {
        self.model_label = Some(label);
        self
    }

    pub fn review_id(&self) -> &str {
        &self.review.review_id
    }
}
