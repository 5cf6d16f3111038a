use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{Source, Testimonial, DEFAULT_REVIEW_TYPE, MAX_RATING};

/// A feedback form submission before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub review: String,
    pub rating: i64,
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub review_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Required fields left blank, in form order.
    MissingFields(Vec<&'static str>),
    RatingOutOfRange(i64),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Self::RatingOutOfRange(r) => {
                write!(f, "rating {r} out of range (expected 1-{MAX_RATING})")
            }
        }
    }
}

impl std::error::Error for SubmissionError {}

impl Submission {
    /// Validate and convert to a published record dated `today`.
    pub fn into_testimonial(self, today: NaiveDate) -> Result<Testimonial, SubmissionError> {
        let mut missing = Vec::new();
        if self.review.trim().is_empty() {
            missing.push("review");
        }
        if self.rating == 0 {
            missing.push("rating");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.mobile.trim().is_empty() {
            missing.push("mobile");
        }
        if !missing.is_empty() {
            return Err(SubmissionError::MissingFields(missing));
        }
        if !(1..=MAX_RATING).contains(&self.rating) {
            return Err(SubmissionError::RatingOutOfRange(self.rating));
        }

        let review_type = self
            .review_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_REVIEW_TYPE.to_string());
        let date = today.format("%Y-%m-%d").to_string();

        Ok(Testimonial {
            date: Some(date.clone()),
            date_raw: date,
            review_type,
            review: self.review.trim().to_string(),
            rating: self.rating,
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            source: Source::WebSubmission,
            published: true,
        })
    }
}
