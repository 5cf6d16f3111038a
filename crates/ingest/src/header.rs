//! Header resolution: canonical testimonial fields → column positions.
//!
//! Resolution runs an ordered rule list against the lower-cased first row.
//! `ReviewType` is resolved before `Review`, and the `Review` predicate
//! rejects any header containing "type", so a sheet holding both
//! "Review Type" and "Review" always maps them to different columns.
//!
//! Each rule prefers, in order: an exact header name, a column no other
//! rule would accept, then any column its predicate accepts. A literal
//! "Review" therefore beats "Reviewer", and "Review Date" stays available
//! to the date rule.

use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Date,
    ReviewType,
    Review,
    Rating,
    Name,
    Mobile,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::ReviewType => "reviewType",
            Self::Review => "review",
            Self::Rating => "rating",
            Self::Name => "name",
            Self::Mobile => "mobile",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Mobile)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct HeaderRule {
    field: Field,
    /// Lower-cased headers that match outright.
    exact: &'static [&'static str],
    matches: fn(&str) -> bool,
}

impl HeaderRule {
    /// Column this rule claims among the unclaimed ones, if any.
    fn pick(&self, lowered: &[String], claimed: &[bool]) -> Option<usize> {
        let open = |i: usize| !claimed[i];
        let contested = |h: &str| RULES.iter().any(|r| r.field != self.field && (r.matches)(h));

        let first = |accept: &dyn Fn(&str) -> bool| {
            lowered
                .iter()
                .enumerate()
                .find(|(i, h)| open(*i) && accept(h.as_str()))
                .map(|(i, _)| i)
        };

        first(&|h: &str| self.exact.contains(&h))
            .or_else(|| first(&|h: &str| (self.matches)(h) && !contested(h)))
            .or_else(|| first(&|h: &str| (self.matches)(h)))
    }
}

/// Evaluated top to bottom; each rule claims one unclaimed column.
const RULES: &[HeaderRule] = &[
    HeaderRule {
        field: Field::ReviewType,
        exact: &["review type", "review_type", "reviewtype"],
        matches: |h: &str| h.contains("review type") || h.contains("review_type") || h.contains("reviewtype"),
    },
    HeaderRule {
        field: Field::Review,
        exact: &["review"],
        matches: |h: &str| h == "review" || (h.contains("review") && !h.contains("type")),
    },
    HeaderRule {
        field: Field::Date,
        exact: &["date"],
        matches: |h: &str| h.contains("date"),
    },
    HeaderRule {
        field: Field::Rating,
        exact: &["rating"],
        matches: |h: &str| h.contains("rating"),
    },
    HeaderRule {
        field: Field::Name,
        exact: &["name", "full name", "your name"],
        matches: |h: &str| h == "name" || h == "full name" || h == "your name",
    },
    HeaderRule {
        field: Field::Mobile,
        exact: &["mobile", "mobile number", "phone"],
        matches: |h: &str| h.contains("mobile") || h.contains("phone"),
    },
];

/// Column positions for the canonical fields of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    pub date: usize,
    pub review_type: usize,
    pub review: usize,
    pub rating: usize,
    pub name: usize,
    pub mobile: Option<usize>,
}

impl HeaderMap {
    /// Resolve every field from a header row. Fails with the full list of
    /// unresolved mandatory fields.
    pub fn resolve(header: &[String]) -> Result<Self, IngestError> {
        let lowered: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = vec![false; lowered.len()];
        let mut found: Vec<(Field, usize)> = Vec::with_capacity(RULES.len());

        for rule in RULES {
            if let Some(i) = rule.pick(&lowered, &claimed) {
                claimed[i] = true;
                found.push((rule.field, i));
            }
        }

        let get = |field: Field| found.iter().find(|(f, _)| *f == field).map(|(_, i)| *i);

        let missing: Vec<String> = RULES
            .iter()
            .map(|r| r.field)
            .filter(|f| f.is_required() && get(*f).is_none())
            .map(|f| f.to_string())
            .collect();

        match (get(Field::Date), get(Field::ReviewType), get(Field::Review), get(Field::Rating), get(Field::Name)) {
            (Some(date), Some(review_type), Some(review), Some(rating), Some(name)) => Ok(Self {
                date,
                review_type,
                review,
                rating,
                name,
                mobile: get(Field::Mobile),
            }),
            _ => Err(IngestError::MissingColumns { missing }),
        }
    }

    /// Column layout of the published feedback sheet:
    /// A date, B review type, C review, D rating, E name, F mobile.
    pub fn positional() -> Self {
        Self {
            date: 0,
            review_type: 1,
            review: 2,
            rating: 3,
            name: 4,
            mobile: Some(5),
        }
    }

    /// Display paths tolerate unexpected headers by falling back to the
    /// published sheet's positional layout.
    pub fn resolve_or_positional(header: &[String]) -> Self {
        match Self::resolve(header) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("{e}; falling back to positional columns");
                Self::positional()
            }
        }
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        match field {
            Field::Date => Some(self.date),
            Field::ReviewType => Some(self.review_type),
            Field::Review => Some(self.review),
            Field::Rating => Some(self.rating),
            Field::Name => Some(self.name),
            Field::Mobile => self.mobile,
        }
    }

    /// Cell text for `field`, or `""` when the column is absent or the row
    /// is short.
    pub fn cell<'a>(&self, row: &'a [String], field: Field) -> &'a str {
        self.index_of(field)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}
