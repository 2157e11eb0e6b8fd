//! Listing filter criteria and their construction from query parameters.
//!
//! Each recognized key maps to exactly one comparison; unrecognized keys are
//! ignored at the boundary. An empty mapping yields the unfiltered listing.

use std::collections::HashMap;

use time::{Date, macros::format_description};

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Optional listing criteria, combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Case-insensitive substring match against the title.
    pub title_contains: Option<String>,
    /// Case-insensitive substring match against the body text.
    pub text_contains: Option<String>,
    /// Strict upper bound on cost; rows without a cost never match.
    pub cost_lt: Option<i64>,
    /// Strict lower bound on the publication date.
    pub pub_date_after: Option<Date>,
    /// Strict upper bound on the end date.
    pub end_date_before: Option<Date>,
}

impl PostFilter {
    /// Build a filter from a flat query-parameter mapping.
    ///
    /// Recognized keys: `title`, `text`, `cost_lt`, `date_start`, `date_end`.
    /// Values that fail to parse are treated the same as absent ones.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut filter = Self::default();
        if let Some(value) = non_blank(params.get("title")) {
            filter.title_contains = Some(value);
        }
        if let Some(value) = non_blank(params.get("text")) {
            filter.text_contains = Some(value);
        }
        if let Some(value) = non_blank(params.get("cost_lt")) {
            filter.cost_lt = value.parse().ok();
        }
        if let Some(value) = non_blank(params.get("date_start")) {
            filter.pub_date_after = Date::parse(&value, DATE_FORMAT).ok();
        }
        if let Some(value) = non_blank(params.get("date_end")) {
            filter.end_date_before = Date::parse(&value, DATE_FORMAT).ok();
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize the filter back into a query-string suffix so that page
    /// navigation links preserve the active criteria.
    pub fn query_suffix(&self) -> String {
        let mut parts = Vec::new();
        let mut push = |key: &str, value: String| {
            let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
            parts.push(format!("&{key}={encoded}"));
        };
        if let Some(title) = &self.title_contains {
            push("title", title.clone());
        }
        if let Some(text) = &self.text_contains {
            push("text", text.clone());
        }
        if let Some(cost) = self.cost_lt {
            push("cost_lt", cost.to_string());
        }
        if let Some(date) = self.pub_date_after {
            push("date_start", format_date(date));
        }
        if let Some(date) = self.end_date_before {
            push("date_end", format_date(date));
        }
        parts.concat()
    }
}

fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
