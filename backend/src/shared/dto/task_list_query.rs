use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::{error::ApiError, task::Task};

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;
const DEFAULT_RECENT_DAYS: i64 = 7;

/// Raw query string of `GET /tasks`. Everything arrives as text and is
/// parsed leniently: bad or missing values fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskListQuery {
    pub filter: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFilter {
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Parsed form of [`TaskListQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: Option<CompletionFilter>,
    /// Lowercased search needle; `None` when absent or blank.
    pub search: Option<String>,
    pub page: usize,
    pub limit: usize,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            filter: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl TaskListQuery {
    pub fn parse(&self) -> TaskQuery {
        let filter = match self.filter.as_deref() {
            Some("active") => Some(CompletionFilter::Active),
            Some("completed") => Some(CompletionFilter::Completed),
            _ => None,
        };
        let sort = match self.sort.as_deref() {
            Some("updatedAt") => SortField::UpdatedAt,
            Some("dueDate") => SortField::DueDate,
            Some("priority") => SortField::Priority,
            Some("title") => SortField::Title,
            _ => SortField::CreatedAt,
        };
        let order = match self.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        TaskQuery {
            filter,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            page: positive_or(self.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(self.limit.as_deref(), DEFAULT_LIMIT),
            sort,
            order,
        }
    }
}

impl TaskQuery {
    /// The filter predicate: completion constraint AND search, each only
    /// when present.
    pub fn matches(&self, task: &Task) -> bool {
        let completion = match self.filter {
            Some(CompletionFilter::Active) => !task.completed,
            Some(CompletionFilter::Completed) => task.completed,
            None => true,
        };
        completion
            && self
                .search
                .as_deref()
                .map_or(true, |needle| task.matches_search(needle))
    }
}

impl SortField {
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            // Tasks without a due date sort before any dated task.
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::Title => a.title.cmp(&b.title),
        }
    }
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// `GET /tasks/due-range?start=..&end=..`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DueRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DueRangeQuery {
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        let (Some(start), Some(end)) = (non_blank(&self.start), non_blank(&self.end)) else {
            return Err(ApiError::InvalidInput(
                "Start and end dates are required".to_string(),
            ));
        };
        Ok((parse_date(start)?, parse_date(end)?))
    }
}

/// `GET /tasks/stats/recent?days=N`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecentQuery {
    pub days: Option<String>,
}

impl RecentQuery {
    pub fn days(&self) -> i64 {
        self.days
            .as_deref()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .filter(|d| *d >= 1)
            .unwrap_or(DEFAULT_RECENT_DAYS)
    }
}

fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .ok_or_else(|| ApiError::InvalidInput(format!("Invalid date: {raw}")))
}
