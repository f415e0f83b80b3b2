//! Filter, sort and paginate stage
//!
//! Applied strictly in this order: actor-name filter, category filter, time
//! window, stable sort, page slice.

use chrono::{DateTime, Utc};
use linka_common::{EventCategory, Error};
use std::cmp::Ordering;
use std::str::FromStr;

use super::model::HistoryEvent;
use crate::pagination::{calculate_pagination, Pagination};

/// Timestamp order of the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    /// Most recent first
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidInput(format!(
                "invalid order '{}' (expected asc or desc)",
                other
            ))),
        }
    }
}

/// Validated historial request
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    /// Case-insensitive substring of the actor display name
    pub actor: Option<String>,
    pub category: Option<EventCategory>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
    /// 1-based
    pub page: u32,
    pub limit: u32,
    pub order: SortOrder,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            actor: None,
            category: None,
            from: None,
            to: None,
            page: 1,
            limit: 10,
            order: SortOrder::Desc,
        }
    }
}

/// One page of history plus counts
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub events: Vec<HistoryEvent>,
    pub pagination: Pagination,
}

/// Run the filter/sort/paginate stage over resolved events
pub fn apply_query(events: Vec<HistoryEvent>, query: &HistoryQuery) -> HistoryPage {
    let needle = query
        .actor
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<HistoryEvent> = events
        .into_iter()
        .filter(|e| match &needle {
            Some(n) => e.actor_display_name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .filter(|e| query.category.map_or(true, |c| e.category == c))
        .filter(|e| within_window(e, query.from, query.to))
        .collect();

    // Vec::sort_by is stable; equal timestamps keep merge order
    filtered.sort_by(|a, b| compare_epochs(a.epoch, b.epoch, query.order));

    let pagination = calculate_pagination(filtered.len() as u64, query.page, query.limit);
    HistoryPage {
        events: pagination.slice(filtered),
        pagination,
    }
}

/// Unparseable timestamps compare as the Unix epoch for bounds only
fn within_window(event: &HistoryEvent, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    let at = event.epoch.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    from.map_or(true, |lower| at >= lower) && to.map_or(true, |upper| at <= upper)
}

/// Unparseable timestamps sort last in either direction
fn compare_epochs(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.cmp(&y),
            SortOrder::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use linka_common::RawTimestamp;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0).unwrap()
    }

    fn event(name: &str, category: EventCategory, epoch: Option<DateTime<Utc>>, phrase: &str) -> HistoryEvent {
        HistoryEvent {
            actor_id: name.to_lowercase(),
            actor_display_name: name.to_string(),
            action_phrase: phrase.to_string(),
            timestamp: match epoch {
                Some(dt) => RawTimestamp::Native(dt),
                None => RawTimestamp::Text("garbage".to_string()),
            },
            epoch,
            category,
        }
    }

    fn phrases(page: &HistoryPage) -> Vec<&str> {
        page.events.iter().map(|e| e.action_phrase.as_str()).collect()
    }

    fn sample() -> Vec<HistoryEvent> {
        vec![
            event("Juan Pérez", EventCategory::Campaign, Some(at(1, 9)), "c1"),
            event("Ana Gómez", EventCategory::Campaign, Some(at(2, 9)), "c2"),
            event("Juan Pérez", EventCategory::Audience, Some(at(3, 9)), "a1"),
            event("Ana Gómez", EventCategory::Message, Some(at(4, 9)), "m1"),
            event("Juan Pérez", EventCategory::Message, Some(at(5, 9)), "m2"),
            event("Luis Ríos", EventCategory::Message, Some(at(6, 9)), "m3"),
        ]
    }

    #[test]
    fn test_default_is_descending() {
        let page = apply_query(sample(), &HistoryQuery::default());
        assert_eq!(phrases(&page), vec!["m3", "m2", "m1", "a1", "c2", "c1"]);
        assert_eq!(page.pagination.total_count, 6);
    }

    #[test]
    fn test_ascending() {
        let query = HistoryQuery {
            order: SortOrder::Asc,
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert_eq!(phrases(&page), vec!["c1", "c2", "a1", "m1", "m2", "m3"]);
    }

    #[test]
    fn test_actor_filter_case_insensitive() {
        let query = HistoryQuery {
            actor: Some("juan".to_string()),
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert_eq!(page.pagination.total_count, 3);
        assert!(page.events.iter().all(|e| e.actor_display_name == "Juan Pérez"));

        let accented = HistoryQuery {
            actor: Some("PÉREZ".to_string()),
            ..HistoryQuery::default()
        };
        assert_eq!(apply_query(sample(), &accented).pagination.total_count, 3);
    }

    #[test]
    fn test_empty_actor_filter_is_ignored() {
        let query = HistoryQuery {
            actor: Some(String::new()),
            ..HistoryQuery::default()
        };
        assert_eq!(apply_query(sample(), &query).pagination.total_count, 6);
    }

    #[test]
    fn test_category_filter() {
        let query = HistoryQuery {
            category: Some(EventCategory::Message),
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert_eq!(phrases(&page), vec!["m3", "m2", "m1"]);
        assert_eq!(page.pagination.total_count, 3);
    }

    #[test]
    fn test_window_is_inclusive() {
        let query = HistoryQuery {
            from: Some(at(2, 9)),
            to: Some(at(4, 9)),
            order: SortOrder::Asc,
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert_eq!(phrases(&page), vec!["c2", "a1", "m1"]);
    }

    #[test]
    fn test_window_bounds_are_independent() {
        let only_upper = HistoryQuery {
            to: Some(at(1, 9)),
            ..HistoryQuery::default()
        };
        assert_eq!(phrases(&apply_query(sample(), &only_upper)), vec!["c1"]);

        let only_lower = HistoryQuery {
            from: Some(at(6, 9)),
            ..HistoryQuery::default()
        };
        assert_eq!(phrases(&apply_query(sample(), &only_lower)), vec!["m3"]);
    }

    #[test]
    fn test_lower_bound_after_everything_is_empty() {
        let query = HistoryQuery {
            from: Some(at(30, 0)),
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert!(page.events.is_empty());
        assert_eq!(page.pagination.total_count, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let same = at(10, 12);
        let events = vec![
            event("A", EventCategory::Campaign, Some(same), "first"),
            event("B", EventCategory::Message, Some(at(9, 0)), "older"),
            event("C", EventCategory::Audience, Some(same), "second"),
            event("D", EventCategory::Message, Some(same), "third"),
        ];

        let desc = apply_query(events.clone(), &HistoryQuery::default());
        assert_eq!(phrases(&desc), vec!["first", "second", "third", "older"]);

        let asc = HistoryQuery {
            order: SortOrder::Asc,
            ..HistoryQuery::default()
        };
        assert_eq!(phrases(&apply_query(events, &asc)), vec!["older", "first", "second", "third"]);
    }

    #[test]
    fn test_unparseable_sorts_last_and_counts_as_epoch_zero() {
        let events = vec![
            event("A", EventCategory::Campaign, None, "broken"),
            event("B", EventCategory::Campaign, Some(at(1, 0)), "early"),
            event("C", EventCategory::Campaign, Some(at(2, 0)), "late"),
        ];

        let desc = apply_query(events.clone(), &HistoryQuery::default());
        assert_eq!(phrases(&desc), vec!["late", "early", "broken"]);

        let asc = HistoryQuery {
            order: SortOrder::Asc,
            ..HistoryQuery::default()
        };
        assert_eq!(phrases(&apply_query(events.clone(), &asc)), vec!["early", "late", "broken"]);

        // Epoch 0 fails any realistic lower bound and passes any upper bound
        let lower = HistoryQuery {
            from: Some(at(1, 0)),
            ..HistoryQuery::default()
        };
        assert_eq!(apply_query(events.clone(), &lower).pagination.total_count, 2);

        let upper = HistoryQuery {
            to: Some(at(1, 0)),
            ..HistoryQuery::default()
        };
        assert_eq!(phrases(&apply_query(events, &upper)), vec!["early", "broken"]);
    }

    #[test]
    fn test_page_window_and_counts() {
        let query = HistoryQuery {
            page: 2,
            limit: 2,
            ..HistoryQuery::default()
        };
        let page = apply_query(sample(), &query);
        assert_eq!(phrases(&page), vec!["m1", "a1"]);
        assert_eq!(page.pagination.total_count, 6);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);
    }

    #[test]
    fn test_page_length_never_exceeds_limit() {
        for limit in 1..=7 {
            for page in 1..=8 {
                let query = HistoryQuery {
                    page,
                    limit,
                    ..HistoryQuery::default()
                };
                let result = apply_query(sample(), &query);
                assert!(result.events.len() <= limit as usize);
                assert_eq!(result.pagination.total_count, 6);
                assert_eq!(result.pagination.total_pages, 6u64.div_ceil(limit as u64));
                assert_eq!(
                    result.pagination.has_next_page,
                    (page as u64) < result.pagination.total_pages
                );
            }
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("newest".parse::<SortOrder>().is_err());
    }
}
