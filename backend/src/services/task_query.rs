//! Task Query Engine.
//!
//! Every read builds a predicate, sorts with a stable id tie-break,
//! optionally paginates, and resolves category/tag references. Tag ids
//! that no longer resolve are dropped from the output; a dangling category
//! resolves to `null`.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    category::Category,
    data_access::data_context::{DataContext, StoreError},
    error::{ApiError, ApiResult},
    stats_response::{PriorityCount, RecentCountResponse, TaskStatsResponse},
    tag::Tag,
    task::Task,
    task_list_query::{SortField, SortOrder, TaskQuery},
    task_list_response::{Pagination, TaskListResponse},
    task_priority::TaskPriority,
    task_response::{CategoryRef, TagRef, TaskResponse},
};

/// Lookup tables for resolving a task's weak references.
pub struct References {
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
}

impl References {
    pub fn load(ctx: &DataContext) -> Result<Self, StoreError> {
        let categories = ctx
            .find_all::<Category>()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let tags = ctx
            .find_all::<Tag>()?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        Ok(Self { categories, tags })
    }

    pub fn resolve(&self, task: Task, now: DateTime<Utc>) -> TaskResponse {
        let category = task
            .category
            .and_then(|id| self.categories.get(&id))
            .map(CategoryRef::from);
        let tags = task
            .tags
            .iter()
            .filter_map(|id| self.tags.get(id))
            .map(TagRef::from)
            .collect();
        TaskResponse::new(task, category, tags, now)
    }

    pub fn resolve_all(&self, tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<TaskResponse> {
        tasks.into_iter().map(|t| self.resolve(t, now)).collect()
    }
}

/// Resolve a single task's references against the current store contents.
pub fn resolve_one(ctx: &DataContext, task: Task, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    Ok(References::load(ctx)?.resolve(task, now))
}

/// Sort by `field` in `order`, ties broken by ascending id (insertion order)
/// so pages stay stable.
pub fn sort_tasks(tasks: &mut [Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        order
            .apply(field.compare(a, b))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Cut one page out of `items`. `page` and `limit` are both ≥ 1.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, Pagination) {
    let total_items = items.len();
    let skip = (page - 1).saturating_mul(limit);
    let page_items: Vec<T> = items.into_iter().skip(skip).take(limit).collect();
    let pagination = Pagination {
        current: page,
        total: total_items.div_ceil(limit),
        count: page_items.len(),
        total_items,
    };
    (page_items, pagination)
}

pub fn list_tasks(ctx: &DataContext, query: &TaskQuery, now: DateTime<Utc>) -> ApiResult<TaskListResponse> {
    let mut tasks: Vec<Task> = ctx
        .find_all::<Task>()?
        .into_iter()
        .filter(|t| query.matches(t))
        .collect();
    sort_tasks(&mut tasks, query.sort, query.order);

    let (page, pagination) = paginate(tasks, query.page, query.limit);
    tracing::debug!(
        page = pagination.current,
        count = pagination.count,
        total_items = pagination.total_items,
        "listed tasks"
    );
    Ok(TaskListResponse {
        tasks: References::load(ctx)?.resolve_all(page, now),
        pagination,
    })
}

pub fn get_task(ctx: &DataContext, id: Uuid, now: DateTime<Utc>) -> ApiResult<TaskResponse> {
    let task = ctx
        .find_by_id::<Task>(id)?
        .ok_or(ApiError::NotFound("Task"))?;
    resolve_one(ctx, task, now)
}

/// Incomplete tasks whose due date has passed, soonest due first.
pub fn overdue_tasks(ctx: &DataContext, now: DateTime<Utc>) -> ApiResult<Vec<TaskResponse>> {
    select_sorted(ctx, now, |t| t.is_overdue(now), SortField::DueDate)
}

/// Tasks due within `[start, end]`, soonest due first.
pub fn tasks_due_between(
    ctx: &DataContext,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ApiResult<Vec<TaskResponse>> {
    select_sorted(
        ctx,
        now,
        |t| t.due_date.is_some_and(|due| start <= due && due <= end),
        SortField::DueDate,
    )
}

/// Tasks with exactly `priority`, in natural order.
pub fn tasks_by_priority(
    ctx: &DataContext,
    priority: TaskPriority,
    now: DateTime<Utc>,
) -> ApiResult<Vec<TaskResponse>> {
    let tasks = ctx
        .find_all::<Task>()?
        .into_iter()
        .filter(|t| t.priority == priority)
        .collect();
    Ok(References::load(ctx)?.resolve_all(tasks, now))
}

fn select_sorted(
    ctx: &DataContext,
    now: DateTime<Utc>,
    predicate: impl Fn(&Task) -> bool,
    sort: SortField,
) -> ApiResult<Vec<TaskResponse>> {
    let mut tasks: Vec<Task> = ctx
        .find_all::<Task>()?
        .into_iter()
        .filter(|t| predicate(t))
        .collect();
    sort_tasks(&mut tasks, sort, SortOrder::Asc);
    Ok(References::load(ctx)?.resolve_all(tasks, now))
}

pub fn stats_overview(ctx: &DataContext) -> ApiResult<TaskStatsResponse> {
    let stats = ctx
        .find_all::<Task>()?
        .iter()
        .fold(TaskStatsResponse::default(), |mut acc, t| {
            acc.total += 1;
            if t.completed {
                acc.completed += 1;
            } else {
                acc.active += 1;
            }
            acc
        });
    Ok(stats)
}

/// Task counts per priority, for priorities that occur, ordered by label.
pub fn stats_by_priority(ctx: &DataContext) -> ApiResult<Vec<PriorityCount>> {
    let mut counts: HashMap<TaskPriority, usize> = HashMap::new();
    for task in ctx.find_all::<Task>()? {
        *counts.entry(task.priority).or_default() += 1;
    }
    let mut rows: Vec<PriorityCount> = counts
        .into_iter()
        .map(|(priority, count)| PriorityCount { priority, count })
        .collect();
    rows.sort_by_key(|row| row.priority.as_str());
    Ok(rows)
}

/// Number of tasks created within the last `days` days.
pub fn recent_count(ctx: &DataContext, days: i64, now: DateTime<Utc>) -> ApiResult<RecentCountResponse> {
    let since = Duration::try_days(days).and_then(|span| now.checked_sub_signed(span));
    let count = ctx
        .find_all::<Task>()?
        .iter()
        .filter(|t| since.map_or(true, |since| t.created_at >= since))
        .count();
    Ok(RecentCountResponse { count, days })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_list_query::{CompletionFilter, TaskListQuery};

    fn at(hours: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap() + Duration::hours(hours)
    }

    fn store() -> DataContext {
        DataContext::open_in_memory().unwrap()
    }

    fn add(ctx: &DataContext, title: &str, edit: impl FnOnce(&mut Task)) -> Task {
        let mut task = Task::new(title, at(0));
        edit(&mut task);
        ctx.insert(&task).unwrap();
        task
    }

    fn titles(tasks: &[TaskResponse]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn pagination_counts() {
        for total_items in 0..12 {
            for limit in 1..5 {
                for page in 1..6 {
                    let items: Vec<usize> = (0..total_items).collect();
                    let (slice, p) = paginate(items, page, limit);
                    let expected = total_items.saturating_sub((page - 1) * limit).min(limit);
                    assert_eq!(p.count, expected);
                    assert_eq!(slice.len(), expected);
                    assert_eq!(p.total, total_items.div_ceil(limit));
                    assert_eq!(p.total_items, total_items);
                }
            }
        }
    }

    #[test]
    fn filter_and_search_combine() {
        let ctx = store();
        add(&ctx, "Buy milk", |_| {});
        add(&ctx, "Buy bread", |t| t.set_completed(true, at(1)));
        add(&ctx, "Call mom", |t| t.description = Some("about MILK".into()));

        let query = TaskQuery {
            filter: Some(CompletionFilter::Active),
            search: Some("milk".into()),
            ..TaskQuery::default()
        };
        let list = list_tasks(&ctx, &query, at(2)).unwrap();
        let mut got = titles(&list.tasks);
        got.sort();
        assert_eq!(got, vec!["Buy milk", "Call mom"]);

        let query = TaskQuery {
            filter: Some(CompletionFilter::Completed),
            ..TaskQuery::default()
        };
        assert_eq!(titles(&list_tasks(&ctx, &query, at(2)).unwrap().tasks), vec!["Buy bread"]);
    }

    #[test]
    fn priority_sort_uses_rank() {
        let ctx = store();
        for (title, priority) in [
            ("m", TaskPriority::Medium),
            ("u", TaskPriority::Urgent),
            ("l", TaskPriority::Low),
            ("h", TaskPriority::High),
        ] {
            add(&ctx, title, |t| t.priority = priority);
        }

        let raw = TaskListQuery {
            sort: Some("priority".into()),
            order: Some("desc".into()),
            ..TaskListQuery::default()
        };
        let list = list_tasks(&ctx, &raw.parse(), at(1)).unwrap();
        assert_eq!(titles(&list.tasks), vec!["u", "h", "m", "l"]);
    }

    #[test]
    fn ties_keep_insertion_order_across_pages() {
        let ctx = store();
        let names: Vec<String> = (0..7).map(|i| format!("task {i}")).collect();
        for name in &names {
            add(&ctx, name, |_| {});
        }

        let mut seen = Vec::new();
        for page in 1..=3 {
            let query = TaskQuery {
                page,
                limit: 3,
                ..TaskQuery::default()
            };
            let list = list_tasks(&ctx, &query, at(1)).unwrap();
            assert_eq!(list.pagination.total, 3);
            seen.extend(list.tasks.into_iter().map(|t| t.title));
        }
        assert_eq!(seen, names);
    }

    #[test]
    fn dangling_references_are_dropped() {
        let ctx = store();
        let live = Tag::new("live", "#00ff00", at(0));
        ctx.insert(&live).unwrap();
        let dead_tag = Uuid::now_v7();
        let dead_category = Uuid::now_v7();

        let task = add(&ctx, "refs", |t| {
            t.tags = vec![dead_tag, live.id];
            t.category = Some(dead_category);
        });

        let resolved = get_task(&ctx, task.id, at(1)).unwrap();
        assert_eq!(resolved.tags, vec![TagRef::from(&live)]);
        assert_eq!(resolved.category, None);
    }

    #[test]
    fn category_resolves_to_id_and_name() {
        let ctx = store();
        let home = Category::new("Home", at(0));
        ctx.insert(&home).unwrap();
        let task = add(&ctx, "clean", |t| t.category = Some(home.id));

        let resolved = get_task(&ctx, task.id, at(1)).unwrap();
        assert_eq!(resolved.category, Some(CategoryRef { id: home.id, name: "Home".into() }));
    }

    #[test]
    fn get_missing_task_is_not_found() {
        let ctx = store();
        assert!(matches!(
            get_task(&ctx, Uuid::now_v7(), at(0)),
            Err(ApiError::NotFound("Task"))
        ));
    }

    #[test]
    fn overdue_excludes_completed_and_sorts_by_due_date() {
        let ctx = store();
        add(&ctx, "later", |t| t.due_date = Some(at(5)));
        add(&ctx, "earlier", |t| t.due_date = Some(at(1)));
        add(&ctx, "done", |t| {
            t.due_date = Some(at(2));
            t.set_completed(true, at(3));
        });
        add(&ctx, "future", |t| t.due_date = Some(at(100)));
        add(&ctx, "undated", |_| {});

        let overdue = overdue_tasks(&ctx, at(10)).unwrap();
        assert_eq!(titles(&overdue), vec!["earlier", "later"]);
        assert!(overdue.iter().all(|t| t.is_overdue));
    }

    #[test]
    fn due_range_is_inclusive() {
        let ctx = store();
        add(&ctx, "start", |t| t.due_date = Some(at(0)));
        add(&ctx, "end", |t| t.due_date = Some(at(24)));
        add(&ctx, "outside", |t| t.due_date = Some(at(25)));
        add(&ctx, "undated", |_| {});

        let found = tasks_due_between(&ctx, at(0), at(24), at(0)).unwrap();
        assert_eq!(titles(&found), vec!["start", "end"]);
    }

    #[test]
    fn by_priority_is_exact() {
        let ctx = store();
        add(&ctx, "hi", |t| t.priority = TaskPriority::High);
        add(&ctx, "lo", |t| t.priority = TaskPriority::Low);

        let found = tasks_by_priority(&ctx, TaskPriority::High, at(0)).unwrap();
        assert_eq!(titles(&found), vec!["hi"]);
    }

    #[test]
    fn stats() {
        let ctx = store();
        add(&ctx, "a", |t| t.priority = TaskPriority::Urgent);
        add(&ctx, "b", |t| {
            t.priority = TaskPriority::High;
            t.set_completed(true, at(1));
        });
        add(&ctx, "c", |t| t.priority = TaskPriority::High);

        assert_eq!(
            stats_overview(&ctx).unwrap(),
            TaskStatsResponse { total: 3, completed: 1, active: 2 }
        );
        assert_eq!(
            stats_by_priority(&ctx).unwrap(),
            vec![
                PriorityCount { priority: TaskPriority::High, count: 2 },
                PriorityCount { priority: TaskPriority::Urgent, count: 1 },
            ]
        );
    }

    #[test]
    fn recent_counts_tasks_inside_the_window() {
        let ctx = store();
        add(&ctx, "old", |t| t.created_at = at(-24 * 10));
        add(&ctx, "new", |t| t.created_at = at(-24));

        assert_eq!(recent_count(&ctx, 7, at(0)).unwrap().count, 1);
        assert_eq!(recent_count(&ctx, 30, at(0)).unwrap().count, 2);
    }
}
