//! List projections over the timer collection.
//!
//! Pure functions: nothing here mutates timers.

use serde::Serialize;

use crate::timer::{category_color, Timer, TimerStatus};

/// Category filter value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerFilter {
    /// Case-insensitive substring of the name or category.
    pub search: Option<String>,
    /// Exact category; `None` or [`ALL_CATEGORIES`] matches every category.
    pub category: Option<String>,
    pub include_completed: bool,
}

impl TimerFilter {
    pub fn all() -> Self {
        Self {
            include_completed: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, timer: &Timer) -> bool {
        if !self.include_completed && timer.status == TimerStatus::Completed {
            return false;
        }

        if let Some(category) = self.category.as_deref() {
            if category != ALL_CATEGORIES && timer.category != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                timer.name.to_lowercase().contains(&query)
                    || timer.category.to_lowercase().contains(&query)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub color: &'static str,
    pub running: usize,
    pub timers: Vec<&'a Timer>,
}

/// Group matching timers by category, in first-seen category order.
///
/// Within a group timers are ordered running, paused, idle, completed;
/// ties keep collection order.
pub fn group_by_category<'a>(timers: &'a [Timer], filter: &TimerFilter) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();

    for timer in timers.iter().filter(|t| filter.matches(t)) {
        match groups.iter_mut().find(|g| g.category == timer.category) {
            Some(group) => group.timers.push(timer),
            None => groups.push(CategoryGroup {
                category: &timer.category,
                color: category_color(&timer.category),
                running: 0,
                timers: vec![timer],
            }),
        }
    }

    for group in &mut groups {
        group.timers.sort_by_key(|t| t.status.sort_rank());
        group.running = group.timers.iter().filter(|t| t.is_running()).count();
    }
    groups
}

/// Category choices for a filter control: `All` followed by every category in use.
pub fn category_choices(timers: &[Timer]) -> Vec<&str> {
    let mut out = vec![ALL_CATEGORIES];
    for timer in timers {
        if !out[1..].contains(&timer.category.as_str()) {
            out.push(&timer.category);
        }
    }
    out
}
