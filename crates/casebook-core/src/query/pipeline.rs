// ── List derivation pipeline ──
//
// (records, QueryState) -> DerivedView, in a fixed order:
// search, field filters, tab/scope, pin partition, stable sort, paginate.
// Pure and infallible: a nonsensical state degrades to an empty view.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::state::{QueryState, SortOrder, clamp_page, total_pages};
use crate::error::CoreError;
use crate::model::{FieldValue, Record};

/// Shared record predicate used for tabs, scopes and pinning.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

// ── Comparators ─────────────────────────────────────────────────────

/// How values of one sortable field are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Comparator {
    /// Byte-wise lexicographic on the rendered value.
    Text,
    /// Integer order. Non-integers fall back to text order.
    Numeric,
    /// Timestamp order. Unparseable values fall back to text order.
    Chronological,
}

impl Comparator {
    pub fn compare(self, a: &FieldValue, b: &FieldValue) -> Ordering {
        match self {
            Self::Text => text_order(a, b),
            Self::Numeric => match (a.as_integer(), b.as_integer()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => text_order(a, b),
            },
            Self::Chronological => match (a.as_date(), b.as_date()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => text_order(a, b),
            },
        }
    }
}

fn text_order(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

// ── Derived view ────────────────────────────────────────────────────

/// One page of a filtered, sorted collection.
#[derive(Debug, Clone)]
pub struct DerivedView<T> {
    pub items: Vec<Arc<T>>,
    /// Matches after search, filters and tab; before pagination.
    pub total_matches: usize,
    pub total_pages: usize,
    /// The page actually served, after clamping.
    pub page: usize,
}

impl<T> DerivedView<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_matches: 0,
            total_pages: 0,
            page: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    /// Same record ids in the same order, with equal totals and page.
    pub fn same_ids(&self, other: &Self) -> bool
    where
        T: Record,
    {
        self.total_matches == other.total_matches
            && self.total_pages == other.total_pages
            && self.page == other.page
            && self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.id() == b.id())
    }
}

// ── Query definition ────────────────────────────────────────────────

/// Per-entity description of how a list can be searched, filtered,
/// tabbed, pinned and sorted.
///
/// The definition is static; the user's choices live in [`QueryState`].
pub struct ListQuery<T> {
    search_fields: Vec<String>,
    sort_fields: BTreeMap<String, Comparator>,
    tabs: Vec<(String, Predicate<T>)>,
    scope: Option<Predicate<T>>,
    pin: Option<Predicate<T>>,
}

impl<T> Clone for ListQuery<T> {
    fn clone(&self) -> Self {
        Self {
            search_fields: self.search_fields.clone(),
            sort_fields: self.sort_fields.clone(),
            tabs: self.tabs.clone(),
            scope: self.scope.clone(),
            pin: self.pin.clone(),
        }
    }
}

impl<T> fmt::Debug for ListQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListQuery")
            .field("search_fields", &self.search_fields)
            .field("sort_fields", &self.sort_fields)
            .field(
                "tabs",
                &self.tabs.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("scoped", &self.scope.is_some())
            .field("pinned", &self.pin.is_some())
            .finish()
    }
}

impl<T> Default for ListQuery<T> {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            sort_fields: BTreeMap::new(),
            tabs: Vec::new(),
            scope: None,
            pin: None,
        }
    }
}

impl<T: Record> ListQuery<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Builder ──────────────────────────────────────────────────────

    #[must_use]
    pub fn search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn sort_field(mut self, name: impl Into<String>, comparator: Comparator) -> Self {
        self.sort_fields.insert(name.into(), comparator);
        self
    }

    /// Register a named tab. Registering the same name twice replaces it.
    #[must_use]
    pub fn tab(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        self.tabs.retain(|(existing, _)| *existing != name);
        self.tabs.push((name, Arc::new(predicate)));
        self
    }

    /// A predicate applied to every derivation regardless of tab.
    #[must_use]
    pub fn scope(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.scope = Some(Arc::new(predicate));
        self
    }

    /// Records matching `predicate` sort ahead of all others.
    #[must_use]
    pub fn pin(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.pin = Some(Arc::new(predicate));
        self
    }

    // ── Introspection ────────────────────────────────────────────────

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn sort_keys(&self) -> impl Iterator<Item = &str> {
        self.sort_fields.keys().map(String::as_str)
    }

    pub fn tab_names(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|(name, _)| name.as_str())
    }

    pub fn comparator(&self, key: &str) -> Option<Comparator> {
        self.sort_fields.get(key).copied()
    }

    fn tab_predicate(&self, name: &str) -> Option<&Predicate<T>> {
        self.tabs
            .iter()
            .find(|(tab, _)| tab == name)
            .map(|(_, predicate)| predicate)
    }

    // ── Derivation ───────────────────────────────────────────────────

    /// Reject states that `derive` would silently ignore.
    pub fn validate(&self, state: &QueryState) -> Result<(), CoreError> {
        if state.page_size == 0 {
            return Err(CoreError::validation(
                "page_size",
                "page size must be at least 1",
            ));
        }
        if let Some(key) = state.sort_key.as_deref() {
            if !self.sort_fields.contains_key(key) {
                return Err(CoreError::validation(
                    "sort_key",
                    format!(
                        "unknown sort key '{key}' (expected one of: {})",
                        self.sort_keys().collect::<Vec<_>>().join(", ")
                    ),
                ));
            }
        }
        if let Some(tab) = state.tab.as_deref() {
            if self.tab_predicate(tab).is_none() {
                return Err(CoreError::validation(
                    "tab",
                    format!(
                        "unknown tab '{tab}' (expected one of: {})",
                        self.tab_names().collect::<Vec<_>>().join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Whether one record survives search, filters, tab and scope.
    pub fn matches(&self, record: &T, state: &QueryState) -> bool {
        let needle = state.search.trim().to_lowercase();
        self.matches_with(record, state, &needle)
    }

    fn matches_with(&self, record: &T, state: &QueryState, needle: &str) -> bool {
        let searched = needle.is_empty()
            || self
                .search_fields
                .iter()
                .filter_map(|f| record.field(f))
                .any(|v| v.contains_text(needle));
        if !searched || !state.filters.matches(record) {
            return false;
        }
        let in_tab = state
            .tab
            .as_deref()
            .and_then(|tab| self.tab_predicate(tab))
            .is_none_or(|predicate| predicate(record));
        in_tab && self.scope.as_ref().is_none_or(|predicate| predicate(record))
    }

    /// Every match in display order, before pagination.
    pub fn ordered(&self, records: &[Arc<T>], state: &QueryState) -> Vec<Arc<T>> {
        let needle = state.search.trim().to_lowercase();
        let matched: Vec<Arc<T>> = records
            .iter()
            .filter(|r| self.matches_with(r, state, &needle))
            .cloned()
            .collect();
        self.sort(matched, state)
    }

    fn sort(&self, matched: Vec<Arc<T>>, state: &QueryState) -> Vec<Arc<T>> {
        let sort = state
            .sort_key
            .as_deref()
            .and_then(|key| self.comparator(key).map(|cmp| (key, cmp)));
        if sort.is_none() && self.pin.is_none() {
            return matched;
        }

        // Decorate once so `field()` isn't re-evaluated per comparison.
        let mut keyed: Vec<(bool, Option<FieldValue>, Arc<T>)> = matched
            .into_iter()
            .map(|record| {
                let pinned = self.pin.as_ref().is_some_and(|p| p(record.as_ref()));
                let key = sort.and_then(|(field, _)| record.field(field));
                (pinned, key, record)
            })
            .collect();

        // `sort_by` is stable. Descending swaps operands instead of
        // reversing so equal keys keep their pre-sort order.
        keyed.sort_by(|(pin_a, key_a, _), (pin_b, key_b, _)| {
            pin_b.cmp(pin_a).then_with(|| {
                let Some((_, comparator)) = sort else {
                    return Ordering::Equal;
                };
                match (key_a, key_b) {
                    (Some(a), Some(b)) => match state.sort_order {
                        SortOrder::Asc => comparator.compare(a, b),
                        SortOrder::Desc => comparator.compare(b, a),
                    },
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            })
        });
        keyed.into_iter().map(|(_, _, record)| record).collect()
    }

    /// Derive the page of records `state` asks for.
    pub fn derive(&self, records: &[Arc<T>], state: &QueryState) -> DerivedView<T> {
        let ordered = self.ordered(records, state);
        paginate(ordered, state.page, state.page_size)
    }
}

/// Slice one page out of an ordered match list, clamping `page` into range.
pub fn paginate<T>(ordered: Vec<Arc<T>>, page: usize, page_size: usize) -> DerivedView<T> {
    let total_matches = ordered.len();
    if page_size == 0 {
        return DerivedView {
            total_matches,
            ..DerivedView::empty()
        };
    }
    let total_pages = total_pages(total_matches, page_size);
    let page = clamp_page(page, total_pages);
    let items = ordered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    DerivedView {
        items,
        total_matches,
        total_pages,
        page,
    }
}
