// ── Query state ──
//
// The search / filter / sort / page parameters driving one list view.
// Owned by whoever presents the list; mutators keep `page` honest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::{FieldValue, Record};

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ── Sort order ──────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[strum(serialize = "asc", serialize = "ascending")]
    Asc,
    #[strum(serialize = "desc", serialize = "descending")]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

// ── Filter values ───────────────────────────────────────────────────

/// Constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilter", into = "RawFilter")]
pub enum FilterValue {
    /// No constraint. Parsed from `"all"` or `null`.
    All,
    /// Field must equal the value.
    Is(FieldValue),
    /// Field must equal one of the values.
    AnyOf(Vec<FieldValue>),
}

impl FilterValue {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a present field value satisfies the constraint.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match self {
            Self::All => true,
            Self::Is(expected) => value.loosely_eq(expected),
            Self::AnyOf(set) => set.iter().any(|expected| value.loosely_eq(expected)),
        }
    }

    /// Parse a command-line value: `all`, `v`, or `v1,v2,...`.
    ///
    /// Values stay literal text; [`FieldValue::loosely_eq`] reads them as
    /// the field's own type at match time. A value list with no entries
    /// (`","`) is no constraint.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        let parts: Vec<FieldValue> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(FieldValue::from)
            .collect();
        match <[FieldValue; 1]>::try_from(parts) {
            Ok([single]) => Self::Is(single),
            Err(parts) if parts.is_empty() => Self::All,
            Err(parts) => Self::AnyOf(parts),
        }
    }
}

impl From<FieldValue> for FilterValue {
    fn from(value: FieldValue) -> Self {
        Self::Is(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Is(value.into())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Is(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Is(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Is(value.into())
    }
}

impl From<Vec<FieldValue>> for FilterValue {
    fn from(set: Vec<FieldValue>) -> Self {
        Self::AnyOf(set)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawFilter {
    Many(Vec<FieldValue>),
    One(FieldValue),
    Unset(()),
}

impl From<RawFilter> for FilterValue {
    fn from(raw: RawFilter) -> Self {
        match raw {
            RawFilter::Many(set) => Self::AnyOf(set),
            RawFilter::One(FieldValue::Text(s)) if s.eq_ignore_ascii_case("all") => Self::All,
            RawFilter::One(v) => Self::Is(v),
            RawFilter::Unset(()) => Self::All,
        }
    }
}

impl From<FilterValue> for RawFilter {
    fn from(filter: FilterValue) -> Self {
        match filter {
            FilterValue::All => Self::One(FieldValue::Text("all".into())),
            FilterValue::Is(v) => Self::One(v),
            FilterValue::AnyOf(set) => Self::Many(set),
        }
    }
}

// ── Filter set ──────────────────────────────────────────────────────

/// Field filters, AND-ed together. Keys are record field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// True when no filter actually constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self.0.values().all(FilterValue::is_all)
    }

    /// Every non-`All` filter must accept the record's field.
    /// A record without the field fails that filter.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.0.iter().all(|(key, filter)| {
            if filter.is_all() {
                return true;
            }
            record.field(key).is_some_and(|v| filter.accepts(&v))
        })
    }

    /// Parse a `key=value[,value...]` pair.
    pub fn parse_pair(raw: &str) -> Result<(String, FilterValue), CoreError> {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(CoreError::validation(
                "filter",
                format!("expected key=value, got '{raw}'"),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::validation("filter", "empty filter key"));
        }
        Ok((key.to_owned(), FilterValue::parse(value)))
    }
}

impl FromIterator<(String, FilterValue)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Query state ─────────────────────────────────────────────────────

/// Mutable list-view parameters.
///
/// `page` is 1-based. Any change that can shrink the match set resets it
/// to 1; [`clamp_page`](Self::clamp_page) pulls it back into range after
/// the collection itself changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryState {
    pub search: String,
    pub filters: FilterSet,
    pub tab: Option<String>,
    pub sort_key: Option<String>,
    pub sort_order: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: FilterSet::default(),
            tab: None,
            sort_key: None,
            sort_order: SortOrder::Asc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.filters.insert(key, value);
        self.page = 1;
    }

    pub fn clear_filter(&mut self, key: &str) {
        if self.filters.remove(key).is_some() {
            self.page = 1;
        }
    }

    pub fn set_tab(&mut self, tab: Option<String>) {
        self.tab = tab;
        self.page = 1;
    }

    /// Column-header behaviour: the same key flips direction, a new key
    /// starts ascending.
    pub fn sort_by(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.sort_key.as_deref() == Some(key.as_str()) {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_key = Some(key);
            self.sort_order = SortOrder::Asc;
        }
    }

    pub fn set_sort(&mut self, key: impl Into<String>, order: SortOrder) {
        self.sort_key = Some(key.into());
        self.sort_order = order;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Pull `page` into `[1, total_pages]` and return it.
    pub fn clamp_page(&mut self, total_matches: usize) -> usize {
        self.page = clamp_page(self.page, total_pages(total_matches, self.page_size));
        self.page
    }
}

/// `ceil(total / page_size)`, 0 for an empty match set or a zero page size.
pub fn total_pages(total_matches: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_matches.div_ceil(page_size)
}

pub(crate) fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_changes_reset_page() {
        let mut s = QueryState::default();
        s.set_page(4);
        s.set_filter("status", "open");
        assert_eq!(s.page, 1);

        s.set_page(3);
        s.set_search("north");
        assert_eq!(s.page, 1);

        s.set_page(2);
        s.clear_filter("missing");
        assert_eq!(s.page, 2, "clearing an absent filter changes nothing");
        s.clear_filter("status");
        assert_eq!(s.page, 1);
    }

    #[test]
    fn sort_by_same_key_toggles() {
        let mut s = QueryState::default();
        s.sort_by("claimed_amount");
        assert_eq!(s.sort_order, SortOrder::Asc);
        s.sort_by("claimed_amount");
        assert_eq!(s.sort_order, SortOrder::Desc);
        s.sort_by("claimant");
        assert_eq!(s.sort_key.as_deref(), Some("claimant"));
        assert_eq!(s.sort_order, SortOrder::Asc);
    }

    #[test]
    fn clamp_page_pulls_into_range() {
        let mut s = QueryState::with_page_size(10);
        s.set_page(99);
        assert_eq!(s.clamp_page(25), 3);
        assert_eq!(s.clamp_page(0), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn filter_value_parses_cli_forms() {
        assert_eq!(FilterValue::parse("all"), FilterValue::All);
        assert_eq!(FilterValue::parse(""), FilterValue::All);
        assert_eq!(
            FilterValue::parse("open"),
            FilterValue::Is(FieldValue::Text("open".into()))
        );
        assert_eq!(
            FilterValue::parse("open, accepted"),
            FilterValue::AnyOf(vec!["open".into(), "accepted".into()])
        );
        assert_eq!(FilterValue::parse(" , ,"), FilterValue::All);
        assert_eq!(
            FilterValue::parse("007"),
            FilterValue::Is(FieldValue::Text("007".into()))
        );
    }

    #[test]
    fn query_state_deserializes_with_defaults() {
        let s: QueryState = serde_json::from_str(
            r#"{
                "filters": { "status": ["verification_pending"], "category": "all" },
                "sort_key": "claimed_amount",
                "sort_order": "desc"
            }"#,
        )
        .unwrap();
        assert_eq!(s.page, 1);
        assert_eq!(s.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(s.sort_order, SortOrder::Desc);
        assert_eq!(
            s.filters.get("status"),
            Some(&FilterValue::AnyOf(vec!["verification_pending".into()]))
        );
        assert_eq!(s.filters.get("category"), Some(&FilterValue::All));
    }

    #[test]
    fn null_filter_means_no_constraint() {
        let f: FilterSet = serde_json::from_str(r#"{ "status": null }"#).unwrap();
        assert!(f.is_unconstrained());
    }

    #[test]
    fn parse_pair_requires_equals() {
        let (k, v) = FilterSet::parse_pair("status=open,read").unwrap();
        assert_eq!(k, "status");
        assert!(matches!(v, FilterValue::AnyOf(ref set) if set.len() == 2));
        assert!(FilterSet::parse_pair("status").is_err());
        assert!(FilterSet::parse_pair("=open").is_err());
    }

    #[test]
    fn cli_filter_matches_literal_text() {
        use chrono::Utc;

        use crate::model::{Claim, ClaimDraft, EntityId};

        let claim = Claim::from_draft(
            EntityId::from("clm-1"),
            ClaimDraft {
                claimant: "007".into(),
                category: "secured".into(),
                claimed_amount: 7,
            },
            Utc::now(),
        )
        .unwrap();

        let (key, value) = FilterSet::parse_pair("claimant=007").unwrap();
        assert!(FilterSet::new().with(key, value).matches(&claim));

        let (key, value) = FilterSet::parse_pair("claimed_amount=007").unwrap();
        assert!(FilterSet::new().with(key, value).matches(&claim));

        let (key, value) = FilterSet::parse_pair("claimant=7").unwrap();
        assert!(!FilterSet::new().with(key, value).matches(&claim));
    }

    #[test]
    fn sort_order_parses_long_and_short_names() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("ascending".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
