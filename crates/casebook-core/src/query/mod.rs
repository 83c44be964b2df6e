// ── List query pipeline ──
//
// Client-side derivation of list views from a collection snapshot:
// query state, the pure pipeline, memoization, stat counts and the
// per-entity list presets.

pub mod cache;
pub mod pipeline;
pub mod presets;
pub mod state;
pub mod stats;

pub use cache::ViewCache;
pub use pipeline::{Comparator, DerivedView, ListQuery, Predicate, paginate};
pub use presets::Preset;
pub use state::{DEFAULT_PAGE_SIZE, FilterSet, FilterValue, QueryState, SortOrder, total_pages};
pub use stats::{count_by_field, group_count};
