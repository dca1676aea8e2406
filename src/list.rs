//! Generic paginated, searchable, sortable list state.
//!
//! One [`ListController`] drives every browsable resource. What differs per
//! resource (how a batch is fetched, and whether search or category
//! selection switches paging to the client side) lives in its
//! [`ListSource`].

use crate::error::{ApiError, ResourceKind};
use crate::item::Item;
use crate::resource::NamedApiResource;
use async_trait::async_trait;
use std::cmp::Ordering;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// A row of a browsable list.
pub trait ListEntry: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Price-like sort key. Entries without one sort as 0.
    fn cost(&self) -> Option<u32> {
        None
    }
}

impl ListEntry for NamedApiResource {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ListEntry for Item {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self) -> Option<u32> {
        Some(self.cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    CostAsc,
    CostDesc,
}

impl SortOrder {
    fn compare<E: ListEntry>(self, a: &E, b: &E) -> Ordering {
        let cost = |e: &E| e.cost().unwrap_or(0);
        match self {
            SortOrder::NameAsc => a.name().cmp(b.name()),
            SortOrder::NameDesc => b.name().cmp(a.name()),
            SortOrder::CostAsc => cost(a).cmp(&cost(b)),
            SortOrder::CostDesc => cost(b).cmp(&cost(a)),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name-asc" => Ok(SortOrder::NameAsc),
            "name-desc" => Ok(SortOrder::NameDesc),
            "cost-asc" => Ok(SortOrder::CostAsc),
            "cost-desc" => Ok(SortOrder::CostDesc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// How a controller decides between server-side and client-side paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingPolicy {
    /// Server pages while the search term is empty. A non-empty term pulls
    /// one batch of `batch_size` entries and pages it locally.
    SearchSensitive { batch_size: usize },
    /// Server pages while the category is [`ALL_CATEGORIES`]. A specific
    /// category pulls all its members and pages them locally. Search is
    /// always a local filter.
    CategoryScoped,
}

/// What one load asks the source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    Page { limit: usize, offset: usize },
    Category(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListBatch<E> {
    pub entries: Vec<E>,
    /// Server-side total, used for page count while paging remotely.
    pub total_count: usize,
}

/// Fetch strategy for one resource kind.
#[async_trait]
pub trait ListSource: Send + Sync {
    type Entry: ListEntry;

    fn kind(&self) -> ResourceKind;
    fn policy(&self) -> PagingPolicy;
    async fn fetch(&self, query: &ListQuery) -> Result<ListBatch<Self::Entry>, ApiError>;
}

/// Handle for one in-flight load. Only the most recently issued ticket is
/// applied when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    query: ListQuery,
}

impl LoadTicket {
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

pub struct ListController<S: ListSource> {
    source: S,
    page_size: usize,
    entries: Vec<S::Entry>,
    total_count: usize,
    search_term: String,
    category: String,
    sort_order: SortOrder,
    current_page: usize,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            entries: Vec::new(),
            total_count: 0,
            search_term: String::new(),
            category: ALL_CATEGORIES.to_string(),
            sort_order: SortOrder::default(),
            current_page: 1,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn entries(&self) -> &[S::Entry] {
        &self.entries
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the loaded entries are already exactly the current page.
    pub fn is_server_paged(&self) -> bool {
        match self.source.policy() {
            PagingPolicy::SearchSensitive { .. } => self.search_term.is_empty(),
            PagingPolicy::CategoryScoped => self.category == ALL_CATEGORIES,
        }
    }

    fn query(&self) -> ListQuery {
        let page = ListQuery::Page {
            limit: self.page_size,
            offset: (self.current_page - 1) * self.page_size,
        };
        match self.source.policy() {
            PagingPolicy::SearchSensitive { batch_size } if !self.search_term.is_empty() => {
                ListQuery::Page {
                    limit: batch_size,
                    offset: 0,
                }
            }
            PagingPolicy::CategoryScoped if self.category != ALL_CATEGORIES => {
                ListQuery::Category(self.category.clone())
            }
            _ => page,
        }
    }

    /// Marks the list as loading and issues a ticket for the current state.
    /// The previous entries stay visible until the ticket completes.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            generation: self.generation,
            query: self.query(),
        }
    }

    /// Applies a completed load. Returns `false` when a newer load has been
    /// issued since, in which case the result is dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ListBatch<S::Entry>, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::warn!(
                "Discarding stale {} list response (generation {}, latest {})",
                self.source.kind(),
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(batch) => {
                tracing::debug!(
                    "Loaded {} {} entries (total {})",
                    batch.entries.len(),
                    self.source.kind(),
                    batch.total_count
                );
                self.entries = batch.entries;
                self.total_count = batch.total_count;
            }
            Err(e) => {
                tracing::error!("Failed to load {} list: {}", self.source.kind(), e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn load(&mut self) {
        let ticket = self.begin_load();
        let result = self.source.fetch(ticket.query()).await;
        self.finish_load(ticket, result);
    }

    /// Re-issues the load for the current state, e.g. after an error.
    pub async fn retry(&mut self) {
        self.load().await;
    }

    pub async fn set_search_term(&mut self, term: &str) {
        let had_term = !self.search_term.is_empty();
        self.search_term = term.to_string();
        self.current_page = 1;

        let presence_flipped = had_term != !term.is_empty();
        if presence_flipped && matches!(self.source.policy(), PagingPolicy::SearchSensitive { .. }) {
            self.load().await;
        }
    }

    /// Scopes the list to one category, clearing the search term. Ignored by
    /// sources that have no categories.
    pub async fn set_category(&mut self, name: &str) {
        if self.source.policy() != PagingPolicy::CategoryScoped {
            tracing::warn!("{} lists have no categories", self.source.kind());
            return;
        }
        self.category = name.to_string();
        self.current_page = 1;
        self.search_term.clear();
        self.load().await;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.current_page = 1;
    }

    /// Moves to `page` if it exists. Returns whether the page changed.
    pub async fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        if self.is_server_paged() {
            self.load().await;
        }
        true
    }

    pub async fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1).await
    }

    pub async fn previous_page(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page).await,
            None => false,
        }
    }

    /// Entries whose name contains the search term, case-insensitively.
    pub fn filtered(&self) -> Vec<&S::Entry> {
        let term = self.search_term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| term.is_empty() || entry.name().to_lowercase().contains(&term))
            .collect()
    }

    pub fn sorted(&self) -> Vec<&S::Entry> {
        let mut entries = self.filtered();
        entries.sort_by(|a, b| self.sort_order.compare(*a, *b));
        entries
    }

    /// The rows to show for the current page.
    pub fn page_entries(&self) -> Vec<&S::Entry> {
        let sorted = self.sorted();
        if self.is_server_paged() {
            return sorted;
        }
        sorted
            .into_iter()
            .skip((self.current_page - 1) * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        let relevant = if self.is_server_paged() {
            self.total_count
        } else {
            self.filtered().len()
        };
        relevant.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransientError;
    use std::sync::Mutex;

    /// Serves slices of a fixed entry list and records each query.
    struct StaticSource {
        entries: Vec<NamedApiResource>,
        policy: PagingPolicy,
        queries: Mutex<Vec<ListQuery>>,
        failures_left: Mutex<u32>,
    }

    impl StaticSource {
        fn new(count: u32, policy: PagingPolicy) -> Self {
            Self {
                entries: (1..=count)
                    .map(|n| NamedApiResource::new(format!("entry-{n:03}"), ""))
                    .collect(),
                policy,
                queries: Mutex::new(Vec::new()),
                failures_left: Mutex::new(0),
            }
        }

        /// Fails the next `count` fetches with a network error.
        fn failing(self, count: u32) -> Self {
            *self.failures_left.lock().unwrap() = count;
            self
        }

        fn queries(&self) -> Vec<ListQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListSource for StaticSource {
        type Entry = NamedApiResource;

        fn kind(&self) -> ResourceKind {
            ResourceKind::Ability
        }

        fn policy(&self) -> PagingPolicy {
            self.policy
        }

        async fn fetch(&self, query: &ListQuery) -> Result<ListBatch<Self::Entry>, ApiError> {
            self.queries.lock().unwrap().push(query.clone());
            {
                let mut failures_left = self.failures_left.lock().unwrap();
                if *failures_left > 0 {
                    *failures_left -= 1;
                    return Err(TransientError::Network("connection reset".into()).into());
                }
            }
            let entries = match query {
                ListQuery::Page { limit, offset } => {
                    self.entries.iter().skip(*offset).take(*limit).cloned().collect()
                }
                ListQuery::Category(name) if name == "missing" => {
                    return Err(ApiError::NotFound {
                        kind: ResourceKind::ItemCategory,
                        name: name.clone(),
                    });
                }
                ListQuery::Category(_) => self.entries.clone(),
            };
            Ok(ListBatch {
                entries,
                total_count: self.entries.len(),
            })
        }
    }

    const SEARCH: PagingPolicy = PagingPolicy::SearchSensitive { batch_size: 1000 };

    fn names<E: ListEntry>(entries: &[&E]) -> Vec<String> {
        entries.iter().map(|e| e.name().to_string()).collect()
    }

    #[tokio::test]
    async fn test_server_paging_loads_requested_page() {
        let mut list = ListController::new(StaticSource::new(61, SEARCH), 30);
        list.load().await;

        assert_eq!(list.total_pages(), 3);
        assert_eq!(list.page_entries().len(), 30);

        assert!(list.go_to_page(3).await);
        assert_eq!(names(&list.page_entries()), vec!["entry-061"]);
        assert_eq!(
            list.source().queries().last(),
            Some(&ListQuery::Page { limit: 30, offset: 60 })
        );
    }

    #[tokio::test]
    async fn test_go_to_page_out_of_range_is_noop() {
        let mut list = ListController::new(StaticSource::new(61, SEARCH), 30);
        list.load().await;

        assert!(!list.go_to_page(0).await);
        assert!(!list.go_to_page(4).await);
        assert!(!list.previous_page().await);
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.source().queries().len(), 1);
    }

    #[tokio::test]
    async fn test_search_filters_to_single_entry_and_back() {
        let mut list = ListController::new(StaticSource::new(12, SEARCH), 30);
        list.load().await;

        list.set_search_term("ENTRY-007").await;
        assert_eq!(names(&list.filtered()), vec!["entry-007"]);

        list.set_search_term("").await;
        assert_eq!(list.filtered().len(), 12);
    }

    #[tokio::test]
    async fn test_search_presence_flip_switches_to_batch_mode() {
        let mut list = ListController::new(StaticSource::new(61, SEARCH), 30);
        list.load().await;
        list.go_to_page(2).await;

        list.set_search_term("entry").await;
        assert_eq!(list.current_page(), 1);
        assert!(!list.is_server_paged());
        assert_eq!(
            list.source().queries().last(),
            Some(&ListQuery::Page { limit: 1000, offset: 0 })
        );

        // Refining an active search stays local.
        list.set_search_term("entry-0").await;
        assert_eq!(list.source().queries().len(), 3);

        // 61 matches over pages of 30: the last page holds one entry.
        assert_eq!(list.total_pages(), 3);
        assert!(list.go_to_page(3).await);
        assert_eq!(names(&list.page_entries()), vec!["entry-061"]);
        assert_eq!(list.source().queries().len(), 3);

        list.set_search_term("").await;
        assert!(list.is_server_paged());
        assert_eq!(list.source().queries().len(), 4);
    }

    #[tokio::test]
    async fn test_category_scoped_search_never_reloads() {
        let mut list = ListController::new(StaticSource::new(40, PagingPolicy::CategoryScoped), 30);
        list.load().await;

        list.set_search_term("entry-01").await;
        list.set_search_term("").await;

        assert_eq!(list.source().queries().len(), 1);
    }

    #[tokio::test]
    async fn test_set_category_resets_and_pages_locally() {
        let mut list = ListController::new(StaticSource::new(61, PagingPolicy::CategoryScoped), 30);
        list.load().await;
        list.set_search_term("entry-05").await;
        list.go_to_page(2).await;

        list.set_category("healing").await;

        assert_eq!(list.search_term(), "");
        assert_eq!(list.current_page(), 1);
        assert_eq!(
            list.source().queries().last(),
            Some(&ListQuery::Category("healing".into()))
        );
        assert_eq!(list.total_pages(), 3);

        assert!(list.go_to_page(3).await);
        assert_eq!(list.page_entries().len(), 1);
        // Local paging does not refetch.
        assert_eq!(list.source().queries().len(), 3);
    }

    #[tokio::test]
    async fn test_set_category_ignored_without_categories() {
        let mut list = ListController::new(StaticSource::new(5, SEARCH), 30);
        list.set_category("healing").await;
        assert_eq!(list.category(), ALL_CATEGORIES);
        assert!(list.source().queries().is_empty());
    }

    #[tokio::test]
    async fn test_sort_order_resets_page_without_reload() {
        let mut list = ListController::new(StaticSource::new(61, PagingPolicy::CategoryScoped), 30);
        list.set_category("any").await;
        list.go_to_page(2).await;

        list.set_sort_order(SortOrder::NameDesc);

        assert_eq!(list.current_page(), 1);
        assert_eq!(list.page_entries()[0].name(), "entry-061");
        assert_eq!(list.source().queries().len(), 1);
    }

    #[tokio::test]
    async fn test_error_preserves_previous_entries() {
        let mut list = ListController::new(StaticSource::new(10, PagingPolicy::CategoryScoped), 30);
        list.load().await;

        list.set_category("missing").await;

        assert!(!list.is_loading());
        assert_eq!(list.error(), Some("Item category 'missing' could not be found."));
        assert_eq!(list.entries().len(), 10);

        list.set_category("healing").await;
        assert_eq!(list.error(), None);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_failed_load() {
        let mut list = ListController::new(StaticSource::new(61, SEARCH).failing(1), 30);
        list.load().await;

        assert_eq!(
            list.error(),
            Some("A network error occurred. Please check your connection.")
        );
        assert!(list.entries().is_empty());

        list.retry().await;

        assert_eq!(list.error(), None);
        assert!(!list.is_loading());
        assert_eq!(list.entries().len(), 30);
        let queries = list.source().queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0], queries[1]);
    }

    #[tokio::test]
    async fn test_next_page_walks_server_pages() {
        let mut list = ListController::new(StaticSource::new(61, SEARCH), 30);
        list.load().await;

        assert!(list.next_page().await);
        assert!(list.next_page().await);
        assert!(!list.next_page().await);

        assert_eq!(list.current_page(), 3);
        assert_eq!(names(&list.page_entries()), vec!["entry-061"]);
        assert!(list.previous_page().await);
        assert_eq!(list.current_page(), 2);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut list = ListController::new(StaticSource::new(0, SEARCH), 30);
        let first = list.begin_load();
        let second = list.begin_load();

        let fresh = ListBatch {
            entries: vec![NamedApiResource::new("fresh", "")],
            total_count: 1,
        };
        let stale = ListBatch {
            entries: vec![NamedApiResource::new("stale", "")],
            total_count: 1,
        };

        assert!(list.finish_load(second, Ok(fresh)));
        assert!(!list.finish_load(first, Ok(stale)));
        assert_eq!(names(&list.filtered()), vec!["fresh"]);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_cost_sort() {
        let mut items: Vec<Item> = [("potion", 200), ("antidote", 100), ("full-restore", 3000)]
            .into_iter()
            .map(|(name, cost)| Item {
                name: name.to_string(),
                cost,
                ..Item::default()
            })
            .collect();

        items.sort_by(|a, b| SortOrder::CostDesc.compare(a, b));
        assert_eq!(items[0].name, "full-restore");
        items.sort_by(|a, b| SortOrder::CostAsc.compare(a, b));
        assert_eq!(items[0].name, "antidote");

        // Entries without a cost keep their relative order.
        let mut plain = vec![NamedApiResource::new("b", ""), NamedApiResource::new("a", "")];
        plain.sort_by(|a, b| SortOrder::CostAsc.compare(a, b));
        assert_eq!(plain[0].name, "b");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("cost-desc".parse::<SortOrder>(), Ok(SortOrder::CostDesc));
        assert!("price".parse::<SortOrder>().is_err());
    }
}
