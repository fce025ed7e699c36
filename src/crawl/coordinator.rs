// src/crawl/coordinator.rs
// =============================================================================
// This module runs the crawl with a fixed pool of concurrent workers.
//
// How it works:
// 1. Create an empty Frontier whose capacity is the target count
// 2. Admit the seed address
// 3. Spawn `workers` tokio tasks, each looping:
//    a. claim one Pending address from the frontier
//    b. fetch it, extract links, normalize them, apply the host filter
//    c. add every surviving link to the frontier
// 4. Wait for every worker, then hand the frontier back for dumping
//
// When does a worker stop?
// - The frontier holds `max_count` addresses (the normal case)
// - Nothing is pending AND no worker is mid-fetch: the reachable set is
//   smaller than `max_count`, nothing new can ever appear
// - The crawl was cancelled (Ctrl-C or deadline)
//
// An empty claim on its own is NOT a reason to stop, because another worker
// may be about to add links. Idle workers poll again with a growing delay.
//
// A failed fetch or an unparseable page only costs that one address. It is
// logged and the worker moves on.
// =============================================================================

use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::frontier::{AdmitResult, Frontier, Status};
use crate::address::{normalize, Address};
use crate::extract::LinkExtractor;
use crate::fetch::Fetcher;
use crate::filter::HostFilter;

const MIN_IDLE_DELAY: Duration = Duration::from_millis(5);
const MAX_IDLE_DELAY: Duration = Duration::from_millis(100);

/// Counters collected while crawling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub links_found: usize,
    pub links_rejected: usize,
    pub links_admitted: usize,
    pub duplicates: usize,
    pub capacity_rejections: usize,
    pub addresses: usize,
    pub never_fetched: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn write_stats_to_stderr(&self) {
        eprintln!("\n=== Crawl Statistics ===");
        eprintln!("Addresses found: {}", self.addresses);
        eprintln!("Addresses never fetched: {}", self.never_fetched);
        eprintln!("Pages fetched: {}", self.pages_fetched);
        eprintln!("Pages failed: {}", self.pages_failed);
        eprintln!("Links discovered: {}", self.links_found);
        eprintln!("Links rejected (invalid or filtered): {}", self.links_rejected);
        eprintln!("Links admitted: {}", self.links_admitted);
        eprintln!("Duplicate links: {}", self.duplicates);
        eprintln!("Links over capacity: {}", self.capacity_rejections);
        if self.cancelled {
            eprintln!("Crawl was cancelled before completion");
        }
        eprintln!("Total duration: {:.2}s", self.elapsed.as_secs_f64());
        eprintln!("========================\n");
    }
}

#[derive(Debug, Default)]
struct Counters {
    pages_fetched: AtomicUsize,
    pages_failed: AtomicUsize,
    links_found: AtomicUsize,
    links_rejected: AtomicUsize,
    links_admitted: AtomicUsize,
    duplicates: AtomicUsize,
    capacity_rejections: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// What `Crawler::run` hands back
#[derive(Debug)]
pub struct CrawlOutcome {
    pub frontier: Arc<Frontier>,
    pub stats: CrawlStats,
}

/// Owns the crawl collaborators; one `run` drives one crawl
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: LinkExtractor,
    filter: HostFilter,
    graph: bool,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: LinkExtractor,
        filter: HostFilter,
        graph: bool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            filter,
            graph,
        }
    }

    // Crawls from `seed` until `max_count` addresses are known
    //
    // Parameters:
    //   seed: the first address (already normalized)
    //   max_count: target number of addresses, also the frontier capacity
    //              (0 = keep going until exhausted or cancelled)
    //   workers: how many concurrent fetch loops to run
    //   cancel: stops every worker when triggered
    //
    // Returns: the frontier (for dumping) and crawl statistics
    pub async fn run(
        &self,
        seed: Address,
        max_count: usize,
        workers: usize,
        cancel: CancellationToken,
    ) -> CrawlOutcome {
        let started = Instant::now();
        let frontier = Arc::new(Frontier::new(max_count, self.graph));

        // The frontier is empty, so the seed is always admitted
        frontier.add(seed.clone(), None);

        let shared = Arc::new(Shared {
            frontier: Arc::clone(&frontier),
            fetcher: Arc::clone(&self.fetcher),
            extractor: self.extractor.clone(),
            filter: self.filter.clone(),
            counters: Counters::default(),
            max_count,
            cancel: cancel.clone(),
        });

        info!(
            "Starting crawl from {} with {} worker(s), target {} address(es)",
            seed,
            workers,
            match frontier.capacity() {
                0 => "unbounded".to_string(),
                capacity => capacity.to_string(),
            }
        );

        let handles: Vec<_> = (0..workers.max(1))
            .map(|id| tokio::spawn(work(Arc::clone(&shared), id)))
            .collect();

        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!("Worker task failed: {}", e);
            }
        }

        let counters = &shared.counters;
        let stats = CrawlStats {
            pages_fetched: counters.pages_fetched.load(Ordering::Relaxed),
            pages_failed: counters.pages_failed.load(Ordering::Relaxed),
            links_found: counters.links_found.load(Ordering::Relaxed),
            links_rejected: counters.links_rejected.load(Ordering::Relaxed),
            links_admitted: counters.links_admitted.load(Ordering::Relaxed),
            duplicates: counters.duplicates.load(Ordering::Relaxed),
            capacity_rejections: counters.capacity_rejections.load(Ordering::Relaxed),
            addresses: frontier.snapshot_size(),
            never_fetched: frontier
                .dump_all()
                .iter()
                .filter(|e| e.status == Status::Pending)
                .count(),
            cancelled: cancel.is_cancelled(),
            elapsed: started.elapsed(),
        };

        info!(
            "Found {} urls in {:.3} seconds",
            stats.addresses,
            stats.elapsed.as_secs_f64()
        );

        CrawlOutcome { frontier, stats }
    }
}

// Everything a worker task needs, shared between all of them
struct Shared {
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: LinkExtractor,
    filter: HostFilter,
    counters: Counters,
    max_count: usize,
    cancel: CancellationToken,
}

impl Shared {
    fn target_reached(&self) -> bool {
        self.max_count > 0 && self.frontier.snapshot_size() >= self.max_count
    }

    // Fetches one address and feeds its links into the frontier
    async fn visit(&self, address: &Address) {
        info!("Scraping {}...", address);

        let page = match self.fetcher.fetch(address).await {
            Ok(page) => page,
            Err(e) => {
                debug!("{}", e);
                bump(&self.counters.pages_failed);
                return;
            }
        };

        if self.cancel.is_cancelled() {
            return;
        }

        // Links resolve against where the page was served from; edges are
        // still recorded against the claimed address
        let links = match self.extractor.extract(&page.body, &page.url) {
            Ok(links) => links,
            Err(e) => {
                debug!("{}", e);
                bump(&self.counters.pages_failed);
                return;
            }
        };
        bump(&self.counters.pages_fetched);

        let linked_from = self.frontier.is_graph().then_some(address);

        for raw in links {
            bump(&self.counters.links_found);

            let candidate = match normalize(&raw) {
                Ok(candidate) => candidate,
                Err(e) => {
                    debug!("{}", e);
                    bump(&self.counters.links_rejected);
                    continue;
                }
            };

            if !self.filter.allows(&candidate) {
                bump(&self.counters.links_rejected);
                continue;
            }

            match self.frontier.add(candidate, linked_from) {
                AdmitResult::Admitted => bump(&self.counters.links_admitted),
                AdmitResult::Duplicate => bump(&self.counters.duplicates),
                AdmitResult::CapacityReached => {
                    bump(&self.counters.capacity_rejections);
                    // Graph mode keeps going so the remaining edges get recorded
                    if !self.frontier.is_graph() {
                        break;
                    }
                }
            }
        }
    }
}

// Releases a claim when dropped, whether the visit finished, failed or was
// abandoned by cancellation
struct Claim<'a>(&'a Frontier);

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

struct IdleBackoff {
    delay: Duration,
}

impl IdleBackoff {
    fn new() -> Self {
        Self { delay: MIN_IDLE_DELAY }
    }

    fn reset(&mut self) {
        self.delay = MIN_IDLE_DELAY;
    }

    fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(MAX_IDLE_DELAY);
        current
    }
}

async fn work(shared: Arc<Shared>, id: usize) {
    let mut backoff = IdleBackoff::new();

    loop {
        if shared.cancel.is_cancelled() {
            debug!("Worker {} cancelled", id);
            break;
        }

        if shared.target_reached() {
            debug!("Worker {} stopping: target count reached", id);
            break;
        }

        match shared.frontier.claim_next() {
            Some(address) => {
                backoff.reset();
                let _claim = Claim(&shared.frontier);

                tokio::select! {
                    biased;
                    _ = shared.cancel.cancelled() => {
                        debug!("Worker {} abandoned {}", id, address);
                        break;
                    }
                    _ = shared.visit(&address) => {}
                }
            }
            None => {
                if shared.frontier.is_exhausted() {
                    debug!("Worker {} stopping: frontier exhausted", id);
                    break;
                }

                tokio::select! {
                    _ = shared.cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff.next_delay()) => {}
                }
            }
        }
    }

    debug!("Worker {} exiting ({} still in flight)", id, shared.frontier.in_flight());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CrawlError, FetchErrorKind, Result};
    use crate::extract::ExtractorKind;
    use crate::fetch::Page;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use url::Url;

    // Serves canned bodies; anything else is a 404
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        // address -> URL the body is "really" served from
        served_from: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn with_page(mut self, address: &str, body: &str) -> Self {
            self.pages.insert(address.to_string(), body.to_string());
            self
        }

        fn with_redirect(mut self, address: &str, final_url: &str) -> Self {
            self.served_from.insert(address.to_string(), final_url.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, address: &Address) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let body = self.pages.get(address.as_str()).ok_or_else(|| CrawlError::Fetch {
                address: address.to_string(),
                kind: FetchErrorKind::Status(404),
            })?;
            let url = match self.served_from.get(address.as_str()) {
                Some(final_url) => Url::parse(final_url).unwrap(),
                None => address.as_url().clone(),
            };
            Ok(Page {
                url,
                body: body.clone().into_bytes(),
            })
        }
    }

    // Never answers
    struct HangingFetcher;

    #[async_trait]
    impl Fetcher for HangingFetcher {
        async fn fetch(&self, address: &Address) -> Result<Page> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Page {
                url: address.as_url().clone(),
                body: Vec::new(),
            })
        }
    }

    fn crawler_with(fetcher: Arc<dyn Fetcher>, kind: ExtractorKind, filter: HostFilter, graph: bool) -> Crawler {
        let extractor = LinkExtractor::new(kind).unwrap();
        Crawler::new(fetcher, extractor, filter, graph)
    }

    fn crawler(fetcher: Arc<dyn Fetcher>, filter: HostFilter, graph: bool) -> Crawler {
        crawler_with(fetcher, ExtractorKind::Pattern, filter, graph)
    }

    fn seed(raw: &str) -> Address {
        normalize(raw).unwrap()
    }

    fn addresses(outcome: &CrawlOutcome) -> Vec<String> {
        outcome
            .frontier
            .dump_all()
            .into_iter()
            .map(|e| e.address.to_string())
            .collect()
    }

    fn link(target: &str) -> String {
        format!(r#"<a href="{}">x</a>"#, target)
    }

    #[tokio::test]
    async fn test_host_filter_end_to_end() {
        let body = format!("{}{}", link("https://a.example/one"), link("https://b.example/two"));
        let fetcher = StubFetcher::default().with_page("https://a.example/", &body);
        let filter = HostFilter::exact("a.example").unwrap();

        let outcome = crawler(Arc::new(fetcher), filter, false)
            .run(seed("https://a.example/"), 5, 1, CancellationToken::new())
            .await;

        assert_eq!(addresses(&outcome), vec!["https://a.example/", "https://a.example/one"]);
        assert_eq!(outcome.stats.links_rejected, 1);
        assert_eq!(outcome.stats.pages_fetched, 1);
        // /one is not served by the stub
        assert_eq!(outcome.stats.pages_failed, 1);
        assert!(!outcome.stats.cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_terminates_when_reachable_set_is_exhausted() {
        // A chain of 10 pages, each linking to the next and back to the root
        let mut fetcher = StubFetcher::default();
        for i in 0..10 {
            let body = format!("{}{}", link(&format!("https://a.example/{}", i + 1)), link("https://a.example/0"));
            fetcher = fetcher.with_page(&format!("https://a.example/{}", i), &body);
        }
        let fetcher = Arc::new(fetcher);

        let crawler = crawler(fetcher.clone(), HostFilter::Unrestricted, false);
        let run = crawler.run(seed("https://a.example/0"), 100, 4, CancellationToken::new());
        let outcome = tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("crawl must not deadlock");

        // 0..=10 are known; 10 itself 404s
        assert_eq!(outcome.frontier.snapshot_size(), 11);
        assert!(outcome.frontier.snapshot_size() < 100);
        assert!(outcome.frontier.dump_all().iter().all(|e| e.status == Status::Visited));
        // Every address was fetched exactly once
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stops_at_max_count() {
        let body: String = (0..50).map(|i| link(&format!("https://a.example/p{}", i))).collect();
        let mut fetcher = StubFetcher::default().with_page("https://a.example/", &body);
        for i in 0..50 {
            fetcher = fetcher.with_page(&format!("https://a.example/p{}", i), &body);
        }

        let outcome = crawler(Arc::new(fetcher), HostFilter::Unrestricted, false)
            .run(seed("https://a.example/"), 7, 3, CancellationToken::new())
            .await;

        assert_eq!(outcome.frontier.snapshot_size(), 7);
        assert_eq!(outcome.frontier.dump_all().len(), 7);
        assert!(outcome.stats.capacity_rejections >= 1);
    }

    #[tokio::test]
    async fn test_failed_seed_terminates() {
        let outcome = crawler(Arc::new(StubFetcher::default()), HostFilter::Unrestricted, false)
            .run(seed("https://a.example/"), 10, 3, CancellationToken::new())
            .await;

        assert_eq!(addresses(&outcome), vec!["https://a.example/"]);
        assert_eq!(outcome.stats.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_graph_mode_records_edges() {
        let body = format!(
            "{}{}{}",
            link("https://a.example/one"),
            link("https://a.example/two?ref=x"),
            link("https://a.example/one#again")
        );
        let fetcher = StubFetcher::default()
            .with_page("https://a.example/", &body)
            .with_page("https://a.example/one", &link("https://a.example/"));

        let outcome = crawler(Arc::new(fetcher), HostFilter::Unrestricted, true)
            .run(seed("https://a.example/"), 0, 2, CancellationToken::new())
            .await;

        let entries = outcome.frontier.dump_all();
        let outgoing = |raw: &str| {
            entries
                .iter()
                .find(|e| e.address.as_str() == raw)
                .and_then(|e| e.outgoing.clone())
                .unwrap()
                .into_iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(outgoing("https://a.example/"), vec!["https://a.example/one", "https://a.example/two"]);
        assert_eq!(outgoing("https://a.example/one"), vec!["https://a.example/"]);
        assert!(outgoing("https://a.example/two").is_empty());
    }

    #[tokio::test]
    async fn test_relative_links_resolve_against_served_url() {
        // /docs is served from /docs/, so "intro" means /docs/intro
        let fetcher = StubFetcher::default()
            .with_page("https://a.example/docs", r#"<a href="intro">Intro</a>"#)
            .with_redirect("https://a.example/docs", "https://a.example/docs/")
            .with_page("https://a.example/docs/intro", r#"<a href="../faq">FAQ</a>"#);

        let outcome = crawler_with(Arc::new(fetcher), ExtractorKind::Html, HostFilter::Unrestricted, true)
            .run(seed("https://a.example/docs/"), 0, 2, CancellationToken::new())
            .await;

        assert_eq!(
            addresses(&outcome),
            vec!["https://a.example/docs", "https://a.example/docs/intro", "https://a.example/faq"]
        );
        // Edges hang off the claimed address, not the served URL
        let entries = outcome.frontier.dump_all();
        let docs = entries.iter().find(|e| e.address.as_str() == "https://a.example/docs").unwrap();
        assert_eq!(docs.outgoing.as_deref().unwrap(), &[seed("https://a.example/docs/intro")]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let fetcher = Arc::new(StubFetcher::default().with_page("https://a.example/", &link("https://a.example/x")));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = crawler(fetcher.clone(), HostFilter::Unrestricted, false)
            .run(seed("https://a.example/"), 10, 2, cancel)
            .await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(addresses(&outcome), vec!["https://a.example/"]);
        assert!(outcome.stats.cancelled);
    }

    #[tokio::test]
    async fn test_cancel_abandons_hanging_fetches() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let crawler = crawler(Arc::new(HangingFetcher), HostFilter::Unrestricted, false);
        let run = crawler.run(seed("https://a.example/"), 10, 4, cancel);
        let outcome = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("cancellation must stop the crawl");

        assert!(outcome.stats.cancelled);
        assert_eq!(outcome.frontier.snapshot_size(), 1);
        assert_eq!(outcome.frontier.in_flight(), 0);
    }

    #[test]
    fn test_idle_backoff_is_bounded() {
        let mut backoff = IdleBackoff::new();
        let delays: Vec<_> = (0..10).map(|_| backoff.next_delay()).collect();
        assert_eq!(delays[0], MIN_IDLE_DELAY);
        assert!(delays.iter().all(|d| *d <= MAX_IDLE_DELAY));
        assert_eq!(*delays.last().unwrap(), MAX_IDLE_DELAY);

        backoff.reset();
        assert_eq!(backoff.next_delay(), MIN_IDLE_DELAY);
    }
}
