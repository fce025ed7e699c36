// src/crawl/frontier.rs
// =============================================================================
// The frontier: every address the crawl has ever discovered.
//
// This is the ONLY shared mutable state in the crawler. Every worker goes
// through it to answer two questions:
// - "Have we seen this address before?"  -> add()
// - "What should I fetch next?"          -> claim_next()
//
// Layout (all behind one Mutex):
// - entries: HashMap<Address, Entry>, the authoritative dedup/status table
// - queue: VecDeque<Address> of Pending addresses, so claiming is O(1)
//   instead of scanning the whole map for an unvisited entry
// - in_flight: how many claimed addresses are still being worked on
//
// Rules:
// - An address is stored at most once
// - The number of entries never exceeds the capacity (0 = no cap)
// - Status only moves Pending -> Visited
// - Once full, nothing new is admitted; claims already handed out finish
//
// Graph mode additionally records, for each page, the addresses it links to.
// Edges are best-effort: they are still appended after the capacity is hit,
// as long as the page they start from is already known.
//
// Rust concepts:
// - Interior mutability: &self methods mutate through a Mutex
// - Atomics: count is mirrored in an AtomicUsize so it can be read lock-free
// =============================================================================

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::address::Address;

/// Lifecycle of a discovered address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Discovered, not yet fetched
    Pending,
    /// A worker has claimed (or finished) fetching it
    Visited,
}

/// One record per known address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub address: Address,
    pub status: Status,
    /// Outbound links in discovery order (graph mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<Address>>,
}

/// Outcome of Frontier::add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitResult {
    Admitted,
    Duplicate,
    /// Not an error: the caller should stop admitting
    CapacityReached,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Address, Entry>,
    queue: VecDeque<Address>,
    in_flight: usize,
}

#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<Inner>,
    count: AtomicUsize,
    capacity: usize,
    graph: bool,
}

impl Frontier {
    // Creates an empty frontier
    //
    // Parameters:
    //   capacity: the most distinct addresses ever admitted (0 = unbounded)
    //   graph: whether to record outgoing links per page
    pub fn new(capacity: usize, graph: bool) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            count: AtomicUsize::new(0),
            capacity,
            graph,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_graph(&self) -> bool {
        self.graph
    }

    /// Offers a normalized address to the frontier.
    ///
    /// `linked_from` is the page the address was found on; it is only used in
    /// graph mode, and only if that page is already known.
    pub fn add(&self, address: Address, linked_from: Option<&Address>) -> AdmitResult {
        let mut inner = self.inner.lock();

        if self.graph {
            if let Some(from) = linked_from {
                record_edge(&mut inner.entries, from, &address);
            }
        }

        if self.capacity > 0 && inner.entries.len() >= self.capacity {
            return AdmitResult::CapacityReached;
        }

        if inner.entries.contains_key(&address) {
            return AdmitResult::Duplicate;
        }

        let entry = Entry {
            address: address.clone(),
            status: Status::Pending,
            outgoing: self.graph.then(Vec::new),
        };
        inner.entries.insert(address.clone(), entry);
        inner.queue.push_back(address);
        self.count.store(inner.entries.len(), Ordering::Release);

        AdmitResult::Admitted
    }

    /// Atomically takes one Pending address, marks it Visited and returns it.
    ///
    /// `None` means nothing is pending *right now*; other workers may still
    /// add more. Every `Some` must be matched by a call to `finish`.
    pub fn claim_next(&self) -> Option<Address> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        while let Some(address) = inner.queue.pop_front() {
            match inner.entries.get_mut(&address) {
                Some(entry) if entry.status == Status::Pending => {
                    entry.status = Status::Visited;
                    inner.in_flight += 1;
                    return Some(address);
                }
                // Only Pending entries are ever queued, but never hand out
                // the same address twice
                _ => continue,
            }
        }

        None
    }

    /// Marks one claimed address as done (fetched, failed or abandoned)
    pub fn finish(&self) {
        let mut inner = self.inner.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// Nothing pending and nobody working: no more addresses can ever appear
    pub fn is_exhausted(&self) -> bool {
        let inner = self.inner.lock();
        inner.queue.is_empty() && inner.in_flight == 0
    }

    /// Number of admitted addresses (may be stale by the time it's used)
    pub fn snapshot_size(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    /// A consistent copy of every entry, sorted by address
    pub fn dump_all(&self) -> Vec<Entry> {
        let inner = self.inner.lock();
        let mut entries: Vec<Entry> = inner.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address));
        entries
    }
}

fn record_edge(entries: &mut HashMap<Address, Entry>, from: &Address, to: &Address) {
    if let Some(outgoing) = entries.get_mut(from).and_then(|e| e.outgoing.as_mut()) {
        if !outgoing.contains(to) {
            outgoing.push(to.clone());
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why parking_lot::Mutex instead of std::sync::Mutex?
//    - lock() returns the guard directly, no Result to unwrap
//    - A panicking worker does not "poison" the lock for everyone else
//
// 2. Why is the lock never held across an .await?
//    - Every method here is a plain (non-async) fn
//    - The guard is dropped before the worker goes back to the network
//
// 3. What does `self.graph.then(Vec::new)` do?
//    - bool::then returns Some(f()) when true, None when false
//    - So graph-mode entries start with an empty outgoing list
// -----------------------------------------------------------------------------
