// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - A shared Frontier that deduplicates addresses and caps how many are kept
// - A pool of concurrent workers that fetch, extract and admit links
// - Termination by target count, by exhaustion, or by cancellation
// - Optional link graph (which page links to which)
//
// Rust concepts:
// - Arc: shared ownership of the frontier across worker tasks
// - Mutex + atomics: safe shared mutation from many tasks at once
// =============================================================================

pub mod coordinator;
pub mod frontier;

pub use coordinator::Crawler;
pub use frontier::Entry;
