//! Integration tests for the allocator logging
//!
//! Every test swaps the global logger, so they all run serially.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_memory::galaxy3d::log::{self, Logger, LogEntry, LogSeverity};
use galaxy_3d_memory::galaxy3d::atlas::{AtlasAllocator, AtlasDesc, NamedAtlas};
use galaxy_3d_memory::galaxy3d::memory::{RangeAllocator, RangeTracker};
use galaxy_3d_memory::galaxy3d::Error;
use std::panic::{self as std_panic, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Install a capturing logger that lets everything through
fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);
    log::set_min_severity(LogSeverity::Trace);
    entries
}

fn restore() {
    log::reset_logger();
    log::set_min_severity(LogSeverity::Debug);
}

fn from_source(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries.lock().unwrap()
        .iter()
        .filter(|entry| entry.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_range_allocator_growth_is_logged() {
    let entries = capture();

    let mut allocator = RangeAllocator::<u32>::new(4).unwrap();
    allocator.allocate(4);
    allocator.allocate(1);

    let growth = from_source(&entries, "galaxy3d::RangeAllocator");
    assert_eq!(growth.len(), 1);
    assert_eq!(growth[0].severity, LogSeverity::Debug);
    assert!(growth[0].message.contains("from 4 to 8"));
    assert!(growth[0].file.is_none());

    restore();
}

#[test]
#[serial]
fn test_integration_atlas_chunk_churn_is_traced() {
    let entries = capture();

    let mut atlas = AtlasAllocator::new(AtlasDesc::default()).unwrap();
    let region = atlas.allocate(64, 64);
    atlas.deallocate(region);

    let churn = from_source(&entries, "galaxy3d::AtlasAllocator");
    assert_eq!(churn.len(), 2);
    assert!(churn.iter().all(|entry| entry.severity == LogSeverity::Trace));
    assert!(churn[0].message.contains("bound to size class 64"));
    assert!(churn[1].message.contains("released from size class 64"));

    restore();
}

#[test]
#[serial]
fn test_integration_min_severity_filters_entries() {
    let entries = capture();
    log::set_min_severity(LogSeverity::Info);
    assert_eq!(log::min_severity(), LogSeverity::Info);

    let mut atlas = AtlasAllocator::new(AtlasDesc::default()).unwrap();
    atlas.allocate(64, 64);
    let mut allocator = RangeAllocator::<u8>::new(1).unwrap();
    allocator.allocate(2);

    assert!(entries.lock().unwrap().is_empty());

    restore();
}

#[test]
#[serial]
fn test_integration_config_error_is_logged() {
    let entries = capture();

    let result = RangeTracker::with_capacity(0);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    let errors = from_source(&entries, "galaxy3d::RangeTracker");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, LogSeverity::Error);
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());

    restore();
}

#[test]
#[serial]
fn test_integration_fatal_logs_before_panicking() {
    let entries = capture();

    let mut tracker = RangeTracker::with_capacity(4).unwrap();
    let outcome = std_panic::catch_unwind(AssertUnwindSafe(|| {
        tracker.allocate(5);
    }));
    assert!(outcome.is_err());

    let errors = from_source(&entries, "galaxy3d::RangeTracker");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, LogSeverity::Error);
    assert!(errors[0].message.contains("run out of sections"));
    assert!(errors[0].file.unwrap().ends_with("range_tracker.rs"));

    restore();
}

#[test]
#[serial]
fn test_integration_oversized_atlas_request_is_logged() {
    let entries = capture();

    let mut atlas = NamedAtlas::new(AtlasDesc::default()).unwrap();
    let outcome = std_panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = atlas.insert("sky", 2000, 2000);
    }));
    assert!(outcome.is_err());

    let errors = from_source(&entries, "galaxy3d::AtlasAllocator");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("maximum size of 1024 but was given 2000x2000"));

    restore();
}

#[test]
#[serial]
fn test_integration_reset_logger_stops_capture() {
    let entries = capture();
    log::reset_logger();

    let mut atlas = AtlasAllocator::new(AtlasDesc::default()).unwrap();
    atlas.allocate(64, 64);

    assert!(entries.lock().unwrap().is_empty());

    restore();
}
