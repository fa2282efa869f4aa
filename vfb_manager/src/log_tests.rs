//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the
//! process-wide logger slot.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "vfb::FrameRing".to_string(),
        message: "submit failed".to_string(),
        file: Some("frame_ring.rs"),
        line: Some(42),
    };
    let copy = entry.clone();
    assert_eq!(copy.severity, LogSeverity::Error);
    assert_eq!(copy.source, "vfb::FrameRing");
    assert_eq!(copy.file, Some("frame_ring.rs"));
    assert_eq!(copy.line, Some(42));
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    for severity in [LogSeverity::Trace, LogSeverity::Info, LogSeverity::Error] {
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: "vfb::test".to_string(),
            message: "message".to_string(),
            file: Some("log_tests.rs"),
            line: Some(1),
        });
    }
}

// ============================================================================
// LOGGER SLOT TESTS
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

#[test]
#[serial]
fn test_macros_reach_custom_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: entries.clone() });

    crate::vfb_info!("vfb::log_tests", "frame {}", 3);
    crate::vfb_warn!("vfb::log_tests", "rejected");
    crate::vfb_error!("vfb::log_tests", "failed");

    log::reset_logger();

    // Other unit tests may log concurrently
    let captured: Vec<LogEntry> = entries.lock().unwrap().iter()
        .filter(|e| e.source == "vfb::log_tests")
        .cloned()
        .collect();
    assert_eq!(captured.len(), 3);
    assert_eq!(captured[0].message, "frame 3");
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert!(captured[0].file.is_none());
    assert_eq!(captured[1].severity, LogSeverity::Warn);
    assert_eq!(captured[2].severity, LogSeverity::Error);
    assert!(captured[2].file.is_some());
    assert!(captured[2].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: entries.clone() });
    log::reset_logger();

    crate::vfb_debug!("vfb::log_tests", "goes to the console");
    assert!(entries.lock().unwrap().iter().all(|e| e.source != "vfb::log_tests"));
}
