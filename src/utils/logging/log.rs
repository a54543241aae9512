//! Logging utilities
//!
//! This module provides standardized logging functions for operations.

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `subject` - What the operation works on
pub fn log_operation_start(operation: &str, subject: &str) {
    log::info!("{operation} {subject}");
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Past-tense description of the operation
/// * `subject` - What the items belong to
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    subject: &str,
    items: usize,
    elapsed: Option<std::time::Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!("Successfully {operation} {items} {subject} items in {duration:?}");
    } else {
        log::info!("Successfully {operation} {items} {subject} items");
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `subject` - Optional subject related to the warning
pub fn log_warning(message: &str, subject: Option<&str>) {
    if let Some(subject) = subject {
        log::warn!("{message}: {subject}");
    } else {
        log::warn!("{message}");
    }
}
