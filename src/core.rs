/*
 * This module consolidates the core, UI-agnostic logic of the note explorer:
 * the filesystem abstraction, the platform and configuration seams, the directory
 * ordering, the `Navigator` state object, and the recursive aggregator.
 * Only the items used by the shell and `main` are re-exported here.
 */
pub mod aggregator;
pub mod checksum_utils;
pub mod config;
pub mod directory_lister;
pub mod file_system;
pub mod models;
pub mod navigator;
pub mod path_resolver;

// Re-export key structures and enums
pub use models::DirectoryEntry;

pub use file_system::CoreFileSystem;

pub use aggregator::AggregateSummary;

pub use config::{AppConfig, ConfigManagerOperations, CoreConfigManager};

pub use navigator::{BackOutcome, Navigator, NavigatorError, NavigatorMode, SelectOutcome};

pub use path_resolver::CorePlatformDetector;
