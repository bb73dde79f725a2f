/*
 * This module determines where the note tree lives. It asks the platform detector
 * once for an identifier, maps a recognized mobile platform to its sync folder and
 * everything else to a desktop documents folder, and lets the configuration override
 * both. It also owns the lookup of the application's own configuration directory,
 * which the config and logging layers share.
 */
use super::config::AppConfig;
use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::{Path, PathBuf};

pub const MOBILE_PLATFORM_ID: &str = "android";
pub const MOBILE_SYNC_ROOT: &str = "/storage/emulated/0/Documents/Note";
pub const NOTES_FOLDER_NAME: &str = "Note";

#[derive(Debug)]
pub struct PlatformDetectError {
    pub message: String,
}

impl std::fmt::Display for PlatformDetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Platform detection failed: {}", self.message)
    }
}

impl std::error::Error for PlatformDetectError {}

/// Reports an opaque identifier for the host platform. Called once per process.
pub trait PlatformDetectorOperations: Send + Sync {
    fn detect_platform(&self) -> Result<String, PlatformDetectError>;
}

pub struct CorePlatformDetector {}

impl CorePlatformDetector {
    pub fn new() -> Self {
        CorePlatformDetector {}
    }
}

impl Default for CorePlatformDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformDetectorOperations for CorePlatformDetector {
    fn detect_platform(&self) -> Result<String, PlatformDetectError> {
        let os = std::env::consts::OS;
        if os.is_empty() {
            return Err(PlatformDetectError {
                message: "target OS is not reported".to_string(),
            });
        }
        Ok(os.to_string())
    }
}

/// The desktop-style default: `<documents>/Note`, falling back to `<home>/Documents/Note`
/// and finally to a relative `Note` folder when no home directory is known.
pub fn desktop_default_root() -> PathBuf {
    if let Some(user_dirs) = UserDirs::new() {
        if let Some(documents) = user_dirs.document_dir() {
            return documents.join(NOTES_FOLDER_NAME);
        }
        return user_dirs
            .home_dir()
            .join("Documents")
            .join(NOTES_FOLDER_NAME);
    }
    log::warn!("PathResolver: No home directory found, using relative '{NOTES_FOLDER_NAME}'.");
    PathBuf::from(NOTES_FOLDER_NAME)
}

/// Maps a platform identifier to the root of the note tree.
/// A configured override always wins. Any identifier other than the mobile one,
/// including an empty one, maps to the desktop default.
pub fn resolve_root(platform_id: &str, config: &AppConfig) -> PathBuf {
    if let Some(override_path) = &config.root_path_override {
        log::debug!("PathResolver: Using configured root override {override_path:?}");
        return override_path.clone();
    }
    if platform_id.trim().eq_ignore_ascii_case(MOBILE_PLATFORM_ID) {
        log::debug!("PathResolver: Mobile platform '{platform_id}', using sync folder.");
        return PathBuf::from(MOBILE_SYNC_ROOT);
    }
    let root = desktop_default_root();
    log::debug!("PathResolver: Platform '{platform_id}', using desktop root {root:?}");
    root
}

/// Runs platform detection once and resolves the root. A failed detection falls back
/// to the desktop default instead of leaving the root undefined.
pub fn resolve_root_with_detector(
    detector: &dyn PlatformDetectorOperations,
    config: &AppConfig,
) -> PathBuf {
    match detector.detect_platform() {
        Ok(platform_id) => resolve_root(&platform_id, config),
        Err(e) => {
            log::warn!("PathResolver: {e}. Falling back to the desktop root.");
            resolve_root("", config)
        }
    }
}

/// Creates the root directory when it is missing and the configuration allows it.
/// Returns the error so the caller can report it; navigation still starts and will
/// show an empty listing until the folder exists.
pub fn ensure_root_exists(root: &Path, config: &AppConfig) -> std::io::Result<()> {
    if root.is_dir() || !config.create_root_if_missing {
        return Ok(());
    }
    fs::create_dir_all(root)?;
    log::info!("PathResolver: Created missing root directory {root:?}");
    Ok(())
}

/// Retrieves the application's local configuration directory, creating it if needed.
/// Returns `None` when the platform offers no such directory or it cannot be created.
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathResolver: Attempting to get base app config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathResolver: Failed to create base app config directory {config_path:?}: {e}"
                );
                return None;
            }
            log::debug!("PathResolver: Created base app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}
