use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the application home directory.
///
/// - `None` or empty: platform default (`%APPDATA%/<subdir>` on Windows,
///   `$HOME/<subdir>` elsewhere).
/// - `~` and `~/...` expand to the user's home directory.
/// - Relative paths are joined to the current directory.
///
/// The directory is created when `create` is set.
pub fn resolve_home_dir(configured: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
    let path = match configured.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => platform_base()?.join(default_subdir),
        Some(raw) => {
            let expanded = expand_tilde(raw)?;
            if expanded.is_absolute() {
                expanded
            } else {
                std::env::current_dir()
                    .context("current directory is not accessible")?
                    .join(expanded)
            }
        }
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(path)
}

fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.context("cannot determine the user's home directory")
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return dirs::home_dir().context("cannot expand '~'");
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(dirs::home_dir().context("cannot expand '~'")?.join(rest)),
        None => Ok(Path::new(raw).to_path_buf()),
    }
}
