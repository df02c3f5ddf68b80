use crate::config::{LoggingConfig, Section};
use anyhow::{Context, Result};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

// -------- filtering --------

type CrateFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Everything outside the explicitly configured subsystems, up to `max_level`.
fn default_filter_excluding(subsystems: &[String], max_level: tracing::Level) -> CrateFilter {
    let subsystems = subsystems.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        !subsystems.iter().any(|s| matches_crate_prefix(t, s)) && meta.level() <= &max_level
    }))
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotWriter {
    fn handle(&self) -> RotWriterHandle {
        RotWriterHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotWriterHandle {
    fn with_file<T>(&self, f: impl FnOnce(&mut FileRotate<AppendTimestamp>) -> std::io::Result<T>) -> std::io::Result<T> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        f(&mut *file)
    }
}

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

// A writer handle that may be None (drops writes)
#[derive(Clone)]
struct RoutedWriterHandle(Option<RotWriterHandle>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to
/// the "default" file. Longer prefixes win.
#[derive(Clone, Default)]
struct MultiFileRouter {
    default: Option<RotWriter>,
    by_prefix: Vec<(String, RotWriter)>,
}

impl MultiFileRouter {
    fn insert(&mut self, prefix: String, writer: RotWriter) {
        self.by_prefix.push((prefix, writer));
        self.by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    fn resolve_for(&self, target: &str) -> Option<RotWriterHandle> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_crate_prefix(target, prefix))
            .map(|(_, w)| w)
            .or(self.default.as_ref())
            .map(RotWriter::handle)
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for MultiFileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.as_ref().map(RotWriter::handle))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

// -------- config extraction --------

struct ConfigData<'a> {
    default_section: Option<&'a Section>,
    subsystem_sections: Vec<(String, &'a Section)>,
    subsystem_names: Vec<String>,
}

fn extract_config_data(cfg: &LoggingConfig) -> ConfigData<'_> {
    let mut subsystem_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();
    subsystem_sections.sort_by(|a, b| a.0.cmp(&b.0));

    let subsystem_names = subsystem_sections.iter().map(|(n, _)| n.clone()).collect();

    ConfigData {
        default_section: cfg.get("default"),
        subsystem_sections,
        subsystem_names,
    }
}

// -------- path resolution helpers --------

/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Rotated files get a timestamp suffix; old ones are pruned by age when
/// `max_age_days` is set, otherwise by count (`max_backups`), otherwise
/// after one day.
fn file_limit(section: &Section) -> FileLimit {
    match (section.max_age_days, section.max_backups) {
        (Some(days), _) => FileLimit::Age(chrono::Duration::days(i64::from(days.max(1)))),
        (None, Some(n)) => FileLimit::MaxFiles(n.max(1)),
        (None, None) => FileLimit::Age(chrono::Duration::days(1)),
    }
}

fn create_rotating_writer_at_path(log_path: &Path, max_bytes: usize, limit: FileLimit) -> Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(limit),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn file_writer_for(subsystem: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, file_limit(section)) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // The subscriber is not installed yet.
            eprintln!(
                "Failed to init log file for '{}': {} ({:#})",
                subsystem,
                log_path.display(),
                e
            );
            None
        }
    }
}

// -------- public init --------

/// Install the global `tracing` subscriber.
///
/// - `cfg`: subsystem → section; "default" covers every other target
/// - `base_dir`: resolves relative log file paths (usually `server.home_dir`)
///
/// Console output goes to stderr so command output on stdout stays clean.
/// Calling this twice keeps the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let config_data = extract_config_data(cfg);
    let console_targets = build_console_targets(&config_data);
    let file_router = build_file_router(&config_data, base_dir);
    let file_targets = build_file_targets(&config_data);

    build_logging_layers(config_data, console_targets, file_targets, file_router);
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn build_console_targets(config: &ConfigData) -> Targets {
    use tracing::level_filters::LevelFilter;

    config
        .subsystem_sections
        .iter()
        .filter_map(|(name, section)| {
            parse_tracing_level(&section.console_level)
                .map(|level| (name.clone(), LevelFilter::from_level(level)))
        })
        .fold(Targets::new().with_default(LevelFilter::OFF), |targets, (name, level)| {
            targets.with_target(name, level)
        })
}

fn build_file_router(config: &ConfigData, base_dir: &Path) -> MultiFileRouter {
    let mut router = MultiFileRouter {
        default: config
            .default_section
            .and_then(|section| file_writer_for("default", section, base_dir)),
        ..MultiFileRouter::default()
    };

    for (name, section) in &config.subsystem_sections {
        if let Some(writer) = file_writer_for(name, section, base_dir) {
            router.insert(name.clone(), writer);
        }
    }

    router
}

fn build_file_targets(config: &ConfigData) -> Targets {
    use tracing::level_filters::LevelFilter;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (name, section) in &config.subsystem_sections {
        if section.file.trim().is_empty() {
            continue;
        }
        if let Some(level) = parse_tracing_level(&section.file_level).map(LevelFilter::from_level) {
            targets = targets.with_target(name.clone(), level);
        }
    }
    targets
}

fn build_logging_layers(
    config: ConfigData,
    console_targets: Targets,
    file_targets: Targets,
    file_router: MultiFileRouter,
) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    let ansi = std::io::stderr().is_terminal();

    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let console_default = config
        .default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(default_filter_excluding(&config.subsystem_names, level))
        });

    let explicit_file_layer = (!file_router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(file_router.clone())
            .with_filter(file_targets)
    });

    let file_default = match (config.default_section, file_router.default.is_some()) {
        (Some(section), true) => parse_tracing_level(&section.file_level).map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(file_router)
                .with_filter(default_filter_excluding(&config.subsystem_names, level))
        }),
        _ => None,
    };

    let _ = Registry::default()
        .with(console_layer)
        .with(explicit_file_layer)
        .with(console_default)
        .with(file_default)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_age_days: None,
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO));
    }

    #[test]
    fn test_prefix_matching() {
        assert!(matches_crate_prefix("db_integrity", "db_integrity"));
        assert!(matches_crate_prefix("db_integrity::parser", "db_integrity"));
        assert!(!matches_crate_prefix("db_integrity_extra", "db_integrity"));
        assert!(!matches_crate_prefix("api_errors", "db_integrity"));
    }

    #[test]
    fn test_extract_config_data() {
        let mut cfg = default_logging_config();
        cfg.insert("db_integrity".into(), section("logs/db.log"));
        cfg.insert("apikit".into(), section(""));

        let data = extract_config_data(&cfg);
        assert!(data.default_section.is_some());
        assert_eq!(data.subsystem_names, vec!["apikit".to_string(), "db_integrity".to_string()]);
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let absolute = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&absolute.to_string_lossy(), Path::new("/ignored")), absolute);
    }

    #[test]
    fn test_file_limit_selection() {
        let mut s = section("x.log");
        assert!(matches!(file_limit(&s), FileLimit::MaxFiles(2)));
        s.max_age_days = Some(7);
        assert!(matches!(file_limit(&s), FileLimit::Age(_)));
        s.max_age_days = None;
        s.max_backups = None;
        assert!(matches!(file_limit(&s), FileLimit::Age(_)));
    }

    #[test]
    fn test_create_rotating_writer_at_path_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let res = create_rotating_writer_at_path(&p, 128 * 1024, FileLimit::MaxFiles(1));
        assert!(res.is_ok(), "writer should be created");
        assert!(p.parent().unwrap().exists(), "parent dir must be created");
    }

    #[test]
    fn test_router_prefers_longest_prefix() {
        let tmp = tempdir().unwrap();
        let mut router = MultiFileRouter::default();
        assert!(router.is_empty());

        let general = file_writer_for("api_errors", &section("general.log"), tmp.path()).unwrap();
        let specific = file_writer_for("api_errors::integrity", &section("specific.log"), tmp.path()).unwrap();
        router.insert("api_errors".into(), general.clone());
        router.insert("api_errors::integrity".into(), specific.clone());

        let resolved = router.resolve_for("api_errors::integrity").unwrap();
        assert!(Arc::ptr_eq(&resolved.0, &specific.0));
        let resolved = router.resolve_for("api_errors::problem").unwrap();
        assert!(Arc::ptr_eq(&resolved.0, &general.0));
        assert!(router.resolve_for("paging_core").is_none());
    }

    #[test]
    fn test_empty_file_disables_writer() {
        let tmp = tempdir().unwrap();
        assert!(file_writer_for("default", &section("  "), tmp.path()).is_none());
    }

    #[test]
    fn test_config_logging_integration_with_base_dir() {
        let temp_dir = tempdir().unwrap();
        let home = temp_dir.path().join("home");
        let config_path = temp_dir.path().join("test_config.yaml");

        let yaml_content = format!(
            r#"
server:
  home_dir: "{}"

logging:
  default:
    console_level: info
    file: ""
    file_level: debug
  db_integrity:
    console_level: debug
    file: "logs/integrity.log"
    file_level: warn
    max_size_mb: 5
    max_backups: 2
"#,
            home.to_string_lossy().replace('\\', "/")
        );
        fs::write(&config_path, yaml_content).unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let data = extract_config_data(config.logging.as_ref().unwrap());
        let router = build_file_router(&data, &config.home_dir());

        assert!(router.default.is_none());
        assert_eq!(router.by_prefix.len(), 1);
        assert!(home.join("logs").is_dir());
    }
}
