//! Config file lookup and loading
//!
//! Tests that point XDG_CONFIG_HOME somewhere else are marked #[serial] so they
//! never race each other on the process environment.

use mgc_common::config::{load_toml_config, locate_config_file, ConfigSource, LoadedConfig, TomlConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

/// Records (level, message) of every event it sees
#[derive(Clone, Default)]
struct LogCapture {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        struct MessageVisitor(String);

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{:?}", value);
                }
            }
        }

        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.records
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

fn captured_logs(loaded: &LoadedConfig) -> Vec<(Level, String)> {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, || loaded.log_source());
    capture.records()
}

#[test]
fn test_explicit_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "port = 6000\n[logging]\nlevel = \"warn\"\n").unwrap();

    let loaded = load_toml_config(Some(&path)).unwrap();
    assert_eq!(loaded.config.port, Some(6000));
    assert_eq!(loaded.config.logging.level, "warn");
    assert_eq!(loaded.source, ConfigSource::File(path.clone()));

    let logs = captured_logs(&loaded);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0, Level::INFO);
    assert!(logs[0].1.contains("custom.toml"), "logs: {:?}", logs);
}

#[test]
fn test_defaults_source_logs_a_warning() {
    let loaded = LoadedConfig {
        config: TomlConfig::default(),
        source: ConfigSource::Defaults,
    };

    let logs = captured_logs(&loaded);
    assert_eq!(
        logs,
        vec![(
            Level::WARN,
            "No configuration file found, using built-in defaults".to_string()
        )]
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(load_toml_config(Some(&path)).is_err());
}

#[test]
#[cfg(target_os = "linux")]
#[serial]
fn test_user_config_dir_is_searched() {
    let dir = TempDir::new().unwrap();
    let mgc_dir = dir.path().join("mgc");
    fs::create_dir_all(&mgc_dir).unwrap();
    fs::write(mgc_dir.join("mgc-analyzer.toml"), "upload_dir = \"/srv/uploads\"\n").unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let located = locate_config_file();
    let config = load_toml_config(None);

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(located, Some(mgc_dir.join("mgc-analyzer.toml")));
    assert_eq!(
        config.unwrap().config.upload_dir.as_deref(),
        Some(std::path::Path::new("/srv/uploads"))
    );
}

#[test]
#[cfg(target_os = "linux")]
#[serial]
fn test_no_user_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = load_toml_config(None);

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    // /etc/mgc may exist on a developer box; only assert when it does not
    if !std::path::Path::new("/etc/mgc/mgc-analyzer.toml").exists() {
        let loaded = config.unwrap();
        assert_eq!(loaded.config, TomlConfig::default());
        assert_eq!(loaded.source, ConfigSource::Defaults);
    }
}
