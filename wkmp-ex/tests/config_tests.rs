//! Integration tests for explore configuration loading

use serial_test::serial;
use std::fs;
use tempfile::TempDir;
use wkmp_ex::models::{ExploreConfig, ExploreParameters, ServiceEndpoints};
use wkmp_ex::models::config::CONFIG_ENV_VAR;

#[test]
fn test_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wkmp-ex.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"

[explore]
pool_target_size = 60
max_seeds_per_run = 4
musicbrainz_spacing_ms = 1100
call_timeout_ms = 15000

[services]
user_agent = "TestPlayer/1.0 (test@example.com)"
"#,
    )
    .unwrap();

    let config = ExploreConfig::load_from(Some(&path)).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.explore.pool_target_size, 60);
    assert_eq!(config.explore.max_seeds_per_run, 4);
    assert_eq!(config.explore.musicbrainz_spacing().as_millis(), 1100);
    assert_eq!(config.explore.call_timeout().map(|d| d.as_secs()), Some(15));
    // Untouched values keep their defaults
    assert_eq!(config.explore.albums_per_artist, 10);
    assert_eq!(config.services.user_agent, "TestPlayer/1.0 (test@example.com)");
    assert_eq!(
        config.services.musicbrainz_base_url,
        ServiceEndpoints::default().musicbrainz_base_url
    );
}

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ExploreConfig::load_from(Some(&temp_dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, ExploreConfig::default());
}

#[test]
fn test_invalid_tuning_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wkmp-ex.toml");
    fs::write(&path, "[explore]\nmax_seeds_per_run = 0\n").unwrap();

    let err = ExploreConfig::load_from(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("max_seeds_per_run"));
}

#[test]
#[serial]
fn test_load_honours_env_var() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    fs::write(&path, "[explore]\ndisplay_cap = 7\n").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let config = ExploreConfig::load(None).unwrap();

    std::env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.explore.display_cap, 7);
    assert_eq!(
        ExploreParameters {
            display_cap: 7,
            ..Default::default()
        },
        config.explore
    );
}

#[test]
fn test_state_with_default_services() {
    use std::sync::Arc;
    use wkmp_common::events::EventBus;
    use wkmp_ex::models::LibraryArtist;
    use wkmp_ex::types::LibraryProvider;
    use wkmp_ex::ExploreState;

    struct SignedOut;

    #[async_trait::async_trait]
    impl LibraryProvider for SignedOut {
        fn is_authenticated(&self) -> bool {
            false
        }

        async fn list_library_artists(&self) -> wkmp_ex::Result<Vec<LibraryArtist>> {
            Ok(Vec::new())
        }
    }

    let endpoints = ServiceEndpoints::default();
    let state = ExploreState::with_default_services(
        ExploreParameters::default(),
        &endpoints,
        Arc::new(SignedOut),
        EventBus::new(10),
    )
    .unwrap();
    assert_eq!(
        state.limiters().musicbrainz.min_interval().as_millis(),
        1000
    );

    let invalid = ExploreParameters {
        display_cap: 0,
        ..Default::default()
    };
    assert!(ExploreState::with_default_services(
        invalid,
        &endpoints,
        Arc::new(SignedOut),
        EventBus::new(10)
    )
    .is_err());
}
