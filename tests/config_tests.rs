use leavedesk::config::Config;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

mod common;

const VARS: [&str; 5] = ["DATABASE_URL", "HOST", "PORT", "ENVIRONMENT", "HOLIDAYS"];

fn snapshot_env() -> Vec<(&'static str, Option<String>)> {
    VARS.iter().map(|key| (*key, env::var(key).ok())).collect()
}

fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
    unsafe {
        for (key, value) in saved {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    common::setup_test_env();
    let saved = snapshot_env();

    unsafe {
        for key in VARS {
            env::remove_var(key);
        }
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/leavedesk");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert!(config.holidays.is_empty());

    restore_env(saved);
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    common::setup_test_env();
    let saved = snapshot_env();

    unsafe {
        env::set_var("DATABASE_URL", "postgres://@localhost:5432/leavedesk_test");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("HOLIDAYS", "2026-01-01, 2026-12-25");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(
        config.database_url,
        "postgres://@localhost:5432/leavedesk_test"
    );
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.environment, "production");
    assert_eq!(config.holidays.len(), 2);

    restore_env(saved);
}

#[test]
#[serial]
fn test_unparseable_holidays_are_skipped() {
    common::setup_test_env();
    let saved = snapshot_env();

    unsafe {
        env::set_var("HOLIDAYS", "2026-01-01,not-a-date,2026-12-25");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.holidays.len(), 2);

    restore_env(saved);
}

#[test]
#[serial]
fn test_config_environment_detection() {
    let saved = snapshot_env();

    unsafe {
        env::set_var("ENVIRONMENT", "production");
    }
    let production_config = Config::from_env_only().unwrap();

    unsafe {
        env::set_var("ENVIRONMENT", "development");
    }
    let development_config = Config::from_env_only().unwrap();

    assert!(production_config.is_production());
    assert!(!production_config.is_development());

    assert!(!development_config.is_production());
    assert!(development_config.is_development());

    restore_env(saved);
}

#[test]
#[serial]
fn test_server_address_formatting() {
    let saved = snapshot_env();

    unsafe {
        env::set_var("HOST", "192.168.1.1");
        env::set_var("PORT", "9000");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.server_address(), "192.168.1.1:9000");

    restore_env(saved);
}
