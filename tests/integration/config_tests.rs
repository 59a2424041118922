//! Tests for environment-layered configuration.

use std::sync::Mutex;

use strataoptima::config::{Config, ENV_PREFIX};
use strataoptima::scanner::HashAlgorithm;

// Environment variables are process-global
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all STRATAOPTIMA_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with(ENV_PREFIX) {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_load_without_env_is_default() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    assert_eq!(Config::load(), Config::default());
}

#[test]
fn test_env_overrides_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    std::env::set_var("STRATAOPTIMA_IO_THREADS", "8");
    std::env::set_var("STRATAOPTIMA_BATCH_SIZE", "16");
    std::env::set_var("STRATAOPTIMA_ALGORITHM", "sha1");

    let config = Config::load();
    clear_env();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.batch_size, 16);
    assert_eq!(config.algorithm, HashAlgorithm::Sha1);
    assert_eq!(config.buffer_size, Config::default().buffer_size);
}

#[test]
fn test_env_zero_threads_is_clamped() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    std::env::set_var("STRATAOPTIMA_IO_THREADS", "0");

    let config = Config::load();
    clear_env();

    assert_eq!(config.io_threads, 1);
}

#[test]
fn test_invalid_env_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    std::env::set_var("STRATAOPTIMA_IO_THREADS", "lots");

    let config = Config::load();
    clear_env();

    assert_eq!(config, Config::default());
}

#[test]
fn test_unrelated_env_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    std::env::set_var("STRATAOPTIMA_UNKNOWN_SETTING", "whatever");

    let config = Config::load();
    clear_env();

    assert_eq!(config, Config::default());
}
