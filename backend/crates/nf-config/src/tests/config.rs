use crate::tests::{EnvGuard, setup_config_dir, write_config};
use crate::{BrokerKind, Config, ConfigError, OverflowPolicy};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(config.server.max_sessions, eq(crate::DEFAULT_MAX_SESSIONS));
    assert_that!(config.broker.kind, eq(BrokerKind::Memory));
    assert_that!(config.stream.buffer_capacity, eq(256));
    assert_that!(config.stream.overflow_policy, eq(OverflowPolicy::DropOldest));
    assert_that!(config.subscription.reconnect_max_delay_secs, eq(30));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_dir_created() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("nested").join("cfg");
    let _guard = EnvGuard::set("NF_CONFIG_DIR", nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert!(nested.exists());
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [server]
            port = 9000
            max_sessions = 500

            [broker]
            kind = "redis"
            url = "redis://cache:6379"

            [stream]
            buffer_capacity = 3
            overflow_policy = "disconnect"

            [subscription]
            grace_period_ms = 250
        "#,
    );

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(9000));
    assert_that!(config.server.max_sessions, eq(500));
    assert_that!(config.broker.kind, eq(BrokerKind::Redis));
    assert_that!(config.broker.url.as_str(), eq("redis://cache:6379"));
    assert_that!(config.stream.buffer_capacity, eq(3));
    assert_that!(config.stream.overflow_policy, eq(OverflowPolicy::Disconnect));
    assert_that!(config.subscription.grace_period_ms, eq(250));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[server]\nport = 9000");
    let _port = EnvGuard::set("NF_SERVER_PORT", "8888");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(8888));
}

#[test]
#[serial]
fn given_multiple_env_overrides_when_load_then_all_apply() {
    // Given
    let _temp = setup_config_dir();
    let _host = EnvGuard::set("NF_SERVER_HOST", "0.0.0.0");
    let _kind = EnvGuard::set("NF_BROKER_KIND", "redis");
    let _policy = EnvGuard::set("NF_STREAM_OVERFLOW_POLICY", "drop_newest");
    let _grace = EnvGuard::set("NF_SUB_GRACE_PERIOD_MS", "0");
    let _colored = EnvGuard::set("NF_LOG_COLORED", "false");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.host.as_str(), eq("0.0.0.0"));
    assert_that!(config.broker.kind, eq(BrokerKind::Redis));
    assert_that!(config.stream.overflow_policy, eq(OverflowPolicy::DropNewest));
    assert_that!(config.subscription.grace_period_ms, eq(0));
    assert_that!(config.logging.colored, eq(false));
}

#[test]
#[serial]
fn given_unparseable_env_value_when_load_then_default_kept() {
    // Given
    let _temp = setup_config_dir();
    let _policy = EnvGuard::set("NF_STREAM_OVERFLOW_POLICY", "drop_everything");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.stream.overflow_policy, eq(OverflowPolicy::DropOldest));
}

#[test]
#[serial]
fn given_log_level_env_when_load_then_level_applied() {
    // Given
    let _temp = setup_config_dir();
    let _level = EnvGuard::set("NF_LOG_LEVEL", "debug");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(*config.logging.level, eq(log::LevelFilter::Debug));
}

// =========================================================================
// Error Path Tests
// =========================================================================

#[test]
#[serial]
fn given_invalid_toml_when_load_then_toml_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[server\nport = ");

    // When
    let result = Config::load();

    // Then
    assert!(matches!(result, Err(ConfigError::Toml { .. })));
}

#[test]
#[serial]
fn given_unknown_policy_in_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[stream]\noverflow_policy = \"block\"");

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_absolute_log_file_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _file = EnvGuard::set("NF_LOG_FILE", "/var/log/nf.log");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_defaults_when_bind_addr_then_host_and_port() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.bind_addr().as_str(), eq("127.0.0.1:8080"));
}
