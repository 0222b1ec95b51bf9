use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_propmatch_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("PROPMATCH_PORT");
        env::remove_var("PROPMATCH_BIND_ADDR");
        env::remove_var("PROPMATCH_MODEL");
        env::remove_var("PROPMATCH_BEST_SIZE");
        env::remove_var("PROPMATCH_CACHE_CAPACITY");
        env::remove_var("PROPMATCH_NO_ANSWER_STRATEGY");
        env::remove_var("PROPMATCH_SUPPRESS_DUPLICATES");
        env::remove_var("PROPMATCH_TOP");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.model_id, DEFAULT_MODEL_ID);
    assert_eq!(config.n_best, 20);
    assert_eq!(config.cache_capacity, 100);
    assert_eq!(config.no_answer_strategy, NoAnswerStrategy::Ignore);
    assert!(!config.suppress_duplicates);
    assert!(config.top.is_none());
    assert!(config.cache_enabled());
}

#[test]
fn test_socket_addr() {
    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_propmatch_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.n_best, 20);
    assert_eq!(config.cache_capacity, 100);
}

#[test]
#[serial]
fn test_from_env_custom_values() {
    clear_propmatch_env();

    with_env_vars(
        &[
            ("PROPMATCH_PORT", "3000"),
            ("PROPMATCH_BIND_ADDR", "::1"),
            ("PROPMATCH_MODEL", "SebastianKotstein/restberta-qa-endpoint-discovery"),
            ("PROPMATCH_BEST_SIZE", "5"),
            ("PROPMATCH_CACHE_CAPACITY", "0"),
            ("PROPMATCH_NO_ANSWER_STRATEGY", "threshold"),
            ("PROPMATCH_SUPPRESS_DUPLICATES", "true"),
            ("PROPMATCH_TOP", "3"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.port, 3000);
            assert_eq!(
                config.bind_addr,
                IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
            );
            assert_eq!(
                config.model_id,
                "SebastianKotstein/restberta-qa-endpoint-discovery"
            );
            assert_eq!(config.n_best, 5);
            assert!(!config.cache_enabled());
            assert_eq!(config.no_answer_strategy, NoAnswerStrategy::Threshold);
            assert!(config.suppress_duplicates);
            assert_eq!(config.top, Some(3));

            let options = config.default_options();
            assert_eq!(options.top, Some(3));
            assert!(options.suppress_duplicates);
            assert_eq!(options.no_answer_strategy, NoAnswerStrategy::Threshold);
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_propmatch_env();

    with_env_vars(&[("PROPMATCH_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_propmatch_env();

    with_env_vars(&[("PROPMATCH_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_propmatch_env();

    with_env_vars(&[("PROPMATCH_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_no_answer_strategy() {
    clear_propmatch_env();

    with_env_vars(&[("PROPMATCH_NO_ANSWER_STRATEGY", "sometimes")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("PROPMATCH_NO_ANSWER_STRATEGY"));
    });
}

#[test]
#[serial]
fn test_legacy_strategy_spelling_accepted() {
    clear_propmatch_env();

    with_env_vars(&[("PROPMATCH_NO_ANSWER_STRATEGY", "treshold")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.no_answer_strategy, NoAnswerStrategy::Threshold);
    });
}

#[test]
#[serial]
fn test_invalid_numbers_fall_back_to_defaults() {
    clear_propmatch_env();

    with_env_vars(
        &[
            ("PROPMATCH_BEST_SIZE", "lots"),
            ("PROPMATCH_CACHE_CAPACITY", "-1"),
            ("PROPMATCH_TOP", "0"),
        ],
        || {
            let config = Config::from_env().expect("should parse with fallback");
            assert_eq!(config.n_best, 20);
            assert_eq!(config.cache_capacity, 100);
            assert!(config.top.is_none());
        },
    );
}

#[test]
fn test_validate_rejects_zero_n_best() {
    let config = Config {
        n_best: 0,
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert!(err.to_string().contains("PROPMATCH_BEST_SIZE"));
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}
