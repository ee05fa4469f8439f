//! Integration tests for verbosity level mapping.
//!
//! Each `-v` step may only raise target levels, never lower them, and the
//! rendered directives must parse as an `EnvFilter`.

use logging::{LogLevel, VerbosityConfig, env_filter};

fn levels(config: &VerbosityConfig) -> [LogLevel; 4] {
    [config.classify, config.progress, config.ledger, config.runner]
}

#[test]
fn verbose_level_1_reports_runner_and_ledger() {
    let config = VerbosityConfig::from_verbose_level(1);
    assert_eq!(config.runner, LogLevel::Info);
    assert_eq!(config.ledger, LogLevel::Info);
    assert_eq!(config.classify, LogLevel::Warn);
    assert_eq!(config.progress, LogLevel::Warn);
}

#[test]
fn verbose_level_2_adds_classification() {
    let config = VerbosityConfig::from_verbose_level(2);
    assert_eq!(config.classify, LogLevel::Info);
    assert_eq!(config.progress, LogLevel::Warn);
}

#[test]
fn high_levels_saturate_at_trace() {
    for level in [4, 5, 200] {
        let config = VerbosityConfig::from_verbose_level(level);
        assert!(levels(&config).iter().all(|l| *l == LogLevel::Trace));
    }
}

#[test]
fn verbosity_is_monotonic() {
    for level in 0..5u8 {
        let lower = levels(&VerbosityConfig::from_verbose_level(level));
        let higher = levels(&VerbosityConfig::from_verbose_level(level + 1));
        for (lo, hi) in lower.iter().zip(higher.iter()) {
            assert!(lo <= hi, "level {level} -> {} lowered a target", level + 1);
        }
    }
}

#[test]
fn directives_build_a_filter() {
    let config = VerbosityConfig::from_verbose_level(3);
    let rendered = env_filter(&config).to_string();
    assert!(!rendered.is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn config_round_trips_through_json() {
    let config = VerbosityConfig::from_verbose_level(2);
    let json = serde_json::to_string(&config).expect("serialize");
    assert!(json.contains("\"classify\":\"info\""));
    let back: VerbosityConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, config);
}
