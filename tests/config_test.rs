use redress::config::Config;
use secrecy::ExposeSecret;

#[test]
fn config_applies_defaults_and_reads_overrides() {
    // Defaults with nothing set.
    unsafe {
        std::env::remove_var("REDRESS_LEDGER_DB");
        std::env::remove_var("CLASSIFIER_URL");
        std::env::remove_var("CLASSIFIER_API_KEY");
        std::env::remove_var("LOG_LEVEL");
    }

    let config = Config::from_env();
    assert_eq!(config.ledger_db, "redress-ledger.db");
    assert!(config.classifier_url.is_none());
    assert!(config.classifier_api_key.is_none());
    assert_eq!(config.log_level, "info");

    // Overrides win.
    unsafe {
        std::env::set_var("REDRESS_LEDGER_DB", "/var/lib/redress/ledger.db");
        std::env::set_var("CLASSIFIER_URL", "http://localhost:9090/classify");
        std::env::set_var("CLASSIFIER_API_KEY", "sk-test-key");
        std::env::set_var("LOG_LEVEL", "debug");
    }

    let config = Config::from_env();
    assert_eq!(config.ledger_db, "/var/lib/redress/ledger.db");
    assert_eq!(
        config.classifier_url.as_deref(),
        Some("http://localhost:9090/classify")
    );
    assert_eq!(
        config.classifier_api_key.unwrap().expose_secret(),
        "sk-test-key"
    );
    assert_eq!(config.log_level, "debug");

    unsafe {
        std::env::remove_var("REDRESS_LEDGER_DB");
        std::env::remove_var("CLASSIFIER_URL");
        std::env::remove_var("CLASSIFIER_API_KEY");
        std::env::remove_var("LOG_LEVEL");
    }
}
