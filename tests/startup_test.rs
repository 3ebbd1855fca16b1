use maps_lead_scraper::config::server::{ServerConfig, DEFAULT_PORT, PORT_ENV};
use maps_lead_scraper::LeadError;
use std::process::Command;

// Only this test touches PORT in this test binary.
#[test]
fn test_server_config_reads_port_from_environment() {
    std::env::set_var(PORT_ENV, "9191");
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9191");

    std::env::set_var(PORT_ENV, "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(matches!(err, LeadError::InvalidConfigValueError { ref field, .. } if field == PORT_ENV));

    std::env::remove_var(PORT_ENV);
    assert_eq!(ServerConfig::from_env().unwrap().port, DEFAULT_PORT);
}

#[test]
fn test_server_refuses_to_start_on_bad_port() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_lead-server"))
        .current_dir(dir.path())
        .env(PORT_ENV, "70000")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PORT"));
}

#[test]
fn test_cli_exits_1_without_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_maps-lead-scraper"))
        .current_dir(dir.path())
        .env_remove("GOOGLE_MAPS_API_KEY")
        .env("RUST_LOG", "off")
        .args(["--query", "Plumber", "--location", "Austin, TX"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No API key found"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
