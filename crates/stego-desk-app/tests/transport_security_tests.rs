//! Integration tests for endpoint transport policy and env configuration.

use stego_desk_app::{AppError, DEFAULT_DOWNLOAD_DIR, DEFAULT_ENDPOINT, config_from_env};
use stego_desk_client::{ServiceError, validate_service_endpoint};

#[test]
fn transport_security_tests_policy_allows_https_and_loopback_http_only() {
    validate_service_endpoint("https://stego.example.net").expect("https should pass");
    validate_service_endpoint("http://localhost:8080").expect("loopback http should pass");
    validate_service_endpoint("http://127.0.0.1:9000").expect("loopback ip should pass");

    assert!(matches!(
        validate_service_endpoint("http://stego.example.net"),
        Err(ServiceError::InvalidEndpoint(_))
    ));
    assert!(matches!(
        validate_service_endpoint("ftp://localhost"),
        Err(ServiceError::InvalidEndpoint(_))
    ));
    assert!(validate_service_endpoint("not a url").is_err());
}

#[test]
fn transport_security_tests_config_resolution_follows_env_overrides() {
    // Safety:
    // - Integration tests mutate process env in a single-threaded test body.
    // - Both variables are removed before returning.
    unsafe { std::env::remove_var("STEGO_DESK_ENDPOINT") };
    // Safety: see rationale above.
    unsafe { std::env::remove_var("STEGO_DESK_DOWNLOAD_DIR") };

    let defaults = config_from_env().expect("default config should resolve");
    assert_eq!(defaults.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(defaults.download_dir.to_string_lossy(), DEFAULT_DOWNLOAD_DIR);

    // Safety: see rationale above.
    unsafe { std::env::set_var("STEGO_DESK_ENDPOINT", "  https://stego.example.net  ") };
    // Safety: see rationale above.
    unsafe { std::env::set_var("STEGO_DESK_DOWNLOAD_DIR", "artifacts") };

    let overridden = config_from_env().expect("https override should resolve");
    assert_eq!(overridden.endpoint, "https://stego.example.net");
    assert_eq!(overridden.download_dir.to_string_lossy(), "artifacts");

    // Safety: see rationale above.
    unsafe { std::env::set_var("STEGO_DESK_ENDPOINT", "http://stego.example.net") };

    let rejected = config_from_env().expect_err("plain http off loopback should be rejected");
    assert!(matches!(rejected, AppError::Config(_)));
    assert!(rejected.to_string().contains("STEGO_DESK_ENDPOINT"));

    // Safety: see rationale above.
    unsafe { std::env::remove_var("STEGO_DESK_ENDPOINT") };
    // Safety: see rationale above.
    unsafe { std::env::remove_var("STEGO_DESK_DOWNLOAD_DIR") };
}
