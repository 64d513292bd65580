//! Tests for local driver management.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use super::*;
use crate::tests::support::{FakeRemote, Route, StubTransport};
use crate::transport::ReqwestTransport;

fn reqwest() -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new().expect("transport"))
}

#[rstest]
#[case::path_lookup(None, "geckodriver")]
#[case::binaries_dir(Some("/opt/drivers"), "/opt/drivers/geckodriver")]
fn executable_path_honours_binaries_dir(#[case] dir: Option<&str>, #[case] expected: &str) {
    let mut service = DriverService::new("geckodriver");
    if let Some(dir) = dir {
        service = service.with_binaries_dir(dir);
    }
    assert_eq!(service.executable_path(), PathBuf::from(expected));
}

#[test]
fn url_is_unknown_until_a_port_is_chosen() {
    let service = DriverService::new("chromedriver");
    assert_eq!(service.url(), None);
    let service = service.with_host("localhost").with_port(9515);
    assert_eq!(service.url().as_deref(), Some("http://localhost:9515"));
}

#[test]
fn missing_executable_fails_to_launch() {
    let mut service =
        DriverService::new("wdwire-no-such-driver").with_binaries_dir("/nonexistent/drivers");
    let error = service.start().expect_err("launch failure");
    match error {
        ServiceError::Launch { executable, .. } => {
            assert_eq!(
                executable,
                PathBuf::from("/nonexistent/drivers/wdwire-no-such-driver")
            );
        }
        other => panic!("expected Launch, got {other:?}"),
    }
    assert!(service.port().is_some(), "an ephemeral port is reserved first");
}

#[test]
fn waiting_before_start_is_an_error() {
    let mut service = DriverService::new("geckodriver");
    let error = service
        .wait_until_ready(StubTransport::new(Vec::new()))
        .expect_err("not started");
    assert!(matches!(error, ServiceError::NotStarted));
}

#[test]
fn stop_is_idempotent() {
    let mut service = DriverService::new("geckodriver");
    service.stop();
    service.stop();
    assert!(!service.is_running());
}

#[cfg(unix)]
#[test]
fn ready_status_ends_the_wait() {
    let remote = FakeRemote::spawn(vec![Route::new(
        "GET",
        "/status",
        200,
        r#"{"value":{"ready":true,"message":"ready to go"}}"#,
    )])
    .expect("spawn remote");
    let mut service = DriverService::new("sh")
        .with_arg("-c")
        .with_arg("sleep 30")
        .with_port(remote.port());
    service.start().expect("start");
    assert!(service.is_running());

    let status = service.wait_until_ready(reqwest()).expect("ready");
    assert_eq!(
        status,
        ServerStatus {
            ready: true,
            message: String::from("ready to go"),
        }
    );

    service.stop();
    assert!(!service.is_running());
    service.stop();
}

#[cfg(unix)]
#[test]
fn early_exit_fails_fast() {
    let port = {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let mut service = DriverService::new("sh")
        .with_arg("-c")
        .with_arg("exit 3")
        .with_port(port)
        .with_startup_timeout(Duration::from_secs(10));
    service.start().expect("start");
    let error = service.wait_until_ready(reqwest()).expect_err("exited");
    assert!(matches!(
        error,
        ServiceError::StartupFailed {
            exit_status: Some(3)
        }
    ));
}

#[cfg(unix)]
#[test]
fn never_ready_times_out() {
    let remote = FakeRemote::spawn(vec![Route::new(
        "GET",
        "/status",
        200,
        r#"{"value":{"ready":false,"message":"busy"}}"#,
    )])
    .expect("spawn remote");
    let mut service = DriverService::new("sh")
        .with_arg("-c")
        .with_arg("sleep 30")
        .with_port(remote.port())
        .with_startup_timeout(Duration::from_millis(600));
    service.start().expect("start");
    let error = service.wait_until_ready(reqwest()).expect_err("timeout");
    assert!(matches!(
        error,
        ServiceError::StartupTimeout { timeout_ms: 600, .. }
    ));
    assert!(remote.requests().expect("requests").len() >= 2);
}

#[test]
fn service_errors_convert_into_webdriver_errors() {
    let error = crate::error::WebDriverError::from(ServiceError::StartupFailed {
        exit_status: Some(1),
    });
    assert!(error.to_string().contains("exited before reporting ready"));
}
