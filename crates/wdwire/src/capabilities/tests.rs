//! Unit tests for capability negotiation.

use rstest::rstest;
use serde_json::{Map, Value, json};

use super::*;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn firefox(accept_insecure_certs: bool) -> FirefoxOptions {
    let mut options = FirefoxOptions::new();
    options.standard_mut().accept_insecure_certs = accept_insecure_certs;
    options
}

#[test]
fn default_capabilities_negotiate_to_nothing() {
    let capabilities = negotiate(
        &StandardCapabilities::default(),
        &VendorBucket::default(),
        &Map::new(),
        &Map::new(),
    );
    assert!(capabilities.always_match().is_empty());
    assert!(capabilities.first_match().is_empty());
}

#[rstest]
#[case::insecure_certs(
    StandardCapabilities { accept_insecure_certs: true, ..StandardCapabilities::default() },
    "acceptInsecureCerts",
    json!(true)
)]
#[case::eager_load(
    StandardCapabilities { page_load_strategy: Some(PageLoadStrategy::Eager), ..StandardCapabilities::default() },
    "pageLoadStrategy",
    json!("eager")
)]
#[case::prompt(
    StandardCapabilities {
        unhandled_prompt_behavior: Some(UnhandledPromptBehavior::DismissAndNotify),
        ..StandardCapabilities::default()
    },
    "unhandledPromptBehavior",
    json!("dismiss and notify")
)]
#[case::timeouts(
    StandardCapabilities {
        timeouts: Some(Timeouts { script: Some(1000), ..Timeouts::default() }),
        ..StandardCapabilities::default()
    },
    "timeouts",
    json!({ "script": 1000 })
)]
fn non_default_values_reach_always_match(
    #[case] known: StandardCapabilities,
    #[case] wire_name: &str,
    #[case] expected: Value,
) {
    let capabilities = negotiate(&known, &VendorBucket::default(), &Map::new(), &Map::new());
    assert_eq!(capabilities.always_match().get(wire_name), Some(&expected));
    assert_eq!(capabilities.always_match().len(), 1);
}

#[rstest]
#[case::normal_load(StandardCapabilities {
    page_load_strategy: Some(PageLoadStrategy::Normal),
    ..StandardCapabilities::default()
})]
#[case::empty_timeouts(StandardCapabilities {
    timeouts: Some(Timeouts::default()),
    ..StandardCapabilities::default()
})]
#[case::empty_proxy(StandardCapabilities {
    proxy: Some(Proxy::default()),
    ..StandardCapabilities::default()
})]
fn default_values_are_skipped(#[case] known: StandardCapabilities) {
    let capabilities = negotiate(&known, &VendorBucket::default(), &Map::new(), &Map::new());
    assert!(capabilities.always_match().is_empty());
}

#[test]
fn vendor_bucket_uses_prefix_and_key() {
    let mut options = FirefoxOptions::new();
    options.headless();
    let capabilities = options.to_capabilities();
    assert_eq!(
        capabilities.always_match().get("moz:firefoxOptions"),
        Some(&json!({ "args": ["-headless"] }))
    );
}

#[test]
fn empty_vendor_bucket_is_omitted() {
    let capabilities = FirefoxOptions::new().to_capabilities();
    assert!(!capabilities.always_match().contains_key("moz:firefoxOptions"));
    assert_eq!(
        capabilities.always_match().get("browserName"),
        Some(&json!("firefox"))
    );
}

#[test]
fn extra_options_win_inside_the_bucket() {
    let mut options = ChromiumOptions::chrome();
    options.add_argument("--no-sandbox");
    options.add_option("args", json!(["--caller"]));
    options.add_option("mobileEmulation", json!({ "deviceName": "Pixel 7" }));
    let capabilities = options.to_capabilities();
    let bucket = capabilities
        .always_match()
        .get("goog:chromeOptions")
        .expect("chrome bucket");
    assert_eq!(bucket["args"], json!(["--caller"]));
    assert_eq!(bucket["mobileEmulation"]["deviceName"], json!("Pixel 7"));
}

#[test]
fn extra_capabilities_win_over_known_properties() {
    let mut options = firefox(true);
    options.add_capability("acceptInsecureCerts", json!(false));
    options.add_capability("se:cdpVersion", json!("120"));
    let capabilities = options.to_capabilities();
    assert_eq!(
        capabilities.always_match().get("acceptInsecureCerts"),
        Some(&json!(false))
    );
    assert_eq!(
        capabilities.always_match().get("se:cdpVersion"),
        Some(&json!("120"))
    );
}

#[test]
fn edge_uses_its_own_bucket() {
    let mut options = ChromiumOptions::edge();
    options.set_detach(true);
    let capabilities = options.to_capabilities();
    assert_eq!(
        capabilities.always_match().get("ms:edgeOptions"),
        Some(&json!({ "detach": true }))
    );
    assert_eq!(
        capabilities.always_match().get("browserName"),
        Some(&json!("MicrosoftEdge"))
    );
}

#[rstest]
#[case::firefox_plain(Box::new(firefox(true)) as Box<dyn BrowserOptions>)]
#[case::firefox_vendor({
    let mut options = firefox(false);
    options.set_preference("dom.webnotifications.enabled", json!(false));
    options.set_log_level("trace");
    Box::new(options) as Box<dyn BrowserOptions>
})]
#[case::chrome_vendor({
    let mut options = ChromiumOptions::chrome();
    options.headless();
    options.add_option("w3c", json!(true));
    options.add_capability("webauthn:virtualAuthenticators", json!(true));
    Box::new(options) as Box<dyn BrowserOptions>
})]
fn renegotiation_is_idempotent(#[case] options: Box<dyn BrowserOptions>) {
    let first = options.to_capabilities();
    let second = negotiate(
        &StandardCapabilities::default(),
        &VendorBucket::default(),
        first.always_match(),
        &Map::new(),
    );
    assert_eq!(second.always_match(), first.always_match());
}

#[test]
fn empty_first_match_gets_a_browser_name_branch() {
    let request = SessionRequest::new(firefox(true).to_capabilities());
    let capabilities = request.capabilities();
    assert_eq!(capabilities.first_match().len(), 1);
    assert_eq!(
        capabilities.first_match().first(),
        Some(&object(json!({ "browserName": "firefox" })))
    );
    assert!(!capabilities.always_match().contains_key("browserName"));
    assert_eq!(
        capabilities.always_match().get("acceptInsecureCerts"),
        Some(&json!(true))
    );
}

#[test]
fn missing_browser_name_becomes_empty_string() {
    let request = SessionRequest::new(Capabilities::default());
    assert_eq!(
        request.capabilities().first_match().first(),
        Some(&object(json!({ "browserName": "" })))
    );
}

#[test]
fn supplied_first_match_is_left_untouched() {
    let branches = vec![object(json!({ "platformName": "linux" }))];
    let capabilities = Capabilities::new(
        object(json!({ "browserName": "firefox" })),
        branches.clone(),
    );
    let request = SessionRequest::new(capabilities);
    assert_eq!(request.capabilities().first_match(), branches.as_slice());
    assert!(request.capabilities().always_match().contains_key("browserName"));
}

#[test]
fn desired_capabilities_fold_later_wins() {
    let capabilities = Capabilities::new(
        object(json!({ "browserName": "firefox", "platformName": "linux" })),
        vec![
            object(json!({ "platformName": "mac" })),
            object(json!({ "platformName": "windows", "acceptInsecureCerts": true })),
        ],
    );
    let request = SessionRequest::new(capabilities);
    assert_eq!(
        Value::Object(request.desired_capabilities().clone()),
        json!({
            "browserName": "firefox",
            "platformName": "windows",
            "acceptInsecureCerts": true
        })
    );
}

#[test]
fn session_request_serialises_wire_shape() {
    let request = SessionRequest::new(firefox(true).to_capabilities());
    assert!(request.start_new_session());
    let wire = serde_json::to_value(&request).expect("serialise request");
    assert_eq!(
        wire,
        json!({
            "capabilities": {
                "alwaysMatch": { "acceptInsecureCerts": true },
                "firstMatch": [{ "browserName": "firefox" }]
            },
            "desiredCapabilities": {
                "acceptInsecureCerts": true,
                "browserName": "firefox"
            }
        })
    );
}

#[test]
fn attach_existing_clears_the_new_session_flag() {
    let request = SessionRequest::new(Capabilities::default()).attach_existing();
    assert!(!request.start_new_session());
}
