use crate::{Credential, ServiceClient, service::client::error_reason};

use std::time::Duration;

/// WHAT: Structured error bodies yield their message
/// WHY: Service rejections are surfaced verbatim when available
#[test]
fn given_error_bodies_when_extracting_reason_then_message_or_none() {
    assert_eq!(
        error_reason(br#"{"error":"bad key"}"#),
        Some("bad key".to_string())
    );
    assert_eq!(
        error_reason(br#"{"detail":"Invalid password"}"#),
        Some("Invalid password".to_string())
    );
    assert_eq!(error_reason(br#"{"detail":[{"loc":["body"]}]}"#), None);
    assert_eq!(error_reason(br#"{"error":"  "}"#), None);
    assert_eq!(error_reason(b"Internal Server Error"), None);
}

/// WHAT: Trailing slashes in the base URL are ignored
/// WHY: Config values are hand-edited
#[test]
fn given_base_url_with_slash_when_building_endpoint_then_single_slash() {
    let client = ServiceClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();

    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(client.endpoint("/create-seal"), "http://localhost:8000/create-seal");
}

/// WHAT: Blank credentials do not parse and Debug never prints the secret
/// WHY: Credentials must not leak into logs
#[test]
fn given_credentials_when_parsing_and_formatting_then_blank_rejected_and_redacted() {
    assert!(Credential::parse("").is_none());
    assert!(Credential::parse("   ").is_none());

    let credential = Credential::parse(" hunter2 ").unwrap();
    assert_eq!(credential.expose(), " hunter2 ");
    assert!(!format!("{:?}", credential).contains("hunter2"));
}
