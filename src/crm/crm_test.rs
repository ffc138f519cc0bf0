use super::*;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTACTS_ROUTE: &str = "/contacts/v1/lists/all/contacts/all";

async fn client_for(server: &MockServer) -> ContactsClient {
    let base = Url::parse(&server.uri()).unwrap();
    ContactsClient::new(&base).unwrap()
}

fn token(value: &str) -> AccessToken {
    AccessToken::new(value.to_string())
}

#[test]
fn test_display_name() {
    let contact = Contact {
        vid: Some(1),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    };
    assert_eq!(contact.display_name(), "Ada Lovelace");

    let contact = Contact {
        vid: None,
        first_name: None,
        last_name: Some("Lovelace".to_string()),
    };
    assert_eq!(contact.display_name(), "Lovelace");
}

#[tokio::test]
async fn test_first_contact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTACTS_ROUTE))
        .and(query_param("count", "1"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "contacts": [{
                "vid": 51,
                "properties": {
                    "firstname": {"value": "Maria"},
                    "lastname": {"value": "Johnson"},
                    "company": {"value": "HubSpot"}
                }
            }],
            "has-more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let contact = client.first_contact(Some(&token("access-1"))).await.unwrap();

    assert_eq!(
        contact,
        Some(Contact {
            vid: Some(51),
            first_name: Some("Maria".to_string()),
            last_name: Some("Johnson".to_string()),
        })
    );
}

#[tokio::test]
async fn test_no_contacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTACTS_ROUTE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"contacts": []})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.first_contact(Some(&token("a"))).await.unwrap(), None);
}

#[tokio::test]
async fn test_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTACTS_ROUTE))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status": "error",
            "message": "Authentication credentials not found.",
            "category": "INVALID_AUTHENTICATION"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.first_contact(None).await.unwrap_err();

    assert_eq!(err.status, Some(401));
    assert_eq!(err.message(), "Authentication credentials not found.");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.first_contact(Some(&token("a"))).await.unwrap_err();
    assert!(err.message().starts_with("invalid API response"));
}
