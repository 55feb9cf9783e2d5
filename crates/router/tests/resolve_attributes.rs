use std::sync::Arc;

use indoc::formatdoc;
use micro_message::protocol::Environment;
use micro_message::{HttpMessage, RequestMessage, ServerRequest};
use micro_router::filter::{fn_filter, host};
use micro_router::{RouteEntry, RouteTable, ROUTE_NAME_ATTRIBUTE};
use serde_json::json;

fn table() -> Arc<RouteTable> {
    let table = RouteTable::builder()
        .route("/shops/{shop}/items/{item}", RouteEntry::new("item").default_attribute("currency", "EUR"))
        .route(
            "/shops/{shop}",
            RouteEntry::new("shop_api").with(host("api.example.com")).with(fn_filter(|target| target.scheme() == "https")),
        )
        .route("/shops/{shop}", RouteEntry::new("shop"))
        .build()
        .unwrap();

    Arc::new(table)
}

fn environment(host: &str, uri: &str) -> Environment {
    let json = formatdoc!(
        r#"
            {{
                "server": {{
                    "REQUEST_METHOD": "GET",
                    "HTTPS": "on",
                    "HTTP_HOST": "{host}",
                    "REQUEST_URI": "{uri}"
                }},
                "headers": {{ "Accept": "application/json" }}
            }}
        "#,
        host = host,
        uri = uri
    );

    serde_json::from_str(&json).unwrap()
}

#[test]
fn route_attributes_seed_server_request() {
    let table = table();
    let request = ServerRequest::from_environment(environment("www.example.com", "/shops/acme/items/9"))
        .unwrap()
        .with_router(&table);

    assert_eq!(request.attribute("shop"), Some(&json!("acme")));
    assert_eq!(request.attribute("item"), Some(&json!("9")));
    assert_eq!(request.attribute("currency"), Some(&json!("EUR")));
    assert_eq!(request.attribute(ROUTE_NAME_ATTRIBUTE), Some(&json!("item")));
    assert_eq!(request.header_line("accept"), "application/json");
}

#[test]
fn host_and_scheme_pick_the_entry() {
    let table = table();

    let api = ServerRequest::from_environment(environment("api.example.com", "/shops/acme")).unwrap().with_router(&table);
    assert_eq!(api.attribute(ROUTE_NAME_ATTRIBUTE), Some(&json!("shop_api")));

    let web = ServerRequest::from_environment(environment("www.example.com", "/shops/acme")).unwrap().with_router(&table);
    assert_eq!(web.attribute(ROUTE_NAME_ATTRIBUTE), Some(&json!("shop")));
}

#[test]
fn derived_requests_follow_their_own_uri() {
    let table = table();
    let request = ServerRequest::from_environment(environment("www.example.com", "/shops/acme")).unwrap().with_router(&table);
    assert_eq!(request.attribute("shop"), Some(&json!("acme")));

    let moved = request.with_uri(request.uri().with_path("/shops/globex/items/1"), true);
    assert_eq!(moved.attribute("shop"), Some(&json!("globex")));
    assert_eq!(moved.attribute(ROUTE_NAME_ATTRIBUTE), Some(&json!("item")));
    assert_eq!(request.attribute(ROUTE_NAME_ATTRIBUTE), Some(&json!("shop")));
}

#[test]
fn explicit_attributes_survive_without_match() {
    let table = table();
    let request = ServerRequest::from_environment(environment("www.example.com", "/unknown"))
        .unwrap()
        .with_router(&table)
        .with_attribute("trace_id", "t-1");

    assert_eq!(request.attributes().len(), 1);
    assert_eq!(request.attribute("trace_id"), Some(&json!("t-1")));

    let hidden = request.without_attribute("trace_id");
    assert!(hidden.attributes().is_empty());
}

#[test]
fn dropped_table_resolves_nothing() {
    let table = table();
    let request = ServerRequest::from_environment(environment("www.example.com", "/shops/acme")).unwrap().with_router(&table);
    drop(table);

    assert!(request.attributes().is_empty());
}
