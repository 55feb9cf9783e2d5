//! Resolves a few CGI-style requests against a route table and prints what
//! each server request ends up with.
//!
//! Run with `cargo run -p micro-router --example inspect`.

use std::sync::Arc;

use micro_message::protocol::ServerParams;
use micro_message::{HttpMessage, RequestMessage, ServerRequest};
use micro_router::filter::{host, scheme};
use micro_router::{RouteEntry, RouteTable};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn server_params(method: &str, host_header: &str, https: bool, uri: &str) -> ServerParams {
    let query = uri.split_once('?').map_or("", |(_, query)| query);
    let mut params = ServerParams::new();
    params.insert("REQUEST_METHOD".into(), method.into());
    params.insert("HTTP_HOST".into(), host_header.into());
    params.insert("HTTPS".into(), if https { "on" } else { "off" }.into());
    params.insert("REQUEST_URI".into(), uri.into());
    params.insert("QUERY_STRING".into(), query.into());
    params
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let table = RouteTable::builder()
        .route("/", RouteEntry::new("home"))
        .route("/users/{id}", RouteEntry::new("user").default_attribute("format", "html"))
        .route("/admin/{*rest}", RouteEntry::new("admin").with(scheme("https")).with(host("admin.example.com")))
        .build();

    let table = match table {
        Ok(table) => Arc::new(table),
        Err(e) => {
            error!(cause = %e, "invalid route table");
            return;
        }
    };

    let requests = [
        server_params("GET", "example.com", false, "/"),
        server_params("GET", "example.com:8080", false, "/users/42?tab=posts"),
        server_params("POST", "admin.example.com", true, "/admin/settings/mail"),
        server_params("POST", "admin.example.com", false, "/admin/settings/mail"),
    ];

    for params in requests {
        let request = match ServerRequest::from_server_params(params) {
            Ok(request) => request.with_router(&table),
            Err(e) => {
                error!(cause = %e, "cannot build server request");
                continue;
            }
        };

        info!(
            method = %request.method(),
            uri = %request.uri(),
            host = request.header_line("Host"),
            query = ?request.query_params(),
            attributes = ?request.attributes(),
            "server request"
        );
    }
}
