//! Ordering tests for composed middleware chains across a group hierarchy.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use httprpc_middleware::{
    apply, collect, from_fn, handler_fn, HttpHandler, MiddlewareEntry, Next, Request, Response,
    ResponseExt,
};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn tagging(label: &'static str, log: &Log, priority: i32) -> MiddlewareEntry {
    let log = log.clone();
    MiddlewareEntry::new(
        from_fn(label, move |req: Request, next: Next| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(label);
                next.run(req).await
            }
        }),
        priority,
    )
}

fn terminal() -> HttpHandler {
    handler_fn(|_req: Request| async { Response::error(StatusCode::OK, "OK") })
}

fn request() -> Request {
    http::Request::builder()
        .uri("/")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[tokio::test]
async fn higher_priority_in_child_still_wraps_root() {
    let log: Log = Arc::default();
    let root = vec![tagging("root", &log, 0)];
    let child = vec![tagging("child-urgent", &log, 100)];

    let handler = apply(terminal(), &collect([child.as_slice(), root.as_slice()]));
    handler(request()).await;

    assert_eq!(*log.lock().unwrap(), vec!["child-urgent", "root"]);
}

#[tokio::test]
async fn three_level_equal_priority_nests_root_outermost() {
    let log: Log = Arc::default();
    let root = vec![tagging("root", &log, 0)];
    let api = vec![tagging("api", &log, 0)];
    let v1 = vec![tagging("v1", &log, 0)];

    let handler = apply(
        terminal(),
        &collect([v1.as_slice(), api.as_slice(), root.as_slice()]),
    );
    handler(request()).await;

    assert_eq!(*log.lock().unwrap(), vec!["root", "api", "v1"]);
}

#[tokio::test]
async fn short_circuit_stops_inner_layers() {
    let log: Log = Arc::default();
    let gate = MiddlewareEntry::new(
        from_fn("gate", |_req: Request, _next: Next| async {
            Response::json_error(StatusCode::TOO_MANY_REQUESTS, "slow down")
        }),
        5,
    );
    let root = vec![gate, tagging("inner", &log, 0)];

    let handler = apply(terminal(), &collect([root.as_slice()]));
    let response = handler(request()).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(log.lock().unwrap().is_empty());
}
