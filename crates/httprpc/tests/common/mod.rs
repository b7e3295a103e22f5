//! Shared request, response and metadata types for the integration tests.

#![allow(dead_code)]

use httprpc::extract::{FieldBinder, FieldTable};
use httprpc::middleware::{from_fn, Middleware, Next, Request};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

pub type Log = Arc<Mutex<Vec<String>>>;

/// Middleware that records `<label>-before` and `<label>-after`.
pub fn recording(label: &'static str, log: &Log) -> impl Middleware {
    let log = log.clone();
    from_fn(label, move |req: Request, next: Next| {
        let log = log.clone();
        async move {
            log.lock().push(format!("{label}-before"));
            let response = next.run(req).await;
            log.lock().push(format!("{label}-after"));
            response
        }
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct Search {
    pub term: String,
    pub limit: u32,
    pub tags: Vec<String>,
}

impl FieldBinder for Search {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Search>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Search>::builder("Search")
                .field("Term", |s| &mut s.term)
                .query("q")
                .field("Limit", |s| &mut s.limit)
                .field("Tags", |s| &mut s.tags)
                .json("tag")
                .build()
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Found {
    pub term: String,
    pub limit: u32,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Rename {
    pub name: String,
}

impl FieldBinder for Rename {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Rename>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Rename>::builder("Rename")
                .field("Name", |r| &mut r.name)
                .build()
        })
    }
}

/// Path and header metadata for `/users/:id`.
#[derive(Debug, Default)]
pub struct UserMeta {
    pub id: u64,
    pub tenant: String,
    pub trace: Option<String>,
}

impl FieldBinder for UserMeta {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<UserMeta>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<UserMeta>::builder("UserMeta")
                .field("ID", |m| &mut m.id)
                .path("id")
                .field("Tenant", |m| &mut m.tenant)
                .header("X-Tenant")
                .field("Trace", |m| &mut m.trace)
                .header("X-Trace,omitempty")
                .build()
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub tenant: String,
    pub name: String,
    pub trace: Option<String>,
}

/// Metadata whose path tag names a parameter no route has.
#[derive(Debug, Default)]
pub struct StrayMeta {
    pub slug: String,
}

impl FieldBinder for StrayMeta {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<StrayMeta>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<StrayMeta>::builder("StrayMeta")
                .field("Slug", |m| &mut m.slug)
                .path("slug")
                .build()
        })
    }
}
