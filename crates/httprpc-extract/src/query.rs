//! Query string decoding.
//!
//! [`decode_query`] fills a request type from URL query parameters using the
//! type's [`FieldTable`](crate::FieldTable). Parameters that no field names
//! are ignored, and fields without a parameter keep their default value.

use crate::context::ExtractionContext;
use crate::error::{DecodeError, DecodeSource};
use crate::fields::FieldBinder;
use tracing::debug;

/// Decodes `T` from the query string of `ctx`.
///
/// A request without query parameters decodes to `T::default()`.
///
/// # Errors
///
/// Returns a query [`DecodeError`] naming the parameter when a value cannot
/// be coerced into its field, or when the query string is malformed.
///
/// # Example
///
/// ```rust
/// use httprpc_extract::{decode_query, ExtractionContext, FieldBinder, FieldTable};
/// use httprpc_router::Params;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
/// use std::sync::OnceLock;
///
/// #[derive(Debug, Default)]
/// struct ListProducts {
///     limit: u32,
///     category: Vec<String>,
/// }
///
/// impl FieldBinder for ListProducts {
///     fn field_table() -> &'static FieldTable<Self> {
///         static TABLE: OnceLock<FieldTable<ListProducts>> = OnceLock::new();
///         TABLE.get_or_init(|| {
///             FieldTable::<ListProducts>::builder("ListProducts")
///                 .field("Limit", |r| &mut r.limit)
///                 .field("Category", |r| &mut r.category)
///                 .build()
///         })
///     }
/// }
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/products?limit=10&category=books&category=music"),
///     HeaderMap::new(),
///     Bytes::new(),
///     Params::new(),
/// );
///
/// let request: ListProducts = decode_query(&ctx).unwrap();
/// assert_eq!(request.limit, 10);
/// assert_eq!(request.category, vec!["books", "music"]);
/// ```
pub fn decode_query<T>(ctx: &ExtractionContext) -> Result<T, DecodeError>
where
    T: FieldBinder + Default,
{
    let values = ctx.query_values()?;
    let mut request = T::default();
    if values.is_empty() {
        return Ok(request);
    }

    let table = T::field_table();
    let mut bound = Vec::with_capacity(values.len());
    for field in table.fields() {
        let Some(name) = field.query_name() else {
            continue;
        };
        let Some(raw) = values.get(&name) else {
            continue;
        };
        field.set(&mut request, raw).map_err(|e| {
            debug!(owner = table.owner(), param = %name, error = %e, "query coercion failed");
            DecodeError::invalid(DecodeSource::Query, &name, format!("decode query {name}: {e}"))
        })?;
        bound.push(name);
    }

    for name in values.names().filter(|name| !bound.iter().any(|b| b.as_str() == *name)) {
        debug!(owner = table.owner(), param = name, "query parameter matches no field");
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Text;
    use crate::fields::FieldTable;
    use bytes::Bytes;
    use chrono::{DateTime, Utc};
    use http::{HeaderMap, Method, Uri};
    use httprpc_router::Params;
    use std::net::IpAddr;
    use std::sync::OnceLock;

    #[derive(Debug, Default, PartialEq)]
    struct Filter {
        name: String,
        page: i64,
        active: bool,
        ratio: f64,
        ids: Vec<u32>,
        since: Option<DateTime<Utc>>,
        origin: Option<Text<IpAddr>>,
        secret: String,
    }

    impl FieldBinder for Filter {
        fn field_table() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Filter>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::<Filter>::builder("Filter")
                    .field("Name", |f| &mut f.name)
                    .field("Page", |f| &mut f.page)
                    .query("p")
                    .field("Active", |f| &mut f.active)
                    .json("is_active")
                    .field("Ratio", |f| &mut f.ratio)
                    .field("IDs", |f| &mut f.ids)
                    .query("id")
                    .field("Since", |f| &mut f.since)
                    .field("Origin", |f| &mut f.origin)
                    .field("Secret", |f| &mut f.secret)
                    .json("-")
                    .embedded("Paging")
                    .build()
            })
        }
    }

    fn ctx(uri: &str) -> ExtractionContext {
        ExtractionContext::new(
            Method::GET,
            uri.parse::<Uri>().unwrap(),
            HeaderMap::new(),
            Bytes::new(),
            Params::new(),
        )
    }

    #[test]
    fn test_no_query_is_default() {
        let filter: Filter = decode_query(&ctx("/items")).unwrap();
        assert_eq!(filter, Filter::default());
    }

    #[test]
    fn test_all_coercions() {
        let filter: Filter = decode_query(&ctx(
            "/items?name=lamp&p=-3&is_active=T&ratio=0.5&id=4&id=9\
             &since=2024-01-02T03:04:05Z&origin=::1",
        ))
        .unwrap();

        assert_eq!(filter.name, "lamp");
        assert_eq!(filter.page, -3);
        assert!(filter.active);
        assert!((filter.ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(filter.ids, vec![4, 9]);
        assert_eq!(
            filter.since.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-01-02T03:04:05+00:00")
        );
        assert!(filter.origin.is_some_and(|ip| ip.is_ipv6()));
    }

    #[test]
    fn test_skipped_and_unknown_params_are_ignored() {
        let filter: Filter = decode_query(&ctx("/items?secret=x&paging=1&other=2")).unwrap();
        assert_eq!(filter, Filter::default());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_and_failing_params_are_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let _: Filter = decode_query(&ctx("/items?name=a&other=2")).unwrap();
            let _ = decode_query::<Filter>(&ctx("/items?p=first"));
        });

        let logs = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(logs.contains("query parameter matches no field"), "{logs}");
        assert!(logs.contains("param=other"), "{logs}");
        assert!(!logs.contains("param=name"), "{logs}");
        assert!(logs.contains("query coercion failed"), "{logs}");
    }

    #[test]
    fn test_field_ident_is_not_a_wire_name_when_tagged() {
        let filter: Filter = decode_query(&ctx("/items?page=7")).unwrap();
        assert_eq!(filter.page, 0);
    }

    #[test]
    fn test_coercion_failure_names_parameter() {
        let err = decode_query::<Filter>(&ctx("/items?p=first")).unwrap_err();
        assert_eq!(err.decode_source(), DecodeSource::Query);
        assert_eq!(err.field(), Some("p"));
        assert!(err.to_string().starts_with("decode query p: parse int: "));
    }

    #[test]
    fn test_bad_bool_is_rejected() {
        let err = decode_query::<Filter>(&ctx("/items?is_active=yes")).unwrap_err();
        assert!(err.to_string().starts_with("decode query is_active: parse bool"));
    }

    #[test]
    fn test_unit_request_ignores_query() {
        decode_query::<()>(&ctx("/ping?x=1")).unwrap();
    }
}
