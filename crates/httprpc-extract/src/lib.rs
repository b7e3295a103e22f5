//! # httprpc Extract
//!
//! Request decoding and response encoding for httprpc endpoints.
//!
//! ## Decoding
//!
//! | Function | Source | Fields bound by |
//! |----------|--------|-----------------|
//! | [`decode_json_body`] | request body | `serde::Deserialize` |
//! | [`decode_query`] | query string | [`FieldTable`] `query`/`json` names |
//! | [`decode_meta`] | path parameters, headers | [`FieldTable`] `path`/`header` tags |
//!
//! Field tables replace runtime reflection: each request or metadata type
//! implements [`FieldBinder`] once, listing its fields with their tags and
//! setters. Wire strings are coerced into field values through [`FromWire`].
//!
//! ## Codecs
//!
//! A [`Codec`] ties decoding and encoding together for one endpoint.
//! [`JsonCodec`] decodes `GET` requests from the query string and everything
//! else from a JSON body, and encodes errors as `{"error": "<message>"}`.
//!
//! ## Errors
//!
//! Every decoding failure is a [`DecodeError`] and maps to
//! `400 Bad Request`. Metadata types that do not fit their route are
//! rejected when the endpoint is registered, with a [`MetaShapeError`].

pub mod codec;
pub mod coerce;
mod context;
mod error;
pub mod fields;
pub mod meta;
pub mod query;

pub use codec::{decode_json_body, Codec, EncodeError, JsonCodec, APPLICATION_JSON};
pub use coerce::{parse_bool, CoercionError, FromWire, Text};
pub use context::{ExtractionContext, QueryValues};
pub use error::{DecodeError, DecodeSource};
pub use fields::{to_snake_case, Field, FieldBinder, FieldTable, FieldTableBuilder, Tag};
pub use meta::{decode_meta, validate_meta, MetaShapeError};
pub use query::decode_query;
