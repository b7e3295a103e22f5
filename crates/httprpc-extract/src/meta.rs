//! Path and header metadata.
//!
//! A meta-aware endpoint declares a second struct whose fields are bound from
//! path parameters (`path` tag) and request headers (`header` tag). The shape
//! of that struct is checked once, when the endpoint is registered, by
//! [`validate_meta`]; each request is then decoded by [`decode_meta`].

use crate::context::ExtractionContext;
use crate::error::{DecodeError, DecodeSource};
use crate::fields::{FieldBinder, FieldTable, Tag};
use httprpc_router::{is_snake_case, RoutePattern};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// A metadata struct does not fit its route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaShapeError {
    /// A field carries both a `path` and a `header` tag.
    #[error("{owner}.{field}: cannot use both path and header tags")]
    BothTags {
        /// Metadata type name.
        owner: String,
        /// Field identifier.
        field: String,
    },

    /// A tag has options but no name.
    #[error("{owner}.{field}: {kind} tag must specify a name")]
    EmptyTagName {
        /// Metadata type name.
        owner: String,
        /// Field identifier.
        field: String,
        /// `path` or `header`.
        kind: &'static str,
    },

    /// A `path` tag is not a valid parameter name.
    #[error("{owner}.{field}: path tag {name:?} must be snake_case")]
    NotSnakeCase {
        /// Metadata type name.
        owner: String,
        /// Field identifier.
        field: String,
        /// The offending name.
        name: String,
    },

    /// A `path` tag names a parameter the route does not declare.
    #[error("path tag {name:?} does not match route {path}")]
    UnknownPathParam {
        /// The tag name.
        name: String,
        /// The route path.
        path: String,
    },

    /// Two fields bind the same path parameter.
    #[error("path tag {name:?} is used more than once")]
    DuplicatePathTag {
        /// The tag name.
        name: String,
    },

    /// Two fields bind the same header.
    #[error("header tag {name:?} is used more than once")]
    DuplicateHeaderTag {
        /// The tag name.
        name: String,
    },
}

/// Checks that `M` can be decoded for requests matching `pattern`.
///
/// # Errors
///
/// Returns the first [`MetaShapeError`] found, in field order.
pub fn validate_meta<M: FieldBinder>(pattern: &RoutePattern) -> Result<(), MetaShapeError> {
    validate_table(M::field_table(), pattern)
}

fn validate_table<T: 'static>(table: &FieldTable<T>, pattern: &RoutePattern) -> Result<(), MetaShapeError> {
    let owner = table.owner();
    let mut seen_path = HashSet::new();
    let mut seen_header = HashSet::new();

    for field in table.fields().iter().filter(|f| !f.is_ignored()) {
        let ident = field.ident();
        let path = field.path_tag();
        let header = field.header_tag();

        if let Some(tag) = path {
            check_named(owner, ident, "path", tag)?;
            if !tag.is_skip() && !is_snake_case(tag.name()) {
                return Err(MetaShapeError::NotSnakeCase {
                    owner: owner.to_string(),
                    field: ident.to_string(),
                    name: tag.name().to_string(),
                });
            }
        }
        if let Some(tag) = header {
            check_named(owner, ident, "header", tag)?;
        }

        match (path, header) {
            (Some(_), Some(_)) => {
                return Err(MetaShapeError::BothTags {
                    owner: owner.to_string(),
                    field: ident.to_string(),
                });
            }
            (Some(tag), None) if !tag.is_skip() => {
                let name = tag.name();
                if !pattern.has_param(name) {
                    return Err(MetaShapeError::UnknownPathParam {
                        name: name.to_string(),
                        path: pattern.path().to_string(),
                    });
                }
                if !seen_path.insert(name.to_string()) {
                    return Err(MetaShapeError::DuplicatePathTag {
                        name: name.to_string(),
                    });
                }
            }
            (None, Some(tag)) if !tag.is_skip() => {
                if !seen_header.insert(tag.name().to_ascii_lowercase()) {
                    return Err(MetaShapeError::DuplicateHeaderTag {
                        name: tag.name().to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn check_named(owner: &str, ident: &str, kind: &'static str, tag: &Tag) -> Result<(), MetaShapeError> {
    if !tag.is_skip() && tag.name().is_empty() {
        return Err(MetaShapeError::EmptyTagName {
            owner: owner.to_string(),
            field: ident.to_string(),
            kind,
        });
    }
    Ok(())
}

/// Decodes `M` from the path parameters and headers of `ctx`.
///
/// Fields without a `path` or `header` tag keep their default value.
///
/// # Errors
///
/// Returns a [`DecodeError`] when a path parameter or required header is
/// missing, or when a value cannot be coerced into its field.
pub fn decode_meta<M>(ctx: &ExtractionContext) -> Result<M, DecodeError>
where
    M: FieldBinder + Default,
{
    let mut meta = M::default();
    let table = M::field_table();

    for field in table.fields().iter().filter(|f| !f.is_ignored()) {
        if let Some(tag) = field.path_tag() {
            if tag.is_skip() {
                continue;
            }
            let name = tag.name();
            let value = ctx
                .path_params()
                .get(name)
                .ok_or_else(|| DecodeError::missing(DecodeSource::Path, name))?;
            field.set(&mut meta, &[value.to_string()]).map_err(|e| {
                debug!(owner = table.owner(), param = name, error = %e, "path coercion failed");
                DecodeError::invalid(DecodeSource::Path, name, format!("decode path {name}: {e}"))
            })?;
        } else if let Some(tag) = field.header_tag() {
            if tag.is_skip() {
                continue;
            }
            let name = tag.name();
            let values = ctx.header_values(name)?;
            if values.is_empty() {
                if field.is_optional() {
                    continue;
                }
                debug!(owner = table.owner(), header = name, "required header missing");
                return Err(DecodeError::missing(DecodeSource::Header, name));
            }
            field.set(&mut meta, &values).map_err(|e| {
                debug!(owner = table.owner(), header = name, error = %e, "header coercion failed");
                DecodeError::invalid(DecodeSource::Header, name, format!("decode header {name}: {e}"))
            })?;
        }
    }

    Ok(meta)
}
