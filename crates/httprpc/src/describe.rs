//! Endpoint metadata for tooling.
//!
//! Every registration records an [`EndpointMeta`] next to the route. The
//! records are never used for dispatch; they let code generators and
//! documentation tools see each endpoint's method, path, types and content
//! types. [`EndpointDescription`] is the serializable view of the same data.

use http::Method;
use serde::Serialize;
use std::any::{type_name, TypeId};

/// Identity of a Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Identity of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The type's `TypeId`.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name, e.g. `my_app::users::CreateUser`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// True if this is `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// The registration-time record of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMeta {
    /// HTTP method.
    pub method: Method,
    /// Full path including group prefixes.
    pub path: String,
    /// Request type.
    pub request: TypeInfo,
    /// Metadata type, for meta-aware endpoints.
    pub meta: Option<TypeInfo>,
    /// Response type.
    pub response: TypeInfo,
    /// Media types the codec decodes.
    pub consumes: Vec<String>,
    /// Media types the codec encodes.
    pub produces: Vec<String>,
}

/// A printable reference to a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// The full type name.
    pub full_name: String,
    /// The last path segment, with generic arguments kept.
    pub name: String,
    /// The module path, empty for primitives.
    pub module: String,
}

impl TypeRef {
    /// Builds a reference from a full type name.
    ///
    /// ```
    /// use httprpc::TypeRef;
    ///
    /// let r = TypeRef::from_type_name("shop::orders::Order");
    /// assert_eq!(r.name, "Order");
    /// assert_eq!(r.module, "shop::orders");
    /// ```
    #[must_use]
    pub fn from_type_name(full_name: &str) -> Self {
        let base_end = full_name.find('<').unwrap_or(full_name.len());
        let (module, name) = match full_name[..base_end].rfind("::") {
            Some(split) => (&full_name[..split], &full_name[split + 2..]),
            None => ("", full_name),
        };
        Self {
            full_name: full_name.to_string(),
            name: name.to_string(),
            module: module.to_string(),
        }
    }
}

impl From<TypeInfo> for TypeRef {
    fn from(info: TypeInfo) -> Self {
        Self::from_type_name(info.name())
    }
}

/// Serializable description of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDescription {
    /// HTTP method.
    pub method: String,
    /// Full path.
    pub path: String,
    /// Request type.
    pub request: TypeRef,
    /// Metadata type; absent for plain endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<TypeRef>,
    /// Response type.
    pub response: TypeRef,
    /// Media types the endpoint accepts.
    pub consumes: Vec<String>,
    /// Media types the endpoint returns.
    pub produces: Vec<String>,
}

impl From<&EndpointMeta> for EndpointDescription {
    fn from(meta: &EndpointMeta) -> Self {
        Self {
            method: meta.method.to_string(),
            path: meta.path.clone(),
            request: meta.request.into(),
            meta: meta.meta.map(TypeRef::from),
            response: meta.response.into(),
            consumes: meta.consumes.clone(),
            produces: meta.produces.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;

    #[test]
    fn test_type_info() {
        let info = TypeInfo::of::<Order>();
        assert!(info.is::<Order>());
        assert!(!info.is::<String>());
        assert!(info.name().ends_with("Order"));
    }

    #[test]
    fn test_type_ref_splits_module() {
        let r = TypeRef::from_type_name("alloc::vec::Vec<shop::Item>");
        assert_eq!(r.name, "Vec<shop::Item>");
        assert_eq!(r.module, "alloc::vec");

        let r = TypeRef::from_type_name("u32");
        assert_eq!(r.name, "u32");
        assert_eq!(r.module, "");
    }

    #[test]
    fn test_description_from_meta() {
        let meta = EndpointMeta {
            method: Method::GET,
            path: "/v1/orders/:order_id".to_string(),
            request: TypeInfo::of::<()>(),
            meta: None,
            response: TypeInfo::of::<Order>(),
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
        };
        let description = EndpointDescription::from(&meta);

        assert_eq!(description.method, "GET");
        assert_eq!(description.response.name, "Order");
        assert_eq!(description.meta, None);

        let json = serde_json::to_value(&description).unwrap();
        assert!(json.get("meta").is_none());
        assert_eq!(json["path"], "/v1/orders/:order_id");
    }
}
