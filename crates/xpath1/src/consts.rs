//! Namespace URIs with reserved, hard-wired bindings.

/// Namespace bound to the `xml` prefix in every document.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of `xmlns` / `xmlns:*` declaration attributes.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";
