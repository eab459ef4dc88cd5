/// Abstraction over types that can provide a request path for resolution.
///
/// This lets [`RouteTable::resolve`](crate::RouteTable::resolve) accept plain strings as well as
/// the path types used by the HTTP layer (e.g., `http::Uri`) without converting them first.
pub trait ResourcePath {
    fn path(&self) -> &str;
}

impl ResourcePath for String {
    fn path(&self) -> &str {
        self.as_str()
    }
}

impl ResourcePath for &str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for bytestring::ByteString {
    fn path(&self) -> &str {
        self
    }
}

#[cfg(feature = "http")]
impl ResourcePath for http::Uri {
    fn path(&self) -> &str {
        self.path()
    }
}
