use http::{header::HeaderName, HeaderValue, StatusCode};
use log::warn;
use zzt_router::Diagnostic;

/// An outgoing response.
///
/// Header names keep the exact spelling they were inserted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

impl Response {
    /// Constructs a `200 OK` response with the given body.
    pub fn new(body: impl Into<String>) -> Self {
        Response {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Converts into an `http::Response`.
    ///
    /// `http` header names are case-insensitive and always lower-case. Headers that are not valid
    /// HTTP are dropped with a warning.
    pub fn into_http(self) -> http::Response<String> {
        let mut res = http::Response::new(self.body);
        *res.status_mut() = self.status;

        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => warn!("dropping invalid header {:?}: {:?}", name, value),
            }
        }

        res
    }
}

impl From<&Diagnostic> for Response {
    fn from(diag: &Diagnostic) -> Self {
        let status = StatusCode::from_u16(diag.status()).unwrap_or(StatusCode::NOT_FOUND);

        diag.headers().into_iter().fold(
            Response::new(diag.body()).with_status(status),
            |res, (name, value)| res.with_header(name, value),
        )
    }
}

impl From<Diagnostic> for Response {
    fn from(diag: Diagnostic) -> Self {
        Response::from(&diag)
    }
}

#[cfg(test)]
mod tests {
    use zzt_router::{Method, RouteTable};

    use super::*;

    #[test]
    fn diagnostic_responses() {
        let mut table = RouteTable::build();
        table.register(Method::Get, "/ping", (), "m").unwrap();
        let table = table.finish();

        let diag = table.resolve("PUT", "/ping").into_result().unwrap_err();
        let res = Response::from(&diag);
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.body(), "Method Not Allowed");
        assert_eq!(res.headers(), [("Allowed".to_owned(), "GET".to_owned())]);

        let diag = table.resolve("GET", "/pong").into_result().unwrap_err();
        let res = Response::from(diag);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), "404 Not Found");
        assert!(res.headers().is_empty());
        assert_eq!(res.header("allowed"), None);
    }

    #[test]
    fn into_http() {
        let res = Response::new("created")
            .with_status(StatusCode::CREATED)
            .with_header("Location", "/items/1")
            .with_header("Bad Header", "x")
            .into_http();

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["location"], "/items/1");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.body(), "created");
    }
}
