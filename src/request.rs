use std::collections::HashMap;

use log::warn;
use zzt_router::Params;

/// An incoming request, as seen by handlers.
///
/// The method is upper-cased, the URI is split into path and query, and query and body
/// parameters are merged into one map. Route parameters are filled in once the request has been
/// matched.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    query: String,
    host: String,
    headers: Vec<(String, String)>,
    body: String,
    params: HashMap<String, String>,
    route_params: Params,
}

impl Request {
    /// Constructs a request from a method and a request URI (path plus optional query).
    pub fn new(method: &str, uri: &str) -> Self {
        let uri = uri.split('#').next().unwrap_or_default();
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));

        let mut req = Request {
            method: method.to_ascii_uppercase(),
            path: path.to_owned(),
            query: query.to_owned(),
            ..Request::default()
        };

        req.params = parse_params(query);
        req
    }

    /// Constructs a request from the head of an `http::Request`.
    ///
    /// Only the method, URI, `Host` header and headers that are valid UTF-8 are carried over.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let uri = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut this = Request::new(req.method().as_str(), uri);

        for (name, value) in req.headers() {
            match value.to_str() {
                Ok(value) => this.headers.push((name.as_str().to_owned(), value.to_owned())),
                Err(_) => warn!("dropping non UTF-8 header {}", name),
            }
        }

        this.host = this
            .header("host")
            .map(ToOwned::to_owned)
            .or_else(|| req.uri().host().map(ToOwned::to_owned))
            .unwrap_or_default();

        this
    }

    /// Sets the host the request was addressed to.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the raw body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Merges body parameters into the request parameters; body values win over query values.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Merges `application/x-www-form-urlencoded` body parameters.
    pub fn with_form_body(self, body: &str) -> Self {
        let params = parse_params(body);
        self.with_body(body).with_params(params)
    }

    /// Upper-cased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    pub fn host(&self) -> &str {
        &self.host
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

    /// Query and body parameters.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns a query or body parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parameters captured from the path by the matched route.
    pub fn route_params(&self) -> &Params {
        &self.route_params
    }

    /// Returns a route parameter.
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params.get(name)
    }

    pub(crate) fn set_route_params(&mut self, params: Params) {
        self.route_params = params;
    }
}

fn parse_params(input: &str) -> HashMap<String, String> {
    if input.is_empty() {
        return HashMap::new();
    }

    match serde_urlencoded::from_str::<Vec<(String, String)>>(input) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(err) => {
            warn!("ignoring malformed parameters {:?}: {}", input, err);
            HashMap::new()
        }
    }
}
