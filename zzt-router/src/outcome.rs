use std::fmt;

use serde::Deserialize;

use crate::{pattern::CompiledPattern, table::MethodRecord, Method, Params};

/// Name of the header listing the methods a matched route accepts.
///
/// Existing clients expect the non-standard `Allowed` header, which stays the default. Deployments
/// that control every client can switch to the standard `Allow`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowHeader {
    #[default]
    Legacy,
    Standard,
}

impl AllowHeader {
    pub const fn name(&self) -> &'static str {
        match self {
            AllowHeader::Legacy => "Allowed",
            AllowHeader::Standard => "Allow",
        }
    }
}

/// Why a request could not be resolved to a handler.
///
/// These are ordinary outcomes of resolution, carried by [`Diagnostic`], and never escape the
/// resolver as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No registered pattern matches the path.
    RouteNotFound,

    /// A pattern matches but has no record for the requested method.
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    /// A pattern matches but the request method is not one the router knows.
    UnsupportedMethod { method: String, allowed: Vec<Method> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::RouteNotFound => f.write_str("no route matches the request path"),
            ResolveError::MethodNotAllowed { method, .. } => {
                write!(f, "route does not accept {}", method)
            }
            ResolveError::UnsupportedMethod { method, .. } => {
                write!(f, "unsupported request method {:?}", method)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Description of the response to send when resolution fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    reason: ResolveError,
    allow_header: AllowHeader,
}

impl Diagnostic {
    pub(crate) fn new(reason: ResolveError, allow_header: AllowHeader) -> Self {
        Diagnostic {
            reason,
            allow_header,
        }
    }

    pub fn reason(&self) -> &ResolveError {
        &self.reason
    }

    /// Response status code: 404 or 405.
    pub fn status(&self) -> u16 {
        match self.reason {
            ResolveError::RouteNotFound => 404,
            ResolveError::MethodNotAllowed { .. } | ResolveError::UnsupportedMethod { .. } => 405,
        }
    }

    /// Response body.
    pub fn body(&self) -> &'static str {
        match self.reason {
            ResolveError::RouteNotFound => "404 Not Found",
            ResolveError::MethodNotAllowed { .. } | ResolveError::UnsupportedMethod { .. } => {
                "Method Not Allowed"
            }
        }
    }

    /// Methods registered for the matched pattern; empty for a 404.
    pub fn allowed_methods(&self) -> &[Method] {
        match &self.reason {
            ResolveError::RouteNotFound => &[],
            ResolveError::MethodNotAllowed { allowed, .. }
            | ResolveError::UnsupportedMethod { allowed, .. } => allowed,
        }
    }

    /// Response headers.
    ///
    /// A 405 carries one header listing the allowed methods, comma separated, in the order they
    /// were registered. A 404 carries none.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self.reason {
            ResolveError::RouteNotFound => Vec::new(),
            _ => {
                let allowed = self
                    .allowed_methods()
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");

                vec![(self.allow_header.name(), allowed)]
            }
        }
    }
}

/// A successful resolution: the record registered for the request's pattern and method.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub(crate) pattern: &'a CompiledPattern,
    pub(crate) method: Method,
    pub(crate) record: &'a MethodRecord<H>,
    pub(crate) params: Params,
}

impl<'a, H> RouteMatch<'a, H> {
    /// The handler reference registered for this route and method.
    pub fn handler(&self) -> &'a H {
        self.record.handler()
    }

    /// Identifier of the module that registered the route.
    pub fn module(&self) -> &'a str {
        self.record.module()
    }

    pub fn record(&self) -> &'a MethodRecord<H> {
        self.record
    }

    pub fn pattern(&self) -> &'a CompiledPattern {
        self.pattern
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Parameter values captured from the path, paired with their names.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

/// Result of resolving a request against a route table.
///
/// Exactly one branch is populated: a match always carries a handler record and a failure always
/// carries a diagnostic.
#[derive(Debug)]
pub enum DispatchOutcome<'a, H> {
    Matched(RouteMatch<'a, H>),
    Failed(Diagnostic),
}

impl<'a, H> DispatchOutcome<'a, H> {
    pub fn is_match(&self) -> bool {
        matches!(self, DispatchOutcome::Matched(_))
    }

    /// Status code of the outcome: 200 for a match, otherwise the diagnostic's.
    pub fn status(&self) -> u16 {
        match self {
            DispatchOutcome::Matched(_) => 200,
            DispatchOutcome::Failed(diag) => diag.status(),
        }
    }

    pub fn as_match(&self) -> Option<&RouteMatch<'a, H>> {
        match self {
            DispatchOutcome::Matched(m) => Some(m),
            DispatchOutcome::Failed(_) => None,
        }
    }

    pub fn into_match(self) -> Option<RouteMatch<'a, H>> {
        match self {
            DispatchOutcome::Matched(m) => Some(m),
            DispatchOutcome::Failed(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            DispatchOutcome::Matched(_) => None,
            DispatchOutcome::Failed(diag) => Some(diag),
        }
    }

    /// Converts into a `Result`, with the diagnostic as the error branch.
    pub fn into_result(self) -> Result<RouteMatch<'a, H>, Diagnostic> {
        match self {
            DispatchOutcome::Matched(m) => Ok(m),
            DispatchOutcome::Failed(diag) => Err(diag),
        }
    }
}
