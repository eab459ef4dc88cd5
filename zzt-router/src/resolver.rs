use bytestring::ByteString;
use tracing::trace;

use crate::{
    outcome::{Diagnostic, DispatchOutcome, ResolveError, RouteMatch},
    quoter::PATH_QUOTER,
    Method, Params, ResourcePath, RouteTable,
};

impl<H> RouteTable<H> {
    /// Resolves a request method and path to a [`DispatchOutcome`].
    ///
    /// The method name is matched case-insensitively. A name outside the supported set does not
    /// match any record, so a path that matches still yields a 405.
    ///
    /// The path is percent-decoded, except for `%2F`, and must then match a pattern in full.
    /// Trailing slashes are significant; `/` and the empty path are the same path.
    ///
    /// # Examples
    /// ```
    /// use zzt_router::{Method, RouteTable};
    ///
    /// let mut table = RouteTable::build();
    /// table.register(Method::Get, "/ping", "pong", "health").unwrap();
    /// let table = table.finish();
    ///
    /// assert!(table.resolve("GET", "/ping").is_match());
    ///
    /// let diag = table.resolve("POST", "/ping").into_result().unwrap_err();
    /// assert_eq!(diag.status(), 405);
    /// assert_eq!(diag.headers(), [("Allowed", "GET".to_owned())]);
    ///
    /// let diag = table.resolve("GET", "/ping/").into_result().unwrap_err();
    /// assert_eq!(diag.status(), 404);
    /// ```
    pub fn resolve(&self, method: &str, path: impl ResourcePath) -> DispatchOutcome<'_, H> {
        let method = Method::parse(method).ok_or(method);
        self.resolve_inner(method, path.path())
    }

    /// Same as [`resolve`](Self::resolve) for an already parsed method.
    pub fn resolve_method(&self, method: Method, path: impl ResourcePath) -> DispatchOutcome<'_, H> {
        self.resolve_inner(Ok(method), path.path())
    }

    fn resolve_inner(&self, method: Result<Method, &str>, path: &str) -> DispatchOutcome<'_, H> {
        let path = PATH_QUOTER.decode(path);

        let entry = match self.set.first_match_idx(&path) {
            Some(idx) => &self.entries[idx],
            None => {
                trace!("no route matches {:?}", path);
                return self.fail(ResolveError::RouteNotFound);
            }
        };

        let (method, record) = match method {
            Ok(method) => match entry.record(method) {
                Some(record) => (method, record),
                None => {
                    trace!("route {} does not accept {}", entry.pattern, method);
                    return self.fail(ResolveError::MethodNotAllowed {
                        method,
                        allowed: entry.allowed_methods(),
                    });
                }
            },
            Err(method) => {
                trace!("unsupported method {:?} for route {}", method, entry.pattern);
                return self.fail(ResolveError::UnsupportedMethod {
                    method: method.to_owned(),
                    allowed: entry.allowed_methods(),
                });
            }
        };

        let path = ByteString::from(path.into_owned());
        let mut params = Params::new(path.clone());

        if let Some(spans) = entry.pattern.captures(&path) {
            for (name, span) in record.param_names().iter().zip(spans) {
                params.add(name.as_str(), span);
            }
        }

        trace!("resolved {} {:?} to route {}", method, params.path(), entry.pattern);

        DispatchOutcome::Matched(RouteMatch {
            pattern: &entry.pattern,
            method,
            record,
            params,
        })
    }

    fn fail(&self, reason: ResolveError) -> DispatchOutcome<'_, H> {
        DispatchOutcome::Failed(Diagnostic::new(reason, self.allow_header))
    }
}
