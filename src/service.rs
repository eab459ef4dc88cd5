use log::{trace, warn};
use zzt_router::{DispatchOutcome, RouteTable};

use crate::{handler::Endpoint, request::Request, response::Response};

/// A built application: an immutable route table of resolved endpoints.
///
/// `Service` is `Send + Sync` and can be shared between threads behind an `Arc` or installed
/// process-wide with [`global::install`](crate::global::install).
#[derive(Debug)]
pub struct Service {
    table: RouteTable<Endpoint>,
}

impl Service {
    pub(crate) fn new(table: RouteTable<Endpoint>) -> Self {
        Service { table }
    }

    /// The underlying route table.
    pub fn table(&self) -> &RouteTable<Endpoint> {
        &self.table
    }

    /// Resolves `method` and `uri` without invoking a handler.
    ///
    /// Any query string or fragment in `uri` is ignored.
    pub fn dispatch(&self, method: &str, uri: &str) -> DispatchOutcome<'_, Endpoint> {
        let end = uri.find(|c| c == '?' || c == '#').unwrap_or(uri.len());
        self.table.resolve(method, &uri[..end])
    }

    /// Handles a request.
    ///
    /// On a match, route parameters are attached to the request and the endpoint is invoked.
    /// Otherwise the 404 or 405 diagnostic is rendered as the response.
    pub fn handle(&self, mut req: Request) -> Response {
        match self.table.resolve(req.method(), req.path()).into_result() {
            Ok(matched) => {
                trace!(
                    "{} {} matched {} of module {:?}",
                    req.method(),
                    req.path(),
                    matched.pattern(),
                    matched.module()
                );

                let endpoint = matched.handler();
                req.set_route_params(matched.into_params());
                endpoint.call(&req)
            }
            Err(diag) => {
                warn!("{} {}: {}", req.method(), req.path(), diag.reason());
                Response::from(&diag)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::{App, HandlerRegistry};

    fn service() -> Service {
        let mut handlers = HandlerRegistry::new();
        handlers
            .insert("users", "show", |req: &Request| {
                let params = req.route_params();
                let pairs: Vec<_> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                Response::new(pairs.join("&"))
            })
            .insert("users", "create", |_: &Request| {
                Response::new("created").with_status(StatusCode::CREATED)
            });

        App::new(handlers)
            .module("users", |users| {
                users
                    .get("/users/:id/posts/:postId", "show")?
                    .post("/users", "create")?;
                Ok(())
            })
            .finish()
            .unwrap()
    }

    #[test]
    fn handle_match() {
        let service = service();

        let res = service.handle(Request::new("GET", "/users/42/posts/7?x=1"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), "id=42&postId=7");

        let res = service.handle(Request::new("post", "/users"));
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[test]
    fn handle_failures() {
        let service = service();

        let res = service.handle(Request::new("GET", "/users"));
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("Allowed"), Some("POST"));

        let res = service.handle(Request::new("GET", "/users/42/posts/7/"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), "404 Not Found");
    }

    #[test]
    fn dispatch_ignores_query() {
        let service = service();

        assert!(service.dispatch("POST", "/users?draft=1").is_match());
        assert!(service.dispatch("POST", "/users#top").is_match());
        assert!(!service.dispatch("POST", "/users/").is_match());
    }

    #[test]
    fn shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Service>();
    }
}
