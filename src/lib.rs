//! zzt is a small request-handling framework built around a module-scoped route table.
//!
//! Modules register routes such as `/articles/:slug` against handler locators. Locators are
//! resolved to handlers once, at startup, and the finished [`Service`] dispatches requests to them
//! in registration order. Requests that match no route get a `404 Not Found`; requests that match
//! a route under a different method get a `405 Method Not Allowed` listing the allowed methods.
//!
//! # Examples
//! ```
//! use zzt::{App, HandlerRegistry, Request, Response, StatusCode};
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers.insert("blog", "show", |req: &Request| {
//!     Response::new(req.route_param("slug").unwrap_or_default())
//! });
//!
//! let service = App::new(handlers)
//!     .module("blog", |blog| {
//!         blog.get("/articles/:slug", "show")?;
//!         Ok(())
//!     })
//!     .finish()?;
//!
//! let res = service.handle(Request::new("GET", "/articles/hello-world"));
//! assert_eq!(res.body(), "hello-world");
//!
//! let res = service.handle(Request::new("DELETE", "/articles/hello-world"));
//! assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(res.header("Allowed"), Some("GET"));
//!
//! let res = service.handle(Request::new("GET", "/articles"));
//! assert_eq!(res.status(), StatusCode::NOT_FOUND);
//! # Ok::<(), zzt::StartupError>(())
//! ```
//!
//! # Crate Features
//! - `unicode` - Use `regex` instead of `regex-lite` for pattern matching (enabled by default).

#![deny(rust_2018_idioms, nonstandard_style)]
#![warn(future_incompatible)]

mod app;
mod config;
pub mod error;
pub mod global;
mod handler;
mod request;
mod response;
mod service;

// re-export for convenience
pub use http::{self, StatusCode};
pub use zzt_router as router;
pub use zzt_router::{AllowHeader, Diagnostic, DispatchOutcome, Method, Params};

pub use crate::app::{App, ModuleScope};
pub use crate::config::Config;
pub use crate::error::{ConfigError, StartupError};
pub use crate::handler::{
    BoxedHandler, Endpoint, FileBacked, Handler, HandlerRegistry, HandlerResolver,
};
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::service::Service;
