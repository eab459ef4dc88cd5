//! Route table, pattern compiler and resolver.
//!
//! Routes are declared as `/`-separated paths where a `:name` segment captures one path segment.
//! Declarations are compiled into anchored patterns and registered per request method into a
//! [`RouteTable`]. Resolving a method and path against the finished table yields a
//! [`DispatchOutcome`]: either the matched handler with its captured [`Params`], or a
//! [`Diagnostic`] describing the 404 or 405 response to send instead.
//!
//! ```
//! use zzt_router::{DispatchOutcome, Method, RouteTable};
//!
//! let mut table = RouteTable::build();
//! table.register(Method::Get, "/articles/:slug", "articles/show", "blog").unwrap();
//! let table = table.finish();
//!
//! match table.resolve("GET", "/articles/hello-world") {
//!     DispatchOutcome::Matched(m) => {
//!         assert_eq!(*m.handler(), "articles/show");
//!         assert_eq!(m.module(), "blog");
//!         assert_eq!(&m.params()["slug"], "hello-world");
//!     }
//!     DispatchOutcome::Failed(diag) => panic!("unexpected {}", diag.status()),
//! }
//! ```

#![deny(rust_2018_idioms, nonstandard_style)]
#![warn(future_incompatible)]

mod de;
mod error;
mod method;
mod outcome;
mod params;
mod pattern;
mod quoter;
mod regex_set;
mod resolver;
mod resource_path;
mod table;

pub use self::de::ParamsDeserializer;
pub use self::error::{InvalidRoute, InvalidRouteKind};
pub use self::method::{Method, UnsupportedMethod};
pub use self::outcome::{AllowHeader, Diagnostic, DispatchOutcome, ResolveError, RouteMatch};
pub use self::params::{Params, ParamsIter};
pub use self::pattern::CompiledPattern;
pub use self::quoter::Quoter;
pub use self::resource_path::ResourcePath;
pub use self::table::{MethodRecord, RouteTable, RouteTableBuilder};
