//! Handlers and the strategies that find them.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;

use crate::{config::Config, request::Request, response::Response};

/// Anything invocable with a request that produces a response.
///
/// Implemented for all `Fn(&Request) -> Response` closures and functions that can be shared
/// between threads.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    fn call(&self, req: &Request) -> Response {
        (self)(req)
    }
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Shared, type-erased handler as stored in the route table.
pub type BoxedHandler = Arc<dyn Handler>;

/// A resolved handler together with the locator it was registered under.
///
/// This is the per-method value stored in the service's route table.
#[derive(Clone)]
pub struct Endpoint {
    handler: BoxedHandler,
    locator: String,
    function_name: String,
}

impl Endpoint {
    pub(crate) fn new(handler: BoxedHandler, locator: &str, function_name: &str) -> Self {
        Endpoint {
            handler,
            locator: locator.to_owned(),
            function_name: function_name.to_owned(),
        }
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Function name given at registration. Not used for dispatch.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Invokes the handler.
    pub fn call(&self, req: &Request) -> Response {
        self.handler.call(req)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("locator", &self.locator)
            .field("function_name", &self.function_name)
            .finish()
    }
}

/// Resolves a module-qualified handler locator to a handler.
///
/// Resolution happens once, when a route is registered. A locator that does not resolve aborts
/// startup instead of surfacing as a 404 later.
pub trait HandlerResolver {
    fn resolve(&self, module: &str, locator: &str) -> Option<BoxedHandler>;
}

impl<R: HandlerResolver + ?Sized> HandlerResolver for &R {
    fn resolve(&self, module: &str, locator: &str) -> Option<BoxedHandler> {
        (**self).resolve(module, locator)
    }
}

/// In-memory table of handlers keyed by module and locator.
///
/// # Examples
/// ```
/// use zzt::{HandlerRegistry, HandlerResolver, Request, Response};
///
/// let mut registry = HandlerRegistry::new();
/// registry.insert("blog", "show", |_: &Request| Response::new("post"));
///
/// assert!(registry.resolve("blog", "show").is_some());
/// assert!(registry.resolve("shop", "show").is_none());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(String, String), BoxedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler; replaces any handler with the same module and locator.
    pub fn insert<H: Handler>(
        &mut self,
        module: impl Into<String>,
        locator: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.handlers
            .insert((module.into(), locator.into()), Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(&self, module: &str, locator: &str) -> Option<BoxedHandler> {
        self.handlers
            .get(&(module.to_owned(), locator.to_owned()))
            .cloned()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &keys)
            .finish()
    }
}

/// Requires every locator to name an existing file inside its module folder before delegating
/// to the inner resolver.
///
/// A locator `show.rs` registered by module `blog` must exist at
/// `<base_path>/<modules_folder>/blog/show.rs`, and may not point outside of the module folder.
#[derive(Debug)]
pub struct FileBacked<R> {
    modules_dir: PathBuf,
    inner: R,
}

impl<R> FileBacked<R> {
    pub fn new(modules_dir: impl Into<PathBuf>, inner: R) -> Self {
        FileBacked {
            modules_dir: modules_dir.into(),
            inner,
        }
    }

    /// Uses the modules folder named by `config`.
    pub fn from_config(config: &Config, inner: R) -> Self {
        Self::new(config.modules_dir(), inner)
    }

    /// Returns the canonical path of the locator's file, if it exists within the module folder.
    pub fn locate(&self, module: &str, locator: &str) -> Option<PathBuf> {
        let module_dir = self.modules_dir.join(module).canonicalize().ok()?;
        let file = module_dir.join(locator).canonicalize().ok()?;

        if file.starts_with(&module_dir) && file.is_file() {
            Some(file)
        } else {
            None
        }
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }
}

impl<R: HandlerResolver> HandlerResolver for FileBacked<R> {
    fn resolve(&self, module: &str, locator: &str) -> Option<BoxedHandler> {
        match self.locate(module, locator) {
            Some(file) => {
                debug!("handler {:?} of module {:?} found at {:?}", locator, module, file);
                self.inner.resolve(module, locator)
            }
            None => {
                debug!("no handler file {:?} in module {:?}", locator, module);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn ok(_: &Request) -> Response {
        Response::new("ok")
    }

    #[test]
    fn registry_resolves_by_module_and_locator() {
        let mut registry = HandlerRegistry::new();
        registry.insert("blog", "show", ok).insert("blog", "list", ok);

        assert_eq!(registry.len(), 2);

        let handler = registry.resolve("blog", "show").unwrap();
        assert_eq!(handler.call(&Request::new("GET", "/")).body(), "ok");

        assert!(registry.resolve("blog", "edit").is_none());
        assert!(registry.resolve("shop", "show").is_none());
    }

    #[test]
    fn file_backed_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("blog").join("show.rs"), "").unwrap();
        fs::write(dir.path().join("secret.rs"), "").unwrap();

        let mut registry = HandlerRegistry::new();
        registry
            .insert("blog", "show.rs", ok)
            .insert("blog", "list.rs", ok)
            .insert("blog", "../secret.rs", ok);

        let resolver = FileBacked::new(dir.path(), registry);

        assert!(resolver.resolve("blog", "show.rs").is_some());

        // registered but no file on disk
        assert!(resolver.resolve("blog", "list.rs").is_none());

        // file exists but escapes the module folder
        assert!(resolver.resolve("blog", "../secret.rs").is_none());

        assert!(resolver.resolve("shop", "show.rs").is_none());
    }
}
