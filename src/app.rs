use std::{collections::BTreeMap, path::PathBuf};

use log::{debug, info};
use zzt_router::{AllowHeader, Method, RouteTable, RouteTableBuilder};

use crate::{
    config::Config,
    error::{Result, StartupError},
    handler::{Endpoint, HandlerResolver},
    service::Service,
};

/// Application builder.
///
/// Collects the routes of every module, resolving each handler as it is registered, and builds
/// an immutable [`Service`]. The first error encountered is kept and returned by
/// [`finish`](App::finish); modules added after it are skipped.
///
/// # Examples
/// ```
/// use zzt::{App, HandlerRegistry, Request, Response};
///
/// let mut handlers = HandlerRegistry::new();
/// handlers.insert("blog", "show", |req: &Request| {
///     Response::new(format!("post {}", req.route_param("slug").unwrap_or_default()))
/// });
///
/// let service = App::new(handlers)
///     .module("blog", |blog| {
///         blog.get("/articles/:slug", "show")?;
///         Ok(())
///     })
///     .finish()
///     .unwrap();
///
/// let res = service.handle(Request::new("GET", "/articles/hello"));
/// assert_eq!(res.body(), "post hello");
/// ```
pub struct App<R> {
    resolver: R,
    table: RouteTableBuilder<Endpoint>,
    modules: Option<BTreeMap<String, PathBuf>>,
    error: Option<StartupError>,
}

impl<R: HandlerResolver> App<R> {
    /// Creates an application builder that resolves handlers through `resolver`.
    pub fn new(resolver: R) -> Self {
        App {
            resolver,
            table: RouteTable::build(),
            modules: None,
            error: None,
        }
    }

    /// Applies configuration.
    ///
    /// Sets the 405 header name and scans the modules folder. Every module folder must hold its
    /// entry file. Once configured, only modules present in the modules folder may register
    /// routes.
    pub fn config(mut self, config: &Config) -> Self {
        info!("loading modules from {:?}", config.modules_dir());

        self.table.allow_header(config.allow_header);

        match config.module_paths() {
            Ok(modules) => {
                debug!("found modules: {:?}", modules.keys().collect::<Vec<_>>());

                if let Some((module, path)) = modules.iter().find(|(_, path)| !path.is_file()) {
                    self.fail(StartupError::MissingModuleFile {
                        module: module.clone(),
                        path: path.clone(),
                    });
                }

                self.modules = Some(modules);
            }
            Err(err) => self.fail(err.into()),
        }

        self
    }

    /// Sets the header name used by 405 responses.
    pub fn allow_header(mut self, allow_header: AllowHeader) -> Self {
        self.table.allow_header(allow_header);
        self
    }

    /// Registers the routes of module `name`.
    pub fn module<F>(mut self, name: &str, f: F) -> Self
    where
        F: FnOnce(&mut ModuleScope<'_, R>) -> Result<()>,
    {
        if self.error.is_some() {
            debug!("skipping module {:?} after earlier error", name);
            return self;
        }

        if let Some(modules) = &self.modules {
            if !modules.contains_key(name) {
                self.fail(StartupError::UnknownModule(name.to_owned()));
                return self;
            }
        }

        let mut scope = ModuleScope {
            name,
            resolver: &self.resolver,
            table: &mut self.table,
        };

        if let Err(err) = f(&mut scope) {
            self.fail(err);
        }

        self
    }

    /// Builds the service.
    ///
    /// # Errors
    /// Returns the first error raised while configuring or registering modules.
    pub fn finish(self) -> Result<Service> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let table = self.table.finish();
        info!("route table ready with {} patterns", table.len());

        Ok(Service::new(table))
    }

    fn fail(&mut self, err: StartupError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Registration surface handed to a module.
///
/// Handler locators are resolved against the module's name.
pub struct ModuleScope<'a, R> {
    name: &'a str,
    resolver: &'a R,
    table: &'a mut RouteTableBuilder<Endpoint>,
}

impl<'a, R: HandlerResolver> ModuleScope<'a, R> {
    /// Module name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Registers `locator` of this module for `method` on `route`.
    ///
    /// `function_name` is kept on the endpoint but plays no part in dispatch.
    ///
    /// # Errors
    /// Fails if `route` is malformed or if `locator` does not resolve to a handler.
    pub fn register(
        &mut self,
        method: Method,
        route: &str,
        locator: &str,
        function_name: &str,
    ) -> Result<&mut Self> {
        let handler = self.resolver.resolve(self.name, locator).ok_or_else(|| {
            StartupError::HandlerNotFound {
                module: self.name.to_owned(),
                locator: locator.to_owned(),
            }
        })?;

        if !function_name.is_empty() {
            debug!("ignoring function name {:?} of {:?}", function_name, locator);
        }

        self.table.register(
            method,
            route,
            Endpoint::new(handler, locator, function_name),
            self.name,
        )?;

        Ok(self)
    }

    /// Registers a `GET` route.
    pub fn get(&mut self, route: &str, locator: &str) -> Result<&mut Self> {
        self.register(Method::Get, route, locator, "")
    }

    /// Registers a `POST` route.
    pub fn post(&mut self, route: &str, locator: &str) -> Result<&mut Self> {
        self.register(Method::Post, route, locator, "")
    }

    /// Registers a `PUT` route.
    pub fn put(&mut self, route: &str, locator: &str) -> Result<&mut Self> {
        self.register(Method::Put, route, locator, "")
    }

    /// Registers a `PATCH` route.
    pub fn patch(&mut self, route: &str, locator: &str) -> Result<&mut Self> {
        self.register(Method::Patch, route, locator, "")
    }

    /// Registers a `DELETE` route.
    pub fn delete(&mut self, route: &str, locator: &str) -> Result<&mut Self> {
        self.register(Method::Delete, route, locator, "")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use zzt_router::InvalidRouteKind;

    use super::*;
    use crate::{HandlerRegistry, Request, Response};

    fn registry() -> HandlerRegistry {
        let mut handlers = HandlerRegistry::new();
        handlers
            .insert("blog", "list", |_: &Request| Response::new("list"))
            .insert("blog", "show", |_: &Request| Response::new("show"));
        handlers
    }

    #[test]
    fn missing_handler_aborts() {
        let err = App::new(registry())
            .module("blog", |blog| {
                blog.get("/articles", "list")?.get("/articles/:slug", "edit")?;
                Ok(())
            })
            .finish()
            .unwrap_err();

        match err {
            StartupError::HandlerNotFound { module, locator } => {
                assert_eq!(module, "blog");
                assert_eq!(locator, "edit");
            }
            err => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn invalid_route_aborts() {
        let err = App::new(registry())
            .module("blog", |blog| {
                blog.get("articles", "list")?;
                Ok(())
            })
            .finish()
            .unwrap_err();

        match err {
            StartupError::InvalidRoute(err) => {
                assert_eq!(err.kind, InvalidRouteKind::MissingLeadingSlash)
            }
            err => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn first_error_wins() {
        let mut called = false;

        let err = App::new(registry())
            .module("blog", |blog| {
                blog.get("/a", "nope")?;
                Ok(())
            })
            .module("blog", |_| {
                called = true;
                Ok(())
            })
            .finish()
            .unwrap_err();

        assert!(matches!(err, StartupError::HandlerNotFound { .. }));
        assert!(!called);
    }

    #[test]
    fn function_name_is_kept() {
        let service = App::new(registry())
            .module("blog", |blog| {
                assert_eq!(blog.name(), "blog");
                blog.register(Method::Get, "/articles", "list", "index")?;
                Ok(())
            })
            .finish()
            .unwrap();

        let outcome = service.dispatch("GET", "/articles");
        let endpoint = outcome.as_match().unwrap().handler();
        assert_eq!(endpoint.locator(), "list");
        assert_eq!(endpoint.function_name(), "index");
    }

    #[test]
    fn configured_modules_only() {
        let dir = tempfile::tempdir().unwrap();
        let blog = dir.path().join("modules").join("blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("module.rs"), "").unwrap();
        let config = Config::new(dir.path(), "modules");

        let service = App::new(registry())
            .config(&config)
            .module("blog", |blog| {
                blog.get("/articles", "list")?;
                Ok(())
            })
            .finish()
            .unwrap();
        assert_eq!(service.table().len(), 1);

        let err = App::new(registry())
            .config(&config)
            .module("shop", |_| Ok(()))
            .finish()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"module "shop" is not present in the modules folder"#
        );

        let err = App::new(registry())
            .config(&Config::new(dir.path(), "missing"))
            .finish()
            .unwrap_err();
        assert!(matches!(err, StartupError::Config(_)));
    }

    #[test]
    fn module_entry_file_required() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join("modules");
        fs::create_dir_all(modules.join("blog")).unwrap();
        fs::write(modules.join("blog").join("routes.rs"), "").unwrap();
        fs::create_dir_all(modules.join("shop")).unwrap();

        let mut config = Config::new(dir.path(), "modules");
        config.module_file = "routes.rs".to_owned();

        let err = App::new(registry()).config(&config).finish().unwrap_err();
        match err {
            StartupError::MissingModuleFile { module, path } => {
                assert_eq!(module, "shop");
                assert_eq!(path, modules.join("shop").join("routes.rs"));
            }
            err => panic!("unexpected error: {}", err),
        }

        fs::write(modules.join("shop").join("routes.rs"), "").unwrap();
        let service = App::new(registry())
            .config(&config)
            .module("blog", |blog| {
                blog.get("/articles", "list")?;
                Ok(())
            })
            .finish()
            .unwrap();
        assert_eq!(service.table().len(), 1);
    }
}
