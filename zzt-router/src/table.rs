use tracing::{debug, warn};

use crate::{
    error::InvalidRoute, outcome::AllowHeader, pattern::CompiledPattern, regex_set::RegexSet,
    Method,
};

/// Handler binding for one (pattern, method) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord<H> {
    handler: H,
    module: String,
    param_names: Vec<String>,
}

impl<H> MethodRecord<H> {
    /// The registered handler reference.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Identifier of the module that registered the route.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Parameter names of the declaration this record was registered with.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

/// One compiled pattern and its per-method records, in registration order.
#[derive(Debug)]
pub(crate) struct Entry<H> {
    pub(crate) pattern: CompiledPattern,
    pub(crate) methods: Vec<(Method, MethodRecord<H>)>,
}

impl<H> Entry<H> {
    pub(crate) fn record(&self, method: Method) -> Option<&MethodRecord<H>> {
        self.methods
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, record)| record)
    }

    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        self.methods.iter().map(|(m, _)| *m).collect()
    }
}

/// Route table.
///
/// Maps compiled patterns to per-method [records](MethodRecord). Patterns are kept in the order
/// they were first registered; resolution picks the first pattern that matches, so earlier
/// registrations win over later, overlapping ones.
///
/// A table is assembled once with a [`RouteTableBuilder`] and is immutable afterwards, so a
/// finished table can be shared freely between threads when `H` allows it.
///
/// # Examples
/// ```
/// use zzt_router::{Method, RouteTable};
///
/// let mut table = RouteTable::build();
/// table.register(Method::Get, "/articles/:slug", "show", "blog").unwrap();
/// table.register(Method::Post, "/articles", "create", "blog").unwrap();
/// let table = table.finish();
///
/// let matched = table.resolve("GET", "/articles/hello-world").into_match().unwrap();
/// assert_eq!(*matched.handler(), "show");
/// assert_eq!(matched.params().get("slug"), Some("hello-world"));
/// ```
#[derive(Debug)]
pub struct RouteTable<H> {
    pub(crate) entries: Vec<Entry<H>>,
    pub(crate) set: RegexSet,
    pub(crate) allow_header: AllowHeader,
}

impl<H> RouteTable<H> {
    /// Constructs new `RouteTableBuilder` with empty route list.
    pub fn build() -> RouteTableBuilder<H> {
        RouteTableBuilder {
            entries: Vec::new(),
            allow_header: AllowHeader::default(),
        }
    }

    /// Returns the record registered for `pattern` and `method`.
    pub fn get(&self, pattern: &CompiledPattern, method: Method) -> Option<&MethodRecord<H>> {
        self.entry(pattern)?.record(method)
    }

    /// Returns the methods registered for `pattern`, in registration order.
    ///
    /// Returns an empty list for a pattern that is not in the table.
    pub fn allowed_methods(&self, pattern: &CompiledPattern) -> Vec<Method> {
        self.entry(pattern)
            .map(Entry::allowed_methods)
            .unwrap_or_default()
    }

    /// Iterates over the table's patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.entries.iter().map(|entry| &entry.pattern)
    }

    /// Number of distinct compiled patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header name used to list allowed methods in 405 diagnostics.
    pub fn allow_header(&self) -> AllowHeader {
        self.allow_header
    }

    fn entry(&self, pattern: &CompiledPattern) -> Option<&Entry<H>> {
        self.entries.iter().find(|entry| entry.pattern == *pattern)
    }
}

/// Builder for a [route table](RouteTable).
#[derive(Debug)]
pub struct RouteTableBuilder<H> {
    entries: Vec<Entry<H>>,
    allow_header: AllowHeader,
}

impl<H> RouteTableBuilder<H> {
    /// Registers `handler` for `method` on the route `declaration`.
    ///
    /// Registering the same compiled pattern and method again replaces the earlier record; the
    /// pattern keeps its original position in the table.
    ///
    /// # Errors
    /// Returns an error if `declaration` is not a valid route.
    pub fn register(
        &mut self,
        method: Method,
        declaration: &str,
        handler: H,
        module: impl Into<String>,
    ) -> Result<&mut Self, InvalidRoute> {
        let pattern = CompiledPattern::compile(declaration)?;
        let module = module.into();

        let record = MethodRecord {
            handler,
            module,
            param_names: pattern.param_names().to_vec(),
        };

        let idx = match self.entries.iter().position(|e| e.pattern == pattern) {
            Some(idx) => {
                let existing = &self.entries[idx].pattern;
                if existing.param_names() != pattern.param_names() {
                    warn!(
                        "route {:?} shares its pattern with {:?}",
                        pattern.route(),
                        existing.route()
                    );
                }
                idx
            }
            None => {
                self.entries.push(Entry {
                    pattern,
                    methods: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];

        match entry.methods.iter_mut().find(|(m, _)| *m == method) {
            Some((_, slot)) => {
                debug!(
                    "replacing {} {} previously registered by module {:?}",
                    method,
                    declaration,
                    slot.module
                );
                *slot = record;
            }
            None => {
                debug!(
                    "registered {} {} for module {:?}",
                    method, declaration, record.module
                );
                entry.methods.push((method, record));
            }
        }

        Ok(self)
    }

    /// Sets the header name used in 405 diagnostics.
    pub fn allow_header(&mut self, allow_header: AllowHeader) -> &mut Self {
        self.allow_header = allow_header;
        self
    }

    /// Number of distinct compiled patterns registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish configuration and create the immutable route table.
    pub fn finish(self) -> RouteTable<H> {
        let set = RegexSet::new(self.entries.iter().map(|entry| entry.pattern.regex()));
        debug_assert_eq!(set.len(), self.entries.len());

        RouteTable {
            entries: self.entries,
            set,
            allow_header: self.allow_header,
        }
    }
}
