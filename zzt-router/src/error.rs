use std::fmt;

/// Error returned when a route declaration cannot be compiled.
///
/// An invalid declaration is a configuration error: the route table it was meant for should not
/// be used to serve requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRoute {
    /// The declaration after percent-decoding.
    pub route: String,
    pub kind: InvalidRouteKind,
}

/// What made a route declaration invalid.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidRouteKind {
    /// Declarations must start with `/`.
    MissingLeadingSlash,
    /// Only `a-z`, `A-Z`, `0-9`, `-`, `_`, `:` and `/` are allowed.
    InvalidCharacter(char),
}

impl InvalidRoute {
    pub(crate) fn new(route: impl Into<String>, kind: InvalidRouteKind) -> Self {
        InvalidRoute {
            route: route.into(),
            kind,
        }
    }
}

impl fmt::Display for InvalidRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route {:?}: ", self.route)?;

        match &self.kind {
            InvalidRouteKind::MissingLeadingSlash => f.write_str("must start with '/'"),
            InvalidRouteKind::InvalidCharacter(ch) => {
                write!(f, "character {:?} is not allowed", ch)
            }
        }
    }
}

impl std::error::Error for InvalidRoute {}
