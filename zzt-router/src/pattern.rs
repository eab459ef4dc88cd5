use std::{
    fmt,
    hash::{Hash, Hasher},
};

use tracing::{debug, trace, warn};

use crate::{
    error::{InvalidRoute, InvalidRouteKind},
    quoter::FULL_QUOTER,
    regex_set::{escape, Regex},
};

/// Matches one path segment in place of a `:name` placeholder.
const PARAM_PATTERN: &str = "([a-zA-Z0-9_-]+)";

/// Matches both `/` and the empty path.
const ROOT_PATTERN: &str = "^/?$";

/// A route declaration compiled into an anchored matcher.
///
/// Declarations are `/`-separated lists of segments. A segment of the form `:name` is a
/// parameter and matches any single segment made of `a-z`, `A-Z`, `0-9`, `-` and `_`. Every other
/// segment must match literally. Trailing slashes of a declaration are dropped.
///
/// Matching always covers the whole path: there are no prefix matches and trailing slashes of a
/// request path are significant.
///
/// # Examples
/// ```
/// use zzt_router::CompiledPattern;
///
/// let pattern = CompiledPattern::compile("/users/:id").unwrap();
/// assert_eq!(pattern.as_str(), "^/users/([a-zA-Z0-9_-]+)$");
/// assert_eq!(pattern.param_names(), ["id"]);
///
/// assert!(pattern.is_match("/users/42"));
/// assert!(!pattern.is_match("/users/42/"));
/// assert!(!pattern.is_match("/users"));
/// ```
///
/// Two declarations that only differ in their parameter names compile to equal patterns:
/// ```
/// # use zzt_router::CompiledPattern;
/// let a = CompiledPattern::compile("/users/:id").unwrap();
/// let b = CompiledPattern::compile("/users/:name").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    /// Declaration the pattern was compiled from, after percent-decoding.
    route: String,

    /// Anchored regular expression; also the pattern's identity.
    re: Regex,

    /// Parameter names in declaration order.
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compiles a route declaration.
    ///
    /// The declaration is percent-decoded before it is validated, so `/users/%3Aid` is the same
    /// declaration as `/users/:id`.
    pub fn compile(declaration: &str) -> Result<Self, InvalidRoute> {
        let route = FULL_QUOTER.decode(declaration).into_owned();
        let (source, param_names) = Self::parse(&route)?;

        let re = Regex::new(&source)
            .unwrap_or_else(|err| unreachable!("generated pattern {:?} is invalid: {}", source, err));

        trace!("compiled route {:?} into {:?}", route, source);

        Ok(CompiledPattern {
            route,
            re,
            param_names,
        })
    }

    /// Validates `route` and translates it into a regex source and its parameter names.
    fn parse(route: &str) -> Result<(String, Vec<String>), InvalidRoute> {
        let invalid = |kind| Err(InvalidRoute::new(route, kind));

        let rest = match route.strip_prefix('/') {
            Some(rest) => rest,
            None => return invalid(InvalidRouteKind::MissingLeadingSlash),
        };

        if let Some(ch) = route
            .chars()
            .find(|&ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '/')))
        {
            return invalid(InvalidRouteKind::InvalidCharacter(ch));
        }

        // trailing separators are dropped; `/users/` and `/users` are the same route
        let trimmed = rest.trim_end_matches('/');
        if trimmed.len() != rest.len() {
            debug!("dropping trailing '/' from route {:?}", route);
        }

        if trimmed.is_empty() {
            return Ok((ROOT_PATTERN.to_owned(), Vec::new()));
        }

        let mut re = String::from("^");
        let mut param_names = Vec::<String>::new();

        for segment in trimmed.split('/') {
            re.push('/');

            if segment.is_empty() {
                warn!("route {:?} contains an empty segment", route);
                continue;
            }

            match param_name(segment) {
                Some(name) => {
                    if !segment.starts_with(':') || segment.len() != name.len() + 1 {
                        warn!(
                            "segment {:?} of route {:?} is matched as parameter {:?}",
                            segment, route, name
                        );
                    }

                    if param_names.iter().any(|n| n == name) {
                        warn!("parameter {:?} is declared more than once in {:?}", name, route);
                    }

                    param_names.push(name.to_owned());
                    re.push_str(PARAM_PATTERN);
                }

                None => re.push_str(&escape(segment)),
            }
        }

        re.push('$');

        Ok((re, param_names))
    }

    /// Returns the (decoded) declaration this pattern was compiled from.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the anchored regular expression source.
    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.re
    }

    /// Returns true if `path` matches this pattern in full.
    pub fn is_match(&self, path: &str) -> bool {
        self.re.is_match(path)
    }

    /// Returns the byte ranges of the parameter values in `path`, in declaration order.
    ///
    /// Returns `None` when `path` does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<(usize, usize)>> {
        let captures = self.re.captures(path)?;

        Some(
            captures
                .iter()
                .skip(1)
                .flatten()
                .map(|m| (m.start(), m.end()))
                .collect(),
        )
    }
}

impl Eq for CompiledPattern {}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &CompiledPattern) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Hash for CompiledPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route)
    }
}

impl TryFrom<&str> for CompiledPattern {
    type Error = InvalidRoute;

    fn try_from(declaration: &str) -> Result<Self, Self::Error> {
        CompiledPattern::compile(declaration)
    }
}

/// Returns the name of the first `:name` placeholder in `segment`.
///
/// A segment holding a placeholder anywhere is matched as a whole by the parameter.
fn param_name(segment: &str) -> Option<&str> {
    segment.match_indices(':').find_map(|(idx, _)| {
        let name = &segment[idx + 1..];
        let end = name
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')))
            .unwrap_or(name.len());

        (end > 0).then(|| &name[..end])
    })
}

#[cfg(test)]
mod tests {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

    use super::*;

    fn compile(route: &str) -> CompiledPattern {
        CompiledPattern::compile(route).unwrap()
    }

    fn kind(route: &str) -> InvalidRouteKind {
        CompiledPattern::compile(route).unwrap_err().kind
    }

    #[test]
    fn parse_static() {
        let re = compile("/ping");
        assert_eq!(re.as_str(), "^/ping$");
        assert!(re.param_names().is_empty());

        assert!(re.is_match("/ping"));
        assert!(!re.is_match("/ping/"));
        assert!(!re.is_match("/pings"));
        assert!(!re.is_match("/ping/pong"));
        assert!(!re.is_match("ping"));

        let re = compile("/api/v1/health-check_2");
        assert!(re.is_match("/api/v1/health-check_2"));
        assert!(!re.is_match("/api/v1"));
    }

    #[test]
    fn parse_param() {
        let re = compile("/users/:id/posts/:postId");
        assert_eq!(re.param_names(), ["id", "postId"]);

        assert!(re.is_match("/users/42/posts/7"));
        assert!(re.is_match("/users/a-b_c/posts/X"));
        assert!(!re.is_match("/users/42/posts/"));
        assert!(!re.is_match("/users/42/posts/7/"));
        assert!(!re.is_match("/users/4.2/posts/7"));
        assert!(!re.is_match("/users/42/comments/7"));

        let path = "/users/42/posts/7";
        let spans = re.captures(path).unwrap();
        let values: Vec<_> = spans.iter().map(|&(s, e)| &path[s..e]).collect();
        assert_eq!(values, ["42", "7"]);

        assert!(re.captures("/users/42").is_none());
    }

    #[test]
    fn root() {
        let re = compile("/");
        assert_eq!(re.as_str(), "^/?$");
        assert!(re.is_match("/"));
        assert!(re.is_match(""));
        assert!(!re.is_match("//"));
        assert!(!re.is_match("/index"));

        assert!(!compile("/index").is_match(""));
        assert!(!compile("/:page").is_match("/"));
    }

    #[test]
    fn deterministic() {
        for route in ["/", "/a", "/a/:b", "/a/:b/c/:d"] {
            assert_eq!(compile(route), compile(route));
            assert_eq!(compile(route).as_str(), compile(route).as_str());
        }
    }

    #[test]
    fn equivalence() {
        assert_eq!(compile("/users/:id"), compile("/users/:user_id"));
        assert_ne!(compile("/users/:id"), compile("/users/id"));
        assert_ne!(compile("/users"), compile("/users/:id"));
    }

    #[test]
    fn decode_before_validate() {
        let encoded = format!("/users/{}", utf8_percent_encode(":id", NON_ALPHANUMERIC));
        assert_eq!(encoded, "/users/%3Aid");

        let re = compile(&encoded);
        assert_eq!(re.route(), "/users/:id");
        assert_eq!(re.param_names(), ["id"]);

        assert_eq!(
            kind("/users/%20"),
            InvalidRouteKind::InvalidCharacter(' ')
        );
    }

    #[test]
    fn invalid_routes() {
        assert_eq!(kind(""), InvalidRouteKind::MissingLeadingSlash);
        assert_eq!(kind("users"), InvalidRouteKind::MissingLeadingSlash);
        assert_eq!(kind("/users.json"), InvalidRouteKind::InvalidCharacter('.'));
        assert_eq!(kind("/users/{id}"), InvalidRouteKind::InvalidCharacter('{'));
    }

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(compile("/users/"), compile("/users"));
        assert_eq!(compile("/users/").as_str(), "^/users$");
        assert_eq!(compile("/users//").as_str(), "^/users$");
        assert_eq!(compile("/users/:id/").param_names(), ["id"]);

        assert!(compile("/users/").is_match("/users"));
        assert!(!compile("/users/").is_match("/users/"));

        assert_eq!(compile("//"), compile("/"));
    }

    #[test]
    fn empty_segment_is_literal() {
        let re = compile("//users");
        assert_eq!(re.as_str(), "^//users$");
        assert!(re.is_match("//users"));
        assert!(!re.is_match("/users"));
    }

    #[test]
    fn loose_params() {
        // a placeholder anywhere in a segment captures the whole segment
        let re = compile("/users/a:b");
        assert_eq!(re, compile("/users/:b"));
        assert_eq!(re.param_names(), ["b"]);

        assert_eq!(compile("/users/:a:b").param_names(), ["a"]);

        // a lone colon is no placeholder
        let re = compile("/users/:");
        assert!(re.param_names().is_empty());
        assert!(re.is_match("/users/:"));
        assert!(!re.is_match("/users/42"));

        let re = compile("/:id/x/:id");
        assert_eq!(re.param_names(), ["id", "id"]);
        assert_eq!(re.captures("/1/x/2").unwrap(), [(1, 2), (5, 6)]);
    }

    #[test]
    fn invalid_route_display() {
        let err = CompiledPattern::compile("/a b").unwrap_err();
        assert_eq!(err.to_string(), r#"invalid route "/a b": character ' ' is not allowed"#);
    }
}
