use std::ops::Index;

use bytestring::ByteString;
use serde::{de, Deserialize};

use crate::de::ParamsDeserializer;

/// Parameter values captured from a matched path.
///
/// Values are stored as byte ranges into the (decoded) request path and are kept in the order
/// their names appear in the route declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Path the values were captured from.
    path: ByteString,

    /// Name and value range of each captured parameter.
    segments: Vec<(String, (usize, usize))>,
}

impl Params {
    pub(crate) fn new(path: ByteString) -> Params {
        Params {
            path,
            segments: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, name: impl Into<String>, span: (usize, usize)) {
        self.segments.push((name.into(), span));
    }

    /// Returns the path the parameters were captured from.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check if there are any captured parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns number of captured parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Get captured parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|(seg_name, _)| seg_name == name)
            .map(|(_, (s, e))| &self.path[*s..*e])
    }

    /// Returns captured parameter by name, or an empty string if there is none.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Return iterator over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> ParamsIter<'_> {
        ParamsIter {
            idx: 0,
            params: self,
        }
    }

    /// Deserializes captured parameters to a specified type `T`.
    ///
    /// # Errors
    ///
    /// Returns error when the parameters cannot be deserialized into a `T`.
    ///
    /// # Examples
    /// ```
    /// use serde::Deserialize;
    /// use zzt_router::{Method, RouteTable};
    ///
    /// #[derive(Deserialize)]
    /// struct Post {
    ///     id: u32,
    ///     slug: String,
    /// }
    ///
    /// let mut table = RouteTable::build();
    /// table.register(Method::Get, "/posts/:id/:slug", "show", "blog").unwrap();
    /// let table = table.finish();
    ///
    /// let matched = table.resolve("GET", "/posts/7/hello").into_match().unwrap();
    /// let post: Post = matched.params().load().unwrap();
    /// assert_eq!(post.id, 7);
    /// assert_eq!(post.slug, "hello");
    /// ```
    pub fn load<'de, T: Deserialize<'de>>(&'de self) -> Result<T, de::value::Error> {
        T::deserialize(ParamsDeserializer::new(self))
    }
}

#[derive(Debug)]
pub struct ParamsIter<'a> {
    idx: usize,
    params: &'a Params,
}

impl<'a> Iterator for ParamsIter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<(&'a str, &'a str)> {
        let (name, (s, e)) = self.params.segments.get(self.idx)?;
        self.idx += 1;
        Some((name.as_str(), &self.params.path[*s..*e]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.params.len() - self.idx;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for ParamsIter<'_> {}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = ParamsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> Index<&'a str> for Params {
    type Output = str;

    fn index(&self, name: &'a str) -> &str {
        self.get(name)
            .expect("Value for parameter is not available")
    }
}

impl Index<usize> for Params {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        let (_, (s, e)) = &self.segments[idx];
        &self.path[*s..*e]
    }
}
