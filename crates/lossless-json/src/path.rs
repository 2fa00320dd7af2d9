//! Key paths addressing nested object members of a document.
//!
//! A [`KeyPath`] is an ordered list of object keys. It never addresses array
//! elements: path mutation only ever creates or descends through objects.
//! Paths convert to and from RFC 6901 JSON Pointers for interop.

use std::fmt;

/// An ordered sequence of object keys, outermost first.
///
/// ```
/// use lossless_json::{key_path, KeyPath};
///
/// let path = KeyPath::root().key("Phone").key("Mobile");
/// assert_eq!(path, key_path!("Phone", "Mobile"));
/// assert_eq!(path.to_pointer(), "/Phone/Mobile");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The empty path, addressing the document root.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key and return self.
    #[inline]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(key.into());
        self
    }

    #[inline]
    pub fn push(&mut self, key: impl Into<String>) {
        self.0.push(key.into());
    }

    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The leading keys and the terminal key, or `None` for the root path.
    #[inline]
    pub fn split_last(&self) -> Option<(&str, &[String])> {
        self.0
            .split_last()
            .map(|(last, parents)| (last.as_str(), parents))
    }

    /// The first `len` keys of this path.
    pub fn prefix(&self, len: usize) -> KeyPath {
        KeyPath(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Parse an RFC 6901 pointer. Relative pointers (`"a/b"`) are accepted
    /// as if they started with `/`.
    ///
    /// - `"" -> []`
    /// - `"/" -> [""]`
    /// - `"/a~1b/~0k" -> ["a/b", "~k"]`
    pub fn from_pointer(pointer: &str) -> Self {
        if pointer.is_empty() {
            return Self::root();
        }
        let rest = pointer.strip_prefix('/').unwrap_or(pointer);
        rest.split('/').map(unescape_component).collect()
    }

    /// Format this path as an RFC 6901 pointer.
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for component in &self.0 {
            out.push('/');
            out.push_str(&escape_component(component));
        }
        out
    }
}

fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for key in &self.0 {
            write!(f, ".{key}")?;
        }
        Ok(())
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self(vec![key.to_owned()])
    }
}

impl From<String> for KeyPath {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<&String> for KeyPath {
    fn from(key: &String) -> Self {
        Self(vec![key.clone()])
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for KeyPath {
    fn from(keys: Vec<&str>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<&[&str]> for KeyPath {
    fn from(keys: &[&str]) -> Self {
        keys.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(keys: [&str; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl From<&KeyPath> for KeyPath {
    fn from(path: &KeyPath) -> Self {
        path.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Construct a [`KeyPath`] from a list of keys.
///
/// ```
/// use lossless_json::key_path;
///
/// let p = key_path!("Phone", "Mobile");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! key_path {
    () => {
        $crate::KeyPath::root()
    };
    ($($key:expr),+ $(,)?) => {{
        let mut p = $crate::KeyPath::root();
        $(
            p.push($key);
        )+
        p
    }};
}
