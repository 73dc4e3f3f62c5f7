//! Route path templates compiled to anchored regular expressions.
//!
//! A template is split on `/` and each segment is translated on its own:
//!
//! | Segment  | Compiles to          | Capture            |
//! |----------|----------------------|--------------------|
//! | *(empty)*| nothing              | none               |
//! | `*`      | `(.*)`               | `splat`            |
//! | `:name`  | `([^/]+)`            | `name`             |
//! | other    | the escaped literal  | none               |
//!
//! Trailing empty segments are dropped, the rest are re-joined with `/`, and
//! the whole expression is anchored with an optional trailing slash, so
//! `/users/:id` and `/users/:id/` both accept `/users/7` and `/users/7/`.

use std::collections::HashMap;

use regex::Regex;

use crate::error::ConfigError;

/// Capture name bound by a `*` segment.
pub const SPLAT: &str = "splat";

/// Parameters captured from a matched path, keyed by capture name.
pub type PathParams = HashMap<String, String>;

/// A compiled path template.
///
/// # Examples
///
/// ```
/// use switchyard::router::PathPattern;
///
/// let pattern = PathPattern::compile("/hello/:name").unwrap();
/// let params = pattern.matches("/hello/Ada").unwrap();
/// assert_eq!(params["name"], "Ada");
/// assert!(pattern.matches("/hello").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    keys: Vec<String>,
}

impl PathPattern {
    /// Compiles `path` into a matcher.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::RelativePath`]: `path` does not begin with `/`.
    /// - [`ConfigError::Pattern`]: the generated expression failed to compile.
    pub fn compile(path: &str) -> Result<Self, ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::RelativePath {
                path: path.to_owned(),
            });
        }

        let mut segments: Vec<&str> = path.split('/').collect();
        while segments.last() == Some(&"") {
            segments.pop();
        }

        let mut keys = Vec::new();
        let body = segments
            .into_iter()
            .map(|segment| match segment {
                "" => String::new(),
                "*" => {
                    keys.push(SPLAT.to_owned());
                    "(.*)".to_owned()
                }
                _ => match param_name(segment) {
                    Some(name) => {
                        keys.push(name.to_owned());
                        "([^/]+)".to_owned()
                    }
                    None => regex::escape(segment),
                },
            })
            .collect::<Vec<_>>()
            .join("/");

        let regex = Regex::new(&format!("^{body}/?$")).map_err(|source| ConfigError::Pattern {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self {
            source: path.to_owned(),
            regex,
            keys,
        })
    }

    /// The template this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Capture names in declaration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Matches a full request path, returning the captured parameters.
    ///
    /// A name declared twice keeps its last captured value.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(path)?;
        let params = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(index, key)| {
                captures
                    .get(index + 1)
                    .map(|value| (key.clone(), value.as_str().to_owned()))
            })
            .collect();
        Some(params)
    }
}

// `:name` where name is one or more ASCII word characters.
fn param_name(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix(':')?;
    let is_word = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    is_word.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(path: &str) -> PathPattern {
        PathPattern::compile(path).unwrap()
    }

    #[test]
    fn relative_path_is_rejected() {
        assert!(matches!(
            PathPattern::compile("users"),
            Err(ConfigError::RelativePath { path }) if path == "users"
        ));
        assert!(PathPattern::compile("").is_err());
    }

    #[test]
    fn root_matches_only_root() {
        let pat = compile("/");
        assert!(pat.matches("/").is_some());
        assert!(pat.matches("").is_some());
        assert!(pat.matches("/other").is_none());
    }

    #[test]
    fn literal_match_hit_and_miss() {
        let pat = compile("/users/profile");
        assert!(pat.matches("/users/profile").is_some());
        assert!(pat.matches("/users").is_none());
        assert!(pat.matches("/users/profile/extra").is_none());
    }

    #[test]
    fn trailing_slash_is_tolerated_both_ways() {
        assert!(compile("/users").matches("/users/").is_some());
        assert!(compile("/users/").matches("/users").is_some());
        assert!(compile("/users").matches("/users//").is_none());
    }

    #[test]
    fn literal_segments_are_escaped() {
        let pat = compile("/files/a.b+c");
        assert!(pat.matches("/files/a.b+c").is_some());
        assert!(pat.matches("/files/aXbbc").is_none());
    }

    #[test]
    fn param_extracts_value() {
        let pat = compile("/hello/:name");
        let params = pat.matches("/hello/Ada").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("Ada"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn params_keep_declaration_order() {
        let pat = compile("/users/:id/posts/:post_id");
        assert_eq!(pat.keys(), ["id", "post_id"]);
        let params = pat.matches("/users/7/posts/99").unwrap();
        assert_eq!(params["id"], "7");
        assert_eq!(params["post_id"], "99");
    }

    #[test]
    fn param_spans_exactly_one_segment() {
        let pat = compile("/users/:id");
        assert!(pat.matches("/users").is_none());
        assert!(pat.matches("/users/").is_none());
        assert!(pat.matches("/users/42/extra").is_none());
        assert!(pat.matches("/posts/42").is_none());
    }

    #[test]
    fn non_word_colon_segment_is_literal() {
        let pat = compile("/time/:12-30");
        assert!(pat.keys().is_empty());
        assert!(pat.matches("/time/:12-30").is_some());
        assert!(pat.matches("/time/noon").is_none());
    }

    #[test]
    fn splat_is_greedy() {
        let pat = compile("/files/*");
        assert_eq!(pat.keys(), [SPLAT]);
        let params = pat.matches("/files/docs/readme.txt").unwrap();
        assert_eq!(params[SPLAT], "docs/readme.txt");
        assert_eq!(pat.matches("/files/").unwrap()[SPLAT], "");
        assert!(pat.matches("/other/readme.txt").is_none());
    }

    #[test]
    fn splat_in_the_middle() {
        let pat = compile("/say/*/to/:name");
        let params = pat.matches("/say/hello/world/to/Ada").unwrap();
        assert_eq!(params[SPLAT], "hello/world");
        assert_eq!(params["name"], "Ada");
    }
}
