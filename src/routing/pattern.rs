//! Route pattern compilation
//!
//! Both dialects end up as a compiled [`Regex`]; token patterns also keep
//! their segment list so a concrete path can be rebuilt from values.

use regex::Regex;

use crate::error::RouteError;
use crate::handler::Args;

/// Character that introduces a named placeholder segment
pub const PLACEHOLDER_MARKER: char = ':';

/// Characters a placeholder accepts (valid URL characters)
pub const PLACEHOLDER_CLASS: &str = "[-_a-zA-Z0-9+%]";

/// A compiled route pattern in either dialect
#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(RegexPattern),
    Token(TokenPattern),
}

impl Pattern {
    pub fn regex(source: &str) -> Result<Self, RouteError> {
        RegexPattern::new(source).map(Self::Regex)
    }

    pub fn token(source: &str) -> Result<Self, RouteError> {
        TokenPattern::new(source).map(Self::Token)
    }

    /// Pattern as declared
    pub fn source(&self) -> &str {
        match self {
            Self::Regex(p) => &p.source,
            Self::Token(p) => &p.source,
        }
    }

    /// Compiled expression used for matching
    pub const fn compiled(&self) -> &Regex {
        match self {
            Self::Regex(p) => &p.regex,
            Self::Token(p) => &p.regex,
        }
    }

    /// Match `path` and extract its captures
    ///
    /// The match has to begin at the first character of the path; whether
    /// it must also reach the end is up to the pattern.
    pub fn captures(&self, path: &str) -> Option<Args> {
        let regex = self.compiled();
        let captures = regex.captures(path)?;
        let whole = captures.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        Some(Args::from_captures(&captures, regex))
    }
}

/// Free-form regular expression route
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    regex: Regex,
}

impl RegexPattern {
    pub fn new(source: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(source).map_err(|source_err| RouteError::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Slash-delimited route with `:name` placeholders
#[derive(Debug, Clone)]
pub struct TokenPattern {
    source: String,
    segments: Vec<Segment>,
    trailing_slash: bool,
    regex: Regex,
}

impl TokenPattern {
    pub fn new(source: &str) -> Result<Self, RouteError> {
        let route = source.strip_prefix('/').unwrap_or(source);
        let (route, trailing_slash) = match route.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (route, false),
        };

        let segments = route
            .split('/')
            .map(|segment| match segment.strip_prefix(PLACEHOLDER_MARKER) {
                Some(name) if is_valid_placeholder(name) => Ok(Segment::Placeholder(name.to_string())),
                Some(_) => Err(RouteError::InvalidPlaceholder {
                    pattern: source.to_string(),
                    placeholder: segment.to_string(),
                }),
                None => Ok(Segment::Literal(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expression = build_expression(&segments, trailing_slash);
        let regex = Regex::new(&expression).map_err(|err| RouteError::InvalidRegex {
            pattern: source.to_string(),
            source: err,
        })?;

        Ok(Self {
            source: source.to_string(),
            segments,
            trailing_slash,
            regex,
        })
    }

    /// The regular expression this route compiled to
    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in declaration order
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Rebuild a concrete path, filling placeholders positionally
    pub fn reverse(&self, values: &[&str]) -> Result<String, RouteError> {
        let expected = self.placeholders().count();
        if values.len() != expected {
            return Err(self.reverse_error(format!(
                "expected {expected} values, got {}",
                values.len()
            )));
        }

        let mut values = values.iter();
        let mut parts = Vec::with_capacity(self.segments.len() + 2);
        parts.push(String::new());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => parts.push(text.clone()),
                Segment::Placeholder(name) => {
                    let value = values.next().copied().unwrap_or_default();
                    if !is_placeholder_value(value) {
                        return Err(self.reverse_error(format!(
                            "value {value:?} for {name:?} contains characters outside {PLACEHOLDER_CLASS}"
                        )));
                    }
                    parts.push(value.to_string());
                }
            }
        }
        if self.trailing_slash {
            parts.push(String::new());
        }
        Ok(parts.join("/"))
    }

    fn reverse_error(&self, reason: String) -> RouteError {
        RouteError::Reverse {
            pattern: self.source.clone(),
            reason,
        }
    }
}

fn build_expression(segments: &[Segment], trailing_slash: bool) -> String {
    // leading empty part puts the slash back in front when joined
    let mut parts = vec![String::new()];
    for segment in segments {
        match segment {
            Segment::Literal(text) => parts.push(regex::escape(text)),
            Segment::Placeholder(name) => parts.push(format!("(?P<{name}>{PLACEHOLDER_CLASS}+)")),
        }
    }
    if trailing_slash {
        parts.push(String::new());
    }
    format!("^{}$", parts.join("/"))
}

fn is_valid_placeholder(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_placeholder_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '%'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_compilation() {
        let pattern = TokenPattern::new("/user/:name/").unwrap();
        assert_eq!(pattern.expression(), "^/user/(?P<name>[-_a-zA-Z0-9+%]+)/$");

        let pattern = TokenPattern::new("/myview/:a/:b").unwrap();
        assert_eq!(
            pattern.expression(),
            "^/myview/(?P<a>[-_a-zA-Z0-9+%]+)/(?P<b>[-_a-zA-Z0-9+%]+)$"
        );
        assert_eq!(pattern.placeholders().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_token_root_route() {
        let pattern = TokenPattern::new("/").unwrap();
        assert_eq!(pattern.expression(), "^/$");
        let pattern = Pattern::Token(pattern);
        assert!(pattern.captures("/").is_some());
        assert!(pattern.captures("/x").is_none());
    }

    #[test]
    fn test_token_leading_slash_optional() {
        let with = TokenPattern::new("/about").unwrap();
        let without = TokenPattern::new("about").unwrap();
        assert_eq!(with.expression(), without.expression());
    }

    #[test]
    fn test_token_trailing_slash_is_significant() {
        let pattern = Pattern::token("/user/:name/").unwrap();
        let args = pattern.captures("/user/alice/").unwrap();
        assert_eq!(args.get(0), Some("alice"));
        assert_eq!(args.named("name"), Some("alice"));
        assert!(pattern.captures("/user/alice").is_none());
    }

    #[test]
    fn test_token_literals_are_escaped() {
        let pattern = Pattern::token("/feed.xml").unwrap();
        assert!(pattern.captures("/feed.xml").is_some());
        assert!(pattern.captures("/feedxxml").is_none());
    }

    #[test]
    fn test_token_placeholder_character_class() {
        let pattern = Pattern::token("/item/:id").unwrap();
        assert!(pattern.captures("/item/a-b_c+d%20").is_some());
        assert!(pattern.captures("/item/a.b").is_none());
        assert!(pattern.captures("/item/").is_none());
    }

    #[test]
    fn test_token_matches_hand_written_regex() {
        let token = Pattern::token("/item/:id/").unwrap();
        let regex = Pattern::regex(r"^/item/([-_a-zA-Z0-9+%]+)/$").unwrap();
        for path in ["/item/42/", "/item/a+b/", "/item/42", "/item//", "/item/4.2/", "/items/42/", "x/item/42/"] {
            let from_token = token.captures(path).map(|a| a.get(0).map(ToString::to_string));
            let from_regex = regex.captures(path).map(|a| a.get(0).map(ToString::to_string));
            assert_eq!(from_token, from_regex, "path {path}");
        }
    }

    #[test]
    fn test_invalid_placeholder_names() {
        for source in ["/a/:", "/a/:1st", "/a/:na-me"] {
            assert!(
                matches!(TokenPattern::new(source), Err(RouteError::InvalidPlaceholder { .. })),
                "{source}"
            );
        }
        // duplicate names are rejected by the regex compiler
        assert!(matches!(
            TokenPattern::new("/:id/:id"),
            Err(RouteError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_regex_match_starts_at_path_start() {
        let pattern = Pattern::regex("/heartbeat").unwrap();
        assert!(pattern.captures("/heartbeat").is_some());
        // not end-anchored unless the pattern says so
        assert!(pattern.captures("/heartbeat/extra").is_some());
        assert!(pattern.captures("/x/heartbeat").is_none());
    }

    #[test]
    fn test_invalid_regex() {
        let err = Pattern::regex("^/(unclosed$").unwrap_err();
        assert!(err.to_string().contains("^/(unclosed$"));
    }

    #[test]
    fn test_reverse() {
        let pattern = TokenPattern::new("/user/:name/posts/:id/").unwrap();
        assert_eq!(pattern.reverse(&["alice", "7"]).unwrap(), "/user/alice/posts/7/");
        assert!(matches!(pattern.reverse(&["alice"]), Err(RouteError::Reverse { .. })));
        assert!(matches!(pattern.reverse(&["al/ice", "7"]), Err(RouteError::Reverse { .. })));

        let root = TokenPattern::new("/").unwrap();
        assert_eq!(root.reverse(&[]).unwrap(), "/");
    }

    #[test]
    fn test_reverse_round_trips_through_match() {
        let pattern = TokenPattern::new("/tag/:tag").unwrap();
        let path = pattern.reverse(&["rust%2Blang"]).unwrap();
        let args = Pattern::Token(pattern).captures(&path).unwrap();
        assert_eq!(args.get(0), Some("rust%2Blang"));
    }
}
