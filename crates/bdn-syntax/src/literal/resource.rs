//! Resource identifiers in angle brackets.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::LiteralError;
use crate::token::TokenKind;

/// Lexical form of a resource.
pub(crate) const PATTERN: &str = r"<[a-z][a-z0-9+.-]*:[^\s<>]*>";

/// A URI. The text is kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    text: String,
    url: Url,
}

impl Resource {
    /// Wrap a URI string, validating it.
    pub fn new(text: impl Into<String>) -> Result<Self, LiteralError> {
        let text = text.into();
        match Url::parse(&text) {
            Ok(url) => Ok(Self { text, url }),
            Err(cause) => Err(LiteralError::new(
                TokenKind::Resource,
                format!("<{text}>"),
                cause.to_string(),
            )),
        }
    }

    /// The URI as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for Resource {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let inner = text
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| LiteralError::new(TokenKind::Resource, text, "expected `<scheme:...>`"))?;
        Self::new(inner)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_text_as_written() {
        let resource: Resource = "<https://Example.com/a?b=c#d>".parse().unwrap();
        assert_eq!(resource.to_string(), "<https://Example.com/a?b=c#d>");
        assert_eq!(resource.url().host_str(), Some("example.com"));
    }

    #[test]
    fn accepts_non_hierarchical_schemes() {
        assert!("<mailto:someone@example.com>".parse::<Resource>().is_ok());
        assert!("<urn:isbn:0451450523>".parse::<Resource>().is_ok());
    }

    #[test]
    fn rejects_invalid_urls() {
        assert!("<http://exa mple.com>".parse::<Resource>().is_err());
        assert!("<http://[::1>".parse::<Resource>().is_err());
    }
}
