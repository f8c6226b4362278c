//! Dependency declarations - WHERE a dependency is pinned in recipe text.
//!
//! A declaration is a quoted `name/version` token, e.g. `"zlib/1.3.1"`.
//! Declarations are produced per occurrence by a scan and never persisted.

use std::fmt;

use miette::SourceSpan;

/// One occurrence of a pinned dependency in recipe text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// Dependency name (left of the slash)
    pub name: String,

    /// Version as written in the recipe (right of the slash)
    pub declared_version: String,

    /// Quote character surrounding the token (`"` or `'`)
    pub quote: char,

    /// Byte span of the whole quoted token, quotes included
    pub span: SourceSpan,
}

impl DependencyDeclaration {
    /// Create a new declaration.
    pub fn new(
        name: impl Into<String>,
        declared_version: impl Into<String>,
        quote: char,
        span: impl Into<SourceSpan>,
    ) -> Self {
        DependencyDeclaration {
            name: name.into(),
            declared_version: declared_version.into(),
            quote,
            span: span.into(),
        }
    }

    /// The exact quoted token as it appears in the recipe.
    pub fn token(&self) -> String {
        self.token_with(&self.declared_version)
    }

    /// The quoted token with a different version, same quoting.
    pub fn token_with(&self, version: &str) -> String {
        format!("{q}{}/{}{q}", self.name, version, q = self.quote)
    }

    /// 1-based line number of this declaration within `text`.
    pub fn line_in(&self, text: &str) -> usize {
        let end = self.span.offset().min(text.len());
        text[..end].matches('\n').count() + 1
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.declared_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_keeps_quote_style() {
        let decl = DependencyDeclaration::new("zlib", "1.2.13", '\'', (10, 13));
        assert_eq!(decl.token(), "'zlib/1.2.13'");
        assert_eq!(decl.token_with("1.3.1"), "'zlib/1.3.1'");
    }

    #[test]
    fn test_line_in() {
        let text = "a\nb\n    self.requires(\"zlib/1.3\")\n";
        let offset = text.find('"').unwrap();
        let decl = DependencyDeclaration::new("zlib", "1.3", '"', (offset, 10));
        assert_eq!(decl.line_in(text), 3);
    }
}
