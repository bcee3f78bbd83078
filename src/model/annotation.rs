//! Annotation tags in declaration doc comments.
//!
//! An annotation is a doc comment line that starts with a caller-chosen tag,
//! optionally followed by options:
//!
//! ```text
//! // +gen
//! // +gen -name=Users -flag
//! // +gen: kind=json
//! /*
//!  * +gen
//!  */
//! ```
//!
//! Comment markers and a leading `*` on block comment lines are stripped
//! and the line trimmed. The tag must be followed by end of line,
//! whitespace or `:`, so `+gen` does not match `+generate`. Only the first
//! token is inspected. The first matching line of a group wins.

use smol_str::SmolStr;

use crate::syntax::{Comment, CommentGroup};

/// One option after the tag: `-key=value`, `key=value`, `-flag` or `flag`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationOption<'a> {
    /// The key without its leading `-`.
    pub key: &'a str,
    pub value: Option<&'a str>,
    /// Written with a leading `-`.
    pub dashed: bool,
}

impl<'a> AnnotationOption<'a> {
    fn parse(word: &'a str) -> Self {
        let (dashed, word) = match word.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, word),
        };
        match word.split_once('=') {
            Some((key, value)) => Self {
                key,
                value: Some(value),
                dashed,
            },
            None => Self {
                key: word,
                value: None,
                dashed,
            },
        }
    }
}

/// A doc comment line carrying a searched tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation<'a> {
    tag: SmolStr,
    comment: &'a Comment,
    line: &'a str,
    options: Vec<AnnotationOption<'a>>,
}

impl<'a> Annotation<'a> {
    /// The first line of `doc` carrying `tag`.
    pub fn find(doc: &'a CommentGroup, tag: &str) -> Option<Self> {
        if tag.trim().is_empty() {
            return None;
        }
        doc.comments.iter().find_map(|comment| {
            comment.lines().into_iter().find_map(|line| {
                let line = line.trim();
                let rest = strip_tag(line, tag)?;
                Some(Self {
                    tag: SmolStr::new(tag),
                    comment,
                    line,
                    options: rest.split_whitespace().map(AnnotationOption::parse).collect(),
                })
            })
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The raw comment, markers included, holding the matched line.
    pub fn comment(&self) -> &'a Comment {
        self.comment
    }

    /// The matched line, markers stripped and trimmed.
    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn options(&self) -> &[AnnotationOption<'a>] {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&AnnotationOption<'a>> {
        self.options.iter().find(|opt| opt.key == key)
    }

    /// Value of the first `key=value` option.
    pub fn value(&self, key: &str) -> Option<&'a str> {
        self.option(key).and_then(|opt| opt.value)
    }

    pub fn has_flag(&self, key: &str) -> bool {
        self.option(key).is_some()
    }
}

/// The text after `tag` and an optional `:`, if `line` carries `tag`.
fn strip_tag<'l>(line: &'l str, tag: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(tag)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(':') => Some(&rest[1..]),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{TextRange, TextSize};
    use rstest::rstest;

    fn group(comments: &[&str]) -> CommentGroup {
        CommentGroup {
            comments: comments
                .iter()
                .map(|text| Comment {
                    text: text.to_string(),
                    range: TextRange::empty(TextSize::from(0)),
                })
                .collect(),
        }
    }

    #[rstest]
    #[case(&["// +gen"], true)]
    #[case(&["//+gen"], true)]
    #[case(&["// +gen -name=Users"], true)]
    #[case(&["// +gen: kind=json"], true)]
    #[case(&["// +gen\t-x"], true)]
    #[case(&["// +generate"], false)]
    #[case(&["// see +gen"], false)]
    #[case(&["// +a +gen"], false)]
    #[case(&["// User is a user.", "// +gen"], true)]
    #[case(&["/*\n * +gen\n */"], true)]
    #[case(&["/* +gen */"], true)]
    fn test_matching(#[case] comments: &[&str], #[case] matches: bool) {
        assert_eq!(Annotation::find(&group(comments), "+gen").is_some(), matches);
    }

    #[test]
    fn test_first_matching_line_wins() {
        let doc = group(&["// +gen first", "// +gen second"]);
        let annotation = Annotation::find(&doc, "+gen").unwrap();

        assert_eq!(annotation.line(), "+gen first");
        assert_eq!(annotation.comment().text, "// +gen first");
        assert!(annotation.has_flag("first"));
    }

    #[test]
    fn test_options() {
        let doc = group(&["// +gen: -name=Users kind=json -skip plain"]);
        let annotation = Annotation::find(&doc, "+gen").unwrap();

        assert_eq!(annotation.tag(), "+gen");
        assert_eq!(annotation.options().len(), 4);
        assert_eq!(annotation.value("name"), Some("Users"));
        assert_eq!(annotation.value("kind"), Some("json"));
        assert_eq!(
            annotation.option("skip"),
            Some(&AnnotationOption {
                key: "skip",
                value: None,
                dashed: true
            })
        );
        assert!(!annotation.option("plain").unwrap().dashed);
        assert!(!annotation.has_flag("missing"));
    }

    #[test]
    fn test_empty_tag_never_matches() {
        assert!(Annotation::find(&group(&["// anything"]), "").is_none());
    }
}
