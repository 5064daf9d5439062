//! Embedded document tags
//!
//! Rendered documents carry machine-readable tags of the form
//! `@@<group>:<name>(<key=value,...>)@@`. The trace layer consumes two of
//! them: `@@Trace:<ABBR>(id=<ID>)@@` registers a trace from the surrounding
//! document, and `@@SLMS:TraceMatrix(source=<EntityID>,...)@@` requests a
//! rendered trace matrix.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Errors raised while parsing or applying a document tag
#[derive(Debug, Error)]
pub enum TagError {
    #[error("malformed tag: \"{text}\"")]
    Malformed { text: String },

    #[error("tag in document \"{document}\" has no id parameter: \"{contents}\"")]
    MissingId { document: String, contents: String },

    #[error("tag references unknown trace entity \"{key}\"")]
    UnknownEntity { key: String },

    #[error("tag applied to unknown document \"{title}\"")]
    UnknownDocument { title: String },
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@@([A-Za-z]+):([A-Za-z0-9_]+)\(([^)]*)\)@@").expect("tag pattern is valid")
    })
}

/// One parsed document tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag group, e.g. `Trace` or `SLMS`
    pub group: String,

    /// Tag name. For `Trace` tags this is the entity abbreviation.
    pub name: String,

    /// `key=value` parameters in appearance order
    parameters: Vec<(String, String)>,

    /// The tag text as it appeared in the document
    pub raw: String,
}

impl Tag {
    /// Parse a single tag. The input must be exactly one tag.
    pub fn parse(text: &str) -> Result<Tag, TagError> {
        let captures = tag_pattern()
            .captures(text.trim())
            .ok_or_else(|| TagError::Malformed {
                text: text.to_string(),
            })?;

        let mut parameters = Vec::new();
        for part in captures[3].split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) => {
                    parameters.push((key.trim().to_string(), value.trim().to_string()));
                }
                None => {
                    return Err(TagError::Malformed {
                        text: text.to_string(),
                    });
                }
            }
        }

        Ok(Tag {
            group: captures[1].to_string(),
            name: captures[2].to_string(),
            parameters,
            raw: captures[0].to_string(),
        })
    }

    /// Value of the named parameter, if present
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Scan a document body for every well-formed tag, in appearance order
pub fn extract_tags(body: &str) -> Vec<Tag> {
    tag_pattern()
        .find_iter(body)
        .filter_map(|m| Tag::parse(m.as_str()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace_tag() {
        let tag = Tag::parse("@@Trace:SYS(id=SYS-12)@@").unwrap();
        assert_eq!(tag.group, "Trace");
        assert_eq!(tag.name, "SYS");
        assert_eq!(tag.parameter("id"), Some("SYS-12"));
        assert_eq!(tag.parameter("ID"), Some("SYS-12"));
    }

    #[test]
    fn test_parse_matrix_tag_with_options() {
        let tag =
            Tag::parse("@@SLMS:TraceMatrix(source=SystemRequirement, ItemProject=Alpha)@@").unwrap();
        assert_eq!(tag.group, "SLMS");
        assert_eq!(tag.name, "TraceMatrix");
        assert_eq!(tag.parameter("source"), Some("SystemRequirement"));
        assert_eq!(tag.parameter("itemproject"), Some("Alpha"));
        assert_eq!(tag.parameter("sortby"), None);
    }

    #[test]
    fn test_malformed_tags_rejected() {
        assert!(matches!(
            Tag::parse("@@Trace:SYS@@"),
            Err(TagError::Malformed { .. })
        ));
        assert!(matches!(
            Tag::parse("@@Trace:SYS(id)@@"),
            Err(TagError::Malformed { .. })
        ));
        assert!(matches!(
            Tag::parse("just prose"),
            Err(TagError::Malformed { .. })
        ));
    }

    #[test]
    fn test_extract_tags_from_body() {
        let body = "intro @@Trace:SYS(id=SYS-1)@@ middle @@Trace:SWR(id=SWR-9)@@ end";
        let tags = extract_tags(body);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].parameter("id"), Some("SYS-1"));
        assert_eq!(tags[1].name, "SWR");
    }
}
