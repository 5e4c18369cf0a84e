//! Path templates for the filesystem backend
//!
//! A template maps a key tuple to a relative file path by positional
//! substitution. Grammar:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `{N}` | The N-th key part (zero-based) |
//! | `{file_extension}` | The backend's configured file extension |
//! | `{{` / `}}` | A literal brace |
//!
//! Templates may reorder, repeat, or omit parts, e.g.
//! `{4}/{0}/{1}/{2}/validation-results-{2}-{3}.{file_extension}`.
//! Placeholders never span a `/`, which lets [`PathTemplate::capture`]
//! recover a key from a path written through the same template.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("Unclosed '{{' in path template '{0}'")]
    Unclosed(String),

    #[error("Unmatched '}}' in path template '{0}'")]
    UnmatchedClose(String),

    #[error("Unknown placeholder '{{{1}}}' in path template '{0}'")]
    UnknownPlaceholder(String, String),

    #[error("Placeholder {{{index}}} is out of range for a key of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    #[error("Path template '{0}' uses {{file_extension}} but no file extension is configured")]
    MissingFileExtension(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Part(usize),
    FileExtension,
}

/// A parsed path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template string
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(TemplateError::Unclosed(template.to_string())),
                        }
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }

                    let segment = if name == "file_extension" {
                        Segment::FileExtension
                    } else {
                        name.parse::<usize>().map(Segment::Part).map_err(|_| {
                            TemplateError::UnknownPlaceholder(template.to_string(), name.clone())
                        })?
                    };
                    segments.push(segment);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose(template.to_string())),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Part indexes the template refers to
    pub fn referenced_parts(&self) -> BTreeSet<usize> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Part(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Checks every placeholder against a key length
    pub fn validate(&self, key_length: usize) -> Result<(), TemplateError> {
        match self.referenced_parts().into_iter().find(|i| *i >= key_length) {
            Some(index) => Err(TemplateError::IndexOutOfRange {
                index,
                length: key_length,
            }),
            None => Ok(()),
        }
    }

    /// Returns true if a path rendered by this template determines every part
    pub fn is_invertible(&self, key_length: usize) -> bool {
        self.referenced_parts() == (0..key_length).collect::<BTreeSet<_>>()
    }

    /// Substitutes key parts (and the extension) into the template
    pub fn render(&self, parts: &[String], file_extension: Option<&str>) -> Result<String, TemplateError> {
        let mut path = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Part(index) => {
                    let part = parts.get(*index).ok_or(TemplateError::IndexOutOfRange {
                        index: *index,
                        length: parts.len(),
                    })?;
                    path.push_str(part);
                }
                Segment::FileExtension => {
                    let ext = file_extension
                        .ok_or_else(|| TemplateError::MissingFileExtension(self.source.clone()))?;
                    path.push_str(ext);
                }
            }
        }

        Ok(path)
    }

    /// Recovers the key parts from a rendered path
    ///
    /// Returns `None` if the path was not produced by this template, or if some
    /// part in `0..key_length` does not appear in the template.
    pub fn capture(
        &self,
        path: &str,
        file_extension: Option<&str>,
        key_length: usize,
    ) -> Option<Vec<String>> {
        let mut bindings: Vec<Option<&str>> = vec![None; key_length];

        if !self.match_from(0, path, file_extension, &mut bindings) {
            return None;
        }

        bindings
            .into_iter()
            .map(|part| part.map(str::to_string))
            .collect()
    }

    /// Backtracking matcher; repeated placeholders must bind the same text
    fn match_from<'p>(
        &self,
        segment: usize,
        rest: &'p str,
        file_extension: Option<&str>,
        bindings: &mut [Option<&'p str>],
    ) -> bool {
        let Some(current) = self.segments.get(segment) else {
            return rest.is_empty();
        };

        match current {
            Segment::Literal(text) => rest
                .strip_prefix(text.as_str())
                .is_some_and(|tail| self.match_from(segment + 1, tail, file_extension, bindings)),
            Segment::FileExtension => file_extension
                .and_then(|ext| rest.strip_prefix(ext))
                .is_some_and(|tail| self.match_from(segment + 1, tail, file_extension, bindings)),
            Segment::Part(index) => {
                if *index >= bindings.len() {
                    return false;
                }

                if let Some(bound) = bindings[*index] {
                    return rest
                        .strip_prefix(bound)
                        .is_some_and(|tail| self.match_from(segment + 1, tail, file_extension, bindings));
                }

                let limit = rest.find('/').unwrap_or(rest.len());
                let ends = rest[..limit]
                    .char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(limit));

                for end in ends {
                    bindings[*index] = Some(&rest[..end]);
                    if self.match_from(segment + 1, &rest[end..], file_extension, bindings) {
                        return true;
                    }
                }

                bindings[*index] = None;
                false
            }
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
