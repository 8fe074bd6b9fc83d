use crate::Symbol;
use std::collections::HashMap;

/// A node's port bindings, keyed by the declared port name.
pub type PortMap = HashMap<Symbol, PortValue>;

/// A raw port binding, classified once at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortValue {
    /// `{key}`: reads and writes go through the blackboard key.
    Ref(Symbol),
    /// `'text'`: a literal that expects a typed conversion before use.
    Quoted(String),
    /// Anything else, used as-is.
    Literal(String),
}

impl PortValue {
    /// Only the outer delimiter pair decides the class; there is no nested
    /// reference resolution, so `{a{b}}` is a reference literally named `a{b}`.
    pub fn classify(raw: &str) -> Self {
        if let Some(inner) = delimited(raw, '{', '}') {
            Self::Ref(inner.into())
        } else if let Some(inner) = delimited(raw, '\'', '\'') {
            Self::Quoted(inner.to_owned())
        } else {
            Self::Literal(raw.to_owned())
        }
    }
}

fn delimited(s: &str, open: char, close: char) -> Option<&str> {
    if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
        Some(&s[open.len_utf8()..s.len() - close.len_utf8()])
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classifies_by_outer_delimiters() {
        assert_eq!(PortValue::classify("plain"), PortValue::Literal("plain".to_owned()));
        assert_eq!(PortValue::classify("{target}"), PortValue::Ref("target".into()));
        assert_eq!(
            PortValue::classify("'1.1;2.3'"),
            PortValue::Quoted("1.1;2.3".to_owned())
        );
    }

    #[test]
    fn no_nested_reference_resolution() {
        // The whole inner text is the key, braces included.
        assert_eq!(PortValue::classify("{a{b}}"), PortValue::Ref("a{b}".into()));
    }

    #[test]
    fn unbalanced_delimiters_stay_literal() {
        assert_eq!(PortValue::classify("{open"), PortValue::Literal("{open".to_owned()));
        assert_eq!(PortValue::classify("'"), PortValue::Literal("'".to_owned()));
        assert_eq!(PortValue::classify(""), PortValue::Literal(String::new()));
    }
}
