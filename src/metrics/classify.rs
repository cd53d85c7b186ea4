//! Scripted-processor detection.

use crate::graph::ProcessorNode;

/// Lower-case type fragments that mark a processor as running user script.
pub const SCRIPTED_TYPE_MARKERS: &[&str] = &["executescript", "script", "invokescript", "scripted"];

/// Expression-language openers that mark a name as templated.
pub const EXPRESSION_MARKERS: &[&str] = &["${", "#{"];

/// True if the processor type contains a scripting marker, ignoring case.
pub fn is_scripted_type(kind: &str) -> bool {
    let kind = kind.to_lowercase();
    SCRIPTED_TYPE_MARKERS.iter().any(|marker| kind.contains(marker))
}

/// True if `text` contains an expression-language or parameter reference.
pub fn contains_expression_language(text: &str) -> bool {
    EXPRESSION_MARKERS.iter().any(|marker| text.contains(marker))
}

/// A processor counts as scripted by type or by an expression in its name.
pub fn is_scripted(node: &ProcessorNode) -> bool {
    is_scripted_type(&node.kind) || contains_expression_language(&node.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_types() {
        assert!(is_scripted_type("org.apache.nifi.processors.script.ExecuteScript"));
        assert!(is_scripted_type("org.apache.nifi.processors.groovyx.ExecuteGroovyScript"));
        assert!(is_scripted_type("ScriptedTransformRecord"));
        assert!(!is_scripted_type("org.apache.nifi.processors.standard.RouteOnAttribute"));
    }

    #[test]
    fn test_expression_in_name() {
        let node = ProcessorNode::new(
            "p",
            Some("Route${expr}".to_string()),
            Some("org.apache.nifi.processors.standard.RouteOnAttribute".to_string()),
        );
        assert!(is_scripted(&node));
        assert!(contains_expression_language("Put #{target}"));
        assert!(!contains_expression_language("Put $ {target}"));
    }
}
