//! Language-specific node rules for tree normalization.
//!
//! Tells the tree-sitter backend which node types open a nested scope, which
//! are comments, and which merely wrap the declaration that owns the scope.

use std::collections::HashSet;

use crate::processing::Language;

/// How to reach the declaration inside a wrapper node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    /// Follow the named field
    Field(&'static str),
    /// Follow the first named child
    FirstNamed,
}

/// Normalization rules for one grammar.
#[derive(Debug, Clone)]
pub struct NodeRules {
    /// Node types whose unfielded named children form a body.
    pub containers: HashSet<&'static str>,
    /// Node types dropped from bodies.
    pub comments: HashSet<&'static str>,
    /// Node types that delegate their body to an inner node.
    pub wrappers: Vec<(&'static str, Follow)>,
}

impl NodeRules {
    pub fn is_container(&self, kind: &str) -> bool {
        self.containers.contains(kind)
    }

    pub fn is_comment(&self, kind: &str) -> bool {
        self.comments.contains(kind)
    }

    pub fn wrapper(&self, kind: &str) -> Option<Follow> {
        self.wrappers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, follow)| *follow)
    }
}

/// Get the normalization rules for a language.
pub fn rules_for(language: Language) -> NodeRules {
    match language {
        Language::JavaScript => javascript_rules(),
        Language::TypeScript | Language::TypeScriptReact => typescript_rules(),
        Language::Python => python_rules(),
        Language::Go => go_rules(),
        Language::Rust => rust_rules(),
        Language::Java => java_rules(),
        Language::C => c_rules(),
        Language::Cpp => cpp_rules(),
        Language::Ruby => ruby_rules(),
    }
}

fn set(kinds: &[&'static str]) -> HashSet<&'static str> {
    kinds.iter().copied().collect()
}

/// JavaScript rules.
fn javascript_rules() -> NodeRules {
    NodeRules {
        containers: set(&["program", "statement_block", "class_body"]),
        comments: set(&["comment", "html_comment"]),
        wrappers: vec![
            ("export_statement", Follow::Field("declaration")),
            ("lexical_declaration", Follow::FirstNamed),
            ("variable_declaration", Follow::FirstNamed),
            ("variable_declarator", Follow::Field("value")),
            ("expression_statement", Follow::FirstNamed),
            ("assignment_expression", Follow::Field("right")),
            ("field_definition", Follow::Field("value")),
        ],
    }
}

/// TypeScript rules (extends JavaScript).
fn typescript_rules() -> NodeRules {
    let mut rules = javascript_rules();
    rules.containers.extend([
        "interface_body",
        "enum_body",
        "object_type",
        "module",
        "internal_module",
    ]);
    rules.wrappers.push(("ambient_declaration", Follow::FirstNamed));
    rules.wrappers.push(("public_field_definition", Follow::Field("value")));
    rules
}

/// Python rules.
fn python_rules() -> NodeRules {
    NodeRules {
        containers: set(&["module", "block"]),
        comments: set(&["comment"]),
        wrappers: vec![("decorated_definition", Follow::Field("definition"))],
    }
}

/// Go rules.
fn go_rules() -> NodeRules {
    NodeRules {
        containers: set(&["source_file", "block", "field_declaration_list", "interface_type"]),
        comments: set(&["comment"]),
        wrappers: vec![
            ("type_declaration", Follow::FirstNamed),
            ("type_spec", Follow::Field("type")),
            ("struct_type", Follow::FirstNamed),
        ],
    }
}

/// Rust rules.
fn rust_rules() -> NodeRules {
    NodeRules {
        containers: set(&[
            "source_file",
            "block",
            "declaration_list",
            "field_declaration_list",
            "enum_variant_list",
        ]),
        comments: set(&["line_comment", "block_comment"]),
        wrappers: vec![],
    }
}

/// Java rules.
fn java_rules() -> NodeRules {
    NodeRules {
        containers: set(&[
            "program",
            "block",
            "class_body",
            "interface_body",
            "enum_body",
            "constructor_body",
            "annotation_type_body",
        ]),
        comments: set(&["line_comment", "block_comment"]),
        wrappers: vec![],
    }
}

/// C rules.
fn c_rules() -> NodeRules {
    NodeRules {
        containers: set(&["translation_unit", "compound_statement", "field_declaration_list"]),
        comments: set(&["comment"]),
        wrappers: vec![
            ("type_definition", Follow::Field("type")),
            ("declaration", Follow::Field("type")),
        ],
    }
}

/// C++ rules (extends C).
fn cpp_rules() -> NodeRules {
    let mut rules = c_rules();
    rules.containers.insert("declaration_list");
    rules.wrappers.push(("template_declaration", Follow::FirstNamed));
    rules
}

/// Ruby rules.
fn ruby_rules() -> NodeRules {
    NodeRules {
        containers: set(&[
            "program",
            "class",
            "module",
            "method",
            "singleton_method",
            "body_statement",
            "do_block",
        ]),
        comments: set(&["comment"]),
        wrappers: vec![],
    }
}
