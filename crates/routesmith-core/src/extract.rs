//! Route extraction from JavaScript/TypeScript sources.
//!
//! Parses a source file with tree-sitter and matches every
//! route-registration call expression (`app.get('/users/', handler)` and
//! friends) against the loaded [`Specification`]. Only calls whose composite
//! key appears in the specification produce a [`RouteDescriptor`]; everything
//! else is skipped silently, because an unspecified route is simply not under
//! test.
//!
//! Two deliberate limitations are carried over from the original design:
//! dynamic route paths (anything but a plain string literal) are not
//! extracted, and calls whose handler is defined inline at the call site are
//! skipped, so only handlers passed by reference are testable.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::spec::{RouteSpecification, Specification, ValidationRule};

// External imports (alphabetized)
use tracing::debug;
use tree_sitter::{Node, Parser};

/// HTTP verbs recognized as route-registration methods.
const ROUTE_METHODS: &[&str] = &["get", "post", "put", "delete", "patch"];

/// Node kinds marking a handler defined inline at the call site. The older
/// JavaScript grammar used `function` where newer releases emit
/// `function_expression`; both are kept so grammar upgrades don't change
/// extraction behavior.
const INLINE_HANDLER_KINDS: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
];

/// The extracted, specification-matched representation of one route
/// registration. Immutable once built; the synthesizer and renderer only
/// ever read it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    /// Route path exactly as written in the registration call
    pub path: String,
    /// Upper-cased HTTP method
    pub method: String,
    /// One descriptor per parameter named in the matched specification
    pub parameters: Vec<ParameterDescriptor>,
    /// Source file path relative to the project root
    pub source_file: PathBuf,
}

/// One query parameter of an extracted route, with specification defaults
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name (unique within the route)
    pub name: String,
    /// Declared type tag, `"any"` when the specification omitted it
    pub param_type: String,
    /// Whether the parameter is required, `false` when omitted
    pub required: bool,
    /// Validation rules carried through from the specification unchanged
    pub rules: Vec<ValidationRule>,
}

/// Extracts route descriptors from one source file.
pub struct RouteExtractor<'a> {
    spec: &'a Specification,
    project_root: &'a Path,
}

impl<'a> RouteExtractor<'a> {
    /// Create an extractor bound to a loaded specification and project root.
    pub fn new(spec: &'a Specification, project_root: &'a Path) -> Self {
        Self { spec, project_root }
    }

    /// Extract every specified route registered in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with file context when the source cannot be
    /// parsed into a syntax tree or the tree contains syntax errors.
    pub fn extract(&self, source: &str, file_path: &Path) -> Result<Vec<RouteDescriptor>> {
        let mut parser = parser_for(file_path)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(file_path, "parser produced no syntax tree"))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(Error::parse(file_path, "source contains syntax errors"));
        }

        let bytes = source.as_bytes();
        let mut routes = Vec::new();

        // Iterative pre-order traversal; an explicit stack keeps deeply
        // nested sources from exhausting the call stack.
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" {
                if let Some(route) = self.route_from_call(node, bytes, file_path) {
                    routes.push(route);
                }
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }

        Ok(routes)
    }

    /// Match one call expression against the specification.
    ///
    /// Returns `None` for every call that is not a specified route
    /// registration; none of those cases are errors.
    fn route_from_call(
        &self,
        node: Node<'_>,
        source: &[u8],
        file_path: &Path,
    ) -> Option<RouteDescriptor> {
        let callee = node.child_by_field_name("function")?;
        if callee.kind() != "member_expression" {
            return None;
        }
        let property = callee.child_by_field_name("property")?;
        let method = node_text(property, source).to_lowercase();
        if !ROUTE_METHODS.contains(&method.as_str()) {
            return None;
        }

        let args = node.child_by_field_name("arguments")?;
        let mut cursor = args.walk();
        let arguments: Vec<Node> = args
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();

        // Dynamic route paths are unsupported: anything but a plain string
        // literal is skipped, not an error.
        let path_arg = arguments.first()?;
        if path_arg.kind() != "string" {
            debug!(
                source = %file_path.display(),
                "route path is not a string literal, skipping"
            );
            return None;
        }
        let route_path = string_literal(*path_arg, source);

        // Only handlers passed by reference are extracted; an inline
        // function literal at the call site is skipped.
        let handler_arg = arguments.last()?;
        if INLINE_HANDLER_KINDS.contains(&handler_arg.kind()) {
            debug!(
                source = %file_path.display(),
                path = %route_path,
                "inline handler, skipping"
            );
            return None;
        }

        let key = Specification::composite_key(&method, &route_path);
        let route_spec = self.spec.get(&key)?;

        let source_file = file_path
            .strip_prefix(self.project_root)
            .unwrap_or(file_path)
            .to_path_buf();

        Some(RouteDescriptor {
            path: route_path,
            method: method.to_uppercase(),
            parameters: parameters_from_spec(route_spec),
            source_file,
        })
    }
}

/// Build one descriptor per specified parameter, applying defaults for
/// omitted fields and carrying the rule sequence through unchanged.
fn parameters_from_spec(spec: &RouteSpecification) -> Vec<ParameterDescriptor> {
    spec.iter()
        .map(|(name, param)| ParameterDescriptor {
            name: name.clone(),
            param_type: param
                .param_type
                .clone()
                .unwrap_or_else(|| "any".to_string()),
            required: param.required.unwrap_or(false),
            rules: param.validation.clone(),
        })
        .collect()
}

/// Configure a parser for the file's language based on its extension.
fn parser_for(file_path: &Path) -> Result<Parser> {
    let mut parser = Parser::new();
    let language = match file_path.extension().and_then(|e| e.to_str()) {
        Some("ts") => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        _ => tree_sitter_javascript::LANGUAGE.into(),
    };
    parser
        .set_language(&language)
        .map_err(|e| Error::parse(file_path, e.to_string()))?;
    Ok(parser)
}

fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Text of a string literal node with its surrounding quotes removed.
fn string_literal(node: Node<'_>, source: &[u8]) -> String {
    node_text(node, source)
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Specification;

    const SPEC: &str = r#"
    {
        "GET /users/": {
            "id": {
                "type": "string",
                "required": true,
                "validation": [
                    { "type": "min", "value": 10 }
                ]
            }
        }
    }
    "#;

    fn extract(spec_json: &str, source: &str) -> Vec<RouteDescriptor> {
        let spec = Specification::parse(spec_json).unwrap();
        let extractor = RouteExtractor::new(&spec, Path::new("/project"));
        extractor
            .extract(source, Path::new("/project/index.js"))
            .unwrap()
    }

    #[test]
    fn test_extracts_specified_route_with_named_handler() {
        let routes = extract(SPEC, "app.get('/users/', getUsers);\n");

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.path, "/users/");
        assert_eq!(route.method, "GET");
        assert_eq!(route.source_file, PathBuf::from("index.js"));

        assert_eq!(route.parameters.len(), 1);
        let param = &route.parameters[0];
        assert_eq!(param.name, "id");
        assert_eq!(param.param_type, "string");
        assert!(param.required);
        assert_eq!(param.rules.len(), 1);
        assert_eq!(param.rules[0].as_i64(), Some(10));
    }

    #[test]
    fn test_skips_inline_arrow_handler() {
        let routes = extract(SPEC, "app.get('/users/', (req, res) => res.send('ok'));\n");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_skips_inline_function_expression_handler() {
        let routes = extract(
            SPEC,
            "app.get('/users/', function (req, res) { res.send('ok'); });\n",
        );
        assert!(routes.is_empty());
    }

    #[test]
    fn test_skips_route_absent_from_spec() {
        let routes = extract(SPEC, "app.post('/orders/', createOrder);\n");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_skips_dynamic_route_path() {
        let routes = extract(SPEC, "app.get(basePath + '/users/', getUsers);\n");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_skips_template_literal_path() {
        let routes = extract(SPEC, "app.get(`/users/`, getUsers);\n");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_recognizes_all_route_verbs() {
        let spec_json = r#"
        {
            "GET /a": {}, "POST /a": {}, "PUT /a": {},
            "DELETE /a": {}, "PATCH /a": {}
        }
        "#;
        let source = "\
            app.get('/a', h);\n\
            app.post('/a', h);\n\
            app.put('/a', h);\n\
            app.delete('/a', h);\n\
            app.patch('/a', h);\n\
            app.options('/a', h);\n";
        let routes = extract(spec_json, source);
        let methods: Vec<&str> = routes.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST", "PUT", "DELETE", "PATCH"]);
    }

    #[test]
    fn test_ignores_non_route_member_calls() {
        let routes = extract(SPEC, "console.log('/users/');\napp.use(middleware);\n");
        assert!(routes.is_empty());
    }

    #[test]
    fn test_finds_route_nested_in_function() {
        let source = "function setup(app) {\n  app.get('/users/', getUsers);\n}\n";
        let routes = extract(SPEC, source);
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_parameter_set_equals_spec_keys() {
        let spec_json = r#"
        {
            "GET /search": {
                "limit": {"type": "number"},
                "q": {"type": "string"},
                "verbose": {}
            }
        }
        "#;
        let routes = extract(spec_json, "app.get('/search', search);\n");
        assert_eq!(routes.len(), 1);

        let names: Vec<&str> = routes[0]
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["limit", "q", "verbose"]);

        // Defaults applied where the spec omitted fields.
        let verbose = &routes[0].parameters[2];
        assert_eq!(verbose.param_type, "any");
        assert!(!verbose.required);
        assert!(verbose.rules.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = "app.get('/users/', getUsers);\napp.get('/users/', getUsers);\n";
        let first = extract(SPEC, source);
        let second = extract(SPEC, source);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_parse_failure_reports_file() {
        let spec = Specification::parse(SPEC).unwrap();
        let extractor = RouteExtractor::new(&spec, Path::new("/project"));
        let err = extractor
            .extract("app.get('/users/'", Path::new("/project/broken.js"))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("broken.js"));
    }

    #[test]
    fn test_typescript_source() {
        let spec = Specification::parse(SPEC).unwrap();
        let extractor = RouteExtractor::new(&spec, Path::new("/project"));
        let routes = extractor
            .extract(
                "const app = express();\napp.get('/users/', getUsers);\n",
                Path::new("/project/index.ts"),
            )
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].source_file, PathBuf::from("index.ts"));
    }
}
