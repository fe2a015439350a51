use crate::namespaces::Namespaces;

/// A path expression prepared for evaluation against a namespace table.
pub(crate) enum PathBinding {
    /// The path uses a prefix the document never bound to a URI. Evaluating
    /// it cannot match anything.
    Unmapped,
    /// The possibly rewritten path plus the prefix bindings the evaluator
    /// needs in scope for it.
    Bound {
        path: String,
        bindings: Vec<(String, String)>,
    },
}

/// Bind a path expression to a namespace table.
///
/// Prefixes used by the path must be bound by the table. When the table
/// holds a default namespace, unprefixed element name tests are rewritten to
/// a generated prefix bound to that URI, since the evaluator has no notion
/// of a default namespace for name tests. Attribute names, function names,
/// axis names and node type tests are never rewritten.
pub(crate) fn bind(path: &str, namespaces: &Namespaces) -> PathBinding {
    let default_uri = namespaces.default_uri();
    let generated = default_uri.map(|uri| (generated_prefix(namespaces), uri));
    let scanned = scan(
        path,
        generated.as_ref().map(|(prefix, _)| prefix.as_str()),
    );

    for prefix in &scanned.prefixes {
        match namespaces.by_prefix(prefix) {
            Some(uri) if !uri.is_empty() => {}
            _ => return PathBinding::Unmapped,
        }
    }

    let mut bindings: Vec<(String, String)> = namespaces
        .iter()
        .filter(|(prefix, uri)| !prefix.is_empty() && !uri.is_empty())
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect();
    if let Some((prefix, uri)) = generated {
        bindings.push((prefix, uri.to_string()));
    }

    PathBinding::Bound {
        path: scanned.path,
        bindings,
    }
}

/// A prefix not declared by the document, so it cannot collide with any
/// prefix a path would use.
fn generated_prefix(namespaces: &Namespaces) -> String {
    let mut n = 0usize;
    loop {
        let prefix = format!("ns{n}");
        if !namespaces.contains_prefix(&prefix) {
            return prefix;
        }
        n += 1;
    }
}

struct ScannedPath {
    path: String,
    prefixes: Vec<String>,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_')
}

/// Walk a path expression lexically, collecting the prefixes of qualified
/// name tests and, when a generated default prefix is supplied, qualifying
/// every unprefixed element name test with it.
///
/// The walk tracks whether the next name token sits at a step position (and
/// so is an element name test) or in operand position (an operator keyword
/// such as `and`). It never interprets the path beyond that; anything it
/// does not recognize is copied through for the evaluator to judge.
fn scan(path: &str, default_prefix: Option<&str>) -> ScannedPath {
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len());
    let mut prefixes: Vec<String> = Vec::new();
    let mut i = 0;
    // The next name token starts a step.
    let mut at_step = true;
    // The next name token names an attribute (after `@` or `attribute::`).
    let mut attribute_name = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                let quote = c;
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    i += 1;
                    if chars[i - 1] == quote {
                        break;
                    }
                }
                at_step = false;
            }
            '/' | '[' | '(' | '|' | ',' | '=' => {
                out.push(c);
                i += 1;
                at_step = true;
            }
            '<' | '>' => {
                out.push(c);
                i += 1;
                if i < chars.len() && chars[i] == '=' {
                    out.push('=');
                    i += 1;
                }
                at_step = true;
            }
            '!' => {
                out.push(c);
                i += 1;
                at_step = true;
            }
            ']' | ')' => {
                out.push(c);
                i += 1;
                at_step = false;
            }
            '@' => {
                out.push(c);
                i += 1;
                at_step = true;
                attribute_name = true;
            }
            '$' => {
                // Variable reference; its name is not a name test.
                out.push(c);
                i += 1;
                while i < chars.len() && (is_name_char(chars[i]) || chars[i] == ':') {
                    out.push(chars[i]);
                    i += 1;
                }
                at_step = false;
            }
            '*' => {
                out.push(c);
                i += 1;
                // Wildcard name test at a step, multiplication elsewhere.
                at_step = !at_step;
                attribute_name = false;
            }
            '+' | '-' => {
                out.push(c);
                i += 1;
                at_step = true;
            }
            '.' => {
                if i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    while i < chars.len()
                        && (chars[i].is_ascii_digit() || chars[i] == '.')
                    {
                        out.push(chars[i]);
                        i += 1;
                    }
                } else {
                    out.push(c);
                    i += 1;
                }
                at_step = false;
            }
            c if c.is_ascii_digit() => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    out.push(chars[i]);
                    i += 1;
                }
                at_step = false;
            }
            c if c.is_whitespace() => {
                out.push(c);
                i += 1;
            }
            c if is_name_start(c) => {
                let start = i;
                while i < chars.len() && is_name_char(chars[i]) {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();

                // Axis specifier: `name ::`.
                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j + 1 < chars.len() && chars[j] == ':' && chars[j + 1] == ':' {
                    out.push_str(&name);
                    out.extend(chars[i..j + 2].iter());
                    i = j + 2;
                    attribute_name = matches!(name.as_str(), "attribute" | "namespace");
                    at_step = true;
                    continue;
                }

                // Qualified name test: `prefix:local` or `prefix:*`.
                if i + 1 < chars.len()
                    && chars[i] == ':'
                    && (is_name_start(chars[i + 1]) || chars[i + 1] == '*')
                {
                    if !prefixes.contains(&name) {
                        prefixes.push(name.clone());
                    }
                    out.push_str(&name);
                    out.push(':');
                    i += 1;
                    if chars[i] == '*' {
                        out.push('*');
                        i += 1;
                    } else {
                        while i < chars.len() && is_name_char(chars[i]) {
                            out.push(chars[i]);
                            i += 1;
                        }
                    }
                    at_step = false;
                    attribute_name = false;
                    continue;
                }

                // Function call or node type test: `name (`.
                if j < chars.len() && chars[j] == '(' {
                    out.push_str(&name);
                    attribute_name = false;
                    continue;
                }

                // Operator keyword in operand position.
                if !at_step && matches!(name.as_str(), "and" | "or" | "div" | "mod") {
                    out.push_str(&name);
                    at_step = true;
                    continue;
                }

                if at_step && !attribute_name {
                    if let Some(prefix) = default_prefix {
                        out.push_str(prefix);
                        out.push(':');
                    }
                }
                out.push_str(&name);
                at_step = false;
                attribute_name = false;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    ScannedPath {
        path: out,
        prefixes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    fn table(text: &str) -> Namespaces {
        Namespaces::from_text(text).unwrap()
    }

    fn bound_path(path: &str, namespaces: &Namespaces) -> String {
        match bind(path, namespaces) {
            PathBinding::Bound { path, .. } => path,
            PathBinding::Unmapped => panic!("path should be bound: {path}"),
        }
    }

    #[rstest]
    #[case("item", "ns0:item")]
    #[case("//item", "//ns0:item")]
    #[case(".//item", ".//ns0:item")]
    #[case("root/item", "ns0:root/ns0:item")]
    #[case("item[2]", "ns0:item[2]")]
    #[case("item[@id]", "ns0:item[@id]")]
    #[case("item[@id='1']", "ns0:item[@id='1']")]
    #[case("item[sub/leaf]", "ns0:item[ns0:sub/ns0:leaf]")]
    #[case("a | b", "ns0:a | ns0:b")]
    #[case("item[text()='x']", "ns0:item[text()='x']")]
    #[case("count(item)", "count(ns0:item)")]
    #[case("child::item", "child::ns0:item")]
    #[case("descendant-or-self::item", "descendant-or-self::ns0:item")]
    #[case("attribute::id", "attribute::id")]
    #[case("item[a and b]", "ns0:item[ns0:a and ns0:b]")]
    #[case("item[position() mod 2 = 1]", "ns0:item[position() mod 2 = 1]")]
    #[case("item[price > 2.5]", "ns0:item[ns0:price > 2.5]")]
    #[case("*[last()]", "*[last()]")]
    #[case("..", "..")]
    #[case("./item", "./ns0:item")]
    #[case("node()", "node()")]
    #[case("item/@id", "ns0:item/@id")]
    fn test_qualifies_name_tests(#[case] path: &str, #[case] expected: &str) {
        let namespaces = table(r#"<root xmlns="urn:d"/>"#);
        assert_eq!(bound_path(path, &namespaces), expected);
    }

    #[rstest]
    #[case("item")]
    #[case(".//item[@id='1']")]
    #[case("count(item) > 2")]
    fn test_no_default_namespace_leaves_path_alone(#[case] path: &str) {
        let namespaces = table(r#"<root xmlns:x="urn:x"/>"#);
        assert_eq!(bound_path(path, &namespaces), path);
    }

    #[test]
    fn test_prefixed_names_kept_and_collected() {
        let namespaces = table(r#"<root xmlns="urn:d" xmlns:x="urn:x"/>"#);
        assert_snapshot!(
            bound_path(".//x:item[@x:kind='a']/sub", &namespaces),
            @".//x:item[@x:kind='a']/ns0:sub"
        );
    }

    #[test]
    fn test_operator_keyword_as_element_name() {
        // A name test may spell an operator keyword; position decides.
        let namespaces = table(r#"<root xmlns="urn:d"/>"#);
        assert_snapshot!(
            bound_path("div[mod]", &namespaces),
            @"ns0:div[ns0:mod]"
        );
    }

    #[test]
    fn test_literals_are_opaque() {
        let namespaces = table(r#"<root xmlns="urn:d"/>"#);
        assert_snapshot!(
            bound_path("item[kind='a/b' or kind=\"c:d\"]", &namespaces),
            @r#"ns0:item[ns0:kind='a/b' or ns0:kind="c:d"]"#
        );
    }

    #[test]
    fn test_generated_prefix_avoids_declared_ones() {
        let namespaces =
            table(r#"<root xmlns="urn:d" xmlns:ns0="urn:zero" xmlns:ns1="urn:one"/>"#);
        assert_eq!(bound_path("item", &namespaces), "ns2:item");
    }

    #[test]
    fn test_unmapped_prefix() {
        let namespaces = table(r#"<root xmlns:x="urn:x"/>"#);
        assert!(matches!(bind("y:item", &namespaces), PathBinding::Unmapped));
        assert!(matches!(
            bind(".//x:a/y:b", &namespaces),
            PathBinding::Unmapped
        ));
    }

    #[test]
    fn test_prefix_bound_to_empty_uri_is_unmapped() {
        let namespaces = table(r#"<root xmlns:x=""/>"#);
        assert!(matches!(bind("x:item", &namespaces), PathBinding::Unmapped));
    }

    #[test]
    fn test_bindings_cover_table_and_generated_prefix() {
        let namespaces = table(r#"<root xmlns="urn:d" xmlns:x="urn:x"/>"#);
        let mut bindings = match bind("item", &namespaces) {
            PathBinding::Bound { bindings, .. } => bindings,
            PathBinding::Unmapped => panic!("path should be bound"),
        };
        bindings.sort();
        assert_eq!(
            bindings,
            vec![
                ("ns0".to_string(), "urn:d".to_string()),
                ("x".to_string(), "urn:x".to_string()),
            ]
        );
    }

    #[test]
    fn test_variable_references_untouched() {
        let namespaces = table(r#"<root xmlns="urn:d"/>"#);
        assert_eq!(
            bound_path("item[@id=$wanted]", &namespaces),
            "ns0:item[@id=$wanted]"
        );
    }
}
