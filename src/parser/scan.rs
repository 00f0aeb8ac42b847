//! Quote-aware scanning over raw command text.
//!
//! Everything that walks unparsed command text goes through this module:
//! balanced-parenthesis extraction, top-level argument splitting, statement
//! splitting, and locating `db.<collection>.<method>(` call targets. All
//! scans share one state machine that tracks whether the current position
//! is inside a single- or double-quoted string (honoring backslash
//! escapes), so a `)`, `,`, or `;` inside a string literal never corrupts
//! depth counting.
//!
//! Positions are byte indices. Only ASCII delimiters are matched, so
//! multi-byte UTF-8 content passes through untouched.

/// Content extracted from a balanced pair of parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct Balanced<'a> {
    /// The substring strictly between the opening and closing parenthesis.
    pub content: &'a str,
    /// Index just past the closing parenthesis.
    pub end: usize,
}

/// Tracks string-literal state while scanning raw text.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteState {
    quote: Option<u8>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one byte. Returns true when the byte is "active", i.e. outside
    /// any string literal and eligible for delimiter matching.
    fn step(&mut self, byte: u8) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        match self.quote {
            Some(q) => {
                if byte == b'\\' {
                    self.escaped = true;
                } else if byte == q {
                    self.quote = None;
                }
                false
            }
            None => {
                if byte == b'"' || byte == b'\'' {
                    self.quote = Some(byte);
                    false
                } else {
                    true
                }
            }
        }
    }
}

/// Extract the content of a balanced parenthesis pair.
///
/// `open` must be the index of an opening `(`; otherwise returns `None`.
/// Nested parentheses are tracked by depth, and parentheses inside string
/// literals are ignored. Returns `None` when the text ends before the
/// matching `)` is found; callers surface that as an unbalanced-parentheses
/// error.
pub fn extract_balanced(text: &str, open: usize) -> Option<Balanced<'_>> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 1usize;
    let mut state = QuoteState::default();
    let mut i = open + 1;

    while i < bytes.len() {
        let byte = bytes[i];
        if state.step(byte) {
            match byte {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Balanced {
                            content: &text[open + 1..i],
                            end: i + 1,
                        });
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    None
}

/// Split an argument list on commas that sit at nesting depth zero.
///
/// Depth counts parentheses, braces, and brackets together, so the comma
/// inside `{$set:{b:{c:2}}}` never acts as an argument separator. Segments
/// are trimmed; empty segments (e.g. from a trailing comma) are dropped.
pub fn split_top_level(text: &str) -> Vec<&str> {
    split_on(text, b',')
}

/// Split multi-statement input on semicolons at depth zero outside strings.
///
/// A trailing semicolon does not produce an empty statement, and a `;`
/// inside a quoted value or a balanced region stays intact.
pub fn split_statements(text: &str) -> Vec<&str> {
    split_on(text, b';')
}

fn split_on(text: &str, separator: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut state = QuoteState::default();
    let mut depth = 0usize;
    let mut segments = Vec::new();
    let mut start = 0usize;

    for (i, &byte) in bytes.iter().enumerate() {
        if !state.step(byte) {
            continue;
        }
        match byte {
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                let segment = text[start..i].trim();
                if !segment.is_empty() {
                    segments.push(segment);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        segments.push(tail);
    }

    segments
}

/// Find the first occurrence of `needle` at or after `from` that lies
/// outside any string literal. The scan starts from the beginning of the
/// text so quote state is consistent regardless of `from`.
pub fn find_outside_strings(text: &str, from: usize, needle: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let needle_bytes = needle.as_bytes();
    let mut state = QuoteState::default();

    for i in 0..bytes.len() {
        let active = state.step(bytes[i]);
        if active && i >= from && bytes[i..].starts_with(needle_bytes) {
            return Some(i);
        }
    }
    None
}

/// Whether `needle` occurs anywhere outside string literals.
pub fn contains_outside_strings(text: &str, needle: &str) -> bool {
    find_outside_strings(text, 0, needle).is_some()
}

/// Locate a chained `.method(...)` call at or after `from` and extract its
/// balanced argument text. Returns the index of the `.` and the extracted
/// content.
pub fn find_method_call<'a>(
    text: &'a str,
    from: usize,
    method: &str,
) -> Option<(usize, Balanced<'a>)> {
    let needle = format!(".{method}(");
    let dot = find_outside_strings(text, from, &needle)?;
    let open = dot + needle.len() - 1;
    let balanced = extract_balanced(text, open)?;
    Some((dot, balanced))
}

/// Whether a statement invokes `method`: either a chained `.method(`
/// anywhere outside strings, or a bare `method(` at the very start of the
/// statement (the form used when no collection prefix is given).
pub fn has_method_call(text: &str, method: &str) -> bool {
    if contains_outside_strings(text, &format!(".{method}(")) {
        return true;
    }
    let bare = format!("{method}(");
    text.starts_with(&bare)
}

/// Locate the statement's `method` invocation and extract its balanced
/// argument text. Accepts both the dotted form and a bare call at the
/// start of the statement. `None` means the call is absent or its
/// parentheses are unbalanced.
pub fn statement_call<'a>(text: &'a str, method: &str) -> Option<Balanced<'a>> {
    if let Some((_, balanced)) = find_method_call(text, 0, method) {
        return Some(balanced);
    }
    let bare = format!("{method}(");
    if text.starts_with(&bare) {
        return extract_balanced(text, bare.len() - 1);
    }
    None
}

/// Extract the collection name from a `db.<collection>.<method>(` target.
///
/// Returns `None` when the command omits the `db.` prefix, in which case
/// the interpreter falls back to the caller-supplied default collection.
pub fn collection_target(text: &str, method: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let needle = format!(".{method}(");
    let dot = find_outside_strings(text, 0, &needle)?;

    // Walk backwards over the collection identifier.
    let mut start = dot;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    if start == dot {
        return None;
    }

    // The identifier must be preceded by exactly `db.` at a word boundary.
    if start < 3 || &text[start - 3..start] != "db." {
        return None;
    }
    if start >= 4 && is_ident_byte(bytes[start - 4]) {
        return None;
    }

    Some(text[start..dot].to_string())
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_balanced_simple() {
        let result = extract_balanced("find({a: 1})", 4).unwrap();
        assert_eq!(result.content, "{a: 1}");
        assert_eq!(result.end, 12);
    }

    #[test]
    fn test_extract_balanced_nested() {
        let result = extract_balanced("foo(bar(1,2),3)", 3).unwrap();
        assert_eq!(result.content, "bar(1,2),3");
        assert_eq!(result.end, 15);
    }

    #[test]
    fn test_extract_balanced_paren_inside_string() {
        let text = r#"find({note: "a ) paren"})"#;
        let result = extract_balanced(text, 4).unwrap();
        assert_eq!(result.content, r#"{note: "a ) paren"}"#);
    }

    #[test]
    fn test_extract_balanced_single_quoted_string() {
        let text = "find({note: 'unmatched ( here'})";
        let result = extract_balanced(text, 4).unwrap();
        assert_eq!(result.content, "{note: 'unmatched ( here'}");
    }

    #[test]
    fn test_extract_balanced_escaped_quote() {
        let text = r#"find({note: "she said \")\""})"#;
        let result = extract_balanced(text, 4).unwrap();
        assert_eq!(result.content, r#"{note: "she said \")\""}"#);
    }

    #[test]
    fn test_extract_balanced_not_a_paren() {
        assert!(extract_balanced("find({})", 0).is_none());
    }

    #[test]
    fn test_extract_balanced_unbalanced() {
        assert!(extract_balanced("find({a: 1}", 4).is_none());
    }

    #[test]
    fn test_split_top_level_nested_braces() {
        let parts = split_top_level("{a:1}, {$set:{b:{c:2}}}");
        assert_eq!(parts, vec!["{a:1}", "{$set:{b:{c:2}}}"]);
    }

    #[test]
    fn test_split_top_level_three_arguments() {
        let parts = split_top_level("{a:1}, {$set:{b:2}}, {upsert:true}");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], "{upsert:true}");
    }

    #[test]
    fn test_split_top_level_comma_inside_string() {
        let parts = split_top_level(r#"{name: "Doe, Jane"}, {age: 1}"#);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], r#"{name: "Doe, Jane"}"#);
    }

    #[test]
    fn test_split_top_level_comma_inside_brackets() {
        let parts = split_top_level("[1, 2, 3], {b: 1}");
        assert_eq!(parts, vec!["[1, 2, 3]", "{b: 1}"]);
    }

    #[test]
    fn test_split_statements_basic() {
        let parts = split_statements("db.a.insertOne({x:1}); db.a.find({x:1})");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "db.a.insertOne({x:1})");
        assert_eq!(parts[1], "db.a.find({x:1})");
    }

    #[test]
    fn test_split_statements_trailing_semicolon() {
        let parts = split_statements("db.a.find({});");
        assert_eq!(parts, vec!["db.a.find({})"]);
    }

    #[test]
    fn test_split_statements_semicolon_inside_string() {
        let parts = split_statements(r#"db.a.insertOne({note: "a; b"})"#);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_split_statements_semicolon_inside_braces() {
        // Depth-aware: a semicolon nested in a balanced region is literal.
        let parts = split_statements("db.a.find({v: 'x;y'}); db.b.find({})");
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_collection_target_present() {
        assert_eq!(
            collection_target("db.users.find({})", "find"),
            Some("users".to_string())
        );
    }

    #[test]
    fn test_collection_target_missing_prefix() {
        assert_eq!(collection_target("find({})", "find"), None);
        assert_eq!(collection_target("users.find({})", "find"), None);
    }

    #[test]
    fn test_collection_target_not_a_word_boundary() {
        // `mydb.users.find()` must not be mistaken for `db.users.find()`.
        assert_eq!(collection_target("mydb.users.find({})", "find"), None);
    }

    #[test]
    fn test_collection_target_underscore_name() {
        assert_eq!(
            collection_target("db.audit_log_2024.find({})", "find"),
            Some("audit_log_2024".to_string())
        );
    }

    #[test]
    fn test_has_method_call_forms() {
        assert!(has_method_call("db.users.find({})", "find"));
        assert!(has_method_call("find({})", "find"));
        assert!(!has_method_call("somefind({})", "find"));
        assert!(!has_method_call(r#"insertOne({s: ".find("})"#, "find"));
    }

    #[test]
    fn test_statement_call_bare_form() {
        let balanced = statement_call("find({a: 1})", "find").unwrap();
        assert_eq!(balanced.content, "{a: 1}");

        let balanced = statement_call("db.users.find({a: 1})", "find").unwrap();
        assert_eq!(balanced.content, "{a: 1}");

        assert!(statement_call("find({a: 1}", "find").is_none());
    }

    #[test]
    fn test_find_method_call_chained() {
        let text = "db.users.find({}).sort({name:1}).limit(5)";
        let (dot, balanced) = find_method_call(text, 17, "sort").unwrap();
        assert_eq!(&text[dot..dot + 6], ".sort(");
        assert_eq!(balanced.content, "{name:1}");

        let (_, limit) = find_method_call(text, 17, "limit").unwrap();
        assert_eq!(limit.content, "5");
    }

    #[test]
    fn test_find_method_call_ignores_strings() {
        let text = r#"db.users.find({note: ".limit(3)"})"#;
        assert!(find_method_call(text, 14, "limit").is_none());
    }

    #[test]
    fn test_contains_outside_strings() {
        assert!(contains_outside_strings("db.a.find({})", ".find("));
        assert!(!contains_outside_strings(
            r#"db.a.insertOne({s: ".find("})"#,
            ".find("
        ));
    }
}
