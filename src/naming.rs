use heck::{AsLowerCamelCase, AsPascalCase, AsShoutySnekCase, AsSnekCase};

/// TypeScript reserved words that can't be used as identifiers.
const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    // Strict mode reserved words.
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// A naming convention applied to identifiers during allocation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NameCase {
    /// Keep the source spelling.
    #[default]
    Preserve,
    /// `camelCase`.
    Camel,
    /// `PascalCase`.
    Pascal,
    /// `snake_case`.
    Snake,
    /// `SCREAMING_SNAKE_CASE`.
    ScreamingSnake,
}

/// Applies a naming convention to a raw candidate name.
pub fn apply_case(case: NameCase, name: &str) -> String {
    match case {
        NameCase::Preserve => name.to_owned(),
        NameCase::Camel => format!("{}", AsLowerCamelCase(name)),
        NameCase::Pascal => format!("{}", AsPascalCase(name)),
        NameCase::Snake => format!("{}", AsSnekCase(name)),
        NameCase::ScreamingSnake => format!("{}", AsShoutySnekCase(name)),
    }
}

/// Makes a string usable as a TypeScript identifier.
///
/// Characters that can't appear in an identifier become underscores,
/// a leading character that can't start one gets an underscore prefix,
/// and reserved words are escaped the same way.
pub fn sanitize(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        if unicode_ident::is_xid_continue(c) || c == '$' {
            sanitized.push(c);
        } else {
            sanitized.push('_');
        }
    }
    let starts_legally = sanitized
        .chars()
        .next()
        .is_some_and(|c| unicode_ident::is_xid_start(c) || c == '_' || c == '$');
    if !starts_legally || KEYWORDS.contains(&sanitized.as_str()) {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}
