//! Shell escaping and quoting utilities.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for shell execution.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    // Characters that require quoting
    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Normalize argument list - if single arg contains whitespace, split it.
/// Handles both ways an output list reaches the CLI:
/// - Multiple args: ["a/cellhd/x", "a/vector/y"] -> unchanged
/// - Single joined arg: ["a/cellhd/x a/vector/y"] -> split on whitespace
pub fn normalize_args(args: &[String]) -> Vec<String> {
    if args.len() == 1 && args[0].contains(char::is_whitespace) {
        args[0].split_whitespace().map(|s| s.to_string()).collect()
    } else {
        args.to_vec()
    }
}
