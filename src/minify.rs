/*!
 * Text minifiers for supported file types
 *
 * Each minifier is a plain textual transformation: comments and
 * insignificant whitespace go away, everything that carries meaning stays.
 * String, template and regex literals are copied verbatim, so minification
 * never rewrites what a program actually says. Malformed input surfaces as
 * a `MinifyError`; callers fall back to the raw contents for that file.
 */

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::types::FileTypeTag;

/// Error type for minification failures
#[derive(Error, Debug)]
pub enum MinifyError {
    /// A block comment without a terminator
    #[error("unterminated block comment")]
    UnterminatedComment,

    /// A string or template literal without a closing quote
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A regular expression literal without a closing slash
    #[error("unterminated regular expression literal")]
    UnterminatedRegex,

    /// An element whose closing tag never appears
    #[error("unterminated <{0}> element")]
    UnterminatedElement(&'static str),
}

/// A minifier: raw text in, compacted text out
pub type MinifyFn = fn(&str) -> Result<String, MinifyError>;

/// Strategy table mapping file type tags to their minifier
///
/// Tags without an entry pass through `minify` unchanged.
static MINIFIERS: Lazy<HashMap<FileTypeTag, MinifyFn>> = Lazy::new(|| {
    let mut table: HashMap<FileTypeTag, MinifyFn> = HashMap::new();
    table.insert(FileTypeTag::Markup, minify_markup);
    table.insert(FileTypeTag::Stylesheet, minify_stylesheet);
    table.insert(FileTypeTag::Script, minify_script);
    table.insert(FileTypeTag::TemplatedMarkup, minify_templated);
    table
});

/// Look up the minifier registered for a tag
pub fn minifier_for(tag: FileTypeTag) -> Option<MinifyFn> {
    MINIFIERS.get(&tag).copied()
}

/// Minify contents according to their type tag
pub fn minify(contents: &str, tag: FileTypeTag) -> Result<String, MinifyError> {
    match minifier_for(tag) {
        Some(minifier) => minifier(contents),
        None => Ok(contents.to_string()),
    }
}

//--------------------------------------------------------------------
// Shared scanning helpers
//--------------------------------------------------------------------

/// Copy a quoted literal verbatim, including both quotes
///
/// The opening quote has already been consumed by the caller; escapes are
/// honored so an escaped quote does not end the literal.
fn copy_quoted(
    out: &mut String,
    chars: &mut Peekable<Chars<'_>>,
    quote: char,
) -> Result<(), MinifyError> {
    out.push(quote);
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        if c == quote {
            return Ok(());
        }
    }
    Err(MinifyError::UnterminatedString)
}

/// Consume a block comment body after the opening `/*`
///
/// Returns whether the comment spanned a line break.
fn consume_block_comment(chars: &mut Peekable<Chars<'_>>) -> Result<bool, MinifyError> {
    let mut saw_newline = false;
    while let Some(c) = chars.next() {
        match c {
            '\n' => saw_newline = true,
            '*' if chars.peek() == Some(&'/') => {
                chars.next();
                return Ok(saw_newline);
            }
            _ => {}
        }
    }
    Err(MinifyError::UnterminatedComment)
}

//--------------------------------------------------------------------
// Stylesheets
//--------------------------------------------------------------------

/// Punctuation after which a following space is redundant
///
/// A space after ':' or '(' is only ever cosmetic, so both are included
/// here; see `css_redundant_before` for why the reverse does not hold.
fn css_redundant_after(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>' | ':' | '(')
}

/// Punctuation before which a preceding space is redundant
///
/// ':' is excluded: "a :hover" selects descendants while "a:hover" does
/// not. '(' is excluded: "and (min-width...)" needs its space.
fn css_redundant_before(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>' | ')')
}

fn css_flush_space(out: &mut String, pending: &mut bool, next: char) {
    if !*pending {
        return;
    }
    *pending = false;
    match out.chars().last() {
        None => {}
        Some(last) if css_redundant_after(last) || css_redundant_before(next) => {}
        Some(_) => out.push(' '),
    }
}

/// Minify a stylesheet
///
/// Removes comments, collapses whitespace runs, drops spaces adjacent to
/// structural punctuation where removal preserves semantics, and drops
/// semicolons directly before a closing brace. String literals are copied
/// verbatim.
fn minify_stylesheet(input: &str) -> Result<String, MinifyError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                consume_block_comment(&mut chars)?;
                pending_space = true;
            }
            '"' | '\'' => {
                css_flush_space(&mut out, &mut pending_space, c);
                copy_quoted(&mut out, &mut chars, c)?;
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                css_flush_space(&mut out, &mut pending_space, c);
                if c == '}' {
                    while out.ends_with(';') {
                        out.pop();
                    }
                }
                out.push(c);
            }
        }
    }
    Ok(out.trim().to_string())
}

//--------------------------------------------------------------------
// Scripts
//--------------------------------------------------------------------

/// Keywords after which a '/' starts a regex literal
const REGEX_PRECEDING_KEYWORDS: [&str; 13] = [
    "return", "typeof", "instanceof", "in", "of", "case", "do", "else", "new", "void", "delete",
    "yield", "await",
];

/// Whether a '/' at this point starts a regex literal rather than division
///
/// Operand position: start of input, after an operator, opening bracket or
/// separator, or after a keyword such as `return`. After an identifier or
/// number the '/' is division.
fn regex_can_follow(out: &str) -> bool {
    let mut word = String::new();
    for c in out.chars().rev() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            word.insert(0, c);
        } else {
            break;
        }
    }
    if !word.is_empty() {
        return REGEX_PRECEDING_KEYWORDS.contains(&word.as_str());
    }
    match out.trim_end().chars().last() {
        None => true,
        Some(c) => matches!(
            c,
            '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '<' | '>'
                | '+' | '-' | '*' | '%' | '~' | '^'
        ),
    }
}

/// Copy a regex literal verbatim, including delimiters and flags
fn copy_regex(out: &mut String, chars: &mut Peekable<Chars<'_>>) -> Result<(), MinifyError> {
    out.push('/');
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '\n' => return Err(MinifyError::UnterminatedRegex),
            '[' => {
                out.push(c);
                in_class = true;
            }
            ']' => {
                out.push(c);
                in_class = false;
            }
            '/' if !in_class => {
                out.push(c);
                while let Some(&flag) = chars.peek() {
                    if !flag.is_alphabetic() {
                        break;
                    }
                    out.push(flag);
                    chars.next();
                }
                return Ok(());
            }
            _ => out.push(c),
        }
    }
    Err(MinifyError::UnterminatedRegex)
}

/// Copy a template literal verbatim, tracking `${}` interpolations so a
/// closing brace inside one does not end the literal early
fn copy_template(out: &mut String, chars: &mut Peekable<Chars<'_>>) -> Result<(), MinifyError> {
    out.push('`');
    let mut depth = 0usize;
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '$' if depth == 0 && chars.peek() == Some(&'{') => {
                out.push('{');
                chars.next();
                depth += 1;
            }
            '{' if depth > 0 => depth += 1,
            '}' if depth > 0 => depth -= 1,
            '`' if depth == 0 => return Ok(()),
            _ => {}
        }
    }
    Err(MinifyError::UnterminatedString)
}

fn script_flush_space(out: &mut String, pending: &mut bool) {
    if !*pending {
        return;
    }
    *pending = false;
    match out.chars().last() {
        None | Some('\n') => {}
        Some(_) => out.push(' '),
    }
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Minify a script
///
/// Removes comments, collapses horizontal whitespace and indentation, and
/// drops blank lines. Line breaks between statements are kept, so
/// automatic statement termination is unchanged. String, template and
/// regex literals are copied verbatim; a block comment spanning lines is
/// replaced by a line break.
fn minify_script(input: &str) -> Result<String, MinifyError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                if consume_block_comment(&mut chars)? {
                    pending_space = false;
                    push_newline(&mut out);
                } else {
                    pending_space = true;
                }
            }
            '/' if regex_can_follow(&out) => {
                script_flush_space(&mut out, &mut pending_space);
                copy_regex(&mut out, &mut chars)?;
            }
            '\'' | '"' => {
                script_flush_space(&mut out, &mut pending_space);
                copy_quoted(&mut out, &mut chars, c)?;
            }
            '`' => {
                script_flush_space(&mut out, &mut pending_space);
                copy_template(&mut out, &mut chars)?;
            }
            '\n' => {
                pending_space = false;
                push_newline(&mut out);
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                script_flush_space(&mut out, &mut pending_space);
                out.push(c);
            }
        }
    }
    Ok(out.trim().to_string())
}

//--------------------------------------------------------------------
// Markup
//--------------------------------------------------------------------

/// Elements whose body is handled specially: scripts and styles are
/// delegated to their own minifiers, pre and textarea are kept verbatim
const SPECIAL_ELEMENTS: [&str; 4] = ["script", "style", "pre", "textarea"];

/// Case-insensitive substring search (ASCII; markup syntax only)
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Collapse whitespace in markup text, dropping it entirely between tags
fn squeeze_markup(out: &mut String, text: &str) {
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            pending_space = false;
            let after_tag = matches!(out.chars().last(), None | Some('>'));
            if !out.is_empty() && !(after_tag && c == '<') {
                out.push(' ');
            }
        }
        out.push(c);
    }
    if pending_space && !out.is_empty() && !out.ends_with('>') {
        out.push(' ');
    }
}

/// Locate the next special element opening tag in `rest`
fn next_special_element(rest: &str) -> Option<(usize, &'static str)> {
    SPECIAL_ELEMENTS
        .iter()
        .filter_map(|tag| {
            let needle = format!("<{tag}");
            let mut from = 0;
            while let Some(pos) = find_ci(&rest[from..], &needle) {
                let abs = from + pos;
                let after = rest[abs + needle.len()..].chars().next();
                let is_tag = match after {
                    None | Some('>') | Some('/') => true,
                    Some(c) => c.is_whitespace(),
                };
                if is_tag {
                    return Some((abs, *tag));
                }
                from = abs + needle.len();
            }
            None
        })
        .min_by_key(|(pos, _)| *pos)
}

/// Copy one special element, minifying its body where a body minifier
/// applies; returns the remainder of the input after the element
fn copy_special_element<'a>(
    out: &mut String,
    rest: &'a str,
    tag: &'static str,
) -> Result<&'a str, MinifyError> {
    let open_end = rest
        .find('>')
        .ok_or(MinifyError::UnterminatedElement(tag))?;
    let opening = &rest[..=open_end];
    out.push_str(opening);
    if opening.trim_end_matches('>').ends_with('/') {
        return Ok(&rest[open_end + 1..]);
    }
    let body_start = open_end + 1;
    let close_needle = format!("</{tag}");
    let body_len = find_ci(&rest[body_start..], &close_needle)
        .ok_or(MinifyError::UnterminatedElement(tag))?;
    let body = &rest[body_start..body_start + body_len];
    match tag {
        "script" => out.push_str(&minify_script(body).unwrap_or_else(|_| body.to_string())),
        "style" => out.push_str(&minify_stylesheet(body).unwrap_or_else(|_| body.to_string())),
        _ => out.push_str(body),
    }
    let close_start = body_start + body_len;
    let close_end = rest[close_start..]
        .find('>')
        .ok_or(MinifyError::UnterminatedElement(tag))?;
    out.push_str(&rest[close_start..=close_start + close_end]);
    Ok(&rest[close_start + close_end + 1..])
}

/// Minify markup
///
/// Strips comments and collapses insignificant whitespace outside of
/// script, style, pre and textarea elements. Script and style bodies are
/// delegated to the corresponding minifiers, falling back to the raw body
/// when the embedded minifier rejects it.
fn minify_markup(input: &str) -> Result<String, MinifyError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while !rest.is_empty() {
        let comment = find_ci(rest, "<!--");
        let special = next_special_element(rest);
        match (comment, special) {
            (Some(at), special) if special.map_or(true, |(block_at, _)| at < block_at) => {
                squeeze_markup(&mut out, &rest[..at]);
                let after = &rest[at + 4..];
                let end = find_ci(after, "-->").ok_or(MinifyError::UnterminatedComment)?;
                rest = &after[end + 3..];
            }
            (_, Some((at, tag))) => {
                squeeze_markup(&mut out, &rest[..at]);
                rest = copy_special_element(&mut out, &rest[at..], tag)?;
            }
            _ => {
                squeeze_markup(&mut out, rest);
                break;
            }
        }
    }
    Ok(out.trim().to_string())
}

//--------------------------------------------------------------------
// Templated markup
//--------------------------------------------------------------------

/// Line-collapse a template: trailing whitespace and blank lines go away,
/// everything else (template directives included) is left untouched
fn minify_templated(input: &str) -> Result<String, MinifyError> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_minifiable_tags_only() {
        assert!(minifier_for(FileTypeTag::Markup).is_some());
        assert!(minifier_for(FileTypeTag::Stylesheet).is_some());
        assert!(minifier_for(FileTypeTag::Script).is_some());
        assert!(minifier_for(FileTypeTag::TemplatedMarkup).is_some());
        assert!(minifier_for(FileTypeTag::ScriptVariant).is_none());
        assert!(minifier_for(FileTypeTag::Unknown).is_none());
    }

    #[test]
    fn unregistered_tags_pass_through() {
        let source = "def f():\n    return 1  # comment\n";
        assert_eq!(minify(source, FileTypeTag::ScriptVariant).unwrap(), source);
        assert_eq!(minify(source, FileTypeTag::Unknown).unwrap(), source);
    }

    #[test]
    fn stylesheet_comments_removed_tokens_kept() {
        let css = "/* header */\n.a , .b > .c {\n    color: red ;\n    margin: 0 auto;\n}\n";
        let min = minify(css, FileTypeTag::Stylesheet).unwrap();
        assert!(!min.contains("header"));
        assert!(!min.contains("/*"));
        assert!(min.contains("color:red"));
        assert!(min.contains("margin:0 auto"));
        assert!(min.contains(".a,.b>.c{"));
        assert!(!min.contains('\n'));
    }

    #[test]
    fn stylesheet_semicolon_before_brace_dropped() {
        let min = minify("a { color: red; }", FileTypeTag::Stylesheet).unwrap();
        assert_eq!(min, "a{color:red}");
    }

    #[test]
    fn stylesheet_descendant_pseudo_selector_kept() {
        let min = minify("a :hover { color: red; }", FileTypeTag::Stylesheet).unwrap();
        assert!(min.starts_with("a :hover{"));
    }

    #[test]
    fn stylesheet_string_contents_untouched() {
        let css = "a::before { content: \"  { ; } /* not a comment */  \"; }";
        let min = minify(css, FileTypeTag::Stylesheet).unwrap();
        assert!(min.contains("\"  { ; } /* not a comment */  \""));
    }

    #[test]
    fn stylesheet_unterminated_comment_is_an_error() {
        assert!(minify("a { /* oops", FileTypeTag::Stylesheet).is_err());
    }

    #[test]
    fn script_comments_removed_strings_kept() {
        let js = "// leading\nconst url = \"http://example.com\"; // trailing\nlet s = 'it\\'s';\n";
        let min = minify(js, FileTypeTag::Script).unwrap();
        assert!(!min.contains("leading"));
        assert!(!min.contains("trailing"));
        assert!(min.contains("\"http://example.com\""));
        assert!(min.contains("'it\\'s'"));
    }

    #[test]
    fn script_line_breaks_survive() {
        let js = "x = 1\n\n\ny = 2\n";
        assert_eq!(minify(js, FileTypeTag::Script).unwrap(), "x = 1\ny = 2");
    }

    #[test]
    fn script_indentation_collapsed() {
        let js = "function add(a, b) {\n        return a + b;\n}\n";
        let min = minify(js, FileTypeTag::Script).unwrap();
        assert!(min.contains("\nreturn a + b;\n"));
    }

    #[test]
    fn script_regex_literal_untouched() {
        let js = "let re = /ab\\/c [/]*/g;\nlet half = x / 2;\n";
        let min = minify(js, FileTypeTag::Script).unwrap();
        assert!(min.contains("/ab\\/c [/]*/g"));
        assert!(min.contains("x / 2"));
    }

    #[test]
    fn script_template_literal_untouched() {
        let js = "let t = `hello\n  world ${name ? `y` : `n`}`;\n";
        let min = minify(js, FileTypeTag::Script).unwrap();
        assert!(min.contains("`hello\n  world ${name ? `y` : `n`}`"));
    }

    #[test]
    fn script_multiline_block_comment_becomes_line_break() {
        let js = "let a = 1;\n/* spans\n   lines */\nlet b = 2;\n";
        assert_eq!(
            minify(js, FileTypeTag::Script).unwrap(),
            "let a = 1;\nlet b = 2;"
        );
    }

    #[test]
    fn markup_comment_removed_text_collapsed() {
        let html = "<!-- banner -->\n<p>Hello   world</p>\n  <p>again</p>\n";
        let min = minify(html, FileTypeTag::Markup).unwrap();
        assert!(!min.contains("banner"));
        assert!(min.contains("<p>Hello world</p><p>again</p>"));
    }

    #[test]
    fn markup_delegates_embedded_style_and_script() {
        let html = "<style>\nbody { color: red; }\n</style>\n<script>\n// init\nlet x = 1;\n</script>\n";
        let min = minify(html, FileTypeTag::Markup).unwrap();
        assert!(min.contains("<style>body{color:red}</style>"));
        assert!(min.contains("<script>let x = 1;</script>"));
    }

    #[test]
    fn markup_preserves_pre_body() {
        let html = "<div>\n<pre>\n  keep   this\n</pre>\n</div>\n";
        let min = minify(html, FileTypeTag::Markup).unwrap();
        assert!(min.contains("<pre>\n  keep   this\n</pre>"));
    }

    #[test]
    fn markup_prefix_tag_names_not_confused() {
        let html = "<present>  spaced   out  </present>";
        let min = minify(html, FileTypeTag::Markup).unwrap();
        assert_eq!(min, "<present> spaced out </present>");
    }

    #[test]
    fn templated_markup_lines_collapsed_delimiters_kept() {
        let ejs = "<ul>   \n\n  <% items.forEach(function(i) { %>\n\n  <li><%= i %></li>  \n<% }); %>\n</ul>\n";
        let min = minify(ejs, FileTypeTag::TemplatedMarkup).unwrap();
        assert!(min.contains("<% items.forEach(function(i) { %>"));
        assert!(min.contains("<%= i %>"));
        assert!(!min.contains("\n\n"));
        assert!(!min.contains(" \n"));
    }
}
