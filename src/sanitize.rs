//! Sanitizer (C2): safe identifiers for filenames, and control-character/well-formedness
//! scrubbing for merged XML content.

fn is_allowed_special(c: char) -> bool {
    matches!(c, '#' | '*' | '_' | '-' | '`' | '~' | '[' | ']' | '(' | ')' | '{' | '}' | '|' | '<' | '>' | '.')
}

/// Produce a safe filename identifier from an arbitrary user-chosen string. Deterministic and
/// idempotent after one pass. Leading/trailing whitespace is trimmed before the character map
/// runs, so outer padding never shows up as a leading/trailing underscore run.
pub fn sanitize_name(raw: &str) -> String {
    let raw = raw.trim();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if !c.is_ascii() {
            continue;
        }
        if c.is_ascii_alphanumeric() || is_allowed_special(c) {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    let collapsed = collapse_underscores(&out);

    let prefixed = match collapsed.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => collapsed,
        _ => format!("p_{collapsed}"),
    };

    prefixed.trim_end_matches('_').to_string()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Strip disallowed control characters and escape unpaired `&`, leaving already-escaped
/// entities alone.
fn strip_control_chars(s: &str) -> String {
    s.chars().filter(|&c| c == '\t' || c == '\n' || c == '\r' || !c.is_control()).collect()
}

fn escape_unpaired_ampersands(s: &str) -> String {
    const ENTITIES: [&str; 5] = ["amp;", "lt;", "gt;", "quot;", "apos;"];
    let mut out = String::with_capacity(s.len());
    let bytes: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == '&' {
            let rest: String = bytes[i + 1..].iter().collect();
            let is_named = ENTITIES.iter().any(|e| rest.starts_with(e));
            let is_numeric = rest.starts_with('#')
                && rest[1..].chars().take_while(|c| c.is_ascii_digit() || *c == 'x').count() > 0
                && rest.find(';').map(|p| {
                    let body = &rest[1..p];
                    body.chars().all(|c| c.is_ascii_digit())
                        || (body.starts_with('x') && body[1..].chars().all(|c| c.is_ascii_hexdigit()))
                })
                .unwrap_or(false);
            if is_named || is_numeric {
                out.push('&');
            } else {
                out.push_str("&amp;");
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

fn is_well_formed_xml(s: &str) -> bool {
    roxmltree::Document::parse(s).is_ok()
}

/// Strip control characters, escape unpaired ampersands, and guarantee the result parses as
/// XML: one wrap attempt in a default root element, then a known-empty document as a last
/// resort.
pub fn sanitize_xml(s: &str) -> String {
    let stripped = strip_control_chars(s);
    let escaped = escape_unpaired_ampersands(&stripped);

    if is_well_formed_xml(&escaped) {
        return escaped;
    }

    let wrapped = if escaped.trim_start().starts_with("<?xml") {
        escaped.clone()
    } else {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{escaped}")
    };
    if is_well_formed_xml(&wrapped) {
        return wrapped;
    }

    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root></root>".to_string()
}
