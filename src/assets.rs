//! Packaged default templates and built-in protocols, embedded at compile time.

use include_dir::{include_dir, Dir};

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/templates");

/// The packaged `meta_rules.xml` merge template.
pub fn meta_rules() -> &'static str {
    TEMPLATES
        .get_file("meta_rules.xml")
        .and_then(|f| f.contents_utf8())
        .unwrap_or_default()
}

/// The packaged per-kind minimal template (`architecture.xml`, `progress.xml`, `tasks.xml`).
pub fn planning_template(kind: crate::paths::PlanningKind) -> &'static str {
    let name = format!("{}.xml", kind.file_stem());
    TEMPLATES.get_file(&name).and_then(|f| f.contents_utf8()).unwrap_or_default()
}

/// The packaged default `protocol.xml` body used by `protocol create` when no content is
/// supplied.
pub fn protocol_template() -> &'static str {
    TEMPLATES.get_file("protocol.xml").and_then(|f| f.contents_utf8()).unwrap_or_default()
}

/// List the built-in protocol names (without extension), sorted.
pub fn builtin_protocol_names() -> Vec<String> {
    let mut names: Vec<String> = TEMPLATES
        .get_dir("protocols")
        .map(|dir| {
            dir.files()
                .filter_map(|f| f.path().file_stem())
                .map(|s| s.to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Read a built-in protocol's body by sanitized name.
pub fn builtin_protocol(name: &str) -> Option<&'static str> {
    let path = format!("protocols/{name}.xml");
    TEMPLATES.get_file(&path).and_then(|f| f.contents_utf8())
}
