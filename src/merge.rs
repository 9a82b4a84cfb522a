//! Merge Engine (C5): the only piece that must be deterministic and safe under concurrent
//! invocation from the watcher and from explicit commands.

use std::sync::Mutex;

use crate::error::Result;
use crate::paths::{PlanningKind, ProjectPaths};
use crate::protocol_store::ProtocolStore;
use crate::sanitize::sanitize_xml;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The rules file was written.
    Written,
    /// No protocol body could be resolved; the rules file was left unchanged.
    SkippedNoProtocol,
}

/// Locate the byte span of `<!--MARKER-->...<!--/MARKER-->` (inclusive), non-greedy: the
/// first open tag paired with the first close tag found after it.
fn marker_span(doc: &str, marker: &str) -> Option<(usize, usize)> {
    let open = format!("<!--{marker}-->");
    let close = format!("<!--/{marker}-->");
    let start = doc.find(&open)?;
    let after_open = start + open.len();
    let rel_close = doc[after_open..].find(&close)?;
    let close_start = after_open + rel_close;
    let end = close_start + close.len();
    Some((start, end))
}

/// Replace the marked region (if present in `doc`) with `value`, dropping the comment
/// delimiters entirely. If the marker is absent, `doc` is returned unchanged.
fn substitute_marker(doc: &str, marker: &str, value: &str) -> String {
    match marker_span(doc, marker) {
        Some((start, end)) => format!("{}{}{}", &doc[..start], value, &doc[end..]),
        None => doc.to_string(),
    }
}

/// Find the first `<Protocol>` descendant element in `rules_xml` and return its exact source
/// text, byte-for-byte, so it can be reused verbatim.
fn extract_existing_protocol_span(rules_xml: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(rules_xml).ok()?;
    let node = doc.descendants().find(|n| n.is_element() && n.tag_name().name() == "Protocol")?;
    let range = node.range();
    Some(rules_xml[range].to_string())
}

pub struct MergeEngine<P: ProtocolStore> {
    paths: ProjectPaths,
    protocols: P,
    selection: SelectionStore,
    lock: Mutex<()>,
}

impl<P: ProtocolStore> MergeEngine<P> {
    pub fn new(paths: ProjectPaths, protocols: P, selection: SelectionStore) -> Self {
        Self { paths, protocols, selection, lock: Mutex::new(()) }
    }

    fn resolve_protocol_body(&self) -> Result<Option<String>> {
        if let Some(name) = self.selection.get()? {
            if let Some((body, _origin)) = self.protocols.get(&name) {
                return Ok(Some(sanitize_xml(&body)));
            }
        }

        let rules_path = self.paths.rules_file();
        if let Ok(existing) = std::fs::read_to_string(&rules_path) {
            if let Some(span) = extract_existing_protocol_span(&existing) {
                return Ok(Some(sanitize_xml(&span)));
            }
        }

        Ok(None)
    }

    /// Run one merge. Serialized against every other call via an internal mutex.
    pub fn merge(&self) -> Result<MergeOutcome> {
        let _guard = self.lock.lock().expect("merge mutex poisoned");

        let template_path = self.paths.template_dir().join("meta_rules.xml");
        let template = std::fs::read_to_string(&template_path).ok();

        let mut planning = std::collections::HashMap::new();
        for kind in PlanningKind::ALL {
            let content = std::fs::read_to_string(self.paths.live_file(kind)).unwrap_or_default();
            planning.insert(kind, sanitize_xml(&content));
        }

        let Some(template) = template else {
            let fallback = [PlanningKind::Architecture, PlanningKind::Progress, PlanningKind::Tasks]
                .iter()
                .map(|k| planning.get(k).cloned().unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\n\n");
            crate::atomic::write_atomic(&self.paths.rules_file(), fallback.as_bytes())
                .map_err(|e| crate::error::Error::io("write", self.paths.rules_file(), e))?;
            return Ok(MergeOutcome::Written);
        };

        let protocol_body = match self.resolve_protocol_body()? {
            Some(body) => body,
            None => {
                tracing::warn!(
                    "no protocol selected and no existing <Protocol> element to preserve; \
                     leaving rules file unchanged"
                );
                return Ok(MergeOutcome::SkippedNoProtocol);
            }
        };

        let mut merged = template;
        for kind in PlanningKind::ALL {
            merged = substitute_marker(&merged, kind.marker_name(), planning.get(&kind).unwrap());
        }
        merged = substitute_marker(&merged, "PROTOCOL", &protocol_body);

        crate::atomic::write_atomic(&self.paths.rules_file(), merged.as_bytes())
            .map_err(|e| crate::error::Error::io("write", self.paths.rules_file(), e))?;
        tracing::info!(path = %self.paths.rules_file().display(), "merge complete");
        Ok(MergeOutcome::Written)
    }
}
