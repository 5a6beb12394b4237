//! The finalised edit script.

use crate::edit::{ChildLink, CoreEdit, Edit, ParentRef};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use treediff_tree::Language;

/// An ordered, finalised sequence of edits: negative before positive,
/// fusions applied.
///
/// Produced by [`EditScriptBuffer::finalize`](crate::EditScriptBuffer::finalize)
/// and handed to the caller together with the reconstructed tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditScript {
    edits: Vec<Edit>,
}

impl EditScript {
    /// Wraps an already-ordered sequence of edits.
    pub fn new(edits: Vec<Edit>) -> Self {
        Self { edits }
    }

    /// Number of (sugared) edits.
    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether the script is empty (the trees were identical).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The edits in application order.
    #[inline]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Iterates the edits in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    /// Splits every fused edit, yielding the five-operation core sequence
    /// consumers replay.
    pub fn to_core(&self) -> Vec<CoreEdit> {
        let mut core = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            edit.push_core_into(&mut core);
        }
        core
    }

    /// Renders the script with symbol names resolved through `language`,
    /// one edit per line.
    pub fn format(&self, language: &Language) -> String {
        let mut out = String::new();
        for edit in &self.edits {
            match edit {
                Edit::Update(e) => {
                    let _ = writeln!(
                        out,
                        "[UPDATE | {}] {} old {} ({}) => new {} ({})",
                        e.id,
                        symbol(language, e.tag),
                        e.old_start,
                        e.old_size,
                        e.new_start,
                        e.new_size,
                    );
                }
                Edit::Load(e) => {
                    let _ = writeln!(out, "[LOAD | {}] {}", e.id, symbol(language, e.tag));
                }
                Edit::Attach(e) => {
                    let _ = writeln!(
                        out,
                        "[ATTACH | {}] {} to {}",
                        e.id,
                        symbol(language, e.tag),
                        parent(language, e.parent.as_ref()),
                    );
                }
                Edit::Detach(e) => {
                    let _ = writeln!(
                        out,
                        "[DETACH | {}] {} from {}",
                        e.id,
                        symbol(language, e.tag),
                        parent(language, e.parent.as_ref()),
                    );
                }
                Edit::Unload(e) => {
                    let _ = writeln!(
                        out,
                        "[UNLOAD | {}] {} ({} kids)",
                        e.id,
                        symbol(language, e.tag),
                        e.kids.len(),
                    );
                }
                Edit::LoadAttach(e) => {
                    let _ = writeln!(
                        out,
                        "[LOAD_ATTACH | {}] {} to {}",
                        e.id,
                        symbol(language, e.tag),
                        parent(language, e.parent.as_ref()),
                    );
                }
                Edit::DetachUnload(e) => {
                    let _ = writeln!(
                        out,
                        "[DETACH_UNLOAD | {}] {} from {} ({} kids)",
                        e.id,
                        symbol(language, e.tag),
                        parent(language, e.parent.as_ref()),
                        e.kids.len(),
                    );
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

fn symbol(language: &Language, tag: treediff_tree::Symbol) -> &str {
    language.symbol_name(tag).unwrap_or("<unknown>")
}

fn parent(language: &Language, parent: Option<&ParentRef>) -> String {
    match parent {
        Some(p) => {
            let link = match p.link {
                ChildLink::Field(field) => {
                    format!("field {}", language.field_name(field).unwrap_or("<unknown>"))
                }
                ChildLink::Index(index) => format!("link {index}"),
            };
            format!("parent {} ({}) on {}", p.id, symbol(language, p.tag), link)
        }
        None => "root".to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::edit::{Attach, Detach, DetachUnload, Load, LoadPayload, Update};
    use treediff_position::Length;
    use treediff_tree::{LanguageBuilder, NodeId};

    fn toy_language() -> Language {
        let mut builder = LanguageBuilder::new("toy");
        builder.named_symbol("expr").unwrap();
        builder.named_symbol("integer").unwrap();
        builder.build()
    }

    #[test]
    fn test_to_core_splits_fusions() {
        let id = NodeId::mint();
        let script = EditScript::new(vec![Edit::DetachUnload(DetachUnload {
            id,
            tag: 0,
            kids: vec![],
            parent: None,
        })]);
        let core = script.to_core();
        assert_eq!(core.len(), 2);
        assert!(matches!(core[0], CoreEdit::Detach(_)));
        assert!(matches!(core[1], CoreEdit::Unload(_)));
    }

    #[test]
    fn test_format_names_symbols() {
        let language = toy_language();
        let id = NodeId::mint();
        let script = EditScript::new(vec![
            Edit::Update(Update {
                id,
                tag: 1,
                old_start: Length::new(4, 0, 4),
                old_size: Length::new(1, 0, 1),
                new_start: Length::new(4, 0, 4),
                new_size: Length::new(2, 0, 2),
            }),
            Edit::Detach(Detach { id, tag: 0, parent: None }),
            Edit::Load(Load {
                id,
                tag: 0,
                payload: LoadPayload::Interior { kids: vec![], production_id: 0 },
            }),
            Edit::Attach(Attach { id, tag: 0, parent: None }),
        ]);
        let rendered = script.format(&language);
        assert!(rendered.contains("[UPDATE"));
        assert!(rendered.contains("integer"));
        assert!(rendered.contains("from root"));
        assert_eq!(rendered.lines().count(), 4);
    }
}
