//! Relevance filtering: invisible and undeclared anonymous nodes never
//! surface in edit scripts; declared fields ride on attach/detach links.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use treediff_core::{compare_to, initialize, DiffHeapStore, DiffOutcome};
use treediff_edit::{ChildLink, Edit, LoadPayload};
use treediff_testkit::{tokens, Tokens};
use treediff_tree::{NodeSpec, SubtreePool, Tree};

struct Setup {
    pool: SubtreePool,
    heaps: DiffHeapStore,
    grammar: Tokens,
    old_tree: Tree,
    outcome: DiffOutcome,
}

fn diff_tokens(old_spec: &NodeSpec, new_spec: &NodeSpec) -> Setup {
    let grammar = tokens().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (old_tree, old_code) = treediff_testkit::build(&mut pool, &grammar.language, old_spec);
    let (new_tree, new_code) = treediff_testkit::build(&mut pool, &grammar.language, new_spec);
    initialize(&mut pool, &mut heaps, &old_tree, &old_code, &grammar.literal_map).unwrap();
    initialize(&mut pool, &mut heaps, &new_tree, &new_code, &grammar.literal_map).unwrap();
    let outcome = compare_to(
        &mut pool,
        &mut heaps,
        &old_tree,
        &new_tree,
        &old_code,
        &new_code,
        &grammar.literal_map,
    )
    .unwrap();
    Setup { pool, heaps, grammar, old_tree, outcome }
}

#[test]
fn test_undeclared_anonymous_tokens_never_appear() {
    let grammar = tokens().unwrap();
    let old = NodeSpec::node(
        grammar.stmt,
        vec![NodeSpec::leaf(grammar.name, "x"), NodeSpec::leaf(grammar.punct, ";")],
    );
    let new = NodeSpec::node(
        grammar.stmt,
        vec![
            NodeSpec::leaf(grammar.name, "x"),
            NodeSpec::leaf(grammar.punct, ";"),
            NodeSpec::leaf(grammar.punct, ";"),
        ],
    );
    let setup = diff_tokens(&old, &new);

    for edit in &setup.outcome.edit_script {
        let tags: Vec<u16> = match edit {
            Edit::Update(e) => vec![e.tag],
            Edit::Load(e) => vec![e.tag],
            Edit::Attach(e) => vec![e.tag],
            Edit::Detach(e) => vec![e.tag],
            Edit::Unload(e) => vec![e.tag],
            Edit::LoadAttach(e) => vec![e.tag],
            Edit::DetachUnload(e) => vec![e.tag],
        };
        assert!(!tags.contains(&setup.grammar.punct), "punctuation leaked into {edit:?}");
    }

    // Kid lists are filtered to relevant children as well.
    let name_id = {
        let subtree = setup.pool.child(setup.old_tree.root(), 0).unwrap();
        setup.heaps.get(setup.pool.get(subtree).diff_heap().unwrap()).unwrap().id
    };
    for edit in &setup.outcome.edit_script {
        match edit {
            Edit::DetachUnload(e) => {
                assert_eq!(e.kids.iter().map(|k| k.child_id).collect::<Vec<_>>(), vec![name_id]);
            }
            Edit::LoadAttach(e) => {
                let LoadPayload::Interior { kids, .. } = &e.payload else {
                    panic!("expected interior load")
                };
                assert_eq!(kids.iter().map(|k| k.child_id).collect::<Vec<_>>(), vec![name_id]);
            }
            _ => {}
        }
    }
}

#[test]
fn test_declared_unnamed_token_is_relevant() {
    let grammar = tokens().unwrap();
    // Arrow tokens are anonymous but declared relevant; replacing one with a
    // name produces visible edits for both sides.
    let old = NodeSpec::node(
        grammar.stmt,
        vec![NodeSpec::leaf(grammar.name, "x"), NodeSpec::leaf(grammar.arrow, "->")],
    );
    let new = NodeSpec::node(
        grammar.stmt,
        vec![NodeSpec::leaf(grammar.name, "x"), NodeSpec::leaf(grammar.name, "y")],
    );
    let setup = diff_tokens(&old, &new);

    let mentions_arrow = setup.outcome.edit_script.iter().any(|edit| match edit {
        Edit::DetachUnload(e) => e.tag == setup.grammar.arrow,
        Edit::Detach(e) => e.tag == setup.grammar.arrow,
        _ => false,
    });
    assert!(mentions_arrow, "declared unnamed token should be detached visibly");
}

#[test]
fn test_field_links_on_child_replacement() {
    let grammar = tokens().unwrap();
    // Production 1 declares child 0 as the `target` field.
    let old = NodeSpec::production(
        grammar.stmt,
        1,
        vec![NodeSpec::leaf(grammar.comment, "a"), NodeSpec::leaf(grammar.arrow, "->")],
    );
    let new = NodeSpec::production(
        grammar.stmt,
        1,
        vec![NodeSpec::leaf(grammar.name, "b"), NodeSpec::leaf(grammar.arrow, "->")],
    );
    let setup = diff_tokens(&old, &new);

    assert!(setup.outcome.success);
    let edits = setup.outcome.edit_script.edits();
    assert_eq!(edits.len(), 2);
    let Edit::DetachUnload(removed) = &edits[0] else { panic!("expected DETACH_UNLOAD") };
    let Edit::LoadAttach(added) = &edits[1] else { panic!("expected LOAD_ATTACH") };
    assert_eq!(removed.parent.unwrap().link, ChildLink::Field(setup.grammar.field_target));
    assert_eq!(added.parent.unwrap().link, ChildLink::Field(setup.grammar.field_target));
    // The stmt root survives with its identity (children were diffed in
    // place).
    let root_before = {
        let heap_id = setup.pool.get(setup.old_tree.root()).diff_heap().unwrap();
        setup.heaps.get(heap_id).unwrap().id
    };
    let root_after = {
        let heap_id = setup.pool.get(setup.outcome.tree.root()).diff_heap().unwrap();
        setup.heaps.get(heap_id).unwrap().id
    };
    assert_eq!(root_before, root_after);
}

#[test]
fn test_invisible_wrapper_never_appears() {
    let grammar = tokens().unwrap();
    let old = NodeSpec::node(
        grammar.stmt,
        vec![NodeSpec::node(grammar.wrapper, vec![NodeSpec::leaf(grammar.name, "a")])],
    );
    let new = NodeSpec::node(
        grammar.stmt,
        vec![
            NodeSpec::node(grammar.wrapper, vec![NodeSpec::leaf(grammar.name, "a")]),
            NodeSpec::leaf(grammar.arrow, "->"),
        ],
    );
    let setup = diff_tokens(&old, &new);

    for edit in &setup.outcome.edit_script {
        let tag = match edit {
            Edit::Update(e) => e.tag,
            Edit::Load(e) => e.tag,
            Edit::Attach(e) => e.tag,
            Edit::Detach(e) => e.tag,
            Edit::Unload(e) => e.tag,
            Edit::LoadAttach(e) => e.tag,
            Edit::DetachUnload(e) => e.tag,
        };
        assert_ne!(tag, setup.grammar.wrapper, "invisible node leaked into {edit:?}");
    }
}
