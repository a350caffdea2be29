//! Structural invariants of the tree mutator

use easel_editor::{
    insert_into_container, insert_root, move_into_container, move_to_root, remove_element,
    update_element, ElementUpdate, MutationError,
};
use easel_model::{traverse, Element, ElementId};

/// page
/// ├── header
/// │   └── logo
/// └── body
///     ├── card
///     │   └── price
///     └── note
/// footer
fn forest() -> Vec<Element> {
    vec![
        Element::container("page", "container")
            .with_child(
                Element::container("header", "container").with_child(Element::new("logo", "image")),
            )
            .with_child(
                Element::container("body", "container")
                    .with_child(
                        Element::container("card", "container")
                            .with_child(Element::new("price", "text").with_property("text", "9")),
                    )
                    .with_child(Element::new("note", "text")),
            ),
        Element::new("footer", "text"),
    ]
}

fn ids(forest: &[Element]) -> Vec<String> {
    traverse::collect_ids(forest)
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn test_remove_missing_id_is_noop() {
    for missing in ["ghost", "", "PAGE", "price "] {
        let mut tree = forest();
        let before = tree.clone();
        let result = remove_element(&mut tree, &ElementId::from(missing));
        assert_eq!(result, Err(MutationError::TargetNotFound(missing.into())));
        assert_eq!(tree, before);
    }
}

#[test]
fn test_move_into_self_is_noop_for_every_element() {
    let base = forest();
    for id in traverse::collect_ids(&base) {
        let mut tree = base.clone();
        let result = move_into_container(&mut tree, &id, &id);
        assert!(
            matches!(result, Err(MutationError::CycleDetected { .. })),
            "{} moved into itself",
            id
        );
        assert_eq!(tree, base);
    }
}

#[test]
fn test_move_container_into_own_child_rejected() {
    let mut tree = forest();
    let before = tree.clone();

    let result = move_into_container(&mut tree, &"body".into(), &"card".into());

    assert_eq!(
        result,
        Err(MutationError::CycleDetected {
            element_id: "body".into(),
            container_id: "card".into(),
        })
    );
    assert_eq!(tree, before);
}

#[test]
fn test_move_into_any_descendant_rejected() {
    let base = forest();
    for ancestor in traverse::flatten(&base) {
        for descendant in traverse::flatten(ancestor.children()) {
            let mut tree = base.clone();
            let result = move_into_container(&mut tree, &ancestor.id, &descendant.id);
            assert!(result.is_err(), "{} into {}", ancestor.id, descendant.id);
            assert_eq!(tree, base);
        }
    }
}

#[test]
fn test_remove_then_reinsert_round_trips() {
    let mut tree = forest();
    let removed = remove_element(&mut tree, &"page".into()).unwrap();
    assert_eq!(ids(&tree), vec!["footer"]);

    insert_root(&mut tree, removed.clone()).unwrap();

    // Same subtree, now after footer
    assert_eq!(tree[1], removed);
    assert_eq!(tree[1], forest()[0]);
    assert_eq!(traverse::flatten(&tree).len(), traverse::flatten(&forest()).len());
}

#[test]
fn test_reinsert_nested_subtree_preserves_order() {
    let mut tree = forest();
    let card = remove_element(&mut tree, &"card".into()).unwrap();
    insert_into_container(&mut tree, &"body".into(), card).unwrap();

    assert_eq!(
        ids(&tree),
        vec!["page", "header", "logo", "body", "note", "card", "price", "footer"]
    );
}

#[test]
fn test_move_never_duplicates_or_loses() {
    let mut tree = forest();
    let count = traverse::flatten(&tree).len();

    move_into_container(&mut tree, &"card".into(), &"header".into()).unwrap();
    move_to_root(&mut tree, &"logo".into()).unwrap();
    move_into_container(&mut tree, &"footer".into(), &"card".into()).unwrap();

    assert_eq!(traverse::flatten(&tree).len(), count);
    assert!(traverse::duplicate_ids(&tree).is_empty());
    assert_eq!(
        ids(&tree),
        vec!["page", "header", "card", "price", "footer", "body", "note", "logo"]
    );
}

#[test]
fn test_insert_duplicate_anywhere_rejected() {
    let mut tree = forest();
    let before = tree.clone();
    for id in ["page", "logo", "price"] {
        assert_eq!(
            insert_root(&mut tree, Element::new(id, "text")),
            Err(MutationError::DuplicateId(id.into()))
        );
        assert_eq!(
            insert_into_container(&mut tree, &"card".into(), Element::new(id, "text")),
            Err(MutationError::DuplicateId(id.into()))
        );
    }
    assert_eq!(tree, before);
}

#[test]
fn test_update_clears_conditions() {
    let mut tree = forest();
    update_element(
        &mut tree,
        &"note".into(),
        &ElementUpdate::conditions(
            easel_model::RenderType::Conditional,
            Some(vec![easel_model::Condition::new(serde_json::json!(true))]),
        ),
    )
    .unwrap();
    assert!(traverse::find(&tree, "note").unwrap().is_conditional());

    update_element(
        &mut tree,
        &"note".into(),
        &ElementUpdate::conditions(easel_model::RenderType::Static, None),
    )
    .unwrap();
    let note = traverse::find(&tree, "note").unwrap();
    assert!(!note.is_conditional());
    assert!(note.conditions.is_none());
}
