//! Longer editing sequences through a document
//!
//! This tests:
//! - Move + update + delete chains
//! - Rejected steps in the middle of a sequence
//! - Document integrity after every step

use easel_editor::{Document, EditorError, ElementUpdate, Mutation, MutationError};
use easel_model::{traverse, App, Element, KindRegistry, Properties, PropertyValue, Screen};

fn document() -> Document {
    let registry = KindRegistry::with_builtins();
    let mut app = App::new("deck", "Deck");
    let mut intro = Screen::new("intro", "Intro");
    let mut slides = registry.create("slides", "slides".into()).unwrap();
    for i in 0..3 {
        let mut slide = registry.create("container", format!("slide-{}", i).into()).unwrap();
        slide
            .children
            .get_or_insert_with(Vec::new)
            .push(registry.create("text", format!("title-{}", i).into()).unwrap());
        slides.children.get_or_insert_with(Vec::new).push(slide);
    }
    intro.elements.push(slides);
    app.screens.push(intro);
    Document::new(app).unwrap()
}

fn assert_integrity(doc: &Document) {
    assert!(
        traverse::duplicate_ids(doc.elements()).is_empty(),
        "duplicate ids after version {}",
        doc.version
    );
}

#[test]
fn test_move_then_delete_sequence() {
    let mut doc = document();

    doc.apply(Mutation::MoveIntoContainer {
        element_id: "title-2".into(),
        container_id: "slide-0".into(),
    })
    .unwrap();
    assert_integrity(&doc);

    doc.apply(Mutation::RemoveElement {
        target_id: "slide-0".into(),
    })
    .unwrap();
    assert_integrity(&doc);

    assert!(doc.find("title-2").is_none());
    assert!(doc.find("title-0").is_none());
    assert!(doc.find("slide-2").unwrap().children().is_empty());
    assert_eq!(doc.version, 2);
}

#[test]
fn test_rejected_step_leaves_document_intact() {
    let mut doc = document();
    let before = doc.elements().to_vec();

    let steps = vec![
        Mutation::MoveIntoContainer {
            element_id: "slides".into(),
            container_id: "slide-1".into(),
        },
        Mutation::MoveIntoContainer {
            element_id: "slide-1".into(),
            container_id: "title-0".into(),
        },
        Mutation::InsertRoot {
            element: Element::new("title-1", "text"),
        },
        Mutation::UpdateElement {
            target_id: "ghost".into(),
            update: ElementUpdate::default(),
        },
    ];

    for step in steps {
        let err = doc.apply(step).unwrap_err();
        assert!(err.is_rejected_mutation(), "{}", err);
    }

    assert_eq!(doc.elements(), before.as_slice());
    assert_eq!(doc.version, 0);
}

#[test]
fn test_reorder_slides_by_moving_to_root_and_back() {
    let mut doc = document();

    doc.apply(Mutation::MoveToRoot {
        element_id: "slide-0".into(),
    })
    .unwrap();
    doc.apply(Mutation::MoveIntoContainer {
        element_id: "slide-0".into(),
        container_id: "slides".into(),
    })
    .unwrap();
    assert_integrity(&doc);

    let order: Vec<&str> = doc
        .find("slides")
        .unwrap()
        .children()
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(order, vec!["slide-1", "slide-2", "slide-0"]);
}

#[test]
fn test_update_then_replace_children() {
    let mut doc = document();

    let mut props = Properties::new();
    props.insert("text".into(), PropertyValue::from("Welcome"));
    doc.apply(Mutation::UpdateElement {
        target_id: "title-0".into(),
        update: ElementUpdate::properties(props),
    })
    .unwrap();

    // Replacing children may reuse ids of the replaced subtree only
    let update = ElementUpdate {
        children: Some(Some(vec![Element::new("title-1", "text")])),
        ..ElementUpdate::default()
    };
    let err = doc
        .apply(Mutation::UpdateElement {
            target_id: "slide-0".into(),
            update,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Mutation(MutationError::DuplicateId(_))
    ));

    let update = ElementUpdate {
        children: Some(Some(vec![Element::new("title-0", "text")])),
        ..ElementUpdate::default()
    };
    doc.apply(Mutation::UpdateElement {
        target_id: "slide-0".into(),
        update,
    })
    .unwrap();

    let title = doc.find("title-0").unwrap();
    assert!(title.property("text").is_none());
    assert_integrity(&doc);
}
