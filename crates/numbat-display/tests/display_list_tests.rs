//! Integration tests for flattening the primitive tree.

use std::rc::Rc;

use numbat_common::Fx;
use numbat_css::Rgba;
use numbat_display::{
    DisplayCommand, DisplayList, DisplayTree, FixedPitchFont, LayoutRect, PrimitiveKind,
};

fn rect(x: i32, y: i32, w: i32, h: i32) -> LayoutRect {
    LayoutRect::new(x.into(), y.into(), w.into(), h.into())
}

#[test]
fn test_children_are_offset_by_parent() {
    let mut tree = DisplayTree::new();
    let outer = tree
        .create_rect(None, rect(10, 20, 100, 50), [Fx::ZERO; 4], Rgba::WHITE)
        .unwrap();
    let font = Rc::new(FixedPitchFont::new(Fx::from_whole(10), 400));
    let text = tree
        .create_text(Some(outer), rect(5, 5, 90, 10), font, Rgba::BLACK)
        .unwrap();
    let _ = tree.update_text(text, "hey", Fx::from_whole(90)).unwrap();

    let list = DisplayList::from_tree(&tree);
    assert_eq!(list.len(), 2);
    match &list.commands()[1] {
        DisplayCommand::DrawText {
            x, y, baseline, text, ..
        } => {
            assert_eq!(*x, Fx::from_whole(15));
            assert_eq!(*y, Fx::from_whole(25));
            assert_eq!(*baseline, Fx::from_whole(33));
            assert_eq!(text, "hey");
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_deferred_images_are_not_drawn() {
    let mut tree = DisplayTree::new();
    let _ = tree
        .create_image(None, rect(0, 0, 0, 0), "a.png".into(), true)
        .unwrap();
    let _ = tree
        .create_image(None, rect(0, 0, 4, 4), "b.png".into(), false)
        .unwrap();

    let list = DisplayList::from_tree(&tree);
    assert_eq!(list.len(), 1);
    assert!(matches!(
        &list.commands()[0],
        DisplayCommand::DrawImage { src, .. } if src == "b.png"
    ));
}

#[test]
fn test_tree_view_serializes_nested() {
    let mut tree = DisplayTree::new();
    let outer = tree
        .create_rect(None, rect(0, 0, 8, 8), [Fx::ZERO; 4], Rgba::BLACK)
        .unwrap();
    let _ = tree
        .create_rect(Some(outer), rect(1, 1, 2, 2), [Fx::from_whole(1); 4], Rgba::WHITE)
        .unwrap();
    tree.tag_id(outer, "box");

    let json = serde_json::to_value(tree.view()).unwrap();
    assert_eq!(json[0]["kind"], "rect");
    assert_eq!(json[0]["id_tag"], "box");
    assert_eq!(json[0]["children"][0]["bbox"]["x"], 1);
    assert!(matches!(
        tree.get(outer).map(|p| &p.kind),
        Some(PrimitiveKind::Rect { .. })
    ));
}
