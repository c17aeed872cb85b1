use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kuchiki::parse_html;
use kuchiki::traits::*;
use trellis::{
    Capabilities, DocumentTracking, IdGenerator, Listener, NativeNode, TreeError, View, ViewType,
};

fn kind(ids: &IdGenerator) -> ViewType {
    ViewType::builder("node", ids)
        .capabilities(Capabilities::standard())
        .build()
}

fn host_document() -> (NativeNode, NativeNode) {
    let document = parse_html().one("<html><body><div id='mount'></div></body></html>");
    let mount = document
        .select_first("#mount")
        .expect("mount")
        .as_node()
        .clone();
    (document, mount)
}

fn assert_biconsistent(views: &[&View]) {
    for parent in views {
        for candidate in views {
            let listed = parent.children().contains(candidate);
            let linked = candidate.parent().as_ref() == Some(*parent);
            assert_eq!(
                listed,
                linked,
                "{:?} / {:?} disagree about their relationship",
                parent.id(),
                candidate.id()
            );
        }
    }
}

fn record_events(view: &View, event_type: &str, log: &Rc<RefCell<Vec<String>>>) {
    let log = Rc::clone(log);
    let label = event_type.to_string();
    view.on(
        event_type,
        Listener::new(move |this, _| {
            log.borrow_mut().push(format!("{label} {}", this.id()));
            Ok(())
        }),
    )
    .expect("listener");
}

#[test]
fn append_links_both_directions_and_moves_native_roots() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let parent = kind.create().unwrap();
    let first = kind.create().unwrap();
    let second = kind.create().unwrap();

    parent.append(&first).at_root().unwrap();
    parent.append(&second).at_root().unwrap();

    assert_eq!(parent.children(), vec![first.clone(), second.clone()]);
    let parent_root = parent.root().unwrap();
    assert_eq!(first.root().unwrap().parent(), Some(parent_root.clone()));
    assert_eq!(second.root().unwrap().parent(), Some(parent_root));
    assert_biconsistent(&[&parent, &first, &second]);

    first.detach().unwrap();
    assert_eq!(parent.children(), vec![second.clone()]);
    assert!(first.root().unwrap().parent().is_none());
    assert_biconsistent(&[&parent, &first, &second]);
}

#[test]
fn reparenting_detaches_exactly_once() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let old_parent = kind.create().unwrap();
    let new_parent = kind.create().unwrap();
    let child = kind.create().unwrap();
    old_parent.append(&child).at_root().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    record_events(&child, "detach", &log);
    record_events(&new_parent, "child", &log);

    new_parent.append(&child).at_root().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            format!("detach {}", child.id()),
            format!("child {}", new_parent.id())
        ]
    );
    assert!(old_parent.children().is_empty());
    assert_eq!(new_parent.children(), vec![child.clone()]);
    assert_biconsistent(&[&old_parent, &new_parent, &child]);
}

#[test]
fn child_event_bubbles_to_ancestors_with_the_new_child() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let top = kind.create().unwrap();
    let parent = kind.create().unwrap();
    let child = kind.create().unwrap();
    top.append(&parent).at_root().unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    top.on(
        "child",
        Listener::new(move |_, event| {
            sink.borrow_mut().push((
                event.target().map(View::id),
                event.related().map(View::id),
            ));
            Ok(())
        }),
    )
    .unwrap();

    parent.append(&child).at_root().unwrap();

    assert_eq!(*seen.borrow(), vec![(Some(parent.id()), Some(child.id()))]);
}

#[test]
fn single_node_sequences_work_like_nodes() {
    let ids = IdGenerator::new();
    let list_kind = ViewType::builder("list", &ids)
        .template("<section><ul class='slot'></ul></section>")
        .capabilities(Capabilities::standard())
        .build();
    let item_kind = kind(&ids);

    let wrapped = list_kind.create().unwrap();
    let plain = list_kind.create().unwrap();
    let a = item_kind.create().unwrap();
    let b = item_kind.create().unwrap();

    wrapped.append(&a).at(wrapped.find(".slot").unwrap()).unwrap();
    let slot = plain.find(".slot").unwrap().remove(0);
    plain.append(&b).at(slot.clone()).unwrap();

    assert_eq!(wrapped.children(), vec![a.clone()]);
    assert_eq!(plain.children(), vec![b.clone()]);
    let wrapped_slot = wrapped.find(".slot").unwrap().remove(0);
    assert_eq!(a.root().unwrap().parent(), Some(wrapped_slot));
    assert_eq!(b.root().unwrap().parent(), Some(slot));
}

#[test]
fn rejects_locations_that_are_not_element_handles() {
    let ids = IdGenerator::new();
    let kind = ViewType::builder("text", &ids)
        .template("<p>hello</p>")
        .capabilities(Capabilities::standard())
        .build();
    let parent = kind.create().unwrap();
    let child = kind.create().unwrap();
    let text = parent.root().unwrap().first_child().unwrap();

    let err = parent.append(&child).at(text).unwrap_err();
    assert!(matches!(err, TreeError::InvalidInsertionPoint(_)));

    let err = parent.append(&child).at(Vec::<NativeNode>::new()).unwrap_err();
    assert!(matches!(err, TreeError::InvalidInsertionPoint(_)));
    assert!(parent.children().is_empty());
}

#[test]
fn rejects_cycles() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let top = kind.create().unwrap();
    let mid = kind.create().unwrap();
    let leaf = kind.create().unwrap();
    top.append(&mid).at_root().unwrap();
    mid.append(&leaf).at_root().unwrap();

    assert!(matches!(
        leaf.append(&top).at_root(),
        Err(TreeError::WouldCycle { .. })
    ));
    assert!(matches!(
        top.append(&top).at_root(),
        Err(TreeError::WouldCycle { .. })
    ));
    // Inserting a foreign view inside a node that belongs to `leaf`.
    assert!(matches!(
        top.append(&mid).at(leaf.root().unwrap()),
        Err(TreeError::WouldCycle { .. })
    ));
    assert_eq!(top.children(), vec![mid.clone()]);
    assert_biconsistent(&[&top, &mid, &leaf]);
}

#[test]
fn children_inherit_document_flag_at_attach_time() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let (_document, mount) = host_document();
    let page = kind.adopt(mount).unwrap();
    let panel = kind.create().unwrap();
    let button = kind.create().unwrap();
    panel.append(&button).at_root().unwrap();

    assert!(page.is_in_document());
    assert!(!panel.is_in_document());

    page.append(&panel).at_root().unwrap();

    assert!(panel.is_in_document());
    // Inherit mode does not walk further down.
    assert!(!button.is_in_document());

    panel.detach().unwrap();
    assert!(!panel.is_in_document());
}

#[test]
fn broadcast_tracking_marks_and_notifies_the_subtree() {
    let ids = IdGenerator::new();
    let kind = ViewType::builder("tracked", &ids)
        .capabilities(Capabilities::standard())
        .document_tracking(DocumentTracking::Broadcast)
        .build();
    let (_document, mount) = host_document();
    let page = kind.adopt(mount).unwrap();
    let panel = kind.create().unwrap();
    let button = kind.create().unwrap();
    panel.append(&button).at_root().unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    record_events(&panel, "document", &log);
    record_events(&button, "document", &log);

    page.append(&panel).at_root().unwrap();

    assert!(panel.is_in_document());
    assert!(button.is_in_document());
    assert_eq!(
        *log.borrow(),
        vec![
            format!("document {}", panel.id()),
            format!("document {}", button.id())
        ]
    );
}

#[test]
fn appends_without_emitter_fail_before_mutating() {
    let ids = IdGenerator::new();
    let bare = ViewType::builder("bare", &ids).build();
    let parent = bare.create().unwrap();
    let child = bare.create().unwrap();

    let err = parent.append(&child).at_root().unwrap_err();

    assert!(matches!(err, TreeError::MissingCapability("emit")));
    assert!(child.parent().is_none());
    assert!(child.root().unwrap().parent().is_none());
}

#[test]
fn moves_fail_when_a_detach_listener_reattaches_the_child() {
    let ids = IdGenerator::new();
    let kind = kind(&ids);
    let first = kind.create().unwrap();
    let second = kind.create().unwrap();
    let rescuer = kind.create().unwrap();
    let child = kind.create().unwrap();
    first.append(&child).at_root().unwrap();

    let fired = Rc::new(Cell::new(false));
    let once = Rc::clone(&fired);
    let shelter = rescuer.clone();
    child
        .on(
            "detach",
            Listener::new(move |this, _| {
                if !once.replace(true) {
                    shelter.append(this).at_root()?;
                }
                Ok(())
            }),
        )
        .unwrap();

    let err = second.append(&child).at_root().unwrap_err();

    assert!(matches!(err, TreeError::Reattached(id) if id == child.id()));
    assert!(fired.get());
    assert_eq!(child.parent(), Some(rescuer.clone()));
    assert_eq!(rescuer.children(), vec![child.clone()]);
    assert!(second.children().is_empty());
    assert!(first.children().is_empty());
    assert_biconsistent(&[&first, &second, &rescuer, &child]);
}
