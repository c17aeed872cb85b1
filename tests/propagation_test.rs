/// Event propagation through the view tree:
/// - dispatch walks from the target up to the root
/// - stopping propagation cuts the walk at the current view
/// - broadcasts visit a subtree level by level and cannot be stopped
use std::cell::RefCell;
use std::rc::Rc;

use trellis::{Capabilities, IdGenerator, Listener, TreeError, View, ViewEvent, ViewId, ViewType};

type Log = Rc<RefCell<Vec<(ViewId, Option<ViewId>)>>>;

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn kind() -> ViewType {
    ViewType::builder("node", &IdGenerator::new())
        .capabilities(Capabilities::standard())
        .build()
}

/// root > mid > leaf
fn chain() -> (View, View, View) {
    let kind = kind();
    let root = kind.create().unwrap();
    let mid = kind.create().unwrap();
    let leaf = kind.create().unwrap();
    root.append(&mid).at_root().unwrap();
    mid.append(&leaf).at_root().unwrap();
    (root, mid, leaf)
}

fn record(view: &View, event_type: &str, log: &Log) {
    let log = Rc::clone(log);
    view.on(
        event_type,
        Listener::new(move |this, event| {
            log.borrow_mut()
                .push((this.id(), event.current_target().map(View::id)));
            Ok(())
        }),
    )
    .unwrap();
}

// --- dispatch ---

#[test]
fn dispatch_reaches_every_ancestor_in_order() {
    init_tracing();
    let (root, mid, leaf) = chain();
    let log = Log::default();
    for view in [&root, &mid, &leaf] {
        record(view, "select", &log);
    }

    let mut event = ViewEvent::new("select").bubbling();
    leaf.dispatch_event(&mut event).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (leaf.id(), Some(leaf.id())),
            (mid.id(), Some(mid.id())),
            (root.id(), Some(root.id())),
        ]
    );
    assert_eq!(event.target(), Some(&leaf));
    assert!(event.current_target().is_none());
}

#[test]
fn stop_propagation_halts_at_the_current_view() {
    let (root, mid, leaf) = chain();
    let log = Log::default();
    record(&leaf, "select", &log);
    record(&root, "select", &log);
    let stopper = Rc::clone(&log);
    mid.on(
        "select",
        Listener::new(move |this, event| {
            stopper.borrow_mut().push((this.id(), None));
            event.stop_propagation()?;
            Ok(())
        }),
    )
    .unwrap();

    leaf.dispatch_event(&mut ViewEvent::new("select").bubbling())
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![(leaf.id(), Some(leaf.id())), (mid.id(), None)]
    );
}

#[test]
fn non_bubbling_events_stay_on_the_target() {
    let (root, mid, leaf) = chain();
    let log = Log::default();
    for view in [&root, &mid, &leaf] {
        record(view, "focus", &log);
    }

    mid.dispatch_event(&mut ViewEvent::new("focus")).unwrap();

    assert_eq!(*log.borrow(), vec![(mid.id(), Some(mid.id()))]);
}

#[test]
fn event_types_are_matched_case_insensitively() {
    let (root, _mid, leaf) = chain();
    let log = Log::default();
    record(&root, "Select", &log);

    let mut event = ViewEvent::new("SELECT").bubbling();
    leaf.dispatch_event(&mut event).unwrap();

    assert_eq!(event.event_type(), "select");
    assert_eq!(*log.borrow(), vec![(root.id(), Some(root.id()))]);
}

#[test]
fn prevent_default_is_reported_to_the_dispatcher() {
    let (root, _mid, leaf) = chain();
    root.on(
        "submit",
        Listener::new(|_, event| {
            event.prevent_default();
            Ok(())
        }),
    )
    .unwrap();

    let mut plain = ViewEvent::new("submit").bubbling();
    assert!(!leaf.dispatch_event(&mut plain).unwrap());

    let mut cancelable = ViewEvent::new("submit").bubbling().cancelable();
    assert!(leaf.dispatch_event(&mut cancelable).unwrap());
    assert!(cancelable.default_prevented());
}

#[test]
fn detaching_during_dispatch_ends_the_walk() {
    let (root, mid, leaf) = chain();
    let log = Log::default();
    record(&root, "close", &log);
    mid.on(
        "close",
        Listener::new(|this, _| {
            this.detach()?;
            Ok(())
        }),
    )
    .unwrap();

    leaf.dispatch_event(&mut ViewEvent::new("close").bubbling())
        .unwrap();

    assert!(log.borrow().is_empty());
    assert!(mid.parent().is_none());
    assert!(root.children().is_empty());
}

#[test]
fn listener_failures_surface_to_the_dispatcher() {
    let (_root, mid, leaf) = chain();
    mid.on(
        "save",
        Listener::new(|_, _| Err(anyhow::anyhow!("disk full"))),
    )
    .unwrap();

    let err = leaf
        .dispatch_event(&mut ViewEvent::new("save").bubbling())
        .unwrap_err();

    match err {
        TreeError::Listener { event_type, source } => {
            assert_eq!(event_type, "save");
            assert_eq!(source.to_string(), "disk full");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_events_without_a_type() {
    let (_root, _mid, leaf) = chain();
    let err = leaf.dispatch_event(&mut ViewEvent::default()).unwrap_err();
    assert!(matches!(err, TreeError::MissingEventType));
}

// --- broadcast ---

#[test]
fn broadcast_visits_levels_top_down() {
    let kind = kind();
    let top = kind.create().unwrap();
    let left = kind.create().unwrap();
    let right = kind.create().unwrap();
    let left_leaf = kind.create().unwrap();
    let right_leaf = kind.create().unwrap();
    top.append(&left).at_root().unwrap();
    top.append(&right).at_root().unwrap();
    left.append(&left_leaf).at_root().unwrap();
    right.append(&right_leaf).at_root().unwrap();

    let log = Log::default();
    for view in [&right_leaf, &left_leaf, &right, &left, &top] {
        record(view, "refresh", &log);
    }

    top.broadcast(&mut ViewEvent::new("refresh")).unwrap();

    let order: Vec<ViewId> = log.borrow().iter().map(|(id, _)| *id).collect();
    assert_eq!(
        order,
        vec![
            top.id(),
            left.id(),
            right.id(),
            left_leaf.id(),
            right_leaf.id()
        ]
    );
}

#[test]
fn broadcast_never_reaches_ancestors() {
    let (root, mid, leaf) = chain();
    let log = Log::default();
    for view in [&root, &mid, &leaf] {
        record(view, "refresh", &log);
    }

    mid.broadcast(&mut ViewEvent::new("refresh")).unwrap();

    let order: Vec<ViewId> = log.borrow().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![mid.id(), leaf.id()]);
}

#[test]
fn bubbling_broadcasts_are_rejected_before_any_listener_runs() {
    let (root, _mid, _leaf) = chain();
    let log = Log::default();
    record(&root, "refresh", &log);

    let err = root
        .broadcast(&mut ViewEvent::new("refresh").bubbling())
        .unwrap_err();

    assert!(matches!(err, TreeError::BubblingBroadcast));
    assert!(log.borrow().is_empty());
}

#[test]
fn broadcasts_cannot_be_stopped() {
    let (root, mid, leaf) = chain();
    let log = Log::default();
    record(&leaf, "refresh", &log);
    mid.on(
        "refresh",
        Listener::new(|_, event| {
            event.stop_propagation()?;
            Ok(())
        }),
    )
    .unwrap();

    let err = root.broadcast(&mut ViewEvent::new("refresh")).unwrap_err();

    assert!(matches!(
        err.listener_cause(),
        Some(TreeError::UnstoppableBroadcast)
    ));
    assert!(log.borrow().is_empty());
}
