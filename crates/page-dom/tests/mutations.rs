//! Mutation stream and event dispatch, exercised through the public handle

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use page_dom::{Document, Event, MutationKind};

#[tokio::test]
async fn test_observer_sees_child_list_and_attribute_changes() {
    let doc = Document::new();
    let mut rx = doc.observe();

    let div = doc.build("div").build().unwrap();
    doc.append_child(doc.body(), div).unwrap();
    doc.set_attribute(div, "id", "composer-background").unwrap();
    doc.remove(div).unwrap();

    let added = rx.recv().await.unwrap();
    assert_eq!(added.target, doc.body());
    assert_eq!(
        added.kind,
        MutationKind::ChildList {
            added: vec![div],
            removed: vec![]
        }
    );

    let attr = rx.recv().await.unwrap();
    assert_eq!(
        attr.kind,
        MutationKind::Attributes {
            name: "id".to_string()
        }
    );

    let removed = rx.recv().await.unwrap();
    assert!(matches!(removed.kind, MutationKind::ChildList { ref removed, .. } if removed == &vec![div]));
}

#[tokio::test]
async fn test_dropped_observer_is_pruned() {
    let doc = Document::new();
    let rx = doc.observe();
    drop(rx);
    let mut live = doc.observe();

    let p = doc.create_element("p");
    doc.append_child(doc.body(), p).unwrap();
    assert!(live.recv().await.is_some());
}

#[test]
fn test_event_bubbles_and_stops() {
    let doc = Document::new();
    let form = doc.build("form").append_to(doc.body()).unwrap();
    let button = doc.build("button").append_to(form).unwrap();

    let form_hits = Arc::new(AtomicUsize::new(0));
    let body_hits = Arc::new(AtomicUsize::new(0));

    let hits = form_hits.clone();
    doc.add_event_listener(form, "click", move |event| {
        hits.fetch_add(1, Ordering::SeqCst);
        event.stop_propagation();
    });
    let hits = body_hits.clone();
    doc.add_event_listener(doc.body(), "click", move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    let event = doc.click(button);
    assert_eq!(event.target, button);
    assert_eq!(form_hits.load(Ordering::SeqCst), 1);
    assert_eq!(body_hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_may_mutate_document() {
    let doc = Document::new();
    let button = doc.build("button").append_to(doc.body()).unwrap();

    let handle = doc.clone();
    doc.add_event_listener(button, "click", move |event| {
        event.prevent_default();
        let note = handle.create_text("clicked");
        handle.append_child(handle.body(), note).unwrap();
    });

    let event = doc.dispatch_event(button, Event::click());
    assert!(event.default_prevented());
    assert_eq!(doc.text_content(doc.body()), "clicked");
}

#[test]
fn test_queries() {
    let doc = Document::new();
    let form = doc.build("form").class("w-full").append_to(doc.body()).unwrap();
    let bar = doc.build("div").class("query-bar").append_to(form).unwrap();
    let textarea = doc
        .build("textarea")
        .attr("aria-label", "Ask Grok anything")
        .append_to(bar)
        .unwrap();
    let editor = doc
        .build("div")
        .attr("contenteditable", "true")
        .append_to(bar)
        .unwrap();

    assert_eq!(
        doc.query_selector("form .query-bar > textarea").unwrap(),
        Some(textarea)
    );
    assert_eq!(
        doc.query_selector(r#"textarea[aria-label*="Grok"]"#).unwrap(),
        Some(textarea)
    );
    assert_eq!(doc.query_selector("form > textarea").unwrap(), None);
    assert_eq!(
        doc.query_selector_all("textarea, [contenteditable=\"true\"]").unwrap(),
        vec![textarea, editor]
    );
    assert_eq!(doc.closest(editor, "form.w-full").unwrap(), Some(form));
    assert!(doc.query_selector("div:first-child").is_err());
}

#[test]
fn test_cleared_listeners_stop_firing() {
    let doc = Document::new();
    let bar = doc.build("div").append_to(doc.body()).unwrap();
    let button = doc.build("button").append_to(bar).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();
    doc.add_event_listener(button, "click", move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    doc.click(button);
    assert_eq!(doc.listener_count(), 1);
    doc.clear_event_listeners(bar);
    doc.click(button);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn test_weak_handle_does_not_keep_document_alive() {
    let doc = Document::new();
    let weak = doc.downgrade();
    assert!(weak.upgrade().is_some_and(|d| d.same_document(&doc)));
    drop(doc);
    assert!(weak.upgrade().is_none());
}
