//! Integration Tests for View Binding
//!
//! These tests mount views on real markup and check that data writes,
//! input events and handlers flow through the bindings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use weave_core::dom::NodeId;
use weave_core::{Document, DirectiveTable, Error, Options, ReactiveObject, Value, View};

fn body(doc: &Document) -> String {
    doc.inner_html(doc.body())
}

fn mount(markup: &str, data: serde_json::Value) -> (Document, View) {
    let doc = Document::from_markup(markup).unwrap();
    let view = View::mount(&doc, Options::new().data(data)).unwrap();
    (doc, view)
}

/// Directive table with a `count` kind that counts its renders.
fn counting_table(renders: Arc<AtomicUsize>) -> DirectiveTable {
    let mut table = DirectiveTable::builtin();
    table.register("count", move |doc: &Document, node: NodeId, value: &Value| -> weave_core::Result<()> {
        renders.fetch_add(1, Ordering::SeqCst);
        doc.set_text_content(node, &value.to_display());
        Ok(())
    });
    table
}

/// Writing the same primitive twice re-renders only once.
#[test]
fn equal_write_does_not_rerender() {
    let renders = Arc::new(AtomicUsize::new(0));
    let doc = Document::from_markup(r#"<p v-count="n"></p>"#).unwrap();
    let options = Options::new()
        .data(json!({ "n": 1 }))
        .directives(counting_table(renders.clone()));
    let view = View::mount(&doc, options).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    assert!(view.set("n", 2).unwrap());
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    assert!(!view.set("n", 2).unwrap());
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    assert_eq!(body(&doc), "<p>2</p>");
}

/// After every write the bound text equals the written value.
#[test]
fn text_binding_converges() {
    let (doc, view) = mount(r#"<p v-text="word"></p>"#, json!({ "word": "a" }));
    for word in ["b", "c", "", "d & e"] {
        view.set("word", word).unwrap();
        let p = doc.query("p").unwrap();
        assert_eq!(doc.text_content(p), word);
    }
    assert_eq!(body(&doc), "<p>d &amp; e</p>");
}

/// Only cells actually read during recording become dependencies.
#[test]
fn recording_only_tracks_cells_that_were_read() {
    let (_doc, view) = mount("<p>{{ a }}</p>", json!({ "a": 1, "b": 2 }));

    let a = view.cell("a").unwrap();
    let b = view.cell("b").unwrap();
    assert_eq!(a.subscriber_count(), 1);
    assert_eq!(b.subscriber_count(), 0);
    assert!(view.dependents_of(b.id()).is_empty());

    let sub = view.subscriptions()[0].id();
    assert_eq!(view.dependencies_of(sub), vec![a.id()]);
}

/// An input event writes through to the raw data and the view accessor.
#[test]
fn two_way_binding_round_trip() {
    let data = ReactiveObject::observe(json!({ "field": "" }).as_object().cloned().unwrap());
    let doc = Document::from_markup(r#"<input v-model="field">"#).unwrap();
    let view = View::mount(&doc, Options::new().data_object(data.clone())).unwrap();

    let input = doc.query("input").unwrap();
    assert_eq!(doc.input(input, "typed"), 1);

    assert_eq!(data.get("field"), Some(Value::from("typed")));
    assert_eq!(view.get("field").unwrap(), Value::from("typed"));
    assert_eq!(doc.value(input).as_deref(), Some("typed"));
}

/// Directive attributes never reach the rendered output.
#[test]
fn directive_attributes_are_removed() {
    let (doc, view) = mount(
        r#"<div class="box" v-text="a" v-unknown="a" @click="missing"><i v-if="a">x</i></div>"#,
        json!({ "a": "A" }),
    );

    assert_eq!(view.subscription_count(), 1);
    assert_eq!(body(&doc), r#"<div class="box">A</div>"#);
    assert!(view.diagnostics().is_empty());
}

/// Unknown kinds are dropped even when nothing else binds the element.
#[test]
fn unknown_directive_produces_no_binding() {
    let (doc, view) = mount(r#"<i v-if="a">x</i>"#, json!({ "a": "A" }));
    assert_eq!(view.subscription_count(), 0);
    assert_eq!(body(&doc), "<i>x</i>");
}

#[test]
fn message_example() {
    let (doc, view) = mount(r#"<p>{{ msg }}</p><input v-model="msg">"#, json!({ "msg": "hi" }));
    let p = doc.query("p").unwrap();
    let input = doc.query("input").unwrap();

    assert_eq!(doc.text_content(p), "hi");
    assert_eq!(doc.value(input).as_deref(), Some("hi"));
    assert_eq!(view.subscription_count(), 2);

    view.set("msg", "bye").unwrap();
    assert_eq!(doc.text_content(p), "bye");
    assert_eq!(doc.value(input).as_deref(), Some("bye"));
    assert_eq!(view.cell("msg").unwrap().subscriber_count(), 2);

    doc.input(input, "yo");
    assert_eq!(view.data().get("msg"), Some(Value::from("yo")));
    assert_eq!(doc.text_content(p), "yo");
    assert_eq!(view.subscription_count(), 2);
    assert_eq!(doc.listener_count(input, "input"), 1);
}

/// Nested leaves update; a replaced mapping's new leaves are not followed.
#[test]
fn nested_path_and_replaced_mapping() {
    let (doc, view) = mount("<p>{{ user.name }}</p>", json!({ "user": { "name": "A" } }));
    let p = doc.query("p").unwrap();
    assert_eq!(doc.text_content(p), "A");

    view.set("user.name", "B").unwrap();
    assert_eq!(doc.text_content(p), "B");

    // The parent cell changed, so the binding renders the new leaf once.
    view.set("user", json!({ "name": "C" })).unwrap();
    assert_eq!(doc.text_content(p), "C");

    // The new leaf cell was never recorded.
    view.set("user.name", "D").unwrap();
    assert_eq!(view.get("user.name").unwrap(), Value::from("D"));
    assert_eq!(doc.text_content(p), "C");
}

#[test]
fn event_handlers_receive_the_view() {
    let doc = Document::from_markup(r#"<button @click="bump">+</button><b>{{ count }}</b>"#).unwrap();
    let options = Options::new().data(json!({ "count": 0 })).method("bump", |root, event| {
        assert_eq!(event.kind(), "click");
        let count = root.read("count").ok().and_then(|v| v.to_json().as_i64()).unwrap_or(0);
        root.write("count", count + 1).unwrap();
    });
    let view = View::mount(&doc, options).unwrap();

    let button = doc.query("button").unwrap();
    doc.dispatch(button, "click");
    doc.dispatch(button, "click");

    assert_eq!(view.get("count").unwrap(), Value::from(2));
    assert_eq!(body(&doc), "<button>+</button><b>2</b>");
}

#[test]
fn missing_mount_point_is_a_no_op() {
    let doc = Document::from_markup("<p>{{ msg }}</p>").unwrap();
    let view = View::mount(&doc, Options::new().el("#nowhere").data(json!({ "msg": "hi" }))).unwrap();

    assert_eq!(view.mount_point(), None);
    assert_eq!(view.subscription_count(), 0);
    assert_eq!(body(&doc), "<p>{{ msg }}</p>");

    view.set("msg", "bye").unwrap();
    assert_eq!(body(&doc), "<p>{{ msg }}</p>");
}

/// A broken expression skips that binding only.
#[test]
fn unresolved_path_is_reported_and_compile_continues() {
    let (doc, view) = mount(
        r#"<p v-text="user.name"></p><span>{{ ok }}</span>"#,
        json!({ "ok": "yes" }),
    );

    assert_eq!(view.subscription_count(), 1);
    assert_eq!(body(&doc), "<p></p><span>yes</span>");

    let errors = view.diagnostics().drain();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].expression, "user.name");
    assert!(matches!(
        &errors[0].source,
        Error::UnresolvedPath { segment, .. } if segment == "user"
    ));
}

/// One failing render does not stop sibling bindings from updating.
#[test]
fn failing_binding_is_isolated() {
    let mut table = DirectiveTable::builtin();
    table.register("strict", |doc: &Document, node: NodeId, value: &Value| -> weave_core::Result<()> {
        if value.as_str() == Some("boom") {
            return Err(Error::InvalidData("boom"));
        }
        doc.set_text_content(node, &value.to_display());
        Ok(())
    });

    let doc = Document::from_markup(r#"<p v-strict="msg"></p><span>{{ msg }}</span>"#).unwrap();
    let options = Options::new().data(json!({ "msg": "ok" })).directives(table);
    let view = View::mount(&doc, options).unwrap();
    assert!(view.diagnostics().is_empty());

    view.set("msg", "boom").unwrap();
    assert_eq!(body(&doc), "<p>ok</p><span>boom</span>");

    let messages = view.diagnostics().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("v-strict"), "{messages:?}");
}

/// Markup inserted by an html binding is itself compiled.
#[test]
fn html_binding_content_is_compiled() {
    let (doc, view) = mount(
        r#"<div v-html="tpl"></div>"#,
        json!({ "tpl": "<em v-text=\"who\"></em>", "who": "me" }),
    );

    assert_eq!(view.subscription_count(), 2);
    assert_eq!(body(&doc), "<div><em>me</em></div>");

    view.set("who", "you").unwrap();
    assert_eq!(body(&doc), "<div><em>you</em></div>");
}

/// Re-rendering element content does not grow the document.
#[test]
fn rerenders_keep_the_document_size_flat() {
    let (doc, view) = mount(
        r#"<p v-text="n"></p><div v-html="h"></div>"#,
        json!({ "n": 0, "h": "<b>0</b>" }),
    );
    let nodes = doc.len();

    for i in 1..=500 {
        view.set("n", i).unwrap();
        view.set("h", format!("<b>{i}</b>")).unwrap();
    }

    assert_eq!(doc.len(), nodes);
    assert_eq!(body(&doc), "<p>500</p><div><b>500</b></div>");
}

/// HTML named references work in html bindings and in page markup.
#[test]
fn html_entities_render() {
    let (doc, view) = mount(
        r#"<p>a&nbsp;b</p><div v-html="h"></div>"#,
        json!({ "h": "x&nbsp;y &unknown;" }),
    );

    assert!(view.diagnostics().is_empty(), "{:?}", view.diagnostics().messages());
    assert_eq!(doc.text_content(doc.query("p").unwrap()), "a\u{a0}b");
    assert_eq!(doc.text_content(doc.query("div").unwrap()), "x\u{a0}y &unknown;");
}

#[test]
fn options_from_json() {
    let doc = Document::from_markup(r#"<main><p>{{ a.b }}</p></main>"#).unwrap();
    let options = Options::from_json(r#"{ "el": "main", "data": { "a": { "b": 7 } } }"#).unwrap();
    let view = View::mount(&doc, options).unwrap();

    assert_eq!(view.mount_point(), doc.query("main"));
    assert_eq!(body(&doc), "<main><p>7</p></main>");
}

/// Writes from another thread re-render synchronously on that thread.
#[test]
fn views_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<View>();

    let (doc, view) = mount("<p>{{ n }}</p>", json!({ "n": 0 }));
    std::thread::scope(|scope| {
        for n in 1..=4 {
            let view = &view;
            scope.spawn(move || view.set("n", n).unwrap());
        }
    });

    let rendered = doc.text_content(doc.query("p").unwrap());
    assert_eq!(Value::from(rendered.parse::<i64>().unwrap()), view.get("n").unwrap());
}
