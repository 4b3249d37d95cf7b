//! Edge-case tests for domkit
//!
//! Malformed selector shapes, borderline identifier windows, and the
//! less-traveled container operations.

use domkit::{Content, DomTools, QueryError};

fn tools_with(html: &str) -> DomTools {
    DomTools::from_html(html, "about:blank").unwrap()
}

#[test]
fn test_empty_selector_is_empty_result() {
    let tools = tools_with("<div></div>");
    let result = tools.query("").unwrap();
    assert!(result.is_empty());

    tools.configure(|config| config.fail_fast = true);
    assert!(tools.query("").is_err());
}

#[test]
fn test_bare_sigils_fall_through() {
    let tools = tools_with("<div class=x id=y></div>");
    // "." and "#" alone have empty identifier windows; both end up at the
    // general query, which rejects them
    assert!(tools.query(".").unwrap().is_empty());
    assert!(tools.query("#").unwrap().is_empty());
    assert!(tools.query("<>").unwrap().is_empty());
}

#[test]
fn test_malformed_name_shapes() {
    let tools = tools_with(r#"<input name="q"><input name="q extra">"#);

    // exact shape: fine
    assert_eq!(tools.query("[name=q]").unwrap().len(), 1);

    // unterminated quote must not mis-extract a window
    assert!(tools.query(r#"[name="q]"#).unwrap().is_empty());

    // a non-identifier value defers to the general query, which can
    // still match it
    assert_eq!(tools.query(r#"[name="q extra"]"#).unwrap().len(), 1);

    // a different attribute is not the name fast path, but the general
    // query handles it
    let tools2 = tools_with(r#"<input id="q">"#);
    assert_eq!(tools2.query("[id=q]").unwrap().len(), 1);
}

#[test]
fn test_identifier_charset_boundaries() {
    let tools = tools_with(
        r#"<my-widget class="a_b-c"></my-widget><div class="2col"></div>"#,
    );

    // hyphens, underscores, and leading digits are all plain
    assert_eq!(tools.query("my-widget").unwrap().len(), 1);
    assert_eq!(tools.query(".a_b-c").unwrap().len(), 1);
    assert_eq!(tools.query(".2col").unwrap().len(), 1);

    // whitespace is not
    assert!(tools.query(".a b").unwrap().is_empty());
    assert_eq!(tools.query("div .2col").unwrap().len(), 0);
}

#[test]
fn test_created_elements_can_be_assembled() {
    let tools = tools_with("<div id=root></div>");
    let list = tools.query("<ul>").unwrap();
    let item = tools.query("<li>").unwrap();
    item.set_text("one");

    list.append(item.clone()).unwrap();
    tools.query("#root").unwrap().append(list).unwrap();

    assert_eq!(tools.query("#root").unwrap().html().unwrap(), "<ul><li>one</li></ul>");
    // the moved element is now attached
    let li = item.element().unwrap();
    assert!(tools.document_handle().borrow().parent_element(li).is_some());
}

#[test]
fn test_append_mixed_list() {
    let tools = tools_with("<div id=root></div>");
    let root = tools.query("#root").unwrap();
    let em = tools.query("<em>").unwrap();
    em.set_text("!");

    root.append(Content::List(vec![
        Content::Markup("<b>hi</b>".into()),
        Content::Selection(em),
        Content::Markup(" bye".into()),
    ]))
    .unwrap();

    assert_eq!(root.html().unwrap(), "<b>hi</b><em>!</em> bye");
}

#[test]
fn test_append_to_all_clones_per_target() {
    let tools = tools_with(r#"<div class=cell></div><div class=cell></div>"#);
    let cells = tools.query(".cell").unwrap();
    let badge = tools.query("<span>").unwrap();
    badge.add_class("badge").set_text("*");

    cells.append_to_all(badge).unwrap();

    // each cell got its own copy
    assert_eq!(tools.query(".badge").unwrap().len(), 2);
    for id in cells.ids() {
        let cell = tools.wrap_element(id).unwrap();
        assert_eq!(cell.html().unwrap(), r#"<span class="badge">*</span>"#);
    }
}

#[test]
fn test_text_concatenates_across_elements() {
    let tools = tools_with("<p>a</p><p>b</p>");
    let paragraphs = tools.query("p").unwrap();
    assert_eq!(paragraphs.text(), "ab");

    paragraphs.set_text("x");
    assert_eq!(paragraphs.text(), "xx");
}

#[test]
fn test_value_accessors() {
    let tools = tools_with(r#"<input id=field value="seed"><div id=plain></div>"#);

    let field = tools.query("#field").unwrap();
    assert_eq!(field.value().unwrap(), "seed");
    field.set_value("typed");
    assert_eq!(field.value().unwrap(), "typed");
    // the value property moved; the attribute is the original
    assert_eq!(field.attr("value").unwrap(), "seed");

    let plain = tools.query("#plain").unwrap();
    assert_eq!(plain.value().unwrap(), "");
    tools.configure(|config| config.fail_fast = true);
    assert!(plain.value().is_err());
}

#[test]
fn test_class_calling_conventions() {
    let tools = tools_with("<div id=a></div>");
    let sel = tools.query("#a").unwrap();

    sel.add_class("one two  three");
    assert_eq!(sel.attr("class").unwrap(), "one two three");

    sel.add_classes(&["four", "five"]);
    assert_eq!(sel.attr("class").unwrap(), "one two three four five");

    sel.remove_class("two");
    sel.toggle_class("five");
    sel.toggle_class("six");
    assert_eq!(sel.attr("class").unwrap(), "one three four six");
}

#[test]
fn test_require_and_debug_assert() {
    let tools = tools_with("<div class=x></div>");

    let found = tools.query(".x").unwrap();
    assert!(found.require("op").is_ok());
    found.debug_assert_elements();

    let missing = tools.query(".y").unwrap();
    assert!(matches!(
        missing.require("op"),
        Err(QueryError::EmptySelection { operation: "op" })
    ));
}

#[test]
fn test_clear_children_and_empty_html() {
    let tools = tools_with("<div id=a><p>x</p><p>y</p></div>");
    let sel = tools.query("#a").unwrap();
    assert_eq!(sel.children().len(), 2);

    sel.clear_children();
    assert_eq!(sel.children().len(), 0);
    assert_eq!(sel.html().unwrap(), "");

    sel.set_html("<span>z</span>").unwrap();
    sel.empty_html().unwrap();
    assert_eq!(sel.html().unwrap(), "");
}

#[test]
fn test_detached_selection_still_queryable() {
    let tools = tools_with(r#"<div id=a><span class=s>x</span></div>"#);
    let sel = tools.query("#a").unwrap();

    sel.detach();
    assert!(tools.query("#a").unwrap().is_empty(), "gone from the document");
    // but the held selection still reaches the subtree
    assert_eq!(sel.find(".s", false).unwrap().len(), 1);
    assert_eq!(sel.text(), "x");
}

#[test]
fn test_each_and_map_order() {
    let tools = tools_with("<i>1</i><i>2</i><i>3</i>");
    let items = tools.query("i").unwrap();

    let mut seen = Vec::new();
    items.each(|_, index| seen.push(index));
    assert_eq!(seen, vec![0, 1, 2]);

    let texts = items.map(|id, _| tools.document_handle().borrow().text_content(id));
    assert_eq!(texts, vec!["1", "2", "3"]);

    let mut wrapped_sizes = Vec::new();
    items.each_wrapped(|sel, _| wrapped_sizes.push(sel.len()));
    assert_eq!(wrapped_sizes, vec![1, 1, 1]);
}

#[test]
fn test_children_on_multi_concatenates_in_order() {
    let tools = tools_with(
        r#"<div class=g><b>1</b></div><div class=g><b>2</b><b>3</b></div>"#,
    );
    let groups = tools.query(".g").unwrap();
    let kids = groups.children();
    assert_eq!(kids.len(), 3);
    assert_eq!(kids.text(), "123");
}
