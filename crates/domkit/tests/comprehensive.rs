//! Comprehensive tests for domkit
//!
//! Selector routing equivalence, container behavior across the element
//! count variants, and the entry-point contract.

use domkit::{Arg, DomTools, PluginBatch, QueryError};
use std::rc::Rc;

const PAGE: &str = r#"
<html><head><title>fixture</title></head>
<body>
    <div id="main" class="box outer">
        <p class="intro">first</p>
        <p class="intro deep">second</p>
        <span name="q">s1</span>
    </div>
    <div id="side" class="box">
        <span name="q">s2</span>
    </div>
    <input id="flag" type="checkbox">
</body></html>
"#;

fn tools() -> DomTools {
    DomTools::from_html(PAGE, "about:blank").unwrap()
}

#[test]
fn test_fast_paths_match_general_query() {
    let tools = tools();
    // every fast-path shape must produce exactly what the equivalent
    // general query produces
    for selector in [".intro", ".box", "p", "span", "div", "#main", "#side", "[name=q]"] {
        let fast = tools.query(selector).unwrap();
        let general = tools.query_static(selector).unwrap();
        assert_eq!(fast.ids(), general.ids(), "mismatch for {selector}");
        assert!(!fast.is_empty(), "fixture should match {selector}");
    }

    // the quoted name form matches the bare one
    let quoted = tools.query(r#"[name="q"]"#).unwrap();
    let bare = tools.query("[name=q]").unwrap();
    assert_eq!(quoted.ids(), bare.ids());
}

#[test]
fn test_compound_selectors_use_general_query() {
    let tools = tools();
    // a '.' selector with a second '.' is not a plain class name; taking
    // the class fast path would look up the literal token and match
    // nothing
    let compound = tools.query(".box.outer").unwrap();
    assert_eq!(compound.ids(), tools.query("#main").unwrap().ids());

    let child = tools.query("#main > p").unwrap();
    assert_eq!(child.len(), 2);

    let pseudo = tools.query("p:first-child").unwrap();
    assert!(pseudo.is_empty(), "unsupported syntax degrades to empty");
}

#[test]
fn test_id_fast_path_is_document_only() {
    let tools = tools();
    // #side exists, but not inside #main: an id lookup from an element
    // root must not silently widen to the whole document
    let main = tools.query("#main").unwrap();
    assert!(main.find("#side", false).unwrap().is_empty());
    assert!(!tools.query("#side").unwrap().is_empty());

    // scoped class/tag fast paths stay scoped
    assert_eq!(main.find(".intro", false).unwrap().len(), 2);
    assert_eq!(main.find("span", false).unwrap().len(), 1);
}

#[test]
fn test_missing_id_soft_and_strict() {
    let tools = tools();

    let missing = tools.query("#does-not-exist").unwrap();
    assert!(missing.is_empty());
    assert_eq!(missing.element(), None);

    assert!(matches!(
        tools.strict(Arg::Selector("#does-not-exist".into())),
        Err(QueryError::NoMatch { .. })
    ));

    tools.configure(|config| config.fail_fast = true);
    assert!(matches!(
        tools.query("#does-not-exist"),
        Err(QueryError::NoMatch { .. })
    ));
}

#[test]
fn test_element_creation() {
    let tools = tools();
    let created = tools.query("<div>").unwrap();

    assert_eq!(created.len(), 1);
    let id = created.element().unwrap();
    let doc = tools.document_handle().borrow();
    assert_eq!(doc.tag(id).as_deref(), Some("div"));
    assert_eq!(doc.parent_element(id), None, "created element is detached");
    drop(doc);
    assert_eq!(created.html().unwrap(), "", "created element starts empty");

    // creation is a document-root privilege
    let inside = tools.query("#main").unwrap().find("<div>", false).unwrap();
    assert!(inside.is_empty());
}

#[test]
fn test_find_deduplicates_across_overlapping_roots() {
    let tools = DomTools::from_html(
        r#"<div id="a"><div id="b"><span class="c">x</span></div></div>"#,
        "about:blank",
    )
    .unwrap();

    let a = tools.query("#a").unwrap().element().unwrap();
    let b = tools.query("#b").unwrap().element().unwrap();

    // the span is reachable from both roots but must appear once
    let both = tools.wrap_elements(vec![a, b]);
    assert_eq!(both.find(".c", false).unwrap().len(), 1);
    assert_eq!(both.find("span", true).unwrap().len(), 1);
}

#[test]
fn test_live_view_tracks_later_mutations() {
    let tools = tools();
    let live = tools.query(".box").unwrap();
    let frozen = tools.query_static(".box").unwrap();
    assert_eq!(live.len(), 2);
    assert_eq!(frozen.len(), 2);

    tools
        .query("body")
        .unwrap()
        .append(r#"<div class="box late"></div>"#)
        .unwrap();

    assert_eq!(live.len(), 3, "live view reflects the insertion");
    assert_eq!(frozen.len(), 2, "general queries stay snapshots");
}

#[test]
fn test_hide_show_restores_prior_display() {
    let tools = tools();
    let main = tools.query("#main").unwrap();

    main.set_css("display", "inline-block");
    main.hide();
    assert_eq!(main.css("display").unwrap(), "none");
    main.show();
    assert_eq!(main.css("display").unwrap(), "inline-block");

    // with no prior inline value the empty string comes back
    let side = tools.query("#side").unwrap();
    side.hide();
    side.show();
    assert_eq!(side.css("display").unwrap(), "");
}

#[test]
fn test_hide_show_multi_restores_first_elements_display() {
    // inherited limitation: only the first element's prior value is
    // remembered, and every element gets it back
    let tools = tools();
    let boxes = tools.query(".box").unwrap();
    let side = tools.query("#side").unwrap();
    side.set_css("display", "flex");

    boxes.hide();
    assert_eq!(side.css("display").unwrap(), "none");
    boxes.show();
    assert_eq!(tools.query("#main").unwrap().css("display").unwrap(), "");
    assert_eq!(side.css("display").unwrap(), "", "flex is not restored");
}

#[test]
fn test_attr_roundtrip_on_each_variant() {
    let tools = tools();

    let single = tools.query("#main").unwrap();
    single.set_attr("data-x", "v");
    assert_eq!(single.attr("data-x").unwrap(), "v");

    let multi = tools.query(".box").unwrap();
    multi.set_attr("data-x", "w");
    for id in multi.ids() {
        let wrapped = tools.wrap_element(id).unwrap();
        assert_eq!(wrapped.attr("data-x").unwrap(), "w");
    }
}

#[test]
fn test_empty_selection_mutations_are_noops() {
    let tools = tools();
    let empty = tools.wrap_elements(Vec::new());

    empty.set_css("display", "none");
    empty.set_attr("data-x", "1");
    empty.add_class("a");
    empty.hide();
    empty.show();
    empty.detach();
    assert!(empty.set_html("<p></p>").is_ok());
    assert!(empty.is_empty());

    // loop-shaped mutations stay silent even in strict mode
    tools.configure(|config| config.fail_fast = true);
    empty.set_css("display", "none");
    assert!(empty.set_html("<p></p>").is_ok());
}

#[test]
fn test_plugin_collision_with_builtin() {
    let tools = tools();
    let report = tools.register_plugins(PluginBatch::Pairs(vec![
        ("html".to_string(), Rc::new(|_: &domkit::Selection| {})),
        ("glow".to_string(), Rc::new(|sel: &domkit::Selection| {
            sel.add_class("glow");
        })),
    ]));

    assert!(report.is_partial());
    assert_eq!(report.registered, vec!["glow"]);
    assert_eq!(report.rejected.len(), 1);

    // the built-in html operation is untouched
    let main = tools.query("#main").unwrap();
    assert!(main.html().unwrap().contains("<p"));
    assert!(matches!(
        tools.invoke("html", &main),
        Err(QueryError::UnknownExtension(_))
    ));

    // the accepted entry works
    tools.invoke("glow", &main).unwrap();
    assert_eq!(main.attr("class").unwrap(), "box outer glow");
}

#[test]
fn test_checked_on_checkbox_and_plain_element() {
    let tools = tools();

    let flag = tools.query("#flag").unwrap();
    assert!(!flag.checked().unwrap());
    flag.set_checked(true).unwrap();
    assert!(flag.checked().unwrap());

    let main = tools.query("#main").unwrap();
    assert!(!main.checked().unwrap(), "soft mode defaults to false");

    tools.configure(|config| config.fail_fast = true);
    assert!(matches!(main.checked(), Err(QueryError::NotCheckable)));
}

#[test]
fn test_document_and_window_selections() {
    let tools = tools();

    let document = tools.document().unwrap();
    assert!(!document.is_empty());
    assert_eq!(
        document.element(),
        tools.document_handle().borrow().document_element()
    );

    // queries run through the representative root element
    assert_eq!(document.find(".intro", false).unwrap().len(), 2);

    let window = tools.window().unwrap();
    assert_eq!(window.element(), document.element());
}

#[test]
fn test_dispatch_union() {
    let tools = tools();
    let main_id = tools.query("#main").unwrap().element().unwrap();

    let by_selector = tools
        .dispatch(Arg::Selector("#main".into()))
        .unwrap()
        .into_selection()
        .unwrap();
    assert_eq!(by_selector.element(), Some(main_id));

    let by_element = tools
        .dispatch(Arg::Element(main_id))
        .unwrap()
        .into_selection()
        .unwrap();
    assert_eq!(by_element.element(), Some(main_id));

    let by_list = tools
        .dispatch(Arg::Elements(vec![main_id]))
        .unwrap()
        .into_selection()
        .unwrap();
    assert_eq!(by_list.ids(), vec![main_id]);

    assert!(matches!(
        tools.dispatch(Arg::Ready(Box::new(|| {}))).unwrap(),
        domkit::Dispatched::Scheduled
    ));
}

#[test]
fn test_fallback_flag() {
    let tools = tools();
    tools.configure(|config| config.allow_query_fallback = false);

    // fast paths are unaffected
    assert_eq!(tools.query(".box").unwrap().len(), 2);

    // general-query shapes degrade to empty
    assert!(tools.query(".box.outer").unwrap().is_empty());

    tools.configure(|config| config.fail_fast = true);
    assert!(matches!(
        tools.query(".box.outer"),
        Err(QueryError::FallbackDisabled { .. })
    ));
}

#[test]
fn test_force_query_skips_fast_paths() {
    let tools = tools();
    // even a disabled fallback cannot stop an explicitly forced query
    tools.configure(|config| config.allow_query_fallback = false);
    let forced = tools.query_static(".box").unwrap();
    assert_eq!(forced.len(), 2);
}
