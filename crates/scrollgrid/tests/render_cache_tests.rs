//! Row memoization, header rendering and template failures.

use std::cell::Cell;
use std::rc::Rc;

use scrollgrid::{
    DeclaredChild, Element, GridConfig, GridError, GridTemplates, Record, RenderNode,
    RenderResult, TemplateError,
};
use scrollgrid_testing::prelude::*;
use serde_json::json;

fn rule(page_size: usize) -> GridTestRule<Record> {
    GridTestRule::new(
        GridConfig::new().with_page_size(page_size),
        record_templates(),
    )
}

#[test]
fn test_cached_row_is_reference_stable() {
    let mut rule = rule(2).with_viewport(Viewport::new(60.0, 40.0));
    rule.set_fetch_source(ScriptedSource::with_pages([records(&["a", "b"])]));

    let first = rule.grid().render().unwrap();
    let second = rule.grid().render().unwrap();
    for (a, b) in first.rows.iter().zip(&second.rows) {
        assert!(Rc::ptr_eq(&a.fragment, &b.fragment));
    }
}

#[test]
fn test_row_output_frozen_after_in_place_mutation() {
    let mut rule = rule(2).with_viewport(Viewport::new(60.0, 40.0));
    rule.set_fetch_source(ScriptedSource::with_pages([records(&["a", "b"])]));
    let before = rule.grid().row(0).unwrap().unwrap();

    rule.grid()
        .with_items_mut(|items| items[0].insert("name".to_string(), json!("changed")));
    rule.await_idle();

    let after = rule.grid().row(0).unwrap().unwrap();
    assert!(Rc::ptr_eq(&before, &after));
    assert_eq!(after.to_markup(), "<tr><td>a</td></tr>");
    assert_eq!(rule.grid().items()[0]["name"], json!("changed"));
}

#[test]
fn test_new_rows_render_once_and_old_rows_are_reused() {
    let mut rule = rule(2).with_viewport(Viewport::new(60.0, 40.0));
    let source = FiniteSource::new(100, numbered_record);
    rule.set_fetch_source(source);
    let compiled_before = rule.grid().stats().rows_compiled;
    assert_eq!(compiled_before, 2);

    rule.scroll_to_bottom();

    let stats = rule.grid().stats();
    assert_eq!(stats.rows_compiled, 4);
    assert_eq!(stats.cached_rows, 4);
    assert!(stats.cache_hits > 0);
    assert_eq!(rule.tree().unwrap().row_keys(), vec![0, 1, 2, 3]);
}

#[test]
fn test_header_is_rendered_every_pass() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let templates = GridTemplates::new(
        move || -> RenderResult {
            seen.set(seen.get() + 1);
            Ok(Element::new("thead").into())
        },
        |item: &Record, _: usize| -> RenderResult {
            Ok(RenderNode::text(item["name"].to_string()))
        },
    );
    let rule = GridTestRule::new(GridConfig::default(), templates);

    rule.grid().render().unwrap();
    rule.grid().render().unwrap();
    rule.grid().render().unwrap();
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_cache_cleared_when_source_changes() {
    let mut rule = rule(2).with_viewport(Viewport::new(60.0, 40.0));
    rule.set_fetch_source(ScriptedSource::with_pages([records(&["a", "b"])]));
    let old = rule.grid().row(0).unwrap().unwrap();

    rule.set_fetch_source(ScriptedSource::with_pages([records(&["x", "y"])]));
    let replaced = rule.grid().row(0).unwrap().unwrap();

    assert!(!Rc::ptr_eq(&old, &replaced));
    assert_eq!(replaced.to_markup(), "<tr><td>x</td></tr>");
}

#[test]
fn test_set_items_replaces_rows() {
    let mut rule = rule(2);
    rule.grid().set_items(records(&["p", "q", "r"]));
    rule.await_idle();

    let markup: Vec<_> = rule
        .tree()
        .unwrap()
        .rows
        .iter()
        .map(|row| row.fragment.to_markup())
        .collect();
    assert_eq!(
        markup,
        vec!["<tr><td>p</td></tr>", "<tr><td>q</td></tr>", "<tr><td>r</td></tr>"]
    );

    rule.grid().set_items(records(&["z"]));
    let row = rule.grid().row(0).unwrap().unwrap();
    assert_eq!(row.to_markup(), "<tr><td>z</td></tr>");
}

#[test]
fn test_row_failure_keeps_other_rows_cached() {
    let templates = GridTemplates::new(
        || -> RenderResult { Ok(RenderNode::markup("")) },
        |item: &Record, index: usize| -> RenderResult {
            if item["name"] == json!("bad") {
                return Err(TemplateError::render("cannot render"));
            }
            Ok(Element::new("tr").key(index as u64).into())
        },
    );
    let mut rule = GridTestRule::new(GridConfig::new().with_page_size(3), templates);
    rule.grid().set_items(records(&["a", "bad", "c"]));
    rule.await_idle();

    assert!(matches!(
        rule.render_error(),
        Some(GridError::Template { index: Some(1), .. })
    ));
    assert_eq!(rule.grid().stats().cached_rows, 1);

    let first = rule.grid().row(0).unwrap().unwrap();
    let err = rule.grid().render().unwrap_err();
    assert!(matches!(err, GridError::Template { index: Some(1), .. }));
    assert!(Rc::ptr_eq(&first, &rule.grid().row(0).unwrap().unwrap()));

    rule.grid()
        .with_items_mut(|items| items[1].insert("name".to_string(), json!("fixed")));
    let tree = rule.grid().render().unwrap();
    assert_eq!(tree.rows.len(), 3);
    assert!(Rc::ptr_eq(&first, &tree.rows[0].fragment));
}

#[test]
fn test_header_failure_fails_the_render() {
    let templates = GridTemplates::new(
        || -> RenderResult { Err(TemplateError::render("no header")) },
        |_: &Record, _: usize| -> RenderResult { Ok(RenderNode::markup("")) },
    );
    let rule = GridTestRule::new(GridConfig::default(), templates);

    let err = rule.grid().render().unwrap_err();
    assert_eq!(err.to_string(), "rendering header failed: no header");
}

#[test]
fn test_declared_markup_drives_rendering() {
    let children = [
        DeclaredChild::header("<tr><th>Who</th></tr>"),
        DeclaredChild::row("<tr><td>${index}: ${item.name}</td></tr>"),
        DeclaredChild::row("<tr><td>duplicate</td></tr>"),
    ];
    let mut rule = GridTestRule::new(
        GridConfig::new().with_page_size(2),
        GridTemplates::from_declared(&children),
    )
    .with_viewport(Viewport::new(60.0, 40.0));
    rule.set_fetch_source(ScriptedSource::with_pages([records(&["a", "<b>"])]));

    let markup = rule.tree().unwrap().to_markup();
    assert_eq!(
        markup,
        "<div class=\"scrollgrid-viewport\"><table style=\"border-collapse: collapse;\">\
         <tr><th>Who</th></tr>\
         <tbody><tr><td>0: a</td></tr></tbody>\
         <tbody><tr><td>1: &lt;b&gt;</td></tr></tbody>\
         </table></div>"
    );
}

#[test]
fn test_malformed_declared_row_fails_at_render_time() {
    let children = [DeclaredChild::row("<tr><td>${item.name</td></tr>")];
    let mut rule = GridTestRule::new(
        GridConfig::new().with_page_size(1),
        GridTemplates::from_declared(&children),
    )
    .with_viewport(Viewport::new(60.0, 40.0));

    rule.set_fetch_source(ScriptedSource::with_pages([records(&["a"])]));

    assert!(matches!(
        rule.render_error(),
        Some(GridError::Template {
            index: Some(0),
            source: TemplateError::UnterminatedPlaceholder { .. },
        })
    ));
    assert_eq!(rule.grid().item_count(), 1);
}
