// tests/template_engine.rs

use std::error::Error;

use serde_json::json;

use waxwatch::render::{Mustache, TemplateEngine};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn variables_are_escaped_unless_triple_braced() -> TestResult {
    let ctx = json!({ "html": "<b>\"hi\" & 'bye'</b>" });

    assert_eq!(
        Mustache.render("{{html}}", &ctx)?,
        "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;"
    );
    assert_eq!(Mustache.render("{{{html}}}", &ctx)?, "<b>\"hi\" & 'bye'</b>");
    assert_eq!(Mustache.render("{{& html}}", &ctx)?, "<b>\"hi\" & 'bye'</b>");
    Ok(())
}

#[test]
fn missing_values_render_empty() -> TestResult {
    assert_eq!(Mustache.render("[{{nope}}][{{a.b.c}}]", &json!({ "a": {} }))?, "[][]");
    Ok(())
}

#[test]
fn dotted_names_walk_objects_and_arrays() -> TestResult {
    let ctx = json!({ "site": { "owner": { "name": "Ada" } }, "tags": ["x", "y"] });

    assert_eq!(Mustache.render("{{site.owner.name}}", &ctx)?, "Ada");
    assert_eq!(Mustache.render("{{tags.1}}", &ctx)?, "y");
    Ok(())
}

#[test]
fn sections_iterate_lists_and_push_context() -> TestResult {
    let ctx = json!({
        "title": "Team",
        "members": [{ "name": "Ada" }, { "name": "Grace" }],
    });

    assert_eq!(
        Mustache.render("{{#members}}{{name}} of {{title}};{{/members}}", &ctx)?,
        "Ada of Team;Grace of Team;"
    );
    Ok(())
}

#[test]
fn falsy_values_hide_sections_and_show_inverted_ones() -> TestResult {
    let template = "{{#v}}yes{{/v}}{{^v}}no{{/v}}";

    for falsy in [json!(null), json!(false), json!(""), json!([])] {
        assert_eq!(Mustache.render(template, &json!({ "v": falsy }))?, "no");
    }
    for truthy in [json!(true), json!(0), json!("x"), json!({})] {
        assert_eq!(Mustache.render(template, &json!({ "v": truthy }))?, "yes");
    }
    assert_eq!(Mustache.render(template, &json!({}))?, "no");
    Ok(())
}

#[test]
fn current_item_and_comments() -> TestResult {
    let ctx = json!({ "items": [1, "two", true] });
    assert_eq!(
        Mustache.render("{{! list }}{{#items}}({{.}}){{/items}}", &ctx)?,
        "(1)(two)(true)"
    );
    Ok(())
}

#[test]
fn malformed_templates_are_errors() {
    for template in [
        "{{unclosed",
        "{{{raw}}",
        "{{#open}}never closed",
        "{{/stray}}",
        "{{#a}}{{/b}}",
        "{{}}",
    ] {
        assert!(
            Mustache.render(template, &json!({})).is_err(),
            "{template:?} should fail"
        );
    }
}
