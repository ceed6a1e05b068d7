use anyhow::Result;
use serde_json::json;
use tilekit::RenderConfig;
use tilekit::component::RenderArgs;
use tilekit::config::Precedence;
use tilekit::core::ComponentError;
use tilekit::templating::TypedContent;
use tilekit::test_utils::TestEnvironment;

fn file_first() -> RenderConfig {
    RenderConfig {
        precedence: Precedence::FileFirst,
        ..RenderConfig::default()
    }
}

/// Writes a view file for `Card` and declares a view on the class.
fn card_with_file_and_declaration(
    env: &TestEnvironment,
) -> Result<std::sync::Arc<tilekit::ComponentClass>> {
    env.write_asset("Card", "view.tera", "<p>file {{ who }}</p>")?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "<p>declared {{ who }}</p>"))
        .define()?;
    Ok(card)
}

#[test]
fn test_inline_first_prefers_inline_then_declared() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = card_with_file_and_declaration(&env)?;
    let args = RenderArgs::new().arg("who", "x");

    assert_eq!(card.render(args.clone())?, "<p>declared x</p>");
    assert_eq!(
        card.render(args.view(TypedContent::literal("tera", "<p>inline {{ who }}</p>")))?,
        "<p>inline x</p>"
    );
    Ok(())
}

#[test]
fn test_file_first_prefers_file() -> Result<()> {
    let env = TestEnvironment::with_config(file_first())?;
    let card = card_with_file_and_declaration(&env)?;

    let args = RenderArgs::new()
        .arg("who", "x")
        .view(TypedContent::literal("tera", "<p>inline {{ who }}</p>"));
    assert_eq!(card.render(args)?, "<p>file x</p>");
    Ok(())
}

/// Under file-first precedence an inline view still renders when the class
/// has no view of its own
#[test]
fn test_file_first_falls_back_to_inline() -> Result<()> {
    let env = TestEnvironment::with_config(file_first())?;
    let card = env.environment().component("Card").define()?;

    assert_eq!(card.render(RenderArgs::new().view("<b>only inline</b>"))?, "<b>only inline</b>");
    Ok(())
}

/// A plain string passed as the view is markup and is not interpolated
#[test]
fn test_literal_inline_markup() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = card_with_file_and_declaration(&env)?;

    let html = card.render(RenderArgs::new().arg("who", "x").arg("view", "<i>{{ who }}</i>"))?;
    assert_eq!(html, "<i>{{ who }}</i>");
    Ok(())
}

/// A `{ type, content }` record passed as the view is dispatched by type
#[test]
fn test_inline_typed_record() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env.environment().component("Card").define()?;

    let html = card.render_value(json!({
        "who": "y",
        "view": { "type": "tera", "content": "<em>{{ who }}</em>" },
    }))?;
    assert_eq!(html, "<em>y</em>");

    let error = card
        .render_value(json!({ "view": { "type": "slim", "content": "p" } }))
        .unwrap_err();
    assert!(matches!(error, ComponentError::UnknownViewType { ref format, .. } if format == "slim"));
    Ok(())
}

/// Every candidate is validated, even one that would lose
#[test]
fn test_blank_declared_view_fails_even_when_inline_wins() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "   "))
        .define()?;

    let error = card.render(RenderArgs::new().view("<p>inline</p>")).unwrap_err();
    assert_eq!(error.to_string(), "Custom view for `Card` from class declaration cannot be empty");
    Ok(())
}

#[test]
fn test_blank_inline_view() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "<p>declared</p>"))
        .define()?;

    let error = card.render(RenderArgs::new().view(TypedContent::literal("tera", ""))).unwrap_err();
    assert!(matches!(error, ComponentError::EmptyView { .. }), "got {error:?}");

    // An empty literal string is simply no candidate
    assert_eq!(card.render(RenderArgs::new().view(""))?, "<p>declared</p>");
    Ok(())
}

#[test]
fn test_unknown_declared_type_fails_even_when_inline_wins() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("jade", "p hi"))
        .define()?;

    let error = card.render(RenderArgs::new().view("<p>inline</p>")).unwrap_err();
    assert!(matches!(error, ComponentError::UnknownViewType { .. }), "got {error:?}");
    Ok(())
}

#[test]
fn test_style_precedence() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "style.css", "p { color: red; }")?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .style(TypedContent::literal("css", "p { color: green; }"))
        .define()?;

    assert_eq!(card.render(RenderArgs::new())?, "<p></p><style type='text/css'>p { color: green; }</style>");
    assert_eq!(
        card.render(RenderArgs::new().style("p { color: blue; }"))?,
        "<p></p><style type='text/css'>p { color: blue; }</style>"
    );
    Ok(())
}

#[test]
fn test_style_precedence_file_first() -> Result<()> {
    let env = TestEnvironment::with_config(file_first())?;
    env.write_asset("Card", "style.css", "p { color: red; }")?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .style(TypedContent::literal("css", "p { color: green; }"))
        .define()?;

    assert_eq!(
        card.render(RenderArgs::new().style("p { color: blue; }"))?,
        "<p></p><style type='text/css'>p { color: red; }</style>"
    );
    Ok(())
}
