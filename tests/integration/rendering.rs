use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use tilekit::ComponentClass;
use tilekit::component::{Prop, RenderArgs};
use tilekit::core::ComponentError;
use tilekit::templating::TypedContent;
use tilekit::test_utils::{ComponentFixture, TestEnvironment};

/// A component directory with a defaulted prop, a view file and a style file
#[test]
fn test_render_badge_directory() -> Result<()> {
    let env = TestEnvironment::new()?;
    let dir = env.add_component(&ComponentFixture::badge())?;

    let badge = env.environment().load_component(&dir)?;
    assert_eq!(
        badge.render(RenderArgs::new())?,
        "<div>Default Description</div><style type='text/css'>div { color: blue; }</style>"
    );
    assert_eq!(
        badge.render(RenderArgs::new().arg("description", "New"))?,
        "<div>New</div><style type='text/css'>div { color: blue; }</style>"
    );
    Ok(())
}

/// Classes without an explicit asset directory look under the components
/// root, in the directory named after the underscored class name
#[test]
fn test_asset_dir_from_components_root() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Navigation::DropdownMenu", "view.tera", "<ul>{{ label }}</ul>")?;

    let menu = env
        .environment()
        .component("Navigation::DropdownMenu")
        .prop("label", Prop::typed("string"))
        .define()?;

    assert_eq!(
        menu.asset_dir(),
        Some(env.components_root.join("navigation/dropdown_menu").as_path())
    );
    assert_eq!(menu.render(RenderArgs::new().arg("label", "Main"))?, "<ul>Main</ul>");
    Ok(())
}

/// Markdown view files are interpolated by Tera, then converted to HTML
#[test]
fn test_markdown_view_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Article", "view.md", "# {{ title }}\n\nSome *text*.")?;

    let article =
        env.environment().component("Article").prop("title", Prop::typed("string")).define()?;
    let html = article.render(RenderArgs::new().arg("title", "Hello"))?;
    assert_eq!(html, "<h1>Hello</h1>\n<p>Some <em>text</em>.</p>\n");
    Ok(())
}

#[test]
fn test_unknown_view_file_extension() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.haml", "%p hello")?;

    let card = env.environment().component("Card").define()?;
    match card.render(RenderArgs::new()) {
        Err(ComponentError::UnknownViewType {
            component,
            format,
            known,
            ..
        }) => {
            assert_eq!(component, "Card");
            assert_eq!(format, "haml");
            assert!(known.contains(&"tera".to_string()));
        }
        other => panic!("expected UnknownViewType, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_multiple_view_files() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.tera", "<p>a</p>")?;
    env.write_asset("Card", "view.md", "b")?;

    let card = env.environment().component("Card").define()?;
    match card.render(RenderArgs::new()) {
        Err(ComponentError::MultipleViews {
            component,
            files,
        }) => {
            assert_eq!(component, "Card");
            assert_eq!(files, vec!["view.md".to_string(), "view.tera".to_string()]);
        }
        other => panic!("expected MultipleViews, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_multiple_style_files() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.tera", "<p>a</p>")?;
    env.write_asset("Card", "style.css", "p {}")?;
    env.write_asset("Card", "style.css.tera", "p {}")?;

    let card = env.environment().component("Card").define()?;
    let error = card.render(RenderArgs::new()).unwrap_err();
    assert!(matches!(error, ComponentError::MultipleStyles { .. }), "got {error:?}");
    Ok(())
}

/// A whitespace-only view file is no source at all
#[test]
fn test_blank_view_file_is_ignored() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.tera", "  \n\t")?;

    let card = env.environment().component("Card").define()?;
    let error = card.render(RenderArgs::new()).unwrap_err();
    assert!(matches!(error, ComponentError::ViewNotFound { .. }), "got {error:?}");

    let declared = env
        .environment()
        .component("Panel")
        .asset_dir(env.asset_dir("Card"))
        .view(TypedContent::literal("html", "<section></section>"))
        .define()?;
    assert_eq!(declared.render(RenderArgs::new())?, "<section></section>");
    Ok(())
}

#[test]
fn test_no_view_anywhere() -> Result<()> {
    let env = TestEnvironment::new()?;
    let empty = env.environment().component("Empty").define()?;

    let error = empty.render(RenderArgs::new()).unwrap_err();
    assert_eq!(error.to_string(), "View for `Empty` could not be found");
    Ok(())
}

/// Plain `.css` files are emitted verbatim, `.css.tera` files are
/// interpolated first
#[test]
fn test_style_file_interpolation() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Plain", "view.html", "<p></p>")?;
    env.write_asset("Plain", "style.css", "p::after { content: \"{{ color }}\"; }")?;
    env.write_asset("Themed", "view.html", "<p></p>")?;
    env.write_asset("Themed", "style.css.tera", "p { color: {{ color }}; }")?;

    let plain = env.environment().component("Plain").define()?;
    let themed = env.environment().component("Themed").define()?;
    let args = RenderArgs::new().arg("color", "red");

    assert_eq!(
        plain.render(args.clone())?,
        "<p></p><style type='text/css'>p::after { content: \"{{ color }}\"; }</style>"
    );
    assert_eq!(themed.render(args)?, "<p></p><style type='text/css'>p { color: red; }</style>");
    Ok(())
}

#[test]
fn test_blank_style_is_omitted() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.html", "<p></p>")?;
    env.write_asset("Card", "style.css.tera", "{% if dark %}p { color: white; }{% endif %}")?;

    let card = env.environment().component("Card").define()?;
    assert_eq!(card.render(RenderArgs::new().arg("dark", false))?, "<p></p>");
    assert_eq!(
        card.render(RenderArgs::new().arg("dark", true))?,
        "<p></p><style type='text/css'>p { color: white; }</style>"
    );
    Ok(())
}

/// Deferred content is produced when the view is resolved, not at
/// declaration time
#[test]
fn test_deferred_view() -> Result<()> {
    let env = TestEnvironment::new()?;
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let card = env
        .environment()
        .component("Card")
        .prop("title", Prop::typed("string"))
        .view_with("tera", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "<h1>{{ title }}</h1>".to_string()
        })
        .define()?;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(card.render(RenderArgs::new().arg("title", "One"))?, "<h1>One</h1>");
    assert!(calls.load(Ordering::SeqCst) > 0);
    Ok(())
}

/// A view producer that renders its own component is refused instead of
/// blocking on the compile lock
#[test]
fn test_self_rendering_view_producer() -> Result<()> {
    let env = TestEnvironment::new()?;
    let slot: Arc<OnceLock<Arc<ComponentClass>>> = Arc::default();

    let this = Arc::clone(&slot);
    let card = env
        .environment()
        .component("Card")
        .view_with("html", move || match this.get() {
            Some(class) => match class.render(RenderArgs::new()) {
                Ok(html) => html,
                Err(error) => format!("<p>{error}</p>"),
            },
            None => String::new(),
        })
        .define()?;
    slot.set(Arc::clone(&card)).unwrap();

    assert_eq!(
        card.render(RenderArgs::new())?,
        "<p>view compilation re-entered its own render cache</p>"
    );
    assert!(card.is_compiled());
    Ok(())
}

#[test]
fn test_nested_content_block() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "<div>{{ children }}|{{ nested_content }}</div>"))
        .define()?;

    let html = card.render_with(RenderArgs::new(), || Ok("<b>inner</b>".to_string()))?;
    assert_eq!(html, "<div><b>inner</b>|<b>inner</b></div>");
    Ok(())
}

/// Errors raised by the block abort the render
#[test]
fn test_nested_content_block_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "<div>{{ children }}</div>"))
        .define()?;

    let result = card.render_with(RenderArgs::new(), || {
        Err(ComponentError::Other {
            message: "block failed".to_string(),
        })
    });
    assert_eq!(result.unwrap_err().to_string(), "block failed");
    Ok(())
}

#[test]
fn test_css_id_function_and_filter() -> Result<()> {
    let env = TestEnvironment::new()?;
    let menu = env
        .environment()
        .component("Navigation::DropdownMenu")
        .view(TypedContent::literal(
            "tera",
            "<li class=\"{{ css_id(name='list_item') }}\" id=\"{{ 'ListTitle' | css_id }}\"></li>",
        ))
        .style(TypedContent::literal("css", ".{{ css_id(name='list_item') }} { margin: 0; }"))
        .define()?;

    assert_eq!(
        menu.render(RenderArgs::new())?,
        "<li class=\"navigation-dropdown_menu--list_item\" id=\"navigation-dropdown_menu--list_title\"></li>\
         <style type='text/css'>.navigation-dropdown_menu--list_item { margin: 0; }</style>"
    );
    assert_eq!(menu.css_id("list_item"), "navigation-dropdown_menu--list_item");
    Ok(())
}

/// Tera syntax errors name the component and the file
#[test]
fn test_template_syntax_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let dir = env.add_component(&ComponentFixture::broken())?;
    let broken = env.environment().load_component(&dir)?;

    let error = broken.render(RenderArgs::new()).unwrap_err();
    assert!(matches!(error, ComponentError::Template(_)), "got {error:?}");
    assert!(error.to_string().contains("`Broken`"));
    assert!(broken.check().is_err());
    Ok(())
}

/// Structural `{ type, content }` records declared as views
#[test]
fn test_wrapped_typed_content() -> Result<()> {
    let env = TestEnvironment::new()?;
    let record = serde_json::json!({ "type": "md", "content": "**{{ word }}**" });

    let card = env.environment().component("Card").view(TypedContent::wrap(&record)?).define()?;
    assert_eq!(card.render(RenderArgs::new().arg("word", "bold"))?, "<p><strong>bold</strong></p>\n");

    let error = TypedContent::wrap(&serde_json::json!(["not", "a", "record"])).unwrap_err();
    assert!(matches!(error, ComponentError::InvalidContent { .. }));
    Ok(())
}
