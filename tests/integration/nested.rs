use anyhow::Result;
use tilekit::RenderConfig;
use tilekit::component::{Prop, RenderArgs};
use tilekit::core::ComponentError;
use tilekit::templating::TypedContent;
use tilekit::test_utils::TestEnvironment;

#[test]
fn test_component_function_renders_child() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Child")
        .prop("label", Prop::typed("string").required())
        .view(TypedContent::literal("tera", "<span>{{ label }}</span>"))
        .style(TypedContent::literal("css", "span { font-weight: bold; }"))
        .define()?;
    let parent = env
        .environment()
        .component("Parent")
        .view(TypedContent::literal(
            "tera",
            "<div>{{ component(name='Child', label=title) }}</div>",
        ))
        .define()?;

    assert_eq!(
        parent.render(RenderArgs::new().arg("title", "Hi"))?,
        "<div><span>Hi</span><style type='text/css'>span { font-weight: bold; }</style></div>"
    );
    Ok(())
}

/// Children passed to the function become the child's nested content
#[test]
fn test_component_function_children() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Navigation::Panel")
        .view(TypedContent::literal("tera", "<aside>{{ children }}</aside>"))
        .define()?;
    let page = env
        .environment()
        .component("Page")
        .view(TypedContent::literal(
            "tera",
            "{{ component(name='Navigation::Panel', children='<a>home</a>') }}",
        ))
        .define()?;

    assert_eq!(page.render(RenderArgs::new())?, "<aside><a>home</a></aside>");
    Ok(())
}

/// Helpers are reachable by their underscored and hyphenated aliases
#[test]
fn test_component_function_aliases() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("DropdownMenu")
        .view(TypedContent::literal("html", "<ul></ul>"))
        .define()?;
    let page = env
        .environment()
        .component("Page")
        .view(TypedContent::literal(
            "tera",
            "{{ component(name='dropdown_menu') }}{{ component(name='dropdown-menu') }}",
        ))
        .define()?;

    assert_eq!(page.render(RenderArgs::new())?, "<ul></ul><ul></ul>");
    Ok(())
}

#[test]
fn test_unknown_nested_component() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .define()?;
    let page = env
        .environment()
        .component("Page")
        .view(TypedContent::literal("tera", "{{ component(name='Crad') }}"))
        .define()?;

    let error = page.render(RenderArgs::new()).unwrap_err();
    match error.innermost() {
        ComponentError::UnknownComponent {
            name,
            suggestions,
        } => {
            assert_eq!(name, "Crad");
            assert_eq!(suggestions, &vec!["Card".to_string()]);
        }
        other => panic!("expected UnknownComponent, got {other:?}"),
    }
    Ok(())
}

/// A failing child aborts the parent, and the chain names every level
#[test]
fn test_nested_failure_chain() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Price")
        .prop("amount", Prop::typed("numeric").required())
        .view(TypedContent::literal("tera", "{{ amount }}"))
        .define()?;
    env.environment()
        .component("Row")
        .view(TypedContent::literal("tera", "<td>{{ component(name='Price') }}</td>"))
        .define()?;
    let table = env
        .environment()
        .component("Table")
        .view(TypedContent::literal("tera", "<tr>{{ component(name='Row') }}</tr>"))
        .define()?;

    let error = table.render(RenderArgs::new()).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("'Row' inside `Table`"), "{message}");
    assert!(message.contains("'Price' inside `Row`"), "{message}");
    assert!(matches!(
        error.innermost(),
        ComponentError::MissingProps { component, prop } if component == "Price" && prop == "amount"
    ));
    Ok(())
}

#[test]
fn test_nesting_depth_limit() -> Result<()> {
    let env = TestEnvironment::with_config(RenderConfig {
        max_nesting_depth: 3,
        ..RenderConfig::default()
    })?;
    let recursive = env
        .environment()
        .component("Recursive")
        .view(TypedContent::literal("tera", "<i>{{ component(name='Recursive') }}</i>"))
        .define()?;

    let error = recursive.render(RenderArgs::new()).unwrap_err();
    match error.innermost() {
        ComponentError::NestingTooDeep {
            component,
            max,
        } => {
            assert_eq!(component, "Recursive");
            assert_eq!(*max, 3);
        }
        other => panic!("expected NestingTooDeep, got {other:?}"),
    }

    // The depth counter unwinds after a failure
    let leaf = env
        .environment()
        .component("Leaf")
        .view(TypedContent::literal("html", "<b></b>"))
        .define()?;
    let wrapper = env
        .environment()
        .component("Wrapper")
        .view(TypedContent::literal("tera", "{{ component(name='Leaf') }}"))
        .define()?;
    assert_eq!(leaf.render(RenderArgs::new())?, "<b></b>");
    assert_eq!(wrapper.render(RenderArgs::new())?, "<b></b>");
    Ok(())
}

/// Dropping the last handle to a class leaves a dangling helper name
#[test]
fn test_undefine_component() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .define()?;

    assert_eq!(env.environment().render("card", RenderArgs::new())?, "<p></p>");
    assert_eq!(env.environment().undefine(&card), 2);
    assert!(matches!(
        env.environment().lookup("Card"),
        Err(ComponentError::UnknownComponent { .. })
    ));
    Ok(())
}

/// The environment keeps a defined class reachable by name after the caller
/// drops its handle, and releases it once undefined
#[test]
fn test_defined_component_outlives_its_handle() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Child")
        .view(TypedContent::literal("html", "<span>c</span>"))
        .define()?;
    let parent = env
        .environment()
        .component("Parent")
        .view(TypedContent::literal("tera", "<div>{{ component(name='Child') }}</div>"))
        .define()?;

    assert_eq!(parent.render(RenderArgs::new())?, "<div><span>c</span></div>");

    let child = env.environment().lookup("Child")?;
    let released = std::sync::Arc::downgrade(&child);
    assert_eq!(env.environment().undefine(&child), 2);
    drop(child);
    assert!(released.upgrade().is_none());
    Ok(())
}
