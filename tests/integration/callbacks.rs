use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use serde_json::json;
use tilekit::component::{Component, Next, Phase, Prop, RenderArgs};
use tilekit::core::ComponentError;
use tilekit::templating::TypedContent;
use tilekit::test_utils::TestEnvironment;

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, entry: &str) {
    log.lock().unwrap().push(entry.to_string());
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn test_callback_order() -> Result<()> {
    let env = TestEnvironment::new()?;
    let log: Log = Arc::default();

    let (l1, l2, l3, l4, l5) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .before(Phase::Render, move |_| {
            record(&l1, "before");
            Ok(())
        })
        .around(Phase::Render, move |component: &mut Component, next: Next<'_>| {
            record(&l2, "outer:in");
            next(component)?;
            record(&l2, "outer:out");
            Ok(())
        })
        .around(Phase::Render, move |component: &mut Component, next: Next<'_>| {
            record(&l3, "inner:in");
            next(component)?;
            record(&l3, "inner:out");
            Ok(())
        })
        .after(Phase::Render, move |_| {
            record(&l4, "after");
            Ok(())
        })
        .after(Phase::Initialize, move |_| {
            record(&l5, "initialized");
            Ok(())
        })
        .define()?;

    assert_eq!(card.render(RenderArgs::new())?, "<p></p>");
    assert_eq!(
        entries(&log),
        vec!["initialized", "before", "outer:in", "inner:in", "inner:out", "outer:out", "after"]
    );
    Ok(())
}

/// A before-render hook sees bound props and may change them
#[test]
fn test_before_render_updates_props() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .prop("title", Prop::typed("string").required())
        .view(TypedContent::literal("tera", "<h2>{{ title }}</h2>{{ stamp }}"))
        .before(Phase::Render, |component| {
            let title = component.prop("title").and_then(|v| v.as_str()).unwrap_or_default();
            let upper = title.to_uppercase();
            component.set_prop("title", upper)?;
            component.set("stamp", "!");
            Ok(())
        })
        .define()?;

    assert_eq!(card.render(RenderArgs::new().arg("title", "news"))?, "<h2>NEWS</h2>!");
    Ok(())
}

/// An around hook that skips the continuation suppresses the render and
/// every after hook
#[test]
fn test_around_suppresses_render() -> Result<()> {
    let env = TestEnvironment::new()?;
    let log: Log = Arc::default();

    let after_log = log.clone();
    let card = env
        .environment()
        .component("Card")
        .prop("visible", Prop::typed("boolean").with_default(true))
        .view(TypedContent::literal("html", "<p>shown</p>"))
        .around(Phase::Render, |component: &mut Component, next: Next<'_>| {
            if component.prop("visible") == Some(&json!(true)) {
                next(component)?;
            }
            Ok(())
        })
        .after(Phase::Render, move |_| {
            record(&after_log, "after");
            Ok(())
        })
        .define()?;

    assert_eq!(card.render(RenderArgs::new().arg("visible", false))?, "");
    assert!(entries(&log).is_empty());
    assert_eq!(card.render(RenderArgs::new())?, "<p>shown</p>");
    assert_eq!(entries(&log), vec!["after"]);
    Ok(())
}

/// Suppressing initialize skips binding, so required props are not checked
#[test]
fn test_around_suppresses_initialize() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .prop("title", Prop::typed("string").required())
        .view(TypedContent::literal("tera", "<p>{{ title | default(value='unbound') }}</p>"))
        .around(Phase::Initialize, |_: &mut Component, _: Next<'_>| Ok(()))
        .define()?;

    let component = card.instantiate(RenderArgs::new().arg("title", "ignored"))?;
    assert!(component.props().is_empty());
    assert!(component.state().is_empty());
    assert_eq!(card.render(RenderArgs::new())?, "<p>unbound</p>");
    Ok(())
}

#[test]
fn test_method_callbacks() -> Result<()> {
    let env = TestEnvironment::new()?;
    let card = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("tera", "{{ trail }}"))
        .before_method(Phase::Render, "start")
        .around_method(Phase::Render, "wrap")
        .after_method(Phase::Initialize, "init")
        .define_method("init", |component| {
            component.set("trail", "i");
            Ok(())
        })
        .define_method("start", |component| {
            let trail = component.get("trail").and_then(|v| v.as_str()).unwrap_or_default();
            let trail = format!("{trail}s");
            component.set("trail", trail);
            Ok(())
        })
        .define_around_method("wrap", |component, next| {
            let trail = component.get("trail").and_then(|v| v.as_str()).unwrap_or_default();
            let trail = format!("{trail}w");
            component.set("trail", trail);
            next(component)
        })
        .define()?;

    assert_eq!(card.callbacks().len(Phase::Render), 2);
    assert_eq!(card.render(RenderArgs::new())?, "isw");
    Ok(())
}

#[test]
fn test_undefined_callback_method() -> Result<()> {
    let env = TestEnvironment::new()?;
    let result = env
        .environment()
        .component("Card")
        .view(TypedContent::literal("html", "<p></p>"))
        .after_method(Phase::Render, "track")
        .define();

    match result {
        Err(ComponentError::UndefinedCallback {
            component,
            method,
            phase,
        }) => {
            assert_eq!(component, "Card");
            assert_eq!(method, "track");
            assert_eq!(phase, Phase::Render);
        }
        other => panic!("expected UndefinedCallback, got {other:?}"),
    }
    Ok(())
}

/// Hook errors abort the phase; component errors keep their kind
#[test]
fn test_callback_errors() -> Result<()> {
    let env = TestEnvironment::new()?;
    let failing = env
        .environment()
        .component("Failing")
        .view(TypedContent::literal("html", "<p></p>"))
        .before(Phase::Render, |_| Err(anyhow!("tracking service unavailable")))
        .define()?;

    let error = failing.render(RenderArgs::new()).unwrap_err();
    assert!(matches!(error, ComponentError::Callback { phase: Phase::Render, .. }));
    assert_eq!(
        error.to_string(),
        "render callback failed for `Failing`: tracking service unavailable"
    );

    let strict = env
        .environment()
        .component("Strict")
        .view(TypedContent::literal("html", "<p></p>"))
        .before(Phase::Initialize, |component| {
            component.set_prop("missing", 1)?;
            Ok(())
        })
        .define()?;
    let error = strict.render(RenderArgs::new()).unwrap_err();
    assert!(matches!(error, ComponentError::UnknownProp { .. }), "got {error:?}");
    Ok(())
}
