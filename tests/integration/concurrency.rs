use std::thread;

use anyhow::Result;
use tilekit::RenderConfig;
use tilekit::component::{Prop, RenderArgs};
use tilekit::templating::TypedContent;
use tilekit::test_utils::TestEnvironment;

const THREADS: usize = 8;
const RENDERS_PER_THREAD: usize = 25;

/// Many threads rendering one class share a single compiled view
#[test]
fn test_parallel_renders_compile_once() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Counter", "view.tera", "<span>{{ n }}</span>")?;
    let counter =
        env.environment().component("Counter").prop("n", Prop::typed("integer")).define()?;

    thread::scope(|scope| {
        for t in 0..THREADS {
            let counter = &counter;
            scope.spawn(move || {
                for i in 0..RENDERS_PER_THREAD {
                    let n = t * RENDERS_PER_THREAD + i;
                    let html = counter.render(RenderArgs::new().arg("n", n)).unwrap();
                    assert_eq!(html, format!("<span>{n}</span>"));
                }
            });
        }
    });

    let stats = counter.cache_stats();
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.hits + stats.misses, THREADS * RENDERS_PER_THREAD);
    assert!(counter.is_compiled());
    Ok(())
}

/// Nested renders from several threads track their depth per thread
#[test]
fn test_parallel_nested_renders() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.environment()
        .component("Item")
        .prop("label", Prop::typed("string"))
        .view(TypedContent::literal("tera", "<li>{{ label }}</li>"))
        .define()?;
    let list = env
        .environment()
        .component("List")
        .prop("items", Prop::typed("array"))
        .view(TypedContent::literal(
            "tera",
            "<ul>{% for item in items %}{{ component(name='Item', label=item) }}{% endfor %}</ul>",
        ))
        .define()?;

    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let list = &list;
                scope.spawn(move || {
                    list.render(RenderArgs::new().arg("items", vec![format!("a{t}"), format!("b{t}")]))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for (t, html) in outputs.iter().enumerate() {
        assert_eq!(html, &format!("<ul><li>a{t}</li><li>b{t}</li></ul>"));
    }
    Ok(())
}

/// A compiled view keeps serving the first version of its file
#[test]
fn test_compiled_view_is_cached() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_asset("Card", "view.tera", "<p>v1</p>")?;
    let card = env.environment().component("Card").define()?;

    card.compile()?;
    assert!(card.is_compiled());
    env.write_asset("Card", "view.tera", "<p>v2</p>")?;
    assert_eq!(card.render(RenderArgs::new())?, "<p>v1</p>");
    assert_eq!(card.cache_stats().compilations, 1);
    Ok(())
}

/// With compilation off every render reads the view again
#[test]
fn test_uncompiled_views_pick_up_edits() -> Result<()> {
    let env = TestEnvironment::with_config(RenderConfig {
        compile_views: false,
        ..RenderConfig::default()
    })?;
    env.write_asset("Card", "view.tera", "<p>v1</p>")?;
    let card = env.environment().component("Card").define()?;

    assert_eq!(card.render(RenderArgs::new())?, "<p>v1</p>");
    env.write_asset("Card", "view.tera", "<p>v2</p>")?;
    assert_eq!(card.render(RenderArgs::new())?, "<p>v2</p>");

    card.compile()?;
    assert!(!card.is_compiled());
    assert_eq!(card.cache_stats().compilations, 0);
    Ok(())
}

#[test]
fn test_environment_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<tilekit::Environment>();
    assert_send_sync::<tilekit::ComponentClass>();
}
