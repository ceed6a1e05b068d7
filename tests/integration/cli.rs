use assert_cmd::Command;
use predicates::prelude::*;
use tilekit::test_utils::{ComponentFixture, TestEnvironment};

/// The binary with no configuration file, preset or log filter leaking in.
fn tilekit(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("tilekit").unwrap();
    cmd.current_dir(env.path())
        .env("TILEKIT_CONFIG_PATH", env.path().join("no-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("TILEKIT_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_component_directory() {
    let env = TestEnvironment::new().unwrap();
    let dir = env.add_component(&ComponentFixture::badge()).unwrap();

    tilekit(&env).arg("render").arg(&dir).assert().success().stdout(
        "<div>Default Description</div><style type='text/css'>div { color: blue; }</style>\n",
    );

    tilekit(&env)
        .arg("render")
        .arg(&dir)
        .args(["--props", r#"{"description": "New"}"#])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<div>New</div>"));
}

#[test]
fn test_render_inline_view_and_style() {
    let env = TestEnvironment::new().unwrap();
    let dir = env.add_component(&ComponentFixture::badge()).unwrap();

    tilekit(&env)
        .arg("render")
        .arg(&dir)
        .args(["--view", "<em>inline</em>", "--style", "em { color: red; }"])
        .assert()
        .success()
        .stdout("<em>inline</em><style type='text/css'>em { color: red; }</style>\n");
}

#[test]
fn test_render_props_file_and_output() {
    let env = TestEnvironment::new().unwrap();
    let dir = env.add_component(&ComponentFixture::greeting()).unwrap();
    let props = env.path().join("props.json");
    std::fs::write(&props, r#"{"name": "Ada"}"#).unwrap();
    let output = env.path().join("out.html");

    tilekit(&env)
        .arg("render")
        .arg(&dir)
        .arg("--props-file")
        .arg(&props)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "<p>Hello Ada</p>");
}

#[test]
fn test_render_missing_prop_fails() {
    let env = TestEnvironment::new().unwrap();
    let dir = env.add_component(&ComponentFixture::greeting()).unwrap();

    tilekit(&env)
        .arg("render")
        .arg(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing required prop"))
        .stderr(predicate::str::contains("name"));
}

#[test]
fn test_render_rejects_non_object_props() {
    let env = TestEnvironment::new().unwrap();
    let dir = env.add_component(&ComponentFixture::badge()).unwrap();

    tilekit(&env)
        .arg("render")
        .arg(&dir)
        .args(["--props", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Props must be a JSON object"));
}

/// With `--root`, sibling components are available to the view
#[test]
fn test_render_with_root() {
    let env = TestEnvironment::new().unwrap();
    env.add_component(&ComponentFixture::badge()).unwrap();
    let card = env
        .add_component(
            &ComponentFixture::new("card")
                .manifest("name = \"Card\"\n")
                .view("tera", "<section>{{ component(name='Badge', description='Hi') }}</section>"),
        )
        .unwrap();

    tilekit(&env)
        .arg("render")
        .arg(&card)
        .arg("--root")
        .arg(&env.components_root)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<section><div>Hi</div>"));

    // Without the root the nested component is unknown
    tilekit(&env)
        .arg("render")
        .arg(&card)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown component `Badge`"));
}

#[test]
fn test_check_valid_components() {
    let env = TestEnvironment::new().unwrap();
    env.add_component(&ComponentFixture::badge()).unwrap();
    env.add_component(&ComponentFixture::greeting()).unwrap();

    tilekit(&env)
        .arg("check")
        .arg(&env.components_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Badge"))
        .stdout(predicate::str::contains("Greeting"))
        .stdout(predicate::str::contains("2 component(s) checked"));
}

#[test]
fn test_check_reports_broken_component() {
    let env = TestEnvironment::new().unwrap();
    env.add_component(&ComponentFixture::badge()).unwrap();
    env.add_component(&ComponentFixture::broken()).unwrap();

    tilekit(&env)
        .arg("check")
        .arg(&env.components_root)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Broken"))
        .stderr(predicate::str::contains("1 of 2 components failed the check"));
}

#[test]
fn test_check_json_output() {
    let env = TestEnvironment::new().unwrap();
    env.add_component(&ComponentFixture::badge()).unwrap();

    let output = tilekit(&env)
        .arg("check")
        .arg(&env.components_root)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["valid"], true);
    assert_eq!(summary["components"][0]["component"], "Badge");
    assert!(summary["components"][0]["view"].as_str().unwrap().starts_with("tera from file"));
}

#[test]
fn test_list_components() {
    let env = TestEnvironment::new().unwrap();
    env.add_component(&ComponentFixture::badge()).unwrap();
    env.add_component(&ComponentFixture::greeting()).unwrap();

    tilekit(&env)
        .arg("list")
        .arg(&env.components_root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Badge"))
        .stdout(predicate::str::contains("props: description"))
        .stdout(predicate::str::contains("props: name*"));

    let output = tilekit(&env)
        .args(["list", "--format", "json"])
        .arg(&env.components_root)
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[1]["component"], "Greeting");
    assert_eq!(entries[1]["required"][0], "name");
}

#[test]
fn test_config_command() {
    let env = TestEnvironment::new().unwrap();

    tilekit(&env)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("precedence = \"inline-first\""))
        .stdout(predicate::str::contains("max_nesting_depth = 10"));

    let config = env.path().join("tilekit.toml");
    std::fs::write(&config, "precedence = \"file-first\"\n").unwrap();
    tilekit(&env)
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("precedence = \"file-first\""));

    tilekit(&env).args(["config", "--path"]).assert().success().stdout("(defaults)\n");
}

#[test]
fn test_missing_config_file_fails() {
    let env = TestEnvironment::new().unwrap();

    tilekit(&env)
        .args(["--config", "missing.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}
