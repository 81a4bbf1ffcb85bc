use std::process::{Command, Output};

fn fixture_path() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/tests/fixtures/shop/snapshot.json")
}

fn archrecon_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_archrecon"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    archrecon_cmd()
        .args(args)
        .output()
        .expect("failed to run archrecon")
}

fn json_of(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "archrecon failed: stdout={stdout}, stderr={stderr}"
    );
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_score_text_report() {
    let output = run(&["score", &fixture_path()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "score failed: {stdout}");
    assert!(
        stdout.contains("Candidate Scores"),
        "should contain header: {stdout}"
    );
    assert!(
        stdout.contains("EfferentCoupling") && stdout.contains("SliceLayerArchitectureQuality"),
        "should list metrics: {stdout}"
    );
}

#[test]
fn test_score_json_covers_all_pairs() {
    let value = json_of(&run(&["score", &fixture_path(), "--json"]));

    let metrics = value["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 4);

    // shop, orders and billing give three unordered pairs, scored both ways.
    let pairs = value["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 6);
    for pair in pairs {
        for metric in metrics {
            let score = pair["scores"][metric.as_str().unwrap()].as_f64();
            assert!(score.is_some_and(f64::is_finite), "bad score in {pair}");
        }
    }

    let orders_billing = pairs
        .iter()
        .find(|p| p["source"] == "orders" && p["target"] == "billing")
        .unwrap();
    // Only OrderRepository -> java.util.List leaves the union; the
    // blacklisted type stays in the graph but not in the grouping.
    assert_eq!(
        orders_billing["scores"]["archrecon.metrics.EfferentCoupling"],
        1.0
    );
}

#[test]
fn test_bind_json_with_default_policy() {
    let value = json_of(&run(&["bind", &fixture_path(), "--json"]));

    let bindings = value["bindings"].as_array().unwrap();
    let summary: Vec<(String, String)> = bindings
        .iter()
        .map(|b| {
            (
                b["composite"].as_str().unwrap().to_string(),
                b["interface"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("<system>".to_string(), "IOrders".to_string()),
            ("shop".to_string(), "IOrders".to_string()),
            ("shop".to_string(), "IInvoices".to_string()),
        ]
    );
    assert_eq!(bindings[0]["instance"], "sys.shop");

    let issues = value["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["issue"], "no_matching_role");
    assert_eq!(issues[0]["interface"], "IAudit");
    assert_eq!(value["summary"]["clean"], false);
}

#[test]
fn test_bind_warns_on_stderr() {
    let output = run(&["bind", &fixture_path()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "bind failed: {stderr}");
    assert!(stdout.contains("Issues (1 found)"), "{stdout}");
    assert!(stderr.contains("IAudit"), "warning should be logged: {stderr}");
}

#[test]
fn test_bind_with_exhibit_unbound_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[binder]\nexhibit_all_provided = false\n").unwrap();

    let value = json_of(&run(&[
        "bind",
        &fixture_path(),
        "--json",
        "--config",
        config.to_str().unwrap(),
    ]));

    // Every provided role is a connector endpoint once the composites
    // instantiate their sub-components.
    assert!(value["bindings"].as_array().unwrap().is_empty());
    assert_eq!(value["issues"].as_array().unwrap().len(), 1);
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archrecon_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archrecon init");
    assert!(output.status.success(), "init should succeed");

    let config_path = dir.path().join(".archrecon.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[name_resemblance]"));
    assert!(content.contains("[binder]"));

    let again = archrecon_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archrecon init");
    assert_eq!(again.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));
}

#[test]
fn test_missing_snapshot_exits_with_error() {
    let output = run(&["score", "does/not/exist.json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("exist.json"), "{stderr}");
}

#[test]
fn test_inconsistent_snapshot_exits_with_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let snapshot = dir.path().join("broken.json");
    std::fs::write(
        &snapshot,
        r#"{"types": [{"name": "A"}], "accesses": [{"from": "A", "to": "Ghost"}]}"#,
    )
    .unwrap();

    let output = run(&["score", snapshot.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("Ghost"), "{stderr}");
}

#[test]
fn test_duplicate_component_exits_with_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let snapshot = dir.path().join("dup.json");
    std::fs::write(
        &snapshot,
        r#"{
            "components": [
                {"id": "orders", "name": "Orders"},
                {"id": "orders", "name": "Orders again"}
            ],
            "links": {"sub_components": [{"component": "orders"}]}
        }"#,
    )
    .unwrap();

    let output = run(&["bind", snapshot.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("declared more than once"), "{stderr}");
}

#[test]
fn test_bind_without_system_model_reports_missing_instances() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let snapshot = dir.path().join("no_system.json");
    std::fs::write(
        &snapshot,
        r#"{
            "components": [{
                "id": "orders",
                "name": "Orders",
                "provided_roles": [
                    {"id": "orders.p.IOrders", "kind": "operation", "interface": "IOrders"}
                ]
            }],
            "links": {"sub_components": [{
                "component": "orders",
                "provided_interfaces": [{"interface": "IOrders"}]
            }]}
        }"#,
    )
    .unwrap();

    let output = run(&["bind", snapshot.to_str().unwrap(), "--json"]);
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let value = json_of(&output);

    assert_eq!(value["bindings"].as_array().unwrap().len(), 1);
    assert!(value["bindings"][0]["instance"].is_null());
    assert_eq!(value["issues"][0]["issue"], "no_matching_instance");
    assert!(stderr.contains("no system model"), "{stderr}");
}
