//! CLI tests for ibx-provider.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const MANIFEST: &str = r#"
resources:
  - name: core
    type: infoblox_ipv4_network_container
    config:
      network_view: default
      cidr: 10.0.0.0/24
  - name: racks
    type: infoblox_ipv4_network_container
    config:
      network_view: default
      parent_cidr: 10.0.0.0/16
      cidr: ""
      allocate_prefix_len: 24
      ext_attrs: '{"Tenant ID": "acme"}'
"#;

fn cmd() -> Command {
    Command::cargo_bin("ibx-provider").unwrap()
}

#[test]
fn schema_lists_options() {
    cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("network_view"))
        .stdout(predicate::str::contains("allocate_prefix_len"));
}

#[test]
fn schema_json_for_ipv6() {
    let output = cmd()
        .args(["schema", "--type", "infoblox_ipv6_network_container", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["attributes"]["cidr"]["required"], true);
    assert_eq!(schema["attributes"]["allocate_prefix_len"]["default"], 0);
}

#[test]
fn schema_rejects_unknown_type() {
    cmd()
        .args(["schema", "--type", "infoblox_network"])
        .assert()
        .failure();
}

#[test]
fn validate_accepts_manifest() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("resources.yaml");
    fs::write(&path, MANIFEST).unwrap();

    cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("core: ok (direct create)"))
        .stdout(predicate::str::contains("racks: ok (allocate /24 from parent)"));
}

#[test]
fn validate_reports_bad_prefix() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("resources.json");
    fs::write(
        &path,
        r#"{"resources": [{"name": "bad", "type": "infoblox_ipv4_network_container",
            "config": {"network_view": "default", "cidr": "10.0.0.0/24", "allocate_prefix_len": 1}}]}"#,
    )
    .unwrap();

    cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("prefixLen is less than 2"));
}

#[test]
fn plan_shows_connector_calls() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("resources.yml");
    fs::write(&path, MANIFEST).unwrap();

    cmd()
        .arg("plan")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "create 10.0.0.0/24 in network view 'default' (ipv4)",
        ))
        .stdout(predicate::str::contains(
            "lookup parent 10.0.0.0/16 in network view 'default' (ipv4) [tenant acme]",
        ))
        .stdout(predicate::str::contains(
            "allocate /24 from 10.0.0.0/16 in network view 'default' (ipv4) [tenant acme]",
        ));
}

#[test]
fn plan_reads_manifest_from_env() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("resources.yaml");
    fs::write(&path, MANIFEST).unwrap();

    let output = cmd()
        .args(["plan", "--json"])
        .env("IBX_MANIFEST", &path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["name"], "core");
    assert_eq!(entries[0]["calls"].as_array().unwrap().len(), 1);
    assert_eq!(entries[1]["calls"].as_array().unwrap().len(), 2);
}
