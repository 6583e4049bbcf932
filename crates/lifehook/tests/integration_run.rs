//! Integration tests for `lifehook run`
//!
//! Exec hooks use ordinary host binaries as the "runtime" so no container
//! engine is needed: `echo` prints the `exec <id> <cmd...>` argv it receives
//! and `false` fails.

use anyhow::Result;
use assert_cmd::Command;
use predicates::str;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lifehook() -> Result<Command> {
    let mut cmd = Command::cargo_bin("lifehook")?;
    cmd.env_remove("LIFEHOOK_FEATURE_GATES")
        .env_remove("LIFEHOOK_RUNTIME")
        .env_remove("LIFEHOOK_LOG_FORMAT");
    Ok(cmd)
}

fn write_manifest(lifecycle: &str, ports: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            // test manifest
            "pod": {{ "namespace": "nsFoo", "name": "podFoo" }},
            "container": {{
                "name": "containerFoo",
                "ports": {ports},
                "lifecycle": {lifecycle},
            }},
        }}"#
    )?;
    Ok(file)
}

#[cfg(unix)]
#[test]
fn test_run_exec_hook_prints_output() -> Result<()> {
    let manifest = write_manifest(
        r#"{ "postStart": { "exec": { "command": ["ls", "-a"] } } }"#,
        "[]",
    )?;

    lifehook()?
        .args(["run", "--container-id", "docker://abc1234", "--runtime-path", "echo"])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .success()
        .stdout(str::contains("exec abc1234 ls -a"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_run_exec_hook_failure_message() -> Result<()> {
    let manifest = write_manifest(
        r#"{ "preStop": { "exec": { "command": ["ls", "-a"] } } }"#,
        "[]",
    )?;

    lifehook()?
        .args([
            "run",
            "--container-id",
            "docker://abc1234",
            "--runtime-path",
            "false",
            "--phase",
            "pre-stop",
        ])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .code(1)
        .stdout(str::contains(
            "Exec lifecycle hook ([ls -a]) for Container \"containerFoo\" in Pod \"podFoo_nsFoo()\" failed - error: command 'ls -a' exited with 1, message: \"\"",
        ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_http_hook_returns_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/warmup"))
        .and(header("Foo", "bar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("warmed up"))
        .mount(&server)
        .await;

    let port = server.address().port();
    let manifest = write_manifest(
        &format!(
            r#"{{ "postStart": {{ "httpGet": {{
                "host": "127.0.0.1",
                "port": "web",
                "path": "/warmup",
                "httpHeaders": [{{ "name": "Foo", "value": "bar" }}]
            }} }} }}"#
        ),
        &format!(r#"[{{ "name": "web", "containerPort": {port} }}]"#),
    )?;

    lifehook()?
        .args(["run", "--container-id", "docker://abc1234", "--output", "json"])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .success()
        .stdout(str::contains("\"message\":\"warmed up\""));
    Ok(())
}

#[test]
fn test_run_port_resolution_failure_json() -> Result<()> {
    let manifest = write_manifest(
        r#"{ "postStart": { "httpGet": { "host": "foo", "port": "missing", "path": "bar" } } }"#,
        "[]",
    )?;

    let output = lifehook()?
        .args(["run", "--container-id", "docker://abc1234", "--output", "json"])
        .arg("--manifest")
        .arg(manifest.path())
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["kind"], "PortResolutionError");
    assert_eq!(
        value["message"],
        "HTTP lifecycle hook (bar) for Container \"containerFoo\" in Pod \"podFoo_nsFoo()\" failed - error: couldn't find port: missing in container \"containerFoo\", message: \"\""
    );
    Ok(())
}

#[test]
fn test_run_without_handler_for_phase_is_skipped() -> Result<()> {
    let manifest = write_manifest("{}", "[]")?;

    lifehook()?
        .args([
            "run",
            "--container-id",
            "docker://abc1234",
            "--phase",
            "pre-stop",
            "--output",
            "json",
        ])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .success()
        .stdout(str::contains("\"skipped\":true"));
    Ok(())
}

#[test]
fn test_run_empty_handler_is_invalid() -> Result<()> {
    let manifest = write_manifest(r#"{ "postStart": {} }"#, "[]")?;

    lifehook()?
        .args(["run", "--container-id", "docker://abc1234"])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .code(1)
        .stdout(str::contains("Cannot run handler: invalid handler"));
    Ok(())
}

#[test]
fn test_run_rejects_bad_container_id() -> Result<()> {
    let manifest = write_manifest("{}", "[]")?;

    lifehook()?
        .args(["run", "--container-id", "abc1234"])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .failure()
        .stderr(str::contains("Invalid container ID"));
    Ok(())
}

#[test]
fn test_run_missing_manifest() -> Result<()> {
    lifehook()?
        .args([
            "run",
            "--container-id",
            "docker://abc1234",
            "--manifest",
            "/nonexistent/hooks.jsonc",
        ])
        .assert()
        .failure()
        .stderr(str::contains("Failed to load manifest"));
    Ok(())
}

#[test]
fn test_run_rejects_unknown_feature_gate() -> Result<()> {
    let manifest = write_manifest("{}", "[]")?;

    lifehook()?
        .args(["run", "--container-id", "docker://abc1234"])
        .args(["--feature-gates", "NoSuchGate=true"])
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .failure()
        .stderr(str::contains("unrecognized feature gate: NoSuchGate"));
    Ok(())
}
