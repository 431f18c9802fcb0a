//! End-to-end tests of the `ninja-synth` binary using `assert_cmd`.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use test_support::PlanWorkspace;

const PLAN: &str = r"
source: build.bfg
rules:
  - name: touch
    command: [touch, {var: out}]
builds:
  - {outputs: stamp, rule: touch}
command_builds:
  - outputs: greet
    commands:
      env: {NAME: world}
      commands:
        - [echo, hello]
        - [echo, {var: NAME}]
defaults: [stamp]
";

fn ninja_synth() -> Result<Command> {
    Command::cargo_bin("ninja-synth").context("locate ninja-synth binary")
}

#[test]
fn writes_build_ninja_next_to_the_plan() -> Result<()> {
    let workspace = PlanWorkspace::new()?;
    workspace.write("build.plan.yml", PLAN)?;
    ninja_synth()?
        .current_dir(workspace.root())
        .args(["--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let ninja = fs::read_to_string(workspace.root().join("build.ninja"))?;
    ensure!(ninja.contains("rule touch\n"), "unexpected output:\n{ninja}");
    ensure!(ninja.ends_with("default stamp\n"));
    Ok(())
}

#[test]
fn dash_streams_to_stdout() -> Result<()> {
    let workspace = PlanWorkspace::new()?;
    let plan = workspace.write("plan.yml", PLAN)?;
    ninja_synth()?
        .current_dir(workspace.root())
        .arg("--file")
        .arg(plan.as_str())
        .args(["--output", "-", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Do not edit this file!"))
        .stdout(predicate::str::contains("build stamp: touch\n"));
    ensure!(
        !workspace.root().join("-").exists(),
        "no file named '-' may be created"
    );
    ensure!(!workspace.root().join("build.ninja").exists());
    Ok(())
}

#[test]
fn windows_platform_wraps_shell_commands() -> Result<()> {
    let workspace = PlanWorkspace::new()?;
    workspace.write("build.plan.yml", PLAN)?;
    ninja_synth()?
        .current_dir(workspace.root())
        .args(["-o", "-", "--platform", "windows"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "  cmd = cmd /s /c \"export NAME=world && echo hello && echo ${NAME}\"\n",
        ));
    Ok(())
}

#[test]
fn invalid_plan_fails_without_writing_output() -> Result<()> {
    let workspace = PlanWorkspace::new()?;
    workspace.write(
        "build.plan.yml",
        "source: build.bfg\nbuilds:\n  - {outputs: a, rule: missing}\n",
    )?;
    ninja_synth()?
        .current_dir(workspace.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rule"));
    ensure!(!workspace.root().join("build.ninja").exists());
    Ok(())
}

#[test]
fn missing_plan_is_reported() -> Result<()> {
    let workspace = PlanWorkspace::new()?;
    ninja_synth()?
        .current_dir(workspace.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("build.plan.yml"));
    Ok(())
}
