#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::process::Command;

pub const TODAY: &str = "2024-03-15";

pub fn spendbook_cmd(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spendbook"));
    cmd.env("SPENDBOOK_HOME", home.path());
    cmd.env("SPENDBOOK_TODAY", TODAY);
    cmd.env_remove("SPENDBOOK_LOG");
    cmd
}

pub fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = spendbook_cmd(home);
    cmd.args(args);
    cmd.assert().success();
}

pub fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = spendbook_cmd(home);
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

/// Pulls the id out of "... (<id>)." confirmation lines.
pub fn created_id(stdout: &str) -> String {
    let line = stdout.lines().next().expect("confirmation line");
    let start = line.rfind('(').expect("id open paren") + 1;
    let end = line.rfind(')').expect("id close paren");
    line[start..end].to_string()
}

pub fn add_tx(home: &tempfile::TempDir, kind: &str, amount: &str, category: &str, date: &str, note: &str) -> String {
    let out = run_ok_out(
        home,
        &[
            "tx", "add", kind, amount, "--category", category, "--date", date, "-m", note,
        ],
    );
    created_id(&out)
}
