//! Integration tests for the `lez` binary entry point.
//!
//! Exercises help output, usage errors and the setup check against both a
//! missing engine and a stand-in engine script.

use std::fs;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
#[cfg(unix)]
use std::process::{Command, Stdio};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn help_succeeds() {
    let mut command = cargo_bin_cmd!("lez");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("low-emission zone"));
}

#[test]
fn unknown_format_is_a_usage_error() {
    let mut command = cargo_bin_cmd!("lez");
    command.args(["--format", "yaml", "--check"]);
    command.assert().failure().stderr(contains("yaml"));
}

#[test]
fn check_fails_when_the_engine_is_missing() {
    let mut command = cargo_bin_cmd!("lez");
    command.args([
        "--engine-executable",
        "/nonexistent/lez-test-engine",
        "--check",
    ]);
    command
        .assert()
        .failure()
        .stderr(contains("was not found"));
}

#[test]
fn engine_can_be_configured_through_the_environment() {
    let mut command = cargo_bin_cmd!("lez");
    command.env("LEZ_ENGINE_EXECUTABLE", "/nonexistent/lez-env-engine");
    command.args(["--format", "json", "--check"]);
    command
        .assert()
        .failure()
        .stdout(contains("\"kind\":\"setup_error\""))
        .stdout(contains("lez-env-engine"));
}

/// Writes a shell script that behaves like the inference engine for the
/// three invocations the binary makes.
#[cfg(unix)]
fn fake_engine(dir: &TempDir) -> String {
    let script = dir.path().join("fake-engine");
    fs::write(
        &script,
        "#!/bin/sh\n\
         case \"$1\" in\n\
           --version) echo 'Fake engine 1.0' ;;\n\
           *) case \"$3\" in\n\
                *'LEZ SETUP OK'*) echo 'LEZ SETUP OK' ;;\n\
                *) echo 'You may enter SW1A.' ;;\n\
              esac ;;\n\
         esac\n",
    )
    .expect("write fake engine");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("mark executable");
    fs::write(dir.path().join("kb.pl"), "allowed(_).\n").expect("write rule base");
    fs::write(dir.path().join("dcg.pl"), "process_tokens(_).\n").expect("write grammar");
    script.to_string_lossy().into_owned()
}

#[cfg(unix)]
#[test]
fn one_shot_question_is_answered_by_the_engine() {
    let dir = TempDir::new().expect("create temp dir");
    let engine = fake_engine(&dir);
    let mut command = cargo_bin_cmd!("lez");
    command.current_dir(dir.path());
    command.args([
        "--engine-executable",
        engine.as_str(),
        "can",
        "my",
        "van",
        "enter",
        "sw1a",
    ]);
    command
        .assert()
        .success()
        .stdout("You may enter SW1A.\n");
}

#[cfg(unix)]
#[test]
fn interactive_session_reads_questions_from_stdin() {
    let dir = TempDir::new().expect("create temp dir");
    let engine = fake_engine(&dir);
    let mut command = cargo_bin_cmd!("lez");
    command.current_dir(dir.path());
    command.args(["--engine-executable", engine.as_str()]);
    command.write_stdin("can my van enter sw1a\nexit\n");
    command
        .assert()
        .success()
        .stdout(contains("Engine ready: Fake engine 1.0"))
        .stdout(contains("You may enter SW1A."))
        .stdout(contains("Goodbye!"));
}

#[cfg(unix)]
#[test]
fn interrupt_at_the_prompt_says_goodbye() {
    let dir = TempDir::new().expect("create temp dir");
    let engine = fake_engine(&dir);
    let mut child = Command::new(env!("CARGO_BIN_EXE_lez"))
        .current_dir(dir.path())
        .args(["--engine-executable", engine.as_str()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn lez");
    let mut stdout = child.stdout.take().expect("piped stdout");

    let mut seen = Vec::new();
    let mut chunk = [0_u8; 256];
    while !String::from_utf8_lossy(&seen).contains("Your query") {
        let read = stdout.read(&mut chunk).expect("read stdout");
        assert!(
            read > 0,
            "lez exited before prompting: {}",
            String::from_utf8_lossy(&seen)
        );
        seen.extend_from_slice(&chunk[..read]);
    }

    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("send SIGINT");
    assert!(sent.success());

    stdout.read_to_end(&mut seen).expect("read remaining stdout");
    let status = child.wait().expect("wait for lez");
    assert!(status.success(), "status: {status}");
    let output = String::from_utf8_lossy(&seen);
    assert!(output.ends_with("Goodbye!\n"), "stdout: {output}");
}
