#![cfg(unix)]

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn natmsg() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_natmsg"));
    command.arg("--log-level").arg("error");
    command
}

fn write_frame(writer: &mut impl Write, message: &str) {
    let payload = message.as_bytes();
    writer
        .write_all(&(payload.len() as i32).to_ne_bytes())
        .expect("length prefix should write");
    writer.write_all(payload).expect("payload should write");
    writer.flush().expect("stream should flush");
}

fn read_frame(reader: &mut impl Read) -> String {
    let mut prefix = [0u8; 4];
    reader
        .read_exact(&mut prefix)
        .expect("length prefix should be readable");
    let length = i32::from_ne_bytes(prefix);
    assert!(length > 0, "length prefix must be positive, got {length}");

    let mut payload = vec![0u8; length as usize];
    reader
        .read_exact(&mut payload)
        .expect("payload should be readable");
    String::from_utf8(payload).expect("payload should be UTF-8")
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<std::process::ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().expect("try_wait should succeed") {
            return Some(status);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn relayed_echo_roundtrip() {
    let mut relay = natmsg()
        .arg("relay")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("relay should start");

    let mut stdin = relay.stdin.take().expect("stdin should be piped");
    let mut stdout = relay.stdout.take().expect("stdout should be piped");

    write_frame(&mut stdin, "hello");
    let reply = read_frame(&mut stdout);
    assert_eq!(reply, r#"{"echo":"hello"}"#);
    assert_eq!(reply.len(), 16);

    write_frame(&mut stdin, "second message");
    assert_eq!(read_frame(&mut stdout), r#"{"echo":"second message"}"#);

    drop(stdin);
    let status = wait_with_timeout(&mut relay, Duration::from_secs(10))
        .expect("relay should exit after stdin closes");
    assert!(status.success());
}

#[test]
fn relay_exits_cleanly_on_immediate_stdin_close() {
    let mut relay = natmsg()
        .arg("relay")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("relay should start");

    drop(relay.stdin.take());
    let status = wait_with_timeout(&mut relay, Duration::from_secs(10))
        .expect("relay should exit after stdin closes");
    assert!(status.success());

    let _ = relay.stdout.take();
}

#[test]
fn malformed_length_prefix_fails_the_relay() {
    let mut relay = natmsg()
        .arg("relay")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("relay should start");

    let mut stdin = relay.stdin.take().expect("stdin should be piped");
    stdin
        .write_all(&(-1i32).to_ne_bytes())
        .expect("bytes should write");
    stdin.flush().expect("stream should flush");

    let status = wait_with_timeout(&mut relay, Duration::from_secs(10))
        .expect("relay should exit on a protocol violation");
    assert!(!status.success());
}

#[test]
#[cfg(target_os = "linux")]
fn killing_the_relay_terminates_the_processor() {
    let mut relay = natmsg()
        .arg("relay")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("relay should start");

    let processor_pid = wait_for_child_pid(relay.id(), Duration::from_secs(10))
        .expect("relay should spawn a processor");

    relay.kill().expect("relay should accept SIGKILL");
    let _ = relay.wait();

    let start = Instant::now();
    while process_alive(processor_pid) {
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "processor {processor_pid} outlived the relay"
        );
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(target_os = "linux")]
fn wait_for_child_pid(parent: u32, timeout: Duration) -> Option<u32> {
    let children_path = format!("/proc/{parent}/task/{parent}/children");
    let start = Instant::now();
    while start.elapsed() < timeout {
        if let Ok(children) = std::fs::read_to_string(&children_path) {
            if let Some(pid) = children.split_whitespace().next() {
                return pid.parse().ok();
            }
        }
        thread::sleep(Duration::from_millis(25));
    }
    None
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).exists()
}

#[test]
fn version_prints_package_version() {
    let output = natmsg()
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn register_writes_manifest_to_explicit_path() {
    let target = std::env::temp_dir().join(format!("natmsg-cli-register-{}.json", std::process::id()));

    let output = natmsg()
        .arg("register")
        .arg("--extension-id")
        .arg("abcdefghijklmnop")
        .arg("--manifest")
        .arg(&target)
        .output()
        .expect("register should run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(stdout.contains(&target.display().to_string()));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).expect("manifest should exist"))
            .expect("manifest should be JSON");
    assert_eq!(manifest["type"], "stdio");
    assert_eq!(
        manifest["allowed_origins"][0],
        "chrome-extension://abcdefghijklmnop/"
    );

    let _ = std::fs::remove_file(&target);
}
