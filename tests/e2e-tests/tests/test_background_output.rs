//! Background descriptors capture stdout and report exit.

#![cfg(unix)]

use std::io::Read;
use std::sync::mpsc;
use std::time::Duration;

use prochelper_process::ProcessHelper;

#[test]
fn test_background_descriptor_captures_output() {
    let helper = ProcessHelper::new();
    let descriptor = helper.create_background_descriptor("echo", "hello 'big world'");

    let (tx, rx) = mpsc::channel();
    let mut watched = descriptor
        .spawn_watched(move |pid, status| {
            let _ = tx.send((pid, status.map(|s| s.success()).unwrap_or(false)));
        })
        .expect("failed to start echo");

    let mut output = String::new();
    watched
        .take_stdout()
        .expect("stdout should be captured")
        .read_to_string(&mut output)
        .unwrap();
    assert_eq!(output, "hello big world\n");

    let (pid, success) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(pid, watched.pid());
    assert!(success);

    watched.join().unwrap();
}

#[test]
fn test_hidden_descriptor_does_not_capture() {
    let helper = ProcessHelper::new();
    let mut child = helper
        .create_hidden_descriptor("true", "")
        .spawn()
        .expect("failed to start true");

    assert!(child.take_stdout().is_none());
    assert!(child.wait().unwrap().success());
}
