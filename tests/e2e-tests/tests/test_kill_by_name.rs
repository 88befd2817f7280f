//! Start a uniquely named process, find it by name, kill it by name.

#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use e2e_tests::{is_standalone_binary, stage_named_copy, system_binary, unique_name, wait_until};
use prochelper_process::{HelperEvent, KillOutcome, KillStatus, MemoryLog, ProcessHelper};

#[test]
fn test_kill_by_name() {
    let Some(sleep) = system_binary("sleep") else {
        eprintln!("skipping: no sleep binary found");
        return;
    };
    if !is_standalone_binary(&sleep, "sleep") {
        eprintln!("skipping: sleep is a multi-call binary and cannot be renamed");
        return;
    }

    let name = unique_name("phsleep");
    let staged = stage_named_copy(&sleep, &name, Path::new(env!("CARGO_TARGET_TMPDIR")))
        .expect("failed to stage sleep binary");

    let log = Arc::new(MemoryLog::new());
    let helper = ProcessHelper::new().log_to(log.clone());

    assert!(!helper.is_running(&name).unwrap());

    let descriptor = helper.create_hidden_descriptor(staged.to_str().unwrap(), "30");
    let mut child = descriptor.spawn().expect("failed to start staged process");
    let pid = child.id();

    assert!(
        wait_until(|| helper.is_running(&name).unwrap(), Duration::from_secs(5)),
        "started process never showed up by name"
    );
    let found = helper.find_running(&name).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pid(), pid);

    log.clear();
    let outcomes = helper
        .kill_all_with_outcomes(&name, Duration::from_secs(10))
        .unwrap();
    assert_eq!(outcomes, vec![KillOutcome { pid, status: KillStatus::Terminated }]);
    assert!(log.events().contains(&HelperEvent::Killed { name: name.clone(), pid }));

    let status = child.wait().unwrap();
    assert!(!status.success());
    assert!(!helper.is_running(&name).unwrap());

    let _ = std::fs::remove_file(staged);
}
