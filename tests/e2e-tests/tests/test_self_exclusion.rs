//! The helper must never report or kill the process it runs in.

use std::sync::Arc;
use std::time::Duration;

use e2e_tests::own_process_name;
use prochelper_process::{HelperEvent, KillStatus, MemoryLog, ProcessHelper};

#[test]
fn test_kill_all_on_own_name_spares_self() {
    let own_name = own_process_name();
    let own_pid = std::process::id();

    let log = Arc::new(MemoryLog::new());
    let helper = ProcessHelper::new().log_to(log.clone());

    let matches = helper.find_running(&own_name).unwrap();
    assert!(matches.iter().any(|p| p.pid() == own_pid));

    assert!(!helper.is_running(&own_name).unwrap());

    let outcomes = helper
        .kill_all_with_outcomes(&own_name, Duration::from_millis(500))
        .unwrap();

    let own: Vec<_> = outcomes.iter().filter(|o| o.pid == own_pid).collect();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].status, KillStatus::SkippedSelf);
    assert!(log.events().contains(&HelperEvent::SkippedSelf {
        name: own_name.clone(),
        pid: own_pid,
    }));

    // Still here to make the assertion
    assert!(prochelper_process::process_exists(own_pid).unwrap());
}
