#![cfg(unix)]

mod common;

use anyhow::Result;
use cmdivator::scanner::{LocationSet, Scanner, ScannerState};
use common::CommandTree;
use crossbeam_channel::{RecvTimeoutError, bounded, unbounded};
use std::time::Duration;

const PASS_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_requests_during_a_pass_coalesce_into_one() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "foo.sh")?;

    let scanner = Scanner::new(tree.config());
    let (entered_tx, entered_rx) = unbounded::<()>();
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let (passes_tx, passes_rx) = unbounded::<LocationSet>();

    scanner.start(move |locations| {
        let _ = entered_tx.send(());
        // Only the first pass blocks; the gate is closed after one release
        let _ = gate_rx.recv();
        let _ = passes_tx.send(locations);
    })?;

    // Initial pass is now parked inside the callback
    entered_rx.recv_timeout(PASS_TIMEOUT)?;
    scanner.scan()?;
    scanner.scan()?;
    scanner.scan()?;

    gate_tx.send(())?;
    drop(gate_tx);

    let first = passes_rx.recv_timeout(PASS_TIMEOUT)?;
    let second = passes_rx.recv_timeout(PASS_TIMEOUT)?;
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    assert!(matches!(
        passes_rx.recv_timeout(Duration::from_millis(500)),
        Err(RecvTimeoutError::Timeout)
    ));
    assert_eq!(scanner.completed_passes(), 2);

    scanner.stop();
    Ok(())
}

#[test]
fn test_change_triggers_rescan() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "foo.sh")?;

    let scanner = Scanner::new(
        tree.config()
            .with_watching(true)
            .with_debounce(Duration::from_millis(50)),
    );
    let (tx, rx) = unbounded::<LocationSet>();
    scanner.start(move |locations| {
        let _ = tx.send(locations);
    })?;

    let initial = rx.recv_timeout(PASS_TIMEOUT)?;
    assert_eq!(initial.len(), 1);

    if scanner.watched_roots().is_empty() {
        // No OS watch available in this environment
        scanner.stop();
        return Ok(());
    }

    tree.script(&tree.system, "bar.sh")?;

    let mut latest = initial;
    while latest.len() != 2 {
        latest = rx.recv_timeout(PASS_TIMEOUT)?;
    }
    assert!(latest.iter().any(|l| l.path.ends_with("bar.sh")));

    scanner.stop();
    Ok(())
}

#[test]
fn test_no_callbacks_after_stop() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "foo.sh")?;

    let scanner = Scanner::new(tree.config().with_watching(true));
    let (tx, rx) = unbounded::<LocationSet>();
    scanner.start(move |locations| {
        let _ = tx.send(locations);
    })?;
    rx.recv_timeout(PASS_TIMEOUT)?;

    scanner.stop();
    assert_eq!(scanner.state(), ScannerState::Idle);
    assert!(scanner.watched_roots().is_empty());
    let passes = scanner.completed_passes();

    tree.script(&tree.user, "late.sh")?;
    assert!(scanner.scan().is_err());

    // The worker dropped the callback when it exited
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(300)),
        Err(RecvTimeoutError::Disconnected)
    ));
    assert_eq!(scanner.completed_passes(), passes);
    Ok(())
}

#[test]
fn test_restart_after_stop() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "foo.sh")?;

    let scanner = Scanner::new(tree.config());
    for _ in 0..2 {
        let (tx, rx) = unbounded::<LocationSet>();
        scanner.start(move |locations| {
            let _ = tx.send(locations);
        })?;
        assert_eq!(rx.recv_timeout(PASS_TIMEOUT)?.len(), 1);
        scanner.stop();
    }
    assert_eq!(scanner.completed_passes(), 2);
    Ok(())
}

#[test]
fn test_start_twice_fails() -> Result<()> {
    let tree = CommandTree::new()?;
    let scanner = Scanner::new(tree.config());

    scanner.start(|_| {})?;
    assert!(scanner.start(|_| {}).is_err());
    scanner.stop();
    Ok(())
}

#[test]
fn test_missing_root_yields_empty_pass() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "foo.sh")?;
    std::fs::remove_dir_all(&tree.system)?;

    let locations = Scanner::new(tree.config()).scan_now();
    assert_eq!(locations.len(), 1);
    Ok(())
}
