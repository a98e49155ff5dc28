#![cfg(unix)]

mod common;

use anyhow::Result;
use cmdivator::command::{Command, CommandKind};
use cmdivator::error::CommandError;
use cmdivator::registry::CommandRegistry;
use cmdivator::scanner::Scanner;
use common::CommandTree;
use filetime::FileTime;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

fn by_name(registry: &CommandRegistry, name: &str) -> Arc<Command> {
    registry
        .find(name)
        .unwrap_or_else(|| panic!("command {name} not registered"))
}

#[test]
fn test_three_kinds_from_one_root() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.system, "foo.sh")?;
    tree.bundle(&tree.system, "bar")?;
    tree.definition(&tree.system, "baz.toml", "program = \"/usr/bin/echo\"\n")?;

    let scanner = Scanner::new(tree.config().with_max_depth(1));
    let registry = CommandRegistry::new();
    let changes = registry.rebuild(&scanner.scan_now());

    assert_eq!(changes.added.len(), 3);
    assert_eq!(registry.len(), 3);

    assert_eq!(by_name(&registry, "foo").kind(), CommandKind::Path);
    assert_eq!(by_name(&registry, "bar").kind(), CommandKind::Bundle);
    assert_eq!(by_name(&registry, "baz").kind(), CommandKind::Definition);

    let names: HashSet<_> = registry
        .all()
        .iter()
        .map(|c| c.listener_name().to_string())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|n| !n.is_empty()));
    Ok(())
}

#[test]
fn test_bundle_contents_are_not_commands() -> Result<()> {
    let tree = CommandTree::new()?;
    let bundle = tree.bundle(&tree.user, "bar")?;
    tree.script(&bundle, "helper.sh")?;

    let registry = CommandRegistry::new();
    registry.rebuild(&Scanner::new(tree.config()).scan_now());

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.all()[0].kind(), CommandKind::Bundle);
    Ok(())
}

#[test]
fn test_nested_commands_have_distinct_display_names() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "toggle.sh")?;
    tree.script(&tree.user, "Wifi/toggle.sh")?;
    tree.plain(&tree.user, "README")?;

    let registry = CommandRegistry::new();
    registry.rebuild(&Scanner::new(tree.config()).scan_now());

    let names: Vec<_> = registry
        .all()
        .iter()
        .map(|c| c.display_name().to_string())
        .collect();
    assert_eq!(names, vec!["Wifi → toggle", "toggle"]);
    Ok(())
}

#[test]
fn test_rebuild_twice_preserves_instances() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.system, "foo.sh")?;
    tree.bundle(&tree.user, "bar")?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();

    registry.rebuild(&scanner.scan_now());
    let before = registry.all();

    let changes = registry.rebuild(&scanner.scan_now());
    let after = registry.all();

    assert!(changes.is_empty());
    assert_eq!(changes.unchanged, 2);
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.listener_name(), new.listener_name());
        assert!(Arc::ptr_eq(old, new));
    }
    Ok(())
}

#[test]
fn test_removed_file_removes_exactly_its_command() -> Result<()> {
    let tree = CommandTree::new()?;
    let foo = tree.script(&tree.user, "foo.sh")?;
    tree.script(&tree.user, "keep.sh")?;
    tree.bundle(&tree.system, "bar")?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());

    let removed_name = by_name(&registry, "foo").listener_name().to_string();
    let keep = by_name(&registry, "keep");
    let bar = by_name(&registry, "bar");

    fs::remove_file(&foo)?;
    let changes = registry.rebuild(&scanner.scan_now());

    assert_eq!(changes.removed, vec![removed_name]);
    assert!(changes.added.is_empty());
    assert!(changes.replaced.is_empty());
    assert_eq!(changes.unchanged, 2);
    assert!(Arc::ptr_eq(&keep, &by_name(&registry, "keep")));
    assert!(Arc::ptr_eq(&bar, &by_name(&registry, "bar")));
    Ok(())
}

#[test]
fn test_modified_file_is_replaced() -> Result<()> {
    let tree = CommandTree::new()?;
    let definition = tree.definition(&tree.user, "baz.toml", "program = \"/usr/bin/echo\"\n")?;
    filetime::set_file_mtime(&definition, FileTime::from_unix_time(1_000_000, 0))?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());
    let old = by_name(&registry, "baz");

    fs::write(&definition, "name = \"Greeter\"\nprogram = \"/usr/bin/echo\"\n")?;
    filetime::set_file_mtime(&definition, FileTime::from_unix_time(2_000_000, 0))?;
    let changes = registry.rebuild(&scanner.scan_now());

    assert_eq!(changes.replaced, vec![old.listener_name().to_string()]);
    let new = registry.lookup(old.listener_name()).unwrap();
    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.display_name(), "Greeter");
    Ok(())
}

#[test]
fn test_delete_user_command_then_rescan() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.script(&tree.user, "mine.sh")?;
    tree.script(&tree.system, "theirs.sh")?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());

    let mine = by_name(&registry, "mine");
    mine.as_path().unwrap().delete()?;
    registry.rebuild(&scanner.scan_now());
    assert!(registry.find("mine").is_none());

    let theirs = by_name(&registry, "theirs");
    let err = theirs.as_path().unwrap().delete().unwrap_err();
    assert!(matches!(err, CommandError::NotRemovable { .. }));
    assert!(registry.rebuild(&scanner.scan_now()).is_empty());
    Ok(())
}

#[test]
fn test_only_path_commands_expose_delete() -> Result<()> {
    let tree = CommandTree::new()?;
    tree.bundle(&tree.user, "bar")?;
    tree.definition(&tree.user, "baz.toml", "program = \"/usr/bin/echo\"\n")?;

    let registry = CommandRegistry::new();
    registry.rebuild(&Scanner::new(tree.config()).scan_now());

    assert!(registry.all().iter().all(|c| c.as_path().is_none()));
    Ok(())
}

#[test]
fn test_symlink_to_same_file_yields_one_command() -> Result<()> {
    let tree = CommandTree::new()?;
    let target = tree.script(&tree.system, "foo.sh")?;
    std::os::unix::fs::symlink(&target, tree.user.join("foo-link.sh"))?;

    let registry = CommandRegistry::new();
    registry.rebuild(&Scanner::new(tree.config()).scan_now());

    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn test_symlinked_command_is_stable_across_rebuilds() -> Result<()> {
    let tree = CommandTree::new()?;
    let target = tree.script(&tree.system, "foo.sh")?;
    std::os::unix::fs::symlink(&target, tree.user.join("foo-link.sh"))?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());
    let first = registry.all().pop().expect("one command");

    // The system root claims the command, so it is never removable
    assert!(!first.as_path().unwrap().is_removable());
    assert_eq!(first.location().path, target);

    for _ in 0..50 {
        let changes = registry.rebuild(&scanner.scan_now());
        assert!(changes.is_empty(), "unchanged disk reported {changes:?}");

        let current = registry.all().pop().expect("one command");
        assert!(Arc::ptr_eq(&first, &current));
        assert!(!current.as_path().unwrap().is_removable());
    }

    let err = first.as_path().unwrap().delete().unwrap_err();
    assert!(matches!(err, CommandError::NotRemovable { .. }));
    assert!(target.exists());
    Ok(())
}

#[test]
fn test_bundle_whose_entry_point_loses_execute_bit_is_removed() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let tree = CommandTree::new()?;
    let bundle = tree.bundle(&tree.user, "bar")?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());
    let name = by_name(&registry, "bar").listener_name().to_string();

    fs::set_permissions(bundle.join("run"), fs::Permissions::from_mode(0o644))?;
    let changes = registry.rebuild(&scanner.scan_now());

    assert_eq!(changes.removed, vec![name]);
    assert!(registry.is_empty());
    Ok(())
}

#[test]
fn test_bundle_with_rewritten_entry_point_is_replaced() -> Result<()> {
    let tree = CommandTree::new()?;
    let bundle = tree.bundle(&tree.user, "bar")?;
    let run = bundle.join("run");
    filetime::set_file_mtime(&run, FileTime::from_unix_time(1_000_000, 0))?;
    filetime::set_file_mtime(&bundle, FileTime::from_unix_time(1_000_000, 0))?;

    let scanner = Scanner::new(tree.config());
    let registry = CommandRegistry::new();
    registry.rebuild(&scanner.scan_now());
    let old = by_name(&registry, "bar");

    fs::write(&run, "#!/bin/sh\necho changed\n")?;
    filetime::set_file_mtime(&run, FileTime::from_unix_time(2_000_000, 0))?;
    filetime::set_file_mtime(&bundle, FileTime::from_unix_time(1_000_000, 0))?;
    let changes = registry.rebuild(&scanner.scan_now());

    assert_eq!(changes.replaced, vec![old.listener_name().to_string()]);
    assert!(!Arc::ptr_eq(&old, &by_name(&registry, "bar")));
    Ok(())
}
