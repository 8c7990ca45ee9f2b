use sfv_core::path_safety::{resolve, PathPolicy};
use sfv_core::verify::{verify_with_config, VerifyConfig};
use sfv_core::{Manifest, NoProgress};
use std::fs;
use std::path::Path;

const CONFINED: PathPolicy = PathPolicy { confine: true, follow_symlinks: true };
const NO_LINKS: PathPolicy = PathPolicy { confine: true, follow_symlinks: false };

#[test]
fn default_policy_is_a_plain_join() {
    let root = Path::new("/data");
    let p = resolve(root, Path::new("../up/file.bin"), PathPolicy::default()).unwrap();
    assert_eq!(p, Path::new("/data/../up/file.bin"));
}

#[test]
fn confined_rejects_absolute_and_parent_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let err = resolve(tmp.path(), Path::new("/etc/passwd"), CONFINED).unwrap_err();
    assert!(format!("{err:#}").contains("absolute"));
    let err = resolve(tmp.path(), Path::new("a/../../b"), CONFINED).unwrap_err();
    assert!(format!("{err:#}").contains("parent traversal"));
}

#[test]
fn confined_accepts_nested_files() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("a/b")).unwrap();
    fs::write(tmp.path().join("a/b/c.bin"), b"x").unwrap();
    let p = resolve(tmp.path(), Path::new("a/b/c.bin"), CONFINED).unwrap();
    assert!(p.ends_with("a/b/c.bin"));
    let p = resolve(tmp.path(), Path::new("a/b/c.bin"), NO_LINKS).unwrap();
    assert_eq!(p, tmp.path().join("a/b/c.bin"));
}

#[cfg(target_family = "unix")]
#[test]
fn symlinks_follow_policy() {
    use std::os::unix::fs::symlink;

    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("root");
    fs::create_dir_all(root.join("target")).unwrap();
    fs::write(root.join("target/file.txt"), b"hello\n").unwrap();
    fs::write(tmp.path().join("outside.txt"), b"outside\n").unwrap();
    symlink(root.join("target"), root.join("safe")).unwrap();
    symlink(tmp.path(), root.join("evil")).unwrap();

    let err = resolve(&root, Path::new("safe/file.txt"), NO_LINKS).unwrap_err();
    assert!(format!("{err:#}").contains("symlink"));
    assert!(resolve(&root, Path::new("safe/file.txt"), CONFINED).is_ok());

    let err = resolve(&root, Path::new("evil/outside.txt"), CONFINED).unwrap_err();
    assert!(format!("{err:#}").contains("escapes root"));
}

#[test]
fn rejected_path_is_a_per_file_error() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("ok.txt"), b"123456789").unwrap();
    let m = Manifest::parse(b"../escape.txt 00000000\nok.txt CBF43926\n").unwrap();
    let cfg = VerifyConfig { path_policy: CONFINED, ..VerifyConfig::default() };
    let batch = verify_with_config(&m, tmp.path(), &cfg, &mut NoProgress);
    assert!(batch.files[0].err().contains("parent traversal"));
    assert!(batch.files[1].is_ok());
}
