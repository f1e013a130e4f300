use std::fs;
use std::path::Path;

use machsweep::{canonicalize_or_current, infer_binary_name};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let result = canonicalize_or_current(nested.to_str().unwrap()).expect("canonicalize nested");
    assert_eq!(result, nested.canonicalize().expect("canonicalize nested"));
}

#[test]
fn canonicalize_or_current_joins_missing_relative_path() {
    let result = canonicalize_or_current("definitely/missing/App").expect("joined");
    assert!(result.is_absolute());
    assert!(result.ends_with("definitely/missing/App"));
}

#[test]
fn infer_binary_name_uses_last_path_component() {
    assert_eq!(infer_binary_name(Path::new("/tmp/build/SampleApp")), "SampleApp");
    assert_eq!(infer_binary_name(Path::new("dumps/app.otool.txt")), "app.otool.txt");
}

#[test]
fn infer_binary_name_falls_back_when_missing() {
    assert_eq!(infer_binary_name(Path::new("/")), "unnamed-binary");
}
