use std::path::Path;

use machsweep_core::services::macho::{verify_macho, InputError};
use object::write::Object;
use object::{Architecture, BinaryFormat, Endianness, SectionKind};

fn write_macho(path: &Path) {
    let mut obj = Object::new(BinaryFormat::MachO, Architecture::X86_64, Endianness::Little);
    let text = obj.add_section(b"__TEXT".to_vec(), b"__text".to_vec(), SectionKind::Text);
    // ret
    obj.section_mut(text).set_data(vec![0xC3u8], 1);
    let bytes = obj.write().expect("write mach-o");
    std::fs::write(path, bytes).expect("write fixture");
}

#[test]
fn verify_accepts_macho_and_hashes_it() {
    let temp = tempfile::tempdir().unwrap();
    let bin = temp.path().join("SampleApp");
    write_macho(&bin);

    let verified = verify_macho(&bin).expect("verified");
    assert_eq!(verified.analyzed_path, bin);
    assert_eq!(verified.display_name(), "SampleApp");
    assert_eq!(verified.sha256.len(), 64);
    assert!(!verified.is_fat);
    assert!(!verified.is_staged());
}

#[test]
fn verify_stages_names_with_spaces() {
    let temp = tempfile::tempdir().unwrap();
    let bin = temp.path().join("My Sample App");
    write_macho(&bin);

    let verified = verify_macho(&bin).expect("verified");
    assert!(verified.is_staged());
    assert_eq!(verified.display_name(), "My Sample App");
    let staged_name = verified.analyzed_path.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(staged_name, "My_Sample_App");
    assert!(verified.analyzed_path.is_file());
    assert_eq!(std::fs::read(&verified.analyzed_path).unwrap(), std::fs::read(&bin).unwrap());
}

#[test]
fn verify_rejects_non_macho() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("notes.txt");
    std::fs::write(&file, b"just some text, definitely not an image").unwrap();

    let err = verify_macho(&file).unwrap_err();
    assert!(matches!(err, InputError::NotMachO(_)));
}

#[test]
fn verify_rejects_elf() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("elf.o");
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    std::fs::write(&file, obj.write().unwrap()).unwrap();

    assert!(matches!(verify_macho(&file), Err(InputError::NotMachO(_))));
}

#[test]
fn verify_reports_missing_file() {
    let err = verify_macho(Path::new("does_not_exist.bin")).unwrap_err();
    assert!(matches!(err, InputError::Missing(_)));
    assert!(err.to_string().contains("does_not_exist.bin"));
}
