use machsweep_core::extract::{
    class_chunks, declared_class_names, extract, referenced_class_names, referenced_selectors,
    section_region,
};
use machsweep_core::model::ChunkFlavor;

const SAMPLE_DUMP: &str = include_str!("fixtures/sample_dump.txt");
const SAMPLE_SELREFS: &str = include_str!("fixtures/sample_selrefs.txt");

#[test]
fn section_region_stops_at_next_header() {
    let region = section_region(SAMPLE_DUMP, "__objc_classrefs").expect("classrefs region");
    assert!(region.contains("_OBJC_CLASS_$_UIColor"));
    assert!(!region.contains("__objc_superrefs"));
    assert_eq!(region.lines().filter(|l| !l.trim().is_empty()).count(), 3);
}

#[test]
fn section_region_runs_to_end_of_dump_for_last_section() {
    let dump = "Contents of (__DATA,__objc_classrefs) section\n\
                0000000100012300 0x0 _OBJC_CLASS_$_Foo\n";
    let region = section_region(dump, "__objc_classrefs").expect("region");
    assert!(region.contains("_OBJC_CLASS_$_Foo"));
}

#[test]
fn section_region_accepts_data_const_segment() {
    let dump = "Contents of (__DATA_CONST,__objc_classlist) section\n\
                0000000100010000 0x100012458 _OBJC_CLASS_$_Foo\n\
                Contents of (__DATA,__objc_classrefs) section\n";
    let region = section_region(dump, "__objc_classlist").expect("region");
    assert!(region.contains("_OBJC_CLASS_$_Foo"));
    assert!(!region.contains("__objc_classrefs"));
}

#[test]
fn section_region_is_none_when_absent() {
    assert!(section_region("no sections here", "__objc_classlist").is_none());
    assert!(section_region(SAMPLE_DUMP, "__objc_catlist").is_none());
}

#[test]
fn declared_class_names_only_takes_record_names() {
    let names: Vec<String> = declared_class_names(SAMPLE_DUMP).into_iter().collect();
    // Method names, the `_model` ivar and metaclass duplicates are not classes.
    assert_eq!(names, vec!["Bar", "ViewController", "_TtC5MyApp6Runner"]);
}

#[test]
fn referenced_class_names_reads_classrefs_only() {
    let names: Vec<String> = referenced_class_names(SAMPLE_DUMP).into_iter().collect();
    assert_eq!(names, vec!["UIColor", "ViewController", "_TtC5MyApp6Runner"]);
}

#[test]
fn referenced_selectors_skips_blank_entries() {
    let sels = referenced_selectors(SAMPLE_SELREFS);
    assert_eq!(sels.len(), 5);
    assert!(sels.contains("viewDidLoad"));
    assert!(sels.contains("colorWithRed:green:blue:alpha:"));
    assert!(!sels.contains(""));
}

#[test]
fn referenced_selectors_tolerates_crlf() {
    let selrefs = "0000000100012200  __TEXT:__objc_methname:viewDidLoad\r\n\
                   0000000100012208  __TEXT:__objc_methname:doThing\r\n";
    let sels: Vec<String> = referenced_selectors(selrefs).into_iter().collect();
    assert_eq!(sels, vec!["doThing", "viewDidLoad"]);
}

#[test]
fn class_chunks_tags_swift_records_as_bridged() {
    let chunks = class_chunks(SAMPLE_DUMP);
    // Class and metaclass record for each of the three classes.
    assert_eq!(chunks.len(), 6);
    let bridged: Vec<_> = chunks.iter().filter(|c| c.flavor == ChunkFlavor::Bridged).collect();
    assert_eq!(bridged.len(), 1);
    assert!(bridged[0].body.contains("_TtC5MyApp6Runner"));
    assert!(chunks.iter().all(|c| !c.body.contains("baseProtocols")));
    assert!(chunks.iter().all(|c| !c.body.contains("ivars")));
}

#[test]
fn class_chunks_closes_unterminated_record_at_end_of_dump() {
    let dump = "          data 0x1000110e8 (struct class_ro_t *)\n\
                                 name 0x10000be9a Foo\n\
                          baseMethods 0x0 (struct method_list_t *)\n";
    let chunks = class_chunks(dump);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].flavor, ChunkFlavor::Native);
    assert!(chunks[0].body.contains("Foo"));
}

#[test]
fn extract_splits_chunks_by_flavor() {
    let metadata = extract(SAMPLE_DUMP, SAMPLE_SELREFS);
    assert_eq!(metadata.native_chunks.len(), 5);
    assert_eq!(metadata.bridged_chunks.len(), 1);
    assert_eq!(metadata.declared_classes.len(), 3);
    assert_eq!(metadata.referenced_classes.len(), 3);
    assert_eq!(metadata.referenced_selectors.len(), 5);
    assert!(!metadata.is_empty());
}

#[test]
fn extract_without_objc_sections_is_empty() {
    let dump = "/tmp/plain:\nContents of (__TEXT,__text) section\n0000000100003f80\tc3\n";
    let metadata = extract(dump, "");
    assert!(metadata.is_empty());
}
