use machsweep_core::extract::{class_name, parse_bridged_chunk, parse_chunk, parse_native_chunk};
use machsweep_core::model::{ChunkFlavor, RawClassChunk, SelectorImpl};
use machsweep_core::services::demangle::{NoopDemangler, StaticDemangler};

const NATIVE_CHUNK: &str = "\
                    flags 0x184 RO_HAS_CXX_STRUCTORS
            instanceStart 8
                     name 0x10000be9a ViewController
              baseMethods 0x100011080 (struct method_list_t *)
\t\t   entsize 24
\t\t     count 3
\t\t      name 0x10000bd3c viewDidLoad
\t\t     types 0x10000bf2f v16@0:8
\t\t       imp 0x1000053a0 -[ViewController viewDidLoad]
\t\t      name 0x10000bd57 .cxx_destruct
\t\t     types 0x10000bf2f v16@0:8
\t\t       imp 0x1000054c0 -[ViewController .cxx_destruct]
\t\t      name 0x10000bd70 tableView:didSelectRowAtIndexPath:
\t\t     types 0x10000bf38 v32@0:8@16@24
\t\t       imp 0x100005520 -[ViewController tableView:didSelectRowAtIndexPath:]
";

const BRIDGED_CHUNK: &str = "\
                    flags 0x184 RO_HAS_CXX_STRUCTORS
                     name 0x10000beb0 X
              baseMethods 0x1000111a0 (struct method_list_t *)
\t\t   entsize 24
\t\t     count 2
\t\t      name 0x10000bd86 run
\t\t     types 0x10000bf2f v16@0:8
\t\t       imp 0x100006010
\t\t      name 0x10000bd57 .cxx_destruct
\t\t     types 0x10000bf2f v16@0:8
\t\t       imp 0x1000060d0
";

#[test]
fn class_name_is_first_name_line() {
    assert_eq!(class_name(NATIVE_CHUNK), Some("ViewController"));
    assert_eq!(class_name("   flags 0x80\n"), None);
}

#[test]
fn native_chunk_takes_signature_and_selector_from_imp_line() {
    let chunk = parse_native_chunk(NATIVE_CHUNK, &NoopDemangler).expect("native chunk");
    assert_eq!(chunk.class_name, "ViewController");
    assert_eq!(
        chunk.methods,
        vec![
            SelectorImpl {
                selector: "viewDidLoad".into(),
                signature: "[ViewController viewDidLoad]".into(),
            },
            SelectorImpl {
                selector: "tableView:didSelectRowAtIndexPath:".into(),
                signature: "[ViewController tableView:didSelectRowAtIndexPath:]".into(),
            },
        ]
    );
}

#[test]
fn native_chunk_class_methods_render_like_instance_methods() {
    let body = "                     name 0x1 Foo\n\
                \t\t      name 0x2 shared\n\
                \t\t       imp 0x3 +[Foo shared]\n";
    let chunk = parse_native_chunk(body, &NoopDemangler).expect("chunk");
    assert_eq!(chunk.methods, vec![SelectorImpl::new("Foo", "shared")]);
    assert_eq!(chunk.methods[0].signature, "[Foo shared]");
}

#[test]
fn native_chunk_falls_back_to_name_line_when_imp_is_stripped() {
    let body = "                     name 0x1 Foo\n\
                \t\t      name 0x2 doWork:\n\
                \t\t     types 0x3 v24@0:8@16\n\
                \t\t       imp 0x4\n";
    let chunk = parse_native_chunk(body, &NoopDemangler).expect("chunk");
    assert_eq!(chunk.methods, vec![SelectorImpl::new("Foo", "doWork:")]);
}

#[test]
fn native_chunk_with_no_methods_is_valid() {
    let body = "                     name 0x1 Empty\n\
                              baseMethods 0x0 (struct method_list_t *)\n";
    let chunk = parse_native_chunk(body, &NoopDemangler).expect("chunk");
    assert_eq!(chunk.class_name, "Empty");
    assert!(chunk.methods.is_empty());
}

#[test]
fn chunk_without_class_name_is_skipped() {
    let body = "                    flags 0x80\n\
                              baseMethods 0x0 (struct method_list_t *)\n";
    assert!(parse_native_chunk(body, &NoopDemangler).is_none());
    assert!(parse_bridged_chunk(body, &NoopDemangler).is_none());
}

#[test]
fn bridged_chunk_synthesizes_signatures_from_demangled_name() {
    let demangler = StaticDemangler::new().with("X", "MyApp.Runner");
    let chunk = parse_bridged_chunk(BRIDGED_CHUNK, &demangler).expect("bridged chunk");
    assert_eq!(chunk.class_name, "MyApp.Runner");
    assert_eq!(chunk.methods, vec![SelectorImpl::new("MyApp.Runner", "run")]);
    assert_eq!(chunk.methods[0].signature, "[MyApp.Runner run]");
}

#[test]
fn bridged_chunk_keeps_mangled_name_when_demangling_fails() {
    let chunk = parse_bridged_chunk(BRIDGED_CHUNK, &NoopDemangler).expect("bridged chunk");
    assert_eq!(chunk.class_name, "X");
    assert_eq!(chunk.methods[0].signature, "[X run]");
}

#[test]
fn cxx_destruct_never_survives_either_parser() {
    let native = parse_native_chunk(NATIVE_CHUNK, &NoopDemangler).expect("native");
    let bridged = parse_bridged_chunk(BRIDGED_CHUNK, &NoopDemangler).expect("bridged");
    assert!(native.methods.iter().chain(bridged.methods.iter()).all(|m| m.selector != ".cxx_destruct"));
}

#[test]
fn parse_chunk_dispatches_on_flavor() {
    let demangler = StaticDemangler::new().with("X", "MyApp.Runner");
    let native = RawClassChunk { flavor: ChunkFlavor::Native, body: NATIVE_CHUNK };
    let bridged = RawClassChunk { flavor: ChunkFlavor::Bridged, body: BRIDGED_CHUNK };
    assert_eq!(parse_chunk(&native, &demangler).expect("native").class_name, "ViewController");
    assert_eq!(parse_chunk(&bridged, &demangler).expect("bridged").class_name, "MyApp.Runner");
}

#[test]
fn unmarked_swift_metaclass_uses_demangled_class_name() {
    let demangler = StaticDemangler::new().with("_TtC5MyApp6Runner", "MyApp.Runner");
    let body = "                    flags 0x81 RO_META\n\
                \t\t      name 0x1 _TtC5MyApp6Runner\n\
                \t\t      name 0x2 shared\n\
                \t\t     types 0x3 @16@0:8\n\
                \t\t       imp 0x4\n";
    let chunk = parse_native_chunk(body, &demangler).expect("metaclass chunk");
    assert_eq!(chunk.class_name, "MyApp.Runner");
    assert_eq!(chunk.methods, vec![SelectorImpl::new("MyApp.Runner", "shared")]);
}

#[test]
fn native_imp_owner_goes_through_demangler() {
    let demangler = StaticDemangler::new().with("_TtC5MyApp4Base", "MyApp.Base");
    let body = "                     name 0x1 _TtC5MyApp4Base\n\
                \t\t      name 0x2 tick\n\
                \t\t       imp 0x3 -[_TtC5MyApp4Base tick]\n";
    let chunk = parse_native_chunk(body, &demangler).expect("chunk");
    assert_eq!(chunk.methods[0].signature, "[MyApp.Base tick]");
}
