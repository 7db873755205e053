use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cohcc::parser::asm::parse_asm;
use cohcc::parser::device_bundle::split_device_code;
use cohcc::parser::opt_remarks::process_raw_opt_remarks;
use cohcc::parser::output::parse_output;
use cohcc::request::Filters;

fn make_listing() -> String {
    let mut text = String::from("\t.file 1 \"example.c\"\n");
    for i in 0..200 {
        text.push_str(&format!(
            "f{i}:\n\t.loc 1 {} 3\n\tmovl\t%edi, %eax\n\tjmp\t.L{i}\n.L{i}:\n\tret\n",
            i + 1
        ));
    }
    text
}

fn make_remarks() -> String {
    let doc = "--- !Missed\nPass: inline\nName: NoDefinition\nDebugLoc: { File: example.cpp, Line: 3, Column: 5 }\nFunction: main\nArgs:\n  - Callee: foo\n  - String: ' will not be inlined into '\n  - Caller: main\n...\n";
    doc.repeat(100)
}

fn bench_parsers(c: &mut Criterion) {
    let listing = make_listing();
    let filters = Filters {
        labels: true,
        directives: true,
        comment_only: true,
        trim: true,
        ..Filters::default()
    };
    c.bench_function("parse_asm", |b| b.iter(|| parse_asm(black_box(&listing), &filters)));

    let diagnostics = "/tmp/w/example.c:4:21: warning: unused variable 'x'\n".repeat(200);
    c.bench_function("parse_output", |b| {
        b.iter(|| parse_output(black_box(&diagnostics), Some("/tmp/w/example.c")))
    });

    let remarks = make_remarks();
    c.bench_function("opt_remarks", |b| b.iter(|| process_raw_opt_remarks(black_box(&remarks))));

    let bundle = format!(
        "# __CLANG_OFFLOAD_BUNDLE____START__ host-x86_64\n{listing}# __CLANG_OFFLOAD_BUNDLE____END__ host-x86_64\n"
    );
    c.bench_function("split_device_code", |b| b.iter(|| split_device_code(black_box(&bundle))));
}

criterion_group!(benches, bench_parsers);
criterion_main!(benches);
