#[test]
fn dhub_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/dhub_error_pass.rs");
    t.pass("tests/ui/dhub_error_conversions.rs");
}
