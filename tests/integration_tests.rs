//! xdc 集成测试
//!
//! 运行编译出的 xdc，检查输出内容和退出码

use std::fs;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const XDC: &str = env!("CARGO_BIN_EXE_xdc");

fn demo(name: &str) -> String {
    format!("{}/demos/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn xdc(args: &[&str]) -> Output {
    Command::new(XDC)
        .args(args)
        .output()
        .expect("failed to execute xdc")
}

/// 把源码写入临时文件后编译
fn compile_source(source: &str, extra_args: &[&str]) -> Output {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(source.as_bytes()).expect("failed to write source");
    let path = file.path().to_str().expect("temp path is not utf-8").to_string();

    let mut args = vec![path.as_str()];
    args.extend_from_slice(extra_args);
    xdc(&args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// 期望编译失败，返回 stderr
fn expect_failure(source: &str) -> String {
    let output = compile_source(source, &[]);
    assert_eq!(output.status.code(), Some(1), "source should fail: {}", source);
    stderr(&output)
}

#[test]
fn test_arith_demo() {
    let output = xdc(&[&demo("arith.xd"), "--run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("main returned 5"));

    // 默认把 IR 写到 stderr
    let ir = stderr(&output);
    assert!(ir.contains("; ModuleID = 'XD Compiler'"));
    assert!(ir.contains("define i32 @main() {"));
    assert!(ir.contains("sdiv i32"));
}

#[test]
fn test_globals_demo_to_file() {
    let out = NamedTempFile::new().expect("failed to create temp file");
    let out_path = out.path().to_str().expect("temp path is not utf-8");

    let output = xdc(&[&demo("globals.xd"), "-o", out_path, "--run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("main returned 1"));
    // 零初始化表达式不产生警告，IR 写到文件后 stderr 为空
    assert_eq!(stderr(&output), "");

    let ir = fs::read_to_string(out_path).expect("failed to read output");
    assert!(ir.contains("@counter = global i32 0"));
    assert!(ir.contains("@scale = global float 0x0000000000000000"));
    assert!(ir.contains("define float @half() {"));
    assert!(ir.contains("load i32, ptr @counter"));
}

#[test]
fn test_branch_demo() {
    let output = xdc(&[&demo("branch.xd"), "--run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("main returned 10"));

    let ir = stderr(&output);
    assert!(ir.contains("icmp sge i32"));
    assert!(ir.contains("if.then:"));
    assert!(ir.contains("if.cont1:"));
}

#[test]
fn test_missing_semicolon() {
    let err = expect_failure("fn void f() {\n    let int x = 1\n}\n");
    assert!(err.contains("Parser error at line 3, column 1: expected ';', found '}'"), "{}", err);
    assert!(!err.contains("define"));
}

#[test]
fn test_punctuation_errors_are_distinct() {
    let cases = [
        ("let int x = 1", "expected ';'"),
        ("let int x 5;", "expected '='"),
        ("if x) { }", "expected '('"),
        ("if (1 { }", "expected ')'"),
        ("fn int f() }", "expected '{'"),
        ("fn int f() { let int x = 1;", "expected '}'"),
    ];

    let mut messages = Vec::new();
    for (source, expected) in cases {
        let err = expect_failure(source);
        assert!(err.contains(expected), "{}: {}", source, err);
        messages.push(err);
    }

    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), cases.len());
}

#[test]
fn test_undefined_assignment_is_fatal() {
    let err = expect_failure("fn void f() {\n    y = 1;\n}\n");
    assert!(err.contains("Undefined variable 'y' at line 2, column 5"), "{}", err);
}

#[test]
fn test_assignment_after_let() {
    let output = compile_source("fn int main() { let int y = 1; y = 2; return y; }", &["--run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("main returned 2"));
}

#[test]
fn test_long_expression_fails_cleanly() {
    let chain = vec!["1"; 20_000].join(" + ");
    let err = expect_failure(&format!("fn int main() {{ return {}; }}", chain));
    assert!(err.contains("expression is nested too deeply"), "{}", err);

    let chain = vec!["1"; 500].join(" + ");
    let output = compile_source(&format!("fn int main() {{ return {}; }}", chain), &["--run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("main returned 500"));
}

#[test]
fn test_lexer_error() {
    let err = expect_failure("let int $ = 1;");
    assert!(err.contains("Unexpected character: '$'"), "{}", err);
}

#[test]
fn test_collected_errors() {
    let err = expect_failure("let char c = 1;\nfn int main() { return 1.5; }\n");
    assert!(err.contains("error: Code generation error at line 1"), "{}", err);
    assert!(err.contains("type 'char' is not supported"));
    assert!(err.contains("returns i32, found float"));
    assert!(err.contains("Compilation failed with 2 error(s)"));
}

#[test]
fn test_warnings_keep_success() {
    let output = compile_source("let int g = 4;\nfn void f(let int a = 1;) { }\n", &[]);
    assert!(output.status.success(), "{}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("warning: line 1, column 13: initializer of global 'g' is not evaluated"), "{}", err);
    assert!(err.contains("parameter(s) of function 'f' are ignored"));
    assert!(err.contains("@g = global i32 0"));
    assert!(err.contains("define void @f() {"));
}

#[test]
fn test_print_tokens_and_ast() {
    let output = compile_source("let int x = 2 + 3 * 4;", &["--tokens", "--ast"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Let"));
    assert!(out.contains("IntLiteral(\"4\")"));
    assert!(out.contains("let int x = (2 + (3 * 4))"));
}

#[test]
fn test_target_triple() {
    let output = compile_source("let int x = 0;", &["--target", "x86_64-unknown-linux-gnu"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("target triple = \"x86_64-unknown-linux-gnu\""));
}

#[test]
fn test_cli_errors() {
    let output = xdc(&["/nonexistent/file.xd"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read source file"));

    let output = xdc(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));

    let output = xdc(&[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_version() {
    let output = xdc(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("XD Compiler v{}", env!("CARGO_PKG_VERSION"))));
}
