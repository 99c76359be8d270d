use std::env;
use std::fs;
use std::process;
use anyhow::Context;
use xd::Compiler;
use xd::codegen::CodegenOptions;
use xd::error::XdError;
use xd::ir::Constant;
use xd::ir::eval::run_function;
use xd::{lexer, parser};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Default)]
struct CliOptions {
    input_file: String,
    output_file: Option<String>, // -o，默认输出到 stderr
    target_triple: Option<String>,
    print_tokens: bool,          // --tokens
    print_ast: bool,             // --ast
    run_main: bool,              // --run
}

fn print_usage() {
    println!("XD Compiler v{}", VERSION);
    println!("Usage: xdc [options] <source_file.xd>");
    println!();
    println!("Options:");
    println!("  -o <file>             将 IR 写入文件 (默认输出到 stderr)");
    println!("  --target <triple>     设置模块的 target triple");
    println!("  --tokens              打印词法分析结果");
    println!("  --ast                 打印语法树");
    println!("  --run                 解释执行 main 并打印返回值");
    println!("  --version, -v         显示版本号");
    println!("  --help, -h            显示帮助信息");
    println!();
    println!("Examples:");
    println!("  xdc hello.xd");
    println!("  xdc hello.xd -o hello.ll");
    println!("  RUST_LOG=debug xdc --run hello.xd");
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut input_file: Option<String> = None;
    let mut i = 1;

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--version" | "-v" => {
                println!("XD Compiler v{}", VERSION);
                process::exit(0);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "-o" => {
                i += 1;
                let path = args.get(i).ok_or("-o 需要一个文件名")?;
                options.output_file = Some(path.clone());
            }
            "--target" => {
                i += 1;
                let triple = args.get(i).ok_or("--target 需要一个 triple")?;
                options.target_triple = Some(triple.clone());
            }
            "--tokens" => options.print_tokens = true,
            "--ast" => options.print_ast = true,
            "--run" => options.run_main = true,
            _ => {
                if arg.starts_with('-') {
                    return Err(format!("未知选项: {}", arg));
                }
                if input_file.is_some() {
                    return Err(format!("多余参数: {}", arg));
                }
                input_file = Some(arg.clone());
            }
        }
        i += 1;
    }

    options.input_file = input_file.ok_or("需要指定输入文件")?;
    Ok(options)
}

fn format_constant(value: Constant) -> String {
    match value {
        Constant::Bool(b) => b.to_string(),
        Constant::Int(n) => n.to_string(),
        Constant::Float(v) => v.to_string(),
    }
}

fn compile(options: &CliOptions) -> anyhow::Result<()> {
    let source = fs::read_to_string(&options.input_file)
        .with_context(|| format!("failed to read source file '{}'", options.input_file))?;

    if options.print_tokens {
        for t in lexer::lex(&source)? {
            println!("{:>4}:{:<3} {:?}", t.loc.line, t.loc.column, t.token);
        }
    }
    if options.print_ast {
        let ast = parser::parse(lexer::lex(&source)?)?;
        print!("{}", ast);
    }

    let compiler = Compiler::with_options(CodegenOptions {
        target_triple: options.target_triple.clone(),
        ..CodegenOptions::default()
    });

    let compilation = match compiler.compile_module(&source) {
        Ok(compilation) => compilation,
        Err(XdError::Diagnostics(diagnostics)) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            return Err(XdError::Diagnostics(diagnostics).into());
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &compilation.warnings {
        eprintln!("{}", warning);
    }

    let ir = compilation.module.to_string();
    match &options.output_file {
        Some(path) => {
            fs::write(path, &ir)
                .map_err(|e| XdError::Io(e.to_string()))
                .with_context(|| format!("failed to write '{}'", path))?;
        }
        None => eprint!("{}", ir),
    }

    if options.run_main {
        match run_function(&compilation.module, "main")? {
            Some(value) => println!("main returned {}", format_constant(value)),
            None => println!("main returned void"),
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("错误: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = compile(&options) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}
