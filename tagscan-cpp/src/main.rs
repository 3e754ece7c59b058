use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tagscan_common::{ScanOptions, SourceReader, TagEntry, TagLocate};
use tagscan_cpp::CppScanner;

#[derive(Parser, Debug)]
#[clap(
    name = "cstrip",
    version,
    about = "Sanitize C-family sources and report macro tags"
)]
struct Args {
    /// Input source file
    input: PathBuf,

    /// Output file for the cleaned stream (defaults to stdout)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Scan #if 0 branches for tags
    #[clap(long)]
    if0: bool,

    /// Do not record tags for #define directives
    #[clap(long)]
    no_define_tags: bool,

    /// Do not record file-scope tags
    #[clap(long)]
    no_file_scope: bool,

    /// Locate tags by line number instead of search pattern
    #[clap(long)]
    line_numbers: bool,

    /// Treat @"..." as string literals (Objective-C)
    #[clap(long)]
    at_literals: bool,

    /// Recognize C++ raw string literals
    #[clap(long)]
    raw_literals: bool,

    /// Block structure is not determined by brace matching
    #[clap(long)]
    no_brace_format: bool,

    /// Print discovered tags to stderr
    #[clap(long)]
    tags: bool,

    /// Print discovered tags to stderr as JSON
    #[clap(long)]
    json: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::init();
    }

    let options = ScanOptions {
        if0: args.if0,
        include_file_scope: !args.no_file_scope,
        include_define_tags: !args.no_define_tags,
        locate: if args.line_numbers {
            TagLocate::LineNumber
        } else {
            TagLocate::Pattern
        },
    };

    let mut reader = SourceReader::from_path(&args.input)?;
    let mut tags: Vec<TagEntry> = Vec::new();
    let mut scanner = CppScanner::new(
        &mut reader,
        &mut tags,
        &options,
        !args.no_brace_format,
        args.at_literals,
        args.raw_literals,
    );

    let mut cleaned = Vec::new();
    while let Some(c) = scanner.next_char() {
        cleaned.push(c);
    }
    drop(scanner);

    if let Some(path) = args.output {
        fs::write(path, &cleaned)?;
    } else {
        std::io::stdout().write_all(&cleaned)?;
    }

    if args.json {
        eprintln!("{}", serde_json::to_string_pretty(&tags)?);
    } else if args.tags {
        for tag in &tags {
            let mut line = format!("{}\t{}\tline:{}", tag.name, tag.kind, tag.line);
            if let Some(signature) = &tag.signature {
                line.push('\t');
                line.push_str(signature);
            }
            eprintln!("{}", line);
        }
    }

    Ok(())
}
