/*
cargo run --bin make_instruction -- \
    --image-json-path ./output/FunQA.json \
    --annotation-path ../../dataset/annotation_with_id/fun_qa_train.json \
    --output-path     ./output/FunQA_instructions.json

cargo run --bin make_instruction -- --pretty --repo-dir ../.. --git-timeout-ms 2000
*/

use std::fs::{create_dir_all, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

use funqa_instruct::{build, BuildOptions, BuildPaths, CommandRevision};

/// Make FunQA_instructions.json from the frame json and the QA annotations.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the image json file (frame id -> frame)
    #[arg(long, value_name = "PATH", default_value = "./output/FunQA.json")]
    image_json_path: PathBuf,

    /// Path to the annotation file
    #[arg(
        long,
        value_name = "PATH",
        default_value = "../../dataset/annotation_with_id/fun_qa_train.json"
    )]
    annotation_path: PathBuf,

    /// Where to save the FunQA_instructions json file
    #[arg(long, value_name = "PATH", default_value = "./output/FunQA_instructions.json")]
    output_path: PathBuf,

    /// Directory whose git revision is stamped into meta.version
    #[arg(long, value_name = "PATH", default_value = ".")]
    repo_dir: PathBuf,

    /// Give up on the git lookup after this many milliseconds
    #[arg(long, default_value_t = 1000)]
    git_timeout_ms: u64,

    /// Pretty-print the output json
    #[arg(long)]
    pretty: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging setup
    create_dir_all(&cli.log_dir)
        .with_context(|| format!("could not create {}", cli.log_dir.display()))?;
    let ts = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let log_path = cli.log_dir.join(format!("make_instruction_{ts}.log"));
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Warn,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            Config::default(),
            File::create(&log_path)
                .with_context(|| format!("could not create {}", log_path.display()))?,
        ),
    ])?;
    info!("Started - {:?}", cli);

    let paths = BuildPaths {
        image_json: cli.image_json_path.clone(),
        annotations: cli.annotation_path.clone(),
        output: cli.output_path.clone(),
    };
    let options = BuildOptions { pretty: cli.pretty };
    let revision = CommandRevision::git(&cli.repo_dir, Duration::from_millis(cli.git_timeout_ms));

    let doc = build(&paths, &options, &revision).context("building instructions failed")?;

    let without_frames = doc.data.values().filter(|r| r.image_ids.is_empty()).count();

    println!("\n=== Instruction summary ===");
    println!("Instructions       : {}", doc.data.len());
    println!("Without frames     : {}", without_frames);
    println!("Version            : {}", doc.meta.version);
    println!("Output JSON        : {:?}", cli.output_path);
    println!("Log file           : {:?}", log_path);

    Ok(())
}
