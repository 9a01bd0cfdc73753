// THEORY:
// `compute_tester` exercises the engines from a terminal. It plays the part of
// the external collaborator the engines expect: it reads files, decodes
// images and numeric lists, and hands the engines ready-made inputs.
//
// The same `Limits` the server applies are on by default, so a run here behaves
// like a request would; `--unbounded` lifts them for local experiments.

mod commands;

use clap::Parser;
use colored::Colorize;
use commands::{Command, Report};
use compute_engine::Limits;

#[derive(Parser)]
#[command(name = "compute_tester")]
#[command(about = "Run the computation engines against files and literal inputs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Skip the request-size limits
    #[arg(long, global = true)]
    unbounded: bool,
}

fn print_report(report: &Report) {
    println!("{}", format!("=== {} ===", report.title).green().bold());
    for (key, value) in &report.fields {
        println!("  {}: {}", key.bold(), value);
    }
    for line in &report.lines {
        println!("  {}", line);
    }
    println!(
        "{}",
        format!("  done in {:.2}ms", report.elapsed.as_secs_f64() * 1000.0).dimmed()
    );
}

fn main() {
    let cli = Cli::parse();
    let limits = if cli.unbounded { Limits::unbounded() } else { Limits::default() };

    match commands::run(cli.command, &limits) {
        Ok(report) => print_report(&report),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".red().bold(), error);
            std::process::exit(1);
        }
    }
}
