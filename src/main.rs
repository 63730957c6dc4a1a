//! # puzzle-sat
//!
//! Solves LinkedIn-style logic puzzles by translating them to CNF and handing
//! them to an incremental SAT engine.
//!
//! ## Usage
//!
//! ```sh
//! puzzle-sat [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! A bare `PATH` is solved as a DIMACS `.cnf` file.
//!
//! ### Subcommands
//!
//! - `file <path>`: solve a DIMACS CNF file.
//! - `sudoku <path>`: solve a 6x6 Mini Sudoku.
//! - `queens <path> [--no-touch]`: solve a Queens grid.
//! - `tango <path>`: solve a Tango grid.
//! - `zip <path>`: solve a Zip grid.
//! - `generate [--pieces N] [--seed S]`: generate a unique Mini Sudoku.
//! - `dir <path>`: solve every supported file below a directory.
//! - `completions <shell>`: print shell completions.
//!
//! ### Common options
//!
//! - `-d, --debug`: debug logging (otherwise `RUST_LOG`, default `warn`).
//! - `--verify <bool>`: re-check the answer (default `true`).
//! - `--stats <bool>`: print the statistics table (default `true`).
//! - `-p, --print-solution`: print the raw model.
//! - `-e, --export-dimacs`: write the encoding to `<input>.cnf`.
//!
//! ## Examples
//!
//! ```sh
//! puzzle-sat queens data/daily.queens --no-touch
//! puzzle-sat generate --pieces 14 --seed 7 -p
//! RUST_LOG=trace puzzle-sat zip data/example.zip
//! ```

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, generate, solve_dir, solve_file, solve_queens, solve_sudoku,
    solve_tango, solve_zip,
};
use clap::{CommandFactory, Parser};
use log::LevelFilter;

mod command_line;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(common: &CommonOptions) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if common.debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let common = match &cli.command {
        Some(
            Commands::File { common, .. }
            | Commands::Sudoku { common, .. }
            | Commands::Queens { common, .. }
            | Commands::Tango { common, .. }
            | Commands::Zip { common, .. }
            | Commands::Generate { common, .. }
            | Commands::Dir { common, .. },
        ) => common.merge(&cli.common),
        Some(Commands::Completions { .. }) | None => cli.common.clone(),
    };
    init_logging(&common);

    match cli.command {
        Some(Commands::File { path, .. }) => solve_file(&path, &common),
        Some(Commands::Sudoku { path, .. }) => solve_sudoku(&path, &common),
        Some(Commands::Queens { path, no_touch, .. }) => solve_queens(&path, no_touch, &common),
        Some(Commands::Tango { path, .. }) => solve_tango(&path, &common),
        Some(Commands::Zip { path, .. }) => solve_zip(&path, &common),
        Some(Commands::Generate { pieces, seed, .. }) => generate(pieces, seed, &common),
        Some(Commands::Dir { path, .. }) => solve_dir(&path, &common),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "puzzle-sat",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        None => match cli.path {
            Some(path) => solve_file(&path, &common),
            None => {
                Cli::command().print_help()?;
                std::process::exit(1);
            }
        },
    }
}
