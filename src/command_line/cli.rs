#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result, anyhow, bail, ensure};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{debug, info};
use puzzle_sat::Puzzle;
use puzzle_sat::queens::solver::parse_queens_file;
use puzzle_sat::sat::cnf::Cnf;
use puzzle_sat::sat::dimacs::parse_file;
use puzzle_sat::sat::solver::{SolutionStats, Solutions, Solver, VarisatSolver};
use puzzle_sat::sudoku::generator::generate_mini_sudoku;
use puzzle_sat::sudoku::solver::{MiniSudoku, parse_sudoku_file};
use puzzle_sat::tango::solver::parse_tango_file;
use puzzle_sat::zip::solver::parse_zip_file;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface of the puzzle solver.
#[derive(Parser, Debug)]
#[command(
    name = "puzzle-sat",
    version,
    about = "Solves and generates logic puzzles through SAT encodings"
)]
pub(crate) struct Cli {
    /// A DIMACS .cnf file to solve when no subcommand is given.
    pub path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a 6x6 Mini Sudoku. Rows of digits, `.` or `0` for blanks.
    Sudoku {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Queens grid. Rows of region labels, `*` marks a given queen.
    Queens {
        path: PathBuf,

        /// Forbid queens on diagonally touching cells.
        #[arg(long, default_value_t = false)]
        no_touch: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Tango grid. Rows of `S`, `M`, `.` then `=`/`x` clue lines.
    Tango {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Zip grid. Rows of checkpoint numbers then `wall` lines.
    Zip {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate a Mini Sudoku with a unique solution.
    Generate {
        /// Number of clues left on the board.
        #[arg(long, default_value_t = 16)]
        pieces: usize,

        /// Seed for reproducible puzzles.
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every puzzle and CNF file below a directory, dispatching on the
    /// file extension.
    Dir {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving subcommand.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Re-check the decoded solution against the puzzle rules and the CNF.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Write the generated CNF next to the input as `<input>.cnf`.
    #[arg(short, long, default_value_t = false)]
    pub(crate) export_dimacs: bool,
}

impl CommonOptions {
    /// Options given before the subcommand apply too.
    pub(crate) fn merge(&self, outer: &Self) -> Self {
        Self {
            debug: self.debug || outer.debug,
            verify: self.verify && outer.verify,
            stats: self.stats && outer.stats,
            print_solution: self.print_solution || outer.print_solution,
            export_dimacs: self.export_dimacs || outer.export_dimacs,
        }
    }
}

/// Allocated and resident memory in MiB.
fn memory_usage() -> Result<(f64, f64)> {
    epoch::advance().map_err(|e| anyhow!("jemalloc epoch: {e}"))?;
    let allocated = stats::allocated::read().map_err(|e| anyhow!("jemalloc stats: {e}"))?;
    let resident = stats::resident::read().map_err(|e| anyhow!("jemalloc stats: {e}"))?;
    Ok((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Runs the engine once over `cnf`.
pub(crate) fn solve(cnf: &Cnf, label: Option<&Path>) -> Result<(Option<Solutions>, SolutionStats)> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    debug!(
        "variables: {}, clauses: {}, literals: {}",
        cnf.num_vars(),
        cnf.len(),
        cnf.literal_count()
    );

    let mut solver = VarisatSolver::new(cnf);
    let model = solver.solve()?;
    debug!("model: {model:?}");
    Ok((model, solver.stats()))
}

fn export_dimacs(cnf: &Cnf, path: &Path) -> Result<()> {
    let dimacs_path = format!("{}.cnf", path.display());
    std::fs::write(&dimacs_path, cnf.to_string())
        .with_context(|| format!("unable to write {dimacs_path}"))?;
    println!("DIMACS written to: {dimacs_path}");
    Ok(())
}

/// Solves a DIMACS file and reports the raw model.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<()> {
    let time = Instant::now();
    let cnf = parse_file(path).with_context(|| format!("parsing {}", path.display()))?;
    let parse_time = time.elapsed();

    let (model, solver_stats) = solve(&cnf, Some(path))?;

    if common.verify {
        if let Some(model) = &model {
            let ok = cnf.verify(model);
            println!("Verified: {ok}");
            ensure!(ok, "model does not satisfy {}", path.display());
        }
    }

    if common.stats {
        print_stats(parse_time, Duration::ZERO, &cnf, &solver_stats, memory_usage()?);
    }
    print_outcome(model.as_ref(), common.print_solution);
    Ok(())
}

/// Encodes, solves, checks and prints any puzzle.
pub(crate) fn solve_puzzle<P>(
    puzzle: &P,
    path: Option<&Path>,
    parse_time: Duration,
    common: &CommonOptions,
) -> Result<()>
where
    P: Puzzle + Display,
{
    println!("Parsed puzzle:\n{puzzle}");

    let time = Instant::now();
    let cnf = puzzle.to_cnf();
    let encode_time = time.elapsed();

    if common.export_dimacs {
        match path {
            Some(path) => export_dimacs(&cnf, path)?,
            None => println!("DIMACS:\n{cnf}"),
        }
    }

    let (model, solver_stats) = solve(&cnf, path)?;
    let solution = model.as_ref().map(|model| puzzle.decode(model));

    if common.verify {
        if let (Some(model), Some(solution)) = (&model, &solution) {
            let ok = cnf.verify(model) && puzzle.verify(solution);
            println!("Verified: {ok}");
            ensure!(ok, "decoded solution breaks the puzzle rules");
        }
    }

    if common.stats {
        print_stats(parse_time, encode_time, &cnf, &solver_stats, memory_usage()?);
    }
    print_outcome(model.as_ref(), common.print_solution);

    match solution {
        Some(solution) => println!("Solution:\n{}", puzzle.render(&solution)),
        None => println!("No solution found"),
    }
    Ok(())
}

fn timed<T>(parse: impl FnOnce() -> puzzle_sat::Result<T>, path: &Path) -> Result<(T, Duration)> {
    let time = Instant::now();
    let value = parse().with_context(|| format!("parsing {}", path.display()))?;
    Ok((value, time.elapsed()))
}

pub(crate) fn solve_sudoku(path: &Path, common: &CommonOptions) -> Result<()> {
    let (sudoku, parse_time) = timed(|| parse_sudoku_file(path), path)?;
    solve_puzzle(&sudoku, Some(path), parse_time, common)
}

pub(crate) fn solve_queens(path: &Path, no_touch: bool, common: &CommonOptions) -> Result<()> {
    let (queens, parse_time) = timed(|| parse_queens_file(path), path)?;
    solve_puzzle(&queens.forbid_touching(no_touch), Some(path), parse_time, common)
}

pub(crate) fn solve_tango(path: &Path, common: &CommonOptions) -> Result<()> {
    let (tango, parse_time) = timed(|| parse_tango_file(path), path)?;
    solve_puzzle(&tango, Some(path), parse_time, common)
}

pub(crate) fn solve_zip(path: &Path, common: &CommonOptions) -> Result<()> {
    let (zip, parse_time) = timed(|| parse_zip_file(path), path)?;
    solve_puzzle(&zip, Some(path), parse_time, common)
}

/// Generates a Mini Sudoku, confirms it is unique and solves it.
pub(crate) fn generate(pieces: usize, seed: Option<u64>, common: &CommonOptions) -> Result<()> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    let time = Instant::now();
    let board = generate_mini_sudoku(pieces, &mut rng)?;
    let generate_time = time.elapsed();
    info!("generated in {generate_time:?}");

    let sudoku = MiniSudoku::new(board);
    if common.verify {
        let unique = sudoku.is_unique()?;
        println!("Unique: {unique}");
        ensure!(unique, "generated puzzle has more than one solution");
    }
    solve_puzzle(&sudoku, None, generate_time, common)
}

/// Solves every `.cnf`, `.sudoku`, `.queens`, `.tango` and `.zip` file below
/// `path`.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<()> {
    if !path.is_dir() {
        bail!("provided path is not a directory: {}", path.display());
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let file_path = entry.path();
        match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("cnf") => solve_file(file_path, common)?,
            Some("sudoku") => solve_sudoku(file_path, common)?,
            Some("queens") => solve_queens(file_path, false, common)?,
            Some("tango") => solve_tango(file_path, common)?,
            Some("zip") => solve_zip(file_path, common)?,
            _ => eprintln!("Skipping unsupported file: {}", file_path.display()),
        }
    }

    Ok(())
}

/// Prints a single statistic as a table row.
pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Prints a statistic with its rate per second.
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(
    parse_time: Duration,
    encode_time: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    (allocated, resident): (f64, f64),
) {
    let solve_secs = s.solve_time.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Encode time (s)", format!("{:.3}", encode_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars());
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.literal_count());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Solve calls", s.solve_calls, solve_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("Solve time (s)", format!("{solve_secs:.3}"));
    println!("=====================================================================");
}

fn print_outcome(model: Option<&Solutions>, print_solution: bool) {
    if let Some(model) = model {
        if print_solution {
            println!("Solutions: {model}");
        }
        println!("\nSATISFIABLE");
    } else {
        println!("\nUNSATISFIABLE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_queens_subcommand() {
        let cli = Cli::parse_from(["puzzle-sat", "queens", "board.queens", "--no-touch", "-p"]);
        match cli.command {
            Some(Commands::Queens {
                path,
                no_touch,
                common,
            }) => {
                assert_eq!(path, PathBuf::from("board.queens"));
                assert!(no_touch);
                assert!(common.print_solution);
                assert!(common.verify);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verify_can_be_disabled() {
        let cli = Cli::parse_from(["puzzle-sat", "tango", "t.tango", "--verify", "false"]);
        let Some(Commands::Tango { common, .. }) = cli.command else {
            panic!("expected tango");
        };
        assert!(!common.verify);
        assert!(common.stats);
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::parse_from(["puzzle-sat", "generate", "--seed", "9"]);
        let Some(Commands::Generate { pieces, seed, .. }) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(pieces, 16);
        assert_eq!(seed, Some(9));
    }

    #[test]
    fn test_bare_path_solves_dimacs() {
        let cli = Cli::parse_from(["puzzle-sat", "problem.cnf"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
    }

    #[test]
    fn test_merge_keeps_outer_flags() {
        let outer = CommonOptions {
            debug: true,
            verify: true,
            stats: false,
            ..CommonOptions::default()
        };
        let inner = CommonOptions {
            verify: true,
            stats: true,
            ..CommonOptions::default()
        };
        let merged = inner.merge(&outer);
        assert!(merged.debug);
        assert!(!merged.stats);
        assert!(merged.verify);
    }

    #[test]
    fn test_solve_dir_rejects_file() {
        let err = solve_dir(Path::new("Cargo.toml"), &CommonOptions::default()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_solve_dir_on_fixtures() {
        let common = CommonOptions {
            verify: true,
            ..CommonOptions::default()
        };
        solve_dir(Path::new("data"), &common).unwrap();
    }
}
