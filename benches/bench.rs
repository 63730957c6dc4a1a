use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use puzzle_sat::Puzzle;
use puzzle_sat::queens::solver::{EXAMPLE as QUEENS_EXAMPLE, EXAMPLE_QUEENS, Queens};
use puzzle_sat::sat::solver::{Solver, VarisatSolver};
use puzzle_sat::sudoku::generator::generate_mini_sudoku;
use puzzle_sat::sudoku::solver::{Board, EXAMPLE as SUDOKU_EXAMPLE, MiniSudoku};
use puzzle_sat::tango::solver::parse_tango_file;
use puzzle_sat::zip::solver::parse_zip_file;
use std::hint::black_box;
use std::time::Duration;

fn bench_sudoku(c: &mut Criterion) {
    let sudoku = MiniSudoku::new(Board::try_from(SUDOKU_EXAMPLE).unwrap());
    let cnf = sudoku.to_cnf();

    let mut group = c.benchmark_group("mini sudoku");
    group.bench_function("encode", |b| b.iter(|| black_box(sudoku.to_cnf())));
    group.bench_function("solve", |b| {
        b.iter(|| {
            let mut solver = VarisatSolver::new(&cnf);
            black_box(solver.solve().unwrap());
        });
    });
    group.bench_function("uniqueness", |b| {
        b.iter(|| black_box(sudoku.is_unique().unwrap()));
    });
    group.finish();
}

fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("mini sudoku - generator");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    for pieces in [8, 12, 16, 20, 24] {
        group.bench_with_input(BenchmarkId::from_parameter(pieces), &pieces, |b, &pieces| {
            let mut rng = fastrand::Rng::with_seed(pieces as u64);
            b.iter(|| black_box(generate_mini_sudoku(pieces, &mut rng)));
        });
    }
    group.finish();
}

fn bench_queens(c: &mut Criterion) {
    let grid = QUEENS_EXAMPLE.iter().map(|row| row.to_vec()).collect();
    let daily = Queens::new(grid, EXAMPLE_QUEENS.to_vec()).unwrap();
    c.bench_function("queens - daily", |b| b.iter(|| black_box(daily.solve().unwrap())));

    let touching = daily.clone().forbid_touching(true);
    c.bench_function("queens - daily, no touching", |b| {
        b.iter(|| black_box(touching.solve().unwrap()));
    });
    c.bench_function("queens - uniqueness", |b| {
        b.iter(|| black_box(daily.is_unique().unwrap()));
    });
}

fn bench_tango_and_zip(c: &mut Criterion) {
    let tango = parse_tango_file("data/example.tango").unwrap();
    c.bench_function("tango - example", |b| {
        b.iter(|| black_box(tango.solve().unwrap()));
    });

    let zip = parse_zip_file("data/example.zip").unwrap();
    let mut group = c.benchmark_group("zip - example");
    group.sample_size(20);
    group.bench_function("solve", |b| b.iter(|| black_box(zip.solve().unwrap())));
    group.bench_function("count", |b| {
        b.iter(|| black_box(zip.count_solutions(10).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_sudoku,
    bench_generator,
    bench_queens,
    bench_tango_and_zip
);

criterion_main!(benches);
