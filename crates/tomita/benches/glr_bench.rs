use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tomita::backend::lr::{Lr0Automaton, SlrTable};
use tomita::grammar::{Grammar, TerminalId};
use tomita::{GlrParser, TreeCount};

fn expression_grammar() -> Grammar {
    Grammar::builder()
        .terminals(["+", "*", "(", ")", "id"])
        .rule("E", ["E", "+", "T"])
        .rule("E", ["T"])
        .rule("T", ["T", "*", "F"])
        .rule("T", ["F"])
        .rule("F", ["(", "E", ")"])
        .rule("F", ["id"])
        .build()
        .unwrap()
}

fn ambiguous_sums() -> Grammar {
    Grammar::builder()
        .terminals(["+", "n"])
        .rule("E", ["E", "+", "E"])
        .rule("E", ["n"])
        .build()
        .unwrap()
}

fn sum_input(grammar: &Grammar, operands: usize) -> Vec<TerminalId> {
    let n = grammar.terminal("n").unwrap();
    let plus = grammar.terminal("+").unwrap();
    let mut input = vec![n];
    for _ in 1..operands {
        input.extend([plus, n]);
    }
    input
}

fn bench_table_construction(c: &mut Criterion) {
    let grammar = expression_grammar();

    c.bench_function("lr0_automaton_expression", |b| {
        b.iter(|| black_box(Lr0Automaton::build(black_box(&grammar))));
    });

    c.bench_function("slr_table_expression", |b| {
        b.iter(|| black_box(SlrTable::from_grammar(black_box(&grammar))));
    });
}

fn bench_deterministic_parse(c: &mut Criterion) {
    let grammar = expression_grammar();
    let parser = GlrParser::new(&grammar);
    // id + id * ( id + id ) repeated
    let unit = ["id", "+", "id", "*", "(", "id", "+", "id", ")"];
    let mut names = vec!["id"];
    for _ in 0..50 {
        names.push("+");
        names.extend(unit);
    }
    let input = parser.terminals(&names).unwrap();

    c.bench_function("glr_parse_expression_501", |b| {
        b.iter(|| black_box(parser.parse(black_box(&input).iter().copied()).unwrap()));
    });
}

fn bench_ambiguous_parse(c: &mut Criterion) {
    let grammar = ambiguous_sums();
    let parser = GlrParser::new(&grammar);
    let mut group = c.benchmark_group("glr_parse_ambiguous_sums");
    for operands in [4, 8, 16, 32] {
        let input = sum_input(&grammar, operands);
        group.bench_with_input(BenchmarkId::from_parameter(operands), &input, |b, input| {
            b.iter(|| {
                let forest = parser.parse(input.iter().copied()).unwrap();
                black_box(forest.count_trees());
            });
        });
    }
    group.finish();
}

fn bench_tree_counting(c: &mut Criterion) {
    let grammar = ambiguous_sums();
    let parser = GlrParser::new(&grammar);
    let forest = parser.parse(sum_input(&grammar, 40)).unwrap();
    assert!(matches!(forest.count_trees(), TreeCount::Finite(_)));

    c.bench_function("count_trees_sums_40", |b| {
        b.iter(|| black_box(black_box(&forest).count_trees()));
    });
}

criterion_group!(
    benches,
    bench_table_construction,
    bench_deterministic_parse,
    bench_ambiguous_parse,
    bench_tree_counting
);
criterion_main!(benches);
