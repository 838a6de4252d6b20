//! GLR parsing example
//!
//! This example demonstrates how to:
//! 1. Define an ambiguous grammar
//! 2. Parse with the GLR engine and inspect the parse forest
//! 3. Enumerate derivation trees
//! 4. Feed input one terminal at a time through a session
//!
//! Run with: `RUST_LOG=tomita=debug cargo run --example glr_parsing`

use tomita::{GlrParser, Grammar, ParseStatus};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .without_time()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== GLR Parsing Example ===\n");

    println!("1. Building ambiguous grammar...");
    let grammar = Grammar::builder()
        .terminals(["n", "+", "-"])
        .rule("Expr", ["Expr", "+", "Expr"])
        .rule("Expr", ["Expr", "-", "Expr"])
        .rule("Expr", ["n"])
        .build()
        .expect("grammar is well formed");
    print!("{grammar}");
    println!("   ✓ Grammar built (contains ambiguity)\n");

    println!("2. Creating GLR parser...");
    let parser = GlrParser::new(&grammar);
    let conflicts = parser.table().conflicts();
    println!(
        "   ✓ {} states, {} conflicting cells\n",
        parser.table().state_count(),
        conflicts.len()
    );

    println!("3. Parsing: n + n - n");
    match parser.parse_names(["n", "+", "n", "-", "n"]) {
        Ok(forest) => {
            println!("   Parse forest generated:");
            println!("   - Forest nodes: {}", forest.len());
            println!("   - Is ambiguous: {}", forest.is_ambiguous());
            println!("   - Derivations: {:?}\n", forest.count_trees());
            for tree in forest.trees(10) {
                println!("   {}", tree.display(&grammar));
            }
        }
        Err(error) => println!("   - {error}"),
    }
    println!();

    println!("4. Parsing an invalid input: n + - n");
    if let Err(error) = parser.parse_names(["n", "+", "-", "n"]) {
        println!("   - {error}\n");
    }

    println!("5. Feeding a session one terminal at a time:");
    let mut session = parser.session();
    for name in ["n", "-", "n"] {
        let terminal = grammar.terminal(name).expect("declared terminal");
        session.push(terminal).expect("valid prefix");
        let expected: Vec<&str> = session
            .expected()
            .into_iter()
            .map(|lookahead| grammar.lookahead_name(lookahead))
            .collect();
        println!("   after `{name}`: expecting {expected:?}");
    }
    let forest = session.finish().expect("complete sentence");
    assert_eq!(session.status(), ParseStatus::Accepted);
    let metrics = session.metrics();
    println!(
        "   ✓ {} stack nodes, {} edges, {} forest nodes in {:?}",
        metrics.gss_nodes,
        metrics.gss_edges,
        forest.len(),
        metrics.parse_time
    );

    println!("\n=== Example Complete ===");
}
