//! SLR(1) table example
//!
//! Prints the FIRST and FOLLOW sets, the LR(0) item sets and the
//! multi-valued action table of the dangling-else grammar.
//!
//! Run with: `cargo run --example slr_table`

use tomita::SlrTable;
use tomita::grammar::{Grammar, Symbol};

fn main() {
    let grammar = Grammar::builder()
        .terminals(["if", "else", "stmt"])
        .rule("S", ["if", "S"])
        .rule("S", ["if", "S", "else", "S"])
        .rule("S", ["stmt"])
        .build()
        .expect("grammar is well formed");

    println!("=== Grammar ===");
    print!("{grammar}");

    println!("\n=== Sets ===");
    for nt in grammar.non_terminals() {
        let first: Vec<&str> = grammar
            .first(nt)
            .iter()
            .map(|&terminal| grammar.terminal_name(terminal))
            .collect();
        let follow: Vec<&str> = grammar
            .follow(nt)
            .iter()
            .map(|&lookahead| grammar.lookahead_name(lookahead))
            .collect();
        println!(
            "{:<4} nullable={:<5} FIRST={first:?} FOLLOW={follow:?}",
            grammar.non_terminal_name(nt),
            grammar.is_nullable(Symbol::NonTerminal(nt)),
        );
    }

    let table = SlrTable::from_grammar(&grammar);
    let automaton = table.automaton();
    let augmented = table.grammar();

    println!("\n=== LR(0) item sets ===");
    for (state, items) in automaton.states().iter().enumerate() {
        println!("I{state}:");
        print!("{}", items.display(augmented));
        for &(symbol, target) in automaton.transitions_from(state) {
            println!("    on {} -> I{target}", augmented.symbol_name(symbol));
        }
    }

    println!("\n=== Action and goto table ===");
    println!("{table}");

    println!("\n=== Conflicts ===");
    for conflict in table.conflicts() {
        println!(
            "state {} on {}: {} actions",
            conflict.state,
            augmented.lookahead_name(conflict.lookahead),
            conflict.actions.len()
        );
    }
}
