#![no_main]
use libfuzzer_sys::fuzz_target;
use tomita::backend::glr::{GlrConfig, GlrParser, TreeCount};
use tomita::grammar::{Grammar, TerminalId};
use tomita::testing::EarleyRecognizer;

fn grammar(selector: u8) -> Grammar {
    let builder = Grammar::builder().terminals(["a", "b", "c"]);
    let builder = match selector % 4 {
        // Expr -> Expr a Expr | b, ambiguous
        0 => builder
            .rule("E", ["E", "a", "E"])
            .rule("E", ["b"]),
        // hidden left recursion: S -> A S c | b, A -> a | ε
        1 => builder
            .rule("S", ["A", "S", "c"])
            .rule("S", ["b"])
            .rule("A", ["a"])
            .epsilon("A"),
        // cyclic: S -> S S | S | a | ε
        2 => builder
            .rule("S", ["S", "S"])
            .rule("S", ["S"])
            .rule("S", ["a"])
            .epsilon("S"),
        // palindromes over a and b with c in the middle
        _ => builder
            .rule("P", ["a", "P", "a"])
            .rule("P", ["b", "P", "b"])
            .rule("P", ["c"]),
    };
    builder.build().expect("fixed grammars are well formed")
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    if rest.len() > 24 {
        return;
    }

    let grammar = grammar(selector);
    let input: Vec<TerminalId> = rest
        .iter()
        .map(|byte| TerminalId::new(usize::from(*byte) % grammar.terminal_count()))
        .collect();

    let parser = GlrParser::with_config(
        &grammar,
        GlrConfig {
            max_gss_nodes: Some(100_000),
            ..GlrConfig::default()
        },
    );
    let oracle = EarleyRecognizer::new(&grammar);

    match parser.parse(input.iter().copied()) {
        Ok(forest) => {
            assert!(oracle.recognizes(&input));
            assert_ne!(forest.count_trees(), TreeCount::Finite(0));
            for tree in forest.trees(4) {
                assert!(tree.conforms_to(&grammar));
                assert_eq!(tree.terminals(), input);
            }
        }
        Err(error) => {
            let no_parse = error.as_no_parse().expect("stack stays far below the cap");
            assert!(no_parse.position <= input.len());
            assert!(!oracle.recognizes(&input));
        }
    }
});
