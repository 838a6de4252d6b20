//! Property-based tests for the GLR engine
//!
//! Random terminal strings are checked against an independent Earley
//! recognizer, and generated sentences against the parser's forests.

use proptest::prelude::*;
use tomita::backend::glr::{GlrParser, TreeCount};
use tomita::grammar::{Grammar, TerminalId};
use tomita::testing::{EarleyRecognizer, GeneratorConfig, SentenceGenerator, rederive};

fn grammars() -> Vec<Grammar> {
    vec![
        // ambiguous sums and products
        Grammar::builder()
            .terminals(["+", "*", "n"])
            .rule("E", ["E", "+", "E"])
            .rule("E", ["E", "*", "E"])
            .rule("E", ["n"])
            .build()
            .unwrap(),
        // balanced parentheses with an epsilon rule
        Grammar::builder()
            .terminals(["(", ")"])
            .rule("S", ["(", "S", ")", "S"])
            .epsilon("S")
            .build()
            .unwrap(),
        // hidden left recursion through a nullable prefix
        Grammar::builder()
            .terminals(["a", "b"])
            .rule("S", ["A", "S", "b"])
            .rule("S", ["a"])
            .rule("A", ["a"])
            .epsilon("A")
            .build()
            .unwrap(),
        // cyclic and infinitely ambiguous
        Grammar::builder()
            .terminals(["a", "b"])
            .rule("S", ["S", "S"])
            .rule("S", ["S"])
            .rule("S", ["a"])
            .rule("S", ["b"])
            .epsilon("S")
            .build()
            .unwrap(),
        // palindromes, which no deterministic parser handles
        Grammar::builder()
            .terminals(["a", "b"])
            .rule("P", ["a", "P", "a"])
            .rule("P", ["b", "P", "b"])
            .rule("P", ["a"])
            .rule("P", ["b"])
            .epsilon("P")
            .build()
            .unwrap(),
    ]
}

fn word(grammar: &Grammar, raw: &[usize]) -> Vec<TerminalId> {
    raw.iter()
        .map(|&index| TerminalId::new(index % grammar.terminal_count()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn glr_agrees_with_earley(
        which in 0usize..5,
        raw in prop::collection::vec(0usize..8, 0..9),
    ) {
        let grammar = &grammars()[which];
        let input = word(grammar, &raw);
        let parser = GlrParser::new(grammar);
        let oracle = EarleyRecognizer::new(grammar);
        prop_assert_eq!(parser.recognize(input.iter().copied()), oracle.recognizes(&input));
    }

    #[test]
    fn rejection_position_is_within_input(
        which in 0usize..5,
        raw in prop::collection::vec(0usize..8, 0..9),
    ) {
        let grammar = &grammars()[which];
        let input = word(grammar, &raw);
        let parser = GlrParser::new(grammar);
        if let Err(err) = parser.parse(input.iter().copied()) {
            let no_parse = err.as_no_parse().unwrap();
            prop_assert!(no_parse.position <= input.len());
            prop_assert_eq!(no_parse.at_end_of_input(), no_parse.position == input.len());
        }
    }

    #[test]
    fn generated_sentences_parse_soundly(which in 0usize..5, seed in any::<u64>()) {
        let grammar = &grammars()[which];
        let generator = SentenceGenerator::new(grammar, GeneratorConfig { max_depth: 5 });
        let sentence = generator.generate(seed).unwrap();
        prop_assume!(sentence.len() <= 12);

        let forest = GlrParser::new(grammar).parse(sentence.iter().copied()).unwrap();
        prop_assert_ne!(forest.count_trees(), TreeCount::Finite(0));
        for tree in forest.trees(8) {
            prop_assert!(tree.conforms_to(grammar));
            prop_assert_eq!(&tree.terminals(), &sentence);
            prop_assert_eq!(rederive(grammar, &tree.leftmost_derivation()), Some(sentence.clone()));
        }
    }

    #[test]
    fn counts_bound_enumeration(operands in 1usize..6) {
        let grammar = &grammars()[0];
        let parser = GlrParser::new(grammar);
        let mut input = vec!["n"];
        for _ in 1..operands {
            input.extend(["+", "n"]);
        }
        let forest = parser.parse_names(&input).unwrap();
        let TreeCount::Finite(count) = forest.count_trees() else {
            panic!("acyclic grammar produced an infinite count");
        };
        let trees = forest.trees(10_000);
        prop_assert_eq!(trees.len() as u128, count);
    }
}
