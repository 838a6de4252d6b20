//! Tests for the LR(0) automaton and the SLR(1) table

use tomita::backend::lr::{Action, Lr0Automaton, SlrTable};
use tomita::grammar::{Grammar, Lookahead, Symbol};

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

fn dangling_else() -> Grammar {
    Grammar::builder()
        .terminals(["if", "else", "stmt"])
        .rule("S", ["if", "S"])
        .rule("S", ["if", "S", "else", "S"])
        .rule("S", ["stmt"])
        .build()
        .unwrap()
}

#[test]
fn test_expression_automaton_has_twelve_states() {
    let automaton = Lr0Automaton::build(&expression_grammar());
    assert_eq!(automaton.state_count(), 12);

    let grammar = automaton.grammar();
    let initial = automaton.state(0);
    assert_eq!(initial.kernel().len(), 1);
    assert_eq!(initial.kernel()[0].production(), automaton.start_production());
    // E' -> •E plus the closure over E, T and F
    assert_eq!(initial.items().len(), 7);

    // every kernel is unique
    for (i, a) in automaton.states().iter().enumerate() {
        for b in &automaton.states()[i + 1..] {
            assert_ne!(a.kernel(), b.kernel());
        }
    }

    // goto on `(` from the start lands in a state that closes over E again
    let open = grammar.symbol("(").unwrap();
    let inner = automaton.goto(0, open).unwrap();
    assert_eq!(automaton.goto(inner, open), Some(inner));
}

#[test]
fn test_transitions_are_consistent_with_goto() {
    let automaton = Lr0Automaton::build(&expression_grammar());
    let mut count = 0;
    for (from, symbol, to) in automaton.transitions() {
        assert_eq!(automaton.goto(from, symbol), Some(to));
        // the target's kernel is the source items advanced over `symbol`
        let grammar = automaton.grammar();
        for item in automaton.state(to).kernel() {
            assert!(item.dot() > 0);
            let before = item.production();
            assert_eq!(
                grammar.production(before).body()[item.dot() - 1],
                symbol
            );
        }
        count += 1;
    }
    assert_eq!(count, automaton.transition_count());
}

#[test]
fn test_expression_table_is_deterministic() {
    let table = SlrTable::from_grammar(&expression_grammar());
    assert!(table.is_deterministic());
    assert!(table.conflicts().is_empty());

    let grammar = table.grammar();
    let e = grammar.non_terminal("E").unwrap();
    let accepting = table.goto(0, e).unwrap();
    assert_eq!(table.actions(accepting, Lookahead::End), &[Action::Accept]);

    let accepts = table
        .cells()
        .filter(|(_, _, actions)| actions.contains(&Action::Accept))
        .count();
    assert_eq!(accepts, 1);

    // every state reached on `id` reduces F -> id on FOLLOW(F)
    let id = grammar.symbol("id").unwrap();
    let after_id = table.automaton().goto(0, id).unwrap();
    let f = grammar.non_terminal("F").unwrap();
    let expected: Vec<Lookahead> = table.expected(after_id).collect();
    assert_eq!(expected, grammar.follow(f).iter().copied().collect::<Vec<_>>());
    for lookahead in expected {
        assert!(matches!(
            table.actions(after_id, lookahead),
            [Action::Reduce(production)] if grammar.production(*production).head() == f
        ));
    }
}

#[test]
fn test_dangling_else_keeps_both_actions() {
    let table = SlrTable::from_grammar(&dangling_else());
    assert!(!table.is_deterministic());

    let conflicts = table.conflicts();
    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    let grammar = table.grammar();
    assert_eq!(grammar.lookahead_name(conflict.lookahead), "else");
    assert_eq!(conflict.actions.len(), 2);
    assert!(
        conflict
            .actions
            .iter()
            .any(|action| matches!(action, Action::Shift(_)))
    );
    assert!(
        conflict
            .actions
            .iter()
            .any(|action| matches!(action, Action::Reduce(_)))
    );
}

#[test]
fn test_reduce_reduce_conflict() {
    // S -> X | Y, X -> a, Y -> a
    let grammar = Grammar::builder()
        .terminal("a")
        .rule("S", ["X"])
        .rule("S", ["Y"])
        .rule("X", ["a"])
        .rule("Y", ["a"])
        .build()
        .unwrap();
    let table = SlrTable::from_grammar(&grammar);
    let conflicts = table.conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].lookahead, Lookahead::End);
    assert!(
        conflicts[0]
            .actions
            .iter()
            .all(|action| matches!(action, Action::Reduce(_)))
    );
}

#[test]
fn test_epsilon_rules_reduce_without_consuming() {
    // S -> A a, A -> ε
    let grammar = Grammar::builder()
        .terminal("a")
        .rule("S", ["A", "a"])
        .epsilon("A")
        .build()
        .unwrap();
    let table = SlrTable::from_grammar(&grammar);
    let a = table.grammar().terminal("a").unwrap();
    let actions = table.actions(0, Lookahead::Terminal(a));
    assert_eq!(actions.len(), 1);
    let Action::Reduce(production) = actions[0] else {
        panic!("expected a reduce, got {}", actions[0]);
    };
    assert!(table.grammar().production(production).is_epsilon());
    assert!(table.actions(0, Lookahead::End).is_empty());
}

#[test]
fn test_table_construction_is_deterministic() {
    let first = SlrTable::from_grammar(&dangling_else());
    let second = SlrTable::from_grammar(&dangling_else());
    assert_eq!(first.state_count(), second.state_count());
    assert!(first.cells().eq(second.cells()));
    let first_transitions: Vec<(usize, Symbol, usize)> = first.automaton().transitions().collect();
    let second_transitions: Vec<(usize, Symbol, usize)> =
        second.automaton().transitions().collect();
    assert_eq!(first_transitions, second_transitions);
}

#[test]
fn test_action_display() {
    let table = SlrTable::from_grammar(&expression_grammar());
    let rendered: Vec<String> = table
        .cells()
        .flat_map(|(_, _, actions)| actions.iter().map(ToString::to_string))
        .collect();
    assert!(rendered.iter().any(|text| text == "acc"));
    assert!(rendered.iter().any(|text| text.starts_with("sh")));
    assert!(rendered.iter().any(|text| text.starts_with("re")));
}

#[cfg(feature = "serialize")]
#[test]
fn test_table_survives_json() {
    let table = SlrTable::from_grammar(&dangling_else());
    let json = serde_json::to_string(&table).unwrap();
    let restored: SlrTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.state_count(), table.state_count());
    assert!(restored.cells().eq(table.cells()));
    assert_eq!(restored.conflicts(), table.conflicts());
    assert_eq!(
        restored.grammar().terminal("else"),
        table.grammar().terminal("else")
    );
}
