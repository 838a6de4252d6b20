//! # Sentence Generators
//!
//! Random sentences of a grammar, for tests that need inputs known to be in
//! the language, plus a helper that replays a leftmost derivation.
//!
//! ## Usage
//!
//! ```rust
//! use tomita::grammar::Grammar;
//! use tomita::testing::{GeneratorConfig, SentenceGenerator};
//!
//! let grammar = Grammar::builder()
//!     .terminals(["(", ")"])
//!     .rule("S", ["(", "S", ")", "S"])
//!     .epsilon("S")
//!     .build()
//!     .unwrap();
//! let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default());
//! let sentence = generator.generate(7).unwrap();
//! assert_eq!(sentence.len() % 2, 0);
//! ```

use crate::grammar::{Grammar, NonTerminalId, ProductionId, Symbol, TerminalId};

/// Configuration for sentence generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Depth after which only the shallowest productions are chosen
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// Derives random sentences from a grammar's start symbol.
///
/// Below `max_depth` productions are picked uniformly among the productive
/// ones. Past it, each nonterminal takes a production of minimal derivation
/// height, which guarantees termination.
pub struct SentenceGenerator<'g> {
    grammar: &'g Grammar,
    config: GeneratorConfig,
    /// Minimal derivation height per production, `None` if unproductive.
    heights: Vec<Option<usize>>,
    /// A production of minimal height per nonterminal.
    shallowest: Vec<Option<ProductionId>>,
}

impl<'g> SentenceGenerator<'g> {
    /// Precompute derivation heights for `grammar`.
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: GeneratorConfig) -> Self {
        let mut symbol_height: Vec<Option<usize>> = vec![None; grammar.non_terminal_count()];
        let mut heights = vec![None; grammar.productions().len()];
        let mut changed = true;
        while changed {
            changed = false;
            for (index, production) in grammar.productions().iter().enumerate() {
                let height = production
                    .body()
                    .iter()
                    .try_fold(0, |acc: usize, symbol| match symbol {
                        Symbol::Terminal(_) => Some(acc),
                        Symbol::NonTerminal(nt) => symbol_height[nt.index()].map(|h| acc.max(h)),
                    })
                    .map(|h| h + 1);
                if let Some(height) = height {
                    heights[index] = Some(height);
                    let head = &mut symbol_height[production.head().index()];
                    if head.is_none_or(|current| height < current) {
                        *head = Some(height);
                        changed = true;
                    }
                }
            }
        }

        let shallowest = grammar
            .non_terminals()
            .map(|nt| {
                grammar
                    .production_ids_for(nt)
                    .iter()
                    .copied()
                    .filter(|p| heights[p.index()].is_some())
                    .min_by_key(|p| heights[p.index()])
            })
            .collect();

        Self {
            grammar,
            config,
            heights,
            shallowest,
        }
    }

    /// Whether `nt` derives at least one terminal string.
    #[must_use]
    pub fn is_productive(&self, nt: NonTerminalId) -> bool {
        self.shallowest[nt.index()].is_some()
    }

    /// A random sentence, or `None` when the start symbol is unproductive.
    #[must_use]
    pub fn generate(&self, seed: u64) -> Option<Vec<TerminalId>> {
        let start = self.grammar.start();
        if !self.is_productive(start) {
            return None;
        }
        let mut rng = SimpleRng::with_seed(seed);
        let mut sentence = Vec::new();
        let mut pending = vec![(Symbol::NonTerminal(start), 0usize)];
        while let Some((symbol, depth)) = pending.pop() {
            let nt = match symbol {
                Symbol::Terminal(t) => {
                    sentence.push(t);
                    continue;
                }
                Symbol::NonTerminal(nt) => nt,
            };
            let production = if depth < self.config.max_depth {
                let choices: Vec<ProductionId> = self
                    .grammar
                    .production_ids_for(nt)
                    .iter()
                    .copied()
                    .filter(|p| self.heights[p.index()].is_some())
                    .collect();
                choices[rng.below(choices.len())]
            } else {
                self.shallowest[nt.index()]?
            };
            let body = self.grammar.production(production).body();
            pending.extend(body.iter().rev().map(|&symbol| (symbol, depth + 1)));
        }
        Some(sentence)
    }
}

/// Replay `derivation` as a leftmost derivation from the start symbol.
///
/// Returns the derived terminal string, or `None` if some production does
/// not apply to the leftmost nonterminal or nonterminals remain at the end.
#[must_use]
pub fn rederive(grammar: &Grammar, derivation: &[ProductionId]) -> Option<Vec<TerminalId>> {
    let mut form = vec![Symbol::NonTerminal(grammar.start())];
    for &id in derivation {
        let production = grammar.production(id);
        let index = form.iter().position(|symbol| !symbol.is_terminal())?;
        if form[index] != Symbol::NonTerminal(production.head()) {
            return None;
        }
        form.splice(index..=index, production.body().iter().copied());
    }
    form.into_iter().map(Symbol::as_terminal).collect()
}

struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn with_seed(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        Self {
            state: seed ^ 0x853c_49e6_748f_ea9b,
        }
    }

    fn next_u64(&mut self) -> u64 {
        // XorShift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Grammar {
        Grammar::builder()
            .terminals(["+", "*", "n"])
            .rule("E", ["E", "+", "E"])
            .rule("E", ["E", "*", "E"])
            .rule("E", ["n"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_simple_rng() {
        let mut rng = SimpleRng::with_seed(12345);
        let v1 = rng.next_u64();
        let v2 = rng.next_u64();
        assert_ne!(v1, v2);
        assert!(rng.below(3) < 3);
    }

    #[test]
    fn test_generated_sentences_alternate() {
        let grammar = arithmetic();
        let n = grammar.terminal("n").unwrap();
        let generator = SentenceGenerator::new(&grammar, GeneratorConfig { max_depth: 4 });
        for seed in 0..20 {
            let sentence = generator.generate(seed).unwrap();
            assert_eq!(sentence.len() % 2, 1);
            for (index, terminal) in sentence.iter().enumerate() {
                assert_eq!(*terminal == n, index % 2 == 0);
            }
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let grammar = arithmetic();
        let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default());
        assert_eq!(generator.generate(42), generator.generate(42));
    }

    #[test]
    fn test_unproductive_start() {
        let grammar = Grammar::builder()
            .terminal("a")
            .rule("S", ["a", "S"])
            .build()
            .unwrap();
        let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default());
        assert!(!generator.is_productive(grammar.start()));
        assert_eq!(generator.generate(1), None);
    }

    #[test]
    fn test_rederive() {
        let grammar = arithmetic();
        let plus = ProductionId::new(0);
        let leaf = ProductionId::new(2);
        let n = grammar.terminal("n").unwrap();
        let add = grammar.terminal("+").unwrap();
        assert_eq!(rederive(&grammar, &[plus, leaf, leaf]), Some(vec![n, add, n]));
        assert_eq!(rederive(&grammar, &[plus, leaf]), None);
    }
}
