//! Before/after pair synthesis.

use crate::corpus::SnippetCorpus;
use crate::seed::SeedPair;
use rand::Rng;
use tracing::debug;

/// How a seed pair was produced. Determines the seed file prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// A snippet against a whitespace-perturbed copy of itself.
    Mutated,
    /// Two distinct snippets drawn at random.
    Crossed,
    /// Hand-written transitions.
    Curated,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Mutated, Strategy::Crossed, Strategy::Curated];

    /// Seed file name prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Strategy::Mutated => "fixture_mod_",
            Strategy::Crossed => "fixture_pair_",
            Strategy::Curated => "fixture_hand_",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Mutated => write!(f, "mutated"),
            Strategy::Crossed => write!(f, "crossed"),
            Strategy::Curated => write!(f, "curated"),
        }
    }
}

/// Default number of snippets paired with a mutated copy of themselves.
pub const DEFAULT_MUTATE_LIMIT: usize = 500;

/// Default upper bound on random cross-pair draws.
pub const DEFAULT_CROSS_LIMIT: usize = 500;

/// Hand-written transitions, one per common mutation class.
pub const CURATED_PAIRS: &[(&str, &str)] = &[
    // text change
    ("<p>Hello</p>", "<p>Hello World</p>"),
    // list growth
    ("<ul><li>A</li></ul>", "<ul><li>A</li><li>B</li></ul>"),
    // attribute value
    ("<div class='old'>text</div>", "<div class='new'>text</div>"),
    ("<span>one</span>", "<span>two</span>"),
    ("<a href='#'>link</a>", "<a href='/page'>link</a>"),
    ("<input type='text'>", "<input type='password'>"),
    // element type
    ("<div><p>nested</p></div>", "<div><span>changed</span></div>"),
    // nested structure
    (
        "<table><tr><td>1</td></tr></table>",
        "<table><tr><td>2</td></tr></table>",
    ),
];

/// Insert a space after every `>` and before every `<`.
pub fn space_out_tags(snippet: &str) -> String {
    let mut out = String::with_capacity(snippet.len() + snippet.len() / 4);
    for c in snippet.chars() {
        match c {
            '>' => out.push_str("> "),
            '<' => out.push_str(" <"),
            _ => out.push(c),
        }
    }
    out
}

/// Produces the three pair streams from a corpus.
#[derive(Debug, Clone, Copy)]
pub struct PairSynthesizer {
    /// Only the first this-many snippets (in corpus order) get a mutated twin.
    pub mutate_limit: usize,
    /// Cap on random draws. The realized count is `min(cross_limit, 2 * len)`
    /// minus the draws that picked the same snippet twice.
    pub cross_limit: usize,
}

impl Default for PairSynthesizer {
    fn default() -> Self {
        Self {
            mutate_limit: DEFAULT_MUTATE_LIMIT,
            cross_limit: DEFAULT_CROSS_LIMIT,
        }
    }
}

impl PairSynthesizer {
    pub fn new(mutate_limit: usize, cross_limit: usize) -> Self {
        Self {
            mutate_limit,
            cross_limit,
        }
    }

    /// Each snippet against a copy with spaces around its tags. Snippets
    /// without angle brackets are left out.
    pub fn mutated(&self, corpus: &SnippetCorpus) -> Vec<SeedPair> {
        corpus
            .iter()
            .take(self.mutate_limit)
            .filter_map(|snippet| {
                let modified = space_out_tags(snippet);
                (modified != snippet.as_str()).then(|| SeedPair::new(snippet.as_str(), modified))
            })
            .collect()
    }

    /// Random pairs of distinct snippets. Draws that land on the same
    /// snippet twice are dropped, not redrawn.
    pub fn crossed<R: Rng>(&self, corpus: &SnippetCorpus, rng: &mut R) -> Vec<SeedPair> {
        let snippets = corpus.to_sorted_vec();
        let draws = self.cross_limit.min(snippets.len().saturating_mul(2));

        let mut pairs = Vec::with_capacity(draws);
        for _ in 0..draws {
            let a = snippets[rng.random_range(0..snippets.len())];
            let b = snippets[rng.random_range(0..snippets.len())];
            if a != b {
                pairs.push(SeedPair::new(a.as_str(), b.as_str()));
            }
        }
        debug!("{} of {} cross draws kept", pairs.len(), draws);
        pairs
    }

    /// The fixed hand-written pairs.
    pub fn curated(&self) -> Vec<SeedPair> {
        CURATED_PAIRS
            .iter()
            .map(|&(before, after)| SeedPair::new(before, after))
            .collect()
    }

    /// All three streams, tagged, in mutated/crossed/curated order.
    pub fn synthesize<R: Rng>(
        &self,
        corpus: &SnippetCorpus,
        rng: &mut R,
    ) -> Vec<(Strategy, SeedPair)> {
        let mut out = Vec::new();
        for strategy in Strategy::ALL {
            let pairs = match strategy {
                Strategy::Mutated => self.mutated(corpus),
                Strategy::Crossed => self.crossed(corpus, rng),
                Strategy::Curated => self.curated(),
            };
            out.extend(pairs.into_iter().map(|pair| (strategy, pair)));
        }
        out
    }
}
