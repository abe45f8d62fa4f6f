//! Seeded random documents

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use termlight::{Document, DocumentBuilder};

/// Search terms that appear in generated text
pub const TERMS: [&str; 3] = ["Acme Corp", "Acme", "Globex"];

const WORDS: &[&str] = &[
    "Acme", "acme", "ACME", "Acme Corp", "acme corp", "Globex", "globex", "Acmes", "Acme_Co",
    "the", "quarterly", "report", "naïve", "café", "growth", "x", "42", "Corp",
];

const PUNCT: &[&str] = &[" ", " ", " ", ", ", ". ", "'s ", "-", " (", ") ", "\n"];

const BLOCKS: &[&str] = &["p", "li", "blockquote", "h2", "td"];

fn sentence(rng: &mut StdRng) -> String {
    let mut out = String::new();
    for _ in 0..rng.gen_range(1..12) {
        out.push_str(WORDS.choose(rng).copied().unwrap_or("the"));
        out.push_str(PUNCT.choose(rng).copied().unwrap_or(" "));
    }
    out
}

/// Build a small random document mixing visible text, inline elements,
/// hidden script blocks and comments
pub fn random_document(rng: &mut StdRng) -> Document {
    let mut builder = DocumentBuilder::new();
    for _ in 0..rng.gen_range(1..6) {
        builder = builder.open(BLOCKS.choose(rng).copied().unwrap_or("p"));
        for _ in 0..rng.gen_range(1..5) {
            builder = match rng.gen_range(0..10) {
                0 => builder.element("em", &sentence(rng)),
                1 => builder.open("strong").element("a", &sentence(rng)).close(),
                2 => builder.element("script", &sentence(rng)),
                3 => builder.comment(&sentence(rng)),
                _ => builder.text(&sentence(rng)),
            };
        }
        builder = builder.close();
    }
    builder.build()
}
