use std::collections::BTreeSet;

use crate::models::domain::{
    article::{INTRODUCTION_HEADING, PARAGRAPH_SEPARATOR},
    Article,
};

/// Rough conversion used to turn a token budget into a character budget.
pub const CHARS_PER_TOKEN: usize = 4;

/// A paragraph cut to fit is only kept if at least this much of it survives.
const MIN_PARTIAL_CHARS: usize = 80;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Title,
    Heading,
    Paragraph { section: usize, position: usize },
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    text: String,
}

/// Shapes article text to fit a model's context window.
///
/// Blocks are admitted in priority order (title, the first two paragraphs,
/// every heading, the first paragraph of each section, the final section,
/// then everything else) and rendered back in document order. The output
/// never exceeds `token_budget * CHARS_PER_TOKEN` characters and depends only
/// on the article and the budget.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    token_budget: usize,
}

impl Normalizer {
    pub fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    pub fn max_chars(&self) -> usize {
        self.token_budget.saturating_mul(CHARS_PER_TOKEN)
    }

    pub fn truncate(&self, article: &Article) -> String {
        let blocks = layout(article);
        let max_chars = self.max_chars();

        let total: usize = blocks.iter().map(cost).sum();
        if total <= max_chars {
            return render(blocks.iter().map(|b| b.text.as_str()));
        }

        let mut selected: BTreeSet<usize> = BTreeSet::new();
        let mut partial: Option<(usize, String)> = None;
        let mut used = 0usize;

        for index in priority_order(&blocks) {
            if selected.contains(&index) {
                continue;
            }

            let block = &blocks[index];
            let block_cost = cost(block);
            if used + block_cost <= max_chars {
                selected.insert(index);
                used += block_cost;
                continue;
            }

            let room = max_chars.saturating_sub(used + PARAGRAPH_SEPARATOR.len());
            if matches!(block.kind, BlockKind::Paragraph { .. }) && room >= MIN_PARTIAL_CHARS {
                selected.insert(index);
                partial = Some((index, cut_paragraph(&block.text, room)));
                break;
            }
        }

        log::debug!(
            "Truncated '{}' to {} of {} blocks within {} chars",
            article.title,
            selected.len(),
            blocks.len(),
            max_chars
        );

        render(selected.iter().map(|&i| match &partial {
            Some((p, text)) if *p == i => text.as_str(),
            _ => blocks[i].text.as_str(),
        }))
    }
}

fn cost(block: &Block) -> usize {
    block.text.chars().count() + PARAGRAPH_SEPARATOR.len()
}

fn render<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(PARAGRAPH_SEPARATOR)
}

fn layout(article: &Article) -> Vec<Block> {
    let mut blocks = Vec::new();

    if !article.title.trim().is_empty() {
        blocks.push(Block {
            kind: BlockKind::Title,
            text: article.title.trim().to_string(),
        });
    }

    for (section, s) in article.sections.iter().enumerate() {
        if s.heading != INTRODUCTION_HEADING && !s.heading.trim().is_empty() {
            blocks.push(Block {
                kind: BlockKind::Heading,
                text: format!("## {}", s.heading.trim()),
            });
        }
        for (position, paragraph) in s.paragraphs().enumerate() {
            blocks.push(Block {
                kind: BlockKind::Paragraph { section, position },
                text: paragraph.to_string(),
            });
        }
    }

    blocks
}

fn priority_order(blocks: &[Block]) -> Vec<usize> {
    let last_section = blocks
        .iter()
        .filter_map(|b| match b.kind {
            BlockKind::Paragraph { section, .. } => Some(section),
            _ => None,
        })
        .max();

    let indices_where = |pred: &dyn Fn(&Block) -> bool| -> Vec<usize> {
        blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| pred(b))
            .map(|(i, _)| i)
            .collect()
    };

    let mut order = indices_where(&|b| b.kind == BlockKind::Title);
    order.extend(
        indices_where(&|b| matches!(b.kind, BlockKind::Paragraph { .. }))
            .into_iter()
            .take(2),
    );
    order.extend(indices_where(&|b| b.kind == BlockKind::Heading));
    order.extend(indices_where(&|b| {
        matches!(b.kind, BlockKind::Paragraph { position: 0, .. })
    }));
    order.extend(indices_where(&|b| {
        matches!(b.kind, BlockKind::Paragraph { section, .. } if Some(section) == last_section)
    }));
    order.extend(0..blocks.len());
    order
}

/// Cuts `text` to at most `room` characters, preferring a sentence end in
/// the last fifth of the window and falling back to an ellipsis.
fn cut_paragraph(text: &str, room: usize) -> String {
    let limit = room.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(limit).collect();

    if let Some(pos) = head.rfind(". ") {
        if pos * 5 >= limit * 4 {
            return head[..=pos].to_string();
        }
    }

    format!("{}{}", head.trim_end(), ELLIPSIS)
}
