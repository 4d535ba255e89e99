//! Rendering of modified leaves
//!
//! The word renderer produces a self-contained HTML page. Text is split into
//! alternating runs of whitespace and non-whitespace, the shared head and tail
//! are trimmed, and the middle is aligned with a longest common subsequence.

use std::ops::Range;

/// LCS tables above this many cells are not computed; the middle is shown
/// as a whole-block replacement instead
const MAX_LCS_CELLS: usize = 4_000_000;

/// Turns an old/new pair of leaf texts into an artifact body
pub trait DiffRenderer {
    /// File extension of the artifacts, without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, title: &str, old: &str, new: &str) -> String;
}

/// One aligned piece of the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Word-level HTML renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct WordDiffRenderer;

impl DiffRenderer for WordDiffRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, title: &str, old: &str, new: &str) -> String {
        let mut body = String::new();
        for change in word_diff(old, new) {
            match change {
                Change::Same(text) => body.push_str(&escape_html(text)),
                Change::Removed(text) => {
                    body.push_str("<del>");
                    body.push_str(&escape_html(text));
                    body.push_str("</del>");
                }
                Change::Added(text) => {
                    body.push_str("<ins>");
                    body.push_str(&escape_html(text));
                    body.push_str("</ins>");
                }
            }
        }

        let title = escape_html(title);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n\
             body {{ font-family: sans-serif; margin: 2rem; }}\n\
             pre {{ white-space: pre-wrap; font-family: monospace; }}\n\
             del {{ background: #fdd; text-decoration: line-through; }}\n\
             ins {{ background: #dfd; text-decoration: none; }}\n\
             </style>\n</head>\n<body>\n<h1>{title}</h1>\n<pre>{body}</pre>\n</body>\n</html>\n"
        )
    }
}

/// Splits text into maximal runs of whitespace and non-whitespace
pub fn tokenize(text: &str) -> Vec<&str> {
    token_spans(text).into_iter().map(|span| &text[span]).collect()
}

fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (index, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            spans.push(start..index);
            start = index;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        spans.push(start..text.len());
    }

    spans
}

/// Alignment of one token: kept (old index), deleted (old index), inserted (new index)
#[derive(Debug, Clone, Copy)]
enum Step {
    Keep(usize),
    Delete(usize),
    Insert(usize),
}

/// Aligns two texts token by token
///
/// Consecutive tokens of the same kind come back as one slice, and within
/// each edited stretch the deletion precedes the insertion.
pub fn word_diff<'a>(old: &'a str, new: &'a str) -> Vec<Change<'a>> {
    let old_spans = token_spans(old);
    let new_spans = token_spans(new);
    let old_tokens: Vec<&str> = old_spans.iter().map(|s| &old[s.clone()]).collect();
    let new_tokens: Vec<&str> = new_spans.iter().map(|s| &new[s.clone()]).collect();

    let prefix = old_tokens
        .iter()
        .zip(&new_tokens)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old_tokens[prefix..]
        .iter()
        .rev()
        .zip(new_tokens[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_end = old_tokens.len() - suffix;
    let new_end = new_tokens.len() - suffix;

    let mut steps: Vec<Step> = (0..prefix).map(Step::Keep).collect();

    let cells = (old_end - prefix + 1).saturating_mul(new_end - prefix + 1);
    if cells > MAX_LCS_CELLS {
        tracing::debug!("Diff middle too large for LCS ({} cells); replacing whole block", cells);
        steps.extend((prefix..old_end).map(Step::Delete));
        steps.extend((prefix..new_end).map(Step::Insert));
    } else {
        let middle = lcs_align(&old_tokens[prefix..old_end], &new_tokens[prefix..new_end]);
        steps.extend(middle.into_iter().map(|step| match step {
            Step::Keep(i) => Step::Keep(prefix + i),
            Step::Delete(i) => Step::Delete(prefix + i),
            Step::Insert(j) => Step::Insert(prefix + j),
        }));
    }

    steps.extend((old_end..old_tokens.len()).map(Step::Keep));

    assemble(old, new, &old_spans, &new_spans, &steps)
}

fn lcs_align(old: &[&str], new: &[&str]) -> Vec<Step> {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;

    // table[i * width + j] = LCS length of old[i..] and new[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            steps.push(Step::Keep(i));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            steps.push(Step::Delete(i));
            i += 1;
        } else {
            steps.push(Step::Insert(j));
            j += 1;
        }
    }
    steps.extend((i..n).map(Step::Delete));
    steps.extend((j..m).map(Step::Insert));
    steps
}

/// Turns token steps into slices of the source texts
///
/// Between two kept tokens the deleted tokens are contiguous in `old` and
/// the inserted ones contiguous in `new`, so each run is a single span.
fn assemble<'a>(
    old: &'a str,
    new: &'a str,
    old_spans: &[Range<usize>],
    new_spans: &[Range<usize>],
    steps: &[Step],
) -> Vec<Change<'a>> {
    fn extend(run: &mut Option<Range<usize>>, span: &Range<usize>) {
        match run {
            Some(range) => range.end = span.end,
            None => *run = Some(span.clone()),
        }
    }

    let mut changes = Vec::new();
    let mut same: Option<Range<usize>> = None;
    let mut removed: Option<Range<usize>> = None;
    let mut added: Option<Range<usize>> = None;

    let flush_edits = move |changes: &mut Vec<Change<'a>>,
                       removed: &mut Option<Range<usize>>,
                       added: &mut Option<Range<usize>>| {
        if let Some(range) = removed.take() {
            changes.push(Change::Removed(&old[range]));
        }
        if let Some(range) = added.take() {
            changes.push(Change::Added(&new[range]));
        }
    };

    for step in steps {
        match *step {
            Step::Keep(i) => {
                flush_edits(&mut changes, &mut removed, &mut added);
                extend(&mut same, &old_spans[i]);
            }
            Step::Delete(i) => {
                if let Some(range) = same.take() {
                    changes.push(Change::Same(&old[range]));
                }
                extend(&mut removed, &old_spans[i]);
            }
            Step::Insert(j) => {
                if let Some(range) = same.take() {
                    changes.push(Change::Same(&old[range]));
                }
                extend(&mut added, &new_spans[j]);
            }
        }
    }

    if let Some(range) = same.take() {
        changes.push(Change::Same(&old[range]));
    }
    flush_edits(&mut changes, &mut removed, &mut added);

    changes
}

/// Escapes text for inclusion in HTML element content and attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
