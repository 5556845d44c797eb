/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The greedy line breaker (§4.4 "Breaking is greedy...").
//!
//! Text measurement is delegated to a `Shaper` (the font-fallback/shaping
//! stack is an external collaborator per §1); this module only decides
//! *where* to break, using `xi-unicode`'s line-break-opportunity iterator
//! for mid-word breaks, matching the teacher crate's dependency on
//! `xi-unicode` for exactly this (SPEC_FULL §10.5).

use app_units::Au;
use xi_unicode::LineBreakIterator;

use crate::box_tree::BoxId;
use crate::layout::inline::items::{can_break_after, LineItem, LineItemKind, LineItemStream};
use crate::layout::inline::line_box::{LineBoxEntry, ReplacedLineBox, RootLineBox, TextLineBox};
use crate::style::TextAlign;

/// Measures shaped text width; implemented by the font-shaping bridge
/// (§2 "Line items + shaping bridge"), which this crate treats as an
/// external collaborator.
pub trait Shaper {
    fn measure(&mut self, text: &str) -> Au;
    fn replaced_size(&self, owner: BoxId) -> (Au, Au);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowWrap {
    Normal,
    BreakWord,
    Anywhere,
}

pub struct BreakerConfig {
    pub overflow_wrap: OverflowWrap,
    pub text_align: TextAlign,
    pub text_indent: Au,
}

/// Breaks `stream` into lines no wider than `available_width`, calling
/// `shaper` once per bidi-contiguous text item on demand (§4.4 "shaping
/// text on demand (one shape per bidi-contiguous text item)").
///
/// Returns one `RootLineBox` per produced line plus the remaining
/// available width is not tracked here (callers query float offsets
/// per-line, §4.5).
pub fn break_lines(stream: &LineItemStream, available_width: Au, shaper: &mut dyn Shaper, config: &BreakerConfig) -> Vec<RootLineBox> {
    let mut lines = Vec::new();
    let mut index = 0usize;
    let mut first_line = true;
    while index < stream.items.len() {
        let indent = if first_line { config.text_indent } else { Au(0) };
        let (line, consumed) = break_one_line(stream, &stream.items[index..], available_width - indent, shaper, config);
        let mut line = line;
        if first_line {
            // text-indent only ever applies to the first line (§4.4).
            line.block_offset = Au(0);
        }
        justify_line(&mut line, available_width - indent, config.text_align, consumed.1);
        lines.push(line);
        index += consumed.0.max(1);
        first_line = false;
    }
    lines
}

/// Breaks one line starting at `items[0]`. Returns the line plus
/// `(items_consumed, is_last_line)`.
fn break_one_line(
    stream: &LineItemStream,
    items: &[LineItem],
    available_width: Au,
    shaper: &mut dyn Shaper,
    config: &BreakerConfig,
) -> (RootLineBox, (usize, bool)) {
    let mut line = RootLineBox::default();
    let mut width = Au(0);
    let mut last_break_opportunity: Option<usize> = None;
    let mut committed_entries = 0usize;
    let mut i = 0usize;

    while i < items.len() {
        let item = &items[i];
        if item.kind == LineItemKind::HardBreakOpportunity {
            i += 1;
            committed_entries = line.entries.len();
            return finish_line(line, width, (i, i >= items.len()));
        }
        let entry_width = match item.kind {
            LineItemKind::NormalText => {
                let text = &stream.text[item.start as usize..item.end as usize];
                shaper.measure(text)
            }
            LineItemKind::Replaced => shaper.replaced_size(item.owner).0,
            _ => Au(0),
        };

        if width + entry_width > available_width && !line.entries.is_empty() {
            if let Some(break_at) = last_break_opportunity {
                return finish_line_truncated(stream, items, line, break_at);
            }
            // No opportunity within the line: attempt a mid-item emergency
            // break for the *current* overlong item (§4.4, §8 invariant 7).
            if item.kind == LineItemKind::NormalText && matches!(config.overflow_wrap, OverflowWrap::BreakWord | OverflowWrap::Anywhere) {
                let text = &stream.text[item.start as usize..item.end as usize];
                if let Some(split) = emergency_break_point(text) {
                    let head = &text[..split];
                    let head_width = shaper.measure(head);
                    push_text_entry(&mut line, item, item.start, item.start + split as u32, head_width);
                    width += head_width;
                    return finish_line(line, width, (i, false));
                }
            }
            // Single overlong item with no break point at all: place it
            // anyway (emergency break, §8 invariant 7).
        }

        match item.kind {
            LineItemKind::NormalText => {
                push_text_entry(&mut line, item, item.start, item.end, entry_width);
            }
            LineItemKind::Replaced => {
                let (w, h) = shaper.replaced_size(item.owner);
                line.entries.push(LineBoxEntry::Replaced(ReplacedLineBox { owner: item.owner, width: w, height: h, bidi_level: item.bidi_level }));
                line.height = line.height.max(h);
            }
            _ => {}
        }
        width += entry_width;
        if can_break_after(stream, i) {
            last_break_opportunity = Some(i + 1);
        }
        i += 1;
    }
    committed_entries = committed_entries.max(line.entries.len());
    let _ = committed_entries;
    finish_line(line, width, (i, true))
}

fn push_text_entry(line: &mut RootLineBox, item: &LineItem, start: u32, end: u32, width: Au) {
    line.entries.push(LineBoxEntry::Text(TextLineBox { owner: item.owner, start, end, width, expansion: Au(0), bidi_level: item.bidi_level }));
}

fn finish_line(line: RootLineBox, width: Au, consumed: (usize, bool)) -> (RootLineBox, (usize, bool)) {
    let mut line = line;
    line.reorder_visually();
    let _ = width;
    (line, consumed)
}

fn finish_line_truncated(stream: &LineItemStream, items: &[LineItem], mut line: RootLineBox, break_at: usize) -> (RootLineBox, (usize, bool)) {
    // Trim entries back to the committed break point. Since entries are
    // pushed 1:1 with non-empty items up to `break_at`, truncate to that
    // many meaningful entries.
    let kept = items[..break_at].iter().filter(|it| matches!(it.kind, LineItemKind::NormalText | LineItemKind::Replaced)).count();
    line.entries.truncate(kept);
    let _ = stream;
    let is_last = break_at >= items.len();
    line.reorder_visually();
    (line, (break_at, is_last))
}

/// Finds a UAX #14 line-break opportunity strictly inside `text`, for the
/// `break-word`/`overflow-wrap: anywhere` mid-item fallback (§4.4).
fn emergency_break_point(text: &str) -> Option<usize> {
    LineBreakIterator::new(text).map(|(index, _hard)| index).find(|&index| index > 0 && index < text.len())
}

/// Distributes residual width across text runs' expansion opportunities
/// under `text-align: justify` (§4.4, CSS UAX #14); the last line of a
/// justified block is never stretched.
fn justify_line(line: &mut RootLineBox, available_width: Au, text_align: TextAlign, is_last_line: bool) {
    if text_align != TextAlign::Justify || is_last_line {
        return;
    }
    let used: Au = line
        .entries
        .iter()
        .map(|e| match e {
            LineBoxEntry::Text(t) => t.width,
            LineBoxEntry::Replaced(r) => r.width,
            LineBoxEntry::Flow(_) => Au(0),
        })
        .fold(Au(0), |a, b| a + b);
    let residual = available_width - used;
    if residual.0 <= 0 {
        return;
    }
    let expandable: Vec<usize> = line
        .entries
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, LineBoxEntry::Text(_)))
        .map(|(i, _)| i)
        .collect();
    if expandable.is_empty() {
        return;
    }
    let share = Au(residual.0 / expandable.len() as i32);
    for i in expandable {
        if let LineBoxEntry::Text(t) = &mut line.entries[i] {
            t.expansion = share;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::{BoxKind, BoxTree};
    use crate::layout::inline::items::CollapseType;

    struct FixedShaper {
        per_char: Au,
    }

    impl Shaper for FixedShaper {
        fn measure(&mut self, text: &str) -> Au {
            Au(self.per_char.0 * text.chars().count() as i32)
        }

        fn replaced_size(&self, _owner: BoxId) -> (Au, Au) {
            (Au::from_px(10), Au::from_px(10))
        }
    }

    fn dummy_owner() -> BoxId {
        let style: crate::style::BoxStyle = std::sync::Arc::new(crate::style::BoxStyleData::default());
        let tree = BoxTree::new(style.clone());
        tree.alloc(None, style, BoxKind::View)
    }

    fn text_item(text: &str, byte_start: u32) -> LineItem {
        LineItem {
            kind: LineItemKind::NormalText,
            owner: dummy_owner(),
            start: byte_start,
            end: byte_start + text.len() as u32,
            bidi_level: 0,
            collapse_type: CollapseType::NotCollapsible,
        }
    }

    #[test]
    fn breaks_at_word_boundaries_when_overflowing() {
        // "aa bb cc" with per-char width 10px and available width 25px:
        // "aa" (20) fits, " bb" can't join without exceeding, next line starts.
        let words = ["aa", " ", "bb", " ", "cc"];
        let mut text = String::new();
        let mut items = Vec::new();
        for w in words {
            items.push(text_item(w, text.len() as u32));
            text.push_str(w);
        }
        let stream = LineItemStream { items, text };
        let mut shaper = FixedShaper { per_char: Au::from_px(10) };
        let config = BreakerConfig { overflow_wrap: OverflowWrap::Normal, text_align: TextAlign::Start, text_indent: Au(0) };
        let lines = break_lines(&stream, Au::from_px(25), &mut shaper, &config);
        assert!(lines.len() >= 2);
    }

    #[test]
    fn single_overlong_word_still_placed() {
        let long = "supercalifragilisticexpialidocious";
        let stream = LineItemStream { items: vec![text_item(long, 0)], text: long.to_string() };
        let mut shaper = FixedShaper { per_char: Au::from_px(10) };
        let config = BreakerConfig { overflow_wrap: OverflowWrap::Normal, text_align: TextAlign::Start, text_indent: Au(0) };
        let lines = break_lines(&stream, Au::from_px(50), &mut shaper, &config);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].entries.len(), 1);
    }
}
