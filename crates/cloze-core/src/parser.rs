//! Masked-text parser.
//!
//! Splits a card's masked text into literal and blank segments, and aligns
//! the ground-truth original against those segments.

use crate::model::Segment;

/// Placeholder token the exercise service uses for one fill-in slot.
pub const BLANK_MARKER: &str = "[MASK]";

/// Parse masked text using the default `[MASK]` marker.
pub fn parse(masked_text: &str) -> Vec<Segment> {
    parse_with_marker(masked_text, BLANK_MARKER)
}

/// Parse masked text into alternating literal and blank segments.
///
/// Always starts and ends with a `Literal`, which may be empty. A text with
/// `k` markers yields `k + 1` literals and `k` blanks numbered `0..k` from
/// left to right. An empty marker never matches.
pub fn parse_with_marker(masked_text: &str, marker: &str) -> Vec<Segment> {
    if marker.is_empty() {
        return vec![Segment::literal(masked_text)];
    }

    let mut segments = Vec::new();
    for (slot_index, part) in masked_text.split(marker).enumerate() {
        if slot_index > 0 {
            segments.push(Segment::blank(slot_index - 1));
        }
        segments.push(Segment::literal(part));
    }
    segments
}

/// Reassemble segments into masked text, reinserting `marker` at each blank.
pub fn join(segments: &[Segment], marker: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal { text } => out.push_str(text),
            Segment::Blank { .. } => out.push_str(marker),
        }
    }
    out
}

/// Count blank markers in `masked_text`.
pub fn blank_count(masked_text: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    masked_text.matches(marker).count()
}

/// The literal pieces of a segment list, in order.
pub fn literals(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Literal { text } => Some(text.as_str()),
            Segment::Blank { .. } => None,
        })
        .collect()
}

/// Derive the expected fill of every blank by aligning `original_text`
/// against the literals of `masked_text`.
///
/// The leading literal must be a prefix and the trailing literal a suffix of
/// the original. Middle literals are matched left to right at the earliest
/// position that leaves the preceding blank at least one character; an empty
/// middle literal gives that blank exactly one character. Returns `None` when
/// the texts cannot be aligned.
pub fn align_answers(masked_text: &str, original_text: &str, marker: &str) -> Option<Vec<String>> {
    let segments = parse_with_marker(masked_text, marker);
    let literals = literals(&segments);
    let blanks = literals.len() - 1;

    if blanks == 0 {
        return (masked_text == original_text).then(Vec::new);
    }

    let body = original_text
        .strip_prefix(literals[0])?
        .strip_suffix(literals[blanks])?;

    let mut answers = Vec::with_capacity(blanks);
    let mut rest = body;
    for literal in &literals[1..blanks] {
        let min = rest.chars().next()?.len_utf8();
        let end = if literal.is_empty() {
            min
        } else {
            min + rest[min..].find(literal)?
        };
        answers.push(rest[..end].to_string());
        rest = &rest[end + literal.len()..];
    }

    if rest.is_empty() {
        return None;
    }
    answers.push(rest.to_string());
    Some(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_slots(segments: &[Segment]) -> Vec<usize> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Blank { slot_index } => Some(*slot_index),
                Segment::Literal { .. } => None,
            })
            .collect()
    }

    #[test]
    fn parse_two_blanks_keeps_trailing_empty_literal() {
        let segments = parse("我[MASK]你[MASK]");
        assert_eq!(
            segments,
            vec![
                Segment::literal("我"),
                Segment::blank(0),
                Segment::literal("你"),
                Segment::blank(1),
                Segment::literal(""),
            ]
        );
    }

    #[test]
    fn parse_without_markers_is_single_literal() {
        let segments = parse("没有空格");
        assert_eq!(segments, vec![Segment::literal("没有空格")]);
        assert!(blank_slots(&segments).is_empty());
    }

    #[test]
    fn parse_empty_text() {
        assert_eq!(parse(""), vec![Segment::literal("")]);
    }

    #[test]
    fn parse_adjacent_and_edge_markers() {
        let segments = parse("[MASK][MASK]好[MASK]");
        assert_eq!(
            segments,
            vec![
                Segment::literal(""),
                Segment::blank(0),
                Segment::literal(""),
                Segment::blank(1),
                Segment::literal("好"),
                Segment::blank(2),
                Segment::literal(""),
            ]
        );
    }

    #[test]
    fn slot_indices_run_left_to_right() {
        let text = "a[MASK]b[MASK]c[MASK]d[MASK]e[MASK]";
        assert_eq!(blank_slots(&parse(text)), vec![0, 1, 2, 3, 4]);
        assert_eq!(blank_count(text, BLANK_MARKER), 5);
    }

    #[test]
    fn join_reproduces_input() {
        let cases = [
            "",
            "plain text",
            "[MASK]",
            "[MASK]start",
            "end[MASK]",
            "[MASK][MASK][MASK]",
            "我[MASK]你[MASK]",
            "[MAS[MASK]K]",
            "[MASK]a[MASK][MASK]b[MASK]",
        ];
        for text in cases {
            assert_eq!(join(&parse(text), BLANK_MARKER), text, "round trip of {text:?}");
        }
    }

    #[test]
    fn custom_marker() {
        let segments = parse_with_marker("我____你", "____");
        assert_eq!(blank_slots(&segments), vec![0]);
        assert_eq!(join(&segments, "____"), "我____你");
        assert_eq!(literals(&segments), vec!["我", "你"]);
    }

    #[test]
    fn empty_marker_never_matches() {
        assert_eq!(parse_with_marker("abc", ""), vec![Segment::literal("abc")]);
        assert_eq!(blank_count("abc", ""), 0);
    }

    #[test]
    fn align_simple_card() {
        let answers = align_answers("我[MASK]你[MASK]", "我爱你们", BLANK_MARKER).unwrap();
        assert_eq!(answers, vec!["爱", "们"]);
    }

    #[test]
    fn align_multi_char_blank() {
        let answers =
            align_answers("我们去[MASK]吃饭", "我们去饭馆吃饭", BLANK_MARKER).unwrap();
        assert_eq!(answers, vec!["饭馆"]);
    }

    #[test]
    fn align_adjacent_blanks_take_one_char_each() {
        let answers = align_answers("[MASK][MASK]好", "你们好", BLANK_MARKER).unwrap();
        assert_eq!(answers, vec!["你", "们"]);
    }

    #[test]
    fn align_rejects_mismatched_literals() {
        assert!(align_answers("我[MASK]他", "我爱你", BLANK_MARKER).is_none());
        assert!(align_answers("他[MASK]你", "我爱你", BLANK_MARKER).is_none());
    }

    #[test]
    fn align_rejects_empty_fill() {
        assert!(align_answers("我[MASK]你", "我你", BLANK_MARKER).is_none());
        assert!(align_answers("我你[MASK]", "我你", BLANK_MARKER).is_none());
    }

    #[test]
    fn align_without_blanks_requires_identical_text() {
        assert_eq!(align_answers("你好", "你好", BLANK_MARKER), Some(vec![]));
        assert!(align_answers("你好", "您好", BLANK_MARKER).is_none());
    }
}
