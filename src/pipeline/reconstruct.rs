//! Structure reconstruction: rebuild lists, headings and paragraphs from
//! flat OCR lines.
//!
//! OCR hands back one string per visual line. A wrapped sentence becomes
//! three fragments, and a bulleted list loses nothing but its meaning. This
//! module re-assembles those fragments into text that reads like the slide
//! did, using surface patterns only.
//!
//! ## Line categories
//!
//! Each non-empty line is tagged with a [`LineKind`], checked in this order:
//!
//! 1. **Bullet**: starts with a bullet glyph (`*`, `-`, `•`, `◦`, `▪`, `►`, `→`)
//! 2. **Numbered**: `12.` or `12)` followed by whitespace
//! 3. **Lettered**: `a.` or `B)` followed by whitespace
//! 4. **Heading**: under 50 characters and ALL CAPS or Title Cased; gets a
//!    blank line before it unless it opens the output
//! 5. **Continuation**: lower-case start, previous raw line not a list
//!    item, last emitted line not closed by `.` `!` `?` `:`; appended to the
//!    last emitted line with a space
//! 6. **Plain**: everything else, emitted on its own line
//!
//! The continuation check looks at two different neighbours: the previous
//! *input* line (for list markers) and the last *emitted* line (for closing
//! punctuation). They drift apart once a heading separator or a merge has
//! been emitted; both references are kept as-is.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*\-•◦▪►→]\s*").unwrap());

static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s").unwrap());

static RE_LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][.)]\s").unwrap());

/// Headings are short; anything this long or longer is body text.
const HEADING_MAX_CHARS: usize = 50;

const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', ':'];

/// Category assigned to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Bullet,
    Numbered,
    Lettered,
    Heading,
    Continuation,
    Plain,
}

/// Rebuild structured text from lines in reading order.
///
/// Empty input (or input of only blank lines) yields an empty string.
pub fn reconstruct<S: AsRef<str>>(lines: &[S]) -> String {
    let emitted = lines
        .iter()
        .enumerate()
        .fold(Vec::<String>::new(), |mut out, (i, raw)| {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                return out;
            }
            let prev_raw = i.checked_sub(1).map(|j| lines[j].as_ref().trim());

            match line_kind(line, prev_raw, out.last().map(String::as_str)) {
                LineKind::Heading => {
                    if !out.is_empty() {
                        out.push(String::new());
                    }
                    out.push(line.to_string());
                }
                LineKind::Continuation => {
                    if let Some(last) = out.last_mut() {
                        last.push(' ');
                        last.push_str(line);
                    }
                }
                LineKind::Bullet | LineKind::Numbered | LineKind::Lettered | LineKind::Plain => {
                    out.push(line.to_string())
                }
            }
            out
        });

    emitted.join("\n").trim().to_string()
}

/// Classify a trimmed, non-empty `line`.
///
/// `prev_raw` is the preceding input line (trimmed, possibly empty) and
/// `last_emitted` the most recent line already written to the output.
pub fn line_kind(line: &str, prev_raw: Option<&str>, last_emitted: Option<&str>) -> LineKind {
    if is_bullet(line) {
        LineKind::Bullet
    } else if is_numbered(line) {
        LineKind::Numbered
    } else if RE_LETTERED.is_match(line) {
        LineKind::Lettered
    } else if is_heading(line) {
        LineKind::Heading
    } else if continues_paragraph(line, prev_raw, last_emitted) {
        LineKind::Continuation
    } else {
        LineKind::Plain
    }
}

fn is_bullet(line: &str) -> bool {
    RE_BULLET.is_match(line)
}

fn is_numbered(line: &str) -> bool {
    RE_NUMBERED.is_match(line)
}

fn is_heading(line: &str) -> bool {
    line.chars().count() < HEADING_MAX_CHARS && (is_all_caps(line) || is_title_case(line))
}

/// At least one upper-case letter and no lower-case ones.
fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Every word is a capital followed only by lower-case letters.
///
/// Word boundaries are any uncased character, so `Machine Learning 101` and
/// `Top-Down View` qualify while `API Design` and `McDonald Farm` do not.
fn is_title_case(line: &str) -> bool {
    let mut in_word = false;
    let mut saw_cased = false;
    for c in line.chars() {
        if c.is_uppercase() {
            if in_word {
                return false;
            }
            in_word = true;
            saw_cased = true;
        } else if c.is_lowercase() {
            if !in_word {
                return false;
            }
            saw_cased = true;
        } else {
            in_word = false;
        }
    }
    saw_cased
}

fn continues_paragraph(line: &str, prev_raw: Option<&str>, last_emitted: Option<&str>) -> bool {
    if prev_raw.is_some_and(|p| is_bullet(p) || is_numbered(p)) {
        return false;
    }
    let Some(last) = last_emitted.filter(|l| !l.is_empty()) else {
        return false;
    };
    !last.ends_with(SENTENCE_TERMINATORS) && line.chars().next().is_some_and(char::is_lowercase)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_string() {
        let none: [&str; 0] = [];
        assert_eq!(reconstruct(&none), "");
        assert_eq!(reconstruct(&["", "   ", "\t"]), "");
    }

    #[test]
    fn bullets_stay_on_their_own_lines() {
        let input = ["• First bullet point", "• Second bullet point", "• Third point"];
        assert_eq!(
            reconstruct(&input),
            "• First bullet point\n• Second bullet point\n• Third point"
        );
    }

    #[test]
    fn numbered_list_is_verbatim() {
        let input = ["1. First item", "2. Second item"];
        assert_eq!(reconstruct(&input), "1. First item\n2. Second item");
    }

    #[test]
    fn wrapped_paragraph_is_merged() {
        let input = [
            "This is the first line of a",
            "paragraph that continues across",
            "multiple lines.",
        ];
        assert_eq!(
            reconstruct(&input),
            "This is the first line of a paragraph that continues across multiple lines."
        );
    }

    #[test]
    fn heading_then_paragraph() {
        let input = ["INTRODUCTION", "This is a paragraph."];
        assert_eq!(reconstruct(&input), "INTRODUCTION\nThis is a paragraph.");
    }

    #[test]
    fn mixed_content() {
        let input = [
            "INTRODUCTION",
            "This is a paragraph.",
            "• Bullet one",
            "• Bullet two",
            "1. Number one",
        ];
        assert_eq!(
            reconstruct(&input),
            "INTRODUCTION\nThis is a paragraph.\n• Bullet one\n• Bullet two\n1. Number one"
        );
    }

    #[test]
    fn heading_after_text_gets_blank_separator() {
        let input = ["Some closing remark.", "Key Takeaways", "Practice daily."];
        assert_eq!(
            reconstruct(&input),
            "Some closing remark.\n\nKey Takeaways\nPractice daily."
        );
    }

    #[test]
    fn long_capitalised_line_is_not_a_heading() {
        let long = "THIS LINE IS FAR TOO LONG TO BE TREATED AS A HEADING BY ANYONE";
        assert!(long.chars().count() >= HEADING_MAX_CHARS);
        assert_eq!(line_kind(long, None, Some("Intro.")), LineKind::Plain);
        assert_eq!(reconstruct(&["Intro.", long]), format!("Intro.\n{long}"));
    }

    #[test]
    fn no_merge_after_terminal_punctuation() {
        for end in [".", "!", "?", ":"] {
            let first = format!("The rule is{end}");
            let out = reconstruct(&[first.as_str(), "keep going"]);
            assert_eq!(out, format!("{first}\nkeep going"));
        }
    }

    #[test]
    fn no_merge_after_list_item() {
        assert_eq!(
            reconstruct(&["• point one", "continues here"]),
            "• point one\ncontinues here"
        );
        assert_eq!(
            reconstruct(&["3) step three", "and then some"]),
            "3) step three\nand then some"
        );
    }

    #[test]
    fn blank_raw_line_between_bullet_and_fragment_allows_merge() {
        // The list check looks at the raw predecessor, which is blank here.
        assert_eq!(reconstruct(&["• item", "", "tail"]), "• item tail");
    }

    #[test]
    fn upper_case_start_is_not_a_continuation() {
        assert_eq!(
            reconstruct(&["a line without a stop", "But this starts fresh"]),
            "a line without a stop\nBut this starts fresh"
        );
    }

    #[test]
    fn categories_follow_precedence() {
        assert_eq!(line_kind("- dash item", None, None), LineKind::Bullet);
        assert_eq!(line_kind("→arrow", None, None), LineKind::Bullet);
        assert_eq!(line_kind("10) ten", None, None), LineKind::Numbered);
        assert_eq!(line_kind("2.5 million", None, None), LineKind::Plain);
        assert_eq!(line_kind("b) letter", None, None), LineKind::Lettered);
        assert_eq!(line_kind("A. Upper letter", None, None), LineKind::Lettered);
        assert_eq!(line_kind("SUMMARY", None, None), LineKind::Heading);
        assert_eq!(line_kind("Machine Learning 101", None, None), LineKind::Heading);
        assert_eq!(
            line_kind("lower start", Some("Open sentence"), Some("Open sentence")),
            LineKind::Continuation
        );
        assert_eq!(line_kind("lower start", None, None), LineKind::Plain);
    }

    #[test]
    fn acronyms_and_inner_capitals_are_not_title_case() {
        assert_eq!(reconstruct(&["Intro text", "API Design"]), "Intro text\nAPI Design");
        assert_eq!(line_kind("API Design", None, None), LineKind::Plain);
        assert_eq!(line_kind("McDonald Farm", None, None), LineKind::Plain);
        assert_eq!(line_kind("Top-Down View", None, None), LineKind::Heading);
        assert_eq!(line_kind("Chapter 3 Review", None, None), LineKind::Heading);
        assert_eq!(line_kind("API DESIGN", None, None), LineKind::Heading);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            reconstruct(&["   Plain sentence here.  ", "  "]),
            "Plain sentence here."
        );
    }

    #[test]
    fn deterministic() {
        let input = ["OVERVIEW", "The model is", "trained on data", "• fast", "Next Steps"];
        assert_eq!(reconstruct(&input), reconstruct(&input));
    }
}
