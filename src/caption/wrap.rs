use super::ELLIPSIS;

/// Greedy left-to-right word wrap.
///
/// Words are packed onto a line while `measure` says the line still fits in
/// `max_width`. Once `max_lines - 1` lines are committed the remaining words
/// all land on the final line, which is then cut back and suffixed with
/// [`ELLIPSIS`] if it overflows. When not even one character plus the
/// ellipsis fits, that line collapses to an empty string.
///
/// Only the last line is ever truncated: an over-wide word that ends up on an
/// earlier line is left as is.
pub fn wrap<M>(text: &str, max_width: f64, max_lines: u32, measure: M) -> Vec<String>
where
    M: Fn(&str) -> f64,
{
    let max_lines = max_lines.max(1) as usize;
    let fits = |candidate: &str| measure(candidate) <= max_width;

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        // the final slot takes whatever is left
        if lines.len() >= max_lines - 1 || fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current = word.to_string();
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if let Some(last) = lines.last_mut() {
        if !fits(last) {
            *last = truncate_with_ellipsis(last, &fits);
        }
    }

    lines
}

fn truncate_with_ellipsis<F>(line: &str, fits: &F) -> String
where
    F: Fn(&str) -> bool,
{
    let boundaries: Vec<usize> = line.char_indices().map(|(idx, _)| idx).skip(1).collect();
    for end in boundaries.into_iter().rev() {
        let prefix = line[..end].trim_end();
        if prefix.is_empty() {
            continue;
        }
        let candidate = format!("{}{}", prefix, ELLIPSIS);
        if fits(&candidate) {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10px per character.
    fn mono(text: &str) -> f64 {
        text.chars().count() as f64 * 10.0
    }

    #[test]
    fn empty_and_blank_input_yield_no_lines() {
        assert!(wrap("", 100.0, 2, mono).is_empty());
        assert!(wrap("   \n\t ", 100.0, 2, mono).is_empty());
    }

    #[test]
    fn fitting_text_stays_on_one_line() {
        assert_eq!(wrap("HELLO WORLD", 740.0, 2, mono), vec!["HELLO WORLD"]);
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(wrap("  A \n  B\tC ", 100.0, 2, mono), vec!["A B C"]);
    }

    #[test]
    fn breaks_greedily_at_word_boundaries() {
        // 10 chars per line
        let lines = wrap("one two three four five", 100.0, 4, mono);
        assert_eq!(lines, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn final_line_absorbs_the_rest_and_is_truncated() {
        let lines = wrap("one two three four five six", 100.0, 2, mono);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "one two");
        // "three four five six" cut down to 7 chars + "..."
        assert_eq!(lines[1], "three f...");
        assert!(mono(&lines[1]) <= 100.0);
    }

    #[test]
    fn single_line_budget_truncates_everything_onto_one_line() {
        let lines = wrap("alpha beta gamma", 80.0, 1, mono);
        assert_eq!(lines, vec!["alpha..."]);
    }

    #[test]
    fn zero_max_lines_behaves_like_one() {
        assert_eq!(
            wrap("alpha beta gamma", 80.0, 0, mono),
            wrap("alpha beta gamma", 80.0, 1, mono)
        );
    }

    #[test]
    fn overwide_word_is_not_truncated_mid_block() {
        let lines = wrap("abcdefghijklmnop hi", 100.0, 3, mono);
        assert_eq!(lines, vec!["abcdefghijklmnop", "hi"]);
    }

    #[test]
    fn overwide_last_word_gets_the_ellipsis() {
        let lines = wrap("hi abcdefghijklmnop", 100.0, 3, mono);
        assert_eq!(lines, vec!["hi", "abcdefg..."]);
    }

    #[test]
    fn collapses_to_empty_when_ellipsis_cannot_fit() {
        let wide = |text: &str| text.chars().count() as f64 * 100.0;
        let lines = wrap("WIDEWORDWIDE", 200.0, 2, wide);
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn already_fitting_text_is_returned_unchanged() {
        let once = wrap("one two three four five six", 100.0, 2, mono);
        let joined = once.join(" ");
        let again = wrap(&once[1], 100.0, 1, mono);
        assert_eq!(again, vec![once[1].clone()]);
        assert!(joined.contains("..."));
    }

    #[test]
    fn never_exceeds_line_budget() {
        let text = "a b c d e f g h i j k l m n o p q r s t u v w x y z";
        for max_lines in 1..6 {
            let lines = wrap(text, 30.0, max_lines, mono);
            assert!(lines.len() <= max_lines as usize);
        }
    }

    #[test]
    fn trailing_space_is_dropped_before_ellipsis() {
        // "ab cdefgh" overflows 8 chars; "ab" + "..." is the longest fit
        let lines = wrap("ab cdefgh", 60.0, 1, mono);
        assert_eq!(lines, vec!["ab..."]);
    }

    #[test]
    fn multibyte_characters_are_cut_on_char_boundaries() {
        let lines = wrap("ÄÖÜÄÖÜÄÖÜ", 50.0, 1, mono);
        assert_eq!(lines, vec!["ÄÖ..."]);
    }
}
