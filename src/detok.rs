//! Reconstruction of natural text from whitespace-tokenized lines.
//!
//! Tokenized corpora split punctuation, contractions and quotation marks into their own
//! tokens (`He said `` hello , '' she replied .`). [`combine`] glues them back onto the
//! neighbouring words and tracks whether a quotation is open so that an opening quote
//! attaches to the word after it and a closing quote to the word before it.
//!
//! The quote state is threaded explicitly: callers pass the state left by the previous
//! line and receive the new one, resetting it to [`QuoteState::Closed`] wherever their
//! corpus starts a new scope.

use crate::models::QuoteState;

const QUOTE: char = '"';
const CLAUSE_PUNCTUATION: [char; 4] = [',', '.', ';', ':'];
const NEGATION: &str = "n't";

/// Detokenizes one line, returning the cleaned line and the outgoing quote state.
///
/// Merge rules, first match wins, applied to the pair at the cursor without advancing:
///
/// 1. quotation open and the right token starts with `"`: merge and close
/// 2. quotation closed and the left token ends with an opening `"`: merge and open
/// 3. right token starts with `, . ; :`: merge
/// 4. left token does not end with `, . ; :` and the pair is not word-to-word: merge
/// 5. right token is `n't`: merge
///
/// A trailing `"` counts as opening unless it closed a quotation during this scan or the
/// token holds an even number of quotes. Rule 4 never merges a `"` onto the following
/// token while the quotation is closed, and never onto a right token starting with `"`.
pub fn combine(line: &str, state: QuoteState) -> (String, QuoteState) {
    let normalized = line.trim().replace("``", "\"").replace("''", "\"");
    let mut tokens: Vec<String> = normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let mut state = state;
    // Index of the token that absorbed the most recent closing quote
    let mut closed_at: Option<usize> = None;
    let mut i = 0;

    while i + 1 < tokens.len() {
        let left = &tokens[i];
        let right = &tokens[i + 1];

        if state.is_open() && starts_with(right, QUOTE) {
            merge_at(&mut tokens, i);
            state = QuoteState::Closed;
            closed_at = Some(i);
        } else if !state.is_open() && closed_at != Some(i) && ends_with_opening_quote(left) {
            merge_at(&mut tokens, i);
            state = QuoteState::Open;
        } else if starts_with_any(right, &CLAUSE_PUNCTUATION) {
            merge_at(&mut tokens, i);
        } else if !ends_with_any(left, &CLAUSE_PUNCTUATION)
            && !word_to_word(left, right)
            && !(ends_with(left, QUOTE) && !state.is_open())
            && !starts_with(right, QUOTE)
        {
            merge_at(&mut tokens, i);
        } else if right == NEGATION {
            merge_at(&mut tokens, i);
        } else {
            i += 1;
        }
    }

    (tokens.join(" "), state)
}

fn merge_at(tokens: &mut Vec<String>, i: usize) {
    let right = tokens.remove(i + 1);
    tokens[i].push_str(&right);
}

fn ends_with_opening_quote(token: &str) -> bool {
    ends_with(token, QUOTE) && token.matches(QUOTE).count() % 2 == 1
}

fn word_to_word(left: &str, right: &str) -> bool {
    let left_word = left.chars().last().is_some_and(char::is_alphanumeric);
    let right_word = right.chars().next().is_some_and(char::is_alphanumeric);
    left_word && right_word
}

fn starts_with(token: &str, c: char) -> bool {
    token.starts_with(c)
}

fn ends_with(token: &str, c: char) -> bool {
    token.ends_with(c)
}

fn starts_with_any(token: &str, set: &[char]) -> bool {
    token.chars().next().is_some_and(|c| set.contains(&c))
}

fn ends_with_any(token: &str, set: &[char]) -> bool {
    token.chars().last().is_some_and(|c| set.contains(&c))
}
