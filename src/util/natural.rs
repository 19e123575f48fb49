//! Case-insensitive natural ordering for human-entered strings.
//!
//! Digit runs compare by numeric magnitude, everything else compares
//! case-insensitively, so `"2" < "10" < "100"` and `"Item 9" < "item 10"`.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut lhs = left.trim_start().chars().peekable();
    let mut rhs = right.trim_start().chars().peekable();

    loop {
        match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                let a_run = take_digits(&mut lhs);
                let b_run = take_digits(&mut rhs);
                let ordering = compare_digit_runs(&a_run, &b_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(a), Some(b)) => {
                let ordering = fold_case(a).cmp(&fold_case(b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                lhs.next();
                rhs.next();
            }
        }
    }
}

/// Sort a slice of strings in place using [`natural_cmp`].
pub fn natural_sort<S: AsRef<str>>(values: &mut [S]) {
    values.sort_by(|left, right| natural_cmp(left.as_ref(), right.as_ref()));
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(ch) = chars.peek().copied() {
        if !ch.is_ascii_digit() {
            break;
        }
        run.push(ch);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left_trimmed = left.trim_start_matches('0');
    let right_trimmed = right.trim_start_matches('0');
    left_trimmed
        .len()
        .cmp(&right_trimmed.len())
        .then_with(|| left_trimmed.cmp(right_trimmed))
}

fn fold_case(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}
