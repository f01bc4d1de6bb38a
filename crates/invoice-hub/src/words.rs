//! Amounts in English words

use crate::error::{Error, Result};
use crate::format::Amount;

const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

// Short scale, one entry per group of three digits
const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

fn below_hundred(n: u64, out: &mut String) {
    debug_assert!(n < 100);
    if n < 20 {
        out.push_str(ONES[n as usize]);
    } else {
        out.push_str(TENS[(n / 10) as usize]);
        if n % 10 != 0 {
            out.push('-');
            out.push_str(ONES[(n % 10) as usize]);
        }
    }
}

fn below_thousand(n: u64, out: &mut String) {
    let (hundreds, rest) = (n / 100, n % 100);
    if hundreds > 0 {
        out.push_str(ONES[hundreds as usize]);
        out.push_str(" hundred");
        if rest > 0 {
            out.push_str(" and ");
        }
    }
    if rest > 0 || hundreds == 0 {
        below_hundred(rest, out);
    }
}

/// Lower-case English cardinal words for `n`, without commas.
///
/// ```
/// use invoice_hub::words::cardinal;
///
/// assert_eq!(cardinal(1001), "one thousand and one");
/// assert_eq!(cardinal(121), "one hundred and twenty-one");
/// ```
pub fn cardinal(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::with_capacity(SCALES.len());
    let mut rest = n;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }

    let mut out = String::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
            if scale == 0 && group < 100 {
                out.push_str("and ");
            }
        }
        below_thousand(group, &mut out);
        if scale > 0 {
            out.push(' ');
            out.push_str(SCALES[scale]);
        }
    }
    out
}

/// Capitalize every letter that follows a non-letter
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// `"<Rupees> Rupees[ And <Paise> Paise] Only"`
pub fn amount_in_words(amount: Amount) -> String {
    let rupees = title_case(&cardinal(amount.rupees()));
    match amount.paise() {
        0 => format!("{} Rupees Only", rupees),
        paise => format!(
            "{} Rupees And {} Paise Only",
            rupees,
            title_case(&cardinal(u64::from(paise)))
        ),
    }
}

/// Words for an amount given as text, such as a command-line argument
pub fn words_for_text(text: &str) -> Result<String> {
    Amount::parse(text)
        .map(amount_in_words)
        .ok_or_else(|| Error::UnparseableAmount(text.to_string()))
}
