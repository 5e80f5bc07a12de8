//! Phonetic name bucketing
//!
//! Classic four-character Soundex codes. Same-sounding spellings land
//! in the same bucket ("Smith"/"Smyth" -> S530), so misspelled
//! counselor names still surface as candidates.

/// Encode a single name token as a four-character phonetic code
///
/// The first letter is preserved uppercased; the rest map through the
/// consonant classes below. Vowels and H/W/Y emit nothing but break a
/// run, so a repeated class separated by a vowel is emitted again. A
/// letter sharing the class of the immediately preceding letter is
/// collapsed. The code is right-padded with '0' or truncated to
/// exactly four characters.
///
/// Non-ASCII-alphabetic characters are ignored. A token with no
/// letters encodes to the empty string, which never matches.
pub fn phonetic_code(token: &str) -> String {
    let letters: Vec<char> = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let Some((&first, rest)) = letters.split_first() else {
        return String::new();
    };

    let mut code = String::with_capacity(4);
    code.push(first);
    let mut prev_class = digit_class(first);

    for &ch in rest {
        match digit_class(ch) {
            Some(digit) => {
                if prev_class != Some(digit) {
                    code.push(digit);
                    if code.len() == 4 {
                        break;
                    }
                }
                prev_class = Some(digit);
            }
            None => {
                prev_class = None;
            }
        }
    }

    while code.len() < 4 {
        code.push('0');
    }

    code
}

/// Soundex consonant classes; vowels, H, W and Y have no class
fn digit_class(ch: char) -> Option<char> {
    match ch {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

/// Whether two tokens share a phonetic bucket
pub fn phonetic_match(a: &str, b: &str) -> bool {
    let code_a = phonetic_code(a);
    if code_a.is_empty() {
        return false;
    }
    code_a == phonetic_code(b)
}
