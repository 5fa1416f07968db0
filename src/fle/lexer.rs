//! Hand-written per-line lexer for the FLE language.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::call::parse_callsign;
use crate::tables::{band_token, rst_style};

use super::token::{Directive, Token};

static DATE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)-(\d+)$").unwrap());
static DATE2_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());
static DATE_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)/(\d+)/(\d+)$").unwrap());
static DATE2_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").unwrap());
static FREQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").unwrap());
static SNR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]\d+$").unwrap());
static WWFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+FF-\d+$").unwrap());
static SOTA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+/\w+-\d+$").unwrap());
static POTA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+-\d+$").unwrap());
static DEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static CTST_SENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\w+").unwrap());
static CTST_RCVD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^,\w+").unwrap());
static SLASHED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\-]").unwrap());

/// Word separators: ASCII and full-width space.
fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{3000}'
}

/// Scans the next word starting at `chars[pos]`. The characters `#<[{`
/// terminate scanning immediately and come back as one-char words.
fn next_word(chars: &[char], mut pos: usize) -> (usize, String) {
    let mut word = String::new();
    while pos < chars.len() {
        let c = chars[pos];
        if is_space(c) {
            if !word.is_empty() {
                return (pos + 1, word);
            }
            pos += 1;
        } else if matches!(c, '#' | '<' | '[' | '{') {
            return (pos + 1, c.to_string());
        } else {
            word.push(c);
            pos += 1;
        }
    }
    (pos, word)
}

/// Collects a bracketed comment body up to the first closing delimiter.
fn comment_body(chars: &[char], mut pos: usize) -> (usize, String) {
    let mut body = String::new();
    while pos < chars.len() {
        let c = chars[pos];
        if matches!(c, '>' | ']' | '}') {
            return (pos + 1, body);
        }
        body.push(c);
        pos += 1;
    }
    (pos, body)
}

fn num_u32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

/// Tokenizes one line. Lexing stops at a bare `#`; `qslmsg`/`qslmsg2`
/// swallow the remainder of the line as their operand.
pub fn tokenize(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let (next, word) = next_word(&chars, pos);
        pos = next;
        let w = word.to_uppercase();

        if w == "#" {
            break;
        }
        if w.is_empty() {
            continue;
        }
        if matches!(w.as_str(), "<" | "[" | "{") {
            let delim = w.chars().next().unwrap_or('<');
            let (next, body) = comment_body(&chars, pos);
            pos = next;
            tokens.push(Token::Comment { delim, text: body });
            continue;
        }
        if let Some(m) = DATE_DASH.captures(&w).or_else(|| DATE_SLASH.captures(&w)) {
            tokens.push(Token::Date {
                y: m[1].parse().unwrap_or(0),
                m: num_u32(&m[2]),
                d: num_u32(&m[3]),
            });
            continue;
        }
        if let Some(m) = DATE2_DASH.captures(&w).or_else(|| DATE2_SLASH.captures(&w)) {
            tokens.push(Token::ShortDate {
                m: num_u32(&m[1]),
                d: num_u32(&m[2]),
            });
            continue;
        }
        if FREQ.is_match(&w) {
            tokens.push(Token::Freq(w));
            continue;
        }
        if SNR.is_match(&w) {
            tokens.push(Token::Snr(w));
            continue;
        }
        if let Some((wlen, freq)) = band_token(&w) {
            tokens.push(Token::Band {
                label: wlen.to_string(),
                freq,
            });
            continue;
        }
        if WWFF.is_match(&w) {
            tokens.push(Token::WwffRef(w));
            continue;
        }
        if SOTA.is_match(&w) {
            tokens.push(Token::SotaRef(w));
            continue;
        }
        if POTA.is_match(&w) {
            tokens.push(Token::PotaRef(w));
            continue;
        }
        if let Some(dir) = Directive::from_word(&w.to_lowercase()) {
            if matches!(dir, Directive::QslMsg | Directive::QslMsg2) {
                let rest: String = chars[pos.min(chars.len())..].iter().collect();
                tokens.push(Token::Keyword {
                    dir,
                    rest: rest.trim().to_string(),
                });
                break;
            }
            tokens.push(Token::Keyword {
                dir,
                rest: String::new(),
            });
            continue;
        }
        if rst_style(&w).is_some() {
            tokens.push(Token::Mode(w));
            continue;
        }
        if DEC.is_match(&w) {
            tokens.push(Token::Dec {
                digits: w.len(),
                value: w,
            });
            continue;
        }
        if parse_callsign(&w).is_some() {
            tokens.push(Token::Call(w));
            continue;
        }
        if CTST_SENT.is_match(&w) {
            tokens.push(Token::CtstSent(w));
            continue;
        }
        if CTST_RCVD.is_match(&w) {
            tokens.push(Token::CtstRcvd(w));
            continue;
        }
        if SLASHED.is_match(&w) {
            tokens.push(Token::Unknown(w));
            continue;
        }
        tokens.push(Token::Literal {
            upper: w,
            raw: word,
        });
    }

    tokens
}
