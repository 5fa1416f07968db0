//! Typed tokens produced by the FLE lexer.

/// Directive keywords recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `mycall <callsign>`
    MyCall,
    /// `operator <callsign>`
    Operator,
    /// `qslmsg <rest of line>`
    QslMsg,
    /// `qslmsg2 <rest of line>`
    QslMsg2,
    /// `mywwff <ref>`
    MyWwff,
    /// `mysota <ref>`
    MySota,
    /// `mypota <ref>...`
    MyPota,
    /// `nickname <word>`
    Nickname,
    /// `date <Y-M-D | M-D>`
    Date,
    /// `day <+ | ++>`
    Day,
    /// `rigset <n>`
    RigSet,
    /// `timezone <signed hours>`
    Timezone,
    /// `number <consecutive | literal>`
    Number,
    /// Operand keyword of `number`.
    Consecutive,
}

impl Directive {
    /// Maps a lower-cased word to its directive.
    pub fn from_word(word: &str) -> Option<Directive> {
        Some(match word {
            "mycall" => Directive::MyCall,
            "operator" => Directive::Operator,
            "qslmsg" => Directive::QslMsg,
            "qslmsg2" => Directive::QslMsg2,
            "mywwff" => Directive::MyWwff,
            "mysota" => Directive::MySota,
            "mypota" => Directive::MyPota,
            "nickname" => Directive::Nickname,
            "date" => Directive::Date,
            "day" => Directive::Day,
            "rigset" => Directive::RigSet,
            "timezone" => Directive::Timezone,
            "number" => Directive::Number,
            "consecutive" => Directive::Consecutive,
            _ => return None,
        })
    }

    /// The keyword as written in a log.
    pub fn word(&self) -> &'static str {
        match self {
            Directive::MyCall => "mycall",
            Directive::Operator => "operator",
            Directive::QslMsg => "qslmsg",
            Directive::QslMsg2 => "qslmsg2",
            Directive::MyWwff => "mywwff",
            Directive::MySota => "mysota",
            Directive::MyPota => "mypota",
            Directive::Nickname => "nickname",
            Directive::Date => "date",
            Directive::Day => "day",
            Directive::RigSet => "rigset",
            Directive::Timezone => "timezone",
            Directive::Number => "number",
            Directive::Consecutive => "consecutive",
        }
    }
}

/// One lexeme of an FLE line. Each variant carries its decoded payload;
/// `raw` fields keep the text as typed for diagnostics and remark slots.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bracketed comment; `delim` is one of `<`, `[`, `{`.
    Comment {
        /// Opening delimiter, selects the remark slot.
        delim: char,
        /// Comment body.
        text: String,
    },
    /// Full date `Y-M-D` or `Y/M/D`.
    Date {
        /// Year.
        y: i32,
        /// Month.
        m: u32,
        /// Day.
        d: u32,
    },
    /// Short date `M-D` or `M/D`.
    ShortDate {
        /// Month.
        m: u32,
        /// Day.
        d: u32,
    },
    /// Decimal frequency in MHz, kept raw.
    Freq(String),
    /// Signed integer: SNR report or timezone offset.
    Snr(String),
    /// Known band name with its seeded SOTA frequency label.
    Band {
        /// Band name as typed.
        label: String,
        /// SOTA frequency label for the band.
        freq: &'static str,
    },
    /// WWFF reference.
    WwffRef(String),
    /// SOTA reference.
    SotaRef(String),
    /// POTA reference.
    PotaRef(String),
    /// Directive keyword; `rest` carries the remainder of the line for
    /// the whole-line directives (`qslmsg`, `qslmsg2`).
    Keyword {
        /// Recognized directive.
        dir: Directive,
        /// Remainder of the line, whole-line directives only.
        rest: String,
    },
    /// Recognized mode name, upper-cased.
    Mode(String),
    /// Unsigned integer tagged with its digit count.
    Dec {
        /// Number of digits; selects the downstream interpretation.
        digits: usize,
        /// Digits as typed.
        value: String,
    },
    /// Callsign, upper-cased.
    Call(String),
    /// Contest exchange sent, `.NNN`.
    CtstSent(String),
    /// Contest exchange received, `,NNN`.
    CtstRcvd(String),
    /// Slash/dash-containing token that matched nothing.
    Unknown(String),
    /// Anything else.
    Literal {
        /// Upper-cased form.
        upper: String,
        /// Text as typed.
        raw: String,
    },
}

impl Token {
    /// Text as typed, for operand diagnostics.
    pub fn raw(&self) -> String {
        match self {
            Token::Comment { text, .. } => text.clone(),
            Token::Date { y, m, d } => format!("{y}-{m}-{d}"),
            Token::ShortDate { m, d } => format!("{m}-{d}"),
            Token::Freq(s)
            | Token::Snr(s)
            | Token::WwffRef(s)
            | Token::SotaRef(s)
            | Token::PotaRef(s)
            | Token::Mode(s)
            | Token::Call(s)
            | Token::CtstSent(s)
            | Token::CtstRcvd(s)
            | Token::Unknown(s) => s.clone(),
            Token::Band { label, .. } => label.clone(),
            Token::Keyword { dir, .. } => dir.word().to_string(),
            Token::Dec { value, .. } => value.clone(),
            Token::Literal { raw, .. } => raw.clone(),
        }
    }
}
