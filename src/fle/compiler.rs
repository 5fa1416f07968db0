//! Compiles an FLE session into canonical QSO records.
//!
//! A session is processed line by line. A line whose first token is a
//! directive keyword updates the session environment; any other line runs
//! through a small state machine that fills the pending QSO cursor and
//! emits a record when a callsign was seen.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Timelike, Utc,
};
use tracing::debug;

use crate::call::{parse_callsign, split_callsign};
use crate::qso::{QsoRecord, RefSet};
use crate::tables::{adif_mode, airham_mode, band_of, freq_of, rst_style, sota_mode};
use crate::types::{BandVariant, Diag, MAX_INPUT_LINES, RstStyle};

use super::lexer::tokenize;
use super::qsl::{QSL_LIMIT, QTH_LIMIT, compose_qsl_msg};
use super::token::{Directive, Token};

/// Award programs touched by a session. Selects which files the export
/// bundle carries and how the interpretation report labels the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFlags {
    /// A `mysota` directive was seen.
    pub sota: bool,
    /// A `mywwff` directive was seen.
    pub wwff: bool,
    /// A `mypota` directive was seen.
    pub pota: bool,
    /// A `number` directive was seen.
    pub contest: bool,
}

/// Session-wide values collected from directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Station callsign from `mycall`.
    pub my_call: String,
    /// Operator callsign, base of `mycall` unless overridden.
    pub operator: String,
    /// Activated SOTA summit.
    pub my_sota: String,
    /// Activated WWFF reference.
    pub my_wwff: String,
    /// Activated POTA references.
    pub my_pota: Vec<String>,
    /// Free-form log nickname.
    pub nickname: String,
    /// QSL message with reference macros expanded.
    pub qsl_msg: String,
    /// Secondary QSL message.
    pub qsl_msg2: String,
    /// Year from the last `date` directive.
    pub year: i32,
    /// Month from the last `date` directive.
    pub month: u32,
    /// Day from the last `date` directive.
    pub day: u32,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            my_call: String::new(),
            operator: String::new(),
            my_sota: String::new(),
            my_wwff: String::new(),
            my_pota: Vec::new(),
            nickname: String::new(),
            qsl_msg: String::new(),
            qsl_msg2: String::new(),
            year: 2000,
            month: 1,
            day: 1,
        }
    }
}

impl SessionInfo {
    /// File-name stem for the export bundle:
    /// `YYYYMMDD@<summit><parks><wwff>` with `/` flattened to `-`.
    pub fn bundle_name(&self) -> String {
        format!(
            "{}{:02}{:02}@{}{}{}",
            self.year,
            self.month,
            self.day,
            self.my_sota.replace('/', "-"),
            self.my_pota.join("-"),
            self.my_wwff
        )
    }
}

/// Result of compiling one session.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Emitted records, in input order.
    pub qsos: Vec<QsoRecord>,
    /// Diagnostics, in input order.
    pub diags: Vec<Diag>,
    /// Session directives.
    pub session: SessionInfo,
    /// Award flags.
    pub flags: LogFlags,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    AfterBand,
    RstSent,
    RstRcvd,
}

/// Mutable session environment. Cursor fields (`c_*`) hold the pending
/// QSO and reset at every line; the rest persists across the session.
struct Env {
    session: SessionInfo,
    timezone: Option<i32>,
    rigset: u32,
    ctst_num: Option<u32>,
    ctst_lit: Option<String>,

    c_year: i32,
    c_month: u32,
    c_day: u32,
    c_hour: u32,
    c_min: u32,
    c_band: String,
    c_freq: String,
    c_mode: String,
    c_call: String,
    c_rigset: u32,
    c_his_wwff: String,
    c_his_sota: String,
    c_his_pota: Vec<String>,
    c_his_num: String,
    c_my_num: String,
    c_qso_msg: String,
    c_qso_rmks: String,
    c_qsl_override: Option<String>,
    c_r_s: u32,
    c_s_s: u32,
    c_t_s: u32,
    c_r_r: u32,
    c_s_r: u32,
    c_t_r: u32,
    c_snr_s: String,
    c_snr_r: String,
}

impl Env {
    fn new() -> Self {
        Self {
            session: SessionInfo::default(),
            timezone: None,
            rigset: 0,
            ctst_num: None,
            ctst_lit: None,
            c_year: 2000,
            c_month: 1,
            c_day: 1,
            c_hour: 0,
            c_min: 0,
            c_band: String::new(),
            c_freq: String::new(),
            c_mode: "CW".to_string(),
            c_call: String::new(),
            c_rigset: 0,
            c_his_wwff: String::new(),
            c_his_sota: String::new(),
            c_his_pota: Vec::new(),
            c_his_num: String::new(),
            c_my_num: String::new(),
            c_qso_msg: String::new(),
            c_qso_rmks: String::new(),
            c_qsl_override: None,
            c_r_s: 5,
            c_s_s: 9,
            c_t_s: 9,
            c_r_r: 5,
            c_s_r: 9,
            c_t_r: 9,
            c_snr_s: "-10".to_string(),
            c_snr_r: "-10".to_string(),
        }
    }

    fn reset_line(&mut self) {
        self.c_r_s = 5;
        self.c_s_s = 9;
        self.c_t_s = 9;
        self.c_r_r = 5;
        self.c_s_r = 9;
        self.c_t_r = 9;
        self.c_snr_s = "-10".to_string();
        self.c_snr_r = "-10".to_string();
        self.c_call.clear();
        self.c_his_wwff.clear();
        self.c_his_sota.clear();
        self.c_his_pota.clear();
        self.c_his_num.clear();
        self.c_my_num.clear();
        self.c_qso_msg.clear();
        self.c_qso_rmks.clear();
        self.c_qsl_override = None;
    }

    fn expand_macros(&self, text: &str) -> String {
        text.replace("$mywwff", &self.session.my_wwff)
            .replace("$mypota", &self.session.my_pota.join(" "))
            .replace("$mysota", &self.session.my_sota)
    }

    fn directive(
        &mut self,
        dir: Directive,
        rest: &str,
        tokens: &[Token],
        lc: usize,
        diags: &mut Vec<Diag>,
        flags: &mut LogFlags,
    ) {
        let operand = tokens.get(1);
        match dir {
            Directive::Day => {
                let Some(op) = operand else {
                    diags.push(Diag::new(lc, 1, "Missing operand +/++."));
                    return;
                };
                let Some(date) = NaiveDate::from_ymd_opt(self.c_year, self.c_month, self.c_day)
                else {
                    diags.push(Diag::new(lc, 1, "Date out of range."));
                    return;
                };
                let days = match op.raw().as_str() {
                    "+" => 1,
                    "++" => 2,
                    _ => {
                        diags.push(Diag::new(lc, 1, "Unknown operand."));
                        return;
                    }
                };
                let date = date + Duration::days(days);
                self.c_year = date.year();
                self.c_month = date.month();
                self.c_day = date.day();
                self.c_hour = 0;
                self.c_min = 0;
            }
            Directive::MyCall => match operand {
                Some(Token::Call(c)) => {
                    self.session.my_call = c.clone();
                    if let Some(p) = parse_callsign(c) {
                        self.session.operator = p.base;
                    }
                }
                Some(_) => diags.push(Diag::new(lc, 1, "Invalid callsign.")),
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::Operator => match operand {
                Some(Token::Call(c)) => self.session.operator = c.clone(),
                Some(_) => diags.push(Diag::new(lc, 1, "Invalid operator.")),
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::MyWwff => match operand {
                Some(Token::WwffRef(r)) => {
                    self.session.my_wwff = r.clone();
                    flags.wwff = true;
                }
                Some(t) => diags.push(Diag::new(
                    lc,
                    1,
                    format!("{} is invalid WWFF ref#.", t.raw()),
                )),
                None => diags.push(Diag::new(lc, 0, "Missing WWFF ref#.")),
            },
            Directive::MySota => match operand {
                Some(Token::SotaRef(r)) => {
                    self.session.my_sota = r.clone();
                    flags.sota = true;
                }
                Some(t) => diags.push(Diag::new(
                    lc,
                    1,
                    format!("{} is invalid SOTA ref#.", t.raw()),
                )),
                None => diags.push(Diag::new(lc, 0, "Missing SOTA ref#.")),
            },
            Directive::MyPota => {
                if tokens.len() == 1 {
                    diags.push(Diag::new(lc, 0, "Missing POTA ref#."));
                    return;
                }
                for (i, t) in tokens.iter().enumerate().skip(1) {
                    match t {
                        Token::PotaRef(r) => {
                            self.session.my_pota.push(r.clone());
                            flags.pota = true;
                        }
                        other => {
                            diags.push(Diag::new(
                                lc,
                                i,
                                format!("{} is invalid POTA ref#.", other.raw()),
                            ));
                            break;
                        }
                    }
                }
            }
            Directive::Timezone => match operand {
                Some(Token::Snr(tz)) => self.timezone = tz.parse::<i32>().ok(),
                Some(t) => diags.push(Diag::new(
                    lc,
                    1,
                    format!("{} is invalid timezone.", t.raw()),
                )),
                None => diags.push(Diag::new(lc, 0, "Missing timezone. (eg. +9)")),
            },
            Directive::Number => match operand {
                Some(Token::Keyword {
                    dir: Directive::Consecutive,
                    ..
                }) => {
                    self.ctst_num = Some(1);
                    flags.contest = true;
                }
                Some(t) => {
                    self.ctst_lit = Some(t.raw().to_uppercase());
                    flags.contest = true;
                }
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::Nickname => match operand {
                Some(t) => self.session.nickname = t.raw(),
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::RigSet => match operand {
                Some(Token::Dec { value, .. }) => {
                    let n = value.parse().unwrap_or(0);
                    self.c_rigset = n;
                    self.rigset = n;
                }
                Some(_) => diags.push(Diag::new(lc, 1, "Invalid Rig set#.")),
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::QslMsg => self.session.qsl_msg = self.expand_macros(rest),
            Directive::QslMsg2 => self.session.qsl_msg2 = self.expand_macros(rest),
            Directive::Date => match operand {
                Some(Token::Date { y, m, d }) => {
                    self.c_year = *y;
                    self.session.year = *y;
                    self.c_month = *m;
                    self.session.month = *m;
                    self.c_day = *d;
                    self.session.day = *d;
                    self.check_date(lc, diags);
                }
                Some(Token::ShortDate { m, d }) => {
                    self.c_month = *m;
                    self.session.month = *m;
                    self.c_day = *d;
                    self.session.day = *d;
                    self.check_date(lc, diags);
                }
                Some(_) => diags.push(Diag::new(lc, 1, "Wrong date format.")),
                None => diags.push(Diag::new(lc, 0, "Missing operand.")),
            },
            Directive::Consecutive => {}
        }
    }

    fn check_date(&mut self, lc: usize, diags: &mut Vec<Diag>) {
        let ok = self.c_year > 1900
            && self.c_year < 2100
            && self.c_month > 0
            && self.c_month < 13
            && self.c_day > 0
            && self.c_day < 32;
        if ok {
            self.c_hour = 0;
            self.c_min = 0;
        } else {
            diags.push(Diag::new(lc, 1, "Date out of range."));
        }
    }

    fn apply_time(&mut self, digits: usize, value: &str, lc: usize, pos: usize, diags: &mut Vec<Diag>) {
        let v: u32 = value.parse().unwrap_or(0);
        match digits {
            1 => self.c_min = (self.c_min / 10) * 10 + v,
            2 => self.c_min = v % 60,
            3 => {
                self.c_hour = (self.c_hour / 10) * 10 + v / 100;
                self.c_min = v % 60;
            }
            4 => {
                self.c_hour = v / 100;
                self.c_min = v % 100 % 60;
            }
            _ => diags.push(Diag::new(lc, pos, "Wrong time format.")),
        }
    }

    fn set_rst(&mut self, sent: bool, digits: usize, value: &str) {
        let v: u32 = value.parse().unwrap_or(0);
        let (r, s, t) = if sent {
            (&mut self.c_r_s, &mut self.c_s_s, &mut self.c_t_s)
        } else {
            (&mut self.c_r_r, &mut self.c_s_r, &mut self.c_t_r)
        };
        match digits {
            1 => *s = v,
            2 => {
                *r = v / 10;
                *s = v % 10;
            }
            _ => {
                *r = v / 100;
                *s = (v % 100) / 10;
                *t = v % 10;
            }
        }
    }

    /// UTC timestamp of the cursor date, with the source offset rendered
    /// as `+HHMM`. Falls back to the unconverted local values when the
    /// cursor date does not exist on the calendar.
    fn to_utc(&self) -> (Option<DateTime<Utc>>, String) {
        let hours = self.timezone.unwrap_or(0);
        let tz_str = format!(
            "{}{:02}00",
            if hours < 0 { '-' } else { '+' },
            hours.abs()
        );
        let naive = NaiveDate::from_ymd_opt(self.c_year, self.c_month, self.c_day)
            .and_then(|d| d.and_hms_opt(self.c_hour, self.c_min, 0));
        let Some(naive) = naive else {
            return (None, tz_str);
        };
        if self.timezone.is_none() {
            return (Some(Utc.from_utc_datetime(&naive)), tz_str);
        }
        let utc = FixedOffset::east_opt(hours * 3600)
            .and_then(|off| off.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc));
        (utc, tz_str)
    }

    fn emit(&mut self, lc: usize, diags: &mut Vec<Diag>, contest: bool) -> QsoRecord {
        let mut rec = QsoRecord::default();

        let style = rst_style(&self.c_mode).unwrap_or(RstStyle::Rst);
        let (rsts, rstr) = match style {
            RstStyle::Rst => (
                format!("{}{}{}", self.c_r_s, self.c_s_s, self.c_t_s),
                format!("{}{}{}", self.c_r_r, self.c_s_r, self.c_t_r),
            ),
            RstStyle::Rs => (
                format!("{}{}", self.c_r_s, self.c_s_s),
                format!("{}{}", self.c_r_r, self.c_s_r),
            ),
            RstStyle::Snr => (self.c_snr_s.clone(), self.c_snr_r.clone()),
        };

        let (utc, tz_str) = self.to_utc();
        match utc {
            Some(dt) => {
                rec.year = dt.year();
                rec.month = dt.month();
                rec.day = dt.day();
                rec.hour = dt.hour();
                rec.minute = dt.minute();
                rec.iso_time = dt.to_rfc3339_opts(SecondsFormat::Secs, false);
            }
            None => {
                rec.year = self.c_year;
                rec.month = self.c_month;
                rec.day = self.c_day;
                rec.hour = self.c_hour;
                rec.minute = self.c_min;
                rec.iso_time = format!(
                    "{:04}-{:02}-{:02}T{:02}:{:02}:00+00:00",
                    rec.year, rec.month, rec.day, rec.hour, rec.minute
                );
            }
        }
        rec.timezone = tz_str;

        rec.callsign = self.c_call.clone();
        let (operator, portable) = split_callsign(&self.c_call);
        rec.operator = operator;
        rec.portable = portable;
        rec.my_call = self.session.my_call.clone();
        rec.my_operator = self.session.operator.clone();

        rec.freq = self.c_freq.clone();
        rec.band_wlen = self.c_band.clone();
        rec.band_air = freq_of(&self.c_band, BandVariant::Air)
            .unwrap_or("")
            .to_string();
        rec.band_sota = freq_of(&self.c_band, BandVariant::Sota)
            .unwrap_or("")
            .to_string();

        rec.mode_raw = self.c_mode.clone();
        let (mode, sub_mode) = adif_mode(&self.c_mode);
        rec.mode = mode;
        rec.sub_mode = sub_mode;
        rec.mode_sota = sota_mode(&self.c_mode);
        let freq_digits: String = rec
            .band_air
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        rec.mode_airham = airham_mode(&self.c_mode, &freq_digits);

        rec.rst_sent = rsts;
        rec.rst_rcvd = rstr;
        rec.his_num = self.c_his_num.clone();
        rec.my_num = self.c_my_num.clone();
        rec.rigset = self.c_rigset;
        rec.name = self.c_qso_msg.clone();
        rec.rmks1 = self.c_qso_rmks.clone();
        rec.qsl_msg = self
            .c_qsl_override
            .clone()
            .unwrap_or_else(|| self.session.qsl_msg.clone());

        rec.refs.my = RefSet {
            sota: self.session.my_sota.clone(),
            wwff: if self.session.my_wwff.is_empty() {
                Vec::new()
            } else {
                vec![self.session.my_wwff.clone()]
            },
            pota: self.session.my_pota.clone(),
        };
        rec.refs.his = RefSet {
            sota: self.c_his_sota.clone(),
            wwff: if self.c_his_wwff.is_empty() {
                Vec::new()
            } else {
                vec![self.c_his_wwff.clone()]
            },
            pota: self.c_his_pota.clone(),
        };

        if contest && rec.my_num.is_empty() {
            diags.push(Diag::new(
                lc,
                0,
                format!("No Contest # from {}.", rec.callsign),
            ));
        }
        let parts = compose_qsl_msg(&rec);
        if parts.qth.chars().count() > QTH_LIMIT {
            diags.push(Diag::new(lc, 0, format!("QTH too long: {}", parts.qth)));
        }
        if parts.qsl.chars().count() > QSL_LIMIT {
            diags.push(Diag::new(lc, 0, format!("Remarks2 too long: {}", parts.qsl)));
        }

        rec
    }
}

fn run_line(tokens: &[Token], lc: usize, env: &mut Env, diags: &mut Vec<Diag>) {
    let mut state = State::Normal;
    let mut pos = 0;

    while pos < tokens.len() {
        let t = &tokens[pos];
        if let Token::Comment { delim, text } = t {
            match delim {
                '<' => env.c_qso_msg = text.clone(),
                '{' => env.c_qso_rmks = text.clone(),
                _ => env.c_qsl_override = Some(text.clone()),
            }
            pos += 1;
            continue;
        }
        match state {
            State::Normal => match t {
                Token::Mode(m) => {
                    env.c_mode = m.clone();
                    pos += 1;
                }
                Token::Band { label, freq } => {
                    env.c_band = label.clone();
                    env.c_freq = (*freq).to_string();
                    state = State::AfterBand;
                    pos += 1;
                }
                Token::Dec { digits, value } => {
                    env.apply_time(*digits, value, lc, pos, diags);
                    pos += 1;
                }
                Token::Freq(f) => {
                    env.c_freq = f.clone();
                    match band_of(f) {
                        Ok((_, _, wlen)) => env.c_band = wlen.to_string(),
                        Err(_) => {
                            diags.push(Diag::new(lc, pos, "Unknown band."));
                            env.c_band.clear();
                        }
                    }
                    pos += 1;
                }
                Token::WwffRef(r) => {
                    env.c_his_wwff = r.clone();
                    pos += 1;
                }
                Token::PotaRef(r) => {
                    env.c_his_pota.push(r.clone());
                    pos += 1;
                }
                Token::SotaRef(r) => {
                    env.c_his_sota = r.clone();
                    pos += 1;
                }
                Token::Call(c) => {
                    if !env.c_call.is_empty() {
                        diags.push(Diag::new(
                            lc,
                            pos,
                            format!("Each line must contains only one callsign: {c}"),
                        ));
                    }
                    if env.c_band.is_empty() && env.c_freq.is_empty() {
                        diags.push(Diag::new(
                            lc,
                            pos,
                            "Band or frequency must be specified before QSO.",
                        ));
                    }
                    env.c_call = c.clone();
                    state = State::RstSent;
                    pos += 1;
                }
                Token::CtstRcvd(v) => {
                    env.c_my_num = v.replace(',', "");
                    if env.c_his_num.is_empty() {
                        if let Some(n) = env.ctst_num {
                            env.c_his_num = format!("{n:03}");
                            env.ctst_num = Some(n + 1);
                        } else if let Some(lit) = &env.ctst_lit {
                            env.c_his_num = lit.clone();
                        }
                    }
                    pos += 1;
                }
                Token::CtstSent(v) => {
                    let s = v.replace('.', "");
                    if env.ctst_num.is_some() {
                        let num: u32 = s.parse().unwrap_or(1);
                        env.ctst_num = Some(num + 1);
                        env.c_his_num = format!("{num:03}");
                    } else if env.ctst_lit.is_some() {
                        env.c_his_num = s;
                    }
                    pos += 1;
                }
                Token::Literal { raw, .. } => {
                    env.c_qso_msg = raw.clone();
                    pos += 1;
                    if let Some(Token::Literal { raw, .. }) = tokens.get(pos) {
                        env.c_qso_rmks = raw.clone();
                        pos += 1;
                    }
                }
                other => {
                    diags.push(Diag::new(
                        lc,
                        pos,
                        format!("Unknown literal: {}", other.raw()),
                    ));
                    pos += 1;
                }
            },
            State::AfterBand => {
                if let Token::Freq(f) = t {
                    env.c_freq = f.clone();
                    match band_of(f) {
                        Ok((_, _, wlen)) => env.c_band = wlen.to_string(),
                        Err(_) => {
                            diags.push(Diag::new(lc, pos, "Out of the band."));
                            env.c_band.clear();
                        }
                    }
                    pos += 1;
                }
                state = State::Normal;
            }
            State::RstSent => match t {
                Token::Dec { digits, value } if *digits <= 3 => {
                    env.set_rst(true, *digits, value);
                    state = State::RstRcvd;
                    pos += 1;
                }
                Token::Dec { .. } => {
                    diags.push(Diag::new(lc, pos, "Wrong RST format."));
                    state = State::Normal;
                }
                Token::Snr(v) => {
                    env.c_snr_s = v.clone();
                    state = State::RstRcvd;
                    pos += 1;
                }
                _ => state = State::Normal,
            },
            State::RstRcvd => {
                state = State::Normal;
                match t {
                    Token::Dec { digits, value } if *digits <= 3 => {
                        env.set_rst(false, *digits, value);
                        pos += 1;
                    }
                    Token::Dec { .. } => {
                        diags.push(Diag::new(lc, pos, "Wrong RST format."));
                    }
                    Token::Snr(v) => {
                        env.c_snr_r = v.clone();
                        pos += 1;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Compiles a whole session. Never fails; every problem becomes a
/// positioned diagnostic and compilation continues on the next token.
pub fn compile(input: &str) -> Compilation {
    let mut env = Env::new();
    let mut qsos = Vec::new();
    let mut diags = Vec::new();
    let mut flags = LogFlags::default();

    for (lc, line) in input.lines().take(MAX_INPUT_LINES).enumerate() {
        env.reset_line();
        let tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }

        if let Token::Keyword { dir, rest } = &tokens[0] {
            let rest = rest.clone();
            env.directive(*dir, &rest, &tokens, lc, &mut diags, &mut flags);
            continue;
        }

        run_line(&tokens, lc, &mut env, &mut diags);

        if !env.c_call.is_empty() {
            let rec = env.emit(lc, &mut diags, flags.contest);
            qsos.push(rec);
        }
    }

    debug!(qsos = qsos.len(), diags = diags.len(), "session compiled");
    Compilation {
        qsos,
        diags,
        session: env.session,
        flags,
    }
}
