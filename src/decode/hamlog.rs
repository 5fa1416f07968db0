//! HAMLOG CSV row decoder.

use chrono::{Datelike, FixedOffset, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::call::split_callsign;
use crate::qso::{QsoRecord, err_markup};
use crate::tables::{adif_mode, airham_mode, band_of, sota_mode};

use super::{Decoded, DecodeResult, FormatError, epoch_sentinel, local_to_utc, parse_offset};

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)/(\d+)/(\d+)").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d\d):(\d\d)(\w)").unwrap());

/// Local offset assumed for rows without a UTC flag.
pub const DEFAULT_LOCAL_TZ: &str = "+0900";

/// Two-digit years at or above this pivot belong to the 1900s.
const YEAR_PIVOT: u32 = 65;

/// Decodes one HAMLOG CSV row (column layout: callsign, date, time,
/// RST sent, RST received, frequency, mode, code, grid, QSL flags, name,
/// QTH, remarks 1, remarks 2, ...).
pub fn decode_hamlog(cols: &[String]) -> DecodeResult {
    if cols.len() < 15 {
        return Err(FormatError(format!(
            "Not a HAMLOG CSV record ({} columns)",
            cols.len()
        )));
    }

    let mut rec = QsoRecord::default();
    let mut msgs: Vec<String> = Vec::new();

    rec.callsign = cols[0].clone();
    let (operator, portable) = split_callsign(&cols[0]);
    rec.operator = operator;
    rec.portable = portable;

    let (year, month, day) = if let Some(m) = DATE.captures(&cols[1]) {
        let year = if m[1].len() > 2 {
            m[1].to_string()
        } else {
            let yy: u32 = m[1].parse().unwrap_or(0);
            if yy >= YEAR_PIVOT {
                format!("19{}", &m[1])
            } else {
                format!("20{}", &m[1])
            }
        };
        (year, m[2].to_string(), m[3].to_string())
    } else {
        msgs.push(format!("Wrong date format: {}", cols[1]));
        rec.errors.date = err_markup(&cols[1]);
        ("1900".to_string(), "01".to_string(), "01".to_string())
    };

    let (hour, minute) = if let Some(m) = TIME.captures(&cols[2]) {
        let flag = m[3].to_uppercase();
        rec.timezone = if flag == "U" || flag == "Z" {
            "+0000".to_string()
        } else {
            DEFAULT_LOCAL_TZ.to_string()
        };
        (m[1].to_string(), m[2].to_string())
    } else {
        msgs.push(format!("Wrong time format: {}", cols[2]));
        rec.errors.time = err_markup(&cols[2]);
        rec.timezone = DEFAULT_LOCAL_TZ.to_string();
        ("00".to_string(), "00".to_string())
    };

    let offset = parse_offset(&rec.timezone)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"));
    let parsed = (
        year.parse::<i32>().ok(),
        month.parse::<u32>().ok(),
        day.parse::<u32>().ok(),
        hour.parse::<u32>().ok(),
        minute.parse::<u32>().ok(),
    );
    let converted = match parsed {
        (Some(y), Some(mo), Some(d), Some(h), Some(mi)) => local_to_utc(y, mo, d, h, mi, offset),
        _ => None,
    };
    let (utc, iso) = match converted {
        Some(pair) => pair,
        None => {
            msgs.push(format!(
                "Wrong time format: {}:{} {} {}",
                rec.operator, cols[1], cols[2], rec.timezone
            ));
            rec.errors.date = err_markup(&cols[1]);
            rec.errors.time = err_markup(&cols[2]);
            epoch_sentinel()
        }
    };
    rec.iso_time = iso;
    rec.year = utc.year();
    rec.month = utc.month();
    rec.day = utc.day();
    rec.hour = utc.hour();
    rec.minute = utc.minute();

    rec.freq = cols[5].clone();
    match band_of(&cols[5]) {
        Ok((air, sota, wlen)) => {
            rec.band_air = air.to_string();
            rec.band_sota = sota.to_string();
            rec.band_wlen = wlen.to_string();
        }
        Err(e) => {
            msgs.push(format!("Frequency out of range: {e}"));
            let marker = err_markup(&e.0);
            rec.errors.band = marker.clone();
            rec.band_air = marker.clone();
            rec.band_sota = marker.clone();
            rec.band_wlen = marker;
        }
    }

    // QSL flags: via-method, sent, received, padded to three chars.
    let qslflag: String = format!("{:<3}", cols[9].to_uppercase())
        .chars()
        .take(3)
        .collect();
    let flag_chars: Vec<char> = qslflag.chars().collect();
    rec.qsl_via = match flag_chars[0] {
        'N' => "No Card".to_string(),
        'J' => "JARL (Bureau)".to_string(),
        _ => qslflag.clone(),
    };
    rec.qsl_sent = if flag_chars[1] != ' ' { "1" } else { "0" }.to_string();
    rec.qsl_rcvd = if flag_chars[2] != ' ' { "1" } else { "0" }.to_string();

    rec.mode_raw = cols[6].clone();
    let (mode, sub_mode) = adif_mode(&cols[6]);
    rec.mode = mode;
    rec.sub_mode = sub_mode;
    rec.mode_airham = airham_mode(&cols[6], &cols[5]);
    rec.mode_sota = sota_mode(&cols[6]);

    rec.rst_sent = cols[3].clone();
    rec.rst_rcvd = cols[4].clone();
    rec.code = cols[7].clone();
    rec.grid = cols[8].clone();
    rec.name = cols[10].clone();
    rec.qth = cols[11].clone();
    rec.rmks1 = cols[12].clone();
    rec.rmks2 = cols[13].clone();

    rec.error = !msgs.is_empty();
    rec.errormsg = if msgs.is_empty() {
        String::new()
    } else {
        format!("Error: {}", msgs.join(","))
    };

    Ok(Decoded::from_parts(rec, msgs))
}
