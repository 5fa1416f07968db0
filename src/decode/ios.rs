//! HAMLOG for iOS CSV row decoder.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::call::split_callsign;
use crate::qso::{QsoRecord, err_markup};
use crate::tables::{adif_mode, airham_mode, band_of, sota_mode};

use super::{Decoded, DecodeResult, FormatError, epoch_sentinel};

/// Decodes one HAMLOG for iOS CSV row. The first column carries a full
/// `%Y-%m-%d %H:%M:%S %z` timestamp; this source is always exported in
/// UTC.
pub fn decode_ios(cols: &[String]) -> DecodeResult {
    if cols.len() < 19 {
        return Err(FormatError(format!(
            "Too short columns: {}",
            cols.join(",")
        )));
    }

    let mut rec = QsoRecord::default();
    let mut msgs: Vec<String> = Vec::new();

    rec.callsign = cols[3].clone();
    let (operator, portable) = split_callsign(&cols[3]);
    rec.operator = operator;
    rec.portable = portable;

    let (utc, iso) = match DateTime::parse_from_str(&cols[0], "%Y-%m-%d %H:%M:%S %z") {
        Ok(local) => (local.with_timezone(&Utc), local.to_rfc3339()),
        Err(_) => {
            msgs.push(format!("Wrong time format: {}:{}", rec.operator, cols[0]));
            let mut parts = cols[0].split(' ');
            rec.errors.date = err_markup(parts.next().unwrap_or(""));
            rec.errors.time = err_markup(parts.next().unwrap_or(""));
            epoch_sentinel()
        }
    };
    rec.iso_time = iso;
    rec.year = utc.year();
    rec.month = utc.month();
    rec.day = utc.day();
    rec.hour = utc.hour();
    rec.minute = utc.minute();
    rec.timezone = "+0000".to_string();

    rec.freq = cols[2].clone();
    match band_of(&cols[2]) {
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

    rec.mode_raw = cols[11].clone();
    let (mode, sub_mode) = adif_mode(&cols[11]);
    rec.mode = mode;
    rec.sub_mode = sub_mode;
    rec.mode_airham = airham_mode(&cols[11], &cols[2]);
    rec.mode_sota = sota_mode(&cols[11]);

    rec.rst_sent = cols[5].clone();
    rec.rst_rcvd = cols[4].clone();
    rec.grid = cols[6].clone();
    rec.name = cols[7].clone();
    rec.qth = cols[8].clone();
    rec.rmks1 = cols[8].clone();
    rec.rmks2 = cols[13].clone();
    rec.qsl_via = cols[14].clone();
    rec.qsl_sent = cols[15].clone();
    rec.qsl_rcvd = cols[16].clone();

    rec.error = !msgs.is_empty();
    rec.errormsg = msgs.join(" , ");

    Ok(Decoded::from_parts(rec, msgs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row19(ts: &str, freq: &str, call: &str, mode: &str) -> Vec<String> {
        let mut cols = vec![String::new(); 19];
        cols[0] = ts.to_string();
        cols[2] = freq.to_string();
        cols[3] = call.to_string();
        cols[4] = "579".to_string();
        cols[5] = "599".to_string();
        cols[11] = mode.to_string();
        cols
    }

    #[test]
    fn decodes_full_timestamp() {
        let cols = row19("2024-05-01 10:20:00 +0900", "14.062", "JH1XYZ", "CW");
        let rec = decode_ios(&cols).unwrap().into_record();
        assert!(!rec.error);
        assert_eq!((rec.hour, rec.minute), (1, 20));
        assert_eq!(rec.band_wlen, "20m");
        // Sent/received columns are swapped relative to HAMLOG CSV.
        assert_eq!(rec.rst_sent, "599");
        assert_eq!(rec.rst_rcvd, "579");
    }

    #[test]
    fn bad_timestamp_uses_sentinel_epoch() {
        let cols = row19("last tuesday", "14.062", "JH1XYZ", "CW");
        let decoded = decode_ios(&cols).unwrap();
        assert!(decoded.is_tainted());
        assert_eq!(decoded.record().year, 1900);
    }

    #[test]
    fn short_row_is_fatal() {
        assert!(decode_ios(&vec![String::new(); 10]).is_err());
    }
}
