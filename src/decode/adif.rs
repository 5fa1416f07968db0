//! ADIF record reader and decoder.

use hashbrown::HashMap;

use crate::qso::{QsoRecord, err_markup};
use crate::refs::extract_refs;
use crate::tables::{adif_mode, band_of, sota_mode};

use super::{Decoded, DecodeResult, FormatError};

/// One parsed ADIF record: upper-cased field name to value.
pub type AdifFields = HashMap<String, String>;

/// Reads `<FIELD:length>value` tokens from `text`, returning the records
/// (terminated by `<EOR>`) and the header fields (terminated by `<EOH>`).
pub fn read_adif(text: &str) -> (Vec<AdifFields>, AdifFields) {
    let mut records = Vec::new();
    let mut header = AdifFields::new();
    let mut fields = AdifFields::new();
    let mut rest = text;

    loop {
        let Some(open) = rest.find('<') else { break };
        rest = &rest[open + 1..];
        let Some(close) = rest.find('>') else { break };
        let tag = &rest[..close];
        rest = &rest[close + 1..];

        let mut parts = tag.splitn(3, ':');
        let name = parts.next().unwrap_or("").to_uppercase();
        match parts.next() {
            None => {
                if name == "EOR" {
                    if !fields.is_empty() {
                        records.push(std::mem::take(&mut fields));
                    }
                } else if name == "EOH" {
                    header = std::mem::take(&mut fields);
                }
            }
            Some(len_str) => {
                let len: usize = len_str.trim().parse().unwrap_or(0);
                let value: String = rest.chars().take(len).collect();
                rest = &rest[value.len()..];
                fields.insert(name, value);
            }
        }
    }

    (records, header)
}

fn required<'a>(qso: &'a AdifFields, key: &str) -> Result<&'a str, FormatError> {
    qso.get(key)
        .map(String::as_str)
        .ok_or_else(|| FormatError(format!("Invalid ADIF record: missing {key}")))
}

fn digits<T: std::str::FromStr>(field: &str, s: &str) -> Result<T, FormatError> {
    s.parse()
        .map_err(|_| FormatError(format!("Invalid ADIF record: bad {field} ({s})")))
}

/// Decodes the first ADIF record found in `text`.
pub fn decode_adif(text: &str) -> DecodeResult {
    let (qsos, _header) = read_adif(text);
    let Some(qso) = qsos.first() else {
        return Err(FormatError(format!("Invalid ADIF input: ({text})")));
    };

    let mut rec = QsoRecord::default();
    let mut msgs: Vec<String> = Vec::new();

    rec.callsign = required(qso, "CALL")?.to_string();

    let date = required(qso, "QSO_DATE")?;
    let time = required(qso, "TIME_ON")?;
    if !date.is_ascii() || !time.is_ascii() || date.len() < 8 || time.len() < 4 {
        return Err(FormatError(format!(
            "Invalid ADIF record: bad timestamp ({date} {time})"
        )));
    }
    rec.year = digits("QSO_DATE", &date[0..4])?;
    rec.month = digits("QSO_DATE", &date[4..6])?;
    rec.day = digits("QSO_DATE", &date[6..8])?;
    rec.hour = digits("TIME_ON", &time[0..2])?;
    rec.minute = digits("TIME_ON", &time[2..4])?;

    // FREQ wins over an explicit BAND field when both are present.
    if let Some(freq) = qso.get("FREQ") {
        rec.freq = freq.clone();
        match band_of(freq) {
            Ok((_, _, wlen)) => rec.band_wlen = wlen.to_string(),
            Err(e) => {
                msgs.push(format!("Frequency out of range: {e}"));
                let marker = err_markup(&e.0);
                rec.errors.band = marker.clone();
                rec.band_wlen = marker;
            }
        }
    } else if let Some(band) = qso.get("BAND") {
        rec.band_wlen = band.clone();
    }

    let my_sig = qso
        .get("MY_SIG_INFO")
        .or_else(|| qso.get("MY_SOTA_REF"))
        .map(String::as_str)
        .unwrap_or("unknown");
    if my_sig != "unknown" {
        let bundle = extract_refs(my_sig);
        rec.refs.my.sota = bundle.sota;
        rec.refs.my.wwff = bundle.wwff;
        rec.refs.my.pota = bundle.pota;
    }

    let his_sig = qso
        .get("SIG_INFO")
        .or_else(|| qso.get("SOTA_REF"))
        .cloned()
        .unwrap_or_default();
    rec.qth = his_sig;

    let mode = required(qso, "MODE")?;
    rec.mode_raw = mode.to_string();
    let (adif, sub) = adif_mode(mode);
    rec.mode = adif;
    rec.sub_mode = sub;
    rec.mode_sota = sota_mode(mode);

    rec.rst_sent = qso.get("RST_SENT").cloned().unwrap_or_default();
    rec.rst_rcvd = qso.get("RST_RCVD").cloned().unwrap_or_default();

    rec.error = !msgs.is_empty();
    rec.errormsg = msgs.join(",");

    Ok(Decoded::from_parts(rec, msgs))
}
