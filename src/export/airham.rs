//! AirHamLog CSV export.

use crate::call::split_callsign;
use crate::decode::{DecodeResult, decode_hamlog};
use crate::qso::QsoRecord;
use crate::types::{MAX_INPUT_LINES, RemarkSlot};

use super::{Artifacts, ConvertOptions, CsvBuf, ExportError, read_rows};

const HEADER: [&str; 13] = [
    "id",
    "callsign",
    "portable",
    "qso_at",
    "sent_rst",
    "received_rst",
    "sent_qth",
    "received_qth",
    "received_qra",
    "frequency",
    "mode",
    "card",
    "remarks",
];

fn error_row(lcount: usize, msg: &str) -> Vec<String> {
    let mut row = vec![String::new(); 12];
    row.push(format!("HamLog format error at Line {lcount}. : {msg}"));
    row
}

fn airham_row(result: &DecodeResult, lcount: usize, opts: &ConvertOptions) -> Vec<String> {
    let rec = match result {
        Ok(d) if !d.record().error => d.record(),
        Ok(d) => return error_row(lcount, &d.record().errormsg),
        Err(e) => return error_row(lcount, &e.0),
    };

    let (my_qth, comment) = match opts.qth {
        RemarkSlot::Rmks1 => (rec.rmks1.clone(), rec.rmks2.clone()),
        RemarkSlot::Rmks2 => (rec.rmks2.clone(), rec.rmks1.clone()),
        RemarkSlot::UserDefined => (opts.location.clone(), rec.rmks1.clone()),
        _ => (String::new(), String::new()),
    };

    vec![
        String::new(),
        rec.operator.clone(),
        rec.portable.clone(),
        rec.iso_time.clone(),
        rec.rst_sent.clone(),
        rec.rst_rcvd.clone(),
        my_qth,
        rec.qth.clone(),
        rec.name.clone(),
        rec.band_air.clone(),
        rec.mode_airham.clone(),
        rec.qsl_via.clone(),
        comment,
    ]
}

/// Converts a HAMLOG CSV into one AirHamLog import file named `fname`.
/// Row zero doubles as header trigger and first data row, so the output
/// is always a header followed by every input row.
pub fn airham_convert(
    input: &str,
    fname: &str,
    opts: &ConvertOptions,
) -> Result<Artifacts, ExportError> {
    let mut buf = CsvBuf::new();
    buf.row(HEADER)?;
    for (lcount, row) in read_rows(input).iter().take(MAX_INPUT_LINES).enumerate() {
        let result = decode_hamlog(row);
        buf.row(&airham_row(&result, lcount + 1, opts))?;
    }

    let mut files = Artifacts::new();
    files.insert(fname, buf.take()?);
    Ok(files)
}

/// AirHamLog CSV for a compiled session. `qsl_msg` fills the sent-QTH
/// column for every row.
pub fn fle_airham(qsos: &[QsoRecord], qsl_msg: &str) -> Result<String, ExportError> {
    let mut buf = CsvBuf::new();
    buf.row(HEADER)?;

    for rec in qsos.iter().take(MAX_INPUT_LINES) {
        let iso_time = format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:00+00:00",
            rec.year, rec.month, rec.day, rec.hour, rec.minute
        );
        let (operator, portable) = split_callsign(&rec.callsign);

        let mut his_ref: Vec<String> = Vec::new();
        if !rec.refs.his.sota.is_empty() {
            his_ref.push(rec.refs.his.sota.clone());
        }
        if !rec.refs.his.wwff.is_empty() {
            his_ref.push(rec.refs.his.wwff.join(","));
        }
        if !rec.refs.his.pota.is_empty() {
            his_ref.push(rec.refs.his.pota.join(","));
        }

        buf.row(&[
            String::new(),
            operator,
            portable,
            iso_time,
            rec.rst_sent.clone(),
            rec.rst_rcvd.clone(),
            qsl_msg.to_string(),
            format!("{} {}", his_ref.join(","), rec.rmks1),
            rec.name.clone(),
            rec.band_air.clone(),
            rec.mode_airham.clone(),
            String::new(),
            String::new(),
        ])?;
    }
    buf.take()
}
