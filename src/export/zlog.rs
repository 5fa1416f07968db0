//! Zlog tab-separated contest export.

use crate::qso::QsoRecord;
use crate::types::MAX_INPUT_LINES;

use super::{Artifacts, CsvBuf, ExportError};

const HEADER: [&str; 7] = ["DATE", "TIME", "BAND", "MODE", "CALLSIGN", "SENTNo", "RCVNo"];

/// Appends a contest log for a compiled session to `files`, one file per
/// session keyed by the first record's date. Rows carry both signal
/// reports and both serials, so they are wider than the header.
pub fn fle_zlog(files: &mut Artifacts, qsos: &[QsoRecord]) -> Result<(), ExportError> {
    let Some(first) = qsos.first() else {
        return Ok(());
    };
    let fname = format!("contest-{}.txt", first.date_compact());

    let mut buf = CsvBuf::with(b'\t', false);
    buf.row(HEADER)?;
    for rec in qsos.iter().take(MAX_INPUT_LINES) {
        buf.row(&[
            format!("{}-{}-{}", rec.year, rec.month, rec.day),
            format!("{:02}:{:02}", rec.hour, rec.minute),
            rec.freq.replace("MHz", ""),
            rec.mode_raw.clone(),
            rec.callsign.clone(),
            rec.rst_sent.clone(),
            rec.his_num.clone(),
            rec.rst_rcvd.clone(),
            rec.my_num.clone(),
        ])?;
    }
    files.insert(fname, buf.take()?);
    Ok(())
}
