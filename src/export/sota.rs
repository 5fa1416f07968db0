//! SOTA CSV export (activator and chaser) in the V2 upload layout.

use crate::call::split_callsign;
use crate::decode::{DecodeResult, decode_hamlog};
use crate::qso::QsoRecord;
use crate::refs::{RefBundle, extract_refs};
use crate::types::{MAX_INPUT_LINES, RemarkSlot};

use super::adif::{field, header};
use super::{Artifacts, ConvertOptions, CsvBuf, ExportError, read_rows, segment_by_key};

/// Placeholder date key used for rows that failed to decode.
const ERROR_DATE: &str = "000000";

fn error_row(lcount: usize, msg: &str) -> Vec<String> {
    let mut row = vec![format!("HamLog format error at Line {lcount}. : {msg}")];
    row.extend(std::iter::repeat_n(String::new(), 9));
    row
}

fn my_bundle(rec: &QsoRecord, opts: &ConvertOptions) -> RefBundle {
    match opts.my_qth {
        RemarkSlot::Rmks1 => extract_refs(&rec.rmks1),
        RemarkSlot::Rmks2 => extract_refs(&rec.rmks2),
        _ => RefBundle {
            sota: opts.summit.clone(),
            ..RefBundle::default()
        },
    }
}

/// Renders one decoded row into the SOTA V2 CSV layout. Returns the
/// `YYYYMMDD` segment key, whether the contacted station sits on a
/// summit, and the row itself (empty when an activator row has no own
/// summit and is skipped).
fn sota_row(
    result: &DecodeResult,
    lcount: usize,
    activator: bool,
    callsign: &str,
    opts: &ConvertOptions,
) -> (String, bool, Vec<String>) {
    let rec = match result {
        Ok(d) if !d.record().error => d.record(),
        Ok(d) => {
            return (
                ERROR_DATE.to_string(),
                false,
                error_row(lcount, &d.record().errormsg),
            );
        }
        Err(e) => return (ERROR_DATE.to_string(), false, error_row(lcount, &e.0)),
    };

    let my = my_bundle(rec, opts);
    let (his, comment) = match opts.qth {
        RemarkSlot::Rmks1 => {
            let h = extract_refs(&rec.rmks1);
            let c = if activator {
                h.clone()
            } else {
                extract_refs(&rec.rmks2)
            };
            (h, c)
        }
        RemarkSlot::Rmks2 => {
            let h = extract_refs(&rec.rmks2);
            let c = if activator {
                h.clone()
            } else {
                extract_refs(&rec.rmks1)
            };
            (h, c)
        }
        RemarkSlot::Qth => {
            let h = extract_refs(&rec.qth);
            let c = if activator {
                h.clone()
            } else {
                extract_refs(&rec.rmks1)
            };
            (h, c)
        }
        _ => {
            let h = RefBundle {
                loc: " ".to_string(),
                ..RefBundle::default()
            };
            (h.clone(), h)
        }
    };

    let date2 = rec.date_compact();
    if activator && my.sota.is_empty() {
        return (date2, true, Vec::new());
    }

    let row = vec![
        "V2".to_string(),
        callsign.to_string(),
        my.sota,
        format!("{:02}/{:02}/{:02}", rec.day, rec.month, rec.year),
        format!("{:02}:{:02}", rec.hour, rec.minute),
        rec.band_sota.clone(),
        rec.mode_sota.as_str().to_string(),
        rec.callsign.clone(),
        his.sota.clone(),
        format!("{} ", comment.loc),
    ];
    (date2, !his.sota.is_empty(), row)
}

/// ADIF row for one activator QSO. Tainted rows surface as a single
/// diagnostic field; rows without an own summit are skipped.
fn sota_adif_row(result: &DecodeResult, opts: &ConvertOptions) -> (String, Vec<String>) {
    let rec = match result {
        Ok(d) if !d.record().error => d.record(),
        Ok(d) => return (String::new(), vec![d.record().errormsg.clone()]),
        Err(e) => return (String::new(), vec![e.0.clone()]),
    };

    let my = my_bundle(rec, opts);
    let his = match opts.qth {
        RemarkSlot::Rmks1 => extract_refs(&rec.rmks1),
        RemarkSlot::Rmks2 => extract_refs(&rec.rmks2),
        _ => RefBundle::default(),
    };

    let date2 = rec.date_compact();
    if my.sota.is_empty() {
        return (date2, Vec::new());
    }

    let activator = opts.sota_activator.as_str();
    let (operator, _) = split_callsign(activator);

    let mut row = vec![
        field("activator", activator),
        field("operator", &operator),
        field("callsign", &rec.callsign),
        field("date", &date2),
        field("time", &rec.time_compact()),
        field("band-wlen", &rec.band_wlen),
        field("mode", &rec.mode),
        field("rst_sent", &rec.rst_sent),
        field("rst_rcvd", &rec.rst_rcvd),
        field("mysotaref", &my.sota),
    ];
    if !his.sota.is_empty() {
        row.push(field("sotaref", &his.sota));
    }
    row.push("<EOR>".to_string());
    (date2, row)
}

/// Converts a HAMLOG CSV into per-date SOTA activator uploads: one V2
/// CSV per date, a Summit-to-Summit mirror when both ends carry a
/// summit, and one ADIF file for the whole log.
pub fn sota_activator(
    input: &str,
    callsign: &str,
    opts: &ConvertOptions,
) -> Result<Artifacts, ExportError> {
    let mut files = Artifacts::new();
    let mut csv = CsvBuf::new();
    let mut s2s = CsvBuf::new();
    let mut adif_rows = CsvBuf::with(b' ', false);

    let mut fname = String::new();
    let mut fname_adi = String::new();

    for (lcount, row) in read_rows(input).iter().take(MAX_INPUT_LINES).enumerate() {
        let result = decode_hamlog(row);

        let (d2, ladif) = sota_adif_row(&result, opts);
        if !ladif.is_empty() {
            if lcount == 0 {
                fname_adi = d2;
            }
            adif_rows.row(&ladif)?;
        }

        let (key, his_summit, lcsv) = sota_row(&result, lcount, true, callsign, opts);
        if lcsv.is_empty() {
            continue;
        }
        if lcount == 0 {
            fname = key.clone();
        }
        if key != fname {
            files.insert(format!("sota{fname}.csv"), csv.take()?);
            if !s2s.is_empty() {
                files.insert(format!("sota-s2s-{fname}.csv"), s2s.take()?);
            } else {
                s2s.take()?;
            }
            fname = key;
        }
        csv.row(&lcsv)?;
        if his_summit {
            s2s.row(&lcsv)?;
        }
    }

    if !fname_adi.is_empty() {
        files.insert(
            format!("sota{fname_adi}.adi"),
            format!("{}{}", header("3.0.6"), adif_rows.take()?),
        );
    }
    if !fname.is_empty() {
        files.insert(format!("sota{fname}.csv"), csv.take()?);
        if !s2s.is_empty() {
            files.insert(format!("sota-s2s-{fname}.csv"), s2s.take()?);
        }
    }

    Ok(files)
}

/// Converts a HAMLOG CSV into SOTA chaser uploads: contacts with a
/// summit on the other end go to the `sota` file, everything else to an
/// `other` file.
pub fn sota_chaser(
    input: &str,
    callsign: &str,
    opts: &ConvertOptions,
) -> Result<Artifacts, ExportError> {
    let mut files = Artifacts::new();
    let mut csv = CsvBuf::new();
    let mut other = CsvBuf::new();
    let mut fname = String::new();

    for (lcount, row) in read_rows(input).iter().take(MAX_INPUT_LINES).enumerate() {
        let result = decode_hamlog(row);
        let (key, his_summit, lcsv) = sota_row(&result, lcount, false, callsign, opts);
        if lcount == 0 {
            fname = key;
        }
        if his_summit {
            csv.row(&lcsv)?;
        } else {
            other.row(&lcsv)?;
        }
    }

    files.insert(format!("sota{fname}.csv"), csv.take()?);
    if !other.is_empty() {
        files.insert(format!("other{fname}.csv"), other.take()?);
    }
    Ok(files)
}

/// Appends per-date SOTA CSV output for a compiled session to `files`.
pub fn fle_sota(files: &mut Artifacts, qsos: &[QsoRecord]) -> Result<(), ExportError> {
    for (date, segment) in segment_by_key(qsos, |r| r.date_compact()) {
        let mut csv = CsvBuf::new();
        let mut s2s = CsvBuf::new();
        for rec in segment {
            let refs = extract_refs(&rec.rmks1);
            let row = vec![
                "V2".to_string(),
                rec.my_call.clone(),
                rec.refs.my.sota.clone(),
                format!("{:02}/{:02}/{:02}", rec.day, rec.month, rec.year),
                format!("{:02}:{:02}", rec.hour, rec.minute),
                rec.band_sota.clone(),
                rec.mode_sota.as_str().to_string(),
                rec.callsign.clone(),
                rec.refs.his.sota.clone(),
                format!("{}{}", refs.loc, refs.sat),
            ];
            csv.row(&row)?;
            if !rec.refs.my.sota.is_empty() && !rec.refs.his.sota.is_empty() {
                s2s.row(&row)?;
            }
        }
        files.insert(format!("sota{date}.csv"), csv.take()?);
        if !s2s.is_empty() {
            files.insert(format!("sota-s2s-{date}.csv"), s2s.take()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qso::RefSet;

    fn csv_line(fields: &[&str]) -> String {
        fields.join(",")
    }

    fn activation(date: &str, time: &str, rmks1: &str, rmks2: &str) -> String {
        csv_line(&[
            "JH1XYZ", date, time, "599", "579", "7.010", "CW", "", "", "N", "Taro", "Tokyo",
            rmks1, rmks2, "",
        ])
    }

    fn opts() -> ConvertOptions {
        ConvertOptions {
            my_qth: RemarkSlot::Rmks1,
            qth: RemarkSlot::Rmks2,
            sota_activator: "JA1ABC/1".to_string(),
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn activator_splits_files_on_date_change() {
        let input = format!(
            "{}\n{}\n{}\n",
            activation("24/05/01", "10:20U", "JA/TK-001", ""),
            activation("24/05/01", "11:00U", "JA/TK-001", ""),
            activation("24/05/02", "09:00U", "JA/KN-006", ""),
        );
        let files = sota_activator(&input, "JA1ABC/1", &opts()).unwrap();
        let names: Vec<&str> = files.names().collect();
        assert!(names.contains(&"sota20240501.csv"));
        assert!(names.contains(&"sota20240502.csv"));
        let first = files.get("sota20240501.csv").unwrap();
        assert_eq!(first.lines().count(), 2);
        assert!(first.starts_with("V2,JA1ABC/1,JA/TK-001,01/05/2024,10:20,7MHz,CW,JH1XYZ"));
    }

    #[test]
    fn activator_mirrrors_summit_to_summit_rows() {
        let input = format!(
            "{}\n{}\n",
            activation("24/05/01", "10:20U", "JA/TK-001", "JA/NN-001"),
            activation("24/05/01", "11:00U", "JA/TK-001", ""),
        );
        let files = sota_activator(&input, "JA1ABC/1", &opts()).unwrap();
        let s2s = files.get("sota-s2s-20240501.csv").unwrap();
        assert_eq!(s2s.lines().count(), 1);
        assert!(s2s.contains("JA/NN-001"));
    }

    #[test]
    fn activator_writes_one_adif_for_the_whole_log() {
        let input = format!(
            "{}\n{}\n",
            activation("24/05/01", "10:20U", "JA/TK-001", ""),
            activation("24/05/02", "09:00U", "JA/TK-001", ""),
        );
        let files = sota_activator(&input, "JA1ABC/1", &opts()).unwrap();
        let adi = files.get("sota20240501.adi").unwrap();
        assert!(adi.contains("<ADIF_VER:5>3.0.6"));
        assert_eq!(adi.matches("<EOR>").count(), 2);
        assert!(adi.contains("<MY_SOTA_REF:9>JA/TK-001"));
    }

    #[test]
    fn activator_skips_rows_without_own_summit() {
        let input = activation("24/05/01", "10:20U", "", "");
        let files = sota_activator(&input, "JA1ABC/1", &opts()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn chaser_routes_non_summit_rows_to_other_file() {
        let input = format!(
            "{}\n{}\n",
            activation("24/05/01", "10:20U", "", "JA/NN-001"),
            activation("24/05/01", "11:00U", "", ""),
        );
        let files = sota_chaser(&input, "JA1ABC", &opts()).unwrap();
        assert!(files.get("sota20240501.csv").unwrap().contains("JA/NN-001"));
        assert_eq!(files.get("other20240501.csv").unwrap().lines().count(), 1);
    }

    #[test]
    fn chaser_turns_bad_rows_into_error_rows() {
        let files = sota_chaser("bad,row\n", "JA1ABC", &opts()).unwrap();
        let other = files.get("sota000000.csv");
        // A single bad row: the sota file is empty, errors land in "other".
        assert_eq!(other, Some(""));
        assert!(
            files
                .get("other000000.csv")
                .unwrap()
                .starts_with("HamLog format error at Line 0.")
        );
    }

    #[test]
    fn fle_rows_segment_by_utc_date() {
        let mk = |day: u32, his: &str| QsoRecord {
            my_call: "JA1ABC/1".to_string(),
            callsign: "JH1XYZ".to_string(),
            year: 2024,
            month: 5,
            day,
            hour: 1,
            minute: 20,
            band_sota: "7MHz".to_string(),
            refs: crate::qso::QsoRefs {
                my: RefSet {
                    sota: "JA/TK-001".to_string(),
                    ..RefSet::default()
                },
                his: RefSet {
                    sota: his.to_string(),
                    ..RefSet::default()
                },
            },
            ..QsoRecord::default()
        };
        let mut files = Artifacts::new();
        fle_sota(&mut files, &[mk(1, ""), mk(1, "JA/NN-001"), mk(2, "")]).unwrap();
        assert!(files.contains("sota20240501.csv"));
        assert!(files.contains("sota20240502.csv"));
        assert_eq!(
            files.get("sota-s2s-20240501.csv").unwrap().lines().count(),
            1
        );
        assert!(!files.contains("sota-s2s-20240502.csv"));
    }
}
