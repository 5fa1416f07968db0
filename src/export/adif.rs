//! ADIF rendering and per-reference fan-out export.

use crate::call::split_callsign;
use crate::decode::{DecodeResult, decode_adif, decode_hamlog, decode_ios};
use crate::parks::ParkResolver;
use crate::qso::QsoRecord;
use crate::refs::{RefBundle, extract_refs};
use crate::report::CheckReport;
use crate::types::{MAX_INPUT_LINES, RemarkSlot};

use super::{Artifacts, ConvertOptions, CsvBuf, ExportError, read_rows};

/// Field-name allowlist: ADIF tag to internal key.
const FIELDS: [(&str, &str); 19] = [
    ("STATION_CALLSIGN", "activator"),
    ("CALL", "callsign"),
    ("QSO_DATE", "date"),
    ("TIME_ON", "time"),
    ("BAND", "band-wlen"),
    ("MODE", "mode"),
    ("SUBMODE", "sub_mode"),
    ("RST_SENT", "rst_sent"),
    ("RST_RCVD", "rst_rcvd"),
    ("MY_SIG", "mysig"),
    ("MY_SIG_INFO", "mysiginfo"),
    ("MY_STATE", "mystate"),
    ("SIG", "sig"),
    ("SIG_INFO", "siginfo"),
    ("SOTA_REF", "sotaref"),
    ("MY_SOTA_REF", "mysotaref"),
    ("OPERATOR", "operator"),
    ("PROGRAMID", "programid"),
    ("ADIF_VER", "adifver"),
];

/// Renders one `<FIELD:length>value` token. Keys outside the allowlist
/// fall back to `COMMENT`.
pub fn field(key: &str, value: &str) -> String {
    let len = value.chars().count();
    for (name, k) in FIELDS {
        if key == k {
            return format!("<{name}:{len}>{value}");
        }
    }
    format!("<COMMENT:{len}>{value}")
}

/// ADIF file header for the given specification version.
pub fn header(version: &str) -> String {
    format!(
        "ADIF Export from HAMLOG\n{}\n{}\n<EOH>\n",
        field("programid", "FCTH"),
        field("adifver", version)
    )
}

fn my_bundle(rec: &QsoRecord, opts: &ConvertOptions) -> RefBundle {
    match opts.my_qth {
        RemarkSlot::Rmks1 => extract_refs(&rec.rmks1),
        RemarkSlot::Rmks2 => extract_refs(&rec.rmks2),
        _ => extract_refs(&opts.park),
    }
}

fn his_bundle(rec: &QsoRecord, opts: &ConvertOptions) -> RefBundle {
    match opts.qth {
        RemarkSlot::Rmks1 => extract_refs(&rec.rmks1),
        RemarkSlot::Rmks2 => extract_refs(&rec.rmks2),
        RemarkSlot::Qth => extract_refs(&rec.qth),
        _ => RefBundle::default(),
    }
}

/// One record fanned out over every applicable "my" reference.
pub(crate) struct Fanout {
    /// Record date as `YYYYMMDD`, used for filename derivation.
    pub date2: String,
    /// Display row for the check report.
    pub preview: Vec<String>,
    /// `(my reference, rendered record)` pairs.
    pub per_ref: Vec<(String, String)>,
    /// Diagnostic carried by the record, if any.
    pub error: Option<String>,
}

/// Renders one decoded record into ADIF text for every "my" reference it
/// was logged against. Tainted records keep their diagnostic inline so
/// invalid rows surface in the exported file instead of vanishing.
pub(crate) fn fanout(
    result: &DecodeResult,
    opts: &ConvertOptions,
    parks: &dyn ParkResolver,
) -> Fanout {
    let decoded = match result {
        Ok(d) => d,
        Err(e) => {
            return Fanout {
                date2: String::new(),
                preview: vec![e.0.clone()],
                per_ref: Vec::new(),
                error: Some(e.0.clone()),
            };
        }
    };
    let rec = decoded.record();

    // Fall back to references the decoder already extracted (MY_SIG_INFO
    // and friends for ADIF input) when the selected column has none.
    let mut my = my_bundle(rec, opts);
    if my.sota.is_empty() && my.pota.is_empty() && my.wwff.is_empty() {
        my.sota = rec.refs.my.sota.clone();
        my.pota = rec.refs.my.pota.clone();
        my.wwff = rec.refs.my.wwff.clone();
    }
    let his = his_bundle(rec, opts);

    let date2 = rec.date_compact();
    let date = if rec.errors.date.is_empty() {
        date2.clone()
    } else {
        rec.errors.date.clone()
    };
    let time = if rec.errors.time.is_empty() {
        rec.time_compact()
    } else {
        rec.errors.time.clone()
    };

    let activator = opts.pota_activator.as_str();
    let operator = opts.pota_operator.as_str();

    let error = if rec.error {
        Some(rec.errormsg.clone())
    } else {
        None
    };

    let disp_mode = if rec.sub_mode.is_empty() {
        rec.mode.clone()
    } else {
        format!("{}/{}", rec.mode, rec.sub_mode)
    };

    let mut head = String::new();
    if let Some(msg) = &error {
        head.push_str(msg);
    }
    head.push_str(&field("activator", activator));
    head.push_str(&field("operator", operator));
    head.push_str(&field("callsign", &rec.callsign));
    head.push_str(&field("date", &date));
    head.push_str(&field("time", &time));
    head.push_str(&field("band-wlen", &rec.band_wlen));
    head.push_str(&field("mode", &rec.mode));

    // POTA records omit signal reports; SOTA and WWFF carry them.
    let with_rst = format!(
        "{head}{}{}",
        field("rst_sent", &rec.rst_sent),
        field("rst_rcvd", &rec.rst_rcvd)
    );

    let my_sotas: Vec<&str> = if my.sota.is_empty() {
        vec![]
    } else {
        vec![my.sota.as_str()]
    };
    let his_sotas: Vec<&str> = if his.sota.is_empty() {
        vec![]
    } else {
        vec![his.sota.as_str()]
    };

    let mut per_ref: Vec<(String, String)> = Vec::new();

    for mine in &my_sotas {
        let mut out = String::new();
        if his_sotas.is_empty() {
            out.push_str(&with_rst);
            out.push_str(&field("mysotaref", mine));
            out.push_str("<EOR>\n");
        } else {
            for theirs in &his_sotas {
                out.push_str(&with_rst);
                out.push_str(&field("mysotaref", mine));
                out.push_str(&field("sotaref", theirs));
                out.push_str("<EOR>\n");
            }
        }
        per_ref.push((mine.to_string(), out));
    }

    let mut my_state = String::new();
    for mine in &my.pota {
        let locations = parks.locations(mine);
        if locations.len() == 1 {
            my_state = locations[0].replace("JP-", "");
        }
        let mut tail = format!("{}{}", field("mysig", "POTA"), field("mysiginfo", mine));
        if !my_state.is_empty() {
            tail.push_str(&field("mystate", &my_state));
        }
        let mut out = String::new();
        if his.pota.is_empty() {
            out.push_str(&head);
            out.push_str(&tail);
            out.push_str("<EOR>\n");
        } else {
            for theirs in &his.pota {
                out.push_str(&head);
                out.push_str(&tail);
                out.push_str(&field("sig", "POTA"));
                out.push_str(&field("siginfo", theirs));
                out.push_str("<EOR>\n");
            }
        }
        per_ref.push((mine.clone(), out));
    }

    for mine in &my.wwff {
        let mut out = String::new();
        if his.wwff.is_empty() {
            out.push_str(&with_rst);
            out.push_str(&field("mysig", "WWFF"));
            out.push_str(&field("mysiginfo", mine));
            out.push_str("<EOR>\n");
        } else {
            for theirs in &his.wwff {
                out.push_str(&with_rst);
                out.push_str(&field("mysig", "WWFF"));
                out.push_str(&field("mysiginfo", mine));
                out.push_str(&field("sig", "WWFF"));
                out.push_str(&field("siginfo", theirs));
                out.push_str("<EOR>\n");
            }
        }
        per_ref.push((mine.clone(), out));
    }

    let join = |b: &RefBundle, sotas: &[&str]| -> String {
        let mut parts: Vec<String> = sotas.iter().map(|s| s.to_string()).collect();
        parts.extend(b.wwff.iter().cloned());
        parts.extend(b.pota.iter().cloned());
        parts.join("/")
    };
    let his_str = join(&his, &his_sotas);
    let mut my_str = join(&my, &my_sotas);
    if !my_state.is_empty() {
        my_str.push_str(&format!("({my_state})"));
    }

    let preview = vec![
        rec.callsign.clone(),
        date,
        time,
        rec.band_wlen.clone(),
        disp_mode,
        rec.rst_sent.clone(),
        rec.rst_rcvd.clone(),
        his_str,
        my_str,
        activator.to_string(),
        operator.to_string(),
    ];

    Fanout {
        date2,
        preview,
        per_ref,
        error,
    }
}

/// Case-insensitive substring search; the pattern must be ASCII.
fn find_ci(haystack: &str, pattern: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let p = pattern.as_bytes();
    if p.is_empty() || h.len() < p.len() {
        return None;
    }
    (0..=h.len() - p.len()).find(|&i| h[i..i + p.len()].eq_ignore_ascii_case(p))
}

/// Splits the body of an ADIF file into one string per `<EOR>` record.
fn split_adif_records(text: &str) -> Vec<String> {
    let body = match find_ci(text, "<EOH>") {
        Some(i) => &text[i + 5..],
        None => text,
    };
    let mut records = Vec::new();
    let mut rest = body;
    while let Some(i) = find_ci(rest, "<EOR>") {
        let chunk = &rest[..i + 5];
        if !chunk.trim().is_empty() {
            records.push(chunk.to_string());
        }
        rest = &rest[i + 5..];
    }
    records
}

/// Converts a HAMLOG/iOS CSV or ADIF log into per-reference POTA/WWFF/SOTA
/// ADIF files. Input format is auto-detected: an `ADIF`/`<EOH>` marker on
/// the first line selects the ADIF reader, a `TimeOn` header row selects
/// the iOS layout, anything else is read as HAMLOG CSV.
pub fn pota_convert(
    input: &str,
    opts: &ConvertOptions,
    parks: &dyn ParkResolver,
) -> (Artifacts, CheckReport) {
    let mut files = Artifacts::new();
    let mut report = CheckReport {
        status: "OK".to_string(),
        ..CheckReport::default()
    };

    let mut opts = opts.clone();
    let act_call = opts.pota_activator.clone();
    let (operator, _) = split_callsign(&act_call);
    if opts.pota_operator.is_empty() {
        opts.pota_operator = operator;
    }

    let Some(first_line) = input.lines().find(|l| !l.trim().is_empty()) else {
        report.status = "NG".to_string();
        report.errorlog = "Input file is empty.".to_string();
        return (files, report);
    };

    let upper = first_line.to_uppercase();
    let is_adif = upper.contains("ADIF") || upper.contains("<EOH>");

    let outcomes: Vec<DecodeResult> = if is_adif {
        opts.qth = RemarkSlot::Qth;
        split_adif_records(input)
            .into_iter()
            .take(MAX_INPUT_LINES)
            .map(|chunk| decode_adif(&chunk))
            .collect()
    } else {
        let rows = read_rows(input);
        let ios_header = rows
            .first()
            .is_some_and(|row| row.iter().any(|c| c == "TimeOn"));
        rows.into_iter()
            .skip(if ios_header { 1 } else { 0 })
            .take(MAX_INPUT_LINES)
            .map(|row| {
                if ios_header {
                    decode_ios(&row)
                } else {
                    decode_hamlog(&row)
                }
            })
            .collect()
    };

    let mut first_date = String::new();
    let mut error_lines: Vec<String> = Vec::new();
    let mut pota_files: Vec<String> = Vec::new();

    for (idx, outcome) in outcomes.iter().enumerate() {
        let mut out = fanout(outcome, &opts, parks);

        if first_date.is_empty() {
            first_date = out.date2.clone();
        }

        if let Some(msg) = &out.error {
            report.status = "NG".to_string();
            error_lines.push(format!("line {}: {msg}", idx + 1));
            out.preview.push(msg.clone());
        }
        if !out.preview.is_empty() {
            report.logtext.push(out.preview);
        }

        for (reference, text) in &out.per_ref {
            let is_pota = reference.contains("JA-") || reference.contains("JP-");
            let (locations, date) = if is_pota {
                (parks.locations(reference), first_date.clone())
            } else if reference.contains('/') {
                (Vec::new(), out.date2.clone())
            } else {
                (Vec::new(), first_date.clone())
            };

            let stem = format!(
                "{}@{}",
                act_call.replace('/', "-"),
                reference.replace('/', "-")
            );
            let fname = if locations.len() > 1 {
                let locs: Vec<String> =
                    locations.iter().map(|l| l.replace("JP-", "")).collect();
                format!("{stem}-[{}]-{date}.adi", locs.join(","))
            } else {
                format!("{stem}-{date}.adi")
            };

            if !files.contains(&fname) {
                files.insert(fname.clone(), header("3.1.4"));
            }
            files.append(&fname, text);

            if is_pota {
                pota_files.push(fname);
            }
        }
    }

    for name in pota_files {
        if !report.filelist.contains(&name) {
            report.filelist.push(name);
        }
    }
    report.errorlog = error_lines.join("\n");

    (files, report)
}

/// Appends WWFF or POTA ADIF output for a compiled session to `files`,
/// one file per activation reference.
pub fn fle_adif(
    files: &mut Artifacts,
    qsos: &[QsoRecord],
    callsign: &str,
    sig: &str,
    siginfo: &str,
) -> Result<(), ExportError> {
    let Some(first) = qsos.first() else {
        return Ok(());
    };
    let date = first.date_compact();
    let fname = format!("{}@{siginfo}-{date}.adi", callsign.replace('/', "-"));

    let mut buf = CsvBuf::with(b' ', false);
    for rec in qsos.iter().take(MAX_INPUT_LINES) {
        let his: &[String] = if sig == "POTA" {
            &rec.refs.his.pota
        } else {
            &rec.refs.his.wwff
        };

        let base = [
            field("activator", &rec.my_call),
            field("callsign", &rec.callsign),
            field("date", &rec.date_compact()),
            field("time", &rec.time_compact()),
            field("band-wlen", &rec.band_wlen),
            field("mode", &rec.mode),
            field("rst_sent", &rec.rst_sent),
            field("rst_rcvd", &rec.rst_rcvd),
            field("mysig", sig),
            field("mysiginfo", siginfo),
        ];

        if his.is_empty() {
            let mut row = base.to_vec();
            row.push(field("operator", &rec.my_operator));
            row.push("<EOR>".to_string());
            buf.row(&row)?;
        } else {
            for theirs in his {
                let mut row = base.to_vec();
                row.push(field("sig", sig));
                row.push(field("siginfo", theirs));
                row.push(field("operator", &rec.my_operator));
                row.push("<EOR>".to_string());
                buf.row(&row)?;
            }
        }
    }

    let body = buf.take()?;
    if files.contains(&fname) {
        files.append(&fname, &body);
    } else {
        files.insert(fname, format!("{}{body}", header("3.1.4")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parks::TableParkResolver;

    fn hamlog_row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn sample_csv() -> String {
        // callsign, date, time, rst s/r, freq, mode, code, grid, qsl, name, qth, rmks1, rmks2, extra
        "JH1XYZ/1,24/05/01,10:20U,599,579,7.010,CW,,PM95,N,Taro,Tokyo,JA-0014,JA-1001,\n"
            .to_string()
    }

    #[test]
    fn field_uses_allowlist_and_comment_fallback() {
        assert_eq!(field("callsign", "JH1XYZ"), "<CALL:6>JH1XYZ");
        assert_eq!(field("mysiginfo", "JA-0014"), "<MY_SIG_INFO:7>JA-0014");
        assert_eq!(field("unknown-key", "abc"), "<COMMENT:3>abc");
    }

    #[test]
    fn header_carries_program_and_version() {
        let h = header("3.1.4");
        assert!(h.contains("<PROGRAMID:4>FCTH"));
        assert!(h.contains("<ADIF_VER:5>3.1.4"));
        assert!(h.ends_with("<EOH>\n"));
    }

    #[test]
    fn fanout_writes_one_file_per_my_park() {
        let mut parks = TableParkResolver::default();
        parks.insert("JA-0014", &["JP-TK"]);
        let opts = ConvertOptions {
            my_qth: RemarkSlot::Rmks1,
            qth: RemarkSlot::Rmks2,
            pota_activator: "JA1ABC/1".to_string(),
            pota_operator: "JA1ABC".to_string(),
            ..ConvertOptions::default()
        };
        let result = decode_hamlog(&hamlog_row(&[
            "JH1XYZ", "24/05/01", "10:20U", "599", "579", "7.010", "CW", "", "", "N", "", "",
            "JA-0014", "JA-1001", "",
        ]));
        let out = fanout(&result, &opts, &parks);
        assert_eq!(out.per_ref.len(), 1);
        let (reference, text) = &out.per_ref[0];
        assert_eq!(reference, "JA-0014");
        assert!(text.contains("<MY_SIG_INFO:7>JA-0014"));
        assert!(text.contains("<MY_STATE:2>TK"));
        assert!(text.contains("<SIG_INFO:7>JA-1001"));
        // POTA records carry no signal reports.
        assert!(!text.contains("<RST_SENT"));
    }

    #[test]
    fn pota_convert_names_files_after_activator_and_reference() {
        let mut parks = TableParkResolver::default();
        parks.insert("JA-0014", &["JP-TK"]);
        let opts = ConvertOptions {
            my_qth: RemarkSlot::Rmks1,
            qth: RemarkSlot::None,
            pota_activator: "JA1ABC/1".to_string(),
            ..ConvertOptions::default()
        };
        let (files, report) = pota_convert(&sample_csv(), &opts, &parks);
        assert_eq!(report.status, "OK");
        let names: Vec<&str> = files.names().collect();
        assert_eq!(names, vec!["JA1ABC-1@JA-0014-20240501.adi"]);
        assert_eq!(report.filelist, names);
        let content = files.get(names[0]).unwrap();
        assert!(content.starts_with("ADIF Export from HAMLOG\n"));
        assert!(content.contains("<CALL:8>JH1XYZ/1"));
    }

    #[test]
    fn pota_convert_multi_location_park_gets_bracketed_name() {
        let mut parks = TableParkResolver::default();
        parks.insert("JA-0014", &["JP-TK", "JP-KN"]);
        let opts = ConvertOptions {
            my_qth: RemarkSlot::Rmks1,
            pota_activator: "JA1ABC".to_string(),
            ..ConvertOptions::default()
        };
        let (files, _) = pota_convert(&sample_csv(), &opts, &parks);
        let names: Vec<&str> = files.names().collect();
        assert_eq!(names, vec!["JA1ABC@JA-0014-[TK,KN]-20240501.adi"]);
    }

    #[test]
    fn pota_convert_reads_adif_input() {
        let parks = TableParkResolver::default();
        let opts = ConvertOptions {
            pota_activator: "JA1ABC".to_string(),
            ..ConvertOptions::default()
        };
        let input = concat!(
            "ADIF Export\n<EOH>\n",
            "<CALL:6>JH1XYZ<QSO_DATE:8>20240501<TIME_ON:4>0120",
            "<MODE:2>CW<MY_SIG_INFO:7>JA-0014<EOR>\n"
        );
        let (files, report) = pota_convert(input, &opts, &parks);
        assert_eq!(report.status, "OK");
        assert_eq!(files.len(), 1);
        assert_eq!(report.logtext.len(), 1);
    }

    #[test]
    fn pota_convert_empty_input_is_rejected() {
        let parks = TableParkResolver::default();
        let (files, report) = pota_convert("  \n", &ConvertOptions::default(), &parks);
        assert!(files.is_empty());
        assert_eq!(report.status, "NG");
    }

    #[test]
    fn pota_convert_reports_bad_rows_without_stopping() {
        let parks = TableParkResolver::default();
        let opts = ConvertOptions {
            my_qth: RemarkSlot::Rmks1,
            pota_activator: "JA1ABC".to_string(),
            ..ConvertOptions::default()
        };
        let input = format!("bad,row\n{}", sample_csv());
        let (files, report) = pota_convert(&input, &opts, &parks);
        assert_eq!(report.status, "NG");
        assert!(report.errorlog.starts_with("line 1:"));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn fle_adif_appends_to_existing_file_without_second_header() {
        let rec = QsoRecord {
            my_call: "JA1ABC".to_string(),
            my_operator: "JA1ABC".to_string(),
            callsign: "JH1XYZ".to_string(),
            year: 2024,
            month: 5,
            day: 1,
            hour: 1,
            minute: 20,
            band_wlen: "40m".to_string(),
            mode: "CW".to_string(),
            rst_sent: "599".to_string(),
            rst_rcvd: "579".to_string(),
            ..QsoRecord::default()
        };
        let mut files = Artifacts::new();
        fle_adif(&mut files, &[rec.clone()], "JA1ABC", "WWFF", "JAFF-0123").unwrap();
        fle_adif(&mut files, &[rec], "JA1ABC", "WWFF", "JAFF-0123").unwrap();
        let content = files.get("JA1ABC@JAFF-0123-20240501.adi").unwrap();
        assert_eq!(content.matches("<EOH>").count(), 1);
        assert_eq!(content.matches("<EOR>").count(), 2);
    }
}
