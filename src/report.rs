//! JSON-facing reports for the interpreter and converter endpoints.

use serde::Serialize;

use crate::fle::{Compilation, compose_qsl_msg};
use crate::refs::extract_refs;
use crate::types::{Diag, find_diag};

/// Result of a log check/conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// `OK` or `NG`.
    pub status: String,
    /// Newline-joined per-line error messages.
    pub errorlog: String,
    /// Display rows, one per converted record.
    pub logtext: Vec<Vec<String>>,
    /// POTA output filenames in first-seen order.
    pub filelist: Vec<String>,
}

/// Result of interpreting an FLE session without generating files.
///
/// On success `logtext` holds one display row per QSO and `hamlogtext`
/// the same contacts in HAMLOG column order. On failure both carry one
/// `[line number, message, source line]` row per input line.
#[derive(Debug, Clone, Serialize)]
pub struct InterpReport {
    /// `OK` or `ERR`.
    pub status: String,
    /// `SOTA`, `WWFF`, `BOTH` or `NONE`.
    pub logtype: String,
    /// Session callsign.
    #[serde(rename = "mycall")]
    pub my_call: String,
    /// Session operator.
    pub operator: String,
    /// Session summit reference.
    #[serde(rename = "mysota")]
    pub my_sota: String,
    /// Session WWFF reference.
    #[serde(rename = "mywwff")]
    pub my_wwff: String,
    /// Session QSL message.
    #[serde(rename = "qslmsg")]
    pub qsl_msg: String,
    /// Display rows.
    pub logtext: Vec<Vec<String>>,
    /// HAMLOG-ordered rows.
    pub hamlogtext: Vec<Vec<String>>,
}

/// Echoes `input` with every diagnostic appended to its source line.
pub fn annotate_errors(input: &str, diags: &[Diag]) -> String {
    let mut out = String::from("####FLE Interpretation Error####\n");
    for (lc, line) in input.lines().enumerate() {
        out.push_str(line);
        if let Some(msg) = find_diag(lc, diags) {
            out.push_str(" #--- Error! ");
            out.push_str(msg);
        }
        out.push('\n');
    }
    out
}

/// Builds the interpreter report for a compiled session.
pub fn interp(input: &str, out: &Compilation) -> InterpReport {
    let mut logtext: Vec<Vec<String>> = Vec::new();
    let mut hamlogtext: Vec<Vec<String>> = Vec::new();

    let (status, logtype) = if out.diags.is_empty() {
        let flags = &out.flags;
        let logtype = if flags.sota && (flags.wwff || flags.pota) {
            "BOTH"
        } else if flags.sota {
            "SOTA"
        } else if flags.wwff || flags.pota {
            "WWFF"
        } else {
            "NONE"
        };
        ("OK", logtype)
    } else {
        for (lc, line) in input.lines().enumerate() {
            let msg = find_diag(lc, &out.diags).unwrap_or("").to_string();
            let row = vec![lc.to_string(), msg, line.to_string()];
            logtext.push(row.clone());
            hamlogtext.push(row);
        }
        ("ERR", "NONE")
    };

    if status == "OK" {
        for (idx, rec) in out.qsos.iter().enumerate() {
            let n = (idx + 1).to_string();
            let date = format!("{:02}-{:02}-{:02}", rec.year, rec.month, rec.day);
            let time = format!("{:02}:{:02}", rec.hour, rec.minute);

            let mut rsts = rec.rst_sent.clone();
            let mut rstr = rec.rst_rcvd.clone();
            if out.flags.contest {
                if !rec.his_num.is_empty() {
                    rsts.push(' ');
                    rsts.push_str(&rec.his_num);
                }
                if !rec.my_num.is_empty() {
                    rstr.push(' ');
                    rstr.push_str(&rec.my_num);
                }
            }

            let mut my_ref = String::new();
            let mut his_ref = String::new();
            let mut prefix = "";
            if out.flags.pota {
                my_ref = rec.refs.my.pota.join("/");
                his_ref = rec.refs.his.pota.join("/");
                prefix = "/";
            }
            if out.flags.wwff {
                my_ref.push_str(prefix);
                my_ref.push_str(&rec.refs.my.wwff.join("/"));
                if !rec.refs.his.wwff.is_empty() {
                    his_ref.push_str(prefix);
                    his_ref.push_str(&rec.refs.his.wwff.join("/"));
                }
            }

            let rmks = extract_refs(&rec.rmks1);
            logtext.push(vec![
                n.clone(),
                rec.my_call.clone(),
                date.clone(),
                time.clone(),
                rec.callsign.clone(),
                rec.band_wlen.clone(),
                rec.mode_raw.clone(),
                rsts.clone(),
                rstr.clone(),
                rec.refs.my.sota.clone(),
                rec.refs.his.sota.clone(),
                my_ref,
                his_ref,
                format!("{}{}", rmks.loc, rmks.sat),
                rec.my_operator.clone(),
            ]);

            let parts = compose_qsl_msg(rec);
            hamlogtext.push(vec![
                n,
                rec.callsign.clone(),
                date,
                format!("{time}U"),
                rsts,
                rstr,
                parts.freq,
                rec.mode_raw.clone(),
                parts.refs.loc_raw,
                rec.name.clone(),
                parts.qth,
                parts.qsl,
            ]);
        }
    }

    InterpReport {
        status: status.to_string(),
        logtype: logtype.to_string(),
        my_call: out.session.my_call.clone(),
        operator: out.session.operator.clone(),
        my_sota: out.session.my_sota.clone(),
        my_wwff: out.session.my_wwff.clone(),
        qsl_msg: out.session.qsl_msg.clone(),
        logtext,
        hamlogtext,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fle::compile;

    const SESSION: &str = concat!(
        "date 2024-05-01\n",
        "mycall JA1ABC/1\n",
        "mysota JA/TK-001\n",
        "0120 14 cw jh1xyz 599 579\n",
    );

    #[test]
    fn ok_session_reports_sota_logtype_and_rows() {
        let out = compile(SESSION);
        assert!(out.diags.is_empty(), "{:?}", out.diags);
        let report = interp(SESSION, &out);
        assert_eq!(report.status, "OK");
        assert_eq!(report.logtype, "SOTA");
        assert_eq!(report.my_call, "JA1ABC/1");
        assert_eq!(report.logtext.len(), 1);
        let row = &report.logtext[0];
        assert_eq!(row[0], "1");
        assert_eq!(row[2], "2024-05-01");
        assert_eq!(row[3], "01:20");
        assert_eq!(row[4], "JH1XYZ");
        assert_eq!(row[5], "20m");
        assert_eq!(row[9], "JA/TK-001");
        let hamlog = &report.hamlogtext[0];
        assert_eq!(hamlog[3], "01:20U");
        assert_eq!(hamlog[6], "14");
    }

    #[test]
    fn contest_serials_are_appended_to_reports() {
        let input = concat!(
            "date 2024-05-01\n",
            "mycall JA1ABC\n",
            "number consecutive\n",
            "0120 14 cw jh1xyz 599 579 ,045\n",
        );
        let out = compile(input);
        assert!(out.diags.is_empty(), "{:?}", out.diags);
        let report = interp(input, &out);
        let row = &report.logtext[0];
        assert_eq!(row[7], "599 001");
        assert_eq!(row[8], "579 045");
    }

    #[test]
    fn failed_session_lists_every_input_line() {
        let input = "date 18990501\nmycall JA1ABC\n";
        let out = compile(input);
        assert!(!out.diags.is_empty());
        let report = interp(input, &out);
        assert_eq!(report.status, "ERR");
        assert_eq!(report.logtype, "NONE");
        assert_eq!(report.logtext.len(), 2);
        assert_eq!(report.logtext[0][0], "0");
        assert!(!report.logtext[0][1].is_empty());
        assert_eq!(report.logtext[1][1], "");
    }

    #[test]
    fn annotate_marks_only_offending_lines() {
        let input = "date 18990501\nmycall JA1ABC\n";
        let out = compile(input);
        let text = annotate_errors(input, &out.diags);
        assert!(text.starts_with("####FLE Interpretation Error####\n"));
        assert!(text.contains("date 18990501 #--- Error! Wrong date format."));
        assert!(text.contains("\nmycall JA1ABC\n"));
    }
}
