//! Legacy HAMLOG/iOS/ADIF conversion paths.

use hamlogconv::export::{
    ConvertOptions, airham_convert, pota_convert, sota_activator, sota_chaser,
};
use hamlogconv::parks::TableParkResolver;
use hamlogconv::types::RemarkSlot;

fn hamlog_line(call: &str, date: &str, time: &str, freq: &str, rmks1: &str, rmks2: &str) -> String {
    format!("{call},{date},{time},599,579,{freq},CW,,PM95,N,Taro,Tokyo,{rmks1},{rmks2},\n")
}

fn opts() -> ConvertOptions {
    ConvertOptions {
        my_qth: RemarkSlot::Rmks1,
        qth: RemarkSlot::Rmks2,
        sota_activator: "JA1ABC/1".to_string(),
        pota_activator: "JA1ABC/1".to_string(),
        ..ConvertOptions::default()
    }
}

#[test]
fn activator_log_splits_by_date_and_keeps_adif_whole() {
    let input = format!(
        "{}{}{}",
        hamlog_line("JH1XYZ", "24/05/01", "10:20U", "7.010", "JA/TK-001", ""),
        hamlog_line("JA2AA", "24/05/01", "11:00U", "14.062", "JA/TK-001", "JA/NN-001"),
        hamlog_line("JA3BB", "24/05/02", "09:00U", "7.010", "JA/KN-006", ""),
    );
    let files = sota_activator(&input, "JA1ABC/1", &opts()).expect("convert");

    assert_eq!(files.get("sota20240501.csv").unwrap().lines().count(), 2);
    assert_eq!(files.get("sota20240502.csv").unwrap().lines().count(), 1);
    assert_eq!(files.get("sota-s2s-20240501.csv").unwrap().lines().count(), 1);

    let adi = files.get("sota20240501.adi").unwrap();
    assert!(adi.starts_with("ADIF Export from HAMLOG\n"));
    assert!(adi.contains("<ADIF_VER:5>3.0.6"));
    assert_eq!(adi.matches("<EOR>").count(), 3);
}

#[test]
fn chaser_log_separates_summit_contacts() {
    let input = format!(
        "{}{}",
        hamlog_line("JH1XYZ", "24/05/01", "10:20U", "7.010", "", "JA/NN-001"),
        hamlog_line("JA2AA", "24/05/01", "11:00U", "7.010", "", ""),
    );
    let files = sota_chaser(&input, "JA1ABC", &opts()).expect("convert");
    assert!(files.get("sota20240501.csv").unwrap().contains("JA/NN-001"));
    assert_eq!(files.get("other20240501.csv").unwrap().lines().count(), 1);
}

#[test]
fn pota_files_accumulate_across_the_log() {
    let mut parks = TableParkResolver::default();
    parks.insert("JA-0014", &["JP-TK"]);
    let input = format!(
        "{}{}",
        hamlog_line("JH1XYZ", "24/05/01", "10:20U", "7.010", "JA-0014", ""),
        hamlog_line("JA2AA", "24/05/01", "11:00U", "7.010", "JA-0014", "JA-1001"),
    );
    let (files, report) = pota_convert(&input, &opts(), &parks);
    assert_eq!(report.status, "OK");
    assert_eq!(report.filelist, vec!["JA1ABC-1@JA-0014-20240501.adi"]);
    let adi = files.get("JA1ABC-1@JA-0014-20240501.adi").unwrap();
    assert_eq!(adi.matches("<EOH>").count(), 1);
    assert_eq!(adi.matches("<EOR>").count(), 2);
    assert!(adi.contains("<SIG_INFO:7>JA-1001"));
    assert_eq!(report.logtext.len(), 2);
}

#[test]
fn adif_input_is_detected_and_reread() {
    let parks = TableParkResolver::default();
    let input = concat!(
        "ADIF Export from somewhere\n",
        "<ADIF_VER:5>3.1.4\n<EOH>\n",
        "<CALL:6>JH1XYZ<QSO_DATE:8>20240501<TIME_ON:4>0120",
        "<MODE:2>CW<MY_SIG_INFO:9>JAFF-0123<EOR>\n",
    );
    let (files, report) = pota_convert(input, &opts(), &parks);
    assert_eq!(report.status, "OK");
    let names: Vec<&str> = files.names().collect();
    assert_eq!(names, vec!["JA1ABC-1@JAFF-0123-20240501.adi"]);
}

#[test]
fn ios_input_is_detected_by_header_row() {
    let parks = TableParkResolver::default();
    let mut cols = vec![String::new(); 19];
    cols[0] = "2024-05-01 10:20:00 +0000".to_string();
    cols[2] = "7.010".to_string();
    cols[3] = "JH1XYZ".to_string();
    cols[4] = "579".to_string();
    cols[5] = "599".to_string();
    cols[8] = "JA-0014".to_string();
    cols[11] = "CW".to_string();
    let input = format!("TimeOn,TimeOff,Freq,Callsign\n{}\n", cols.join(","));

    let options = ConvertOptions {
        my_qth: RemarkSlot::Rmks1,
        pota_activator: "JA1ABC".to_string(),
        ..ConvertOptions::default()
    };
    let (files, report) = pota_convert(&input, &options, &parks);
    assert_eq!(report.status, "OK", "{}", report.errorlog);
    assert_eq!(files.len(), 1);
    assert!(files.names().next().unwrap().starts_with("JA1ABC@JA-0014-"));
}

#[test]
fn airham_export_keeps_every_input_row() {
    let input = format!(
        "{}{}",
        hamlog_line("JH1XYZ", "24/05/01", "10:20U", "7.010", "Fuji", ""),
        hamlog_line("JA2AA", "24/05/01", "11:00J", "14.062", "Hakone", ""),
    );
    let options = ConvertOptions {
        qth: RemarkSlot::Rmks1,
        ..ConvertOptions::default()
    };
    let files = airham_convert(&input, "airham.csv", &options).expect("convert");
    let out = files.get("airham.csv").unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,callsign"));
    assert!(lines[1].contains("Fuji"));
    assert!(lines[2].contains("Hakone"));
}

#[test]
fn conversion_is_deterministic() {
    let mut parks = TableParkResolver::default();
    parks.insert("JA-0014", &["JP-TK"]);
    let input = hamlog_line("JH1XYZ", "24/05/01", "10:20U", "7.010", "JA-0014", "");
    let (first, _) = pota_convert(&input, &opts(), &parks);
    let (second, _) = pota_convert(&input, &opts(), &parks);
    assert_eq!(first.into_files(), second.into_files());
}
