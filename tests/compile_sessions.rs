//! End-to-end FLE session compilation and bundle generation.

use hamlogconv::export::generate_bundle;
use hamlogconv::fle::compile;
use hamlogconv::report::interp;

#[test]
fn bare_band_number_selects_the_band() {
    let input = "date 2024-05-01\nmycall JA1ABC\n14 cw jh1xyz 599 588\n";
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    assert_eq!(out.qsos.len(), 1);
    let q = &out.qsos[0];
    assert_eq!(q.band_wlen, "20m");
    assert_eq!(q.rst_sent, "599");
    assert_eq!(q.rst_rcvd, "588");
}

#[test]
fn state_persists_between_lines() {
    let input = concat!(
        "date 2024-05-01\n",
        "mycall JA1ABC/1\n",
        "mysota JA/TK-001\n",
        "0903 40m cw jh1xyz\n",
        "7 ja2aa 559 449\n",
        "12 ja3bb\n",
    );
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    assert_eq!(out.qsos.len(), 3);
    // Band and mode carry over; short time tokens adjust the cursor.
    assert_eq!(out.qsos[1].band_wlen, "40m");
    assert_eq!(out.qsos[1].mode_raw, "CW");
    assert_eq!(out.qsos[1].rst_sent, "559");
    assert_eq!(
        (out.qsos[2].hour, out.qsos[2].minute),
        (9, 12),
        "two digits replace the minutes"
    );
    // Defaults apply when no report is given.
    assert_eq!(out.qsos[2].rst_sent, "599");
}

#[test]
fn timezone_shifts_the_emitted_utc_timestamp() {
    let input = concat!(
        "date 2024-05-01\n",
        "timezone +9\n",
        "mycall JA1ABC\n",
        "0030 14 cw jh1xyz\n",
    );
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    let q = &out.qsos[0];
    assert_eq!((q.year, q.month, q.day), (2024, 4, 30));
    assert_eq!((q.hour, q.minute), (15, 30));
    assert_eq!(q.timezone, "+0900");
}

#[test]
fn day_increment_crosses_month_boundaries() {
    let input = concat!(
        "date 2024-04-30\n",
        "mycall JA1ABC\n",
        "2350 14 cw jh1xyz\n",
        "day +\n",
        "0010 ja2aa\n",
    );
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    assert_eq!(out.qsos[1].month, 5);
    assert_eq!(out.qsos[1].day, 1);
}

#[test]
fn multi_day_session_segments_sota_csv_per_date() {
    let input = concat!(
        "date 2024-05-01\n",
        "mycall JA1ABC/1\n",
        "mysota JA/TK-001\n",
        "0120 14 cw jh1xyz 599 579\n",
        "day +\n",
        "0200 ja2aa 599 599 JA/NN-001\n",
    );
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    let files = generate_bundle(input, &out, "stamp").expect("bundle");
    assert!(files.contains("sota20240501.csv"));
    assert!(files.contains("sota20240502.csv"));
    // Second day is summit-to-summit.
    assert!(files.contains("sota-s2s-20240502.csv"));
    assert!(!files.contains("sota-s2s-20240501.csv"));
}

#[test]
fn wwff_session_produces_one_adif_per_reference() {
    let input = concat!(
        "date 2024-05-01\n",
        "mycall JA1ABC\n",
        "mywwff JAFF-0123\n",
        "0120 14 cw jh1xyz 599 579 JAFF-0456\n",
        "0130 ja2aa 599 599\n",
    );
    let out = compile(input);
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    let files = generate_bundle(input, &out, "stamp").expect("bundle");
    let adi = files
        .get("JA1ABC@JAFF-0123-20240501.adi")
        .expect("wwff adif");
    assert_eq!(adi.matches("<EOR>").count(), 2);
    assert!(adi.contains("<MY_SIG_INFO:9>JAFF-0123"));
    assert!(adi.contains("<SIG_INFO:9>JAFF-0456"));
}

#[test]
fn interp_and_bundle_agree_on_errors() {
    let input = "date 2024-05-01\nmycall JA1ABC\ncw jh1xyz\n";
    let out = compile(input);
    assert!(
        out.diags
            .iter()
            .any(|d| d.message == "Band or frequency must be specified before QSO."),
        "{:?}",
        out.diags
    );
    let report = interp(input, &out);
    assert_eq!(report.status, "ERR");
    let files = generate_bundle(input, &out, "stamp").expect("bundle");
    assert_eq!(files.len(), 1);
    assert!(files.names().next().unwrap().starts_with("fle-error-"));
}

#[test]
fn compiled_records_survive_the_hamlog_round_trip() {
    let input = concat!(
        "date 2024-05-01\n",
        "mycall JA1ABC\n",
        "0120 14 cw jh1xyz 599 579\n",
    );
    let out = compile(input);
    let files = generate_bundle(input, &out, "stamp").expect("bundle");
    let name = out.session.bundle_name();
    let hamlog = files.get(&format!("hamlog-{name}.csv")).expect("hamlog");
    let rows = hamlogconv::export::read_rows(hamlog);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "JH1XYZ");
    assert_eq!(rows[0][1], "24/05/01");
    assert_eq!(rows[0][2], "01:20U");
}

#[test]
fn date_directive_requires_a_separator() {
    let out = compile("date 2024-05-01\nmycall JA1ABC\n0120 14 cw jh1xyz\n");
    assert!(out.diags.is_empty(), "{:?}", out.diags);
    assert_eq!(out.session.year, 2024);
    assert_eq!(out.session.month, 5);
    assert_eq!(out.session.day, 1);

    let out = compile("date 20240501\nmycall JA1ABC\n0120 14 cw jh1xyz\n");
    assert!(
        out.diags
            .iter()
            .any(|d| d.message == "Wrong date format."),
        "{:?}",
        out.diags
    );
}
