use proptest::prelude::*;

use hamlogconv::decode::read_adif;
use hamlogconv::export::adif::field;
use hamlogconv::export::segment_by_key;
use hamlogconv::fle::compile;

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..64)
}

proptest! {
    #[test]
    fn segments_cover_the_input_in_order(keys in key_strategy()) {
        let segs = segment_by_key(&keys, |k| *k);
        let rebuilt: Vec<u8> = segs
            .iter()
            .flat_map(|(_, run)| run.iter().copied())
            .collect();
        prop_assert_eq!(rebuilt, keys);
    }

    #[test]
    fn adjacent_segments_never_share_a_key(keys in key_strategy()) {
        let segs = segment_by_key(&keys, |k| *k);
        for pair in segs.windows(2) {
            prop_assert_ne!(pair[0].0, pair[1].0);
        }
        for (key, run) in &segs {
            prop_assert!(!run.is_empty());
            prop_assert!(run.iter().all(|k| k == key));
        }
    }

    #[test]
    fn adif_fields_round_trip_through_the_reader(value in "[A-Za-z0-9 /,-]{0,40}") {
        let text = format!("{}{}<EOR>", field("callsign", &value), field("date", "20240501"));
        let (records, _) = read_adif(&text);
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].get("CALL").map(String::as_str), Some(value.as_str()));
    }

    #[test]
    fn rendered_field_length_counts_chars(key in "[a-z_]{1,12}", value in "[A-Za-z0-9]{0,20}") {
        let rendered = field(&key, &value);
        prop_assert!(rendered.starts_with('<'));
        prop_assert!(rendered.ends_with(value.as_str()));
        let len: usize = rendered
            .split(':')
            .nth(1)
            .and_then(|rest| rest.split('>').next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        prop_assert_eq!(len, value.chars().count());
    }

    #[test]
    fn compile_never_panics_and_caps_output(input in "[ -~\n]{0,400}") {
        let out = compile(&input);
        let lines = input.lines().count();
        prop_assert!(out.qsos.len() <= lines);
    }

    #[test]
    fn compile_is_deterministic(input in "[ -~\n]{0,300}") {
        let a = compile(&input);
        let b = compile(&input);
        prop_assert_eq!(a.qsos, b.qsos);
        prop_assert_eq!(a.diags, b.diags);
    }
}
