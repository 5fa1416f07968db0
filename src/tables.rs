//! Static classification tables for bands, modes and SOTA regions.
//!
//! Lookups scan the tables in declaration order; the first matching row
//! wins, so row order is semantically load bearing.

use thiserror::Error;

use crate::types::{BandVariant, RstStyle, SotaMode};

/// One row of the frequency allocation table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRow {
    /// Inclusive lower edge in MHz.
    pub lo: f64,
    /// Inclusive upper edge in MHz.
    pub hi: f64,
    /// Air-band label.
    pub air: &'static str,
    /// SOTA band label.
    pub sota: &'static str,
    /// Wavelength-class label.
    pub wavelength: &'static str,
}

const fn row(
    lo: f64,
    hi: f64,
    air: &'static str,
    sota: &'static str,
    wavelength: &'static str,
) -> BandRow {
    BandRow {
        lo,
        hi,
        air,
        sota,
        wavelength,
    }
}

/// Priority-ordered inclusive frequency ranges. The trailing rows cover
/// JA license-free allocations and carry no SOTA/wavelength labels.
pub static FREQ_TABLE: &[BandRow] = &[
    row(0.1357, 0.1378, "135kHz", "VLF", "2190m"),
    row(0.472, 0.479, "475kHz", "VLF", "630m"),
    row(1.8, 1.9125, "1.9MHz", "1.8MHz", "160m"),
    row(3.5, 3.805, "3.8MHz", "3.5MHz", "80m"),
    row(7.0, 7.2, "7MHz", "7MHz", "40m"),
    row(10.000, 10.150, "10MHz", "10MHz", "30m"),
    row(14.0, 14.350, "14MHz", "14MHz", "20m"),
    row(18.0, 18.168, "18MHz", "18MHz", "17m"),
    row(21.0, 21.450, "21MHz", "21MHz", "15m"),
    row(24.0, 24.990, "24MHz", "24MHz", "12m"),
    row(28.0, 29.7, "28MHz", "28MHz", "10m"),
    row(50.0, 54.0, "50MHz", "50MHz", "6m"),
    row(144.0, 146.0, "144MHz", "144MHz", "2m"),
    row(430.0, 440.0, "430MHz", "433MHz", "70cm"),
    row(1200.0, 1300.0, "1200MHz", "1290MHz", "23cm"),
    row(2400.0, 2450.0, "2400MHz", "2.3GHz", "13cm"),
    row(5650.0, 5850.0, "5600MHz", "5.6GHz", "6cm"),
    row(10000.0, 10250.0, "10.1GHz", "10GHz", "3cm"),
    row(10450.0, 10500.0, "10.4GHz", "10GHz", "3cm"),
    row(351.0, 351.38125, "デジタル簡易(351MHz)", "", ""),
    row(421.0, 454.19375, "特定小電力(422MHz)", "", ""),
    row(26.968, 27.144, "CB(27MHz)", "", ""),
    row(142.0, 147.0, "デジタル小電力コミュニティ(142/146MHz)", "", ""),
];

/// Frequency string did not land inside any table range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BandLookupError(pub String);

/// Classifies a raw frequency string into its three band labels.
///
/// A `lo/hi` split-frequency pair keeps its first half. Unparseable input
/// degrades to 0.0 MHz, which no table row contains, so it fails lookup.
pub fn band_of(freq_str: &str) -> Result<(&'static str, &'static str, &'static str), BandLookupError> {
    let head = freq_str
        .split_once('/')
        .map(|(a, _)| a)
        .unwrap_or(freq_str);
    let freq: f64 = head.trim().parse().unwrap_or(0.0);

    for r in FREQ_TABLE {
        if freq >= r.lo && freq <= r.hi {
            return Ok((r.air, r.sota, r.wavelength));
        }
    }
    Err(BandLookupError(head.trim().to_string()))
}

/// Resolves a band word into its wavelength name and SOTA frequency label.
///
/// Accepts a wavelength name (`20m`), a SOTA frequency label (`14MHz`) or
/// the label with the unit dropped (`14`). License-free allocations carry
/// no SOTA label and never resolve.
pub fn band_token(word: &str) -> Option<(&'static str, &'static str)> {
    for r in FREQ_TABLE {
        if r.sota.is_empty() {
            continue;
        }
        let bare = r.sota.trim_end_matches("MHz").trim_end_matches("GHz");
        if word.eq_ignore_ascii_case(r.wavelength)
            || word.eq_ignore_ascii_case(r.sota)
            || word.eq_ignore_ascii_case(bare)
        {
            return Some((r.wavelength, r.sota));
        }
    }
    None
}

/// Reverse lookup from a wavelength-class band name to its frequency label.
pub fn freq_of(band: &str, variant: BandVariant) -> Option<&'static str> {
    if band.is_empty() {
        return None;
    }
    for r in FREQ_TABLE {
        if r.wavelength.eq_ignore_ascii_case(band) {
            return Some(match variant {
                BandVariant::Air => r.air,
                BandVariant::Sota => r.sota,
            });
        }
    }
    None
}

static SOTA_MODE_TABLE: &[(SotaMode, &[&str])] = &[
    (SotaMode::CW, &["CW"]),
    (SotaMode::SSB, &["SSB"]),
    (SotaMode::FM, &["FM"]),
    (SotaMode::AM, &["AM"]),
    (
        SotaMode::DATA,
        &[
            "RTTY", "RTY", "PSK", "PSK31", "PSK-31", "DIG", "DATA", "JT9", "JT65", "FT8", "FT4",
            "FSQ",
        ],
    ),
    (
        SotaMode::DV,
        &["DV", "FUSION", "DSTAR", "D-STAR", "DMR", "C4FM"],
    ),
];

static ADIF_NORMALIZE: &[(&str, &[&str])] = &[
    ("DIGITALVOICE", &["DV"]),
    ("DSTAR", &["D-STAR", "FUSION"]),
];

static ADIF_MODE_TABLE: &[(&str, &[&str])] = &[
    (
        "MFSK",
        &[
            "FSQCALL", "FST4", "FST4W", "FT4", "JS8", "JTMS", "MFSK4", "MFSK8", "MFSK11",
            "MFSK16", "MFSK22", "MFSK31", "MFSK32", "MFSK64", "MFSK64L", "MFSK128", "MFSK128L",
            "Q65",
        ],
    ),
    ("DIGITALVOICE", &["C4FM", "DMR", "DSTAR", "FREEDV", "M17"]),
];

/// Report style per recognized FLE mode name. Doubles as the lexer's
/// mode-name membership table.
static RST_STYLE_TABLE: &[(&str, RstStyle)] = &[
    ("CW", RstStyle::Rst),
    ("SSB", RstStyle::Rs),
    ("FM", RstStyle::Rs),
    ("AM", RstStyle::Rs),
    ("RTTY", RstStyle::Rst),
    ("RTY", RstStyle::Rst),
    ("PSK", RstStyle::Rst),
    ("PSK31", RstStyle::Rst),
    ("JT9", RstStyle::Snr),
    ("JT65", RstStyle::Snr),
    ("FT8", RstStyle::Snr),
    ("FT4", RstStyle::Snr),
    ("JS8", RstStyle::Snr),
    ("DV", RstStyle::Rs),
    ("FUSION", RstStyle::Rs),
    ("DSTAR", RstStyle::Rs),
    ("D-STAR", RstStyle::Rs),
    ("DMR", RstStyle::Rs),
    ("C4FM", RstStyle::Rs),
    ("FREEDV", RstStyle::Rs),
];

/// Maps a raw mode string to its SOTA mode family.
pub fn sota_mode(raw: &str) -> SotaMode {
    let m = raw.to_uppercase();
    for (family, members) in SOTA_MODE_TABLE {
        if members.contains(&m.as_str()) {
            return *family;
        }
    }
    SotaMode::Other
}

/// Maps a raw mode string to its `(ADIF mode, sub mode)` pair.
///
/// Known aliases normalize first; an unmapped mode passes through as its
/// own family with an empty sub mode.
pub fn adif_mode(raw: &str) -> (String, String) {
    let mut m = raw.to_uppercase();
    for (canon, members) in ADIF_NORMALIZE {
        if members.contains(&m.as_str()) {
            m = (*canon).to_string();
            break;
        }
    }
    for (family, members) in ADIF_MODE_TABLE {
        if members.contains(&m.as_str()) {
            return ((*family).to_string(), m);
        }
    }
    (m, String::new())
}

/// AirHam mode label; SSB splits into sideband by frequency.
pub fn airham_mode(mode: &str, freq_str: &str) -> String {
    let freq: f64 = freq_str.trim().parse().unwrap_or(0.0);
    let m = mode.to_uppercase();
    if m == "SSB" {
        if freq <= 7.2 {
            "SSB(LSB)".to_string()
        } else {
            "SSB(USB)".to_string()
        }
    } else {
        m
    }
}

/// Report style for a recognized FLE mode name, `None` when unknown.
pub fn rst_style(mode: &str) -> Option<RstStyle> {
    let m = mode.to_uppercase();
    RST_STYLE_TABLE
        .iter()
        .find(|(name, _)| *name == m)
        .map(|(_, style)| *style)
}

/// JA SOTA region prefix to numeric call-area zone.
static JA_REGION_TABLE: &[(&str, &str)] = &[
    ("JA/NI", "0"),
    ("JA/NN", "0"),
    ("JA/TK", "1"),
    ("JA/KN", "1"),
    ("JA/CB", "1"),
    ("JA/ST", "1"),
    ("JA/IB", "1"),
    ("JA/TG", "1"),
    ("JA/GM", "1"),
    ("JA/YN", "1"),
    ("JA/SO", "2"),
    ("JA/GF", "2"),
    ("JA/AC", "2"),
    ("JA/ME", "2"),
    ("JA/KT", "3"),
    ("JA/SI", "3"),
    ("JA/NR", "3"),
    ("JA/OS", "3"),
    ("JA/WK", "3"),
    ("JA/HG", "3"),
    ("JA/OY", "4"),
    ("JA/SN", "4"),
    ("JA/YG", "4"),
    ("JA/TT", "4"),
    ("JA/HS", "4"),
    ("JA5/KA", "5"),
    ("JA5/TS", "5"),
    ("JA5/EH", "5"),
    ("JA5/KC", "5"),
    ("JA6/FO", "6"),
    ("JA6/SG", "6"),
    ("JA6/NS", "6"),
    ("JA6/KM", "6"),
    ("JA6/OT", "6"),
    ("JA6/MZ", "6"),
    ("JA6/KG", "6"),
    ("JA6/ON", "6"),
    ("JA/AM", "7"),
    ("JA/IT", "7"),
    ("JA/AT", "7"),
    ("JA/YM", "7"),
    ("JA/MG", "7"),
    ("JA/FS", "7"),
    ("JA8/SY", "8"),
    ("JA8/RM", "8"),
    ("JA8/KK", "8"),
    ("JA8/OH", "8"),
    ("JA8/SC", "8"),
    ("JA8/IS", "8"),
    ("JA8/NM", "8"),
    ("JA8/SB", "8"),
    ("JA8/TC", "8"),
    ("JA8/KR", "8"),
    ("JA8/HD", "8"),
    ("JA8/IR", "8"),
    ("JA8/HY", "8"),
    ("JA8/OM", "8"),
    ("JA/TY", "9"),
    ("JA/FI", "9"),
    ("JA/IK", "9"),
];

/// Numeric call-area zone for a JA SOTA region prefix.
pub fn ja_zone(region: &str) -> Option<&'static str> {
    JA_REGION_TABLE
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, z)| *z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_of_classifies_inside_ranges() {
        assert_eq!(band_of("14.062").unwrap(), ("14MHz", "14MHz", "20m"));
        assert_eq!(band_of("7.0").unwrap(), ("7MHz", "7MHz", "40m"));
        assert_eq!(band_of("430.51").unwrap(), ("430MHz", "433MHz", "70cm"));
    }

    #[test]
    fn band_of_keeps_first_half_of_split_pair() {
        assert_eq!(band_of("144.1/430.5").unwrap().2, "2m");
    }

    #[test]
    fn band_of_rejects_gaps_and_garbage() {
        assert!(band_of("13.999").is_err());
        // Parse failure degrades to 0.0 which no row contains.
        assert_eq!(band_of("abc"), Err(BandLookupError("abc".to_string())));
    }

    #[test]
    fn freq_of_is_case_insensitive() {
        assert_eq!(freq_of("20M", BandVariant::Sota), Some("14MHz"));
        assert_eq!(freq_of("80m", BandVariant::Air), Some("3.8MHz"));
        assert_eq!(freq_of("80m", BandVariant::Sota), Some("3.5MHz"));
        assert_eq!(freq_of("11m", BandVariant::Air), None);
    }

    #[test]
    fn mode_families() {
        assert_eq!(sota_mode("ft8"), SotaMode::DATA);
        assert_eq!(sota_mode("FUSION"), SotaMode::DV);
        assert_eq!(sota_mode("OLIVIA"), SotaMode::Other);
    }

    #[test]
    fn adif_mode_normalizes_aliases() {
        assert_eq!(
            adif_mode("FT4"),
            ("MFSK".to_string(), "FT4".to_string())
        );
        assert_eq!(
            adif_mode("fusion"),
            ("DIGITALVOICE".to_string(), "DSTAR".to_string())
        );
        assert_eq!(adif_mode("CW"), ("CW".to_string(), String::new()));
    }

    #[test]
    fn airham_ssb_sideband_split() {
        assert_eq!(airham_mode("SSB", "7.10"), "SSB(LSB)");
        assert_eq!(airham_mode("ssb", "14.2"), "SSB(USB)");
        assert_eq!(airham_mode("CW", "7.01"), "CW");
    }
}
