//! HAMLOG QSL message composition for compiled sessions.

use crate::qso::QsoRecord;
use crate::refs::{RefBundle, extract_refs};
use crate::tables::freq_of;
use crate::types::BandVariant;

/// Rendered QSL columns for one QSO. `qth` and `qsl` land in the HAMLOG
/// Remarks columns, `freq` is the MHz-stripped frequency with a satellite
/// downlink appended when one was logged.
#[derive(Debug, Clone, Default)]
pub struct QslParts {
    /// References extracted from the remark text.
    pub refs: RefBundle,
    /// Display frequency without unit suffix.
    pub freq: String,
    /// QTH column: residual remark text plus the contacted references.
    pub qth: String,
    /// QSL column: `%message%rig` with macros expanded.
    pub qsl: String,
}

/// HAMLOG truncates the QTH column beyond this many characters.
pub const QTH_LIMIT: usize = 56;
/// HAMLOG truncates the Remarks2 column beyond this many characters.
pub const QSL_LIMIT: usize = 54;

/// Expands the session QSL message for one QSO.
///
/// Supported macros: `$sat` becomes `via <OSCAR>` when a satellite was
/// logged in the remarks, `$rig` appends a `Rig=<band><ant><set>` tag.
/// `$mywwff`/`$mysota`/`$mypota` are substituted earlier, when the
/// `qslmsg` directive is read.
pub fn compose_qsl_msg(rec: &QsoRecord) -> QslParts {
    let mut freq = if !rec.freq.is_empty() {
        rec.freq.replace("MHz", "")
    } else {
        freq_of(&rec.band_wlen, BandVariant::Air)
            .unwrap_or("")
            .replace("MHz", "")
    };

    let mut hisref: Vec<String> = Vec::new();
    if !rec.refs.his.sota.is_empty() {
        hisref.push(rec.refs.his.sota.clone());
    }
    if !rec.refs.his.wwff.is_empty() {
        hisref.push(rec.refs.his.wwff.join(","));
    }
    if !rec.refs.his.pota.is_empty() {
        hisref.push(rec.refs.his.pota.join(","));
    }

    let refs = extract_refs(&rec.rmks1);

    let mut msg = rec.qsl_msg.clone();
    let antsat = if !refs.sat_name.is_empty() {
        msg = msg.replace("$sat", &format!("via {}", refs.sat_name));
        "STS"
    } else {
        msg = msg.replace("$sat", "");
        "ST"
    };
    if !refs.sat_down.is_empty() {
        freq.push('/');
        freq.push_str(&refs.sat_down.replace("MHz", ""));
    }

    let rig = if msg.contains("$rig") {
        msg = msg.replace("$rig", "");
        let mut rig = format!("Rig={}{}", rec.band_wlen, antsat);
        if rec.rigset > 0 {
            rig.push_str(&rec.rigset.to_string());
        }
        rig
    } else {
        String::new()
    };

    let qth = format!("{} {}", refs.other, hisref.join(","))
        .trim()
        .to_string();
    let qsl = format!("%{msg}%{rig}");

    QslParts {
        refs,
        freq,
        qth,
        qsl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec() -> QsoRecord {
        QsoRecord {
            freq: "14.062".to_string(),
            band_wlen: "20m".to_string(),
            qsl_msg: "tnx fb qso $rig".to_string(),
            ..QsoRecord::default()
        }
    }

    #[test]
    fn rig_macro_expands_band_and_set() {
        let mut r = rec();
        r.rigset = 2;
        let parts = compose_qsl_msg(&r);
        assert_eq!(parts.qsl, "%tnx fb qso %Rig=20mST2");
        assert_eq!(parts.freq, "14.062");
    }

    #[test]
    fn sat_macro_uses_oscar_and_downlink() {
        let mut r = rec();
        r.qsl_msg = "$sat tnx $rig".to_string();
        r.rmks1 = "AO-91/V/U".to_string();
        let parts = compose_qsl_msg(&r);
        assert!(parts.qsl.starts_with("%via AO-91 tnx %Rig=20mSTS"));
        assert_eq!(parts.freq, "14.062/U");
    }

    #[test]
    fn qth_joins_residual_text_and_his_refs() {
        let mut r = rec();
        r.rmks1 = "Mt.Fuji".to_string();
        r.refs.his.sota = "JA/TK-001".to_string();
        r.refs.his.pota = vec!["JA-0014".to_string()];
        let parts = compose_qsl_msg(&r);
        assert_eq!(parts.qth, "Mt.Fuji JA/TK-001,JA-0014");
    }

    #[test]
    fn band_seeds_frequency_when_raw_freq_missing() {
        let mut r = rec();
        r.freq.clear();
        let parts = compose_qsl_msg(&r);
        assert_eq!(parts.freq, "14");
    }
}
