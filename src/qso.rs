//! Canonical QSO record shared by every decoder and exporter.

use serde::{Deserialize, Serialize};

use crate::types::SotaMode;

/// Award references held by one side of a contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefSet {
    /// SOTA summit reference, empty when absent.
    pub sota: String,
    /// WWFF references.
    pub wwff: Vec<String>,
    /// POTA references.
    pub pota: Vec<String>,
}

/// References for the logging station and the contacted station.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QsoRefs {
    /// Logging station ("my") references.
    pub my: RefSet,
    /// Contacted station ("his") references.
    pub his: RefSet,
}

/// Field-level taint markers. Empty means the field decoded cleanly;
/// otherwise the string is the rendered diagnostic substituted for the
/// field on export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldErrors {
    /// Malformed date column.
    pub date: String,
    /// Malformed time column.
    pub time: String,
    /// Frequency outside every known band.
    pub band: String,
}

/// Normalized contact record. Created once per decoded line, never
/// mutated by exporters. A tainted record still carries best-effort
/// values in every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QsoRecord {
    /// Contacted station callsign as logged, upper-cased.
    pub callsign: String,
    /// Base callsign after splitting a portable suffix.
    pub operator: String,
    /// Portable designator, empty when absent.
    pub portable: String,
    /// Logging station callsign (FLE sessions only).
    pub my_call: String,
    /// Logging station operator (FLE sessions only).
    pub my_operator: String,
    /// Local timestamp with offset, RFC 3339.
    pub iso_time: String,
    /// UTC year.
    pub year: i32,
    /// UTC month.
    pub month: u32,
    /// UTC day.
    pub day: u32,
    /// UTC hour.
    pub hour: u32,
    /// UTC minute.
    pub minute: u32,
    /// Source timezone rendered as `+HHMM`.
    pub timezone: String,
    /// Sent signal report, raw.
    pub rst_sent: String,
    /// Received signal report, raw.
    pub rst_rcvd: String,
    /// Raw frequency string.
    pub freq: String,
    /// Air-band name.
    pub band_air: String,
    /// SOTA band name.
    pub band_sota: String,
    /// Wavelength-class band name.
    pub band_wlen: String,
    /// Mode exactly as logged, before normalization.
    pub mode_raw: String,
    /// ADIF mode family.
    pub mode: String,
    /// ADIF sub mode, empty when the mode is its own family.
    pub sub_mode: String,
    /// AirHam mode label.
    pub mode_airham: String,
    /// SOTA mode family.
    pub mode_sota: SotaMode,
    /// QSL exchange code column.
    pub code: String,
    /// Grid locator column.
    pub grid: String,
    /// QSL via-method label.
    pub qsl_via: String,
    /// QSL sent marker.
    pub qsl_sent: String,
    /// QSL received marker.
    pub qsl_rcvd: String,
    /// Contacted operator name.
    pub name: String,
    /// Contacted station QTH text.
    pub qth: String,
    /// Free-text remarks column 1.
    pub rmks1: String,
    /// Free-text remarks column 2.
    pub rmks2: String,
    /// Contest serial sent to the contacted station.
    pub his_num: String,
    /// Contest serial received from the contacted station.
    pub my_num: String,
    /// Session QSL message (FLE sessions only).
    pub qsl_msg: String,
    /// Rig set number (FLE sessions only).
    pub rigset: u32,
    /// Extracted award references.
    pub refs: QsoRefs,
    /// Per-field taint markers.
    pub errors: FieldErrors,
    /// True when any field failed to decode.
    pub error: bool,
    /// Aggregate diagnostic message.
    pub errormsg: String,
}

impl Default for QsoRecord {
    fn default() -> Self {
        Self {
            callsign: String::new(),
            operator: String::new(),
            portable: String::new(),
            my_call: String::new(),
            my_operator: String::new(),
            iso_time: String::new(),
            year: 1900,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            timezone: "+0000".to_string(),
            rst_sent: String::new(),
            rst_rcvd: String::new(),
            freq: String::new(),
            band_air: String::new(),
            band_sota: String::new(),
            band_wlen: String::new(),
            mode_raw: String::new(),
            mode: String::new(),
            sub_mode: String::new(),
            mode_airham: String::new(),
            mode_sota: SotaMode::Other,
            code: String::new(),
            grid: String::new(),
            qsl_via: String::new(),
            qsl_sent: String::new(),
            qsl_rcvd: String::new(),
            name: String::new(),
            qth: String::new(),
            rmks1: String::new(),
            rmks2: String::new(),
            his_num: String::new(),
            my_num: String::new(),
            qsl_msg: String::new(),
            rigset: 0,
            refs: QsoRefs::default(),
            errors: FieldErrors::default(),
            error: false,
            errormsg: String::new(),
        }
    }
}

impl QsoRecord {
    /// Date rendered as `YYYYMMDD`.
    pub fn date_compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    /// Time rendered as `HHMM`.
    pub fn time_compact(&self) -> String {
        format!("{:02}{:02}", self.hour, self.minute)
    }
}

/// Renders a malformed field value for annotated output.
pub fn err_markup(value: &str) -> String {
    format!("<font color=\"red\"><b>{value}</b></font>")
}
