//! Shared enums and diagnostic primitives.

use serde::{Deserialize, Serialize};

/// SOTA mode family bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SotaMode {
    /// Continuous Wave.
    CW,
    /// Single side-band phone.
    SSB,
    /// Frequency modulation phone.
    FM,
    /// Amplitude modulation phone.
    AM,
    /// Keyboard/digital data modes.
    DATA,
    /// Digital voice modes.
    DV,
    /// Anything unrecognized.
    Other,
}

impl SotaMode {
    /// Label written to SOTA CSV rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            SotaMode::CW => "CW",
            SotaMode::SSB => "SSB",
            SotaMode::FM => "FM",
            SotaMode::AM => "AM",
            SotaMode::DATA => "DATA",
            SotaMode::DV => "DV",
            SotaMode::Other => "OTHER",
        }
    }
}

/// Signal-report rendering family for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RstStyle {
    /// Three digit readability/strength/tone.
    Rst,
    /// Two digit readability/strength.
    Rs,
    /// Signed dB signal-to-noise report.
    Snr,
}

/// Band-name variant used by the reverse frequency lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandVariant {
    /// Air-band label, e.g. `7MHz`.
    Air,
    /// SOTA label, e.g. `7MHz`/`3.5MHz`.
    Sota,
}

/// Which free-text field supplies a QTH/reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemarkSlot {
    /// Remarks column 1.
    Rmks1,
    /// Remarks column 2.
    Rmks2,
    /// The QTH column itself.
    Qth,
    /// Caller-supplied fixed text.
    UserDefined,
    /// No QTH output.
    #[default]
    None,
}

/// Positioned per-line diagnostic. Diagnostics accumulate; they never
/// abort processing of the rest of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diag {
    /// Zero-based input line number.
    pub line: usize,
    /// Token position within the line.
    pub pos: usize,
    /// Human readable message.
    pub message: String,
}

impl Diag {
    /// Constructs a diagnostic for `line` at token `pos`.
    pub fn new(line: usize, pos: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            pos,
            message: message.into(),
        }
    }
}

/// Returns the first diagnostic message registered for `line`, if any.
pub fn find_diag(line: usize, diags: &[Diag]) -> Option<&str> {
    diags
        .iter()
        .find(|d| d.line == line)
        .map(|d| d.message.as_str())
}

/// Safety ceiling applied to every decode loop.
pub const MAX_INPUT_LINES: usize = 100_000;
