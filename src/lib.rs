//! Amateur-radio log conversion: an FLE-style session compiler plus
//! exporters from HAMLOG/iOS/ADIF logs to SOTA, POTA, WWFF, AirHam and
//! contest upload formats.
//!
//! # Examples
//!
//! Compiling a session and inspecting the report:
//! ```
//! use hamlogconv::{fle::compile, report::interp};
//!
//! let input = "date 2024-05-01\n\
//!              mycall JA1ABC/1\n\
//!              mysota JA/TK-001\n\
//!              0120 14 cw jh1xyz 599 579\n";
//! let out = compile(input);
//! assert!(out.diags.is_empty());
//! let report = interp(input, &out);
//! assert_eq!(report.logtype, "SOTA");
//! assert_eq!(report.logtext.len(), 1);
//! ```
//!
//! Generating the download bundle for the same session:
//! ```
//! use hamlogconv::{export::generate_bundle, fle::compile};
//!
//! let input = "date 2024-05-01\n\
//!              mycall JA1ABC/1\n\
//!              mysota JA/TK-001\n\
//!              0120 14 cw jh1xyz 599 579\n";
//! let out = compile(input);
//! let files = generate_bundle(input, &out, "2024-05-01-01-20").expect("bundle");
//! assert!(files.contains("sota20240501.csv"));
//! ```
#![deny(missing_docs)]

/// Callsign splitting and validation.
pub mod call;
/// Source-format decoders into the canonical record.
pub mod decode;
/// Exporters from canonical records to upload files.
pub mod export;
/// FLE session lexer and compiler.
pub mod fle;
/// POTA park-to-location resolution.
pub mod parks;
/// Canonical QSO record.
pub mod qso;
/// Free-text reference extraction.
pub mod refs;
/// Interpreter and conversion reports.
pub mod report;
/// Band, mode and zone lookup tables.
pub mod tables;
/// Shared primitive types and diagnostics.
pub mod types;
