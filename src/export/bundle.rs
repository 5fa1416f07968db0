//! Download bundle assembly for compiled FLE sessions.

use crate::fle::Compilation;
use crate::report::annotate_errors;

use super::adif::fle_adif;
use super::airham::fle_airham;
use super::hamlog::fle_hamlog;
use super::sota::fle_sota;
use super::zlog::fle_zlog;
use super::{Artifacts, ExportError};

/// Builds the full download set for a compiled session.
///
/// A session with diagnostics yields a single `fle-error-<stamp>.txt`
/// echoing the input with the errors annotated. A clean session yields
/// the original text, HAMLOG and AirHam CSVs, plus SOTA CSVs, WWFF/POTA
/// ADIF files and a contest log as the session directives demand. With
/// no award directives at all the SOTA CSV is still produced as the
/// default chaser format.
pub fn generate_bundle(
    input: &str,
    out: &Compilation,
    stamp: &str,
) -> Result<Artifacts, ExportError> {
    let mut files = Artifacts::new();

    if !out.diags.is_empty() {
        files.insert(
            format!("fle-error-{stamp}.txt"),
            annotate_errors(input, &out.diags),
        );
        return Ok(files);
    }

    let name = out.session.bundle_name();
    files.insert(format!("fle-{name}.txt"), input);
    files.insert(format!("hamlog-{name}.csv"), fle_hamlog(&out.qsos)?);
    files.insert(
        format!("airham-{name}.csv"),
        fle_airham(&out.qsos, &out.session.qsl_msg)?,
    );

    if out.flags.sota {
        fle_sota(&mut files, &out.qsos)?;
    }
    if out.flags.wwff {
        fle_adif(
            &mut files,
            &out.qsos,
            &out.session.my_call,
            "WWFF",
            &out.session.my_wwff,
        )?;
    }
    if out.flags.pota {
        for park in &out.session.my_pota {
            fle_adif(&mut files, &out.qsos, &out.session.my_call, "POTA", park)?;
        }
    }
    if !out.flags.sota && !out.flags.wwff && !out.flags.pota {
        fle_sota(&mut files, &out.qsos)?;
    }
    if out.flags.contest {
        fle_zlog(&mut files, &out.qsos)?;
    }

    Ok(files)
}
