//! Ranking for strictly dotted-numeric version sets.

use crate::resolver::version::NumericVersion;

/// Return the numerically greatest version.
///
/// Equal versions with different spellings (`1.2` vs `1.02`) are broken by
/// the original text so the result does not depend on input order.
pub fn rank_numeric(versions: &[NumericVersion]) -> Option<&NumericVersion> {
    versions
        .iter()
        .max_by(|a, b| a.cmp(b).then_with(|| a.as_str().cmp(b.as_str())))
}
