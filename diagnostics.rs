/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Side-channel diagnostics (§7 "Propagation policy... Diagnostics go to a
//! side channel"). Layout never returns an error; a handful of named
//! emission points cover every recoverable condition named in §4.12/§7 so
//! that tests can assert on them without layout itself becoming fallible.

/// One non-fatal condition recovered locally during layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A resource (font, image, text) could not be fetched or decoded;
    /// the element degrades to zero size or the fallback font is used.
    MissingResource { url: String },
    /// The font cascade failed entirely; fell back to the platform serif.
    FontCascadeExhausted,
    /// A percent height could not resolve against an indefinite
    /// containing block and was treated as `none`.
    UnresolvedPercentHeight,
    /// `evaluate_media_feature` was asked about a feature the style engine
    /// does not know; treated as `false`.
    UnknownMediaFeature { name: String },
    /// Multi-column balancing reached `max_column_balance_iterations`
    /// without a non-positive space shortage; the last candidate height
    /// was used (§7 "Layout saturation").
    ColumnBalanceIterationCapReached,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingResource { url } => write!(f, "resource unavailable, degrading: {url}"),
            Diagnostic::FontCascadeExhausted => write!(f, "font cascade exhausted, falling back to platform serif"),
            Diagnostic::UnresolvedPercentHeight => write!(f, "percent height unresolved against indefinite containing block"),
            Diagnostic::UnknownMediaFeature { name } => write!(f, "unknown media feature, treating as false: {name}"),
            Diagnostic::ColumnBalanceIterationCapReached => write!(f, "column balancing hit its iteration cap"),
        }
    }
}

/// Logs `diagnostic` through the `log` facade at `warn` level, matching
/// the teacher crate's own use of `log::warn!` for recovered conditions.
pub fn report(diagnostic: &Diagnostic) {
    log::warn!("{diagnostic}");
}
