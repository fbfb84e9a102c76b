//! Package selection.
//!
//! A candidate matches when every descriptor attribute equals the candidate's
//! setting of the same name. The compiler triple is compared through
//! [`CompilerSettings`](buildenv_schema::CompilerSettings), so compiler-agnostic
//! shared packages satisfy any compiler, version and standard library.

use buildenv_schema::{BuildDescriptor, CandidatePackage, PackageHash};

/// Whether `candidate` was built for `descriptor`.
pub fn matches(descriptor: &BuildDescriptor, candidate: &CandidatePackage) -> bool {
    let settings = &candidate.settings;
    settings.compiler_settings().accepts(descriptor)
        && descriptor
            .attributes()
            .filter(|(attribute, _)| !attribute.is_compiler())
            .all(|(attribute, value)| settings.attribute(attribute) == Some(value))
}

/// Hash of the first candidate, in repository order, that matches `descriptor`.
pub fn select(
    descriptor: &BuildDescriptor,
    candidates: &[CandidatePackage],
) -> Option<PackageHash> {
    candidates
        .iter()
        .find(|c| matches(descriptor, c))
        .map(|c| c.hash.clone())
}
