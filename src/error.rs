use crate::resolve::Namespace;

/// Errors raised by the composition core.
///
/// All of these indicate an inconsistency between the reference graph
/// and the files actually materialized, so the generation run stops at
/// the first one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reference was blocked before it was ever allocated.
    #[error("No identifier found for `{reference}` in the `{namespace}` namespace")]
    IdentifierNotFound {
        reference: String,
        namespace: Namespace,
    },

    /// A file id didn't resolve to any file in the graph.
    #[error("File `{0}` does not exist")]
    FileDoesNotExist(String),
}
