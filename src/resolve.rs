use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    error::Error,
    naming::{NameCase, apply_case, sanitize},
};

/// One of the two identifier pools in a generated file.
///
/// Type and value identifiers never collide with each other, even for
/// the same base name: `Pet` the type declaration and `Pet` the schema
/// constant can coexist in one file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Namespace {
    /// Type declarations.
    Type,
    /// Runtime values.
    Value,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Type => "type",
            Self::Value => "value",
        })
    }
}

/// The name held by an identifier record.
#[derive(Clone, Debug, Eq, PartialEq)]
enum RecordName {
    /// An allocated identifier.
    Ident(String),
    /// The poison marker left by [`NamespaceTable::block`]: the
    /// reference is suppressed from ever being generated. Distinct
    /// from "not yet allocated", which has no record at all.
    Blocked,
}

/// The identifier record for one schema reference. Created on first
/// successful allocation, rewritten to [`RecordName::Blocked`] only by
/// explicit blocking, never deleted.
#[derive(Debug)]
struct IdentRecord {
    reference: String,
    name: RecordName,
}

/// The outcome of a [`NamespaceTable::resolve`] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolved {
    /// Whether this call allocated the name.
    pub created: bool,
    /// The resolved name, if any.
    pub name: ResolvedName,
}

impl Resolved {
    fn existing(name: &RecordName) -> Self {
        Self {
            created: false,
            name: match name {
                RecordName::Ident(name) => ResolvedName::Ident(name.clone()),
                RecordName::Blocked => ResolvedName::Blocked,
            },
        }
    }

    fn unresolved() -> Self {
        Self {
            created: false,
            name: ResolvedName::Unresolved,
        }
    }
}

/// The name component of a [`Resolved`] outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolvedName {
    /// A usable identifier.
    Ident(String),
    /// No name: the reference has an empty final segment, or this was
    /// a dry-run probe for an unallocated reference.
    Unresolved,
    /// The reference is blocked from ever being generated.
    Blocked,
}

impl ResolvedName {
    /// Returns the identifier, if one was resolved.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Options for a [`NamespaceTable::resolve`] call.
#[derive(Default)]
pub struct ResolveOptions<'a> {
    /// Naming convention applied to the candidate before collision
    /// checking.
    pub case: NameCase,
    /// Commit the allocation. When false, the call is a dry-run probe
    /// that never mutates the table.
    pub create: bool,
    /// Transformation applied to the base name before casing.
    pub transform: Option<&'a dyn Fn(&str) -> String>,
}

/// A dual-keyed identifier table for one namespace.
///
/// Both the schema reference and the final allocated name index the
/// same record, so lookups in either direction are O(1); the two keys
/// are committed together on allocation.
///
/// # Examples
///
/// ```
/// use plume::{Namespace, NamespaceTable, ResolveOptions, ResolvedName};
///
/// let mut types = NamespaceTable::new(Namespace::Type);
/// let options = || ResolveOptions { create: true, ..Default::default() };
///
/// let first = types.resolve("#/components/schemas/Pet", options());
/// assert!(first.created);
/// assert_eq!(first.name, ResolvedName::Ident("Pet".into()));
///
/// // A different reference with the same base name gets a suffix.
/// let second = types.resolve("#/components/parameters/Pet", options());
/// assert_eq!(second.name, ResolvedName::Ident("Pet2".into()));
/// ```
#[derive(Debug)]
pub struct NamespaceTable {
    namespace: Namespace,
    records: Vec<IdentRecord>,
    by_reference: FxHashMap<String, usize>,
    by_name: FxHashMap<String, usize>,
}

impl NamespaceTable {
    /// Creates an empty table for the given namespace.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            records: Vec::new(),
            by_reference: FxHashMap::default(),
            by_name: FxHashMap::default(),
        }
    }

    /// The namespace this table allocates into.
    #[inline]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Number of allocated identifiers (blocked records included).
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolves an identifier for a slash-delimited reference.
    ///
    /// The candidate base name is the final `/`-delimited segment of
    /// `reference`; an empty final segment is unresolvable and returns
    /// the [`Unresolved`](ResolvedName::Unresolved) sentinel without
    /// mutating the table. Resolving a reference that already has a
    /// record returns the existing record unchanged, so allocation is
    /// idempotent.
    ///
    /// When the cased candidate collides with a name held by another
    /// reference, a numeric suffix finds the next free name: the first
    /// holder keeps the bare name, the second conflicting reference
    /// gets `2`, the third `3`, and so on.
    pub fn resolve(&mut self, reference: &str, options: ResolveOptions<'_>) -> Resolved {
        let base = reference.rsplit('/').next().unwrap_or(reference);
        if base.is_empty() {
            return Resolved::unresolved();
        }

        if let Some(&index) = self.by_reference.get(reference) {
            return Resolved::existing(&self.records[index].name);
        }

        let raw = match options.transform {
            Some(transform) => transform(base),
            None => base.to_owned(),
        };
        let cased = apply_case(options.case, &raw);

        let mut count = 1usize;
        let candidate = loop {
            let candidate = if count > 1 {
                format!("{cased}{count}")
            } else {
                cased.clone()
            };
            match self.by_name.get(candidate.as_str()) {
                // Another transformation path already allocated this
                // exact pairing.
                Some(&index) if self.records[index].reference == reference => {
                    return Resolved::existing(&self.records[index].name);
                }
                Some(_) => count += 1,
                None => break candidate,
            }
        };

        if !options.create {
            return Resolved::unresolved();
        }

        let name = sanitize(&candidate);
        let index = self.records.len();
        self.records.push(IdentRecord {
            reference: reference.to_owned(),
            name: RecordName::Ident(name.clone()),
        });
        self.by_reference.insert(reference.to_owned(), index);
        self.by_name.insert(name.clone(), index);

        Resolved {
            created: true,
            name: ResolvedName::Ident(name),
        }
    }

    /// Blocks a reference from ever being generated.
    ///
    /// The reference must have been allocated first; blocking an
    /// unknown reference is a programmer error. The name-keyed reverse
    /// entry stays in place, so the old name remains reserved even
    /// though it no longer maps to a live reference.
    pub fn block(&mut self, reference: &str) -> Result<(), Error> {
        let Some(&index) = self.by_reference.get(reference) else {
            return Err(Error::IdentifierNotFound {
                reference: reference.to_owned(),
                namespace: self.namespace,
            });
        };
        self.records[index].name = RecordName::Blocked;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn create() -> ResolveOptions<'static> {
        ResolveOptions {
            create: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut table = NamespaceTable::new(Namespace::Type);

        let first = table.resolve("#/components/schemas/Pet", create());
        assert!(first.created);
        assert_eq!(first.name, ResolvedName::Ident("Pet".into()));

        let second = table.resolve("#/components/schemas/Pet", create());
        assert!(!second.created);
        assert_eq!(second.name, first.name);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_resolve_collision_suffixes() {
        let mut table = NamespaceTable::new(Namespace::Type);

        let first = table.resolve("#/components/schemas/Pet", create());
        let second = table.resolve("#/components/parameters/Pet", create());
        let third = table.resolve("#/components/responses/Pet", create());

        assert_eq!(first.name, ResolvedName::Ident("Pet".into()));
        // The second conflicting reference gets `2`, not `1`.
        assert_eq!(second.name, ResolvedName::Ident("Pet2".into()));
        assert_eq!(third.name, ResolvedName::Ident("Pet3".into()));
    }

    #[test]
    fn test_resolve_collision_after_casing() {
        let mut table = NamespaceTable::new(Namespace::Type);
        let options = || ResolveOptions {
            case: NameCase::Pascal,
            create: true,
            ..Default::default()
        };

        let first = table.resolve("#/components/schemas/pet_store", options());
        let second = table.resolve("#/components/schemas/PetStore", options());

        assert_eq!(first.name, ResolvedName::Ident("PetStore".into()));
        assert_eq!(second.name, ResolvedName::Ident("PetStore2".into()));
    }

    #[test]
    fn test_resolve_empty_final_segment() {
        let mut table = NamespaceTable::new(Namespace::Type);

        let resolved = table.resolve("#/components/schemas/", create());
        assert!(!resolved.created);
        assert_eq!(resolved.name, ResolvedName::Unresolved);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_resolve_dry_run_probe() {
        let mut table = NamespaceTable::new(Namespace::Type);

        let probed = table.resolve("#/components/schemas/Pet", ResolveOptions::default());
        assert!(!probed.created);
        assert_eq!(probed.name, ResolvedName::Unresolved);
        assert_eq!(table.len(), 0);

        // Probing an allocated reference returns the existing record.
        table.resolve("#/components/schemas/Pet", create());
        let probed = table.resolve("#/components/schemas/Pet", ResolveOptions::default());
        assert!(!probed.created);
        assert_eq!(probed.name, ResolvedName::Ident("Pet".into()));
    }

    #[test]
    fn test_resolve_applies_transform_before_casing() {
        let mut table = NamespaceTable::new(Namespace::Value);
        let transform = |name: &str| format!("{name}_schema");

        let resolved = table.resolve(
            "#/components/schemas/Pet",
            ResolveOptions {
                case: NameCase::Camel,
                create: true,
                transform: Some(&transform),
            },
        );
        assert_eq!(resolved.name, ResolvedName::Ident("petSchema".into()));
    }

    #[test]
    fn test_resolve_sanitizes_committed_name() {
        let mut table = NamespaceTable::new(Namespace::Value);

        let resolved = table.resolve("#/components/schemas/import", create());
        assert_eq!(resolved.name, ResolvedName::Ident("_import".into()));

        let resolved = table.resolve("#/components/schemas/404", create());
        assert_eq!(resolved.name, ResolvedName::Ident("_404".into()));
    }

    #[test]
    fn test_block_requires_existing_record() {
        let mut table = NamespaceTable::new(Namespace::Type);

        let err = table.block("#/components/schemas/Pet").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No identifier found for `#/components/schemas/Pet` in the `type` namespace",
        );
    }

    #[test]
    fn test_block_poisons_future_resolves() {
        let mut table = NamespaceTable::new(Namespace::Type);

        table.resolve("#/components/schemas/Pet", create());
        table.block("#/components/schemas/Pet").unwrap();

        let resolved = table.resolve("#/components/schemas/Pet", create());
        assert!(!resolved.created);
        assert_eq!(resolved.name, ResolvedName::Blocked);
    }

    #[test]
    fn test_block_leaves_name_reserved() {
        let mut table = NamespaceTable::new(Namespace::Type);

        table.resolve("#/components/schemas/Pet", create());
        table.block("#/components/schemas/Pet").unwrap();

        // The blocked record still owns `Pet`, so a fresh reference
        // with the same base name is pushed to the suffixed form.
        let resolved = table.resolve("#/components/parameters/Pet", create());
        assert_eq!(resolved.name, ResolvedName::Ident("Pet2".into()));
    }
}
