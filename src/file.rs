use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};

use crate::{
    error::Error,
    graph::FileGraph,
    imports::{Import, ImportTable},
    naming::NameCase,
    render::ContentNode,
    resolve::{Namespace, NamespaceTable, Resolved, ResolveOptions},
};

/// The marker inserted into generated file names, so generated output
/// is recognizable next to handwritten files.
pub const GENERATED_MARKER: &str = "gen";

const EXTENSION: &str = "ts";

/// The separator between serialized sections of a file.
const SECTION_SEPARATOR: &str = "\n\n";

/// One output file under composition.
///
/// A file accumulates content nodes in append order, allocates
/// identifiers out of its own `type` and `value` namespaces, and
/// tracks the imports its content needs. At the end of a run it is
/// flushed exactly once: written if it has content, deleted if it
/// ended up empty.
#[derive(Debug)]
pub struct GeneratedFile {
    name: String,
    directory: String,
    headers: Vec<String>,
    content: Vec<ContentNode>,
    types: NamespaceTable,
    values: NamespaceTable,
    imports: ImportTable,
    export_from_index: bool,
    identifier_case: NameCase,
}

impl GeneratedFile {
    /// Creates an empty file with the given directory and logical name
    /// (pre-extension).
    pub fn new(directory: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            headers: Vec::new(),
            content: Vec::new(),
            types: NamespaceTable::new(Namespace::Type),
            values: NamespaceTable::new(Namespace::Value),
            imports: ImportTable::default(),
            export_from_index: false,
            identifier_case: NameCase::default(),
        }
    }

    /// Sets the naming convention applied during identifier
    /// allocation.
    pub fn with_case(mut self, case: NameCase) -> Self {
        self.identifier_case = case;
        self
    }

    /// Sets the banner lines emitted at the top of the file.
    pub fn with_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Self {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Surfaces this file's exports in the aggregating barrel file.
    pub fn with_index_export(mut self) -> Self {
        self.export_from_index = true;
        self
    }

    /// Whether this file's exports surface in the barrel file.
    #[inline]
    pub fn export_from_index(&self) -> bool {
        self.export_from_index
    }

    // MARK: Paths

    /// The logical `/`-delimited path (directory plus name, no
    /// extension), used for relative path computation.
    pub fn logical_path(&self) -> String {
        let directory = self.directory.trim_matches('/');
        if directory.is_empty() {
            self.name.clone()
        } else {
            format!("{directory}/{}", self.name)
        }
    }

    /// The on-disk file name.
    ///
    /// Generated files carry the generation marker before the
    /// extension; anything named like an index barrel passes through
    /// unchanged, preserving conventional barrel-file naming.
    pub fn file_name(&self) -> String {
        if self.name.contains("index") {
            format!("{}.{EXTENSION}", self.name)
        } else {
            format!("{}.{GENERATED_MARKER}.{EXTENSION}", self.name)
        }
    }

    /// The file's path relative to the output root.
    pub fn path(&self) -> PathBuf {
        Path::new(self.directory.trim_matches('/')).join(self.file_name())
    }

    /// Computes the `/`-delimited relative import path from this file
    /// to the target, without a trailing extension.
    pub fn relative_path_to(&self, graph: &FileGraph, target_id: &str) -> Result<String, Error> {
        let to = graph.resolve_path(target_id)?;
        Ok(crate::graph::relative_path(&self.logical_path(), &to))
    }

    // MARK: Content

    /// Appends content nodes. Order is preserved and significant:
    /// serialization is append order. No deduplication.
    pub fn add_content<I>(&mut self, nodes: I)
    where
        I: IntoIterator,
        I::Item: Into<ContentNode>,
    {
        self.content.extend(nodes.into_iter().map(Into::into));
    }

    /// Pops the most recently added content node: the undo for
    /// speculative content a caller decided to discard.
    pub fn remove_last_node(&mut self) -> Option<ContentNode> {
        self.content.pop()
    }

    /// True iff the content sequence has zero entries. Headers and
    /// imports don't count.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    // MARK: Identifiers

    fn namespace_mut(&mut self, namespace: Namespace) -> &mut NamespaceTable {
        match namespace {
            Namespace::Type => &mut self.types,
            Namespace::Value => &mut self.values,
        }
    }

    /// Allocates (or returns the existing) identifier for a reference
    /// in one of this file's namespaces, using the file's configured
    /// naming convention.
    pub fn allocate_identifier(&mut self, namespace: Namespace, reference: &str) -> Resolved {
        let case = self.identifier_case;
        self.namespace_mut(namespace).resolve(
            reference,
            ResolveOptions {
                case,
                create: true,
                transform: None,
            },
        )
    }

    /// Like [`allocate_identifier`](Self::allocate_identifier), with a
    /// transformation applied to the base name before casing.
    pub fn allocate_identifier_with(
        &mut self,
        namespace: Namespace,
        reference: &str,
        transform: &dyn Fn(&str) -> String,
    ) -> Resolved {
        let case = self.identifier_case;
        self.namespace_mut(namespace).resolve(
            reference,
            ResolveOptions {
                case,
                create: true,
                transform: Some(transform),
            },
        )
    }

    /// Probes whether a reference already resolves, without
    /// allocating.
    pub fn probe_identifier(&mut self, namespace: Namespace, reference: &str) -> Resolved {
        let case = self.identifier_case;
        self.namespace_mut(namespace).resolve(
            reference,
            ResolveOptions {
                case,
                create: false,
                transform: None,
            },
        )
    }

    /// Blocks a reference from ever being generated in the given
    /// namespace. Fails if the reference was never allocated.
    pub fn block_identifier(&mut self, namespace: Namespace, reference: &str) -> Result<(), Error> {
        self.namespace_mut(namespace).block(reference)
    }

    // MARK: Imports

    /// Registers (or reuses) an import. Returns the name the symbol
    /// is visible under inside this file.
    pub fn import_symbol(&mut self, import: Import) -> String {
        self.imports.insert(import)
    }

    // MARK: Serialization

    /// Renders the file: headers (joined by newline), then one import
    /// statement per module in first-registration order, then each
    /// content node, all joined by `separator`.
    pub fn serialize(&self, separator: &str) -> String {
        let mut sections = Vec::new();
        if !self.headers.is_empty() {
            sections.push(self.headers.join("\n"));
        }
        sections.extend(self.imports.statements());
        sections.extend(self.content.iter().map(|node| node.render().into_owned()));
        sections.join(separator)
    }

    /// Writes the serialized file under `output`, or deletes any
    /// previously written artifact if the file ended up empty.
    pub fn flush(&self, output: &Path) -> miette::Result<()> {
        let path = output.join(self.path());
        if self.is_empty() {
            return match std::fs::remove_file(&path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err)
                    .into_diagnostic()
                    .with_context(|| format!("Failed to remove `{}`", path.display())),
                _ => Ok(()),
            };
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
        }
        let mut serialized = self.serialize(SECTION_SEPARATOR);
        serialized.push('\n');
        std::fs::write(&path, serialized)
            .into_diagnostic()
            .with_context(|| format!("Failed to write `{}`", path.display()))
    }
}
