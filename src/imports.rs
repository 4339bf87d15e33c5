use indexmap::IndexMap;
use itertools::Itertools;

/// A request to import a named symbol into a generated file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Import {
    /// The module path the symbol comes from.
    pub module: String,
    /// The exported name of the symbol.
    pub name: String,
    /// An optional local alias (`import { name as alias }`).
    pub alias: Option<String>,
    /// Whether the symbol is only used in type positions.
    pub type_only: bool,
}

impl Import {
    /// Creates a plain named import.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    /// Imports the symbol under a local alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Marks the symbol as only used in type positions.
    pub fn type_only(mut self) -> Self {
        self.type_only = true;
        self
    }
}

/// One registered import.
#[derive(Clone, Debug, Eq, PartialEq)]
struct ImportEntry {
    name: String,
    alias: Option<String>,
    type_only: bool,
}

impl ImportEntry {
    /// The name the symbol is visible under inside the file.
    fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The deduplicating import table for one generated file.
///
/// Modules render in first-registration order, and so do the symbols
/// within each module. Registering the same `(module, name)` pair
/// twice reuses the first entry, alias and all, so a symbol is never
/// imported twice from the same module no matter how many unrelated
/// callers request it.
#[derive(Debug, Default)]
pub struct ImportTable {
    modules: IndexMap<String, IndexMap<String, ImportEntry>>,
}

impl ImportTable {
    /// Registers an import, or reuses the existing entry for the same
    /// `(module, name)` pair. Returns the name the symbol is visible
    /// under inside the file: the alias if one is set, the exported
    /// name otherwise.
    pub fn insert(&mut self, import: Import) -> String {
        let entries = self.modules.entry(import.module).or_default();
        let entry = entries
            .entry(import.name.clone())
            .or_insert_with(|| ImportEntry {
                name: import.name,
                alias: import.alias,
                type_only: import.type_only,
            });
        entry.effective_name().to_owned()
    }

    /// True if no imports have been registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Renders one import statement per module, in first-registration
    /// order.
    ///
    /// When every symbol requested from a module is type-only, the
    /// whole statement is hoisted to `import type`; otherwise the
    /// type-only symbols carry an inline `type` marker.
    pub fn statements(&self) -> impl Iterator<Item = String> + '_ {
        self.modules.iter().map(|(module, entries)| {
            let hoisted = entries.values().all(|entry| entry.type_only);
            let keyword = if hoisted { "import type" } else { "import" };
            let specifiers = entries
                .values()
                .map(|entry| render_specifier(entry, hoisted))
                .join(", ");
            format!("{keyword} {{ {specifiers} }} from \"{module}\";")
        })
    }
}

fn render_specifier(entry: &ImportEntry, hoisted: bool) -> String {
    let mut specifier = String::new();
    if entry.type_only && !hoisted {
        specifier.push_str("type ");
    }
    specifier.push_str(&entry.name);
    if let Some(alias) = &entry.alias {
        specifier.push_str(" as ");
        specifier.push_str(alias);
    }
    specifier
}
