use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{error::Error, file::GeneratedFile};

/// All generated files for one run.
///
/// The graph is the sole owner of every file it creates; callers
/// borrow. Files are kept in creation order, which makes the final
/// flush (and everything else that iterates the graph) deterministic
/// across runs.
#[derive(Debug, Default)]
pub struct FileGraph {
    files: IndexMap<String, GeneratedFile>,
}

impl FileGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a file by id. Never creates.
    pub fn file(&self, id: &str) -> Option<&GeneratedFile> {
        self.files.get(id)
    }

    /// Looks up a file by id for mutation. Never creates.
    pub fn file_mut(&mut self, id: &str) -> Option<&mut GeneratedFile> {
        self.files.get_mut(id)
    }

    /// Returns the file for `id`, creating it on first request.
    pub fn entry(
        &mut self,
        id: impl Into<String>,
        init: impl FnOnce() -> GeneratedFile,
    ) -> &mut GeneratedFile {
        self.files.entry(id.into()).or_insert_with(init)
    }

    /// Iterates all files in creation order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &GeneratedFile)> {
        self.files.iter().map(|(id, file)| (id.as_str(), file))
    }

    /// Resolves a file id to its logical path.
    ///
    /// Ids with a leading `.` are filesystem paths outside the graph,
    /// resolved lexically against the current working directory.
    /// Anything else must name a file owned by this graph.
    pub fn resolve_path(&self, id: &str) -> Result<String, Error> {
        if id.starts_with('.') {
            let cwd = std::env::current_dir().unwrap_or_default();
            return Ok(normalize(&format!("{}/{id}", cwd.display())));
        }
        self.files
            .get(id)
            .map(GeneratedFile::logical_path)
            .ok_or_else(|| Error::FileDoesNotExist(id.to_owned()))
    }

    /// Appends one `export * from "…";` re-export statement to the
    /// barrel file `id` for every file flagged for index export, in
    /// creation order. The barrel itself and files with no content are
    /// skipped.
    pub fn render_index(&mut self, id: &str) -> Result<(), Error> {
        let Some(barrel) = self.files.get(id) else {
            return Err(Error::FileDoesNotExist(id.to_owned()));
        };
        let from = barrel.logical_path();

        let statements = self
            .files
            .iter()
            .filter(|(other, file)| {
                other.as_str() != id && file.export_from_index() && !file.is_empty()
            })
            .map(|(_, file)| {
                let target = relative_path(&from, &file.logical_path());
                format!("export * from \"{target}\";")
            })
            .collect_vec();

        let Some(barrel) = self.files.get_mut(id) else {
            return Err(Error::FileDoesNotExist(id.to_owned()));
        };
        barrel.add_content(statements);
        Ok(())
    }

    /// Flushes every file: non-empty files are written under `output`,
    /// files that ended up empty have any stale artifact removed.
    /// Stops at the first failure; no partial-success mode.
    pub fn flush(&self, output: &Path) -> miette::Result<()> {
        for file in self.files.values() {
            file.flush(output)?;
        }
        Ok(())
    }
}

/// Computes the relative `/`-delimited path from one logical file path
/// to another, without extensions.
///
/// The segment sequences are compared from the root; at the first
/// divergence, the remaining segments on the `from` side (minus the
/// file name itself) become `../` climbs and the remaining `to`
/// segments become the descent. With nothing to climb, the path gets
/// a `./` prefix.
pub(crate) fn relative_path(from: &str, to: &str) -> String {
    let from = from.split('/').filter(|s| !s.is_empty()).collect_vec();
    let to = to.split('/').filter(|s| !s.is_empty()).collect_vec();

    let shared = from
        .iter()
        .zip(&to)
        .take_while(|(from, to)| from == to)
        .count();

    let climbs = from.len().saturating_sub(shared + 1);
    let mut path = if climbs == 0 {
        "./".to_owned()
    } else {
        "../".repeat(climbs)
    };
    path.push_str(&to[shared.min(to.len())..].join("/"));
    path
}

/// Lexically normalizes a `/`-joined path: strips `.` segments and
/// resolves `..` against the segments before it.
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
