use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::fields::FieldData;
use crate::idcache::IdAllocator;
use crate::{parse, render, FormgenError};

/// Per-run statistics returned by a successful generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Distinct field names consumed during the run.
    pub fields: usize,
    /// Ids newly minted during the run (zero on an unchanged regeneration).
    pub minted: u32,
}

/// Converts definition files into form files, keeping field ids stable
/// through a per-form cache file.
///
/// The field-data provider is injected at construction. One generator runs
/// files strictly in sequence; parallel callers must construct independent
/// generators with disjoint output directories.
#[derive(Debug)]
pub struct Generator<P: FieldData> {
    data: P,
    out_dir: PathBuf,
    alloc: IdAllocator,
}

impl<P: FieldData> Generator<P> {
    #[must_use]
    pub fn new(data: P, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            data,
            out_dir: out_dir.into(),
            alloc: IdAllocator::new(),
        }
    }

    /// Convert one definition file. Effects, in order: reset the allocator,
    /// load `<out_dir>/<stem>.cache` (absence tolerated), parse and render,
    /// and only on success write `<stem>.form` followed by the cache flush.
    /// Any failure leaves both output files untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FormgenError`] wrapping the parse, generation, cache, or
    /// I/O failure; the file's prior outputs are not modified.
    pub fn generate(&mut self, path: impl AsRef<Path>) -> Result<GenerateSummary, FormgenError> {
        let path = path.as_ref();
        self.alloc.reset();

        let (form_path, cache_path) = self.output_paths(path)?;
        self.alloc.load(&cache_path)?;

        let input = fs::read_to_string(path)?;
        let def = parse::parse(&input)?;
        for w in &def.warnings {
            warn!(
                file = %path.display(),
                line = w.line,
                block = %w.token,
                "unknown block type, line skipped"
            );
        }

        let counter_before = self.alloc.next_id();
        let output = render::render(&def, &self.data, &mut self.alloc)?;

        fs::create_dir_all(&self.out_dir)?;
        fs::write(&form_path, output)?;
        self.alloc.flush(&cache_path)?;

        let summary = GenerateSummary {
            fields: self.alloc.fields_used(),
            minted: self.alloc.next_id() - counter_before,
        };
        info!(
            file = %path.display(),
            fields = summary.fields,
            minted = summary.minted,
            "form generated"
        );
        Ok(summary)
    }

    /// Convert a batch of definition files. A failing file is logged and
    /// abandoned; the remaining files still run. Returns the failure count.
    pub fn generate_all<I, Q>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<Path>,
    {
        let mut failures = 0;
        for path in paths {
            let path = path.as_ref();
            if let Err(e) = self.generate(path) {
                error!(file = %path.display(), error = %e, "generation abandoned");
                failures += 1;
            }
        }
        failures
    }

    fn output_paths(&self, input: &Path) -> Result<(PathBuf, PathBuf), FormgenError> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "definition path has no usable file name",
                )
            })?;
        Ok((
            self.out_dir.join(format!("{stem}.form")),
            self.out_dir.join(format!("{stem}.cache")),
        ))
    }
}
