//! Converters backed by external programs.
//!
//! An external converter is any executable called as
//! `<program> <input> <output>`; exit status 0 means success.

use crate::converter::{ConvertError, Converter, ConverterDecl, Reference};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Environment variable naming an extra search root for converter programs.
pub const HOME_ENV: &str = "DTCONVERT_HOME";

/// System-wide install roots, searched after everything else.
const SYSTEM_ROOTS: &[&str] = &["/usr/local/lib/dtconvert", "/usr/lib/dtconvert"];

/// Resolves relative converter references to executable files.
///
/// Each root is tried in order. For a reference such as
/// `modules/csv_to_pdf.sh`, a root is probed as a source tree
/// (`<root>/modules/csv_to_pdf.sh`), as an installed tree
/// (`<root>/converters/csv_to_pdf.sh`) and as an install prefix
/// (`<root>/lib/dtconvert/converters/csv_to_pdf.sh`).
#[derive(Debug, Clone, Default)]
pub struct ExecutableResolver {
    roots: Vec<PathBuf>,
}

impl ExecutableResolver {
    /// A resolver with no search roots. Only absolute references resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default search order: `DTCONVERT_HOME`, the prefix the running
    /// binary is installed under, then the system-wide roots.
    pub fn from_env() -> Self {
        let mut resolver = Self::new();
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
            resolver.roots.push(PathBuf::from(home));
        }
        if let Some(prefix) = exe_prefix() {
            resolver.roots.push(prefix);
        }
        resolver
            .roots
            .extend(SYSTEM_ROOTS.iter().map(PathBuf::from));
        resolver
    }

    /// Append a search root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Insert search roots ahead of the existing ones.
    pub fn with_leading_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut leading: Vec<PathBuf> = roots.into_iter().collect();
        leading.append(&mut self.roots);
        self.roots = leading;
        self
    }

    /// Search roots in probe order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every path probed for `reference`, in order.
    pub fn candidates(&self, reference: &Path) -> Vec<PathBuf> {
        if reference.is_absolute() {
            return vec![reference.to_path_buf()];
        }

        let mut out = Vec::new();
        for root in &self.roots {
            out.push(root.join(reference));
            if let Ok(leaf) = reference.strip_prefix("modules") {
                out.push(root.join("converters").join(leaf));
                out.push(root.join("lib/dtconvert/converters").join(leaf));
            } else if reference.starts_with("lib/converters") {
                out.push(root.join("lib/dtconvert").join(reference));
            }
        }
        out
    }

    /// First candidate that is an executable regular file.
    pub fn resolve(&self, reference: &Path) -> Option<PathBuf> {
        self.candidates(reference)
            .into_iter()
            .find(|candidate| is_executable(candidate))
    }
}

/// Parent of the directory holding the running binary
/// (`<prefix>/bin/dtconvert` gives `<prefix>`).
fn exe_prefix() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.parent().map(Path::to_path_buf)
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A converter that runs an external program.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    decl: ConverterDecl,
    program: PathBuf,
    resolver: Arc<ExecutableResolver>,
}

impl ExternalConverter {
    /// Create a converter for `from -> to` backed by `program`.
    ///
    /// The id is `external.{from}-to-{to}`.
    pub fn new(
        from: &str,
        to: &str,
        program: impl Into<PathBuf>,
        resolver: Arc<ExecutableResolver>,
    ) -> Self {
        let program = program.into();
        let decl = ConverterDecl::new(format!("external.{from}-to-{to}"), from, to)
            .reference(Reference::External(program.clone()));
        Self {
            decl,
            program,
            resolver,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.decl = self.decl.description(desc);
        self
    }

    /// Mark the destination format as a storage sink.
    pub fn sink(mut self) -> Self {
        self.decl = self.decl.sink();
        self
    }

    /// The program reference as registered (before resolution).
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Converter for ExternalConverter {
    fn decl(&self) -> &ConverterDecl {
        &self.decl
    }

    fn run(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let resolved = self
            .resolver
            .resolve(&self.program)
            .ok_or_else(|| ConvertError::NotExecutable(self.program.display().to_string()))?;

        tracing::debug!(
            program = %resolved.display(),
            input = %input.display(),
            output = %output.display(),
            "spawning converter"
        );

        let program = resolved.display().to_string();
        let status = Command::new(&resolved)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| ConvertError::Spawn {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::ExitStatus {
                program,
                code: status.code(),
            })
        }
    }
}
