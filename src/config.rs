//! Run configuration resolved from the command line.

use std::path::{Path, PathBuf};

/// What gets written to disk once every source file has been processed.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// `.tok`: debug dump of the token stream
    Tokens(PathBuf),
    /// `.ast`: debug dump of the parsed nodes
    Ast(PathBuf),
    /// `.bc`: LLVM bitcode
    Bitcode(PathBuf),
    /// `.ll`: textual LLVM IR
    Ir(PathBuf),
    /// Any other extension: a native object file
    Object(PathBuf),
    /// No extension: `<name>.o`, linked with the runtime into `<name>`
    Executable { object: PathBuf, executable: PathBuf },
}

impl Artifact {
    /// Picks the artifact from the extension of `output`.
    pub fn from_output(output: &Path) -> Self {
        let extension = output
            .extension()
            .map(|extension| extension.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            None | Some("") => Artifact::Executable {
                object: PathBuf::from(format!("{}.o", output.display())),
                executable: output.to_path_buf(),
            },
            Some("tok") => Artifact::Tokens(output.to_path_buf()),
            Some("ast") => Artifact::Ast(output.to_path_buf()),
            Some("bc") => Artifact::Bitcode(output.to_path_buf()),
            Some("ll") => Artifact::Ir(output.to_path_buf()),
            Some(_) => Artifact::Object(output.to_path_buf()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub files: Vec<PathBuf>,
    pub dump_ir: bool,
    pub execute: bool,
    pub optimization_level: u32,
    pub verbose: bool,
    /// `None` when nothing is written, i.e. only dumping or executing.
    pub artifact: Option<Artifact>,
}

impl Config {
    /// Resolves the output artifact.
    ///
    /// Without an explicit output, dumping or executing writes nothing;
    /// otherwise the output is the first file's name without its extension,
    /// which produces an executable.
    pub fn new(
        files: Vec<PathBuf>,
        output: Option<PathBuf>,
        dump_ir: bool,
        execute: bool,
        optimization_level: u32,
        verbose: bool,
    ) -> Self {
        let output = match output {
            Some(output) => Some(output),
            None if dump_ir || execute => None,
            None => files.first().and_then(|file| file.file_stem()).map(PathBuf::from),
        };

        Config {
            artifact: output.as_deref().map(Artifact::from_output),
            files,
            dump_ir,
            execute,
            optimization_level,
            verbose,
        }
    }

    pub fn optimize(&self) -> bool {
        self.optimization_level > 0
    }

    /// Name of the LLVM module: the first source file's stem.
    pub fn module_name(&self) -> String {
        self.files
            .first()
            .and_then(|file| file.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("root"))
    }
}
