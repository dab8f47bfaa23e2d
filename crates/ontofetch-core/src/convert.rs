//! Invocation of the external RDF conversion tool.
//!
//! The tool is a black box with the contract "read RDF in any supported
//! serialization from the input path, write it in the canonical
//! serialization to the output path, exit non-zero on malformed input".
//! It is either a directly executable binary or a Java archive run via
//! `java -jar`; the refresher never inspects the RDF itself.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Error from resolving or running the conversion tool.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The configured tool path does not point at a file. Detected before
    /// any network activity.
    #[error("conversion tool not found at {}", .0.display())]
    ToolMissing(PathBuf),
    /// The tool could not be launched at all.
    #[error("failed to launch conversion tool {}: {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The tool ran but exited abnormally.
    #[error("conversion tool {} {status}: {stderr}", .tool.display())]
    Failed {
        tool: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Seam for the conversion step; tests substitute a fake converter.
pub trait Converter {
    /// Verify the tool is resolvable without running it.
    fn check(&self) -> Result<(), ConvertError>;

    /// Transcode `input` into the canonical serialization at `output`.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// Converter that shells out to an external tool, invoked as
/// `<tool> <input> <output>` (or `java -jar <tool> <input> <output>` for a
/// `.jar` path).
#[derive(Debug, Clone)]
pub struct ToolConverter {
    tool: PathBuf,
}

impl ToolConverter {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    fn is_jar(&self) -> bool {
        self.tool
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("jar"))
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = if self.is_jar() {
            let mut cmd = Command::new("java");
            cmd.arg("-jar").arg(&self.tool);
            cmd
        } else {
            Command::new(&self.tool)
        };
        cmd.arg(input).arg(output);
        cmd
    }
}

impl Converter for ToolConverter {
    fn check(&self) -> Result<(), ConvertError> {
        if self.tool.is_file() {
            Ok(())
        } else {
            Err(ConvertError::ToolMissing(self.tool.clone()))
        }
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        let out = self
            .command(input, output)
            .output()
            .map_err(|e| ConvertError::Spawn {
                tool: self.tool.clone(),
                source: e,
            })?;

        if !out.status.success() {
            let status = match out.status.code() {
                Some(code) => format!("exited with status {}", code),
                None => "was terminated by a signal".to_string(),
            };
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                "no stderr output".to_string()
            } else {
                stderr
            };
            return Err(ConvertError::Failed {
                tool: self.tool.clone(),
                status,
                stderr,
            });
        }

        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            "converted to canonical serialization"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_missing_tool() {
        let conv = ToolConverter::new("/nonexistent/rdf-convert");
        match conv.check() {
            Err(ConvertError::ToolMissing(p)) => {
                assert_eq!(p, Path::new("/nonexistent/rdf-convert"))
            }
            other => panic!("expected ToolMissing, got {:?}", other),
        }
    }

    #[test]
    fn check_existing_tool() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let conv = ToolConverter::new(f.path());
        conv.check().unwrap();
    }

    #[test]
    fn command_for_binary_tool() {
        let conv = ToolConverter::new("tools/rdf-convert");
        let cmd = conv.command(Path::new("in.download"), Path::new("out.ttl"));
        assert_eq!(cmd.get_program(), "tools/rdf-convert");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["in.download", "out.ttl"]);
    }

    #[test]
    fn command_for_jar_tool_goes_through_java() {
        let conv = ToolConverter::new("tools/rdf-convert.jar");
        let cmd = conv.command(Path::new("in.download"), Path::new("out.ttl"));
        assert_eq!(cmd.get_program(), "java");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-jar", "tools/rdf-convert.jar", "in.download", "out.ttl"]);
    }

    #[cfg(unix)]
    #[test]
    fn convert_with_echoing_tool_copies_input() {
        // /bin/cp satisfies the converter contract for identity conversion.
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("duo.download");
        let output = dir.path().join("duo.ttl");
        std::fs::write(&input, b"@prefix : <http://example.org/> .\n").unwrap();

        let conv = ToolConverter::new("/bin/cp");
        conv.convert(&input, &output).unwrap();

        assert_eq!(
            std::fs::read(&output).unwrap(),
            std::fs::read(&input).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn convert_with_failing_tool_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let conv = ToolConverter::new("/bin/false");
        let err = conv
            .convert(&dir.path().join("in"), &dir.path().join("out"))
            .unwrap_err();
        match err {
            ConvertError::Failed { status, .. } => assert!(status.contains("status 1")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn convert_with_unlaunchable_tool_is_spawn_error() {
        // A plain data file exists but cannot be executed.
        let f = tempfile::NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let conv = ToolConverter::new(f.path());
        let err = conv
            .convert(&dir.path().join("in"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Spawn { .. }));
    }
}
