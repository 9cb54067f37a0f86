use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct OutputWriter {
    output_root: PathBuf,
}

impl OutputWriter {
    pub fn new(output_root: PathBuf) -> Self {
        Self { output_root }
    }

    /// Mirrors the input's relative path under the output root. Absolute
    /// inputs are made relative to the current working directory; when that
    /// fails, the bare file name is used.
    fn mirror_path(&self, input: &Path) -> PathBuf {
        let relative = if input.is_absolute() {
            std::env::current_dir()
                .ok()
                .and_then(|cwd| input.strip_prefix(&cwd).map(Path::to_path_buf).ok())
                .unwrap_or_else(|| input.file_name().map(PathBuf::from).unwrap_or_default())
        } else {
            input.to_path_buf()
        };
        self.output_root.join(relative)
    }

    /// Writes the refactored body with exactly one trailing newline,
    /// overwriting any previous result at the same path.
    pub fn write_refactored(&self, input: &Path, code: &str) -> Result<PathBuf> {
        let output_path = self.mirror_path(input);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&output_path, format!("{}\n", code))
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(output_path)
    }

    pub fn write_summary(
        &self,
        output_path: &Path,
        input: &Path,
        summary: &str,
    ) -> Result<PathBuf> {
        let summary_path = output_path.with_extension("changes.md");
        let body = format!("# Changes for {}\n\n{}", input.display(), summary);
        std::fs::write(&summary_path, body)
            .with_context(|| format!("failed to write {}", summary_path.display()))?;
        Ok(summary_path)
    }

    /// Kept deliberately when extraction fails so the raw reply can be
    /// inspected by hand.
    pub fn write_debug(&self, input: &Path, response: &str) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .map(PathBuf::from)
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let debug_path = self.output_root.join(format!("{}_debug.txt", stem));
        std::fs::create_dir_all(&self.output_root)
            .with_context(|| format!("failed to create {}", self.output_root.display()))?;
        std::fs::write(&debug_path, response)
            .with_context(|| format!("failed to write {}", debug_path.display()))?;
        Ok(debug_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_input_is_mirrored_under_the_root() {
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        let written = writer
            .write_refactored(Path::new("src/app/core.clj"), "(ns app.core)")
            .unwrap();

        assert_eq!(written, out.path().join("src/app/core.clj"));
        assert!(written.exists());
    }

    #[test]
    fn body_gets_exactly_one_trailing_newline() {
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        let written = writer
            .write_refactored(Path::new("core.clj"), "(ns core)")
            .unwrap();

        assert_eq!(std::fs::read_to_string(written).unwrap(), "(ns core)\n");
    }

    #[test]
    fn absolute_input_outside_cwd_falls_back_to_file_name() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        // A tempdir path is not under the test's working directory.
        let input = src.path().join("views/root.clj");
        let written = writer.write_refactored(&input, "(ns views.root)").unwrap();

        assert_eq!(written, out.path().join("root.clj"));
    }

    #[test]
    fn summary_sits_next_to_the_output_with_a_header() {
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        let output_path = writer
            .write_refactored(Path::new("core.clj"), "(ns core)")
            .unwrap();
        let summary_path = writer
            .write_summary(&output_path, Path::new("core.clj"), "Removed dead code.")
            .unwrap();

        assert_eq!(summary_path, out.path().join("core.changes.md"));
        assert_eq!(
            std::fs::read_to_string(summary_path).unwrap(),
            "# Changes for core.clj\n\nRemoved dead code."
        );
    }

    #[test]
    fn rerun_overwrites_a_previous_result_silently() {
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        writer.write_refactored(Path::new("core.clj"), "(def a 1)").unwrap();
        let written = writer
            .write_refactored(Path::new("core.clj"), "(def b 2)")
            .unwrap();

        assert_eq!(std::fs::read_to_string(written).unwrap(), "(def b 2)\n");
    }

    #[test]
    fn debug_artifact_lands_in_the_output_root() {
        let out = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(out.path().to_path_buf());

        let debug_path = writer
            .write_debug(Path::new("src/app/core.clj"), "no fence here")
            .unwrap();

        assert_eq!(debug_path, out.path().join("core_debug.txt"));
        assert_eq!(std::fs::read_to_string(debug_path).unwrap(), "no fence here");
    }
}
