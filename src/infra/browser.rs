use std::{
    fs,
    io::{self, ErrorKind, Write},
    path::PathBuf,
    process::{Command, Stdio},
    time::Instant,
};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to write temporary file: {0}")]
    Io(io::Error),
    #[error("chromium invocation failed (exit {exit_code:?}): {stderr}")]
    Cli {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("chromium binary unavailable: {0}")]
    NotFound(io::Error),
    #[error("chromium produced no PDF output")]
    EmptyOutput,
    #[error("failed to read rendered PDF: {0}")]
    Read(io::Error),
}

/// Prints HTML documents to PDF through a headless Chromium binary.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    binary: PathBuf,
}

impl ChromiumRenderer {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Write `html` to a temporary file, print it with Chromium, and return
    /// the PDF bytes. Blocking; callers on the async runtime must wrap this
    /// in `spawn_blocking`.
    pub fn print_to_pdf(&self, html: &str) -> Result<Vec<u8>, BrowserError> {
        let started_at = Instant::now();

        // Chromium resolves the content type from the extension, so the
        // input file must end in .html.
        let mut input_file = tempfile::Builder::new()
            .suffix(".html")
            .tempfile()
            .map_err(BrowserError::Io)?;
        input_file
            .write_all(html.as_bytes())
            .map_err(BrowserError::Io)?;
        input_file.flush().map_err(BrowserError::Io)?;

        let output_file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(BrowserError::Io)?;
        let output_path = output_file.path().to_path_buf();

        let cli_started_at = Instant::now();
        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output_path.display()))
            .arg(input_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                warn!(
                    target = "infra::browser",
                    op = "chromium::print_to_pdf",
                    result = "error",
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
                    error_code = "spawn_cli",
                    error = %err,
                    "Failed to spawn Chromium"
                );
                if err.kind() == ErrorKind::NotFound {
                    BrowserError::NotFound(err)
                } else {
                    BrowserError::Io(err)
                }
            })?;

        if !output.status.success() {
            let exit_code = output.status.code();
            let exit_code_value = exit_code.map(i64::from).unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(
                target = "infra::browser",
                op = "chromium::print_to_pdf",
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
                exit_code = exit_code_value,
                error_code = "chromium_cli",
                stderr = %stderr,
                "Chromium invocation failed"
            );
            return Err(BrowserError::Cli { exit_code, stderr });
        }

        let pdf = fs::read(&output_path).map_err(|err| {
            warn!(
                target = "infra::browser",
                op = "chromium::print_to_pdf",
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
                error_code = "read_output",
                error = %err,
                "Failed to read rendered PDF"
            );
            BrowserError::Read(err)
        })?;

        if pdf.is_empty() {
            return Err(BrowserError::EmptyOutput);
        }

        info!(
            target = "infra::browser",
            op = "chromium::print_to_pdf",
            result = "ok",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            cli_elapsed_ms = cli_started_at.elapsed().as_millis() as u64,
            pdf_bytes = pdf.len(),
            "HTML printed to PDF"
        );

        Ok(pdf)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::{fs, os::unix::fs::PermissionsExt};
    use tempfile::TempDir;

    fn make_executable(path: &PathBuf) {
        let mut perms = fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("set perms");
    }

    #[test]
    fn prints_pdf_with_valid_binary() {
        let dir = TempDir::new().expect("temp dir");
        let script_path = dir.path().join("fake-chromium");
        let args_path = dir.path().join("args.log");
        let script = format!(
            r#"#!/bin/sh
set -eu
echo "$@" > "{args_file}"
out=""
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*)
      out="${{arg#--print-to-pdf=}}"
      ;;
  esac
done
if [ -z "$out" ]; then
  echo "missing --print-to-pdf" >&2
  exit 2
fi
printf '%%PDF-1.4 fake' > "$out"
"#,
            args_file = args_path.display()
        );
        fs::write(&script_path, script).expect("write script");
        make_executable(&script_path);

        let renderer = ChromiumRenderer::new(script_path);
        let pdf = renderer
            .print_to_pdf("<html><body>hi</body></html>")
            .expect("pdf rendered");
        assert!(pdf.starts_with(b"%PDF-"), "unexpected output: {pdf:?}");

        let args = fs::read_to_string(&args_path).expect("read args");
        assert!(args.contains("--headless"), "missing --headless: {args}");
        assert!(
            args.contains("--no-pdf-header-footer"),
            "missing header flag: {args}"
        );
    }

    #[test]
    fn surfaces_cli_errors() {
        let dir = TempDir::new().expect("temp dir");
        let script_path = dir.path().join("fake-chromium");
        fs::write(
            &script_path,
            r#"#!/bin/sh
echo "boom" >&2
exit 42
"#,
        )
        .expect("write script");
        make_executable(&script_path);

        let renderer = ChromiumRenderer::new(script_path);
        let err = renderer
            .print_to_pdf("<html></html>")
            .expect_err("expected cli failure");
        match err {
            BrowserError::Cli { exit_code, stderr } => {
                assert_eq!(exit_code, Some(42));
                assert!(stderr.contains("boom"), "stderr did not propagate: {stderr}");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn empty_output_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let script_path = dir.path().join("fake-chromium");
        // Succeeds without writing any bytes to the output file.
        fs::write(&script_path, "#!/bin/sh\nexit 0\n").expect("write script");
        make_executable(&script_path);

        let renderer = ChromiumRenderer::new(script_path);
        let err = renderer
            .print_to_pdf("<html></html>")
            .expect_err("expected empty output failure");
        assert!(matches!(err, BrowserError::EmptyOutput), "got {err:?}");
    }
}
