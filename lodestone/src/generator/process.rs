//! Process-backed block source.
//!
//! Drives a native generator executable the way the deployment ships
//! them: one process invocation per chunk, block report as JSON on
//! stdout. The engine never links the generators directly; the process
//! boundary isolates their crashes and lets the per-invocation timeout
//! bound a wedged chunk.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{BlockSource, BoxFuture, GeneratorError, RawBlock};
use crate::coord::ChunkCoord;

/// Default per-invocation budget, sized to the deployed generators'
/// worst-case chunk time.
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Block source that spawns a native generator executable per chunk.
///
/// The generator is invoked as `<program> <seed> <chunk_x> <chunk_z>`,
/// with `--version <tag>` appended for version-dispatched backends, and
/// must print a JSON block report to stdout. Two report shapes are
/// accepted:
///
/// - `{"blocks": [{"type": "...", "x": .., "y": .., "z": ..}, ...]}`
/// - `{"ores": [...]}` with the same entry fields (the mock generators'
///   shape)
///
/// A non-zero exit, a timeout, or unparseable stdout fails the chunk
/// with the matching [`GeneratorError`]; the search driver decides
/// whether the query survives.
pub struct ProcessSource {
    program: PathBuf,
    version_tag: Option<String>,
    timeout: Duration,
}

impl ProcessSource {
    /// Creates a source for the given generator executable with the
    /// default invocation timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            version_tag: None,
            timeout: DEFAULT_INVOCATION_TIMEOUT,
        }
    }

    /// Appends `--version <tag>` to every invocation.
    pub fn with_version_tag(mut self, tag: impl Into<String>) -> Self {
        self.version_tag = Some(tag.into());
        self
    }

    /// Overrides the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn invoke(&self, seed: i64, chunk: ChunkCoord) -> Result<Vec<RawBlock>, GeneratorError> {
        let mut command = Command::new(&self.program);
        command
            .arg(seed.to_string())
            .arg(chunk.x.to_string())
            .arg(chunk.z.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(tag) = &self.version_tag {
            command.arg("--version").arg(tag);
        }

        debug!(seed, chunk = %chunk, program = %self.program.display(), "Invoking generator");

        let child = command.spawn().map_err(|e| GeneratorError::Spawn {
            program: self.program.display().to_string(),
            message: e.to_string(),
        })?;

        // kill_on_drop reaps the child if the timeout wins the race.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(GeneratorError::Io(e.to_string())),
            Err(_) => {
                warn!(chunk = %chunk, timeout = ?self.timeout, "Generator timed out");
                return Err(GeneratorError::TimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(chunk = %chunk, status = ?output.status.code(), stderr = %stderr, "Generator failed");
            return Err(GeneratorError::Failed {
                status: output.status.code(),
                stderr,
            });
        }

        parse_report(&output.stdout)
    }
}

impl BlockSource for ProcessSource {
    fn chunk_blocks(
        &self,
        seed: i64,
        chunk: ChunkCoord,
    ) -> BoxFuture<'_, Result<Vec<RawBlock>, GeneratorError>> {
        Box::pin(self.invoke(seed, chunk))
    }

    fn describe(&self) -> String {
        match &self.version_tag {
            Some(tag) => format!("{} --version {tag}", self.program.display()),
            None => self.program.display().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireReport {
    blocks: Option<Vec<WireBlock>>,
    ores: Option<Vec<WireBlock>>,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    #[serde(rename = "type")]
    material: String,
    x: i32,
    y: i32,
    z: i32,
}

/// Parses a generator's stdout into raw blocks.
///
/// The mock shape's pre-grouped `count` field is ignored; every entry
/// is one block, and deposit counts are recomputed by clustering.
fn parse_report(stdout: &[u8]) -> Result<Vec<RawBlock>, GeneratorError> {
    let report: WireReport =
        serde_json::from_slice(stdout).map_err(|e| GeneratorError::Malformed(e.to_string()))?;

    let entries = report.ores.or(report.blocks).unwrap_or_default();

    Ok(entries
        .into_iter()
        .map(|block| RawBlock {
            material: block.material,
            x: block.x,
            y: block.y,
            z: block.z,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_real_generator_shape() {
        let stdout = br#"{"blocks": [
            {"type": "diamond_ore", "x": 100, "y": -5, "z": 200},
            {"type": "stone", "x": 101, "y": -5, "z": 200}
        ]}"#;

        let blocks = parse_report(stdout).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].material, "diamond_ore");
        assert_eq!((blocks[1].x, blocks[1].y, blocks[1].z), (101, -5, 200));
    }

    #[test]
    fn test_parse_mock_shape_ignores_count() {
        let stdout = br#"{"ores": [
            {"type": "gold", "x": 1, "y": 2, "z": 3, "count": 5}
        ]}"#;

        let blocks = parse_report(stdout).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].material, "gold");
    }

    #[test]
    fn test_parse_prefers_ores_when_both_present() {
        let stdout = br#"{
            "ores": [{"type": "iron", "x": 1, "y": 1, "z": 1}],
            "blocks": [{"type": "coal_ore", "x": 2, "y": 2, "z": 2}]
        }"#;

        let blocks = parse_report(stdout).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].material, "iron");
    }

    #[test]
    fn test_parse_empty_report_is_no_blocks() {
        assert!(parse_report(b"{}").unwrap().is_empty());
        assert!(parse_report(br#"{"blocks": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let err = parse_report(b"Segmentation fault").unwrap_err();
        assert!(matches!(err, GeneratorError::Malformed(_)));
    }

    #[test]
    fn test_describe_includes_version_tag() {
        let plain = ProcessSource::new("/opt/generators/vanilla_generator");
        assert_eq!(plain.describe(), "/opt/generators/vanilla_generator");

        let tagged = ProcessSource::new("/opt/generators/cubiomes").with_version_tag("1.20");
        assert_eq!(tagged.describe(), "/opt/generators/cubiomes --version 1.20");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let source = ProcessSource::new("/nonexistent/generator");
        let result = source.invoke(1, ChunkCoord::new(0, 0)).await;
        assert!(matches!(result, Err(GeneratorError::Spawn { .. })));
    }

    #[cfg(unix)]
    mod script_tests {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use tempfile::TempDir;

        /// Writes an executable shell script standing in for a native
        /// generator binary.
        fn script_generator(dir: &TempDir, body: &str) -> std::path::PathBuf {
            let path = dir.path().join("generator.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn source_for(path: &Path) -> ProcessSource {
            ProcessSource::new(path)
        }

        #[tokio::test]
        async fn test_happy_path_passes_argv_in_order() {
            let dir = TempDir::new().unwrap();
            // Echoes the chunk arguments back as block coordinates so the
            // test can verify argv order: <seed> <chunk_x> <chunk_z>.
            let path = script_generator(
                &dir,
                r#"printf '{"blocks": [{"type": "iron_ore", "x": %d, "y": 10, "z": %d}]}' "$2" "$3""#,
            );

            let blocks = source_for(&path)
                .invoke(123456789, ChunkCoord::new(6, 12))
                .await
                .unwrap();

            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].x, 6);
            assert_eq!(blocks[0].z, 12);
        }

        #[tokio::test]
        async fn test_version_tag_reaches_the_generator() {
            let dir = TempDir::new().unwrap();
            let path = script_generator(
                &dir,
                r#"[ "$4" = "--version" ] && [ "$5" = "1.20" ] || exit 9
printf '{"blocks": []}'"#,
            );

            let result = source_for(&path)
                .with_version_tag("1.20")
                .invoke(1, ChunkCoord::new(0, 0))
                .await;

            assert!(result.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_failed_with_stderr() {
            let dir = TempDir::new().unwrap();
            let path = script_generator(&dir, "echo 'bad seed' >&2\nexit 3");

            let err = source_for(&path)
                .invoke(1, ChunkCoord::new(0, 0))
                .await
                .unwrap_err();

            match err {
                GeneratorError::Failed { status, stderr } => {
                    assert_eq!(status, Some(3));
                    assert_eq!(stderr, "bad seed");
                }
                other => panic!("expected Failed, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_garbage_stdout_is_malformed() {
            let dir = TempDir::new().unwrap();
            let path = script_generator(&dir, "echo 'not json at all'");

            let err = source_for(&path)
                .invoke(1, ChunkCoord::new(0, 0))
                .await
                .unwrap_err();

            assert!(matches!(err, GeneratorError::Malformed(_)));
        }

        #[tokio::test]
        async fn test_slow_generator_times_out() {
            let dir = TempDir::new().unwrap();
            let path = script_generator(&dir, "sleep 5");

            let err = source_for(&path)
                .with_timeout(Duration::from_millis(100))
                .invoke(1, ChunkCoord::new(0, 0))
                .await
                .unwrap_err();

            assert!(matches!(err, GeneratorError::TimedOut { .. }));
        }
    }
}
