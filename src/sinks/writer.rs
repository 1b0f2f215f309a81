use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::SCENARIO_FILE_HEADER;
use crate::dispatch::RequestOutcome;
use crate::error::SinkError;

/// Incrementally written result file of one scenario run.
///
/// Every appended row is flushed before `append` returns, so an interrupted
/// run leaves each outcome received so far on disk.
#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
    writer: BufWriter<File>,
    line: String,
    rows: usize,
}

impl ResultSink {
    /// Creates (or truncates) the file at `path` and writes the header,
    /// creating the parent directory when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or the file cannot be created.
    pub async fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| SinkError::CreateDir {
                    path: parent.to_path_buf(),
                    source: err,
                })?;
        }
        let file = File::create(path).await.map_err(|err| SinkError::Open {
            path: path.to_path_buf(),
            source: err,
        })?;
        let mut sink = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            line: String::with_capacity(256),
            rows: 0,
        };
        sink.write_line(SCENARIO_FILE_HEADER).await?;
        debug!("Opened result file {}", sink.path.display());
        Ok(sink)
    }

    /// Rows appended so far, header excluded.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Appends the row of `outcome` and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error when the row cannot be written.
    pub async fn append(&mut self, outcome: &RequestOutcome) -> Result<(), SinkError> {
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        let formatted = write!(
            &mut line,
            "{},{},{:.3},{}",
            outcome.index, outcome.url, outcome.elapsed_ms, outcome.status_code
        );
        let result = match formatted {
            Ok(()) => self.write_line(&line).await,
            Err(err) => Err(SinkError::Write {
                path: self.path.clone(),
                source: std::io::Error::other(err),
            }),
        };
        self.line = line;
        if result.is_ok() {
            self.rows = self.rows.saturating_add(1);
        }
        result
    }

    async fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        let write = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        };
        write.await.map_err(|err| SinkError::Write {
            path: self.path.clone(),
            source: err,
        })
    }

    /// Flushes and releases the file without reordering it.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush fails.
    pub async fn close(mut self) -> Result<PathBuf, SinkError> {
        self.writer
            .shutdown()
            .await
            .map_err(|err| SinkError::Write {
                path: self.path.clone(),
                source: err,
            })?;
        Ok(self.path)
    }

    /// Closes the file and rewrites its rows in ascending index order.
    ///
    /// The rewrite goes through a sibling temp file renamed over the
    /// original, so a failure leaves the arrival-ordered file intact.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be flushed, read back or replaced.
    pub async fn finalize(self) -> Result<PathBuf, SinkError> {
        let path = self.close().await?;
        let reorder_error = |err: std::io::Error| SinkError::Reorder {
            path: path.clone(),
            source: err,
        };

        let content = fs::read_to_string(&path).await.map_err(reorder_error)?;
        let reordered = reorder_rows(&content);
        let temp_path = temp_path_for(&path);
        fs::write(&temp_path, reordered).await.map_err(reorder_error)?;
        if let Err(err) = fs::rename(&temp_path, &path).await {
            let _ignored = fs::remove_file(&temp_path).await;
            return Err(reorder_error(err));
        }
        debug!("Rewrote {} in index order", path.display());
        Ok(path)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Sorts data rows by their leading index, keeping the header first.
/// Rows without a numeric index keep their relative order at the end.
fn reorder_rows(content: &str) -> String {
    let mut lines = content.lines();
    let header = lines.next().unwrap_or(SCENARIO_FILE_HEADER);
    let mut rows: Vec<(Option<usize>, &str)> = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| (row_index(line), line))
        .collect();
    rows.sort_by_key(|(index, _)| index.unwrap_or(usize::MAX));

    let mut output = String::with_capacity(content.len().saturating_add(1));
    output.push_str(header);
    output.push('\n');
    for (_, line) in rows {
        output.push_str(line);
        output.push('\n');
    }
    output
}

fn row_index(line: &str) -> Option<usize> {
    line.split_once(',')?.0.trim().parse().ok()
}
