//! Local filesystem client transport (`hdfs dfs ...`)

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio_util::io::ReaderStream;

use super::{BridgeError, ByteStream, FilesystemBridge};

#[derive(Debug, Clone)]
pub struct CliBridge {
    program: String,
    args: Vec<String>,
}

impl CliBridge {
    /// `program` is run as `<program> <args...> -<command> ...`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn failure(&self, remote: &str, status: ExitStatus, stderr: &[u8]) -> BridgeError {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program, status)
        } else {
            stderr
        };
        BridgeError::Command {
            path: remote.to_string(),
            message,
        }
    }
}

#[async_trait]
impl FilesystemBridge for CliBridge {
    #[tracing::instrument(skip(self, local), fields(local = %local.display()))]
    async fn put_file(&self, local: &Path, remote: &str) -> Result<(), BridgeError> {
        let output = self
            .command()
            .arg("-copyFromLocal")
            .arg("-f")
            .arg(local)
            .arg(remote)
            .output()
            .await?;

        // Any diagnostic output counts as a failed copy
        if !output.status.success() || !output.stderr.iter().all(u8::is_ascii_whitespace) {
            return Err(self.failure(remote, output.status, &output.stderr));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_file(&self, remote: &str) -> Result<ByteStream, BridgeError> {
        let mut child = self
            .command()
            .arg("-cat")
            .arg(remote)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| BridgeError::Command {
            path: remote.to_string(),
            message: "stdout was not captured".to_string(),
        })?;

        let this = self.clone();
        let path = remote.to_string();
        let exit = stream::once(async move {
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => None,
                Ok(output) => Some(Err(this.failure(&path, output.status, &output.stderr))),
                Err(e) => Some(Err(BridgeError::Io(e))),
            }
        })
        .filter_map(futures::future::ready);

        let mut contents = ReaderStream::new(stdout).map_err(BridgeError::from).chain(exit).boxed();

        // Surface a missing file before any bytes are promised to the caller
        match contents.next().await {
            Some(Err(e)) => Err(e),
            Some(Ok(first)) => Ok(stream::once(futures::future::ready(Ok(first)))
                .chain(contents)
                .boxed()),
            None => Ok(stream::empty().boxed()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_directory(&self, remote: &str) -> Result<Vec<String>, BridgeError> {
        let output = self.command().arg("-ls").arg("-C").arg(remote).output().await?;

        if !output.status.success() {
            return Err(self.failure(remote, output.status, &output.stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.trim_end_matches('/').rsplit('/').next().unwrap_or(line).to_string())
            .collect())
    }
}
