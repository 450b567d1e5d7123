//! Line reader over a journal file that can keep following appends.

use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ReplayError;

/// Reads complete lines from a journal file.
///
/// In follow mode, end of file is not the end of the journal: the reader
/// sleeps for the poll interval and tries again. A trailing line without a
/// newline is held back until the game finishes writing it.
///
/// Lines are read as bytes. Invalid UTF-8 is replaced rather than rejected,
/// so a corrupt line still reaches the decoder and becomes a placeholder.
#[derive(Debug)]
pub struct JournalReader {
    reader: BufReader<File>,
    pending: Vec<u8>,
    follow: bool,
    poll_interval: Duration,
}

impl JournalReader {
    /// Open `path` for reading from the start.
    pub async fn open(path: &Path, follow: bool, poll_interval: Duration) -> Result<Self, ReplayError> {
        let file = File::open(path).await?;
        Ok(Self {
            reader: BufReader::new(file),
            pending: Vec::new(),
            follow,
            poll_interval,
        })
    }

    /// The next complete line, without its line terminator.
    ///
    /// Returns `None` at end of file when not following.
    pub async fn next_line(&mut self) -> Result<Option<String>, ReplayError> {
        loop {
            let read = self.reader.read_until(b'\n', &mut self.pending).await?;
            if self.pending.ends_with(b"\n") {
                let line = take_line(&mut self.pending);
                return Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()));
            }
            if read == 0 {
                if self.follow {
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(take_line(&mut self.pending)));
            }
        }
    }
}

fn take_line(pending: &mut Vec<u8>) -> String {
    let bytes = std::mem::take(pending);
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use tokio::io::AsyncWriteExt;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hindsight-journal-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn reads_lines_and_unterminated_tail() {
        let path = scratch("tail");
        tokio::fs::write(&path, "one\r\ntwo\nthree").await.unwrap();

        let mut reader = JournalReader::open(&path, false, Duration::from_millis(1)).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("three"));
        assert_eq!(reader.next_line().await.unwrap(), None);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let path = scratch("utf8");
        tokio::fs::write(&path, b"one\n\xff\xfe garbage\ntwo\n").await.unwrap();

        let mut reader = JournalReader::open(&path, false, Duration::from_millis(1)).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(
            reader.next_line().await.unwrap().as_deref(),
            Some("\u{fffd}\u{fffd} garbage")
        );
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(reader.next_line().await.unwrap(), None);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn follow_mode_waits_for_the_rest_of_a_line() {
        let path = scratch("follow");
        tokio::fs::write(&path, "first\nsec").await.unwrap();

        let mut reader = JournalReader::open(&path, true, Duration::from_millis(5)).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("first"));

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let mut file = tokio::fs::OpenOptions::new().append(true).open(&writer_path).await.unwrap();
            file.write_all(b"ond\n").await.unwrap();
            file.flush().await.unwrap();
        });

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("second"));
        writer.await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
