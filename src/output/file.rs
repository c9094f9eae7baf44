/*
Copyright 2020 Timo Saarinen

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! File sink with size-based rotation

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{Sentence, SinkCounters};
use crate::config::{FileSinkConfig, LineEnding};
use crate::error::SinkError;

/// Open the sink file and spawn the writer task. Failure to open is fatal.
pub(crate) async fn start(
    config: &FileSinkConfig,
    rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) -> Result<JoinHandle<()>, SinkError> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&config.path)
        .await
        .map_err(|e| SinkError::Startup(format!("{}: {}", config.path.display(), e)))?;
    let bytes_written = file
        .metadata()
        .await
        .map(|m| m.len())
        .map_err(|e| SinkError::Startup(format!("{}: {}", config.path.display(), e)))?;
    Ok(tokio::spawn(run(
        config.clone(),
        file,
        bytes_written,
        rx,
        counters,
    )))
}

async fn run(
    config: FileSinkConfig,
    mut file: File,
    mut bytes_written: u64,
    mut rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) {
    let rotation_bytes = config
        .rotation_size_mb
        .map(|mb| (mb * 1024.0 * 1024.0) as u64);
    loop {
        match rx.recv().await {
            Ok(sentence) => {
                let line = match config.line_ending {
                    LineEnding::CrLf => sentence.to_string(),
                    LineEnding::Lf => sentence.replace("\r\n", "\n"),
                };
                match file.write_all(line.as_bytes()).await {
                    Ok(()) => {
                        bytes_written += line.len() as u64;
                        counters.add_written();
                        if config.auto_flush {
                            let _ = file.flush().await;
                        }
                    }
                    Err(e) => {
                        error!("File sink write failed on {}: {}", config.path.display(), e);
                        counters.add_write_error();
                    }
                }
                if let Some(limit) = rotation_bytes {
                    if bytes_written >= limit {
                        match rotate(&config.path, config.max_files).await {
                            Ok(new_file) => {
                                file = new_file;
                                bytes_written = 0;
                            }
                            Err(e) => {
                                error!(
                                    "File sink rotation failed on {}: {}",
                                    config.path.display(),
                                    e
                                );
                                counters.add_write_error();
                            }
                        }
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => counters.add_dropped(n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    let _ = file.flush().await;
}

/// Rotate the current file away: shift the numbered suffixes up, deleting the one that
/// falls off the retention window, then start a fresh file.
async fn rotate(path: &Path, max_files: usize) -> std::io::Result<File> {
    if max_files > 1 {
        let _ = tokio::fs::remove_file(rotated_path(path, max_files - 1)).await;
        for index in (1..max_files - 1).rev() {
            let _ = tokio::fs::rename(rotated_path(path, index), rotated_path(path, index + 1)).await;
        }
        tokio::fs::rename(path, rotated_path(path, 1)).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }
    File::create(path).await
}

fn rotated_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::SentenceBus;
    use super::*;

    fn test_config(path: PathBuf) -> FileSinkConfig {
        FileSinkConfig {
            path,
            line_ending: LineEnding::CrLf,
            rotation_size_mb: None,
            max_files: 2,
            auto_flush: true,
        }
    }

    #[tokio::test]
    async fn test_appends_sentences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nmea.log");
        let bus = SentenceBus::new(64);
        let counters = Arc::new(SinkCounters::default());
        let task = start(&test_config(path.clone()), bus.subscribe(), counters.clone())
            .await
            .unwrap();

        bus.publish("$GPGGA,one,test*00\r\n".to_string());
        bus.publish("$GPGGA,two,test*00\r\n".to_string());
        drop(bus);
        task.await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "$GPGGA,one,test*00\r\n$GPGGA,two,test*00\r\n");
        assert_eq!(counters.snapshot().sentences_written, 2);
    }

    #[tokio::test]
    async fn test_lf_line_ending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nmea.log");
        let mut config = test_config(path.clone());
        config.line_ending = LineEnding::Lf;
        let bus = SentenceBus::new(64);
        let counters = Arc::new(SinkCounters::default());
        let task = start(&config, bus.subscribe(), counters).await.unwrap();

        bus.publish("$GPGGA,one,test*00\r\n".to_string());
        drop(bus);
        task.await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "$GPGGA,one,test*00\n"
        );
    }

    #[tokio::test]
    async fn test_rotation_retains_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nmea.log");
        let mut config = test_config(path.clone());
        // Roughly 100 bytes per file, three sentences of 33 bytes each
        config.rotation_size_mb = Some(0.0001);
        config.max_files = 2;
        let bus = SentenceBus::new(64);
        let counters = Arc::new(SinkCounters::default());
        let task = start(&config, bus.subscribe(), counters.clone())
            .await
            .unwrap();

        // 10 sentences of 33 bytes: rotations after S3 and S7
        for i in 0..10 {
            bus.publish(format!("$GPGGA,{:04},padpadpadpadpad*00\r\n", i));
        }
        drop(bus);
        task.await.unwrap();

        // Exactly two files: the current one and one rotated copy
        let current = std::fs::read_to_string(&path).unwrap();
        let rotated = std::fs::read_to_string(rotated_path(&path, 1)).unwrap();
        assert!(!rotated_path(&path, 2).exists());

        // The newest file holds the most recent writes
        assert!(current.contains("0009"));
        assert!(!current.contains("0003"));
        assert!(rotated.contains("0007"));
        assert_eq!(counters.snapshot().sentences_written, 10);
    }

    #[tokio::test]
    async fn test_start_fails_on_bad_path() {
        let bus = SentenceBus::new(4);
        let counters = Arc::new(SinkCounters::default());
        let config = test_config(PathBuf::from("/nonexistent-dir/sub/nmea.log"));
        assert!(start(&config, bus.subscribe(), counters).await.is_err());
    }
}
