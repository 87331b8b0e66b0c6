//! Background decoding tagged with a load generation.
//!
//! Each request carries the [`LoadTicket`] it was issued under. The worker
//! never touches the scene; the controller decides on the main loop whether
//! a completion is still wanted.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use vantage_data::{DataFormat, DecodeLimits, Decoded, decode};

use crate::error::LoadError;

/// Monotonic load counter. Only the latest issued ticket is current.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadGeneration(u64);

impl LoadGeneration {
    /// Invalidate every earlier ticket and issue a new one.
    pub fn advance(&mut self) -> LoadTicket {
        self.0 = self.0.wrapping_add(1);
        LoadTicket { generation: self.0 }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.0
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum LoadSource {
    Path(PathBuf),
    Bytes { data: Vec<u8>, name: String },
}

impl LoadSource {
    pub fn describe(&self) -> String {
        match self {
            LoadSource::Path(path) => path.display().to_string(),
            LoadSource::Bytes { name, .. } => name.clone(),
        }
    }
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub source: String,
    pub result: Result<Decoded, LoadError>,
}

/// Read and decode synchronously on the current thread.
#[tracing::instrument(skip_all, fields(source = %source.describe()))]
pub fn load_blocking(
    source: &LoadSource,
    format: Option<DataFormat>,
    limits: &DecodeLimits,
) -> Result<Decoded, LoadError> {
    match source {
        LoadSource::Path(path) => {
            let format = format
                .or_else(|| DataFormat::from_path(path))
                .ok_or_else(|| LoadError::UnknownFormat(path.display().to_string()))?;
            let data = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Read {} bytes as {}", data.len(), format);
            Ok(decode(&data, format, limits)?)
        }
        LoadSource::Bytes { data, name } => {
            let format = format
                .or_else(|| DataFormat::from_path(std::path::Path::new(name)))
                .ok_or_else(|| LoadError::UnknownFormat(name.clone()))?;
            Ok(decode(data, format, limits)?)
        }
    }
}

/// Runs loads on worker threads and hands completions back through a channel.
#[derive(Debug)]
pub struct Loader {
    sender: Sender<LoadCompletion>,
    receiver: Receiver<LoadCompletion>,
    in_flight: usize,
}

impl Loader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Number of spawned loads whose completion has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn(
        &mut self,
        ticket: LoadTicket,
        source: LoadSource,
        format: Option<DataFormat>,
        limits: DecodeLimits,
    ) {
        let sender = self.sender.clone();
        let name = source.describe();
        let spawned = thread::Builder::new()
            .name(format!("vantage-load-{}", ticket.generation))
            .spawn(move || {
                let result = load_blocking(&source, format, &limits);
                let completion = LoadCompletion {
                    ticket,
                    source: source.describe(),
                    result,
                };
                // The receiver is gone only when the loader was dropped.
                let _ = sender.send(completion);
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => {
                warn!("Failed to spawn load worker for {}: {}", name, e);
                let _ = self.sender.send(LoadCompletion {
                    ticket,
                    source: name,
                    result: Err(LoadError::Cancelled),
                });
                self.in_flight += 1;
            }
        }
    }

    /// Completions that have arrived so far, without blocking.
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        let completions: Vec<_> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    /// Block up to `timeout` for the next completion.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight -= 1;
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_invalidates_older_tickets() {
        let mut generation = LoadGeneration::default();
        let first = generation.advance();
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert_eq!(generation.value(), 2);
    }

    #[test]
    fn test_load_blocking_bytes() {
        let source = LoadSource::Bytes {
            data: b"1 2 3 1\n4 5 6 1\n".to_vec(),
            name: "track.loc".into(),
        };
        let decoded = load_blocking(&source, None, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded.element_count(), 2);
    }

    #[test]
    fn test_unknown_format() {
        let source = LoadSource::Bytes {
            data: vec![0; 64],
            name: "blob.dat".into(),
        };
        let err = load_blocking(&source, None, &DecodeLimits::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownFormat(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = LoadSource::Path(PathBuf::from("/nonexistent/vantage/cloud.las"));
        let err = load_blocking(&source, None, &DecodeLimits::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_worker_delivers_completion() {
        let mut loader = Loader::new();
        let mut generation = LoadGeneration::default();
        let ticket = generation.advance();
        loader.spawn(
            ticket,
            LoadSource::Bytes {
                data: vec![1, 2, 3],
                name: "short.las".into(),
            },
            None,
            DecodeLimits::default(),
        );
        let completion = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(completion.ticket, ticket);
        assert!(matches!(completion.result, Err(LoadError::Decode(_))));
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.wait(Duration::from_millis(1)).is_none());
    }
}
