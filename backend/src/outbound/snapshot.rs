//! JSON message snapshots on disk.
//!
//! A snapshot is a JSON array of [`MessagePayload`] values. Files are opened
//! through `cap_std` relative to their parent directory.

use std::io::{self, Read, Write};
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;

use crate::domain::{Error as DomainError, Message, MessagePayload};

/// Errors raised while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("snapshot '{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot '{path}' entry {index} is invalid: {source}")]
    Message {
        path: String,
        index: usize,
        #[source]
        source: DomainError,
    },
}

fn open_parent(path: &Path) -> Result<(Dir, &Path), SnapshotError> {
    let io_error = |source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "snapshot path must name a file",
        ))
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    Ok((directory, Path::new(file_name)))
}

/// Read and validate every message in the snapshot at `path`.
pub fn load_messages(path: &Path) -> Result<Vec<Message>, SnapshotError> {
    let display = path.display().to_string();
    let (directory, file_name) = open_parent(path)?;
    let mut raw = String::new();
    directory
        .open(file_name)
        .and_then(|mut file| file.read_to_string(&mut raw))
        .map_err(|source| SnapshotError::Io {
            path: display.clone(),
            source,
        })?;

    let payloads: Vec<MessagePayload> =
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Json {
            path: display.clone(),
            source,
        })?;
    payloads
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            Message::try_from(payload).map_err(|source| SnapshotError::Message {
                path: display.clone(),
                index,
                source,
            })
        })
        .collect()
}

/// Write `messages` to `path` as a snapshot, replacing any existing file.
pub fn write_messages(path: &Path, messages: &[Message], pretty: bool) -> Result<(), SnapshotError> {
    let display = path.display().to_string();
    let payloads: Vec<MessagePayload> = messages.iter().map(MessagePayload::from).collect();
    let encoded = if pretty {
        serde_json::to_vec_pretty(&payloads)
    } else {
        serde_json::to_vec(&payloads)
    }
    .map_err(|source| SnapshotError::Json {
        path: display.clone(),
        source,
    })?;

    let (directory, file_name) = open_parent(path)?;
    directory
        .create(file_name)
        .and_then(|mut file| file.write_all(&encoded))
        .map_err(|source| SnapshotError::Io {
            path: display,
            source,
        })
}
