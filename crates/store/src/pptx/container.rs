//! Container store - zip-backed part path to bytes mapping
//!
//! Parts keep the archive's entry order. Serializing a container whose parts
//! were never rewritten returns the original bytes unchanged; otherwise the
//! untouched entries are raw-copied (compressed data and headers as read) and
//! only rewritten or added parts are compressed again.

use crate::pptx::error::{PptxError, PptxResult};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Original,
    Rewritten,
    Added,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
    state: EntryState,
}

/// An opened presentation container
#[derive(Debug, Clone)]
pub struct Container {
    source: Vec<u8>,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Container {
    /// Open a container from the raw archive bytes.
    ///
    /// Every entry is inflated up front; an unreadable archive or entry fails
    /// the whole load with [`PptxError::CorruptArchive`].
    pub fn load(bytes: &[u8]) -> PptxResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| PptxError::CorruptArchive(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| PptxError::CorruptArchive(e.to_string()))?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let compression = file.compression();

            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)
                    .map_err(|e| PptxError::CorruptArchive(format!("{}: {}", name, e)))?;
            }

            index.insert(name.clone(), entries.len());
            entries.push(Entry {
                name,
                data,
                compression,
                is_dir,
                state: EntryState::Original,
            });
        }

        tracing::debug!("Loaded container with {} entries", entries.len());

        Ok(Self {
            source: bytes.to_vec(),
            entries,
            index,
        })
    }

    /// Read a part's bytes
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.entry(path)
            .filter(|e| !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    /// Read a part as UTF-8 text
    pub fn part_as_string(&self, path: &str) -> PptxResult<String> {
        let bytes = self
            .part(path)
            .ok_or_else(|| PptxError::MissingPart(path.to_string()))?;
        String::from_utf8(bytes.to_vec()).map_err(|e| PptxError::malformed(path, e))
    }

    /// Check if a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.part(path).is_some()
    }

    /// Write a part. Writing identical bytes leaves the part untouched.
    pub fn set_part(&mut self, path: &str, bytes: Vec<u8>) {
        let path = normalize(path);
        match self.index.get(path) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if entry.data == bytes {
                    return;
                }
                entry.data = bytes;
                if entry.state == EntryState::Original {
                    entry.state = EntryState::Rewritten;
                }
            }
            None => {
                self.index.insert(path.to_string(), self.entries.len());
                self.entries.push(Entry {
                    name: path.to_string(),
                    data: bytes,
                    compression: CompressionMethod::Deflated,
                    is_dir: false,
                    state: EntryState::Added,
                });
            }
        }
    }

    /// Names of all file parts in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    /// Whether any part was rewritten or added since load
    pub fn is_modified(&self) -> bool {
        self.entries.iter().any(|e| e.state != EntryState::Original)
    }

    /// Whether a specific part was rewritten or added since load
    pub fn is_part_modified(&self, path: &str) -> bool {
        self.entry(path)
            .map(|e| e.state != EntryState::Original)
            .unwrap_or(false)
    }

    /// Number of file parts
    pub fn len(&self) -> usize {
        self.part_names().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The archive bytes this container was loaded from
    pub fn source_bytes(&self) -> &[u8] {
        &self.source
    }

    /// Produce the archive bytes
    pub fn serialize(&self) -> PptxResult<Vec<u8>> {
        if !self.is_modified() {
            return Ok(self.source.clone());
        }

        let mut archive = ZipArchive::new(Cursor::new(self.source.as_slice()))
            .map_err(|e| PptxError::ExportFailed(e.to_string()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (i, entry) in self.entries.iter().enumerate() {
            match entry.state {
                EntryState::Original => {
                    let file = archive
                        .by_index_raw(i)
                        .map_err(|e| PptxError::ExportFailed(format!("{}: {}", entry.name, e)))?;
                    writer
                        .raw_copy_file(file)
                        .map_err(|e| PptxError::ExportFailed(format!("{}: {}", entry.name, e)))?;
                }
                EntryState::Rewritten | EntryState::Added => {
                    write_entry(&mut writer, entry)?;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| PptxError::ExportFailed(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn entry(&self, path: &str) -> Option<&Entry> {
        self.index.get(normalize(path)).map(|&i| &self.entries[i])
    }
}

fn write_entry(writer: &mut ZipWriter<Cursor<Vec<u8>>>, entry: &Entry) -> PptxResult<()> {
    let method = match entry.compression {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    };
    let options = SimpleFileOptions::default().compression_method(method);

    writer
        .start_file(entry.name.as_str(), options)
        .map_err(|e| PptxError::ExportFailed(format!("{}: {}", entry.name, e)))?;
    writer.write_all(&entry.data)?;
    Ok(())
}

/// Part names are stored without a leading slash
fn normalize(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
