// Gossip and routing engine for a payment-channel overlay network node.
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the MIT License
// along with this software.
// If not, see <https://opensource.org/licenses/MIT>.

//! The append-only gossip store: a file of length-prefixed, CRC-protected,
//! tombstonable records, with byte offsets as stable record identifiers and
//! an off-line compaction that reclaims tombstoned space.
//!
//! File layout: byte 0 is a format-version tag; records start at offset 1
//! and each record is `len:u32be | crc:u32be | timestamp:u32be | payload`.
//! The high bit of `len` is the tombstone flag; the CRC (Castagnoli, the
//! same polynomial bitcoind uses for compact blocks) covers
//! `timestamp_be || payload`, not the length field, so tombstoning a record
//! never invalidates its checksum.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::wire;

mod error;
pub use error::Error;

/// Currently the only format version this crate writes or accepts.
pub const FORMAT_VERSION: u8 = 0x05;

const HEADER_LEN: u64 = 4 + 4 + 4;
const TOMBSTONE_BIT: u32 = 0x8000_0000;
const LEN_MASK: u32 = 0x7FFF_FFFF;

/// A single decoded record read back from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Offset of the record's header, the stable identifier used by
    /// `tombstone`/`read_at` and embedded in broadcast records.
    pub offset: u64,
    pub timestamp: u32,
    pub tombstoned: bool,
    pub payload: Vec<u8>,
}

/// Outcome of reading one record during startup replay.
enum RecoveryStep {
    Record(Record, u64),
    /// The record's header or payload runs past the current end of file.
    TornWrite,
    /// The record is fully present but its CRC doesn't match.
    ChecksumMismatch(u64),
}

/// The outcome of a compaction pass: how many bytes the file shrank by, and
/// the post-compaction positions of any cursors supplied for migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactionReport {
    pub shrinkage: u64,
    pub migrated_cursors: Vec<u64>,
}

pub struct GossipStore {
    file: File,
    path: std::path::PathBuf,
    len: u64,
}

impl GossipStore {
    /// Opens an existing store or creates a new, empty one at `path`.
    /// On open, replays to end of file, truncating a torn trailing write
    /// but returning `Error::Corrupt` if a fully-written record's CRC
    /// doesn't check out.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let file_len = file.metadata()?.len();
        if file_len == 0 {
            file.write_all(&[FORMAT_VERSION])?;
            file.flush()?;
            return Ok(GossipStore { file, path, len: 1 });
        }
        let mut version = [0u8; 1];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut version)?;
        if version[0] != FORMAT_VERSION {
            return Err(Error::Corrupt(0));
        }
        let mut store = GossipStore { file, path, len: file_len };
        store.recover()?;
        Ok(store)
    }

    /// Total length of the store file, including the version byte.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len <= 1
    }

    /// Replays from offset 1. A record whose header or payload would run
    /// past the current end of file is a torn trailing write — the tell-tale
    /// sign of a process dying mid-`append` — and is truncated away. A
    /// record that fits entirely within the file but fails its CRC is
    /// genuine corruption, not an artifact of an interrupted write, and is
    /// surfaced as a fatal `Error::Corrupt` rather than silently dropped.
    fn recover(&mut self) -> Result<(), Error> {
        let mut offset = 1u64;
        loop {
            if offset == self.len {
                break;
            }
            match self.read_record_for_recovery(offset)? {
                RecoveryStep::Record(_, next_offset) => offset = next_offset,
                RecoveryStep::TornWrite => {
                    log::warn!(
                        "gossip store: torn write detected at offset {}, truncating",
                        offset
                    );
                    self.file.set_len(offset)?;
                    self.file.sync_all()?;
                    self.len = offset;
                    break;
                }
                RecoveryStep::ChecksumMismatch(offset) => {
                    log::error!(
                        "gossip store: checksum mismatch at offset {}, refusing to serve",
                        offset
                    );
                    return Err(Error::Corrupt(offset));
                }
            }
        }
        Ok(())
    }

    /// Reads the record at `offset`, reporting separately whether it's
    /// intact, a torn write (bounds run past EOF) or a checksum mismatch on
    /// an otherwise complete record. I/O errors still propagate via `?`.
    fn read_record_for_recovery(
        &mut self,
        offset: u64,
    ) -> Result<RecoveryStep, Error> {
        if offset + HEADER_LEN > self.len {
            return Ok(RecoveryStep::TornWrite);
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; HEADER_LEN as usize];
        self.file.read_exact(&mut header)?;
        let len_field = u32::from_be_bytes([
            header[0], header[1], header[2], header[3],
        ]);
        let crc_field = u32::from_be_bytes([
            header[4], header[5], header[6], header[7],
        ]);
        let timestamp = u32::from_be_bytes([
            header[8], header[9], header[10], header[11],
        ]);
        let tombstoned = len_field & TOMBSTONE_BIT != 0;
        let payload_len = (len_field & LEN_MASK) as u64;
        let payload_start = offset + HEADER_LEN;
        if payload_start + payload_len > self.len {
            return Ok(RecoveryStep::TornWrite);
        }
        let mut payload = vec![0u8; payload_len as usize];
        self.file.read_exact(&mut payload)?;

        let mut crc_input = Vec::with_capacity(4 + payload.len());
        crc_input.extend_from_slice(&timestamp.to_be_bytes());
        crc_input.extend_from_slice(&payload);
        if crc32c::crc32c(&crc_input) != crc_field {
            return Ok(RecoveryStep::ChecksumMismatch(offset));
        }

        let next_offset = payload_start + payload_len;
        Ok(RecoveryStep::Record(
            Record { offset, timestamp, tombstoned, payload },
            next_offset,
        ))
    }

    fn try_read_header_and_payload(
        &mut self,
        offset: u64,
    ) -> Result<(Record, u64), Error> {
        match self.read_record_for_recovery(offset)? {
            RecoveryStep::Record(record, next_offset) => Ok((record, next_offset)),
            RecoveryStep::TornWrite | RecoveryStep::ChecksumMismatch(_) => {
                Err(Error::Corrupt(offset))
            }
        }
    }

    /// Appends `payload` with the given timestamp and returns the byte
    /// offset of the new record's header. On a partial write the file is
    /// truncated back to the pre-append offset before the error is
    /// returned.
    pub fn append(
        &mut self,
        payload: &[u8],
        timestamp: u32,
    ) -> Result<u64, Error> {
        if payload.len() as u64 > LEN_MASK as u64 {
            return Err(Error::PayloadTooLarge(payload.len()));
        }
        let offset = self.len;
        let mut record = Vec::with_capacity(
            HEADER_LEN as usize + payload.len(),
        );
        let crc = {
            let mut crc_input = Vec::with_capacity(4 + payload.len());
            crc_input.extend_from_slice(&timestamp.to_be_bytes());
            crc_input.extend_from_slice(payload);
            crc32c::crc32c(&crc_input)
        };
        record.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        record.extend_from_slice(&crc.to_be_bytes());
        record.extend_from_slice(&timestamp.to_be_bytes());
        record.extend_from_slice(payload);

        self.file.seek(SeekFrom::Start(offset))?;
        match self.file.write_all(&record) {
            Ok(()) => {
                self.len = offset + record.len() as u64;
                Ok(offset)
            }
            Err(err) => {
                self.file.set_len(offset)?;
                Err(err.into())
            }
        }
    }

    /// Sets the tombstone bit on the record at `offset` via a single
    /// positional write of the length field; idempotent.
    pub fn tombstone(&mut self, offset: u64) -> Result<(), Error> {
        if offset + 4 > self.len {
            return Err(Error::NotFound(offset));
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut len_bytes = [0u8; 4];
        self.file.read_exact(&mut len_bytes)?;
        let len_field = u32::from_be_bytes(len_bytes) | TOMBSTONE_BIT;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&len_field.to_be_bytes())?;
        Ok(())
    }

    /// Reads the single record whose header starts at `offset`, regardless
    /// of its tombstone state. Returns the record and the offset of the
    /// next header.
    pub fn read_at(&mut self, offset: u64) -> Result<(Record, u64), Error> {
        self.try_read_header_and_payload(offset)
    }

    /// Advances from `offset`, skipping tombstoned records and records
    /// whose wire type isn't one of the three rebroadcastable kinds.
    /// Returns `None` at end of file.
    pub fn next(
        &mut self,
        mut offset: u64,
    ) -> Result<Option<(Record, u64)>, Error> {
        loop {
            if offset >= self.len {
                return Ok(None);
            }
            let (record, next_offset) = self.read_at(offset)?;
            if record.tombstoned {
                offset = next_offset;
                continue;
            }
            match wire::peek_type(&record.payload) {
                Ok(type_tag) if wire::is_rebroadcastable(type_tag) => {
                    return Ok(Some((record, next_offset)))
                }
                _ => {
                    offset = next_offset;
                    continue;
                }
            }
        }
    }

    /// Rewrites the store keeping only live records, in original order,
    /// preserving their timestamps but reassigning contiguous offsets.
    /// Cursor positions supplied in `cursors` are migrated to their
    /// equivalent position in the new file, conservatively: a cursor may
    /// end up re-emitting already-sent records, but never skips a live one.
    pub fn compact(
        &mut self,
        cursors: &[u64],
    ) -> Result<CompactionReport, Error> {
        let new_path = self.path.with_extension("compact.tmp");
        let mut new_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&new_path)?;
        new_file.write_all(&[FORMAT_VERSION])?;

        let mut offset = 1u64;
        while offset < self.len {
            let (record, next_offset) = self.read_at(offset)?;
            if !record.tombstoned {
                let crc = {
                    let mut crc_input =
                        Vec::with_capacity(4 + record.payload.len());
                    crc_input
                        .extend_from_slice(&record.timestamp.to_be_bytes());
                    crc_input.extend_from_slice(&record.payload);
                    crc32c::crc32c(&crc_input)
                };
                new_file.write_all(
                    &(record.payload.len() as u32).to_be_bytes(),
                )?;
                new_file.write_all(&crc.to_be_bytes())?;
                new_file.write_all(&record.timestamp.to_be_bytes())?;
                new_file.write_all(&record.payload)?;
            }
            offset = next_offset;
        }
        new_file.flush()?;
        new_file.sync_all()?;
        let new_len = new_file.metadata()?.len();
        let shrinkage = self.len.saturating_sub(new_len);
        log::debug!(
            "gossip store: compacted {} -> {} bytes ({} bytes reclaimed)",
            self.len, new_len, shrinkage
        );

        let mut migrated_cursors = Vec::with_capacity(cursors.len());
        for &cursor in cursors {
            migrated_cursors.push(Self::migrate_cursor(
                &mut new_file,
                new_len,
                cursor,
                shrinkage,
            )?);
        }

        std::fs::rename(&new_path, &self.path)?;
        self.file = new_file;
        self.len = new_len;
        Ok(CompactionReport { shrinkage, migrated_cursors })
    }

    /// The cursor-migration algorithm: `target = cursor - shrinkage`. If the
    /// cursor was at the old end of file the target is exact. Otherwise the
    /// new file is walked from offset 1, skipping whole records (tombstoned
    /// or not), until the cumulative bytes read reach or pass `target` —
    /// over-retransmitting when deletions cluster after the cursor, never
    /// under-retransmitting.
    fn migrate_cursor(
        new_file: &mut File,
        new_len: u64,
        cursor: u64,
        shrinkage: u64,
    ) -> Result<u64, Error> {
        let target = cursor.saturating_sub(shrinkage);
        if target >= new_len {
            return Ok(new_len);
        }
        let mut pos = 1u64;
        while pos < target {
            new_file.seek(SeekFrom::Start(pos))?;
            let mut header = [0u8; HEADER_LEN as usize];
            if new_file.read_exact(&mut header).is_err() {
                return Ok(new_len);
            }
            let len_field = u32::from_be_bytes([
                header[0], header[1], header[2], header[3],
            ]);
            let payload_len = (len_field & LEN_MASK) as u64;
            pos += HEADER_LEN + payload_len;
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{
        GossipTimestampFilter, Message, TYPE_GOSSIP_TIMESTAMP_FILTER,
    };
    use lightning_encoding::LightningEncode;

    fn sample_payload() -> Vec<u8> {
        let msg = Message::GossipTimestampFilter(GossipTimestampFilter {
            chain_hash: Default::default(),
            first_timestamp: 1,
            timestamp_range: 2,
        });
        let mut buf = Vec::new();
        msg.lightning_encode(&mut buf).unwrap();
        buf
    }

    #[test]
    fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GossipStore::open(dir.path().join("gossip.store")).unwrap();
        let payload = sample_payload();
        let offset = store.append(&payload, 1000).unwrap();
        let (record, _) = store.read_at(offset).unwrap();
        assert_eq!(record.payload, payload);
        assert_eq!(record.timestamp, 1000);
        assert!(!record.tombstoned);
    }

    #[test]
    fn tombstone_is_idempotent_and_skipped_by_next() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GossipStore::open(dir.path().join("gossip.store")).unwrap();
        let payload = sample_payload();
        let offset = store.append(&payload, 1000).unwrap();
        store.tombstone(offset).unwrap();
        store.tombstone(offset).unwrap();
        let (record, _) = store.read_at(offset).unwrap();
        assert!(record.tombstoned);
        assert_eq!(store.next(1).unwrap(), None);
    }

    #[test]
    fn corrupt_crc_is_rejected_on_reopen() {
        use std::io::Write as _;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gossip.store");
        {
            let mut store = GossipStore::open(&path).unwrap();
            store.append(&sample_payload(), 1000).unwrap();
        }
        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_LEN + 1)).unwrap();
            file.write_all(&[0xFF]).unwrap();
        }
        // The record is fully present in the file; a bad CRC here is
        // genuine corruption, not a torn write, and must not be silently
        // dropped.
        let err = GossipStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Corrupt(1)));
    }

    #[test]
    fn torn_trailing_write_is_truncated_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gossip.store");
        {
            let mut store = GossipStore::open(&path).unwrap();
            store.append(&sample_payload(), 1000).unwrap();
        }
        let full_len = std::fs::metadata(&path).unwrap().len();
        {
            let file = OpenOptions::new().write(true).open(&path).unwrap();
            file.set_len(full_len - 1).unwrap();
        }
        let store = GossipStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn compaction_shrinks_and_migrates_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GossipStore::open(dir.path().join("gossip.store")).unwrap();
        let mut offsets = Vec::new();
        for i in 0..10u32 {
            offsets.push(store.append(&sample_payload(), 1000 + i).unwrap());
        }
        store.tombstone(offsets[2]).unwrap();
        store.tombstone(offsets[6]).unwrap();
        let cursor_before = offsets[5];
        let report = store.compact(&[cursor_before]).unwrap();
        assert!(report.shrinkage > 0);
        let new_cursor = report.migrated_cursors[0];
        let (record, _) = store.read_at(new_cursor).unwrap();
        assert_eq!(record.timestamp, 1000 + 5);
    }
}
