//! Capacity-bounded special day store backed by a slot file.
//!
//! The store keeps at most [`CAPACITY`] entries in insertion order. Entry `i`
//! lives in slot `i` of the backing, at byte offset `i * stride`. The backing
//! is anything seekable and readable/writable: a [`File`] in the binary, an
//! in-memory cursor in tests.
//!
//! Loading reads whole slots until a short or empty read. A slot that does
//! not decode stays occupied and is written back byte for byte, so an entry's
//! index is always its slot. Persisting rewrites every held slot in place and
//! never truncates, so slots past the in-memory count keep whatever they held.

use crate::codec::RecordCodec;
use crate::date;
use crate::error::ErrorCode;
use crate::model::day::SpecialDay;
use chrono::{DateTime, Local, TimeZone};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum number of special days a store holds.
pub const CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors raised by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store already holds [`CAPACITY`] entries; nothing was changed.
    #[error("cannot add more than {capacity} special days")]
    CapacityExceeded { capacity: usize },

    /// The backing file could not be opened or created.
    #[error("failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Reading slot `slot` failed. Loading cannot continue.
    #[error("failed to read slot {slot}: {source}")]
    Read { slot: usize, source: io::Error },

    /// Writing slot `slot` failed.
    #[error("failed to write slot {slot}: {source}")]
    Write { slot: usize, source: io::Error },

    /// Flushing the backing after a full rewrite failed.
    #[error("failed to flush data file: {0}")]
    Flush(#[source] io::Error),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::Open { .. } => ErrorCode::FileOpenFailed,
            Self::Read { .. } => ErrorCode::ReadFailed,
            Self::Write { .. } | Self::Flush(_) => ErrorCode::WriteFailed,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// One row of a listing snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Slot index of the entry.
    pub index: usize,
    pub day: SpecialDay,
    /// Days since the entry's date, or [`date::UNPARSEABLE_DAYS`].
    pub days: i32,
}

/// Summary of one [`SpecialDayStore::load_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Size of the backing before loading, in bytes.
    pub file_size: u64,
    /// Entries added to the store.
    pub loaded: usize,
    /// Length of a trailing partial slot, if one was discarded.
    pub truncated_bytes: Option<usize>,
    /// Complete slots that failed to decode. They still occupy their slot.
    pub rejected: usize,
    /// Complete slots read past because the store was full.
    pub over_capacity: usize,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Contents of one occupied slot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Day(SpecialDay),
    /// A record that did not decode, kept verbatim.
    Unreadable(Vec<u8>),
}

impl Slot {
    const fn day(&self) -> Option<&SpecialDay> {
        match self {
            Self::Day(day) => Some(day),
            Self::Unreadable(_) => None,
        }
    }
}

/// Ordered, capacity-bounded collection of special days and its backing.
#[derive(Debug)]
pub struct SpecialDayStore<B> {
    slots: Vec<Slot>,
    codec: RecordCodec,
    backing: B,
}

impl SpecialDayStore<File> {
    /// Open (creating if absent) the data file at `path`, owner read/write only.
    ///
    /// The returned store is empty; call [`load_all`](Self::load_all) to fill it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if the file cannot be opened read-write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened data file");
        Ok(Self::new(file))
    }
}

impl<B> SpecialDayStore<B> {
    /// Create an empty store over `backing`, measuring the record stride.
    pub fn new(backing: B) -> Self {
        Self {
            slots: Vec::with_capacity(CAPACITY),
            codec: RecordCodec::new(),
            backing,
        }
    }

    /// Append `day` at the next free slot and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] when the store is full. The
    /// store is left unchanged.
    pub fn add(&mut self, day: SpecialDay) -> Result<usize, StoreError> {
        if self.is_full() {
            warn!(
                capacity = CAPACITY,
                name = day.name(),
                "special day not added: store is full"
            );
            return Err(StoreError::CapacityExceeded { capacity: CAPACITY });
        }
        let index = self.slots.len();
        debug!(index, name = day.name(), kind = %day.kind(), "special day added");
        self.slots.push(Slot::Day(day));
        Ok(index)
    }

    /// Snapshot every entry with its day count against the local clock.
    #[must_use]
    pub fn list(&self) -> Vec<Listing> {
        self.list_at(&Local::now())
    }

    /// Snapshot every entry with its day count against `now`.
    #[must_use]
    pub fn list_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<Listing> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let day = slot.day()?;
                Some(Listing {
                    index,
                    day: day.clone(),
                    days: date::days_since_at(day.date(), now),
                })
            })
            .collect()
    }

    /// Occupied slots, unreadable records included. This is what
    /// [`CAPACITY`] bounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= CAPACITY
    }

    /// Slots holding a record that did not decode.
    #[must_use]
    pub fn unreadable(&self) -> usize {
        self.slots.iter().filter(|slot| slot.day().is_none()).count()
    }

    /// The day in slot `index`, if that slot holds a readable one.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SpecialDay> {
        self.slots.get(index).and_then(Slot::day)
    }

    /// Readable days in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &SpecialDay> {
        self.slots.iter().filter_map(Slot::day)
    }

    /// Byte length of one slot.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.codec.stride()
    }

    /// Release the backing, dropping the in-memory entries.
    pub fn into_backing(self) -> B {
        self.backing
    }
}

impl<B: Read + Write + Seek> SpecialDayStore<B> {
    /// Append every complete slot of the backing to the store.
    ///
    /// Slots are read from the start of the backing. A trailing partial slot
    /// is logged and discarded. Once the store is full the remaining complete
    /// slots are read past and counted in [`LoadReport::over_capacity`]. A
    /// slot that does not decode is logged and counted in
    /// [`LoadReport::rejected`]; it keeps its slot and is persisted unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] on any I/O error. Entries decoded before
    /// the failure remain in the store, but callers should treat the load as
    /// failed.
    pub fn load_all(&mut self) -> Result<LoadReport, StoreError> {
        let stride = self.codec.stride();

        let file_size = self.backing.seek(SeekFrom::End(0)).map_err(read_error(0))?;
        info!(file_size, stride, "loading special days");
        self.backing.seek(SeekFrom::Start(0)).map_err(read_error(0))?;

        let mut report = LoadReport {
            file_size,
            ..LoadReport::default()
        };
        let mut buf = vec![0_u8; stride];

        for slot in 0_usize.. {
            let read = read_slot(&mut self.backing, &mut buf).map_err(read_error(slot))?;
            if read == 0 {
                break;
            }
            if read < stride {
                warn!(
                    slot,
                    expected = stride,
                    read,
                    "truncated trailing record discarded"
                );
                report.truncated_bytes = Some(read);
                break;
            }
            if self.is_full() {
                report.over_capacity += 1;
                continue;
            }
            match self.codec.decode(&buf) {
                Ok(day) => {
                    self.slots.push(Slot::Day(day));
                    report.loaded += 1;
                }
                Err(err) => {
                    warn!(
                        slot,
                        code = %err.code(),
                        summary = err.code().message(),
                        error = %err,
                        "unreadable record kept as is"
                    );
                    self.slots.push(Slot::Unreadable(buf.clone()));
                    report.rejected += 1;
                }
            }
        }

        if report.over_capacity > 0 {
            warn!(
                capacity = CAPACITY,
                skipped = report.over_capacity,
                "data file holds more records than the store keeps; surplus slots left on disk"
            );
        }
        info!(
            loaded = report.loaded,
            rejected = report.rejected,
            "special days loaded"
        );
        Ok(report)
    }

    /// Rewrite every held entry into its slot.
    ///
    /// Slot `i` is written at offset `i * stride`, overwriting what was there.
    /// Bytes past the last held slot are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] naming the slot that failed, or
    /// [`StoreError::Flush`].
    pub fn persist_all(&mut self) -> Result<(), StoreError> {
        for (slot, held) in self.slots.iter().enumerate() {
            let encoded;
            let record = match held {
                Slot::Day(day) => {
                    encoded = self.codec.encode(day);
                    encoded.as_bytes()
                }
                Slot::Unreadable(raw) => raw.as_slice(),
            };
            let write_err = move |source| StoreError::Write { slot, source };
            self.backing
                .seek(SeekFrom::Start(self.codec.offset(slot)))
                .map_err(write_err)?;
            self.backing.write_all(record).map_err(write_err)?;
        }
        self.backing.flush().map_err(StoreError::Flush)?;
        debug!(
            records = self.slots.len(),
            stride = self.codec.stride(),
            "special days persisted"
        );
        Ok(())
    }
}

fn read_error(slot: usize) -> impl FnOnce(io::Error) -> StoreError {
    move |source| StoreError::Read { slot, source }
}

/// Read until `buf` is full or the reader is exhausted.
fn read_slot<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::model::day::Kind;
    use chrono::Utc;
    use std::io::Cursor;

    fn day(date: &str, name: &str, kind: Kind) -> SpecialDay {
        SpecialDay::new(date, name, kind).unwrap()
    }

    fn memory_store() -> SpecialDayStore<Cursor<Vec<u8>>> {
        SpecialDayStore::new(Cursor::new(Vec::new()))
    }

    fn records(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| codec::encode(&day("2020-01-01", &format!("day-{i}"), Kind::Memo)).into_bytes())
            .collect()
    }

    #[test]
    fn add_fills_to_capacity_then_refuses() {
        let mut store = memory_store();
        for i in 0..CAPACITY {
            let index = store.add(day("2020-01-01", &format!("d{i}"), Kind::Birth)).unwrap();
            assert_eq!(index, i);
        }
        assert!(store.is_full());

        let err = store.add(day("2020-01-01", "extra", Kind::Birth)).unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { capacity: CAPACITY }));
        assert_eq!(err.code(), ErrorCode::CapacityExceeded);
        assert_eq!(store.len(), CAPACITY);
        assert_eq!(store.get(CAPACITY - 1).unwrap().name(), "d31");
    }

    #[test]
    fn list_recomputes_counts_for_each_now() {
        let mut store = memory_store();
        store.add(day("2020-01-01", "new year", Kind::Memo)).unwrap();
        store.add(day("abc", "broken", Kind::Countdown)).unwrap();

        let first = store.list_at(&Utc.with_ymd_and_hms(2020, 1, 11, 0, 0, 0).unwrap());
        let later = store.list_at(&Utc.with_ymd_and_hms(2020, 1, 12, 0, 0, 0).unwrap());

        assert_eq!(first[0].index, 0);
        assert_eq!(first[0].days, 10);
        assert_eq!(later[0].days, 11);
        assert_eq!(first[1].index, 1);
        assert_eq!(first[1].days, date::UNPARSEABLE_DAYS);
        assert_eq!(first[1].day.name(), "broken");
    }

    #[test]
    fn persist_writes_each_entry_at_its_slot_offset() {
        let mut store = memory_store();
        store.add(day("2010-07-22", "meet", Kind::Memo)).unwrap();
        store.add(day("2018-09-18", "moon", Kind::Birth)).unwrap();
        store.persist_all().unwrap();

        let stride = store.stride();
        let bytes = store.into_backing().into_inner();
        assert_eq!(bytes.len(), 2 * stride);
        assert_eq!(&bytes[stride..], codec::encode(&day("2018-09-18", "moon", Kind::Birth)).as_bytes());
    }

    #[test]
    fn persist_then_load_reproduces_entries() {
        let mut store = memory_store();
        let originals = [
            day("2010-07-22", "meet", Kind::Memo),
            day("2016-11-27 09", "小泥巴", Kind::Birth),
            day("2030-01-01 00:00:00", "launch", Kind::Countdown),
        ];
        for d in &originals {
            store.add(d.clone()).unwrap();
        }
        store.persist_all().unwrap();

        let mut fresh = SpecialDayStore::new(store.into_backing());
        let report = fresh.load_all().unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.file_size, 180);
        assert_eq!(fresh.iter().cloned().collect::<Vec<_>>(), originals);
    }

    #[test]
    fn load_discards_truncated_tail() {
        let mut bytes = records(2);
        bytes.extend_from_slice(b"2020-");
        let mut store = SpecialDayStore::new(Cursor::new(bytes));

        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.truncated_bytes, Some(5));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn load_of_empty_backing_is_empty() {
        let mut store = memory_store();
        let report = store.load_all().unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(store.is_empty());
    }

    #[test]
    fn load_stops_adding_at_capacity_and_persist_keeps_the_tail() {
        let original = records(40);
        let mut store = SpecialDayStore::new(Cursor::new(original.clone()));
        let report = store.load_all().unwrap();
        assert_eq!(store.len(), CAPACITY);
        assert_eq!(report.over_capacity, 8);

        let mut replacement = SpecialDayStore::new(store.into_backing());
        for i in 0..CAPACITY {
            replacement.add(day("1999-12-31", &format!("new-{i}"), Kind::Birth)).unwrap();
        }
        replacement.persist_all().unwrap();

        let stride = replacement.stride();
        let bytes = replacement.into_backing().into_inner();
        assert_eq!(bytes.len(), original.len());
        assert_ne!(&bytes[..CAPACITY * stride], &original[..CAPACITY * stride]);
        assert_eq!(&bytes[CAPACITY * stride..], &original[CAPACITY * stride..]);
    }

    fn bad_kind_record(name: &str) -> Vec<u8> {
        format!("{:>20} {:>36} 9\n", "2020-01-01", name).into_bytes()
    }

    fn with_bad_middle_slot() -> Vec<u8> {
        let mut bytes = codec::encode(&day("2020-01-01", "A", Kind::Memo)).into_bytes();
        bytes.extend(bad_kind_record("bad"));
        bytes.extend(codec::encode(&day("2020-02-02", "B", Kind::Birth)).into_bytes());
        bytes
    }

    #[test]
    fn unreadable_records_keep_their_slot() {
        let mut store = SpecialDayStore::new(Cursor::new(with_bad_middle_slot()));

        let report = store.load_all().unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.unreadable(), 1);
        assert!(store.get(1).is_none());
        assert_eq!(store.get(2).unwrap().name(), "B");

        let indices: Vec<_> = store.list().iter().map(|row| row.index).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn persist_after_unreadable_record_rewrites_file_unchanged() {
        let original = with_bad_middle_slot();
        let mut store = SpecialDayStore::new(Cursor::new(original.clone()));
        store.load_all().unwrap();
        store.persist_all().unwrap();

        let bytes = store.into_backing().into_inner();
        assert_eq!(bytes, original);

        let mut reloaded = SpecialDayStore::new(Cursor::new(bytes));
        reloaded.load_all().unwrap();
        let names: Vec<_> = reloaded.iter().map(SpecialDay::name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn add_after_unreadable_record_uses_the_next_free_slot() {
        let mut store = SpecialDayStore::new(Cursor::new(with_bad_middle_slot()));
        store.load_all().unwrap();
        let index = store.add(day("2021-03-03", "C", Kind::Countdown)).unwrap();
        assert_eq!(index, 3);
        store.persist_all().unwrap();

        let stride = store.stride();
        let bytes = store.into_backing().into_inner();
        assert_eq!(bytes.len(), 4 * stride);
        assert_eq!(&bytes[stride..2 * stride], bad_kind_record("bad").as_slice());
        assert_eq!(
            &bytes[3 * stride..],
            codec::encode(&day("2021-03-03", "C", Kind::Countdown)).as_bytes()
        );
    }

    #[test]
    fn unreadable_records_count_toward_capacity() {
        let mut bytes = records(CAPACITY - 1);
        bytes.extend(bad_kind_record("bad"));
        let mut store = SpecialDayStore::new(Cursor::new(bytes));
        store.load_all().unwrap();

        assert!(store.is_full());
        assert!(store.add(day("2020-01-01", "extra", Kind::Memo)).is_err());
        assert_eq!(store.list().len(), CAPACITY - 1);
    }

    struct BrokenDisk;

    impl Read for BrokenDisk {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("bad sector"))
        }
    }

    impl Write for BrokenDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("read-only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for BrokenDisk {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn read_errors_fail_the_load() {
        let mut store = SpecialDayStore::new(BrokenDisk);
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Read { slot: 0, .. }));
        assert_eq!(err.code(), ErrorCode::ReadFailed);
        assert!(err.to_string().contains("bad sector"));
    }

    #[test]
    fn write_errors_name_the_slot() {
        let mut store = SpecialDayStore::new(BrokenDisk);
        store.add(day("2020-01-01", "x", Kind::Memo)).unwrap();
        let err = store.persist_all().unwrap_err();
        assert!(matches!(err, StoreError::Write { slot: 0, .. }));
        assert!(err.hint().is_some());
    }

    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(7);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn read_slot_gathers_short_reads() {
        let mut reader = Trickle(Cursor::new(records(1)));
        let mut buf = vec![0_u8; 60];
        assert_eq!(read_slot(&mut reader, &mut buf).unwrap(), 60);
        assert_eq!(read_slot(&mut reader, &mut buf).unwrap(), 0);
    }
}
