//! Chunked producer/consumer processing over FASTQ streams
//!
//! One reader thread parses records into bounded chunks and hands each chunk
//! to a pool of scoped workers over a rendezvous channel. The handoff blocks
//! the reader until the previous chunk has been taken, so peak memory stays
//! at one chunk being parsed plus one being processed, no matter how large
//! the input is.
//!
//! Records are assigned to workers in file order, but completion order
//! across workers is not guaranteed. Shared sinks go through [`SyncWriter`],
//! which keeps each record's write atomic without imposing a total order.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::error::{ConfigError, Result};
use crate::fastq::FastqReader;
use crate::record::Record;

/// Allowed range for the worker thread count
pub const THREADS_RANGE: (usize, usize) = (1, 16);

/// Trait for types that process records in parallel.
///
/// This is implemented by the **processor** not by the **reader**.
/// For the **reader**, see the [`ParallelReader`] trait.
///
/// Each worker thread operates on its own clone, so scratch state (alignment
/// matrices, buffers) is per-worker by construction; anything shared across
/// clones must be wrapped for concurrent access before cloning.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single record, mutating it in place where needed
    fn process_record(&mut self, record: &mut Record) -> Result<()>;

    /// Called when a worker finishes its share of a chunk
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Each worker calls this with its own unique ID before processing.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

/// Trait for readers that can drive a [`ParallelProcessor`] over all records
///
/// This is implemented by the **reader** not by the **processor**.
pub trait ParallelReader {
    /// Process every record, returning how many were processed
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for a thread count outside
    /// [`THREADS_RANGE`]; reader and processor failures propagate.
    fn process_parallel<P: ParallelProcessor>(self, processor: P, num_threads: usize)
        -> Result<u64>;
}

/// Validates the requested thread count and clamps it to the machine
fn validate_threads(requested: usize) -> Result<usize> {
    let (min, max) = THREADS_RANGE;
    if requested < min || requested > max {
        return Err(ConfigError::LengthOutOfRange {
            parameter: "thread count",
            value: requested,
            min,
            max,
        }
        .into());
    }
    Ok(requested.min(num_cpus::get()))
}

impl<R: std::io::BufRead + Send> ParallelReader for FastqReader<R> {
    fn process_parallel<P: ParallelProcessor>(
        mut self,
        processor: P,
        num_threads: usize,
    ) -> Result<u64> {
        let num_threads = validate_threads(num_threads)?;

        // Single-threaded mode skips batching and channels entirely
        if num_threads == 1 {
            let mut worker = processor;
            worker.set_tid(0);
            let mut count = 0u64;
            while let Some(mut record) = self.next_record()? {
                worker.process_record(&mut record)?;
                count += 1;
            }
            worker.on_batch_complete()?;
            return Ok(count);
        }

        let processed = AtomicU64::new(0);
        let (tx, rx) = mpsc::sync_channel::<Vec<Record>>(0);

        let outcome: Result<()> = thread::scope(|scope| {
            let reader_handle = scope.spawn(move || -> Result<()> {
                loop {
                    let chunk = self.read_chunk()?;
                    if chunk.is_empty() {
                        return Ok(());
                    }
                    // A closed channel means the consumer bailed on an error
                    if tx.send(chunk).is_err() {
                        return Ok(());
                    }
                }
            });

            let mut outcome: Result<()> = Ok(());
            for mut batch in &rx {
                if let Err(e) = process_batch(&mut batch, &processor, num_threads, &processed) {
                    outcome = Err(e);
                    break;
                }
            }
            // Unblocks the reader if we broke out early
            drop(rx);

            let reader_outcome = reader_handle.join().unwrap();
            if outcome.is_ok() {
                outcome = reader_outcome;
            }
            outcome
        });
        outcome?;

        Ok(processed.load(Ordering::Relaxed))
    }
}

/// Splits a chunk into contiguous near-equal ranges, one scoped worker each
fn process_batch<P: ParallelProcessor>(
    records: &mut [Record],
    processor: &P,
    num_threads: usize,
    processed: &AtomicU64,
) -> Result<()> {
    let per_thread = records.len().div_ceil(num_threads);
    thread::scope(|scope| {
        let mut handles = Vec::new();
        for (tid, slice) in records.chunks_mut(per_thread).enumerate() {
            let mut worker = processor.clone();
            handles.push(scope.spawn(move || -> Result<()> {
                worker.set_tid(tid);
                for record in slice.iter_mut() {
                    worker.process_record(record)?;
                    processed.fetch_add(1, Ordering::Relaxed);
                }
                worker.on_batch_complete()?;
                Ok(())
            }));
        }
        for handle in handles {
            handle.join().unwrap()?;
        }
        Ok(())
    })
}

/// Shared output stream with record-level write atomicity
///
/// Workers clone the wrapper and write whole records under one lock
/// acquisition each, so concurrent output never interleaves mid-record.
pub struct SyncWriter<W: Write> {
    inner: Arc<Mutex<W>>,
}

impl<W: Write> Clone for SyncWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SyncWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Writes one record's 4-line form as a single atomic unit
    ///
    /// # Errors
    /// Propagates write failures from the underlying sink.
    pub fn write_record(&self, record: &Record) -> Result<()> {
        let text = record.to_fastq();
        self.inner.lock().write_all(text.as_bytes())?;
        Ok(())
    }

    /// Writes an arbitrary byte run as a single atomic unit
    ///
    /// # Errors
    /// Propagates write failures from the underlying sink.
    pub fn write_all(&self, bytes: &[u8]) -> Result<()> {
        self.inner.lock().write_all(bytes)?;
        Ok(())
    }

    /// # Errors
    /// Propagates flush failures from the underlying sink.
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()?;
        Ok(())
    }

    /// Recovers the sink once every clone has been dropped
    #[must_use]
    pub fn into_inner(self) -> Option<W> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }
}
