// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Streaming list container with an in-memory and a disk-spilled backing.
//!
//! The engine iterates every list through [Seq], so matching semantics are
//! identical whether the elements live on the heap or in a temp file. The
//! disk format is one JSON value per line (UTF-8, LF, the `null` literal
//! for nil) so a spilled store is inspectable with ordinary line tools.
//!

use crate::{MatchError, Num, Value, config::config};
use std::{
    cell::RefCell,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    rc::Rc,
};
use tempfile::NamedTempFile;
use tracing::debug;

/// A sequence of values, possibly disk-backed. Cloning is cheap (shared
/// handle); a single top-level match owns its sequences, so no locking.
#[derive(Clone, Debug)]
pub struct Seq(Rc<Backing>);

#[derive(Debug)]
enum Backing {
    Mem(Vec<Value>),
    Disk(DiskSeq),
}

impl Seq {
    /// Wrap a vector without any spill consideration.
    pub fn in_memory(values: Vec<Value>) -> Seq {
        Seq(Rc::new(Backing::Mem(values)))
    }

    /// Force the elements into a disk-backed store.
    pub fn spilled(values: &[Value]) -> Result<Seq, MatchError> {
        Ok(Seq(Rc::new(Backing::Disk(DiskSeq::create(values)?))))
    }

    /// Apply the spill policy against the configured threshold.
    pub fn from_values(values: Vec<Value>) -> Result<Seq, MatchError> {
        Seq::from_values_with_threshold(values, config().spill_threshold())
    }

    /// Apply the spill policy against an explicit byte threshold.
    pub fn from_values_with_threshold(
        values: Vec<Value>,
        threshold: usize,
    ) -> Result<Seq, MatchError> {
        let cost = estimate_list(&values);
        if cost > threshold {
            debug!("estimated {cost} bytes > {threshold}, spilling {} values", values.len());
            Seq::spilled(&values)
        } else {
            Ok(Seq::in_memory(values))
        }
    }

    /// Number of elements. O(1) for both backings.
    pub fn len(&self) -> usize {
        match &*self.0 {
            Backing::Mem(xs) => xs.len(),
            Backing::Disk(d) => d.offsets.len(),
        }
    }

    /// Return TRUE if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return TRUE if the elements live in a temp file.
    pub fn is_disk_backed(&self) -> bool {
        matches!(&*self.0, Backing::Disk(_))
    }

    /// Random access. Out of range is a usage error; a closed disk store
    /// reports [MatchError::StoreClosed].
    pub fn get(&self, i: usize) -> Result<Value, MatchError> {
        match &*self.0 {
            Backing::Mem(xs) => xs
                .get(i)
                .cloned()
                .ok_or_else(|| MatchError::Usage(format!("index {i} out of range").into())),
            Backing::Disk(d) => d.get(i),
        }
    }

    /// Single-pass iteration. The disk variant holds its own file handle
    /// and releases it on exhaustion or early drop.
    pub fn iter(&self) -> SeqIter<'_> {
        match &*self.0 {
            Backing::Mem(xs) => SeqIter(IterInner::Mem(xs.iter())),
            Backing::Disk(d) => {
                let guard = d.file.borrow();
                match guard.as_ref() {
                    Some(f) => match File::open(f.path()) {
                        Ok(file) => SeqIter(IterInner::Disk {
                            reader: Some(BufReader::new(file)),
                            remaining: d.offsets.len(),
                        }),
                        Err(e) => SeqIter(IterInner::Poisoned(Some(MatchError::Io(e)))),
                    },
                    None => SeqIter(IterInner::Poisoned(Some(MatchError::StoreClosed))),
                }
            }
        }
    }

    /// Release the backing resources. Deletes the temp file of a
    /// disk-backed store; a second close is [MatchError::StoreClosed].
    /// No-op for the in-memory variant.
    pub fn close(&self) -> Result<(), MatchError> {
        match &*self.0 {
            Backing::Mem(_) => Ok(()),
            Backing::Disk(d) => d.close(),
        }
    }
}

/// Single-pass iterator over a [Seq], yielding owned values.
pub struct SeqIter<'a>(IterInner<'a>);

enum IterInner<'a> {
    Mem(std::slice::Iter<'a, Value>),
    Disk {
        reader: Option<BufReader<File>>,
        remaining: usize,
    },
    Poisoned(Option<MatchError>),
}

impl Iterator for SeqIter<'_> {
    type Item = Result<Value, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            IterInner::Mem(it) => it.next().map(|v| Ok(v.clone())),
            IterInner::Disk { reader, remaining } => {
                if *remaining == 0 {
                    // release the file handle on exhaustion...
                    *reader = None;
                    return None;
                }
                let r = reader.as_mut()?;
                let mut line = String::new();
                match r.read_line(&mut line) {
                    Ok(_) => (),
                    Err(e) => {
                        *reader = None;
                        *remaining = 0;
                        return Some(Err(MatchError::Io(e)));
                    }
                }
                *remaining -= 1;
                match serde_json::from_str::<serde_json::Value>(line.trim_end_matches('\n')) {
                    Ok(json) => Some(Ok(Value::from_json(&json))),
                    Err(e) => {
                        *reader = None;
                        *remaining = 0;
                        Some(Err(MatchError::Json(e)))
                    }
                }
            }
            IterInner::Poisoned(e) => e.take().map(Err),
        }
    }
}

/// Disk-backed value sequence: one JSON value per line in a temp file, with
/// a recorded byte offset per line for random access.
#[derive(Debug)]
pub struct DiskSeq {
    file: RefCell<Option<NamedTempFile>>,
    offsets: Vec<u64>,
    total: u64,
}

impl DiskSeq {
    /// Serialize the given values into a fresh temp file.
    pub fn create(values: &[Value]) -> Result<DiskSeq, MatchError> {
        let file = tempfile::Builder::new()
            .prefix("deep-match-")
            .suffix(".jsonl")
            .tempfile()?;
        let mut offsets = Vec::with_capacity(values.len());
        let mut pos: u64 = 0;
        {
            let mut w = BufWriter::new(file.as_file());
            for v in values {
                offsets.push(pos);
                let line = serde_json::to_string(&v.to_json())?;
                w.write_all(line.as_bytes())?;
                w.write_all(b"\n")?;
                pos += line.len() as u64 + 1;
            }
            w.flush()?;
        }
        debug!("spilled {} values ({pos} bytes) to {:?}", values.len(), file.path());
        Ok(DiskSeq {
            file: RefCell::new(Some(file)),
            offsets,
            total: pos,
        })
    }

    fn get(&self, i: usize) -> Result<Value, MatchError> {
        let guard = self.file.borrow();
        let file = guard.as_ref().ok_or(MatchError::StoreClosed)?;
        let start = *self
            .offsets
            .get(i)
            .ok_or_else(|| MatchError::Usage(format!("index {i} out of range").into()))?;
        let end = self.offsets.get(i + 1).copied().unwrap_or(self.total);
        // exclude the LF terminator...
        let mut buf = vec![0u8; (end - start - 1) as usize];
        let mut f = file.as_file();
        f.seek(SeekFrom::Start(start))?;
        f.read_exact(&mut buf)?;
        let json: serde_json::Value = serde_json::from_slice(&buf)?;
        Ok(Value::from_json(&json))
    }

    fn close(&self) -> Result<(), MatchError> {
        match self.file.borrow_mut().take() {
            Some(f) => {
                f.close()?;
                Ok(())
            }
            None => Err(MatchError::StoreClosed),
        }
    }
}

// ===== spill-cost estimation ================================================

// Documented per-kind heap approximations. Deliberately crude: the goal is
// spill-avoidance for small inputs and memory-safety for large ones, not
// precise accounting.
const COST_NULL: usize = 8;
const COST_BOOL: usize = 16;
const COST_NUMBER: usize = 24;

fn estimate_str(s: &str) -> usize {
    40 + 2 * s.len()
}

/// Estimated heap bytes of one value. Pure and allocation-free.
pub fn estimate(value: &Value) -> usize {
    match value {
        Value::Null => COST_NULL,
        Value::Bool(_) => COST_BOOL,
        Value::Num(n) => match n {
            // big decimals carry their digits on the heap...
            Num::Big(b) => COST_NUMBER + 2 * b.digits() as usize,
            _ => COST_NUMBER,
        },
        Value::Str(s) => estimate_str(s),
        Value::Bytes(b) => 16 + b.len(),
        Value::List(xs) => match xs.iter_in_memory() {
            Some(values) => estimate_list(values),
            // already spilled; costs no heap worth counting...
            None => 40,
        },
        Value::Map(m) => {
            48 + m
                .iter()
                .map(|(k, v)| 32 + estimate_str(k) + estimate(v))
                .sum::<usize>()
        }
        Value::Xml(x) => {
            48 + estimate_str(&x.name)
                + x.attrs
                    .iter()
                    .map(|(k, v)| 32 + estimate_str(k) + estimate_str(v))
                    .sum::<usize>()
                + x.children.len() * 8
                + x.text.as_deref().map(estimate_str).unwrap_or(0)
        }
        Value::Other(s) => estimate_str(s),
    }
}

/// Estimated heap bytes of a whole collection.
pub fn estimate_list(values: &[Value]) -> usize {
    40 + values.iter().map(|v| 8 + estimate(v)).sum::<usize>()
}

impl Seq {
    // in-memory slice view used by the estimator; `None` when disk-backed.
    fn iter_in_memory(&self) -> Option<&[Value]> {
        match &*self.0 {
            Backing::Mem(xs) => Some(xs),
            Backing::Disk(_) => None,
        }
    }
}
