//! Frame buffer pool
//!
//! Recycles frame buffers between encode calls. A frame is always owned by
//! exactly one place: the free list, the in-flight queue (submitted to the
//! codec, waiting for its packet), or the caller that acquired it.
//!
//! # Shrinking
//!
//! The pool tracks a single "last used" instant, set whenever a frame is
//! released into an empty free list. Releases into a non-empty free list
//! are kept only while that instant is younger than the idle window;
//! later ones are freed. When the frame rate drops, surplus buffers drain
//! away instead of accumulating.
//!
//! # Owed recycles
//!
//! A codec may hand back a packet before the frame of the same call is
//! accepted. A recycle that finds the in-flight queue empty is owed and
//! settled by the next [`FramePool::track_in_flight`].

use super::buffer::{FrameBuffer, FrameGeometry};
use crate::error::Result;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Lifetime counters, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Frames created by `acquire`
    pub allocated: u64,
    /// `acquire` calls served from the free list
    pub reused: u64,
    /// Frames freed by the idle policy
    pub dropped: u64,
}

pub struct FramePool<F: FrameBuffer> {
    geometry: FrameGeometry,
    idle_window: Duration,
    free: Vec<F>,
    in_flight: VecDeque<F>,
    last_used: Option<Instant>,
    owed_recycles: usize,
    stats: PoolStats,
}

impl<F: FrameBuffer> FramePool<F> {
    pub fn new(geometry: FrameGeometry, idle_window: Duration) -> Self {
        FramePool {
            geometry,
            idle_window,
            free: Vec::new(),
            in_flight: VecDeque::new(),
            last_used: None,
            owed_recycles: 0,
            stats: PoolStats::default(),
        }
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Most recently released free frame, or a fresh allocation.
    ///
    /// # Errors
    ///
    /// `EncoderError::Allocation` if a new frame cannot be allocated.
    pub fn acquire(&mut self) -> Result<F> {
        if let Some(frame) = self.free.pop() {
            self.stats.reused += 1;
            return Ok(frame);
        }

        let frame = F::allocate(&self.geometry)?;
        self.stats.allocated += 1;
        Ok(frame)
    }

    pub fn release(&mut self, frame: F) {
        self.release_at(frame, Instant::now());
    }

    /// [`release`](Self::release) with an explicit clock reading.
    pub fn release_at(&mut self, frame: F, now: Instant) {
        if self.free.is_empty() {
            self.free.push(frame);
            self.last_used = Some(now);
            return;
        }

        let fresh = self
            .last_used
            .is_some_and(|last| now.saturating_duration_since(last) < self.idle_window);
        if fresh {
            self.free.push(frame);
        } else {
            self.stats.dropped += 1;
        }
    }

    /// Queues a frame the codec session has accepted, or releases it
    /// straight away when a recycle is owed.
    pub fn track_in_flight(&mut self, frame: F) {
        self.in_flight.push_back(frame);
        if self.owed_recycles > 0 {
            self.owed_recycles -= 1;
            self.recycle_oldest();
        }
    }

    /// Releases the oldest in-flight frame. With nothing queued the
    /// recycle is owed to the next tracked frame and false is returned.
    pub fn recycle_oldest(&mut self) -> bool {
        match self.in_flight.pop_front() {
            Some(frame) => {
                self.release(frame);
                true
            }
            None => {
                self.owed_recycles += 1;
                false
            }
        }
    }

    /// Recycles waiting for a frame to be tracked.
    pub fn owed_recycles(&self) -> usize {
        self.owed_recycles
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Frees every pooled and in-flight frame.
    pub fn clear(&mut self) {
        self.free.clear();
        self.in_flight.clear();
        self.last_used = None;
        self.owed_recycles = 0;
    }
}
