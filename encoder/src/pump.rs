//! Encode pump
//!
//! Drives a [`CodecSession`] one frame at a time. Submit and drain may each
//! answer "not ready", so neither is allowed to block: every call
//! interleaves both under a fixed time budget and either makes progress or
//! fails deterministically.
//!
//! # Per-frame loop
//!
//! ```text
//! while (!submitted || (lagging && !drained)) && now <= deadline:
//!     submit  -> Ok: frame in flight | NotReady: retry, or skip if a packet
//!                already came out | EndOfStream: give up on the frame
//!     drain   -> Ok: packet ready, oldest in-flight frame recycled
//!                NotReady: done if submitted, fatal if submit also stalled
//!                EndOfStream: stop draining, the call fails once the loop ends
//!     sleep retry_interval if either side is still pending
//! ```
//!
//! An unsubmitted frame always goes back to the pool, on error paths too.
//!
//! The first packet of the session goes through the codec handler to
//! capture parameter sets and SEI.

use crate::bitstream::{DiscardRule, StreamHeaders};
use crate::codecs::{CodecHandler, handler_for};
use crate::config::PumpConfig;
use crate::constants::logging::ENCODER_LOG_INTERVAL;
use crate::error::{EncoderError, Result};
use crate::frame::{FrameGeometry, FramePool, PoolStats, RawFrame, copy_planes};
use crate::session::{CodecSession, EncodedPacket, SessionError, SessionResult};
use logging::Logger;
use std::thread;
use std::time::Instant;

pub struct EncodePump<S: CodecSession> {
    session: S,
    handler: Box<dyn CodecHandler>,
    pool: FramePool<S::Frame>,
    packet: EncodedPacket,
    headers: StreamHeaders,
    config: PumpConfig,
    discard_rule: DiscardRule,
    geometry: FrameGeometry,
    submitted_frames: u64,
    encode_calls: u64,
    have_first_packet: bool,
    finished: bool,
    logger: Logger,
}

impl<S: CodecSession> EncodePump<S> {
    /// Wraps an opened session. The header strategy is chosen here from
    /// the session's codec family.
    pub fn new(session: S, config: PumpConfig, discard_rule: DiscardRule, logger: &Logger) -> Self {
        let handler = handler_for(session.codec_id());
        let geometry = session.geometry();
        let logger = logger
            .for_component("pump")
            .with_field("codec", session.codec_name());

        logger.info(&format!(
            "Pump ready: {}x{} {}, lag={}, headers={}, budget={:?}, discard={:?}",
            geometry.width,
            geometry.height,
            geometry.format,
            session.pipeline_depth(),
            handler.name(),
            config.budget(),
            discard_rule
        ));

        EncodePump {
            pool: FramePool::new(geometry, config.idle_window()),
            session,
            handler,
            packet: EncodedPacket::new(),
            headers: StreamHeaders::new(),
            config,
            discard_rule,
            geometry,
            submitted_frames: 0,
            encode_calls: 0,
            have_first_packet: false,
            finished: false,
            logger,
        }
    }

    /// Copies `raw` into a pooled frame and encodes it.
    ///
    /// Returns the packet drained during this call, if any. The borrow
    /// lasts until the next call on the pump.
    pub fn encode(&mut self, raw: &RawFrame<'_>) -> Result<Option<&EncodedPacket>> {
        let mut frame = self.acquire_frame()?;
        if let Err(e) = copy_planes(raw, &mut frame, &self.geometry) {
            self.pool.release(frame);
            return Err(e);
        }
        self.encode_frame(frame)
    }

    /// Hands out a pooled frame for hosts that fill frames themselves.
    pub fn acquire_frame(&mut self) -> Result<S::Frame> {
        if self.finished {
            return Err(EncoderError::Finished);
        }
        self.pool.acquire()
    }

    /// Returns an acquired frame that will not be encoded.
    pub fn return_frame(&mut self, frame: S::Frame) {
        self.pool.release(frame);
    }

    /// Runs the submit/drain loop for one filled frame.
    ///
    /// The frame is consumed: it ends up in flight, or back in the pool if
    /// it was not accepted.
    ///
    /// # Errors
    ///
    /// - `EncoderError::Stalled` when submit and drain are both busy
    /// - `EncoderError::Timeout` when the frame is not accepted in budget
    /// - `EncoderError::Session(EndOfStream)` when drain reports end of stream
    /// - `EncoderError::Session` for any other codec failure
    pub fn encode_frame(&mut self, frame: S::Frame) -> Result<Option<&EncodedPacket>> {
        if self.finished {
            self.pool.release(frame);
            return Err(EncoderError::Finished);
        }

        let should_lag = self.is_lagging();
        let deadline = Instant::now() + self.config.budget();

        let mut pending = Some(frame);
        let mut submitted = false;
        let mut drained = false;
        let mut received = false;
        let mut end_of_stream = false;

        let mut outcome = Ok(());
        while (!submitted || (should_lag && !drained)) && Instant::now() <= deadline {
            let mut submit_stalled = false;

            if !submitted {
                match self.submit_pending(&mut pending) {
                    Ok(()) => submitted = true,
                    Err(SessionError::NotReady) => {
                        if received {
                            self.logger
                                .warn("Skipped frame: codec busy after a packet was returned");
                            submitted = true;
                        }
                        submit_stalled = true;
                    }
                    Err(SessionError::EndOfStream) => {
                        self.logger.error("Skipped frame due to end of stream");
                        submitted = true;
                    }
                    Err(e) => {
                        self.logger.error(&format!("Failed to submit frame: {}", e));
                        outcome = Err(EncoderError::Session(e));
                        break;
                    }
                }
            }

            if !drained {
                match self.session.drain(&mut self.packet) {
                    Ok(()) => {
                        drained = true;
                        received = true;
                        self.on_packet();
                    }
                    Err(SessionError::EndOfStream) => {
                        self.logger.error("Received end of stream");
                        drained = true;
                        end_of_stream = true;
                    }
                    Err(SessionError::NotReady) => {
                        if submitted {
                            drained = true;
                        }
                        if submit_stalled {
                            self.logger
                                .error("Both submit and drain report not ready, encoder stalled");
                            outcome = Err(EncoderError::Stalled);
                            break;
                        }
                    }
                    Err(e) => {
                        self.logger.error(&format!("Failed to drain packet: {}", e));
                        outcome = Err(EncoderError::Session(e));
                        break;
                    }
                }
            }

            if !submitted || !drained {
                thread::sleep(self.config.retry_interval());
            }
        }

        if let Some(frame) = pending.take() {
            self.pool.release(frame);
        }
        outcome?;

        if !submitted {
            self.logger.error(&format!(
                "Frame not accepted within {:?}",
                self.config.budget()
            ));
            return Err(EncoderError::Timeout(self.config.budget()));
        }
        if end_of_stream {
            return Err(EncoderError::Session(SessionError::EndOfStream));
        }

        self.encode_calls += 1;
        if self.encode_calls % ENCODER_LOG_INTERVAL == 0 {
            let stats = self.pool.stats();
            self.logger.debug(&format!(
                "Encoded {} frames ({} submitted, pool: {} allocated, {} reused, {} dropped)",
                self.encode_calls,
                self.submitted_frames,
                stats.allocated,
                stats.reused,
                stats.dropped
            ));
        }

        Ok(received.then_some(&self.packet))
    }

    fn submit_pending(&mut self, pending: &mut Option<S::Frame>) -> SessionResult<()> {
        let Some(frame) = pending.take() else {
            return Ok(());
        };
        match self.session.submit(&frame) {
            Ok(()) => {
                self.pool.track_in_flight(frame);
                self.submitted_frames += 1;
                Ok(())
            }
            Err(e) => {
                *pending = Some(frame);
                Err(e)
            }
        }
    }

    fn on_packet(&mut self) {
        if !self.have_first_packet {
            self.handler.extract_headers(
                self.packet.data(),
                self.session.extradata(),
                self.discard_rule,
                &mut self.headers,
            );
            self.have_first_packet = true;
            self.logger.info(&format!(
                "First packet: {} bytes, header={} bytes, sei={} bytes",
                self.packet.len(),
                self.headers.header().map_or(0, <[u8]>::len),
                self.headers.supplemental().map_or(0, <[u8]>::len)
            ));
        }
        self.pool.recycle_oldest();
    }

    /// Drains everything the codec still buffers and tears the pump down.
    ///
    /// Only sessions that delay output are flushed. Each drained packet is
    /// passed to `on_packet`. Returns the number of drain calls made; a
    /// second call does nothing and returns 0.
    pub fn finish<F>(&mut self, mut on_packet: F) -> u32
    where
        F: FnMut(&EncodedPacket),
    {
        if self.finished {
            return 0;
        }
        self.finished = true;

        let mut drains = 0;
        if self.session.delays_output() {
            let mut packets = 0;
            let mut done = false;
            while !done && drains < self.config.flush_limit {
                if let Err(SessionError::Failed(msg)) = self.session.flush() {
                    self.logger.warn(&format!("Flush request failed: {}", msg));
                }

                drains += 1;
                match self.session.drain(&mut self.packet) {
                    Ok(()) => {
                        packets += 1;
                        on_packet(&self.packet);
                        thread::sleep(self.config.retry_interval());
                    }
                    Err(SessionError::EndOfStream) => done = true,
                    Err(SessionError::NotReady) => {
                        self.logger.warn("Codec not ready during flush, stopping");
                        done = true;
                    }
                    Err(SessionError::Failed(msg)) => {
                        self.logger
                            .error(&format!("Failed to drain during flush: {}", msg));
                        done = true;
                    }
                }
            }
            if !done {
                self.logger
                    .warn(&format!("Flush stopped at the limit of {} drains", drains));
            }
            self.logger.info(&format!(
                "Flushed {} trailing packets in {} drains",
                packets, drains
            ));
        }

        self.pool.clear();
        self.headers.clear();
        self.packet.clear();
        drains
    }

    /// Parameter sets, once the first packet has been drained.
    pub fn header_bytes(&self) -> Option<&[u8]> {
        self.headers.header()
    }

    /// SEI units, once the first packet has been drained.
    pub fn supplemental_bytes(&self) -> Option<&[u8]> {
        self.headers.supplemental()
    }

    pub fn has_first_packet(&self) -> bool {
        self.have_first_packet
    }

    /// True once enough frames were submitted to fill the codec pipeline.
    pub fn is_lagging(&self) -> bool {
        self.submitted_frames >= self.session.pipeline_depth()
    }

    pub fn submitted_frames(&self) -> u64 {
        self.submitted_frames
    }

    pub fn in_flight_frames(&self) -> usize {
        self.pool.in_flight_len()
    }

    pub fn free_frames(&self) -> usize {
        self.pool.free_len()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<S: CodecSession> Drop for EncodePump<S> {
    fn drop(&mut self) {
        self.finish(|_| {});
    }
}
