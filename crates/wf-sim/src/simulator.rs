//! Parallel batch simulator
//!
//! Spins are split into fixed-size chunks. Every chunk gets its own engine
//! seeded from a ChaCha stream derived from the master seed, so a seeded run
//! produces the same report on any thread count.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use wf_core::{WfError, WfResult};
use wf_wheel::{EventLog, FrameDriver, SegmentList, SpinEngine, WheelEventKind};

use crate::config::SimConfig;
use crate::report::{SimReport, chi_square};

/// Totals of one chunk
#[derive(Debug, Clone, Default)]
struct ChunkStats {
    histogram: Vec<u64>,
    settled: u64,
    frames_total: u64,
    frames_max: u64,
    ticks_total: u64,
    hit_limit: u64,
}

impl ChunkStats {
    fn new(segments: usize) -> Self {
        Self {
            histogram: vec![0; segments],
            ..Default::default()
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (total, count) in self.histogram.iter_mut().zip(&other.histogram) {
            *total += count;
        }
        self.settled += other.settled;
        self.frames_total += other.frames_total;
        self.frames_max = self.frames_max.max(other.frames_max);
        self.ticks_total += other.ticks_total;
        self.hit_limit += other.hit_limit;
        self
    }
}

/// Runs many headless spins and aggregates their outcome
pub struct BatchSimulator {
    config: SimConfig,
}

impl BatchSimulator {
    pub fn new(config: SimConfig) -> WfResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the whole batch
    pub fn run(&self) -> WfResult<SimReport> {
        let config = &self.config;
        let started = Instant::now();

        let mut master = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let chunks: Vec<(u64, usize)> = (0..config.spins)
            .step_by(config.chunk_size)
            .map(|start| {
                let len = config.chunk_size.min(config.spins - start);
                (master.random::<u64>(), len)
            })
            .collect();

        let threads = config.effective_threads();
        log::info!(
            "Simulating {} {} spins on {} segments: {} chunks, {} threads",
            config.spins,
            config.mode.name(),
            config.segments,
            chunks.len(),
            threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| WfError::InvalidConfig(format!("thread pool: {e}")))?;

        let stats = pool.install(|| {
            chunks
                .par_iter()
                .map(|&(seed, len)| self.run_chunk(seed, len))
                .collect::<WfResult<Vec<_>>>()
        })?;
        let totals = stats
            .into_iter()
            .fold(ChunkStats::new(config.segments), ChunkStats::merge);

        let settled = totals.settled.max(1) as f64;
        let report = SimReport {
            mode: config.mode,
            segments: config.segments,
            spins: totals.settled,
            chi_square: chi_square(&totals.histogram),
            histogram: totals.histogram,
            mean_frames: totals.frames_total as f64 / settled,
            max_frames: totals.frames_max,
            mean_ticks: totals.ticks_total as f64 / settled,
            hit_frame_limit: totals.hit_limit,
        };

        log::info!(
            "Simulation finished in {:.2}s: chi2 = {:.3}",
            started.elapsed().as_secs_f64(),
            report.chi_square
        );
        if report.hit_frame_limit > 0 {
            log::warn!("{} spins hit the frame limit", report.hit_frame_limit);
        }
        Ok(report)
    }

    fn run_chunk(&self, seed: u64, spins: usize) -> WfResult<ChunkStats> {
        let config = &self.config;
        let wheel = config.wheel.clone().with_mode(config.mode).with_seed(seed);
        let mut driver =
            FrameDriver::new(&wheel.timing).with_max_frames(config.max_frames_per_spin);
        let mut engine = SpinEngine::with_config(wheel, EventLog::new())?;
        engine.set_segments(wheel_labels(config.segments))?;

        let mut stats = ChunkStats::new(config.segments);
        for _ in 0..spins {
            if !engine.request_spin() {
                return Err(WfError::InvalidConfig(format!(
                    "engine refused to spin a {}-segment wheel",
                    config.segments
                )));
            }
            let start_frame = engine.frame_count();
            let report = driver.run_until_idle(&mut engine);

            if report.hit_frame_limit {
                engine.cancel();
                // Let the needle settle so the next spin starts clean.
                driver.run_until_idle(&mut engine);
                stats.hit_limit += 1;
            } else if let Some((winner, settle_frame)) = settle_of(engine.events()) {
                let frames = settle_frame - start_frame;
                stats.histogram[winner] += 1;
                stats.settled += 1;
                stats.frames_total += frames;
                stats.frames_max = stats.frames_max.max(frames);
                stats.ticks_total += engine.events().ticks() as u64;
            }
            engine.events_mut().clear();
        }
        Ok(stats)
    }
}

/// Winner and frame of the settle in `log`
fn settle_of(log: &EventLog) -> Option<(usize, u64)> {
    log.events().iter().find_map(|event| match event.kind {
        WheelEventKind::Settled { winner } => Some((winner, event.at.frame)),
        _ => None,
    })
}

fn wheel_labels(count: usize) -> SegmentList {
    (0..count).map(|i| format!("segment {i}")).collect()
}
