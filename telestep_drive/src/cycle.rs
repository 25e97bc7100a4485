//! Fixed-cadence drive loop: poll → resolve → dispatch → wait.
//!
//! One cycle services the whole node: the link is polled once, the
//! gate resolves the outcome into a decision, and the decision is
//! dispatched to the interlock and all three axes. The loop then
//! sleeps out the remainder of the interval.
//!
//! The interval is a floor, not a deadline. A cycle that runs long is
//! counted as an overrun and the next cycle starts immediately; there
//! is no catch-up, so a stall never causes a burst of compensating
//! cycles afterwards.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` — lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` — pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)` — RT priority.
//!
//! All four are no-ops without the `rt` feature, so the same binary
//! runs unprivileged on a developer machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use telestep_common::command::{Axis, AxisCommand};
use telestep_common::consts::AXIS_COUNT;
use telestep_common::io::EnableLine;
use telestep_common::link::Transceiver;
use telestep_common::motion::MotionProfile;

use crate::axis::AxisDriver;
use crate::gate::{self, GateState};
use crate::interlock::InterlockController;
use crate::link::LinkReceiver;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing and dispatch statistics.
///
/// Updated every cycle with no allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycles: u64,
    /// Cycles dispatched in the active state.
    pub active: u64,
    /// Cycles dispatched in the quiescent state.
    pub quiescent: u64,
    /// Cycles whose body ran past the interval.
    pub overruns: u64,
    /// Last cycle body duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle body duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle body duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycles: 0,
            active: 0,
            quiescent: 0,
            overruns: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, state: GateState, duration_ns: i64) {
        self.cycles += 1;
        match state {
            GateState::Active => self.active += 1,
            GateState::Quiescent => self.quiescent += 1,
        }
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
    }

    /// Average cycle body duration [ns] (0 before the first cycle).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycles == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycles as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}

/// Lock all current and future memory pages (prevent page faults in
/// the drive loop).
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{mlockall, MlockAllFlags};
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Prefault stack pages to prevent page faults during the loop.
fn prefault_stack() {
    // Touch 1 MB of stack to prefault pages.
    let mut buf = [0u8; 1024 * 1024];
    // Prevent compiler from optimizing away the write.
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a specific CPU core.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Set SCHED_FIFO with the given RT priority.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Perform the full RT setup sequence.
///
/// Must be called before entering the drive loop. In simulation mode
/// (no `rt` feature), all RT calls are no-ops.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    // 1. Lock all memory pages.
    rt_mlockall()?;

    // 2. Prefault stack pages.
    prefault_stack();

    // 3. Pin to CPU core.
    rt_set_affinity(cpu_core)?;

    // 4. Set RT scheduler.
    rt_set_scheduler(rt_priority)?;

    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// The fixed-cadence drive loop.
///
/// Owns the link receiver, the interlock and all axis drivers; nothing
/// else mutates them while the loop runs, so the safety chain from
/// poll to output writes is one straight call path.
pub struct CycleRunner<T: Transceiver, M: MotionProfile, E: EnableLine> {
    receiver: LinkReceiver<T>,
    interlock: InterlockController<E>,
    axes: [AxisDriver<M>; AXIS_COUNT],
    interval: Duration,
    stats: CycleStats,
    /// Previous cycle's gate state, kept for transition logging only.
    /// Dispatch never consults it.
    gate_state: GateState,
}

impl<T: Transceiver, M: MotionProfile, E: EnableLine> CycleRunner<T, M, E> {
    pub fn new(
        receiver: LinkReceiver<T>,
        interlock: InterlockController<E>,
        axes: [AxisDriver<M>; AXIS_COUNT],
        interval: Duration,
    ) -> Self {
        debug_assert!(
            axes.iter()
                .enumerate()
                .all(|(lane, driver)| driver.axis().index() == lane),
            "axis drivers must be in X, Y, Z order"
        );
        Self {
            receiver,
            interlock,
            axes,
            interval,
            stats: CycleStats::new(),
            gate_state: GateState::Quiescent,
        }
    }

    /// Execute one cycle body: poll, resolve, dispatch.
    ///
    /// Exposed separately from [`run`](Self::run) so tests and
    /// benchmarks can drive cycles without wall-clock pacing.
    pub fn run_cycle(&mut self) -> GateState {
        let outcome = self.receiver.poll();
        let decision = gate::resolve(&outcome);

        // Interlock first: a disable must reach the power stage before
        // this cycle's step pulses, not after.
        self.interlock.apply(decision.command.enable);
        for driver in &mut self.axes {
            driver.apply(decision.command.axis(driver.axis()));
        }

        if decision.state != self.gate_state {
            match decision.state {
                GateState::Active => debug!("command received, drive active"),
                GateState::Quiescent => info!("no usable command, holding quiescent"),
            }
            self.gate_state = decision.state;
        }
        decision.state
    }

    /// Enter the drive loop. Returns when `running` is cleared.
    ///
    /// On the way out the loop dispatches one final quiescent cycle so
    /// the hardware is left stopped and de-energised no matter what the
    /// last command said.
    pub fn run(&mut self, running: &AtomicBool) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "entering drive loop"
        );

        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            let state = self.run_cycle();
            let elapsed = started.elapsed();

            self.stats.record(state, elapsed.as_nanos() as i64);
            if elapsed > self.interval {
                self.stats.overruns += 1;
                debug!(
                    elapsed_us = elapsed.as_micros() as u64,
                    "cycle ran past interval"
                );
            }

            // Sleep out the remainder; a late cycle just continues.
            if let Some(remaining) = self.interval.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        self.park();
        info!(
            cycles = self.stats.cycles,
            active = self.stats.active,
            quiescent = self.stats.quiescent,
            overruns = self.stats.overruns,
            "drive loop stopped"
        );
    }

    /// Dispatch the safe state to every output.
    pub fn park(&mut self) {
        self.interlock.apply(false);
        for driver in &mut self.axes {
            driver.apply(AxisCommand::STOP);
        }
        debug!("outputs parked");
    }

    pub const fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn receiver(&self) -> &LinkReceiver<T> {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut LinkReceiver<T> {
        &mut self.receiver
    }

    pub fn axes(&self) -> &[AxisDriver<M>; AXIS_COUNT] {
        &self.axes
    }

    /// The driver for one axis. Lanes sit in [`Axis::ALL`] order.
    pub fn axis_driver(&self, axis: Axis) -> &AxisDriver<M> {
        &self.axes[axis.index()]
    }

    pub fn interlock(&self) -> &InterlockController<E> {
        &self.interlock
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
