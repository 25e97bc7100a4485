//! Integration tests for the paced drive loop.
//!
//! These exercise [`CycleRunner::run`] with wall-clock pacing: the
//! loop is spawned on its own thread, driven by the same shutdown flag
//! the binary wires to SIGINT, and inspected after it returns. Timing
//! bounds are deliberately loose so the tests stay meaningful on a
//! loaded CI machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use telestep_common::command::{Axis, AxisCommand, DriveCommand};
use telestep_common::consts::{ACCELERATION_LIMIT, VELOCITY_BOUND};
use telestep_common::link::PipeAddress;
use telestep_common::motion::MotionProfile;

use telestep_drive::axis::AxisDriver;
use telestep_drive::cycle::CycleRunner;
use telestep_drive::drivers::{memlink::MemoryLink, pin::RecordedPin, softstep::SoftStep};
use telestep_drive::gate::GateState;
use telestep_drive::interlock::InterlockController;
use telestep_drive::link::LinkReceiver;

// ── Helpers ─────────────────────────────────────────────────────────

fn runner_with_interval<M: MotionProfile>(
    profile: impl Fn() -> M,
    interval: Duration,
) -> CycleRunner<MemoryLink, M, RecordedPin> {
    let address: PipeAddress = "00001".parse().unwrap();
    let receiver = LinkReceiver::open(MemoryLink::new(), &address).unwrap();
    let interlock = InterlockController::new(RecordedPin::new());
    let axes = [Axis::X, Axis::Y, Axis::Z]
        .map(|axis| AxisDriver::new(axis, profile(), VELOCITY_BOUND, ACCELERATION_LIMIT));
    CycleRunner::new(receiver, interlock, axes, interval)
}

/// Runs the loop on its own thread for roughly `duration`, then clears
/// the flag and hands the runner back for inspection.
fn run_for<M: MotionProfile + Send + 'static>(
    mut runner: CycleRunner<MemoryLink, M, RecordedPin>,
    duration: Duration,
) -> CycleRunner<MemoryLink, M, RecordedPin> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let handle = thread::spawn(move || {
        runner.run(&flag);
        runner
    });
    thread::sleep(duration);
    running.store(false, Ordering::SeqCst);
    handle.join().expect("drive loop thread panicked")
}

/// Motion profile whose `advance()` stalls, forcing every cycle body
/// past the interval.
struct SlowStep {
    inner: SoftStep,
    stall: Duration,
}

impl SlowStep {
    fn new(stall: Duration) -> Self {
        Self {
            inner: SoftStep::new(),
            stall,
        }
    }
}

impl MotionProfile for SlowStep {
    fn set_velocity_bound(&mut self, bound: u16) {
        self.inner.set_velocity_bound(bound);
    }

    fn set_acceleration_limit(&mut self, limit: u16) {
        self.inner.set_acceleration_limit(limit);
    }

    fn set_target_velocity(&mut self, velocity: i16) {
        self.inner.set_target_velocity(velocity);
    }

    fn command_stop(&mut self) {
        self.inner.command_stop();
    }

    fn advance(&mut self) {
        thread::sleep(self.stall);
        self.inner.advance();
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn paced_loop_holds_the_interval_floor() {
    let interval = Duration::from_millis(5);
    let runner = run_for(
        runner_with_interval(SoftStep::new, interval),
        Duration::from_millis(100),
    );

    let stats = runner.stats();
    // Nominal is 20 cycles in 100 ms. The floor guarantees we cannot
    // run materially faster; scheduling may make us slower.
    assert!(
        stats.cycles >= 5 && stats.cycles <= 60,
        "expected roughly 20 paced cycles, got {}",
        stats.cycles
    );
    assert_eq!(stats.cycles, stats.active + stats.quiescent);
    assert!(stats.min_cycle_ns <= stats.max_cycle_ns);
    assert!(stats.avg_cycle_ns() <= stats.max_cycle_ns);
}

#[test]
fn every_cycle_writes_the_enable_line_once() {
    let runner = run_for(
        runner_with_interval(SoftStep::new, Duration::from_millis(2)),
        Duration::from_millis(40),
    );

    // Construction write, one write per cycle, one parking write.
    let writes = runner.interlock().line().writes().len() as u64;
    assert_eq!(writes, runner.stats().cycles + 2);
    assert!(runner.interlock().line().level(), "parked line must be high");
}

#[test]
fn shutdown_parks_outputs_even_when_last_command_enabled() {
    let mut runner = runner_with_interval(SoftStep::new, Duration::from_millis(5));
    let command = DriveCommand {
        x: AxisCommand {
            active: true,
            velocity: 400,
        },
        y: AxisCommand::STOP,
        z: AxisCommand::STOP,
        enable: true,
    };
    assert!(
        runner
            .receiver_mut()
            .transceiver_mut()
            .inject(&command.to_wire())
    );
    assert_eq!(runner.run_cycle(), GateState::Active);
    assert!(!runner.interlock().line().level(), "drive should be enabled");

    // Flag already cleared: run() must park before returning.
    runner.run(&AtomicBool::new(false));
    assert!(runner.interlock().line().level(), "parked line must be high");
    for driver in runner.axes() {
        assert!(!driver.state().active);
        assert_eq!(driver.state().velocity, 0);
    }
}

#[test]
fn long_cycles_count_as_overruns_without_catch_up() {
    // Three axes at 2 ms stall each put every cycle body well past a
    // 1 ms interval.
    let interval = Duration::from_millis(1);
    let runner = run_for(
        runner_with_interval(|| SlowStep::new(Duration::from_millis(2)), interval),
        Duration::from_millis(80),
    );

    let stats = runner.stats();
    assert!(stats.cycles >= 2, "loop made no progress");
    assert_eq!(
        stats.overruns, stats.cycles,
        "every stalled cycle must be counted as an overrun"
    );
    // No catch-up: a 1 ms interval with ~6 ms bodies cannot yield
    // anywhere near 80 cycles in 80 ms.
    assert!(
        stats.cycles <= 40,
        "overrun cycles appear to have been compensated: {} cycles",
        stats.cycles
    );
}
