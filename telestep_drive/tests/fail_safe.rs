//! Integration tests for the fail-safe command path.
//!
//! These run the full receive chain — in-memory link, receiver, gate,
//! axis drivers, interlock — cycle by cycle, and check the safety
//! guarantees end to end: silence and garbage always quiesce the
//! drive, one good datagram always restores it, and the enable line
//! reacts in the same cycle as the command that changed it.

use std::time::Duration;

use telestep_common::command::{Axis, AxisCommand, DriveCommand, WIRE_LEN};
use telestep_common::consts::{ACCELERATION_LIMIT, VELOCITY_BOUND};
use telestep_common::link::{LinkError, PipeAddress};

use telestep_drive::axis::AxisDriver;
use telestep_drive::cycle::CycleRunner;
use telestep_drive::drivers::{memlink::MemoryLink, pin::RecordedPin, softstep::SoftStep};
use telestep_drive::gate::GateState;
use telestep_drive::interlock::InterlockController;
use telestep_drive::link::LinkReceiver;

// ── Helpers ─────────────────────────────────────────────────────────

type SimRunner = CycleRunner<MemoryLink, SoftStep, RecordedPin>;

/// One-second profile ticks make step counts equal velocities, which
/// keeps the motion assertions exact.
fn runner() -> SimRunner {
    let address: PipeAddress = "00001".parse().unwrap();
    let receiver = LinkReceiver::open(MemoryLink::new(), &address).unwrap();
    let interlock = InterlockController::new(RecordedPin::new());
    let axes = [Axis::X, Axis::Y, Axis::Z].map(|axis| {
        AxisDriver::new(
            axis,
            SoftStep::with_tick(Duration::from_secs(1)),
            VELOCITY_BOUND,
            ACCELERATION_LIMIT,
        )
    });
    CycleRunner::new(receiver, interlock, axes, Duration::from_millis(18))
}

fn inject(runner: &mut SimRunner, command: &DriveCommand) {
    assert!(
        runner
            .receiver_mut()
            .transceiver_mut()
            .inject(&command.to_wire())
    );
}

fn x_forward(velocity: i16, enable: bool) -> DriveCommand {
    DriveCommand {
        x: AxisCommand {
            active: true,
            velocity,
        },
        y: AxisCommand::STOP,
        z: AxisCommand::STOP,
        enable,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn silent_link_is_quiescent_from_the_first_cycle() {
    let mut runner = runner();
    for _ in 0..5 {
        assert_eq!(runner.run_cycle(), GateState::Quiescent);
    }
    assert!(runner.interlock().line().level()); // high = disabled
    for driver in runner.axes() {
        assert!(!driver.state().active);
        assert_eq!(driver.profile().pulses(), 0);
    }
}

#[test]
fn one_datagram_activates_for_exactly_one_cycle() {
    let mut runner = runner();
    inject(&mut runner, &x_forward(316, true));

    assert_eq!(runner.run_cycle(), GateState::Active);
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 316);
    assert!(!runner.interlock().line().level()); // low = enabled

    // No sustaining stream: the very next cycle quiesces everything.
    assert_eq!(runner.run_cycle(), GateState::Quiescent);
    assert!(!runner.axis_driver(Axis::X).state().active);
    assert_eq!(runner.axis_driver(Axis::X).profile().target(), 0.0);
    assert!(runner.interlock().line().level());
}

#[test]
fn each_cycle_consumes_at_most_one_datagram() {
    let mut runner = runner();
    for velocity in [100, 200, 300] {
        inject(&mut runner, &x_forward(velocity, true));
    }
    assert_eq!(runner.receiver_mut().transceiver_mut().pending(), 3);

    assert_eq!(runner.run_cycle(), GateState::Active);
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 100);
    assert_eq!(runner.receiver_mut().transceiver_mut().pending(), 2);

    assert_eq!(runner.run_cycle(), GateState::Active);
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 200);

    assert_eq!(runner.run_cycle(), GateState::Active);
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 300);

    assert_eq!(runner.run_cycle(), GateState::Quiescent);
}

#[test]
fn malformed_datagram_quiesces_and_is_discarded() {
    let mut runner = runner();
    // 9 bytes: one short of a command.
    assert!(
        runner
            .receiver_mut()
            .transceiver_mut()
            .inject(&[1u8; WIRE_LEN - 1])
    );
    inject(&mut runner, &x_forward(250, true));

    assert_eq!(runner.run_cycle(), GateState::Quiescent);
    assert!(runner.interlock().line().level());
    assert_eq!(runner.receiver().stats().malformed, 1);

    // The garbage did not poison the stream; the next datagram works.
    assert_eq!(runner.run_cycle(), GateState::Active);
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 250);
}

#[test]
fn out_of_bound_velocity_is_clamped_at_dispatch() {
    let mut runner = runner();
    inject(&mut runner, &x_forward(30_000, true));
    runner.run_cycle();
    let bound = VELOCITY_BOUND as i16;
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, bound);
    assert_eq!(runner.axis_driver(Axis::X).profile().target(), bound as f64);

    inject(&mut runner, &x_forward(-30_000, true));
    runner.run_cycle();
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, -bound);
}

#[test]
fn stopping_axis_keeps_decelerating_through_quiescent_cycles() {
    let mut runner = runner();

    // Ramp X up to 100 with a sustained command stream.
    for _ in 0..6 {
        inject(&mut runner, &x_forward(100, true));
        runner.run_cycle();
    }
    assert_eq!(runner.axis_driver(Axis::X).profile().velocity(), 100.0);

    // Silence. Each quiescent cycle must keep servicing the ramp:
    // velocity falls by the acceleration limit per cycle until zero.
    let mut expected = 100.0;
    while expected > 0.0 {
        expected = (expected - ACCELERATION_LIMIT as f64).max(0.0);
        assert_eq!(runner.run_cycle(), GateState::Quiescent);
        assert_eq!(runner.axis_driver(Axis::X).profile().velocity(), expected);
    }

    // Settled: further quiescent cycles emit nothing.
    let pulses = runner.axis_driver(Axis::X).profile().pulses();
    runner.run_cycle();
    assert_eq!(runner.axis_driver(Axis::X).profile().pulses(), pulses);
    assert!(runner.axis_driver(Axis::X).profile().is_standstill());
}

#[test]
fn disable_command_reaches_the_line_in_its_own_cycle() {
    let mut runner = runner();
    inject(&mut runner, &x_forward(50, true));
    runner.run_cycle();
    assert!(!runner.interlock().line().level());

    // Same motion, enable cleared: the line must go high on this very
    // cycle even though the axis is still ramping.
    inject(&mut runner, &x_forward(50, false));
    assert_eq!(runner.run_cycle(), GateState::Active);
    assert!(runner.interlock().line().level());
    assert!(runner.axis_driver(Axis::X).state().active);
}

#[test]
fn enable_line_is_rewritten_every_cycle() {
    let mut runner = runner();
    inject(&mut runner, &x_forward(10, true));
    runner.run_cycle();
    for _ in 0..3 {
        runner.run_cycle();
    }
    // Construction write + one write per cycle.
    assert_eq!(
        runner.interlock().line().writes(),
        &[true, false, true, true, true]
    );
}

#[test]
fn transceiver_fault_latches_the_drive_quiescent() {
    let mut runner = runner();
    inject(&mut runner, &x_forward(80, true));
    runner.run_cycle();
    assert_eq!(runner.axis_driver(Axis::X).state().velocity, 80);

    runner
        .receiver_mut()
        .transceiver_mut()
        .fail_next(LinkError::Hardware("spi timeout".into()));
    assert_eq!(runner.run_cycle(), GateState::Quiescent);
    assert!(!runner.receiver().faults().is_empty());

    // Even freshly injected datagrams cannot reactivate a latched
    // link; only a restart re-arms the receiver.
    inject(&mut runner, &x_forward(80, true));
    for _ in 0..3 {
        assert_eq!(runner.run_cycle(), GateState::Quiescent);
    }
    assert!(runner.interlock().line().level());
}

#[test]
fn quiescent_state_is_total_all_axes_and_enable() {
    let mut runner = runner();
    inject(
        &mut runner,
        &DriveCommand {
            x: AxisCommand {
                active: true,
                velocity: 300,
            },
            y: AxisCommand {
                active: true,
                velocity: -300,
            },
            z: AxisCommand {
                active: true,
                velocity: 999,
            },
            enable: true,
        },
    );
    runner.run_cycle();
    for driver in runner.axes() {
        assert!(driver.state().active);
    }

    runner.run_cycle();
    for driver in runner.axes() {
        assert!(!driver.state().active);
        assert_eq!(driver.state().velocity, 0);
        assert_eq!(driver.profile().target(), 0.0);
    }
    assert!(runner.interlock().line().level());
}
