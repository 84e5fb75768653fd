//! Engine timing and protocol tests
//!
//! These drive a `SimEngine` tick by tick through the public API and check
//! door timing, the reopen window and the out-of-service sequence.

use lift_sim::simulation::{
    build_controller, Action, ConfigError, ControllerConfig, ControllerStrategy, Direction, EngineConfig,
    EngineError, IdleParkingMode, MechanicalStatus, Request, RequestId, RequestState, SimEngine,
    Tick, TickOutcome,
};

fn engine_config() -> EngineConfig {
    EngineConfig {
        min_floor: 0,
        max_floor: 9,
        travel_ticks_per_floor: 1,
        door_transition_ticks: 2,
        door_dwell_ticks: 3,
        door_reopen_window_ticks: 2,
    }
}

fn engine_with(config: EngineConfig, strategy: ControllerStrategy, start_floor: i32) -> SimEngine {
    let controller = build_controller(strategy, ControllerConfig::default());
    SimEngine::with_start_floor(config, controller, start_floor).unwrap()
}

/// Tick until `done` holds after a tick; returns the number of that tick
fn run_until(engine: &mut SimEngine, limit: u64, done: impl Fn(&SimEngine) -> bool) -> Option<Tick> {
    for _ in 0..limit {
        let tick = engine.current_tick();
        engine.tick();
        if done(engine) {
            return Some(tick);
        }
    }
    None
}

fn status(engine: &SimEngine) -> MechanicalStatus {
    engine.state().status()
}

#[test]
fn test_clock_counts_every_tick() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::DirectionalScan, 0);
    assert_eq!(engine.current_tick(), 0);
    for _ in 0..5 {
        engine.tick();
    }
    assert_eq!(engine.current_tick(), 5);
    assert_eq!(engine.state().floor(), 0);
    assert_eq!(status(&engine), MechanicalStatus::Idle);
}

#[test]
fn test_end_to_end_nearest_request() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::NearestRequestRouting, 0);
    let hall = engine.add_hall_call(0, Direction::Up).unwrap();

    let boarded = run_until(&mut engine, 10, |e| status(e) == MechanicalStatus::DoorsOpen);
    assert_eq!(boarded, Some(2));
    assert_eq!(engine.request(hall).unwrap().state(), RequestState::Completed);

    let car = engine.add_car_call(5).unwrap();
    let departed = run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::MovingUp)
        .expect("car never left floor 0");
    let arrived = run_until(&mut engine, 20, |e| {
        status(e) == MechanicalStatus::DoorsOpen && e.state().floor() == 5
    })
    .expect("car never opened doors at floor 5");

    // five one-tick moves plus a two-tick door opening
    assert_eq!(arrived - departed, 7);
    assert_eq!(engine.request(car).unwrap().state(), RequestState::Completed);
    assert_eq!(engine.requests().count(), 0);
    assert_eq!(engine.counters().floors_travelled, 5);
}

#[test]
fn test_door_cycle_timing() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::NearestRequestRouting, 4);
    engine.add_car_call(4).unwrap();

    let mut statuses = Vec::new();
    for _ in 0..8 {
        engine.tick();
        statuses.push(status(&engine));
    }

    use MechanicalStatus::*;
    assert_eq!(
        statuses,
        vec![
            DoorsOpening,
            DoorsOpening,
            DoorsOpen,
            DoorsOpen,
            DoorsOpen,
            DoorsClosing,
            DoorsClosing,
            Idle
        ]
    );
    assert_eq!(engine.counters().door_cycles, 1);
}

/// Start a door cycle with four-tick transitions and a two-tick reopen
/// window, stopping right after the closing sequence begins
fn engine_about_to_close() -> SimEngine {
    let config = EngineConfig {
        door_transition_ticks: 4,
        door_reopen_window_ticks: 2,
        ..engine_config()
    };
    let mut engine = engine_with(config, ControllerStrategy::NearestRequestRouting, 0);
    engine.add_hall_call(0, Direction::Up).unwrap();
    run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::DoorsClosing)
        .expect("doors never started closing");
    engine
}

/// Press the button on the `nth` tick of the closing sequence
fn press_during_closing(nth: u32) -> (SimEngine, TickOutcome) {
    let mut engine = engine_about_to_close();
    for _ in 1..nth {
        engine.tick();
    }
    engine.add_car_call(0).unwrap();
    let outcome = engine.tick();
    (engine, outcome)
}

#[test]
fn test_reopen_within_window() {
    for nth in [1, 2] {
        let (engine, outcome) = press_during_closing(nth);
        assert_eq!(outcome, TickOutcome::Reopened, "closing tick {}", nth);
        assert_eq!(status(&engine), MechanicalStatus::DoorsOpening);
        assert_eq!(engine.counters().reopens, 1);
    }
}

#[test]
fn test_no_reopen_after_window() {
    let (engine, outcome) = press_during_closing(3);
    assert_eq!(outcome, TickOutcome::Deferred(Action::OpenDoor));
    assert_eq!(status(&engine), MechanicalStatus::DoorsClosing);

    // On the last closing tick the doors finish closing first and then open
    // again as a fresh cycle.
    let (engine, outcome) = press_during_closing(4);
    assert_eq!(outcome, TickOutcome::Applied(Action::OpenDoor));
    assert_eq!(status(&engine), MechanicalStatus::DoorsOpening);
    assert_eq!(engine.counters().reopens, 0);
}

#[test]
fn test_zero_reopen_window_never_reopens() {
    let config = EngineConfig {
        door_reopen_window_ticks: 0,
        ..engine_config()
    };
    let mut engine = engine_with(config, ControllerStrategy::NearestRequestRouting, 0);
    engine.add_hall_call(0, Direction::Up).unwrap();
    run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::DoorsClosing).unwrap();

    engine.add_car_call(0).unwrap();
    assert!(matches!(engine.tick(), TickOutcome::Deferred(_)));
    assert_eq!(status(&engine), MechanicalStatus::DoorsClosing);
}

/// Run a door cycle at floor 0 with four-tick transitions and stop on the
/// last tick the doors report fully open
fn engine_on_last_dwell_tick(window: u32) -> SimEngine {
    let config = EngineConfig {
        door_transition_ticks: 4,
        door_reopen_window_ticks: window,
        ..engine_config()
    };
    let mut engine = engine_with(config, ControllerStrategy::NearestRequestRouting, 0);
    engine.add_hall_call(0, Direction::Up).unwrap();
    run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::DoorsOpen)
        .expect("doors never opened");
    for _ in 1..engine.config().door_dwell_ticks {
        engine.tick();
        assert_eq!(status(&engine), MechanicalStatus::DoorsOpen);
    }
    engine
}

#[test]
fn test_press_as_doors_start_closing() {
    let mut engine = engine_on_last_dwell_tick(2);
    let call = engine.add_car_call(0).unwrap();

    // the dwell runs out this tick; no closing tick has elapsed yet
    assert_eq!(engine.tick(), TickOutcome::Deferred(Action::OpenDoor));
    assert_eq!(status(&engine), MechanicalStatus::DoorsClosing);
    assert_eq!(engine.counters().reopens, 0);
    assert_eq!(engine.request(call).unwrap().state(), RequestState::Queued);

    assert_eq!(engine.tick(), TickOutcome::Reopened);
    assert_eq!(status(&engine), MechanicalStatus::DoorsOpening);
    assert_eq!(engine.counters().reopens, 1);

    engine.tick();
    assert_eq!(engine.request(call).unwrap().state(), RequestState::Serving);
}

#[test]
fn test_zero_window_ignores_press_as_doors_start_closing() {
    let mut engine = engine_on_last_dwell_tick(0);
    let call = engine.add_car_call(0).unwrap();

    for closing_tick in 0..4 {
        assert_eq!(
            engine.tick(),
            TickOutcome::Deferred(Action::OpenDoor),
            "closing tick {}",
            closing_tick
        );
        assert_eq!(status(&engine), MechanicalStatus::DoorsClosing);
        assert_eq!(engine.request(call).unwrap().state(), RequestState::Queued);
    }

    // the doors finish closing, then open again as a new cycle
    assert_eq!(engine.tick(), TickOutcome::Applied(Action::OpenDoor));
    assert_eq!(status(&engine), MechanicalStatus::DoorsOpening);
    assert_eq!(engine.counters().reopens, 0);
    assert_eq!(engine.request(call).unwrap().state(), RequestState::Serving);
}

#[test]
fn test_out_of_service_while_moving() {
    for strategy in [
        ControllerStrategy::NearestRequestRouting,
        ControllerStrategy::DirectionalScan,
    ] {
        let mut engine = engine_with(engine_config(), strategy, 0);
        let call = engine.add_car_call(5).unwrap();
        run_until(&mut engine, 10, |e| {
            status(e) == MechanicalStatus::MovingUp && e.state().floor() == 2
        })
        .expect("car never moved up from floor 2");

        engine.set_out_of_service().unwrap();
        assert_eq!(engine.request(call).unwrap().state(), RequestState::Cancelled);
        assert_eq!(engine.set_out_of_service(), Err(EngineError::ShutdownPending));
        assert_eq!(engine.return_to_service(), Err(EngineError::NotOutOfService));

        let mut statuses = Vec::new();
        for _ in 0..8 {
            assert_eq!(engine.tick(), TickOutcome::ShutdownInProgress);
            assert_eq!(engine.state().floor(), 3);
            statuses.push(status(&engine));
        }

        use MechanicalStatus::*;
        assert_eq!(
            statuses,
            vec![
                DoorsOpening,
                DoorsOpening,
                DoorsOpen,
                DoorsOpen,
                DoorsOpen,
                DoorsClosing,
                DoorsClosing,
                OutOfService
            ],
            "{:?}",
            strategy
        );
        assert!(!engine.is_shutdown_pending());
    }
}

#[test]
fn test_out_of_service_rejects_calls_until_returned() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::DirectionalScan, 3);
    engine.set_out_of_service().unwrap();
    run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::OutOfService).unwrap();

    assert_eq!(engine.set_out_of_service(), Err(EngineError::AlreadyOutOfService));
    assert!(engine.add_car_call(5).is_none());
    assert!(engine.add_hall_call(1, Direction::Up).is_none());

    for _ in 0..5 {
        engine.tick();
        assert_eq!(status(&engine), MechanicalStatus::OutOfService);
        assert_eq!(engine.state().floor(), 3);
    }

    engine.return_to_service().unwrap();
    assert_eq!(status(&engine), MechanicalStatus::Idle);
    assert_eq!(engine.return_to_service(), Err(EngineError::NotOutOfService));

    let call = engine.add_car_call(5).unwrap();
    run_until(&mut engine, 20, |e| {
        status(e) == MechanicalStatus::DoorsOpen && e.state().floor() == 5
    })
    .expect("car did not serve the call after returning to service");
    assert_eq!(engine.request(call).unwrap().state(), RequestState::Completed);
}

#[test]
fn test_out_of_service_with_open_doors_does_not_cycle_twice() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::NearestRequestRouting, 2);
    engine.add_car_call(2).unwrap();
    run_until(&mut engine, 10, |e| status(e) == MechanicalStatus::DoorsOpen).unwrap();

    engine.set_out_of_service().unwrap();
    run_until(&mut engine, 20, |e| status(e) == MechanicalStatus::OutOfService).unwrap();
    assert_eq!(engine.counters().door_cycles, 1);
}

#[test]
fn test_cancel_is_idempotent() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::DirectionalScan, 0);
    let keep = engine.add_car_call(7).unwrap();
    let drop = engine.add_hall_call(4, Direction::Down).unwrap();

    assert!(engine.cancel_request(drop));
    let snapshot: Vec<Request> = engine.requests().cloned().collect();
    assert!(!engine.cancel_request(drop));
    assert!(!engine.cancel_request(RequestId(999)));
    let after: Vec<Request> = engine.requests().cloned().collect();
    assert_eq!(snapshot, after);
    assert_eq!(engine.request(drop).unwrap().state(), RequestState::Cancelled);

    run_until(&mut engine, 30, |e| e.requests().count() == 0).unwrap();
    assert_eq!(engine.request(keep).unwrap().state(), RequestState::Completed);
    assert!(!engine.cancel_request(keep));
}

#[test]
fn test_admission_validation() {
    let mut engine = engine_with(engine_config(), ControllerStrategy::DirectionalScan, 0);
    assert!(engine.add_car_call(10).is_none());
    assert!(engine.add_hall_call(-1, Direction::Up).is_none());
    assert!(engine.add_hall_call(3, Direction::Idle).is_none());

    let external = Request::hall_call(RequestId(42), 3, Direction::Up, 0);
    assert_eq!(engine.add_request(external.clone()), Some(RequestId(42)));
    assert_eq!(engine.add_request(external), None);
    assert_eq!(engine.add_car_call(6), Some(RequestId(43)));
    assert_eq!(
        engine.request(RequestId(42)).unwrap().state(),
        RequestState::Queued
    );
}

#[test]
fn test_config_validation() {
    let controller = || build_controller(ControllerStrategy::DirectionalScan, ControllerConfig::default());

    let inverted = EngineConfig {
        min_floor: 5,
        max_floor: 5,
        ..engine_config()
    };
    assert_eq!(
        SimEngine::new(inverted, controller()).unwrap_err(),
        ConfigError::EmptyFloorRange { min: 5, max: 5 }
    );

    let no_travel = EngineConfig {
        travel_ticks_per_floor: 0,
        ..engine_config()
    };
    assert_eq!(
        SimEngine::new(no_travel, controller()).unwrap_err(),
        ConfigError::NonPositiveTicks {
            name: "travel_ticks_per_floor"
        }
    );

    let no_dwell = EngineConfig {
        door_dwell_ticks: 0,
        ..engine_config()
    };
    assert!(matches!(
        SimEngine::new(no_dwell, controller()),
        Err(ConfigError::NonPositiveTicks { .. })
    ));

    let long_window = EngineConfig {
        door_reopen_window_ticks: 3,
        ..engine_config()
    };
    assert_eq!(
        SimEngine::new(long_window, controller()).unwrap_err(),
        ConfigError::ReopenWindowTooLong {
            window: 3,
            transition: 2
        }
    );

    let far_home = build_controller(
        ControllerStrategy::NearestRequestRouting,
        ControllerConfig {
            home_floor: 12,
            idle_timeout_ticks: 0,
            idle_parking_mode: IdleParkingMode::StayPut,
        },
    );
    assert!(matches!(
        SimEngine::new(engine_config(), far_home),
        Err(ConfigError::HomeFloorOutOfRange { home: 12, .. })
    ));

    assert!(matches!(
        SimEngine::with_start_floor(engine_config(), controller(), -3),
        Err(ConfigError::StartFloorOutOfRange { floor: -3, .. })
    ));
}

#[test]
fn test_basement_floors() {
    let config = EngineConfig {
        min_floor: -2,
        max_floor: 3,
        ..engine_config()
    };
    let mut engine = engine_with(config, ControllerStrategy::DirectionalScan, 0);
    let call = engine.add_car_call(-2).unwrap();
    run_until(&mut engine, 20, |e| {
        status(e) == MechanicalStatus::DoorsOpen && e.state().floor() == -2
    })
    .expect("car never reached the basement");
    assert_eq!(engine.request(call).unwrap().state(), RequestState::Completed);
}
