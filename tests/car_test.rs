//! Single car scheduling and door timing

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use elevator_sim::simulation::{
    CarEvent, CarId, CarSnapshot, CarState, Command, Direction, DoorState, ElevatorCar,
    ManualClock, ReconstructionError,
};

const DOOR_OPEN: Duration = Duration::from_secs(2);

fn make_car(clock: &ManualClock) -> (ElevatorCar, Receiver<CarEvent>) {
    let (sender, receiver) = mpsc::channel();
    let car = ElevatorCar::new(CarId(1), 10, DOOR_OPEN, Rc::new(clock.clone()), sender);
    (car, receiver)
}

fn make_car_from(snapshot: CarSnapshot, clock: &ManualClock) -> (ElevatorCar, Receiver<CarEvent>) {
    let (sender, receiver) = mpsc::channel();
    let car = ElevatorCar::restore(&snapshot, 10, DOOR_OPEN, Rc::new(clock.clone()), sender)
        .expect("valid snapshot");
    (car, receiver)
}

fn fulfilled(receiver: &Receiver<CarEvent>) -> Vec<u32> {
    receiver
        .try_iter()
        .map(|CarEvent::RequestFulfilled { floor, .. }| floor)
        .collect()
}

#[test]
fn test_initial_state() {
    let clock = ManualClock::new();
    let (car, _events) = make_car(&clock);

    assert_eq!(car.id(), CarId(1));
    assert_eq!(car.num_floors(), 10);
    assert_eq!(car.door_open_duration(), DOOR_OPEN);
    assert_eq!(car.current_floor(), 0);
    assert_eq!(car.state(), CarState::Idle);
    assert_eq!(car.direction(), Direction::Stop);
    assert_eq!(car.door_state(), DoorState::Closed);
    assert!(car.up_requests().is_empty());
    assert!(car.down_requests().is_empty());
}

#[test]
fn test_register_request_up_and_down() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car_from(CarSnapshot::idle_at(CarId(1), 5), &clock);

    assert_eq!(car.register_request(8), vec![Command::AddUpRequest(8)]);
    assert_eq!(car.register_request(2), vec![Command::AddDownRequest(2)]);
    assert_eq!(car.up_requests().floors(), vec![8]);
    assert_eq!(car.down_requests().floors(), vec![2]);
}

#[test]
fn test_idle_request_at_current_floor_opens_door() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car(&clock);

    assert_eq!(car.register_request(0), vec![Command::OpenDoorAndNotify]);
    assert!(car.door().is_open());
    assert!(car.up_requests().is_empty());
    assert_eq!(fulfilled(&events), vec![0]);
}

#[test]
fn test_idle_to_moving_up_then_arrival() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car(&clock);
    car.register_request(3);

    // First step only changes state
    let commands = car.step();
    assert_eq!(
        commands,
        vec![
            Command::SetDirection(Direction::Up),
            Command::SetState(CarState::MovingUp)
        ]
    );
    assert_eq!(car.current_floor(), 0);
    assert_eq!(car.state(), CarState::MovingUp);
    assert_eq!(car.direction(), Direction::Up);

    car.step();
    assert_eq!(car.current_floor(), 1);
    car.step();
    assert_eq!(car.current_floor(), 2);
    assert!(fulfilled(&events).is_empty());

    let commands = car.step();
    assert_eq!(
        commands,
        vec![
            Command::IncrementFloor,
            Command::RemoveUpRequest(3),
            Command::OpenDoorAndNotify,
            Command::SetState(CarState::Idle),
            Command::SetDirection(Direction::Stop),
        ]
    );
    assert_eq!(car.current_floor(), 3);
    assert!(car.door().is_open());
    assert!(car.up_requests().is_empty());
    assert_eq!(car.state(), CarState::Idle);
    assert_eq!(fulfilled(&events), vec![3]);
}

#[test]
fn test_move_down() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car_from(CarSnapshot::idle_at(CarId(1), 5), &clock);
    car.register_request(4);

    car.step();
    assert_eq!(car.state(), CarState::MovingDown);
    assert_eq!(car.direction(), Direction::Down);
    assert_eq!(car.current_floor(), 5);

    car.step();
    assert_eq!(car.current_floor(), 4);
    assert!(car.door().is_open());
    assert_eq!(car.state(), CarState::Idle);
    assert_eq!(car.direction(), Direction::Stop);
    assert!(car.down_requests().is_empty());
    assert_eq!(fulfilled(&events), vec![4]);
}

#[test]
fn test_door_blocks_movement_until_strictly_past_duration() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car(&clock);
    car.register_request(1);
    car.register_request(3);

    car.step(); // MovingUp
    car.step(); // floor 1, door opens at t=0
    assert_eq!(car.current_floor(), 1);
    assert!(car.door().is_open());
    assert_eq!(car.state(), CarState::MovingUp);

    for _ in 0..2 {
        clock.advance_secs(1.0);
        assert!(car.step().is_empty());
        assert_eq!(car.current_floor(), 1);
        assert!(car.door().is_open());
    }

    // t = 2.1: door closes and the car moves in the same step
    clock.advance_secs(0.1);
    let commands = car.step();
    assert_eq!(commands, vec![Command::IncrementFloor]);
    assert_eq!(car.door_state(), DoorState::Closed);
    assert_eq!(car.current_floor(), 2);
}

#[test]
fn test_pickup_in_passing() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car(&clock);
    car.register_request(5);
    car.step(); // MovingUp
    car.step(); // floor 1

    car.register_request(3);
    assert_eq!(car.up_requests().floors(), vec![3, 5]);

    car.step(); // floor 2
    car.step(); // floor 3, door opens
    assert_eq!(car.current_floor(), 3);
    assert!(car.door().is_open());
    assert_eq!(car.state(), CarState::MovingUp);

    clock.advance_secs(2.1);
    car.step(); // door closes, continues to 4
    assert_eq!(car.current_floor(), 4);
    assert_eq!(car.up_requests().floors(), vec![5]);
    assert_eq!(fulfilled(&events), vec![3]);
}

#[test]
fn test_request_current_floor_while_moving_up() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car(&clock);
    car.register_request(5);
    car.step(); // MovingUp
    car.step(); // floor 1
    car.step(); // floor 2

    assert_eq!(car.register_request(2), vec![Command::OpenDoorAndNotify]);
    assert!(car.door().is_open());

    clock.advance_secs(2.1);
    car.step(); // door closes, floor 3
    assert_eq!(car.current_floor(), 3);
    car.step(); // floor 4
    car.step(); // floor 5, door opens

    assert_eq!(car.current_floor(), 5);
    assert!(car.door().is_open());
    assert!(car.up_requests().is_empty());
    assert_eq!(car.state(), CarState::Idle);
    assert_eq!(fulfilled(&events), vec![2, 5]);
}

#[test]
fn test_request_behind_moving_car_is_dropped() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car_from(CarSnapshot::idle_at(CarId(1), 2), &clock);
    car.register_request(6);
    car.step(); // MovingUp
    car.step(); // floor 3

    assert!(car.register_request(1).is_empty());
    assert!(car.down_requests().is_empty());
    assert_eq!(car.up_requests().floors(), vec![6]);
}

#[test]
fn test_request_behind_moving_down_car_is_dropped() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car_from(CarSnapshot::idle_at(CarId(1), 8), &clock);
    car.register_request(2);
    car.step(); // MovingDown
    car.step(); // floor 7

    assert!(car.register_request(9).is_empty());
    assert_eq!(car.register_request(4), vec![Command::AddDownRequest(4)]);
    assert_eq!(car.down_requests().floors(), vec![4, 2]);
    assert!(car.up_requests().is_empty());
}

#[test]
fn test_turns_around_when_sweep_ends() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car_from(CarSnapshot::idle_at(CarId(1), 5), &clock);
    car.register_request(7);
    car.register_request(2);

    car.step(); // up queue wins from idle
    assert_eq!(car.state(), CarState::MovingUp);
    car.step(); // 6
    let commands = car.step(); // 7, last up stop
    assert_eq!(
        commands,
        vec![
            Command::IncrementFloor,
            Command::RemoveUpRequest(7),
            Command::OpenDoorAndNotify,
            Command::SetDirection(Direction::Down),
            Command::SetState(CarState::MovingDown),
        ]
    );

    clock.advance_secs(2.5);
    car.step();
    assert_eq!(car.current_floor(), 6);
    assert_eq!(car.direction(), Direction::Down);
    assert_eq!(fulfilled(&events), vec![7]);
}

#[test]
fn test_moving_state_with_empty_queue_goes_idle() {
    let clock = ManualClock::new();
    let snapshot = CarSnapshot {
        state: CarState::MovingUp,
        direction: Direction::Up,
        ..CarSnapshot::idle_at(CarId(1), 4)
    };
    let (mut car, _events) = make_car_from(snapshot, &clock);

    assert_eq!(
        car.step(),
        vec![
            Command::SetState(CarState::Idle),
            Command::SetDirection(Direction::Stop)
        ]
    );
    assert_eq!(car.current_floor(), 4);
}

#[test]
fn test_maintenance_mode() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car(&clock);

    car.enter_maintenance();
    assert_eq!(car.state(), CarState::Maintenance);
    assert_eq!(car.direction(), Direction::Stop);

    car.exit_maintenance();
    assert_eq!(car.state(), CarState::Idle);
    assert_eq!(car.direction(), Direction::Stop);
}

#[test]
fn test_no_move_in_maintenance() {
    let clock = ManualClock::new();
    let (mut car, events) = make_car(&clock);
    car.enter_maintenance();

    assert!(car.register_request(5).is_empty());
    assert!(car.register_request(0).is_empty());
    for _ in 0..10 {
        assert!(car.step().is_empty());
        clock.advance_secs(1.0);
    }

    assert_eq!(car.current_floor(), 0);
    assert_eq!(car.state(), CarState::Maintenance);
    assert!(car.up_requests().is_empty());
    assert!(!car.door().is_open());
    assert!(fulfilled(&events).is_empty());
}

#[test]
fn test_maintenance_keeps_pending_requests() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car(&clock);
    car.register_request(4);
    car.step(); // MovingUp
    car.step(); // floor 1

    car.enter_maintenance();
    car.step();
    car.step();
    assert_eq!(car.current_floor(), 1);
    assert_eq!(car.up_requests().floors(), vec![4]);

    car.exit_maintenance();
    car.step();
    assert_eq!(car.state(), CarState::MovingUp);
    car.step();
    assert_eq!(car.current_floor(), 2);
}

#[test]
fn test_snapshot_round_trip() {
    let clock = ManualClock::new();
    let (mut car, _events) = make_car(&clock);
    car.register_request(6);
    car.register_request(2);
    car.step();
    car.step();
    car.step(); // floor 2, door open

    let snapshot = car.snapshot();
    assert_eq!(snapshot.door_state, DoorState::Open);
    assert_eq!(snapshot.door_opened_at, Some(Duration::ZERO));

    let (restored, _events) = make_car_from(snapshot.clone(), &clock);
    assert_eq!(restored.snapshot(), snapshot);
}

#[test]
fn test_restore_rejects_open_door_without_timestamp() {
    let (sender, _receiver) = mpsc::channel();
    let snapshot = CarSnapshot {
        door_state: DoorState::Open,
        ..CarSnapshot::idle_at(CarId(3), 1)
    };

    let result = ElevatorCar::restore(&snapshot, 10, DOOR_OPEN, Rc::new(ManualClock::new()), sender);
    assert!(matches!(
        result,
        Err(ReconstructionError::MissingDoorTimestamp { car: CarId(3) })
    ));
}

#[test]
fn test_restore_rejects_floor_outside_building() {
    let (sender, _receiver) = mpsc::channel();
    let snapshot = CarSnapshot {
        up_requests: vec![12],
        ..CarSnapshot::idle_at(CarId(0), 1)
    };

    let result = ElevatorCar::restore(&snapshot, 10, DOOR_OPEN, Rc::new(ManualClock::new()), sender);
    assert!(matches!(
        result,
        Err(ReconstructionError::FloorOutOfRange { floor: 12, num_floors: 10 })
    ));
}
