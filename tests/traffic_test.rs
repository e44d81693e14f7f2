//! Random hall-call generation

use elevator_sim::simulation::{Direction, HallCallGenerator};

#[test]
fn test_seeded_generators_agree() {
    let mut a = HallCallGenerator::with_seed(15, 0.4, 42);
    let mut b = HallCallGenerator::with_seed(15, 0.4, 42);

    let calls_a: Vec<_> = (0..200).map(|_| a.next_call()).collect();
    let calls_b: Vec<_> = (0..200).map(|_| b.next_call()).collect();
    assert_eq!(calls_a, calls_b);
    assert!(calls_a.iter().any(Option::is_some));
    assert!(calls_a.iter().any(Option::is_none));
}

#[test]
fn test_calls_stay_in_building() {
    let mut generator = HallCallGenerator::with_seed(6, 1.0, 7);

    for _ in 0..500 {
        let (floor, direction) = generator.next_call().expect("probability 1 always calls");
        assert!(floor < 6);
        assert_ne!(direction, Direction::Stop);
        if floor == 0 {
            assert_eq!(direction, Direction::Up);
        }
        if floor == 5 {
            assert_eq!(direction, Direction::Down);
        }
    }
}

#[test]
fn test_zero_probability_never_calls() {
    let mut generator = HallCallGenerator::with_seed(10, 0.0, 1);
    assert!((0..100).all(|_| generator.next_call().is_none()));

    // Out-of-range probabilities are clamped
    let mut generator = HallCallGenerator::new(10, -3.0);
    assert!((0..100).all(|_| generator.next_call().is_none()));

    let mut generator = HallCallGenerator::with_seed(10, f64::NAN, 3);
    assert!((0..100).all(|_| generator.next_call().is_none()));
}

#[test]
fn test_single_floor_building_never_calls() {
    let mut generator = HallCallGenerator::new(1, 1.0);
    assert_eq!(generator.next_call(), None);
}

#[test]
fn test_two_floors_only_call_towards_the_other() {
    let mut generator = HallCallGenerator::with_seed(2, 5.0, 99);

    for _ in 0..50 {
        match generator.next_call() {
            Some((0, Direction::Up)) | Some((1, Direction::Down)) => {}
            other => panic!("unexpected call {other:?}"),
        }
    }
}
