//! Request queue ordering and idempotence

use elevator_sim::simulation::{Direction, RequestQueue};

#[test]
fn test_up_queue_serves_lowest_first() {
    let mut queue = RequestQueue::up();
    queue.add(7);
    queue.add(2);
    queue.add(5);

    assert_eq!(queue.floors(), vec![2, 5, 7]);
    assert_eq!(queue.peek_next(), Some(2));
    assert_eq!(queue.direction(), Direction::Up);
}

#[test]
fn test_down_queue_serves_highest_first() {
    let mut queue = RequestQueue::down();
    queue.add(2);
    queue.add(9);
    queue.add(4);

    assert_eq!(queue.floors(), vec![9, 4, 2]);
    assert_eq!(queue.peek_next(), Some(9));
    assert_eq!(queue.direction(), Direction::Down);
}

#[test]
fn test_add_twice_is_same_as_once() {
    for floor in 0..12 {
        let mut once = RequestQueue::up();
        once.add(floor);

        let mut twice = RequestQueue::up();
        twice.add(floor);
        twice.add(floor);

        assert_eq!(once.floors(), twice.floors());
        assert_eq!(twice.len(), 1);
    }
}

#[test]
fn test_remove_absent_floor_is_noop() {
    let mut queue = RequestQueue::down();
    queue.add(3);
    queue.remove(8);
    assert_eq!(queue.floors(), vec![3]);

    queue.remove(3);
    queue.remove(3);
    assert!(queue.is_empty());
    assert_eq!(queue.peek_next(), None);
}

#[test]
fn test_min_max_and_contains() {
    let mut queue = RequestQueue::for_direction(Direction::Down);
    assert_eq!(queue.max(), None);
    assert_eq!(queue.min(), None);

    queue.add(6);
    queue.add(1);
    queue.add(4);

    assert_eq!(queue.max(), Some(6));
    assert_eq!(queue.min(), Some(1));
    assert!(queue.contains(4));
    assert!(!queue.contains(5));

    queue.clear();
    assert!(queue.is_empty());
}
