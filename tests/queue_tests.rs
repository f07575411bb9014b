//! Ordering and blocking behavior of the bounded job queue.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use jobsched::scheduler::{BoundedJobQueue, Job, OrderingPolicy};
use jobsched::SchedulerError;

fn queue(capacity: usize, policy: OrderingPolicy) -> Arc<BoundedJobQueue> {
    Arc::new(BoundedJobQueue::new(capacity, policy).unwrap())
}

fn resident_sequences(queue: &BoundedJobQueue) -> Vec<u64> {
    queue.resident().iter().map(|j| j.sequence).collect()
}

fn drain(queue: &BoundedJobQueue) -> Vec<u64> {
    (0..queue.len()).map(|_| queue.dequeue().sequence).collect()
}

#[test]
fn test_fcfs_dequeues_in_submission_order() {
    let q = queue(10, OrderingPolicy::Fcfs);
    for (seq, secs, prio) in [(1, 9, 5), (2, 1, -1), (3, 4, 0), (4, 2, 7)] {
        q.enqueue(Job::new(seq, secs, prio)).unwrap();
    }
    assert_eq!(drain(&q), vec![1, 2, 3, 4]);
}

#[test]
fn test_sjf_dequeues_shortest_first() {
    let q = queue(10, OrderingPolicy::Sjf);
    for (seq, secs) in [(1, 9), (2, 1), (3, 4), (4, 2)] {
        q.enqueue(Job::new(seq, secs, 0)).unwrap();
    }
    assert_eq!(drain(&q), vec![2, 4, 3, 1]);
}

#[test]
fn test_sjf_ties_are_all_returned() {
    let q = queue(10, OrderingPolicy::Sjf);
    q.enqueue(Job::new(1, 3, 0)).unwrap();
    q.enqueue(Job::new(2, 3, 0)).unwrap();
    q.enqueue(Job::new(3, 1, 0)).unwrap();

    let order = drain(&q);
    assert_eq!(order[0], 3);
    let mut tied = order[1..].to_vec();
    tied.sort();
    assert_eq!(tied, vec![1, 2]);
}

#[test]
fn test_priority_dequeues_lowest_value_first() {
    let q = queue(10, OrderingPolicy::Priority);
    for (seq, prio) in [(1, 3), (2, -7), (3, 0), (4, 1)] {
        q.enqueue(Job::new(seq, 1, prio)).unwrap();
    }
    assert_eq!(drain(&q), vec![2, 3, 4, 1]);
}

#[test]
fn test_mode_switch_resorts_only_resident_jobs() {
    let q = queue(10, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 8, 0)).unwrap();
    q.enqueue(Job::new(2, 6, 0)).unwrap();
    q.enqueue(Job::new(3, 2, 0)).unwrap();

    // Job 1 leaves under FCFS even though it is the longest.
    assert_eq!(q.dequeue().sequence, 1);

    q.set_policy(OrderingPolicy::Sjf);
    assert_eq!(q.active_policy(), OrderingPolicy::Sjf);
    assert_eq!(resident_sequences(&q), vec![3, 2]);
    assert_eq!(drain(&q), vec![3, 2]);
}

#[test]
fn test_jobs_admitted_after_switch_follow_new_policy() {
    let q = queue(10, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 5, 0)).unwrap();
    q.set_policy(OrderingPolicy::Sjf);
    q.enqueue(Job::new(2, 1, 0)).unwrap();
    assert_eq!(resident_sequences(&q), vec![2, 1]);
}

#[test]
fn test_two_job_mode_switch_scenario() {
    let q = queue(2, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 5, 1)).unwrap(); // A
    q.enqueue(Job::new(2, 3, 2)).unwrap(); // B
    assert_eq!(resident_sequences(&q), vec![1, 2]);

    q.set_policy(OrderingPolicy::Sjf);
    assert_eq!(resident_sequences(&q), vec![2, 1]);

    q.set_policy(OrderingPolicy::Priority);
    assert_eq!(resident_sequences(&q), vec![1, 2]);

    assert_eq!(drain(&q), vec![1, 2]);
}

#[test]
fn test_enqueue_blocks_when_full_until_dequeue() {
    let q = queue(2, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 1, 0)).unwrap();
    q.enqueue(Job::new(2, 1, 0)).unwrap();
    assert!(q.is_full());

    let (tx, rx) = mpsc::channel();
    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            q.enqueue(Job::new(3, 1, 0)).unwrap();
            tx.send(()).unwrap();
        })
    };

    assert!(
        rx.recv_timeout(Duration::from_millis(150)).is_err(),
        "enqueue on a full queue must block"
    );
    assert_eq!(q.len(), 2);

    assert_eq!(q.dequeue().sequence, 1);
    rx.recv_timeout(Duration::from_secs(2))
        .expect("enqueue should proceed after one dequeue");
    producer.join().unwrap();

    assert_eq!(resident_sequences(&q), vec![2, 3]);
}

#[test]
fn test_dequeue_blocks_when_empty_until_enqueue() {
    let q = queue(2, OrderingPolicy::Fcfs);

    let (tx, rx) = mpsc::channel();
    let consumer = {
        let q = q.clone();
        thread::spawn(move || {
            let job = q.dequeue();
            tx.send(job.sequence).unwrap();
        })
    };

    assert!(
        rx.recv_timeout(Duration::from_millis(150)).is_err(),
        "dequeue on an empty queue must block"
    );

    q.enqueue(Job::new(7, 1, 0)).unwrap();
    let seq = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("dequeue should proceed after one enqueue");
    consumer.join().unwrap();

    assert_eq!(seq, 7);
    assert!(q.is_empty());
}

#[test]
fn test_set_policy_on_full_queue_does_not_block() {
    let q = queue(2, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 4, 0)).unwrap();
    q.enqueue(Job::new(2, 2, 0)).unwrap();

    let (tx, rx) = mpsc::channel();
    let switcher = {
        let q = q.clone();
        thread::spawn(move || {
            q.set_policy(OrderingPolicy::Sjf);
            tx.send(()).unwrap();
        })
    };

    rx.recv_timeout(Duration::from_secs(2))
        .expect("policy switch must not wait for free capacity");
    switcher.join().unwrap();
    assert_eq!(resident_sequences(&q), vec![2, 1]);
}

#[test]
fn test_sentinel_stays_behind_resident_jobs() {
    let q = queue(4, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 3, 0)).unwrap();
    q.enqueue(Job::new(2, 1, 0)).unwrap();
    q.enqueue(Job::sentinel()).unwrap();

    for policy in [OrderingPolicy::Sjf, OrderingPolicy::Priority, OrderingPolicy::Fcfs] {
        q.set_policy(policy);
        let resident = q.resident();
        assert!(resident.last().unwrap().is_sentinel(), "policy {}", policy);
    }
}

#[test]
fn test_enqueue_after_sentinel_is_rejected() {
    let q = queue(4, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 1, 0)).unwrap();
    q.enqueue(Job::sentinel()).unwrap();

    assert!(matches!(
        q.enqueue(Job::new(2, 1, 0)),
        Err(SchedulerError::ShuttingDown)
    ));
    assert_eq!(q.dequeue().sequence, 1);
    assert!(q.dequeue().is_sentinel());
    assert!(q.is_empty());
}

#[test]
fn test_producer_parked_on_full_queue_is_released_by_close() {
    let q = queue(1, OrderingPolicy::Fcfs);
    q.enqueue(Job::new(1, 1, 0)).unwrap();

    let (tx, rx) = mpsc::channel();
    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            tx.send(q.enqueue(Job::new(2, 1, 0))).unwrap();
        })
    };
    let closer = {
        let q = q.clone();
        thread::spawn(move || q.enqueue(Job::sentinel()))
    };
    thread::sleep(Duration::from_millis(50));

    // Free one slot; whichever waiter takes it, the job must never end up
    // behind the sentinel.
    assert_eq!(q.dequeue().sequence, 1);
    let submitted = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("parked producer must return once the queue closes");
    producer.join().unwrap();

    match submitted {
        Ok(()) => {
            // The closer is still waiting for the slot job 2 took.
            assert_eq!(q.dequeue().sequence, 2);
            closer.join().unwrap().unwrap();
        }
        Err(e) => {
            assert!(matches!(e, SchedulerError::ShuttingDown));
            closer.join().unwrap().unwrap();
        }
    }
    assert!(q.dequeue().is_sentinel());
    assert!(q.is_empty());
}

#[test]
fn test_capacity_reported() {
    let q = queue(3, OrderingPolicy::Fcfs);
    assert_eq!(q.capacity(), 3);
    assert!(q.is_empty());
    assert!(!q.is_full());
}
