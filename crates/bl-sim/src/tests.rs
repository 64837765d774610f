//! Integration tests for bl-sim.

use bl_core::{BusId, ProcessId, SimConfig, SimRng, SimTime, TerminalId};
use bl_schedule::{Itinerary, SyntheticSpec, Trip, TripDataset, generate_trips};

use crate::{NoopObserver, Sim, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

const X: TerminalId = TerminalId(0);
const T: TerminalId = TerminalId(1);
const Z: TerminalId = TerminalId(2);

fn config(capacity: u32) -> SimConfig {
    SimConfig { bus_capacity: capacity, ..SimConfig::default() }
}

/// Engine with terminals X, T, Z.
fn sim(capacity: u32) -> Sim {
    Sim::new(config(capacity), 3).unwrap()
}

fn trip(bus: u64, origin: TerminalId, destination: TerminalId, duration: f64) -> Trip {
    Trip { bus_id: BusId(bus), origin, destination, duration }
}

fn itinerary(bus: u64, trips: &[(TerminalId, TerminalId, f64)]) -> Itinerary {
    Itinerary::new(
        BusId(bus),
        trips.iter().map(|&(o, d, dur)| trip(bus, o, d, dur)).collect(),
    )
}

/// Observer that records every callback.
#[derive(Default)]
struct Recorder {
    arrivals:   Vec<(SimTime, TerminalId, usize)>,
    boardings:  Vec<(SimTime, BusId, TerminalId, f64)>,
    departures: Vec<(SimTime, BusId, usize, TerminalId, u32)>,
    finished:   Vec<(SimTime, BusId, u64)>,
    ended:      Option<(SimTime, usize)>,
}

impl SimObserver for Recorder {
    fn on_arrival(&mut self, time: SimTime, terminal: TerminalId, queue_len: usize) {
        self.arrivals.push((time, terminal, queue_len));
    }
    fn on_boarding(&mut self, time: SimTime, bus: BusId, terminal: TerminalId, wait: f64) {
        self.boardings.push((time, bus, terminal, wait));
    }
    fn on_departure(&mut self, time: SimTime, bus: BusId, trip: usize, origin: TerminalId, boarded: u32) {
        self.departures.push((time, bus, trip, origin, boarded));
    }
    fn on_bus_finished(&mut self, time: SimTime, bus: BusId, total: u64) {
        self.finished.push((time, bus, total));
    }
    fn on_sim_end(&mut self, final_time: SimTime, pending: usize) {
        self.ended = Some((final_time, pending));
    }
}

/// A reproducible multi-bus dataset.
fn synthetic(seed: u64, buses: u32, trips_per_bus: u32) -> TripDataset {
    let spec = SyntheticSpec {
        buses,
        terminals: 4,
        trips_per_bus,
        duration_mins: (15.0, 70.0),
        layover_mins:  (0.0, 20.0),
        start: chrono::NaiveDate::from_ymd_opt(2021, 10, 4)
            .unwrap()
            .and_hms_opt(5, 30, 0)
            .unwrap(),
        first_bus_id: 600,
    };
    TripDataset::new(generate_trips(&spec, &mut SimRng::new(seed))).unwrap()
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use crate::{EventQueue, SimError};

    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.schedule(ProcessId(0), SimTime(10.0)).unwrap();
        q.schedule(ProcessId(1), SimTime(5.0)).unwrap();
        q.schedule(ProcessId(2), SimTime(20.0)).unwrap();

        let order: Vec<u32> = std::iter::from_fn(|| q.pop_due(SimTime::NEVER))
            .map(|e| e.process.0)
            .collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(q.now(), SimTime(20.0));
    }

    #[test]
    fn ties_resume_in_scheduling_order() {
        let mut q = EventQueue::new();
        for pid in [4, 2, 9, 0] {
            q.schedule(ProcessId(pid), SimTime(5.0)).unwrap();
        }
        q.schedule(ProcessId(7), SimTime(1.0)).unwrap();

        let order: Vec<u32> = std::iter::from_fn(|| q.pop_due(SimTime::NEVER))
            .map(|e| e.process.0)
            .collect();
        assert_eq!(order, vec![7, 4, 2, 9, 0]);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut q = EventQueue::new();
        let a = q.schedule(ProcessId(0), SimTime(3.0)).unwrap();
        let b = q.schedule(ProcessId(0), SimTime(1.0)).unwrap();
        assert!(b > a);
        assert_eq!(q.next_seq(), b + 1);
    }

    #[test]
    fn pop_due_respects_bound_inclusively() {
        let mut q = EventQueue::new();
        q.schedule(ProcessId(0), SimTime(5.0)).unwrap();
        q.schedule(ProcessId(1), SimTime(6.0)).unwrap();

        assert_eq!(q.pop_due(SimTime(5.0)).map(|e| e.process), Some(ProcessId(0)));
        assert!(q.pop_due(SimTime(5.0)).is_none());
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(SimTime(6.0)));
    }

    #[test]
    fn rejects_invalid_due_times() {
        let mut q = EventQueue::new();
        for at in [-1.0, f64::NAN, f64::INFINITY] {
            let err = q.schedule(ProcessId(0), SimTime(at)).unwrap_err();
            assert!(matches!(err, SimError::InvalidDueTime { .. }), "{err}");
        }
        assert!(q.is_empty());
    }

    #[test]
    fn rejects_scheduling_in_the_past() {
        let mut q = EventQueue::new();
        q.schedule(ProcessId(0), SimTime(10.0)).unwrap();
        q.pop_due(SimTime::NEVER).unwrap();
        assert!(q.schedule(ProcessId(0), SimTime(9.0)).is_err());
        assert!(q.schedule_in(ProcessId(0), -0.5).is_err());
        assert!(q.schedule_in(ProcessId(0), 0.0).is_ok());
    }

    #[test]
    fn advance_to_is_monotone() {
        let mut q = EventQueue::new();
        q.advance_to(SimTime(4.0));
        assert_eq!(q.now(), SimTime(4.0));
        q.advance_to(SimTime(2.0));
        assert_eq!(q.now(), SimTime(4.0));
        q.advance_to(SimTime::NEVER);
        assert_eq!(q.now(), SimTime(4.0));
    }
}

// ── TerminalQueues ────────────────────────────────────────────────────────────

#[cfg(test)]
mod terminal_tests {
    use crate::{Dequeue, Passenger, SimError, TerminalQueues};

    use super::*;

    fn pax(at: f64) -> Passenger {
        Passenger { arrival_time: SimTime(at), terminal: T }
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut q = TerminalQueues::new(3);
        for at in [1.0, 2.0, 3.0] {
            q.enqueue(T, pax(at)).unwrap();
        }
        assert_eq!(q.len(T).unwrap(), 3);
        assert_eq!(q.dequeue(T, ProcessId(0)).unwrap(), Dequeue::Ready(pax(1.0)));
        assert_eq!(q.dequeue(T, ProcessId(0)).unwrap(), Dequeue::Ready(pax(2.0)));
        assert_eq!(q.dequeue(T, ProcessId(0)).unwrap(), Dequeue::Ready(pax(3.0)));
    }

    #[test]
    fn empty_dequeue_parks_caller() {
        let mut q = TerminalQueues::new(3);
        assert_eq!(q.dequeue(T, ProcessId(5)).unwrap(), Dequeue::Parked);
        let parked: Vec<ProcessId> = q.get(T).unwrap().parked().collect();
        assert_eq!(parked, vec![ProcessId(5)]);
    }

    #[test]
    fn enqueue_wakes_oldest_waiter_without_handing_over_item() {
        let mut q = TerminalQueues::new(3);
        q.dequeue(T, ProcessId(1)).unwrap();
        q.dequeue(T, ProcessId(2)).unwrap();

        assert_eq!(q.enqueue(T, pax(4.0)).unwrap(), Some(ProcessId(1)));
        // Item still queued: the woken waiter has to dequeue it.
        assert_eq!(q.len(T).unwrap(), 1);
        assert_eq!(q.enqueue(T, pax(5.0)).unwrap(), Some(ProcessId(2)));
        assert_eq!(q.enqueue(T, pax(6.0)).unwrap(), None);
    }

    #[test]
    fn abandon_withdraws_waiter() {
        let mut q = TerminalQueues::new(3);
        q.dequeue(T, ProcessId(1)).unwrap();
        q.dequeue(T, ProcessId(2)).unwrap();
        assert!(q.abandon(T, ProcessId(1)).unwrap());
        assert!(!q.abandon(T, ProcessId(1)).unwrap());
        assert_eq!(q.enqueue(T, pax(1.0)).unwrap(), Some(ProcessId(2)));
    }

    #[test]
    fn unknown_terminal_is_an_error() {
        let mut q = TerminalQueues::new(2);
        let bad = TerminalId(2);
        assert!(matches!(q.enqueue(bad, pax(0.0)), Err(SimError::UnknownTerminal(t)) if t == bad));
        assert!(q.dequeue(bad, ProcessId(0)).is_err());
        assert!(q.abandon(bad, ProcessId(0)).is_err());
        assert!(q.len(bad).is_err());
    }

    #[test]
    fn queues_are_independent() {
        let mut q = TerminalQueues::new(3);
        q.enqueue(X, Passenger { arrival_time: SimTime(0.0), terminal: X }).unwrap();
        q.enqueue(T, pax(1.0)).unwrap();
        q.enqueue(T, pax(2.0)).unwrap();
        assert_eq!(q.len(X).unwrap(), 1);
        assert_eq!(q.len(T).unwrap(), 2);
        assert!(q.is_empty(Z).unwrap());
        assert_eq!(q.total_waiting(), 3);
        assert_eq!(q.iter().count(), 3);
    }
}

// ── Boarding scenarios ────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn two_waiting_passengers_board_in_arrival_order() {
        // Arrivals at T at 0 and 2; the bus reaches T at 10 after a first
        // trip from X.
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(0.0), T).unwrap();
        sim.spawn_passenger(SimTime(2.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, Z, 5.0)])).unwrap();

        let stats = sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();

        assert_eq!(sim.metrics().waiting_times(), &[10.0, 8.0]);
        assert_eq!(sim.metrics().bus_utilization()[&BusId(1)], 2);
        assert!(sim.metrics().is_finished(BusId(1)));
        assert_eq!(stats.final_time, SimTime(15.0));
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.live, 0);
    }

    #[test]
    fn capacity_one_boards_only_the_earliest() {
        let mut sim = sim(1);
        sim.spawn_passenger(SimTime(0.0), T).unwrap();
        sim.spawn_passenger(SimTime(1.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, Z, 5.0)])).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();

        assert_eq!(sim.metrics().waiting_times(), &[10.0]);
        assert_eq!(sim.metrics().total_boarded(), 1);
        // The later arrival is still queued and never boards.
        let left: Vec<SimTime> = sim.terminals().get(T).unwrap().waiting().map(|p| p.arrival_time).collect();
        assert_eq!(left, vec![SimTime(1.0)]);
    }

    #[test]
    fn later_trip_serves_leftover_passenger() {
        let mut sim = sim(1);
        sim.spawn_passenger(SimTime(0.0), T).unwrap();
        sim.spawn_passenger(SimTime(1.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, X, 5.0), (X, T, 5.0), (T, Z, 1.0)])).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        // Second boarding at T happens at 10 + 5 + 5 = 20.
        assert_eq!(sim.metrics().waiting_times(), &[10.0, 19.0]);
        assert_eq!(sim.metrics().bus_utilization()[&BusId(1)], 2);
    }

    #[test]
    fn empty_itinerary_reports_zero() {
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(1.0), T).unwrap();
        sim.spawn_bus(Itinerary::empty(BusId(77))).unwrap();

        let mut rec = Recorder::default();
        sim.run(SimTime::NEVER, &mut rec).unwrap();

        assert_eq!(sim.metrics().bus_utilization()[&BusId(77)], 0);
        assert!(sim.metrics().waiting_times().is_empty());
        assert_eq!(rec.finished, vec![(SimTime(0.0), BusId(77), 0)]);
    }

    #[test]
    fn run_until_zero_with_future_arrivals() {
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(5.0), T).unwrap();
        sim.spawn_passenger(SimTime(7.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(T, Z, 10.0)])).unwrap();
        sim.spawn_bus(itinerary(2, &[(T, X, 3.0)])).unwrap();

        let stats = sim.run(SimTime::ZERO, &mut NoopObserver).unwrap();

        assert!(sim.metrics().waiting_times().is_empty());
        assert_eq!(sim.metrics().bus_utilization().len(), 2);
        assert!(sim.metrics().bus_utilization().values().all(|&n| n == 0));
        assert_eq!(stats.final_time, SimTime::ZERO);
        assert!(stats.pending > 0);
        assert!(stats.live > 0);
    }

    #[test]
    fn negative_zero_bound_runs_time_zero_events() {
        let mut sim = sim(60);
        sim.spawn_bus(Itinerary::empty(BusId(77))).unwrap();

        let mut rec = Recorder::default();
        let stats = sim.run(SimTime(-0.0), &mut rec).unwrap();

        assert_eq!(stats.events, 1);
        assert_eq!(rec.finished, vec![(SimTime::ZERO, BusId(77), 0)]);
        assert!(stats.final_time.0.is_sign_positive());
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn empty_origin_still_consumes_travel_time() {
        let mut sim = sim(60);
        sim.spawn_bus(itinerary(1, &[(X, T, 12.5), (T, Z, 7.5)])).unwrap();

        let mut rec = Recorder::default();
        sim.run(SimTime::NEVER, &mut rec).unwrap();

        let departures: Vec<(SimTime, u32)> = rec.departures.iter().map(|d| (d.0, d.4)).collect();
        assert_eq!(departures, vec![(SimTime(0.0), 0), (SimTime(12.5), 0)]);
        assert_eq!(rec.finished, vec![(SimTime(20.0), BusId(1), 0)]);
    }

    #[test]
    fn arrival_filed_after_bus_start_misses_same_instant_departure() {
        // Both processes start at 0; the passenger's arrival event is filed
        // after the bus has already evaluated its (empty) queue.
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(0.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(T, Z, 5.0)])).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        assert!(sim.metrics().waiting_times().is_empty());
        assert_eq!(sim.terminals().len(T).unwrap(), 1);
    }

    #[test]
    fn same_instant_arrival_boards_while_bus_is_draining() {
        // The bus reaches T at 10 and takes the passenger from 3.  Its
        // boarding yield is filed after the second passenger's arrival at 10,
        // so the queue is non-empty again when the bus looks.
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(3.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, Z, 5.0)])).unwrap();
        sim.spawn_passenger(SimTime(10.0), T).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        assert_eq!(sim.metrics().waiting_times(), &[7.0, 0.0]);
    }

    #[test]
    fn drain_stops_at_empty_queue() {
        // A passenger arriving one minute after departure waits for the
        // next visit instead of holding the bus.
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(3.0), T).unwrap();
        sim.spawn_passenger(SimTime(11.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, X, 4.0), (X, T, 4.0), (T, Z, 1.0)])).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        assert_eq!(sim.metrics().waiting_times(), &[7.0, 7.0]);
    }

    #[test]
    fn two_buses_share_a_terminal_queue() {
        let mut sim = sim(2);
        for at in [0.0, 1.0, 2.0, 3.0] {
            sim.spawn_passenger(SimTime(at), T).unwrap();
        }
        sim.spawn_bus(itinerary(1, &[(X, T, 10.0), (T, Z, 5.0)])).unwrap();
        sim.spawn_bus(itinerary(2, &[(X, T, 20.0), (T, Z, 5.0)])).unwrap();

        let mut rec = Recorder::default();
        sim.run(SimTime::NEVER, &mut rec).unwrap();

        assert_eq!(sim.metrics().waiting_times(), &[10.0, 9.0, 18.0, 17.0]);
        assert_eq!(sim.metrics().bus_utilization()[&BusId(1)], 2);
        assert_eq!(sim.metrics().bus_utilization()[&BusId(2)], 2);
        let boarded_by: Vec<BusId> = rec.boardings.iter().map(|b| b.1).collect();
        assert_eq!(boarded_by, vec![BusId(1), BusId(1), BusId(2), BusId(2)]);
    }

    #[test]
    fn observer_sees_arrivals_with_queue_length() {
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(1.0), T).unwrap();
        sim.spawn_passenger(SimTime(2.0), T).unwrap();
        sim.spawn_passenger(SimTime(2.0), X).unwrap();

        let mut rec = Recorder::default();
        sim.run(SimTime::NEVER, &mut rec).unwrap();
        assert_eq!(
            rec.arrivals,
            vec![(SimTime(1.0), T, 1), (SimTime(2.0), T, 2), (SimTime(2.0), X, 1)]
        );
        assert_eq!(rec.ended, Some((SimTime(2.0), 0)));
    }
}

// ── Lifecycle and partial runs ────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use crate::ProcessState;

    use super::*;

    #[test]
    fn process_states_follow_the_run() {
        let mut sim = sim(60);
        let p = sim.spawn_passenger(SimTime(5.0), T).unwrap();
        let b = sim.spawn_bus(itinerary(1, &[(X, Z, 10.0)])).unwrap();

        assert_eq!(sim.process_state(p), Some(ProcessState::Pending));
        assert_eq!(sim.process_state(b), Some(ProcessState::Pending));
        assert_eq!(sim.bus_of(b), Some(BusId(1)));
        assert_eq!(sim.bus_of(p), None);

        sim.run(SimTime::ZERO, &mut NoopObserver).unwrap();
        assert_eq!(sim.process_state(p), Some(ProcessState::WaitingOnTimeout));
        assert_eq!(sim.process_state(b), Some(ProcessState::WaitingOnTimeout));

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        assert_eq!(sim.process_state(p), Some(ProcessState::Finished));
        assert_eq!(sim.process_state(b), Some(ProcessState::Finished));
        assert_eq!(sim.process_state(ProcessId(99)), None);
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn finite_bound_moves_clock_to_bound() {
        let mut sim = sim(60);
        sim.spawn_passenger(SimTime(50.0), T).unwrap();
        let stats = sim.run(SimTime(20.0), &mut NoopObserver).unwrap();
        assert_eq!(stats.final_time, SimTime(20.0));
        assert_eq!(sim.now(), SimTime(20.0));
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn resumed_run_matches_single_run() {
        let dataset = synthetic(11, 6, 8);

        let mut whole = SimBuilder::new(config(5), &dataset).build().unwrap();
        whole.run(SimTime::NEVER, &mut NoopObserver).unwrap();

        let mut pieces = SimBuilder::new(config(5), &dataset).build().unwrap();
        for until in [0.0, 30.0, 30.0, 95.5, 240.0] {
            pieces.run(SimTime(until), &mut NoopObserver).unwrap();
        }
        pieces.run(SimTime::NEVER, &mut NoopObserver).unwrap();

        assert_eq!(whole.metrics(), pieces.metrics());
    }

    #[test]
    fn processes_spawned_mid_run_start_at_current_time() {
        let mut sim = sim(60);
        sim.run(SimTime(10.0), &mut NoopObserver).unwrap();
        sim.spawn_passenger(SimTime(2.0), T).unwrap();
        sim.spawn_bus(itinerary(1, &[(X, T, 5.0), (T, Z, 1.0)])).unwrap();

        sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        // Passenger at 12, bus reaches T at 15.
        assert_eq!(sim.metrics().waiting_times(), &[3.0]);
    }
}

// ── Fail-fast errors ──────────────────────────────────────────────────────────

#[cfg(test)]
mod error_tests {
    use crate::{ProcessState, SimError};

    use super::*;

    #[test]
    fn invalid_config_rejected() {
        assert!(matches!(Sim::new(config(0), 1), Err(SimError::Config(_))));
    }

    #[test]
    fn passenger_at_unknown_terminal() {
        let mut sim = sim(60);
        assert!(matches!(
            sim.spawn_passenger(SimTime(0.0), TerminalId(3)),
            Err(SimError::UnknownTerminal(TerminalId(3)))
        ));
    }

    #[test]
    fn bus_with_unknown_terminal() {
        let mut sim = sim(60);
        let err = sim.spawn_bus(itinerary(1, &[(X, TerminalId(8), 1.0)])).unwrap_err();
        assert!(matches!(err, SimError::UnknownTerminal(TerminalId(8))));
        assert!(sim.metrics().bus_utilization().is_empty());
    }

    #[test]
    fn bus_with_bad_duration() {
        let mut sim = sim(60);
        let err = sim.spawn_bus(itinerary(4, &[(X, T, 1.0), (T, X, -2.0)])).unwrap_err();
        assert!(matches!(err, SimError::InvalidDuration { trip: 1, .. }), "{err}");
    }

    #[test]
    fn negative_or_nan_offset() {
        let mut sim = sim(60);
        assert!(sim.spawn_passenger(SimTime(-1.0), T).is_err());
        assert!(sim.spawn_passenger(SimTime(f64::NAN), T).is_err());
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn failed_reschedule_keeps_process_alive() {
        let mut sim = sim(60);
        let b = sim.spawn_bus(itinerary(1, &[(X, T, f64::MAX), (T, Z, f64::MAX)])).unwrap();

        // The second departure would be due at MAX + MAX = inf.
        let err = sim.run(SimTime::NEVER, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::InvalidDueTime { process, .. } if process == b));
        assert_eq!(sim.live_processes(), 1);
        assert_eq!(sim.process_state(b), Some(ProcessState::WaitingOnTimeout));
        assert_eq!(sim.bus_of(b), Some(BusId(1)));

        let stats = sim.run(SimTime::NEVER, &mut NoopObserver).unwrap();
        assert_eq!(stats.events, 0);
        assert_eq!(stats.live, 1);
    }

    #[test]
    fn invalid_run_bound() {
        let mut sim = sim(60);
        assert!(matches!(sim.run(SimTime(-1.0), &mut NoopObserver), Err(SimError::InvalidBound(_))));
        assert!(sim.run(SimTime(f64::NAN), &mut NoopObserver).is_err());
    }
}

// ── Properties over generated datasets ────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use std::collections::HashMap;

    use crate::ProcessState;

    use super::*;

    #[test]
    fn waits_match_utilization_for_full_and_partial_runs() {
        let dataset = synthetic(3, 8, 10);
        for until in [0.0, 45.0, 200.0, 600.0, f64::INFINITY] {
            let mut sim = SimBuilder::new(config(3), &dataset).build().unwrap();
            sim.run(SimTime(until), &mut NoopObserver).unwrap();
            let m = sim.metrics();
            assert_eq!(m.waiting_times().len() as u64, m.total_boarded(), "until {until}");
            assert_eq!(m.bus_utilization().len(), dataset.bus_count());
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let dataset = synthetic(21, 10, 12);
        let run = || {
            let mut sim = SimBuilder::new(config(4), &dataset).build().unwrap();
            sim.run_to_horizon(&mut NoopObserver).unwrap();
            sim.into_metrics()
        };
        let (a, b) = (run(), run());
        assert_eq!(a, b);
        let bits = |m: &crate::Metrics| m.waiting_times().iter().map(|w| w.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn boarding_is_fifo_per_terminal_and_waits_non_negative() {
        let dataset = synthetic(5, 12, 10);
        let mut sim = SimBuilder::new(config(2), &dataset).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_to_horizon(&mut rec).unwrap();

        assert!(!rec.boardings.is_empty());
        let mut last_arrival: HashMap<TerminalId, f64> = HashMap::new();
        for &(time, _bus, terminal, wait) in &rec.boardings {
            assert!(wait >= 0.0, "negative wait {wait}");
            let arrival = time.0 - wait;
            let prev = last_arrival.insert(terminal, arrival).unwrap_or(f64::NEG_INFINITY);
            assert!(arrival >= prev - 1e-9, "{terminal}: {arrival} boarded after {prev}");
        }
    }

    #[test]
    fn capacity_never_exceeded_per_trip() {
        let dataset = synthetic(8, 3, 15);
        for capacity in [1, 2, 5] {
            let mut sim = SimBuilder::new(config(capacity), &dataset).build().unwrap();
            let mut rec = Recorder::default();
            sim.run_to_horizon(&mut rec).unwrap();
            assert!(rec.departures.iter().all(|d| d.4 <= capacity));
        }
    }

    #[test]
    fn buses_never_park_on_terminal_queues() {
        let dataset = synthetic(17, 10, 12);
        let mut sim = SimBuilder::new(config(2), &dataset).build().unwrap();
        let processes = sim.live_processes() as u32;

        for until in [0.0, 20.0, 75.0, 150.0, 400.0, f64::INFINITY] {
            sim.run(SimTime(until), &mut NoopObserver).unwrap();
            for pid in (0..processes).map(ProcessId) {
                assert_ne!(sim.process_state(pid), Some(ProcessState::WaitingOnQueue), "until {until}");
            }
            assert!(sim.terminals().iter().all(|(_, q)| q.parked().next().is_none()), "until {until}");
        }
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn observer_boardings_match_metrics() {
        let dataset = synthetic(13, 5, 6);
        let mut sim = SimBuilder::new(config(60), &dataset).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_to_horizon(&mut rec).unwrap();
        let waits: Vec<f64> = rec.boardings.iter().map(|b| b.3).collect();
        assert_eq!(waits, sim.metrics().waiting_times());
        for &(_, bus, total) in &rec.finished {
            assert_eq!(sim.metrics().bus_utilization()[&bus], total);
        }
    }
}

// ── SimBuilder and sweep ──────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use crate::capacity_sweep;

    use super::*;

    #[test]
    fn spawns_one_process_per_arrival_and_bus() {
        let dataset = synthetic(1, 4, 5);
        let sim = SimBuilder::new(config(60), &dataset).build().unwrap();
        assert_eq!(sim.live_processes(), dataset.len() + dataset.bus_count());
        assert_eq!(sim.pending_events(), sim.live_processes());
        assert_eq!(sim.terminals().terminal_count(), dataset.terminals().len());
    }

    #[test]
    fn horizon_from_dataset() {
        let dataset = synthetic(1, 4, 5);
        let builder = SimBuilder::new(config(60), &dataset);
        let expected = dataset.default_horizon(bl_core::DEFAULT_HORIZON_FACTOR);
        assert!((builder.horizon().0 - expected.0).abs() < 1e-9);
        assert_eq!(builder.build().unwrap().horizon().0, expected.0);
    }

    #[test]
    fn explicit_until_wins() {
        let dataset = synthetic(1, 4, 5);
        let cfg = SimConfig { until: Some(SimTime(33.0)), ..config(60) };
        let mut sim = SimBuilder::new(cfg, &dataset).build().unwrap();
        assert_eq!(sim.horizon(), SimTime(33.0));
        let stats = sim.run_to_horizon(&mut NoopObserver).unwrap();
        assert_eq!(stats.final_time, SimTime(33.0));
    }

    #[test]
    fn empty_dataset_runs_cleanly() {
        let dataset = TripDataset::empty();
        let mut sim = SimBuilder::new(config(60), &dataset).build().unwrap();
        let stats = sim.run_to_horizon(&mut NoopObserver).unwrap();
        assert_eq!(stats.events, 0);
        assert!(sim.metrics().waiting_times().is_empty());
        assert!(sim.metrics().bus_utilization().is_empty());
    }

    #[test]
    fn idle_bus_from_dataset() {
        let mut dataset = synthetic(1, 2, 3);
        dataset.add_idle_bus(BusId(1));
        let mut sim = SimBuilder::new(config(60), &dataset).build().unwrap();
        sim.run_to_horizon(&mut NoopObserver).unwrap();
        assert_eq!(sim.metrics().bus_utilization()[&BusId(1)], 0);
        assert!(sim.metrics().is_finished(BusId(1)));
    }

    #[test]
    fn without_passengers_and_extra_terminals() {
        let dataset = synthetic(1, 2, 3);
        let extra = TerminalId(dataset.terminals().len() as u32);
        let mut sim = SimBuilder::new(config(60), &dataset)
            .without_passengers()
            .extra_terminals(1)
            .build()
            .unwrap();
        assert_eq!(sim.live_processes(), dataset.bus_count());
        sim.spawn_passenger(SimTime(1.0), extra).unwrap();
        sim.run_to_horizon(&mut NoopObserver).unwrap();
        assert!(sim.metrics().waiting_times().is_empty());
        assert_eq!(sim.terminals().len(extra).unwrap(), 1);
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let dataset = synthetic(17, 6, 8);
        let base = SimConfig::default();
        let results = capacity_sweep(&dataset, &base, &[1, 3, 60]).unwrap();

        let caps: Vec<u32> = results.iter().map(|r| r.0).collect();
        assert_eq!(caps, vec![1, 3, 60]);

        for (capacity, metrics) in &results {
            let mut sim = SimBuilder::new(config(*capacity), &dataset).build().unwrap();
            sim.run_to_horizon(&mut NoopObserver).unwrap();
            assert_eq!(sim.metrics(), metrics);
        }
    }

    #[test]
    fn sweep_rejects_zero_capacity() {
        let dataset = synthetic(17, 2, 2);
        assert!(capacity_sweep(&dataset, &SimConfig::default(), &[2, 0]).is_err());
    }
}
