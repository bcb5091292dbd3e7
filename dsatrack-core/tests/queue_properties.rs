use chrono::{TimeZone, Utc};
use dsatrack_core::{next_position, pick_next, Question, Revision, StatsWindow};
use proptest::prelude::*;

fn question(id: i64, position: i64) -> Question {
    Question {
        id,
        user_id: 1,
        number: id as i32,
        name: format!("q{id}"),
        topics: vec![],
        link: None,
        notes: None,
        date_added: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        attempt_count: 0,
        last_attempt: None,
        position,
    }
}

fn queue_from(positions: &[i64]) -> Vec<Question> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| question(i as i64 + 1, p))
        .collect()
}

proptest! {
    /// Property: a revised question lands strictly behind every other question
    #[test]
    fn prop_revision_moves_behind_everyone(
        positions in prop::collection::vec(-1_000_000i64..1_000_000, 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut queue = queue_from(&positions);
        let idx = pick.index(queue.len());
        let max = queue.iter().map(|q| q.position).max();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        let rev = Revision::of(&queue[idx], max, now);
        rev.apply_to(&mut queue[idx]);

        let revised = &queue[idx];
        for (i, other) in queue.iter().enumerate() {
            if i != idx {
                prop_assert!(revised.position > other.position);
            }
        }
        prop_assert_eq!(revised.attempt_count, 1);
    }

    /// Property: pick_next returns a question with the minimum position
    #[test]
    fn prop_pick_next_is_minimum(
        positions in prop::collection::vec(any::<i32>().prop_map(i64::from), 1..40),
    ) {
        let queue = queue_from(&positions);
        let next = pick_next(&queue).unwrap();
        let min = positions.iter().copied().min().unwrap();
        prop_assert_eq!(next.position, min);
    }

    /// Property: repeated revision of the head cycles through the whole queue
    #[test]
    fn prop_revising_head_cycles_queue(len in 1usize..20) {
        let positions: Vec<i64> = (1..=len as i64).collect();
        let mut queue = queue_from(&positions);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        let mut seen = Vec::new();
        for _ in 0..len {
            let head_id = pick_next(&queue).unwrap().id;
            seen.push(head_id);
            let max = queue.iter().map(|q| q.position).max();
            let idx = queue.iter().position(|q| q.id == head_id).unwrap();
            let rev = Revision::of(&queue[idx], max, now);
            rev.apply_to(&mut queue[idx]);
        }

        let expected: Vec<i64> = (1..=len as i64).collect();
        prop_assert_eq!(seen, expected);
    }

    /// Property: the stats window always spans exactly the requested days
    #[test]
    fn prop_window_length(days_back in 0i64..20_000, count in 1u64..30) {
        let today = chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
            + chrono::TimeDelta::days(days_back);
        let window = StatsWindow::trailing_days(today, count);
        prop_assert_eq!(window.days().len() as u64, count);
        prop_assert_eq!(window.days().last().unwrap().date, today);
    }
}

#[test]
fn next_position_after_empty_queue() {
    assert_eq!(next_position(None), 1);
}
