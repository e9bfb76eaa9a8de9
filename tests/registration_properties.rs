// Property tests for validity and the registration workflow

use chrono::{Duration, NaiveDate};
use community_portal::{is_valid, register, Catalog, EventRecord, RegistrationError};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

/// Day offset from the reference date, in either direction
fn offset() -> impl Strategy<Value = i64> {
    -400i64..400
}

fn catalog_from(seats: &[u32], offsets: &[i64]) -> Catalog {
    let events = seats
        .iter()
        .zip(offsets)
        .enumerate()
        .map(|(i, (seats, days))| {
            EventRecord::new(
                i as u32 + 1,
                format!("Event {}", i + 1),
                base_date() + Duration::days(*days),
                *seats,
                "Music",
                "Park",
            )
        })
        .collect();
    Catalog::from_events(events).unwrap()
}

proptest! {
    #[test]
    fn full_events_are_never_valid(days in offset(), reference in offset()) {
        let event = EventRecord::new(1, "Full", base_date() + Duration::days(days), 0, "Music", "Park");
        prop_assert!(!is_valid(&event, base_date() + Duration::days(reference)));
    }

    #[test]
    fn past_events_are_never_valid(seats in 0u32..1000, days_before in 1i64..400) {
        let event = EventRecord::new(1, "Past", base_date() - Duration::days(days_before), seats, "Music", "Park");
        prop_assert!(!is_valid(&event, base_date()));
    }

    #[test]
    fn register_touches_only_the_target(
        seats in prop::collection::vec(0u32..5, 1..8),
        offsets in prop::collection::vec(offset(), 8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut catalog = catalog_from(&seats, &offsets);
        let before = catalog.clone();
        let id = pick.index(catalog.len()) as u32 + 1;

        match register(&mut catalog, id, base_date()) {
            Ok(left) => {
                for (old, new) in before.events().iter().zip(catalog.events()) {
                    if old.id == id {
                        prop_assert_eq!(new.seats + 1, old.seats);
                        prop_assert_eq!(left, new.seats);
                    } else {
                        prop_assert_eq!(old, new);
                    }
                }
            }
            Err(RegistrationError::Unavailable { .. }) => {
                prop_assert!(!is_valid(before.find(id).unwrap(), base_date()));
                prop_assert_eq!(&catalog, &before);
            }
            Err(RegistrationError::NotFound(_)) => prop_assert!(false, "id {} exists", id),
        }
    }

    #[test]
    fn repeated_registration_runs_out(seats in 0u32..30, days in 0i64..100) {
        let mut catalog = catalog_from(&[seats], &[days]);

        for expected in (0..seats).rev() {
            prop_assert_eq!(register(&mut catalog, 1, base_date()), Ok(expected));
        }
        let unavailable = matches!(
            register(&mut catalog, 1, base_date()),
            Err(RegistrationError::Unavailable { id: 1, .. })
        );
        prop_assert!(unavailable);
    }

    #[test]
    fn unknown_ids_change_nothing(
        seats in prop::collection::vec(0u32..5, 0..6),
        offsets in prop::collection::vec(offset(), 6),
        extra in 1u32..1000,
    ) {
        let mut catalog = catalog_from(&seats, &offsets);
        let before = catalog.clone();
        let id = catalog.len() as u32 + extra;

        prop_assert_eq!(register(&mut catalog, id, base_date()), Err(RegistrationError::NotFound(id)));
        prop_assert_eq!(&catalog, &before);
    }
}

#[test]
fn scenario_register_then_sold_out_then_missing() {
    let mut catalog = Catalog::new();
    catalog.add(EventRecord::new(1, "Music Fest", base_date() + Duration::days(14), 50, "Music", "Park"));

    assert_eq!(register(&mut catalog, 1, base_date()), Ok(49));

    // Sold out: rebuild the record with zero seats
    let mut sold_out = catalog.find(1).cloned().unwrap();
    sold_out.seats = 0;
    let mut catalog = Catalog::from_events(vec![sold_out]).unwrap();

    assert!(matches!(
        register(&mut catalog, 1, base_date()),
        Err(RegistrationError::Unavailable { id: 1, .. })
    ));
    assert_eq!(register(&mut catalog, 999, base_date()), Err(RegistrationError::NotFound(999)));
}

#[test]
fn sample_data_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/events.json");
    let catalog = Catalog::load(path).unwrap();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.categories(), vec!["Music", "Workshop", "Sports"]);
}
