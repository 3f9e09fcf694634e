//! Property tests for the join, filter and count stages

use std::collections::HashSet;

use plzmap_core::config::PipelineConfig;
use plzmap_core::models::{GeometryLookup, ResidentArea, ValidityMode};
use plzmap_core::table::RawTable;
use plzmap_pipeline::{count_by_postal_code, geo_join, preprocess_charging_stations, preprocess_residents};
use proptest::prelude::*;

const SQUARE: &str = "POLYGON ((13.3 52.5, 13.4 52.5, 13.4 52.6, 13.3 52.5))";

fn lookup_for(codes: &HashSet<u32>) -> GeometryLookup {
    let mut lookup = GeometryLookup::new();
    for &code in codes {
        lookup.insert(code, SQUARE);
    }
    lookup
}

/// Lookup covering every postal code the generators can produce
fn full_lookup() -> GeometryLookup {
    lookup_for(&(9_990..14_300).collect())
}

fn area(postal_code: u32) -> ResidentArea {
    ResidentArea { postal_code, residents: 1, latitude: 52.5, longitude: 13.4 }
}

fn charging_row() -> impl Strategy<Value = Vec<String>> {
    (
        prop_oneof![Just(String::new()), (10_000u32..14_300).prop_map(|c| c.to_string())],
        prop_oneof![Just("Berlin"), Just("Brandenburg"), Just("Bayern")],
        (5_000u32..5_500).prop_map(|v| format!("{},{}", v / 100, v % 100)),
        (1u32..500).prop_map(|p| p.to_string()),
    )
        .prop_map(|(code, state, lat, power)| vec![code, state.to_string(), lat.clone(), lat, power])
}

proptest! {
    #[test]
    fn geo_join_rows_always_have_a_matching_code(
        codes in prop::collection::vec(10_000u32..10_050, 0..60),
        known in prop::collection::hash_set(10_000u32..10_050, 0..30),
    ) {
        let records: Vec<ResidentArea> = codes.iter().copied().map(area).collect();
        let joined = geo_join(records, &lookup_for(&known), ValidityMode::Strict).unwrap();

        prop_assert!(joined.len() <= codes.len());
        prop_assert!(joined.rows.iter().all(|r| known.contains(&r.record.postal_code)));
        prop_assert!(joined.rows.windows(2).all(|w| w[0].record.postal_code <= w[1].record.postal_code));
        prop_assert_eq!(joined.stats.output + joined.stats.unmatched, codes.len());
    }

    #[test]
    fn charging_output_respects_region_and_range(rows in prop::collection::vec(charging_row(), 0..40)) {
        let raw = RawTable::new(
            "Ladesaeulenregister_SEP.csv",
            ["Postleitzahl", "Bundesland", "Breitengrad", "Längengrad", "Nennleistung Ladeeinrichtung [kW]"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows,
        );
        let joined = preprocess_charging_stations(&raw, &full_lookup(), &PipelineConfig::default()).unwrap();

        for row in &joined.rows {
            let station = &row.record;
            prop_assert!(station.postal_code > 10115 && station.postal_code < 14200);
            prop_assert_eq!(station.state.as_str(), "Berlin");
        }
        prop_assert_eq!(joined.stats.input, joined.stats.dropped() + joined.stats.output);
    }

    #[test]
    fn resident_output_respects_range(codes in prop::collection::vec(9_990u32..14_300, 0..40)) {
        let raw = RawTable::new(
            "plz_einwohner.csv",
            vec!["plz".into(), "einwohner".into(), "lat".into(), "lon".into()],
            codes.iter().map(|c| vec![c.to_string(), "100".into(), "52.5".into(), "13.4".into()]).collect(),
        );
        let joined = preprocess_residents(&raw, &full_lookup(), &PipelineConfig::default()).unwrap();

        prop_assert!(joined.rows.iter().all(|r| r.record.postal_code > 10000 && r.record.postal_code < 14200));
        let expected = codes.iter().filter(|&&c| c > 10000 && c < 14200).count();
        prop_assert_eq!(joined.len(), expected);
    }

    #[test]
    fn counts_sum_to_input_with_unique_codes(codes in prop::collection::vec(10_100u32..10_130, 0..80)) {
        let known: HashSet<u32> = codes.iter().copied().collect();
        let records: Vec<ResidentArea> = codes.iter().copied().map(area).collect();
        let joined = geo_join(records, &lookup_for(&known), ValidityMode::Strict).unwrap();

        let counts = count_by_postal_code(&joined.rows);
        prop_assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), joined.len());
        prop_assert!(counts.iter().all(|c| c.count >= 1));

        let unique: HashSet<u32> = counts.iter().map(|c| c.postal_code).collect();
        prop_assert_eq!(unique.len(), counts.len());
    }
}
