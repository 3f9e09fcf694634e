//! Resident-count preprocessing

use plzmap_core::config::PipelineConfig;
use plzmap_core::error::Result;
use plzmap_core::models::{GeometryLookup, ResidentArea};
use plzmap_core::parse::DecimalFormat;
use plzmap_core::table::RawTable;

use crate::clean::{clean_rows, Cleaned, Row};
use crate::geojoin::{geo_join, Joined};

const POSTAL_CODE: usize = 0;
const RESIDENTS: usize = 1;
const LATITUDE: usize = 2;
const LONGITUDE: usize = 3;

/// Clean the resident table and attach postal-code geometries
pub fn preprocess_residents(
    raw: &RawTable,
    lookup: &GeometryLookup,
    config: &PipelineConfig,
) -> Result<Joined<ResidentArea>> {
    let residents = &config.residents;
    let columns = &residents.columns;
    let table = raw.select(&[
        columns.postal_code.as_str(),
        columns.residents.as_str(),
        columns.latitude.as_str(),
        columns.longitude.as_str(),
    ])?;

    let (areas, mut stats) = clean_rows(&table, config.validity, |row| {
        match row.postal_code(POSTAL_CODE)? {
            Some(code) if residents.postal_range.contains(code) => {
                Ok(Cleaned::from_parsed(area_from_row(row, code, &config.decimal)))
            }
            _ => Ok(Cleaned::Filtered),
        }
    })?;

    tracing::debug!(
        kept = areas.len(),
        filtered = stats.filtered_out,
        malformed = stats.malformed,
        "Resident areas cleaned"
    );

    let joined = geo_join(areas, lookup, config.validity)?;
    stats.merge(joined.stats);

    Ok(Joined { rows: joined.rows, stats })
}

fn area_from_row(row: Row<'_>, postal_code: u32, decimal: &DecimalFormat) -> Result<ResidentArea> {
    Ok(ResidentArea {
        postal_code,
        residents: row.count(RESIDENTS)?,
        latitude: row.decimal(LATITUDE, decimal)?,
        longitude: row.decimal(LONGITUDE, decimal)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plzmap_core::error::PlzmapError;
    use plzmap_core::models::ValidityMode;

    fn residents(rows: &[[&str; 4]]) -> RawTable {
        RawTable::new(
            "plz_einwohner.csv",
            vec!["plz".into(), "einwohner".into(), "lat".into(), "lon".into()],
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        )
    }

    fn lookup() -> GeometryLookup {
        let mut lookup = GeometryLookup::new();
        for code in [10000, 10115, 10117, 14199, 14200] {
            lookup.insert(code, "POINT (13.4 52.5)");
        }
        lookup
    }

    #[test]
    fn test_open_range_excludes_bounds() {
        let raw = residents(&[
            ["10000", "10", "52.5", "13.4"],
            ["14200", "20", "52.5", "13.4"],
            ["10115", "30", "52.5", "13.4"],
            ["14199", "40", "52.5", "13.4"],
        ]);
        let joined = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap();

        let codes: Vec<u32> = joined.rows.iter().map(|r| r.record.postal_code).collect();
        assert_eq!(codes, vec![10115, 14199]);
        assert_eq!(joined.stats.filtered_out, 2);
    }

    #[test]
    fn test_counts_accept_zero_fraction() {
        let raw = residents(&[["10117", "12345.0", "52,52", "13,38"]]);
        let joined = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap();

        let area = &joined.rows[0].record;
        assert_eq!(area.residents, 12345);
        assert_eq!(area.latitude, 52.52);
    }

    #[test]
    fn test_fractional_count_strict_fails() {
        let raw = residents(&[["10117", "12.5", "52.5", "13.4"]]);
        let err = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PlzmapError::Parse { ref column, .. } if column == "einwohner"));
    }

    #[test]
    fn test_negative_count_lenient_drops() {
        let config = PipelineConfig { validity: ValidityMode::Lenient, ..Default::default() };
        let raw = residents(&[["10117", "-3", "52.5", "13.4"], ["10115", "7", "52.5", "13.4"]]);
        let joined = preprocess_residents(&raw, &lookup(), &config).unwrap();

        assert_eq!(joined.len(), 1);
        assert_eq!(joined.stats.malformed, 1);
        assert_eq!(joined.stats.input, 2);
    }

    #[test]
    fn test_unmatched_codes_are_counted() {
        let raw = residents(&[["12043", "100", "52.5", "13.4"]]);
        let joined = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap();
        assert!(joined.is_empty());
        assert_eq!(joined.stats.unmatched, 1);
    }

    #[test]
    fn test_numeric_postal_codes_outside_u32_are_filtered() {
        let raw = residents(&[
            ["-10117", "5", "52.5", "13.4"],
            ["99999999999", "5", "52.5", "13.4"],
            ["10117", "5", "52.5", "13.4"],
        ]);
        let joined = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap();

        assert_eq!(joined.len(), 1);
        assert_eq!(joined.stats.filtered_out, 2);
        assert_eq!(joined.stats.input, 3);
    }

    #[test]
    fn test_empty_postal_code_is_filtered() {
        let raw = residents(&[["", "100", "52.5", "13.4"]]);
        let joined = preprocess_residents(&raw, &lookup(), &PipelineConfig::default()).unwrap();
        assert_eq!(joined.stats.filtered_out, 1);
    }
}
