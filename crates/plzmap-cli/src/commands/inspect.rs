//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::{GeometryCheck, InspectSourceOutput};
use anyhow::{Context, Result};
use plzmap_core::config::{LayeredConfig, PipelineConfig, Source};
use plzmap_core::helpers::{count_freqs, duplicate_row_count, dynamic_column_order, has_duplicates, intersect};
use plzmap_core::table::RawTable;
use plzmap_geo::parse_wkt;
use serde::Serialize;
use tabled::Tabled;

pub fn execute(args: InspectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let pipeline_config = config.resolve().context("Invalid configuration")?;
    let source: Source = args.source.into();
    let path = pipeline_config.source_path(source);

    let table = RawTable::read(&path, &pipeline_config.table_format(source))
        .with_context(|| format!("Failed to read {}", source.as_str()))?;

    let report = inspect_table(&table, source, &pipeline_config, path.display().to_string());

    if output.is_json() {
        output.result(report)?;
        return Ok(());
    }

    output.section(format!("Source: {}", report.source));
    output.kv("Path", &report.path);
    output.kv("Rows", report.row_count);
    if report.duplicate_rows > 0 {
        output.kv("Exact duplicate rows", report.duplicate_rows);
    }

    #[derive(Tabled, Serialize)]
    struct ColumnRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Column")]
        name: String,
        #[tabled(rename = "Used")]
        used: String,
    }

    output.section("Columns");
    let rows: Vec<ColumnRow> = report
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnRow {
            position: i + 1,
            name: name.clone(),
            used: (if report.expected_columns.contains(name) { "yes" } else { "" }).to_string(),
        })
        .collect();
    output.table(rows);

    if let Some(check) = &report.geometries {
        output.section("Geometries");
        output.kv("Column", &check.column);
        output.kv("Empty cells", check.empty);
        output.kv("Invalid WKT", check.invalid);
        for (kind, count) in &check.types {
            output.kv(kind, count);
        }
        if check.repeated_keys {
            output.warning("Postal codes repeat in this file; joins will yield one row per geometry");
        }
    }

    if report.missing_columns.is_empty() {
        output.success("All configured columns are present");
    } else {
        output.warning(format!("Missing configured columns: {}", report.missing_columns.join(", ")));
    }

    Ok(())
}

/// Column names the pipeline reads from a source
fn expected_columns(config: &PipelineConfig, source: Source) -> Vec<String> {
    match source {
        Source::PostalGeometries => vec![
            config.geometry.key_column.clone(),
            config.geometry.geometry_column.clone(),
        ],
        Source::DistrictGeometries => vec![config.geometry.geometry_column.clone()],
        Source::ChargingStations => {
            let c = &config.charging.columns;
            vec![
                c.postal_code.clone(),
                c.state.clone(),
                c.latitude.clone(),
                c.longitude.clone(),
                c.power.clone(),
            ]
        }
        Source::Residents => {
            let c = &config.residents.columns;
            vec![c.postal_code.clone(), c.residents.clone(), c.latitude.clone(), c.longitude.clone()]
        }
    }
}

fn inspect_table(table: &RawTable, source: Source, config: &PipelineConfig, path: String) -> InspectSourceOutput {
    let expected = expected_columns(config, source);
    let present = intersect(&expected, table.columns());
    let missing_columns: Vec<String> = expected.iter().filter(|c| !present.contains(c)).cloned().collect();

    // Used columns first, the rest in file order
    let fixed: Vec<&str> = present.iter().map(String::as_str).collect();
    let columns = dynamic_column_order(table.columns(), &fixed, &[]);

    let geometries = match source {
        Source::PostalGeometries | Source::DistrictGeometries => {
            geometry_check(table, &config.geometry.geometry_column, &config.geometry.key_column)
        }
        _ => None,
    };

    InspectSourceOutput {
        source: source.as_str().to_string(),
        path,
        row_count: table.len(),
        duplicate_rows: duplicate_row_count(table),
        columns,
        expected_columns: expected,
        missing_columns,
        geometries,
    }
}

fn geometry_check(table: &RawTable, geometry_column: &str, key_column: &str) -> Option<GeometryCheck> {
    let geometry_idx = table.column_index(geometry_column).ok()?;

    let mut empty = 0;
    let mut invalid = 0;
    let mut kinds = Vec::new();
    for row in table.rows() {
        let wkt = row[geometry_idx].trim();
        if wkt.is_empty() {
            empty += 1;
            continue;
        }
        match parse_wkt(wkt) {
            Ok(geometry) => kinds.push(format!("{:?}", geometry.geometry_type())),
            Err(_) => invalid += 1,
        }
    }

    let repeated_keys = table
        .column_index(key_column)
        .map(|key_idx| {
            has_duplicates(
                table
                    .rows()
                    .iter()
                    .map(|row| row[key_idx].trim())
                    .filter(|key| !key.is_empty()),
            )
        })
        .unwrap_or(false);

    Some(GeometryCheck {
        column: geometry_column.to_string(),
        empty,
        invalid,
        types: count_freqs(kinds),
        repeated_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charging_columns_report() {
        let table = RawTable::new(
            "Ladesaeulenregister_SEP.csv",
            vec!["Betreiber".into(), "Breitengrad".into(), "Postleitzahl".into(), "Bundesland".into()],
            vec![vec!["a".into(), "52,5".into(), "10117".into(), "Berlin".into()]; 3],
        );
        let report = inspect_table(&table, Source::ChargingStations, &PipelineConfig::default(), "x".into());

        assert_eq!(report.columns, vec!["Postleitzahl", "Bundesland", "Breitengrad", "Betreiber"]);
        assert_eq!(
            report.missing_columns,
            vec!["Längengrad", "Nennleistung Ladeeinrichtung [kW]"]
        );
        assert_eq!(report.duplicate_rows, 2);
        assert!(report.geometries.is_none());
    }

    #[test]
    fn test_geometry_check_counts_bad_cells() {
        let table = RawTable::new(
            "geodata_berlin_plz.csv",
            vec!["PLZ".into(), "geometry".into()],
            vec![
                vec!["10117".into(), "POINT (13.39 52.52)".into()],
                vec!["10117".into(), "POLYGON ((13.3 52.5".into()],
                vec!["10119".into(), "".into()],
            ],
        );
        let report = inspect_table(&table, Source::PostalGeometries, &PipelineConfig::default(), "x".into());

        let check = report.geometries.unwrap();
        assert_eq!((check.empty, check.invalid), (1, 1));
        assert_eq!(check.types.get("Point"), Some(&1));
        assert!(check.repeated_keys);
        assert!(report.missing_columns.is_empty());
    }
}
