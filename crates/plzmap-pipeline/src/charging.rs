//! Charging-station preprocessing

use plzmap_core::config::PipelineConfig;
use plzmap_core::error::Result;
use plzmap_core::models::{ChargingStation, GeometryLookup};
use plzmap_core::parse::DecimalFormat;
use plzmap_core::table::RawTable;

use crate::clean::{clean_rows, Cleaned, Row};
use crate::geojoin::{geo_join, Joined};

const POSTAL_CODE: usize = 0;
const STATE: usize = 1;
const LATITUDE: usize = 2;
const LONGITUDE: usize = 3;
const POWER: usize = 4;

/// Clean the charging-station register and attach postal-code geometries
///
/// Keeps rows whose state equals the configured region and whose postal
/// code lies strictly inside the configured range. Coordinates and rated
/// power are parsed only for those rows.
pub fn preprocess_charging_stations(
    raw: &RawTable,
    lookup: &GeometryLookup,
    config: &PipelineConfig,
) -> Result<Joined<ChargingStation>> {
    let charging = &config.charging;
    let columns = &charging.columns;
    let table = raw.select(&[
        columns.postal_code.as_str(),
        columns.state.as_str(),
        columns.latitude.as_str(),
        columns.longitude.as_str(),
        columns.power.as_str(),
    ])?;

    let (stations, mut stats) = clean_rows(&table, config.validity, |row| {
        let Some(postal_code) = row.postal_code(POSTAL_CODE)? else {
            return Ok(Cleaned::Filtered);
        };
        if row.text(STATE) != charging.region || !charging.postal_range.contains(postal_code) {
            return Ok(Cleaned::Filtered);
        }
        Ok(Cleaned::from_parsed(station_from_row(row, postal_code, &config.decimal)))
    })?;

    tracing::debug!(
        region = %charging.region,
        kept = stations.len(),
        filtered = stats.filtered_out,
        malformed = stats.malformed,
        "Charging stations cleaned"
    );

    let joined = geo_join(stations, lookup, config.validity)?;
    stats.merge(joined.stats);

    Ok(Joined { rows: joined.rows, stats })
}

fn station_from_row(row: Row<'_>, postal_code: u32, decimal: &DecimalFormat) -> Result<ChargingStation> {
    Ok(ChargingStation {
        postal_code,
        state: row.text(STATE).to_string(),
        latitude: row.decimal(LATITUDE, decimal)?,
        longitude: row.decimal(LONGITUDE, decimal)?,
        power_kw: row.decimal(POWER, decimal)?,
    })
}
