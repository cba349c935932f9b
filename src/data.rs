use crate::config::AppConfig;
use crate::types::{
    Collection, CountyWageRecord, DatasetMeta, FeatureInfo, Fips, WageDataset, WageLevel,
    WageScale,
};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::GeoJson;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// Fixed FLAG export columns.
const COL_SOC: &str = "soc_code";
const COL_TITLE: &str = "soc_title";
const COL_FIPS: &str = "fips";
const COL_COUNTY: &str = "county";
const COL_STATE: &str = "state";
const COL_LEVELS: [&str; 4] = [
    "level1_hourly",
    "level2_hourly",
    "level3_hourly",
    "level4_hourly",
];
const COL_AVERAGE: &str = "average_hourly";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocItem {
    pub soc: String,
    pub title: String,
}

struct SocEntry {
    title: String,
    counties: Vec<(Fips, CountyWageRecord)>,
}

/// All loaded wage rows, grouped by collection and SOC code. Datasets are
/// materialized per (collection, soc, level) on first request and cached so
/// repeated requests share one snapshot (and one version number).
pub struct WageStore {
    collections: HashMap<Collection, HashMap<String, SocEntry>>,
    index: Vec<SocItem>,
    wage_year: String,
    source: String,
    cache: Mutex<HashMap<(Collection, String, WageLevel), Arc<WageDataset>>>,
    next_version: AtomicU64,
}

pub fn load_store(config: &AppConfig) -> Result<WageStore> {
    println!("Loading wage data...");
    let hours = config.wage.hours_per_year;

    // The two FLAG exports are independent files.
    let (all, education) = rayon::join(
        || load_wage_csv(&config.input.all_industries_csv, hours),
        || load_wage_csv(&config.input.education_csv, hours),
    );
    let all = all?;
    let education = education?;

    let mut index: Vec<SocItem> = all
        .iter()
        .chain(education.iter())
        .map(|(soc, entry)| SocItem {
            soc: soc.clone(),
            title: entry.title.clone(),
        })
        .collect();
    index.sort_by(|a, b| a.soc.cmp(&b.soc));
    index.dedup_by(|a, b| a.soc == b.soc);

    println!(
        "Loaded wages for {} occupations ({} all-industries, {} education)",
        index.len(),
        all.len(),
        education.len()
    );

    let mut collections = HashMap::new();
    collections.insert(Collection::All, all);
    collections.insert(Collection::Education, education);

    Ok(WageStore {
        collections,
        index,
        wage_year: config.wage.wage_year.clone(),
        source: config.wage.source.clone(),
        cache: Mutex::new(HashMap::new()),
        next_version: AtomicU64::new(0),
    })
}

impl WageStore {
    #[cfg(test)]
    pub(crate) fn empty() -> WageStore {
        WageStore {
            collections: HashMap::new(),
            index: Vec::new(),
            wage_year: String::new(),
            source: String::new(),
            cache: Mutex::new(HashMap::new()),
            next_version: AtomicU64::new(0),
        }
    }

    pub fn soc_index(&self) -> &[SocItem] {
        &self.index
    }

    /// Materialize the dataset for one occupation. The scale is computed
    /// over the requested level's field, so a level switch gets fresh
    /// bounds. None when the collection has no rows for this SOC.
    pub fn dataset(
        &self,
        collection: Collection,
        soc: &str,
        level: WageLevel,
    ) -> Option<Arc<WageDataset>> {
        let key = (collection, soc.to_string(), level);
        let mut cache = self.cache.lock().unwrap();
        if let Some(dataset) = cache.get(&key) {
            return Some(Arc::clone(dataset));
        }

        let entry = self.collections.get(&collection)?.get(soc)?;
        let data: BTreeMap<Fips, CountyWageRecord> = entry.counties.iter().cloned().collect();
        let scale = compute_scale(&data, level);
        let version = self.next_version.fetch_add(1, Ordering::Relaxed) + 1;

        let dataset = Arc::new(WageDataset {
            data,
            scale,
            meta: DatasetMeta {
                soc: soc.to_string(),
                soc_title: entry.title.clone(),
                wage_year: self.wage_year.clone(),
                source: self.source.clone(),
            },
            version,
        });
        cache.insert(key, Arc::clone(&dataset));
        Some(dataset)
    }
}

fn compute_scale(data: &BTreeMap<Fips, CountyWageRecord>, level: WageLevel) -> WageScale {
    let mut min = u32::MAX;
    let mut max = 0u32;
    for record in data.values() {
        if !record.has_data() {
            continue;
        }
        let value = level.value_in(record);
        if value == 0 {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }
    if max == 0 {
        WageScale::default()
    } else {
        WageScale { min, max }
    }
}

fn load_wage_csv(path: &Path, hours_per_year: f64) -> Result<HashMap<String, SocEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open wage CSV: {:?}", path))?;
    parse_wage_csv(file, hours_per_year)
}

fn parse_wage_csv<R: Read>(reader: R, hours_per_year: f64) -> Result<HashMap<String, SocEntry>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let col_indices: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_string(), i))
        .collect();

    let idx = |name: &str| -> Result<usize> {
        col_indices
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Column '{}' not found in wage CSV", name))
    };

    let soc_idx = idx(COL_SOC)?;
    let title_idx = idx(COL_TITLE)?;
    let fips_idx = idx(COL_FIPS)?;
    let county_idx = idx(COL_COUNTY)?;
    let state_idx = idx(COL_STATE)?;
    let level_idx = [
        idx(COL_LEVELS[0])?,
        idx(COL_LEVELS[1])?,
        idx(COL_LEVELS[2])?,
        idx(COL_LEVELS[3])?,
    ];
    let average_idx = idx(COL_AVERAGE)?;

    let mut entries: HashMap<String, SocEntry> = HashMap::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let record = result?;
        let soc = record.get(soc_idx).unwrap_or("").trim().to_string();
        let fips = normalize_fips(record.get(fips_idx).unwrap_or(""));
        if soc.is_empty() || fips.is_empty() {
            continue;
        }

        let hourly = |i: usize| -> f64 {
            record.get(i).unwrap_or("0").trim().parse().unwrap_or(0.0)
        };
        let levels = [
            annualize(hourly(level_idx[0]), hours_per_year),
            annualize(hourly(level_idx[1]), hours_per_year),
            annualize(hourly(level_idx[2]), hours_per_year),
            annualize(hourly(level_idx[3]), hours_per_year),
        ];

        // A row with wages must have ascending levels; a zero level1 row is
        // the legitimate "covered but no data" case and is kept.
        if levels[0] > 0
            && !(levels[0] <= levels[1] && levels[1] <= levels[2] && levels[2] <= levels[3])
        {
            dropped += 1;
            continue;
        }

        let county_record = CountyWageRecord {
            county: record.get(county_idx).unwrap_or("").trim().to_string(),
            state: record.get(state_idx).unwrap_or("").trim().to_string(),
            level1: levels[0],
            level2: levels[1],
            level3: levels[2],
            level4: levels[3],
            average: annualize(hourly(average_idx), hours_per_year),
        };

        entries
            .entry(soc)
            .or_insert_with(|| SocEntry {
                title: record.get(title_idx).unwrap_or("").trim().to_string(),
                counties: Vec::new(),
            })
            .counties
            .push((fips, county_record));
    }

    if dropped > 0 {
        println!("Dropped {} rows with out-of-order wage levels", dropped);
    }

    Ok(entries)
}

/// Annual wage from an hourly rate, nearest dollar. Garbage in (negative,
/// NaN) comes out as the no-data zero.
fn annualize(hourly: f64, hours_per_year: f64) -> u32 {
    let annual = hourly * hours_per_year;
    if annual.is_finite() && annual > 0.0 {
        annual.round() as u32
    } else {
        0
    }
}

/// CSV tooling loves stripping leading zeros from FIPS codes.
fn normalize_fips(raw: &str) -> Fips {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{:0>5}", trimmed)
}

/// One county polygon from the geometry source, with the properties the
/// engine needs for selection fallback and point lookup.
pub struct CountyFeature {
    pub info: FeatureInfo,
    pub geometry: MultiPolygon<f64>,
}

pub fn load_counties(path: &Path) -> Result<Vec<CountyFeature>> {
    println!("Loading county geometry from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open counties GeoJSON: {:?}", path))?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader).context("Failed to parse counties GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Counties GeoJSON must be a FeatureCollection")),
    };

    let mut counties = Vec::new();

    for feature in collection.features {
        let props = match &feature.properties {
            Some(props) => props,
            None => continue,
        };
        let state = match prop_string(props.get("STATE")) {
            Some(s) => s,
            None => continue,
        };
        let county_code = match prop_string(props.get("COUNTY")) {
            Some(s) => s,
            None => continue,
        };
        let name = prop_string(props.get("NAME")).unwrap_or_default();
        let fips = format!("{:0>2}{:0>3}", state, county_code);

        let geometry = match feature.geometry {
            Some(geometry) => {
                let converted: geo::Geometry<f64> = geometry
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert county geometry: {:?}", e))?;
                match converted {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // skip points/lines
                }
            }
            None => continue,
        };

        counties.push(CountyFeature {
            info: FeatureInfo { fips, name, state },
            geometry,
        });
    }

    println!("Loaded {} county features", counties.len());
    Ok(counties)
}

fn prop_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
