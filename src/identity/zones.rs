//! Zone and region index tables
//!
//! Cluster IDs are zone indices, so index assignment is part of the ID
//! format: it must come out identical on every node, across restarts and
//! redeploys, for as long as the catalogue below only grows. Indices are
//! assigned deterministically from the catalogue content alone, with the
//! pinned zones guaranteed to take the first ones. Adding a region or zone
//! to the catalogue appends new indices; it never renumbers existing ones.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// The top zone for each pinned region. These take the first indices to
/// keep a global presence viable even when only 3 bits encode the cluster
/// ID.
const PINNED_ZONES: &[(&str, &[char])] = &[
    ("africa-south1", &['a']),        // Johannesburg
    ("asia-east1", &['a']),           // Taiwan
    ("australia-southeast2", &['a']), // Melbourne
    ("us-west1", &['a']),             // Oregon
    ("us-central1", &['c']),          // Iowa
    ("europe-west2", &['a']),         // London
    ("europe-north1", &['a']),        // Finland
    ("southamerica-east1", &['a']),   // São Paulo
];

// TODO: Create a script that generates this table
// The script should use `gcloud compute zones list` underneath

/// Baked-in regions -> zone letters.
const REGION_CATALOG: &[(&str, &[char])] = &[
    // Africa
    ("africa-south1", &['a', 'b', 'c']),
    // Asia
    ("asia-east1", &['a', 'b', 'c']),
    ("asia-east2", &['a', 'b', 'c']),
    ("asia-northeast1", &['a', 'b', 'c']),
    ("asia-northeast2", &['a', 'b', 'c']),
    ("asia-northeast3", &['a', 'b', 'c']),
    ("asia-south1", &['a', 'b', 'c']),
    ("asia-south2", &['a', 'b', 'c']),
    ("asia-southeast1", &['a', 'b', 'c']),
    ("asia-southeast2", &['a', 'b', 'c']),
    ("asia-southeast3", &['a', 'b', 'c']), // Jakarta
    ("asia-southeast5", &['a', 'b']),      // Malaysia
    // Australia
    ("australia-southeast1", &['a', 'b', 'c']), // Sydney
    ("australia-southeast2", &['a', 'b', 'c']), // Melbourne
    // Europe
    ("europe-central2", &['a', 'b', 'c']),   // Warsaw
    ("europe-north1", &['a', 'b', 'c']),     // Finland
    ("europe-southwest1", &['a', 'b', 'c']), // Madrid
    ("europe-west1", &['b', 'c', 'd']),      // Belgium
    ("europe-west2", &['a', 'b', 'c']),      // London
    ("europe-west3", &['a', 'b', 'c']),      // Frankfurt
    ("europe-west4", &['a', 'b', 'c']),      // Netherlands
    ("europe-west6", &['a', 'b', 'c']),      // Zurich
    ("europe-west8", &['a', 'b']),           // Milan
    ("europe-west9", &['a', 'b', 'c']),      // Paris
    ("europe-west10", &['a', 'b', 'c']),     // Berlin (newer)
    ("europe-west12", &['a', 'b', 'c']),     // Turin
    // Middle East
    ("me-central1", &['a', 'b', 'c']), // Doha
    ("me-central2", &['a', 'b', 'c']), // Dammam
    ("me-west1", &['a', 'b', 'c']),    // Tel Aviv
    // North America
    ("northamerica-northeast1", &['a', 'b', 'c']), // Montreal
    ("northamerica-northeast2", &['a', 'b', 'c']), // Toronto
    // South America
    ("southamerica-east1", &['a', 'b', 'c']), // São Paulo
    ("southamerica-west1", &['a', 'b', 'c']), // Santiago
    // United States
    ("us-central1", &['a', 'b', 'c', 'f']), // Iowa
    ("us-east1", &['b', 'c', 'd']),         // South Carolina
    ("us-east4", &['a', 'b', 'c']),         // N. Virginia
    ("us-east5", &['a', 'b', 'c']),         // Columbus
    ("us-south1", &['a', 'b', 'c']),        // Dallas
    ("us-west1", &['a', 'b', 'c']),         // Oregon
    ("us-west2", &['a', 'b', 'c']),         // Los Angeles
    ("us-west3", &['a', 'b', 'c']),         // Salt Lake City
    ("us-west4", &['a', 'b', 'c']),         // Las Vegas
];

static BUILTIN: Lazy<ZoneTable> = Lazy::new(|| ZoneTable::new(REGION_CATALOG, PINNED_ZONES));

/// Immutable region -> index and zone -> index mapping, built once from a
/// catalogue and a pinned-zone list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTable {
    regions: HashMap<String, u16>,
    zones: HashMap<String, u16>,
}

impl ZoneTable {
    /// Build a table from catalogue data. Rebuilding from the same data
    /// always yields the same mapping.
    ///
    /// Region indices: pinned regions first (alphabetical), then the rest
    /// (alphabetical). Zone indices in two passes: first the explicitly
    /// pinned letters of pinned regions, then every catalogued letter of
    /// every region, each pass alphabetical and skipping zones already
    /// assigned or absent from the catalogue.
    pub fn new(catalog: &[(&str, &[char])], pinned: &[(&str, &[char])]) -> Self {
        let catalog_map: HashMap<&str, &[char]> =
            catalog.iter().map(|&(region, letters)| (region, letters)).collect();
        let pinned_map: HashMap<&str, &[char]> =
            pinned.iter().map(|&(region, letters)| (region, letters)).collect();

        let mut all_regions: Vec<&str> = catalog_map.keys().copied().collect();
        all_regions.sort_unstable();

        // Pinned regions that exist in the catalogue, sorted
        let mut top_regions: Vec<&str> = pinned_map
            .keys()
            .copied()
            .filter(|region| catalog_map.contains_key(region))
            .collect();
        top_regions.sort_unstable();
        let top_set: HashSet<&str> = top_regions.iter().copied().collect();

        // Regions: pinned first, then the rest
        let mut regions = HashMap::new();
        let mut region_idx: u16 = 0;
        for &region in &top_regions {
            regions.insert(region.to_string(), region_idx);
            region_idx += 1;
        }
        for &region in &all_regions {
            if top_set.contains(region) {
                continue;
            }
            regions.insert(region.to_string(), region_idx);
            region_idx += 1;
        }

        // Zones: pinned letters first (only if catalogued), then every
        // catalogued letter, region asc, letter asc.
        let mut zones = HashMap::new();
        let mut zone_idx: u16 = 0;
        for &region in &top_regions {
            let mut letters = pinned_map[region].to_vec();
            letters.sort_unstable();
            for letter in letters {
                if !catalog_map[region].contains(&letter) {
                    continue;
                }
                let zone = format!("{region}-{letter}");
                if zones.contains_key(&zone) {
                    continue;
                }
                zones.insert(zone, zone_idx);
                zone_idx += 1;
            }
        }
        for &region in &all_regions {
            let mut letters = catalog_map[region].to_vec();
            letters.sort_unstable();
            for letter in letters {
                let zone = format!("{region}-{letter}");
                if zones.contains_key(&zone) {
                    continue;
                }
                zones.insert(zone, zone_idx);
                zone_idx += 1;
            }
        }

        Self { regions, zones }
    }

    /// The process-wide table built from the baked-in GCP catalogue.
    pub fn builtin() -> &'static ZoneTable {
        &BUILTIN
    }

    /// Index for a region, if catalogued
    pub fn region_index(&self, region: &str) -> Option<u16> {
        self.regions.get(region).copied()
    }

    /// Index for a zone, if catalogued
    pub fn zone_index(&self, zone: &str) -> Option<u16> {
        self.zones.get(zone).copied()
    }
}
