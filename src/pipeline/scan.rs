// src/pipeline/scan.rs

//! Discovery scan over every city × category combination.

use crate::models::{Combination, DiscoveryEntry, SeenSet};
use crate::services::Prober;

/// Counters for a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub probed: usize,
    pub live: usize,
    pub novel: usize,
}

/// Probe every combination, city-major, and collect the novel live ones.
///
/// Each novel identifier is inserted into `seen` as soon as it is found, so
/// the caller can persist the grown set afterwards and a repeated pair is
/// never reported twice in one run.
pub async fn scan(
    cities: &[String],
    categories: &[String],
    prober: &dyn Prober,
    seen: &mut SeenSet,
) -> (Vec<DiscoveryEntry>, ScanStats) {
    let mut entries = Vec::new();
    let mut stats = ScanStats::default();
    let total = cities.len() * categories.len();

    for city in cities {
        for category in categories {
            let combination = Combination::new(city.as_str(), category.as_str());
            stats.probed += 1;

            if !prober.classify(&combination).await.is_live() {
                continue;
            }
            stats.live += 1;

            if seen.insert(combination.id()) {
                let url = prober.listing_url(&combination);
                log::info!("New combination: {} ({})", combination, url);
                entries.push(DiscoveryEntry::new(&combination, url));
                stats.novel += 1;
            }
        }
        log::debug!("Scanned {} ({}/{} probes)", city, stats.probed, total);
    }

    log::info!(
        "Scan finished: {} probed, {} live, {} new",
        stats.probed,
        stats.live,
        stats.novel
    );

    (entries, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Liveness;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Prober answering from a fixed set of live identifiers.
    struct FakeProber {
        live: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProber {
        fn new(live: &[&str]) -> Self {
            Self {
                live: live.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        fn listing_url(&self, combination: &Combination) -> String {
            combination.listing_url("https://booksy.com/pl-pl")
        }

        async fn classify(&self, combination: &Combination) -> Liveness {
            self.calls.lock().unwrap().push(combination.id());
            if self.live.contains(&combination.id()) {
                Liveness::Live
            } else {
                Liveness::Absent
            }
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_live_novel_combination() {
        let prober = FakeProber::new(&["warszawa-fryzjer"]);
        let mut seen = SeenSet::new();

        let (entries, stats) =
            scan(&strings(&["warszawa"]), &strings(&["fryzjer"]), &prober, &mut seen).await;

        assert_eq!(
            entries,
            vec![DiscoveryEntry {
                city: "warszawa".into(),
                category: "fryzjer".into(),
                url: "https://booksy.com/pl-pl/fryzjer/warszawa/".into(),
            }]
        );
        assert_eq!(seen, ["warszawa-fryzjer".to_string()].into_iter().collect::<SeenSet>());
        assert_eq!(
            stats,
            ScanStats {
                probed: 1,
                live: 1,
                novel: 1
            }
        );
    }

    #[tokio::test]
    async fn test_already_seen_is_suppressed() {
        let prober = FakeProber::new(&["warszawa-fryzjer"]);
        let mut seen: SeenSet = ["warszawa-fryzjer".to_string()].into_iter().collect();
        let before = seen.clone();

        let (entries, stats) =
            scan(&strings(&["warszawa"]), &strings(&["fryzjer"]), &prober, &mut seen).await;

        assert!(entries.is_empty());
        assert_eq!(seen, before);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.novel, 0);
    }

    #[tokio::test]
    async fn test_absent_leaves_seen_untouched() {
        let prober = FakeProber::new(&[]);
        let mut seen = SeenSet::new();

        let (entries, _) =
            scan(&strings(&["warszawa"]), &strings(&["fryzjer"]), &prober, &mut seen).await;

        assert!(entries.is_empty());
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_city_major_order() {
        let prober = FakeProber::new(&["krakow-masaz", "warszawa-barber", "krakow-barber"]);
        let mut seen = SeenSet::new();

        let (entries, _) = scan(
            &strings(&["warszawa", "krakow"]),
            &strings(&["barber", "masaz"]),
            &prober,
            &mut seen,
        )
        .await;

        assert_eq!(
            prober.calls(),
            vec![
                "warszawa-barber",
                "warszawa-masaz",
                "krakow-barber",
                "krakow-masaz"
            ]
        );
        let ids: Vec<String> = entries.iter().map(DiscoveryEntry::id).collect();
        assert_eq!(ids, vec!["warszawa-barber", "krakow-barber", "krakow-masaz"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_reported_once() {
        let prober = FakeProber::new(&["lodz-fryzjer"]);
        let mut seen = SeenSet::new();

        let (entries, stats) = scan(
            &strings(&["lodz"]),
            &strings(&["fryzjer", "fryzjer"]),
            &prober,
            &mut seen,
        )
        .await;

        assert_eq!(entries.len(), 1);
        assert_eq!(stats.probed, 2);
        assert_eq!(stats.live, 2);
    }

    #[tokio::test]
    async fn test_seen_only_grows() {
        let prober = FakeProber::new(&["opole-masaz"]);
        let mut seen: SeenSet = ["gdansk-fryzjer".to_string()].into_iter().collect();
        let before = seen.clone();

        scan(
            &strings(&["opole", "gdansk"]),
            &strings(&["masaz", "fryzjer"]),
            &prober,
            &mut seen,
        )
        .await;

        assert!(seen.is_superset(&before));
        assert!(seen.contains("opole-masaz"));
    }
}
