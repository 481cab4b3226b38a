use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::database::models::{Whiskey, WhiskeyType};

const TOP_DISTILLERY_LIMIT: usize = 5;

/// Summary figures over one collector's bottles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_records: usize,
    /// Sum of quantities; a record without a quantity counts as one bottle
    pub total_bottles: i64,
    pub opened_bottles: usize,
    pub by_type: BTreeMap<WhiskeyType, usize>,
    /// Mean over rated records only
    pub average_rating: Option<f64>,
    pub total_msrp: f64,
    pub total_secondary_value: f64,
    pub total_paid: f64,
    pub total_market_value: f64,
    pub top_distilleries: Vec<DistilleryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistilleryCount {
    pub distillery: String,
    pub count: usize,
}

impl CollectionStats {
    pub fn from_records(records: &[Whiskey]) -> Self {
        let mut stats = CollectionStats {
            total_records: records.len(),
            total_bottles: 0,
            opened_bottles: 0,
            by_type: BTreeMap::new(),
            average_rating: None,
            total_msrp: 0.0,
            total_secondary_value: 0.0,
            total_paid: 0.0,
            total_market_value: 0.0,
            top_distilleries: Vec::new(),
        };

        let mut rating_sum = 0.0;
        let mut rated = 0usize;
        let mut distilleries: HashMap<&str, usize> = HashMap::new();

        for whiskey in records {
            let fields = &whiskey.fields;
            let bottles = fields.quantity.map(|q| i64::from(q.max(0))).unwrap_or(1);
            let weight = bottles as f64;

            stats.total_bottles += bottles;
            if fields.is_opened {
                stats.opened_bottles += 1;
            }
            *stats.by_type.entry(fields.whiskey_type).or_default() += 1;

            if let Some(rating) = fields.rating {
                rating_sum += rating;
                rated += 1;
            }

            stats.total_msrp += fields.msrp.unwrap_or(0.0) * weight;
            stats.total_secondary_value += fields.secondary_price.unwrap_or(0.0) * weight;
            stats.total_paid += fields.purchase_price.unwrap_or(0.0) * weight;
            stats.total_market_value += fields.current_market_value.unwrap_or(0.0) * weight;

            *distilleries.entry(fields.distillery.as_str()).or_default() += 1;
        }

        if rated > 0 {
            stats.average_rating = Some(rating_sum / rated as f64);
        }

        let mut ranked: Vec<DistilleryCount> = distilleries
            .into_iter()
            .map(|(distillery, count)| DistilleryCount {
                distillery: distillery.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.distillery.cmp(&b.distillery)));
        ranked.truncate(TOP_DISTILLERY_LIMIT);
        stats.top_distilleries = ranked;

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryWhiskeyStore;
    use crate::database::repository::{WhiskeyFilters, WhiskeyStore};
    use crate::testing::{sample_data, ALICE};

    #[test]
    fn empty_collection() {
        let stats = CollectionStats::from_records(&[]);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_bottles, 0);
        assert_eq!(stats.average_rating, None);
        assert!(stats.top_distilleries.is_empty());
    }

    #[tokio::test]
    async fn weights_values_by_quantity() {
        let store = MemoryWhiskeyStore::new();

        let mut weller = sample_data("Weller 12", "bourbon");
        weller.quantity = Some(3);
        weller.msrp = Some(40.0);
        weller.rating = Some(8.0);
        weller.is_opened = Some(true);
        store.create(ALICE, weller).await.unwrap();

        let mut talisker = sample_data("Talisker 10", "scotch");
        talisker.distillery = Some("Talisker".to_string());
        talisker.msrp = Some(70.0);
        talisker.rating = Some(9.0);
        store.create(ALICE, talisker).await.unwrap();

        let records = store.find_all(&WhiskeyFilters::owner(ALICE)).await.unwrap();
        let stats = CollectionStats::from_records(&records);

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.total_bottles, 4);
        assert_eq!(stats.opened_bottles, 1);
        assert_eq!(stats.total_msrp, 190.0);
        assert_eq!(stats.average_rating, Some(8.5));
        assert_eq!(stats.by_type.get(&WhiskeyType::Bourbon), Some(&1));
        assert_eq!(stats.by_type.get(&WhiskeyType::Scotch), Some(&1));
    }

    #[tokio::test]
    async fn ranks_distilleries_by_count_then_name() {
        let store = MemoryWhiskeyStore::new();
        for (name, distillery) in [
            ("Blanton's", "Buffalo Trace"),
            ("Stagg Jr", "Buffalo Trace"),
            ("Booker's", "Jim Beam"),
            ("Baker's", "Heaven Hill"),
        ] {
            let mut data = sample_data(name, "bourbon");
            data.distillery = Some(distillery.to_string());
            store.create(ALICE, data).await.unwrap();
        }

        let records = store.find_all(&WhiskeyFilters::owner(ALICE)).await.unwrap();
        let stats = CollectionStats::from_records(&records);

        let names: Vec<&str> = stats
            .top_distilleries
            .iter()
            .map(|d| d.distillery.as_str())
            .collect();
        assert_eq!(names, vec!["Buffalo Trace", "Heaven Hill", "Jim Beam"]);
        assert_eq!(stats.top_distilleries[0].count, 2);
    }
}
