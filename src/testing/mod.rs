//! Fixtures shared by the unit tests.

use crate::database::memory::MemoryWhiskeyStore;
use crate::database::models::{OwnerId, Whiskey, WhiskeyData};
use crate::database::repository::WhiskeyStore;

pub const ALICE: OwnerId = 1;
pub const BOB: OwnerId = 2;

/// Minimal valid input: name, type and a fixed distillery
pub fn sample_data(name: &str, whiskey_type: &str) -> WhiskeyData {
    WhiskeyData {
        name: Some(name.to_string()),
        whiskey_type: Some(whiskey_type.to_string()),
        distillery: Some("Buffalo Trace".to_string()),
        ..Default::default()
    }
}

/// In-memory store seeded with two bottles for ALICE and one for BOB
pub async fn seeded_store() -> (MemoryWhiskeyStore, Vec<Whiskey>) {
    let store = MemoryWhiskeyStore::new();
    let mut created = Vec::new();

    let mut eagle = sample_data("Eagle Rare 10", "bourbon");
    eagle.tasting_notes = Some("Toffee, orange zest, leather".to_string());
    created.push(store.create(ALICE, eagle).await.expect("seed eagle rare"));

    let mut lagavulin = sample_data("Lagavulin 16", "scotch");
    lagavulin.distillery = Some("Lagavulin".to_string());
    lagavulin.region = Some("Islay".to_string());
    created.push(store.create(ALICE, lagavulin).await.expect("seed lagavulin"));

    let mut pappy = sample_data("Old Rip Van Winkle 10", "bourbon");
    pappy.quantity = Some(1);
    created.push(store.create(BOB, pappy).await.expect("seed pappy"));

    (store, created)
}
