//! Dashboard use case: record counts and recent activity

use crate::domain::{CollectionKey, Record, SortOrder};
use crate::infrastructure::{Medium, RecordStore, Stats};

/// Entries shown in the recent activity feed
pub const RECENT_LIMIT: usize = 5;

/// Newest records taken from each collection before merging
const PER_COLLECTION: usize = 3;

/// Collections whose creations appear in the feed
const FEED_COLLECTIONS: [CollectionKey; 2] =
    [CollectionKey::Partners, CollectionKey::ExpenseItems];

/// A record creation shown in the feed
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub collection: CollectionKey,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: Stats,
    pub recent: Vec<Activity>,
}

/// The most recent partner and expense item creations, newest first
pub fn recent_activity<M: Medium>(store: &RecordStore<M>, limit: usize) -> Vec<Activity> {
    let mut activities: Vec<Activity> = FEED_COLLECTIONS
        .iter()
        .flat_map(|&collection| {
            store
                .sort_records(collection, "created_at", SortOrder::Desc)
                .into_iter()
                .take(PER_COLLECTION)
                .map(move |record| Activity { collection, record })
        })
        .collect();

    activities.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    activities.truncate(limit);
    activities
}

pub fn dashboard<M: Medium>(store: &RecordStore<M>) -> Dashboard {
    Dashboard {
        stats: store.stats(),
        recent: recent_activity(store, RECENT_LIMIT),
    }
}
