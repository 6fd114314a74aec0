//! Aggregates derived from a snapshot of the library. Every function here is
//! pure: it takes records by reference and never touches the store.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::models::BookRecord;

/// Headline numbers for the statistics tab.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total: usize,
    pub read_count: usize,
    pub unread_count: usize,
    /// `0.0..=100.0`, unrounded.
    pub percent_read: f64,
}

/// One step of the cumulative collection size over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPoint {
    pub added_at: NaiveDateTime,
    pub cumulative: usize,
}

pub fn summary<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let (total, read_count) = records
        .into_iter()
        .fold((0usize, 0usize), |(total, read), record| {
            (total + 1, read + usize::from(record.read))
        });

    let percent_read = if total == 0 {
        0.0
    } else {
        100.0 * read_count as f64 / total as f64
    };

    Summary {
        total,
        read_count,
        unread_count: total - read_count,
        percent_read,
    }
}

/// Count books per genre. Genres are compared exactly, so `SciFi` and `scifi`
/// are separate buckets.
pub fn genre_distribution<'a, I>(records: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut genres = BTreeMap::new();
    for record in records {
        *genres.entry(record.genre.clone()).or_insert(0) += 1;
    }
    genres
}

/// Genre counts ordered for charts: largest bucket first, ties by name.
pub fn genres_by_count<'a, I>(records: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut genres: Vec<_> = genre_distribution(records).into_iter().collect();
    genres.sort_by(|(a_name, a_count), (b_name, b_count)| {
        b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
    });
    genres
}

/// Running total of books ordered by when they were added. The sort is stable,
/// so books sharing a timestamp keep their insertion order.
pub fn growth_series<'a, I>(records: I) -> Vec<GrowthPoint>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut timestamps: Vec<NaiveDateTime> =
        records.into_iter().map(|record| record.added_at).collect();
    timestamps.sort();

    timestamps
        .into_iter()
        .enumerate()
        .map(|(idx, added_at)| GrowthPoint {
            added_at,
            cumulative: idx + 1,
        })
        .collect()
}
