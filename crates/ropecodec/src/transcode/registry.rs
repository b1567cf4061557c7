//! Table of known transcoders and the search for conversion paths.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{LazyLock, PoisonError, RwLock};

use log::{debug, trace};

use super::transcoder::Transcoder;
use super::transcoders::BUILTIN;

type Table = BTreeMap<String, BTreeMap<String, &'static Transcoder>>;

static TABLE: LazyLock<RwLock<Table>> = LazyLock::new(|| {
    let mut table = Table::new();
    for transcoder in BUILTIN {
        insert(&mut table, transcoder);
    }
    RwLock::new(table)
});

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn insert(table: &mut Table, transcoder: &'static Transcoder) {
    table
        .entry(key(transcoder.source))
        .or_default()
        .insert(key(transcoder.destination), transcoder);
}

/// Adds `transcoder` to the table, replacing any step with the same source
/// and destination names.
pub fn register_transcoder(transcoder: &'static Transcoder) {
    debug!(
        "registering transcoder {:?} -> {:?}",
        transcoder.source, transcoder.destination
    );
    insert(
        &mut TABLE.write().unwrap_or_else(PoisonError::into_inner),
        transcoder,
    );
}

/// The direct step from `source` to `destination`, compared
/// case-insensitively. Decorators live under the empty source name.
#[must_use]
pub fn lookup(source: &str, destination: &str) -> Option<&'static Transcoder> {
    TABLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key(source))?
        .get(&key(destination))
        .copied()
}

/// Destinations reachable from `source` in one step, in table order.
#[must_use]
pub fn direct_destinations(source: &str) -> Vec<&'static str> {
    TABLE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key(source))
        .map(|row| row.values().map(|transcoder| transcoder.destination).collect())
        .unwrap_or_default()
}

/// Shortest chain of steps from `source` to `destination`.
///
/// Breadth-first over the table, expanding neighbours in lexicographic order
/// of their upper-cased names so ties resolve the same way every time.
/// Returns `None` when the names are equal or no chain exists.
#[must_use]
pub fn search_path(source: &str, destination: &str) -> Option<Vec<&'static Transcoder>> {
    let source = key(source);
    let destination = key(destination);
    if source == destination {
        return None;
    }

    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    let mut reached_by: HashMap<&str, &'static Transcoder> = HashMap::new();
    let mut queue = VecDeque::from([source.as_str()]);

    while let Some(current) = queue.pop_front() {
        let Some(row) = table.get(current) else {
            continue;
        };
        for (next, transcoder) in row {
            if next.as_str() == source || reached_by.contains_key(next.as_str()) {
                continue;
            }
            reached_by.insert(next, *transcoder);
            if *next == destination {
                let mut path = vec![*transcoder];
                let mut at = key(transcoder.source);
                while at != source {
                    let step = reached_by[at.as_str()];
                    path.push(step);
                    at = key(step.source);
                }
                path.reverse();
                trace!("conversion path {source} -> {destination}: {} steps", path.len());
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}
