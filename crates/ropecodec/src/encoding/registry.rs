//! Process-wide encoding table.
//!
//! The table is built from the built-in encodings on first use and is
//! read-mostly afterwards. Names and aliases are matched case-insensitively.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use log::debug;

use super::{BUILTIN, BUILTIN_ALIASES, CharScheme, Encoding, EncodingEntry};
use crate::error::EncodingError;

struct EncodingTable {
    by_index: Vec<Encoding>,
    by_name: HashMap<String, usize>,
    default_external: Encoding,
    default_internal: Option<Encoding>,
}

impl EncodingTable {
    fn builtin() -> Self {
        let mut by_name = HashMap::new();
        for encoding in BUILTIN {
            by_name.insert(encoding.name().to_ascii_uppercase(), encoding.index());
        }
        for (alias, index) in BUILTIN_ALIASES {
            by_name.insert(alias.to_ascii_uppercase(), *index);
        }
        Self {
            by_index: BUILTIN.to_vec(),
            by_name,
            default_external: Encoding::UTF_8,
            default_internal: None,
        }
    }

    fn lookup(&self, name: &str) -> Option<Encoding> {
        let index = *self.by_name.get(&name.to_ascii_uppercase())?;
        self.by_index.get(index).copied()
    }

    fn define(
        &mut self,
        name: &str,
        scheme: CharScheme,
        dummy: bool,
    ) -> Result<Encoding, EncodingError> {
        let key = name.to_ascii_uppercase();
        if self.by_name.contains_key(&key) {
            return Err(EncodingError::DuplicateName(name.to_owned()));
        }
        let index = self.by_index.len();
        let entry: &'static EncodingEntry = Box::leak(Box::new(EncodingEntry::new(
            Box::leak(name.to_owned().into_boxed_str()),
            index,
            scheme,
            dummy,
        )));
        let encoding = Encoding::from_entry(entry);
        self.by_index.push(encoding);
        self.by_name.insert(key, index);
        debug!("registered encoding {name} at index {index}");
        Ok(encoding)
    }
}

static TABLE: LazyLock<RwLock<EncodingTable>> =
    LazyLock::new(|| RwLock::new(EncodingTable::builtin()));

fn read<R>(f: impl FnOnce(&EncodingTable) -> R) -> R {
    f(&TABLE.read().unwrap_or_else(PoisonError::into_inner))
}

fn write<R>(f: impl FnOnce(&mut EncodingTable) -> R) -> R {
    f(&mut TABLE.write().unwrap_or_else(PoisonError::into_inner))
}

/// Finds an encoding by name or alias.
#[must_use]
pub fn lookup_by_name(name: &str) -> Option<Encoding> {
    read(|table| table.lookup(name))
}

/// Like [`lookup_by_name`], reporting the unknown name as an error.
pub fn find(name: &str) -> Result<Encoding, EncodingError> {
    lookup_by_name(name).ok_or_else(|| EncodingError::UnknownEncoding(name.to_owned()))
}

pub fn lookup_by_index(index: usize) -> Result<Encoding, EncodingError> {
    read(|table| table.by_index.get(index).copied()).ok_or(EncodingError::UnknownIndex(index))
}

/// Registers a new encoding under `name`.
///
/// The name must not collide with an existing name or alias.
pub fn register_encoding(
    name: &str,
    scheme: CharScheme,
    dummy: bool,
) -> Result<Encoding, EncodingError> {
    write(|table| table.define(name, scheme, dummy))
}

/// Registers a new encoding that reads bytes exactly like `base`.
pub fn replicate_encoding(base: Encoding, name: &str) -> Result<Encoding, EncodingError> {
    register_encoding(name, base.scheme(), base.is_dummy())
}

/// Makes `alias` resolve to the encoding at `index`.
pub fn register_alias(alias: &str, index: usize) -> Result<(), EncodingError> {
    write(|table| {
        if index >= table.by_index.len() {
            return Err(EncodingError::UnknownIndex(index));
        }
        let key = alias.to_ascii_uppercase();
        if table.by_name.contains_key(&key) {
            return Err(EncodingError::DuplicateName(alias.to_owned()));
        }
        table.by_name.insert(key, index);
        Ok(())
    })
}

/// Every registered encoding, in index order.
#[must_use]
pub fn encodings() -> Vec<Encoding> {
    read(|table| table.by_index.clone())
}

#[must_use]
pub fn encoding_list_size() -> usize {
    read(|table| table.by_index.len())
}

#[must_use]
pub fn default_external() -> Encoding {
    read(|table| table.default_external)
}

pub fn set_default_external(encoding: Encoding) {
    write(|table| table.default_external = encoding);
}

#[must_use]
pub fn default_internal() -> Option<Encoding> {
    read(|table| table.default_internal)
}

pub fn set_default_internal(encoding: Option<Encoding>) {
    write(|table| table.default_internal = encoding);
}
