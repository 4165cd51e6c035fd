//! RocksDB-backed local store for Stockroom.
//!
//! Items are CBOR-encoded under `item/<id as big-endian u64>`, so a prefix
//! scan yields them in ascending id order. The next local id lives under
//! `meta/next_id` and is written in the same batch as the item it was
//! allocated for.

use std::path::Path;
use std::sync::Mutex;

use rocksdb::{DB, Direction, IteratorMode, Options, WriteBatch};
use stockroom_core::{Item, ItemId, LocalStore, NewItem};
use thiserror::Error;

const ITEM_PREFIX: &[u8] = b"item/";
const NEXT_ID_KEY: &[u8] = b"meta/next_id";

#[derive(Debug, Error)]
pub enum RocksError {
    #[error("RocksDB error: {0}")]
    Db(#[from] rocksdb::Error),
    #[error("failed to encode item: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),
    #[error("corrupt item record: {0}")]
    Decode(#[from] ciborium::de::Error<std::io::Error>),
    #[error("corrupt id counter: {0:?}")]
    CorruptCounter(Vec<u8>),
}

/// A persistent item store backed by RocksDB.
pub struct RocksStore {
    db: DB,
    // Guards id allocation; RocksDB handles its own locking for everything else.
    next_id: Mutex<ItemId>,
}

impl RocksStore {
    /// Opens a RocksDB store at the given path.
    ///
    /// Creates the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RocksError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;

        let next_id = match db.get(NEXT_ID_KEY)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 1,
        };

        Ok(Self {
            db,
            next_id: Mutex::new(next_id),
        })
    }

    fn item_keys(&self) -> Result<Vec<Box<[u8]>>, RocksError> {
        let mut keys = Vec::new();
        for entry in self
            .db
            .iterator(IteratorMode::From(ITEM_PREFIX, Direction::Forward))
        {
            let (key, _) = entry?;
            if !key.starts_with(ITEM_PREFIX) {
                break;
            }
            keys.push(key);
        }
        Ok(keys)
    }

    /// Queues `item` into `batch` and advances the allocator past its id.
    fn stage(&self, batch: &mut WriteBatch, item: &Item, next_id: &mut ItemId) -> Result<(), RocksError> {
        batch.put(item_key(item.id), encode_item(item)?);
        if item.id >= *next_id {
            *next_id = item.id.saturating_add(1);
            batch.put(NEXT_ID_KEY, next_id.to_be_bytes());
        }
        Ok(())
    }
}

impl LocalStore for RocksStore {
    type Error = RocksError;

    fn list(&self) -> Result<Vec<Item>, Self::Error> {
        let mut items = Vec::new();
        for entry in self
            .db
            .iterator(IteratorMode::From(ITEM_PREFIX, Direction::Forward))
        {
            let (key, value) = entry?;
            if !key.starts_with(ITEM_PREFIX) {
                break;
            }
            items.push(decode_item(&value)?);
        }
        Ok(items)
    }

    fn get(&self, id: ItemId) -> Result<Option<Item>, Self::Error> {
        self.db
            .get_pinned(item_key(id))?
            .map(|bytes| decode_item(&bytes))
            .transpose()
    }

    fn insert(&self, item: &NewItem, pending: bool) -> Result<Item, Self::Error> {
        let mut next_id = self.next_id.lock().unwrap();
        let mut allocated = *next_id;
        let stored = Item::from_draft(allocated, item.clone(), pending);

        let mut batch = WriteBatch::default();
        self.stage(&mut batch, &stored, &mut allocated)?;
        self.db.write(batch)?;

        *next_id = allocated;
        Ok(stored)
    }

    fn upsert(&self, item: &Item) -> Result<(), Self::Error> {
        let mut next_id = self.next_id.lock().unwrap();
        let mut allocated = *next_id;

        let mut batch = WriteBatch::default();
        self.stage(&mut batch, item, &mut allocated)?;
        self.db.write(batch)?;

        *next_id = allocated;
        Ok(())
    }

    fn remove(&self, id: ItemId) -> Result<(), Self::Error> {
        self.db.delete(item_key(id))?;
        Ok(())
    }

    fn replace_all(&self, items: &[Item]) -> Result<(), Self::Error> {
        let mut next_id = self.next_id.lock().unwrap();
        let mut allocated = *next_id;

        let mut batch = WriteBatch::default();
        for key in self.item_keys()? {
            batch.delete(key);
        }
        for item in items {
            self.stage(&mut batch, item, &mut allocated)?;
        }
        self.db.write(batch)?;

        *next_id = allocated;
        Ok(())
    }
}

fn item_key(id: ItemId) -> Vec<u8> {
    let mut key = Vec::with_capacity(ITEM_PREFIX.len() + 8);
    key.extend_from_slice(ITEM_PREFIX);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn decode_id(bytes: &[u8]) -> Result<ItemId, RocksError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| RocksError::CorruptCounter(bytes.to_vec()))?;
    Ok(ItemId::from_be_bytes(arr))
}

fn encode_item(item: &Item) -> Result<Vec<u8>, RocksError> {
    let mut buf = Vec::new();
    ciborium::into_writer(item, &mut buf)?;
    Ok(buf)
}

fn decode_item(bytes: &[u8]) -> Result<Item, RocksError> {
    Ok(ciborium::from_reader(bytes)?)
}
