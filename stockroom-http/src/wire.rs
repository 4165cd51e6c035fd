//! JSON bodies exchanged with the items resource.
//!
//! `pending` is local bookkeeping and never goes on the wire.

use serde::{Deserialize, Serialize};
use stockroom_core::{Item, ItemId, NewItem};

/// Body of `POST /items`.
#[derive(Debug, Serialize)]
pub(crate) struct DraftBody<'a> {
    pub name: &'a str,
    pub quantity: i64,
}

impl<'a> From<&'a NewItem> for DraftBody<'a> {
    fn from(item: &'a NewItem) -> Self {
        Self {
            name: &item.name,
            quantity: item.quantity,
        }
    }
}

/// Body of `PUT /items/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct ItemBody<'a> {
    pub id: ItemId,
    pub name: &'a str,
    pub quantity: i64,
}

impl<'a> From<&'a Item> for ItemBody<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: item.id,
            name: &item.name,
            quantity: item.quantity,
        }
    }
}

/// An item as the remote reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteItem {
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub id: ItemId,
    pub name: String,
    #[serde(deserialize_with = "number_or_string::deserialize")]
    pub quantity: i64,
}

impl From<RemoteItem> for Item {
    fn from(item: RemoteItem) -> Self {
        Item {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            pending: false,
        }
    }
}

/// Accept an integer encoded either as a JSON number or as a numeric string.
///
/// Generic REST backends (json-server and friends) hand out string ids and
/// store form input verbatim.
pub(crate) mod number_or_string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Number(T),
            Text(String),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
