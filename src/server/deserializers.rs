use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

// the browser client builds ids from object keys, so they may arrive as "3" instead of 3
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Number(i64),
    Text(String),
}

impl TryFrom<LenientId> for i64 {
    type Error = String;

    fn try_from(value: LenientId) -> Result<Self, Self::Error> {
        match value {
            LenientId::Number(v) => Ok(v),
            LenientId::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Wrong value {s}, can not parse to i64")),
        }
    }
}

pub fn deserialize_id_set<'de, D>(deserializer: D) -> Result<Option<HashSet<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(values) = Option::<Vec<LenientId>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    values
        .into_iter()
        .map(|v| i64::try_from(v).map_err(serde::de::Error::custom))
        .collect::<Result<HashSet<_>, _>>()
        .map(Some)
}
