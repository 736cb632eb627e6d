use serde::{Deserialize, Deserializer};

// clients send ids and difficulties both as numbers and as numeric strings ("1"),
// an empty string is treated the same as a missing value
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(v)) => Ok(Some(v)),
        Some(NumberOrString::String(v)) if v.is_empty() => Ok(None),
        Some(NumberOrString::String(v)) => match v.trim().parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(serde::de::Error::custom(format!(
                "Wrong value {v}, can not parse to i64"
            ))),
        },
    }
}

pub fn deserialize_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_i64(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a number, got an empty value"))
}
