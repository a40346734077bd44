use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request header names starting with this prefix become custom attributes.
pub const CUSTOM_METADATA_PREFIX: &str = "x-amz-meta-";

/// Descriptor persisted next to an object's content.
///
/// The on-disk form is a flat JSON record; the object key is never part of
/// it and is injected again by [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub md5: String,
    pub content_type: String,
    pub size: u64,
    #[serde(with = "iso_millis")]
    pub modified_date: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub creation_date: DateTime<Utc>,
    #[serde(alias = "customMetadata", default)]
    pub custom_meta_data: Vec<String>,
}

/// An object descriptor paired with the key it was looked up under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageObject {
    pub key: String,
    #[serde(flatten)]
    pub metadata: ObjectMetadata,
}

pub fn encode(metadata: &ObjectMetadata) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(metadata)
}

pub fn decode(key: &str, bytes: &[u8]) -> Result<StorageObject, serde_json::Error> {
    let metadata: ObjectMetadata = serde_json::from_slice(bytes)?;
    Ok(StorageObject {
        key: key.to_string(),
        metadata,
    })
}

/// Keeps the names (not the values) of `x-amz-meta-*` headers, in input order.
pub fn custom_attribute_names<'a, I>(header_names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    header_names
        .into_iter()
        .filter(|name| name.starts_with(CUSTOM_METADATA_PREFIX))
        .map(str::to_string)
        .collect()
}

// Dates are stored as `2020-01-01T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&value)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ObjectMetadata {
        ObjectMetadata {
            md5: "902fbdd2b1df0c4f70b4a5d23525e932".to_string(),
            content_type: "image/jpeg".to_string(),
            size: 3,
            modified_date: Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap(),
            creation_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            custom_meta_data: vec!["x-amz-meta-owner".to_string()],
        }
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "{\"md5\":\"902fbdd2b1df0c4f70b4a5d23525e932\",\"contentType\":\"image/jpeg\",\
             \"size\":3,\"modifiedDate\":\"2020-01-02T03:04:05.000Z\",\
             \"creationDate\":\"2020-01-01T00:00:00.000Z\",\
             \"customMetaData\":[\"x-amz-meta-owner\"]}"
        );
    }

    #[test]
    fn test_decode_injects_key() {
        let bytes = encode(&sample()).unwrap();
        let object = decode("2020/a.jpg", &bytes).unwrap();
        assert_eq!(object.key, "2020/a.jpg");
        assert_eq!(object.metadata, sample());
    }

    #[test]
    fn test_decode_legacy_custom_metadata_spelling() {
        let json = br#"{"md5":"abc","contentType":"text/plain","size":1,
            "modifiedDate":"2021-05-06T07:08:09.123Z","creationDate":"2021-05-06T07:08:09.123Z",
            "customMetadata":["x-amz-meta-a"]}"#;
        let object = decode("k", json).unwrap();
        assert_eq!(object.metadata.custom_meta_data, vec!["x-amz-meta-a"]);
        assert_eq!(object.metadata.modified_date.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_decode_missing_custom_metadata() {
        let json = br#"{"md5":"abc","contentType":"text/plain","size":1,
            "modifiedDate":"2021-05-06T07:08:09.000Z","creationDate":"2021-05-06T07:08:09.000Z"}"#;
        let object = decode("k", json).unwrap();
        assert!(object.metadata.custom_meta_data.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("k", b"not json").is_err());
        assert!(decode("k", br#"{"md5":"abc"}"#).is_err());
    }

    #[test]
    fn test_custom_attribute_names() {
        let headers = [
            "content-type",
            "x-amz-meta-owner",
            "X-Amz-Meta-Upper",
            "x-amz-meta-",
            "x-amz-acl",
        ];
        assert_eq!(
            custom_attribute_names(headers),
            vec!["x-amz-meta-owner".to_string(), "x-amz-meta-".to_string()]
        );
    }
}
