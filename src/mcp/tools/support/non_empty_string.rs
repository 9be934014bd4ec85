use serde::Deserialize;

/// Deserializes a string argument, trimmed, rejecting blank values
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("value must not be blank"));
    }
    Ok(trimmed.to_string())
}
