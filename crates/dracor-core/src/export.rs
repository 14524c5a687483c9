use polars::prelude::*;

use crate::error::Result;

/// Row-oriented JSON (`[{column: value, ...}, ...]`) for a table.
pub fn frame_to_json(df: &DataFrame) -> Result<serde_json::Value> {
    let mut buffer = Vec::new();
    let mut clone = df.clone();
    JsonWriter::new(&mut buffer)
        .with_json_format(JsonFormat::Json)
        .finish(&mut clone)?;

    if buffer.is_empty() {
        return Ok(serde_json::Value::Array(Vec::new()));
    }
    Ok(serde_json::from_slice(&buffer)?)
}
