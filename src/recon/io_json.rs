// Writing of JSON documents.

use std::fs;
use std::path::Path;

use serde::Serialize;
use snafu::ResultExt;

use crate::recon::*;

/// Writes a value as pretty-printed JSON, replacing any existing file.
///
/// The output uses a two-space indent and keeps non-ASCII characters as they are.
pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ReconResult<()> {
    let p = path.display().to_string();
    let contents = serde_json::to_string_pretty(value).context(SerializingJsonSnafu { path: &p })?;
    fs::write(path, contents).context(WritingFileSnafu { path: p })
}
