use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::service::AppResult;

pub fn gzip_body(body: &[u8]) -> AppResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}
