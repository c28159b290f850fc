//! MD5 of a WAVE file's audio data
//!
//! Hashes the payload of the `data` chunk, which is the same digest
//! the BWF MD5 chunk stores and `ffmpeg -c copy -f md5` prints.

use crate::error::ProbeError;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

/// Compute the upper-case hex MD5 of the audio data in a WAVE file
pub fn audio_data_md5(path: &Path) -> Result<String, ProbeError> {
    let file = File::open(path)?;
    audio_data_md5_from(BufReader::new(file))
}

/// Same as `audio_data_md5`, over any seekable reader
///
/// Accepts RIFF as well as the 64-bit RF64 and BW64 containers, whose
/// oversized chunk lengths live in the `ds64` chunk.
pub fn audio_data_md5_from<R: Read + Seek>(mut reader: R) -> Result<String, ProbeError> {
    let mut header = [0u8; 12];
    reader
        .read_exact(&mut header)
        .map_err(|_| ProbeError::InvalidWave("file shorter than a RIFF header".to_string()))?;
    let wide = match &header[0..4] {
        b"RIFF" => false,
        b"RF64" | b"BW64" => true,
        _ => return Err(ProbeError::InvalidWave("missing RIFF/WAVE signature".to_string())),
    };
    if &header[8..12] != b"WAVE" {
        return Err(ProbeError::InvalidWave("missing RIFF/WAVE signature".to_string()));
    }

    let mut ds64_data_size = None;
    loop {
        let mut chunk_header = [0u8; 8];
        match reader.read_exact(&mut chunk_header) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(ProbeError::InvalidWave("no data chunk".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = &chunk_header[0..4];
        let size = u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]);

        if wide && id == b"ds64" {
            let mut riff_size = [0u8; 8];
            let mut data_size = [0u8; 8];
            reader
                .read_exact(&mut riff_size)
                .and_then(|_| reader.read_exact(&mut data_size))
                .map_err(|_| ProbeError::InvalidWave("truncated ds64 chunk".to_string()))?;
            ds64_data_size = Some(u64::from_le_bytes(data_size));
            let rest = (size as u64).saturating_sub(16) + (size as u64 & 1);
            reader.seek(SeekFrom::Current(rest as i64))?;
            continue;
        }

        if id == b"data" {
            let size = match (size, ds64_data_size) {
                (u32::MAX, Some(wide_size)) => wide_size,
                (u32::MAX, None) if wide => {
                    let reason = "data chunk without ds64 size".to_string();
                    return Err(ProbeError::InvalidWave(reason));
                }
                (size, _) => size as u64,
            };
            return hash_chunk(&mut reader, size);
        }

        // Chunks are word aligned
        let skip = size as u64 + (size as u64 & 1);
        reader.seek(SeekFrom::Current(skip as i64))?;
    }
}

/// Hash up to `size` bytes; a truncated final chunk hashes what is there
fn hash_chunk<R: Read>(reader: &mut R, size: u64) -> Result<String, ProbeError> {
    let mut context = md5::Context::new();
    let mut limited = reader.take(size);
    let mut buf = vec![0u8; BUFFER_SIZE];

    loop {
        let n = limited.read(&mut buf)?;
        if n == 0 {
            break;
        }
        context.consume(&buf[..n]);
    }

    Ok(format!("{:x}", context.compute()).to_uppercase())
}
