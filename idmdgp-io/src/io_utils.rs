//! Small file-opening helpers shared by any caller of this crate,
//! ported from `bioshell_io::utils`'s `open_file`/`out_writer`
//! conventions: a single entry point that transparently decompresses a
//! `.gz`-suffixed input, and a single entry point that treats
//! `"stdout"`/an empty name as standard output rather than a literal
//! file on disk.

use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, stdout, BufRead, BufReader, Write};
use std::path::Path;

/// Opens `filename` for reading, returning a buffered reader that
/// transparently gunzips the content when the name ends in `.gz`.
pub fn open_file(filename: &str) -> io::Result<Box<dyn BufRead>> {
    let path = Path::new(filename);
    let file = File::open(path)?;
    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Opens `out_fname` for writing. `""` and `"stdout"` write to standard
/// output instead of creating a file of that name.
pub fn out_writer(out_fname: &str) -> io::Result<Box<dyn Write>> {
    match out_fname {
        "" | "stdout" => Ok(Box::new(stdout())),
        _ => Ok(Box::new(File::create(out_fname)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn open_file_reads_plain_text() {
        let dir = std::env::temp_dir().join("idmdgp_io_utils_test_plain.txt");
        std::fs::write(&dir, "hello\n").unwrap();
        let mut reader = open_file(dir.to_str().unwrap()).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hello\n");
        std::fs::remove_file(&dir).ok();
    }

    #[test]
    fn open_file_decompresses_gz() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = std::env::temp_dir().join("idmdgp_io_utils_test.txt.gz");
        {
            let file = File::create(&dir).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(b"compressed\n").unwrap();
            encoder.finish().unwrap();
        }
        let mut reader = open_file(dir.to_str().unwrap()).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "compressed\n");
        std::fs::remove_file(&dir).ok();
    }
}
