use std::fs;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::transfer::FileOpener;

/// The processing step between download and upload: reads the downloaded
/// inputs and writes derived outputs into `output_dir`.
pub trait FileTransform: Send + Sync {
    fn apply(&self, inputs: &[FileOpener], output_dir: &Path) -> Result<()>;
}

/// Copies every input to the output directory under its relative path,
/// unchanged. Stands in for a real processing step in tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTransform;

impl FileTransform for PassthroughTransform {
    fn apply(&self, inputs: &[FileOpener], output_dir: &Path) -> Result<()> {
        for input in inputs {
            let target = output_dir.join(input.relative_path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut reader = input.open()?;
            let mut writer = fs::File::create(&target)?;
            io::copy(&mut reader, &mut writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_preserves_relative_layout() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();

        fs::create_dir_all(input_dir.path().join("sub")).unwrap();
        fs::write(input_dir.path().join("sub/one.txt"), b"1").unwrap();
        fs::write(input_dir.path().join("two.txt"), b"2").unwrap();

        let inputs = vec![
            FileOpener::new(input_dir.path(), "sub/one.txt"),
            FileOpener::new(input_dir.path(), "two.txt"),
        ];

        PassthroughTransform
            .apply(&inputs, output_dir.path())
            .unwrap();

        assert_eq!(
            fs::read(output_dir.path().join("sub/one.txt")).unwrap(),
            b"1"
        );
        assert_eq!(fs::read(output_dir.path().join("two.txt")).unwrap(), b"2");
    }
}
