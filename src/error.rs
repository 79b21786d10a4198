use thiserror::Error;

use crate::export::ExportError;
use shhhot_ocr::OcrError;

/// Setup-time failures. Once a session is running, detection and export
/// problems are collapsed into outcomes instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ocr: {0}")]
    Ocr(#[from] OcrError),

    #[error("export: {0}")]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors_convert() {
        let err: Error = ExportError::NoDirectory.into();
        assert_eq!(err.to_string(), "export: no pictures directory available");

        let err: Error = OcrError::EngineUnavailable("no tesseract".to_string()).into();
        assert!(matches!(err, Error::Ocr(_)));
    }
}
