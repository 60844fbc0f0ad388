// Mon Oct 12 2026 - Alex

use crate::memory::Endianness;
use crate::scan::ScanError;
use crate::value::{ScanDataType, ScanMatchType, ScanTarget};

/// One comparison to run over the target.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub match_type: ScanMatchType,
    pub target: ScanTarget,
    pub data_type: ScanDataType,
    pub endianness: Endianness,
    pub show_progress: bool,
}

impl ScanRequest {
    pub fn new(match_type: ScanMatchType, target: ScanTarget) -> Self {
        Self {
            match_type,
            target,
            data_type: ScanDataType::default(),
            endianness: Endianness::default(),
            show_progress: false,
        }
    }

    /// Matches every address, recording current values.
    pub fn any() -> Self {
        Self::new(ScanMatchType::Any, ScanTarget::None)
    }

    pub fn with_data_type(mut self, data_type: ScanDataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Longest run of bytes a single match can cover.
    pub fn max_extent(&self) -> usize {
        if self.data_type.is_numeric() {
            8
        } else {
            self.target.length().max(1)
        }
    }

    pub fn validate(&self, initial: bool) -> Result<(), ScanError> {
        if initial && self.match_type.needs_old() {
            return Err(ScanError::NeedsPreviousMatches);
        }
        if self.match_type.needs_value() && matches!(self.target, ScanTarget::None) {
            return Err(ScanError::MissingValue);
        }

        let mismatch = || ScanError::DataTypeMismatch {
            match_type: self.match_type,
            data_type: self.data_type,
        };
        let consistent = match (self.data_type, &self.target) {
            (ScanDataType::ByteArray, ScanTarget::Bytes(_)) => self.match_type == ScanMatchType::EqualTo,
            (ScanDataType::String, ScanTarget::Text(_)) => self.match_type == ScanMatchType::EqualTo,
            (ScanDataType::ByteArray | ScanDataType::String, _) => false,
            (_, ScanTarget::Bytes(_) | ScanTarget::Text(_)) => false,
            _ => true,
        };
        if consistent {
            Ok(())
        } else {
            Err(mismatch())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_bytearray;

    #[test]
    fn test_initial_rejects_relative_comparisons() {
        let request = ScanRequest::new(ScanMatchType::Increased, ScanTarget::None);
        assert!(matches!(request.validate(true), Err(ScanError::NeedsPreviousMatches)));
        assert!(request.validate(false).is_ok());
    }

    #[test]
    fn test_missing_value() {
        let request = ScanRequest::new(ScanMatchType::EqualTo, ScanTarget::None);
        assert!(matches!(request.validate(true), Err(ScanError::MissingValue)));
    }

    #[test]
    fn test_bytearray_only_equal() {
        let pattern = ScanTarget::Bytes(parse_bytearray(["aa", "bb"]).unwrap());
        let ok = ScanRequest::new(ScanMatchType::EqualTo, pattern.clone()).with_data_type(ScanDataType::ByteArray);
        assert!(ok.validate(true).is_ok());
        assert_eq!(ok.max_extent(), 2);

        let wrong_type = ScanRequest::new(ScanMatchType::EqualTo, pattern);
        assert!(matches!(wrong_type.validate(true), Err(ScanError::DataTypeMismatch { .. })));

        let update = ScanRequest::any().with_data_type(ScanDataType::String);
        assert!(matches!(update.validate(false), Err(ScanError::DataTypeMismatch { .. })));
    }
}
