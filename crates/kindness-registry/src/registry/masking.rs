pub const DEFAULT_MASK: char = '*';

/// Masking failed for a single record; the listing keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to mask applicant name: {reason}")]
pub struct MaskError {
    pub reason: String,
}

/// Produces the outward-facing form of an applicant name. An absent name
/// stays absent.
pub trait ApplicantMasker: Send + Sync {
    fn mask(&self, raw: Option<&str>) -> Result<Option<String>, MaskError>;
}

/// Character-count based masker.
///
/// Names shorter than two characters are returned as-is, two character names
/// get the mask appended and longer names have their second character
/// replaced by the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyMasker {
    mask: char,
}

impl Default for PrivacyMasker {
    fn default() -> Self {
        Self::new(DEFAULT_MASK)
    }
}

impl PrivacyMasker {
    pub fn new(mask: char) -> Self {
        Self { mask }
    }

    pub fn mask_name(&self, raw: &str) -> String {
        let mut chars = raw.chars();
        match raw.chars().count() {
            0 | 1 => raw.to_string(),
            2 => {
                let mut masked = raw.to_string();
                masked.push(self.mask);
                masked
            }
            _ => {
                let mut masked = String::with_capacity(raw.len() + self.mask.len_utf8());
                masked.extend(chars.next());
                masked.push(self.mask);
                masked.extend(chars.skip(1));
                masked
            }
        }
    }

    pub fn mask_optional(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|name| self.mask_name(name))
    }
}

impl ApplicantMasker for PrivacyMasker {
    fn mask(&self, raw: Option<&str>) -> Result<Option<String>, MaskError> {
        Ok(self.mask_optional(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_by_character_count() {
        let masker = PrivacyMasker::default();
        assert_eq!(masker.mask_name("王"), "王");
        assert_eq!(masker.mask_name("王小"), "王小*");
        assert_eq!(masker.mask_name("王小明"), "王*明");
        assert_eq!(masker.mask_name("歐陽小明"), "歐*小明");
        assert_eq!(masker.mask_name(""), "");
        assert_eq!(masker.mask_optional(None), None);
    }

    #[test]
    fn trait_masking_keeps_absent_names_absent() {
        let masker: &dyn ApplicantMasker = &PrivacyMasker::default();
        assert_eq!(masker.mask(None), Ok(None));
        assert_eq!(masker.mask(Some("王小明")), Ok(Some("王*明".to_string())));
    }

    #[test]
    fn ascii_names_follow_the_same_rule() {
        let masker = PrivacyMasker::new('#');
        assert_eq!(masker.mask_name("Al"), "Al#");
        assert_eq!(masker.mask_name("Ann"), "A#n");
        assert_eq!(
            masker.mask_optional(Some("Bobby")).as_deref(),
            Some("B#bby")
        );
    }
}
