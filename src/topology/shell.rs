use super::face::FaceId;

slotmap::new_key_type! {
    pub struct ShellId;
}

/// Faces bounding one side of a solid. Kernel operations always close
/// their shells; `is_closed` records it for callers that build by hand.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
    pub is_closed: bool,
}
