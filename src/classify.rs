use crate::types::{CountyWageRecord, Tier};

/// Classify a personal salary against one county's wage levels.
///
/// Returns `None` when there is nothing to classify: no record, a record
/// with no published wages (`level1 == 0`), or no positive salary.
/// Thresholds are checked highest first and equality counts as meeting the
/// tier at every level.
pub fn classify(record: Option<&CountyWageRecord>, personal_salary: Option<u32>) -> Option<Tier> {
    let record = record?;
    if !record.has_data() {
        return None;
    }
    let salary = personal_salary.filter(|s| *s > 0)?;

    Some(if salary >= record.level4 {
        Tier::MeetsL4Plus
    } else if salary >= record.level3 {
        Tier::MeetsL3
    } else if salary >= record.level2 {
        Tier::MeetsL2
    } else if salary >= record.level1 {
        Tier::MeetsL1
    } else {
        Tier::Fail
    })
}
