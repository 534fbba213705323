use super::super::domain::{LevelCriteria, PromotionType};

/// Zero or unset minimum tenure can never be met; such levels are reachable only
/// through the special track.
pub(crate) fn tenure_met(tenure: u32, next: &LevelCriteria) -> bool {
    match next.min_tenure {
        Some(min_tenure) if min_tenure > 0 => tenure >= min_tenure,
        _ => false,
    }
}

/// Normal track. A non-positive point bar means tenure alone qualifies.
pub(crate) fn normal_track(tenure_met: bool, final_points: f64, next: &LevelCriteria) -> bool {
    tenure_met && (next.required_points <= 0.0 || final_points >= next.required_points)
}

/// Special track uses the bar of the level the employee currently holds.
pub(crate) fn special_track(
    tenure_met: bool,
    final_points: f64,
    current: Option<&LevelCriteria>,
) -> bool {
    let bar = current
        .and_then(|criteria| criteria.special_required_points)
        .unwrap_or(0.0);
    !tenure_met && bar > 0.0 && final_points >= bar
}

pub(crate) fn promotion_type(
    qualification_met: bool,
    special_eligible: bool,
) -> Option<PromotionType> {
    match (qualification_met, special_eligible) {
        (true, _) => Some(PromotionType::Normal),
        (false, true) => Some(PromotionType::Special),
        (false, false) => None,
    }
}
