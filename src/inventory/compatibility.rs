use crate::inventory::{Accommodation, RoomType};

/// Accommodations that may be sold under a room type
///
/// - Standard → Single, Double
/// - Junior → Triple, Quadruple
/// - Suite → Single, Double, Triple
pub fn compatible_accommodations(room_type: RoomType) -> &'static [Accommodation] {
    match room_type {
        RoomType::Standard => &[Accommodation::Single, Accommodation::Double],
        RoomType::Junior => &[Accommodation::Triple, Accommodation::Quadruple],
        RoomType::Suite => &[
            Accommodation::Single,
            Accommodation::Double,
            Accommodation::Triple,
        ],
    }
}

/// Check whether an accommodation is legal for a room type
pub fn is_compatible(room_type: RoomType, accommodation: Accommodation) -> bool {
    compatible_accommodations(room_type).contains(&accommodation)
}
