/// Anatomical part tags that change how a node is built and animated.
///
/// Any other tag string is decorative and parses to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartTag {
    Head,
    Tail,
    WingL,
    WingR,
    LegFl,
    LegFr,
    LegBl,
    LegBr,
    ArmL,
    ArmR,
}

impl PartTag {
    pub const ALL: [Self; 10] = [
        Self::Head,
        Self::Tail,
        Self::WingL,
        Self::WingR,
        Self::LegFl,
        Self::LegFr,
        Self::LegBl,
        Self::LegBr,
        Self::ArmL,
        Self::ArmR,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "head" => Some(Self::Head),
            "tail" => Some(Self::Tail),
            "wing_l" => Some(Self::WingL),
            "wing_r" => Some(Self::WingR),
            "leg_fl" => Some(Self::LegFl),
            "leg_fr" => Some(Self::LegFr),
            "leg_bl" => Some(Self::LegBl),
            "leg_br" => Some(Self::LegBr),
            "arm_l" => Some(Self::ArmL),
            "arm_r" => Some(Self::ArmR),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Tail => "tail",
            Self::WingL => "wing_l",
            Self::WingR => "wing_r",
            Self::LegFl => "leg_fl",
            Self::LegFr => "leg_fr",
            Self::LegBl => "leg_bl",
            Self::LegBr => "leg_br",
            Self::ArmL => "arm_l",
            Self::ArmR => "arm_r",
        }
    }

    pub fn is_leg(self) -> bool {
        matches!(self, Self::LegFl | Self::LegFr | Self::LegBl | Self::LegBr)
    }

    pub fn is_arm(self) -> bool {
        matches!(self, Self::ArmL | Self::ArmR)
    }

    pub fn is_wing(self) -> bool {
        matches!(self, Self::WingL | Self::WingR)
    }

    /// Limb-like parts get a joint pivot when built from a leaf shape.
    pub fn needs_pivot(self) -> bool {
        !matches!(self, Self::Head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for tag in PartTag::ALL {
            assert_eq!(PartTag::parse(tag.name()), Some(tag));
        }
    }

    #[test]
    fn unknown_and_prefixed_tags_are_decorative() {
        assert_eq!(PartTag::parse("leg_extra"), None);
        assert_eq!(PartTag::parse("horn"), None);
        assert_eq!(PartTag::parse(""), None);
    }
}
