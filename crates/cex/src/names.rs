//! Decoding of Sketch-generated variable names.
//!
//! Sketch appends `_<int>_<int>_<int>` to every variable it emits. Stripping
//! that suffix once recovers the chipc name, whose prefix tells whether the
//! variable is a packet field or a state group slot.

use std::sync::LazyLock;

use regex::Regex;

pub const PACKET_FIELD_PREFIX: &str = "pkt_";
pub const STATE_GROUP_PREFIX: &str = "state_group_";

static SYNTHESIS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+_\d+_\d+$").expect("suffix pattern is valid"));

/// Category a decoded variable is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarCategory {
    PacketField,
    StateGroup,
}

/// Remove one trailing `_\d+_\d+_\d+` from `raw`.
pub fn strip_synthesis_suffix(raw: &str) -> &str {
    match SYNTHESIS_SUFFIX.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    }
}

/// Category of an already stripped name, `None` if it is neither.
pub fn classify(name: &str) -> Option<VarCategory> {
    if name.starts_with(PACKET_FIELD_PREFIX) {
        Some(VarCategory::PacketField)
    } else if name.starts_with(STATE_GROUP_PREFIX) {
        Some(VarCategory::StateGroup)
    } else {
        None
    }
}

/// Strip the suffix from a raw model name and classify the result.
pub fn decode(raw: &str) -> Option<(VarCategory, &str)> {
    let name = strip_synthesis_suffix(raw);
    classify(name).map(|category| (category, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_three_part_suffix() {
        assert_eq!(strip_synthesis_suffix("pkt_len_3_0_7"), "pkt_len");
        assert_eq!(strip_synthesis_suffix("state_group_0_state_1_0_0_12"), "state_group_0_state_1");
    }

    #[test]
    fn strips_only_once() {
        assert_eq!(strip_synthesis_suffix("pkt_a_1_2_3_4_5_6"), "pkt_a_1_2_3");
    }

    #[test]
    fn leaves_short_suffixes_alone() {
        assert_eq!(strip_synthesis_suffix("pkt_0"), "pkt_0");
        assert_eq!(strip_synthesis_suffix("pkt_0_1"), "pkt_0_1");
        assert_eq!(strip_synthesis_suffix("pkt_0_1_x"), "pkt_0_1_x");
    }

    #[test]
    fn suffix_must_be_anchored_at_end() {
        assert_eq!(strip_synthesis_suffix("pkt_1_2_3_len"), "pkt_1_2_3_len");
    }

    #[test]
    fn classify_prefixes() {
        assert_eq!(classify("pkt_len"), Some(VarCategory::PacketField));
        assert_eq!(classify("state_group_0_state_0"), Some(VarCategory::StateGroup));
        assert_eq!(classify("state_0"), None);
        assert_eq!(classify("packet_len"), None);
    }

    #[test]
    fn decode_routes_stripped_names() {
        assert_eq!(decode("pkt_len_3_0_7"), Some((VarCategory::PacketField, "pkt_len")));
        assert_eq!(
            decode("state_group_1_state_0_0_0_0"),
            Some((VarCategory::StateGroup, "state_group_1_state_0"))
        );
        assert_eq!(decode("hole_0_1_2_3"), None);
    }

    proptest! {
        #[test]
        fn stripping_recovers_base_name(
            base in "pkt_[a-z]{1,8}",
            a in 0u32..1000,
            b in 0u32..1000,
            c in 0u32..1000,
        ) {
            let raw = format!("{base}_{a}_{b}_{c}");
            prop_assert_eq!(strip_synthesis_suffix(&raw), base.as_str());
            prop_assert_eq!(decode(&raw), Some((VarCategory::PacketField, base.as_str())));
        }

        #[test]
        fn names_without_suffix_are_unchanged(name in "[a-z_]{0,16}") {
            prop_assert_eq!(strip_synthesis_suffix(&name), name.as_str());
        }
    }
}
