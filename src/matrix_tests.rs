// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `matrix.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        compatibility_score, details, feature_table, is_recipe_supported, support,
        supported_recipes, unsupported_recipes,
    };
    use crate::recipes::RecipeId;
    use crate::types::{CniPlugin, Feature, SupportLevel};
    use std::collections::BTreeSet;

    #[test]
    fn test_unknown_cni_is_unknown_for_every_feature() {
        for name in ["antrea", "ovn-kubernetes", "kindnet", ""] {
            let cni = CniPlugin::from_name(name);
            for feature in Feature::ALL {
                assert_eq!(
                    support(cni, feature),
                    SupportLevel::Unknown,
                    "{name:?}/{feature} must never default to full"
                );
            }
        }
    }

    #[test]
    fn test_sctp_cells() {
        assert_eq!(
            support(CniPlugin::Calico, Feature::SctpProtocol),
            SupportLevel::Full
        );
        assert_eq!(
            support(CniPlugin::VpcCni, Feature::SctpProtocol),
            SupportLevel::None
        );
        assert_eq!(
            support(CniPlugin::Weave, Feature::SctpProtocol),
            SupportLevel::Partial
        );
    }

    #[test]
    fn test_deny_all_recipe_support() {
        assert!(!is_recipe_supported(RecipeId::R01, CniPlugin::Flannel));
        assert!(is_recipe_supported(RecipeId::R01, CniPlugin::Calico));
        assert!(
            !is_recipe_supported(RecipeId::R01, CniPlugin::VpcCni),
            "partial deny_all is not enough"
        );
    }

    #[test]
    fn test_partial_support_accepted_for_selector_and_egress_recipes() {
        assert_eq!(
            support(CniPlugin::VpcCni, Feature::NamespaceSelectors),
            SupportLevel::Partial
        );
        for recipe in [
            RecipeId::R04,
            RecipeId::R05,
            RecipeId::R06,
            RecipeId::R07,
            RecipeId::R10,
            RecipeId::R11,
            RecipeId::R12,
        ] {
            assert!(
                is_recipe_supported(recipe, CniPlugin::VpcCni),
                "{recipe} should run on vpc-cni"
            );
        }
        assert!(!is_recipe_supported(RecipeId::R14, CniPlugin::VpcCni));
    }

    #[test]
    fn test_bootstrap_is_always_supported() {
        for cni in CniPlugin::ALL {
            assert!(is_recipe_supported(RecipeId::ClusterBootstrap, cni));
        }
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let all: BTreeSet<RecipeId> = RecipeId::ALL.into_iter().collect();
        for cni in CniPlugin::ALL {
            let supported: BTreeSet<RecipeId> = supported_recipes(cni).into_iter().collect();
            let unsupported: BTreeSet<RecipeId> = unsupported_recipes(cni).into_iter().collect();

            assert!(supported.is_disjoint(&unsupported), "{cni}: overlap");
            let union: BTreeSet<RecipeId> = supported.union(&unsupported).copied().collect();
            assert_eq!(union, all, "{cni}: partition must cover every recipe");
        }
    }

    #[test]
    fn test_flannel_and_unknown_support_nothing() {
        assert!(supported_recipes(CniPlugin::Flannel).is_empty());
        assert!(supported_recipes(CniPlugin::Unknown).is_empty());
        assert_eq!(supported_recipes(CniPlugin::Calico).len(), 15);
    }

    #[test]
    fn test_compatibility_scores() {
        assert_eq!(compatibility_score(CniPlugin::Calico), 100);
        assert_eq!(compatibility_score(CniPlugin::Cilium), 94);
        assert_eq!(compatibility_score(CniPlugin::Weave), 78);
        assert_eq!(compatibility_score(CniPlugin::VpcCni), 44);
        assert_eq!(compatibility_score(CniPlugin::Flannel), 0);
        assert_eq!(compatibility_score(CniPlugin::Unknown), 0);
    }

    #[test]
    fn test_details_explain_caveats() {
        let vpc = details(CniPlugin::VpcCni, Feature::IngressRules).unwrap();
        assert!(vpc.contains("security groups"));
        assert!(details(CniPlugin::Calico, Feature::DenyAll).is_none());
        assert!(details(CniPlugin::Flannel, Feature::PodSelectors).is_some());
    }

    #[test]
    fn test_every_non_full_cell_has_details() {
        for cni in CniPlugin::ALL {
            for feature in Feature::ALL {
                if support(cni, feature) != SupportLevel::Full {
                    assert!(
                        details(cni, feature).is_some(),
                        "{cni}/{feature} is {} without a caveat",
                        support(cni, feature)
                    );
                }
            }
        }
    }

    #[test]
    fn test_feature_table_has_every_feature() {
        let table = feature_table(CniPlugin::Weave);
        assert_eq!(table.len(), Feature::ALL.len());
        assert_eq!(table[&Feature::PortRanges].support, SupportLevel::None);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["sctp_protocol"]["support"], "partial");
    }
}
