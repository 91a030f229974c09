// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `types.rs`

#[cfg(test)]
mod tests {
    use super::super::{CniPlugin, Feature, Provider, SupportLevel};

    #[test]
    fn test_provider_parsing_accepts_aliases() {
        assert_eq!("GKE".parse::<Provider>().unwrap(), Provider::Gke);
        assert_eq!("aws".parse::<Provider>().unwrap(), Provider::Eks);
        assert_eq!(" azure ".parse::<Provider>().unwrap(), Provider::Aks);
        assert_eq!("k3d".parse::<Provider>().unwrap(), Provider::K3s);
        assert!("openshift".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_classes() {
        let managed: Vec<Provider> = Provider::ALL
            .into_iter()
            .filter(|p| p.is_managed_cloud())
            .collect();
        assert_eq!(managed, vec![Provider::Gke, Provider::Eks, Provider::Aks]);

        assert!(Provider::Kind.is_local());
        assert!(Provider::Microk8s.is_local());
        assert!(!Provider::Unknown.is_local());
        assert!(!Provider::Unknown.is_managed_cloud());
    }

    #[test]
    fn test_unrecognized_cni_names_are_unknown() {
        assert_eq!(CniPlugin::from_name("kindnet"), CniPlugin::Unknown);
        assert_eq!(CniPlugin::from_name(""), CniPlugin::Unknown);
        assert_eq!(
            "antrea".parse::<CniPlugin>().unwrap(),
            CniPlugin::Unknown,
            "parsing never fails for CNI names"
        );
    }

    #[test]
    fn test_cni_aliases() {
        assert_eq!(CniPlugin::from_name("aws-node"), CniPlugin::VpcCni);
        assert_eq!(CniPlugin::from_name("Azure"), CniPlugin::AzureCni);
        assert_eq!(CniPlugin::from_name("kuberouter"), CniPlugin::KubeRouter);
        assert_eq!(CniPlugin::from_name("canal"), CniPlugin::Calico);
    }

    #[test]
    fn test_cni_names_match_serde() {
        for cni in CniPlugin::ALL {
            let json = serde_json::to_string(&cni).unwrap();
            assert_eq!(json, format!("\"{}\"", cni.as_str()));
            assert_eq!(CniPlugin::from_name(cni.as_str()), cni);
        }
    }

    #[test]
    fn test_cni_deserialize_falls_back_to_unknown() {
        let cni: CniPlugin = serde_json::from_str("\"ovn-kubernetes\"").unwrap();
        assert_eq!(cni, CniPlugin::Unknown);
    }

    #[test]
    fn test_feature_parsing() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
        assert_eq!(
            "deny-all".parse::<Feature>().unwrap(),
            Feature::DenyAll,
            "dashes are accepted"
        );
        assert!("multicast".parse::<Feature>().is_err());
    }

    #[test]
    fn test_support_level_display() {
        assert_eq!(SupportLevel::Partial.to_string(), "partial");
        assert_eq!(
            serde_json::to_string(&SupportLevel::None).unwrap(),
            "\"none\""
        );
    }
}
