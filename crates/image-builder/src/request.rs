//! Builds compose requests from image records.
//!
//! Nothing is validated here: an empty architecture or distribution is sent
//! as-is and rejected (or not) by the compose service.

use images::{BuildFlavor, Image, UpdateRecord};
use tracing::debug;

use crate::wire::{ComposeRequest, Customizations, ImageRequest, OsTree, UploadRequest};

/// Request for an OS-tree commit of `image`.
///
/// Carries the commit's packages. An OS-tree block is attached only when the
/// commit names a ref; its `url` is the parent commit repository when one is
/// set.
pub fn commit_request(image: &Image) -> ComposeRequest {
    let commit = &image.commit;

    let ostree = if commit.ostree_ref.is_empty() {
        if !commit.ostree_parent_commit.is_empty() {
            debug!(
                image = %image.name,
                "Ignoring OS-tree parent commit because the commit has no ref"
            );
        }
        None
    } else {
        Some(OsTree {
            url: Some(commit.ostree_parent_commit.clone()).filter(|url| !url.is_empty()),
            ostree_ref: commit.ostree_ref.clone(),
        })
    };

    compose_request(
        image,
        BuildFlavor::Commit,
        commit.package_names(),
        ostree,
    )
}

/// Request for an installer ISO embedding the commit of `image`.
///
/// The installer never layers packages. Its OS-tree source is the update
/// record's repository behind `ostree_proxy_url`.
pub fn installer_request(
    image: &Image,
    update_record: &UpdateRecord,
    ostree_proxy_url: &str,
) -> ComposeRequest {
    let ostree = OsTree {
        url: Some(installer_repo_url(ostree_proxy_url, update_record)),
        ostree_ref: image.commit.ostree_ref.clone(),
    };

    compose_request(image, BuildFlavor::Installer, Vec::new(), Some(ostree))
}

/// `{proxy}/{account}/{update_record_id}/repo`
pub fn installer_repo_url(ostree_proxy_url: &str, update_record: &UpdateRecord) -> String {
    format!(
        "{}/{}/{}/repo",
        ostree_proxy_url.trim_end_matches('/'),
        update_record.account,
        update_record.id
    )
}

fn compose_request(
    image: &Image,
    flavor: BuildFlavor,
    packages: Vec<String>,
    ostree: Option<OsTree>,
) -> ComposeRequest {
    ComposeRequest {
        customizations: Some(Customizations {
            packages: Some(packages),
        }),
        distribution: image.distribution.clone(),
        image_requests: vec![ImageRequest {
            architecture: image.commit.arch.clone(),
            image_type: flavor.image_type().to_string(),
            ostree,
            upload_request: UploadRequest::aws_s3(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use images::{AccountId, Commit, Installer, Package, UpdateRecordId};
    use proptest::prelude::*;

    const PROXY: &str = "http://proxy.example.com";

    fn image(commit: Commit) -> Image {
        Image {
            name: "edge-1".to_string(),
            account: AccountId::new("0000001").unwrap(),
            distribution: "rhel-8".to_string(),
            status: Default::default(),
            commit,
            installer: Installer::default(),
        }
    }

    fn update_record(account: &str, id: u64) -> UpdateRecord {
        UpdateRecord {
            id: UpdateRecordId::new(id),
            account: AccountId::new(account).unwrap(),
        }
    }

    // ============================================
    // Commit requests
    // ============================================

    #[test]
    fn test_commit_request_copies_packages_and_arch() {
        let img = image(Commit {
            arch: "x86_64".to_string(),
            packages: vec![
                Package { name: "vim".to_string() },
                Package { name: "git".to_string() },
            ],
            ..Commit::default()
        });

        let req = commit_request(&img);

        assert_eq!(req.distribution, "rhel-8");
        assert_eq!(req.image_requests.len(), 1);
        let image_request = &req.image_requests[0];
        assert_eq!(image_request.architecture, "x86_64");
        assert_eq!(image_request.image_type, "rhel-edge-commit");
        assert_eq!(image_request.upload_request, UploadRequest::aws_s3());
        assert_eq!(
            req.customizations.unwrap().packages.unwrap(),
            vec!["vim".to_string(), "git".to_string()]
        );
    }

    #[test]
    fn test_commit_request_without_ref_has_no_ostree() {
        let img = image(Commit {
            arch: "x86_64".to_string(),
            ..Commit::default()
        });

        assert!(commit_request(&img).image_requests[0].ostree.is_none());
    }

    #[test]
    fn test_commit_request_parent_without_ref_is_ignored() {
        let img = image(Commit {
            ostree_parent_commit: "http://repo/parent".to_string(),
            ..Commit::default()
        });

        assert!(commit_request(&img).image_requests[0].ostree.is_none());
    }

    #[test]
    fn test_commit_request_ref_without_parent_omits_url() {
        let img = image(Commit {
            ostree_ref: "rhel/8/x86_64/edge".to_string(),
            ..Commit::default()
        });

        let ostree = commit_request(&img).image_requests[0].ostree.clone().unwrap();
        assert_eq!(ostree.ostree_ref, "rhel/8/x86_64/edge");
        assert!(ostree.url.is_none());
    }

    #[test]
    fn test_commit_request_passes_empty_arch_through() {
        let img = image(Commit::default());
        assert_eq!(commit_request(&img).image_requests[0].architecture, "");
    }

    // ============================================
    // Installer requests
    // ============================================

    #[test]
    fn test_installer_request_shape() {
        let img = image(Commit {
            arch: "aarch64".to_string(),
            ostree_ref: "rhel/8/aarch64/edge".to_string(),
            packages: vec![Package { name: "vim".to_string() }],
            ..Commit::default()
        });

        let req = installer_request(&img, &update_record("0000001", 7), PROXY);

        let image_request = &req.image_requests[0];
        assert_eq!(image_request.architecture, "aarch64");
        assert_eq!(image_request.image_type, "rhel-edge-installer");
        assert_eq!(
            image_request.ostree,
            Some(OsTree {
                url: Some("http://proxy.example.com/0000001/7/repo".to_string()),
                ostree_ref: "rhel/8/aarch64/edge".to_string(),
            })
        );
        assert_eq!(req.customizations.unwrap().packages, Some(Vec::new()));
    }

    #[test]
    fn test_installer_repo_url_tolerates_trailing_slash() {
        assert_eq!(
            installer_repo_url("http://proxy/", &update_record("acct", 3)),
            "http://proxy/acct/3/repo"
        );
    }

    #[test]
    fn test_installer_request_serialises_empty_package_list() {
        let img = image(Commit::default());
        let value = serde_json::to_value(installer_request(&img, &update_record("a", 1), PROXY))
            .unwrap();
        assert_eq!(value["customizations"]["packages"], serde_json::json!([]));
    }

    // ============================================
    // Property tests
    // ============================================

    fn non_empty() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9/_.:-]{1,40}"
    }

    fn packages() -> impl Strategy<Value = Vec<Package>> {
        prop::collection::vec("[a-z][a-z0-9-]{0,20}", 0..8)
            .prop_map(|names| names.into_iter().map(|name| Package { name }).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_commit_ostree_ref_and_url_map_independently(
            ostree_ref in non_empty(),
            parent in non_empty(),
            pkgs in packages(),
        ) {
            let img = image(Commit {
                arch: "x86_64".to_string(),
                ostree_ref: ostree_ref.clone(),
                ostree_parent_commit: parent.clone(),
                packages: pkgs,
                ..Commit::default()
            });

            let ostree = commit_request(&img).image_requests[0].ostree.clone();
            prop_assert_eq!(
                ostree,
                Some(OsTree { url: Some(parent), ostree_ref })
            );
        }

        #[test]
        fn prop_installer_has_no_packages_and_templated_url(
            account in "[0-9]{1,10}",
            id in any::<u64>(),
            ostree_ref in non_empty(),
            pkgs in packages(),
        ) {
            let img = image(Commit {
                ostree_ref: ostree_ref.clone(),
                packages: pkgs,
                ..Commit::default()
            });

            let req = installer_request(&img, &update_record(&account, id), PROXY);

            prop_assert_eq!(req.image_requests.len(), 1);
            prop_assert_eq!(
                req.customizations.and_then(|c| c.packages),
                Some(Vec::<String>::new())
            );
            let ostree = req.image_requests[0].ostree.clone().unwrap();
            prop_assert_eq!(ostree.url, Some(format!("{PROXY}/{account}/{id}/repo")));
            prop_assert_eq!(ostree.ostree_ref, ostree_ref);
        }
    }
}
