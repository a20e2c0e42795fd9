//! Integration tests for grant management and effective access.

mod helpers;

use chrono::{Duration, Utc};

use canopy::{
    AccessLevel, AccessSource, CanopyConfig, ErrorKind, GrantStore, NewGrant, PrincipalId,
    ResourceRef,
};
use canopy_core::config::access::ResolutionStrategy;

#[tokio::test]
async fn test_inherited_grant_applies_until_revoked() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let folder_a = core.folder(root, "A").await;
    let file = core.canopy.attach_leaf(folder_a, "notes.pdf").await.unwrap();
    let p = PrincipalId::new();
    let a_ref = ResourceRef::container(folder_a);

    core.canopy
        .grants()
        .share(NewGrant::new(p, a_ref, AccessLevel::Download, true))
        .await
        .unwrap();

    let resolver = core.canopy.resolver();
    let file_ref = ResourceRef::leaf(file.id);
    assert_eq!(
        resolver.effective_access(p, file_ref).await.unwrap(),
        Some(AccessLevel::Download)
    );

    let removed = core.canopy.grants().revoke(None, a_ref, Some(p)).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(resolver.effective_access(p, file_ref).await.unwrap(), None);
}

#[tokio::test]
async fn test_direct_grant_outranks_inherited() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let folder_a = core.folder(root, "A").await;
    let file = core.canopy.attach_leaf(folder_a, "x.docx").await.unwrap();
    let p = PrincipalId::new();
    let grants = core.canopy.grants();

    grants
        .share(NewGrant::new(p, ResourceRef::container(folder_a), AccessLevel::View, true))
        .await
        .unwrap();
    grants
        .share(NewGrant::new(p, ResourceRef::leaf(file.id), AccessLevel::Manage, false))
        .await
        .unwrap();

    let access = core
        .canopy
        .resolver()
        .resolve(p, ResourceRef::leaf(file.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(access.level, AccessLevel::Manage);
    assert_eq!(access.source, AccessSource::Direct);
}

#[tokio::test]
async fn test_equal_rank_surfaces_direct_grant() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let p = PrincipalId::new();
    let grants = core.canopy.grants();
    grants
        .share(NewGrant::new(p, ResourceRef::container(root), AccessLevel::Download, true))
        .await
        .unwrap();
    let child = core.folder(root, "child").await;
    let direct = grants
        .share(NewGrant::new(p, ResourceRef::container(child), AccessLevel::Download, false))
        .await
        .unwrap();

    let access = core
        .canopy
        .resolver()
        .resolve(p, ResourceRef::container(child))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(access.source_grant.id, direct.id);
    assert_eq!(access.source, AccessSource::Direct);
}

#[tokio::test]
async fn test_grant_does_not_cross_namespaces() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let p = PrincipalId::new();
    core.canopy
        .grants()
        .share(NewGrant::new(p, ResourceRef::container(root), AccessLevel::Manage, true))
        .await
        .unwrap();

    let other = helpers::TestCore::new();
    let foreign = other.root("foreign").await;
    let foreign_child = other.folder(foreign, "child").await;
    assert_eq!(
        core.canopy
            .resolver()
            .effective_access(p, ResourceRef::container(foreign_child))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_moving_a_subtree_changes_inherited_access() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let shared = core.folder(root, "shared").await;
    let private = core.folder(root, "private").await;
    let doc = core.folder(private, "doc").await;
    let p = PrincipalId::new();
    core.canopy
        .grants()
        .share(NewGrant::new(p, ResourceRef::container(shared), AccessLevel::View, true))
        .await
        .unwrap();

    let resolver = core.canopy.resolver();
    let doc_ref = ResourceRef::container(doc);
    assert_eq!(resolver.effective_access(p, doc_ref).await.unwrap(), None);

    core.engine().reparent(doc, Some(shared)).await.unwrap();
    assert_eq!(
        resolver.effective_access(p, doc_ref).await.unwrap(),
        Some(AccessLevel::View)
    );
}

#[tokio::test]
async fn test_expired_grant_ignored() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let p = PrincipalId::new();

    // Written straight to the store: the service refuses past expiries.
    let mut stale = NewGrant::new(p, ResourceRef::container(root), AccessLevel::Manage, true);
    stale.expires_at = Some(Utc::now() - Duration::minutes(5));
    core.grants.add(stale.into_grant()).await.unwrap();

    let resolver = core.canopy.resolver();
    assert_eq!(
        resolver
            .effective_access(p, ResourceRef::container(root))
            .await
            .unwrap(),
        None
    );

    let lax = helpers::TestCore::with_config(
        CanopyConfig::from_toml("[access]\nhonor_expiry = false").unwrap(),
    );
    let lax_root = lax.root("root").await;
    let mut stale = NewGrant::new(p, ResourceRef::container(lax_root), AccessLevel::Manage, true);
    stale.expires_at = Some(Utc::now() - Duration::minutes(5));
    lax.grants.add(stale.into_grant()).await.unwrap();
    assert_eq!(
        lax.canopy
            .resolver()
            .effective_access(p, ResourceRef::container(lax_root))
            .await
            .unwrap(),
        Some(AccessLevel::Manage)
    );
}

#[tokio::test]
async fn test_nearest_strategy_allows_downgrade() {
    let mut config = CanopyConfig::default();
    config.access.strategy = ResolutionStrategy::Nearest;
    let core = helpers::TestCore::with_config(config);
    let root = core.root("root").await;
    let child = core.folder(root, "child").await;
    let p = PrincipalId::new();
    let grants = core.canopy.grants();
    grants
        .share(NewGrant::new(p, ResourceRef::container(root), AccessLevel::Manage, true))
        .await
        .unwrap();
    grants
        .share(NewGrant::new(p, ResourceRef::container(child), AccessLevel::View, false))
        .await
        .unwrap();

    assert_eq!(
        core.canopy
            .resolver()
            .effective_access(p, ResourceRef::container(child))
            .await
            .unwrap(),
        Some(AccessLevel::View)
    );
}

#[tokio::test]
async fn test_shared_with_listing_and_require() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let folder = core.folder(root, "folder").await;
    let (owner, viewer) = (PrincipalId::new(), PrincipalId::new());
    let grants = core.canopy.grants();
    grants
        .share(NewGrant::new(owner, ResourceRef::container(root), AccessLevel::Manage, true))
        .await
        .unwrap();
    grants
        .share(NewGrant::new(viewer, ResourceRef::container(folder), AccessLevel::View, false))
        .await
        .unwrap();
    grants
        .share(NewGrant::new(viewer, ResourceRef::container(folder), AccessLevel::Download, false))
        .await
        .unwrap();

    let resolver = core.canopy.resolver();
    let listing = resolver
        .principals_with_access(ResourceRef::container(folder))
        .await
        .unwrap();
    let summary: Vec<_> = listing
        .iter()
        .map(|row| (row.principal_id, row.access.level))
        .collect();
    assert_eq!(
        summary,
        vec![(owner, AccessLevel::Manage), (viewer, AccessLevel::Download)]
    );

    let err = resolver
        .require(viewer, ResourceRef::container(folder), AccessLevel::Manage)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(
        resolver
            .require(owner, ResourceRef::container(folder), AccessLevel::Manage)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_filter_accessible_preserves_order() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let open = core.folder(root, "open").await;
    let closed = core.folder(root, "closed").await;
    let inner = core.folder(open, "inner").await;
    let p = PrincipalId::new();
    core.canopy
        .grants()
        .share(NewGrant::new(p, ResourceRef::container(open), AccessLevel::Download, true))
        .await
        .unwrap();

    let candidates = [
        ResourceRef::container(inner),
        ResourceRef::container(closed),
        ResourceRef::container(open),
    ];
    let visible = core
        .canopy
        .resolver()
        .filter_accessible(p, &candidates, AccessLevel::Download)
        .await
        .unwrap();
    assert_eq!(visible, vec![candidates[0], candidates[2]]);
}

#[tokio::test]
async fn test_revoke_without_matches_is_zero() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let removed = core
        .canopy
        .grants()
        .revoke(None, ResourceRef::container(root), None)
        .await
        .unwrap();
    assert_eq!(removed, 0);
}
