//! Integration tests for structural mutations and their failure modes.

mod helpers;

use std::sync::atomic::Ordering;

use canopy::{
    AccessLevel, ErrorKind, NewGrant, NewNode, NodeKind, NodeStore, PrincipalId, ResourceRef,
    TreeError,
};
use canopy_core::events::{EventPayload, NodeEvent};

#[tokio::test]
async fn test_reparent_into_own_subtree_leaves_tree_unchanged() {
    let core = helpers::TestCore::new();
    let a = core.root("A").await;
    let b = core.folder(a, "B").await;
    let c = core.folder(b, "C").await;
    let before = core.snapshot().await;

    let err = core.engine().reparent(a, Some(c)).await.unwrap_err();
    assert!(matches!(err, TreeError::Cycle { node, parent } if node == a && parent == c));

    let err = core.engine().reparent(b, Some(b)).await.unwrap_err();
    assert!(matches!(err, TreeError::Cycle { .. }));

    assert_eq!(core.snapshot().await, before);
}

#[tokio::test]
async fn test_reparent_rejects_foreign_parent() {
    let core = helpers::TestCore::new();
    let a = core.root("A").await;
    let b = core.folder(a, "B").await;

    let other = helpers::TestCore::new();
    let elsewhere = other.root("elsewhere").await;
    let err = core.engine().reparent(b, Some(elsewhere)).await.unwrap_err();
    assert!(matches!(err, TreeError::InvalidParent { .. }));
}

#[tokio::test]
async fn test_insert_above_preserves_subtree_shape() {
    let core = helpers::TestCore::new();
    let a = core.root("A").await;
    let b = core.folder(a, "B").await;
    let kids = [core.folder(b, "x").await, core.folder(b, "y").await];

    let m = core.engine().insert_above(b, "M").await.unwrap();
    assert_eq!(m.parent_id, Some(a));
    assert_eq!(core.engine().get(b).await.unwrap().parent_id, Some(m.id));

    let children: Vec<_> = core
        .engine()
        .children(b)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(children, kids.to_vec());
}

#[tokio::test]
async fn test_insert_above_rolls_back_on_store_fault() {
    let core = helpers::TestCore::new();
    let a = core.root("A").await;
    let b = core.folder(a, "B").await;
    let before = core.snapshot().await;

    core.nodes.fail_set_parent.store(true, Ordering::SeqCst);
    let err = core.engine().insert_above(b, "M").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    assert_eq!(core.snapshot().await, before);
    assert_eq!(core.engine().children(a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stale_ancestry_is_conflict() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let left = core.folder(root, "left").await;
    let right = core.folder(root, "right").await;
    let deep = core.folder(right, "deep").await;
    let before = core.snapshot().await;

    // Another writer touches an ancestor the cycle check read.
    *core.nodes.interfere_with.lock().unwrap() = Some(right);
    let err = core.engine().reparent(left, Some(deep)).await.unwrap_err();
    assert!(matches!(err, TreeError::Conflict(_)));

    let after = core.snapshot().await;
    let moved = after.iter().find(|n| n.id == left).unwrap();
    assert_eq!(moved.parent_id, Some(root));
    assert_eq!(after.len(), before.len());
}

#[tokio::test]
async fn test_cascade_removes_exactly_the_subtree_deepest_first() {
    let core = helpers::TestCore::new();
    let nodes = core.build_tree(4, 2).await;
    let depths = helpers::depth_map(&nodes);
    let root = nodes[0].0;

    let report = core.engine().delete_cascade(root).await.unwrap();
    assert_eq!(report.removed.len(), nodes.len());
    assert!(core.nodes.inner.is_empty().await);

    let order: Vec<u32> = core.nodes.deleted().iter().map(|id| depths[id]).collect();
    assert_eq!(order.len(), nodes.len());
    assert!(
        order.windows(2).all(|w| w[0] >= w[1]),
        "delete order not deepest-first: {order:?}"
    );
}

#[tokio::test]
async fn test_cascade_spares_siblings_and_removes_leaves() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let doomed = core.folder(root, "doomed").await;
    let inner = core.folder(doomed, "inner").await;
    let spared = core.folder(root, "spared").await;
    core.canopy.attach_leaf(inner, "a.txt").await.unwrap();
    core.canopy.attach_leaf(spared, "b.txt").await.unwrap();

    let report = core.engine().delete_cascade(doomed).await.unwrap();
    assert_eq!(report.removed, vec![inner, doomed]);
    assert_eq!(report.leaves_removed.len(), 1);
    assert_eq!(core.leaves.len(), 1);
    assert!(core.engine().get(spared).await.is_ok());
    assert!(core.engine().get(root).await.is_ok());
}

#[tokio::test]
async fn test_cascade_twice_is_empty_second_time() {
    let core = helpers::TestCore::new();
    let nodes = core.build_tree(2, 2).await;
    let root = nodes[0].0;

    core.engine().delete_cascade(root).await.unwrap();
    let again = core.engine().delete_cascade(root).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_interrupted_cascade_reports_progress_and_resumes() {
    let core = helpers::TestCore::new();
    let nodes = core.build_tree(3, 2).await;
    let root = nodes[0].0;

    core.nodes.fail_delete_after.store(3, Ordering::SeqCst);
    let err = core.engine().delete_cascade(root).await.unwrap_err();
    match err {
        TreeError::PartialDelete { removed, .. } => {
            assert_eq!(removed, core.nodes.deleted());
            assert_eq!(removed.len(), 3);
        }
        other => panic!("expected PartialDelete, got {other:?}"),
    }

    core.nodes.fail_delete_after.store(usize::MAX, Ordering::SeqCst);
    let resumed = core.engine().delete_cascade(root).await.unwrap();
    assert_eq!(resumed.removed.len(), nodes.len() - 3);
    assert!(core.nodes.inner.is_empty().await);
}

#[tokio::test]
async fn test_cascade_removes_grants_on_deleted_resources() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let shared = core.folder(root, "shared").await;
    let leaf = core.canopy.attach_leaf(shared, "plan.docx").await.unwrap();
    let p = PrincipalId::new();
    let grants = core.canopy.grants();
    for resource in [
        ResourceRef::container(root),
        ResourceRef::container(shared),
        ResourceRef::leaf(leaf.id),
    ] {
        grants
            .share(NewGrant::new(p, resource, AccessLevel::View, true))
            .await
            .unwrap();
    }

    core.engine().delete_cascade(shared).await.unwrap();
    let left = grants.grants_for(p).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].resource, ResourceRef::container(root));
}

#[tokio::test]
async fn test_org_chart_allows_many_roots_and_detach_delete() {
    let core = helpers::TestCore::new();
    let campus = core.ns;
    let engine = core.engine();
    let head = engine
        .create(NewNode::root(campus, NodeKind::Placement, "Head"))
        .await
        .unwrap();
    let bursar = engine
        .create(NewNode::root(campus, NodeKind::Placement, "Bursar"))
        .await
        .unwrap();
    let deputy = engine
        .create(NewNode::child(campus, head.id, NodeKind::Placement, "Deputy"))
        .await
        .unwrap();

    engine.reparent(bursar.id, Some(deputy.id)).await.unwrap();
    engine.reparent(bursar.id, None).await.unwrap();

    let report = engine.delete_detaching_children(head.id).await.unwrap();
    assert_eq!(report.detached, vec![deputy.id]);
    let roots: Vec<_> = engine
        .roots(campus)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.label)
        .collect();
    assert_eq!(roots, vec!["Bursar", "Deputy"]);
}

#[tokio::test]
async fn test_folder_namespace_keeps_single_root() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let child = core.folder(root, "child").await;

    let err = core
        .engine()
        .create(NewNode::root(core.ns, NodeKind::Container, "second"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RootViolation);

    let err = core.engine().reparent(child, None).await.unwrap_err();
    assert!(matches!(err, TreeError::RootViolation { node: Some(id), .. } if id == child));

    // Detach is the explicit escape hatch.
    assert!(core.engine().detach(child).await.unwrap().is_root());
    assert_eq!(core.engine().roots(core.ns).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_mutations_publish_events() {
    let core = helpers::TestCore::new();
    let mut rx = core.canopy.events().subscribe();
    let root = core.root("root").await;
    let child = core.folder(root, "child").await;
    core.engine().rename(child, "renamed").await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(rx.recv().await.unwrap().payload);
    }
    assert!(matches!(&seen[0], EventPayload::Node(NodeEvent::Created { node_id, .. }) if *node_id == root));
    assert!(matches!(&seen[1], EventPayload::Node(NodeEvent::Created { parent_id: Some(p), .. }) if *p == root));
    assert!(matches!(&seen[2], EventPayload::Node(NodeEvent::Renamed { label, .. }) if label == "renamed"));
}

#[tokio::test]
async fn test_store_insert_of_duplicate_row_is_conflict() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let row = core.engine().get(root).await.unwrap();
    let err = core.nodes.insert(row).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_reparent_existing_root_to_top_level_is_noop() {
    let core = helpers::TestCore::new();
    let root = core.root("root").await;
    let child = core.folder(root, "child").await;
    core.engine().detach(child).await.unwrap();
    let before = core.snapshot().await;

    let kept = core.engine().reparent(root, None).await.unwrap();
    assert!(kept.is_root());
    let kept = core.engine().reparent(child, None).await.unwrap();
    assert!(kept.is_root());

    assert_eq!(core.snapshot().await, before);
}

#[tokio::test]
async fn test_concurrent_root_creates_leave_one_root() {
    let core = helpers::TestCore::new();
    let engine = core.engine();
    let (first, second) = tokio::join!(
        engine.create(NewNode::root(core.ns, NodeKind::Container, "first")),
        engine.create(NewNode::root(core.ns, NodeKind::Container, "second")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for err in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(err.kind(), ErrorKind::RootViolation | ErrorKind::Conflict));
    }
    assert_eq!(engine.roots(core.ns).await.unwrap().len(), 1);
}
