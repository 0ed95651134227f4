//! Coordinator tests for the group lifecycle: creation, renaming, the
//! default-group invariant, deletion, listing, and search.

mod fakes;

use cohort_service::GroupsError;
use fakes::coordinator;

#[test_log::test(tokio::test)]
async fn create_group_rejects_blank_names() {
    let (coordinator, _store, _directory) = coordinator();

    let err = coordinator
        .create_group(1, "   ")
        .await
        .expect_err("blank name must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));

    let err = coordinator
        .create_group(-1, "Staff")
        .await
        .expect_err("negative tenant must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));
}

#[test_log::test(tokio::test)]
async fn create_group_trims_the_name() {
    let (coordinator, store, _directory) = coordinator();

    let id = coordinator
        .create_group(1, "  Staff  ")
        .await
        .expect("Failed to create group");

    let group = store.group_snapshot(id).expect("group must exist");
    assert_eq!(group.name, "Staff");
    assert!(!group.is_default);
}

#[test_log::test(tokio::test)]
async fn create_group_rejects_duplicate_names_in_tenant() {
    let (coordinator, _store, _directory) = coordinator();

    coordinator
        .create_group(1, "Staff")
        .await
        .expect("Failed to create group");

    let err = coordinator
        .create_group(1, "Staff")
        .await
        .expect_err("duplicate name must be rejected");
    assert!(matches!(
        err,
        GroupsError::GroupAlreadyExists { tenant_id: 1, .. }
    ));
}

#[test_log::test(tokio::test)]
async fn create_group_allows_same_name_in_other_tenants_and_tenant_zero() {
    let (coordinator, _store, _directory) = coordinator();

    coordinator
        .create_group(1, "Staff")
        .await
        .expect("Failed to create group in tenant 1");
    coordinator
        .create_group(2, "Staff")
        .await
        .expect("same name in another tenant must be allowed");

    // Tenant 0 is the shared space and skips the uniqueness check entirely.
    coordinator
        .create_group(0, "Custom")
        .await
        .expect("Failed to create group in tenant 0");
    coordinator
        .create_group(0, "Custom")
        .await
        .expect("duplicate names in tenant 0 must be allowed");
}

#[test_log::test(tokio::test)]
async fn first_group_is_promoted_to_default_tenant_wide() {
    let (coordinator, _store, _directory) = coordinator();

    // Created out of alphabetical order on purpose.
    let beta = coordinator
        .create_group(7, "Beta")
        .await
        .expect("Failed to create group");
    let alpha = coordinator
        .create_group(7, "Alpha")
        .await
        .expect("Failed to create group");

    // A paged read whose window excludes the alphabetically first group
    // must still promote that group, never something from the page.
    let page = coordinator
        .get_groups(7, 1, 1, "")
        .await
        .expect("Failed to list groups");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, beta);
    assert!(!page.items[0].is_default);

    let default = coordinator
        .get_default_group(7)
        .await
        .expect("Failed to get default group")
        .expect("a default group must exist");
    assert_eq!(default.id, alpha);
    assert!(default.is_default);
}

#[test_log::test(tokio::test)]
async fn extra_default_flags_are_demoted() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(3, "Alpha")
        .await
        .expect("Failed to create group");
    let beta = coordinator
        .create_group(3, "Beta")
        .await
        .expect("Failed to create group");

    // Model drifted data with two flags set.
    store.force_default_flag(alpha);
    store.force_default_flag(beta);

    let default = coordinator
        .get_default_group(3)
        .await
        .expect("Failed to get default group")
        .expect("a default group must exist");
    assert_eq!(default.id, alpha);

    let beta_row = store.group_snapshot(beta).expect("group must exist");
    assert!(!beta_row.is_default);
}

#[test_log::test(tokio::test)]
async fn tenant_zero_and_empty_tenants_have_no_default() {
    let (coordinator, _store, _directory) = coordinator();

    coordinator
        .create_group(0, "Custom")
        .await
        .expect("Failed to create group");

    let none = coordinator
        .get_default_group(0)
        .await
        .expect("Failed to get default group");
    assert!(none.is_none());

    let none = coordinator
        .get_default_group(42)
        .await
        .expect("Failed to get default group");
    assert!(none.is_none());
}

#[test_log::test(tokio::test)]
async fn change_default_group_moves_the_flag() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(4, "Alpha")
        .await
        .expect("Failed to create group");
    let beta = coordinator
        .create_group(4, "Beta")
        .await
        .expect("Failed to create group");

    // Alpha gets promoted by the first default read.
    let default = coordinator
        .get_default_group(4)
        .await
        .expect("Failed to get default group")
        .expect("a default group must exist");
    assert_eq!(default.id, alpha);

    coordinator
        .change_default_group(4, beta)
        .await
        .expect("Failed to change default group");

    let alpha_row = store.group_snapshot(alpha).expect("group must exist");
    let beta_row = store.group_snapshot(beta).expect("group must exist");
    assert!(!alpha_row.is_default);
    assert!(beta_row.is_default);
}

#[test_log::test(tokio::test)]
async fn change_default_group_requires_a_group_of_the_tenant() {
    let (coordinator, _store, _directory) = coordinator();

    let other = coordinator
        .create_group(2, "Elsewhere")
        .await
        .expect("Failed to create group");
    coordinator
        .create_group(1, "Here")
        .await
        .expect("Failed to create group");

    let err = coordinator
        .change_default_group(1, other)
        .await
        .expect_err("cross-tenant default must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));

    let err = coordinator
        .change_default_group(1, 9999)
        .await
        .expect_err("unknown group must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));
}

#[test_log::test(tokio::test)]
async fn change_default_group_writes_nothing_when_repeated() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(5, "Alpha")
        .await
        .expect("Failed to create group");
    coordinator
        .create_group(5, "Beta")
        .await
        .expect("Failed to create group");

    coordinator
        .change_default_group(5, alpha)
        .await
        .expect("Failed to change default group");

    let before = store.mutations();
    coordinator
        .change_default_group(5, alpha)
        .await
        .expect("Failed to repeat change");
    assert_eq!(store.mutations(), before);
}

#[test_log::test(tokio::test)]
async fn rename_checks_uniqueness_and_preserves_created_at() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(6, "Alpha")
        .await
        .expect("Failed to create group");
    let beta = coordinator
        .create_group(6, "Beta")
        .await
        .expect("Failed to create group");

    let err = coordinator
        .update_group(beta, "Alpha")
        .await
        .expect_err("rename collision must be rejected");
    assert!(matches!(err, GroupsError::GroupAlreadyExists { .. }));

    // Renaming to the current name is a no-op, not a collision.
    coordinator
        .update_group(alpha, "Alpha")
        .await
        .expect("rename to own name must succeed");

    let alpha_before = store.group_snapshot(alpha).expect("group must exist");
    let beta_before = store.group_snapshot(beta).expect("group must exist");

    coordinator
        .update_group(beta, "Gamma")
        .await
        .expect("Failed to rename group");

    let beta_after = store.group_snapshot(beta).expect("group must exist");
    assert_eq!(beta_after.name, "Gamma");
    assert_eq!(beta_after.created_at, beta_before.created_at);
    assert!(beta_after.updated_at > beta_before.updated_at);

    // The untouched row is byte-for-byte what it was.
    assert_eq!(
        store.group_snapshot(alpha).expect("group must exist"),
        alpha_before
    );
}

#[test_log::test(tokio::test)]
async fn rename_of_unknown_group_is_invalid_input() {
    let (coordinator, _store, _directory) = coordinator();

    let err = coordinator
        .update_group(41, "Anything")
        .await
        .expect_err("unknown group must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));
}

#[test_log::test(tokio::test)]
async fn delete_group_refuses_the_tenant_default() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(8, "Alpha")
        .await
        .expect("Failed to create group");
    coordinator
        .get_default_group(8)
        .await
        .expect("Failed to promote default");

    let err = coordinator
        .delete_group(alpha)
        .await
        .expect_err("default group must not be deletable");
    assert!(matches!(
        err,
        GroupsError::CannotDeleteDefaultGroup {
            tenant_id: 8,
            group_id
        } if group_id == alpha
    ));
    assert_eq!(store.group_count(), 1);
}

#[test_log::test(tokio::test)]
async fn get_group_returns_none_for_unknown_or_sentinel_ids() {
    let (coordinator, _store, _directory) = coordinator();

    assert!(coordinator
        .get_group(0)
        .await
        .expect("Failed to get group")
        .is_none());
    assert!(coordinator
        .get_group(1234)
        .await
        .expect("Failed to get group")
        .is_none());
}

#[test_log::test(tokio::test)]
async fn get_groups_pages_and_counts_the_whole_match_set() {
    let (coordinator, _store, _directory) = coordinator();

    for name in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"] {
        coordinator
            .create_group(9, name)
            .await
            .expect("Failed to create group");
    }

    // Name ascending: Alpha, Beta, Delta, Epsilon, Gamma.
    let page = coordinator
        .get_groups(9, 1, 2, "")
        .await
        .expect("Failed to list groups");
    assert_eq!(page.total, 5);
    let names: Vec<&str> = page.items.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Beta", "Delta"]);

    let rest = coordinator
        .get_groups(9, 3, 10, "")
        .await
        .expect("Failed to list groups");
    assert_eq!(rest.total, 5);
    let names: Vec<&str> = rest.items.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Epsilon", "Gamma"]);
}

#[test_log::test(tokio::test)]
async fn get_groups_with_zero_limit_returns_everything() {
    let (coordinator, _store, _directory) = coordinator();

    for name in ["One", "Two", "Three"] {
        coordinator
            .create_group(10, name)
            .await
            .expect("Failed to create group");
    }

    let page = coordinator
        .get_groups(10, 0, 0, "")
        .await
        .expect("Failed to list groups");
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total, 3);
}

#[test_log::test(tokio::test)]
async fn get_groups_search_is_a_case_insensitive_substring() {
    let (coordinator, _store, _directory) = coordinator();

    for name in ["Sales", "Salaried", "Support"] {
        coordinator
            .create_group(11, name)
            .await
            .expect("Failed to create group");
    }

    let page = coordinator
        .get_groups(11, 0, 0, "al")
        .await
        .expect("Failed to search groups");
    assert_eq!(page.total, 2);
    let names: Vec<&str> = page.items.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Salaried", "Sales"]);
}

#[test_log::test(tokio::test)]
async fn get_groups_search_treats_wildcards_as_literals() {
    let (coordinator, _store, _directory) = coordinator();

    for name in ["100% Club", "Progress", "under_score"] {
        coordinator
            .create_group(13, name)
            .await
            .expect("Failed to create group");
    }

    let page = coordinator
        .get_groups(13, 0, 0, "100%")
        .await
        .expect("Failed to search groups");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "100% Club");

    let page = coordinator
        .get_groups(13, 0, 0, "_")
        .await
        .expect("Failed to search groups");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "under_score");
}

#[test_log::test(tokio::test)]
async fn get_groups_rejects_negative_paging() {
    let (coordinator, _store, _directory) = coordinator();

    let err = coordinator
        .get_groups(1, -1, 0, "")
        .await
        .expect_err("negative offset must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));

    let err = coordinator
        .get_groups(1, 0, -5, "")
        .await
        .expect_err("negative limit must be rejected");
    assert!(matches!(err, GroupsError::InvalidInput(_)));
}

#[test_log::test(tokio::test)]
async fn listing_repairs_the_default_flag_before_reading() {
    let (coordinator, store, _directory) = coordinator();

    let alpha = coordinator
        .create_group(12, "Alpha")
        .await
        .expect("Failed to create group");

    let page = coordinator
        .get_groups(12, 0, 0, "")
        .await
        .expect("Failed to list groups");
    assert!(page.items[0].is_default);

    let row = store.group_snapshot(alpha).expect("group must exist");
    assert!(row.is_default);
}
